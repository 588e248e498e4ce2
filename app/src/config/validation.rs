//! Setting value validation.

use std::net::IpAddr;
use std::sync::LazyLock;

use regex::Regex;

static RE_HEX_COLOR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^#?[0-9A-Fa-f]{6}([0-9A-Fa-f]{2})?$").unwrap());

/// Validate a setting value. Returns `Ok(())` if valid, or an error message.
pub fn validate_setting(key: &str, value: &str) -> Result<(), String> {
    match key {
        "SERVER_PORT" => {
            value.parse::<u16>().map_err(|_| "must be a port number (0-65535)")?;
        }
        "BIND_ADDRESS" => {
            value.parse::<IpAddr>().map_err(|_| "must be an IP address")?;
        }
        "MAX_UPLOAD_MB" => validate_int_range(value, 1, 200)?,
        "QR_DEFAULT_TEXT" => {
            if value.trim().is_empty() {
                return Err("must not be empty".into());
            }
        }
        "QR_MODULE_SIZE" => validate_int_range(value, 5, 20)?,
        "QR_BORDER" => validate_int_range(value, 1, 10)?,
        "QR_PIXEL_SIZE" => validate_int_range(value, 1, 50)?,
        "QR_FILL_COLOR" => validate_color(value, false)?,
        "QR_BACK_COLOR" => validate_color(value, true)?,
        "QR_IMAGE_WEIGHT" | "QR_QR_WEIGHT" | "QR_ALPHA" | "QR_PIXELATE_ALPHA" => {
            validate_float_range(value, 0.0, 1.0)?
        }
        _ => {}
    }
    Ok(())
}

fn validate_int_range(value: &str, min: i64, max: i64) -> Result<(), String> {
    let v: i64 = value.parse().map_err(|_| "must be an integer")?;
    if v < min || v > max {
        return Err(format!("must be between {min} and {max}"));
    }
    Ok(())
}

fn validate_float_range(value: &str, min: f64, max: f64) -> Result<(), String> {
    let v: f64 = value.parse().map_err(|_| "must be a float")?;
    if !(min..=max).contains(&v) {
        return Err(format!("must be between {min} and {max}"));
    }
    Ok(())
}

fn validate_color(value: &str, allow_auto: bool) -> Result<(), String> {
    if allow_auto && value.is_empty() {
        return Ok(());
    }
    if value.eq_ignore_ascii_case("transparent") || RE_HEX_COLOR.is_match(value) {
        return Ok(());
    }
    Err("must be #RRGGBB, #RRGGBBAA or 'transparent'".into())
}
