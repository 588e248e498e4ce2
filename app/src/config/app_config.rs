//! Runtime application configuration loaded from the environment.

use image_engine::image::Rgba;
use image_engine::qr::{BLACK, DEFAULT_BORDER, DEFAULT_MODULE_SIZE, DEFAULT_TEXT};
use image_engine::{BlendDefaults, BlendMode, EngineError, QrRequest, parse_color};

use super::SettingInfo;
use super::defaults::{SETTING_DEFS, default_value};
use super::validation::validate_setting;

/// Runtime configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub server_port: u16,
    pub bind_address: String,
    pub max_upload_mb: u32,
    pub default_text: String,
    pub module_size: u32,
    pub border: u32,
    pub fill_color: Rgba<u8>,
    /// `None` lets each blend mode pick its own QR background.
    pub back_color: Option<Rgba<u8>>,
    pub blend: BlendDefaults,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server_port: 8080,
            bind_address: "127.0.0.1".into(),
            max_upload_mb: 20,
            default_text: DEFAULT_TEXT.into(),
            module_size: DEFAULT_MODULE_SIZE,
            border: DEFAULT_BORDER,
            fill_color: BLACK,
            back_color: None,
            blend: BlendDefaults::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from process environment variables.
    pub fn load() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup.
    ///
    /// Missing keys take their defaults; invalid values are logged and
    /// replaced by the default.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let g = |key: &str| -> String {
            match lookup(key) {
                Some(v) => match validate_setting(key, &v) {
                    Ok(()) => v,
                    Err(e) => {
                        tracing::warn!(key, value = %v, "Invalid setting ({e}), using default");
                        default_value(key).to_string()
                    }
                },
                None => default_value(key).to_string(),
            }
        };

        let d = Self::default();

        Self {
            server_port: g("SERVER_PORT").parse().unwrap_or(d.server_port),
            bind_address: g("BIND_ADDRESS"),
            max_upload_mb: g("MAX_UPLOAD_MB").parse().unwrap_or(d.max_upload_mb),
            default_text: g("QR_DEFAULT_TEXT"),
            module_size: g("QR_MODULE_SIZE").parse().unwrap_or(d.module_size),
            border: g("QR_BORDER").parse().unwrap_or(d.border),
            fill_color: parse_color(&g("QR_FILL_COLOR")).unwrap_or(d.fill_color),
            back_color: {
                let c = g("QR_BACK_COLOR");
                if c.is_empty() { None } else { parse_color(&c).ok() }
            },
            blend: BlendDefaults {
                image_weight: parse_f32(&g("QR_IMAGE_WEIGHT"), d.blend.image_weight),
                qr_weight: parse_f32(&g("QR_QR_WEIGHT"), d.blend.qr_weight),
                alpha: parse_f32(&g("QR_ALPHA"), d.blend.alpha),
                pixel_size: g("QR_PIXEL_SIZE").parse().unwrap_or(d.blend.pixel_size),
                pixelate_alpha: parse_f32(&g("QR_PIXELATE_ALPHA"), d.blend.pixelate_alpha),
            },
        }
    }

    /// Upload body limit in bytes.
    pub fn max_upload_bytes(&self) -> usize {
        self.max_upload_mb as usize * 1024 * 1024
    }

    /// QR request seeded from the configured defaults.
    pub fn qr_request(&self, text: impl Into<String>) -> QrRequest {
        QrRequest {
            text: text.into(),
            module_size: self.module_size,
            border: self.border,
            fill: self.fill_color,
            ..QrRequest::default()
        }
    }

    /// Blend mode named `name`, parameterised with the configured defaults.
    pub fn blend_mode(&self, name: &str) -> Result<BlendMode, EngineError> {
        BlendMode::from_name(name, &self.blend)
    }

    /// Effective value of every known setting, as shown to the frontend.
    pub fn settings(&self) -> Vec<SettingInfo> {
        SETTING_DEFS
            .iter()
            .map(|def| SettingInfo {
                key: def.key.to_string(),
                value: self.value_of(def.key),
                default: def.default.to_string(),
                description: def.description.to_string(),
            })
            .collect()
    }

    fn value_of(&self, key: &str) -> String {
        match key {
            "SERVER_PORT" => self.server_port.to_string(),
            "BIND_ADDRESS" => self.bind_address.clone(),
            "MAX_UPLOAD_MB" => self.max_upload_mb.to_string(),
            "QR_DEFAULT_TEXT" => self.default_text.clone(),
            "QR_MODULE_SIZE" => self.module_size.to_string(),
            "QR_BORDER" => self.border.to_string(),
            "QR_FILL_COLOR" => color_hex(self.fill_color),
            "QR_BACK_COLOR" => self.back_color.map(color_hex).unwrap_or_default(),
            "QR_IMAGE_WEIGHT" => self.blend.image_weight.to_string(),
            "QR_QR_WEIGHT" => self.blend.qr_weight.to_string(),
            "QR_ALPHA" => self.blend.alpha.to_string(),
            "QR_PIXEL_SIZE" => self.blend.pixel_size.to_string(),
            "QR_PIXELATE_ALPHA" => self.blend.pixelate_alpha.to_string(),
            _ => String::new(),
        }
    }
}

/// Format a colour as `#RRGGBB`, or `#RRGGBBAA` when not fully opaque.
pub fn color_hex(c: Rgba<u8>) -> String {
    let [r, g, b, a] = c.0;
    if a == 255 {
        format!("#{r:02x}{g:02x}{b:02x}")
    } else {
        format!("#{r:02x}{g:02x}{b:02x}{a:02x}")
    }
}

fn parse_f32(s: &str, default: f32) -> f32 {
    if s.is_empty() {
        return default;
    }
    s.parse().unwrap_or(default)
}
