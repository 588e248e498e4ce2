//! All setting definitions with their default values.

use std::collections::HashMap;
use std::sync::LazyLock;

/// A single setting definition.
#[derive(Debug, Clone)]
pub struct SettingDef {
    pub key: &'static str,
    pub default: &'static str,
    pub description: &'static str,
}

const fn def(key: &'static str, default: &'static str, description: &'static str) -> SettingDef {
    SettingDef {
        key,
        default,
        description,
    }
}

pub const SETTING_DEFS: &[SettingDef] = &[
    def("SERVER_PORT", "8080", "HTTP port"),
    def("BIND_ADDRESS", "127.0.0.1", "Interface the server binds to"),
    def("MAX_UPLOAD_MB", "20", "Largest accepted upload, in megabytes"),
    def("QR_DEFAULT_TEXT", "https://example.com", "Text pre-filled in the form"),
    def("QR_MODULE_SIZE", "10", "Pixels per QR module (5-20)"),
    def("QR_BORDER", "4", "Quiet zone width in modules (1-10)"),
    def("QR_FILL_COLOR", "#000000", "Colour of dark QR modules"),
    def(
        "QR_BACK_COLOR",
        "",
        "Colour of light QR modules; empty picks per blend mode",
    ),
    def("QR_IMAGE_WEIGHT", "0.4", "Weighted blend: image weight"),
    def("QR_QR_WEIGHT", "0.6", "Weighted blend: QR weight"),
    def("QR_ALPHA", "0.4", "Alpha blend: QR mixing factor"),
    def("QR_PIXEL_SIZE", "10", "Pixelation blend: block size in pixels"),
    def("QR_PIXELATE_ALPHA", "0.5", "Pixelation blend: QR mixing factor"),
];

static DEFS_BY_KEY: LazyLock<HashMap<&'static str, &'static SettingDef>> =
    LazyLock::new(|| SETTING_DEFS.iter().map(|d| (d.key, d)).collect());

/// Look up a setting definition by key.
pub fn get_setting_def(key: &str) -> Option<&'static SettingDef> {
    DEFS_BY_KEY.get(key).copied()
}

/// Default value for `key`, or an empty string for unknown keys.
pub fn default_value(key: &str) -> &'static str {
    get_setting_def(key).map(|d| d.default).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::validation::validate_setting;

    #[test]
    fn keys_are_unique() {
        assert_eq!(DEFS_BY_KEY.len(), SETTING_DEFS.len());
    }

    #[test]
    fn every_default_passes_validation() {
        for def in SETTING_DEFS {
            assert!(
                validate_setting(def.key, def.default).is_ok(),
                "default for {} is invalid",
                def.key
            );
        }
    }

    #[test]
    fn unknown_key_has_empty_default() {
        assert_eq!(default_value("NOPE"), "");
        assert_eq!(default_value("QR_BORDER"), "4");
    }
}
