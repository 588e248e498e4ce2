//! Configured defaults used to seed the UI controls.

use axum::Json;
use axum::extract::State;
use image_engine::compose::{BlendMode, MAX_PIXEL_SIZE};
use image_engine::qr::{BORDER_RANGE, MODULE_SIZE_RANGE};
use image_engine::DOWNLOAD_FILENAME;
use serde_json::{Value, json};

use crate::app::SharedState;
use crate::config::app_config::color_hex;

/// GET /api/defaults
pub async fn get_defaults(State(state): State<SharedState>) -> Json<Value> {
    let cfg = state.config();
    Json(json!({
        "text": cfg.default_text,
        "module_size": cfg.module_size,
        "border": cfg.border,
        "fill": color_hex(cfg.fill_color),
        "background": cfg.back_color.map(color_hex),
        "modes": BlendMode::NAMES,
        "blend": cfg.blend,
        "limits": {
            "module_size": [MODULE_SIZE_RANGE.start(), MODULE_SIZE_RANGE.end()],
            "border": [BORDER_RANGE.start(), BORDER_RANGE.end()],
            "pixel_size": [1, MAX_PIXEL_SIZE],
            "max_upload_mb": cfg.max_upload_mb,
        },
        "filename": DOWNLOAD_FILENAME,
        "settings": cfg.settings(),
    }))
}
