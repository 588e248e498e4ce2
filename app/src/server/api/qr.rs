//! QR generation API: multipart form in, composite PNG out.

use std::str::FromStr;

use axum::Json;
use axum::body::Body;
use axum::extract::{Multipart, State};
use axum::http::header;
use axum::response::Response;
use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use image_engine::{
    BlendMode, Composite, DOWNLOAD_FILENAME, DOWNLOAD_MIME, GenerationRequest, parse_color,
};
use serde_json::{Value, json};
use uuid::Uuid;

use crate::app::SharedState;
use crate::config::AppConfig;

use super::{ApiError, engine_err, err_json};

/// Raw form fields as submitted by the UI. Everything but `text` and `image`
/// is optional and falls back to the configured defaults.
#[derive(Debug, Default)]
pub struct GenerationForm {
    pub text: Option<String>,
    pub image: Option<Vec<u8>>,
    pub mode: Option<String>,
    pub module_size: Option<String>,
    pub border: Option<String>,
    pub fill: Option<String>,
    pub background: Option<String>,
    pub image_weight: Option<String>,
    pub qr_weight: Option<String>,
    pub alpha: Option<String>,
    pub pixel_size: Option<String>,
}

impl GenerationForm {
    /// Drain a multipart body into a form.
    pub async fn from_multipart(mut multipart: Multipart) -> Result<Self, ApiError> {
        let mut form = Self::default();

        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| err_json(400, &e.to_string()))?
        {
            let name = field.name().unwrap_or("").to_string();
            if name == "image" {
                let data = field
                    .bytes()
                    .await
                    .map_err(|e| err_json(400, &e.to_string()))?;
                if !data.is_empty() {
                    form.image = Some(data.to_vec());
                }
                continue;
            }

            let slot = match name.as_str() {
                "text" => &mut form.text,
                "mode" => &mut form.mode,
                "module_size" => &mut form.module_size,
                "border" => &mut form.border,
                "fill" => &mut form.fill,
                "background" => &mut form.background,
                "image_weight" => &mut form.image_weight,
                "qr_weight" => &mut form.qr_weight,
                "alpha" => &mut form.alpha,
                "pixel_size" => &mut form.pixel_size,
                _ => continue,
            };
            let text = field
                .text()
                .await
                .map_err(|e| err_json(400, &e.to_string()))?;
            if !text.trim().is_empty() {
                *slot = Some(text);
            }
        }

        Ok(form)
    }

    /// Resolve the form against `cfg` into an engine request plus upload bytes.
    ///
    /// Generation is refused unless both text and an image are present.
    pub fn into_request(self, cfg: &AppConfig) -> Result<(GenerationRequest, Vec<u8>), ApiError> {
        let text = self
            .text
            .ok_or_else(|| err_json(400, "No QR text provided"))?;
        let image = self
            .image
            .ok_or_else(|| err_json(400, "No image file provided"))?;

        let mut qr = cfg.qr_request(text);
        if let Some(v) = &self.module_size {
            qr.module_size = parse_field("module_size", v)?;
        }
        if let Some(v) = &self.border {
            qr.border = parse_field("border", v)?;
        }
        if let Some(v) = &self.fill {
            qr.fill = parse_color(v).map_err(|e| engine_err(&e))?;
        }

        let mode_name = self.mode.as_deref().unwrap_or("overlay");
        let mut mode = cfg.blend_mode(mode_name).map_err(|e| engine_err(&e))?;
        match &mut mode {
            BlendMode::Overlay => {}
            BlendMode::Weighted {
                image_weight,
                qr_weight,
                ..
            } => {
                if let Some(v) = &self.image_weight {
                    *image_weight = parse_field("image_weight", v)?;
                }
                if let Some(v) = &self.qr_weight {
                    *qr_weight = parse_field("qr_weight", v)?;
                }
            }
            BlendMode::Alpha { alpha } => {
                if let Some(v) = &self.alpha {
                    *alpha = parse_field("alpha", v)?;
                }
            }
            BlendMode::Pixelate { pixel_size, alpha } => {
                if let Some(v) = &self.pixel_size {
                    *pixel_size = parse_field("pixel_size", v)?;
                }
                if let Some(v) = &self.alpha {
                    *alpha = parse_field("alpha", v)?;
                }
            }
        }

        let mut req = GenerationRequest::new(qr, mode);
        let background = match &self.background {
            Some(v) => Some(parse_color(v).map_err(|e| engine_err(&e))?),
            None => cfg.back_color,
        };
        if let Some(bg) = background {
            req = req.with_background(bg);
        }

        req.validate().map_err(|e| engine_err(&e))?;
        Ok((req, image))
    }
}

fn parse_field<T: FromStr>(field: &str, value: &str) -> Result<T, ApiError> {
    value
        .trim()
        .parse()
        .map_err(|_| err_json(400, &format!("{field}: invalid number '{value}'")))
}

/// Run the CPU-bound pipeline off the async runtime.
async fn generate(state: &SharedState, multipart: Multipart) -> Result<(Uuid, Composite), ApiError> {
    let form = GenerationForm::from_multipart(multipart).await?;
    let (req, upload) = form.into_request(state.config())?;
    let id = Uuid::new_v4();

    tracing::info!(
        %id,
        mode = req.mode.name(),
        module_size = req.qr.module_size,
        border = req.qr.border,
        upload_bytes = upload.len(),
        "Generating QR composite"
    );

    let composite = tokio::task::spawn_blocking(move || image_engine::run(&req, &upload))
        .await
        .map_err(|e| {
            tracing::error!(%id, "Generation task failed: {e}");
            err_json(500, "Generation task failed")
        })?
        .map_err(|e| {
            tracing::warn!(%id, "Generation rejected: {e}");
            engine_err(&e)
        })?;

    Ok((id, composite))
}

/// POST /api/qr/preview – Generate and return the composite as a data URL
pub async fn preview(
    State(state): State<SharedState>,
    multipart: Multipart,
) -> Result<Json<Value>, ApiError> {
    let (id, composite) = generate(&state, multipart).await?;

    Ok(Json(json!({
        "status": "ok",
        "id": id.to_string(),
        "mode": composite.mode,
        "width": composite.width(),
        "height": composite.height(),
        "qr_modules": composite.qr_modules,
        "filename": DOWNLOAD_FILENAME,
        "image": format!("data:{DOWNLOAD_MIME};base64,{}", BASE64.encode(&composite.png)),
    })))
}

/// POST /api/qr/download – Generate and return the composite as a PNG attachment
pub async fn download(
    State(state): State<SharedState>,
    multipart: Multipart,
) -> Result<Response, ApiError> {
    let (id, composite) = generate(&state, multipart).await?;
    tracing::debug!(%id, bytes = composite.png.len(), "Sending download");

    Response::builder()
        .header(header::CONTENT_TYPE, DOWNLOAD_MIME)
        .header(
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{DOWNLOAD_FILENAME}\""),
        )
        .header(header::CACHE_CONTROL, "no-store")
        .body(Body::from(composite.png))
        .map_err(|e| err_json(500, &e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;
    use image_engine::qr::{TRANSPARENT, WHITE};

    fn form(text: &str) -> GenerationForm {
        GenerationForm {
            text: Some(text.into()),
            image: Some(vec![1, 2, 3]),
            ..GenerationForm::default()
        }
    }

    #[test]
    fn into_request_requires_text_and_image() {
        let cfg = AppConfig::default();

        let missing_text = GenerationForm {
            image: Some(vec![1]),
            ..GenerationForm::default()
        };
        let (status, body) = missing_text.into_request(&cfg).unwrap_err();
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "No QR text provided");

        let missing_image = GenerationForm {
            text: Some("hi".into()),
            ..GenerationForm::default()
        };
        let (status, body) = missing_image.into_request(&cfg).unwrap_err();
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "No image file provided");
    }

    #[test]
    fn into_request_defaults_to_overlay_with_config_scale() {
        let cfg = AppConfig::default();
        let (req, upload) = form("hello").into_request(&cfg).unwrap();
        assert_eq!(req.mode, BlendMode::Overlay);
        assert_eq!(req.qr.module_size, cfg.module_size);
        assert_eq!(req.qr.background, TRANSPARENT);
        assert_eq!(upload, vec![1, 2, 3]);
    }

    #[test]
    fn into_request_applies_mode_overrides() {
        let cfg = AppConfig::default();
        let f = GenerationForm {
            mode: Some("pixelate".into()),
            pixel_size: Some("4".into()),
            alpha: Some("0.7".into()),
            module_size: Some("6".into()),
            ..form("hello")
        };
        let (req, _) = f.into_request(&cfg).unwrap();
        assert_eq!(
            req.mode,
            BlendMode::Pixelate {
                pixel_size: 4,
                alpha: 0.7
            }
        );
        assert_eq!(req.qr.module_size, 6);
        assert_eq!(req.qr.background, WHITE);
    }

    #[test]
    fn into_request_honours_explicit_colors() {
        let cfg = AppConfig::default();
        let f = GenerationForm {
            fill: Some("#ff0000".into()),
            background: Some("#00ff00".into()),
            ..form("hello")
        };
        let (req, _) = f.into_request(&cfg).unwrap();
        assert_eq!(req.qr.fill.0, [255, 0, 0, 255]);
        assert_eq!(req.qr.background.0, [0, 255, 0, 255]);
    }

    #[test]
    fn into_request_rejects_bad_values() {
        let cfg = AppConfig::default();

        let f = GenerationForm {
            border: Some("wide".into()),
            ..form("hello")
        };
        assert_eq!(f.into_request(&cfg).unwrap_err().0, StatusCode::BAD_REQUEST);

        let f = GenerationForm {
            module_size: Some("30".into()),
            ..form("hello")
        };
        assert_eq!(f.into_request(&cfg).unwrap_err().0, StatusCode::BAD_REQUEST);

        let f = GenerationForm {
            mode: Some("sepia".into()),
            ..form("hello")
        };
        assert_eq!(f.into_request(&cfg).unwrap_err().0, StatusCode::BAD_REQUEST);

        let f = GenerationForm {
            mode: Some("alpha".into()),
            alpha: Some("1.5".into()),
            ..form("hello")
        };
        assert_eq!(f.into_request(&cfg).unwrap_err().0, StatusCode::BAD_REQUEST);
    }
}
