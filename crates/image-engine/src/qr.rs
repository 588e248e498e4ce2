//! QR code generation at a fixed module scale with highest-tier error correction.

use std::ops::RangeInclusive;

use image::{Rgba, RgbaImage};
use qrcode::{Color, EcLevel, QrCode, Version};
use tracing::debug;

use crate::error::{EngineError, Result};

/// Allowed pixel size of a single QR module.
pub const MODULE_SIZE_RANGE: RangeInclusive<u32> = 5..=20;
/// Allowed quiet-zone width, in modules.
pub const BORDER_RANGE: RangeInclusive<u32> = 1..=10;

pub const DEFAULT_TEXT: &str = "https://example.com";
pub const DEFAULT_MODULE_SIZE: u32 = 10;
pub const DEFAULT_BORDER: u32 = 4;

pub const BLACK: Rgba<u8> = Rgba([0, 0, 0, 255]);
pub const WHITE: Rgba<u8> = Rgba([255, 255, 255, 255]);
pub const TRANSPARENT: Rgba<u8> = Rgba([0, 0, 0, 0]);

/// Everything needed to render one QR bitmap.
#[derive(Debug, Clone, PartialEq)]
pub struct QrRequest {
    pub text: String,
    pub module_size: u32,
    pub border: u32,
    pub fill: Rgba<u8>,
    pub background: Rgba<u8>,
}

impl Default for QrRequest {
    fn default() -> Self {
        Self {
            text: DEFAULT_TEXT.into(),
            module_size: DEFAULT_MODULE_SIZE,
            border: DEFAULT_BORDER,
            fill: BLACK,
            background: TRANSPARENT,
        }
    }
}

impl QrRequest {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.text.trim().is_empty() {
            return Err(EngineError::EmptyText);
        }
        check_range("module_size", self.module_size, &MODULE_SIZE_RANGE)?;
        check_range("border", self.border, &BORDER_RANGE)?;
        Ok(())
    }
}

fn check_range(field: &'static str, value: u32, range: &RangeInclusive<u32>) -> Result<()> {
    if range.contains(&value) {
        Ok(())
    } else {
        Err(EngineError::out_of_range(
            field,
            value,
            *range.start(),
            *range.end(),
        ))
    }
}

/// A rendered QR code. Immutable once produced.
#[derive(Debug, Clone)]
pub struct QrBitmap {
    image: RgbaImage,
    modules: u32,
    version: i16,
}

impl QrBitmap {
    pub fn image(&self) -> &RgbaImage {
        &self.image
    }

    pub fn into_image(self) -> RgbaImage {
        self.image
    }

    /// Number of modules per side, quiet zone excluded.
    pub fn modules(&self) -> u32 {
        self.modules
    }

    pub fn version(&self) -> i16 {
        self.version
    }
}

/// Encode `req.text` and rasterize it.
///
/// The smallest version that fits the payload at error-correction level H is
/// chosen. Each side of the returned image is
/// `module_size * modules + 2 * border * module_size` pixels.
pub fn generate_qr(req: &QrRequest) -> Result<QrBitmap> {
    req.validate()?;

    let code = QrCode::with_error_correction_level(req.text.as_bytes(), EcLevel::H)?;
    let modules = code.to_colors();
    let module_count = code.width() as u32;
    let scale = req.module_size;
    let offset = req.border * scale;
    let img_size = module_count * scale + 2 * offset;

    let version = match code.version() {
        Version::Normal(v) | Version::Micro(v) => v,
    };
    debug!(
        version,
        module_count,
        scale,
        border = req.border,
        img_size,
        "Rendering QR bitmap"
    );

    let mut img = RgbaImage::from_pixel(img_size, img_size, req.background);

    for (i, color) in modules.iter().enumerate() {
        if *color != Color::Dark {
            continue;
        }
        let x = (i as u32) % module_count;
        let y = (i as u32) / module_count;
        for dy in 0..scale {
            for dx in 0..scale {
                img.put_pixel(offset + x * scale + dx, offset + y * scale + dy, req.fill);
            }
        }
    }

    Ok(QrBitmap {
        image: img,
        modules: module_count,
        version,
    })
}

/// Parse a color-picker value: `#RRGGBB`, `#RRGGBBAA` or `transparent`.
pub fn parse_color(value: &str) -> Result<Rgba<u8>> {
    let value = value.trim();
    if value.eq_ignore_ascii_case("transparent") {
        return Ok(TRANSPARENT);
    }

    let hex = value.trim_start_matches('#');
    if (hex.len() != 6 && hex.len() != 8) || !hex.is_ascii() {
        return Err(EngineError::InvalidColor(value.to_string()));
    }

    let channel = |i: usize| {
        u8::from_str_radix(&hex[i..i + 2], 16)
            .map_err(|_| EngineError::InvalidColor(value.to_string()))
    };
    let alpha = if hex.len() == 8 { channel(6)? } else { 255 };

    Ok(Rgba([channel(0)?, channel(2)?, channel(4)?, alpha]))
}
