//! Compositing strategies that merge a QR bitmap with a user image.
//!
//! Every strategy implements [`Compositor`] and is a pure function of its
//! inputs: the same images and parameters always produce the same pixels.
//! [`BlendMode`] selects a strategy and carries its parameters.

use image::{Rgba, RgbaImage};
use imageproc::map::map_colors2;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{EngineError, Result};
use crate::qr::{TRANSPARENT, WHITE};
use crate::resize::{DEFAULT_FILTER, pixelate, resize_exact, resize_to_match};

pub const DEFAULT_IMAGE_WEIGHT: f32 = 0.4;
pub const DEFAULT_QR_WEIGHT: f32 = 0.6;
pub const DEFAULT_ALPHA: f32 = 0.4;
pub const DEFAULT_PIXEL_SIZE: u32 = 10;
pub const DEFAULT_PIXELATE_ALPHA: f32 = 0.5;
pub const MAX_PIXEL_SIZE: u32 = 50;

/// Merges a QR bitmap with a user image into one raster.
pub trait Compositor {
    fn name(&self) -> &'static str;

    fn composite(&self, qr: &RgbaImage, image: &RgbaImage) -> RgbaImage;
}

/// Shrinks the QR to a third of the background and pastes it in the centre,
/// using the QR's own alpha channel as the paste mask.
#[derive(Debug, Clone, Copy, Default)]
pub struct CenteredOverlay;

impl CenteredOverlay {
    /// Pixel rectangle `(x, y, width, height)` the QR occupies on a background
    /// of the given size.
    pub fn footprint(bg_width: u32, bg_height: u32) -> (u32, u32, u32, u32) {
        let w = (bg_width / 3).max(1);
        let h = (bg_height / 3).max(1);
        let x = bg_width.saturating_sub(w) / 2;
        let y = bg_height.saturating_sub(h) / 2;
        (x, y, w, h)
    }
}

impl Compositor for CenteredOverlay {
    fn name(&self) -> &'static str {
        "overlay"
    }

    fn composite(&self, qr: &RgbaImage, image: &RgbaImage) -> RgbaImage {
        let (x, y, w, h) = Self::footprint(image.width(), image.height());
        debug!(x, y, w, h, "Pasting QR at background centre");

        let small = resize_exact(qr, w, h, DEFAULT_FILTER);
        let mut out = image.clone();
        paste_with_mask(&mut out, &small, x, y);
        out
    }
}

/// Per-pixel weighted sum, `image_weight * image + qr_weight * qr + gamma`,
/// clamped to the valid channel range.
#[derive(Debug, Clone, Copy)]
pub struct WeightedBlend {
    pub image_weight: f32,
    pub qr_weight: f32,
    pub gamma: f32,
}

impl Default for WeightedBlend {
    fn default() -> Self {
        Self {
            image_weight: DEFAULT_IMAGE_WEIGHT,
            qr_weight: DEFAULT_QR_WEIGHT,
            gamma: 0.0,
        }
    }
}

impl Compositor for WeightedBlend {
    fn name(&self) -> &'static str {
        "weighted"
    }

    fn composite(&self, qr: &RgbaImage, image: &RgbaImage) -> RgbaImage {
        let image = resize_to_match(image, qr);
        let (wi, wq, gamma) = (self.image_weight, self.qr_weight, self.gamma);
        map_colors2(&image, qr, |p: Rgba<u8>, q: Rgba<u8>| {
            Rgba(std::array::from_fn(|c| {
                to_channel(wi * f32::from(p[c]) + wq * f32::from(q[c]) + gamma)
            }))
        })
    }
}

/// Linear interpolation from the user image (`alpha = 0`) to the QR (`alpha = 1`).
#[derive(Debug, Clone, Copy)]
pub struct AlphaBlend {
    pub alpha: f32,
}

impl Default for AlphaBlend {
    fn default() -> Self {
        Self {
            alpha: DEFAULT_ALPHA,
        }
    }
}

impl Compositor for AlphaBlend {
    fn name(&self) -> &'static str {
        "alpha"
    }

    fn composite(&self, qr: &RgbaImage, image: &RgbaImage) -> RgbaImage {
        let image = resize_to_match(image, qr);
        lerp(&image, qr, self.alpha)
    }
}

/// Pixelates the background, stretches the QR over it and alpha-blends the two.
#[derive(Debug, Clone, Copy)]
pub struct PixelateBlend {
    pub pixel_size: u32,
    pub alpha: f32,
}

impl Default for PixelateBlend {
    fn default() -> Self {
        Self {
            pixel_size: DEFAULT_PIXEL_SIZE,
            alpha: DEFAULT_PIXELATE_ALPHA,
        }
    }
}

impl Compositor for PixelateBlend {
    fn name(&self) -> &'static str {
        "pixelate"
    }

    fn composite(&self, qr: &RgbaImage, image: &RgbaImage) -> RgbaImage {
        let background = pixelate(image, self.pixel_size);
        let qr = resize_to_match(qr, &background);
        lerp(&background, &qr, self.alpha)
    }
}

/// Strategy selector as submitted by a caller, tagged by `mode`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "lowercase")]
pub enum BlendMode {
    #[default]
    Overlay,
    Weighted {
        image_weight: f32,
        qr_weight: f32,
        #[serde(default)]
        gamma: f32,
    },
    Alpha {
        alpha: f32,
    },
    Pixelate {
        pixel_size: u32,
        alpha: f32,
    },
}

impl BlendMode {
    pub const NAMES: [&'static str; 4] = ["overlay", "weighted", "alpha", "pixelate"];

    /// Build the named mode with its parameters taken from `defaults`.
    pub fn from_name(name: &str, defaults: &BlendDefaults) -> Result<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "overlay" => Ok(Self::Overlay),
            "weighted" => Ok(Self::Weighted {
                image_weight: defaults.image_weight,
                qr_weight: defaults.qr_weight,
                gamma: 0.0,
            }),
            "alpha" => Ok(Self::Alpha {
                alpha: defaults.alpha,
            }),
            "pixelate" => Ok(Self::Pixelate {
                pixel_size: defaults.pixel_size,
                alpha: defaults.pixelate_alpha,
            }),
            other => Err(EngineError::UnknownMode(other.to_string())),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Overlay => "overlay",
            Self::Weighted { .. } => "weighted",
            Self::Alpha { .. } => "alpha",
            Self::Pixelate { .. } => "pixelate",
        }
    }

    /// QR background colour this strategy is designed around: transparent for
    /// the masked paste, opaque white for the blends.
    pub fn qr_background(&self) -> Rgba<u8> {
        match self {
            Self::Overlay => TRANSPARENT,
            _ => WHITE,
        }
    }

    pub fn validate(&self) -> Result<()> {
        match *self {
            Self::Overlay => Ok(()),
            Self::Weighted {
                image_weight,
                qr_weight,
                gamma,
            } => {
                check_unit("image_weight", image_weight)?;
                check_unit("qr_weight", qr_weight)?;
                if !gamma.is_finite() || !(-255.0..=255.0).contains(&gamma) {
                    return Err(EngineError::out_of_range("gamma", gamma, -255.0, 255.0));
                }
                Ok(())
            }
            Self::Alpha { alpha } => check_unit("alpha", alpha),
            Self::Pixelate { pixel_size, alpha } => {
                if !(1..=MAX_PIXEL_SIZE).contains(&pixel_size) {
                    return Err(EngineError::out_of_range(
                        "pixel_size",
                        pixel_size,
                        1,
                        MAX_PIXEL_SIZE,
                    ));
                }
                check_unit("alpha", alpha)
            }
        }
    }

    pub fn compositor(&self) -> Box<dyn Compositor + Send + Sync> {
        match *self {
            Self::Overlay => Box::new(CenteredOverlay),
            Self::Weighted {
                image_weight,
                qr_weight,
                gamma,
            } => Box::new(WeightedBlend {
                image_weight,
                qr_weight,
                gamma,
            }),
            Self::Alpha { alpha } => Box::new(AlphaBlend { alpha }),
            Self::Pixelate { pixel_size, alpha } => Box::new(PixelateBlend { pixel_size, alpha }),
        }
    }
}

/// Parameter defaults used when a caller picks a mode without tuning it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BlendDefaults {
    pub image_weight: f32,
    pub qr_weight: f32,
    pub alpha: f32,
    pub pixel_size: u32,
    pub pixelate_alpha: f32,
}

impl Default for BlendDefaults {
    fn default() -> Self {
        Self {
            image_weight: DEFAULT_IMAGE_WEIGHT,
            qr_weight: DEFAULT_QR_WEIGHT,
            alpha: DEFAULT_ALPHA,
            pixel_size: DEFAULT_PIXEL_SIZE,
            pixelate_alpha: DEFAULT_PIXELATE_ALPHA,
        }
    }
}

fn check_unit(field: &'static str, value: f32) -> Result<()> {
    if value.is_finite() && (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(EngineError::out_of_range(field, value, 0.0, 1.0))
    }
}

fn to_channel(v: f32) -> u8 {
    v.round().clamp(0.0, 255.0) as u8
}

/// `a * (1 - t) + b * t` per channel. Both images must share dimensions.
fn lerp(a: &RgbaImage, b: &RgbaImage, t: f32) -> RgbaImage {
    map_colors2(a, b, |p: Rgba<u8>, q: Rgba<u8>| {
        Rgba(std::array::from_fn(|c| {
            to_channel(f32::from(p[c]) * (1.0 - t) + f32::from(q[c]) * t)
        }))
    })
}

/// Paste `top` onto `base` at `(x, y)`, weighting each channel by `top`'s alpha.
/// Parts of `top` falling outside `base` are dropped.
fn paste_with_mask(base: &mut RgbaImage, top: &RgbaImage, x: u32, y: u32) {
    for (dx, dy, pixel) in top.enumerate_pixels() {
        let (tx, ty) = (x + dx, y + dy);
        if tx >= base.width() || ty >= base.height() {
            continue;
        }
        let mask = u32::from(pixel[3]);
        match mask {
            0 => {}
            255 => base.put_pixel(tx, ty, *pixel),
            _ => {
                let bg = base.get_pixel(tx, ty);
                let blended = Rgba(std::array::from_fn(|c| {
                    ((u32::from(pixel[c]) * mask + u32::from(bg[c]) * (255 - mask) + 127) / 255)
                        as u8
                }));
                base.put_pixel(tx, ty, blended);
            }
        }
    }
}
