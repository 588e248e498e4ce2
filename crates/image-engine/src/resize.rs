//! Resampling helpers used to bring two images to the same size before blending.

use image::RgbaImage;
use image::imageops::{self, FilterType};
use tracing::debug;

/// Default filter for general resizes (bicubic).
pub const DEFAULT_FILTER: FilterType = FilterType::CatmullRom;

/// Resize `img` to exactly `width` x `height`.
///
/// Returns a copy of the input unchanged if it already has the target size.
/// Zero-sized targets are clamped to 1 pixel. Images with any translucent
/// pixel are resampled in premultiplied alpha so fully transparent pixels do
/// not pull their (meaningless) colour into neighbouring edges.
pub fn resize_exact(img: &RgbaImage, width: u32, height: u32, filter: FilterType) -> RgbaImage {
    let (width, height) = (width.max(1), height.max(1));
    let (orig_w, orig_h) = img.dimensions();

    if (orig_w, orig_h) == (width, height) {
        debug!(width, height, "Image already at target size, skipping resize");
        return img.clone();
    }

    debug!(
        orig_w,
        orig_h,
        new_width = width,
        new_height = height,
        ?filter,
        "Resizing image"
    );

    if img.pixels().all(|p| p[3] == u8::MAX) {
        return imageops::resize(img, width, height, filter);
    }

    let mut resized = imageops::resize(&premultiply(img), width, height, filter);
    unpremultiply(&mut resized);
    resized
}

fn premultiply(img: &RgbaImage) -> RgbaImage {
    let mut out = img.clone();
    for p in out.pixels_mut() {
        let a = u32::from(p[3]);
        for c in 0..3 {
            p[c] = ((u32::from(p[c]) * a + 127) / 255) as u8;
        }
    }
    out
}

fn unpremultiply(img: &mut RgbaImage) {
    for p in img.pixels_mut() {
        let a = u32::from(p[3]);
        if a == 0 {
            p.0 = [0, 0, 0, 0];
            continue;
        }
        for c in 0..3 {
            p[c] = ((u32::from(p[c]) * 255 + a / 2) / a).min(255) as u8;
        }
    }
}

/// Resize `img` to match the dimensions of `target`.
pub fn resize_to_match(img: &RgbaImage, target: &RgbaImage) -> RgbaImage {
    resize_exact(img, target.width(), target.height(), DEFAULT_FILTER)
}

/// Produce blocky pixels by shrinking `img` by `pixel_size` and scaling it
/// back up with nearest-neighbour sampling.
///
/// A `pixel_size` of 0 or 1 leaves the image untouched.
pub fn pixelate(img: &RgbaImage, pixel_size: u32) -> RgbaImage {
    if pixel_size <= 1 {
        debug!(pixel_size, "Pixel size is 1, skipping pixelation");
        return img.clone();
    }

    let (w, h) = img.dimensions();
    let small_w = (w / pixel_size).max(1);
    let small_h = (h / pixel_size).max(1);
    debug!(w, h, small_w, small_h, pixel_size, "Pixelating image");

    let small = resize_exact(img, small_w, small_h, FilterType::Triangle);
    resize_exact(&small, w, h, FilterType::Nearest)
}
