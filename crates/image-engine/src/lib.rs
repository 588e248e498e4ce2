//! QR code generation and compositing with user images.
//!
//! Encodes text as a QR bitmap at error-correction level H, merges it with an
//! uploaded image using one of four strategies (centred overlay, weighted
//! blend, alpha blend, pixelation blend) and exports the result as PNG.

pub mod codec;
pub mod compose;
pub mod error;
pub mod pipeline;
pub mod qr;
pub mod resize;

pub use image;

// Re-exports for convenience
pub use codec::{DOWNLOAD_FILENAME, DOWNLOAD_MIME, decode_upload, encode_png};
pub use compose::{
    AlphaBlend, BlendDefaults, BlendMode, CenteredOverlay, Compositor, PixelateBlend, WeightedBlend,
};
pub use error::EngineError;
pub use pipeline::{Composite, GenerationRequest, compose_with, run};
pub use qr::{QrBitmap, QrRequest, generate_qr, parse_color};
