//! One generation action: decode upload, encode QR, composite, export PNG.

use image::{Rgba, RgbaImage};
use tracing::{debug, info};

use crate::codec::{decode_upload, encode_png};
use crate::compose::BlendMode;
use crate::error::Result;
use crate::qr::{QrRequest, generate_qr};

/// Inputs for a single generation.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationRequest {
    pub qr: QrRequest,
    pub mode: BlendMode,
}

impl GenerationRequest {
    /// Pair a QR request with a blend mode. The QR background is set to what
    /// the mode expects; use [`Self::with_background`] to override it.
    pub fn new(qr: QrRequest, mode: BlendMode) -> Self {
        let background = mode.qr_background();
        Self {
            qr: QrRequest { background, ..qr },
            mode,
        }
    }

    pub fn with_background(mut self, background: Rgba<u8>) -> Self {
        self.qr.background = background;
        self
    }

    pub fn validate(&self) -> Result<()> {
        self.qr.validate()?;
        self.mode.validate()
    }
}

/// Result of one generation. Nothing about it outlives the caller.
#[derive(Debug, Clone)]
pub struct Composite {
    pub image: RgbaImage,
    pub png: Vec<u8>,
    pub mode: &'static str,
    pub qr_modules: u32,
}

impl Composite {
    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }
}

/// Run the whole pipeline against raw upload bytes.
pub fn run(req: &GenerationRequest, upload: &[u8]) -> Result<Composite> {
    req.validate()?;
    let background = decode_upload(upload)?;
    compose_with(req, &background)
}

/// Run the pipeline against an already-decoded user image.
pub fn compose_with(req: &GenerationRequest, background: &RgbaImage) -> Result<Composite> {
    req.validate()?;

    let qr = generate_qr(&req.qr)?;
    let compositor = req.mode.compositor();
    debug!(
        mode = compositor.name(),
        qr_size = qr.image().width(),
        bg_width = background.width(),
        bg_height = background.height(),
        "Compositing"
    );

    let image = compositor.composite(qr.image(), background);
    let png = encode_png(&image)?;

    info!(
        mode = compositor.name(),
        width = image.width(),
        height = image.height(),
        bytes = png.len(),
        "Composite generated"
    );

    Ok(Composite {
        image,
        png,
        mode: compositor.name(),
        qr_modules: qr.modules(),
    })
}
