//! End-to-end: every blend mode must yield a PNG whose QR still scans.

use image::{Rgba, RgbaImage};
use image_engine::{BlendDefaults, BlendMode, GenerationRequest, QrRequest, encode_png, run};

const PAYLOAD: &str = "https://example.com";

/// A soft, light gradient standing in for a user photo.
fn light_photo(size: u32) -> Vec<u8> {
    let img = RgbaImage::from_fn(size, size, |x, y| {
        Rgba([
            (180 + x * 75 / size) as u8,
            (200 + y * 55 / size) as u8,
            (230 - (x + y) * 30 / (2 * size)) as u8,
            255,
        ])
    });
    encode_png(&img).unwrap()
}

fn scan(png: &[u8]) -> Vec<String> {
    let gray = image::load_from_memory(png).unwrap().to_luma8();
    let (w, h) = gray.dimensions();
    let mut prepared = rqrr::PreparedImage::prepare_from_greyscale(w as usize, h as usize, |x, y| {
        gray.get_pixel(x as u32, y as u32)[0]
    });
    prepared
        .detect_grids()
        .iter()
        .filter_map(|grid| grid.decode().ok())
        .map(|(_, content)| content)
        .collect()
}

fn assert_scans(png: &[u8]) {
    let found = scan(png);
    assert!(
        found.iter().any(|content| content == PAYLOAD),
        "expected {PAYLOAD:?}, scanned {found:?}"
    );
}

fn generate(mode: BlendMode, upload_size: u32) -> Vec<u8> {
    let req = GenerationRequest::new(QrRequest::new(PAYLOAD), mode);
    let composite = run(&req, &light_photo(upload_size)).unwrap();
    assert_eq!(&composite.png[..8], b"\x89PNG\r\n\x1a\n");
    composite.png
}

fn mode(name: &str) -> BlendMode {
    BlendMode::from_name(name, &BlendDefaults::default()).unwrap()
}

#[test]
fn every_mode_produces_a_decodable_png() {
    for name in BlendMode::NAMES {
        let png = generate(mode(name), 300);
        let decoded = image::load_from_memory(&png).unwrap();
        assert!(decoded.width() > 0 && decoded.height() > 0, "{name}");
    }
}

#[test]
fn weighted_blend_scans() {
    let png = generate(mode("weighted"), 300);
    assert_scans(&png);
}

#[test]
fn alpha_blend_scans() {
    let png = generate(mode("alpha"), 300);
    assert_scans(&png);
}

#[test]
fn pixelate_blend_scans() {
    let png = generate(mode("pixelate"), 300);
    assert_scans(&png);
}

#[test]
fn overlay_scans() {
    // 300 px background: the QR shrinks to 100 px, under 3 px per module.
    let png = generate(mode("overlay"), 300);
    assert_scans(&png);
}

#[test]
fn overlay_scans_on_large_background() {
    let png = generate(mode("overlay"), 900);
    assert_scans(&png);
}
