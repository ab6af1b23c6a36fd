use std::io::Cursor;

use anyhow::Context;
use image::{ImageFormat, Rgba, RgbaImage};
use tracing::info;

pub(crate) const WIDTH: u32 = 1280;
pub(crate) const HEIGHT: u32 = 720;

const DEFAULT_TOP: Rgba<u8> = Rgba([0x43, 0xc6, 0xac, 0xff]);
const DEFAULT_BOTTOM: Rgba<u8> = Rgba([0x19, 0x16, 0x54, 0xff]);

/// `RRGGBB` or `RRGGBBAA`, with or without `#`. Anything else is opaque black;
/// a pair that is not hex reads as zero.
pub(crate) fn parse_hex_color(hex: &str) -> Rgba<u8> {
    let hex = hex.trim().trim_start_matches('#');
    let channel = |at: usize| {
        hex.get(at..at + 2)
            .and_then(|pair| u8::from_str_radix(pair, 16).ok())
            .unwrap_or(0)
    };

    match hex.len() {
        6 => Rgba([channel(0), channel(2), channel(4), 0xff]),
        8 => Rgba([channel(0), channel(2), channel(4), channel(6)]),
        _ => Rgba([0, 0, 0, 0xff]),
    }
}

fn lerp(from: Rgba<u8>, to: Rgba<u8>, t: f64) -> Rgba<u8> {
    let mut out = [0u8; 4];
    for (i, slot) in out.iter_mut().enumerate() {
        let value = f64::from(from.0[i]) * (1.0 - t) + f64::from(to.0[i]) * t;
        *slot = value as u8;
    }
    Rgba(out)
}

/// Vertical gradient, `top` on the first row and `bottom` on the last.
pub(crate) fn gradient(top: Rgba<u8>, bottom: Rgba<u8>, width: u32, height: u32) -> RgbaImage {
    let last_row = f64::from(height.saturating_sub(1).max(1));
    RgbaImage::from_fn(width, height, |_, y| lerp(top, bottom, f64::from(y) / last_row))
}

pub(crate) fn render_png(colors: Option<(&str, &str)>) -> anyhow::Result<Vec<u8>> {
    let (top, bottom) = match colors {
        Some((top, bottom)) => (parse_hex_color(top), parse_hex_color(bottom)),
        None => (DEFAULT_TOP, DEFAULT_BOTTOM),
    };

    let mut png_bytes = Vec::new();
    gradient(top, bottom, WIDTH, HEIGHT)
        .write_to(&mut Cursor::new(&mut png_bytes), ImageFormat::Png)
        .context("failed to encode background as png")?;
    info!(?top, ?bottom, "created background");

    Ok(png_bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_colors_accept_optional_hash_and_alpha() {
        assert_eq!(parse_hex_color("#43c6ac"), DEFAULT_TOP);
        assert_eq!(parse_hex_color("191654"), DEFAULT_BOTTOM);
        assert_eq!(parse_hex_color("#11223380"), Rgba([0x11, 0x22, 0x33, 0x80]));
    }

    #[test]
    fn malformed_hex_is_black_or_zeroed() {
        assert_eq!(parse_hex_color("red"), Rgba([0, 0, 0, 0xff]));
        assert_eq!(parse_hex_color(""), Rgba([0, 0, 0, 0xff]));
        assert_eq!(parse_hex_color("zz8000"), Rgba([0, 0x80, 0, 0xff]));
    }

    #[test]
    fn gradient_runs_from_top_to_bottom() {
        let img = gradient(Rgba([0, 0, 0, 255]), Rgba([200, 100, 50, 255]), 4, 3);
        assert_eq!(img.dimensions(), (4, 3));
        assert_eq!(*img.get_pixel(3, 0), Rgba([0, 0, 0, 255]));
        assert_eq!(*img.get_pixel(0, 1), Rgba([100, 50, 25, 255]));
        assert_eq!(*img.get_pixel(2, 2), Rgba([200, 100, 50, 255]));
    }

    #[test]
    fn renders_a_png() {
        let bytes = render_png(None).unwrap();
        assert!(bytes.starts_with(b"\x89PNG\r\n\x1a\n"));
        let decoded = image::load_from_memory_with_format(&bytes, ImageFormat::Png).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (WIDTH, HEIGHT));
    }
}
