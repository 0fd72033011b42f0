use anyhow::Context;

use crate::foundation::core::Raster;
use crate::foundation::error::{LayergenError, LayergenResult};

/// Largest dimension accepted for rasterized SVG sources.
const MAX_SVG_DIM: u32 = 16_384;

/// Decode encoded image bytes (PNG, JPEG, WebP, GIF, or SVG) into a premultiplied raster.
pub fn decode_image(bytes: &[u8]) -> LayergenResult<Raster> {
    if looks_like_svg(bytes) {
        let tree = parse_svg(bytes)?;
        return rasterize_svg(&tree);
    }

    let dyn_img = image::load_from_memory(bytes).context("decode image from memory")?;
    let rgba = dyn_img.to_rgba8();
    let (width, height) = rgba.dimensions();
    Raster::from_straight_rgba8(width, height, rgba.into_raw())
}

pub fn parse_svg(bytes: &[u8]) -> LayergenResult<usvg::Tree> {
    let opts = usvg::Options::default();
    let tree = usvg::Tree::from_data(bytes, &opts).context("parse svg tree")?;
    Ok(tree)
}

/// Rasterize an SVG at its intrinsic size.
pub fn rasterize_svg(tree: &usvg::Tree) -> LayergenResult<Raster> {
    fn to_px(v: f32) -> LayergenResult<u32> {
        if !v.is_finite() || v <= 0.0 {
            return Err(LayergenError::fetch("svg has invalid width/height"));
        }
        Ok((v.ceil() as u32).max(1))
    }

    let size = tree.size();
    let width = to_px(size.width())?;
    let height = to_px(size.height())?;
    if width > MAX_SVG_DIM || height > MAX_SVG_DIM {
        return Err(LayergenError::fetch(format!(
            "svg raster size too large: {width}x{height} (max {MAX_SVG_DIM}x{MAX_SVG_DIM})"
        )));
    }

    let mut pixmap = resvg::tiny_skia::Pixmap::new(width, height)
        .ok_or_else(|| LayergenError::fetch("failed to allocate svg pixmap"))?;

    let sx = (width as f32) / size.width();
    let sy = (height as f32) / size.height();
    let xform = resvg::tiny_skia::Transform::from_scale(sx, sy);

    resvg::render(tree, xform, &mut pixmap.as_mut());
    // tiny-skia pixmaps are premultiplied RGBA8 already.
    Raster::from_premul_rgba8(width, height, pixmap.data().to_vec())
}

fn looks_like_svg(bytes: &[u8]) -> bool {
    let head = String::from_utf8_lossy(&bytes[..bytes.len().min(512)]);
    let text = head.trim_start_matches('\u{feff}').trim_start();
    text.starts_with("<svg") || (text.starts_with("<?xml") && text.contains("<svg"))
}

#[cfg(test)]
#[path = "../../tests/unit/assets/decode.rs"]
mod tests;
