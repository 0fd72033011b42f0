use crate::foundation::core::Raster;

/// What a sample outside the source reads.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EdgeMode {
    /// Out-of-bounds texels are transparent, so edges fade out.
    Transparent,
    /// Out-of-bounds texels repeat the nearest edge texel.
    Clamp,
}

/// Bilinear sample of a premultiplied raster at continuous coordinates.
///
/// Pixel `(i, j)` has its center at `(i + 0.5, j + 0.5)`; sampling exactly at a center returns
/// that pixel unchanged.
pub fn sample_bilinear(src: &Raster, x: f64, y: f64, edge: EdgeMode) -> [u8; 4] {
    if src.is_empty() || !x.is_finite() || !y.is_finite() {
        return [0; 4];
    }

    let fx = x - 0.5;
    let fy = y - 0.5;
    let x0 = fx.floor();
    let y0 = fy.floor();
    let tx = (fx - x0) as f32;
    let ty = (fy - y0) as f32;
    let (x0, y0) = (x0 as i64, y0 as i64);

    let p00 = texel(src, x0, y0, edge);
    let p10 = texel(src, x0 + 1, y0, edge);
    let p01 = texel(src, x0, y0 + 1, edge);
    let p11 = texel(src, x0 + 1, y0 + 1, edge);

    let w00 = (1.0 - tx) * (1.0 - ty);
    let w10 = tx * (1.0 - ty);
    let w01 = (1.0 - tx) * ty;
    let w11 = tx * ty;

    let mut out = [0u8; 4];
    for c in 0..4 {
        let v = f32::from(p00[c]) * w00
            + f32::from(p10[c]) * w10
            + f32::from(p01[c]) * w01
            + f32::from(p11[c]) * w11;
        out[c] = v.round().clamp(0.0, 255.0) as u8;
    }
    // Keep the premultiplied invariant after rounding.
    for c in 0..3 {
        out[c] = out[c].min(out[3]);
    }
    out
}

fn texel(src: &Raster, x: i64, y: i64, edge: EdgeMode) -> [u8; 4] {
    let w = i64::from(src.width());
    let h = i64::from(src.height());
    match edge {
        EdgeMode::Transparent => {
            if x < 0 || y < 0 || x >= w || y >= h {
                [0; 4]
            } else {
                src.pixel(x as u32, y as u32)
            }
        }
        EdgeMode::Clamp => src.pixel(x.clamp(0, w - 1) as u32, y.clamp(0, h - 1) as u32),
    }
}

#[cfg(test)]
#[path = "../../tests/unit/geometry/raster.rs"]
mod tests;
