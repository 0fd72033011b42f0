use crate::foundation::core::{Raster, Rect};
use crate::foundation::math::mul_div255_u8;
use crate::geometry::raster::{EdgeMode, sample_bilinear};

pub type PremulRgba8 = [u8; 4];

/// Source-over for premultiplied pixels.
pub fn over(dst: PremulRgba8, src: PremulRgba8) -> PremulRgba8 {
    if src[3] == 0 {
        return dst;
    }
    if src[3] == 255 {
        return src;
    }

    let inv = 255u16 - u16::from(src[3]);
    let mut out = [0u8; 4];
    for i in 0..4 {
        out[i] = src[i].saturating_add(mul_div255_u8(u16::from(dst[i]), inv));
    }
    out
}

/// Blend `src` onto `dst` 1:1 with its top-left corner at `(x, y)`, clipped to `dst`.
pub fn composite_at(dst: &mut Raster, src: &Raster, x: i64, y: i64) {
    let dw = i64::from(dst.width());
    let dh = i64::from(dst.height());
    let sw = i64::from(src.width());
    let sh = i64::from(src.height());

    let x0 = x.max(0);
    let y0 = y.max(0);
    let x1 = (x + sw).min(dw);
    let y1 = (y + sh).min(dh);
    if x0 >= x1 || y0 >= y1 {
        return;
    }

    let dst_stride = dw as usize * 4;
    let src_stride = sw as usize * 4;
    let span = (x1 - x0) as usize * 4;
    let src_data = src.data();
    let dst_data = dst.data_mut();
    for dy in y0..y1 {
        let sy = (dy - y) as usize;
        let d_off = dy as usize * dst_stride + x0 as usize * 4;
        let s_off = sy * src_stride + (x0 - x) as usize * 4;
        let d_row = &mut dst_data[d_off..d_off + span];
        let s_row = &src_data[s_off..s_off + span];
        for (d, s) in d_row.chunks_exact_mut(4).zip(s_row.chunks_exact(4)) {
            let out = over([d[0], d[1], d[2], d[3]], [s[0], s[1], s[2], s[3]]);
            d.copy_from_slice(&out);
        }
    }
}

/// Resample `src` to fill `rect` (canvas pixels) and blend it onto `dst`.
///
/// Covers exactly the pixels whose centers fall inside `rect`; samples bilinearly with edge
/// clamping, so an integer-aligned 1:1 placement copies pixels unchanged.
pub fn draw_raster_into_rect(dst: &mut Raster, src: &Raster, rect: Rect) {
    let rect = rect.abs();
    let (rw, rh) = (rect.width(), rect.height());
    if src.is_empty() || !rw.is_finite() || !rh.is_finite() || rw <= 0.0 || rh <= 0.0 {
        return;
    }
    if src.width() == 1 && src.height() == 1 && src.pixel(0, 0)[3] == 0 {
        return;
    }

    let px0 = first_covered(rect.x0).max(0.0);
    let py0 = first_covered(rect.y0).max(0.0);
    let px1 = first_covered(rect.x1).min(f64::from(dst.width()));
    let py1 = first_covered(rect.y1).min(f64::from(dst.height()));
    if px0 >= px1 || py0 >= py1 {
        return;
    }

    let sx = f64::from(src.width()) / rw;
    let sy = f64::from(src.height()) / rh;
    for py in py0 as u32..py1 as u32 {
        let v = (f64::from(py) + 0.5 - rect.y0) * sy;
        for px in px0 as u32..px1 as u32 {
            let u = (f64::from(px) + 0.5 - rect.x0) * sx;
            let s = sample_bilinear(src, u, v, EdgeMode::Clamp);
            if s[3] == 0 {
                continue;
            }
            let d = dst.pixel(px, py);
            dst.set_pixel(px, py, over(d, s));
        }
    }
}

/// Index of the first pixel whose center is at or after `edge`.
fn first_covered(edge: f64) -> f64 {
    (edge - 0.5).ceil()
}

#[cfg(test)]
#[path = "../../tests/unit/render/composite.rs"]
mod tests;
