use crate::foundation::core::{Affine, Point, Raster, Rect};
use crate::foundation::error::LayergenResult;
use crate::foundation::math::tan_deg;
use crate::geometry::raster::{EdgeMode, sample_bilinear};
use crate::layer::model::MAX_CANVAS_DIM;

/// Angles closer than this to ±90° (mod 180) are degenerate.
const SKEW_POLE_MARGIN_DEG: f64 = 1.0;
/// Minimum `|1 - kx·ky|` for an invertible shear.
const MIN_SHEAR_DET: f64 = 1e-3;
/// Largest pixel count of a skewed intermediate raster.
const MAX_SKEW_PIXELS: f64 = (MAX_CANVAS_DIM as f64) * (MAX_CANVAS_DIM as f64) / 4.0;

/// Per-picture geometry. Angles are in degrees, radius in source pixels.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct GeometryParams {
    pub radius: f64,
    pub skew_x_deg: f64,
    pub skew_y_deg: f64,
}

/// How the skew step was resolved.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum SkewPlan {
    /// Both angles are zero; no resampling.
    Identity,
    /// Angles were unusable; treated as identity.
    Degenerate,
    /// Shear `x' = x + kx·y`, `y' = y + ky·x`.
    Shear(Affine),
}

/// Output of [`apply`].
#[derive(Clone, Debug, PartialEq)]
pub struct Transformed {
    pub raster: Raster,
    pub skew: SkewPlan,
}

/// Round corners, then skew.
pub fn apply(src: Raster, params: &GeometryParams) -> LayergenResult<Transformed> {
    if params.is_identity() {
        return Ok(Transformed {
            raster: src,
            skew: SkewPlan::Identity,
        });
    }
    let mut raster = src;
    round_corners(&mut raster, params.radius);

    let mut skew = skew_plan(params.skew_x_deg, params.skew_y_deg);
    if let SkewPlan::Shear(affine) = skew {
        match skew_raster(&raster, affine)? {
            Some(skewed) => raster = skewed,
            None => {
                tracing::warn!(
                    skew_x = params.skew_x_deg,
                    skew_y = params.skew_y_deg,
                    "skewed bounds exceed raster limits, skew ignored"
                );
                skew = SkewPlan::Degenerate;
            }
        }
    }
    Ok(Transformed { raster, skew })
}

/// Resolve skew angles to a shear, or to identity when zero or degenerate.
pub fn skew_plan(skew_x_deg: f64, skew_y_deg: f64) -> SkewPlan {
    if skew_x_deg == 0.0 && skew_y_deg == 0.0 {
        return SkewPlan::Identity;
    }
    if near_pole(skew_x_deg) || near_pole(skew_y_deg) {
        tracing::warn!(skew_x = skew_x_deg, skew_y = skew_y_deg, "skew angle near 90 degrees, skew ignored");
        return SkewPlan::Degenerate;
    }
    let kx = tan_deg(skew_x_deg);
    let ky = tan_deg(skew_y_deg);
    if !kx.is_finite() || !ky.is_finite() || (1.0 - kx * ky).abs() < MIN_SHEAR_DET {
        tracing::warn!(kx, ky, "degenerate shear, skew ignored");
        return SkewPlan::Degenerate;
    }
    SkewPlan::Shear(Affine::new([1.0, ky, kx, 1.0, 0.0, 0.0]))
}

fn near_pole(deg: f64) -> bool {
    !deg.is_finite() || (deg.rem_euclid(180.0) - 90.0).abs() < SKEW_POLE_MARGIN_DEG
}

/// Multiply the raster by an antialiased rounded-rectangle coverage mask.
///
/// The radius is clamped to half the smaller side. Pixels whose centers are at least half a
/// pixel inside the shape keep their exact values.
pub fn round_corners(raster: &mut Raster, radius: f64) {
    if !radius.is_finite() || radius <= 0.0 || raster.is_empty() {
        return;
    }
    let w = f64::from(raster.width());
    let h = f64::from(raster.height());
    let r = radius.min(w / 2.0).min(h / 2.0);
    let (hw, hh) = (w / 2.0, h / 2.0);

    let width = raster.width() as usize;
    for (i, px) in raster.data_mut().chunks_exact_mut(4).enumerate() {
        let cx = (i % width) as f64 + 0.5;
        let cy = (i / width) as f64 + 0.5;
        let qx = (cx - hw).abs() - (hw - r);
        let qy = (cy - hh).abs() - (hh - r);
        let outside = qx.max(0.0).hypot(qy.max(0.0));
        let dist = outside + qx.max(qy).min(0.0) - r;
        let coverage = (0.5 - dist).clamp(0.0, 1.0);
        if coverage >= 1.0 {
            continue;
        }
        for c in px.iter_mut() {
            *c = (f64::from(*c) * coverage).round() as u8;
        }
    }
}

/// Shear `src` into a raster sized to the transformed bounding box.
///
/// Returns `Ok(None)` when the bounding box would exceed the side or area limit.
pub fn skew_raster(src: &Raster, affine: Affine) -> LayergenResult<Option<Raster>> {
    if src.is_empty() {
        return Ok(Some(src.clone()));
    }
    let bounds = Rect::new(0.0, 0.0, f64::from(src.width()), f64::from(src.height()));
    let bbox = affine.transform_rect_bbox(bounds);
    let ox = bbox.x0.floor();
    let oy = bbox.y0.floor();
    let out_w = (bbox.x1.ceil() - ox).max(1.0);
    let out_h = (bbox.y1.ceil() - oy).max(1.0);
    if !skew_bounds_fit(out_w, out_h) {
        return Ok(None);
    }

    let inv = affine.inverse();
    let mut out = Raster::new(out_w as u32, out_h as u32)?;
    let width = out.width() as usize;
    for (i, px) in out.data_mut().chunks_exact_mut(4).enumerate() {
        let p = Point::new(ox + (i % width) as f64 + 0.5, oy + (i / width) as f64 + 0.5);
        let s = inv * p;
        px.copy_from_slice(&sample_bilinear(src, s.x, s.y, EdgeMode::Transparent));
    }
    Ok(Some(out))
}

/// Whether a `w x h` skew output stays within the per-side and total pixel limits.
pub(crate) fn skew_bounds_fit(w: f64, h: f64) -> bool {
    let side = f64::from(MAX_CANVAS_DIM);
    w <= side && h <= side && w * h <= MAX_SKEW_PIXELS
}

impl GeometryParams {
    pub fn new(radius: f64, skew_x_deg: f64, skew_y_deg: f64) -> Self {
        Self {
            radius,
            skew_x_deg,
            skew_y_deg,
        }
    }

    pub fn is_identity(&self) -> bool {
        self.radius <= 0.0 && self.skew_x_deg == 0.0 && self.skew_y_deg == 0.0
    }
}

impl Transformed {
    pub fn skew_degraded(&self) -> bool {
        matches!(self.skew, SkewPlan::Degenerate)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/geometry/transform.rs"]
mod tests;
