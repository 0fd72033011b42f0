use super::*;

fn opaque(w: u32, h: u32, px: [u8; 4]) -> Raster {
    let data = px.iter().copied().cycle().take((w * h * 4) as usize).collect();
    Raster::from_premul_rgba8(w, h, data).unwrap()
}

fn alpha_sum(r: &Raster) -> u64 {
    r.data().chunks_exact(4).map(|p| u64::from(p[3])).sum()
}

#[test]
fn zero_params_are_identity() {
    let src = opaque(8, 6, [10, 20, 30, 255]);
    let out = apply(src.clone(), &GeometryParams::default()).unwrap();
    assert_eq!(out.skew, SkewPlan::Identity);
    assert_eq!(out.raster, src);
    assert!(GeometryParams::default().is_identity());
}

#[test]
fn radius_zero_and_negative_leave_pixels_untouched() {
    let src = opaque(8, 8, [255, 0, 0, 255]);
    let mut r = src.clone();
    round_corners(&mut r, 0.0);
    assert_eq!(r, src);
    round_corners(&mut r, -3.0);
    assert_eq!(r, src);
    round_corners(&mut r, f64::NAN);
    assert_eq!(r, src);
}

#[test]
fn rounding_clears_corners_and_keeps_edges() {
    let mut r = opaque(20, 20, [255, 255, 255, 255]);
    round_corners(&mut r, 5.0);
    assert_eq!(r.pixel(0, 0), [0, 0, 0, 0]);
    assert_eq!(r.pixel(19, 19), [0, 0, 0, 0]);
    assert_eq!(r.pixel(0, 10), [255, 255, 255, 255]);
    assert_eq!(r.pixel(10, 0), [255, 255, 255, 255]);
    assert_eq!(r.pixel(10, 10), [255, 255, 255, 255]);

    // Antialiased rim: some corner-region pixel is partially covered.
    let partial = (0..5)
        .flat_map(|y| (0..5).map(move |x| (x, y)))
        .any(|(x, y)| {
            let a = r.pixel(x, y)[3];
            a > 0 && a < 255
        });
    assert!(partial);
}

#[test]
fn oversized_radius_is_clamped_to_half_the_short_side() {
    let mut r = opaque(10, 20, [0, 0, 255, 255]);
    round_corners(&mut r, 1000.0);
    assert_eq!(r.pixel(0, 0)[3], 0);
    assert_eq!(r.pixel(5, 10), [0, 0, 255, 255]);
    assert_eq!(r.pixel(0, 10), [0, 0, 255, 255]);
}

#[test]
fn rounding_keeps_premultiplied_invariant() {
    let mut r = opaque(12, 12, [200, 100, 50, 255]);
    round_corners(&mut r, 6.0);
    for p in r.data().chunks_exact(4) {
        assert!(p[0] <= p[3] && p[1] <= p[3] && p[2] <= p[3]);
    }
}

#[test]
fn skew_plan_classifies_angles() {
    assert_eq!(skew_plan(0.0, 0.0), SkewPlan::Identity);
    assert_eq!(skew_plan(90.0, 0.0), SkewPlan::Degenerate);
    assert_eq!(skew_plan(0.0, -89.5), SkewPlan::Degenerate);
    assert_eq!(skew_plan(270.2, 0.0), SkewPlan::Degenerate);
    assert_eq!(skew_plan(f64::NAN, 0.0), SkewPlan::Degenerate);
    // kx = ky = 1 makes the shear singular.
    assert_eq!(skew_plan(45.0, 45.0), SkewPlan::Degenerate);
    assert!(matches!(skew_plan(30.0, 0.0), SkewPlan::Shear(_)));
    assert!(matches!(skew_plan(0.0, 180.0 + 20.0), SkewPlan::Shear(_)));
}

#[test]
fn shear_grows_output_to_bounding_box() {
    let src = opaque(10, 10, [255, 255, 255, 255]);
    let out = apply(src, &GeometryParams::new(0.0, 45.0, 0.0)).unwrap();
    assert!(matches!(out.skew, SkewPlan::Shear(_)));
    assert_eq!((out.raster.width(), out.raster.height()), (20, 10));

    // Top row stays left, bottom row shifts right by the full height.
    assert!(out.raster.pixel(1, 0)[3] > 200);
    assert_eq!(out.raster.pixel(18, 0)[3], 0);
    assert_eq!(out.raster.pixel(1, 9)[3], 0);
    assert!(out.raster.pixel(18, 9)[3] > 200);
}

#[test]
fn vertical_shear_grows_height() {
    let src = opaque(10, 4, [255, 255, 255, 255]);
    let out = apply(src, &GeometryParams::new(0.0, 0.0, 30.0)).unwrap();
    assert_eq!(out.raster.width(), 10);
    assert_eq!(out.raster.height(), 4 + (10.0 * tan_deg(30.0)).ceil() as u32);
}

#[test]
fn shear_roughly_preserves_coverage() {
    let src = opaque(20, 20, [255, 255, 255, 255]);
    let before = alpha_sum(&src) as f64;
    let out = apply(src, &GeometryParams::new(0.0, 20.0, 0.0)).unwrap();
    let after = alpha_sum(&out.raster) as f64;
    assert!((after - before).abs() / before < 0.1, "{before} vs {after}");
}

#[test]
fn degenerate_skew_returns_rounded_source() {
    let src = opaque(6, 6, [1, 2, 3, 255]);
    let out = apply(src.clone(), &GeometryParams::new(0.0, 90.0, 0.0)).unwrap();
    assert!(out.skew_degraded());
    assert_eq!(out.raster, src);
}

#[test]
fn negative_skew_shifts_origin() {
    let src = opaque(4, 4, [255, 255, 255, 255]);
    let out = apply(src, &GeometryParams::new(0.0, -45.0, 0.0)).unwrap();
    assert_eq!((out.raster.width(), out.raster.height()), (8, 4));
    assert!(out.raster.pixel(6, 0)[3] > 200);
    assert!(out.raster.pixel(1, 3)[3] > 200);
}

#[test]
fn skew_output_is_capped_by_side_and_area() {
    let side = f64::from(MAX_CANVAS_DIM);
    assert!(skew_bounds_fit(100.0, 100.0));
    assert!(skew_bounds_fit(side, side / 4.0));
    assert!(!skew_bounds_fit(side + 1.0, 1.0));
    // Each side fits, but the total would be a ~1 GiB buffer.
    assert!(!skew_bounds_fit(side, side));
    assert!(!skew_bounds_fit(side / 2.0 + 1.0, side / 2.0 + 1.0));
}

#[test]
fn identity_params_skip_all_work() {
    let src = opaque(3, 3, [9, 9, 9, 255]);
    let params = GeometryParams::new(0.0, 0.0, 0.0);
    assert!(params.is_identity());
    assert!(!GeometryParams::new(2.0, 0.0, 0.0).is_identity());
    assert!(!GeometryParams::new(0.0, 0.0, 5.0).is_identity());
    let out = apply(src.clone(), &params).unwrap();
    assert_eq!(out.raster, src);
    assert_eq!(out.skew, SkewPlan::Identity);
}
