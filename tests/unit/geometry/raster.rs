use super::*;

fn checker() -> Raster {
    // 2x1: opaque red, opaque blue.
    Raster::from_premul_rgba8(2, 1, vec![255, 0, 0, 255, 0, 0, 255, 255]).unwrap()
}

#[test]
fn sampling_at_pixel_centers_is_exact() {
    let r = checker();
    assert_eq!(sample_bilinear(&r, 0.5, 0.5, EdgeMode::Clamp), [255, 0, 0, 255]);
    assert_eq!(sample_bilinear(&r, 1.5, 0.5, EdgeMode::Transparent), [0, 0, 255, 255]);
}

#[test]
fn sampling_between_centers_blends() {
    let r = checker();
    assert_eq!(sample_bilinear(&r, 1.0, 0.5, EdgeMode::Clamp), [128, 0, 128, 255]);
}

#[test]
fn transparent_edges_fade_and_clamp_edges_repeat() {
    let r = checker();
    let faded = sample_bilinear(&r, 0.0, 0.5, EdgeMode::Transparent);
    assert_eq!(faded, [128, 0, 0, 128]);
    let clamped = sample_bilinear(&r, 0.0, 0.5, EdgeMode::Clamp);
    assert_eq!(clamped, [255, 0, 0, 255]);
    assert_eq!(sample_bilinear(&r, -5.0, -5.0, EdgeMode::Transparent), [0; 4]);
}

#[test]
fn non_finite_coordinates_are_transparent() {
    let r = checker();
    assert_eq!(sample_bilinear(&r, f64::NAN, 0.5, EdgeMode::Clamp), [0; 4]);
}
