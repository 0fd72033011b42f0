use super::*;

#[test]
fn new_raster_is_transparent_with_exact_len() {
    let r = Raster::new(3, 2).unwrap();
    assert_eq!(r.width(), 3);
    assert_eq!(r.height(), 2);
    assert_eq!(r.data().len(), 3 * 2 * 4);
    assert!(r.is_fully_transparent());
}

#[test]
fn from_premul_rejects_len_mismatch() {
    assert!(Raster::from_premul_rgba8(2, 2, vec![0; 15]).is_err());
    assert!(Raster::from_premul_rgba8(2, 2, vec![0; 16]).is_ok());
}

#[test]
fn straight_roundtrip_is_exact_for_opaque_and_transparent() {
    let src = vec![10, 20, 30, 255, 200, 100, 50, 0];
    let r = Raster::from_straight_rgba8(2, 1, src).unwrap();
    assert_eq!(r.pixel(0, 0), [10, 20, 30, 255]);
    assert_eq!(r.pixel(1, 0), [0, 0, 0, 0]);
    assert_eq!(r.to_straight_rgba8(), vec![10, 20, 30, 255, 0, 0, 0, 0]);
}

#[test]
fn premultiply_half_alpha() {
    let r = Raster::from_straight_rgba8(1, 1, vec![100, 50, 200, 128]).unwrap();
    assert_eq!(
        r.pixel(0, 0),
        [
            ((100u16 * 128 + 127) / 255) as u8,
            ((50u16 * 128 + 127) / 255) as u8,
            ((200u16 * 128 + 127) / 255) as u8,
            128
        ]
    );
    let straight = r.straight_pixel(0, 0);
    assert!((i32::from(straight[0]) - 100).abs() <= 1);
    assert!((i32::from(straight[2]) - 200).abs() <= 1);
}

#[test]
fn out_of_bounds_pixel_is_transparent() {
    let mut r = Raster::new(1, 1).unwrap();
    r.set_pixel(5, 5, [1, 2, 3, 4]);
    assert_eq!(r.pixel(5, 5), [0; 4]);
    assert!(r.is_fully_transparent());
}

#[test]
fn rgba8_to_premul() {
    assert_eq!(
        Rgba8::WHITE.to_premul(),
        Rgba8Premul {
            r: 255,
            g: 255,
            b: 255,
            a: 255
        }
    );
    assert_eq!(Rgba8::TRANSPARENT.to_premul(), Rgba8Premul::transparent());
}
