use super::*;

fn solid(w: u32, h: u32, px: [u8; 4]) -> Raster {
    let data = px.iter().copied().cycle().take((w * h * 4) as usize).collect();
    Raster::from_premul_rgba8(w, h, data).unwrap()
}

#[test]
fn over_src_alpha_0_is_noop() {
    let dst = [10, 20, 30, 40];
    assert_eq!(over(dst, [0, 0, 0, 0]), dst);
}

#[test]
fn over_src_opaque_replaces_dst() {
    assert_eq!(over([10, 20, 30, 255], [1, 2, 3, 255]), [1, 2, 3, 255]);
}

#[test]
fn over_half_alpha_mixes() {
    let out = over([0, 0, 255, 255], [128, 0, 0, 128]);
    assert_eq!(out, [128, 0, 127, 255]);
}

#[test]
fn over_dst_transparent_returns_src() {
    assert_eq!(over([0, 0, 0, 0], [50, 40, 30, 100]), [50, 40, 30, 100]);
}

#[test]
fn composite_at_clips_to_destination() {
    let mut dst = Raster::new(4, 4).unwrap();
    let src = solid(3, 3, [255, 0, 0, 255]);
    composite_at(&mut dst, &src, -1, 2);
    assert_eq!(dst.pixel(0, 2), [255, 0, 0, 255]);
    assert_eq!(dst.pixel(1, 3), [255, 0, 0, 255]);
    assert_eq!(dst.pixel(2, 2), [0, 0, 0, 0]);
    assert_eq!(dst.pixel(0, 1), [0, 0, 0, 0]);

    let before = dst.clone();
    composite_at(&mut dst, &src, 10, 10);
    assert_eq!(dst, before);
}

#[test]
fn one_to_one_integer_placement_is_exact() {
    let src = Raster::from_premul_rgba8(
        2,
        2,
        vec![255, 0, 0, 255, 0, 255, 0, 255, 0, 0, 255, 255, 10, 20, 30, 40],
    )
    .unwrap();
    let mut dst = Raster::new(5, 5).unwrap();
    draw_raster_into_rect(&mut dst, &src, Rect::new(2.0, 1.0, 4.0, 3.0));
    assert_eq!(dst.pixel(2, 1), [255, 0, 0, 255]);
    assert_eq!(dst.pixel(3, 1), [0, 255, 0, 255]);
    assert_eq!(dst.pixel(2, 2), [0, 0, 255, 255]);
    assert_eq!(dst.pixel(3, 2), [10, 20, 30, 40]);
    assert_eq!(dst.pixel(1, 1), [0, 0, 0, 0]);
    assert_eq!(dst.pixel(4, 1), [0, 0, 0, 0]);
    assert_eq!(dst.pixel(2, 3), [0, 0, 0, 0]);
}

#[test]
fn upscaling_fills_the_whole_rect() {
    let src = solid(1, 1, [0, 255, 0, 255]);
    let mut dst = Raster::new(10, 10).unwrap();
    draw_raster_into_rect(&mut dst, &src, Rect::new(2.0, 3.0, 8.0, 7.0));
    for y in 0..10 {
        for x in 0..10 {
            let inside = (2..8).contains(&x) && (3..7).contains(&y);
            let expected = if inside { [0, 255, 0, 255] } else { [0; 4] };
            assert_eq!(dst.pixel(x, y), expected, "({x},{y})");
        }
    }
}

#[test]
fn fractional_rect_covers_pixels_by_center() {
    let src = solid(4, 4, [255, 255, 255, 255]);
    let mut dst = Raster::new(6, 1).unwrap();
    draw_raster_into_rect(&mut dst, &src, Rect::new(0.6, 0.0, 3.4, 1.0));
    // Centers at 0.5 and 3.5 fall outside [0.6, 3.4).
    assert_eq!(dst.pixel(0, 0)[3], 0);
    assert_eq!(dst.pixel(1, 0)[3], 255);
    assert_eq!(dst.pixel(2, 0)[3], 255);
    assert_eq!(dst.pixel(3, 0)[3], 0);
}

#[test]
fn degenerate_rects_draw_nothing() {
    let src = solid(2, 2, [255, 255, 255, 255]);
    let mut dst = Raster::new(4, 4).unwrap();
    draw_raster_into_rect(&mut dst, &src, Rect::new(1.0, 1.0, 1.0, 3.0));
    draw_raster_into_rect(&mut dst, &src, Rect::new(1.0, 1.0, f64::INFINITY, 3.0));
    draw_raster_into_rect(&mut dst, &src, Rect::new(-10.0, -10.0, -5.0, -5.0));
    assert!(dst.is_fully_transparent());
}

#[test]
fn later_draw_overpaints_earlier() {
    let mut dst = Raster::new(2, 2).unwrap();
    draw_raster_into_rect(&mut dst, &solid(1, 1, [255, 0, 0, 255]), Rect::new(0.0, 0.0, 2.0, 2.0));
    draw_raster_into_rect(&mut dst, &solid(1, 1, [0, 0, 255, 255]), Rect::new(1.0, 0.0, 2.0, 2.0));
    assert_eq!(dst.pixel(0, 0), [255, 0, 0, 255]);
    assert_eq!(dst.pixel(1, 1), [0, 0, 255, 255]);
}
