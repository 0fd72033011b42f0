use base64::Engine as _;

use super::*;

fn scratch_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir()
        .join("layergen_png_tests")
        .join(format!("{name}_{}", std::process::id()));
    let _ = std::fs::remove_dir_all(&dir);
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

fn sample() -> Raster {
    Raster::from_straight_rgba8(
        2,
        1,
        vec![255, 0, 0, 255, 0, 0, 255, 0],
    )
    .unwrap()
}

#[test]
fn encode_round_trips_dimensions_and_pixels() {
    let bytes = PngCodec.encode(&sample()).unwrap();
    assert!(bytes.starts_with(b"\x89PNG"));
    let img = image::load_from_memory(&bytes).unwrap().to_rgba8();
    assert_eq!(img.dimensions(), (2, 1));
    assert_eq!(img.get_pixel(0, 0).0, [255, 0, 0, 255]);
    assert_eq!(img.get_pixel(1, 0).0[3], 0);
}

#[test]
fn encode_rejects_empty_raster() {
    let err = PngCodec.encode(&Raster::new(0, 0).unwrap()).unwrap_err();
    assert_eq!(err.stage(), "encode");
}

#[test]
fn write_creates_dirs_and_returns_file_uri() {
    let dir = scratch_dir("write");
    let target = dir.join("nested/out.png");
    let bytes = PngCodec.encode(&sample()).unwrap();
    let uri = PngCodec.write(&bytes, &target.display().to_string()).unwrap();
    assert!(uri.starts_with("file://"));
    assert!(uri.ends_with("nested/out.png"));
    assert_eq!(std::fs::read(&target).unwrap(), bytes);

    let leftovers: Vec<_> = std::fs::read_dir(dir.join("nested"))
        .unwrap()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_name().to_string_lossy().ends_with(".tmp"))
        .collect();
    assert!(leftovers.is_empty());
}

#[test]
fn write_accepts_file_uri_and_overwrites() {
    let dir = scratch_dir("file_uri");
    let target = dir.join("out.png");
    std::fs::write(&target, b"old").unwrap();
    let uri = PngCodec
        .write(b"new", &format!("file://{}", target.display()))
        .unwrap();
    assert_eq!(uri, format!("file://{}", target.display()));
    assert_eq!(std::fs::read(&target).unwrap(), b"new");
}

#[test]
fn write_failure_is_a_write_error() {
    let dir = scratch_dir("blocked");
    let blocker = dir.join("file");
    std::fs::write(&blocker, b"x").unwrap();
    let err = PngCodec
        .write(b"data", &blocker.join("out.png").display().to_string())
        .unwrap_err();
    assert_eq!(err.stage(), "write");
    assert!(PngCodec.write(b"data", "  ").is_err());
}

#[test]
fn data_uri_decodes_to_the_same_bytes() {
    let bytes = PngCodec.encode(&sample()).unwrap();
    let uri = PngCodec.to_base64_data_uri(&bytes);
    let payload = uri.strip_prefix(PNG_DATA_URI_PREFIX).unwrap();
    let decoded = base64::engine::general_purpose::STANDARD
        .decode(payload)
        .unwrap();
    assert_eq!(decoded, bytes);
}
