use std::io::Cursor;

use super::*;

fn red_png() -> Vec<u8> {
    let img = image::RgbaImage::from_pixel(2, 2, image::Rgba([255, 0, 0, 255]));
    let mut buf = Vec::new();
    image::DynamicImage::ImageRgba8(img)
        .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .unwrap();
    buf
}

fn scratch_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir()
        .join("layergen_fetch_tests")
        .join(format!("{name}_{}", std::process::id()));
    let _ = std::fs::remove_dir_all(&dir);
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

#[test]
fn normalize_path_slash_normalization() {
    assert_eq!(normalize_rel_path("a/b.png").unwrap(), "a/b.png");
    assert_eq!(normalize_rel_path("a\\b.png").unwrap(), "a/b.png");
    assert_eq!(normalize_rel_path("./a//b.png").unwrap(), "a/b.png");
    assert!(normalize_rel_path("../x.png").is_err());
    assert!(normalize_rel_path("/abs.png").is_err());
    assert!(normalize_rel_path("./.").is_err());
}

#[test]
fn classify_schemes() {
    assert_eq!(
        ImageSource::classify("https://example.com/a.png").unwrap(),
        ImageSource::Http("https://example.com/a.png".to_owned())
    );
    assert_eq!(
        ImageSource::classify("HTTP://example.com/a.png").unwrap(),
        ImageSource::Http("HTTP://example.com/a.png".to_owned())
    );
    assert_eq!(
        ImageSource::classify("file:///tmp/a.png").unwrap(),
        ImageSource::File(PathBuf::from("/tmp/a.png"))
    );
    assert_eq!(
        ImageSource::classify("logo").unwrap(),
        ImageSource::Bundled("logo".to_owned())
    );
    assert_eq!(
        ImageSource::classify("data:text/plain;base64,SGVsbG8=").unwrap(),
        ImageSource::Inline(b"Hello".to_vec())
    );
    assert!(ImageSource::classify("").is_err());
    assert!(ImageSource::classify("../secret.png").is_err());
    assert!(ImageSource::classify("file://").is_err());
}

#[test]
fn parse_data_uri_raw_and_invalid() {
    assert_eq!(parse_data_uri("data:text/plain,hi").unwrap(), b"hi".to_vec());
    assert!(parse_data_uri("data:image/png;base64,@@@").is_err());
    assert!(parse_data_uri("data:image/png;base64").is_err());
}

#[test]
fn fetch_inline_png() {
    let uri = format!(
        "data:image/png;base64,{}",
        base64::engine::general_purpose::STANDARD.encode(red_png())
    );
    let mut fetcher = AssetFetcher::new(&GenerateOpts::default());
    let raster = fetcher.fetch(&uri).unwrap();
    assert_eq!((raster.width(), raster.height()), (2, 2));
    assert_eq!(raster.pixel(1, 1), [255, 0, 0, 255]);
}

#[test]
fn fetch_bundled_probes_extensions_and_file_uri() {
    let dir = scratch_dir("bundled");
    std::fs::write(dir.join("logo.png"), red_png()).unwrap();

    let opts = GenerateOpts {
        assets_root: dir.clone(),
        ..GenerateOpts::default()
    };
    let mut fetcher = AssetFetcher::new(&opts);
    assert_eq!(fetcher.fetch("logo").unwrap().width(), 2);
    assert_eq!(fetcher.fetch("logo.png").unwrap().width(), 2);

    let abs = dir.join("logo.png");
    let file_uri = format!("file://{}", abs.display());
    assert_eq!(fetcher.fetch(&file_uri).unwrap().height(), 2);
}

#[test]
fn fetch_missing_or_corrupt_is_fetch_error() {
    let dir = scratch_dir("missing");
    std::fs::write(dir.join("broken.png"), b"not a png").unwrap();
    let opts = GenerateOpts {
        assets_root: dir,
        ..GenerateOpts::default()
    };
    let mut fetcher = AssetFetcher::new(&opts);

    let err = fetcher.fetch("nope").unwrap_err();
    assert_eq!(err.stage(), "fetch");
    let err = fetcher.fetch("broken.png").unwrap_err();
    assert_eq!(err.stage(), "fetch");
}
