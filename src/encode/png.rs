use std::io::Write as _;
use std::path::{Path, PathBuf};

use anyhow::Context as _;
use base64::Engine as _;
use image::ImageEncoder as _;

use crate::foundation::core::Raster;
use crate::foundation::error::{LayergenError, LayergenResult};

/// Prefix of every base64 PNG data URI produced by [`ImageCodec::to_base64_data_uri`].
pub const PNG_DATA_URI_PREFIX: &str = "data:image/png;base64,";

/// Encodes a finished canvas and delivers the bytes.
pub trait ImageCodec {
    /// Encode a premultiplied raster to file bytes.
    fn encode(&self, raster: &Raster) -> LayergenResult<Vec<u8>>;

    /// Persist encoded bytes at `path` and return a URI for the written file.
    fn write(&self, bytes: &[u8], path: &str) -> LayergenResult<String>;

    /// Wrap encoded bytes in a `data:` URI.
    fn to_base64_data_uri(&self, bytes: &[u8]) -> String {
        let mut uri = String::from(PNG_DATA_URI_PREFIX);
        base64::engine::general_purpose::STANDARD.encode_string(bytes, &mut uri);
        uri
    }
}

/// PNG via the `image` crate, straight-alpha RGBA8.
#[derive(Clone, Copy, Debug, Default)]
pub struct PngCodec;

impl ImageCodec for PngCodec {
    fn encode(&self, raster: &Raster) -> LayergenResult<Vec<u8>> {
        if raster.is_empty() {
            return Err(LayergenError::encode("cannot encode an empty raster"));
        }
        let rgba = raster.to_straight_rgba8();
        let mut out = Vec::new();
        image::codecs::png::PngEncoder::new(&mut out)
            .write_image(
                &rgba,
                raster.width(),
                raster.height(),
                image::ExtendedColorType::Rgba8,
            )
            .map_err(|e| LayergenError::encode(format!("png encode failed: {e}")))?;
        Ok(out)
    }

    fn write(&self, bytes: &[u8], path: &str) -> LayergenResult<String> {
        let path = output_path(path)?;
        write_atomic(&path, bytes).map_err(|e| LayergenError::write(format!("{e:#}")))?;
        let abs = std::path::absolute(&path).map_err(|e| {
            LayergenError::write(format!("resolve '{}': {e}", path.display()))
        })?;
        Ok(format!("file://{}", abs.display()))
    }
}

/// Accept a plain path or a `file://` URI.
fn output_path(path: &str) -> LayergenResult<PathBuf> {
    let raw = path.trim();
    let raw = raw.strip_prefix("file://").unwrap_or(raw);
    if raw.is_empty() {
        return Err(LayergenError::write("output path is empty"));
    }
    Ok(PathBuf::from(raw))
}

/// Write to a sibling temp file, then rename over `path`.
fn write_atomic(path: &Path, bytes: &[u8]) -> anyhow::Result<()> {
    let file_name = path
        .file_name()
        .with_context(|| format!("output path '{}' has no file name", path.display()))?;
    let parent = path.parent().filter(|p| !p.as_os_str().is_empty());
    if let Some(parent) = parent {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }

    let mut tmp_name = std::ffi::OsString::from(".");
    tmp_name.push(file_name);
    tmp_name.push(format!(".{}.tmp", std::process::id()));
    let tmp = path.with_file_name(tmp_name);

    let result = (|| -> anyhow::Result<()> {
        let mut f = std::fs::File::create(&tmp)
            .with_context(|| format!("create temp file '{}'", tmp.display()))?;
        f.write_all(bytes)
            .with_context(|| format!("write temp file '{}'", tmp.display()))?;
        f.sync_all()
            .with_context(|| format!("sync temp file '{}'", tmp.display()))?;
        std::fs::rename(&tmp, path)
            .with_context(|| format!("rename into '{}'", path.display()))?;
        Ok(())
    })();
    if result.is_err() {
        let _ = std::fs::remove_file(&tmp);
    }
    result
}

#[cfg(test)]
#[path = "../../tests/unit/encode/png.rs"]
mod tests;
