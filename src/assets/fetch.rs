use std::path::{Path, PathBuf};
use std::time::Duration;

use base64::Engine as _;

use crate::assets::decode::decode_image;
use crate::config::GenerateOpts;
use crate::foundation::core::Raster;
use crate::foundation::error::{LayergenError, LayergenResult};

/// Extensions probed for bundled-resource names given without one.
const BUNDLED_EXTENSIONS: [&str; 5] = ["png", "jpg", "jpeg", "webp", "svg"];

#[cfg(feature = "http")]
const MAX_HTTP_BYTES: u64 = 32 * 1024 * 1024;

/// Resolves a picture layer URI to decoded pixels.
///
/// Implementations may block. Failures are reported as errors; the compositor substitutes a
/// transparent pixel and carries on.
pub trait ImageFetcher {
    /// Load and decode the image named by `uri`.
    fn fetch(&mut self, uri: &str) -> LayergenResult<Raster>;
}

/// Where a picture URI points.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ImageSource {
    /// `http://` or `https://` URL.
    Http(String),
    /// `file://` URI or absolute filesystem path.
    File(PathBuf),
    /// Inline `data:` URI payload.
    Inline(Vec<u8>),
    /// Bundled resource name, normalized and relative to the assets root.
    Bundled(String),
}

impl ImageSource {
    /// Classify a URI without touching the filesystem or network.
    pub fn classify(uri: &str) -> LayergenResult<Self> {
        let uri = uri.trim();
        if uri.is_empty() {
            return Err(LayergenError::fetch("empty image uri"));
        }

        let lower = uri.to_ascii_lowercase();
        if lower.starts_with("http://") || lower.starts_with("https://") {
            return Ok(Self::Http(uri.to_owned()));
        }
        if lower.starts_with("data:") {
            return parse_data_uri(uri).map(Self::Inline);
        }
        if let Some(rest) = uri.strip_prefix("file://") {
            if rest.is_empty() {
                return Err(LayergenError::fetch("file uri has no path"));
            }
            return Ok(Self::File(PathBuf::from(rest)));
        }
        if Path::new(uri).is_absolute() {
            return Ok(Self::File(PathBuf::from(uri)));
        }
        normalize_rel_path(uri).map(Self::Bundled)
    }
}

/// Default [`ImageFetcher`]: network, local files, inline data, and bundled resources.
#[derive(Clone, Debug)]
pub struct AssetFetcher {
    assets_root: PathBuf,
    http_timeout: Duration,
}

impl AssetFetcher {
    pub fn new(opts: &GenerateOpts) -> Self {
        Self {
            assets_root: opts.assets_root.clone(),
            http_timeout: opts.http_timeout,
        }
    }

    fn read_bytes(&self, source: &ImageSource) -> LayergenResult<Vec<u8>> {
        match source {
            ImageSource::Http(url) => self.read_http(url),
            ImageSource::File(path) => read_file(path),
            ImageSource::Inline(bytes) => Ok(bytes.clone()),
            ImageSource::Bundled(name) => read_file(&self.bundled_path(name)?),
        }
    }

    fn bundled_path(&self, name: &str) -> LayergenResult<PathBuf> {
        let direct = self.assets_root.join(name);
        if direct.is_file() || Path::new(name).extension().is_some() {
            return Ok(direct);
        }
        BUNDLED_EXTENSIONS
            .iter()
            .map(|ext| self.assets_root.join(format!("{name}.{ext}")))
            .find(|p| p.is_file())
            .ok_or_else(|| {
                LayergenError::fetch(format!(
                    "bundled resource '{name}' not found under '{}'",
                    self.assets_root.display()
                ))
            })
    }

    #[cfg(feature = "http")]
    fn read_http(&self, url: &str) -> LayergenResult<Vec<u8>> {
        let agent: ureq::Agent = ureq::Agent::config_builder()
            .timeout_global(Some(self.http_timeout))
            .build()
            .into();
        let mut resp = agent
            .get(url)
            .call()
            .map_err(|e| LayergenError::fetch(format!("GET {url}: {e}")))?;
        resp.body_mut()
            .with_config()
            .limit(MAX_HTTP_BYTES)
            .read_to_vec()
            .map_err(|e| LayergenError::fetch(format!("read body of {url}: {e}")))
    }

    #[cfg(not(feature = "http"))]
    fn read_http(&self, url: &str) -> LayergenResult<Vec<u8>> {
        Err(LayergenError::fetch(format!(
            "cannot fetch {url}: built without the `http` feature"
        )))
    }
}

impl ImageFetcher for AssetFetcher {
    #[tracing::instrument(level = "debug", skip_all, fields(uri_len = uri.len()))]
    fn fetch(&mut self, uri: &str) -> LayergenResult<Raster> {
        let source = ImageSource::classify(uri)?;
        let bytes = self.read_bytes(&source)?;
        decode_image(&bytes).map_err(|e| LayergenError::fetch(format!("decode '{uri}': {e:#}")))
    }
}

fn read_file(path: &Path) -> LayergenResult<Vec<u8>> {
    std::fs::read(path).map_err(|e| {
        LayergenError::fetch(format!("failed to read image '{}': {e}", path.display()))
    })
}

/// Decode the payload of a `data:` URI (base64 or raw).
pub(crate) fn parse_data_uri(uri: &str) -> LayergenResult<Vec<u8>> {
    let (header, payload) = uri
        .split_once(',')
        .ok_or_else(|| LayergenError::fetch("data uri has no payload separator"))?;
    if header.contains(";base64") {
        base64::engine::general_purpose::STANDARD
            .decode(payload.trim())
            .map_err(|e| LayergenError::fetch(format!("invalid base64 in data uri: {e}")))
    } else {
        Ok(payload.as_bytes().to_vec())
    }
}

/// Normalize and validate bundled-resource names.
///
/// The normalized result uses `/` separators, removes `.` segments, and rejects absolute paths or
/// parent traversals (`..`).
pub(crate) fn normalize_rel_path(source: &str) -> LayergenResult<String> {
    let s = source.replace('\\', "/");
    if s.starts_with('/') {
        return Err(LayergenError::fetch("resource paths must be relative"));
    }
    if s.is_empty() {
        return Err(LayergenError::fetch("resource path must be non-empty"));
    }

    let mut out = Vec::<&str>::new();
    for part in s.split('/') {
        if part.is_empty() || part == "." {
            continue;
        }
        if part == ".." {
            return Err(LayergenError::fetch(
                "resource paths must not contain '..'",
            ));
        }
        out.push(part);
    }

    if out.is_empty() {
        return Err(LayergenError::fetch("resource path must contain a file name"));
    }

    Ok(out.join("/"))
}

#[cfg(test)]
#[path = "../../tests/unit/assets/fetch.rs"]
mod tests;
