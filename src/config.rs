use std::path::{Path, PathBuf};
use std::time::Duration;

/// Family used when a text layer names none, or names one that cannot be resolved.
pub const DEFAULT_FONT_FAMILY: &str = "Helvetica";

/// Default timeout for `http(s)://` picture sources.
pub const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(15);

/// Environment-independent knobs for a [`crate::Generator`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GenerateOpts {
    /// Root directory for bundled-resource picture URIs (relative names such as `logo`).
    pub assets_root: PathBuf,
    /// Directory holding `<Family>.ttf` / `<Family>-Bold.ttf` font files.
    ///
    /// `None` means `<assets_root>/fonts`.
    pub fonts_dir: Option<PathBuf>,
    /// Fallback family for unresolved font names.
    pub fallback_font_family: String,
    /// Timeout applied to each HTTP fetch.
    pub http_timeout: Duration,
}

impl Default for GenerateOpts {
    fn default() -> Self {
        Self {
            assets_root: PathBuf::from("."),
            fonts_dir: None,
            fallback_font_family: DEFAULT_FONT_FAMILY.to_owned(),
            http_timeout: DEFAULT_HTTP_TIMEOUT,
        }
    }
}

impl GenerateOpts {
    /// Defaults overridden by `LAYERGEN_*` environment variables.
    ///
    /// Unset, empty, or unparsable variables are ignored.
    pub fn from_env() -> Self {
        Self::from_lookup(|k| std::env::var(k).ok())
    }

    pub(crate) fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let get = |k: &str| lookup(k).filter(|v| !v.trim().is_empty());
        let mut opts = Self::default();
        if let Some(v) = get("LAYERGEN_ASSETS_DIR") {
            opts.assets_root = PathBuf::from(v);
        }
        if let Some(v) = get("LAYERGEN_FONTS_DIR") {
            opts.fonts_dir = Some(PathBuf::from(v));
        }
        if let Some(v) = get("LAYERGEN_FALLBACK_FONT") {
            opts.fallback_font_family = v.trim().to_owned();
        }
        if let Some(ms) = get("LAYERGEN_HTTP_TIMEOUT_MS")
            .and_then(|v| v.trim().parse::<u64>().ok())
            .filter(|&n| n > 0)
        {
            opts.http_timeout = Duration::from_millis(ms);
        }
        opts
    }

    /// Effective font directory.
    pub fn resolved_fonts_dir(&self) -> PathBuf {
        self.fonts_dir
            .clone()
            .unwrap_or_else(|| Path::new(&self.assets_root).join("fonts"))
    }
}

#[cfg(test)]
#[path = "../tests/unit/config.rs"]
mod tests;
