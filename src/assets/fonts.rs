use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::config::GenerateOpts;

const FONT_EXTENSIONS: [&str; 2] = ["ttf", "otf"];

/// Font bytes selected for a text layer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResolvedFont {
    /// Family the bytes were resolved for (after fallback).
    pub family: String,
    /// Whether a dedicated bold face was found.
    pub bold: bool,
    /// Stable identity of the face, used by shapers as a cache key.
    pub key: String,
    /// Raw font file bytes.
    pub data: Arc<Vec<u8>>,
}

/// Resolves `(family, bold)` to font bytes from a fonts directory.
///
/// Lookup order: `<Family>-Bold.{ttf,otf}` when bold is requested, then `<Family>.{ttf,otf}`,
/// then the same for the fallback family, then the first font file in the directory. Faces
/// registered in memory take precedence over files. Resolution never errors; `None` means no
/// font is available at all.
#[derive(Debug)]
pub struct FontResolver {
    fonts_dir: PathBuf,
    fallback_family: String,
    registered: HashMap<(String, bool), ResolvedFont>,
    cache: HashMap<(String, bool), Option<ResolvedFont>>,
}

impl FontResolver {
    pub fn new(fonts_dir: impl Into<PathBuf>, fallback_family: impl Into<String>) -> Self {
        Self {
            fonts_dir: fonts_dir.into(),
            fallback_family: fallback_family.into(),
            registered: HashMap::new(),
            cache: HashMap::new(),
        }
    }

    pub fn from_opts(opts: &GenerateOpts) -> Self {
        Self::new(opts.resolved_fonts_dir(), opts.fallback_font_family.clone())
    }

    pub fn fallback_family(&self) -> &str {
        &self.fallback_family
    }

    /// Register an in-memory face for `family`.
    pub fn register(&mut self, family: &str, bold: bool, data: Vec<u8>) {
        let key = format!("mem:{}{}", family, if bold { ":bold" } else { "" });
        self.registered.insert(
            (family.to_ascii_lowercase(), bold),
            ResolvedFont {
                family: family.to_owned(),
                bold,
                key,
                data: Arc::new(data),
            },
        );
        self.cache.clear();
    }

    /// Resolve a face; `family = None` selects the fallback family.
    pub fn resolve(&mut self, family: Option<&str>, bold: bool) -> Option<ResolvedFont> {
        let family = family
            .map(str::trim)
            .filter(|f| !f.is_empty())
            .unwrap_or(&self.fallback_family)
            .to_owned();
        let cache_key = (family.to_ascii_lowercase(), bold);
        if let Some(hit) = self.cache.get(&cache_key) {
            return hit.clone();
        }

        let fallback = self.fallback_family.clone();
        let resolved = self
            .lookup_family(&family, bold)
            .or_else(|| {
                if !family.eq_ignore_ascii_case(&fallback) {
                    tracing::warn!(family = %family, fallback = %fallback, "font family not found, using fallback");
                    self.lookup_family(&fallback, bold)
                } else {
                    None
                }
            })
            .or_else(|| self.any_font());

        if resolved.is_none() {
            tracing::warn!(family = %family, dir = %self.fonts_dir.display(), "no font available");
        }
        self.cache.insert(cache_key, resolved.clone());
        resolved
    }

    fn lookup_family(&self, family: &str, bold: bool) -> Option<ResolvedFont> {
        if bold && let Some(f) = self.lookup_face(family, true) {
            return Some(f);
        }
        self.lookup_face(family, false)
    }

    fn lookup_face(&self, family: &str, bold: bool) -> Option<ResolvedFont> {
        if let Some(f) = self.registered.get(&(family.to_ascii_lowercase(), bold)) {
            return Some(f.clone());
        }
        if !is_plain_file_stem(family) {
            return None;
        }
        let stem = if bold {
            format!("{family}-Bold")
        } else {
            family.to_owned()
        };
        FONT_EXTENSIONS
            .iter()
            .map(|ext| self.fonts_dir.join(format!("{stem}.{ext}")))
            .find_map(|p| load_face(&p, family, bold))
    }

    fn any_font(&self) -> Option<ResolvedFont> {
        if let Some(f) = self.registered.values().min_by(|a, b| a.key.cmp(&b.key)) {
            return Some(f.clone());
        }
        let mut paths: Vec<PathBuf> = std::fs::read_dir(&self.fonts_dir)
            .ok()?
            .filter_map(|e| e.ok().map(|e| e.path()))
            .filter(|p| {
                p.extension()
                    .and_then(|e| e.to_str())
                    .is_some_and(|e| FONT_EXTENSIONS.contains(&e.to_ascii_lowercase().as_str()))
            })
            .collect();
        paths.sort();
        paths.iter().find_map(|p| {
            let stem = p.file_stem()?.to_string_lossy().into_owned();
            load_face(p, &stem, false)
        })
    }
}

fn load_face(path: &Path, family: &str, bold: bool) -> Option<ResolvedFont> {
    let data = std::fs::read(path).ok()?;
    Some(ResolvedFont {
        family: family.to_owned(),
        bold,
        key: path.display().to_string(),
        data: Arc::new(data),
    })
}

fn is_plain_file_stem(family: &str) -> bool {
    !family.is_empty()
        && family != "."
        && family != ".."
        && !family.contains(['/', '\\', '\0'])
}

#[cfg(test)]
#[path = "../../tests/unit/assets/fonts.rs"]
mod tests;
