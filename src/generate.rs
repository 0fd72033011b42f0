use rayon::prelude::*;
use serde_json::Value;

use crate::assets::fetch::{AssetFetcher, ImageFetcher};
use crate::assets::fonts::FontResolver;
use crate::config::GenerateOpts;
use crate::encode::png::{ImageCodec, PngCodec};
use crate::foundation::error::{LayergenError, LayergenResult};
use crate::layer::model::CanvasConfig;
use crate::layer::parse::{LayerWarning, ParsedLayers, parse_canvas_config, parse_layers};
use crate::render::compositor::{Compositor, RenderReport, Rendered};
use crate::text::shaper::{ParleyShaper, TextShaper};

/// Top-level request document: `{ "layers": [...], "config": {...} }`.
///
/// Layers and config stay as raw JSON so that per-layer problems become warnings instead of a
/// failed deserialization.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct GenerateRequest {
    pub layers: Vec<Value>,
    pub config: Value,
}

impl GenerateRequest {
    pub fn from_json_str(s: &str) -> LayergenResult<Self> {
        Ok(serde_json::from_str(s)?)
    }

    pub fn from_path(path: &std::path::Path) -> LayergenResult<Self> {
        let s = std::fs::read_to_string(path)
            .map_err(|e| LayergenError::parse(format!("read '{}': {e}", path.display())))?;
        Self::from_json_str(&s)
    }
}

/// Result of a successful [`generate`] call.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct GenerateOutput {
    /// `data:image/png;base64,...` or `file://<absolute path>`.
    pub uri: String,
    pub warnings: Vec<LayerWarning>,
    pub report: RenderReport,
}

/// A composited canvas that has not been encoded yet.
#[derive(Clone, Debug, PartialEq)]
pub struct RenderedRequest {
    pub canvas: CanvasConfig,
    pub rendered: Rendered,
    pub warnings: Vec<LayerWarning>,
}

/// Owns one set of collaborators and renders requests with them.
///
/// Caches inside the collaborators (decoded fonts, shaped families) persist across calls on the
/// same generator.
pub struct Generator<F = AssetFetcher, S = ParleyShaper, C = PngCodec> {
    fetcher: F,
    shaper: S,
    codec: C,
    fonts: FontResolver,
}

impl Generator {
    /// Default collaborators configured from `opts`.
    pub fn new(opts: &GenerateOpts) -> Self {
        Self::with_parts(
            AssetFetcher::new(opts),
            ParleyShaper::new(),
            PngCodec,
            FontResolver::from_opts(opts),
        )
    }
}

impl<F, S, C> Generator<F, S, C>
where
    F: ImageFetcher,
    S: TextShaper,
    C: ImageCodec,
{
    pub fn with_parts(fetcher: F, shaper: S, codec: C, fonts: FontResolver) -> Self {
        Self {
            fetcher,
            shaper,
            codec,
            fonts,
        }
    }

    pub fn fonts_mut(&mut self) -> &mut FontResolver {
        &mut self.fonts
    }

    /// Validate, parse and composite without encoding.
    pub fn render(&mut self, request: &GenerateRequest) -> LayergenResult<RenderedRequest> {
        let canvas = parse_canvas_config(&request.config)?;
        let ParsedLayers { layers, warnings } = parse_layers(&request.layers);
        let rendered = Compositor::new(&mut self.fetcher, &mut self.shaper, &mut self.fonts)
            .render(&layers, &canvas)?;
        Ok(RenderedRequest {
            canvas,
            rendered,
            warnings,
        })
    }

    /// Render, encode, and deliver to the configured sink.
    #[tracing::instrument(skip_all, fields(layers = request.layers.len()))]
    pub fn generate(&mut self, request: &GenerateRequest) -> LayergenResult<GenerateOutput> {
        let RenderedRequest {
            canvas,
            rendered,
            warnings,
        } = self.render(request)?;

        let bytes = self.codec.encode(&rendered.raster)?;
        let uri = if canvas.base64 {
            self.codec.to_base64_data_uri(&bytes)
        } else {
            let path = canvas
                .file_path
                .as_deref()
                .ok_or_else(|| LayergenError::validation("canvas filePath is required"))?;
            self.codec.write(&bytes, path)?
        };

        tracing::debug!(
            drawn = rendered.report.drawn,
            skipped = rendered.report.skipped,
            degraded = rendered.report.degraded,
            warnings = warnings.len(),
            "generated"
        );
        Ok(GenerateOutput {
            uri,
            warnings,
            report: rendered.report,
        })
    }

    /// Parse a request document, then [`Generator::generate`].
    pub fn generate_json(&mut self, json: &str) -> LayergenResult<GenerateOutput> {
        let request = GenerateRequest::from_json_str(json)?;
        self.generate(&request)
    }
}

/// Render one request with default collaborators.
pub fn generate(request: &GenerateRequest, opts: &GenerateOpts) -> LayergenResult<GenerateOutput> {
    Generator::new(opts).generate(request)
}

/// Parse a request document and render it with default collaborators.
pub fn generate_json(json: &str, opts: &GenerateOpts) -> LayergenResult<GenerateOutput> {
    Generator::new(opts).generate_json(json)
}

/// Render independent requests in parallel. Results are in input order.
pub fn generate_batch(
    requests: &[GenerateRequest],
    opts: &GenerateOpts,
) -> Vec<LayergenResult<GenerateOutput>> {
    requests
        .par_iter()
        .map(|request| generate(request, opts))
        .collect()
}
