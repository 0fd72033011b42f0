use crate::assets::color::resolve_text_color;
use crate::assets::fetch::ImageFetcher;
use crate::assets::fonts::FontResolver;
use crate::foundation::core::{Raster, Rgba8};
use crate::foundation::error::LayergenResult;
use crate::geometry::transform::{self, GeometryParams};
use crate::layer::model::{CanvasConfig, LayerModel, PictureLayer, TextLayer};
use crate::render::composite::draw_raster_into_rect;
use crate::text::layout::{TextLayoutEngine, position_lines};
use crate::text::shaper::{TextFont, TextShaper};

/// Per-render layer counts.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize)]
pub struct RenderReport {
    /// Layers that painted normally.
    pub drawn: usize,
    /// Placeholders and layers with nothing visible to paint.
    pub skipped: usize,
    /// Layers that hit a recoverable failure: fetch error, missing font, ignored skew.
    pub degraded: usize,
}

impl RenderReport {
    fn record(&mut self, outcome: LayerOutcome) {
        match outcome {
            LayerOutcome::Drawn => self.drawn += 1,
            LayerOutcome::Skipped => self.skipped += 1,
            LayerOutcome::Degraded => self.degraded += 1,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum LayerOutcome {
    Drawn,
    Skipped,
    Degraded,
}

/// Output of [`Compositor::render`].
#[derive(Clone, Debug, PartialEq)]
pub struct Rendered {
    pub raster: Raster,
    pub report: RenderReport,
}

/// Paints resolved layers onto a fresh canvas, in list order.
pub struct Compositor<'a> {
    fetcher: &'a mut dyn ImageFetcher,
    shaper: &'a mut dyn TextShaper,
    fonts: &'a mut FontResolver,
}

impl<'a> Compositor<'a> {
    pub fn new(
        fetcher: &'a mut dyn ImageFetcher,
        shaper: &'a mut dyn TextShaper,
        fonts: &'a mut FontResolver,
    ) -> Self {
        Self {
            fetcher,
            shaper,
            fonts,
        }
    }

    #[tracing::instrument(skip(self, layers), fields(layers = layers.len()))]
    pub fn render(
        &mut self,
        layers: &[LayerModel],
        canvas: &CanvasConfig,
    ) -> LayergenResult<Rendered> {
        canvas.validate_dimensions()?;
        let mut raster = Raster::new(canvas.width, canvas.height)?;
        let mut report = RenderReport::default();

        for (index, layer) in layers.iter().enumerate() {
            let outcome = if layer.is_placeholder() {
                LayerOutcome::Skipped
            } else {
                match layer {
                    LayerModel::Picture(p) => self.draw_picture(&mut raster, p)?,
                    LayerModel::Text(t) => self.draw_text(&mut raster, index, t),
                }
            };
            tracing::debug!(index, kind = layer.kind(), ?outcome, "layer composited");
            report.record(outcome);
        }
        Ok(Rendered { raster, report })
    }

    fn draw_picture(
        &mut self,
        canvas: &mut Raster,
        layer: &PictureLayer,
    ) -> LayergenResult<LayerOutcome> {
        let mut outcome = LayerOutcome::Drawn;
        let src = match self.fetcher.fetch(&layer.uri) {
            Ok(r) => r,
            Err(err) => {
                tracing::warn!(uri_len = layer.uri.len(), error = %err, "picture fetch failed, drawing nothing");
                outcome = LayerOutcome::Degraded;
                Raster::transparent_pixel()
            }
        };

        let params = GeometryParams::new(layer.radius, layer.skew_x, layer.skew_y);
        let transformed = transform::apply(src, &params)?;
        if transformed.skew_degraded() {
            outcome = LayerOutcome::Degraded;
        }
        draw_raster_into_rect(canvas, &transformed.raster, layer.dest_rect());
        Ok(outcome)
    }

    fn draw_text(&mut self, canvas: &mut Raster, index: usize, layer: &TextLayer) -> LayerOutcome {
        if layer.max_lines == Some(0) || layer.text.trim().is_empty() {
            return LayerOutcome::Skipped;
        }
        let size_px = layer.font_size as f32;
        if !size_px.is_finite() || size_px <= 0.0 {
            return LayerOutcome::Skipped;
        }
        let color = resolve_text_color(&layer.color, layer.opacity);
        if color.a == 0 {
            return LayerOutcome::Skipped;
        }

        let Some(face) = self.fonts.resolve(layer.font_family.as_deref(), layer.bold) else {
            tracing::warn!(index, family = ?layer.font_family, "no font available, text layer skipped");
            return LayerOutcome::Degraded;
        };
        let font = TextFont { face, size_px };

        match self.paint_text(canvas, layer, &font, color) {
            Ok(()) => LayerOutcome::Drawn,
            Err(err) => {
                tracing::warn!(index, error = %err, "text layer failed to draw");
                LayerOutcome::Degraded
            }
        }
    }

    fn paint_text(
        &mut self,
        canvas: &mut Raster,
        layer: &TextLayer,
        font: &TextFont,
        color: Rgba8,
    ) -> LayergenResult<()> {
        let bounds = layer.layout_box();
        let engine = TextLayoutEngine::new(bounds.wrap_width().max(0.0) as f32, layer.max_lines);
        let block = engine.layout(&layer.text, &mut *self.shaper, font)?;
        let line_height = self.shaper.line_height(font)?;
        let origins = position_lines(&block, &bounds, layer.alignment, line_height);

        for (line, origin) in block.lines.iter().zip(origins) {
            if line.text.is_empty() {
                continue;
            }
            self.shaper.draw(canvas, &line.text, font, origin, color)?;
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/compositor.rs"]
mod tests;
