use std::collections::HashMap;

use crate::assets::fonts::ResolvedFont;
use crate::foundation::core::{Affine, Point, Raster, Rgba8, Vec2};
use crate::foundation::error::{LayergenError, LayergenResult};
use crate::render::composite::composite_at;

/// Transparent margin around a rasterized line so antialiased glyph edges are not clipped.
const LINE_PAD_PX: u32 = 2;

/// A resolved face at a concrete size.
#[derive(Clone, Debug, PartialEq)]
pub struct TextFont {
    pub face: ResolvedFont,
    pub size_px: f32,
}

/// Measures and draws single-line text runs. Line breaking is not its concern.
pub trait TextShaper {
    /// Advance width of `text` in pixels.
    fn measure(&mut self, text: &str, font: &TextFont) -> LayergenResult<f32>;

    /// Height of one line in pixels.
    fn line_height(&mut self, font: &TextFont) -> LayergenResult<f32>;

    /// Draw `text` onto `surface` with the line box's top-left corner at `origin`.
    fn draw(
        &mut self,
        surface: &mut Raster,
        text: &str,
        font: &TextFont,
        origin: Point,
        color: Rgba8,
    ) -> LayergenResult<()>;
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
/// RGBA8 brush color used by Parley text layout.
pub(crate) struct TextBrushRgba8 {
    pub(crate) r: u8,
    pub(crate) g: u8,
    pub(crate) b: u8,
    pub(crate) a: u8,
}

/// Default [`TextShaper`]: Parley for shaping, `vello_cpu` for glyph rasterization.
pub struct ParleyShaper {
    font_ctx: parley::FontContext,
    layout_ctx: parley::LayoutContext<TextBrushRgba8>,
    families: HashMap<String, String>,
    glyph_fonts: HashMap<String, vello_cpu::peniko::FontData>,
}

impl std::fmt::Debug for ParleyShaper {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ParleyShaper")
            .field("families", &self.families)
            .finish_non_exhaustive()
    }
}

impl Default for ParleyShaper {
    fn default() -> Self {
        Self::new()
    }
}

impl ParleyShaper {
    pub fn new() -> Self {
        Self {
            font_ctx: parley::FontContext::default(),
            layout_ctx: parley::LayoutContext::new(),
            families: HashMap::new(),
            glyph_fonts: HashMap::new(),
        }
    }

    /// Register the face with Parley once and return its family name.
    fn family_for(&mut self, face: &ResolvedFont) -> LayergenResult<String> {
        if let Some(name) = self.families.get(&face.key) {
            return Ok(name.clone());
        }

        let families = self.font_ctx.collection.register_fonts(
            parley::fontique::Blob::from(face.data.as_ref().clone()),
            None,
        );
        let family_id = families.first().map(|(id, _)| *id).ok_or_else(|| {
            LayergenError::validation(format!("no font families registered from '{}'", face.key))
        })?;
        let family_name = self
            .font_ctx
            .collection
            .family_name(family_id)
            .ok_or_else(|| LayergenError::validation("registered font family has no name"))?
            .to_string();

        self.families.insert(face.key.clone(), family_name.clone());
        Ok(family_name)
    }

    fn glyph_font_for(&mut self, face: &ResolvedFont) -> vello_cpu::peniko::FontData {
        self.glyph_fonts
            .entry(face.key.clone())
            .or_insert_with(|| {
                vello_cpu::peniko::FontData::new(
                    vello_cpu::peniko::Blob::from(face.data.as_ref().clone()),
                    0,
                )
            })
            .clone()
    }

    fn layout_line(
        &mut self,
        text: &str,
        font: &TextFont,
        brush: TextBrushRgba8,
    ) -> LayergenResult<parley::Layout<TextBrushRgba8>> {
        if !font.size_px.is_finite() || font.size_px <= 0.0 {
            return Err(LayergenError::validation(
                "text size_px must be finite and > 0",
            ));
        }
        let family_name = self.family_for(&font.face)?;

        let mut builder = self
            .layout_ctx
            .ranged_builder(&mut self.font_ctx, text, 1.0, true);
        builder.push_default(parley::style::StyleProperty::FontStack(
            parley::style::FontStack::Source(std::borrow::Cow::Owned(family_name)),
        ));
        builder.push_default(parley::style::StyleProperty::FontSize(font.size_px));
        builder.push_default(parley::style::StyleProperty::Brush(brush));

        let mut layout: parley::Layout<TextBrushRgba8> = builder.build(text);
        layout.break_all_lines(None);
        Ok(layout)
    }
}

impl TextShaper for ParleyShaper {
    fn measure(&mut self, text: &str, font: &TextFont) -> LayergenResult<f32> {
        if text.is_empty() {
            return Ok(0.0);
        }
        Ok(self
            .layout_line(text, font, TextBrushRgba8::default())?
            .width())
    }

    fn line_height(&mut self, font: &TextFont) -> LayergenResult<f32> {
        let h = self
            .layout_line("Hg", font, TextBrushRgba8::default())?
            .height();
        Ok(if h > 0.0 { h } else { font.size_px * 1.2 })
    }

    fn draw(
        &mut self,
        surface: &mut Raster,
        text: &str,
        font: &TextFont,
        origin: Point,
        color: Rgba8,
    ) -> LayergenResult<()> {
        if text.trim().is_empty() || color.a == 0 {
            return Ok(());
        }
        let brush = TextBrushRgba8 {
            r: color.r,
            g: color.g,
            b: color.b,
            a: color.a,
        };
        let layout = self.layout_line(text, font, brush)?;
        let glyph_font = self.glyph_font_for(&font.face);

        let w = (layout.width().ceil().max(1.0) as u32).saturating_add(2 * LINE_PAD_PX);
        let h = (layout.height().ceil().max(1.0) as u32).saturating_add(2 * LINE_PAD_PX);
        let w16: u16 = w
            .try_into()
            .map_err(|_| LayergenError::validation("text line width exceeds u16"))?;
        let h16: u16 = h
            .try_into()
            .map_err(|_| LayergenError::validation("text line height exceeds u16"))?;

        // Integer part goes to the composite offset, the fraction stays in the glyph transform.
        let (ox, oy) = (origin.x.floor(), origin.y.floor());
        let pad = f64::from(LINE_PAD_PX);
        let tr = Affine::translate(Vec2::new(origin.x - ox + pad, origin.y - oy + pad));

        let mut ctx = vello_cpu::RenderContext::new(w16, h16);
        ctx.set_transform(affine_to_cpu(tr));
        for line in layout.lines() {
            for item in line.items() {
                let parley::layout::PositionedLayoutItem::GlyphRun(run) = item else {
                    continue;
                };
                let brush = run.style().brush;
                ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(
                    brush.r, brush.g, brush.b, brush.a,
                ));
                // Absolute positions: run offset, accumulated advance, and baseline.
                let glyphs = run.positioned_glyphs().map(|g| vello_cpu::Glyph {
                    id: g.id,
                    x: g.x,
                    y: g.y,
                });
                ctx.glyph_run(&glyph_font)
                    .font_size(run.run().font_size())
                    .fill_glyphs(glyphs);
            }
        }
        ctx.flush();
        let mut pixmap = vello_cpu::Pixmap::new(w16, h16);
        ctx.render_to_pixmap(&mut pixmap);

        let line_raster = Raster::from_premul_rgba8(w, h, pixmap.data_as_u8_slice().to_vec())?;
        composite_at(
            surface,
            &line_raster,
            ox as i64 - i64::from(LINE_PAD_PX),
            oy as i64 - i64::from(LINE_PAD_PX),
        );
        Ok(())
    }
}

fn affine_to_cpu(a: Affine) -> vello_cpu::kurbo::Affine {
    vello_cpu::kurbo::Affine::new(a.as_coeffs())
}

#[cfg(test)]
#[path = "../../tests/unit/text/shaper.rs"]
mod tests;
