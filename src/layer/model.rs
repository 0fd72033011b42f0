use crate::assets::color::ColorSpec;
use crate::foundation::core::Rect;
use crate::foundation::error::{LayergenError, LayergenResult};
use crate::text::layout::{Alignment, LayoutBox};

/// Default font size in pixels for text layers.
pub const DEFAULT_FONT_SIZE: f64 = 65.0;

/// Largest canvas edge accepted by [`CanvasConfig`].
pub const MAX_CANVAS_DIM: u32 = 16_384;

/// A fully resolved layer. Paint order is list order.
#[derive(Clone, Debug, PartialEq)]
pub enum LayerModel {
    Picture(PictureLayer),
    Text(TextLayer),
}

impl LayerModel {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Picture(_) => "picture",
            Self::Text(_) => "text",
        }
    }

    /// Whether the layer degenerated to a zero-size placeholder that draws nothing.
    pub fn is_placeholder(&self) -> bool {
        match self {
            Self::Picture(p) => p.is_placeholder(),
            Self::Text(t) => t.is_placeholder(),
        }
    }
}

/// An image placed into a destination rectangle, optionally rounded and skewed.
#[derive(Clone, Debug, PartialEq)]
pub struct PictureLayer {
    pub uri: String,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    /// Horizontal shear angle in degrees.
    pub skew_x: f64,
    /// Vertical shear angle in degrees.
    pub skew_y: f64,
    /// Corner radius in pixels of the source image.
    pub radius: f64,
}

impl PictureLayer {
    pub fn placeholder() -> Self {
        Self {
            uri: String::new(),
            x: 0.0,
            y: 0.0,
            width: 0.0,
            height: 0.0,
            skew_x: 0.0,
            skew_y: 0.0,
            radius: 0.0,
        }
    }

    pub fn is_placeholder(&self) -> bool {
        self.uri.is_empty() || self.width <= 0.0 || self.height <= 0.0
    }

    pub fn dest_rect(&self) -> Rect {
        Rect::new(self.x, self.y, self.x + self.width, self.y + self.height)
    }
}

/// A block of wrapped text.
#[derive(Clone, Debug, PartialEq)]
pub struct TextLayer {
    pub text: String,
    pub font_size: f64,
    /// `None` selects the configured fallback family.
    pub font_family: Option<String>,
    pub color: ColorSpec,
    pub opacity: f64,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    /// Visible line bound, already floored. `None` is unbounded, `Some(0)` hides the text.
    pub max_lines: Option<u32>,
    pub alignment: Alignment,
    pub bold: bool,
}

impl TextLayer {
    pub fn placeholder() -> Self {
        Self {
            text: String::new(),
            font_size: DEFAULT_FONT_SIZE,
            font_family: None,
            color: ColorSpec::default(),
            opacity: 1.0,
            x: 0.0,
            y: 0.0,
            width: 0.0,
            height: 0.0,
            max_lines: None,
            alignment: Alignment::Center,
            bold: false,
        }
    }

    pub fn is_placeholder(&self) -> bool {
        self.text.is_empty()
    }

    pub fn layout_box(&self) -> LayoutBox {
        LayoutBox {
            x: self.x,
            y: self.y,
            width: self.width,
            height: self.height,
        }
    }
}

/// Output raster size and sink.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CanvasConfig {
    pub width: u32,
    pub height: u32,
    /// Destination path or `file://` URI; unused when `base64` is set.
    pub file_path: Option<String>,
    pub base64: bool,
}

impl CanvasConfig {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            file_path: None,
            base64: false,
        }
    }

    pub fn with_file_path(mut self, path: impl Into<String>) -> Self {
        self.file_path = Some(path.into());
        self
    }

    pub fn with_base64(mut self, base64: bool) -> Self {
        self.base64 = base64;
        self
    }

    /// Reject configurations that cannot produce output, before any drawing starts.
    pub fn validate(&self) -> LayergenResult<()> {
        self.validate_dimensions()?;
        if !self.base64
            && self
                .file_path
                .as_deref()
                .is_none_or(|p| p.trim().is_empty())
        {
            return Err(LayergenError::validation(
                "canvas filePath is required unless base64 output is requested",
            ));
        }
        Ok(())
    }
}

impl CanvasConfig {
    /// Check only the raster size; the output sink is irrelevant to drawing.
    pub fn validate_dimensions(&self) -> LayergenResult<()> {
        for (name, v) in [("width", self.width), ("height", self.height)] {
            if v == 0 || v > MAX_CANVAS_DIM {
                return Err(LayergenError::validation(format!(
                    "canvas {name} must be in 1..={MAX_CANVAS_DIM}, got {v}"
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/layer/model.rs"]
mod tests;
