//! layergen renders a flat PNG from an ordered list of layer descriptors.
//!
//! Picture layers are fetched, optionally rounded and skewed, then resampled into their
//! destination rectangle. Text layers are word-wrapped, truncated to a line budget, aligned,
//! and drawn with a resolved font. Layers are source-over blended onto one premultiplied
//! RGBA8 canvas in list order, which is then encoded to a file or a base64 data URI.
//!
//! - Build a [`GenerateRequest`] (or parse one from JSON)
//! - Call [`generate`] with [`GenerateOpts`], or hold a [`Generator`] to reuse its caches
//! - Swap collaborators through [`ImageFetcher`], [`TextShaper`], and [`ImageCodec`]
#![forbid(unsafe_code)]

mod assets;
mod config;
mod encode;
mod foundation;
mod generate;
mod geometry;
mod layer;
mod render;
mod text;

pub use crate::foundation::core::{Affine, Point, Raster, Rect, Rgba8, Rgba8Premul, Vec2};
pub use crate::foundation::error::{LayergenError, LayergenResult};

pub use crate::assets::color::{ColorRgba, ColorSpec, parse_color, resolve_text_color};
pub use crate::assets::decode::decode_image;
pub use crate::assets::fetch::{AssetFetcher, ImageFetcher, ImageSource};
pub use crate::assets::fonts::{FontResolver, ResolvedFont};
pub use crate::config::{DEFAULT_FONT_FAMILY, DEFAULT_HTTP_TIMEOUT, GenerateOpts};
pub use crate::encode::png::{ImageCodec, PNG_DATA_URI_PREFIX, PngCodec};
pub use crate::generate::{
    GenerateOutput, GenerateRequest, Generator, RenderedRequest, generate, generate_batch,
    generate_json,
};
pub use crate::geometry::raster::{EdgeMode, sample_bilinear};
pub use crate::geometry::transform::{GeometryParams, SkewPlan, Transformed};
pub use crate::layer::model::{
    CanvasConfig, DEFAULT_FONT_SIZE, LayerModel, MAX_CANVAS_DIM, PictureLayer, TextLayer,
};
pub use crate::layer::parse::{
    LayerWarning, ParsedLayers, parse_canvas_config, parse_layer, parse_layers,
};
pub use crate::render::composite::{composite_at, draw_raster_into_rect, over};
pub use crate::render::compositor::{Compositor, RenderReport, Rendered};
pub use crate::text::layout::{
    Alignment, Line, LayoutBox, TextBlock, TextLayoutEngine, position_lines,
};
pub use crate::text::shaper::{ParleyShaper, TextFont, TextShaper};

/// Geometry transforms applied to picture sources.
pub mod transform {
    pub use crate::geometry::transform::{apply, round_corners, skew_plan, skew_raster};
}
