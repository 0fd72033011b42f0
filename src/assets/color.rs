use crate::foundation::core::Rgba8;
use crate::foundation::math::unit_to_u8;
use serde::{Deserialize, Serialize};

/// A color as written in a layer descriptor.
///
/// Both historical input conventions map onto this one type: a hex string (`"#RRGGBB"`) or a
/// numeric tuple (`[r, g, b]` / `[r, g, b, a]` with RGB in 0..=255 and alpha in 0..=1).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ColorSpec {
    /// Hex string, optional leading `#`.
    Hex(String),
    /// Numeric channel tuple.
    Channels(Vec<f64>),
}

impl Default for ColorSpec {
    fn default() -> Self {
        Self::Channels(vec![255.0, 255.0, 255.0])
    }
}

impl ColorSpec {
    /// Interpret a JSON value as a color spec. Returns `None` for shapes that are neither a
    /// string nor an all-numeric array.
    pub(crate) fn from_json(v: &serde_json::Value) -> Option<Self> {
        match v {
            serde_json::Value::String(s) => Some(Self::Hex(s.clone())),
            serde_json::Value::Array(items) => items
                .iter()
                .map(serde_json::Value::as_f64)
                .collect::<Option<Vec<f64>>>()
                .map(Self::Channels),
            _ => None,
        }
    }
}

/// Normalized straight-alpha color, all channels in `0.0..=1.0`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColorRgba {
    pub r: f64,
    pub g: f64,
    pub b: f64,
    pub a: f64,
}

impl ColorRgba {
    /// Fallback for any color that fails to parse.
    pub const WHITE: Self = Self::rgba(1.0, 1.0, 1.0, 1.0);

    pub const fn rgba(r: f64, g: f64, b: f64, a: f64) -> Self {
        Self { r, g, b, a }
    }

    /// Quantize to straight RGBA8, folding `opacity` into the alpha channel.
    pub fn to_rgba8_with_opacity(self, opacity: f64) -> Rgba8 {
        let opacity = if opacity.is_finite() { opacity } else { 1.0 };
        Rgba8 {
            r: unit_to_u8(self.r),
            g: unit_to_u8(self.g),
            b: unit_to_u8(self.b),
            a: unit_to_u8(self.a.clamp(0.0, 1.0) * opacity.clamp(0.0, 1.0)),
        }
    }
}

/// Parse a color spec, falling back to opaque white for anything malformed.
pub fn parse_color(spec: &ColorSpec) -> ColorRgba {
    try_parse_color(spec).unwrap_or(ColorRgba::WHITE)
}

/// Parse a color spec, reporting why it is malformed.
pub fn try_parse_color(spec: &ColorSpec) -> Result<ColorRgba, String> {
    match spec {
        ColorSpec::Hex(s) => parse_hex(s),
        ColorSpec::Channels(v) => parse_channels(v),
    }
}

/// Resolve the final straight RGBA8 fill for a text layer.
pub fn resolve_text_color(spec: &ColorSpec, opacity: f64) -> Rgba8 {
    parse_color(spec).to_rgba8_with_opacity(opacity)
}

fn parse_hex(s: &str) -> Result<ColorRgba, String> {
    let s = s.trim();
    let s = s.strip_prefix('#').unwrap_or(s);

    if s.len() != 6 || !s.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(format!(
            "hex color must be #RRGGBB (case-insensitive), got \"{s}\""
        ));
    }

    fn hex_byte(pair: &str) -> Result<u8, String> {
        u8::from_str_radix(pair, 16).map_err(|_| format!("invalid hex byte \"{pair}\""))
    }

    let r = hex_byte(&s[0..2])?;
    let g = hex_byte(&s[2..4])?;
    let b = hex_byte(&s[4..6])?;

    Ok(ColorRgba::rgba(
        (r as f64) / 255.0,
        (g as f64) / 255.0,
        (b as f64) / 255.0,
        1.0,
    ))
}

fn parse_channels(v: &[f64]) -> Result<ColorRgba, String> {
    if v.iter().any(|c| !c.is_finite()) {
        return Err("color channels must be finite numbers".to_owned());
    }
    let rgb = |c: f64| (c / 255.0).clamp(0.0, 1.0);
    match v {
        [r, g, b] => Ok(ColorRgba::rgba(rgb(*r), rgb(*g), rgb(*b), 1.0)),
        [r, g, b, a] => Ok(ColorRgba::rgba(rgb(*r), rgb(*g), rgb(*b), a.clamp(0.0, 1.0))),
        _ => Err(format!(
            "color tuple must have 3 ([r,g,b]) or 4 ([r,g,b,a]) channels, got {}",
            v.len()
        )),
    }
}

#[cfg(test)]
#[path = "../../tests/unit/assets/color.rs"]
mod tests;
