use serde_json::{Map, Value};

use crate::assets::color::{ColorSpec, try_parse_color};
use crate::foundation::error::{LayergenError, LayergenResult};
use crate::layer::model::{
    CanvasConfig, DEFAULT_FONT_SIZE, LayerModel, MAX_CANVAS_DIM, PictureLayer, TextLayer,
};
use crate::text::layout::Alignment;

/// A non-fatal problem found while resolving a layer descriptor.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize)]
pub struct LayerWarning {
    /// Position of the layer in the request list.
    pub index: usize,
    pub message: String,
}

impl std::fmt::Display for LayerWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "layer {}: {}", self.index, self.message)
    }
}

/// Resolved layers plus everything that had to be defaulted along the way.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ParsedLayers {
    pub layers: Vec<LayerModel>,
    pub warnings: Vec<LayerWarning>,
}

/// Resolve raw descriptors into layer models.
///
/// Never fails: malformed optional fields fall back to defaults, and a layer missing a
/// required field degenerates to a placeholder. Each substitution is recorded as a warning.
pub fn parse_layers(values: &[Value]) -> ParsedLayers {
    let mut out = ParsedLayers::default();
    for (index, value) in values.iter().enumerate() {
        let layer = parse_layer(index, value, &mut out.warnings);
        out.layers.push(layer);
    }
    out
}

/// Resolve one descriptor. A descriptor with a non-null `uri` key is a picture layer; anything
/// else is a text layer.
pub fn parse_layer(index: usize, value: &Value, warnings: &mut Vec<LayerWarning>) -> LayerModel {
    let Some(obj) = value.as_object() else {
        warnings.push(LayerWarning {
            index,
            message: "layer descriptor is not an object".to_owned(),
        });
        return LayerModel::Text(TextLayer::placeholder());
    };

    let mut fields = Fields {
        obj,
        index,
        warnings,
    };
    if obj.get("uri").is_some_and(|v| !v.is_null()) {
        LayerModel::Picture(fields.picture())
    } else {
        LayerModel::Text(fields.text())
    }
}

struct Fields<'a> {
    obj: &'a Map<String, Value>,
    index: usize,
    warnings: &'a mut Vec<LayerWarning>,
}

struct Geometry {
    x: f64,
    y: f64,
    width: f64,
    height: f64,
}

impl Fields<'_> {
    fn warn(&mut self, message: impl Into<String>) {
        let w = LayerWarning {
            index: self.index,
            message: message.into(),
        };
        tracing::warn!(layer = w.index, "{}", w.message);
        self.warnings.push(w);
    }

    fn picture(&mut self) -> PictureLayer {
        let obj = self.obj;
        let Some(uri) = obj.get("uri").and_then(Value::as_str) else {
            self.warn("`uri` must be a string; layer skipped");
            return PictureLayer::placeholder();
        };
        let Some(geo) = self.geometry() else {
            return PictureLayer::placeholder();
        };
        let radius = self.number_or("radius", 0.0);
        let radius = if radius < 0.0 {
            self.warn(format!("`radius` must be >= 0, got {radius}; using 0"));
            0.0
        } else {
            radius
        };

        PictureLayer {
            uri: uri.to_owned(),
            x: geo.x,
            y: geo.y,
            width: geo.width,
            height: geo.height,
            skew_x: self.number_or("skewX", 0.0),
            skew_y: self.number_or("skewY", 0.0),
            radius,
        }
    }

    fn text(&mut self) -> TextLayer {
        let obj = self.obj;
        let Some(text) = obj.get("text").and_then(Value::as_str) else {
            self.warn("`text` is missing or not a string; layer skipped");
            return TextLayer::placeholder();
        };
        let Some(geo) = self.geometry() else {
            return TextLayer::placeholder();
        };

        let font_size = self.number_or("fontSize", DEFAULT_FONT_SIZE);
        let font_size = if font_size > 0.0 {
            font_size
        } else {
            self.warn(format!(
                "`fontSize` must be > 0, got {font_size}; using {DEFAULT_FONT_SIZE}"
            ));
            DEFAULT_FONT_SIZE
        };

        TextLayer {
            text: text.to_owned(),
            font_size,
            font_family: self.string_opt("fontFamily"),
            color: self.color(),
            opacity: self.number_or("opacity", 1.0).clamp(0.0, 1.0),
            x: geo.x,
            y: geo.y,
            width: geo.width,
            height: geo.height,
            max_lines: self.max_lines(),
            alignment: self.alignment(),
            bold: self.bool_or("bold", false),
        }
    }

    /// Required `x`, `y`, `width`, `height`. Reports every missing one.
    fn geometry(&mut self) -> Option<Geometry> {
        let x = self.required_number("x");
        let y = self.required_number("y");
        let width = self.required_number("width");
        let height = self.required_number("height");
        Some(Geometry {
            x: x?,
            y: y?,
            width: width?,
            height: height?,
        })
    }

    fn required_number(&mut self, key: &str) -> Option<f64> {
        let obj = self.obj;
        let v = obj.get(key).and_then(Value::as_f64).filter(|v| v.is_finite());
        if v.is_none() {
            self.warn(format!(
                "required field `{key}` is missing or not a number; layer skipped"
            ));
        }
        v
    }

    fn number_or(&mut self, key: &str, default: f64) -> f64 {
        let obj = self.obj;
        match obj.get(key) {
            None | Some(Value::Null) => default,
            Some(v) => match v.as_f64().filter(|v| v.is_finite()) {
                Some(n) => n,
                None => {
                    self.warn(format!("`{key}` is not a number; using {default}"));
                    default
                }
            },
        }
    }

    fn bool_or(&mut self, key: &str, default: bool) -> bool {
        let obj = self.obj;
        match obj.get(key) {
            None | Some(Value::Null) => default,
            Some(Value::Bool(b)) => *b,
            Some(_) => {
                self.warn(format!("`{key}` is not a boolean; using {default}"));
                default
            }
        }
    }

    fn string_opt(&mut self, key: &str) -> Option<String> {
        let obj = self.obj;
        match obj.get(key) {
            None | Some(Value::Null) => None,
            Some(Value::String(s)) if !s.trim().is_empty() => Some(s.trim().to_owned()),
            Some(_) => {
                self.warn(format!("`{key}` is not a non-empty string; using default"));
                None
            }
        }
    }

    fn color(&mut self) -> ColorSpec {
        let obj = self.obj;
        let Some(raw) = obj.get("color").filter(|v| !v.is_null()) else {
            return ColorSpec::default();
        };
        match ColorSpec::from_json(raw) {
            Some(spec) => {
                if let Err(e) = try_parse_color(&spec) {
                    self.warn(format!("{e}; using white"));
                }
                spec
            }
            None => {
                self.warn("`color` must be a hex string or numeric tuple; using white");
                ColorSpec::default()
            }
        }
    }

    fn max_lines(&mut self) -> Option<u32> {
        let obj = self.obj;
        match obj.get("maxLines") {
            None | Some(Value::Null) => None,
            Some(v) => match v.as_f64().filter(|v| !v.is_nan()) {
                Some(n) if n < 1.0 => Some(0),
                Some(n) => Some(n.floor().min(u32::MAX as f64) as u32),
                None => {
                    self.warn("`maxLines` is not a number; not limiting lines");
                    None
                }
            },
        }
    }

    fn alignment(&mut self) -> Alignment {
        let obj = self.obj;
        match obj.get("alignment") {
            None | Some(Value::Null) => Alignment::Center,
            Some(Value::String(s)) => Alignment::parse(s).unwrap_or_else(|| {
                self.warn(format!("unknown alignment \"{s}\"; using center"));
                Alignment::Center
            }),
            Some(_) => {
                self.warn("`alignment` is not a string; using center");
                Alignment::Center
            }
        }
    }
}

/// Resolve the canvas config object. Any problem here is terminal.
pub fn parse_canvas_config(value: &Value) -> LayergenResult<CanvasConfig> {
    let obj = value
        .as_object()
        .ok_or_else(|| LayergenError::validation("canvas config must be an object"))?;

    let dim = |key: &str| -> LayergenResult<u32> {
        let v = obj
            .get(key)
            .and_then(Value::as_f64)
            .ok_or_else(|| LayergenError::validation(format!("canvas `{key}` must be a number")))?;
        if !v.is_finite() || v.fract() != 0.0 || v < 1.0 || v > f64::from(MAX_CANVAS_DIM) {
            return Err(LayergenError::validation(format!(
                "canvas `{key}` must be an integer in 1..={MAX_CANVAS_DIM}, got {v}"
            )));
        }
        Ok(v as u32)
    };

    let file_path = match obj.get("filePath") {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) => Some(s.clone()),
        Some(_) => {
            return Err(LayergenError::validation(
                "canvas `filePath` must be a string",
            ));
        }
    };
    let base64 = match obj.get("base64") {
        None | Some(Value::Null) => false,
        Some(Value::Bool(b)) => *b,
        Some(_) => {
            return Err(LayergenError::validation(
                "canvas `base64` must be a boolean",
            ));
        }
    };

    let cfg = CanvasConfig {
        width: dim("width")?,
        height: dim("height")?,
        file_path,
        base64,
    };
    cfg.validate()?;
    Ok(cfg)
}

#[cfg(test)]
#[path = "../../tests/unit/layer/parse.rs"]
mod tests;
