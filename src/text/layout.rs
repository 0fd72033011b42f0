use crate::foundation::core::Point;
use crate::foundation::error::LayergenResult;
use crate::text::shaper::{TextFont, TextShaper};

/// Slack allowed when comparing a measured width against the wrap width.
const WRAP_EPSILON: f32 = 0.01;

/// Horizontal alignment of each line within the text block.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Alignment {
    Left,
    #[default]
    Center,
    Right,
}

impl Alignment {
    /// Case-insensitive parse; `None` for unrecognized names.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "left" => Some(Self::Left),
            "center" | "centre" => Some(Self::Center),
            "right" => Some(Self::Right),
            _ => None,
        }
    }
}

/// One laid-out line.
#[derive(Clone, Debug, PartialEq)]
pub struct Line {
    /// Visible line text, without trailing whitespace.
    pub text: String,
    pub width_px: f32,
    /// Byte offset of the line start in [`TextBlock::text`].
    pub start: usize,
    /// Break offset: where the next line starts, including whitespace consumed by the break.
    pub end: usize,
}

/// Result of wrap-then-truncate layout.
#[derive(Clone, Debug, PartialEq)]
pub struct TextBlock {
    /// Text actually laid out; a prefix of the input when `truncated`.
    pub text: String,
    pub lines: Vec<Line>,
    pub truncated: bool,
}

/// Layer rectangle the block is placed into.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LayoutBox {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl LayoutBox {
    /// Width available for wrapping: `width - x`.
    ///
    /// The layer's `x` doubles as horizontal padding, with half of it applied as left inset.
    pub fn wrap_width(&self) -> f64 {
        self.width - self.x
    }

    /// Left edge of the text block: `x + x / 2`.
    pub fn block_left(&self) -> f64 {
        self.x + self.x / 2.0
    }
}

/// Greedy word-wrap with line-count truncation.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TextLayoutEngine {
    pub max_width_px: f32,
    pub max_lines: Option<u32>,
}

impl TextLayoutEngine {
    pub fn new(max_width_px: f32, max_lines: Option<u32>) -> Self {
        Self {
            max_width_px,
            max_lines,
        }
    }

    /// Wrap `text`, then, if it needs more than `max_lines` lines, cut the original text at the
    /// break ending line `max_lines`, trim trailing whitespace, and wrap that prefix again.
    pub fn layout<S: TextShaper + ?Sized>(
        &self,
        text: &str,
        shaper: &mut S,
        font: &TextFont,
    ) -> LayergenResult<TextBlock> {
        let lines = self.wrap(text, shaper, font)?;
        let limit = match self.max_lines {
            Some(m) if lines.len() > m as usize => m as usize,
            _ => {
                return Ok(TextBlock {
                    text: text.to_owned(),
                    lines,
                    truncated: false,
                });
            }
        };

        if limit == 0 {
            return Ok(TextBlock {
                text: String::new(),
                lines: Vec::new(),
                truncated: true,
            });
        }

        let prefix = text[..lines[limit - 1].end].trim_end();
        let lines = self.wrap(prefix, shaper, font)?;
        debug_assert!(lines.len() <= limit);
        Ok(TextBlock {
            text: prefix.to_owned(),
            lines,
            truncated: true,
        })
    }

    /// Greedy wrap at whitespace. `\n` forces a break; a word wider than the limit gets a line
    /// of its own and is never split.
    pub fn wrap<S: TextShaper + ?Sized>(
        &self,
        text: &str,
        shaper: &mut S,
        font: &TextFont,
    ) -> LayergenResult<Vec<Line>> {
        let mut lines = Vec::new();
        let mut para_start = 0;
        for para in text.split_inclusive('\n') {
            let para_end = para_start + para.len();
            let content = para.trim_end_matches(['\n', '\r']);
            self.wrap_paragraph(text, para_start, content, para_end, shaper, font, &mut lines)?;
            para_start = para_end;
        }
        Ok(lines)
    }

    #[allow(clippy::too_many_arguments)]
    fn wrap_paragraph<S: TextShaper + ?Sized>(
        &self,
        text: &str,
        para_start: usize,
        content: &str,
        para_end: usize,
        shaper: &mut S,
        font: &TextFont,
        lines: &mut Vec<Line>,
    ) -> LayergenResult<()> {
        let mut line_start = para_start;
        let mut line_end: Option<usize> = None;

        for (ws, we) in word_spans(content) {
            let (ws, we) = (para_start + ws, para_start + we);
            let Some(cur_end) = line_end else {
                line_end = Some(we);
                continue;
            };
            let candidate = shaper.measure(&text[line_start..we], font)?;
            if candidate <= self.max_width_px + WRAP_EPSILON {
                line_end = Some(we);
            } else {
                lines.push(make_line(text, line_start, cur_end, ws, shaper, font)?);
                line_start = ws;
                line_end = Some(we);
            }
        }

        let content_end = line_end.unwrap_or(line_start);
        lines.push(make_line(
            text,
            line_start,
            content_end,
            para_end,
            shaper,
            font,
        )?);
        Ok(())
    }
}

fn make_line<S: TextShaper + ?Sized>(
    text: &str,
    start: usize,
    content_end: usize,
    break_end: usize,
    shaper: &mut S,
    font: &TextFont,
) -> LayergenResult<Line> {
    let visible = &text[start..content_end];
    let width_px = if visible.is_empty() {
        0.0
    } else {
        shaper.measure(visible, font)?
    };
    Ok(Line {
        text: visible.to_owned(),
        width_px,
        start,
        end: break_end,
    })
}

/// Byte spans of words separated by breakable whitespace.
fn word_spans(s: &str) -> impl Iterator<Item = (usize, usize)> + '_ {
    let mut iter = s.char_indices().peekable();
    std::iter::from_fn(move || {
        while let Some(&(_, c)) = iter.peek() {
            if !is_break_space(c) {
                break;
            }
            iter.next();
        }
        let (start, _) = *iter.peek()?;
        let mut end = start;
        while let Some(&(i, c)) = iter.peek() {
            if is_break_space(c) {
                break;
            }
            end = i + c.len_utf8();
            iter.next();
        }
        Some((start, end))
    })
}

/// Whitespace that allows a line break. No-break spaces glue their neighbors together.
fn is_break_space(c: char) -> bool {
    c.is_whitespace() && !matches!(c, '\u{a0}' | '\u{2007}' | '\u{202f}')
}

/// Top-left origin of every line of `block` inside `bounds`.
///
/// The block is centered vertically in the layer height; lines are aligned within the wrap
/// width starting at [`LayoutBox::block_left`].
pub fn position_lines(
    block: &TextBlock,
    bounds: &LayoutBox,
    alignment: Alignment,
    line_height: f32,
) -> Vec<Point> {
    let line_height = f64::from(line_height);
    let block_height = line_height * block.lines.len() as f64;
    let top = bounds.y + (bounds.height - block_height) / 2.0;
    let left = bounds.block_left();
    let block_width = bounds.wrap_width();

    block
        .lines
        .iter()
        .enumerate()
        .map(|(i, line)| {
            let w = f64::from(line.width_px);
            let dx = match alignment {
                Alignment::Left => 0.0,
                Alignment::Center => (block_width - w) / 2.0,
                Alignment::Right => block_width - w,
            };
            Point::new(left + dx, top + line_height * i as f64)
        })
        .collect()
}

#[cfg(test)]
#[path = "../../tests/unit/text/layout.rs"]
mod tests;
