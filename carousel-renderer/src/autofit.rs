//! Auto-fit sizer.
//!
//! Picks the largest integer font size at which text fits its box. Both the
//! editor preview and the final render call [`fit`] with the same
//! [`TextMeasurer`], so the two agree on every size.
//!
//! ```text
//!   lo = 8                                   hi = 300
//!   ├──────────────┬───────────────────────────┤
//!                 mid ── measure ── fits? ── keep mid, search above
//!                                     └─ no ── search below
//! ```
//!
//! The range holds 293 sizes, so a search takes at most nine probes.

use carousel_core::{TextStyle, TextTransform};
use serde::{Deserialize, Serialize};

/// Bounds of the search and the size used when nothing fits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FitConfig {
    /// Smallest size probed.
    pub min_size: u32,
    /// Largest size probed.
    pub max_size: u32,
    /// Result when no size in range fits.
    pub fallback: u32,
}

impl Default for FitConfig {
    fn default() -> Self {
        Self {
            min_size: 8,
            max_size: 300,
            fallback: 16,
        }
    }
}

/// Style properties that change how text wraps.
#[derive(Debug, Clone, PartialEq)]
pub struct WrapStyle {
    /// Font family.
    pub font_family: Option<String>,
    /// Numeric weight (100-900).
    pub font_weight: u16,
    /// Line height as a multiple of the font size.
    pub line_height: f32,
    /// Extra space after every character, in pixels.
    pub letter_spacing: f32,
    /// Case transformation applied before measuring.
    pub text_transform: TextTransform,
}

impl Default for WrapStyle {
    fn default() -> Self {
        Self {
            font_family: None,
            font_weight: 400,
            line_height: 1.2,
            letter_spacing: 0.0,
            text_transform: TextTransform::None,
        }
    }
}

impl WrapStyle {
    /// Wrap-affecting properties of a text element.
    #[must_use]
    pub fn from_text(style: &TextStyle) -> Self {
        Self {
            font_family: style.font_family.clone(),
            font_weight: style.font_weight,
            line_height: style.line_height,
            letter_spacing: style.letter_spacing,
            text_transform: style.text_transform,
        }
    }
}

/// Size of a laid-out block of text.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextExtent {
    /// Width of the widest line.
    pub width: f32,
    /// Total height of all lines.
    pub height: f32,
}

/// Lays out text and reports its size.
///
/// Implementations must be deterministic: the same inputs always produce the
/// same extent.
pub trait TextMeasurer: Send + Sync {
    /// Measure `text` at `font_size`, wrapping at `max_width`.
    fn measure(&self, text: &str, font_size: f32, max_width: f32, style: &WrapStyle) -> TextExtent;
}

/// Deterministic measurer based on per-character advance widths.
///
/// Words wrap greedily at spaces; explicit newlines always break. A word
/// longer than the line overflows instead of breaking.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MetricsMeasurer;

impl MetricsMeasurer {
    /// Advance width of a character in ems.
    fn advance(ch: char) -> f32 {
        match ch {
            ' ' | 'i' | 'j' | 'l' | '\'' | '.' | ',' | ':' | ';' | '!' | '|' => 0.28,
            'f' | 'r' | 't' | 'I' | '(' | ')' | '[' | ']' => 0.36,
            'm' | 'w' => 0.84,
            'M' | 'W' => 0.94,
            '0'..='9' => 0.56,
            c if c.is_uppercase() => 0.68,
            c if u32::from(c) >= 0x2E80 => 1.0,
            _ => 0.52,
        }
    }

    fn weight_factor(weight: u16) -> f32 {
        1.0 + (f32::from(weight) - 400.0) * 0.0002
    }

    fn width_of(text: &str, font_size: f32, style: &WrapStyle) -> f32 {
        let factor = Self::weight_factor(style.font_weight);
        let mut ems = 0.0;
        let mut chars = 0u16;
        for ch in text.chars() {
            ems += Self::advance(ch);
            chars = chars.saturating_add(1);
        }
        (font_size * ems * factor + style.letter_spacing * f32::from(chars)).max(0.0)
    }
}

impl TextMeasurer for MetricsMeasurer {
    fn measure(&self, text: &str, font_size: f32, max_width: f32, style: &WrapStyle) -> TextExtent {
        let text = style.text_transform.apply(text);
        let space = Self::width_of(" ", font_size, style);
        let mut widest = 0.0_f32;
        let mut lines = 0u16;

        for paragraph in text.split('\n') {
            let mut line = 0.0_f32;
            let mut line_has_words = false;
            for word in paragraph.split(' ').filter(|w| !w.is_empty()) {
                let word_width = Self::width_of(word, font_size, style);
                if line_has_words && line + space + word_width > max_width {
                    widest = widest.max(line);
                    lines = lines.saturating_add(1);
                    line = word_width;
                } else if line_has_words {
                    line += space + word_width;
                } else {
                    line = word_width;
                }
                line_has_words = true;
            }
            widest = widest.max(line);
            lines = lines.saturating_add(1);
        }

        TextExtent {
            width: widest,
            height: f32::from(lines) * font_size * style.line_height,
        }
    }
}

/// A block of text laid out on its own lines, inset from the box edges.
#[derive(Debug, Clone, PartialEq)]
pub struct FitBlock {
    /// Displayed text.
    pub text: String,
    /// Horizontal space taken by borders and padding.
    pub inset_x: f32,
    /// Vertical space taken by borders and padding.
    pub inset_y: f32,
}

impl FitBlock {
    /// Block without insets.
    #[must_use]
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            inset_x: 0.0,
            inset_y: 0.0,
        }
    }
}

/// Largest font size in range at which `content` fits the box, or the
/// configured fallback when none does.
#[must_use]
pub fn fit(
    measurer: &dyn TextMeasurer,
    config: &FitConfig,
    content: &str,
    width: f32,
    height: f32,
    style: &WrapStyle,
) -> u32 {
    fit_blocks(
        measurer,
        config,
        &[FitBlock::plain(content)],
        width,
        height,
        style,
    )
}

/// Like [`fit`] for text stacked as blocks: every block must fit the width
/// after its inset, and the block heights plus insets must fit the height.
#[must_use]
pub fn fit_blocks(
    measurer: &dyn TextMeasurer,
    config: &FitConfig,
    blocks: &[FitBlock],
    width: f32,
    height: f32,
    style: &WrapStyle,
) -> u32 {
    let fits = |size: u32| {
        let mut total = 0.0_f32;
        for block in blocks {
            let inner_width = width - block.inset_x;
            #[allow(clippy::cast_precision_loss)]
            let extent = measurer.measure(&block.text, size as f32, inner_width, style);
            if extent.width > inner_width {
                return false;
            }
            total += extent.height + block.inset_y;
        }
        total <= height
    };

    let (mut lo, mut hi) = (config.min_size, config.max_size);
    let mut best = None;
    let mut probes = 0u32;
    while lo <= hi {
        let mid = lo + (hi - lo) / 2;
        probes += 1;
        if fits(mid) {
            best = Some(mid);
            lo = mid + 1;
        } else if mid == 0 {
            break;
        } else {
            hi = mid - 1;
        }
    }

    let size = best.unwrap_or(config.fallback);
    tracing::debug!(
        "Auto-fit chose {}px for {}x{} box ({} blocks) after {} probes{}",
        size,
        width,
        height,
        blocks.len(),
        probes,
        if best.is_none() { " (fallback)" } else { "" }
    );
    size
}
