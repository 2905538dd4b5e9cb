//! Style attributes shared by element kinds: fills, gradients, strokes,
//! shadows, highlight and quote settings, and the enumerated text options.

use serde::{Deserialize, Serialize};

/// A color-bearing attribute that can be overridden from the binding map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ColorSlot {
    /// Text color.
    Color,
    /// Background fill color.
    BackgroundColor,
    /// `**highlight**` span color.
    HighlightColor,
    /// Shadow color.
    ShadowColor,
    /// Stroke (border) color.
    StrokeColor,
    /// Quote callout left border color.
    QuoteBorderColor,
    /// Quote callout background color.
    QuoteBackgroundColor,
}

impl ColorSlot {
    /// Every slot, in a stable order.
    pub const ALL: [Self; 7] = [
        Self::Color,
        Self::BackgroundColor,
        Self::HighlightColor,
        Self::ShadowColor,
        Self::StrokeColor,
        Self::QuoteBorderColor,
        Self::QuoteBackgroundColor,
    ];

    /// Attribute name as persisted, used as the binding key suffix.
    #[must_use]
    pub const fn attr(self) -> &'static str {
        match self {
            Self::Color => "color",
            Self::BackgroundColor => "backgroundColor",
            Self::HighlightColor => "highlightColor",
            Self::ShadowColor => "shadowColor",
            Self::StrokeColor => "strokeColor",
            Self::QuoteBorderColor => "quoteBorderColor",
            Self::QuoteBackgroundColor => "quoteBackgroundColor",
        }
    }
}

/// Horizontal text alignment.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextAlign {
    /// Flush left.
    #[default]
    Left,
    /// Centered.
    Center,
    /// Flush right.
    Right,
}

impl TextAlign {
    /// CSS keyword.
    #[must_use]
    pub const fn as_css(self) -> &'static str {
        match self {
            Self::Left => "left",
            Self::Center => "center",
            Self::Right => "right",
        }
    }

    /// Flexbox main-axis placement matching this alignment.
    #[must_use]
    pub const fn justify_content(self) -> &'static str {
        match self {
            Self::Left => "flex-start",
            Self::Center => "center",
            Self::Right => "flex-end",
        }
    }
}

/// Vertical placement of text inside its box.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VerticalAlign {
    /// Top of the box.
    Top,
    /// Vertically centered.
    #[default]
    Middle,
    /// Bottom of the box.
    Bottom,
}

impl VerticalAlign {
    /// Flexbox cross-axis placement matching this alignment.
    #[must_use]
    pub const fn align_items(self) -> &'static str {
        match self {
            Self::Top => "flex-start",
            Self::Middle => "center",
            Self::Bottom => "flex-end",
        }
    }
}

/// Font style.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FontStyle {
    /// Upright.
    #[default]
    Normal,
    /// Italic.
    Italic,
}

impl FontStyle {
    /// CSS keyword.
    #[must_use]
    pub const fn as_css(self) -> &'static str {
        match self {
            Self::Normal => "normal",
            Self::Italic => "italic",
        }
    }
}

/// Text decoration line.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TextDecoration {
    /// No decoration.
    #[default]
    None,
    /// Underline.
    Underline,
    /// Strike-through.
    LineThrough,
}

impl TextDecoration {
    /// CSS keyword.
    #[must_use]
    pub const fn as_css(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Underline => "underline",
            Self::LineThrough => "line-through",
        }
    }
}

/// Case transformation applied at display time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextTransform {
    /// Unchanged.
    #[default]
    None,
    /// Upper case.
    Uppercase,
    /// Lower case.
    Lowercase,
    /// First letter of each word upper case.
    Capitalize,
}

impl TextTransform {
    /// CSS keyword.
    #[must_use]
    pub const fn as_css(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Uppercase => "uppercase",
            Self::Lowercase => "lowercase",
            Self::Capitalize => "capitalize",
        }
    }

    /// Apply the transformation to `text` the way a browser displays it.
    #[must_use]
    pub fn apply(self, text: &str) -> String {
        match self {
            Self::None => text.to_string(),
            Self::Uppercase => text.to_uppercase(),
            Self::Lowercase => text.to_lowercase(),
            Self::Capitalize => {
                let mut out = String::with_capacity(text.len());
                let mut at_word_start = true;
                for ch in text.chars() {
                    if at_word_start && ch.is_alphabetic() {
                        out.extend(ch.to_uppercase());
                    } else {
                        out.push(ch);
                    }
                    at_word_start = ch.is_whitespace();
                }
                out
            }
        }
    }
}

/// How a text element reacts when its content does not fit.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Resizing {
    /// Wrap freely.
    #[default]
    Plain,
    /// One line, truncated with an ellipsis.
    Single,
    /// At most three lines, overflow hidden.
    Clamp,
    /// Pick the largest font size that fits the box.
    Fitty,
}

/// Rendering of `**highlight**` spans.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HighlightMode {
    /// Colored, padded, rounded background behind the span.
    #[default]
    Background,
    /// Recolor and embolden the span text.
    Text,
}

/// Image scaling mode.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ObjectFit {
    /// Fill the box, cropping overflow.
    #[default]
    Cover,
    /// Fit inside the box, letterboxing.
    Contain,
    /// Stretch to the box.
    Fill,
}

impl ObjectFit {
    /// CSS keyword.
    #[must_use]
    pub const fn as_css(self) -> &'static str {
        match self {
            Self::Cover => "cover",
            Self::Contain => "contain",
            Self::Fill => "fill",
        }
    }
}

/// Highlight span settings of a text element.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Highlight {
    /// Span color; a default is used when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub highlight_color: Option<String>,
    /// Runtime override flag for [`ColorSlot::HighlightColor`].
    pub highlight_color_dynamic: bool,
    /// Horizontal padding of background spans, in pixels.
    pub highlight_padding: f32,
    /// Corner radius of background spans, in pixels.
    pub highlight_radius: f32,
    /// Background or text recoloring.
    pub highlight_mode: HighlightMode,
}

impl Default for Highlight {
    fn default() -> Self {
        Self {
            highlight_color: None,
            highlight_color_dynamic: false,
            highlight_padding: 4.0,
            highlight_radius: 4.0,
            highlight_mode: HighlightMode::Background,
        }
    }
}

/// Quote callout settings of a text element.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct QuoteStyle {
    /// Left border color.
    pub quote_border_color: String,
    /// Runtime override flag for [`ColorSlot::QuoteBorderColor`].
    pub quote_border_color_dynamic: bool,
    /// Callout background color.
    pub quote_background_color: String,
    /// Runtime override flag for [`ColorSlot::QuoteBackgroundColor`].
    pub quote_background_color_dynamic: bool,
    /// Left border width in pixels.
    pub quote_border_width: f32,
    /// Inner padding in pixels.
    pub quote_padding: f32,
}

impl Default for QuoteStyle {
    fn default() -> Self {
        Self {
            quote_border_color: "#7e3af2".to_string(),
            quote_border_color_dynamic: false,
            quote_background_color: "rgba(126, 58, 242, 0.12)".to_string(),
            quote_background_color_dynamic: false,
            quote_border_width: 4.0,
            quote_padding: 8.0,
        }
    }
}

/// Solid or gradient background.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Fill {
    /// Solid color.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub background_color: Option<String>,
    /// Runtime override flag for [`ColorSlot::BackgroundColor`].
    pub background_color_dynamic: bool,
    /// Gradient, which takes precedence over the solid color.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gradient: Option<Gradient>,
}

/// One color stop of a linear gradient.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GradientStop {
    /// Stop color.
    pub color: String,
    /// Stop opacity in `[0, 1]`.
    #[serde(default = "full_opacity")]
    pub opacity: f32,
    /// Position along the gradient line, `0..=100`.
    #[serde(default)]
    pub position: f32,
}

const fn full_opacity() -> f32 {
    1.0
}

/// A linear gradient, either as explicit stops or in the legacy
/// start/end form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
#[allow(missing_docs)]
pub struct Gradient {
    /// Gradient line angle in degrees (CSS convention, 180 = top to bottom).
    pub angle: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stops: Option<Vec<GradientStop>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_opacity: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_opacity: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_position: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_position: Option<f32>,
}

impl Default for Gradient {
    fn default() -> Self {
        Self {
            angle: 180.0,
            stops: None,
            start: None,
            end: None,
            start_opacity: None,
            end_opacity: None,
            start_position: None,
            end_position: None,
        }
    }
}

impl Gradient {
    /// Stops ready for interpolation, sorted by position ascending.
    ///
    /// Without a `stops` array, a two-stop gradient is synthesized from the
    /// legacy start/end attributes.
    #[must_use]
    pub fn resolved_stops(&self) -> Vec<GradientStop> {
        let mut stops = self.stops.clone().unwrap_or_else(|| {
            vec![
                GradientStop {
                    color: self.start.clone().unwrap_or_else(|| "#000000".to_string()),
                    opacity: self.start_opacity.unwrap_or(1.0),
                    position: self.start_position.unwrap_or(0.0),
                },
                GradientStop {
                    color: self.end.clone().unwrap_or_else(|| "#ffffff".to_string()),
                    opacity: self.end_opacity.unwrap_or(1.0),
                    position: self.end_position.unwrap_or(100.0),
                },
            ]
        });
        stops.sort_by(|a, b| a.position.total_cmp(&b.position));
        stops
    }
}

/// Outline drawn around an element.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Stroke {
    /// Stroke color.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stroke_color: Option<String>,
    /// Stroke width in pixels; zero disables the stroke.
    pub stroke_width: f32,
    /// Runtime override flag for [`ColorSlot::StrokeColor`].
    pub stroke_color_dynamic: bool,
}

impl Stroke {
    /// Whether a visible stroke is configured.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.stroke_width > 0.0
    }
}

/// Drop shadow.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Shadow {
    /// Shadow color; unset disables the shadow.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shadow_color: Option<String>,
    /// Horizontal offset in pixels.
    pub shadow_offset_x: f32,
    /// Vertical offset in pixels.
    pub shadow_offset_y: f32,
    /// Blur radius in pixels.
    pub shadow_blur: f32,
    /// Runtime override flag for [`ColorSlot::ShadowColor`].
    pub shadow_color_dynamic: bool,
}
