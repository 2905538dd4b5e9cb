//! Derived CSS: declaration lists, colors with opacity, gradients, borders,
//! shadows and the contour filter stack.

use std::fmt::Write as _;

use carousel_core::{Gradient, Shadow, Stroke};

use crate::markup::escape_attribute;

/// Fallback stroke color.
pub const DEFAULT_STROKE_COLOR: &str = "#000000";

/// An ordered list of CSS declarations rendered into a `style` attribute.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Declarations(Vec<(String, String)>);

impl Declarations {
    /// Empty declaration list.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a declaration.
    pub fn push(&mut self, property: &str, value: impl Into<String>) -> &mut Self {
        self.0.push((property.to_string(), value.into()));
        self
    }

    /// Append a pixel length.
    pub fn px(&mut self, property: &str, value: f32) -> &mut Self {
        self.push(property, px(value))
    }

    /// Append every declaration of `other`.
    pub fn extend(&mut self, other: Declarations) -> &mut Self {
        self.0.extend(other.0);
        self
    }

    /// Value of the last declaration of `property`.
    #[must_use]
    pub fn get(&self, property: &str) -> Option<&str> {
        self.0
            .iter()
            .rev()
            .find(|(p, _)| p == property)
            .map(|(_, v)| v.as_str())
    }

    /// Whether the list is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Render as `prop: value; prop: value;`.
    #[must_use]
    pub fn to_style(&self) -> String {
        let mut out = String::new();
        for (i, (property, value)) in self.0.iter().enumerate() {
            if i > 0 {
                out.push(' ');
            }
            let _ = write!(out, "{property}: {value};");
        }
        out
    }

    /// [`Self::to_style`] escaped for a `style="…"` attribute.
    #[must_use]
    pub fn to_attribute(&self) -> String {
        escape_attribute(&self.to_style())
    }
}

/// Format a pixel length (`80px`, `0.5px`).
#[must_use]
pub fn px(value: f32) -> String {
    format!("{value}px")
}

/// Parse `#rgb` or `#rrggbb`.
#[must_use]
pub fn parse_hex(color: &str) -> Option<(u8, u8, u8)> {
    let hex = color.trim().strip_prefix('#')?;
    let channel = |s: &str| u8::from_str_radix(s, 16).ok();
    match hex.len() {
        3 => {
            let mut digits = hex.chars().map(|c| c.to_digit(16));
            let mut next = || {
                digits
                    .next()
                    .flatten()
                    .and_then(|d| u8::try_from(d * 17).ok())
            };
            Some((next()?, next()?, next()?))
        }
        6 => Some((
            channel(hex.get(0..2)?)?,
            channel(hex.get(2..4)?)?,
            channel(hex.get(4..6)?)?,
        )),
        _ => None,
    }
}

/// Combine a color with an opacity.
///
/// Hex colors become `rgba(...)` when the opacity is below one. Other color
/// syntaxes pass through unchanged.
#[must_use]
pub fn color_with_opacity(color: &str, opacity: f32) -> String {
    let opacity = if opacity.is_finite() {
        opacity.clamp(0.0, 1.0)
    } else {
        1.0
    };
    if opacity >= 1.0 {
        return color.to_string();
    }
    match parse_hex(color) {
        Some((r, g, b)) => format!("rgba({r}, {g}, {b}, {opacity})"),
        None => color.to_string(),
    }
}

/// CSS `linear-gradient(...)` with stops in ascending position order.
#[must_use]
pub fn linear_gradient(gradient: &Gradient) -> String {
    let mut out = format!("linear-gradient({}deg", gradient.angle);
    for stop in gradient.resolved_stops() {
        let _ = write!(
            out,
            ", {} {}%",
            color_with_opacity(&stop.color, stop.opacity),
            stop.position
        );
    }
    out.push(')');
    out
}

/// `border` value for an active stroke.
#[must_use]
pub fn border(stroke: &Stroke, color: Option<&str>) -> Option<String> {
    stroke.is_active().then(|| {
        format!(
            "{} solid {}",
            px(stroke.stroke_width),
            color.unwrap_or(DEFAULT_STROKE_COLOR)
        )
    })
}

/// `box-shadow` value when a shadow color is set.
#[must_use]
pub fn box_shadow(shadow: &Shadow, color: Option<&str>) -> Option<String> {
    color.map(|color| {
        format!(
            "{} {} {} {color}",
            px(shadow.shadow_offset_x),
            px(shadow.shadow_offset_y),
            px(shadow.shadow_blur)
        )
    })
}

/// Stack of `drop-shadow()` filters outlining the visible pixels of an
/// image: four cardinal offsets at the stroke width, then the shadow.
#[must_use]
pub fn contour_filter(
    stroke: &Stroke,
    stroke_color: Option<&str>,
    shadow: &Shadow,
    shadow_color: Option<&str>,
) -> Option<String> {
    let mut filters = Vec::with_capacity(5);
    if stroke.is_active() {
        let color = stroke_color.unwrap_or(DEFAULT_STROKE_COLOR);
        let w = stroke.stroke_width;
        for (dx, dy) in [(w, 0.0), (-w, 0.0), (0.0, w), (0.0, -w)] {
            filters.push(format!("drop-shadow({} {} 0 {color})", px(dx), px(dy)));
        }
    }
    if let Some(color) = shadow_color {
        filters.push(format!(
            "drop-shadow({} {} {} {color})",
            px(shadow.shadow_offset_x),
            px(shadow.shadow_offset_y),
            px(shadow.shadow_blur)
        ));
    }
    (!filters.is_empty()).then(|| filters.join(" "))
}
