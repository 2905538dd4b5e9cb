//! Canvas elements - the building blocks of template scenes.

use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

use crate::style::{
    ColorSlot, Fill, FontStyle, Highlight, ObjectFit, QuoteStyle, Resizing, Shadow, Stroke,
    TextAlign, TextDecoration, TextTransform, VerticalAlign,
};

/// Smallest width or height an element may take, in canvas pixels.
pub const MIN_DIMENSION: f32 = 20.0;

/// Unique identifier for an element.
///
/// Persisted templates carry either numeric or string ids; both are
/// normalized to their string form on load.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "WireId", into = "String")]
pub struct ElementId(String);

impl ElementId {
    /// Create a new unique element ID.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Borrow the id as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for ElementId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ElementId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ElementId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for ElementId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<ElementId> for String {
    fn from(id: ElementId) -> Self {
        id.0
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum WireId {
    Text(String),
    Integer(i64),
    Float(f64),
}

impl From<WireId> for ElementId {
    fn from(wire: WireId) -> Self {
        match wire {
            WireId::Text(s) => Self(s),
            WireId::Integer(n) => Self(n.to_string()),
            WireId::Float(n) => Self(n.to_string()),
        }
    }
}

/// Position, size and rotation of an element in canvas pixels.
///
/// `x`/`y` locate the unrotated top-left corner; rotation (degrees) is applied
/// about the box center when rendered.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Geometry {
    /// X position (pixels from left).
    pub x: f32,
    /// Y position (pixels from top).
    pub y: f32,
    /// Width in pixels.
    pub width: f32,
    /// Height in pixels.
    pub height: f32,
    /// Rotation in degrees, clockwise.
    #[serde(default)]
    pub rotation: f32,
}

impl Default for Geometry {
    fn default() -> Self {
        Self {
            x: 80.0,
            y: 80.0,
            width: 100.0,
            height: 100.0,
            rotation: 0.0,
        }
    }
}

impl Geometry {
    /// Create an unrotated geometry.
    #[must_use]
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
            rotation: 0.0,
        }
    }

    /// Set the rotation in degrees.
    #[must_use]
    pub const fn with_rotation(mut self, rotation: f32) -> Self {
        self.rotation = rotation;
        self
    }

    /// Center of the box, the pivot for rotation.
    #[must_use]
    pub fn center(&self) -> (f32, f32) {
        (self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    /// Enforce the model invariants: dimensions floored at [`MIN_DIMENSION`]
    /// and rotation wrapped into `[0, 360)`.
    #[must_use]
    pub fn normalized(self) -> Self {
        Self {
            x: self.x,
            y: self.y,
            width: self.width.max(MIN_DIMENSION),
            height: self.height.max(MIN_DIMENSION),
            rotation: normalize_degrees(self.rotation),
        }
    }

    /// Check if a point (in canvas coordinates) lies inside the rotated box.
    #[must_use]
    pub fn contains_point(&self, x: f32, y: f32) -> bool {
        let (cx, cy) = self.center();
        // Undo the rotation by projecting the offset into the local frame.
        let theta = self.rotation.to_radians();
        let (sin, cos) = theta.sin_cos();
        let (dx, dy) = (x - cx, y - cy);
        let local_x = dx * cos + dy * sin;
        let local_y = dy * cos - dx * sin;
        local_x.abs() <= self.width / 2.0 && local_y.abs() <= self.height / 2.0
    }
}

/// Wrap an angle in degrees into `[0, 360)`.
#[must_use]
pub fn normalize_degrees(degrees: f32) -> f32 {
    if !degrees.is_finite() {
        return 0.0;
    }
    let wrapped = degrees.rem_euclid(360.0);
    // rem_euclid can round up to exactly 360 for tiny negative inputs
    if wrapped >= 360.0 {
        0.0
    } else {
        wrapped
    }
}

/// Style for a text element.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
#[allow(missing_docs)]
pub struct TextStyle {
    /// Literal text, may contain `{{key}}` placeholders and inline markup.
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font_family: Option<String>,
    pub font_size: f32,
    pub font_weight: u16,
    pub font_style: FontStyle,
    pub text_decoration: TextDecoration,
    pub color: String,
    pub color_dynamic: bool,
    pub text_align: TextAlign,
    pub vertical_align: VerticalAlign,
    pub line_height: f32,
    pub letter_spacing: f32,
    pub text_transform: TextTransform,
    pub resizing: Resizing,
    pub border_radius: f32,
    #[serde(flatten)]
    pub highlight: Highlight,
    #[serde(flatten)]
    pub quote: QuoteStyle,
    #[serde(flatten)]
    pub fill: Fill,
    #[serde(flatten)]
    pub stroke: Stroke,
    #[serde(flatten)]
    pub shadow: Shadow,
}

impl Default for TextStyle {
    fn default() -> Self {
        Self {
            content: String::new(),
            font_family: None,
            font_size: 16.0,
            font_weight: 400,
            font_style: FontStyle::default(),
            text_decoration: TextDecoration::default(),
            color: "#000000".to_string(),
            color_dynamic: false,
            text_align: TextAlign::default(),
            vertical_align: VerticalAlign::default(),
            line_height: 1.2,
            letter_spacing: 0.0,
            text_transform: TextTransform::default(),
            resizing: Resizing::default(),
            border_radius: 0.0,
            highlight: Highlight::default(),
            quote: QuoteStyle::default(),
            fill: Fill::default(),
            stroke: Stroke::default(),
            shadow: Shadow::default(),
        }
    }
}

/// Style for an image element.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ImageStyle {
    /// Image URL.
    pub content: String,
    /// How the image fills its box.
    pub fit: ObjectFit,
    /// Corner radius in pixels.
    pub border_radius: f32,
    /// Outline the visible (non-transparent) content instead of the box.
    pub contour: bool,
    /// Outline.
    #[serde(flatten)]
    pub stroke: Stroke,
    /// Drop shadow.
    #[serde(flatten)]
    pub shadow: Shadow,
}

/// Style for a shape element.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ShapeStyle {
    /// Solid color or gradient fill.
    #[serde(flatten)]
    pub fill: Fill,
    /// Corner radius in pixels.
    pub border_radius: f32,
    /// Outline.
    #[serde(flatten)]
    pub stroke: Stroke,
    /// Drop shadow.
    #[serde(flatten)]
    pub shadow: Shadow,
}

/// The type of content an element contains.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ElementKind {
    /// A styled text block.
    Text(TextStyle),
    /// A bitmap loaded from a URL.
    Image(ImageStyle),
    /// A filled rectangle.
    Shape(ShapeStyle),
}

/// Discriminant of [`ElementKind`], used by the "add element" action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ElementType {
    /// Text element.
    Text,
    /// Image element.
    Image,
    /// Shape element.
    Shape,
}

impl ElementType {
    /// Human readable layer label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Text => "Text layer",
            Self::Image => "Image layer",
            Self::Shape => "Shape layer",
        }
    }
}

impl ElementKind {
    /// The kind's discriminant.
    #[must_use]
    pub const fn element_type(&self) -> ElementType {
        match self {
            Self::Text(_) => ElementType::Text,
            Self::Image(_) => ElementType::Image,
            Self::Shape(_) => ElementType::Shape,
        }
    }

    /// Color attributes flagged as overridable at render time.
    #[must_use]
    pub fn dynamic_slots(&self) -> Vec<ColorSlot> {
        let mut slots = Vec::new();
        match self {
            Self::Text(text) => {
                if text.color_dynamic {
                    slots.push(ColorSlot::Color);
                }
                if text.fill.background_color_dynamic {
                    slots.push(ColorSlot::BackgroundColor);
                }
                if text.highlight.highlight_color_dynamic {
                    slots.push(ColorSlot::HighlightColor);
                }
                if text.shadow.shadow_color_dynamic {
                    slots.push(ColorSlot::ShadowColor);
                }
                if text.stroke.stroke_color_dynamic {
                    slots.push(ColorSlot::StrokeColor);
                }
                if text.quote.quote_border_color_dynamic {
                    slots.push(ColorSlot::QuoteBorderColor);
                }
                if text.quote.quote_background_color_dynamic {
                    slots.push(ColorSlot::QuoteBackgroundColor);
                }
            }
            Self::Image(image) => {
                if image.shadow.shadow_color_dynamic {
                    slots.push(ColorSlot::ShadowColor);
                }
                if image.stroke.stroke_color_dynamic {
                    slots.push(ColorSlot::StrokeColor);
                }
            }
            Self::Shape(shape) => {
                if shape.fill.background_color_dynamic {
                    slots.push(ColorSlot::BackgroundColor);
                }
                if shape.shadow.shadow_color_dynamic {
                    slots.push(ColorSlot::ShadowColor);
                }
                if shape.stroke.stroke_color_dynamic {
                    slots.push(ColorSlot::StrokeColor);
                }
            }
        }
        slots
    }
}

/// A canvas element: geometry, common flags and type-specific style.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Element {
    /// Unique identifier.
    pub id: ElementId,
    /// Layer name shown in the editor.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Position and size.
    #[serde(flatten)]
    pub geometry: Geometry,
    /// Opacity in `[0, 1]`.
    #[serde(default = "default_opacity")]
    pub opacity: f32,
    /// Locked elements reject every transform session.
    #[serde(default)]
    pub locked: bool,
    /// Hidden elements stay in the model but are not rendered or hit-tested.
    #[serde(default = "default_visible")]
    pub visible: bool,
    /// Binding key whose value replaces the whole content at render time.
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "empty_as_none"
    )]
    pub variable_name: Option<String>,
    /// Content type and style.
    #[serde(flatten)]
    pub kind: ElementKind,
}

const fn default_opacity() -> f32 {
    1.0
}

const fn default_visible() -> bool {
    true
}

fn empty_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value.filter(|s| !s.trim().is_empty()))
}

impl Element {
    /// Create a new element with the given kind and default geometry.
    #[must_use]
    pub fn new(kind: ElementKind) -> Self {
        Self {
            id: ElementId::new(),
            name: None,
            geometry: Geometry::default(),
            opacity: 1.0,
            locked: false,
            visible: true,
            variable_name: None,
            kind,
        }
    }

    /// Create an element of the given type with the editor's defaults.
    ///
    /// `layer_number` is used to name the layer (`"Text layer 3"`).
    #[must_use]
    pub fn with_defaults(element_type: ElementType, layer_number: usize) -> Self {
        let (kind, width, height) = match element_type {
            ElementType::Text => (
                ElementKind::Text(TextStyle {
                    content: "Text".to_string(),
                    font_size: 48.0,
                    font_weight: 600,
                    color: "#ffffff".to_string(),
                    text_align: TextAlign::Center,
                    ..TextStyle::default()
                }),
                420.0,
                90.0,
            ),
            ElementType::Image => (
                ElementKind::Image(ImageStyle {
                    content: "https://via.placeholder.com/320x320.png?text=Image".to_string(),
                    ..ImageStyle::default()
                }),
                320.0,
                320.0,
            ),
            ElementType::Shape => (
                ElementKind::Shape(ShapeStyle {
                    fill: Fill {
                        background_color: Some("#7e3af2".to_string()),
                        ..Fill::default()
                    },
                    border_radius: 12.0,
                    ..ShapeStyle::default()
                }),
                300.0,
                120.0,
            ),
        };

        let mut element = Self::new(kind).with_geometry(Geometry::new(80.0, 80.0, width, height));
        element.name = Some(format!("{} {layer_number}", element_type.label()));
        element
    }

    /// Set the geometry.
    #[must_use]
    pub fn with_geometry(mut self, geometry: Geometry) -> Self {
        self.geometry = geometry;
        self
    }

    /// Set the binding key.
    #[must_use]
    pub fn with_variable(mut self, name: impl Into<String>) -> Self {
        self.variable_name = Some(name.into());
        self
    }

    /// Set the locked flag.
    #[must_use]
    pub fn with_locked(mut self, locked: bool) -> Self {
        self.locked = locked;
        self
    }

    /// Set the visibility flag.
    #[must_use]
    pub fn with_visible(mut self, visible: bool) -> Self {
        self.visible = visible;
        self
    }

    /// Enforce geometry and opacity invariants in place.
    pub fn normalize(&mut self) {
        self.geometry = self.geometry.normalized();
        self.opacity = if self.opacity.is_finite() {
            self.opacity.clamp(0.0, 1.0)
        } else {
            1.0
        };
    }

    /// Raw content string (text or image URL), if the kind carries one.
    #[must_use]
    pub fn content(&self) -> Option<&str> {
        match &self.kind {
            ElementKind::Text(text) => Some(&text.content),
            ElementKind::Image(image) => Some(&image.content),
            ElementKind::Shape(_) => None,
        }
    }

    /// Prefix of every dynamic color binding key: the variable name, or the id.
    #[must_use]
    pub fn binding_prefix(&self) -> &str {
        self.variable_name
            .as_deref()
            .unwrap_or_else(|| self.id.as_str())
    }

    /// Check if a point (in canvas coordinates) hits this element.
    #[must_use]
    pub fn contains_point(&self, x: f32, y: f32) -> bool {
        self.visible && self.geometry.contains_point(x, y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_numeric_ids_normalize_to_strings() {
        let element: Element = serde_json::from_value(serde_json::json!({
            "id": 1,
            "type": "text",
            "x": 50, "y": 50, "width": 300, "height": 50,
            "content": "Hello {{name}}!",
            "variableName": "name",
            "fontSize": 32,
            "color": "#000000"
        }))
        .expect("element");

        assert_eq!(element.id.as_str(), "1");
        assert_eq!(element.variable_name.as_deref(), Some("name"));
        assert!(element.visible);
        assert!((element.opacity - 1.0).abs() < f32::EPSILON);
        match element.kind {
            ElementKind::Text(text) => {
                assert!((text.font_size - 32.0).abs() < f32::EPSILON);
                assert_eq!(text.content, "Hello {{name}}!");
            }
            other => panic!("expected text, got {other:?}"),
        }
    }

    #[test]
    fn test_empty_variable_name_is_none() {
        let element: Element = serde_json::from_value(serde_json::json!({
            "id": "a", "type": "shape", "x": 0, "y": 0, "width": 40, "height": 40,
            "variableName": ""
        }))
        .expect("element");
        assert!(element.variable_name.is_none());
        assert_eq!(element.binding_prefix(), "a");
    }

    #[test]
    fn test_serialize_roundtrip_keeps_flat_shape() {
        let element = Element::with_defaults(ElementType::Shape, 1);
        let value = serde_json::to_value(&element).expect("serialize");
        assert_eq!(value["type"], "shape");
        assert_eq!(value["backgroundColor"], "#7e3af2");
        assert_eq!(value["width"], 300.0);
        let back: Element = serde_json::from_value(value).expect("deserialize");
        assert_eq!(back, element);
    }

    #[test]
    fn test_normalize_enforces_invariants() {
        let mut element = Element::new(ElementKind::Shape(ShapeStyle::default()))
            .with_geometry(Geometry::new(0.0, 0.0, 5.0, 500.0).with_rotation(-90.0));
        element.opacity = 3.0;
        element.normalize();
        assert!((element.geometry.width - MIN_DIMENSION).abs() < f32::EPSILON);
        assert!((element.geometry.rotation - 270.0).abs() < 1e-4);
        assert!((element.opacity - 1.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_rotated_hit_test() {
        let geometry = Geometry::new(0.0, 0.0, 200.0, 20.0).with_rotation(90.0);
        // Rotated a quarter turn the bar stands upright through its center.
        assert!(geometry.contains_point(100.0, 80.0));
        assert!(!geometry.contains_point(10.0, 10.0));
    }

    #[test]
    fn test_dynamic_slots() {
        let mut style = TextStyle {
            color_dynamic: true,
            ..TextStyle::default()
        };
        style.quote.quote_border_color_dynamic = true;
        let kind = ElementKind::Text(style);
        assert_eq!(
            kind.dynamic_slots(),
            vec![ColorSlot::Color, ColorSlot::QuoteBorderColor]
        );
    }

    #[test]
    fn test_normalize_degrees() {
        assert!((normalize_degrees(360.0)).abs() < f32::EPSILON);
        assert!((normalize_degrees(-45.0) - 315.0).abs() < 1e-4);
        assert!((normalize_degrees(725.0) - 5.0).abs() < 1e-3);
        assert!(normalize_degrees(f32::NAN).abs() < f32::EPSILON);
    }
}
