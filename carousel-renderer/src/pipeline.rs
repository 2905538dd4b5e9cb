//! Render pipeline: scene + bindings to a static document.
//!
//! Per element, in paint order:
//!
//! ```text
//! ┌────────────┐  ┌─────────────┐  ┌─────────────┐  ┌────────┐  ┌──────────┐
//! │  Content   │─►│  Dynamic    │─►│  Derived    │─►│ Markup │─►│   Box    │
//! │  binding   │  │  colors     │  │  styling    │  │ (text) │  │ emission │
//! └────────────┘  └─────────────┘  └─────────────┘  └────────┘  └──────────┘
//!                                          ▲
//!                              auto-fit ───┘ (fitty text)
//! ```
//!
//! Rendering is pure: the same scene and bindings always produce the same
//! document.

use std::sync::Arc;

use carousel_core::{
    ColorSlot, Element, ElementKind, Fill, ImageStyle, Resizing, Scene, ShapeStyle,
    TemplateDocument, TextStyle,
};

use crate::autofit::{fit_blocks, FitBlock, FitConfig, MetricsMeasurer, TextMeasurer, WrapStyle};
use crate::binding::Bindings;
use crate::css::{self, Declarations};
use crate::document::{ElementBox, StaticDocument};
use crate::error::RenderResult;
use crate::fonts::FontCatalog;
use crate::markup::{
    display_blocks, escape_html, render_markup, Block, MarkupStyle, DEFAULT_HIGHLIGHT_COLOR,
};

/// Shape fill when neither a color nor a gradient is set.
const DEFAULT_SHAPE_COLOR: &str = "#000";

/// Lines shown by clamped text.
const CLAMP_LINES: u32 = 3;

/// Turns scenes into static documents.
#[derive(Clone)]
pub struct RenderPipeline {
    fonts: FontCatalog,
    measurer: Arc<dyn TextMeasurer>,
    fit: FitConfig,
}

impl std::fmt::Debug for RenderPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RenderPipeline")
            .field("fonts", &self.fonts.entries().len())
            .field("fit", &self.fit)
            .finish_non_exhaustive()
    }
}

impl Default for RenderPipeline {
    fn default() -> Self {
        Self::with_defaults()
    }
}

impl RenderPipeline {
    /// Create a pipeline.
    #[must_use]
    pub fn new(fonts: FontCatalog, measurer: Arc<dyn TextMeasurer>, fit: FitConfig) -> Self {
        Self {
            fonts,
            measurer,
            fit,
        }
    }

    /// Pipeline with the builtin font catalog and [`MetricsMeasurer`].
    #[must_use]
    pub fn with_defaults() -> Self {
        Self::new(
            FontCatalog::builtin(),
            Arc::new(MetricsMeasurer),
            FitConfig::default(),
        )
    }

    /// Replace the font catalog.
    #[must_use]
    pub fn with_fonts(mut self, fonts: FontCatalog) -> Self {
        self.fonts = fonts;
        self
    }

    /// Replace the auto-fit bounds.
    #[must_use]
    pub fn with_fit_config(mut self, fit: FitConfig) -> Self {
        self.fit = fit;
        self
    }

    /// The font catalog in use.
    #[must_use]
    pub fn fonts(&self) -> &FontCatalog {
        &self.fonts
    }

    /// The measurer shared with the editor preview.
    #[must_use]
    pub fn measurer(&self) -> &Arc<dyn TextMeasurer> {
        &self.measurer
    }

    /// Render a scene. Hidden elements are skipped.
    #[must_use]
    pub fn render(&self, scene: &Scene, bindings: &Bindings) -> StaticDocument {
        let boxes: Vec<ElementBox> = scene
            .visible_elements()
            .map(|element| self.render_element(element, bindings))
            .collect();
        tracing::debug!(
            "Rendered {} of {} elements on a {}x{} canvas",
            boxes.len(),
            scene.element_count(),
            scene.width,
            scene.height
        );
        StaticDocument {
            width: scene.width,
            height: scene.height,
            font_links: self.fonts.font_links(scene.elements()),
            boxes,
        }
    }

    /// Validate and render a template document.
    ///
    /// # Errors
    ///
    /// Returns an error if the template has no usable canvas size.
    pub fn render_document(
        &self,
        document: &TemplateDocument,
        bindings: &Bindings,
    ) -> RenderResult<StaticDocument> {
        document.validate()?;
        Ok(self.render(&document.to_scene(), bindings))
    }

    /// Render one element into its positioned box.
    #[must_use]
    pub fn render_element(&self, element: &Element, bindings: &Bindings) -> ElementBox {
        let colors = Colors { element, bindings };
        let (style, inner_html, overflow_visible) = match &element.kind {
            ElementKind::Text(text) => self.text_box(element, text, bindings, &colors),
            ElementKind::Image(image) => image_box(element, image, bindings, &colors),
            ElementKind::Shape(shape) => (shape_box(shape, &colors), String::new(), false),
        };
        ElementBox {
            element_id: element.id.clone(),
            geometry: element.geometry,
            opacity: element.opacity,
            overflow_visible,
            style,
            inner_html,
        }
    }

    /// Font size an auto-fit text element renders at, or `None` for other
    /// elements. The editor preview calls this too.
    ///
    /// Measurement follows the emitted layout: quote callouts sit on their
    /// own lines inside their border and padding, and the element's stroke
    /// border shrinks the content box.
    #[must_use]
    pub fn fit_font_size(&self, element: &Element, bindings: &Bindings) -> Option<u32> {
        let ElementKind::Text(text) = &element.kind else {
            return None;
        };
        if text.resizing != Resizing::Fitty {
            return None;
        }
        let quote = &text.quote;
        let blocks: Vec<FitBlock> = display_blocks(&bindings.resolve_content(element))
            .into_iter()
            .map(|block| match block {
                Block::Inline(content) => FitBlock::plain(content),
                Block::Callout(content) => FitBlock {
                    text: content,
                    inset_x: quote.quote_border_width + 2.0 * quote.quote_padding,
                    inset_y: 2.0 * quote.quote_padding,
                },
            })
            .collect();
        let border = if text.stroke.is_active() {
            2.0 * text.stroke.stroke_width
        } else {
            0.0
        };
        Some(fit_blocks(
            self.measurer.as_ref(),
            &self.fit,
            &blocks,
            element.geometry.width - border,
            element.geometry.height - border,
            &WrapStyle::from_text(text),
        ))
    }

    #[allow(clippy::cast_precision_loss)]
    fn text_box(
        &self,
        element: &Element,
        text: &TextStyle,
        bindings: &Bindings,
        colors: &Colors<'_>,
    ) -> (Declarations, String, bool) {
        let font_size = self
            .fit_font_size(element, bindings)
            .map_or(text.font_size, |size| size as f32);

        let mut decls = Declarations::new();
        decls
            .push("font-family", self.fonts.font_stack(text.font_family.as_deref()))
            .px("font-size", font_size)
            .push("font-weight", text.font_weight.to_string())
            .push("font-style", text.font_style.as_css())
            .push("text-decoration", text.text_decoration.as_css())
            .push("color", colors.resolve(ColorSlot::Color, Some(text.color.as_str())).unwrap_or_default())
            .push("display", "flex")
            .push("align-items", text.vertical_align.align_items())
            .push("justify-content", text.text_align.justify_content())
            .push("text-align", text.text_align.as_css())
            .push("line-height", text.line_height.to_string())
            .px("letter-spacing", text.letter_spacing)
            .push("text-transform", text.text_transform.as_css())
            .push("white-space", "pre-wrap")
            .push("word-break", "break-word");
        decls.extend(fill_declarations(&text.fill, colors));
        decls.extend(decoration_declarations(
            &text.stroke,
            &text.shadow,
            text.border_radius,
            colors,
        ));

        let markup = markup_style(text, colors);
        let content_html = render_markup(&bindings.resolve_content(element), &markup);

        let mut inner = Declarations::new();
        inner.push("width", "100%");
        match text.resizing {
            Resizing::Single => {
                inner
                    .push("white-space", "nowrap")
                    .push("overflow", "hidden")
                    .push("text-overflow", "ellipsis");
            }
            Resizing::Clamp => {
                inner
                    .push("display", "-webkit-box")
                    .push("-webkit-line-clamp", CLAMP_LINES.to_string())
                    .push("-webkit-box-orient", "vertical")
                    .push("overflow", "hidden");
            }
            Resizing::Plain | Resizing::Fitty => {}
        }
        tracing::debug!(
            "Text element {} renders at {}px ({:?})",
            element.id,
            font_size,
            text.resizing
        );

        let inner_html = format!(
            "<div class=\"text-content\" style=\"{}\">{content_html}</div>",
            inner.to_attribute()
        );
        (decls, inner_html, false)
    }
}

/// Static colors with dynamic overrides applied.
struct Colors<'a> {
    element: &'a Element,
    bindings: &'a Bindings,
}

impl Colors<'_> {
    fn resolve(&self, slot: ColorSlot, fallback: Option<&str>) -> Option<String> {
        self.bindings
            .dynamic_color(self.element, slot)
            .or(fallback)
            .map(str::to_string)
    }

    fn overridden(&self, slot: ColorSlot) -> Option<&str> {
        self.bindings.dynamic_color(self.element, slot)
    }
}

fn markup_style(text: &TextStyle, colors: &Colors<'_>) -> MarkupStyle {
    MarkupStyle {
        highlight_color: colors
            .resolve(ColorSlot::HighlightColor, text.highlight.highlight_color.as_deref())
            .unwrap_or_else(|| DEFAULT_HIGHLIGHT_COLOR.to_string()),
        highlight_mode: text.highlight.highlight_mode,
        highlight_padding: text.highlight.highlight_padding,
        highlight_radius: text.highlight.highlight_radius,
        quote_border_color: colors
            .resolve(ColorSlot::QuoteBorderColor, Some(text.quote.quote_border_color.as_str()))
            .unwrap_or_default(),
        quote_border_width: text.quote.quote_border_width,
        quote_background_color: colors
            .resolve(
                ColorSlot::QuoteBackgroundColor,
                Some(text.quote.quote_background_color.as_str()),
            )
            .unwrap_or_default(),
        quote_padding: text.quote.quote_padding,
    }
}

fn fill_declarations(fill: &Fill, colors: &Colors<'_>) -> Declarations {
    let mut decls = Declarations::new();
    if let Some(color) = colors.overridden(ColorSlot::BackgroundColor) {
        decls.push("background", color);
    } else if let Some(gradient) = &fill.gradient {
        decls.push("background", css::linear_gradient(gradient));
    } else if let Some(color) = &fill.background_color {
        decls.push("background-color", color.clone());
    }
    decls
}

fn decoration_declarations(
    stroke: &carousel_core::Stroke,
    shadow: &carousel_core::Shadow,
    border_radius: f32,
    colors: &Colors<'_>,
) -> Declarations {
    let mut decls = Declarations::new();
    decls.px("border-radius", border_radius);
    let stroke_color = colors.resolve(ColorSlot::StrokeColor, stroke.stroke_color.as_deref());
    if let Some(border) = css::border(stroke, stroke_color.as_deref()) {
        decls.push("border", border);
    }
    let shadow_color = colors.resolve(ColorSlot::ShadowColor, shadow.shadow_color.as_deref());
    if let Some(box_shadow) = css::box_shadow(shadow, shadow_color.as_deref()) {
        decls.push("box-shadow", box_shadow);
    }
    decls
}

fn image_box(
    element: &Element,
    image: &ImageStyle,
    bindings: &Bindings,
    colors: &Colors<'_>,
) -> (Declarations, String, bool) {
    let source = bindings.resolve_content(element);
    let mut img = Declarations::new();
    img.push("display", "block")
        .push("width", "100%")
        .push("height", "100%")
        .push("object-fit", image.fit.as_css())
        .px("border-radius", image.border_radius);

    let (decls, overflow_visible) = if image.contour {
        let stroke_color = colors.resolve(ColorSlot::StrokeColor, image.stroke.stroke_color.as_deref());
        let shadow_color = colors.resolve(ColorSlot::ShadowColor, image.shadow.shadow_color.as_deref());
        if let Some(filter) = css::contour_filter(
            &image.stroke,
            stroke_color.as_deref(),
            &image.shadow,
            shadow_color.as_deref(),
        ) {
            img.push("filter", filter);
        }
        (Declarations::new(), true)
    } else {
        (
            decoration_declarations(&image.stroke, &image.shadow, image.border_radius, colors),
            false,
        )
    };

    let inner_html = format!(
        "<img src=\"{}\" alt=\"\" style=\"{}\" />",
        escape_html(&source),
        img.to_attribute()
    );
    (decls, inner_html, overflow_visible)
}

fn shape_box(shape: &ShapeStyle, colors: &Colors<'_>) -> Declarations {
    let mut decls = fill_declarations(&shape.fill, colors);
    if decls.is_empty() {
        decls.push("background-color", DEFAULT_SHAPE_COLOR);
    }
    decls.extend(decoration_declarations(
        &shape.stroke,
        &shape.shadow,
        shape.border_radius,
        colors,
    ));
    decls
}

#[cfg(test)]
mod tests {
    use super::*;
    use carousel_core::{ElementType, Geometry, Gradient, GradientStop};

    fn shape_with(fill: Fill) -> Element {
        Element::new(ElementKind::Shape(ShapeStyle {
            fill,
            ..ShapeStyle::default()
        }))
    }

    #[test]
    fn test_hidden_elements_skipped() {
        let mut scene = Scene::new(800.0, 600.0);
        scene.add_element(Element::with_defaults(ElementType::Shape, 1));
        scene.add_element(Element::with_defaults(ElementType::Text, 2).with_visible(false));
        let document = RenderPipeline::with_defaults().render(&scene, &Bindings::new());
        assert_eq!(document.boxes.len(), 1);
    }

    #[test]
    fn test_dynamic_background_override() {
        let mut element = shape_with(Fill {
            background_color: Some("#111111".to_string()),
            background_color_dynamic: true,
            gradient: None,
        });
        element.id = "card".into();
        let bindings: Bindings = [("card_backgroundColor", "#abcdef")].into_iter().collect();
        let rendered = RenderPipeline::with_defaults().render_element(&element, &bindings);
        assert_eq!(rendered.style.get("background"), Some("#abcdef"));

        let rendered = RenderPipeline::with_defaults().render_element(&element, &Bindings::new());
        assert_eq!(rendered.style.get("background-color"), Some("#111111"));
    }

    #[test]
    fn test_gradient_fill() {
        let element = shape_with(Fill {
            gradient: Some(Gradient {
                angle: 90.0,
                stops: Some(vec![
                    GradientStop {
                        color: "#ffffff".to_string(),
                        opacity: 0.5,
                        position: 100.0,
                    },
                    GradientStop {
                        color: "#000000".to_string(),
                        opacity: 1.0,
                        position: 0.0,
                    },
                ]),
                ..Gradient::default()
            }),
            ..Fill::default()
        });
        let rendered = RenderPipeline::with_defaults().render_element(&element, &Bindings::new());
        assert_eq!(
            rendered.style.get("background"),
            Some("linear-gradient(90deg, #000000 0%, rgba(255, 255, 255, 0.5) 100%)")
        );
    }

    #[test]
    fn test_single_line_truncates() {
        let mut element = Element::with_defaults(ElementType::Text, 1);
        if let ElementKind::Text(text) = &mut element.kind {
            text.resizing = Resizing::Single;
        }
        let rendered = RenderPipeline::with_defaults().render_element(&element, &Bindings::new());
        assert!(rendered.inner_html.contains("text-overflow: ellipsis;"));
        assert!(rendered.inner_html.contains("white-space: nowrap;"));
    }

    #[test]
    fn test_fitty_uses_fitted_size() {
        let mut element = Element::with_defaults(ElementType::Text, 1)
            .with_geometry(Geometry::new(0.0, 0.0, 1000.0, 61.0));
        if let ElementKind::Text(text) = &mut element.kind {
            text.content = "Hi".to_string();
            text.font_weight = 400;
            text.resizing = Resizing::Fitty;
        }
        let pipeline = RenderPipeline::with_defaults();
        assert_eq!(pipeline.fit_font_size(&element, &Bindings::new()), Some(50));
        let rendered = pipeline.render_element(&element, &Bindings::new());
        assert_eq!(rendered.style.get("font-size"), Some("50px"));
    }

    fn fitty_text(content: &str, width: f32, height: f32) -> Element {
        let mut element = Element::with_defaults(ElementType::Text, 1)
            .with_geometry(Geometry::new(0.0, 0.0, width, height));
        if let ElementKind::Text(text) = &mut element.kind {
            text.content = content.to_string();
            text.font_weight = 400;
            text.line_height = 1.2;
            text.letter_spacing = 0.0;
            text.resizing = Resizing::Fitty;
        }
        element
    }

    #[test]
    #[allow(clippy::cast_precision_loss)]
    fn test_fitty_measures_callouts_as_blocks() {
        let pipeline = RenderPipeline::with_defaults();
        let plain = pipeline
            .fit_font_size(&fitty_text("Great deal", 1000.0, 101.0), &Bindings::new())
            .expect("fitty");
        let quoted_element = fitty_text("«Great» deal", 1000.0, 101.0);
        let quoted = pipeline
            .fit_font_size(&quoted_element, &Bindings::new())
            .expect("fitty");
        assert!(quoted < plain, "{quoted} >= {plain}");

        // Two lines plus the callout's vertical padding must fit the box.
        let ElementKind::Text(text) = &quoted_element.kind else {
            unreachable!();
        };
        let needed = 2.0 * quoted as f32 * text.line_height + 2.0 * text.quote.quote_padding;
        assert!(needed <= 101.0, "{needed} > 101");
    }

    #[test]
    fn test_fitty_subtracts_stroke_border() {
        let pipeline = RenderPipeline::with_defaults();
        let mut element = fitty_text("Hi", 1000.0, 61.0);
        assert_eq!(pipeline.fit_font_size(&element, &Bindings::new()), Some(50));
        if let ElementKind::Text(text) = &mut element.kind {
            text.stroke.stroke_width = 5.0;
            text.stroke.stroke_color = Some("#000000".to_string());
        }
        // (61 - 10) / 1.2 = 42.5
        assert_eq!(pipeline.fit_font_size(&element, &Bindings::new()), Some(42));
    }

    #[test]
    fn test_dynamic_color_cannot_break_attribute() {
        let mut element = Element::new(ElementKind::Text(TextStyle {
            content: "Sale".to_string(),
            color_dynamic: true,
            ..TextStyle::default()
        }));
        element.id = "t".into();
        let bindings: Bindings = [("t_color", "red\"><script>alert(1)</script><div x=\"")]
            .into_iter()
            .collect();
        let rendered = RenderPipeline::with_defaults().render_element(&element, &bindings);
        let html = rendered.to_html();
        assert!(!html.contains("<script>"));
        assert!(html.contains("color: red&#34;&gt;&lt;script&gt;"));
        assert!(html.contains(">Sale</div></div>"));
    }

    #[test]
    fn test_contour_image_uses_filters() {
        let mut element = Element::with_defaults(ElementType::Image, 1);
        if let ElementKind::Image(image) = &mut element.kind {
            image.contour = true;
            image.stroke.stroke_width = 2.0;
            image.stroke.stroke_color = Some("#ffffff".to_string());
        }
        let rendered = RenderPipeline::with_defaults().render_element(&element, &Bindings::new());
        assert!(rendered.overflow_visible);
        assert!(rendered.style.get("border").is_none());
        assert!(rendered.inner_html.contains("filter: drop-shadow(2px 0px 0 #ffffff)"));
    }
}
