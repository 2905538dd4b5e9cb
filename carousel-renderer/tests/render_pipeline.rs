//! Integration tests for the render pipeline and render service.
//!
//! Covers binding resolution, markup, dynamic colors, gradient ordering and
//! the async job path with in-memory collaborators.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use carousel_core::{
    Element, ElementKind, ElementType, Fill, Gradient, GradientStop, HighlightMode, ImageFormat,
    Scene, ShapeStyle, TemplateDocument, TextStyle,
};
use carousel_renderer::{
    Bindings, RasterImage, Rasterizer, RenderError, RenderPipeline, RenderRequest, RenderResult,
    RenderService, StaticDocument, TemplateSource,
};

fn text_element(content: &str) -> Element {
    Element::new(ElementKind::Text(TextStyle {
        content: content.to_string(),
        ..TextStyle::default()
    }))
}

fn template(elements: Vec<Element>) -> TemplateDocument {
    TemplateDocument::from_scene(
        "promo",
        "Promo",
        &Scene::with_elements(1080.0, 1350.0, elements),
    )
}

// ==========================================================================
// Bindings
// ==========================================================================

#[test]
fn test_variable_binding_round_trip() {
    let element = text_element("X").with_variable("title");
    let id = element.id.clone();
    let scene = Scene::with_elements(800.0, 600.0, vec![element]);
    let bindings: Bindings = [("title", "Hello")].into_iter().collect();

    let document = RenderPipeline::with_defaults().render(&scene, &bindings);
    let rendered = document.element_box(&id).expect("box");
    assert!(rendered.inner_html.contains(">Hello</div>"));
    assert!(!rendered.inner_html.contains(">X</div>"));
}

#[test]
fn test_unresolved_placeholders_render_empty() {
    let element = text_element("Hi {{name}}, you have {{n}} items");
    let id = element.id.clone();
    let scene = Scene::with_elements(800.0, 600.0, vec![element]);
    let bindings: Bindings = [("name", "Ann")].into_iter().collect();

    let document = RenderPipeline::with_defaults().render(&scene, &bindings);
    let rendered = document.element_box(&id).expect("box");
    assert!(rendered.inner_html.contains(">Hi Ann, you have  items</div>"));
}

#[test]
fn test_image_source_from_binding() {
    let element = Element::with_defaults(ElementType::Image, 1).with_variable("photo");
    let id = element.id.clone();
    let scene = Scene::with_elements(800.0, 600.0, vec![element]);
    let bindings: Bindings = [("photo", "https://cdn.example.com/a.png?w=1&h=2")]
        .into_iter()
        .collect();

    let document = RenderPipeline::with_defaults().render(&scene, &bindings);
    let rendered = document.element_box(&id).expect("box");
    assert!(rendered
        .inner_html
        .contains("src=\"https://cdn.example.com/a.png?w=1&amp;h=2\""));
}

// ==========================================================================
// Markup
// ==========================================================================

#[test]
fn test_highlight_wraps_exactly_the_marked_word() {
    let mut element = text_element("Buy **now** today");
    if let ElementKind::Text(text) = &mut element.kind {
        text.highlight.highlight_color = Some("#ff0000".to_string());
        text.highlight.highlight_mode = HighlightMode::Background;
    }
    let rendered = RenderPipeline::with_defaults().render_element(&element, &Bindings::new());
    let html = &rendered.inner_html;

    assert!(html.contains(">Buy <span class=\"highlight\" style=\"background-color: #ff0000;"));
    assert!(html.contains("\">now</span> today</div>"));
    assert_eq!(html.matches("<span").count(), 1);
}

#[test]
fn test_markup_applies_to_bound_values() {
    let element = text_element("{{headline}}");
    let bindings: Bindings = [("headline", "<b>Big</b> **deal**")].into_iter().collect();
    let rendered = RenderPipeline::with_defaults().render_element(&element, &bindings);
    assert!(rendered.inner_html.contains("&lt;b&gt;Big&lt;/b&gt; <span class=\"highlight\""));
}

#[test]
fn test_quote_callout_uses_dynamic_border_color() {
    let mut element = text_element("«Great product»").with_variable("review");
    if let ElementKind::Text(text) = &mut element.kind {
        text.quote.quote_border_color_dynamic = true;
    }
    let bindings: Bindings = [("review_quoteBorderColor", "#00ff00")].into_iter().collect();
    let rendered = RenderPipeline::with_defaults().render_element(&element, &bindings);
    assert!(rendered.inner_html.contains("border-left: 4px solid #00ff00;"));
    assert!(rendered.inner_html.contains(">Great product</span>"));
}

// ==========================================================================
// Derived styling
// ==========================================================================

fn gradient_shape(stops: Vec<GradientStop>) -> Element {
    Element::new(ElementKind::Shape(ShapeStyle {
        fill: Fill {
            gradient: Some(Gradient {
                stops: Some(stops),
                ..Gradient::default()
            }),
            ..Fill::default()
        },
        ..ShapeStyle::default()
    }))
}

#[test]
fn test_gradient_stop_order_does_not_matter() {
    let stop = |color: &str, position: f32| GradientStop {
        color: color.to_string(),
        opacity: 1.0,
        position,
    };
    let pipeline = RenderPipeline::with_defaults();
    let a = pipeline.render_element(
        &gradient_shape(vec![stop("#ff0000", 80.0), stop("#0000ff", 10.0)]),
        &Bindings::new(),
    );
    let b = pipeline.render_element(
        &gradient_shape(vec![stop("#0000ff", 10.0), stop("#ff0000", 80.0)]),
        &Bindings::new(),
    );
    assert_eq!(a.style.get("background"), b.style.get("background"));
    assert!(a.style.get("background").is_some());
}

#[test]
fn test_rotation_and_paint_order_preserved() {
    let bottom = Element::with_defaults(ElementType::Shape, 1)
        .with_geometry(carousel_core::Geometry::new(0.0, 0.0, 100.0, 100.0).with_rotation(30.0));
    let top = Element::with_defaults(ElementType::Text, 2);
    let (bottom_id, top_id) = (bottom.id.clone(), top.id.clone());
    let scene = Scene::with_elements(800.0, 600.0, vec![bottom, top]);

    let document = RenderPipeline::with_defaults().render(&scene, &Bindings::new());
    assert_eq!(document.boxes[0].element_id, bottom_id);
    assert_eq!(document.boxes[1].element_id, top_id);
    let html = document.to_html();
    assert!(html.contains("transform: rotate(30deg);"));
    let first = html.find(bottom_id.as_str()).expect("bottom");
    let second = html.find(top_id.as_str()).expect("top");
    assert!(first < second);
}

#[test]
fn test_font_links_for_used_families() {
    let mut element = text_element("Hello");
    if let ElementKind::Text(text) = &mut element.kind {
        text.font_family = Some("Playfair Display".to_string());
    }
    let scene = Scene::with_elements(800.0, 600.0, vec![element]);
    let document = RenderPipeline::with_defaults().render(&scene, &Bindings::new());
    assert_eq!(document.font_links.len(), 1);
    assert!(document.to_html().contains("'Playfair Display', serif"));
}

#[test]
fn test_rendering_is_deterministic() {
    let mut fitted = text_element("Summer **sale** starts now");
    if let ElementKind::Text(text) = &mut fitted.kind {
        text.resizing = carousel_core::Resizing::Fitty;
    }
    let scene = Scene::with_elements(
        800.0,
        600.0,
        vec![fitted, Element::with_defaults(ElementType::Shape, 2)],
    );
    let pipeline = RenderPipeline::with_defaults();
    let bindings = Bindings::new();
    assert_eq!(
        pipeline.render(&scene, &bindings).to_html(),
        pipeline.render(&scene, &bindings).to_html()
    );
}

// ==========================================================================
// Render service
// ==========================================================================

#[derive(Default)]
struct MemorySource {
    templates: HashMap<String, TemplateDocument>,
    loads: AtomicUsize,
}

#[async_trait]
impl TemplateSource for MemorySource {
    async fn load(&self, id: &str) -> RenderResult<Option<TemplateDocument>> {
        self.loads.fetch_add(1, Ordering::SeqCst);
        Ok(self.templates.get(id).cloned())
    }
}

#[derive(Default)]
struct RecordingRasterizer {
    calls: AtomicUsize,
    fail: bool,
}

#[async_trait]
impl Rasterizer for RecordingRasterizer {
    async fn rasterize(
        &self,
        document: &StaticDocument,
        format: ImageFormat,
    ) -> RenderResult<RasterImage> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(RenderError::Raster("navigation failed".to_string()));
        }
        Ok(RasterImage {
            bytes: document.to_html().into_bytes(),
            format,
        })
    }
}

fn memory_source() -> Arc<MemorySource> {
    let mut templates = HashMap::new();
    templates.insert(
        "promo".to_string(),
        template(vec![text_element("Hi {{name}}")]),
    );
    Arc::new(MemorySource {
        templates,
        loads: AtomicUsize::new(0),
    })
}

fn service(rasterizer: Arc<RecordingRasterizer>) -> RenderService {
    RenderService::new(RenderPipeline::with_defaults(), rasterizer).with_source(memory_source())
}

#[tokio::test]
async fn test_stored_template_renders() {
    let rasterizer = Arc::new(RecordingRasterizer::default());
    let service = service(Arc::clone(&rasterizer));
    let bindings: Bindings = [("name", "Ann")].into_iter().collect();

    let output = service
        .render(&RenderRequest::stored("promo", bindings))
        .await
        .expect("render");
    assert_eq!(output.template_id, "promo");
    assert_eq!(output.mime_type(), "image/png");
    assert!(String::from_utf8_lossy(&output.image.bytes).contains("Hi Ann"));
    assert_eq!(rasterizer.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_prepared_document_rasterizes_without_reloading() {
    let rasterizer = Arc::new(RecordingRasterizer::default());
    let source = memory_source();
    let service = RenderService::new(RenderPipeline::with_defaults(), Arc::clone(&rasterizer) as Arc<dyn Rasterizer>)
        .with_source(Arc::clone(&source) as Arc<dyn TemplateSource>);
    let bindings: Bindings = [("name", "Ann")].into_iter().collect();

    let (template, document) = service
        .prepare(&RenderRequest::stored("promo", bindings))
        .await
        .expect("prepare");
    let html = document.to_html();
    let output = service
        .rasterize(template, document)
        .await
        .expect("rasterize");

    assert_eq!(source.loads.load(Ordering::SeqCst), 1);
    assert_eq!(output.image.bytes, html.into_bytes());
    assert_eq!(rasterizer.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_unsafe_and_unknown_ids_rejected() {
    let rasterizer = Arc::new(RecordingRasterizer::default());
    let service = service(Arc::clone(&rasterizer));

    let err = service
        .render(&RenderRequest::stored("../etc/passwd", Bindings::new()))
        .await
        .expect_err("unsafe id");
    assert!(matches!(err, RenderError::InvalidTemplateId(_)));

    let err = service
        .render(&RenderRequest::stored("missing", Bindings::new()))
        .await
        .expect_err("unknown id");
    assert!(matches!(err, RenderError::TemplateNotFound(_)));
    assert_eq!(rasterizer.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_inline_template_requires_size() {
    let rasterizer = Arc::new(RecordingRasterizer::default());
    let service = service(Arc::clone(&rasterizer));
    let document = TemplateDocument::from_json(r#"{"elements": []}"#).expect("doc");

    let err = service
        .render(&RenderRequest::inline(document, Bindings::new()))
        .await
        .expect_err("no size");
    assert!(matches!(err, RenderError::InvalidTemplate(_)));
}

#[tokio::test]
async fn test_rasterizer_failure_propagates_without_retry() {
    let rasterizer = Arc::new(RecordingRasterizer {
        calls: AtomicUsize::new(0),
        fail: true,
    });
    let service = service(Arc::clone(&rasterizer));

    let err = service
        .render(&RenderRequest::inline(template(Vec::new()), Bindings::new()))
        .await
        .expect_err("raster failure");
    assert!(matches!(err, RenderError::Raster(_)));
    assert_eq!(rasterizer.calls.load(Ordering::SeqCst), 1);
}
