//! Static document: the fully resolved output of the render pipeline.
//!
//! Every element becomes one absolutely positioned box inside a `#canvas`
//! container of the scene's size. Boxes keep their unrotated geometry and
//! carry a rotation about their own center. Paint order is box order.

use std::fmt::Write as _;

use carousel_core::{ElementId, Geometry};

use crate::css::{px, Declarations};
use crate::markup::escape_html;

/// Font stack of the canvas container.
const CANVAS_FONT_STACK: &str =
    "'Inter', -apple-system, BlinkMacSystemFont, 'Segoe UI', sans-serif";

/// One positioned element box.
#[derive(Debug, Clone, PartialEq)]
pub struct ElementBox {
    /// Source element.
    pub element_id: ElementId,
    /// Position and size on the canvas.
    pub geometry: Geometry,
    /// Opacity in `[0, 1]`.
    pub opacity: f32,
    /// Whether content may paint outside the box.
    pub overflow_visible: bool,
    /// Element-specific declarations appended after the positioning ones.
    pub style: Declarations,
    /// Inner HTML.
    pub inner_html: String,
}

impl ElementBox {
    /// Full declaration list of the box.
    #[must_use]
    pub fn declarations(&self) -> Declarations {
        let g = &self.geometry;
        let mut decls = Declarations::new();
        decls
            .push("position", "absolute")
            .px("left", g.x)
            .px("top", g.y)
            .px("width", g.width)
            .px("height", g.height)
            .push("opacity", self.opacity.to_string())
            .push(
                "overflow",
                if self.overflow_visible { "visible" } else { "hidden" },
            )
            .push("box-sizing", "border-box")
            .push("transform", format!("rotate({}deg)", g.rotation))
            .push("transform-origin", "center");
        decls.extend(self.style.clone());
        decls
    }

    /// Render the box as HTML.
    #[must_use]
    pub fn to_html(&self) -> String {
        format!(
            "<div data-element-id=\"{}\" style=\"{}\">{}</div>",
            escape_html(self.element_id.as_str()),
            self.declarations().to_attribute(),
            self.inner_html
        )
    }
}

/// A complete static document ready for rasterization.
#[derive(Debug, Clone, PartialEq)]
pub struct StaticDocument {
    /// Canvas width in pixels.
    pub width: f32,
    /// Canvas height in pixels.
    pub height: f32,
    /// Stylesheet links for web fonts.
    pub font_links: Vec<String>,
    /// Element boxes in paint order.
    pub boxes: Vec<ElementBox>,
}

impl StaticDocument {
    /// Box rendered for an element.
    #[must_use]
    pub fn element_box(&self, id: &ElementId) -> Option<&ElementBox> {
        self.boxes.iter().find(|b| &b.element_id == id)
    }

    /// Viewport size in whole pixels.
    #[must_use]
    pub fn viewport(&self) -> (u32, u32) {
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let whole = |v: f32| v.max(1.0).ceil() as u32;
        (whole(self.width), whole(self.height))
    }

    /// Serialize to a standalone HTML page.
    #[must_use]
    pub fn to_html(&self) -> String {
        let mut html = String::with_capacity(1024 + self.boxes.len() * 512);
        html.push_str("<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\" />\n");
        for href in &self.font_links {
            let _ = writeln!(html, "<link rel=\"stylesheet\" href=\"{}\" />", escape_html(href));
        }
        let _ = write!(
            html,
            "<style>\n\
             body {{ margin: 0; padding: 0; background: transparent; }}\n\
             #canvas {{ position: relative; width: {}; height: {}; background: white; \
             overflow: hidden; font-family: {CANVAS_FONT_STACK}; }}\n\
             </style>\n</head>\n<body>\n<div id=\"canvas\">\n",
            px(self.width),
            px(self.height)
        );
        for element_box in &self.boxes {
            html.push_str(&element_box.to_html());
            html.push('\n');
        }
        html.push_str("</div>\n</body>\n</html>\n");
        html
    }
}
