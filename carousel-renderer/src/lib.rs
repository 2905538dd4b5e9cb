//! # Carousel Renderer
//!
//! Deterministic render pipeline for Carousel templates. A scene and a
//! binding map go in; a static HTML document of absolutely positioned boxes
//! comes out, ready for an external rasterizer.
//!
//! ## Pipeline
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │           RenderService (async)             │
//! │   TemplateSource ─► Pipeline ─► Rasterizer  │
//! ├─────────────────────────────────────────────┤
//! │           RenderPipeline (pure)             │
//! ├──────────────┬──────────────┬───────────────┤
//! │ Bindings     │ Markup       │ Auto-fit      │
//! │ {{tokens}}   │ **highlight**│ binary search │
//! │ dyn colors   │ «quotes»     │ TextMeasurer  │
//! ├──────────────┴──────────────┴───────────────┤
//! │  CSS derivation  │  Fonts  │ StaticDocument │
//! └─────────────────────────────────────────────┘
//! ```

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod autofit;
pub mod binding;
pub mod css;
pub mod document;
pub mod error;
pub mod fonts;
pub mod markup;
pub mod pipeline;
pub mod raster;

pub use autofit::{
    fit, fit_blocks, FitBlock, FitConfig, MetricsMeasurer, TextExtent, TextMeasurer, WrapStyle,
};
pub use binding::Bindings;
pub use document::{ElementBox, StaticDocument};
pub use error::{RenderError, RenderResult};
pub use fonts::{FontCatalog, FontEntry};
pub use markup::{display_blocks, render_markup, Block, MarkupStyle, Segment};
pub use pipeline::RenderPipeline;
pub use raster::{
    BrowserRasterizer, RasterConfig, RasterImage, Rasterizer, RenderOutput, RenderRequest,
    RenderService, SceneRef, TemplateSource,
};
