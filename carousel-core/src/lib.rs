//! # Carousel Core
//!
//! Editing core for templated image generation: the scene model shared with
//! the renderer, persisted template documents, and the interactive transform
//! engine that turns pointer movement into geometry.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │                carousel-core                │
//! ├─────────────────────────────────────────────┤
//! │  Scene Model      │  Transform Engine       │
//! │  - Elements       │  - Move / resize        │
//! │  - Paint order    │  - Rotation-aware math  │
//! │  - Styles         │  - Commit on release    │
//! ├─────────────────────────────────────────────┤
//! │  Editor State     │  Template Documents     │
//! │  - Selection      │  - Export settings      │
//! │  - Layer actions  │  - Validation           │
//! └─────────────────────────────────────────────┘
//! ```

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod element;
pub mod error;
pub mod event;
pub mod scene;
pub mod schema;
pub mod state;
pub mod style;
pub mod transform;

pub use element::{
    Element, ElementId, ElementKind, ElementType, Geometry, ImageStyle, ShapeStyle, TextStyle,
    MIN_DIMENSION,
};
pub use error::{SceneError, SceneResult};
pub use event::{DragTarget, Handle, PointerEvent, PointerPhase, PointerSample};
pub use scene::{LayerDirection, Scene};
pub use schema::{ExportSettings, ImageFormat, TemplateDocument};
pub use state::{EditorConfig, EditorState, PointerOutcome};
pub use style::{
    ColorSlot, Fill, Gradient, GradientStop, Highlight, HighlightMode, ObjectFit, QuoteStyle,
    Resizing, Shadow, Stroke, TextAlign, TextTransform, VerticalAlign,
};
pub use transform::{Commit, SessionKind, TransformContext, TransformEngine, TransformError};

/// Carousel core version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
