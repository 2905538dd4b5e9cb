//! Editor state: the scene, the current selection and active transform
//! sessions, driven by pointer events and editing actions.

use crate::transform::{SessionKind, TransformContext, TransformEngine, TransformError};
use crate::{
    DragTarget, Element, ElementId, ElementType, Geometry, LayerDirection, PointerEvent,
    PointerPhase, Scene, SceneResult,
};

/// Editor configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct EditorConfig {
    /// Screen pixels per canvas pixel.
    pub zoom: f32,
    /// Screen position of the canvas top-left corner.
    pub canvas_origin: (f32, f32),
    /// Keep the width/height ratio while resizing.
    pub aspect_lock: bool,
    /// Offset applied to duplicated elements on both axes.
    pub duplicate_offset: f32,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            zoom: 1.0,
            canvas_origin: (0.0, 0.0),
            aspect_lock: false,
            duplicate_offset: 20.0,
        }
    }
}

/// What a pointer event did.
#[derive(Debug, Clone, PartialEq)]
pub enum PointerOutcome {
    /// Nothing happened.
    Ignored,
    /// Pointer went down on empty canvas; selection cleared.
    Deselected,
    /// A session started on the element, which is now selected.
    Started(ElementId),
    /// The session was refused.
    Refused(TransformError),
    /// Geometry to preview while the pointer is down.
    Provisional {
        /// Element being manipulated.
        element_id: ElementId,
        /// Uncommitted geometry.
        geometry: Geometry,
    },
    /// The session ended and its geometry was written to the scene.
    Committed {
        /// Element that changed.
        element_id: ElementId,
        /// Committed geometry.
        geometry: Geometry,
    },
}

/// The complete editor state.
#[derive(Debug, Clone)]
pub struct EditorState {
    /// The scene being edited.
    pub scene: Scene,
    /// Editor configuration.
    pub config: EditorConfig,
    selected: Option<ElementId>,
    engine: TransformEngine,
    has_local_changes: bool,
}

impl EditorState {
    /// Create an editor over `scene` with default configuration.
    #[must_use]
    pub fn new(scene: Scene) -> Self {
        Self::with_config(scene, EditorConfig::default())
    }

    /// Create an editor with explicit configuration.
    #[must_use]
    pub fn with_config(scene: Scene, config: EditorConfig) -> Self {
        Self {
            scene,
            config,
            selected: None,
            engine: TransformEngine::new(),
            has_local_changes: false,
        }
    }

    /// Transform context derived from the scene and configuration.
    #[must_use]
    pub fn transform_context(&self) -> TransformContext {
        TransformContext {
            zoom: self.config.zoom,
            canvas_width: self.scene.width,
            canvas_height: self.scene.height,
            canvas_origin: self.config.canvas_origin,
            aspect_lock: self.config.aspect_lock,
        }
    }

    /// Process a pointer event.
    pub fn process_pointer(&mut self, event: &PointerEvent) -> PointerOutcome {
        let sample = event.sample;
        let position = (sample.x, sample.y);
        match event.phase {
            PointerPhase::Down => {
                if event.button != 0 {
                    return PointerOutcome::Ignored;
                }
                let target = match &event.target {
                    Some((id, target)) => Some((id.clone(), *target)),
                    None => {
                        let (x, y) = self.transform_context().to_canvas(sample.x, sample.y);
                        self.scene
                            .element_at(x, y)
                            .map(|id| (id.clone(), DragTarget::Move))
                    }
                };
                let Some((id, target)) = target else {
                    self.selected = None;
                    return PointerOutcome::Deselected;
                };
                match self.engine.begin(
                    &self.scene,
                    sample.pointer_id,
                    &id,
                    SessionKind::from(target),
                    position,
                ) {
                    Ok(_) => {
                        self.selected = Some(id.clone());
                        PointerOutcome::Started(id)
                    }
                    Err(err) => PointerOutcome::Refused(err),
                }
            }
            PointerPhase::Move => {
                let ctx = self.transform_context();
                let Some(geometry) = self.engine.update(sample.pointer_id, position, &ctx) else {
                    return PointerOutcome::Ignored;
                };
                let element_id = self
                    .engine
                    .session(sample.pointer_id)
                    .map(|s| s.element_id.clone());
                match element_id {
                    Some(element_id) => PointerOutcome::Provisional {
                        element_id,
                        geometry,
                    },
                    None => PointerOutcome::Ignored,
                }
            }
            PointerPhase::Up | PointerPhase::Cancel => {
                let Some(commit) = self.engine.end(sample.pointer_id) else {
                    return PointerOutcome::Ignored;
                };
                if self.scene.apply_geometry(&commit.element_id, commit.geometry) {
                    self.has_local_changes = true;
                }
                PointerOutcome::Committed {
                    element_id: commit.element_id,
                    geometry: commit.geometry,
                }
            }
        }
    }

    /// Add a new element with editor defaults at the top of the paint order
    /// and select it.
    pub fn add_element(&mut self, element_type: ElementType) -> ElementId {
        let element = Element::with_defaults(element_type, self.scene.element_count() + 1);
        self.insert_element(element)
    }

    /// Add a prepared element at the top of the paint order and select it.
    pub fn insert_element(&mut self, element: Element) -> ElementId {
        let id = self.scene.add_element(element);
        self.selected = Some(id.clone());
        self.has_local_changes = true;
        id
    }

    /// Remove an element, clearing the selection if it was selected.
    pub fn remove_element(&mut self, id: &ElementId) -> Option<Element> {
        let removed = self.scene.remove_element(id)?;
        if self.selected.as_ref() == Some(id) {
            self.selected = None;
        }
        self.has_local_changes = true;
        Some(removed)
    }

    /// Duplicate an element and select the copy.
    pub fn duplicate_element(&mut self, id: &ElementId) -> Option<ElementId> {
        let copy = self
            .scene
            .duplicate_element(id, self.config.duplicate_offset)?;
        self.selected = Some(copy.clone());
        self.has_local_changes = true;
        Some(copy)
    }

    /// Move an element one step in the paint order.
    pub fn move_layer(&mut self, id: &ElementId, direction: LayerDirection) -> bool {
        let moved = self.scene.move_layer(id, direction);
        self.has_local_changes |= moved;
        moved
    }

    /// Merge a property-editor patch into an element.
    ///
    /// # Errors
    ///
    /// Returns an error if the patch is malformed.
    pub fn update_element(&mut self, id: &ElementId, patch: &serde_json::Value) -> SceneResult<bool> {
        let changed = self.scene.merge_patch(id, patch)?;
        self.has_local_changes |= changed;
        Ok(changed)
    }

    /// Select an element; unknown ids clear the selection.
    pub fn select(&mut self, id: Option<ElementId>) {
        self.selected = id.filter(|id| self.scene.get_element(id).is_some());
    }

    /// Currently selected element.
    #[must_use]
    pub fn selected(&self) -> Option<&Element> {
        self.selected
            .as_ref()
            .and_then(|id| self.scene.get_element(id))
    }

    /// Currently selected element id.
    #[must_use]
    pub fn selected_id(&self) -> Option<&ElementId> {
        self.selected.as_ref()
    }

    /// Whether any pointer is manipulating an element.
    #[must_use]
    pub fn is_interacting(&self) -> bool {
        self.engine.active_count() > 0
    }

    /// Whether there are changes not yet persisted.
    #[must_use]
    pub fn has_local_changes(&self) -> bool {
        self.has_local_changes
    }

    /// Mark the current state as persisted.
    pub fn mark_saved(&mut self) {
        self.has_local_changes = false;
    }
}
