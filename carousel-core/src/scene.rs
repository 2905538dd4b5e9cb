//! Scene model: the ordered element list plus canvas dimensions.
//!
//! Array order is paint order (later elements draw on top) and is the only
//! stacking authority.

use serde::{Deserialize, Serialize};

use crate::{Element, ElementId, Geometry, SceneError, SceneResult};

/// Default canvas width in pixels.
pub const DEFAULT_WIDTH: f32 = 1600.0;

/// Default canvas height in pixels.
pub const DEFAULT_HEIGHT: f32 = 2000.0;

/// Direction for [`Scene::move_layer`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LayerDirection {
    /// One step towards the top (later in paint order).
    Up,
    /// One step towards the bottom.
    Down,
}

/// A scene containing all canvas elements in paint order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scene {
    /// Canvas width in pixels.
    pub width: f32,
    /// Canvas height in pixels.
    pub height: f32,
    /// Elements, bottom to top.
    #[serde(default)]
    elements: Vec<Element>,
}

impl Default for Scene {
    fn default() -> Self {
        Self::new(DEFAULT_WIDTH, DEFAULT_HEIGHT)
    }
}

impl Scene {
    /// Create a new empty scene with the given canvas size.
    #[must_use]
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            width,
            height,
            elements: Vec::new(),
        }
    }

    /// Create a scene from already-ordered elements, normalizing each one.
    #[must_use]
    pub fn with_elements(width: f32, height: f32, elements: Vec<Element>) -> Self {
        let mut scene = Self::new(width, height);
        for element in elements {
            scene.add_element(element);
        }
        scene
    }

    /// Append an element at the top of the paint order.
    pub fn add_element(&mut self, mut element: Element) -> ElementId {
        element.normalize();
        let id = element.id.clone();
        self.elements.push(element);
        id
    }

    /// Remove an element. Returns `None` when the id is unknown.
    pub fn remove_element(&mut self, id: &ElementId) -> Option<Element> {
        let index = self.index_of(id)?;
        Some(self.elements.remove(index))
    }

    /// Clone an element with a fresh id, offset by `offset` on both axes,
    /// and place the clone at the top of the paint order.
    ///
    /// Returns `None` when the id is unknown.
    pub fn duplicate_element(&mut self, id: &ElementId, offset: f32) -> Option<ElementId> {
        let original = self.get_element(id)?;
        let mut clone = original.clone();
        clone.id = ElementId::new();
        clone.name = Some(format!(
            "{} copy",
            original.name.as_deref().unwrap_or("Layer")
        ));
        clone.geometry.x += offset;
        clone.geometry.y += offset;
        Some(self.add_element(clone))
    }

    /// Move an element one step up or down the paint order.
    ///
    /// Returns `false` (and changes nothing) when the id is unknown or the
    /// element is already at the end it would move past.
    pub fn move_layer(&mut self, id: &ElementId, direction: LayerDirection) -> bool {
        let Some(index) = self.index_of(id) else {
            return false;
        };
        let target = match direction {
            LayerDirection::Up => index + 1,
            LayerDirection::Down => match index.checked_sub(1) {
                Some(i) => i,
                None => return false,
            },
        };
        if target >= self.elements.len() {
            return false;
        }
        self.elements.swap(index, target);
        true
    }

    /// Get an element by ID.
    #[must_use]
    pub fn get_element(&self, id: &ElementId) -> Option<&Element> {
        self.elements.iter().find(|e| &e.id == id)
    }

    /// Position of an element in paint order.
    #[must_use]
    pub fn index_of(&self, id: &ElementId) -> Option<usize> {
        self.elements.iter().position(|e| &e.id == id)
    }

    /// Mutate an element in place, re-normalizing afterwards.
    ///
    /// Returns `false` when the id is unknown.
    pub fn update_element<F>(&mut self, id: &ElementId, f: F) -> bool
    where
        F: FnOnce(&mut Element),
    {
        let Some(element) = self.elements.iter_mut().find(|e| &e.id == id) else {
            return false;
        };
        f(element);
        element.normalize();
        true
    }

    /// Replace an element's geometry (a committed transform).
    ///
    /// Returns `false` when the id is unknown.
    pub fn apply_geometry(&mut self, id: &ElementId, geometry: Geometry) -> bool {
        self.update_element(id, |element| element.geometry = geometry)
    }

    /// Merge a property-editor patch into an element.
    ///
    /// `patch` is a JSON object whose keys overwrite the element's
    /// serialized attributes; the `id` key is ignored. Returns `Ok(false)`
    /// when the id is unknown.
    ///
    /// # Errors
    ///
    /// Returns an error if the patch is not an object or the merged
    /// attributes no longer form a valid element.
    pub fn merge_patch(&mut self, id: &ElementId, patch: &serde_json::Value) -> SceneResult<bool> {
        let Some(updates) = patch.as_object() else {
            return Err(SceneError::InvalidOperation(
                "patch must be a JSON object".to_string(),
            ));
        };
        let Some(index) = self.index_of(id) else {
            return Ok(false);
        };

        let mut merged = serde_json::to_value(&self.elements[index])?;
        if let Some(fields) = merged.as_object_mut() {
            for (key, value) in updates {
                if key != "id" {
                    fields.insert(key.clone(), value.clone());
                }
            }
        }
        let mut element: Element = serde_json::from_value(merged)?;
        element.normalize();
        self.elements[index] = element;
        Ok(true)
    }

    /// All elements in paint order.
    #[must_use]
    pub fn elements(&self) -> &[Element] {
        &self.elements
    }

    /// Visible elements in paint order.
    pub fn visible_elements(&self) -> impl Iterator<Item = &Element> {
        self.elements.iter().filter(|e| e.visible)
    }

    /// Set the canvas dimensions.
    pub fn set_canvas_size(&mut self, width: f32, height: f32) {
        self.width = width;
        self.height = height;
    }

    /// Find the topmost visible element at the given canvas coordinates.
    #[must_use]
    pub fn element_at(&self, x: f32, y: f32) -> Option<&ElementId> {
        self.elements
            .iter()
            .rev()
            .find(|e| e.contains_point(x, y))
            .map(|e| &e.id)
    }

    /// Get the number of elements in the scene.
    #[must_use]
    pub fn element_count(&self) -> usize {
        self.elements.len()
    }

    /// Check if the scene is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Serialize the scene to JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> SceneResult<String> {
        serde_json::to_string(self).map_err(SceneError::Serialization)
    }

    /// Deserialize a scene from JSON, normalizing every element.
    ///
    /// # Errors
    ///
    /// Returns an error if deserialization fails.
    pub fn from_json(json: &str) -> SceneResult<Self> {
        let scene: Self = serde_json::from_str(json)?;
        Ok(Self::with_elements(scene.width, scene.height, scene.elements))
    }
}
