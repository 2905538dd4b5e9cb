//! Rotation-aware transform engine.
//!
//! Turns raw pointer movement into geometry for move, resize and rotate
//! sessions. Each pointer owns at most one session:
//!
//! ```text
//!   Idle ──begin──▶ Active(kind) ──update*──▶ Active ──end/cancel──▶ Idle
//!                        │                                   │
//!                        └── provisional geometry            └── one commit
//! ```
//!
//! While a session is active the scene is left untouched; callers draw the
//! provisional geometry and apply the single [`Commit`] emitted on release.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::element::normalize_degrees;
use crate::{DragTarget, ElementId, Geometry, Handle, Scene, MIN_DIMENSION};

/// Reasons a session is refused at start.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransformError {
    /// The element is locked.
    #[error("Element is locked: {0}")]
    Locked(ElementId),
    /// The element is hidden.
    #[error("Element is hidden: {0}")]
    Hidden(ElementId),
    /// No element with this id exists.
    #[error("Element not found: {0}")]
    UnknownElement(ElementId),
}

/// Viewport facts needed to map pointer samples onto the canvas.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TransformContext {
    /// Screen pixels per canvas pixel.
    pub zoom: f32,
    /// Canvas width in canvas pixels.
    pub canvas_width: f32,
    /// Canvas height in canvas pixels.
    pub canvas_height: f32,
    /// Screen position of the canvas top-left corner.
    pub canvas_origin: (f32, f32),
    /// Keep the width/height ratio while resizing.
    pub aspect_lock: bool,
}

impl TransformContext {
    /// Context for a canvas of the given size at 100% zoom.
    #[must_use]
    pub const fn new(canvas_width: f32, canvas_height: f32) -> Self {
        Self {
            zoom: 1.0,
            canvas_width,
            canvas_height,
            canvas_origin: (0.0, 0.0),
            aspect_lock: false,
        }
    }

    /// Set the zoom factor.
    #[must_use]
    pub const fn with_zoom(mut self, zoom: f32) -> Self {
        self.zoom = zoom;
        self
    }

    /// Set the aspect-ratio lock.
    #[must_use]
    pub const fn with_aspect_lock(mut self, aspect_lock: bool) -> Self {
        self.aspect_lock = aspect_lock;
        self
    }

    /// Zoom with degenerate values replaced by 1.
    fn effective_zoom(&self) -> f32 {
        if self.zoom.is_finite() && self.zoom > 0.0 {
            self.zoom
        } else {
            1.0
        }
    }

    /// Map a screen point to canvas coordinates.
    #[must_use]
    pub fn to_canvas(&self, x: f32, y: f32) -> (f32, f32) {
        let zoom = self.effective_zoom();
        (
            (x - self.canvas_origin.0) / zoom,
            (y - self.canvas_origin.1) / zoom,
        )
    }
}

/// Kind of an active session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "handle", rename_all = "lowercase")]
pub enum SessionKind {
    /// Translate the element.
    Move,
    /// Resize from a handle.
    Resize(Handle),
    /// Rotate about the center.
    Rotate,
}

impl From<DragTarget> for SessionKind {
    fn from(target: DragTarget) -> Self {
        match target {
            DragTarget::Move => Self::Move,
            DragTarget::Resize(handle) => Self::Resize(handle),
            DragTarget::Rotate => Self::Rotate,
        }
    }
}

/// An active manipulation owned by one pointer.
#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    /// Element being manipulated.
    pub element_id: ElementId,
    /// What the session does.
    pub kind: SessionKind,
    /// Geometry when the session started.
    pub origin: Geometry,
    /// Screen position of the pointer-down.
    pub start: (f32, f32),
    /// Latest computed geometry, not yet committed.
    pub provisional: Geometry,
}

/// The geometry to write back when a session ends.
#[derive(Debug, Clone, PartialEq)]
pub struct Commit {
    /// Element to update.
    pub element_id: ElementId,
    /// Final geometry.
    pub geometry: Geometry,
    /// Kind of the finished session.
    pub kind: SessionKind,
}

/// Tracks one session per pointer id.
#[derive(Debug, Clone, Default)]
pub struct TransformEngine {
    sessions: HashMap<u32, Session>,
}

impl TransformEngine {
    /// Create an idle engine.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a session for `pointer_id` on `element_id`.
    ///
    /// Locked, hidden and unknown elements are refused without any state
    /// change. A session already held by the same pointer is replaced; a
    /// session held by another pointer on the same element is dropped, so the
    /// latest session owns the element.
    ///
    /// # Errors
    ///
    /// Returns a [`TransformError`] describing the refusal.
    pub fn begin(
        &mut self,
        scene: &Scene,
        pointer_id: u32,
        element_id: &ElementId,
        kind: SessionKind,
        start: (f32, f32),
    ) -> Result<&Session, TransformError> {
        let element = scene
            .get_element(element_id)
            .ok_or_else(|| TransformError::UnknownElement(element_id.clone()))?;
        if element.locked {
            tracing::warn!("Refusing {kind:?} session on locked element {element_id}");
            return Err(TransformError::Locked(element_id.clone()));
        }
        if !element.visible {
            return Err(TransformError::Hidden(element_id.clone()));
        }

        self.sessions.retain(|pointer, session| {
            let stale = *pointer != pointer_id && &session.element_id == element_id;
            if stale {
                tracing::debug!("Pointer {pointer} lost element {element_id} to pointer {pointer_id}");
            }
            !stale
        });

        tracing::debug!("Pointer {pointer_id} begins {kind:?} on {element_id}");
        let session = Session {
            element_id: element_id.clone(),
            kind,
            origin: element.geometry,
            start,
            provisional: element.geometry,
        };
        self.sessions.insert(pointer_id, session);
        Ok(&self.sessions[&pointer_id])
    }

    /// Feed a pointer-move sample. Returns the new provisional geometry, or
    /// `None` when the pointer has no session.
    pub fn update(
        &mut self,
        pointer_id: u32,
        position: (f32, f32),
        ctx: &TransformContext,
    ) -> Option<Geometry> {
        let session = self.sessions.get_mut(&pointer_id)?;
        let zoom = ctx.effective_zoom();
        let dx = (position.0 - session.start.0) / zoom;
        let dy = (position.1 - session.start.1) / zoom;

        session.provisional = match session.kind {
            SessionKind::Move => move_geometry(session.origin, dx, dy, ctx),
            SessionKind::Resize(handle) => {
                resize_geometry(session.origin, handle, dx, dy, ctx.aspect_lock)
            }
            SessionKind::Rotate => rotate_geometry(
                session.origin,
                ctx.to_canvas(session.start.0, session.start.1),
                ctx.to_canvas(position.0, position.1),
            ),
        };
        Some(session.provisional)
    }

    /// End the session for `pointer_id` (pointer-up or cancel), returning the
    /// commit to apply. `None` when the pointer had no session.
    pub fn end(&mut self, pointer_id: u32) -> Option<Commit> {
        let session = self.sessions.remove(&pointer_id)?;
        tracing::debug!(
            "Pointer {pointer_id} commits {:?} on {}",
            session.kind,
            session.element_id
        );
        Some(Commit {
            element_id: session.element_id,
            geometry: session.provisional,
            kind: session.kind,
        })
    }

    /// The session owned by `pointer_id`, if any.
    #[must_use]
    pub fn session(&self, pointer_id: u32) -> Option<&Session> {
        self.sessions.get(&pointer_id)
    }

    /// Whether `pointer_id` has an active session.
    #[must_use]
    pub fn is_active(&self, pointer_id: u32) -> bool {
        self.sessions.contains_key(&pointer_id)
    }

    /// Number of active sessions.
    #[must_use]
    pub fn active_count(&self) -> usize {
        self.sessions.len()
    }
}

/// Project a canvas-space delta into an element's rotated frame.
#[must_use]
pub fn project_to_local(dx: f32, dy: f32, rotation_deg: f32) -> (f32, f32) {
    let (sin, cos) = rotation_deg.to_radians().sin_cos();
    (dx * cos + dy * sin, dy * cos - dx * sin)
}

/// Project a delta in an element's rotated frame back onto the canvas.
#[must_use]
pub fn project_to_world(local_x: f32, local_y: f32, rotation_deg: f32) -> (f32, f32) {
    let (sin, cos) = rotation_deg.to_radians().sin_cos();
    (local_x * cos - local_y * sin, local_x * sin + local_y * cos)
}

/// Translate by a canvas-space delta, keeping the box inside the canvas.
#[must_use]
pub fn move_geometry(origin: Geometry, dx: f32, dy: f32, ctx: &TransformContext) -> Geometry {
    let max_x = (ctx.canvas_width - origin.width).max(0.0);
    let max_y = (ctx.canvas_height - origin.height).max(0.0);
    Geometry {
        x: (origin.x + dx).clamp(0.0, max_x).round(),
        y: (origin.y + dy).clamp(0.0, max_y).round(),
        ..origin
    }
}

/// Resize from `handle` by a canvas-space delta.
///
/// The delta is projected into the element's frame, applied to the edges the
/// handle drives, and the top-left is shifted so the opposite edge stays put
/// on screen even though rotation pivots about the center.
#[must_use]
pub fn resize_geometry(
    origin: Geometry,
    handle: Handle,
    dx: f32,
    dy: f32,
    aspect_lock: bool,
) -> Geometry {
    let (local_dx, local_dy) = project_to_local(dx, dy, origin.rotation);
    let (sx, sy) = (handle.x_sign(), handle.y_sign());

    let mut width = (origin.width + sx * local_dx).max(MIN_DIMENSION);
    let mut height = (origin.height + sy * local_dy).max(MIN_DIMENSION);

    if aspect_lock {
        let ratio = origin.width / origin.height;
        if handle.drives_width() {
            height = (width / ratio).max(MIN_DIMENSION);
        } else {
            width = (height * ratio).max(MIN_DIMENSION);
        }
    }

    let width = width.round();
    let height = height.round();
    let delta_w = width - origin.width;
    let delta_h = height - origin.height;

    // The center moves half the growth towards the dragged edges.
    let (shift_x, shift_y) =
        project_to_world(sx * delta_w / 2.0, sy * delta_h / 2.0, origin.rotation);

    Geometry {
        x: (origin.x + shift_x - delta_w / 2.0).round(),
        y: (origin.y + shift_y - delta_h / 2.0).round(),
        width,
        height,
        rotation: origin.rotation,
    }
}

/// Rotate about the center by the angle the pointer swept, both points in
/// canvas coordinates.
#[must_use]
pub fn rotate_geometry(origin: Geometry, start: (f32, f32), current: (f32, f32)) -> Geometry {
    let (cx, cy) = origin.center();
    let start_angle = (start.1 - cy).atan2(start.0 - cx);
    let angle = (current.1 - cy).atan2(current.0 - cx);
    Geometry {
        rotation: normalize_degrees(origin.rotation + (angle - start_angle).to_degrees()),
        ..origin
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Element, ElementKind, ShapeStyle};

    fn approx(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-3
    }

    fn scene_with(geometry: Geometry, locked: bool) -> (Scene, ElementId) {
        let mut scene = Scene::new(1000.0, 1000.0);
        let id = scene.add_element(
            Element::new(ElementKind::Shape(ShapeStyle::default()))
                .with_geometry(geometry)
                .with_locked(locked),
        );
        (scene, id)
    }

    #[test]
    fn test_east_resize_without_rotation_keeps_origin() {
        let origin = Geometry::new(100.0, 100.0, 200.0, 100.0);
        let result = resize_geometry(origin, Handle::E, 50.0, 30.0, false);
        assert!(approx(result.width, 250.0));
        assert!(approx(result.height, 100.0));
        assert!(approx(result.x, 100.0));
        assert!(approx(result.y, 100.0));
    }

    #[test]
    fn test_west_resize_moves_left_edge() {
        let origin = Geometry::new(100.0, 100.0, 200.0, 100.0);
        let result = resize_geometry(origin, Handle::W, -40.0, 0.0, false);
        assert!(approx(result.width, 240.0));
        assert!(approx(result.x, 60.0));
    }

    #[test]
    fn test_resize_floors_at_minimum() {
        let origin = Geometry::new(100.0, 100.0, 200.0, 100.0);
        let result = resize_geometry(origin, Handle::Se, -500.0, -500.0, false);
        assert!(approx(result.width, MIN_DIMENSION));
        assert!(approx(result.height, MIN_DIMENSION));
        assert!(approx(result.x, 100.0));
        assert!(approx(result.y, 100.0));
    }

    #[test]
    fn test_aspect_lock() {
        let origin = Geometry::new(0.0, 0.0, 200.0, 100.0);
        let corner = resize_geometry(origin, Handle::Se, 100.0, 0.0, true);
        assert!(approx(corner.width, 300.0));
        assert!(approx(corner.height, 150.0));

        let north = resize_geometry(origin, Handle::N, 0.0, -50.0, true);
        assert!(approx(north.height, 150.0));
        assert!(approx(north.width, 300.0));
    }

    #[test]
    fn test_rotated_resize_pins_opposite_edge() {
        // At 90 degrees the element's local +x axis points down the screen.
        let origin = Geometry::new(100.0, 100.0, 200.0, 100.0).with_rotation(90.0);
        let (cx, cy) = origin.center();
        // The west edge midpoint in world space before resizing.
        let (wx, wy) = project_to_world(-origin.width / 2.0, 0.0, origin.rotation);
        let west_before = (cx + wx, cy + wy);

        let result = resize_geometry(origin, Handle::E, 0.0, 60.0, false);
        assert!(approx(result.width, 260.0));

        let (ncx, ncy) = result.center();
        let (wx, wy) = project_to_world(-result.width / 2.0, 0.0, result.rotation);
        assert!((ncx + wx - west_before.0).abs() <= 1.0);
        assert!((ncy + wy - west_before.1).abs() <= 1.0);
    }

    #[test]
    fn test_move_clamps_to_canvas() {
        let ctx = TransformContext::new(500.0, 400.0);
        let origin = Geometry::new(100.0, 100.0, 100.0, 100.0);
        let result = move_geometry(origin, 1000.0, -1000.0, &ctx);
        assert!(approx(result.x, 400.0));
        assert!(approx(result.y, 0.0));
    }

    #[test]
    fn test_rotate_follows_pointer() {
        let origin = Geometry::new(0.0, 0.0, 100.0, 100.0);
        // From due east of the center to due south: a quarter turn clockwise.
        let result = rotate_geometry(origin, (100.0, 50.0), (50.0, 100.0));
        assert!(approx(result.rotation, 90.0));
        let back = rotate_geometry(origin, (50.0, 100.0), (100.0, 50.0));
        assert!(approx(back.rotation, 270.0));
    }

    #[test]
    fn test_session_lifecycle_commits_once() {
        let (scene, id) = scene_with(Geometry::new(10.0, 10.0, 100.0, 100.0), false);
        let ctx = TransformContext::new(1000.0, 1000.0).with_zoom(0.5);
        let mut engine = TransformEngine::new();

        engine
            .begin(&scene, 1, &id, SessionKind::Move, (0.0, 0.0))
            .expect("begin");
        let provisional = engine.update(1, (20.0, 10.0), &ctx).expect("active");
        assert!(approx(provisional.x, 50.0));
        assert!(approx(provisional.y, 30.0));

        let commit = engine.end(1).expect("commit");
        assert_eq!(commit.element_id, id);
        assert_eq!(commit.geometry, provisional);
        assert!(engine.end(1).is_none());
        assert!(engine.update(1, (0.0, 0.0), &ctx).is_none());
    }

    #[test]
    fn test_locked_element_refused() {
        let (scene, id) = scene_with(Geometry::new(10.0, 10.0, 100.0, 100.0), true);
        let mut engine = TransformEngine::new();
        let err = engine
            .begin(&scene, 1, &id, SessionKind::Resize(Handle::E), (0.0, 0.0))
            .expect_err("locked");
        assert_eq!(err, TransformError::Locked(id));
        assert_eq!(engine.active_count(), 0);
    }

    #[test]
    fn test_last_pointer_owns_element() {
        let (scene, id) = scene_with(Geometry::new(10.0, 10.0, 100.0, 100.0), false);
        let mut engine = TransformEngine::new();
        engine
            .begin(&scene, 1, &id, SessionKind::Move, (0.0, 0.0))
            .expect("first");
        engine
            .begin(&scene, 2, &id, SessionKind::Rotate, (0.0, 0.0))
            .expect("second");
        assert!(!engine.is_active(1));
        assert!(engine.is_active(2));
    }
}
