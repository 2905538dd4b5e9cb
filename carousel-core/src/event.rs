//! Pointer input for direct manipulation on the canvas.

use serde::{Deserialize, Serialize};

use crate::ElementId;

/// Phase of a pointer event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PointerPhase {
    /// Button pressed.
    Down,
    /// Pointer moved.
    Move,
    /// Button released.
    Up,
    /// Pointer lost (e.g., capture released by the platform).
    Cancel,
}

/// One of the eight resize affordances around an element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[allow(missing_docs)]
pub enum Handle {
    N,
    S,
    E,
    W,
    Ne,
    Nw,
    Se,
    Sw,
}

impl Handle {
    /// All handles, clockwise from north.
    pub const ALL: [Self; 8] = [
        Self::N,
        Self::Ne,
        Self::E,
        Self::Se,
        Self::S,
        Self::Sw,
        Self::W,
        Self::Nw,
    ];

    /// Horizontal edge driven by this handle: `1` east, `-1` west, `0` none.
    #[must_use]
    pub const fn x_sign(self) -> f32 {
        match self {
            Self::E | Self::Ne | Self::Se => 1.0,
            Self::W | Self::Nw | Self::Sw => -1.0,
            Self::N | Self::S => 0.0,
        }
    }

    /// Vertical edge driven by this handle: `1` south, `-1` north, `0` none.
    #[must_use]
    pub const fn y_sign(self) -> f32 {
        match self {
            Self::S | Self::Se | Self::Sw => 1.0,
            Self::N | Self::Ne | Self::Nw => -1.0,
            Self::E | Self::W => 0.0,
        }
    }

    /// Whether the handle sits on a corner.
    #[must_use]
    pub const fn is_corner(self) -> bool {
        matches!(self, Self::Ne | Self::Nw | Self::Se | Self::Sw)
    }

    /// Whether width is the dominant axis when the aspect ratio is locked.
    ///
    /// Corners and east/west handles drive width; north/south drive height.
    #[must_use]
    pub const fn drives_width(self) -> bool {
        !matches!(self, Self::N | Self::S)
    }
}

impl std::str::FromStr for Handle {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "n" => Ok(Self::N),
            "s" => Ok(Self::S),
            "e" => Ok(Self::E),
            "w" => Ok(Self::W),
            "ne" => Ok(Self::Ne),
            "nw" => Ok(Self::Nw),
            "se" => Ok(Self::Se),
            "sw" => Ok(Self::Sw),
            other => Err(format!("unknown handle: {other}")),
        }
    }
}

/// What part of an element the pointer went down on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "handle", rename_all = "lowercase")]
pub enum DragTarget {
    /// The element body: move.
    Move,
    /// A resize handle.
    Resize(Handle),
    /// The rotation knob.
    Rotate,
}

/// A pointer position sample in screen (client) coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PointerSample {
    /// Pointer identifier (for multi-pointer input).
    pub pointer_id: u32,
    /// X position in screen pixels.
    pub x: f32,
    /// Y position in screen pixels.
    pub y: f32,
}

impl PointerSample {
    /// Create a sample.
    #[must_use]
    pub const fn new(pointer_id: u32, x: f32, y: f32) -> Self {
        Self { pointer_id, x, y }
    }
}

/// A pointer event routed to the editor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PointerEvent {
    /// Phase of this event.
    pub phase: PointerPhase,
    /// Pointer position.
    pub sample: PointerSample,
    /// Mouse button (0 = primary).
    #[serde(default)]
    pub button: u8,
    /// Element and affordance under the pointer, when the host already knows
    /// it (handles are host-drawn). `None` on `Down` means "hit-test the body".
    #[serde(default)]
    pub target: Option<(ElementId, DragTarget)>,
}

impl PointerEvent {
    /// Pointer-down on a specific element affordance.
    #[must_use]
    pub fn down_on(sample: PointerSample, element: ElementId, target: DragTarget) -> Self {
        Self {
            phase: PointerPhase::Down,
            sample,
            button: 0,
            target: Some((element, target)),
        }
    }

    /// Pointer-down with no known target.
    #[must_use]
    pub const fn down(sample: PointerSample) -> Self {
        Self {
            phase: PointerPhase::Down,
            sample,
            button: 0,
            target: None,
        }
    }

    /// Pointer-move.
    #[must_use]
    pub const fn moved(sample: PointerSample) -> Self {
        Self {
            phase: PointerPhase::Move,
            sample,
            button: 0,
            target: None,
        }
    }

    /// Pointer-up.
    #[must_use]
    pub const fn up(sample: PointerSample) -> Self {
        Self {
            phase: PointerPhase::Up,
            sample,
            button: 0,
            target: None,
        }
    }

    /// Pointer-cancel.
    #[must_use]
    pub const fn cancel(sample: PointerSample) -> Self {
        Self {
            phase: PointerPhase::Cancel,
            sample,
            button: 0,
            target: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_handle_signs() {
        assert!((Handle::Ne.x_sign() - 1.0).abs() < f32::EPSILON);
        assert!((Handle::Ne.y_sign() + 1.0).abs() < f32::EPSILON);
        assert!(Handle::Sw.is_corner());
        assert!(!Handle::N.drives_width());
        assert!(Handle::W.drives_width());
    }

    #[test]
    fn test_handle_parse() {
        for handle in Handle::ALL {
            let name = serde_json::to_value(handle).expect("serialize");
            let parsed: Handle = name.as_str().expect("str").parse().expect("parse");
            assert_eq!(parsed, handle);
        }
        assert!("x".parse::<Handle>().is_err());
    }

    #[test]
    fn test_drag_target_wire_format() {
        let json = serde_json::to_value(DragTarget::Resize(Handle::Se)).expect("json");
        assert_eq!(json, serde_json::json!({"kind": "resize", "handle": "se"}));
    }
}
