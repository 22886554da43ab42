//=========================================================================
// Control Signals
//
// Requests for a change in the scene tree, produced by handlers, hooks
// and `update_models`, then routed by the scene lifecycle.
//
// Routing Rules:
// ```text
// Signal     Direction   Handled by
// ────────   ─────────   ──────────────────────────────────────────
// Put        self        the raising scene (installs a child)
// Custom     self        the raising scene (behavior.on_signal)
// Pop        parent      the raising scene's parent
// SwapFor    parent      the raising scene's parent
// ```
// A self-directed signal that escapes to a parent, or a parent-directed
// signal that reaches the root, is an `InvalidSignalHandler` error.
//
//=========================================================================

//=== Standard Library Imports ============================================

use std::fmt;

//=== Internal Dependencies ===============================================

use crate::core::error::SceneError;
use crate::core::scene::SceneNode;

/// What handlers and hooks return: an optional signal, or an error.
pub type Handled = Result<Option<ControlSignal>, SceneError>;

//=== SignalTag ===========================================================

/// Name of a scene-specific signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SignalTag(&'static str);

impl SignalTag {
    pub const fn new(name: &'static str) -> Self {
        Self(name)
    }

    pub const fn name(&self) -> &'static str {
        self.0
    }
}

//=== Direction ===========================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Handled by the scene that raised it.
    SelfDirected,

    /// Handled by the parent of the scene that raised it.
    ParentDirected,
}

//=== ControlSignal =======================================================

pub enum ControlSignal {
    /// Install `scene` as the raising scene's child.
    Put(Box<dyn SceneNode>),

    /// Finish the raising scene and hand its return value to the parent.
    Pop,

    /// Replace the raising scene with `scene`.
    ///
    /// With `pop_previous` the replaced scene is finished; otherwise it is
    /// frozen and handed to `scene` through `adopt`.
    SwapFor {
        scene: Box<dyn SceneNode>,
        pop_previous: bool,
    },

    /// Scene-specific request, routed to the raising scene's
    /// `SceneBehavior::on_signal`.
    Custom(SignalTag),
}

impl ControlSignal {
    pub fn put(scene: impl SceneNode + 'static) -> Self {
        Self::Put(Box::new(scene))
    }

    pub fn swap_for(scene: impl SceneNode + 'static, pop_previous: bool) -> Self {
        Self::SwapFor {
            scene: Box::new(scene),
            pop_previous,
        }
    }

    pub fn direction(&self) -> Direction {
        match self {
            Self::Put(_) | Self::Custom(_) => Direction::SelfDirected,
            Self::Pop | Self::SwapFor { .. } => Direction::ParentDirected,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Put(_) => "put",
            Self::Pop => "pop",
            Self::SwapFor { .. } => "swap_for",
            Self::Custom(tag) => tag.name(),
        }
    }
}

impl fmt::Debug for ControlSignal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Put(scene) => f.debug_tuple("Put").field(&scene.name()).finish(),
            Self::Pop => f.write_str("Pop"),
            Self::SwapFor {
                scene,
                pop_previous,
            } => f
                .debug_struct("SwapFor")
                .field("scene", &scene.name())
                .field("pop_previous", pop_previous)
                .finish(),
            Self::Custom(tag) => f.debug_tuple("Custom").field(&tag.name()).finish(),
        }
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
