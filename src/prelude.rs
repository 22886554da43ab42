//=========================================================================
// Prelude
//=========================================================================
//
// Convenience module that re-exports commonly used types and traits.
//
// Usage:
//   use space_battle::prelude::*;
//
//=========================================================================

//=== Public API ==========================================================

// Engine
pub use crate::core::platform_bridge::PlatformError;
pub use crate::engine::{Engine, EngineBuilder};

// Configuration, errors and time
pub use crate::core::clock::Clock;
pub use crate::core::config::GameConfig;
pub use crate::core::error::SceneError;

// Input system
pub use crate::core::input::{
    Args, Call, EventController, EventKind, InputEvent, InputSource, KeyCode, ModMask, Modifiers,
    MouseButton, ScriptedInput, Trigger,
};

// Scene system
pub use crate::core::scene::{
    ControlSignal, Handled, LoadingScene, LoadingSequence, PauseScene, Phase, Progress, ReturnValue,
    Scene, SceneBehavior, SceneNode, SignalTag, StepOutcome, RESUME,
};

// Rendering and assets
pub use crate::core::assets::{AssetBatch, ResourceCache};
pub use crate::core::render::{Color, FrameBuffer, ImageView, Layers, Model, Surface, View};
