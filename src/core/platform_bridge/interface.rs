//=========================================================================
// Platform Interface
//=========================================================================
//
// Messages the platform layer hands to the scene tree, and the errors
// that can stop the platform from running at all.
//
//=========================================================================

//=== External Dependencies ===============================================

use thiserror::Error;

//=== Internal Dependencies ===============================================

use crate::core::error::SceneError;
use crate::core::input::event::InputEvent;

//=== PlatformEvent =======================================================

/// One message from the window system to the scene tree.
#[derive(Debug, Clone)]
pub(crate) enum PlatformEvent {
    /// Every input event buffered since the previous frame, in order.
    Inputs(Vec<InputEvent>),

    /// The window was closed by the user or the OS.
    WindowClosed,
}

//=== PlatformError =======================================================

/// Fatal failures of the windowed runtime.
#[derive(Debug, Error)]
pub enum PlatformError {
    #[error("event loop creation failed: {0}")]
    EventLoopCreation(#[source] winit::error::EventLoopError),

    #[error("event loop error: {0}")]
    EventLoopExecution(#[source] winit::error::EventLoopError),

    #[error("window creation failed: {0}")]
    Window(#[from] winit::error::OsError),

    #[error("frame buffer creation failed: {0}")]
    FrameBuffer(#[from] pixels::Error),

    #[error(transparent)]
    Scene(#[from] SceneError),
}
