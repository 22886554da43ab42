//=========================================================================
// Scene Errors
//
// Single error type shared by the scene lifecycle, the event controller,
// the resource cache and the configuration layer.
//
// Every fallible operation in `core` returns `Result<_, SceneError>` and
// propagates with `?`. Errors raised by a handler abort the rest of the
// frame and travel up the scene tree to the engine, which logs them and
// shuts down.
//
//=========================================================================

//=== External Dependencies ===============================================

use thiserror::Error;

//=== SceneError ==========================================================

/// Failure raised by scene, controller, asset or configuration code.
#[derive(Debug, Error)]
pub enum SceneError {
    /// Malformed binding, argument or configuration value.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// A control signal reached a scene that cannot route it.
    #[error("no handler for control signal: {0}")]
    InvalidSignalHandler(String),

    /// `pop` or `swap` requested on a scene without a child.
    #[error("cannot {operation}: scene has no child")]
    NoChild { operation: &'static str },

    /// Lifecycle transition into a state the scene already holds
    /// (freeze twice, unfreeze twice, finish twice, step after finish).
    #[error("scene is already {0}")]
    AlreadyInState(&'static str),

    /// Unload requested for a resource group that was never loaded.
    #[error("resource group `{0}` is not loaded")]
    NotLoaded(String),

    /// A game-level transition received an argument it does not accept.
    #[error("invalid transition: {0}")]
    InvalidTransition(String),

    /// An asset could not be decoded.
    #[error("failed to decode asset: {0}")]
    Asset(#[from] image::ImageError),

    /// Filesystem access failed while scanning or reading.
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    /// The draw surface refused to present a frame.
    #[error("surface error: {0}")]
    Surface(String),
}

impl SceneError {
    /// Shorthand for [`SceneError::Configuration`].
    pub fn config(message: impl Into<String>) -> Self {
        Self::Configuration(message.into())
    }

    pub(crate) fn no_child(operation: &'static str) -> Self {
        Self::NoChild { operation }
    }
}

//=========================================================================
// Unit Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_failure() {
        assert_eq!(
            SceneError::no_child("pop").to_string(),
            "cannot pop: scene has no child"
        );
        assert_eq!(
            SceneError::AlreadyInState("frozen").to_string(),
            "scene is already frozen"
        );
        assert_eq!(
            SceneError::NotLoaded("planets".into()).to_string(),
            "resource group `planets` is not loaded"
        );
    }

    #[test]
    fn io_errors_convert() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let err: SceneError = io.into();
        assert!(matches!(err, SceneError::Io(_)));
    }
}
