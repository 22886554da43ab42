//=========================================================================
// Input Module
//
// Event types, handler arguments and the per-scene event controller.
//
// Scenes pull input through the `InputSource` trait once per step. The
// windowed build feeds it from the platform channel; tests and headless
// runs feed it from a `ScriptedInput`.
//
//=========================================================================

//=== Submodules ==========================================================

pub mod args;
pub mod controller;
pub mod event;

//=== Standard Library Imports ============================================

use std::collections::VecDeque;

//=== Re-exports ==========================================================

pub use args::{ArgValue, Args};
pub use controller::{BoundHandler, Call, EventController, Registration, Trigger};
pub use event::{EventKind, InputEvent, KeyCode, ModMask, Modifiers, MouseButton};

//=== InputSource =========================================================

/// Supplier of the events a scene dispatches during one step.
pub trait InputSource {
    /// Returns (and consumes) every event pending since the last poll.
    fn poll_events(&mut self) -> Vec<InputEvent>;
}

//=== ScriptedInput =======================================================

/// Replays pre-recorded frames of input, one frame per poll.
///
/// Once the script runs out every poll returns an empty batch.
#[derive(Debug, Clone, Default)]
pub struct ScriptedInput {
    frames: VecDeque<Vec<InputEvent>>,
}

impl ScriptedInput {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues one frame of events.
    pub fn push_frame(&mut self, events: impl IntoIterator<Item = InputEvent>) -> &mut Self {
        self.frames.push_back(events.into_iter().collect());
        self
    }

    /// Queues a frame with no input.
    pub fn push_idle(&mut self) -> &mut Self {
        self.frames.push_back(Vec::new());
        self
    }

    pub fn pending_frames(&self) -> usize {
        self.frames.len()
    }
}

impl InputSource for ScriptedInput {
    fn poll_events(&mut self) -> Vec<InputEvent> {
        self.frames.pop_front().unwrap_or_default()
    }
}

//=========================================================================
// Unit Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scripted_input_replays_frames_in_order() {
        let mut input = ScriptedInput::new();
        input
            .push_frame([InputEvent::key_down(KeyCode::Space)])
            .push_idle()
            .push_frame([InputEvent::Quit]);

        assert_eq!(input.poll_events(), [InputEvent::key_down(KeyCode::Space)]);
        assert!(input.poll_events().is_empty());
        assert_eq!(input.poll_events(), [InputEvent::Quit]);
        assert!(input.poll_events().is_empty());
        assert_eq!(input.pending_frames(), 0);
    }
}
