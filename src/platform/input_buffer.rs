//=========================================================================
// Input Buffer
//
// Collects input between two redraws and hands it over as one batch.
//
// Responsibilities:
// - Keep discrete inputs (keys, buttons, quit) in arrival order
// - Drop an exact repeat of the previous discrete event
// - Coalesce continuous inputs (MouseMoved) so only the latest survives
//
// Discrete events come first in a drained batch, followed by the
// coalesced continuous ones.
//
//=========================================================================

//=== Standard Library Imports ============================================

use std::collections::HashSet;

//=== Internal Dependencies ===============================================

use crate::core::input::event::InputEvent;

//=== InputBuffer =========================================================

pub(crate) struct InputBuffer {
    discrete: Vec<InputEvent>,
    continuous: HashSet<InputEvent>,
}

impl InputBuffer {
    //--- Construction -----------------------------------------------------

    pub(crate) fn new() -> Self {
        const DISCRETE_BASE: usize = 64;
        const CONTINUOUS_BASE: usize = 4;

        Self {
            discrete: Vec::with_capacity(DISCRETE_BASE),
            continuous: HashSet::with_capacity(CONTINUOUS_BASE),
        }
    }

    //--- Buffering --------------------------------------------------------

    /// Routes `event` to the discrete or continuous store.
    pub(crate) fn push(&mut self, event: InputEvent) {
        if event.is_continuous() {
            self.continuous.replace(event);
        } else if self.discrete.last() != Some(&event) {
            self.discrete.push(event);
        }
    }

    //--- Drain ------------------------------------------------------------

    /// Returns everything buffered since the last drain.
    pub(crate) fn drain(&mut self) -> Vec<InputEvent> {
        let mut events = std::mem::take(&mut self.discrete);
        events.extend(self.continuous.drain());
        events
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.discrete.is_empty() && self.continuous.is_empty()
    }
}

//=========================================================================
// Unit Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::input::event::KeyCode;

    fn mouse_move(x: f32, y: f32) -> InputEvent {
        InputEvent::MouseMoved { x, y }
    }

    #[test]
    fn consecutive_duplicates_are_dropped() {
        let mut buffer = InputBuffer::new();
        buffer.push(InputEvent::key_down(KeyCode::KeyA));
        buffer.push(InputEvent::key_down(KeyCode::KeyA));
        buffer.push(InputEvent::key_down(KeyCode::KeyB));
        assert_eq!(buffer.discrete.len(), 2);
    }

    #[test]
    fn press_release_press_is_kept() {
        let mut buffer = InputBuffer::new();
        buffer.push(InputEvent::key_down(KeyCode::Space));
        buffer.push(InputEvent::key_up(KeyCode::Space));
        buffer.push(InputEvent::key_down(KeyCode::Space));
        assert_eq!(buffer.drain().len(), 3);
    }

    #[test]
    fn latest_mouse_move_wins() {
        let mut buffer = InputBuffer::new();
        buffer.push(mouse_move(10.0, 10.0));
        buffer.push(mouse_move(20.0, 30.0));

        let events = buffer.drain();
        assert_eq!(events.len(), 1);
        match events[0] {
            InputEvent::MouseMoved { x, y } => assert_eq!((x, y), (20.0, 30.0)),
            other => panic!("Expected MouseMoved event, found {:?}", other),
        }
    }

    #[test]
    fn drain_puts_discrete_first_and_empties_buffer() {
        let mut buffer = InputBuffer::new();
        buffer.push(mouse_move(5.0, 5.0));
        buffer.push(InputEvent::Quit);

        let events = buffer.drain();
        assert_eq!(events[0], InputEvent::Quit);
        assert_eq!(events.len(), 2);
        assert!(buffer.is_empty());
    }
}
