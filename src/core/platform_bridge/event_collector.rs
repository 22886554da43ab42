//=========================================================================
// Event Collector
//=========================================================================
//
// Scene-side end of the platform channel.
//
// Architecture:
//   Receiver<PlatformEvent> → poll_events() → Vec<InputEvent> → scene
//
// Implements `InputSource`, so the engine hands it straight to the root
// scene each frame. A closed window becomes an `InputEvent::Quit` so
// scenes can react through their quit handlers, and the collector
// remembers that a quit was requested so the engine can stop even if no
// scene handles it.
//
//=========================================================================

//=== External Dependencies ===============================================

use crossbeam_channel::{Receiver, TryRecvError};
use log::{debug, warn};

//=== Internal Dependencies ===============================================

use super::PlatformEvent;
use crate::core::input::event::InputEvent;
use crate::core::input::InputSource;

//=== EventCollector ======================================================

/// Drains platform messages into per-frame input batches.
pub(crate) struct EventCollector {
    receiver: Receiver<PlatformEvent>,
    quit_requested: bool,
}

impl EventCollector {
    pub(crate) fn new(receiver: Receiver<PlatformEvent>) -> Self {
        Self {
            receiver,
            quit_requested: false,
        }
    }

    /// Whether a quit (closed window or dropped channel) has been seen.
    pub(crate) fn quit_requested(&self) -> bool {
        self.quit_requested
    }

    fn handle_event(&mut self, event: PlatformEvent, events: &mut Vec<InputEvent>) {
        match event {
            PlatformEvent::Inputs(batch) => events.extend(batch),
            PlatformEvent::WindowClosed => {
                debug!(target: "platform", "window closed, delivering quit");
                events.push(InputEvent::Quit);
            }
        }
    }
}

impl InputSource for EventCollector {
    /// Collects pending platform events (bounded to prevent starvation).
    fn poll_events(&mut self) -> Vec<InputEvent> {
        const MAX_MESSAGES_PER_FRAME: usize = 100;

        let mut events = Vec::new();
        let mut drained = 0;

        while drained < MAX_MESSAGES_PER_FRAME {
            match self.receiver.try_recv() {
                Ok(event) => {
                    self.handle_event(event, &mut events);
                    drained += 1;
                }
                Err(TryRecvError::Disconnected) => {
                    if !self.quit_requested {
                        warn!(target: "platform", "platform channel disconnected");
                        events.push(InputEvent::Quit);
                    }
                    break;
                }
                Err(TryRecvError::Empty) => break,
            }
        }

        if drained >= MAX_MESSAGES_PER_FRAME {
            warn!(target: "platform", "event queue backlog: drained {} messages this frame", drained);
        }

        if events.iter().any(|event| matches!(event, InputEvent::Quit)) {
            self.quit_requested = true;
        }
        events
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
