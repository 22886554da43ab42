//=========================================================================
// Pause Scene
//
// Holds a frozen scene while the game is paused and hands it back on
// resume.
//
// Flow:
// ```text
// game handler → SwapFor { pause, pop_previous: false }
//      parent freezes game, pause.adopt(game), unfreezes pause
// pause handler → Custom(RESUME)
//      on_signal → SwapFor { game, pop_previous: true }
//      parent finishes pause, unfreezes game
// ```
// While paused the held scene is drawn underneath a dimming overlay,
// but never stepped.
//
//=========================================================================

//=== External Dependencies ===============================================

use log::info;

//=== Internal Dependencies ===============================================

use crate::core::error::SceneError;
use crate::core::input::{Args, Call, EventController, KeyCode};
use crate::core::render::{Color, Surface};
use crate::core::scene::node::{ReturnValue, SceneBehavior, SceneNode};
use crate::core::scene::signal::{ControlSignal, Handled, SignalTag};

/// Custom signal a pause scene answers by handing its held scene back.
pub const RESUME: SignalTag = SignalTag::new("resume");

const OVERLAY: Color = Color::rgba(0, 0, 0, 150);
const GLYPH: Color = Color::rgba(255, 255, 255, 220);

//=== PauseScene ==========================================================

#[derive(Default)]
pub struct PauseScene {
    held: Option<Box<dyn SceneNode>>,
}

impl PauseScene {
    pub fn new() -> Self {
        Self::default()
    }

    /// Controller with `keys` bound to resume.
    pub fn controller(keys: &[KeyCode]) -> Result<EventController<Self>, SceneError> {
        let mut controller = EventController::new();
        for key in keys {
            controller.on_key_down(*key, Args::new(), Self::resume)?;
        }
        Ok(controller)
    }

    /// Input handler that requests a resume.
    pub fn resume(_: &mut Self, _: &Call<'_>) -> Handled {
        Ok(Some(ControlSignal::Custom(RESUME)))
    }

    pub fn is_holding(&self) -> bool {
        self.held.is_some()
    }

    pub fn held(&self) -> Option<&dyn SceneNode> {
        self.held.as_deref()
    }
}

impl SceneBehavior for PauseScene {
    fn name(&self) -> &str {
        "pause"
    }

    fn on_adopt(&mut self, frozen: Box<dyn SceneNode>) -> Option<Box<dyn SceneNode>> {
        if self.held.is_some() {
            return Some(frozen);
        }
        info!(target: "scene", "paused {}", frozen.name());
        self.held = Some(frozen);
        None
    }

    fn on_signal(&mut self, tag: SignalTag) -> Handled {
        if tag != RESUME {
            return Err(SceneError::InvalidSignalHandler(format!(
                "`{}` raised by pause",
                tag.name()
            )));
        }
        let scene = self.held.take().ok_or_else(|| SceneError::no_child("resume"))?;
        info!(target: "scene", "resuming {}", scene.name());
        Ok(Some(ControlSignal::SwapFor {
            scene,
            pop_previous: true,
        }))
    }

    fn on_finish(&mut self) -> Result<ReturnValue, SceneError> {
        if let Some(mut held) = self.held.take() {
            if held.state().alive {
                held.finish()?;
            }
        }
        Ok(None)
    }

    fn draw(&self, surface: &mut dyn Surface) {
        if let Some(held) = &self.held {
            held.draw(surface);
        }

        let (width, height) = surface.size();
        surface.fill_rect(0, 0, width, height, OVERLAY);

        // Two vertical bars in the middle of the screen.
        let bar_w = (width / 40).max(2);
        let bar_h = (height / 8).max(4);
        let cx = (width / 2) as i32;
        let top = (height.saturating_sub(bar_h) / 2) as i32;
        surface.fill_rect(cx - 2 * bar_w as i32, top, bar_w, bar_h, GLYPH);
        surface.fill_rect(cx + bar_w as i32, top, bar_w, bar_h, GLYPH);
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
