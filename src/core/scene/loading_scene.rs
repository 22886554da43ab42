//=========================================================================
// Loading Scene
//
// Front-end that runs another scene's preload one item per frame while
// drawing a progress bar, then swaps itself for that scene.
//
// The target's preload is obtained on the loading scene's own first
// step, which marks the target as started: once swapped in, the target
// goes straight to its first frame without loading again.
//
//=========================================================================

//=== Standard Library Imports ============================================

use std::time::Duration;

//=== External Dependencies ===============================================

use log::{debug, info};

//=== Internal Dependencies ===============================================

use crate::core::error::SceneError;
use crate::core::render::{Color, Surface};
use crate::core::scene::loading::{LoadingSequence, Progress};
use crate::core::scene::node::{ReturnValue, Scene, SceneBehavior, SceneNode};
use crate::core::scene::signal::{ControlSignal, Handled};

const TRACK: Color = Color::rgb(40, 40, 60);
const FILL: Color = Color::rgb(120, 200, 255);

//=== LoadingScene ========================================================

pub struct LoadingScene<B: SceneBehavior> {
    target: Option<Scene<B>>,
    sequence: Option<LoadingSequence<B>>,
    last_message: Option<String>,
    fraction: f32,
}

impl<B: SceneBehavior> LoadingScene<B> {
    pub fn new(target: Scene<B>) -> Self {
        Self {
            target: Some(target),
            sequence: None,
            last_message: None,
            fraction: 0.0,
        }
    }

    /// Share of the target's preload completed so far.
    pub fn fraction(&self) -> f32 {
        self.fraction
    }

    pub fn last_message(&self) -> Option<&str> {
        self.last_message.as_deref()
    }
}

impl<B: SceneBehavior> SceneBehavior for LoadingScene<B> {
    fn name(&self) -> &str {
        "loading"
    }

    fn on_preload(&mut self, surface: &dyn Surface) -> LoadingSequence<Self> {
        if let Some(target) = self.target.as_mut() {
            let sequence = target.preload(surface);
            debug!(
                target: "scene::loading",
                "{} has {} loading steps",
                target.name(),
                sequence.total()
            );
            self.sequence = Some(sequence);
        }
        LoadingSequence::empty()
    }

    fn update_models(&mut self, _delta: Duration) -> Handled {
        let target = self
            .target
            .as_mut()
            .ok_or_else(|| SceneError::no_child("load"))?;
        let sequence = self.sequence.get_or_insert_with(LoadingSequence::empty);

        match target.advance_loading(sequence) {
            Some(progress) => {
                if let Progress::Message(message) = progress? {
                    info!(target: "scene::loading", "{}", message);
                    self.last_message = Some(message);
                }
                self.fraction = sequence.fraction();
                Ok(None)
            }
            None => {
                self.fraction = 1.0;
                let target = self
                    .target
                    .take()
                    .ok_or_else(|| SceneError::no_child("load"))?;
                Ok(Some(ControlSignal::swap_for(target, true)))
            }
        }
    }

    fn on_finish(&mut self) -> Result<ReturnValue, SceneError> {
        // Abandoned before the swap.
        if let Some(mut target) = self.target.take() {
            target.finish()?;
        }
        Ok(None)
    }

    fn draw(&self, surface: &mut dyn Surface) {
        let (width, height) = surface.size();
        let bar_w = width * 3 / 4;
        let bar_h = (height / 24).max(4);
        let x = ((width - bar_w) / 2) as i32;
        let y = (height.saturating_sub(bar_h) / 2) as i32;

        surface.fill_rect(x, y, bar_w, bar_h, TRACK);
        let filled = (bar_w as f32 * self.fraction.clamp(0.0, 1.0)) as u32;
        surface.fill_rect(x, y, filled, bar_h, FILL);
    }
}

//=========================================================================
// Unit Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::input::{EventController, ScriptedInput};
    use crate::core::render::FrameBuffer;
    use crate::core::scene::node::Phase;

    #[derive(Default)]
    struct Level {
        loaded: Vec<u32>,
    }

    impl SceneBehavior for Level {
        fn name(&self) -> &str {
            "level"
        }

        fn on_preload(&mut self, _surface: &dyn Surface) -> LoadingSequence<Self> {
            let mut seq = LoadingSequence::new().message("Loading Sector");
            for i in 0..3 {
                seq.push(move |level: &mut Level| {
                    level.loaded.push(i);
                    Ok(Progress::Tick)
                });
            }
            seq
        }
    }

    fn loading_scene() -> Scene<LoadingScene<Level>> {
        let level = Scene::new(Level::default(), EventController::new());
        Scene::new(LoadingScene::new(level), EventController::new())
    }

    #[test]
    fn advances_one_item_per_frame_then_swaps() {
        let mut scene = loading_scene();
        let mut surface = FrameBuffer::new(32, 32);
        let mut input = ScriptedInput::new();

        let mut steps = 0;
        let swapped = loop {
            let outcome = scene.step(&mut surface, &mut input).unwrap();
            steps += 1;
            if let Some(signal) = outcome.signal {
                break signal;
            }
        };

        // Four items, then one frame that finds the sequence empty.
        assert_eq!(steps, 5);
        assert_eq!(scene.behavior().fraction(), 1.0);
        assert_eq!(scene.behavior().last_message(), Some("Loading Sector"));

        let ControlSignal::SwapFor { scene: level, pop_previous } = swapped else {
            panic!("expected SwapFor, got {:?}", swapped);
        };
        assert!(pop_previous);
        assert_eq!(level.name(), "level");
        assert_eq!(level.state().phase(), Phase::Frozen);
    }

    #[test]
    fn swapped_target_does_not_reload() {
        let mut scene = loading_scene();
        let mut surface = FrameBuffer::new(8, 8);
        let mut input = ScriptedInput::new();

        let mut level = loop {
            if let Some(ControlSignal::SwapFor { scene: target, .. }) =
                scene.step(&mut surface, &mut input).unwrap().signal
            {
                break target;
            }
        };

        level.unfreeze().unwrap();
        let outcome = level.step(&mut surface, &mut input).unwrap();
        assert!(outcome.signal.is_none());
        assert!(level.state().started);
    }

    #[test]
    fn abandoning_finishes_target() {
        let mut scene = loading_scene();
        scene.finish().unwrap();
        assert!(scene.behavior().target.is_none());
    }

    #[test]
    fn progress_bar_fills() {
        let mut loading = LoadingScene::new(Scene::new(Level::default(), EventController::new()));
        loading.fraction = 1.0;
        let mut surface = FrameBuffer::new(40, 40);
        loading.draw(&mut surface);
        assert_eq!(surface.pixel(20, 20), Some(FILL));
    }
}
