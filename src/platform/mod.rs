//=========================================================================
// Platform Subsystem
//
// Runs the winit event loop, owns the window and the pixel surface, and
// drives the root scene once per redraw.
//
// Architecture:
// ```text
//  Main Thread
//  ┌──────────────────────────────────────────────────────┐
//  │  Winit Event Loop                                    │
//  │   ↓                                                  │
//  │  InputProcessor  (winit → InputEvent, modifiers)     │
//  │   ↓                                                  │
//  │  InputBuffer     (dedupe discrete, coalesce moves)   │
//  │   ↓ RedrawRequested (flush)                          │
//  │  crossbeam channel                                   │
//  │   ↓                                                  │
//  │  EventCollector  (InputSource)                       │
//  │   ↓                                                  │
//  │  root.step(PixelsSurface, EventCollector)            │
//  └──────────────────────────────────────────────────────┘
// ```
//
// Frame Boundary: RedrawRequested
//   → buffered input flushed as one batch
//   → root scene stepped (throttled by the scene clocks)
//   → next redraw requested
//
// Shutdown:
//   → the root scene pops, or
//   → a quit was delivered and no scene stopped the application, or
//   → a scene returned an error
//   The root scene is finished before the loop exits.
//
//=========================================================================

//=== Submodules ==========================================================

mod input_buffer;
mod input_processor;
mod surface;

//=== Standard Library Imports ============================================

use std::sync::Arc;

//=== External Crates =====================================================

use crossbeam_channel::{bounded, Sender, TrySendError};
use log::*;
use pixels::{Pixels, SurfaceTexture};
use winit::{
    application::ApplicationHandler,
    dpi::LogicalSize,
    event::WindowEvent,
    event_loop::{ActiveEventLoop, EventLoop},
    window::{Window, WindowAttributes, WindowId},
};

//=== Internal Imports ====================================================

use crate::core::config::WindowConfig;
use crate::core::error::SceneError;
use crate::core::platform_bridge::{EventCollector, PlatformError, PlatformEvent};
use crate::core::render::Surface;
use crate::core::scene::{ControlSignal, SceneNode, StepOutcome};
use input_buffer::InputBuffer;
use input_processor::InputProcessor;
use surface::PixelsSurface;

//=== FrameControl ========================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum FrameControl {
    Continue,
    Exit,
}

//=== Platform ============================================================

/// Window, input pipeline and root scene.
///
/// This type is NOT Send/Sync; it must remain on the main thread.
pub(crate) struct Platform {
    window_config: WindowConfig,

    /// OS window handle (None until `resumed()` called).
    window: Option<Arc<Window>>,
    surface: Option<PixelsSurface>,

    buffer: InputBuffer,
    input_processor: InputProcessor,
    event_sender: Sender<PlatformEvent>,
    collector: EventCollector,

    root: Option<Box<dyn SceneNode>>,
    failure: Option<PlatformError>,
}

impl Platform {
    //--- Construction -----------------------------------------------------

    pub(crate) fn new(
        window_config: WindowConfig,
        channel_capacity: usize,
        root: Box<dyn SceneNode>,
    ) -> Self {
        let (event_sender, receiver) = bounded(channel_capacity);
        info!(target: "platform", "Platform subsystem initialized (root: {})", root.name());
        Self {
            window_config,
            window: None,
            surface: None,
            buffer: InputBuffer::new(),
            input_processor: InputProcessor::new(),
            event_sender,
            collector: EventCollector::new(receiver),
            root: Some(root),
            failure: None,
        }
    }

    //--- Execution --------------------------------------------------------

    /// Runs the event loop until the scene tree ends.
    ///
    /// # Errors
    ///
    /// Fails if the loop, the window or the frame buffer cannot be
    /// created, or with the first error a scene returned.
    pub(crate) fn run(mut self) -> Result<(), PlatformError> {
        debug!(target: "platform", "Starting Winit event loop");

        let event_loop = EventLoop::new().map_err(PlatformError::EventLoopCreation)?;
        event_loop
            .run_app(&mut self)
            .map_err(PlatformError::EventLoopExecution)?;

        self.shutdown();
        match self.failure.take() {
            Some(failure) => Err(failure),
            None => Ok(()),
        }
    }

    //--- Frame ------------------------------------------------------------

    /// Flushes input and steps the root scene once.
    fn advance(&mut self, surface: &mut dyn Surface) -> FrameControl {
        self.flush_input_buffer();

        let Some(root) = self.root.as_mut() else {
            return FrameControl::Exit;
        };

        match root.step(surface, &mut self.collector) {
            Ok(StepOutcome {
                signal: Some(ControlSignal::Pop),
                ..
            }) => {
                info!(target: "platform", "Root scene popped, exiting");
                FrameControl::Exit
            }
            Ok(StepOutcome {
                signal: Some(stray),
                ..
            }) => {
                let err = SceneError::InvalidSignalHandler(format!(
                    "`{}` reached the root scene",
                    stray.name()
                ));
                error!(target: "platform", "{}", err);
                self.failure = Some(err.into());
                FrameControl::Exit
            }
            Ok(_) if self.collector.quit_requested() => {
                info!(target: "platform", "Quit requested, exiting");
                FrameControl::Exit
            }
            Ok(_) => FrameControl::Continue,
            Err(err) => {
                error!(target: "platform", "Scene failed: {}", err);
                self.failure = Some(err.into());
                FrameControl::Exit
            }
        }
    }

    /// Finishes the root scene if it is still alive.
    fn shutdown(&mut self) {
        let Some(mut root) = self.root.take() else {
            return;
        };
        if !root.state().alive {
            return;
        }
        debug!(target: "platform", "Finishing root scene {}", root.name());
        if let Err(err) = root.finish() {
            error!(target: "platform", "Finishing root scene failed: {}", err);
            self.failure.get_or_insert(err.into());
        }
    }

    /// Sends everything buffered since the last frame to the collector.
    ///
    /// Empty buffers are not sent.
    fn flush_input_buffer(&mut self) {
        if self.buffer.is_empty() {
            return;
        }
        let events = self.buffer.drain();
        trace!(target: "platform::input", "Flushing {} events", events.len());
        self.send(PlatformEvent::Inputs(events));
    }

    fn send(&self, event: PlatformEvent) {
        match self.event_sender.try_send(event) {
            Ok(()) => {}
            Err(TrySendError::Full(dropped)) => {
                warn!(target: "platform::input", "Input channel full, dropping {:?}", dropped);
            }
            Err(TrySendError::Disconnected(_)) => {
                warn!(target: "platform::input", "Input channel disconnected");
            }
        }
    }

    fn create_surface(&self, window: Arc<Window>) -> Result<PixelsSurface, PlatformError> {
        let size = window.inner_size();
        let texture = SurfaceTexture::new(size.width, size.height, window);
        let (width, height) = (self.window_config.width, self.window_config.height);
        let pixels = Pixels::new(width, height, texture)?;
        Ok(PixelsSurface::new(pixels, width, height))
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, failure: PlatformError) {
        error!(target: "platform", "{}", failure);
        self.failure = Some(failure);
        self.shutdown();
        event_loop.exit();
    }
}

//=== Winit Integration ===================================================

impl ApplicationHandler for Platform {
    /// Creates the window and its frame buffer on first activation.
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            debug!(target: "platform", "Window already exists (mobile resume?)");
            return;
        }

        let attrs = WindowAttributes::default()
            .with_title(self.window_config.title.clone())
            .with_inner_size(LogicalSize::new(
                self.window_config.width,
                self.window_config.height,
            ));

        let window = match event_loop.create_window(attrs) {
            Ok(window) => Arc::new(window),
            Err(e) => return self.fail(event_loop, e.into()),
        };

        match self.create_surface(Arc::clone(&window)) {
            Ok(surface) => {
                info!(
                    target: "platform",
                    "Window created: {}x{} @ {}x DPI",
                    window.inner_size().width,
                    window.inner_size().height,
                    window.scale_factor()
                );
                window.request_redraw();
                self.surface = Some(surface);
                self.window = Some(window);
            }
            Err(e) => self.fail(event_loop, e),
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _window_id: WindowId, event: WindowEvent) {
        match &event {
            WindowEvent::CloseRequested => {
                info!(target: "platform", "Window close requested");
                self.flush_input_buffer();
                self.send(PlatformEvent::WindowClosed);
                if let Some(window) = &self.window {
                    window.request_redraw();
                }
            }

            WindowEvent::Resized(size) => {
                if let Some(surface) = self.surface.as_mut() {
                    surface.resize(size.width, size.height);
                }
            }

            WindowEvent::ModifiersChanged(state) => {
                trace!(target: "platform::input", "Modifiers changed: {:?}", state);
                self.input_processor.update_modifiers(state.state());
            }

            WindowEvent::CursorMoved { position, .. } => {
                let event = self
                    .input_processor
                    .process_mouse_move(position.x as f32, position.y as f32);
                self.buffer.push(event);
            }

            WindowEvent::KeyboardInput { event: key_event, .. } => {
                if let Some(event) = self.input_processor.process_key_event(key_event) {
                    self.buffer.push(event);
                } else {
                    trace!(target: "platform::input", "Unmapped or repeated key ignored");
                }
            }

            WindowEvent::MouseInput { state, button, .. } => {
                let event = self.input_processor.process_mouse_button(*button, *state);
                self.buffer.push(event);
            }

            WindowEvent::RedrawRequested => {
                let Some(mut surface) = self.surface.take() else {
                    return;
                };
                let control = self.advance(&mut surface);
                self.surface = Some(surface);

                match control {
                    FrameControl::Continue => {
                        if let Some(window) = &self.window {
                            window.request_redraw();
                        }
                    }
                    FrameControl::Exit => {
                        self.shutdown();
                        event_loop.exit();
                    }
                }
            }

            _ => {}
        }
    }
}

//=========================================================================
// Unit Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::input::{Call, EventController, InputEvent, KeyCode};
    use crate::core::render::FrameBuffer;
    use crate::core::scene::{Scene, SceneBehavior};
    use std::cell::Cell;
    use std::rc::Rc;

    struct Counter {
        frames: Rc<Cell<u32>>,
        finished: Rc<Cell<bool>>,
    }

    impl SceneBehavior for Counter {
        fn name(&self) -> &str {
            "counter"
        }

        fn update_models(&mut self, _delta: std::time::Duration) -> crate::core::scene::Handled {
            self.frames.set(self.frames.get() + 1);
            Ok(None)
        }

        fn on_finish(&mut self) -> Result<crate::core::scene::ReturnValue, SceneError> {
            self.finished.set(true);
            Ok(None)
        }
    }

    fn platform(controller: EventController<Counter>) -> (Platform, Rc<Cell<u32>>, Rc<Cell<bool>>) {
        let frames = Rc::new(Cell::new(0));
        let finished = Rc::new(Cell::new(false));
        let root = Scene::new(
            Counter {
                frames: frames.clone(),
                finished: finished.clone(),
            },
            controller,
        );
        let platform = Platform::new(WindowConfig::default(), 16, Box::new(root));
        (platform, frames, finished)
    }

    #[test]
    fn window_is_created_lazily() {
        let (platform, _, _) = platform(EventController::new());
        assert!(platform.window.is_none());
        assert!(platform.surface.is_none());
    }

    #[test]
    fn each_advance_steps_the_root() {
        let (mut platform, frames, _) = platform(EventController::new());
        let mut surface = FrameBuffer::new(8, 8);

        assert_eq!(platform.advance(&mut surface), FrameControl::Continue);
        assert_eq!(platform.advance(&mut surface), FrameControl::Continue);
        assert_eq!(frames.get(), 2);
        assert_eq!(surface.presented(), 2);
    }

    #[test]
    fn buffered_input_reaches_handlers() {
        let mut controller = EventController::new();
        controller
            .on_key_down(KeyCode::Escape, Default::default(), |_: &mut Counter, _: &Call<'_>| {
                Ok(Some(ControlSignal::Pop))
            })
            .unwrap();
        let (mut platform, _, finished) = platform(controller);
        let mut surface = FrameBuffer::new(8, 8);

        platform.buffer.push(InputEvent::key_down(KeyCode::Escape));
        assert_eq!(platform.advance(&mut surface), FrameControl::Exit);

        platform.shutdown();
        assert!(finished.get());
        assert!(platform.failure.is_none());
    }

    #[test]
    fn unhandled_close_still_exits() {
        let (mut platform, _, finished) = platform(EventController::new());
        let mut surface = FrameBuffer::new(8, 8);

        platform.send(PlatformEvent::WindowClosed);
        assert_eq!(platform.advance(&mut surface), FrameControl::Exit);
        platform.shutdown();
        assert!(finished.get());
    }

    #[test]
    fn stray_root_signal_is_a_failure() {
        let mut controller = EventController::new();
        controller
            .on_key_down(KeyCode::KeyX, Default::default(), |_: &mut Counter, _: &Call<'_>| {
                let other = Scene::new(
                    Counter {
                        frames: Rc::default(),
                        finished: Rc::default(),
                    },
                    EventController::new(),
                );
                Ok(Some(ControlSignal::swap_for(other, true)))
            })
            .unwrap();
        let (mut platform, _, _) = platform(controller);

        platform.buffer.push(InputEvent::key_down(KeyCode::KeyX));
        assert_eq!(platform.advance(&mut FrameBuffer::new(4, 4)), FrameControl::Exit);
        assert!(matches!(
            platform.failure,
            Some(PlatformError::Scene(SceneError::InvalidSignalHandler(_)))
        ));
    }

    #[test]
    fn flush_skips_empty_buffer() {
        let (mut platform, _, _) = platform(EventController::new());
        platform.flush_input_buffer();
        assert!(platform.event_sender.is_empty());
    }

    #[test]
    fn platform_error_is_error_trait() {
        fn assert_error<T: std::error::Error>() {}
        assert_error::<PlatformError>();
    }
}
