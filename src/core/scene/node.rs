//=========================================================================
// Scene Lifecycle
//
// Hierarchical scene tree with freeze / unfreeze / finish semantics.
//
// Every scene may own at most one child. While a child exists the parent
// does no work of its own: each step is delegated straight down the
// chain to the deepest scene, the only one that polls input, updates
// and draws. Signals raised at the bottom climb back up until a scene
// handles them.
//
// State Machine:
// ```text
//             step (first)                    finish
//   Fresh ─────────────────▶ Running ───────────────────▶ Finished
//  (frozen)                  ▲     │                        ▲
//                  unfreeze  │     │ freeze                 │ finish
//                            │     ▼                        │
//                            Frozen ────────────────────────┘
// ```
// `Fresh` scenes are frozen and not yet started; the first step
// unfreezes them, runs the preload sequence to completion and marks them
// started. `Finished` is terminal.
//
// One Step:
// ```text
// step
//  ├─ finished?           → Err(AlreadyInState)
//  ├─ frozen?             → unfreeze (resets clock)
//  ├─ has child?          → child.step → route child's signal → return
//  └─ body:
//      preload (first time) → delta → poll → dispatch
//      → update_models → update_views → clear → draw → present
//      → throttle
// ```
// A signal raised anywhere in the body aborts the rest of that step.
// Events polled after the one that raised it are kept and dispatched
// first on the scene's next body run.
//
//=========================================================================

//=== Standard Library Imports ============================================

use std::any::Any;
use std::time::Duration;

//=== External Dependencies ===============================================

use log::{debug, info, trace, warn};

//=== Internal Dependencies ===============================================

use crate::core::clock::Clock;
use crate::core::error::SceneError;
use crate::core::input::{EventController, InputEvent, InputSource};
use crate::core::render::{Color, Surface};
use crate::core::scene::loading::{LoadingSequence, Progress};
use crate::core::scene::signal::{ControlSignal, Handled, SignalTag};

/// Value a finished scene hands back to its parent.
pub type ReturnValue = Option<Box<dyn Any>>;

//=== SceneState ==========================================================

/// Lifecycle flags of a scene.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SceneState {
    pub frozen: bool,
    pub alive: bool,
    pub started: bool,
}

/// Named lifecycle phase derived from [`SceneState`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Fresh,
    Running,
    Frozen,
    Finished,
}

impl SceneState {
    pub fn phase(&self) -> Phase {
        match (self.alive, self.frozen, self.started) {
            (false, _, _) => Phase::Finished,
            (true, true, false) => Phase::Fresh,
            (true, true, true) => Phase::Frozen,
            (true, false, _) => Phase::Running,
        }
    }
}

//=== StepOutcome =========================================================

/// Result of one successful step.
#[derive(Debug, Default)]
pub struct StepOutcome {
    /// Time fed to the scene body that ran, if one ran to completion.
    pub delta: Option<Duration>,

    /// Signal escaping to the caller (the parent, or the engine at the
    /// root).
    pub signal: Option<ControlSignal>,
}

//=== SceneNode ===========================================================

/// Object-safe interface every node of the scene tree implements.
///
/// Parents hold children as `Box<dyn SceneNode>`, so a scene can host
/// any other scene regardless of its behavior type.
pub trait SceneNode {
    fn name(&self) -> &str;

    fn state(&self) -> SceneState;

    /// Runs one frame of the active scene chain rooted here.
    fn step(
        &mut self,
        surface: &mut dyn Surface,
        input: &mut dyn InputSource,
    ) -> Result<StepOutcome, SceneError>;

    fn freeze(&mut self) -> Result<(), SceneError>;

    fn unfreeze(&mut self) -> Result<(), SceneError>;

    /// Ends the scene for good, finishing its child first.
    fn finish(&mut self) -> Result<ReturnValue, SceneError>;

    /// Receives the frozen scene this node replaced through a
    /// non-popping swap.
    fn adopt(&mut self, frozen: Box<dyn SceneNode>) -> Result<(), SceneError>;

    /// Draws the scene's current picture without advancing it.
    fn draw(&self, surface: &mut dyn Surface);

    fn child(&self) -> Option<&dyn SceneNode>;
}

//=== SceneBehavior =======================================================

/// Scene-specific content plugged into a [`Scene`].
///
/// The behavior is also the context every registered input handler
/// receives, so handlers mutate scene state directly. Every hook has a
/// no-op default.
pub trait SceneBehavior: Sized + 'static {
    fn name(&self) -> &str;

    //--- Lifecycle Hooks --------------------------------------------------

    /// Builds the work run before the first frame. Called at most once.
    fn on_preload(&mut self, _surface: &dyn Surface) -> LoadingSequence<Self> {
        LoadingSequence::empty()
    }

    fn on_freeze(&mut self) {}

    fn on_unfreeze(&mut self) {}

    fn on_finish(&mut self) -> Result<ReturnValue, SceneError> {
        Ok(None)
    }

    /// Called after a child popped, with the child's return value. A
    /// returned signal is routed as if this scene raised it.
    fn on_return(&mut self, _value: ReturnValue) -> Handled {
        Ok(None)
    }

    /// Offered the frozen scene this one replaced. Return it back to
    /// decline; a declined scene is finished.
    fn on_adopt(&mut self, frozen: Box<dyn SceneNode>) -> Option<Box<dyn SceneNode>> {
        Some(frozen)
    }

    /// Handles a [`ControlSignal::Custom`] raised by this scene.
    fn on_signal(&mut self, tag: SignalTag) -> Handled {
        Err(SceneError::InvalidSignalHandler(format!(
            "`{}` raised by {}",
            tag.name(),
            self.name()
        )))
    }

    //--- Frame Hooks ------------------------------------------------------

    fn update_models(&mut self, _delta: Duration) -> Handled {
        Ok(None)
    }

    fn update_views(&mut self, _delta: Duration) {}

    fn clear_surface(&self, surface: &mut dyn Surface) {
        surface.clear(Color::BLACK);
    }

    fn draw(&self, _surface: &mut dyn Surface) {}

    fn present_surface(&self, surface: &mut dyn Surface) -> Result<(), SceneError> {
        surface.present()
    }
}

//=== Scene ===============================================================

/// A scene tree node: behavior, input controller, clock and child slot.
///
/// # Examples
///
/// ```
/// use space_battle::prelude::*;
///
/// struct Title;
///
/// impl SceneBehavior for Title {
///     fn name(&self) -> &str {
///         "title"
///     }
/// }
///
/// let mut controller = EventController::new();
/// controller.on_quit(|_: &mut Title, _: &Call<'_>| Ok(Some(ControlSignal::Pop))).unwrap();
///
/// let mut scene = Scene::new(Title, controller);
/// let mut surface = FrameBuffer::new(8, 8);
/// let mut input = ScriptedInput::new();
/// input.push_idle().push_frame([InputEvent::Quit]);
///
/// assert!(scene.step(&mut surface, &mut input).unwrap().signal.is_none());
/// let outcome = scene.step(&mut surface, &mut input).unwrap();
/// assert!(matches!(outcome.signal, Some(ControlSignal::Pop)));
/// ```
pub struct Scene<B: SceneBehavior> {
    behavior: B,
    controller: EventController<B>,
    clock: Clock,
    child: Option<Box<dyn SceneNode>>,
    /// Events polled but not dispatched because an earlier one raised a
    /// signal. They lead the next batch this scene dispatches.
    deferred: Vec<InputEvent>,
    frozen: bool,
    alive: bool,
    started: bool,
}

impl<B: SceneBehavior> Scene<B> {
    //--- Construction -----------------------------------------------------

    /// Creates a fresh (frozen, not started) scene with an unthrottled
    /// clock.
    pub fn new(behavior: B, controller: EventController<B>) -> Self {
        Self {
            behavior,
            controller,
            clock: Clock::new(),
            child: None,
            deferred: Vec::new(),
            frozen: true,
            alive: true,
            started: false,
        }
    }

    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    //--- Accessors --------------------------------------------------------

    pub fn behavior(&self) -> &B {
        &self.behavior
    }

    pub fn behavior_mut(&mut self) -> &mut B {
        &mut self.behavior
    }

    pub fn controller_mut(&mut self) -> &mut EventController<B> {
        &mut self.controller
    }

    pub fn clock(&self) -> &Clock {
        &self.clock
    }

    //--- Loading ----------------------------------------------------------

    /// Returns the scene's preload work and marks the scene started.
    ///
    /// A started scene returns an empty sequence. The scene counts as
    /// started as soon as this is called, so a sequence dropped before
    /// completion is never offered again.
    pub fn preload(&mut self, surface: &dyn Surface) -> LoadingSequence<B> {
        if self.started {
            return LoadingSequence::empty();
        }
        self.started = true;
        self.behavior.on_preload(surface)
    }

    /// Runs the next item of a sequence obtained from
    /// [`preload`](Self::preload) against this scene's behavior.
    pub fn advance_loading(
        &mut self,
        sequence: &mut LoadingSequence<B>,
    ) -> Option<Result<Progress, SceneError>> {
        sequence.advance(&mut self.behavior)
    }

    //--- Tree Operations --------------------------------------------------

    /// Installs `scene` as this scene's child.
    ///
    /// # Errors
    ///
    /// [`SceneError::AlreadyInState`] if a child is already present.
    pub fn put(&mut self, scene: Box<dyn SceneNode>) -> Result<(), SceneError> {
        if self.child.is_some() {
            return Err(SceneError::AlreadyInState("parenting a child"));
        }
        debug!(target: "scene", "{} → put {}", self.behavior.name(), scene.name());
        self.child = Some(scene);
        Ok(())
    }

    /// Finishes the child and passes its return value to `on_return`.
    ///
    /// Returns whatever signal `on_return` produced that this scene could
    /// not handle itself.
    pub fn pop(&mut self) -> Handled {
        let mut child = self.child.take().ok_or_else(|| SceneError::no_child("pop"))?;
        debug!(target: "scene", "{} → pop {}", self.behavior.name(), child.name());

        let value = child.finish()?;
        match self.behavior.on_return(value)? {
            Some(signal) => self.route(signal),
            None => Ok(None),
        }
    }

    /// Replaces the child with `scene` and unfreezes it.
    ///
    /// The previous child is finished when `pop_previous` is set, and
    /// otherwise frozen and handed to `scene` through `adopt`.
    pub fn swap_for(&mut self, scene: Box<dyn SceneNode>, pop_previous: bool) -> Result<(), SceneError> {
        let mut previous = self.child.take().ok_or_else(|| SceneError::no_child("swap"))?;
        let mut next = scene;
        debug!(
            target: "scene",
            "{} → swap {} for {} (pop_previous: {})",
            self.behavior.name(),
            previous.name(),
            next.name(),
            pop_previous
        );

        if pop_previous {
            previous.finish()?;
        } else {
            previous.freeze()?;
            next.adopt(previous)?;
        }

        next.unfreeze()?;
        self.child = Some(next);
        Ok(())
    }

    //--- Internal Helpers -------------------------------------------------

    /// Handles a signal this scene raised. Self-directed signals are
    /// handled here, along with any signal their handling raises in
    /// turn; parent-directed ones are returned for the caller.
    fn route(&mut self, signal: ControlSignal) -> Handled {
        let mut signal = signal;
        loop {
            signal = match signal {
                ControlSignal::Put(scene) => {
                    self.put(scene)?;
                    return Ok(None);
                }
                ControlSignal::Custom(tag) => match self.behavior.on_signal(tag)? {
                    Some(next) => next,
                    None => return Ok(None),
                },
                escaping => return Ok(Some(escaping)),
            };
        }
    }

    /// Handles a signal that escaped from the child.
    fn catch(&mut self, signal: ControlSignal) -> Handled {
        match signal {
            ControlSignal::Pop => self.pop(),
            ControlSignal::SwapFor {
                scene,
                pop_previous,
            } => {
                self.swap_for(scene, pop_previous)?;
                Ok(None)
            }
            stray => Err(SceneError::InvalidSignalHandler(format!(
                "`{}` escaped from the child of {}",
                stray.name(),
                self.behavior.name()
            ))),
        }
    }

    fn load_if_first_time(&mut self, surface: &dyn Surface) -> Result<(), SceneError> {
        if self.started {
            return Ok(());
        }
        let mut sequence = self.preload(surface);
        while let Some(progress) = self.advance_loading(&mut sequence) {
            if let Progress::Message(message) = progress? {
                info!(target: "scene::loading", "{}: {}", self.behavior.name(), message);
            }
        }
        Ok(())
    }

    fn run_body(
        &mut self,
        surface: &mut dyn Surface,
        input: &mut dyn InputSource,
    ) -> Result<StepOutcome, SceneError> {
        self.load_if_first_time(surface)?;

        let delta = self.clock.delta();
        let mut events = std::mem::take(&mut self.deferred);
        events.extend(input.poll_events());

        if let Some((index, signal)) = self.controller.dispatch_until(&events, &mut self.behavior)? {
            self.deferred = events.split_off(index + 1);
            if !self.deferred.is_empty() {
                debug!(
                    target: "scene::dispatch",
                    "{} deferred {} event(s)",
                    self.behavior.name(),
                    self.deferred.len()
                );
            }
            return self.abort_with(signal);
        }
        if let Some(signal) = self.behavior.update_models(delta)? {
            return self.abort_with(signal);
        }
        self.behavior.update_views(delta);

        self.behavior.clear_surface(surface);
        self.behavior.draw(surface);
        self.behavior.present_surface(surface)?;

        self.clock.throttle();
        trace!(target: "scene", "{} stepped ({:?})", self.behavior.name(), delta);

        Ok(StepOutcome {
            delta: Some(delta),
            signal: None,
        })
    }

    fn abort_with(&mut self, signal: ControlSignal) -> Result<StepOutcome, SceneError> {
        trace!(target: "scene", "{} raised {:?}", self.behavior.name(), signal);
        Ok(StepOutcome {
            delta: None,
            signal: self.route(signal)?,
        })
    }
}

//--- SceneNode Implementation --------------------------------------------

impl<B: SceneBehavior> SceneNode for Scene<B> {
    fn name(&self) -> &str {
        self.behavior.name()
    }

    fn state(&self) -> SceneState {
        SceneState {
            frozen: self.frozen,
            alive: self.alive,
            started: self.started,
        }
    }

    fn step(
        &mut self,
        surface: &mut dyn Surface,
        input: &mut dyn InputSource,
    ) -> Result<StepOutcome, SceneError> {
        if !self.alive {
            return Err(SceneError::AlreadyInState("finished"));
        }
        if self.frozen {
            self.unfreeze()?;
        }

        if let Some(child) = self.child.as_mut() {
            let outcome = child.step(surface, input)?;
            let signal = match outcome.signal {
                Some(signal) => self.catch(signal)?,
                None => None,
            };
            return Ok(StepOutcome {
                delta: outcome.delta,
                signal,
            });
        }

        self.run_body(surface, input)
    }

    fn freeze(&mut self) -> Result<(), SceneError> {
        if !self.alive {
            return Err(SceneError::AlreadyInState("finished"));
        }
        if self.frozen {
            return Err(SceneError::AlreadyInState("frozen"));
        }
        self.behavior.on_freeze();
        self.frozen = true;
        debug!(target: "scene", "{} frozen", self.behavior.name());
        Ok(())
    }

    fn unfreeze(&mut self) -> Result<(), SceneError> {
        if !self.alive {
            return Err(SceneError::AlreadyInState("finished"));
        }
        if !self.frozen {
            return Err(SceneError::AlreadyInState("unfrozen"));
        }
        self.clock.reset();
        self.behavior.on_unfreeze();
        self.frozen = false;
        debug!(target: "scene", "{} unfrozen", self.behavior.name());
        Ok(())
    }

    fn finish(&mut self) -> Result<ReturnValue, SceneError> {
        if !self.alive {
            return Err(SceneError::AlreadyInState("finished"));
        }
        if let Some(mut child) = self.child.take() {
            if child.state().alive {
                child.finish()?;
            }
        }
        let value = self.behavior.on_finish()?;
        self.alive = false;
        debug!(target: "scene", "{} finished", self.behavior.name());
        Ok(value)
    }

    fn adopt(&mut self, frozen: Box<dyn SceneNode>) -> Result<(), SceneError> {
        if let Some(mut declined) = self.behavior.on_adopt(frozen) {
            warn!(
                target: "scene",
                "{} declined to hold {}, finishing it",
                self.behavior.name(),
                declined.name()
            );
            if declined.state().alive {
                declined.finish()?;
            }
        }
        Ok(())
    }

    fn draw(&self, surface: &mut dyn Surface) {
        match &self.child {
            Some(child) => child.draw(surface),
            None => self.behavior.draw(surface),
        }
    }

    fn child(&self) -> Option<&dyn SceneNode> {
        self.child.as_deref()
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
