//=========================================================================
// Event Controller
//
// Declarative input-to-handler dispatch for one scene.
//
// Handlers are registered against a trigger (quit, a key, a modifier
// shortcut, a mouse button, or any event of a given kind) together with
// a set of bound arguments. Each frame the scene hands its polled events
// to `dispatch`, which invokes matching handlers with the scene's
// behavior as typed context.
//
// Dispatch Order (per event):
// ```text
// Quit            → on_quit
// KeyDown         → on_shortcut[mask][key] → on_key_down[key]
// KeyUp           → on_key_up[key]
// MouseButtonDown → on_mouse_click[button]
// (any event)     → on_generic[kind]
// ```
// Within one entry, handlers run in registration order. A handler that
// returns a control signal stops dispatch for the rest of the frame and
// the signal is returned to the scene. Errors propagate the same way.
//
//=========================================================================

//=== Standard Library Imports ============================================

use std::collections::HashMap;
use std::fmt;
use std::hash::Hash;
use std::rc::Rc;

//=== External Dependencies ===============================================

use log::trace;

//=== Internal Dependencies ===============================================

use crate::core::error::SceneError;
use crate::core::input::args::Args;
use crate::core::input::event::{EventKind, InputEvent, KeyCode, ModMask, MouseButton};
use crate::core::scene::{ControlSignal, Handled};

//=== Call ================================================================

/// What a handler receives besides its context.
#[derive(Debug)]
pub struct Call<'a> {
    /// The event being dispatched.
    pub event: &'a InputEvent,

    /// Bound arguments overlaid with any explicit ones.
    pub args: Args,
}

type HandlerFn<C> = dyn Fn(&mut C, &Call<'_>) -> Handled;

//=== BoundHandler ========================================================

/// A handler function paired with the arguments it was registered with.
pub struct BoundHandler<C> {
    func: Rc<HandlerFn<C>>,
    bound: Args,
}

impl<C> BoundHandler<C> {
    pub fn new<F>(bound: Args, func: F) -> Self
    where
        F: Fn(&mut C, &Call<'_>) -> Handled + 'static,
    {
        Self {
            func: Rc::new(func),
            bound,
        }
    }

    /// Runs the handler with bound arguments overlaid by `explicit`.
    pub fn invoke(&self, context: &mut C, event: &InputEvent, explicit: &Args) -> Handled {
        let call = Call {
            event,
            args: self.bound.merged(explicit),
        };
        (self.func)(context, &call)
    }

    pub fn bound_args(&self) -> &Args {
        &self.bound
    }
}

impl<C> Clone for BoundHandler<C> {
    fn clone(&self) -> Self {
        Self {
            func: Rc::clone(&self.func),
            bound: self.bound.clone(),
        }
    }
}

impl<C> fmt::Debug for BoundHandler<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BoundHandler")
            .field("bound", &self.bound)
            .finish_non_exhaustive()
    }
}

//=== Trigger =============================================================

/// The condition a handler is registered against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Trigger {
    Quit,
    Shortcut(ModMask, KeyCode),
    KeyDown(KeyCode),
    KeyUp(KeyCode),
    MouseClick(MouseButton),
    Generic(EventKind),
}

/// Where a registration landed: its trigger and its position in the
/// handler list for that trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Registration {
    pub trigger: Trigger,
    pub position: usize,
}

//=== EventController =====================================================

/// Per-scene handler tables, keyed by trigger.
///
/// `C` is the context handlers mutate, normally the scene's behavior.
pub struct EventController<C> {
    on_quit: Vec<BoundHandler<C>>,
    on_shortcut: HashMap<ModMask, HashMap<KeyCode, Vec<BoundHandler<C>>>>,
    on_key_down: HashMap<KeyCode, Vec<BoundHandler<C>>>,
    on_key_up: HashMap<KeyCode, Vec<BoundHandler<C>>>,
    on_mouse_click: HashMap<MouseButton, Vec<BoundHandler<C>>>,
    on_generic: HashMap<EventKind, Vec<BoundHandler<C>>>,
}

impl<C> EventController<C> {
    //--- Construction -----------------------------------------------------

    pub fn new() -> Self {
        Self {
            on_quit: Vec::new(),
            on_shortcut: HashMap::new(),
            on_key_down: HashMap::new(),
            on_key_up: HashMap::new(),
            on_mouse_click: HashMap::new(),
            on_generic: HashMap::new(),
        }
    }

    //--- Registration -----------------------------------------------------

    /// Appends `handler` to the table for `trigger`.
    ///
    /// # Errors
    ///
    /// [`SceneError::Configuration`] when the trigger names
    /// `KeyCode::Unidentified`.
    pub fn register<F>(
        &mut self,
        trigger: Trigger,
        bound: Args,
        handler: F,
    ) -> Result<Registration, SceneError>
    where
        F: Fn(&mut C, &Call<'_>) -> Handled + 'static,
    {
        self.insert(trigger, BoundHandler::new(bound, handler))
    }

    /// Registers one handler function under several triggers, each with
    /// its own bound arguments.
    pub fn bind_all<F, I>(&mut self, handler: F, bindings: I) -> Result<Vec<Registration>, SceneError>
    where
        F: Fn(&mut C, &Call<'_>) -> Handled + 'static,
        I: IntoIterator<Item = (Trigger, Args)>,
    {
        let func: Rc<HandlerFn<C>> = Rc::new(handler);
        bindings
            .into_iter()
            .map(|(trigger, bound)| {
                let handler = BoundHandler {
                    func: Rc::clone(&func),
                    bound,
                };
                self.insert(trigger, handler)
            })
            .collect()
    }

    pub fn on_quit<F>(&mut self, handler: F) -> Result<Registration, SceneError>
    where
        F: Fn(&mut C, &Call<'_>) -> Handled + 'static,
    {
        self.register(Trigger::Quit, Args::new(), handler)
    }

    pub fn on_shortcut<F>(
        &mut self,
        mask: ModMask,
        key: KeyCode,
        bound: Args,
        handler: F,
    ) -> Result<Registration, SceneError>
    where
        F: Fn(&mut C, &Call<'_>) -> Handled + 'static,
    {
        self.register(Trigger::Shortcut(mask, key), bound, handler)
    }

    pub fn on_key_down<F>(&mut self, key: KeyCode, bound: Args, handler: F) -> Result<Registration, SceneError>
    where
        F: Fn(&mut C, &Call<'_>) -> Handled + 'static,
    {
        self.register(Trigger::KeyDown(key), bound, handler)
    }

    pub fn on_key_up<F>(&mut self, key: KeyCode, bound: Args, handler: F) -> Result<Registration, SceneError>
    where
        F: Fn(&mut C, &Call<'_>) -> Handled + 'static,
    {
        self.register(Trigger::KeyUp(key), bound, handler)
    }

    pub fn on_mouse_click<F>(
        &mut self,
        button: MouseButton,
        bound: Args,
        handler: F,
    ) -> Result<Registration, SceneError>
    where
        F: Fn(&mut C, &Call<'_>) -> Handled + 'static,
    {
        self.register(Trigger::MouseClick(button), bound, handler)
    }

    pub fn on_generic<F>(&mut self, kind: EventKind, bound: Args, handler: F) -> Result<Registration, SceneError>
    where
        F: Fn(&mut C, &Call<'_>) -> Handled + 'static,
    {
        self.register(Trigger::Generic(kind), bound, handler)
    }

    //--- Queries ----------------------------------------------------------

    /// Handlers registered for `trigger`, in registration order.
    pub fn handlers(&self, trigger: Trigger) -> &[BoundHandler<C>] {
        let list = match trigger {
            Trigger::Quit => Some(&self.on_quit),
            Trigger::Shortcut(mask, key) => {
                self.on_shortcut.get(&mask).and_then(|keys| keys.get(&key))
            }
            Trigger::KeyDown(key) => self.on_key_down.get(&key),
            Trigger::KeyUp(key) => self.on_key_up.get(&key),
            Trigger::MouseClick(button) => self.on_mouse_click.get(&button),
            Trigger::Generic(kind) => self.on_generic.get(&kind),
        };
        list.map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn is_empty(&self) -> bool {
        self.on_quit.is_empty()
            && self.on_shortcut.values().all(HashMap::is_empty)
            && self.on_key_down.is_empty()
            && self.on_key_up.is_empty()
            && self.on_mouse_click.is_empty()
            && self.on_generic.is_empty()
    }

    //--- Dispatch ---------------------------------------------------------

    /// Routes `events` to matching handlers in order.
    ///
    /// Returns the first control signal any handler produces; the
    /// remaining handlers and events of this batch are skipped.
    pub fn dispatch(&self, events: &[InputEvent], context: &mut C) -> Handled {
        Ok(self.dispatch_until(events, context)?.map(|(_, signal)| signal))
    }

    /// Like [`dispatch`](Self::dispatch), but also reports the index of
    /// the event whose handler raised the signal. Events after that
    /// index were not dispatched.
    pub fn dispatch_until(
        &self,
        events: &[InputEvent],
        context: &mut C,
    ) -> Result<Option<(usize, ControlSignal)>, SceneError> {
        for (index, event) in events.iter().enumerate() {
            trace!(target: "scene::dispatch", "dispatching {:?}", event);

            let specific: [Option<&Vec<BoundHandler<C>>>; 2] = match event {
                InputEvent::Quit => [Some(&self.on_quit), None],
                InputEvent::KeyDown { key, modifiers } => [
                    self.on_shortcut
                        .get(&modifiers.mask())
                        .and_then(|keys| keys.get(key)),
                    self.on_key_down.get(key),
                ],
                InputEvent::KeyUp { key, .. } => [self.on_key_up.get(key), None],
                InputEvent::MouseButtonDown { button, .. } => {
                    [self.on_mouse_click.get(button), None]
                }
                _ => [None, None],
            };

            let generic = self.on_generic.get(&event.kind());

            for handlers in specific.into_iter().chain([generic]).flatten() {
                if let Some(signal) = Self::run(handlers, context, event)? {
                    trace!(target: "scene::dispatch", "{:?} raised {:?}", event, signal);
                    return Ok(Some((index, signal)));
                }
            }
        }
        Ok(None)
    }

    //--- Internal Helpers -------------------------------------------------

    fn insert(&mut self, trigger: Trigger, handler: BoundHandler<C>) -> Result<Registration, SceneError> {
        let list = match trigger {
            Trigger::Quit => &mut self.on_quit,
            Trigger::Shortcut(mask, key) => {
                Self::check_key(key)?;
                self.on_shortcut
                    .entry(mask)
                    .or_default()
                    .entry(key)
                    .or_default()
            }
            Trigger::KeyDown(key) => {
                Self::check_key(key)?;
                self.on_key_down.entry(key).or_default()
            }
            Trigger::KeyUp(key) => {
                Self::check_key(key)?;
                self.on_key_up.entry(key).or_default()
            }
            Trigger::MouseClick(button) => self.on_mouse_click.entry(button).or_default(),
            Trigger::Generic(kind) => self.on_generic.entry(kind).or_default(),
        };

        list.push(handler);
        Ok(Registration {
            trigger,
            position: list.len() - 1,
        })
    }

    fn check_key(key: KeyCode) -> Result<(), SceneError> {
        if key == KeyCode::Unidentified {
            return Err(SceneError::config("cannot bind a handler to an unidentified key"));
        }
        Ok(())
    }

    fn run(handlers: &[BoundHandler<C>], context: &mut C, event: &InputEvent) -> Handled {
        let explicit = Args::new();
        for handler in handlers {
            if let Some(signal) = handler.invoke(context, event, &explicit)? {
                return Ok(Some(signal));
            }
        }
        Ok(None)
    }
}

impl<C> Default for EventController<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C> fmt::Debug for EventController<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn count<K, V>(map: &HashMap<K, Vec<V>>) -> usize {
            map.values().map(Vec::len).sum()
        }
        f.debug_struct("EventController")
            .field("on_quit", &self.on_quit.len())
            .field(
                "on_shortcut",
                &self.on_shortcut.values().map(count).sum::<usize>(),
            )
            .field("on_key_down", &count(&self.on_key_down))
            .field("on_key_up", &count(&self.on_key_up))
            .field("on_mouse_click", &count(&self.on_mouse_click))
            .field("on_generic", &count(&self.on_generic))
            .finish()
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
