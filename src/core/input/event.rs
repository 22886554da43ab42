//=========================================================================
// Input Event Types
//
// Portable representation of what the player did this frame.
//
// The platform layer converts window-system input into these types;
// scenes receive them through an `InputSource` and hand them to their
// `EventController` for dispatch.
//
// Event Flow:
// ```text
// Platform Layer (Winit)
//         ↓
//    InputEvent (this module)
//         ↓
//    InputSource::poll_events (per scene step)
//         ↓
//    EventController::dispatch → handlers
// ```
//
// Modifier state is carried as four booleans and can be collapsed into
// a `ModMask` bitmask (Shift=1, Meta=2, Alt=4, Ctrl=8) for shortcut
// lookups.
//
//=========================================================================

//=== Standard Library Imports ============================================

use std::hash::{Hash, Hasher};

//=== Internal Dependencies ===============================================

use crate::core::error::SceneError;

//=== MouseButton =========================================================

/// Physical mouse button identifier.
///
/// The `Other` variant covers side buttons, macro buttons, and any
/// non-standard inputs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum MouseButton {
    Left,
    Right,
    Middle,
    Other,
}

//=== KeyCode =============================================================

/// Physical keyboard key identifier.
///
/// Represents the physical key location, not the character produced.
/// `KeyA` is always the same physical key regardless of layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum KeyCode {
    //--- Numeric Keys -----------------------------------------------------

    Digit0, Digit1, Digit2, Digit3, Digit4,
    Digit5, Digit6, Digit7, Digit8, Digit9,

    //--- Alphabetic Keys --------------------------------------------------

    KeyA, KeyB, KeyC, KeyD, KeyE, KeyF, KeyG, KeyH, KeyI,
    KeyJ, KeyK, KeyL, KeyM, KeyN, KeyO, KeyP, KeyQ, KeyR,
    KeyS, KeyT, KeyU, KeyV, KeyW, KeyX, KeyY, KeyZ,

    //--- Arrow Keys -------------------------------------------------------

    ArrowDown,
    ArrowLeft,
    ArrowRight,
    ArrowUp,

    //--- Special Keys -----------------------------------------------------

    Space,
    Enter,
    Escape,
    Tab,
    Backspace,
    Delete,

    /// Fallback for keys the platform layer does not map.
    ///
    /// Never valid as a binding target.
    Unidentified,
}

//=== EventKind ===========================================================

/// Payload-free discriminant of an [`InputEvent`].
///
/// Keys the generic handler table: a handler registered for
/// `EventKind::KeyDown` sees every key press regardless of key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum EventKind {
    Quit,
    KeyDown,
    KeyUp,
    MouseButtonDown,
    MouseButtonUp,
    MouseMoved,
    Unidentified,
}

//=== InputEvent ==========================================================

/// Low-level input event from the platform layer.
///
/// # Equality & Hashing Semantics
///
/// Events are compared by type + payload (key/button + modifiers).
/// `MouseMoved` events are equal regardless of coordinates, which lets
/// the platform buffer coalesce them (last position wins).
///
/// ```text
/// KeyDown{A, CTRL} == KeyDown{A, CTRL}       ✓
/// KeyDown{A, CTRL} == KeyDown{A, SHIFT}      ✗ (different mods)
/// KeyDown{A}       == KeyUp{A}               ✗ (different type)
/// MouseMoved{...}  == MouseMoved{...}        ✓ (always equal)
/// ```
#[derive(Debug, Clone, Copy)]
pub enum InputEvent {
    /// The player or the OS asked the application to close.
    Quit,

    KeyDown {
        key: KeyCode,
        modifiers: Modifiers,
    },

    KeyUp {
        key: KeyCode,
        modifiers: Modifiers,
    },

    MouseButtonDown {
        button: MouseButton,
        modifiers: Modifiers,
    },

    MouseButtonUp {
        button: MouseButton,
        modifiers: Modifiers,
    },

    /// Cursor position in window pixels, top-left origin.
    MouseMoved { x: f32, y: f32 },

    /// Unrecognized or unsupported event. Ignored by dispatch except for
    /// generic handlers registered on [`EventKind::Unidentified`].
    Unidentified,
}

//--- Implementation ------------------------------------------------------

impl InputEvent {
    /// Plain key press with no modifiers held.
    pub fn key_down(key: KeyCode) -> Self {
        Self::KeyDown {
            key,
            modifiers: Modifiers::NONE,
        }
    }

    pub fn key_up(key: KeyCode) -> Self {
        Self::KeyUp {
            key,
            modifiers: Modifiers::NONE,
        }
    }

    pub fn kind(&self) -> EventKind {
        match self {
            Self::Quit => EventKind::Quit,
            Self::KeyDown { .. } => EventKind::KeyDown,
            Self::KeyUp { .. } => EventKind::KeyUp,
            Self::MouseButtonDown { .. } => EventKind::MouseButtonDown,
            Self::MouseButtonUp { .. } => EventKind::MouseButtonUp,
            Self::MouseMoved { .. } => EventKind::MouseMoved,
            Self::Unidentified => EventKind::Unidentified,
        }
    }

    /// Returns a new event with updated modifiers (consumes self).
    ///
    /// Has no effect on events that carry no modifier state.
    pub fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        match &mut self {
            Self::KeyDown { modifiers: m, .. }
            | Self::KeyUp { modifiers: m, .. }
            | Self::MouseButtonDown { modifiers: m, .. }
            | Self::MouseButtonUp { modifiers: m, .. } => {
                *m = modifiers;
            }
            _ => {}
        }
        self
    }

    /// Events that keep only their latest occurrence per frame.
    pub fn is_continuous(&self) -> bool {
        matches!(self, Self::MouseMoved { .. })
    }
}

//--- Trait Implementations -----------------------------------------------

impl PartialEq for InputEvent {
    fn eq(&self, other: &Self) -> bool {
        use InputEvent::*;
        match (self, other) {
            (KeyDown { key: a, modifiers: ma }, KeyDown { key: b, modifiers: mb })
            | (KeyUp { key: a, modifiers: ma }, KeyUp { key: b, modifiers: mb }) => {
                a == b && ma == mb
            }
            (
                MouseButtonDown { button: a, modifiers: ma },
                MouseButtonDown { button: b, modifiers: mb },
            )
            | (
                MouseButtonUp { button: a, modifiers: ma },
                MouseButtonUp { button: b, modifiers: mb },
            ) => a == b && ma == mb,
            (MouseMoved { .. }, MouseMoved { .. }) => true,
            (Quit, Quit) | (Unidentified, Unidentified) => true,
            _ => false,
        }
    }
}

impl Eq for InputEvent {}

/// Hashes discriminant + key/button + modifiers, never coordinates
/// (consistent with equality).
impl Hash for InputEvent {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);

        match self {
            Self::KeyDown { key, modifiers } | Self::KeyUp { key, modifiers } => {
                key.hash(state);
                modifiers.hash(state);
            }
            Self::MouseButtonDown { button, modifiers }
            | Self::MouseButtonUp { button, modifiers } => {
                button.hash(state);
                modifiers.hash(state);
            }
            _ => {}
        }
    }
}

//=== Modifiers ===========================================================

/// Modifier key state.
///
/// The system does not distinguish between left/right variants. `meta`
/// is the Super/Windows/Command key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Modifiers {
    pub shift: bool,
    pub meta: bool,
    pub alt: bool,
    pub ctrl: bool,
}

impl Modifiers {
    pub const NONE: Self = Self {
        shift: false,
        meta: false,
        alt: false,
        ctrl: false,
    };

    pub const SHIFT: Self = Self {
        shift: true,
        ..Self::NONE
    };

    pub const META: Self = Self {
        meta: true,
        ..Self::NONE
    };

    pub const ALT: Self = Self {
        alt: true,
        ..Self::NONE
    };

    pub const CTRL: Self = Self {
        ctrl: true,
        ..Self::NONE
    };

    /// Collapses the held modifiers into a shortcut mask.
    pub fn mask(&self) -> ModMask {
        let mut mask = ModMask::empty();
        mask.set(ModMask::SHIFT, self.shift);
        mask.set(ModMask::META, self.meta);
        mask.set(ModMask::ALT, self.alt);
        mask.set(ModMask::CTRL, self.ctrl);
        mask
    }
}

impl From<ModMask> for Modifiers {
    fn from(mask: ModMask) -> Self {
        Self {
            shift: mask.contains(ModMask::SHIFT),
            meta: mask.contains(ModMask::META),
            alt: mask.contains(ModMask::ALT),
            ctrl: mask.contains(ModMask::CTRL),
        }
    }
}

//=== ModMask =============================================================

bitflags::bitflags! {
    /// Modifier combination as a 4-bit mask (0..=15).
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
    pub struct ModMask: u8 {
        const SHIFT = 1;
        const META = 2;
        const ALT = 4;
        const CTRL = 8;
    }
}

impl ModMask {
    /// Mask from raw bits, rejecting bits outside the four modifiers.
    pub fn try_from_bits(bits: u8) -> Result<Self, SceneError> {
        Self::from_bits(bits).ok_or_else(|| {
            SceneError::config(format!(
                "modifier mask {bits} is outside 0..={}",
                Self::all().bits()
            ))
        })
    }
}

//=========================================================================
// Unit Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::collections::HashSet;

    //=====================================================================
    // ModMask
    //=====================================================================

    #[test]
    fn mask_bits_follow_fixed_order() {
        assert_eq!(Modifiers::NONE.mask().bits(), 0);
        assert_eq!(Modifiers::SHIFT.mask().bits(), 1);
        assert_eq!(Modifiers::META.mask().bits(), 2);
        assert_eq!(Modifiers::ALT.mask().bits(), 4);
        assert_eq!(Modifiers::CTRL.mask().bits(), 8);
    }

    #[test]
    fn mask_combines_held_modifiers() {
        let held = Modifiers {
            shift: true,
            ctrl: true,
            ..Modifiers::NONE
        };
        assert_eq!(held.mask(), ModMask::SHIFT | ModMask::CTRL);
        assert_eq!(held.mask().bits(), 9);
    }

    #[test]
    fn mask_rejects_out_of_range_bits() {
        assert!(ModMask::try_from_bits(15).is_ok());
        assert!(matches!(
            ModMask::try_from_bits(16),
            Err(SceneError::Configuration(_))
        ));
    }

    #[test]
    fn mask_contains_each_held_flag() {
        let mask = ModMask::ALT | ModMask::CTRL;
        assert!(mask.contains(ModMask::CTRL));
        assert!(!mask.contains(ModMask::SHIFT));
        assert_eq!(Modifiers::from(mask), Modifiers { alt: true, ctrl: true, ..Modifiers::NONE });
    }

    proptest! {
        #[test]
        fn mask_round_trips_through_modifiers(bits in 0u8..=15) {
            let mask = ModMask::try_from_bits(bits).unwrap();
            prop_assert_eq!(Modifiers::from(mask).mask(), mask);
        }

        #[test]
        fn mask_stays_in_range(shift: bool, meta: bool, alt: bool, ctrl: bool) {
            let mask = Modifiers { shift, meta, alt, ctrl }.mask();
            prop_assert!(mask.bits() <= ModMask::all().bits());
        }

        #[test]
        fn mask_or_is_associative_and_commutative(a in 0u8..=15, b in 0u8..=15, c in 0u8..=15) {
            let (a, b, c) = (
                ModMask::try_from_bits(a).unwrap(),
                ModMask::try_from_bits(b).unwrap(),
                ModMask::try_from_bits(c).unwrap(),
            );
            prop_assert_eq!((a | b) | c, a | (b | c));
            prop_assert_eq!(a | b, b | a);
        }

        #[test]
        fn merged_modifiers_mask_to_union(a in 0u8..=15, b in 0u8..=15) {
            let left = Modifiers::from(ModMask::try_from_bits(a).unwrap());
            let right = Modifiers::from(ModMask::try_from_bits(b).unwrap());
            let merged = Modifiers {
                shift: left.shift || right.shift,
                meta: left.meta || right.meta,
                alt: left.alt || right.alt,
                ctrl: left.ctrl || right.ctrl,
            };
            prop_assert_eq!(merged.mask(), left.mask() | right.mask());
        }
    }

    //=====================================================================
    // InputEvent
    //=====================================================================

    #[test]
    fn kind_matches_variant() {
        assert_eq!(InputEvent::Quit.kind(), EventKind::Quit);
        assert_eq!(InputEvent::key_down(KeyCode::KeyA).kind(), EventKind::KeyDown);
        assert_eq!(
            InputEvent::MouseMoved { x: 1.0, y: 2.0 }.kind(),
            EventKind::MouseMoved
        );
    }

    #[test]
    fn equality_includes_modifiers() {
        let plain = InputEvent::key_down(KeyCode::KeyQ);
        let ctrl = plain.with_modifiers(Modifiers::CTRL);
        assert_ne!(plain, ctrl);
        assert_eq!(ctrl, ctrl.with_modifiers(Modifiers::CTRL));
    }

    #[test]
    fn mouse_moves_coalesce_in_sets() {
        let mut set = HashSet::new();
        set.insert(InputEvent::MouseMoved { x: 1.0, y: 1.0 });
        set.replace(InputEvent::MouseMoved { x: 9.0, y: 9.0 });
        assert_eq!(set.len(), 1);
        assert!(InputEvent::MouseMoved { x: 0.0, y: 0.0 }.is_continuous());
    }

    #[test]
    fn with_modifiers_ignores_quit() {
        assert_eq!(InputEvent::Quit.with_modifiers(Modifiers::ALT), InputEvent::Quit);
    }
}
