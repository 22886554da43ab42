//=========================================================================
// Gravity Wells
//
// Newtonian point-mass formulas used by every celestial body.
//
// Masses are astronomical (1e27 to 1e35 kg) while distances are screen
// pixels, so raw pulls are enormous. Callers divide by
// `MOVEMENT_SCALE` to turn a pull into a pixel-space velocity change.
//
//=========================================================================

//=== Standard Library Imports ============================================

use std::f64::consts::PI;

//=== Constants ===========================================================

/// Universal gravitational constant.
pub const UGC: f64 = 6.67e-11;

/// Divisor mapping a pull onto a velocity change in pixels per second.
pub const MOVEMENT_SCALE: f64 = 1e20;

/// Distances are clamped to this before dividing by them.
const MIN_HEIGHT: f64 = 1.0;

//=== GravityWell =========================================================

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GravityWell {
    pub mass: f64,
}

impl GravityWell {
    pub fn new(mass: f64) -> Self {
        Self { mass }
    }

    /// Velocity needed to escape the well from `height`.
    pub fn escape_velocity(&self, height: f64) -> f64 {
        (2.0 * UGC * self.mass / clamp(height)).sqrt()
    }

    /// Gravitational acceleration at `height`.
    pub fn pull(&self, height: f64) -> f64 {
        let h = clamp(height);
        UGC * self.mass / (h * h)
    }

    /// Distance under which an object accelerating at most
    /// `max_acceleration` can no longer climb out.
    pub fn horizon(&self, max_acceleration: f64) -> f64 {
        (UGC * self.mass / max_acceleration).sqrt()
    }

    /// Perpendicular speed that keeps a circular orbit at `height`.
    pub fn satellite(&self, height: f64) -> f64 {
        (UGC * self.mass / clamp(height)).sqrt()
    }
}

fn clamp(height: f64) -> f64 {
    height.abs().max(MIN_HEIGHT)
}

//=== Vector Helpers ======================================================

/// Adds two polar vectors, returning `(angle, magnitude)`.
pub fn vector_add(rads1: f64, speed1: f64, rads2: f64, speed2: f64) -> (f64, f64) {
    let x = speed1 * rads1.cos() + speed2 * rads2.cos();
    let y = speed1 * rads1.sin() + speed2 * rads2.sin();
    (y.atan2(x), x.hypot(y))
}

/// Normalizes an angle into `0..2π`.
pub fn wrap_angle(rads: f64) -> f64 {
    rads.rem_euclid(2.0 * PI)
}

//=========================================================================
// Unit Tests
//=========================================================================
