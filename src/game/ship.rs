//=========================================================================
// Ship
//
// A player-controlled ship: heading, velocity, thrust and an engine-burn
// animation, integrated once per frame and wrapped around the screen.
//
// Coordinates:
// ```text
//   screen x → right, screen y → down
//   heading 0 points right, heading π/2 points up
//   forward = (cos h, -sin h)
// ```
// `Rotation::Left` turns counter-clockwise on screen (heading grows),
// `Rotation::Right` clockwise.
//
//=========================================================================

//=== Standard Library Imports ============================================

use std::f64::consts::PI;
use std::time::Duration;

//=== External Dependencies ===============================================

use log::trace;

//=== Internal Dependencies ===============================================

use crate::core::error::SceneError;
use crate::core::render::{Color, Model, Surface, View};
use crate::game::gravity::wrap_angle;

//=== Constants ===========================================================

/// Thrust acceleration in pixels per second squared.
pub const DEFAULT_MOVE_SPEED: f64 = 80.0;

/// Turn rate in radians per second.
pub const DEFAULT_TURN_SPEED: f64 = PI;

/// Velocity magnitude cap in pixels per second.
pub const MAX_SPEED: f64 = 300.0;

const HULL: f64 = 10.0;
const BURN_FRAMES: usize = 4;
const BURN_FRAME_TIME: Duration = Duration::from_millis(80);
const FLAME_OUTER: Color = Color::rgb(255, 140, 0);
const FLAME_INNER: Color = Color::rgb(255, 230, 120);

/// Start position, heading and hull color of players 1 to 4.
const SPAWNS: [((f64, f64), f64, Color); 4] = [
    ((50.0, 50.0), 0.0, Color::rgb(160, 60, 220)),
    ((600.0, 50.0), -PI / 4.0, Color::rgb(220, 40, 40)),
    ((50.0, 400.0), PI / 2.0, Color::rgb(40, 200, 70)),
    ((600.0, 400.0), -PI / 2.0, Color::rgb(60, 110, 240)),
];

//=== Control Directions ==================================================

/// Turning direction, bound to input as integer code 1 (right) or 2
/// (left).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rotation {
    Right = 1,
    Left = 2,
}

impl Rotation {
    fn sign(self) -> f64 {
        match self {
            Rotation::Right => -1.0,
            Rotation::Left => 1.0,
        }
    }
}

impl TryFrom<i64> for Rotation {
    type Error = SceneError;

    fn try_from(code: i64) -> Result<Self, Self::Error> {
        match code {
            1 => Ok(Rotation::Right),
            2 => Ok(Rotation::Left),
            other => Err(SceneError::InvalidTransition(format!(
                "rotation code {} (expected 1 or 2)",
                other
            ))),
        }
    }
}

/// Engine direction, bound to input as integer code 1 (forwards) or 2
/// (backwards).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Thrust {
    Forwards = 1,
    Backwards = 2,
}

impl TryFrom<i64> for Thrust {
    type Error = SceneError;

    fn try_from(code: i64) -> Result<Self, Self::Error> {
        match code {
            1 => Ok(Thrust::Forwards),
            2 => Ok(Thrust::Backwards),
            other => Err(SceneError::InvalidTransition(format!(
                "thrust code {} (expected 1 or 2)",
                other
            ))),
        }
    }
}

//=== Burn ================================================================

/// Engine flame animation, cycling while an engine is lit.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct Burn {
    frame: usize,
    elapsed: Duration,
}

impl Burn {
    fn advance(&mut self, delta: Duration) {
        self.elapsed += delta;
        while self.elapsed >= BURN_FRAME_TIME {
            self.elapsed -= BURN_FRAME_TIME;
            self.frame = (self.frame + 1) % BURN_FRAMES;
        }
    }

    fn reset(&mut self) {
        *self = Self::default();
    }
}

//=== Ship ================================================================

#[derive(Debug, Clone)]
pub struct Ship {
    player: u8,
    color: Color,
    position: (f64, f64),
    velocity: (f64, f64),
    heading: f64,
    move_speed: f64,
    turn_speed: f64,
    rotation: Option<Rotation>,
    thrust: Option<Thrust>,
    burn: Burn,
    bounds: (f64, f64),
}

impl Ship {
    //--- Construction -----------------------------------------------------

    pub fn new(player: u8, position: (f64, f64), color: Color, bounds: (u32, u32)) -> Self {
        Self {
            player,
            color,
            position,
            velocity: (0.0, 0.0),
            heading: 0.0,
            move_speed: DEFAULT_MOVE_SPEED,
            turn_speed: DEFAULT_TURN_SPEED,
            rotation: None,
            thrust: None,
            burn: Burn::default(),
            bounds: (bounds.0.max(1) as f64, bounds.1.max(1) as f64),
        }
    }

    /// Ship of `player` (1 to 4) at its start position.
    pub fn for_player(player: u8, bounds: (u32, u32)) -> Result<Self, SceneError> {
        let index = usize::from(player)
            .checked_sub(1)
            .filter(|i| *i < SPAWNS.len())
            .ok_or_else(|| SceneError::config(format!("no spawn point for player {}", player)))?;

        let ((x, y), heading, color) = SPAWNS[index];
        let mut ship = Self::new(player, (x, y), color, bounds);
        ship.set_heading(heading);
        Ok(ship)
    }

    pub fn set_heading(&mut self, rads: f64) {
        self.heading = wrap_angle(rads);
    }

    pub fn set_move_speed(&mut self, speed: f64) {
        self.move_speed = speed;
    }

    pub fn set_turn_speed(&mut self, rads_per_second: f64) {
        self.turn_speed = rads_per_second;
    }

    //--- Accessors --------------------------------------------------------

    pub fn player(&self) -> u8 {
        self.player
    }

    pub fn position(&self) -> (f64, f64) {
        self.position
    }

    pub fn velocity(&self) -> (f64, f64) {
        self.velocity
    }

    pub fn speed(&self) -> f64 {
        self.velocity.0.hypot(self.velocity.1)
    }

    pub fn heading(&self) -> f64 {
        self.heading
    }

    pub fn rotation(&self) -> Option<Rotation> {
        self.rotation
    }

    pub fn thrust(&self) -> Option<Thrust> {
        self.thrust
    }

    pub fn engine_lit(&self) -> bool {
        self.thrust.is_some()
    }

    //--- Controls ---------------------------------------------------------

    /// Starts turning towards `rotation`, or stops if `stop` is set.
    ///
    /// Stopping a direction the ship is not turning in does nothing, so
    /// releasing one key while the other is held keeps the turn going.
    pub fn rotate(&mut self, rotation: Rotation, stop: bool) {
        if stop {
            if self.rotation == Some(rotation) {
                self.rotation = None;
            }
        } else {
            self.rotation = Some(rotation);
        }
        trace!(target: "game::ship", "player {} rotation {:?}", self.player, self.rotation);
    }

    /// Lights the engine in `thrust` direction, or cuts it if `stop` is
    /// set.
    pub fn set_thrust(&mut self, thrust: Thrust, stop: bool) {
        if stop {
            if self.thrust == Some(thrust) {
                self.thrust = None;
                self.burn.reset();
            }
        } else {
            self.thrust = Some(thrust);
        }
        trace!(target: "game::ship", "player {} thrust {:?}", self.player, self.thrust);
    }

    /// Adds `speed` pixels per second along screen angle `rads`.
    pub fn accelerate(&mut self, rads: f64, speed: f64) {
        self.velocity.0 += speed * rads.cos();
        self.velocity.1 += speed * rads.sin();

        let magnitude = self.speed();
        if magnitude > MAX_SPEED {
            let scale = MAX_SPEED / magnitude;
            self.velocity.0 *= scale;
            self.velocity.1 *= scale;
        }
    }

    //--- Simulation -------------------------------------------------------

    /// Integrates turn, thrust and velocity over `delta`.
    pub fn advance(&mut self, delta: Duration) {
        let dt = delta.as_secs_f64();

        if let Some(rotation) = self.rotation {
            self.set_heading(self.heading + rotation.sign() * self.turn_speed * dt);
        }

        if let Some(thrust) = self.thrust {
            let along = match thrust {
                Thrust::Forwards => -self.heading,
                Thrust::Backwards => PI - self.heading,
            };
            self.accelerate(along, self.move_speed * dt);
            self.burn.advance(delta);
        }

        let (w, h) = self.bounds;
        self.position.0 = (self.position.0 + self.velocity.0 * dt).rem_euclid(w);
        self.position.1 = (self.position.1 + self.velocity.1 * dt).rem_euclid(h);
    }

    //--- Drawing Helpers --------------------------------------------------

    fn forward(&self) -> (f64, f64) {
        (self.heading.cos(), -self.heading.sin())
    }

    fn point(&self, along: f64, across: f64) -> (i32, i32) {
        let (fx, fy) = self.forward();
        // Perpendicular pointing to the ship's right.
        let (rx, ry) = (-fy, fx);
        (
            (self.position.0 + fx * along + rx * across).round() as i32,
            (self.position.1 + fy * along + ry * across).round() as i32,
        )
    }

    fn draw_flame(&self, surface: &mut dyn Surface, base: f64, outward: f64) {
        let length = HULL * (0.6 + 0.2 * self.burn.frame as f64);
        let root = self.point(base, 0.0);
        surface.draw_line(root, self.point(base + outward * length, 0.0), FLAME_OUTER);
        surface.draw_line(
            self.point(base, -2.0),
            self.point(base + outward * length * 0.6, 0.0),
            FLAME_INNER,
        );
        surface.draw_line(
            self.point(base, 2.0),
            self.point(base + outward * length * 0.6, 0.0),
            FLAME_INNER,
        );
    }
}

//--- View Implementation -------------------------------------------------

impl Model for Ship {
    fn update(&mut self, delta: Duration) {
        self.advance(delta);
    }
}

impl View for Ship {
    fn draw(&self, surface: &mut dyn Surface) {
        let nose = self.point(HULL, 0.0);
        let left = self.point(-HULL * 0.6, -HULL * 0.6);
        let right = self.point(-HULL * 0.6, HULL * 0.6);
        let tail = self.point(-HULL * 0.3, 0.0);

        surface.draw_line(nose, left, self.color);
        surface.draw_line(left, tail, self.color);
        surface.draw_line(tail, right, self.color);
        surface.draw_line(right, nose, self.color);

        match self.thrust {
            Some(Thrust::Forwards) => self.draw_flame(surface, -HULL * 0.4, -1.0),
            Some(Thrust::Backwards) => self.draw_flame(surface, HULL, 1.0),
            None => {}
        }
    }
}

//=========================================================================
// Unit Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::render::FrameBuffer;

    const SCREEN: (u32, u32) = (640, 480);

    fn ship() -> Ship {
        Ship::new(1, (100.0, 100.0), Color::WHITE, SCREEN)
    }

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-6
    }

    //--- Direction Codes --------------------------------------------------

    #[test]
    fn direction_codes_convert() {
        assert_eq!(Rotation::try_from(1).unwrap(), Rotation::Right);
        assert_eq!(Rotation::try_from(2).unwrap(), Rotation::Left);
        assert_eq!(Thrust::try_from(1).unwrap(), Thrust::Forwards);
        assert_eq!(Thrust::try_from(2).unwrap(), Thrust::Backwards);
    }

    #[test]
    fn unknown_direction_codes_are_invalid_transitions() {
        assert!(matches!(
            Rotation::try_from(3),
            Err(SceneError::InvalidTransition(_))
        ));
        assert!(matches!(
            Thrust::try_from(0),
            Err(SceneError::InvalidTransition(_))
        ));
    }

    //--- Spawning ---------------------------------------------------------

    #[test]
    fn players_spawn_at_their_corners() {
        let p2 = Ship::for_player(2, SCREEN).unwrap();
        assert_eq!(p2.position(), (600.0, 50.0));
        assert!(close(p2.heading(), 1.75 * PI));

        let p3 = Ship::for_player(3, SCREEN).unwrap();
        assert!(close(p3.heading(), PI / 2.0));
    }

    #[test]
    fn unknown_players_have_no_spawn() {
        assert!(matches!(Ship::for_player(0, SCREEN), Err(SceneError::Configuration(_))));
        assert!(matches!(Ship::for_player(5, SCREEN), Err(SceneError::Configuration(_))));
    }

    //--- Controls ---------------------------------------------------------

    #[test]
    fn left_turns_counter_clockwise() {
        let mut ship = ship();
        ship.rotate(Rotation::Left, false);
        ship.advance(Duration::from_millis(500));
        assert!(close(ship.heading(), PI / 2.0));

        ship.rotate(Rotation::Right, false);
        ship.advance(Duration::from_millis(250));
        assert!(close(ship.heading(), PI / 4.0));
    }

    #[test]
    fn releasing_the_other_key_keeps_turning() {
        let mut ship = ship();
        ship.rotate(Rotation::Left, false);
        ship.rotate(Rotation::Right, true);
        assert_eq!(ship.rotation(), Some(Rotation::Left));

        ship.rotate(Rotation::Left, true);
        assert_eq!(ship.rotation(), None);
    }

    #[test]
    fn forward_thrust_follows_heading() {
        let mut ship = ship();
        ship.set_heading(PI / 2.0);
        ship.set_thrust(Thrust::Forwards, false);
        ship.advance(Duration::from_secs(1));

        let (vx, vy) = ship.velocity();
        assert!(close(vx, 0.0));
        assert!(close(vy, -DEFAULT_MOVE_SPEED));
        assert!(ship.position().1 < 100.0);
    }

    #[test]
    fn backward_thrust_opposes_heading() {
        let mut ship = ship();
        ship.set_thrust(Thrust::Backwards, false);
        ship.advance(Duration::from_millis(500));
        assert!(ship.velocity().0 < 0.0);
    }

    #[test]
    fn stopping_thrust_resets_burn() {
        let mut ship = ship();
        ship.set_thrust(Thrust::Forwards, false);
        ship.advance(Duration::from_millis(200));
        assert!(ship.engine_lit());
        assert_ne!(ship.burn, Burn::default());

        ship.set_thrust(Thrust::Forwards, true);
        assert!(!ship.engine_lit());
        assert_eq!(ship.burn, Burn::default());
    }

    //--- Integration ------------------------------------------------------

    #[test]
    fn speed_is_capped() {
        let mut ship = ship();
        ship.accelerate(0.0, MAX_SPEED * 3.0);
        assert!(close(ship.speed(), MAX_SPEED));
    }

    #[test]
    fn position_wraps_around_screen() {
        let mut ship = Ship::new(1, (630.0, 5.0), Color::WHITE, SCREEN);
        ship.accelerate(-PI / 4.0, 100.0);
        ship.advance(Duration::from_millis(200));

        let (x, y) = ship.position();
        assert!(x < 10.0, "x = {}", x);
        assert!(y > 470.0, "y = {}", y);
    }

    #[test]
    fn burn_animation_cycles() {
        let mut burn = Burn::default();
        burn.advance(BURN_FRAME_TIME * (BURN_FRAMES as u32 + 1));
        assert_eq!(burn.frame, 1);
    }

    #[test]
    fn draws_hull_in_its_color() {
        let mut surface = FrameBuffer::new(200, 200);
        let ship = Ship::new(1, (100.0, 100.0), Color::rgb(0, 255, 0), (200, 200));
        ship.draw(&mut surface);
        // Nose points right.
        assert_eq!(surface.pixel(110, 100), Some(Color::rgb(0, 255, 0)));
    }
}
