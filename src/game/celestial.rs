//=========================================================================
// Celestial Bodies
//
// Suns and planets: gravity wells that tick at the game's frame rate,
// move along their orbit and pull on the ships registered with them.
//
// Tick Cycle:
// ```text
// advance(delta)
//  └─ counter += delta
//     └─ counter > 1/fps?  → counter = 0
//                            → planet: angle += π / 2^speed
//                            → true (caller applies pull to ships)
// ```
//
//=========================================================================

//=== Standard Library Imports ============================================

use std::collections::BTreeSet;
use std::f64::consts::PI;
use std::time::Duration;

//=== External Dependencies ===============================================

use image::imageops::{self, FilterType};
use image::RgbaImage;
use rand::Rng;

//=== Internal Dependencies ===============================================

use crate::core::render::{Color, Model, Shared, Surface, View};
use crate::game::gravity::{wrap_angle, GravityWell, MOVEMENT_SCALE};
use crate::game::ship::Ship;

//=== Constants ===========================================================

pub const SUN_RADIUS: u32 = 50;
pub const PLANET_RADIUS: u32 = 20;

/// Half a solar mass.
const STAR_MASS: f64 = 1e33;
const STAR_MASS_RANGE: std::ops::Range<u32> = 1..51;

const PLANET_MASS: f64 = 1e27;
const PLANET_MASS_RANGE: std::ops::Range<u32> = 1..16;

/// Orbit speed exponents: each tick advances `π / 2^speed` radians.
const ORBIT_SPEED_RANGE: std::ops::Range<u32> = 10..15;

const SUN_COLOR: Color = Color::rgb(255, 200, 40);
const PLANET_COLORS: [Color; 4] = [
    Color::rgb(90, 140, 220),
    Color::rgb(200, 110, 70),
    Color::rgb(120, 190, 120),
    Color::rgb(180, 160, 210),
];

//=== Orbit ===============================================================

/// Circular path around a fixed center.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Orbit {
    pub center: (f64, f64),
    pub distance: f64,
    pub speed: u32,
    pub angle: f64,
}

impl Orbit {
    fn position(&self) -> (f64, f64) {
        (
            self.center.0 + self.distance * self.angle.cos(),
            self.center.1 + self.distance * self.angle.sin(),
        )
    }

    fn tick(&mut self) {
        self.angle = wrap_angle(self.angle + PI / 2f64.powi(self.speed as i32));
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Body {
    Sun,
    Planet(Orbit),
}

//=== Celestial ===========================================================

#[derive(Debug, Clone)]
pub struct Celestial {
    body: Body,
    position: (f64, f64),
    radius: u32,
    well: GravityWell,
    image: Option<RgbaImage>,
    color: Color,
    counter: Duration,
    delay: Duration,
    pulled: BTreeSet<u8>,
}

impl Celestial {
    //--- Construction -----------------------------------------------------

    /// A sun of random mass at `position`, ticking `fps` times a second.
    pub fn sun<R: Rng + ?Sized>(position: (f64, f64), radius: u32, fps: f64, rng: &mut R) -> Self {
        let mass = STAR_MASS * f64::from(rng.gen_range(STAR_MASS_RANGE));
        Self::new(Body::Sun, position, radius, mass, SUN_COLOR, fps)
    }

    /// A planet of random mass circling `center` at `distance`, starting
    /// at a random angle with a random orbit speed.
    pub fn planet<R: Rng + ?Sized>(
        center: (f64, f64),
        distance: f64,
        radius: u32,
        fps: f64,
        rng: &mut R,
    ) -> Self {
        let mass = PLANET_MASS * f64::from(rng.gen_range(PLANET_MASS_RANGE));
        let orbit = Orbit {
            center,
            distance,
            speed: rng.gen_range(ORBIT_SPEED_RANGE),
            angle: f64::from(rng.gen_range(0..360u32)).to_radians(),
        };
        let color = PLANET_COLORS[rng.gen_range(0..PLANET_COLORS.len())];
        Self::new(Body::Planet(orbit), orbit.position(), radius, mass, color, fps)
    }

    fn new(body: Body, position: (f64, f64), radius: u32, mass: f64, color: Color, fps: f64) -> Self {
        Self {
            body,
            position,
            radius,
            well: GravityWell::new(mass),
            image: None,
            color,
            counter: Duration::ZERO,
            delay: Duration::try_from_secs_f64(1.0 / fps).unwrap_or(Duration::MAX),
            pulled: BTreeSet::new(),
        }
    }

    pub fn with_mass(mut self, mass: f64) -> Self {
        self.well = GravityWell::new(mass);
        self
    }

    /// Uses `image`, scaled to the body's diameter, instead of a plain
    /// disc.
    pub fn with_image(mut self, image: &RgbaImage) -> Self {
        let side = self.radius.max(1) * 2;
        self.image = Some(imageops::resize(image, side, side, FilterType::Triangle));
        self
    }

    //--- Accessors --------------------------------------------------------

    pub fn body(&self) -> &Body {
        &self.body
    }

    pub fn position(&self) -> (f64, f64) {
        self.position
    }

    pub fn radius(&self) -> u32 {
        self.radius
    }

    pub fn well(&self) -> &GravityWell {
        &self.well
    }

    //--- Gravity ----------------------------------------------------------

    /// Registers `player`'s ship as affected by this body.
    pub fn pull_on(&mut self, player: u8) {
        self.pulled.insert(player);
    }

    pub fn pull_off(&mut self, player: u8) {
        self.pulled.remove(&player);
    }

    pub fn pulls(&self, player: u8) -> bool {
        self.pulled.contains(&player)
    }

    /// Applies one tick of this body's pull to `ship`.
    ///
    /// The velocity change is the well's pull at the ship's distance
    /// divided by [`MOVEMENT_SCALE`], directed at the body's center.
    pub fn apply_pull(&self, ship: &mut Ship) {
        let (sx, sy) = ship.position();
        let (dx, dy) = (self.position.0 - sx, self.position.1 - sy);
        let distance = dx.hypot(dy);
        let kick = self.well.pull(distance) / MOVEMENT_SCALE;
        ship.accelerate(dy.atan2(dx), kick);
    }

    //--- Simulation -------------------------------------------------------

    /// Accumulates `delta` and runs a tick once a frame's worth of time
    /// has passed. Returns whether a tick ran.
    pub fn advance(&mut self, delta: Duration) -> bool {
        self.counter += delta;
        if self.counter <= self.delay {
            return false;
        }
        self.counter = Duration::ZERO;

        if let Body::Planet(orbit) = &mut self.body {
            orbit.tick();
            self.position = orbit.position();
        }
        true
    }
}

//--- View Implementation -------------------------------------------------

impl View for Celestial {
    fn draw(&self, surface: &mut dyn Surface) {
        let (cx, cy) = (self.position.0.round() as i32, self.position.1.round() as i32);
        match &self.image {
            Some(image) => {
                let r = self.radius as i32;
                surface.blit(image, cx - r, cy - r);
            }
            None => surface.fill_circle(cx, cy, self.radius, self.color),
        }
    }
}

//=== GravityField ========================================================

/// Ticks every celestial body and applies its pull to the ships it is
/// registered with.
#[derive(Default)]
pub struct GravityField {
    bodies: Vec<Shared<Celestial>>,
    ships: Vec<Shared<Ship>>,
}

impl GravityField {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_body(&mut self, body: Shared<Celestial>) {
        self.bodies.push(body);
    }

    pub fn add_ship(&mut self, ship: Shared<Ship>) {
        self.ships.push(ship);
    }
}

impl Model for GravityField {
    fn update(&mut self, delta: Duration) {
        for body in &self.bodies {
            let mut body = body.borrow_mut();
            if !body.advance(delta) {
                continue;
            }
            for ship in &self.ships {
                let mut ship = ship.borrow_mut();
                if body.pulls(ship.player()) {
                    body.apply_pull(&mut ship);
                }
            }
        }
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
