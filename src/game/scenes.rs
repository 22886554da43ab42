//=========================================================================
// Game Scenes
//
// The two concrete scenes of the game.
//
// Scene Tree:
// ```text
// main ──put──▶ loading(game) ──swap──▶ game ⇄ pause
//  ▲                                      │
//  └──────────── pop (quit) ──────────────┘
// ```
// `MainScene` launches the loading front-end on its first frame and pops
// itself as soon as that subtree returns. `GameScene` owns the sector:
// background, sun, planets and ships.
//
//=========================================================================

//=== Standard Library Imports ============================================

use std::cell::{Ref, RefMut};
use std::collections::BTreeMap;
use std::rc::Rc;
use std::path::{Path, PathBuf};
use std::time::Duration;

//=== External Dependencies ===============================================

use log::{debug, info};
use rand::rngs::StdRng;
use rand::SeedableRng;

//=== Internal Dependencies ===============================================

use crate::core::assets::ResourceCache;
use crate::core::config::GameConfig;
use crate::core::error::SceneError;
use crate::core::render::{shared, ImageView, Layers, Shared, Surface};
use crate::core::scene::{
    ControlSignal, Handled, LoadingSequence, Progress, ReturnValue, SceneBehavior, SceneNode,
};
use crate::game::background::{self, Fit};
use crate::game::celestial::{Celestial, GravityField, SUN_RADIUS};
use crate::game::ship::{Ship, DEFAULT_MOVE_SPEED, DEFAULT_TURN_SPEED};

//=== Constants ===========================================================

/// Resource group holding backdrop pictures.
pub const BACKGROUNDS: &str = "backgrounds";

/// Resource group holding planet art.
pub const PLANETS: &str = "planets";

/// Radius and orbit distance of each planet around the sun.
const PLANET_ORBITS: [(u32, f64); 3] = [(8, 140.0), (10, 60.0), (30, 200.0)];

//=== GameScene ===========================================================

pub struct GameScene {
    cache: ResourceCache,
    assets: PathBuf,
    fps: f64,
    players: u8,
    rng: StdRng,
    layers: Layers,
    celestials: Vec<Shared<Celestial>>,
    ships: BTreeMap<u8, Shared<Ship>>,
}

impl GameScene {
    pub fn new(config: &GameConfig, cache: ResourceCache) -> Self {
        Self {
            cache,
            assets: config.assets.dir.clone(),
            fps: config.fps,
            players: config.players,
            rng: StdRng::from_entropy(),
            layers: Layers::new(),
            celestials: Vec::new(),
            ships: BTreeMap::new(),
        }
    }

    /// Replaces the entropy-seeded generator with a deterministic one.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    //--- Accessors --------------------------------------------------------

    pub fn fps(&self) -> f64 {
        self.fps
    }

    pub fn ship(&self, player: u8) -> Option<Ref<'_, Ship>> {
        self.ships.get(&player).map(|ship| ship.borrow())
    }

    /// Ship of `player`, as bound in a control's arguments.
    pub fn ship_mut(&mut self, player: i64) -> Result<RefMut<'_, Ship>, SceneError> {
        u8::try_from(player)
            .ok()
            .and_then(|p| self.ships.get(&p))
            .map(|ship| ship.borrow_mut())
            .ok_or_else(|| SceneError::config(format!("no ship for player {}", player)))
    }

    pub fn ships(&self) -> impl Iterator<Item = Ref<'_, Ship>> {
        self.ships.values().map(|ship| ship.borrow())
    }

    pub fn celestials(&self) -> impl ExactSizeIterator<Item = Ref<'_, Celestial>> {
        self.celestials.iter().map(|body| body.borrow())
    }

    /// Views and models the scene draws and updates each frame.
    pub fn layers(&self) -> &Layers {
        &self.layers
    }

    //--- Setup ------------------------------------------------------------

    fn load_group(&self, name: &str, dir: &Path) -> LoadingSequence<Self> {
        match self.cache.load(name, dir) {
            Ok(sequence) => sequence.retarget(),
            Err(e) => LoadingSequence::new().step(move |_| Err(e)),
        }
    }

    fn install_background(&mut self, resolution: (u32, u32)) {
        let rng = &mut self.rng;
        let picked = self
            .cache
            .with_group(BACKGROUNDS, |batch| {
                background::pick(batch, None, Fit::Stretch, resolution, rng)
            })
            .flatten();

        let image = match picked {
            Some(image) => image,
            None => {
                debug!(target: "game", "no background pictures, generating a starfield");
                background::starfield(resolution, &mut self.rng)
            }
        };
        self.layers.push_view(ImageView::new(image, (0, 0)));
    }

    fn spawn_sun(&mut self, center: (f64, f64)) {
        let sun = Celestial::sun(center, SUN_RADIUS, self.fps, &mut self.rng);
        self.add_celestial(sun);
    }

    fn spawn_planet(&mut self, center: (f64, f64), distance: f64, radius: u32) {
        let mut planet = Celestial::planet(center, distance, radius, self.fps, &mut self.rng);

        let rng = &mut self.rng;
        let art = self
            .cache
            .with_group(PLANETS, |batch| batch.choose(rng).cloned())
            .flatten();
        if let Some(art) = art {
            planet = planet.with_image(&art);
        }
        self.add_celestial(planet);
    }

    fn add_celestial(&mut self, body: Celestial) {
        let body = shared(body);
        self.layers.push_view(Rc::clone(&body));
        self.celestials.push(body);
    }

    fn spawn_player(&mut self, player: u8, resolution: (u32, u32)) -> Result<(), SceneError> {
        let mut ship = Ship::for_player(player, resolution)?;
        ship.set_move_speed(DEFAULT_MOVE_SPEED);
        ship.set_turn_speed(DEFAULT_TURN_SPEED);
        self.ships.insert(player, shared(ship));
        Ok(())
    }

    /// Registers every ship with every body, then hands the simulation to
    /// the layers: the gravity field first, each ship after it, and the
    /// ships drawn above the bodies.
    fn apply_gravity(&mut self) {
        let mut field = GravityField::new();
        for body in &self.celestials {
            for player in self.ships.keys() {
                body.borrow_mut().pull_on(*player);
            }
            field.add_body(Rc::clone(body));
        }
        for ship in self.ships.values() {
            field.add_ship(Rc::clone(ship));
        }

        self.layers.push_model(field);
        for ship in self.ships.values() {
            self.layers.push_model(Rc::clone(ship));
            self.layers.push_view(Rc::clone(ship));
        }
    }
}

impl SceneBehavior for GameScene {
    fn name(&self) -> &str {
        "game"
    }

    fn on_preload(&mut self, surface: &dyn Surface) -> LoadingSequence<Self> {
        let resolution = surface.size();
        let center = (f64::from(resolution.0) / 2.0, f64::from(resolution.1) / 2.0);

        let backgrounds = self.load_group(BACKGROUNDS, &self.assets.join("backgrounds"));
        let planets = self.load_group(PLANETS, &self.assets.join("sprites").join("planets"));

        let mut sector = LoadingSequence::new()
            .message("Loading Sector")
            .step(move |game: &mut GameScene| {
                game.spawn_sun(center);
                Ok(Progress::Tick)
            });
        for (radius, distance) in PLANET_ORBITS {
            sector.push(move |game: &mut GameScene| {
                game.spawn_planet(center, distance, radius);
                Ok(Progress::Tick)
            });
        }

        let mut fleet = LoadingSequence::new().message("Spawning Players");
        for player in 1..=self.players {
            fleet.push(move |game: &mut GameScene| {
                game.spawn_player(player, resolution)?;
                Ok(Progress::Tick)
            });
        }

        LoadingSequence::new()
            .message("Loading Events")
            .message("Loading Background")
            .then(backgrounds)
            .step(move |game: &mut GameScene| {
                game.install_background(resolution);
                Ok(Progress::Tick)
            })
            .message("Loading Planets")
            .then(planets)
            .message("Loading Stars")
            .then(sector)
            .message("Building Ships")
            .then(fleet)
            .message("Applying Gravity")
            .step(|game: &mut GameScene| {
                game.apply_gravity();
                Ok(Progress::Tick)
            })
    }

    fn on_finish(&mut self) -> Result<ReturnValue, SceneError> {
        for group in [BACKGROUNDS, PLANETS] {
            if self.cache.is_loaded(group) {
                for progress in self.cache.unload(group)?.drain(&mut ())? {
                    if let Progress::Message(message) = progress {
                        info!(target: "assets", "{}", message);
                    }
                }
            }
        }
        Ok(None)
    }

    fn update_models(&mut self, delta: Duration) -> Handled {
        self.layers.update_models(delta);
        Ok(None)
    }

    fn update_views(&mut self, delta: Duration) {
        self.layers.update_views(delta);
    }

    fn draw(&self, surface: &mut dyn Surface) {
        self.layers.draw(surface);
    }
}

//=== MainScene ===========================================================

/// Builds the subtree the main scene hands control to.
pub type Launcher = Box<dyn FnOnce() -> Result<Box<dyn SceneNode>, SceneError>>;

/// Root scene: puts the launched subtree on its first frame and pops
/// when that subtree returns.
pub struct MainScene {
    launch: Option<Launcher>,
}

impl MainScene {
    pub fn new<F>(launch: F) -> Self
    where
        F: FnOnce() -> Result<Box<dyn SceneNode>, SceneError> + 'static,
    {
        Self {
            launch: Some(Box::new(launch)),
        }
    }

    pub fn has_launched(&self) -> bool {
        self.launch.is_none()
    }
}

impl SceneBehavior for MainScene {
    fn name(&self) -> &str {
        "main"
    }

    fn update_models(&mut self, _delta: Duration) -> Handled {
        match self.launch.take() {
            Some(launch) => Ok(Some(ControlSignal::Put(launch()?))),
            None => Ok(None),
        }
    }

    fn on_return(&mut self, _value: ReturnValue) -> Handled {
        info!(target: "game", "game over");
        Ok(Some(ControlSignal::Pop))
    }
}

//=========================================================================
// Unit Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::input::{EventController, ScriptedInput};
    use crate::game::ship::Thrust;
    use crate::core::render::FrameBuffer;
    use crate::core::scene::Scene;
    use tempfile::TempDir;

    fn config(dir: &Path, players: u8) -> GameConfig {
        let mut config = GameConfig::default();
        config.fps = 1000.0;
        config.players = players;
        config.assets.dir = dir.to_path_buf();
        config
    }

    fn loaded_game(players: u8) -> (Scene<GameScene>, ResourceCache, TempDir) {
        let dir = TempDir::new().unwrap();
        let cache = ResourceCache::new();
        let game = GameScene::new(&config(dir.path(), players), cache.clone()).with_seed(11);
        let mut scene = Scene::new(game, EventController::new());
        let surface = FrameBuffer::new(640, 480);
        scene.preload(&surface).drain(scene.behavior_mut()).unwrap();
        (scene, cache, dir)
    }

    //--- GameScene --------------------------------------------------------

    #[test]
    fn preload_builds_the_sector() {
        let (scene, cache, _dir) = loaded_game(4);
        let game = scene.behavior();

        assert_eq!(game.celestials().len(), 4);
        assert_eq!(game.ships().count(), 4);
        // Background, four bodies and four ships.
        assert_eq!(game.layers().view_count(), 9);
        // Gravity field and four ships.
        assert_eq!(game.layers().model_count(), 5);
        assert!(cache.is_loaded(BACKGROUNDS));
        assert!(cache.is_loaded(PLANETS));
        assert!(game.celestials().all(|c| c.pulls(1) && c.pulls(4)));
    }

    #[test]
    fn preload_reports_progress_messages() {
        let dir = TempDir::new().unwrap();
        let mut game = GameScene::new(&config(dir.path(), 2), ResourceCache::new()).with_seed(1);
        let surface = FrameBuffer::new(320, 240);

        let reports = game.on_preload(&surface).drain(&mut game).unwrap();
        let messages: Vec<_> = reports
            .into_iter()
            .filter_map(|p| match p {
                Progress::Message(m) => Some(m),
                Progress::Tick => None,
            })
            .collect();

        assert_eq!(messages.first().map(String::as_str), Some("Loading Events"));
        assert_eq!(messages.last().map(String::as_str), Some("Applying Gravity"));
        assert!(messages.iter().any(|m| m == "Spawning Players"));
    }

    #[test]
    fn sun_sits_at_screen_center() {
        let (scene, _cache, _dir) = loaded_game(1);
        let sun = scene.behavior().celestials().next().unwrap().position();
        assert_eq!(sun, (320.0, 240.0));
    }

    #[test]
    fn unknown_player_is_a_configuration_error() {
        let (mut scene, _cache, _dir) = loaded_game(2);
        let game = scene.behavior_mut();
        assert!(game.ship_mut(2).is_ok());
        assert!(matches!(game.ship_mut(3), Err(SceneError::Configuration(_))));
        assert!(matches!(game.ship_mut(-1), Err(SceneError::Configuration(_))));
    }

    #[test]
    fn ships_drift_under_gravity() {
        let (mut scene, _cache, _dir) = loaded_game(1);
        let game = scene.behavior_mut();
        for _ in 0..10 {
            game.update_models(Duration::from_millis(50)).unwrap();
        }
        assert!(game.ship(1).unwrap().speed() > 0.0);
    }

    #[test]
    fn thrust_set_between_frames_reaches_the_updated_ship() {
        let (mut coasting, _c1, _d1) = loaded_game(1);
        let (mut thrusting, _c2, _d2) = loaded_game(1);
        thrusting
            .behavior_mut()
            .ship_mut(1)
            .unwrap()
            .set_thrust(Thrust::Forwards, false);

        for scene in [&mut coasting, &mut thrusting] {
            scene.behavior_mut().update_models(Duration::from_millis(200)).unwrap();
        }
        let coast = coasting.behavior().ship(1).unwrap().speed();
        let thrust = thrusting.behavior().ship(1).unwrap().speed();
        assert!(thrust > coast);
    }

    #[test]
    fn finishing_unloads_resource_groups() {
        let (mut scene, cache, _dir) = loaded_game(1);
        scene.finish().unwrap();
        assert!(!cache.is_loaded(BACKGROUNDS));
        assert!(!cache.is_loaded(PLANETS));
    }

    //--- MainScene --------------------------------------------------------

    struct Quick;

    impl SceneBehavior for Quick {
        fn name(&self) -> &str {
            "quick"
        }

        fn update_models(&mut self, _delta: Duration) -> Handled {
            Ok(Some(ControlSignal::Pop))
        }
    }

    #[test]
    fn main_scene_launches_then_pops_on_return() {
        let main = MainScene::new(|| Ok(Box::new(Scene::new(Quick, EventController::new())) as Box<dyn SceneNode>));
        let mut scene = Scene::new(main, EventController::new());
        let mut surface = FrameBuffer::new(8, 8);
        let mut input = ScriptedInput::new();

        let first = scene.step(&mut surface, &mut input).unwrap();
        assert!(first.signal.is_none());
        assert!(scene.behavior().has_launched());
        assert_eq!(scene.child().map(|c| c.name()), Some("quick"));

        let second = scene.step(&mut surface, &mut input).unwrap();
        assert!(matches!(second.signal, Some(ControlSignal::Pop)));
        assert!(scene.child().is_none());
    }

    #[test]
    fn launch_failure_aborts_the_step() {
        let main = MainScene::new(|| Err(SceneError::config("no players")));
        let mut scene = Scene::new(main, EventController::new());
        let result = scene.step(&mut FrameBuffer::new(8, 8), &mut ScriptedInput::new());
        assert!(matches!(result, Err(SceneError::Configuration(_))));
    }
}
