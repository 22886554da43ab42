//=========================================================================
// Game
//
// The Space Battle arcade game built on the scene core: up to four ships
// steering around a sun and its planets, pulled by their gravity.
//
// Module Layout:
// ```text
// game/
//  ├─ gravity     Newtonian well formulas
//  ├─ celestial   sun and orbiting planets
//  ├─ ship        player ships
//  ├─ background  backdrop pictures and starfield
//  ├─ controls    key bindings and input handlers
//  └─ scenes      GameScene, MainScene
// ```
//
//=========================================================================

pub mod background;
pub mod celestial;
pub mod controls;
pub mod gravity;
pub mod scenes;
pub mod ship;

//=== Internal Dependencies ===============================================

use log::info;

use crate::core::assets::ResourceCache;
use crate::core::clock::Clock;
use crate::core::config::GameConfig;
use crate::core::error::SceneError;
use crate::core::input::EventController;
use crate::core::scene::{LoadingScene, Scene, SceneNode};

pub use scenes::{GameScene, MainScene};

//=== Scene Factories =====================================================

/// Root of the game's scene tree for `config`.
///
/// # Errors
///
/// [`SceneError::Configuration`] if `config` does not validate.
pub fn main_scene(config: &GameConfig) -> Result<Scene<MainScene>, SceneError> {
    config.validate()?;
    info!(
        target: "game",
        "{} players at {} FPS, assets in {}",
        config.players,
        config.fps,
        config.assets.dir.display()
    );

    let cache = ResourceCache::new();
    let launch_config = config.clone();
    let main = MainScene::new(move || {
        let loading = loading_game_scene(&launch_config, cache)?;
        Ok(Box::new(loading) as Box<dyn SceneNode>)
    });

    let mut controller = EventController::new();
    controls::bind_quit(&mut controller)?;
    Ok(Scene::new(main, controller).with_clock(Clock::with_fps(config.fps)))
}

/// A fresh game scene sharing `cache`.
pub fn game_scene(config: &GameConfig, cache: ResourceCache) -> Result<Scene<GameScene>, SceneError> {
    let controller = controls::game_controller(config.players)?;
    Ok(Scene::new(GameScene::new(config, cache), controller).with_clock(Clock::with_fps(config.fps)))
}

/// Loading front-end that prepares a game scene and swaps itself for it.
pub fn loading_game_scene(
    config: &GameConfig,
    cache: ResourceCache,
) -> Result<Scene<LoadingScene<GameScene>>, SceneError> {
    let mut controller = EventController::new();
    controls::bind_quit(&mut controller)?;
    let target = game_scene(config, cache)?;
    Ok(Scene::new(LoadingScene::new(target), controller).with_clock(Clock::with_fps(config.fps)))
}
