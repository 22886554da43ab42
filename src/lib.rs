//=========================================================================
// Space Battle: Library Root
//
// A gravity-well arcade game and the scene lifecycle it runs on.
//
// Responsibilities:
// - Expose the reusable scene core (`core`): scene tree, input dispatch,
//   loading sequences, clock, surfaces and assets
// - Expose the game content (`game`) and its scene factories
// - Keep the windowing layer (`platform`) hidden behind `Engine`
//
// Typical usage:
// ```no_run
// use space_battle::prelude::*;
//
// fn main() -> Result<(), PlatformError> {
//     let config = GameConfig::default();
//     let root = space_battle::game::main_scene(&config)?;
//     EngineBuilder::new().with_config(config).build().run(root)
// }
// ```
//
//=========================================================================

//--- Public Modules ------------------------------------------------------
//
// `core` holds the scene lifecycle and everything it needs; `game` is
// the arcade game built on top of it.
//
pub mod core;
pub mod game;
pub mod prelude;

//--- Internal Modules ----------------------------------------------------
//
// `platform` contains the winit window, event loop and pixels surface
// and is only reachable through `Engine`.
//
mod engine;
mod platform;

//--- Public Exports ------------------------------------------------------

pub use engine::{Engine, EngineBuilder};
