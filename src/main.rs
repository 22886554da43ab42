//=========================================================================
// Space Battle: Launch Entry Point
//
// Reads `space_battle.toml` from the working directory when present and
// runs the game until every scene has finished. Takes no flags; set
// `RUST_LOG` to change the log level.
//
//=========================================================================

use std::path::Path;

use log::error;

use space_battle::game;
use space_battle::prelude::*;

fn main() -> Result<(), PlatformError> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = GameConfig::load(Path::new(GameConfig::FILE_NAME))?;
    let root = game::main_scene(&config)?;

    let result = EngineBuilder::new().with_config(config).build().run(root);
    if let Err(e) = &result {
        error!("space battle stopped: {}", e);
    }
    result
}
