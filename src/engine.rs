//=========================================================================
// Engine
//
// Entry point that turns a scene tree into a running windowed game.
//
// Architecture:
// ```text
//     EngineBuilder  ──build()──>  Engine  ──run(root)──>  [Event Loop]
//         │                                                    │
//         ├─ with_config()                  Platform ──────────┤
//         ├─ with_window_title()              window + pixels  │
//         └─ with_channel_capacity()          root.step / frame│
//                                                              ▼
//                                             returns when the root ends
// ```
//
//=========================================================================

//=== External Dependencies ===============================================

use log::info;

//=== Internal Dependencies ===============================================

use crate::core::config::GameConfig;
use crate::core::platform_bridge::PlatformError;
use crate::core::scene::SceneNode;
use crate::platform::Platform;

//=== EngineBuilder =======================================================

/// Builder for configuring and constructing an [`Engine`].
///
/// # Default Values
///
/// - **Config**: [`GameConfig::default`] (640x480, 30 FPS)
/// - **Channel capacity**: 128 platform messages
///
/// # Examples
///
/// ```no_run
/// use space_battle::prelude::*;
///
/// struct Blank;
/// impl SceneBehavior for Blank {
///     fn name(&self) -> &str {
///         "blank"
///     }
/// }
///
/// let root = Scene::new(Blank, EventController::new());
/// EngineBuilder::new()
///     .with_window_title("Blank")
///     .build()
///     .run(root)
///     .unwrap();
/// ```
pub struct EngineBuilder {
    config: GameConfig,
    channel_capacity: usize,
}

impl EngineBuilder {
    pub fn new() -> Self {
        Self {
            config: GameConfig::default(),
            channel_capacity: 128,
        }
    }

    /// Uses `config` for the window size and title.
    pub fn with_config(mut self, config: GameConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_window_title(mut self, title: impl Into<String>) -> Self {
        self.config.window.title = title.into();
        self
    }

    /// Sets how many platform messages may queue between two frames.
    ///
    /// # Panics
    ///
    /// Panics if `capacity == 0`.
    pub fn with_channel_capacity(mut self, capacity: usize) -> Self {
        assert!(capacity > 0, "Channel capacity must be positive");
        self.channel_capacity = capacity;
        self
    }

    pub fn build(self) -> Engine {
        info!(
            "Building engine ({}x{}, channel: {})",
            self.config.window.width, self.config.window.height, self.channel_capacity
        );
        Engine {
            config: self.config,
            channel_capacity: self.channel_capacity,
        }
    }
}

impl Default for EngineBuilder {
    fn default() -> Self {
        Self::new()
    }
}

//=== Engine ==============================================================

/// Windowed runtime for one scene tree.
///
/// Create via [`EngineBuilder`].
pub struct Engine {
    config: GameConfig,
    channel_capacity: usize,
}

impl Engine {
    /// Opens the window and steps `root` once per frame until the tree
    /// ends (root pops, window closes, or a scene fails).
    ///
    /// Blocks the calling thread, which must be the main thread.
    pub fn run(self, root: impl SceneNode + 'static) -> Result<(), PlatformError> {
        self.run_boxed(Box::new(root))
    }

    pub fn run_boxed(self, root: Box<dyn SceneNode>) -> Result<(), PlatformError> {
        info!("Engine starting with root scene {}", root.name());
        let result = Platform::new(self.config.window, self.channel_capacity, root).run();
        info!("Engine stopped");
        result
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }
}

//=========================================================================
// Unit Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_defaults() {
        let engine = EngineBuilder::new().build();
        assert_eq!(engine.config(), &GameConfig::default());
        assert_eq!(engine.channel_capacity, 128);
    }

    #[test]
    fn builder_overrides() {
        let mut config = GameConfig::default();
        config.window.width = 320;
        let engine = EngineBuilder::new()
            .with_config(config)
            .with_window_title("Duel")
            .with_channel_capacity(8)
            .build();

        assert_eq!(engine.config().window.width, 320);
        assert_eq!(engine.config().window.title, "Duel");
        assert_eq!(engine.channel_capacity, 8);
    }

    #[test]
    #[should_panic(expected = "Channel capacity must be positive")]
    fn zero_capacity_panics() {
        let _ = EngineBuilder::new().with_channel_capacity(0);
    }
}
