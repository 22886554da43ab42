//=========================================================================
// Core
//
// Window-system independent building blocks: the scene lifecycle, input
// dispatch, frame clock, software rendering primitives, asset loading
// and configuration.
//
// Nothing in here touches winit or the GPU; the whole scene tree can be
// driven headless with a `FrameBuffer` and a `ScriptedInput`.
//
//=========================================================================

//=== Submodules ==========================================================

pub mod assets;
pub mod clock;
pub mod config;
pub mod error;
pub mod input;
pub mod platform_bridge;
pub mod render;
pub mod scene;

//=== Re-exports ==========================================================

pub use assets::{AssetBatch, ResourceCache};
pub use clock::Clock;
pub use config::GameConfig;
pub use error::SceneError;
