//=========================================================================
// Scene Module
//
// Hierarchical scene lifecycle, control signals, loading sequences and
// the two stock scenes (pause and loading screen).
//
// Architecture:
// ```text
//   Engine
//     └─ root: Box<dyn SceneNode>
//          └─ child ─ child ─ ... ─ deepest (the only one that runs)
//
//   Scene<B>
//     ├─ behavior: B              (content + handler context)
//     ├─ controller: EventController<B>
//     ├─ clock: Clock
//     └─ child: Option<Box<dyn SceneNode>>
// ```
//
//=========================================================================

//=== Submodules ==========================================================

pub mod loading;
pub mod loading_scene;
pub mod node;
pub mod pause;
pub mod signal;

//=== Re-exports ==========================================================

pub use loading::{LoadingSequence, Progress};
pub use loading_scene::LoadingScene;
pub use node::{Phase, ReturnValue, Scene, SceneBehavior, SceneNode, SceneState, StepOutcome};
pub use pause::{PauseScene, RESUME};
pub use signal::{ControlSignal, Direction, Handled, SignalTag};
