//=========================================================================
// Platform Bridge
//=========================================================================
//
// Bridges the windowed platform layer with the scene tree.
//
// The platform buffers input between frames and flushes it over a
// crossbeam channel at each redraw; the scene tree reads it back through
// the `InputSource` implemented by `EventCollector`. Both ends live on
// the main thread, the channel only decouples buffering from polling.
//
// Components:
// - `interface`: message and error types (the contract)
// - `event_collector`: scene-side draining of the channel
//
//=========================================================================

//=== Module Declarations =================================================

pub(crate) mod event_collector;
pub(crate) mod interface;

//=== Internal API ========================================================

pub(crate) use event_collector::EventCollector;
pub(crate) use interface::PlatformEvent;
pub use interface::PlatformError;
