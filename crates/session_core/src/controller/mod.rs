//! Controller layer: UI effects, state transitions, and the serial event loop.

pub mod events;
pub mod orchestration;
pub mod reducer;
