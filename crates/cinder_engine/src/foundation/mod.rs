//! Foundation utilities shared across the engine
//!
//! Math types, frame timing, and logging setup. Nothing in here knows
//! about rendering or scenes.

pub mod logging;
pub mod math;
pub mod time;
