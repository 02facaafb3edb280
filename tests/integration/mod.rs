//! Integration test modules for metrum
//!
//! Test categories:
//! - engine: Lifecycle, output selection, stop/drop behavior
//! - voices: Programs, mute/solo, controllers
//! - timing: Step spacing, tempo, clock position

pub mod engine;
pub mod voices;
