//! Log reconstruction and notch-maneuver analysis for the ADR tracker testbench.
//!
//! The track/scan log and the detection log are parsed into typed events,
//! folded into per-track histories and a max-hold range-Doppler map, and the
//! track histories are judged for continuity across the Doppler-notch
//! maneuver window.

pub mod log_interface;
pub mod math;
pub mod pipeline;
pub mod prelude;
pub mod processing;
pub mod telemetry;

pub use pipeline::{Pipeline, PipelineOutput};
pub use prelude::{CoreError, CoreResult, LogFold, LogVariant, RadarParameters};
