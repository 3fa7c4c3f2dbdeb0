pub mod notch;
pub mod rdm;
pub mod registry;

pub use notch::{
    ContinuityOutcome, ExcludedTrack, ExclusionReason, NotchAnalysis, NotchAnalyzer, NotchConfig,
    NotchWindow, TrackNotchReport, WindowPartition, WindowPhase, WindowStats,
};
pub use rdm::{RangeDopplerMap, RdmBuilder, RdmPeak};
pub use registry::{Track, TrackRegistry, TrackSample};
