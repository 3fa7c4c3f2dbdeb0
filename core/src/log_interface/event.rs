use serde::{Deserialize, Serialize};

/// One `range doppler magnitude` row of the detection log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Detection {
    pub range_bin: i64,
    pub doppler_bin: i64,
    pub magnitude: i64,
}

impl Detection {
    pub fn new(range_bin: i64, doppler_bin: i64, magnitude: i64) -> Self {
        Self {
            range_bin,
            doppler_bin,
            magnitude,
        }
    }
}

/// Field layout of a `TRK` line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TrackLayout {
    /// `TRK id R= D= Q=`
    Short,
    /// `TRK id R= D= VR= Q= [S=]`
    Long { velocity: i64, status: Option<i64> },
}

/// Per-scan update of one track as written by the tracker testbench.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackUpdate {
    pub id: u32,
    pub range_bin: i64,
    pub doppler_bin: i64,
    pub quality: u32,
    pub layout: TrackLayout,
}

impl TrackUpdate {
    pub fn velocity(&self) -> Option<i64> {
        match self.layout {
            TrackLayout::Short => None,
            TrackLayout::Long { velocity, .. } => Some(velocity),
        }
    }
}

/// Typed event produced from a single log line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LogEvent {
    TrackUpdate(TrackUpdate),
    ScanEnd { active: usize },
    Detection(Detection),
}
