//! Track continuity across the Doppler-notch maneuver.
//!
//! Each track's samples are split by scan index into the windows before,
//! during and after the maneuver. A track has to exist before the maneuver
//! and carry a minimum history to be judged at all.

use crate::math::stats::StatsHelper;
use crate::math::units::UnitConverter;
use crate::prelude::{CoreError, CoreResult, RadarParameters};
use crate::processing::registry::{Track, TrackRegistry, TrackSample};
use crate::telemetry::log::LogManager;
use serde::{Deserialize, Serialize};

/// Timing of the maneuver and the thresholds used to judge it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct NotchConfig {
    pub notch_time_s: f64,
    pub notch_duration_s: f64,
    pub scan_rate_hz: f64,
    pub min_samples: usize,
    /// Below this radial speed an MTI filter suppresses the return.
    pub velocity_threshold_mps: f64,
}

impl Default for NotchConfig {
    fn default() -> Self {
        Self {
            notch_time_s: 30.0,
            notch_duration_s: 10.0,
            scan_rate_hz: 2.0,
            min_samples: 5,
            velocity_threshold_mps: 20.0,
        }
    }
}

impl NotchConfig {
    pub fn validate(&self) -> CoreResult<()> {
        if !(self.scan_rate_hz > 0.0) {
            return Err(CoreError::InvalidConfig(format!(
                "scan rate must be positive, got {}",
                self.scan_rate_hz
            )));
        }
        if !(self.notch_time_s >= 0.0) || !(self.notch_duration_s >= 0.0) {
            return Err(CoreError::InvalidConfig(
                "notch time and duration must be non-negative".into(),
            ));
        }
        Ok(())
    }

    pub fn window(&self) -> NotchWindow {
        NotchWindow::from_seconds(self.notch_time_s, self.notch_duration_s, self.scan_rate_hz)
    }
}

/// Maneuver interval in scan indices, both ends inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotchWindow {
    pub start_scan: usize,
    pub end_scan: usize,
}

impl NotchWindow {
    pub fn from_seconds(start_s: f64, duration_s: f64, scan_rate_hz: f64) -> Self {
        Self {
            start_scan: (start_s * scan_rate_hz).floor() as usize,
            end_scan: ((start_s + duration_s) * scan_rate_hz).floor() as usize,
        }
    }

    pub fn phase(&self, scan_index: usize) -> WindowPhase {
        if scan_index < self.start_scan {
            WindowPhase::Pre
        } else if scan_index <= self.end_scan {
            WindowPhase::During
        } else {
            WindowPhase::Post
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WindowPhase {
    Pre,
    During,
    Post,
}

/// A track's samples split by [`WindowPhase`].
#[derive(Debug, Default)]
pub struct WindowPartition<'a> {
    pub pre: Vec<&'a TrackSample>,
    pub during: Vec<&'a TrackSample>,
    pub post: Vec<&'a TrackSample>,
}

impl<'a> WindowPartition<'a> {
    pub fn split(track: &'a Track, window: NotchWindow) -> Self {
        let mut partition = Self::default();
        for sample in track.samples() {
            match window.phase(sample.scan_index) {
                WindowPhase::Pre => partition.pre.push(sample),
                WindowPhase::During => partition.during.push(sample),
                WindowPhase::Post => partition.post.push(sample),
            }
        }
        partition
    }

    pub fn len(&self) -> usize {
        self.pre.len() + self.during.len() + self.post.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WindowStats {
    pub samples: usize,
    pub mean_quality: Option<f64>,
}

impl WindowStats {
    fn from_samples(samples: &[&TrackSample]) -> Self {
        let qualities: Vec<f64> = samples.iter().map(|s| f64::from(s.quality)).collect();
        Self {
            samples: samples.len(),
            mean_quality: StatsHelper::mean(&qualities),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ContinuityOutcome {
    Continuous,
    LostDuringManeuver,
    NotRecovered,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExclusionReason {
    TooFewSamples { samples: usize },
    NoPreManeuverHistory,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExcludedTrack {
    pub track_id: u32,
    pub reason: ExclusionReason,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackNotchReport {
    pub track_id: u32,
    pub samples: usize,
    pub pre: WindowStats,
    pub during: WindowStats,
    pub post: WindowStats,
    pub during_mean_abs_velocity_mps: Option<f64>,
    /// Some during-window sample fell inside the MTI notch.
    pub entered_notch: bool,
    pub lost_during_maneuver: bool,
    pub not_recovered: bool,
}

impl TrackNotchReport {
    /// Summary verdict; a track missing through the maneuver counts as lost
    /// even when it is also absent afterwards.
    pub fn outcome(&self) -> ContinuityOutcome {
        if self.lost_during_maneuver {
            ContinuityOutcome::LostDuringManeuver
        } else if self.not_recovered {
            ContinuityOutcome::NotRecovered
        } else {
            ContinuityOutcome::Continuous
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotchAnalysis {
    pub window: NotchWindow,
    pub reports: Vec<TrackNotchReport>,
    pub excluded: Vec<ExcludedTrack>,
}

impl NotchAnalysis {
    pub fn count(&self, outcome: ContinuityOutcome) -> usize {
        self.reports.iter().filter(|r| r.outcome() == outcome).count()
    }
}

pub struct NotchAnalyzer {
    config: NotchConfig,
    params: RadarParameters,
    logger: LogManager,
}

impl NotchAnalyzer {
    pub fn new(config: NotchConfig, params: RadarParameters) -> CoreResult<Self> {
        config.validate()?;
        params.validate()?;
        Ok(Self {
            config,
            params,
            logger: LogManager::new("notch"),
        })
    }

    pub fn window(&self) -> NotchWindow {
        self.config.window()
    }

    pub fn analyze(&self, registry: &TrackRegistry) -> NotchAnalysis {
        let mut reports = Vec::new();
        let mut excluded = Vec::new();

        for track in registry.tracks() {
            match self.analyze_track(track) {
                Ok(report) => reports.push(report),
                Err(reason) => excluded.push(ExcludedTrack {
                    track_id: track.id(),
                    reason,
                }),
            }
        }

        let analysis = NotchAnalysis {
            window: self.window(),
            reports,
            excluded,
        };
        self.logger.record(&format!(
            "scans {}..={}: {} analysed, {} excluded, {} lost, {} not recovered",
            analysis.window.start_scan,
            analysis.window.end_scan,
            analysis.reports.len(),
            analysis.excluded.len(),
            analysis.count(ContinuityOutcome::LostDuringManeuver),
            analysis.count(ContinuityOutcome::NotRecovered),
        ));
        analysis
    }

    pub fn analyze_track(&self, track: &Track) -> Result<TrackNotchReport, ExclusionReason> {
        if track.len() < self.config.min_samples {
            return Err(ExclusionReason::TooFewSamples {
                samples: track.len(),
            });
        }

        let partition = WindowPartition::split(track, self.window());
        if partition.pre.is_empty() {
            return Err(ExclusionReason::NoPreManeuverHistory);
        }

        let units = UnitConverter::new(&self.params);
        let during_velocities: Vec<f64> = partition
            .during
            .iter()
            .map(|s| units.raw_doppler_to_mps(s.doppler_bin))
            .collect();
        let entered_notch = during_velocities
            .iter()
            .any(|v| v.abs() < self.config.velocity_threshold_mps);

        Ok(TrackNotchReport {
            track_id: track.id(),
            samples: track.len(),
            pre: WindowStats::from_samples(&partition.pre),
            during: WindowStats::from_samples(&partition.during),
            post: WindowStats::from_samples(&partition.post),
            during_mean_abs_velocity_mps: StatsHelper::mean_abs(&during_velocities),
            entered_notch,
            lost_during_maneuver: partition.during.is_empty(),
            not_recovered: partition.post.is_empty(),
        })
    }
}
