use adrcore::processing::NotchConfig;
use adrcore::{LogVariant, RadarParameters};
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkflowConfig {
    pub tracks: Option<PathBuf>,
    pub detections: Option<PathBuf>,
    /// Inferred from the log file names when unset.
    pub variant: Option<LogVariant>,
    pub max_range_km: f64,
    pub wavelength_m: f64,
    pub prf_hz: [f64; 3],
    pub notch: NotchConfig,
    pub peaks: usize,
    pub report: Option<PathBuf>,
}

impl Default for WorkflowConfig {
    fn default() -> Self {
        let radar = RadarParameters::default();
        Self {
            tracks: None,
            detections: None,
            variant: None,
            max_range_km: radar.max_range_km,
            wavelength_m: radar.wavelength_m,
            prf_hz: radar.prf_hz,
            notch: NotchConfig::default(),
            peaks: 5,
            report: None,
        }
    }
}

impl WorkflowConfig {
    pub fn load<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path_ref = path.as_ref();
        let contents = fs::read_to_string(path_ref)
            .with_context(|| format!("reading workflow config {}", path_ref.display()))?;
        let config: WorkflowConfig = serde_yaml::from_str(&contents)
            .with_context(|| format!("parsing workflow config {}", path_ref.display()))?;
        Ok(config)
    }

    pub fn from_args(
        tracks: Option<PathBuf>,
        detections: Option<PathBuf>,
        variant: Option<LogVariant>,
    ) -> Self {
        Self {
            tracks,
            detections,
            variant,
            ..Self::default()
        }
    }

    /// Explicit variant, else `quick` when either log name says so.
    pub fn resolved_variant(&self) -> LogVariant {
        if let Some(variant) = self.variant {
            return variant;
        }
        let quick = [&self.tracks, &self.detections]
            .into_iter()
            .flatten()
            .filter_map(|path| path.file_name().and_then(|name| name.to_str()))
            .any(|name| LogVariant::from_file_name(name) == LogVariant::Quick);
        if quick {
            LogVariant::Quick
        } else {
            LogVariant::Full
        }
    }

    pub fn radar_parameters(&self) -> RadarParameters {
        RadarParameters {
            max_range_km: self.max_range_km,
            wavelength_m: self.wavelength_m,
            prf_hz: self.prf_hz,
            ..RadarParameters::for_variant(self.resolved_variant())
        }
    }
}
