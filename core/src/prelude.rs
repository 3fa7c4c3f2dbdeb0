use crate::log_interface::LogEvent;
use serde::{Deserialize, Serialize};

/// Grid layout of the simulated radar run that produced a log.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogVariant {
    /// Short testbench run: 128 range x 32 Doppler bins, Q2 track fields.
    Quick,
    /// Tactical run: 1024 range x 128 Doppler bins.
    #[default]
    Full,
}

impl LogVariant {
    pub fn range_bins(self) -> usize {
        match self {
            LogVariant::Quick => 128,
            LogVariant::Full => 1024,
        }
    }

    pub fn doppler_bins(self) -> usize {
        match self {
            LogVariant::Quick => 32,
            LogVariant::Full => 128,
        }
    }

    /// Whether the variant writes range/Doppler in Q2 fixed point.
    pub fn uses_q2(self) -> bool {
        matches!(self, LogVariant::Quick)
    }

    /// Infers the variant from a log file name (`ADR_quick_trk.txt` vs `ADR_tracks.txt`).
    pub fn from_file_name(name: &str) -> Self {
        if name.to_ascii_lowercase().contains("quick") {
            LogVariant::Quick
        } else {
            LogVariant::Full
        }
    }
}

/// Physical parameters shared by the converter, the map builder and the analyzer.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct RadarParameters {
    pub range_bins: usize,
    pub doppler_bins: usize,
    pub max_range_km: f64,
    pub wavelength_m: f64,
    pub prf_hz: [f64; 3],
    pub q2_fixed_point: bool,
}

impl RadarParameters {
    pub fn for_variant(variant: LogVariant) -> Self {
        Self {
            range_bins: variant.range_bins(),
            doppler_bins: variant.doppler_bins(),
            q2_fixed_point: variant.uses_q2(),
            ..Self::default()
        }
    }

    pub fn validate(&self) -> CoreResult<()> {
        if self.range_bins == 0 || self.doppler_bins == 0 {
            return Err(CoreError::InvalidConfig(format!(
                "grid must be non-empty, got {}x{}",
                self.doppler_bins, self.range_bins
            )));
        }
        if self.max_range_km <= 0.0 || self.wavelength_m <= 0.0 {
            return Err(CoreError::InvalidConfig(
                "max range and wavelength must be positive".into(),
            ));
        }
        Ok(())
    }
}

impl Default for RadarParameters {
    fn default() -> Self {
        Self {
            range_bins: LogVariant::Full.range_bins(),
            doppler_bins: LogVariant::Full.doppler_bins(),
            max_range_km: 120.0,
            wavelength_m: 0.1,
            prf_hz: [8000.0, 9000.0, 10000.0],
            q2_fixed_point: false,
        }
    }
}

/// Common error type for the analysis core.
#[derive(thiserror::Error, Debug)]
pub enum CoreError {
    #[error("i/o failure: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

pub type CoreResult<T> = Result<T, CoreError>;

/// Accumulator folded over the event stream of one parse pass.
///
/// State is threaded by value so a pass never shares counters with another.
pub trait LogFold: Sized {
    fn apply(self, event: &LogEvent) -> Self;

    fn fold_events<I>(self, events: I) -> Self
    where
        I: IntoIterator<Item = LogEvent>,
    {
        events.into_iter().fold(self, |acc, event| acc.apply(&event))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn variant_selects_grid_and_scaling() {
        let quick = RadarParameters::for_variant(LogVariant::Quick);
        assert_eq!((quick.doppler_bins, quick.range_bins), (32, 128));
        assert!(quick.q2_fixed_point);

        let full = RadarParameters::for_variant(LogVariant::Full);
        assert_eq!((full.doppler_bins, full.range_bins), (128, 1024));
        assert!(!full.q2_fixed_point);
    }

    #[test]
    fn variant_inferred_from_file_name() {
        assert_eq!(LogVariant::from_file_name("ADR_quick_trk.txt"), LogVariant::Quick);
        assert_eq!(LogVariant::from_file_name("ADR_tracks.txt"), LogVariant::Full);
    }

    #[test]
    fn empty_grid_is_rejected() {
        let params = RadarParameters {
            range_bins: 0,
            ..Default::default()
        };
        assert!(matches!(params.validate(), Err(CoreError::InvalidConfig(_))));
    }
}
