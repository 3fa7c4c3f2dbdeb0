use adrcore::math::UnitConverter;
use adrcore::{LogVariant, RadarParameters};
use anyhow::{ensure, Context};
use rand::{rngs::StdRng, Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};

/// Configuration for generating a synthetic tactical scenario.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    pub variant: LogVariant,
    pub scans: usize,
    pub targets: usize,
    /// Targets that turn to zero radial velocity during the maneuver.
    pub notch_targets: usize,
    pub notch_time_s: f64,
    pub notch_duration_s: f64,
    pub scan_rate_hz: f64,
    /// Chance that a notching target misses a scan inside the maneuver.
    pub dropout: f64,
    pub clutter_rows: usize,
    pub seed: u64,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            variant: LogVariant::Full,
            scans: 120,
            targets: 6,
            notch_targets: 2,
            notch_time_s: 30.0,
            notch_duration_s: 10.0,
            scan_rate_hz: 2.0,
            dropout: 0.5,
            clutter_rows: 8,
            seed: 0,
        }
    }
}

/// Track and detection log contents in the testbench text format.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyntheticScenario {
    pub variant: LogVariant,
    pub tracks: String,
    pub detections: String,
}

impl SyntheticScenario {
    /// File names the testbench uses for each variant, `(tracks, detections)`.
    pub fn file_names(variant: LogVariant) -> (&'static str, &'static str) {
        match variant {
            LogVariant::Quick => ("ADR_quick_trk.txt", "ADR_quick_det.txt"),
            LogVariant::Full => ("ADR_tracks.txt", "ADR_detections.txt"),
        }
    }

    pub fn write_to(&self, dir: &Path) -> anyhow::Result<(PathBuf, PathBuf)> {
        fs::create_dir_all(dir)
            .with_context(|| format!("creating scenario directory {}", dir.display()))?;
        let (track_name, detection_name) = Self::file_names(self.variant);
        let track_path = dir.join(track_name);
        let detection_path = dir.join(detection_name);
        fs::write(&track_path, &self.tracks)
            .with_context(|| format!("writing {}", track_path.display()))?;
        fs::write(&detection_path, &self.detections)
            .with_context(|| format!("writing {}", detection_path.display()))?;
        Ok((track_path, detection_path))
    }
}

struct Target {
    id: u32,
    start_range: usize,
    doppler_offset: i64,
    notching: bool,
}

pub fn build_scenario(config: &GeneratorConfig) -> anyhow::Result<SyntheticScenario> {
    ensure!(config.scan_rate_hz > 0.0, "scan rate must be positive");
    ensure!(
        config.notch_targets <= config.targets,
        "{} notch targets requested out of {}",
        config.notch_targets,
        config.targets
    );
    ensure!(
        (0.0..=1.0).contains(&config.dropout),
        "dropout must be a probability"
    );

    let variant = config.variant;
    let params = RadarParameters::for_variant(variant);
    let units = UnitConverter::new(&params);
    let range_bins = params.range_bins;
    let doppler_bins = params.doppler_bins;
    let centre = (doppler_bins / 2) as i64;
    let scale = if params.q2_fixed_point { 4 } else { 1 };

    let start_scan = (config.notch_time_s * config.scan_rate_hz).floor() as usize;
    let end_scan =
        ((config.notch_time_s + config.notch_duration_s) * config.scan_rate_hz).floor() as usize;

    let mut rng = StdRng::seed_from_u64(config.seed);
    let targets: Vec<Target> = (0..config.targets)
        .map(|index| {
            let offset = rng.gen_range(doppler_bins / 8..doppler_bins / 4) as i64;
            let sign = if rng.gen_bool(0.5) { 1 } else { -1 };
            Target {
                id: index as u32 + 1,
                start_range: rng.gen_range(range_bins / 4..3 * range_bins / 4),
                doppler_offset: sign * offset,
                notching: index < config.notch_targets,
            }
        })
        .collect();

    let mut tracks = String::new();
    let mut detections = String::new();

    for scan in 0..config.scans {
        let maneuvering = (start_scan..=end_scan).contains(&scan);
        let mut active = 0;

        for target in &targets {
            let in_notch = target.notching && maneuvering;
            if in_notch && rng.gen_bool(config.dropout) {
                continue;
            }

            let range = target.start_range.saturating_sub(scan / 4) as i64;
            let doppler = if in_notch {
                centre
            } else {
                centre + target.doppler_offset
            };
            let quality: u32 = if in_notch {
                rng.gen_range(2..8)
            } else {
                rng.gen_range(8..16)
            };

            match variant {
                LogVariant::Quick => writeln!(
                    tracks,
                    "TRK {} R={} D={} Q={}",
                    target.id,
                    range * scale,
                    doppler * scale,
                    quality
                )?,
                LogVariant::Full => {
                    let velocity = units.doppler_bin_to_mps(doppler as f64, 0).round() as i64;
                    writeln!(
                        tracks,
                        "TRK {} R={} D={} VR={} Q={} S=1",
                        target.id, range, doppler, velocity, quality
                    )?
                }
            }
            active += 1;

            writeln!(
                detections,
                "{} {} {}",
                range,
                doppler,
                rng.gen_range(800..1200)
            )?;
        }

        for _ in 0..config.clutter_rows {
            writeln!(
                detections,
                "{} {} {}",
                rng.gen_range(0..range_bins),
                rng.gen_range(0..doppler_bins),
                rng.gen_range(10..200)
            )?;
        }
        writeln!(tracks, "SCAN_END S={}", active)?;
    }

    Ok(SyntheticScenario {
        variant,
        tracks,
        detections,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use adrcore::log_interface::track_events;
    use adrcore::processing::TrackRegistry;

    #[test]
    fn generator_is_deterministic_per_seed() {
        let config = GeneratorConfig::default();
        let first = build_scenario(&config).unwrap();
        let second = build_scenario(&config).unwrap();
        assert_eq!(first, second);

        let other = build_scenario(&GeneratorConfig {
            seed: 13,
            ..config
        })
        .unwrap();
        assert_ne!(first.detections, other.detections);
    }

    #[test]
    fn generator_emits_one_scan_end_per_scan() {
        let config = GeneratorConfig {
            scans: 40,
            ..Default::default()
        };
        let scenario = build_scenario(&config).unwrap();
        let registry = TrackRegistry::from_events(track_events(&scenario.tracks));
        assert_eq!(registry.scan_summary().len(), 40);
        assert_eq!(registry.track_count(), config.targets);
    }

    #[test]
    fn quick_scenario_writes_q2_short_form() {
        let config = GeneratorConfig {
            variant: LogVariant::Quick,
            dropout: 0.0,
            ..Default::default()
        };
        let scenario = build_scenario(&config).unwrap();
        let registry = TrackRegistry::from_events(track_events(&scenario.tracks));
        for track in registry.tracks() {
            assert!(track.velocities().iter().all(Option::is_none));
            assert!(track.range_bins().iter().all(|r| r % 4 == 0));
        }
        assert_eq!(
            SyntheticScenario::file_names(scenario.variant),
            ("ADR_quick_trk.txt", "ADR_quick_det.txt")
        );
    }

    #[test]
    fn generator_rejects_impossible_configs() {
        let config = GeneratorConfig {
            notch_targets: 7,
            ..Default::default()
        };
        assert!(build_scenario(&config).is_err());
    }
}
