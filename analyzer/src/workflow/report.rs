use crate::workflow::runner::WorkflowResult;
use adrcore::math::UnitConverter;
use adrcore::processing::{ContinuityOutcome, ExclusionReason, NotchAnalysis, RdmPeak};
use adrcore::telemetry::ParseMetrics;
use adrcore::LogVariant;
use anyhow::Context;
use serde::Serialize;
use std::fmt::Write as _;
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, Serialize)]
pub struct TrackSummary {
    pub id: u32,
    pub updates: usize,
    pub start_range_nmi: f64,
    pub end_range_nmi: f64,
    pub last_quality: u32,
}

#[derive(Debug, Clone, Serialize)]
pub struct MapSummary {
    pub range_bins: usize,
    pub doppler_bins: usize,
    pub detections: usize,
    pub dropped: usize,
    pub max_magnitude: i64,
    pub nonzero_cells: usize,
    pub peaks: Vec<RdmPeak>,
}

/// Plain-data view of a workflow run, written as JSON for downstream plotting.
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisReport {
    pub variant: LogVariant,
    pub scan_summary: Vec<usize>,
    pub tracks: Vec<TrackSummary>,
    pub map: MapSummary,
    pub notch: NotchAnalysis,
    pub parse: ParseMetrics,
}

impl AnalysisReport {
    pub fn build(result: &WorkflowResult, peaks: usize) -> Self {
        let units = UnitConverter::new(&result.params);
        let registry = &result.output.registry;

        let tracks = registry
            .tracks()
            .filter_map(|track| {
                let first = track.first()?;
                let last = track.last()?;
                Some(TrackSummary {
                    id: track.id(),
                    updates: track.len(),
                    start_range_nmi: units.raw_range_to_nmi(first.range_bin),
                    end_range_nmi: units.raw_range_to_nmi(last.range_bin),
                    last_quality: last.quality,
                })
            })
            .collect();

        let rdm = &result.output.rdm;
        let aggregate = rdm.aggregate();
        let map = MapSummary {
            range_bins: aggregate.range_bins(),
            doppler_bins: aggregate.doppler_bins(),
            detections: rdm.detections().len(),
            dropped: rdm.dropped(),
            max_magnitude: aggregate.max(),
            nonzero_cells: aggregate.nonzero_count(),
            peaks: aggregate.top_peaks(peaks),
        };

        Self {
            variant: result.variant,
            scan_summary: registry.scan_summary().to_vec(),
            tracks,
            map,
            notch: result.analysis.clone(),
            parse: result.output.metrics(),
        }
    }

    pub fn render_text(&self) -> String {
        let mut out = String::new();
        // Writing into a String cannot fail.
        let _ = self.write_text(&mut out);
        out
    }

    fn write_text(&self, out: &mut String) -> std::fmt::Result {
        writeln!(
            out,
            "Mode: {:?} ({}x{})",
            self.variant, self.map.range_bins, self.map.doppler_bins
        )?;
        writeln!(
            out,
            "Loaded {} detections ({} outside grid), {} tracks over {} scans",
            self.map.detections,
            self.map.dropped,
            self.tracks.len(),
            self.scan_summary.len()
        )?;
        if self.parse.skipped() > 0 {
            writeln!(
                out,
                "Skipped {} lines ({} malformed)",
                self.parse.skipped(),
                self.parse.malformed
            )?;
        }

        if !self.map.peaks.is_empty() {
            writeln!(out, "\nTop {} detections:", self.map.peaks.len())?;
            writeln!(out, "{:>8} {:>8} {:>12}", "Range", "Doppler", "Magnitude")?;
            writeln!(out, "{}", "-".repeat(30))?;
            for peak in &self.map.peaks {
                writeln!(
                    out,
                    "{:>8} {:>8} {:>12}",
                    peak.range_bin, peak.signed_doppler, peak.magnitude
                )?;
            }
        }

        let window = self.notch.window;
        writeln!(
            out,
            "\n=== NOTCH MANEUVER ANALYSIS (scans {}..={}) ===",
            window.start_scan, window.end_scan
        )?;
        for report in &self.notch.reports {
            writeln!(out, "\nTrack {}:", report.track_id)?;
            if let Some(q) = report.pre.mean_quality {
                writeln!(out, "  Pre-notch quality:  {:.1}", q)?;
            }
            if let Some(q) = report.during.mean_quality {
                writeln!(out, "  During notch quality: {:.1}", q)?;
            }
            if let Some(v) = report.during_mean_abs_velocity_mps {
                writeln!(out, "  During notch |velocity|: {:.1} m/s", v)?;
            }
            if report.entered_notch {
                writeln!(out, "  Track entered MTI notch region")?;
            }
            if report.lost_during_maneuver {
                writeln!(out, "  Track LOST during notch")?;
            }
            if let Some(q) = report.post.mean_quality {
                writeln!(out, "  Post-notch quality: {:.1}", q)?;
            }
            if report.not_recovered {
                writeln!(out, "  Track NOT RECOVERED after notch")?;
            }
            if report.outcome() == ContinuityOutcome::Continuous {
                writeln!(out, "  Continuous through maneuver")?;
            }
        }
        for excluded in &self.notch.excluded {
            let reason = match excluded.reason {
                ExclusionReason::TooFewSamples { samples } => format!("only {} updates", samples),
                ExclusionReason::NoPreManeuverHistory => "no pre-maneuver history".to_string(),
            };
            writeln!(out, "Track {} not analysed: {}", excluded.track_id, reason)?;
        }

        writeln!(out, "\n=== TRACK SUMMARY ===")?;
        for track in &self.tracks {
            writeln!(
                out,
                "Track {}: {} updates, R={:.1}->{:.1} nm, Q={}",
                track.id, track.updates, track.start_range_nmi, track.end_range_nmi, track.last_quality
            )?;
        }
        Ok(())
    }

    pub fn write_json(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("creating report directory {}", parent.display()))?;
        }
        let json = serde_json::to_string_pretty(self).context("serializing analysis report")?;
        fs::write(path, json).with_context(|| format!("writing report {}", path.display()))?;
        Ok(())
    }
}
