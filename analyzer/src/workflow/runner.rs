use crate::workflow::config::WorkflowConfig;
use adrcore::processing::{NotchAnalysis, NotchAnalyzer};
use adrcore::{LogVariant, Pipeline, PipelineOutput, RadarParameters};
use anyhow::Context;
use log::info;

pub struct WorkflowResult {
    pub variant: LogVariant,
    pub params: RadarParameters,
    pub output: PipelineOutput,
    pub analysis: NotchAnalysis,
}

#[derive(Clone)]
pub struct Runner {
    config: WorkflowConfig,
}

impl Runner {
    pub fn new(config: WorkflowConfig) -> Self {
        Self { config }
    }

    pub fn execute(&self) -> anyhow::Result<WorkflowResult> {
        let variant = self.config.resolved_variant();
        let params = self.config.radar_parameters();
        info!(
            "analysing {:?} run ({}x{}), tracks={:?} detections={:?}",
            variant,
            params.range_bins,
            params.doppler_bins,
            self.config.tracks,
            self.config.detections
        );

        let pipeline = Pipeline::new(params.clone()).context("configuring log pipeline")?;
        let output = pipeline
            .run_files(
                self.config.tracks.as_deref(),
                self.config.detections.as_deref(),
            )
            .context("reading simulation logs")?;

        let analyzer = NotchAnalyzer::new(self.config.notch.clone(), params.clone())
            .context("configuring notch analyzer")?;
        let analysis = analyzer.analyze(&output.registry);

        Ok(WorkflowResult {
            variant,
            params,
            output,
            analysis,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::profile::{build_scenario, GeneratorConfig};
    use adrcore::processing::ContinuityOutcome;
    use tempfile::tempdir;

    #[test]
    fn runner_executes_workflow_on_synthetic_logs() {
        let dir = tempdir().unwrap();
        let generator = GeneratorConfig {
            targets: 4,
            notch_targets: 1,
            dropout: 0.0,
            ..Default::default()
        };
        let (tracks, detections) = build_scenario(&generator)
            .unwrap()
            .write_to(dir.path())
            .unwrap();

        let cfg = WorkflowConfig::from_args(Some(tracks), Some(detections), None);
        let result = Runner::new(cfg).execute().unwrap();

        assert_eq!(result.variant, LogVariant::Full);
        assert_eq!(result.output.registry.track_count(), 4);
        assert_eq!(result.output.registry.scan_summary().len(), generator.scans);
        assert_eq!(result.analysis.reports.len(), 4);
        assert_eq!(result.analysis.count(ContinuityOutcome::Continuous), 4);
        let in_notch = result
            .analysis
            .reports
            .iter()
            .filter(|r| r.entered_notch)
            .count();
        assert_eq!(in_notch, 1);
    }

    #[test]
    fn runner_tolerates_missing_logs() {
        let dir = tempdir().unwrap();
        let cfg = WorkflowConfig::from_args(
            Some(dir.path().join("ADR_quick_trk.txt")),
            Some(dir.path().join("ADR_quick_det.txt")),
            None,
        );
        let result = Runner::new(cfg).execute().unwrap();
        assert_eq!(result.variant, LogVariant::Quick);
        assert!(result.output.is_empty());
        assert!(result.analysis.reports.is_empty());
    }

    #[test]
    fn runner_rejects_bad_scan_rate() {
        let mut cfg = WorkflowConfig::default();
        cfg.notch.scan_rate_hz = -1.0;
        assert!(Runner::new(cfg).execute().is_err());
    }
}
