use crate::log_interface::{detection_events, track_events};
use crate::prelude::{CoreResult, LogFold, RadarParameters};
use crate::processing::rdm::RdmBuilder;
use crate::processing::registry::TrackRegistry;
use crate::telemetry::log::LogManager;
use crate::telemetry::metrics::ParseMetrics;
use std::fs;
use std::io::ErrorKind;
use std::path::Path;

/// Entities built from one pair of logs.
#[derive(Debug, Clone)]
pub struct PipelineOutput {
    pub registry: TrackRegistry,
    pub rdm: RdmBuilder,
    pub track_metrics: ParseMetrics,
    pub detection_metrics: ParseMetrics,
}

impl PipelineOutput {
    pub fn is_empty(&self) -> bool {
        self.registry.is_empty() && self.rdm.detections().is_empty()
    }

    pub fn metrics(&self) -> ParseMetrics {
        let mut total = self.track_metrics;
        total += self.detection_metrics;
        total
    }
}

/// Single-pass parse of the track and detection logs.
pub struct Pipeline {
    params: RadarParameters,
    logger: LogManager,
}

impl Pipeline {
    pub fn new(params: RadarParameters) -> CoreResult<Self> {
        params.validate()?;
        Ok(Self {
            params,
            logger: LogManager::new("pipeline"),
        })
    }

    pub fn params(&self) -> &RadarParameters {
        &self.params
    }

    pub fn run_text(&self, track_log: &str, detection_log: &str) -> PipelineOutput {
        let mut tracks = track_events(track_log);
        let registry = TrackRegistry::from_events(tracks.by_ref());

        let mut detections = detection_events(detection_log);
        let rdm = RdmBuilder::new(&self.params).fold_events(detections.by_ref());

        self.logger.record(&format!(
            "{} tracks over {} scans, {} detections ({} outside grid)",
            registry.track_count(),
            registry.scan_summary().len(),
            rdm.detections().len(),
            rdm.dropped()
        ));

        PipelineOutput {
            registry,
            rdm,
            track_metrics: *tracks.metrics(),
            detection_metrics: *detections.metrics(),
        }
    }

    /// Runs over log files; an absent or missing file contributes nothing.
    pub fn run_files(
        &self,
        track_path: Option<&Path>,
        detection_path: Option<&Path>,
    ) -> CoreResult<PipelineOutput> {
        let track_log = self.read_log(track_path)?;
        let detection_log = self.read_log(detection_path)?;
        Ok(self.run_text(&track_log, &detection_log))
    }

    fn read_log(&self, path: Option<&Path>) -> CoreResult<String> {
        let Some(path) = path else {
            return Ok(String::new());
        };
        match fs::read(path) {
            Ok(bytes) => Ok(String::from_utf8_lossy(&bytes).into_owned()),
            Err(err) if err.kind() == ErrorKind::NotFound => {
                self.logger
                    .warn(&format!("log {} not found, treating as empty", path.display()));
                Ok(String::new())
            }
            Err(err) => Err(err.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prelude::LogVariant;
    use std::io::Write;
    use tempfile::{tempdir, NamedTempFile};

    const TRACKS: &str = "TRK 1 R=400 D=68 Q=10\nSCAN_END S=1\nTRK 1 R=404 D=70 Q=9\nSCAN_END S=1\n";
    const DETECTIONS: &str = "100 5 50\n100 5 30\n2000 5 9\n";

    #[test]
    fn text_run_builds_all_entities() {
        let pipeline = Pipeline::new(RadarParameters::default()).unwrap();
        let output = pipeline.run_text(TRACKS, DETECTIONS);
        assert_eq!(output.registry.track(1).unwrap().range_bins(), vec![400, 404]);
        assert_eq!(output.registry.scan_summary(), &[1, 1]);
        assert_eq!(output.rdm.aggregate().get(100, 5), Some(50));
        assert_eq!(output.rdm.dropped(), 1);
        assert_eq!(output.metrics().events, 7);
    }

    #[test]
    fn missing_files_give_empty_output() {
        let dir = tempdir().unwrap();
        let pipeline = Pipeline::new(RadarParameters::for_variant(LogVariant::Quick)).unwrap();
        let track_path = dir.path().join("ADR_quick_trk.txt");
        let detection_path = dir.path().join("ADR_quick_det.txt");
        let output = pipeline
            .run_files(Some(track_path.as_path()), Some(detection_path.as_path()))
            .unwrap();
        assert!(output.is_empty());
        assert_eq!(output.rdm.aggregate().range_bins(), 128);

        let output = pipeline.run_files(None, None).unwrap();
        assert!(output.is_empty());
    }

    #[test]
    fn file_run_matches_text_run() {
        let mut tracks = NamedTempFile::new().unwrap();
        tracks.write_all(TRACKS.as_bytes()).unwrap();
        let mut detections = NamedTempFile::new().unwrap();
        detections.write_all(DETECTIONS.as_bytes()).unwrap();

        let pipeline = Pipeline::new(RadarParameters::default()).unwrap();
        let from_files = pipeline
            .run_files(Some(tracks.path()), Some(detections.path()))
            .unwrap();
        let from_text = pipeline.run_text(TRACKS, DETECTIONS);
        assert_eq!(from_files.registry, from_text.registry);
        assert_eq!(from_files.rdm.aggregate(), from_text.rdm.aggregate());
    }
}
