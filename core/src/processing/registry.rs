use crate::log_interface::LogEvent;
use crate::prelude::LogFold;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One `TRK` line of a track, tagged with the scan it was read in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackSample {
    /// Raw range field, Q2-scaled for the quick variant.
    pub range_bin: i64,
    /// Raw Doppler field, Q2-scaled for the quick variant.
    pub doppler_bin: i64,
    pub velocity: Option<i64>,
    pub quality: u32,
    pub scan_index: usize,
}

/// Time-ordered history of one tracker object.
///
/// Samples are stored as whole records, so every per-field view has the same
/// length as the sample list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Track {
    id: u32,
    samples: Vec<TrackSample>,
}

impl Track {
    pub fn new(id: u32) -> Self {
        Self {
            id,
            samples: Vec::new(),
        }
    }

    pub fn id(&self) -> u32 {
        self.id
    }

    pub fn samples(&self) -> &[TrackSample] {
        &self.samples
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn first(&self) -> Option<&TrackSample> {
        self.samples.first()
    }

    pub fn last(&self) -> Option<&TrackSample> {
        self.samples.last()
    }

    pub fn range_bins(&self) -> Vec<i64> {
        self.samples.iter().map(|s| s.range_bin).collect()
    }

    pub fn doppler_bins(&self) -> Vec<i64> {
        self.samples.iter().map(|s| s.doppler_bin).collect()
    }

    pub fn velocities(&self) -> Vec<Option<i64>> {
        self.samples.iter().map(|s| s.velocity).collect()
    }

    pub fn qualities(&self) -> Vec<u32> {
        self.samples.iter().map(|s| s.quality).collect()
    }

    pub fn scans(&self) -> Vec<usize> {
        self.samples.iter().map(|s| s.scan_index).collect()
    }

    fn push(&mut self, sample: TrackSample) {
        self.samples.push(sample);
    }
}

/// Tracks, scan summary and scan counter accumulated over one track log.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackRegistry {
    tracks: BTreeMap<u32, Track>,
    scan_summary: Vec<usize>,
    scan_index: usize,
}

impl TrackRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_events<I>(events: I) -> Self
    where
        I: IntoIterator<Item = LogEvent>,
    {
        Self::new().fold_events(events)
    }

    pub fn track(&self, id: u32) -> Option<&Track> {
        self.tracks.get(&id)
    }

    /// Tracks in ascending id order.
    pub fn tracks(&self) -> impl Iterator<Item = &Track> {
        self.tracks.values()
    }

    pub fn track_count(&self) -> usize {
        self.tracks.len()
    }

    /// Active-track count reported at each `SCAN_END`.
    pub fn scan_summary(&self) -> &[usize] {
        &self.scan_summary
    }

    /// Index the next `TRK` line will be tagged with.
    pub fn scan_index(&self) -> usize {
        self.scan_index
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty() && self.scan_summary.is_empty()
    }
}

impl LogFold for TrackRegistry {
    fn apply(mut self, event: &LogEvent) -> Self {
        match event {
            LogEvent::TrackUpdate(update) => {
                let sample = TrackSample {
                    range_bin: update.range_bin,
                    doppler_bin: update.doppler_bin,
                    velocity: update.velocity(),
                    quality: update.quality,
                    scan_index: self.scan_index,
                };
                self.tracks
                    .entry(update.id)
                    .or_insert_with(|| Track::new(update.id))
                    .push(sample);
            }
            LogEvent::ScanEnd { active } => {
                self.scan_summary.push(*active);
                self.scan_index += 1;
            }
            LogEvent::Detection(_) => {}
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::log_interface::track_events;

    fn registry(text: &str) -> TrackRegistry {
        TrackRegistry::from_events(track_events(text))
    }

    #[test]
    fn samples_are_tagged_with_current_scan() {
        let reg = registry("TRK 1 R=400 D=68 Q=10\nSCAN_END S=1\nTRK 1 R=404 D=70 Q=9\n");
        let track = reg.track(1).unwrap();
        assert_eq!(track.len(), 2);
        assert_eq!(track.range_bins(), vec![400, 404]);
        assert_eq!(track.doppler_bins(), vec![68, 70]);
        assert_eq!(track.qualities(), vec![10, 9]);
        assert_eq!(track.scans(), vec![0, 1]);
    }

    #[test]
    fn scan_end_appends_summary_and_advances_index() {
        let reg = registry("SCAN_END S=6\nSCAN_END S=4\n");
        assert_eq!(reg.scan_summary(), &[6, 4]);
        assert_eq!(reg.scan_index(), 2);
        assert_eq!(reg.track_count(), 0);
    }

    #[test]
    fn long_form_keeps_velocity() {
        let reg = registry("TRK 5 R=10 D=20 VR=-3 Q=2 S=1\nTRK 5 R=11 D=21 Q=2\n");
        assert_eq!(reg.track(5).unwrap().velocities(), vec![Some(-3), None]);
    }

    #[test]
    fn per_field_views_stay_aligned_after_every_step() {
        let text = "TRK 1 R=1 D=1 Q=1\nTRK 2 R=2 D=2\nbad line\nSCAN_END S=2\nTRK 1 R=x D=1 Q=1\nTRK 2 R=3 D=3 VR=4 Q=5\n";
        let mut reg = TrackRegistry::new();
        for event in track_events(text) {
            reg = reg.apply(&event);
            for track in reg.tracks() {
                let n = track.len();
                assert_eq!(track.range_bins().len(), n);
                assert_eq!(track.doppler_bins().len(), n);
                assert_eq!(track.qualities().len(), n);
                assert_eq!(track.scans().len(), n);
            }
        }
        assert_eq!(reg.track(1).unwrap().len(), 1);
        assert_eq!(reg.track(2).unwrap().scans(), vec![0, 1]);
    }

    #[test]
    fn parsing_twice_is_identical() {
        let text = "TRK 3 R=9 D=8 Q=7\nSCAN_END S=1\nTRK 4 R=1 D=2 Q=3\nSCAN_END S=2\n";
        assert_eq!(registry(text), registry(text));
    }

    #[test]
    fn tracks_iterate_in_id_order() {
        let reg = registry("TRK 9 R=1 D=1 Q=1\nTRK 2 R=1 D=1 Q=1\n");
        let ids: Vec<u32> = reg.tracks().map(Track::id).collect();
        assert_eq!(ids, vec![2, 9]);
    }
}
