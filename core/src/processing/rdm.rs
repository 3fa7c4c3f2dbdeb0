use crate::log_interface::{Detection, LogEvent};
use crate::prelude::{LogFold, RadarParameters};
use ndarray::{Array2, ArrayView2};
use serde::{Deserialize, Serialize};

/// Strongest cell reported by [`RangeDopplerMap::top_peaks`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RdmPeak {
    pub range_bin: usize,
    pub doppler_bin: usize,
    /// Doppler bin with the upper half folded to negative values.
    pub signed_doppler: i64,
    pub magnitude: i64,
}

/// Max-hold range-Doppler grid indexed `[doppler][range]`.
#[derive(Debug, Clone, PartialEq)]
pub struct RangeDopplerMap {
    grid: Array2<i64>,
}

impl RangeDopplerMap {
    pub fn new(range_bins: usize, doppler_bins: usize) -> Self {
        Self {
            grid: Array2::zeros((doppler_bins, range_bins)),
        }
    }

    pub fn range_bins(&self) -> usize {
        self.grid.ncols()
    }

    pub fn doppler_bins(&self) -> usize {
        self.grid.nrows()
    }

    pub fn grid(&self) -> ArrayView2<'_, i64> {
        self.grid.view()
    }

    pub fn get(&self, range_bin: usize, doppler_bin: usize) -> Option<i64> {
        self.grid.get((doppler_bin, range_bin)).copied()
    }

    /// Folds one detection into its cell, keeping the larger magnitude.
    ///
    /// Returns `false` when the coordinates fall outside the grid.
    pub fn accumulate(&mut self, detection: &Detection) -> bool {
        let (Ok(range), Ok(doppler)) = (
            usize::try_from(detection.range_bin),
            usize::try_from(detection.doppler_bin),
        ) else {
            return false;
        };
        match self.grid.get_mut((doppler, range)) {
            Some(cell) => {
                *cell = (*cell).max(detection.magnitude);
                true
            }
            None => false,
        }
    }

    pub fn max(&self) -> i64 {
        self.grid.iter().copied().max().unwrap_or(0)
    }

    pub fn nonzero_count(&self) -> usize {
        self.grid.iter().filter(|&&v| v != 0).count()
    }

    /// Up to `count` non-zero cells, strongest first.
    pub fn top_peaks(&self, count: usize) -> Vec<RdmPeak> {
        let half = (self.doppler_bins() / 2) as i64;
        let doppler_bins = self.doppler_bins() as i64;
        let mut peaks: Vec<RdmPeak> = self
            .grid
            .indexed_iter()
            .filter(|(_, magnitude)| **magnitude > 0)
            .map(|((doppler, range), &magnitude)| {
                let d = doppler as i64;
                RdmPeak {
                    range_bin: range,
                    doppler_bin: doppler,
                    signed_doppler: if d < half { d } else { d - doppler_bins },
                    magnitude,
                }
            })
            .collect();
        peaks.sort_by(|a, b| b.magnitude.cmp(&a.magnitude));
        peaks.truncate(count);
        peaks
    }
}

/// Collects the detection log into an aggregate map plus the flat row list.
#[derive(Debug, Clone)]
pub struct RdmBuilder {
    detections: Vec<Detection>,
    aggregate: RangeDopplerMap,
    dropped: usize,
}

impl RdmBuilder {
    pub fn new(params: &RadarParameters) -> Self {
        Self {
            detections: Vec::new(),
            aggregate: RangeDopplerMap::new(params.range_bins, params.doppler_bins),
            dropped: 0,
        }
    }

    /// Every parsed row in log order, including out-of-grid ones.
    pub fn detections(&self) -> &[Detection] {
        &self.detections
    }

    /// Rows whose coordinates fell outside the grid.
    pub fn dropped(&self) -> usize {
        self.dropped
    }

    pub fn aggregate(&self) -> &RangeDopplerMap {
        &self.aggregate
    }

    /// Full max-hold map, or an approximate single-scan map.
    ///
    /// Detection rows carry no scan tag, so scan `k` is approximated by row
    /// chunk `k` of `N_RANGE * N_DOPPLER` rows. Chunks past the end are empty.
    pub fn map(&self, scan: Option<usize>) -> RangeDopplerMap {
        match scan {
            None => self.aggregate.clone(),
            Some(scan) => self.approximate_scan_map(scan),
        }
    }

    fn approximate_scan_map(&self, scan: usize) -> RangeDopplerMap {
        let rows_per_scan = self.aggregate.range_bins() * self.aggregate.doppler_bins();
        let len = self.detections.len();
        let start = scan.saturating_mul(rows_per_scan).min(len);
        let end = start.saturating_add(rows_per_scan).min(len);

        let mut map = RangeDopplerMap::new(
            self.aggregate.range_bins(),
            self.aggregate.doppler_bins(),
        );
        for detection in &self.detections[start..end] {
            map.accumulate(detection);
        }
        map
    }
}

impl LogFold for RdmBuilder {
    fn apply(mut self, event: &LogEvent) -> Self {
        if let LogEvent::Detection(detection) = event {
            self.detections.push(*detection);
            if !self.aggregate.accumulate(detection) {
                self.dropped += 1;
            }
        }
        self
    }
}
