use serde::{Deserialize, Serialize};
use std::ops::AddAssign;

/// Line accounting for one parse pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParseMetrics {
    pub lines: usize,
    pub events: usize,
    /// Non-empty lines of an unrecognized shape.
    pub ignored: usize,
    /// Recognized lines rejected for bad fields or column counts.
    pub malformed: usize,
}

impl ParseMetrics {
    pub fn record_line(&mut self) {
        self.lines += 1;
    }

    pub fn record_event(&mut self) {
        self.events += 1;
    }

    pub fn record_ignored(&mut self) {
        self.ignored += 1;
    }

    pub fn record_malformed(&mut self) {
        self.malformed += 1;
    }

    pub fn skipped(&self) -> usize {
        self.ignored + self.malformed
    }
}

impl AddAssign for ParseMetrics {
    fn add_assign(&mut self, other: Self) {
        self.lines += other.lines;
        self.events += other.events;
        self.ignored += other.ignored;
        self.malformed += other.malformed;
    }
}
