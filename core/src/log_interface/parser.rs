//! Line-level parsing of the tracker and detection logs.
//!
//! Parsing is permissive: unknown lines produce no event and malformed lines
//! are skipped and counted, so one bad row never aborts a pass.

use crate::log_interface::event::{Detection, LogEvent, TrackLayout, TrackUpdate};
use crate::telemetry::metrics::ParseMetrics;
use log::debug;
use std::str::FromStr;

/// Reason a recognized line was rejected.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum LineError {
    #[error("missing field {0}")]
    MissingField(&'static str),
    #[error("invalid value {value:?} for field {field}")]
    InvalidNumber { field: &'static str, value: String },
    #[error("expected 3 integer columns, found {0}")]
    ColumnCount(usize),
}

pub type LineResult = Result<Option<LogEvent>, LineError>;

/// Which of the two log files a line stream comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogKind {
    Tracks,
    Detections,
}

fn parse_number<T: FromStr>(field: &'static str, value: &str) -> Result<T, LineError> {
    value.parse().map_err(|_| LineError::InvalidNumber {
        field,
        value: value.to_string(),
    })
}

/// First occurrence of a key wins.
fn assign<T: FromStr>(
    slot: &mut Option<T>,
    field: &'static str,
    value: &str,
) -> Result<(), LineError> {
    if slot.is_none() {
        *slot = Some(parse_number(field, value)?);
    }
    Ok(())
}

fn parse_trk<'a>(mut tokens: impl Iterator<Item = &'a str>) -> Result<LogEvent, LineError> {
    let id = parse_number("id", tokens.next().ok_or(LineError::MissingField("id"))?)?;

    let mut range = None;
    let mut doppler = None;
    let mut velocity = None;
    let mut quality = None;
    let mut status = None;

    for token in tokens {
        let Some((key, value)) = token.split_once('=') else {
            continue;
        };
        match key {
            "R" => assign(&mut range, "R", value)?,
            "D" => assign(&mut doppler, "D", value)?,
            "VR" => assign(&mut velocity, "VR", value)?,
            "Q" => assign(&mut quality, "Q", value)?,
            "S" => assign(&mut status, "S", value)?,
            _ => {}
        }
    }

    let layout = match velocity {
        Some(velocity) => TrackLayout::Long { velocity, status },
        None => TrackLayout::Short,
    };

    Ok(LogEvent::TrackUpdate(TrackUpdate {
        id,
        range_bin: range.ok_or(LineError::MissingField("R"))?,
        doppler_bin: doppler.ok_or(LineError::MissingField("D"))?,
        quality: quality.unwrap_or(0),
        layout,
    }))
}

fn parse_scan_end<'a>(mut tokens: impl Iterator<Item = &'a str>) -> Result<LogEvent, LineError> {
    let (key, value) = tokens
        .next()
        .and_then(|token| token.split_once('='))
        .ok_or(LineError::MissingField("S"))?;
    if key != "S" && key != "active" {
        return Err(LineError::MissingField("S"));
    }
    Ok(LogEvent::ScanEnd {
        active: parse_number("S", value)?,
    })
}

/// Parses one line of the track/scan log.
///
/// Returns `Ok(None)` for blank lines and for any line that is neither a
/// `TRK` nor a `SCAN_END` record.
pub fn parse_track_line(line: &str) -> LineResult {
    let mut tokens = line.split_whitespace();
    match tokens.next() {
        Some("TRK") => parse_trk(tokens).map(Some),
        Some("SCAN_END") => parse_scan_end(tokens).map(Some),
        _ => Ok(None),
    }
}

/// Parses one `range doppler magnitude` row of the detection log.
pub fn parse_detection_line(line: &str) -> LineResult {
    let columns: Vec<&str> = line.split_whitespace().collect();
    match columns.as_slice() {
        [] => Ok(None),
        [range, doppler, magnitude] => Ok(Some(LogEvent::Detection(Detection::new(
            parse_number("range", range)?,
            parse_number("doppler", doppler)?,
            parse_number("magnitude", magnitude)?,
        )))),
        other => Err(LineError::ColumnCount(other.len())),
    }
}

/// Lazy event sequence over the lines of one log.
///
/// Building a new stream over the same lines yields the same events.
pub struct EventStream<I> {
    lines: I,
    kind: LogKind,
    line_number: usize,
    metrics: ParseMetrics,
}

impl<I, S> EventStream<I>
where
    I: Iterator<Item = S>,
    S: AsRef<str>,
{
    pub fn new(lines: I, kind: LogKind) -> Self {
        Self {
            lines,
            kind,
            line_number: 0,
            metrics: ParseMetrics::default(),
        }
    }

    pub fn metrics(&self) -> &ParseMetrics {
        &self.metrics
    }
}

impl<I, S> Iterator for EventStream<I>
where
    I: Iterator<Item = S>,
    S: AsRef<str>,
{
    type Item = LogEvent;

    fn next(&mut self) -> Option<LogEvent> {
        for line in self.lines.by_ref() {
            let line = line.as_ref();
            self.line_number += 1;
            self.metrics.record_line();

            let parsed = match self.kind {
                LogKind::Tracks => parse_track_line(line),
                LogKind::Detections => parse_detection_line(line),
            };

            match parsed {
                Ok(Some(event)) => {
                    self.metrics.record_event();
                    return Some(event);
                }
                Ok(None) => {
                    if !line.trim().is_empty() {
                        self.metrics.record_ignored();
                    }
                }
                Err(err) => {
                    debug!("skipping line {}: {}", self.line_number, err);
                    self.metrics.record_malformed();
                }
            }
        }
        None
    }
}

pub fn track_events(text: &str) -> EventStream<std::str::Lines<'_>> {
    EventStream::new(text.lines(), LogKind::Tracks)
}

pub fn detection_events(text: &str) -> EventStream<std::str::Lines<'_>> {
    EventStream::new(text.lines(), LogKind::Detections)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn track_update(line: &str) -> TrackUpdate {
        match parse_track_line(line) {
            Ok(Some(LogEvent::TrackUpdate(update))) => update,
            other => panic!("expected track update, got {:?}", other),
        }
    }

    #[test]
    fn short_form_track_line() {
        let update = track_update("TRK 1 R=400 D=68 Q=10");
        assert_eq!(update.id, 1);
        assert_eq!((update.range_bin, update.doppler_bin), (400, 68));
        assert_eq!(update.quality, 10);
        assert_eq!(update.layout, TrackLayout::Short);
        assert_eq!(update.velocity(), None);
    }

    #[test]
    fn long_form_track_line() {
        let update = track_update("TRK 7 R=2048 D=300 VR=-35 Q=12 S=2");
        assert_eq!(update.quality, 12);
        assert_eq!(
            update.layout,
            TrackLayout::Long {
                velocity: -35,
                status: Some(2)
            }
        );
        assert_eq!(update.velocity(), Some(-35));
    }

    #[test]
    fn quality_located_by_key_not_position() {
        let update = track_update("TRK 3 Q=6 D=70 R=404");
        assert_eq!((update.range_bin, update.doppler_bin, update.quality), (404, 70, 6));
    }

    #[test]
    fn missing_quality_defaults_to_zero() {
        assert_eq!(track_update("TRK 2 R=10 D=12").quality, 0);
    }

    #[test]
    fn scan_end_accepts_both_keys() {
        assert_eq!(
            parse_track_line("SCAN_END S=6"),
            Ok(Some(LogEvent::ScanEnd { active: 6 }))
        );
        assert_eq!(
            parse_track_line("SCAN_END active=4"),
            Ok(Some(LogEvent::ScanEnd { active: 4 }))
        );
    }

    #[test]
    fn blank_and_unknown_lines_yield_nothing() {
        assert_eq!(parse_track_line(""), Ok(None));
        assert_eq!(parse_track_line("   \t"), Ok(None));
        assert_eq!(parse_track_line("# scenario start"), Ok(None));
    }

    #[test]
    fn malformed_numbers_are_errors() {
        assert!(matches!(
            parse_track_line("TRK 1 R=abc D=4 Q=1"),
            Err(LineError::InvalidNumber { field: "R", .. })
        ));
        assert_eq!(
            parse_track_line("TRK 1 D=4 Q=1"),
            Err(LineError::MissingField("R"))
        );
        assert!(parse_track_line("TRK 1 R=3 D=4 Q=-1").is_err());
        assert!(parse_track_line("SCAN_END").is_err());
    }

    #[test]
    fn detection_rows_need_three_integers() {
        assert_eq!(
            parse_detection_line("100 5 50"),
            Ok(Some(LogEvent::Detection(Detection::new(100, 5, 50))))
        );
        assert_eq!(parse_detection_line("100 5"), Err(LineError::ColumnCount(2)));
        assert_eq!(parse_detection_line(""), Ok(None));
        assert!(parse_detection_line("100 x 50").is_err());
    }

    #[test]
    fn stream_skips_bad_lines_and_counts_them() {
        let text = "TRK 1 R=400 D=68 Q=10\n\nnoise\nTRK 1 R=bad D=1\nSCAN_END S=1\n";
        let mut stream = track_events(text);
        let events: Vec<LogEvent> = stream.by_ref().collect();
        assert_eq!(events.len(), 2);

        let metrics = stream.metrics();
        assert_eq!(metrics.lines, 5);
        assert_eq!(metrics.events, 2);
        assert_eq!(metrics.ignored, 1);
        assert_eq!(metrics.malformed, 1);
    }

    #[test]
    fn stream_is_restartable() {
        let text = "TRK 1 R=400 D=68 Q=10\nSCAN_END S=1\nTRK 1 R=404 D=70 Q=9\n";
        let first: Vec<LogEvent> = track_events(text).collect();
        let second: Vec<LogEvent> = track_events(text).collect();
        assert_eq!(first, second);
    }
}
