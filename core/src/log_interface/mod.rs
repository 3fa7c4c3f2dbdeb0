pub mod event;
pub mod parser;

pub use event::{Detection, LogEvent, TrackLayout, TrackUpdate};
pub use parser::{
    detection_events, parse_detection_line, parse_track_line, track_events, EventStream,
    LineError, LogKind,
};
