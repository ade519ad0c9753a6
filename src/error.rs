//! Error types for a layout run.
//!
//! A layout run is a pure computation over data that is already in memory,
//! so the only failures are malformed input (a bug in whatever produced the
//! tracks) and bad configuration. Either one aborts the whole run.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum LayoutError {
    /// Notes of a track must be kept in ascending start-tick order.
    #[error("track {track}: note {note} starts before the note preceding it")]
    UnsortedNotes { track: usize, note: usize },

    /// A measure whose tick span is empty or runs backwards.
    #[error("measure {measure} has an invalid tick span ({first_tick}..{last_tick})")]
    InvalidMeasure {
        measure: usize,
        first_tick: i64,
        last_tick: i64,
    },

    /// A measure boundary or note tick too large to lay out.
    #[error("{location}: tick {tick} is out of range")]
    TickOutOfRange { location: String, tick: i64 },

    /// One notation renderer is required per laid-out track.
    #[error("{renderers} notation renderer(s) supplied for {tracks} track(s)")]
    RendererCountMismatch { tracks: usize, renderers: usize },

    #[error("invalid layout configuration: {0}")]
    InvalidConfig(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
