//! Data model consumed by the layout engine.
//!
//! The engine only ever reads its input through the [`SequenceSource`] and
//! [`NoteSource`] traits, so any sequencer model can be laid out without
//! copying. [`Piece`] is the in-memory implementation used by the JSON/FFI
//! entry points and by the tests.

use serde::{Deserialize, Serialize};

// ═══════════════════════════════════════════════════════════════════════
// Read-only data source seam
// ═══════════════════════════════════════════════════════════════════════

/// The notes of one track, iterated in ascending start-tick order.
pub trait NoteSource {
    fn note_count(&self) -> usize;
    fn note_start_tick(&self, note: usize) -> i64;
    fn note_end_tick(&self, note: usize) -> i64;
    fn note_pitch(&self, note: usize) -> i32;
    fn note_selected(&self, _note: usize) -> bool {
        false
    }
}

/// The measure timeline plus the tracks being laid out.
///
/// `last_tick_in_measure` is exclusive: it is the first tick of the next measure.
pub trait SequenceSource {
    fn measure_count(&self) -> usize;
    fn first_tick_in_measure(&self, measure: usize) -> i64;
    fn last_tick_in_measure(&self, measure: usize) -> i64;
    fn time_sig_numerator(&self, measure: usize) -> i32;
    fn time_sig_denominator(&self, measure: usize) -> i32;
    fn track_count(&self) -> usize;
    fn track(&self, index: usize) -> &dyn NoteSource;
}

// ═══════════════════════════════════════════════════════════════════════
// In-memory model
// ═══════════════════════════════════════════════════════════════════════

/// A multi-track piece with an explicit measure timeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Piece {
    /// Title of the piece
    #[serde(default)]
    pub title: Option<String>,
    /// Timeline resolution (pulses per quarter note)
    pub ticks_per_beat: i64,
    /// Measures in timeline order
    #[serde(default)]
    pub measures: Vec<MeasureInfo>,
    /// Tracks to lay out, top to bottom
    #[serde(default)]
    pub tracks: Vec<Track>,
}

/// Tick span and time signature of one measure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MeasureInfo {
    pub first_tick: i64,
    /// Exclusive end of the measure
    pub last_tick: i64,
    /// Numerator (e.g., 3 in 3/4)
    pub numerator: i32,
    /// Denominator (e.g., 4 in 3/4)
    pub denominator: i32,
}

/// One track of notes together with the notation it is printed in.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Track {
    pub name: String,
    #[serde(default)]
    pub notation: Notation,
    /// Notes sorted by start tick
    #[serde(default)]
    pub notes: Vec<Note>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
    pub start_tick: i64,
    pub end_tick: i64,
    /// MIDI pitch (middle C = 60)
    pub pitch: i32,
    #[serde(default)]
    pub selected: bool,
}

/// How a track is printed. Selects the renderer that measures its symbols.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Notation {
    /// Classical staff notation with a treble and/or bass staff
    Staff { treble: bool, bass: bool },
    /// Guitar-style tablature
    Tablature { string_count: u32 },
}

impl Default for Notation {
    fn default() -> Self {
        Notation::Staff {
            treble: true,
            bass: false,
        }
    }
}

impl Piece {
    /// Create an empty piece at the given resolution.
    pub fn new(ticks_per_beat: i64) -> Self {
        Self {
            title: None,
            ticks_per_beat,
            measures: Vec::new(),
            tracks: Vec::new(),
        }
    }

    /// Length in ticks of one measure in the given time signature.
    pub fn measure_length(&self, numerator: i32, denominator: i32) -> i64 {
        self.ticks_per_beat * 4 * numerator as i64 / denominator.max(1) as i64
    }

    /// Append `count` contiguous measures in the given time signature.
    pub fn add_measures(&mut self, count: usize, numerator: i32, denominator: i32) -> &mut Self {
        let length = self.measure_length(numerator, denominator);
        let mut tick = self.measures.last().map_or(0, |m| m.last_tick);
        for _ in 0..count {
            self.measures.push(MeasureInfo {
                first_tick: tick,
                last_tick: tick + length,
                numerator,
                denominator,
            });
            tick += length;
        }
        self
    }

    /// Append a track and return its index.
    pub fn add_track(&mut self, track: Track) -> usize {
        self.tracks.push(track);
        self.tracks.len() - 1
    }

    /// Parse a piece from its JSON representation.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

impl Track {
    pub fn new(name: impl Into<String>, notation: Notation) -> Self {
        Self {
            name: name.into(),
            notation,
            notes: Vec::new(),
        }
    }

    /// Append a note. Callers keep notes in ascending start-tick order.
    pub fn add_note(&mut self, start_tick: i64, end_tick: i64, pitch: i32) -> &mut Self {
        self.notes.push(Note::new(start_tick, end_tick, pitch));
        self
    }
}

impl Note {
    pub fn new(start_tick: i64, end_tick: i64, pitch: i32) -> Self {
        Self {
            start_tick,
            end_tick,
            pitch,
            selected: false,
        }
    }
}

impl NoteSource for Track {
    fn note_count(&self) -> usize {
        self.notes.len()
    }
    fn note_start_tick(&self, note: usize) -> i64 {
        self.notes[note].start_tick
    }
    fn note_end_tick(&self, note: usize) -> i64 {
        self.notes[note].end_tick
    }
    fn note_pitch(&self, note: usize) -> i32 {
        self.notes[note].pitch
    }
    fn note_selected(&self, note: usize) -> bool {
        self.notes[note].selected
    }
}

impl SequenceSource for Piece {
    fn measure_count(&self) -> usize {
        self.measures.len()
    }
    fn first_tick_in_measure(&self, measure: usize) -> i64 {
        self.measures[measure].first_tick
    }
    fn last_tick_in_measure(&self, measure: usize) -> i64 {
        self.measures[measure].last_tick
    }
    fn time_sig_numerator(&self, measure: usize) -> i32 {
        self.measures[measure].numerator
    }
    fn time_sig_denominator(&self, measure: usize) -> i32 {
        self.measures[measure].denominator
    }
    fn track_count(&self) -> usize {
        self.tracks.len()
    }
    fn track(&self, index: usize) -> &dyn NoteSource {
        &self.tracks[index]
    }
}
