//! Per-notation renderers as seen by the layout engine.
//!
//! The engine never draws anything. It only asks each track's renderer
//! where in a measure it would draw symbols, and how tall a line of its
//! track would be. One renderer is supplied per laid-out track.

pub mod silence;
pub mod staff;
pub mod tablature;

use crate::layout::{LineTrackView, MeasureSnapshot, TickCollector};
use crate::model::{NoteSource, Notation};

pub use staff::StaffRenderer;
pub use tablature::TablatureRenderer;

// ── Symbol weights ──────────────────────────────────────────────────
/// Tablature frets take two characters
pub(crate) const TAB_NOTE_WEIGHT: f32 = 2.0;
pub(crate) const STAFF_NOTE_WEIGHT: f32 = 1.0;
pub(crate) const SILENCE_WEIGHT: f32 = 1.0;
/// Tie continuation of a note held across the bar line
pub(crate) const HELD_NOTE_WEIGHT: f32 = 1.0;

/// Measures and sizes the symbols of one notation type.
pub trait NotationRenderer {
    /// Report every tick of `measure` at which this track draws a symbol.
    /// `track_index` is the position of the track among the laid-out tracks.
    fn add_used_ticks(
        &self,
        measure: &MeasureSnapshot,
        track_index: usize,
        track: &dyn NoteSource,
        ticks: &mut TickCollector,
    );

    /// Height, in abstract units, this track needs on a line.
    fn content_height(&self, view: &LineTrackView, track: &dyn NoteSource) -> u32;
}

/// The renderer that prints tracks in `notation`.
pub fn renderer_for(notation: &Notation) -> Box<dyn NotationRenderer> {
    match *notation {
        Notation::Staff { treble, bass } => Box::new(StaffRenderer::new(treble, bass)),
        Notation::Tablature { string_count } => Box::new(TablatureRenderer::new(string_count)),
    }
}

/// Report the continuation of a note held into `measure`, the onsets of the
/// track's notes in it, then its silences.
pub(crate) fn add_notes_and_silences(
    measure: &MeasureSnapshot,
    track_index: usize,
    track: &dyn NoteSource,
    note_weight: f32,
    ticks: &mut TickCollector,
) {
    let Some(track_ref) = measure.track_refs.get(track_index) else {
        return;
    };

    if track_ref.held_into {
        ticks.add_symbol(measure.first_tick, HELD_NOTE_WEIGHT, track_index);
    }
    if let Some(range) = track_ref.notes {
        for note in range.indices() {
            ticks.add_symbol(track.note_start_tick(note), note_weight, track_index);
        }
    }

    let silent_from = measure.first_tick.max(track_ref.held_until);
    let silences =
        silence::find_silences(track, track_ref.scan_from, silent_from, measure.last_tick);
    for silence in silences {
        ticks.add_symbol(silence.from_tick, SILENCE_WEIGHT, track_index);
    }
}
