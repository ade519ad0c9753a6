//! Classical staff notation, with a treble staff, a bass staff, or both.

use crate::layout::{LineTrackView, MeasureSnapshot, TickCollector};
use crate::model::NoteSource;
use super::{add_notes_and_silences, NotationRenderer, STAFF_NOTE_WEIGHT};

// ── Staff geometry (diatonic positions, C4 = 28) ────────────────────
const TREBLE_BOTTOM_LINE: i32 = 4 * 7 + 2; // E4
const TREBLE_TOP_LINE: i32 = 5 * 7 + 3; // F5
const BASS_BOTTOM_LINE: i32 = 2 * 7 + 4; // G2
const BASS_TOP_LINE: i32 = 3 * 7 + 5; // A3
const LEVELS_PER_STAFF: u32 = 5;
/// Space between the two staves of a grand staff, as a fraction of its height
const GRAND_STAFF_GAP_DIVISOR: u32 = 5;

/// Diatonic staff position of a MIDI pitch, sharps drawn on the natural below.
fn staff_position(pitch: i32) -> i32 {
    const STEP_OF_PITCH_CLASS: [i32; 12] = [0, 0, 1, 1, 2, 3, 3, 4, 4, 5, 5, 6];
    let octave = pitch.div_euclid(12) - 1;
    octave * 7 + STEP_OF_PITCH_CLASS[pitch.rem_euclid(12) as usize]
}

/// Ledger lines needed to reach `position` from a staff spanning `bottom..=top`.
fn ledger_lines(position: i32, bottom: i32, top: i32) -> u32 {
    if position > top {
        ((position - top) / 2) as u32
    } else if position < bottom {
        ((bottom - position) / 2) as u32
    } else {
        0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StaffRenderer {
    pub treble: bool,
    pub bass: bool,
}

impl StaffRenderer {
    pub fn new(treble: bool, bass: bool) -> Self {
        Self { treble, bass }
    }

    fn staff_count(&self) -> u32 {
        u32::from(self.treble) + u32::from(self.bass)
    }

    /// Outer lines of the staves: notes between them need no ledger lines.
    fn span(&self) -> Option<(i32, i32)> {
        match (self.treble, self.bass) {
            (true, true) => Some((BASS_BOTTOM_LINE, TREBLE_TOP_LINE)),
            (true, false) => Some((TREBLE_BOTTOM_LINE, TREBLE_TOP_LINE)),
            (false, true) => Some((BASS_BOTTOM_LINE, BASS_TOP_LINE)),
            (false, false) => None,
        }
    }
}

impl NotationRenderer for StaffRenderer {
    fn add_used_ticks(
        &self,
        measure: &MeasureSnapshot,
        track_index: usize,
        track: &dyn NoteSource,
        ticks: &mut TickCollector,
    ) {
        add_notes_and_silences(measure, track_index, track, STAFF_NOTE_WEIGHT, ticks);
    }

    /// Staff lines are drawn even where the track is silent. Ledger lines
    /// are added for the highest and lowest notes on the line.
    fn content_height(&self, view: &LineTrackView, track: &dyn NoteSource) -> u32 {
        let Some((bottom, top)) = self.span() else {
            return 0;
        };

        let (mut above, mut below) = (0, 0);
        for note in view.notes().into_iter().flatten() {
            let position = staff_position(track.note_pitch(note));
            if position > top {
                above = above.max(ledger_lines(position, bottom, top));
            } else if position < bottom {
                below = below.max(ledger_lines(position, bottom, top));
            }
        }

        let height = LEVELS_PER_STAFF * self.staff_count() + above + below;
        if self.treble && self.bass {
            height + height / GRAND_STAFF_GAP_DIVISOR
        } else {
            height
        }
    }
}
