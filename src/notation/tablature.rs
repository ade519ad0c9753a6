//! Guitar-style tablature.

use crate::layout::{LineTrackView, MeasureSnapshot, TickCollector};
use crate::model::NoteSource;
use super::{add_notes_and_silences, NotationRenderer, TAB_NOTE_WEIGHT};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TablatureRenderer {
    pub string_count: u32,
}

impl TablatureRenderer {
    pub fn new(string_count: u32) -> Self {
        Self { string_count }
    }
}

impl NotationRenderer for TablatureRenderer {
    fn add_used_ticks(
        &self,
        measure: &MeasureSnapshot,
        track_index: usize,
        track: &dyn NoteSource,
        ticks: &mut TickCollector,
    ) {
        add_notes_and_silences(measure, track_index, track, TAB_NOTE_WEIGHT, ticks);
    }

    /// One unit per string; a line where the track plays nothing takes no room.
    fn content_height(&self, view: &LineTrackView, _track: &dyn NoteSource) -> u32 {
        if view.is_empty() {
            0
        } else {
            self.string_count
        }
    }
}
