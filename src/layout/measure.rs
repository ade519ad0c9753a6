//! Per-measure snapshots: which notes of each track fall in a measure, and
//! whether two measures are structurally identical.

use crate::model::{NoteSource, SequenceSource};
use super::constants::INSTANT_HIT_DIVISOR;

/// Inclusive range of note indices inside one track.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NoteRange {
    pub first: usize,
    pub last: usize,
}

impl NoteRange {
    pub fn count(&self) -> usize {
        self.last - self.first + 1
    }

    pub fn indices(&self) -> std::ops::RangeInclusive<usize> {
        self.first..=self.last
    }
}

/// Ties a measure to one track: the notes of that track starting in the measure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackRef {
    pub track_index: usize,
    /// `None` when no note of the track starts in this measure
    pub notes: Option<NoteRange>,
    /// A note started before the measure and is still sounding at its first tick
    pub held_into: bool,
    /// Latest end tick among the notes started before this measure
    pub held_until: i64,
    /// Note index the scan of this measure started from
    pub scan_from: usize,
}

impl TrackRef {
    pub fn note_count(&self) -> usize {
        self.notes.map_or(0, |r| r.count())
    }
}

/// Where a track's forward scan stands between two measures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrackCursor {
    /// First note the next measure looks at
    pub next_note: usize,
    /// Latest end tick of every note scanned so far
    pub furthest_end: i64,
}

impl Default for TrackCursor {
    fn default() -> Self {
        Self {
            next_note: 0,
            furthest_end: i64::MIN,
        }
    }
}

/// One measure of the piece, seen across every track being laid out.
#[derive(Debug, Clone)]
pub struct MeasureSnapshot {
    pub measure_id: usize,
    pub first_tick: i64,
    /// Exclusive end of the measure
    pub last_tick: i64,
    pub track_refs: Vec<TrackRef>,
    /// Shortest note that is neither degenerate nor an instant hit
    pub shortest_duration: Option<i64>,
    /// Earliest prior measure this one is identical to
    pub first_similar_measure: Option<usize>,
    /// Later measures whose `first_similar_measure` is this one, ascending
    pub similar_measures_found_later: Vec<usize>,
    /// Anchors a "play N times" fold and must be drawn apart
    pub cut_apart: bool,
}

impl MeasureSnapshot {
    pub fn new(measure_id: usize, source: &dyn SequenceSource) -> Self {
        Self {
            measure_id,
            first_tick: source.first_tick_in_measure(measure_id),
            last_tick: source.last_tick_in_measure(measure_id),
            track_refs: Vec::new(),
            shortest_duration: None,
            first_similar_measure: None,
            similar_measures_found_later: Vec::new(),
            cut_apart: false,
        }
    }

    pub fn length_in_ticks(&self) -> i64 {
        self.last_tick - self.first_tick
    }

    /// True when no track has a usable note in this measure.
    pub fn is_empty(&self) -> bool {
        self.shortest_duration.is_none()
    }

    /// True when some track has a note crossing into this measure from before it.
    pub fn is_held_into(&self) -> bool {
        self.track_refs.iter().any(|r| r.held_into)
    }

    pub fn total_note_count(&self) -> usize {
        self.track_refs.iter().map(TrackRef::note_count).sum()
    }

    /// Find the notes of `track` that start in this measure, scanning forward
    /// from the cursor, and record them as a new track reference.
    ///
    /// The cursor moves to the note the next measure should resume from. A
    /// note still sounding at the end of the measure stays under the cursor,
    /// so the cursor never runs past a held note. Notes left behind are
    /// remembered through `furthest_end`, which makes held-note detection
    /// constant time per measure.
    pub fn add_track_reference(
        &mut self,
        cursor: &mut TrackCursor,
        track_index: usize,
        track: &dyn NoteSource,
    ) {
        let scan_from = cursor.next_note;
        let instant_hit_limit = self.length_in_ticks() / INSTANT_HIT_DIVISOR;

        let mut first_note: Option<usize> = None;
        let mut last_note: Option<usize> = None;
        let (mut last_start, mut last_end) = (i64::MIN, i64::MIN);
        let mut held_until = cursor.furthest_end;
        let mut furthest_end = cursor.furthest_end;

        for note in scan_from..track.note_count() {
            let start_tick = track.note_start_tick(note);
            let end_tick = track.note_end_tick(note);

            if start_tick >= self.last_tick {
                break;
            }
            furthest_end = furthest_end.max(end_tick);
            if start_tick < self.first_tick {
                held_until = held_until.max(end_tick);
                continue;
            }

            first_note.get_or_insert(note);

            // latest note wins; ties on start go to the one ending last
            if last_note.is_none()
                || start_tick > last_start
                || (start_tick == last_start && end_tick >= last_end)
            {
                last_note = Some(note);
                last_start = start_tick;
                last_end = end_tick;
            }

            let duration = end_tick - start_tick;
            if duration <= 0 || duration < instant_hit_limit {
                continue;
            }
            if self.shortest_duration.map_or(true, |s| duration < s) {
                self.shortest_duration = Some(duration);
            }
        }

        let notes = match (first_note, last_note) {
            (Some(first), Some(last)) => Some(NoteRange { first, last }),
            _ => None,
        };
        self.track_refs.push(TrackRef {
            track_index,
            notes,
            held_into: held_until > self.first_tick,
            held_until,
            scan_from,
        });

        cursor.furthest_end = furthest_end;
        cursor.next_note = match notes {
            None => scan_from,
            Some(range) if last_end > self.last_tick => range.last,
            Some(range) => range.last + 1,
        };
    }

    /// Whether `other` holds exactly the same notes, relative to each
    /// measure's first tick, in every track.
    ///
    /// An empty track only disqualifies a match when a single track is laid
    /// out; measures with no notes at all never match anything.
    pub fn is_same_as(&self, other: &MeasureSnapshot, source: &dyn SequenceSource) -> bool {
        debug_assert_eq!(self.track_refs.len(), other.track_refs.len());

        let multi_track = self.track_refs.len() > 1;
        let mut total_notes = 0;

        for (mine, theirs) in self.track_refs.iter().zip(&other.track_refs) {
            debug_assert_eq!(mine.track_index, theirs.track_index);

            let count = mine.note_count();
            if count != theirs.note_count() {
                return false;
            }
            if count == 0 {
                if multi_track {
                    continue;
                }
                return false;
            }
            total_notes += count;

            let (Some(my_range), Some(their_range)) = (mine.notes, theirs.notes) else {
                return false;
            };
            let track = source.track(mine.track_index);
            let mut matched = vec![false; count];

            for my_note in my_range.indices() {
                let rel_start = track.note_start_tick(my_note) - self.first_tick;
                let rel_end = track.note_end_tick(my_note) - self.first_tick;
                let pitch = track.note_pitch(my_note);

                let partner = their_range.indices().enumerate().find(|&(slot, their_note)| {
                    !matched[slot]
                        && track.note_start_tick(their_note) - other.first_tick == rel_start
                        && track.note_end_tick(their_note) - other.first_tick == rel_end
                        && track.note_pitch(their_note) == pitch
                });

                match partner {
                    Some((slot, _)) => matched[slot] = true,
                    None => return false,
                }
            }
        }

        total_notes > 0
    }
}
