//! Silence analysis: the parts of a measure where a track plays nothing.

use crate::model::NoteSource;

/// A gap `from_tick..to_tick` with no sounding note.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Silence {
    pub from_tick: i64,
    pub to_tick: i64,
}

impl Silence {
    pub fn duration(&self) -> i64 {
        self.to_tick - self.from_tick
    }
}

/// Find the silences of `track` between `from_tick` (inclusive) and
/// `last_tick` (exclusive), looking at notes from index `from_note` on.
///
/// Notes before `from_note` must all end by `from_tick`; notes after it
/// that were held in from earlier measures count as sounding.
pub fn find_silences(
    track: &dyn NoteSource,
    from_note: usize,
    from_tick: i64,
    last_tick: i64,
) -> Vec<Silence> {
    let mut silences = Vec::new();
    let mut covered_until = from_tick;

    for note in from_note..track.note_count() {
        let start = track.note_start_tick(note);
        if start >= last_tick {
            break;
        }
        let end = track.note_end_tick(note);
        if end <= covered_until {
            continue;
        }
        if start > covered_until {
            silences.push(Silence {
                from_tick: covered_until,
                to_tick: start,
            });
        }
        covered_until = end;
    }

    if covered_until < last_tick {
        silences.push(Silence {
            from_tick: covered_until,
            to_tick: last_tick,
        });
    }
    silences
}
