//! Repetition detection: links every measure to the earliest identical
//! measure before it, then finds repeated riffs along those links.

use log::{debug, trace};

use crate::model::SequenceSource;
use super::measure::MeasureSnapshot;

/// A run of measures that repeats an earlier run of the same length.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RiffMatch {
    pub first_repeating: usize,
    pub last_repeating: usize,
    pub first_repeated: usize,
    pub last_repeated: usize,
}

impl RiffMatch {
    /// Number of measures in the repeating run.
    pub fn length(&self) -> usize {
        self.last_repeating - self.first_repeating + 1
    }
}

/// Fill `first_similar_measure` and `similar_measures_found_later` for every
/// measure. The earliest identical measure wins.
pub fn find_similar_measures(measures: &mut [MeasureSnapshot], source: &dyn SequenceSource) {
    let mut links = 0;

    for i in 1..measures.len() {
        let (earlier, rest) = measures.split_at_mut(i);
        let current = &mut rest[0];

        if let Some(j) = earlier.iter().position(|m| current.is_same_as(m, source)) {
            current.first_similar_measure = Some(j);
            earlier[j].similar_measures_found_later.push(i);
            links += 1;
            trace!("measure {} is the same as measure {}", i, j);
        }
    }

    debug!(
        "repetition scan: {} of {} measures repeat an earlier one",
        links,
        measures.len()
    );
}

/// Whether measures `a` and `b` show the same material, either because both
/// point to the same first occurrence or because one is the other's.
fn same_material(measures: &[MeasureSnapshot], a: usize, b: usize) -> bool {
    let sim_a = measures[a].first_similar_measure;
    let sim_b = measures[b].first_similar_measure;
    (sim_a.is_some() && sim_a == sim_b) || sim_b == Some(a) || sim_a == Some(b)
}

/// Find the repeated riff that starts at `id`.
///
/// First follows the chain from the first occurrence of `id`'s material: if
/// `id + 1` repeats the measure right after that first occurrence, the riff
/// extends as long as that stays true. Otherwise every later occurrence of
/// the same material is tried as the start of the repeated run, keeping the
/// longest run of at least `minimum_length` measures.
pub fn find_consecutive_repetition(
    measures: &[MeasureSnapshot],
    id: usize,
    minimum_length: usize,
) -> Option<RiffMatch> {
    let first = measures.get(id)?.first_similar_measure?;
    let count = measures.len();

    if id + 1 < count && measures[id + 1].first_similar_measure == Some(first + 1) {
        let mut length = 1;
        while id + length < count
            && measures[id + length].first_similar_measure == Some(first + length)
        {
            length += 1;
        }
        return Some(RiffMatch {
            first_repeating: id,
            last_repeating: id + length - 1,
            first_repeated: first,
            last_repeated: first + length - 1,
        });
    }

    let mut best: Option<RiffMatch> = None;
    for &check_from in &measures[first].similar_measures_found_later {
        if check_from >= id {
            break;
        }

        let mut length = 0;
        while check_from + length < id
            && id + length < count
            && same_material(measures, check_from + length, id + length)
        {
            length += 1;
        }

        if length < minimum_length.max(1) {
            continue;
        }
        if best.map_or(true, |b| length > b.length()) {
            best = Some(RiffMatch {
                first_repeating: id,
                last_repeating: id + length - 1,
                first_repeated: check_from,
                last_repeated: check_from + length - 1,
            });
        }
    }

    best
}
