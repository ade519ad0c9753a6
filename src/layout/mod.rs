//! The print layout pipeline.
//!
//! A layout run goes through five stages, each reading the output of the
//! previous ones from the [`LayoutRun`] it is handed:
//!
//! 1. one [`MeasureSnapshot`] per measure, with the notes of every track
//! 2. repetition detection between measures
//! 3. the element sequence (measures, repeat markers, time signatures)
//! 4. proportional spacing and element widths
//! 5. line and page breaking

mod constants;
mod elements;
mod lines;
mod measure;
mod repetition;
mod spacing;

pub use elements::{ElementBounds, ElementKind, LayoutElement};
pub use lines::{LayoutLine, LayoutPage, LineTrackView};
pub use measure::{MeasureSnapshot, NoteRange, TrackCursor, TrackRef};
pub use repetition::{find_consecutive_repetition, RiffMatch};
pub use spacing::{PlacedTick, TickCollector, TickPlacement};

use log::debug;

use crate::config::LayoutConfig;
use crate::error::LayoutError;
use crate::model::SequenceSource;
use crate::notation::NotationRenderer;
use constants::MAX_TICK;

/// Everything one layout run produces. Owned by the caller once the run is
/// complete; nothing is shared between runs.
#[derive(Debug, Clone, Default)]
pub struct LayoutRun {
    pub measures: Vec<MeasureSnapshot>,
    /// Element sequence before line breaking; empty once lines are built
    pub elements: Vec<LayoutElement>,
    /// Tick placement of every measure printed in full, by measure index
    pub placements: Vec<Option<TickPlacement>>,
    pub lines: Vec<LayoutLine>,
    pub pages: Vec<LayoutPage>,
}

impl LayoutRun {
    /// Lines of `page`, in order.
    pub fn page_lines(&self, page: &LayoutPage) -> &[LayoutLine] {
        &self.lines[page.first_line..=page.last_line]
    }

    pub fn placement(&self, measure: usize) -> Option<&TickPlacement> {
        self.placements.get(measure).and_then(Option::as_ref)
    }

    /// All elements of all lines, in order.
    pub fn elements(&self) -> impl Iterator<Item = &LayoutElement> {
        self.lines.iter().flat_map(|line| line.elements.iter())
    }
}

fn check_tick(tick: i64, location: impl FnOnce() -> String) -> Result<(), LayoutError> {
    if (-MAX_TICK..=MAX_TICK).contains(&tick) {
        Ok(())
    } else {
        Err(LayoutError::TickOutOfRange {
            location: location(),
            tick,
        })
    }
}

/// Reject input the pipeline cannot lay out.
fn validate(
    source: &dyn SequenceSource,
    renderers: &[&dyn NotationRenderer],
    config: &LayoutConfig,
) -> Result<(), LayoutError> {
    config.validate()?;

    if renderers.len() != source.track_count() {
        return Err(LayoutError::RendererCountMismatch {
            tracks: source.track_count(),
            renderers: renderers.len(),
        });
    }

    for measure in 0..source.measure_count() {
        let first_tick = source.first_tick_in_measure(measure);
        let last_tick = source.last_tick_in_measure(measure);
        check_tick(first_tick, || format!("measure {measure}"))?;
        check_tick(last_tick, || format!("measure {measure}"))?;
        if last_tick <= first_tick {
            return Err(LayoutError::InvalidMeasure {
                measure,
                first_tick,
                last_tick,
            });
        }
    }

    for track in 0..source.track_count() {
        let notes = source.track(track);
        for note in 0..notes.note_count() {
            check_tick(notes.note_start_tick(note), || format!("track {track} note {note}"))?;
            check_tick(notes.note_end_tick(note), || format!("track {track} note {note}"))?;
            if note > 0 && notes.note_start_tick(note) < notes.note_start_tick(note - 1) {
                return Err(LayoutError::UnsortedNotes { track, note });
            }
        }
    }
    Ok(())
}

/// Build the snapshot of every measure, scanning each track once.
fn generate_measures(run: &mut LayoutRun, source: &dyn SequenceSource) {
    run.measures = (0..source.measure_count())
        .map(|m| MeasureSnapshot::new(m, source))
        .collect();

    for track_index in 0..source.track_count() {
        let track = source.track(track_index);
        let mut cursor = TrackCursor::default();
        for measure in run.measures.iter_mut() {
            measure.add_track_reference(&mut cursor, track_index, track);
        }
    }

    debug!(
        "measures: {} snapshots, {} empty",
        run.measures.len(),
        run.measures.iter().filter(|m| m.is_empty()).count()
    );
}

/// Lay out every track of `source`, each with its own renderer.
///
/// Zero measures or zero tracks is not an error: the run simply has no pages.
pub fn compute_layout(
    source: &dyn SequenceSource,
    renderers: &[&dyn NotationRenderer],
    config: &LayoutConfig,
) -> Result<LayoutRun, LayoutError> {
    validate(source, renderers, config)?;

    let mut run = LayoutRun::default();
    if source.measure_count() == 0 || source.track_count() == 0 {
        debug!("nothing to lay out");
        return Ok(run);
    }

    generate_measures(&mut run, source);
    if config.check_repetitions {
        repetition::find_similar_measures(&mut run.measures, source);
    }
    run.elements = elements::build_elements(&mut run.measures, source, config);
    spacing::assign_widths(&mut run, source, renderers, config);
    lines::break_lines_and_pages(&mut run, source, renderers, config);

    Ok(run)
}
