//! Layout elements and the state machine that turns measures into them.
//!
//! A single cursor walks the measures left to right. Each state handles the
//! measure under the cursor and returns the state for the next step, so the
//! cursor only ever jumps forward by the amount a recognised construct covers.

use log::{debug, trace};
use serde::Serialize;

use crate::config::LayoutConfig;
use crate::model::SequenceSource;
use super::measure::MeasureSnapshot;
use super::repetition::find_consecutive_repetition;

// ═══════════════════════════════════════════════════════════════════════
// Element types
// ═══════════════════════════════════════════════════════════════════════

/// What a layout element shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ElementKind {
    /// A measure printed in full
    SingleMeasure { measure: usize },
    /// A measure with nothing to print
    EmptyMeasure { measure: usize },
    /// "Repeat measure `repeats`" marker standing in for `measure`
    SingleRepeatedMeasure { measure: usize, repeats: usize },
    /// Measures `first_measure..=last_measure` repeat
    /// `first_measure_to_repeat..=last_measure_to_repeat`
    RepeatedRiff {
        first_measure: usize,
        last_measure: usize,
        first_measure_to_repeat: usize,
        last_measure_to_repeat: usize,
    },
    /// "Play N times" marker folding `first_measure..=last_measure`
    PlayManyTimes {
        repeat_count: usize,
        first_measure: usize,
        last_measure: usize,
    },
    /// Clef and key signature opening a line
    LineHeader,
    TimeSignatureChange { numerator: i32, denominator: i32 },
}

/// Horizontal pixel extent assigned by whatever draws the layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ElementBounds {
    pub x_from: i32,
    pub x_to: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LayoutElement {
    #[serde(flatten)]
    pub kind: ElementKind,
    pub width_units: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bounds: Option<ElementBounds>,
}

impl LayoutElement {
    pub fn new(kind: ElementKind, width_units: u32) -> Self {
        Self {
            kind,
            width_units,
            bounds: None,
        }
    }

    /// Measures this element stands for, in order.
    pub fn covered_measures(&self) -> Option<std::ops::RangeInclusive<usize>> {
        match self.kind {
            ElementKind::SingleMeasure { measure }
            | ElementKind::EmptyMeasure { measure }
            | ElementKind::SingleRepeatedMeasure { measure, .. } => Some(measure..=measure),
            ElementKind::RepeatedRiff {
                first_measure,
                last_measure,
                ..
            }
            | ElementKind::PlayManyTimes {
                first_measure,
                last_measure,
                ..
            } => Some(first_measure..=last_measure),
            ElementKind::LineHeader | ElementKind::TimeSignatureChange { .. } => None,
        }
    }

    pub fn set_bounds(&mut self, x_from: i32, x_to: i32) {
        self.bounds = Some(ElementBounds { x_from, x_to });
    }
}

// ═══════════════════════════════════════════════════════════════════════
// Builder state machine
// ═══════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BuilderState {
    /// Decide how to show the measure at the cursor
    ScanningMeasure(usize),
    /// A same-measure run too short to fold: print `next..end` as-is
    InsideRepeatRun { next: usize, end: usize },
    /// A riff too short to fold: print `next..end` as-is
    InsideRiffRun { next: usize, end: usize },
    Done,
}

struct ElementBuilder<'a> {
    measures: &'a mut [MeasureSnapshot],
    source: &'a dyn SequenceSource,
    config: &'a LayoutConfig,
    elements: Vec<LayoutElement>,
    /// Time signature of the last measure an element was emitted for
    time_signature: Option<(i32, i32)>,
}

/// Build the element sequence for a whole piece. Line headers are not
/// included; the line breaker opens every line with one.
pub fn build_elements(
    measures: &mut [MeasureSnapshot],
    source: &dyn SequenceSource,
    config: &LayoutConfig,
) -> Vec<LayoutElement> {
    let mut builder = ElementBuilder {
        measures,
        source,
        config,
        elements: Vec::new(),
        time_signature: None,
    };

    let mut state = if builder.measures.is_empty() {
        BuilderState::Done
    } else {
        BuilderState::ScanningMeasure(0)
    };
    while state != BuilderState::Done {
        state = builder.step(state);
    }

    debug!(
        "element builder: {} elements for {} measures",
        builder.elements.len(),
        builder.measures.len()
    );
    builder.elements
}

impl ElementBuilder<'_> {
    fn step(&mut self, state: BuilderState) -> BuilderState {
        match state {
            BuilderState::ScanningMeasure(measure) => self.scan_measure(measure),
            BuilderState::InsideRepeatRun { next, end } => {
                if next >= end {
                    return self.resume_at(end);
                }
                self.push_plain_measure(next);
                BuilderState::InsideRepeatRun { next: next + 1, end }
            }
            BuilderState::InsideRiffRun { next, end } => {
                if next >= end {
                    return self.resume_at(end);
                }
                self.push_plain_measure(next);
                BuilderState::InsideRiffRun { next: next + 1, end }
            }
            BuilderState::Done => BuilderState::Done,
        }
    }

    fn resume_at(&self, measure: usize) -> BuilderState {
        if measure >= self.measures.len() {
            BuilderState::Done
        } else {
            BuilderState::ScanningMeasure(measure)
        }
    }

    fn scan_measure(&mut self, m: usize) -> BuilderState {
        let first_similar = self.measures[m].first_similar_measure;

        let Some(similar) = first_similar.filter(|_| {
            self.config.check_repetitions && !self.measures[m].is_empty()
        }) else {
            self.push_plain_measure(m);
            return self.resume_at(m + 1);
        };

        self.push_time_signature_if_changed(m);

        if self.config.minimum_repetition_length < 2 {
            trace!("measure {} folded as a repeat of measure {}", m, similar);
            self.push(ElementKind::SingleRepeatedMeasure {
                measure: m,
                repeats: similar,
            });
            return self.resume_at(m + 1);
        }

        let run = self.same_measure_run(m, similar);
        if run > 1 {
            return self.fold_repeat_run(m, similar, run);
        }

        match find_consecutive_repetition(self.measures, m, self.config.minimum_repetition_length) {
            Some(riff) if riff.length() >= self.config.minimum_repetition_length => {
                trace!(
                    "measures {}..={} folded as a riff of {}..={}",
                    riff.first_repeating,
                    riff.last_repeating,
                    riff.first_repeated,
                    riff.last_repeated
                );
                self.push(ElementKind::RepeatedRiff {
                    first_measure: riff.first_repeating,
                    last_measure: riff.last_repeating,
                    first_measure_to_repeat: riff.first_repeated,
                    last_measure_to_repeat: riff.last_repeated,
                });
                self.resume_at(riff.last_repeating + 1)
            }
            Some(riff) => {
                let end = (m + self.config.minimum_repetition_length).min(self.measures.len());
                debug!(
                    "riff at measure {} is {} measure(s) long, below the minimum; printing {}..{}",
                    m,
                    riff.length(),
                    m,
                    end
                );
                self.push(ElementKind::SingleMeasure { measure: m });
                BuilderState::InsideRiffRun { next: m + 1, end }
            }
            None => {
                self.push(ElementKind::SingleMeasure { measure: m });
                self.resume_at(m + 1)
            }
        }
    }

    /// Number of consecutive measures from `m` that repeat `similar`.
    fn same_measure_run(&self, m: usize, similar: usize) -> usize {
        self.measures[m..]
            .iter()
            .take_while(|measure| measure.first_similar_measure == Some(similar))
            .count()
    }

    fn fold_repeat_run(&mut self, m: usize, similar: usize, run: usize) -> BuilderState {
        if run < self.config.minimum_repetition_length {
            debug!(
                "measure {} repeated {} time(s), below the minimum; printed in full",
                m, run
            );
            self.push(ElementKind::SingleMeasure { measure: m });
            return BuilderState::InsideRepeatRun {
                next: m + 1,
                end: m + run,
            };
        }

        self.measures[m].cut_apart = true;
        if similar + 1 == m {
            // the previous measure already shows the material
            trace!("measures {}..{} play measure {} {} times", m, m + run, similar, run + 1);
            self.push(ElementKind::PlayManyTimes {
                repeat_count: run + 1,
                first_measure: m,
                last_measure: m + run - 1,
            });
        } else {
            trace!("measures {}..{} repeat measure {}", m, m + run, similar);
            self.push(ElementKind::SingleRepeatedMeasure {
                measure: m,
                repeats: similar,
            });
            self.push(ElementKind::PlayManyTimes {
                repeat_count: run,
                first_measure: m + 1,
                last_measure: m + run - 1,
            });
        }
        self.resume_at(m + run)
    }

    /// Print a measure without considering repetitions.
    fn push_plain_measure(&mut self, m: usize) {
        self.push_time_signature_if_changed(m);

        let measure = &self.measures[m];
        if !measure.is_empty() {
            self.push(ElementKind::SingleMeasure { measure: m });
            return;
        }

        let width = if measure.is_held_into() {
            self.config.held_empty_measure_width
        } else {
            self.config.empty_measure_width
        };
        self.elements
            .push(LayoutElement::new(ElementKind::EmptyMeasure { measure: m }, width));
    }

    fn push_time_signature_if_changed(&mut self, m: usize) {
        let current = (
            self.source.time_sig_numerator(m),
            self.source.time_sig_denominator(m),
        );
        if self.time_signature == Some(current) {
            return;
        }
        self.time_signature = Some(current);
        self.elements.push(LayoutElement::new(
            ElementKind::TimeSignatureChange {
                numerator: current.0,
                denominator: current.1,
            },
            self.config.time_signature_width,
        ));
    }

    /// Append an element whose width the spacer decides later.
    fn push(&mut self, kind: ElementKind) {
        self.elements.push(LayoutElement::new(kind, 0));
    }
}
