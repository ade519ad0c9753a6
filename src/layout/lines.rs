//! Greedy line and page breaking.
//!
//! Elements are packed into lines no wider than the configured width and
//! lines into pages no taller than the configured height. Nothing is ever
//! split: an element that does not fit starts a new line, and a line that
//! does not fit starts a new page.

use log::debug;
use serde::Serialize;

use crate::config::LayoutConfig;
use crate::model::SequenceSource;
use crate::notation::NotationRenderer;
use super::elements::{ElementKind, LayoutElement};
use super::measure::MeasureSnapshot;
use super::LayoutRun;

/// What one track draws on one line.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LineTrackView {
    pub track_index: usize,
    /// First and last note drawn on the line, `None` when the track is silent there
    pub first_note: Option<usize>,
    pub last_note: Option<usize>,
    pub first_measure: Option<usize>,
    pub last_measure: Option<usize>,
}

impl LineTrackView {
    pub fn is_empty(&self) -> bool {
        self.first_note.is_none()
    }

    /// Indices of the notes drawn on the line.
    pub fn notes(&self) -> Option<std::ops::RangeInclusive<usize>> {
        Some(self.first_note?..=self.last_note?)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct LayoutLine {
    pub elements: Vec<LayoutElement>,
    pub width_units: u32,
    pub height_units: u32,
    /// Per track, in track order
    pub track_views: Vec<LineTrackView>,
    pub track_heights: Vec<u32>,
    /// Each track's share of `height_units`, in percent
    pub track_height_percents: Vec<u32>,
    /// Last line of its page; trailing page space may be reclaimed after it
    pub last_of_page: bool,
}

impl LayoutLine {
    fn open(config: &LayoutConfig) -> Self {
        let header = LayoutElement::new(ElementKind::LineHeader, config.header_width());
        Self {
            width_units: header.width_units,
            elements: vec![header],
            ..Self::default()
        }
    }

    fn has_content(&self) -> bool {
        self.elements
            .iter()
            .any(|e| e.kind != ElementKind::LineHeader)
    }

    fn push(&mut self, element: LayoutElement) {
        self.width_units += element.width_units;
        self.elements.push(element);
    }

    /// First measure shown on this line.
    pub fn first_measure(&self) -> Option<usize> {
        self.elements
            .iter()
            .find_map(|e| e.covered_measures())
            .map(|r| *r.start())
    }

    /// Last measure shown on this line.
    pub fn last_measure(&self) -> Option<usize> {
        self.elements
            .iter()
            .rev()
            .find_map(|e| e.covered_measures())
            .map(|r| *r.end())
    }
}

/// A group of consecutive lines of the run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LayoutPage {
    pub first_line: usize,
    pub last_line: usize,
    pub height_units: u32,
}

impl LayoutPage {
    pub fn line_count(&self) -> usize {
        self.last_line - self.first_line + 1
    }
}

/// Build the line's per-track views from every measure the line stands for.
/// A repeat marker counts the notes of the measures it folds, which hold the
/// same material as the measures they repeat.
fn track_views(line: &LayoutLine, measures: &[MeasureSnapshot], track_count: usize) -> Vec<LineTrackView> {
    let mut views: Vec<LineTrackView> = (0..track_count)
        .map(|track_index| LineTrackView {
            track_index,
            first_measure: line.first_measure(),
            last_measure: line.last_measure(),
            ..LineTrackView::default()
        })
        .collect();

    for measure in line.elements.iter().filter_map(LayoutElement::covered_measures).flatten() {
        for (view, track_ref) in views.iter_mut().zip(&measures[measure].track_refs) {
            let Some(range) = track_ref.notes else {
                continue;
            };
            view.first_note.get_or_insert(range.first);
            view.last_note = Some(view.last_note.map_or(range.last, |l| l.max(range.last)));
        }
    }
    views
}

struct Breaker<'a> {
    source: &'a dyn SequenceSource,
    renderers: &'a [&'a dyn NotationRenderer],
    config: &'a LayoutConfig,
    lines: Vec<LayoutLine>,
    pages: Vec<LayoutPage>,
}

impl Breaker<'_> {
    fn close_line(&mut self, mut line: LayoutLine, measures: &[MeasureSnapshot]) {
        line.track_views = track_views(&line, measures, self.renderers.len());
        line.track_heights = line
            .track_views
            .iter()
            .zip(self.renderers)
            .map(|(view, renderer)| {
                renderer.content_height(view, self.source.track(view.track_index))
            })
            .collect();
        line.height_units = line.track_heights.iter().sum();
        line.track_height_percents = line
            .track_heights
            .iter()
            .map(|&h| {
                if line.height_units == 0 {
                    0
                } else {
                    (h as f32 * 100.0 / line.height_units as f32).round() as u32
                }
            })
            .collect();

        if line.width_units > self.config.max_line_width_units {
            debug!(
                "line {} is {} units wide, over the {} unit limit",
                self.lines.len(),
                line.width_units,
                self.config.max_line_width_units
            );
        }

        let index = self.lines.len();
        let height = line.height_units;
        self.lines.push(line);

        match self.pages.last_mut() {
            Some(page) if page.height_units + height <= self.config.max_page_height_units => {
                page.last_line = index;
                page.height_units += height;
            }
            _ => self.pages.push(LayoutPage {
                first_line: index,
                last_line: index,
                height_units: height,
            }),
        }
    }
}

/// Pack the run's elements into lines and pages.
pub fn break_lines_and_pages(
    run: &mut LayoutRun,
    source: &dyn SequenceSource,
    renderers: &[&dyn NotationRenderer],
    config: &LayoutConfig,
) {
    let mut breaker = Breaker {
        source,
        renderers,
        config,
        lines: Vec::new(),
        pages: Vec::new(),
    };

    let mut line = LayoutLine::open(config);
    for element in std::mem::take(&mut run.elements) {
        if line.has_content() && line.width_units + element.width_units > config.max_line_width_units {
            let full = std::mem::replace(&mut line, LayoutLine::open(config));
            breaker.close_line(full, &run.measures);
        }
        line.push(element);
    }
    if line.has_content() {
        breaker.close_line(line, &run.measures);
    }

    for page in &breaker.pages {
        breaker.lines[page.last_line].last_of_page = true;
    }

    debug!(
        "line breaker: {} lines on {} pages",
        breaker.lines.len(),
        breaker.pages.len()
    );
    run.lines = breaker.lines;
    run.pages = breaker.pages;
}
