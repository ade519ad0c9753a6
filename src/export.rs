//! Layout summary: a serializable view of a finished layout run, nested
//! pages → lines → elements. This is what crosses the FFI boundary.

use serde::Serialize;

use crate::layout::{LayoutElement, LayoutRun};

#[derive(Debug, Clone, Serialize)]
pub struct LayoutSummary {
    pub pages: Vec<PageSummary>,
    /// Repetition analysis of every measure, by measure index
    pub measures: Vec<MeasureSummary>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PageSummary {
    pub height_units: u32,
    pub lines: Vec<LineSummary>,
}

#[derive(Debug, Clone, Serialize)]
pub struct LineSummary {
    pub width_units: u32,
    pub height_units: u32,
    /// Each track's share of the line height, in percent
    pub track_height_percents: Vec<u32>,
    pub last_of_page: bool,
    pub first_measure: Option<usize>,
    pub last_measure: Option<usize>,
    pub elements: Vec<LayoutElement>,
}

#[derive(Debug, Clone, Serialize)]
pub struct MeasureSummary {
    pub first_tick: i64,
    pub last_tick: i64,
    pub note_count: usize,
    /// `None` when no usable note starts in the measure
    pub shortest_duration: Option<i64>,
    pub first_similar_measure: Option<usize>,
    pub cut_apart: bool,
    /// Relative start of each distinct symbol tick, for measures printed in full
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tick_positions: Vec<(i64, f32)>,
}

impl LayoutSummary {
    pub fn from_run(run: &LayoutRun) -> Self {
        let pages = run
            .pages
            .iter()
            .map(|page| PageSummary {
                height_units: page.height_units,
                lines: run
                    .page_lines(page)
                    .iter()
                    .map(|line| LineSummary {
                        width_units: line.width_units,
                        height_units: line.height_units,
                        track_height_percents: line.track_height_percents.clone(),
                        last_of_page: line.last_of_page,
                        first_measure: line.first_measure(),
                        last_measure: line.last_measure(),
                        elements: line.elements.clone(),
                    })
                    .collect(),
            })
            .collect();

        let measures = run
            .measures
            .iter()
            .map(|measure| MeasureSummary {
                first_tick: measure.first_tick,
                last_tick: measure.last_tick,
                note_count: measure.total_note_count(),
                shortest_duration: measure.shortest_duration,
                first_similar_measure: measure.first_similar_measure,
                cut_apart: measure.cut_apart,
                tick_positions: run
                    .placement(measure.measure_id)
                    .map(|placement| {
                        placement
                            .ticks()
                            .iter()
                            .map(|t| (t.tick, t.start))
                            .collect()
                    })
                    .unwrap_or_default(),
            })
            .collect();

        Self { pages, measures }
    }
}

/// Serialize a layout summary to JSON.
pub fn layout_to_json(summary: &LayoutSummary) -> String {
    serde_json::to_string(summary).unwrap_or_else(|_| "{}".to_string())
}
