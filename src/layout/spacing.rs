//! Proportional horizontal spacing inside a measure.
//!
//! Renderers report every tick at which their track draws something; the
//! distinct ticks of a measure are then spread over `[0, 1)` in proportion to
//! the weight of the symbol drawn at each one.

use std::collections::HashMap;

use log::debug;

use crate::config::LayoutConfig;
use crate::model::SequenceSource;
use crate::notation::NotationRenderer;
use super::constants::TRAILING_PLACEMENT_WEIGHT;
use super::elements::ElementKind;
use super::LayoutRun;

/// Collects the symbols of one measure across all tracks.
#[derive(Debug)]
pub struct TickCollector {
    first_tick: i64,
    last_tick: i64,
    symbols: HashMap<i64, CollectedTick>,
}

#[derive(Debug, Default)]
struct CollectedTick {
    weight: f32,
    tracks: Vec<usize>,
}

impl TickCollector {
    pub fn new(first_tick: i64, last_tick: i64) -> Self {
        Self {
            first_tick,
            last_tick,
            symbols: HashMap::new(),
        }
    }

    /// Record a symbol of `track_index` at `tick`. Symbols sharing a tick
    /// share one slot, as wide as the widest of them.
    pub fn add_symbol(&mut self, tick: i64, weight: f32, track_index: usize) {
        if tick < self.first_tick || tick >= self.last_tick {
            return;
        }
        let slot = self.symbols.entry(tick).or_default();
        slot.weight = slot.weight.max(weight);
        if !slot.tracks.contains(&track_index) {
            slot.tracks.push(track_index);
        }
    }

    /// Sort the collected ticks and compute where each one sits.
    pub fn into_placement(self) -> TickPlacement {
        let mut ticks: Vec<(i64, CollectedTick)> = self.symbols.into_iter().collect();
        ticks.sort_by_key(|(tick, _)| *tick);

        let total: f32 =
            ticks.iter().map(|(_, t)| t.weight).sum::<f32>() + TRAILING_PLACEMENT_WEIGHT;

        let mut position = 0.0;
        let ticks = ticks
            .into_iter()
            .map(|(tick, mut collected)| {
                collected.tracks.sort_unstable();
                let start = position / total;
                position += collected.weight;
                PlacedTick {
                    tick,
                    weight: collected.weight,
                    tracks: collected.tracks,
                    start,
                    end: position / total,
                }
            })
            .collect();

        TickPlacement {
            first_tick: self.first_tick,
            last_tick: self.last_tick,
            ticks,
        }
    }
}

/// One distinct tick of a measure and its horizontal slot.
#[derive(Debug, Clone, PartialEq)]
pub struct PlacedTick {
    pub tick: i64,
    pub weight: f32,
    /// Tracks drawing something at this tick, ascending
    pub tracks: Vec<usize>,
    /// Relative position in `[0, 1)`
    pub start: f32,
    pub end: f32,
}

/// Horizontal placement of every symbol tick in one measure.
#[derive(Debug, Clone, PartialEq)]
pub struct TickPlacement {
    first_tick: i64,
    last_tick: i64,
    ticks: Vec<PlacedTick>,
}

impl TickPlacement {
    pub fn ticks(&self) -> &[PlacedTick] {
        &self.ticks
    }

    /// Number of distinct ticks with a symbol.
    pub fn unit_count(&self) -> usize {
        self.ticks.len()
    }

    /// Relative start and end of the slot at `tick`.
    pub fn relative_area(&self, tick: i64) -> Option<(f32, f32)> {
        self.ticks
            .binary_search_by_key(&tick, |t| t.tick)
            .ok()
            .map(|i| (self.ticks[i].start, self.ticks[i].end))
    }

    /// First symbol tick after `from`, or the end of the measure.
    pub fn next_tick(&self, from: i64) -> i64 {
        self.ticks
            .iter()
            .find(|t| t.tick > from)
            .map_or(self.last_tick, |t| t.tick)
    }

    /// First tick after `from` at which `track` draws something, or the end
    /// of the measure.
    pub fn next_tick_in_track(&self, from: i64, track: usize) -> i64 {
        self.ticks
            .iter()
            .find(|t| t.tick > from && t.tracks.binary_search(&track).is_ok())
            .map_or(self.last_tick, |t| t.tick)
    }

    pub fn first_tick(&self) -> i64 {
        self.first_tick
    }

    pub fn last_tick(&self) -> i64 {
        self.last_tick
    }
}

/// Compute tick placements for every printed measure and give each element
/// its final width.
pub fn assign_widths(
    run: &mut LayoutRun,
    source: &dyn SequenceSource,
    renderers: &[&dyn NotationRenderer],
    config: &LayoutConfig,
) {
    run.placements = vec![None; run.measures.len()];

    for element in run.elements.iter_mut() {
        match element.kind {
            ElementKind::SingleMeasure { measure } | ElementKind::EmptyMeasure { measure } => {
                let snapshot = &run.measures[measure];
                let mut collector = TickCollector::new(snapshot.first_tick, snapshot.last_tick);
                for (position, track_ref) in snapshot.track_refs.iter().enumerate() {
                    renderers[position].add_used_ticks(
                        snapshot,
                        position,
                        source.track(track_ref.track_index),
                        &mut collector,
                    );
                }
                let placement = collector.into_placement();

                if matches!(element.kind, ElementKind::SingleMeasure { .. }) {
                    let units = u32::try_from(placement.unit_count()).unwrap_or(u32::MAX);
                    element.width_units = units.max(config.min_unit_width);
                }
                run.placements[measure] = Some(placement);
            }
            ElementKind::RepeatedRiff { .. } => element.width_units = config.riff_width,
            ElementKind::SingleRepeatedMeasure { .. } | ElementKind::PlayManyTimes { .. } => {
                element.width_units = config.repeat_marker_width;
            }
            ElementKind::LineHeader => element.width_units = config.header_width(),
            ElementKind::TimeSignatureChange { .. } => {}
        }
    }

    debug!(
        "spacer: {} measures placed, {} width units in total",
        run.placements.iter().flatten().count(),
        run.elements.iter().map(|e| e.width_units).sum::<u32>()
    );
}
