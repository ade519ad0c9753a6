//! Layout tests: fold decisions, packing bounds and coverage for hand-built pieces.

use pretty_assertions::assert_eq;
use scorelayout::layout::MeasureSnapshot;
use scorelayout::{
    layout_piece, ElementKind, LayoutConfig, LayoutRun, Notation, Piece, SequenceSource, Track,
};

const TPB: i64 = 96;
const BAR: i64 = TPB * 4;

/// Write one measure's worth of a pattern into `track`, starting at `measure`.
fn add_pattern(track: &mut Track, measure: usize, pattern: &[(i64, i64, i32)]) {
    let offset = measure as i64 * BAR;
    for &(start, end, pitch) in pattern {
        track.add_note(offset + start, offset + end, pitch);
    }
}

/// A single-track piece where each measure plays one of the given patterns.
fn piece_from_patterns(patterns: &[&[(i64, i64, i32)]]) -> Piece {
    let mut piece = Piece::new(TPB);
    piece.add_measures(patterns.len(), 4, 4);
    let mut track = Track::new("Lead", Notation::default());
    for (measure, pattern) in patterns.iter().enumerate() {
        add_pattern(&mut track, measure, pattern);
    }
    piece.add_track(track);
    piece
}

const A: &[(i64, i64, i32)] = &[(0, 96, 60), (96, 192, 64), (192, 384, 67)];
const B: &[(i64, i64, i32)] = &[(0, 192, 62), (192, 384, 65)];
const C: &[(i64, i64, i32)] = &[(0, 384, 72)];
const D: &[(i64, i64, i32)] = &[(0, 48, 69), (48, 96, 71), (96, 384, 74)];

/// Deterministic pseudo-random two-track piece with plenty of repetition.
fn generated_piece(measures: usize, seed: u64) -> Piece {
    let mut state = seed;
    let mut next = move || {
        state = state.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
        (state >> 33) as usize
    };

    let mut piece = Piece::new(TPB);
    piece.add_measures(measures, 4, 4);
    let mut lead = Track::new("Lead", Notation::default());
    let mut bass = Track::new("Bass", Notation::Tablature { string_count: 4 });
    let palette = [A, B, C, D];

    for measure in 0..measures {
        let choice = next() % 6;
        if choice < palette.len() {
            add_pattern(&mut lead, measure, palette[choice]);
        }
        if next() % 3 != 0 {
            add_pattern(&mut bass, measure, &[(0, 192, 40), (192, 384, 43)]);
        }
    }
    piece.add_track(lead);
    piece.add_track(bass);
    piece
}

fn kinds(run: &LayoutRun) -> Vec<ElementKind> {
    run.elements()
        .map(|e| e.kind)
        .filter(|k| {
            !matches!(
                k,
                ElementKind::LineHeader | ElementKind::TimeSignatureChange { .. }
            )
        })
        .collect()
}

#[test]
fn repeated_measure_pair_is_folded() {
    let piece = piece_from_patterns(&[A, B, A, A, C]);
    let run = layout_piece(&piece, &LayoutConfig::default()).expect("layout failed");

    assert_eq!(
        kinds(&run),
        vec![
            ElementKind::SingleMeasure { measure: 0 },
            ElementKind::SingleMeasure { measure: 1 },
            ElementKind::SingleRepeatedMeasure { measure: 2, repeats: 0 },
            ElementKind::PlayManyTimes {
                repeat_count: 2,
                first_measure: 3,
                last_measure: 3,
            },
            ElementKind::SingleMeasure { measure: 4 },
        ]
    );
    assert!(run.measures[2].cut_apart);
    println!("✓ [A, B, A, A, C] folds measures 2-3");
}

#[test]
fn run_after_its_source_marks_the_anchor_and_keeps_line_height() {
    let mut piece = Piece::new(TPB);
    piece.add_measures(3, 4, 4);
    let mut guitar = Track::new("Guitar", Notation::Tablature { string_count: 6 });
    for measure in 0..3 {
        add_pattern(&mut guitar, measure, A);
    }
    piece.add_track(guitar);

    let config = LayoutConfig {
        max_line_width_units: 9,
        ..LayoutConfig::default()
    };
    let run = layout_piece(&piece, &config).expect("layout failed");

    let cut_apart: Vec<bool> = run.measures.iter().map(|m| m.cut_apart).collect();
    assert_eq!(cut_apart, vec![false, true, false]);

    assert_eq!(run.lines.len(), 2);
    let marker_line: Vec<ElementKind> = run.lines[1].elements.iter().map(|e| e.kind).collect();
    assert_eq!(
        marker_line,
        vec![
            ElementKind::LineHeader,
            ElementKind::PlayManyTimes {
                repeat_count: 3,
                first_measure: 1,
                last_measure: 2,
            },
        ]
    );
    assert_eq!(run.lines[1].height_units, 6);
    println!("✓ [A, A, A] on tablature: marker line is 6 units tall");
}

#[test]
fn note_held_across_the_bar_line_gets_its_own_slot() {
    let mut piece = Piece::new(TPB);
    piece.add_measures(2, 4, 4);
    let mut track = Track::new("Lead", Notation::default());
    track
        .add_note(BAR - 96, BAR + 96, 60)
        .add_note(BAR + 192, BAR + 288, 64);
    piece.add_track(track);

    let run = layout_piece(&piece, &LayoutConfig::default()).expect("layout failed");
    let placement = run.placement(1).expect("measure 1 is printed");
    let ticks: Vec<i64> = placement.ticks().iter().map(|t| t.tick).collect();
    assert_eq!(ticks, vec![BAR, BAR + 96, BAR + 192, BAR + 288]);
}

#[test]
fn held_note_widens_empty_measure() {
    let mut piece = Piece::new(TPB);
    piece.add_measures(2, 4, 4);
    let mut track = Track::new("Lead", Notation::default());
    track.add_note(BAR - 10, BAR + 5, 60);
    piece.add_track(track);

    let run = layout_piece(&piece, &LayoutConfig::default()).expect("layout failed");
    let empty = run
        .elements()
        .find(|e| matches!(e.kind, ElementKind::EmptyMeasure { measure: 1 }))
        .expect("measure 1 should be empty");
    assert_eq!(empty.width_units, 5);
}

#[test]
fn plain_empty_measure_keeps_default_width() {
    let piece = piece_from_patterns(&[A, &[], B]);
    let run = layout_piece(&piece, &LayoutConfig::default()).expect("layout failed");
    let empty = run
        .elements()
        .find(|e| matches!(e.kind, ElementKind::EmptyMeasure { .. }))
        .expect("measure 1 should be empty");
    assert_eq!(empty.width_units, 2);
}

#[test]
fn one_semitone_difference_prevents_folding() {
    let shifted: &[(i64, i64, i32)] = &[(0, 96, 60), (96, 192, 64), (192, 384, 68)];
    let piece = piece_from_patterns(&[A, shifted, A]);
    let run = layout_piece(&piece, &LayoutConfig::default()).expect("layout failed");

    assert!(!run.measures[1].is_same_as(&run.measures[0], &piece));
    assert_eq!(run.measures[1].first_similar_measure, None);
    assert_eq!(run.measures[2].first_similar_measure, Some(0));
}

#[test]
fn single_measure_width_follows_distinct_ticks() {
    let busy: &[(i64, i64, i32)] = &[
        (0, 48, 60),
        (48, 96, 62),
        (96, 144, 64),
        (144, 192, 65),
        (192, 384, 67),
    ];
    let piece = piece_from_patterns(&[busy, C]);
    let run = layout_piece(&piece, &LayoutConfig::default()).expect("layout failed");

    let widths: Vec<u32> = run
        .elements()
        .filter(|e| matches!(e.kind, ElementKind::SingleMeasure { .. }))
        .map(|e| e.width_units)
        .collect();
    // five onsets; a whole note alone is held to the minimum width
    assert_eq!(widths, vec![5, 3]);

    let placement = run.placement(0).expect("measure 0 is printed");
    assert_eq!(placement.unit_count(), 5);
    let (start, end) = placement.relative_area(0).expect("tick 0 is placed");
    assert_eq!(start, 0.0);
    assert!(end < 1.0);
}

#[test]
fn lines_never_overflow_unless_alone() {
    let piece = generated_piece(120, 7);
    let config = LayoutConfig {
        max_line_width_units: 24,
        max_page_height_units: 30,
        ..LayoutConfig::default()
    };
    let run = layout_piece(&piece, &config).expect("layout failed");

    assert!(run.lines.len() > 1);
    for (i, line) in run.lines.iter().enumerate() {
        let sum: u32 = line.elements.iter().map(|e| e.width_units).sum();
        assert_eq!(sum, line.width_units, "line {} width", i);
        assert_eq!(line.elements[0].kind, ElementKind::LineHeader);
        let content = line.elements.len() - 1;
        assert!(
            sum <= config.max_line_width_units || content == 1,
            "line {} is {} units wide with {} elements",
            i,
            sum,
            content
        );
    }
    for page in &run.pages {
        let height: u32 = run.page_lines(page).iter().map(|l| l.height_units).sum();
        assert_eq!(height, page.height_units);
        assert!(height <= config.max_page_height_units || page.line_count() == 1);
        assert!(run.lines[page.last_line].last_of_page);
    }
    println!("✓ 120 measures: {} lines on {} pages", run.lines.len(), run.pages.len());
}

#[test]
fn every_measure_is_covered_exactly_once() {
    for seed in [1, 2, 3, 42] {
        let piece = generated_piece(80, seed);
        for minimum in [1, 2, 3] {
            let config = LayoutConfig {
                minimum_repetition_length: minimum,
                ..LayoutConfig::default()
            };
            let run = layout_piece(&piece, &config).expect("layout failed");

            let covered: Vec<usize> = run
                .elements()
                .filter_map(|e| e.covered_measures())
                .flatten()
                .collect();
            let expected: Vec<usize> = (0..piece.measure_count()).collect();
            assert_eq!(covered, expected, "seed {} minimum {}", seed, minimum);
        }
    }
}

#[test]
fn riffs_repeat_earlier_material_of_equal_length() {
    let piece = piece_from_patterns(&[A, B, C, D, A, B, C, D, A, B]);
    let run = layout_piece(&piece, &LayoutConfig::default()).expect("layout failed");

    let mut riffs = 0;
    for element in run.elements() {
        if let ElementKind::RepeatedRiff {
            first_measure,
            last_measure,
            first_measure_to_repeat,
            last_measure_to_repeat,
        } = element.kind
        {
            riffs += 1;
            assert_eq!(
                last_measure_to_repeat - first_measure_to_repeat,
                last_measure - first_measure
            );
            assert!(first_measure_to_repeat < first_measure);
            assert_eq!(element.width_units, 5);
        }
    }
    assert_eq!(riffs, 2);
}

#[test]
fn similarity_links_to_earliest_match() {
    let piece = generated_piece(60, 11);
    let run = layout_piece(&piece, &LayoutConfig::default()).expect("layout failed");

    for (i, measure) in run.measures.iter().enumerate() {
        if let Some(j) = measure.first_similar_measure {
            assert!(j < i);
            assert!(measure.is_same_as(&run.measures[j], &piece));
            for k in 0..j {
                assert!(
                    !measure.is_same_as(&run.measures[k], &piece),
                    "measure {} also matches earlier measure {}",
                    i,
                    k
                );
            }
            assert!(run.measures[j].similar_measures_found_later.contains(&i));
        }
    }
}

#[test]
fn disabled_repetitions_print_every_measure() {
    let piece = generated_piece(40, 5);
    let config = LayoutConfig {
        check_repetitions: false,
        ..LayoutConfig::default()
    };
    let run = layout_piece(&piece, &config).expect("layout failed");

    let measures: Vec<usize> = kinds(&run)
        .into_iter()
        .map(|kind| match kind {
            ElementKind::SingleMeasure { measure } | ElementKind::EmptyMeasure { measure } => {
                measure
            }
            other => panic!("unexpected element {:?}", other),
        })
        .collect();
    assert_eq!(measures, (0..40).collect::<Vec<_>>());
    assert!(run.measures.iter().all(|m| m.first_similar_measure.is_none()));
}

#[test]
fn layout_is_deterministic() {
    let piece = generated_piece(100, 99);
    let config = LayoutConfig::default();
    let first = layout_piece(&piece, &config).expect("layout failed");
    let second = layout_piece(&piece, &config).expect("layout failed");

    assert_eq!(first.lines, second.lines);
    assert_eq!(first.pages, second.pages);
}

#[test]
fn time_signature_changes_are_marked() {
    let mut piece = Piece::new(TPB);
    piece.add_measures(2, 4, 4).add_measures(2, 3, 4).add_measures(1, 4, 4);
    let mut track = Track::new("Lead", Notation::default());
    for m in 0..5 {
        let start = piece.first_tick_in_measure(m);
        track.add_note(start, start + 96, 60 + m as i32);
    }
    piece.add_track(track);

    let run = layout_piece(&piece, &LayoutConfig::default()).expect("layout failed");
    let signatures: Vec<(i32, i32)> = run
        .elements()
        .filter_map(|e| match e.kind {
            ElementKind::TimeSignatureChange {
                numerator,
                denominator,
            } => Some((numerator, denominator)),
            _ => None,
        })
        .collect();
    assert_eq!(signatures, vec![(4, 4), (3, 4), (4, 4)]);
}

#[test]
fn empty_piece_has_no_pages() {
    let piece = Piece::new(TPB);
    let run = layout_piece(&piece, &LayoutConfig::default()).expect("layout failed");
    assert!(run.pages.is_empty());
    assert!(run.lines.is_empty());
    assert!(run.measures.is_empty());
}

#[test]
fn measures_line_up_with_snapshots() {
    let piece = generated_piece(16, 3);
    let run = layout_piece(&piece, &LayoutConfig::default()).expect("layout failed");
    let ids: Vec<usize> = run.measures.iter().map(|m: &MeasureSnapshot| m.measure_id).collect();
    assert_eq!(ids, (0..16).collect::<Vec<_>>());
    assert!(run.measures.iter().all(|m| m.track_refs.len() == 2));
}
