//! Shared constants for the layout pipeline.

// ── Input bounds ────────────────────────────────────────────────────
/// Largest tick magnitude accepted; differences of two ticks stay far from overflow.
pub(super) const MAX_TICK: i64 = 1 << 48;

// ── Measure analysis ────────────────────────────────────────────────
/// Notes shorter than 1/32 of their measure are instant hits; they do not
/// count toward a measure's shortest duration.
pub(super) const INSTANT_HIT_DIVISOR: i64 = 32;

// ── Tick placement ──────────────────────────────────────────────────
/// Space kept after the last symbol of a measure so it never touches the bar line.
pub(super) const TRAILING_PLACEMENT_WEIGHT: f32 = 1.0;
