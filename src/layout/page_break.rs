//! # Break Decisions
//!
//! Whether a record placed in the current column stays whole, moves to the
//! next column, or is split between the two. A "unit" is whatever the
//! caller never splits internally: one formatted line of a record, or a
//! heading.

const EPSILON: f64 = 1e-6;

/// What to do with a block at the current cursor position.
#[derive(Debug, Clone, PartialEq)]
pub enum BreakDecision {
    /// The whole block fits here.
    Place,
    /// Break first, then place the block from the top of the next column.
    MoveToNextColumn,
    /// Place the first `units_here` units, break, place the rest.
    Split { units_here: usize },
}

/// How many units a split must leave on each side of the break.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeepTogether {
    /// Units that must stay before the break (orphan control).
    pub before: usize,
    /// Units that must move past the break (widow control).
    pub after: usize,
}

impl KeepTogether {
    /// Any split is acceptable.
    pub const NONE: KeepTogether = KeepTogether { before: 1, after: 1 };
    /// Wrapped records never leave a single line on either side.
    pub const LINES: KeepTogether = KeepTogether { before: 2, after: 2 };
}

/// Number of leading units whose heights add up to at most `space`.
pub fn units_fitting(space: f64, unit_heights: &[f64]) -> usize {
    unit_heights
        .iter()
        .scan(0.0, |used, &h| {
            *used += h;
            Some(*used)
        })
        .take_while(|&used| used <= space + EPSILON)
        .count()
}

/// Decide how a block made of `unit_heights` goes into `remaining` space.
///
/// Only a `breakable` block is ever split. The split point is pulled back
/// until `keep.after` units move on; if that leaves fewer than
/// `keep.before` units here, the whole block moves instead.
pub fn decide_break(remaining: f64, unit_heights: &[f64], breakable: bool, keep: KeepTogether) -> BreakDecision {
    let total: f64 = unit_heights.iter().sum();
    if total <= remaining + EPSILON {
        return BreakDecision::Place;
    }
    if !breakable || unit_heights.len() < 2 {
        return BreakDecision::MoveToNextColumn;
    }

    let last_allowed = unit_heights.len().saturating_sub(keep.after.max(1));
    let units_here = units_fitting(remaining, unit_heights).min(last_allowed);
    if units_here == 0 || units_here < keep.before {
        BreakDecision::MoveToNextColumn
    } else {
        BreakDecision::Split { units_here }
    }
}

/// A heading stays in this column only if `next_height` of what follows it
/// fits underneath.
pub fn keep_with_next(remaining: f64, heading_height: f64, next_height: f64) -> BreakDecision {
    if heading_height + next_height <= remaining + EPSILON {
        BreakDecision::Place
    } else {
        BreakDecision::MoveToNextColumn
    }
}
