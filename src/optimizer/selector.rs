//! Attribute-driven strategy selection.
//!
//! An ordered list of (predicate, strategy, reason) rules evaluated
//! top-to-bottom. The first matching rule decides the strategy; the rationale
//! names every rule that fired so callers see the full picture, not just the
//! winner.

use super::{KIB, MIB};
use crate::core::{ImageAttributes, Strategy};

/// Rationale reported when no rule fires.
pub const DEFAULT_RATIONALE: &str = "default balanced strategy";

struct SelectionRule {
    predicate: fn(&ImageAttributes) -> bool,
    strategy: Strategy,
    reason: &'static str,
}

const RULES: [SelectionRule; 4] = [
    SelectionRule {
        predicate: |a| a.file_size > 10 * MIB,
        strategy: Strategy::Compression,
        reason: "large file size (>10 MiB) favors compression",
    },
    SelectionRule {
        predicate: |a| a.file_size < 500 * KIB,
        strategy: Strategy::Quality,
        reason: "small file size (<500 KiB) favors quality",
    },
    SelectionRule {
        predicate: |a| a.pixel_area() > 2_000_000,
        strategy: Strategy::Compression,
        reason: "large frame area (>2M pixels) favors compression",
    },
    SelectionRule {
        predicate: |a| a.estimated_frame_count > 50,
        strategy: Strategy::Compression,
        reason: "long animation (>50 frames) favors compression",
    },
];

/// Choose a strategy for the given attributes.
///
/// Returns the winning strategy and a rationale listing every triggered
/// condition, or the balanced default when none fired.
pub fn select_strategy(attributes: &ImageAttributes) -> (Strategy, String) {
    let fired: Vec<&SelectionRule> = RULES
        .iter()
        .filter(|rule| (rule.predicate)(attributes))
        .collect();

    match fired.first() {
        Some(winner) => {
            let rationale = fired
                .iter()
                .map(|rule| rule.reason)
                .collect::<Vec<_>>()
                .join("; ");
            (winner.strategy, rationale)
        }
        None => (Strategy::Balanced, DEFAULT_RATIONALE.to_string()),
    }
}
