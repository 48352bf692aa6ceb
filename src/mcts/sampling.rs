//! Weighted random outcome sampling.
//!
//! Every stochastic branch of the search (which opponent reply happens)
//! goes through [`pick_weighted`], driven by the engine's seeded
//! [`PlannerRng`], so a search can be replayed exactly.

use crate::core::PlannerRng;

/// Result of a weighted draw.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Pick {
    /// Position of the chosen entry.
    pub index: usize,

    /// The weights carried no usable mass and the first entry was taken.
    pub degenerate: bool,
}

/// Draw an index with probability proportional to its weight.
///
/// With total mass `S`, draws `r` uniformly in `[0, S)` and returns the first
/// entry whose running sum exceeds `r`. Negative and NaN weights count as 0.
/// A zero or infinite total returns the first entry flagged `degenerate`.
/// Returns `None` for empty input.
pub fn pick_weighted(weights: &[f64], rng: &mut PlannerRng) -> Option<Pick> {
    if weights.is_empty() {
        return None;
    }

    let total: f64 = weights.iter().map(|w| w.max(0.0)).sum();
    if total <= 0.0 || !total.is_finite() {
        return Some(Pick {
            index: 0,
            degenerate: true,
        });
    }

    let threshold = rng.gen_unit() * total;
    let mut running = 0.0;
    for (index, weight) in weights.iter().enumerate() {
        running += weight.max(0.0);
        if running > threshold {
            return Some(Pick {
                index,
                degenerate: false,
            });
        }
    }

    // Rounding left `threshold` at the very top: take the last positive weight.
    let index = weights.iter().rposition(|w| *w > 0.0).unwrap_or(0);
    Some(Pick {
        index,
        degenerate: false,
    })
}
