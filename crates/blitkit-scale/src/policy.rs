//! Scaling policy selection
//!
//! A pure decision step run before any pixel work: given what the caller
//! asked for and the source/destination spans, pick the algorithm for each
//! round, whether reductions are done in halving rounds, whether the host
//! primitive can carry the job, and the split threshold for the engine.
//!
//! # Rounds
//!
//! One resampling pass is only trustworthy up to a 2x reduction per axis.
//! Bilinear and bicubic reductions beyond that are done in rounds, each
//! halving the current span (rounded up) until the target is reached:
//!
//! ```text
//! 100 -> 50 -> 25 -> 13 -> 10
//! ```
//!
//! Nearest and box sampling never iterate: nearest has nothing to gain and
//! box sampling already averages the full footprint.

use crate::algorithm::{ScalingAlgorithm, ScalingRequest};
use crate::config::SplitThresholds;
use blitkit_core::InterpolationHint;

/// Output size and algorithm of one resampling pass
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Round {
    pub width: u32,
    pub height: u32,
    pub algorithm: ScalingAlgorithm,
}

/// Concrete execution plan for one draw
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScalePlan {
    /// Algorithm of the final round
    pub algorithm: ScalingAlgorithm,
    /// A reduction leg followed by an enlargement leg
    pub two_leg: bool,
    /// Reduction done in more than one round
    pub iterative: bool,
    /// Every round can be handed to the host primitive
    pub delegate_to_host: bool,
    /// Split threshold of the final round
    pub split_threshold: u64,
    /// Host hint of the final round
    pub hint: Option<InterpolationHint>,
    /// Rounds in order, the last one producing the destination spans
    pub rounds: Vec<Round>,
}

impl ScalePlan {
    /// Number of scratch rounds before the final draw.
    pub fn intermediate_rounds(&self) -> usize {
        self.rounds.len().saturating_sub(1)
    }
}

/// Spans after each halving round from `src` down to `dst`.
///
/// Each round takes `max(dst, ceil(cur / 2))`, and always removes at least
/// one unit. When `src <= dst` the result is the single step `[dst]`.
pub fn downscale_spans(src: u32, dst: u32) -> Vec<u32> {
    let mut spans = Vec::new();
    let mut cur = src;
    loop {
        let next = if cur <= dst {
            dst
        } else {
            dst.max(cur.div_ceil(2).min(cur - 1))
        };
        spans.push(next);
        cur = next;
        if cur <= dst {
            return spans;
        }
    }
}

/// Whether a reduction needs more than one round on either axis.
pub fn needs_iteration(src: (u32, u32), dst: (u32, u32)) -> bool {
    src.0 as u64 > 2 * dst.0 as u64 || src.1 as u64 > 2 * dst.1 as u64
}

/// Choose the execution plan for a draw.
///
/// `src` and `dst` are `(width, height)` spans. Identical spans always
/// collapse to a single nearest-neighbor round.
pub fn select_plan(
    request: ScalingRequest,
    src: (u32, u32),
    dst: (u32, u32),
    host_usable: bool,
    thresholds: &SplitThresholds,
) -> ScalePlan {
    let mut rounds = Vec::new();
    let shrinks = dst.0 < src.0 || dst.1 < src.1;
    let grows = dst.0 > src.0 || dst.1 > src.1;
    // span reached at the end of the reduction leg
    let mid = (src.0.min(dst.0), src.1.min(dst.1));

    let two_leg = if src == dst {
        rounds.push(round(dst, ScalingAlgorithm::Nearest));
        false
    } else {
        match request {
            ScalingRequest::Algorithm(algorithm) => {
                push_reduction(&mut rounds, src, dst, algorithm);
                false
            }
            ScalingRequest::IterativeBilinearOrBicubic => {
                push_legs(&mut rounds, src, mid, dst, ScalingAlgorithm::Bilinear, shrinks, grows)
            }
            ScalingRequest::BoxSampledThenBicubic => push_legs(
                &mut rounds,
                src,
                mid,
                dst,
                ScalingAlgorithm::BoxSampled,
                shrinks,
                grows,
            ),
        }
    };

    let algorithm = rounds
        .last()
        .map_or(ScalingAlgorithm::Nearest, |r| r.algorithm);
    let reduction_rounds = if two_leg {
        rounds.len() - 1
    } else {
        rounds.len()
    };
    let delegate_to_host = host_usable && rounds.iter().all(|r| r.algorithm.hint().is_some());

    ScalePlan {
        algorithm,
        two_leg,
        iterative: reduction_rounds > 1,
        delegate_to_host,
        split_threshold: thresholds.get(algorithm),
        hint: algorithm.hint(),
        rounds,
    }
}

fn round(spans: (u32, u32), algorithm: ScalingAlgorithm) -> Round {
    Round {
        width: spans.0,
        height: spans.1,
        algorithm,
    }
}

/// Push the reduction leg and, if one axis grows, a bicubic enlargement.
/// Returns whether both legs were needed.
fn push_legs(
    rounds: &mut Vec<Round>,
    src: (u32, u32),
    mid: (u32, u32),
    dst: (u32, u32),
    reduce: ScalingAlgorithm,
    shrinks: bool,
    grows: bool,
) -> bool {
    match (shrinks, grows) {
        (true, true) => {
            push_reduction(rounds, src, mid, reduce);
            rounds.push(round(dst, ScalingAlgorithm::Bicubic));
            true
        }
        (true, false) => {
            push_reduction(rounds, src, dst, reduce);
            false
        }
        _ => {
            rounds.push(round(dst, ScalingAlgorithm::Bicubic));
            false
        }
    }
}

/// Push one round, or halving rounds for iterating algorithms.
///
/// Axes with fewer halving steps keep their source span until their own
/// steps start, so the last round lands on `dst` for both axes.
fn push_reduction(
    rounds: &mut Vec<Round>,
    src: (u32, u32),
    dst: (u32, u32),
    algorithm: ScalingAlgorithm,
) {
    if !algorithm.iterates() || !needs_iteration(src, dst) {
        rounds.push(round(dst, algorithm));
        return;
    }
    let xs = downscale_spans(src.0, dst.0);
    let ys = downscale_spans(src.1, dst.1);
    let n = xs.len().max(ys.len());
    let pick = |spans: &[u32], from: u32, i: usize| {
        let lead = n - spans.len();
        if i < lead { from } else { spans[i - lead] }
    };
    for i in 0..n {
        rounds.push(round((pick(&xs, src.0, i), pick(&ys, src.1, i)), algorithm));
    }
}
