//! Post-pass that folds undersized blocks into their neighbours.
//!
//! The sweep looks at three blocks at a time, `(prev, curr, next)`, and only
//! decides once all three slots are filled:
//!
//! 1. `prev` too short: merge it forward into `curr`.
//! 2. `curr` too short and free, with a free neighbour: merge the two free
//!    blocks (`prev` first).
//! 3. `curr` too short otherwise: merge it into the shorter neighbour, `prev`
//!    on a tie.
//! 4. Nothing too short: emit `prev` and slide.
//!
//! Whatever is left when the input runs out is folded backwards into the last
//! emitted block, so only a sequence shorter than the minimum as a whole can
//! end up with an undersized block.

use std::collections::VecDeque;

use chrono::Duration;
use tracing::{debug, trace};

use crate::error::{ensure, CoreError, Result};
use crate::timeline::TimeBlock;

const WINDOW: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SweepState {
    /// Topping the window up from the input.
    Filling,
    /// Three blocks in the window; merge or emit.
    ReadyToEmit,
    /// Input exhausted; fewer than three blocks pending.
    DrainingTail,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Step {
    PreviousForward,
    CurrentIntoPrevious,
    CurrentIntoNext,
    Emit,
}

/// Merge undersized blocks so every resulting block lasts at least
/// `min_duration`, except a lone block when the whole input is shorter.
///
/// Works on anything implementing [`TimeBlock`]; fragments inside blocks are
/// never altered, only concatenated.
///
/// # Errors
/// `InvalidArgument` if `blocks` is empty, not contiguous, or
/// `min_duration` is negative. `Logic` if the sweep reaches a state the
/// window invariants rule out.
pub fn merge_too_small<B: TimeBlock>(blocks: Vec<B>, min_duration: Duration) -> Result<Vec<B>> {
    ensure(!blocks.is_empty(), || "Cannot merge an empty block sequence".into())?;
    ensure(min_duration >= Duration::zero(), || {
        format!("The minimum block duration cannot be negative, got {min_duration}")
    })?;
    for pair in blocks.windows(2) {
        ensure(pair[0].end() == pair[1].start(), || {
            format!(
                "Blocks must be contiguous: one ends at {} but the next starts at {}",
                pair[0].end(),
                pair[1].start()
            )
        })?;
    }

    let count = blocks.len();
    let mut input = blocks.into_iter();
    let mut window: VecDeque<B> = VecDeque::with_capacity(WINDOW);
    let mut merged = Vec::with_capacity(count);
    let mut state = SweepState::Filling;

    loop {
        state = match state {
            SweepState::Filling => {
                window.extend(input.by_ref().take(WINDOW - window.len()));
                if window.len() == WINDOW {
                    SweepState::ReadyToEmit
                } else {
                    SweepState::DrainingTail
                }
            }
            SweepState::ReadyToEmit => {
                let step = slide(&mut window, &mut merged, min_duration)?;
                trace!(?step, pending = window.len(), "merge step");
                SweepState::Filling
            }
            SweepState::DrainingTail => {
                drain_tail(&mut window, &mut merged, min_duration)?;
                break;
            }
        };
    }

    debug!(blocks = count, merged = merged.len(), "merged undersized blocks");
    Ok(merged)
}

/// One decision over a full window. Leaves two or three blocks behind.
fn slide<B: TimeBlock>(
    window: &mut VecDeque<B>,
    merged: &mut Vec<B>,
    min_duration: Duration,
) -> Result<Step> {
    let (Some(prev), Some(curr), Some(next)) =
        (window.pop_front(), window.pop_front(), window.pop_front())
    else {
        return Err(CoreError::logic(
            "Unexpected end state: merge window was not full",
        ));
    };

    let step = if prev.duration() < min_duration {
        Step::PreviousForward
    } else if curr.duration() >= min_duration {
        Step::Emit
    } else if curr.is_free() && prev.is_free() {
        Step::CurrentIntoPrevious
    } else if curr.is_free() && next.is_free() {
        Step::CurrentIntoNext
    } else if prev.duration() <= next.duration() {
        Step::CurrentIntoPrevious
    } else {
        Step::CurrentIntoNext
    };

    match step {
        Step::PreviousForward | Step::CurrentIntoPrevious => {
            window.push_back(prev.extend_with(curr)?);
            window.push_back(next);
        }
        Step::CurrentIntoNext => {
            window.push_back(prev);
            window.push_back(curr.extend_with(next)?);
        }
        Step::Emit => {
            merged.push(prev);
            window.push_back(curr);
            window.push_back(next);
        }
    }
    Ok(step)
}

/// Move the last pending blocks out, folding any short one backwards.
fn drain_tail<B: TimeBlock>(
    window: &mut VecDeque<B>,
    merged: &mut Vec<B>,
    min_duration: Duration,
) -> Result<()> {
    for block in window.drain(..) {
        let fold = merged
            .last()
            .is_some_and(|last| last.duration() < min_duration || block.duration() < min_duration);

        if fold {
            let last = merged.pop().ok_or_else(|| {
                CoreError::logic("Unexpected end state: no block to fold the tail into")
            })?;
            merged.push(last.extend_with(block)?);
        } else {
            merged.push(block);
        }
    }
    Ok(())
}
