//! Display-ready blocks of time.
//!
//! A [`RenderBlock`] is the render-layer agnostic unit handed to a display:
//! a span of an interval that is either free or carries one or more
//! fragments. Blocks are derived on every display pass and never stored.

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

use super::Fragment;
use crate::error::{ensure, Result};

/// A contiguous span of time that can be widened by its right neighbour.
///
/// Implemented by [`Interval`](super::Interval) and [`RenderBlock`], so the
/// block merger can post-process the output of either producer.
pub trait TimeBlock: Sized {
    fn start(&self) -> DateTime<Utc>;

    fn end(&self) -> DateTime<Utc>;

    fn duration(&self) -> Duration {
        self.end() - self.start()
    }

    /// A block without fragments.
    fn is_free(&self) -> bool;

    /// Span `[self.start, next.end)` holding both fragment lists in order.
    ///
    /// # Errors
    /// `InvalidArgument` unless `next` starts exactly where `self` ends.
    fn extend_with(self, next: Self) -> Result<Self>;
}

/// A span of an interval ready for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RenderBlock {
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    fragments: Vec<Fragment>,
}

impl RenderBlock {
    /// A block with no fragments.
    pub fn free(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self {
            start,
            end,
            fragments: Vec::new(),
        }
    }

    pub fn start(&self) -> DateTime<Utc> {
        self.start
    }

    pub fn end(&self) -> DateTime<Utc> {
        self.end
    }

    pub fn duration(&self) -> Duration {
        self.end - self.start
    }

    pub fn fragments(&self) -> &[Fragment] {
        &self.fragments
    }

    pub fn is_free(&self) -> bool {
        self.fragments.is_empty()
    }
}

impl TimeBlock for RenderBlock {
    fn start(&self) -> DateTime<Utc> {
        self.start
    }

    fn end(&self) -> DateTime<Utc> {
        self.end
    }

    fn is_free(&self) -> bool {
        self.fragments.is_empty()
    }

    fn extend_with(self, next: Self) -> Result<Self> {
        ensure(self.end == next.start, || {
            format!(
                "Extending block has to start right after the current one. Current ends {}, next starts {}",
                self.end, next.start
            )
        })?;
        let mut fragments = self.fragments;
        fragments.extend(next.fragments);
        Ok(Self {
            start: self.start,
            end: next.end,
            fragments,
        })
    }
}

/// A render block under construction.
///
/// Every operation consumes the value and returns the updated one, so a
/// renderer replaces its block-in-progress wholesale at each step and an
/// emitted [`RenderBlock`] never aliases the next block being built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartialBlock {
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    fragments: Vec<Fragment>,
}

impl PartialBlock {
    /// An empty block at `start`.
    pub fn starting_at(start: DateTime<Utc>) -> Self {
        Self {
            start,
            end: start,
            fragments: Vec::new(),
        }
    }

    pub fn start(&self) -> DateTime<Utc> {
        self.start
    }

    pub fn end(&self) -> DateTime<Utc> {
        self.end
    }

    pub fn duration(&self) -> Duration {
        self.end - self.start
    }

    pub fn fragments(&self) -> &[Fragment] {
        &self.fragments
    }

    /// Stretch the block to `end`, covering free time.
    ///
    /// # Errors
    /// `InvalidArgument` if `end` would shrink the block.
    pub fn with_end(self, end: DateTime<Utc>) -> Result<Self> {
        ensure(end >= self.end, || {
            format!("A block ending at {} cannot be moved back to {end}", self.end)
        })?;
        Ok(Self { end, ..self })
    }

    /// Take in `fragment` whole; the block then ends where the fragment ends.
    ///
    /// # Errors
    /// `InvalidArgument` if the fragment starts before the block's current end.
    pub fn absorb(self, fragment: Fragment) -> Result<Self> {
        ensure(fragment.start() >= self.end, || {
            format!(
                "Fragments need to be added in sequential order. Got {fragment:?} for a block ending at {}",
                self.end
            )
        })?;
        let end = fragment.end();
        let mut fragments = self.fragments;
        fragments.push(fragment);
        Ok(Self {
            start: self.start,
            end,
            fragments,
        })
    }

    /// Finish the block, returning it together with the empty block that
    /// continues where it ends.
    pub fn close(self) -> (RenderBlock, PartialBlock) {
        let next = PartialBlock::starting_at(self.end);
        (self.build(), next)
    }

    pub fn build(self) -> RenderBlock {
        RenderBlock {
            start: self.start,
            end: self.end,
            fragments: self.fragments,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn mins(n: i64) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2015, 6, 20, 9, 0, 0).unwrap() + Duration::minutes(n)
    }

    fn fragment(name: &str, start: i64, end: i64) -> Fragment {
        Fragment::new(name, mins(start), mins(end), mins(start), mins(end)).unwrap()
    }

    #[test]
    fn test_partial_block_grows() {
        let block = PartialBlock::starting_at(mins(0));
        assert_eq!(block.duration(), Duration::zero());

        let block = block.with_end(mins(3)).unwrap();
        let block = block.absorb(fragment("Reading", 5, 12)).unwrap();
        assert_eq!(block.end(), mins(12));
        assert_eq!(block.fragments().len(), 1);

        let (built, next) = block.close();
        assert_eq!((built.start(), built.end()), (mins(0), mins(12)));
        assert!(!built.is_free());
        assert_eq!(next.start(), mins(12));
        assert_eq!(next.end(), mins(12));
    }

    #[test]
    fn test_partial_block_rejects_out_of_order() {
        let block = PartialBlock::starting_at(mins(0))
            .absorb(fragment("A", 0, 10))
            .unwrap();
        assert!(block.clone().absorb(fragment("B", 5, 15)).is_err());
        assert!(block.with_end(mins(5)).is_err());
    }

    #[test]
    fn test_render_block_extend_with() {
        let first = PartialBlock::starting_at(mins(0))
            .absorb(fragment("A", 0, 4))
            .unwrap()
            .build();
        let second = RenderBlock::free(mins(4), mins(10));

        let merged = first.extend_with(second).unwrap();
        assert_eq!((merged.start(), merged.end()), (mins(0), mins(10)));
        assert_eq!(merged.fragments().len(), 1);
        assert_eq!(merged.fragments()[0].end(), mins(4));
    }

    #[test]
    fn test_render_block_extend_requires_adjacency() {
        let first = RenderBlock::free(mins(0), mins(5));
        let second = RenderBlock::free(mins(6), mins(10));
        assert!(first.extend_with(second).is_err());
    }
}
