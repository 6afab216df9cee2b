//! The fragmentation and reconstruction algorithms.
//!
//! Everything here is a pure function (or a lazy iterator) over the value
//! types in [`crate::timeline`]; nothing touches storage.

mod empty;
mod fragmenter;
mod merger;
mod partitioner;
mod renderer;

pub use empty::{make_empty_blocks, next_grid_line};
pub use fragmenter::{coalesce, defragment, fragment, fragment_all};
pub use merger::merge_too_small;
pub use partitioner::{partition, partition_fragments, Partitions};
pub use renderer::render;
