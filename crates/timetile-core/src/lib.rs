//! # Timetile Core Library
//!
//! Fragmentation and reconstruction of time-tracked activities.
//!
//! A time log records *activities*: named spans of any length. To make range
//! queries cheap they are stored as *fragments* of bounded length, each of
//! which still knows the whole activity it came from. For display the same
//! data is sliced into fixed-size *intervals* and each interval is rendered
//! into *blocks* that are never too small to show.
//!
//! ## Architecture
//!
//! - **Timeline**: the immutable value types ([`Activity`], [`Fragment`],
//!   [`Interval`], [`RenderBlock`])
//! - **Engine**: pure algorithms over those types (fragment, defragment,
//!   partition, render, merge)
//! - **View**: hour rows of two half-hour intervals, the shape a display uses
//! - **Storage**: TOML configuration and a JSON-backed fragment store
//!
//! ## Key Components
//!
//! - [`fragment`] / [`defragment`]: activity <-> fragments
//! - [`Partitions`]: lazy tiling of a range into intervals
//! - [`render`] / [`merge_too_small`]: intervals -> display blocks
//! - [`MemoryStore`]: range queries over stored fragments
//! - [`Config`]: application configuration management

pub mod engine;
pub mod error;
pub mod storage;
pub mod timeline;
pub mod view;

pub use engine::{
    coalesce, defragment, fragment, fragment_all, make_empty_blocks, merge_too_small,
    next_grid_line, partition, partition_fragments, render, Partitions,
};
pub use error::{ConfigError, CoreError, Result};
pub use storage::{Config, FragmentSource, MemoryStore};
pub use timeline::{Activity, Fragment, Interval, PartialBlock, RenderBlock, TimeBlock};
pub use view::{hours, render_range, HourView, RenderPolicy, RenderedHour};
