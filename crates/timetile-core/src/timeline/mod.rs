//! Timeline value types.
//!
//! This module provides:
//! - [`Activity`]: a named span of user time
//! - [`Fragment`]: a bounded piece of an activity, the unit of storage
//! - [`Interval`]: a fixed-size tile with the fragments inside it
//! - [`RenderBlock`] / [`PartialBlock`]: display-ready blocks and their builder
//!
//! All of them are immutable; every "change" produces a new value.

mod activity;
mod block;
mod fragment;
mod interval;

pub use activity::Activity;
pub use block::{PartialBlock, RenderBlock, TimeBlock};
pub use fragment::Fragment;
pub use interval::Interval;
