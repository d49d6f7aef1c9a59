#![forbid(unsafe_code)]

//! Interval geometry and layout planning for a percent-based timeline.
//!
//! Programme blocks sit on a horizontal track as `(left%, width%)`
//! intervals. This crate holds the pure half of the repair pipeline:
//! detecting overlapping blocks, computing corrective geometry for an
//! overlapping pair, finding empty spans between blocks, and planning the
//! slide that closes them. Nothing here touches a host, a clock, or any
//! presentation layer; every function is a query over an interval slice.
//!
//! The stateful half (change monitoring, debounce, the feedback-loop
//! breaker) lives in `trackline-engine`.

pub mod config;
pub mod detect;
pub mod gaps;
pub mod geometry;
pub mod resolve;

pub use config::{ConfigError, EngineConfig};
pub use detect::{OverlapPair, detect};
pub use gaps::{Gap, find_gaps, plan_gap_fill};
pub use geometry::{
    BlockId, DEFAULT_TIMELINE_MINUTES, Interval, left_pct_for_start, sorted_by_left,
    width_pct_for_duration,
};
pub use resolve::{FixKind, GeometryPatch, PairFix, TIMELINE_SPAN_PCT, resolve_pair};
