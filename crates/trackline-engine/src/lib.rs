#![forbid(unsafe_code)]

//! Change monitoring and overlap repair for a percent-based programme track.
//!
//! The host owns the track; this crate owns the repair loop around it:
//!
//! 1. The host notifies a change (insertion, removal, resize — causes are
//!    not distinguished).
//! 2. The [`monitor::ChangeMonitor`] debounces the burst, then runs one
//!    synchronous cycle: detect overlaps, fix each pair through the
//!    [`host::HostAdapter`], and, when enabled, slide blocks left to
//!    close gaps.
//! 3. The [`guard::LoopGuard`] watches the cycle rate. Repairing the
//!    track is itself a change, so without the guard the engine would
//!    feed itself forever; the guard converts that liveness hazard into a
//!    fail-safe degradation by permanently disabling automatic gap
//!    filling while overlap repair keeps working.
//!
//! Pure geometry and planning live in `trackline-core`; this crate adds
//! the state, the clock boundary, and a thread-backed [`driver`] for
//! hosts with a real notification feed.

pub mod driver;
pub mod engine;
pub mod guard;
pub mod host;
pub mod monitor;

pub use driver::{ChangeFeed, DriverHandle};
pub use engine::{AppliedFix, CycleReport, run_cycle};
pub use guard::{GuardDecision, LoopGuard};
pub use host::{HostAdapter, HostError, MemoryHost};
pub use monitor::{ChangeMonitor, FixRecord, MonitorStatus, Phase};
