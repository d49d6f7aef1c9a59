#![forbid(unsafe_code)]

//! Change monitor: debounce, cycle dispatch, and the loop-guard latch.
//!
//! The monitor is an explicit state machine, not a set of busy flags:
//!
//! - `Idle --(change notification)--> Debouncing`, arming a deadline of
//!   `now + debounce_ms`. Further notifications re-arm it, so a burst
//!   collapses into one cycle that sees only the latest snapshot.
//! - `Debouncing --(deadline passed)--> Running`, executing one full
//!   cycle synchronously inside [`ChangeMonitor::poll`].
//! - `Running --(cycle completes)--> Idle`, after the loop guard records
//!   the cycle. If the guard trips, automatic gap filling is cleared and
//!   stays off until the host explicitly re-enables it.
//!
//! One cycle at a time is structural: the cycle runs to completion inside
//! `poll`, which takes `&mut self`, so a second cycle cannot start while
//! one is in flight. Change notifications raised by the engine's own
//! geometry writes reach the host's feed during the cycle and are
//! delivered afterwards; they simply arm the next debounce. The guard is
//! what keeps that loop finite.
//!
//! Time is passed in as milliseconds on every call, so the monitor is
//! fully deterministic under test. The thread-backed driver supplies
//! wall-clock time in production.

use serde::Serialize;
use trackline_core::{ConfigError, EngineConfig, FixKind};

use crate::engine::{CycleReport, run_cycle};
use crate::guard::{GuardDecision, LoopGuard};
use crate::host::HostAdapter;

/// Applied fixes retained for inspection.
const FIX_HISTORY_CAP: usize = 256;

/// Externally visible monitor phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    /// No work pending.
    Idle,
    /// A cycle is armed and waiting out the quiet period.
    Debouncing,
    /// The loop guard is latched; cycles still run but never gap-fill.
    Disabled,
}

/// One applied fix, timestamped for the history ring.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FixRecord {
    /// Monitor clock at cycle completion, in ms.
    pub at_ms: u64,
    /// First block of the pair.
    pub a: trackline_core::BlockId,
    /// Second block of the pair.
    pub b: trackline_core::BlockId,
    /// Strategy used.
    pub kind: FixKind,
}

/// Snapshot of monitor state for host-side introspection.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonitorStatus {
    /// Current phase.
    pub phase: Phase,
    /// Whether automatic gap filling is currently configured on.
    pub auto_fill_gaps: bool,
    /// Whether time-derived positions are preserved.
    pub preserve_time_positions: bool,
    /// Whether the loop guard is latched.
    pub guard_tripped: bool,
    /// Cycles recorded in the guard's current window.
    pub cycles_in_window: u32,
    /// Applied fixes retained in the history ring.
    pub history_len: usize,
}

/// Debounced change monitor driving the repair cycle.
#[derive(Debug)]
pub struct ChangeMonitor {
    config: EngineConfig,
    guard: LoopGuard,
    deadline_ms: Option<u64>,
    history: Vec<FixRecord>,
}

impl ChangeMonitor {
    /// Create a monitor with a validated configuration.
    pub fn new(config: EngineConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            config,
            guard: LoopGuard::new(),
            deadline_ms: None,
            history: Vec::new(),
        })
    }

    /// Create a monitor with the default configuration.
    #[must_use]
    pub fn with_defaults() -> Self {
        Self {
            config: EngineConfig::default(),
            guard: LoopGuard::new(),
            deadline_ms: None,
            history: Vec::new(),
        }
    }

    /// Record a host change notification at `now_ms`.
    ///
    /// Arms (or re-arms) the debounce deadline; bursts inside the quiet
    /// period collapse into a single cycle.
    pub fn notify_change(&mut self, now_ms: u64) {
        let deadline = now_ms + self.config.debounce_ms;
        if self.deadline_ms.is_none() {
            tracing::debug!(deadline_ms = deadline, "change notification, arming debounce");
        }
        self.deadline_ms = Some(deadline);
    }

    /// Run the armed cycle if its deadline has passed.
    ///
    /// Returns the cycle report when a cycle ran, `None` otherwise. The
    /// cycle executes synchronously against `host`'s current snapshot.
    pub fn poll<H: HostAdapter + ?Sized>(
        &mut self,
        host: &mut H,
        now_ms: u64,
    ) -> Option<CycleReport> {
        let deadline = self.deadline_ms?;
        if now_ms < deadline {
            return None;
        }
        self.deadline_ms = None;

        let fill_allowed = self.config.auto_fill_gaps
            && !self.config.preserve_time_positions
            && !self.guard.is_tripped();
        let report = run_cycle(host, &self.config, fill_allowed);

        for fix in &report.fixes {
            if self.history.len() == FIX_HISTORY_CAP {
                self.history.remove(0);
            }
            self.history.push(FixRecord {
                at_ms: now_ms,
                a: fix.a,
                b: fix.b,
                kind: fix.kind,
            });
        }

        let decision = self.guard.record_cycle(
            now_ms,
            self.config.loop_window_ms,
            self.config.max_cycles_per_window,
        );
        if decision == GuardDecision::Tripped && self.config.auto_fill_gaps {
            self.config.auto_fill_gaps = false;
            tracing::warn!(
                cycles = self.guard.cycles_in_window(),
                window_ms = self.config.loop_window_ms,
                "feedback loop detected, disabling automatic gap filling"
            );
        }

        Some(report)
    }

    /// Deadline of the armed cycle, if any. For schedulers and drivers.
    #[must_use]
    pub fn next_deadline(&self) -> Option<u64> {
        self.deadline_ms
    }

    /// Current phase.
    #[must_use]
    pub fn phase(&self) -> Phase {
        if self.deadline_ms.is_some() {
            Phase::Debouncing
        } else if self.guard.is_tripped() {
            Phase::Disabled
        } else {
            Phase::Idle
        }
    }

    /// Replace the configuration between cycles.
    ///
    /// An invalid configuration is rejected and the previous one stays in
    /// force.
    pub fn set_config(&mut self, config: EngineConfig) -> Result<(), ConfigError> {
        config.validate()?;
        self.config = config;
        Ok(())
    }

    /// Current configuration.
    #[must_use]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Switch automatic gap filling.
    ///
    /// Re-enabling after a guard trip also requires [`Self::reset_guard`];
    /// a latched guard keeps gap filling off regardless of this flag.
    pub fn set_auto_fill(&mut self, enabled: bool) {
        self.config.auto_fill_gaps = enabled;
    }

    /// Flip automatic gap filling, returning the new value.
    pub fn toggle_gap_filling(&mut self) -> bool {
        self.config.auto_fill_gaps = !self.config.auto_fill_gaps;
        self.config.auto_fill_gaps
    }

    /// Switch preservation of time-derived positions.
    pub fn set_preserve_time_positions(&mut self, enabled: bool) {
        self.config.preserve_time_positions = enabled;
    }

    /// Flip preservation of time-derived positions, returning the new value.
    pub fn toggle_time_positions(&mut self) -> bool {
        self.config.preserve_time_positions = !self.config.preserve_time_positions;
        self.config.preserve_time_positions
    }

    /// Clear the loop guard's latch and counters.
    pub fn reset_guard(&mut self) {
        self.guard.reset();
    }

    /// Whether the loop guard is latched.
    #[must_use]
    pub fn guard_tripped(&self) -> bool {
        self.guard.is_tripped()
    }

    /// Applied fixes, oldest first, capped at 256 entries.
    #[must_use]
    pub fn fix_history(&self) -> &[FixRecord] {
        &self.history
    }

    /// Snapshot of the monitor for host-side introspection.
    #[must_use]
    pub fn status(&self) -> MonitorStatus {
        MonitorStatus {
            phase: self.phase(),
            auto_fill_gaps: self.config.auto_fill_gaps,
            preserve_time_positions: self.config.preserve_time_positions,
            guard_tripped: self.guard.is_tripped(),
            cycles_in_window: self.guard.cycles_in_window(),
            history_len: self.history.len(),
        }
    }
}
