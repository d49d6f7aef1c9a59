#![forbid(unsafe_code)]

//! Host adapter contract.
//!
//! The programme track is owned by the host; the engine never keeps its
//! own copy. Every cycle starts from a fresh [`HostAdapter::list_intervals`]
//! snapshot, and every corrective write goes back through
//! [`HostAdapter::set_geometry`], which must be synchronous: a write is
//! immediately visible to a following snapshot.

use trackline_core::{BlockId, Interval};

/// Failure surfaced by a host write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostError {
    /// The block's backing element no longer exists in the host.
    MissingBlock(BlockId),
}

impl std::fmt::Display for HostError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingBlock(id) => write!(f, "block {id} no longer exists in the host"),
        }
    }
}

impl std::error::Error for HostError {}

/// The host's read/write surface for block geometry.
pub trait HostAdapter {
    /// Snapshot the current block geometry, in the host's enumeration
    /// order. Called at the start of every cycle.
    fn list_intervals(&self) -> Vec<Interval>;

    /// Apply one geometry write. Must be synchronous and immediately
    /// observable by a subsequent [`Self::list_intervals`] call.
    fn set_geometry(&mut self, id: BlockId, left: f64, width: f64) -> Result<(), HostError>;

    /// Refresh presentational affordances tied to block width.
    ///
    /// Called once after a gap-fill pass. Default: no-op.
    fn refresh_presentation(&mut self) {}
}

/// In-memory reference host.
///
/// Holds a plain block list and records every write, so tests can assert
/// on both the final geometry and the write sequence. Blocks can be
/// removed mid-test to exercise the missing-block path.
#[derive(Debug, Clone, Default)]
pub struct MemoryHost {
    blocks: Vec<Interval>,
    writes: Vec<(BlockId, f64, f64)>,
    refreshes: u32,
}

impl MemoryHost {
    /// Create an empty host.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a host pre-populated with blocks.
    #[must_use]
    pub fn with_blocks(blocks: impl IntoIterator<Item = Interval>) -> Self {
        Self {
            blocks: blocks.into_iter().collect(),
            ..Self::default()
        }
    }

    /// Add a block.
    pub fn insert(&mut self, block: Interval) {
        self.blocks.push(block);
    }

    /// Remove a block, simulating host-side deletion.
    ///
    /// Returns `true` if the block existed.
    pub fn remove(&mut self, id: BlockId) -> bool {
        let before = self.blocks.len();
        self.blocks.retain(|iv| iv.id != id);
        self.blocks.len() != before
    }

    /// Every `(id, left, width)` write applied so far, in order.
    #[must_use]
    pub fn writes(&self) -> &[(BlockId, f64, f64)] {
        &self.writes
    }

    /// How many presentation refreshes were requested.
    #[must_use]
    pub fn refreshes(&self) -> u32 {
        self.refreshes
    }

    /// Current geometry of a block, if it exists.
    #[must_use]
    pub fn get(&self, id: BlockId) -> Option<Interval> {
        self.blocks.iter().copied().find(|iv| iv.id == id)
    }
}

impl HostAdapter for MemoryHost {
    fn list_intervals(&self) -> Vec<Interval> {
        self.blocks.clone()
    }

    fn set_geometry(&mut self, id: BlockId, left: f64, width: f64) -> Result<(), HostError> {
        let block = self
            .blocks
            .iter_mut()
            .find(|iv| iv.id == id)
            .ok_or(HostError::MissingBlock(id))?;
        block.left = left;
        block.width = width;
        self.writes.push((id, left, width));
        Ok(())
    }

    fn refresh_presentation(&mut self) {
        self.refreshes += 1;
    }
}
