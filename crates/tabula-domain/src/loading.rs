//! Loading flags - one in-flight slot per remote operation
//!
//! A slot holds the epoch of the call that owns it, or zero when idle.
//! Acquiring a slot yields a [`LoadingGuard`] that clears it on drop, so
//! the flag is released on every exit path, including task abort. A
//! guard only ever clears its own epoch: after a cancel or reset has
//! released the slot (and possibly a newer call re-acquired it) a late
//! guard neither clears the newer flag nor reports itself current.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

const IDLE: u64 = 0;

/// The three remote operations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperationKind {
    /// Schema creation
    Schema,
    /// Text processing
    Process,
    /// CSV export
    Export,
}

impl OperationKind {
    /// Every operation kind
    pub const ALL: [OperationKind; 3] = [
        OperationKind::Schema,
        OperationKind::Process,
        OperationKind::Export,
    ];

    /// Get the kind name as a string
    pub fn as_str(&self) -> &'static str {
        match self {
            OperationKind::Schema => "schema",
            OperationKind::Process => "process",
            OperationKind::Export => "export",
        }
    }

    /// Parse a kind name
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "schema" => Some(OperationKind::Schema),
            "process" => Some(OperationKind::Process),
            "export" => Some(OperationKind::Export),
            _ => None,
        }
    }
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Point-in-time view of all three flags
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadingSnapshot {
    /// Schema creation in flight
    pub schema: bool,
    /// Processing in flight
    pub process: bool,
    /// Export in flight
    pub export: bool,
}

impl LoadingSnapshot {
    /// Flag for one operation
    pub fn get(&self, kind: OperationKind) -> bool {
        match kind {
            OperationKind::Schema => self.schema,
            OperationKind::Process => self.process,
            OperationKind::Export => self.export,
        }
    }

    /// True when nothing is in flight
    pub fn is_idle(&self) -> bool {
        !(self.schema || self.process || self.export)
    }
}

/// Independent in-flight flags for schema, process and export
#[derive(Debug, Default)]
pub struct LoadingFlags {
    schema: Arc<AtomicU64>,
    process: Arc<AtomicU64>,
    export: Arc<AtomicU64>,
    next_epoch: AtomicU64,
}

impl LoadingFlags {
    /// All flags idle
    pub fn new() -> Self {
        Self::default()
    }

    fn slot(&self, kind: OperationKind) -> &Arc<AtomicU64> {
        match kind {
            OperationKind::Schema => &self.schema,
            OperationKind::Process => &self.process,
            OperationKind::Export => &self.export,
        }
    }

    /// Whether an operation is in flight
    pub fn is_loading(&self, kind: OperationKind) -> bool {
        self.slot(kind).load(Ordering::Acquire) != IDLE
    }

    /// Snapshot of every flag
    pub fn snapshot(&self) -> LoadingSnapshot {
        LoadingSnapshot {
            schema: self.is_loading(OperationKind::Schema),
            process: self.is_loading(OperationKind::Process),
            export: self.is_loading(OperationKind::Export),
        }
    }

    /// Set the flag for `kind`, or `None` when that operation is already in flight
    pub fn acquire(&self, kind: OperationKind) -> Option<LoadingGuard> {
        let epoch = self.next_epoch.fetch_add(1, Ordering::Relaxed) + 1;
        let slot = self.slot(kind);
        slot.compare_exchange(IDLE, epoch, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| LoadingGuard {
                kind,
                epoch,
                slot: Arc::clone(slot),
            })
    }

    /// Clear one flag, superseding the call that held it
    ///
    /// Returns whether anything was in flight.
    pub fn release(&self, kind: OperationKind) -> bool {
        self.slot(kind).swap(IDLE, Ordering::AcqRel) != IDLE
    }

    /// Clear every flag
    pub fn release_all(&self) {
        for kind in OperationKind::ALL {
            self.release(kind);
        }
    }
}

/// Scoped ownership of one loading flag
#[derive(Debug)]
pub struct LoadingGuard {
    kind: OperationKind,
    epoch: u64,
    slot: Arc<AtomicU64>,
}

impl LoadingGuard {
    /// Operation this guard covers
    pub fn kind(&self) -> OperationKind {
        self.kind
    }

    /// Unique acquisition number
    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    /// False once the flag was released or taken over by a newer call
    pub fn is_current(&self) -> bool {
        self.slot.load(Ordering::Acquire) == self.epoch
    }
}

impl Drop for LoadingGuard {
    fn drop(&mut self) {
        let _ = self.slot.compare_exchange(
            self.epoch,
            IDLE,
            Ordering::AcqRel,
            Ordering::Acquire,
        );
    }
}
