//! Observable events
//!
//! Every log line emitted by the crate names one of these events.

use std::fmt;

use super::Severity;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    // Configuration
    ConfigLoaded,

    // Collection lifecycle
    CollectionOpened,
    CollectionClosed,
    CollectionDeleted,
    ResourceRemoved,

    // Ingestion
    DocumentAdded,
    IngestionFailed,

    // Transaction lease
    /// Running write transaction handed out again
    WriteTrxReused,
    /// New write transaction opened
    WriteTrxOpened,
    /// Resource reported a running write transaction but had no handle
    WriteTrxHandleMissing,
    ReadTrxOpened,

    // Revision resolution
    WriteTrxReverted,
    /// Revert not attempted because the target is not before the latest
    RevertSkipped,
    /// First lookup landed after the requested time and was stepped back
    SnapshotSteppedBack,
    SnapshotResolved,
    /// No revision exists at the requested time
    SnapshotAbsent,
    AmbiguousResource,

    // Item streaming
    ItemStreamExhausted,
}

impl Event {
    /// Returns the string representation of the event
    pub fn as_str(&self) -> &'static str {
        match self {
            Event::ConfigLoaded => "CONFIG_LOADED",

            Event::CollectionOpened => "COLLECTION_OPENED",
            Event::CollectionClosed => "COLLECTION_CLOSED",
            Event::CollectionDeleted => "COLLECTION_DELETED",
            Event::ResourceRemoved => "RESOURCE_REMOVED",

            Event::DocumentAdded => "DOCUMENT_ADDED",
            Event::IngestionFailed => "DOCUMENT_INGESTION_FAILED",

            Event::WriteTrxReused => "WRITE_TRX_REUSED",
            Event::WriteTrxOpened => "WRITE_TRX_OPENED",
            Event::WriteTrxHandleMissing => "WRITE_TRX_HANDLE_MISSING",
            Event::ReadTrxOpened => "READ_TRX_OPENED",

            Event::WriteTrxReverted => "WRITE_TRX_REVERTED",
            Event::RevertSkipped => "REVERT_SKIPPED",
            Event::SnapshotSteppedBack => "SNAPSHOT_STEPPED_BACK",
            Event::SnapshotResolved => "SNAPSHOT_RESOLVED",
            Event::SnapshotAbsent => "SNAPSHOT_ABSENT",
            Event::AmbiguousResource => "AMBIGUOUS_RESOURCE",

            Event::ItemStreamExhausted => "ITEM_STREAM_EXHAUSTED",
        }
    }

    /// Severity the event is logged at
    pub fn severity(&self) -> Severity {
        match self {
            Event::IngestionFailed | Event::AmbiguousResource => Severity::Error,
            Event::WriteTrxHandleMissing | Event::RevertSkipped => Severity::Warn,
            Event::ReadTrxOpened | Event::ItemStreamExhausted => Severity::Trace,
            _ => Severity::Info,
        }
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
