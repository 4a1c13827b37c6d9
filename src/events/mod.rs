// src/events/mod.rs
//
// Internal Event System - Public API
//
// CRITICAL: EventHandler is INTERNAL and must NOT be exported

pub mod bus;
pub mod types;

// Deterministic events of the parse → group → resolve phase
pub mod resolution_events;

// ============================================================================
// PUBLIC EXPORTS - Event Types and Bus Only
// ============================================================================

pub use types::DomainEvent;

pub use types::{
    ConversionBatchCompleted,
    ConversionFailed,
    DirectoryScanned,
    SubmissionConverted,
};

pub use resolution_events::{
    AmbiguityDetected,
    FileRejected,
    ResolutionBatchCompleted,
    RevisionDiscarded,
    SubmissionResolved,
};

pub use bus::{EventBus, EventLogEntry};

/// Initialize a new event bus
pub fn create_event_bus() -> EventBus {
    EventBus::new()
}
