// events/types.rs
//
// Domain events outside the resolution phase.
// Each event represents an immutable fact that has already occurred.
//
// CRITICAL RULES:
// - Events are facts, not commands
// - Events carry only the data needed to react
// - No business logic in event types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use uuid::Uuid;

/// Trait that all domain events must implement
pub trait DomainEvent: std::fmt::Debug + Clone {
    /// Unique identifier for this event instance
    fn event_id(&self) -> Uuid;

    /// When this event occurred
    fn occurred_at(&self) -> DateTime<Utc>;

    /// Human-readable event type name
    fn event_type(&self) -> &'static str;
}

// ============================================================================
// SCANNING EVENTS
// ============================================================================

/// Emitted when a directory scan completes
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DirectoryScanned {
    pub event_id: Uuid,
    pub occurred_at: DateTime<Utc>,
    pub directory_path: PathBuf,
    pub files_found: usize,
    pub files_skipped: usize,
}

impl DirectoryScanned {
    pub fn new(directory_path: PathBuf, files_found: usize, files_skipped: usize) -> Self {
        Self {
            event_id: Uuid::new_v4(),
            occurred_at: Utc::now(),
            directory_path,
            files_found,
            files_skipped,
        }
    }
}

impl DomainEvent for DirectoryScanned {
    fn event_id(&self) -> Uuid { self.event_id }
    fn occurred_at(&self) -> DateTime<Utc> { self.occurred_at }
    fn event_type(&self) -> &'static str { "DirectoryScanned" }
}

// ============================================================================
// CONVERSION EVENTS
// ============================================================================

/// Emitted when an output PDF has been written (and stamped, for posters)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmissionConverted {
    pub event_id: Uuid,
    pub occurred_at: DateTime<Utc>,
    pub source: PathBuf,
    pub destination: PathBuf,
    pub stamped: bool,
}

impl SubmissionConverted {
    pub fn new(source: PathBuf, destination: PathBuf, stamped: bool) -> Self {
        Self {
            event_id: Uuid::new_v4(),
            occurred_at: Utc::now(),
            source,
            destination,
            stamped,
        }
    }
}

impl DomainEvent for SubmissionConverted {
    fn event_id(&self) -> Uuid { self.event_id }
    fn occurred_at(&self) -> DateTime<Utc> { self.occurred_at }
    fn event_type(&self) -> &'static str { "SubmissionConverted" }
}

/// Emitted when one submission's output could not be produced
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversionFailed {
    pub event_id: Uuid,
    pub occurred_at: DateTime<Utc>,
    pub source: PathBuf,
    pub destination: PathBuf,
    pub stage: String,
    pub message: String,
}

impl ConversionFailed {
    pub fn new(source: PathBuf, destination: PathBuf, stage: String, message: String) -> Self {
        Self {
            event_id: Uuid::new_v4(),
            occurred_at: Utc::now(),
            source,
            destination,
            stage,
            message,
        }
    }
}

impl DomainEvent for ConversionFailed {
    fn event_id(&self) -> Uuid { self.event_id }
    fn occurred_at(&self) -> DateTime<Utc> { self.occurred_at }
    fn event_type(&self) -> &'static str { "ConversionFailed" }
}

/// Emitted when the conversion fan-out has drained
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversionBatchCompleted {
    pub event_id: Uuid,
    pub occurred_at: DateTime<Utc>,
    pub produced_count: usize,
    pub failed_count: usize,
    pub duration_ms: u64,
}

impl ConversionBatchCompleted {
    pub fn new(produced_count: usize, failed_count: usize, duration_ms: u64) -> Self {
        Self {
            event_id: Uuid::new_v4(),
            occurred_at: Utc::now(),
            produced_count,
            failed_count,
            duration_ms,
        }
    }
}

impl DomainEvent for ConversionBatchCompleted {
    fn event_id(&self) -> Uuid { self.event_id }
    fn occurred_at(&self) -> DateTime<Utc> { self.occurred_at }
    fn event_type(&self) -> &'static str { "ConversionBatchCompleted" }
}
