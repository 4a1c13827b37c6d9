// src/events/resolution_events.rs
//
// Resolution Events
//
// Facts produced by the parse → group → resolve phase.
//
// CRITICAL INVARIANTS:
// - All events are deterministic (no timestamps in payload)
// - Event IDs are derived from a content fingerprint
// - occurred_at() returns SENTINEL_TIMESTAMP (Unix epoch)
//
// Re-running resolution over the same tree therefore emits byte-identical
// events, which keeps the event log comparable between runs.

use crate::events::DomainEvent;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// Sentinel timestamp for resolution events (Unix epoch).
const SENTINEL_TIMESTAMP: DateTime<Utc> = DateTime::<Utc>::UNIX_EPOCH;

fn fingerprint(prefix: &str, parts: &[&str]) -> String {
    let mut hasher = Sha256::new();
    for part in parts {
        hasher.update(part.as_bytes());
        hasher.update([0u8]);
    }
    format!("{}:{:x}", prefix, hasher.finalize())
}

fn path_str(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}

// ============================================================================
// FILE REJECTED EVENT
// ============================================================================

/// Emitted for every filename that does not follow the convention
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FileRejected {
    pub file_path: PathBuf,
    pub reason: String,
    pub fingerprint: String,
}

impl FileRejected {
    pub fn new(file_path: PathBuf, reason: String) -> Self {
        let fingerprint = fingerprint("rejected", &[&path_str(&file_path), &reason]);
        Self {
            file_path,
            reason,
            fingerprint,
        }
    }
}

impl DomainEvent for FileRejected {
    fn event_id(&self) -> Uuid {
        Uuid::new_v5(&Uuid::NAMESPACE_OID, self.fingerprint.as_bytes())
    }

    fn occurred_at(&self) -> DateTime<Utc> {
        SENTINEL_TIMESTAMP
    }

    fn event_type(&self) -> &'static str {
        "FileRejected"
    }
}

// ============================================================================
// SUBMISSION RESOLVED EVENT
// ============================================================================

/// Emitted when a group resolves to a single kept file
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SubmissionResolved {
    pub submission_key: String,
    pub kept_path: PathBuf,
    pub kept_revision: u32,
    pub discarded_count: usize,
    pub fingerprint: String,
}

impl SubmissionResolved {
    pub fn new(
        submission_key: String,
        kept_path: PathBuf,
        kept_revision: u32,
        discarded_count: usize,
    ) -> Self {
        let fingerprint = fingerprint(
            "resolved",
            &[
                &submission_key,
                &path_str(&kept_path),
                &kept_revision.to_string(),
            ],
        );
        Self {
            submission_key,
            kept_path,
            kept_revision,
            discarded_count,
            fingerprint,
        }
    }
}

impl DomainEvent for SubmissionResolved {
    fn event_id(&self) -> Uuid {
        Uuid::new_v5(&Uuid::NAMESPACE_OID, self.fingerprint.as_bytes())
    }

    fn occurred_at(&self) -> DateTime<Utc> {
        SENTINEL_TIMESTAMP
    }

    fn event_type(&self) -> &'static str {
        "SubmissionResolved"
    }
}

// ============================================================================
// REVISION DISCARDED EVENT
// ============================================================================

/// Emitted for every older revision removed from the output
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RevisionDiscarded {
    pub submission_key: String,
    pub file_path: PathBuf,
    pub revision: u32,
    pub kept_revision: u32,
    pub fingerprint: String,
}

impl RevisionDiscarded {
    pub fn new(submission_key: String, file_path: PathBuf, revision: u32, kept_revision: u32) -> Self {
        let fingerprint = fingerprint(
            "discarded",
            &[&submission_key, &path_str(&file_path), &revision.to_string()],
        );
        Self {
            submission_key,
            file_path,
            revision,
            kept_revision,
            fingerprint,
        }
    }
}

impl DomainEvent for RevisionDiscarded {
    fn event_id(&self) -> Uuid {
        Uuid::new_v5(&Uuid::NAMESPACE_OID, self.fingerprint.as_bytes())
    }

    fn occurred_at(&self) -> DateTime<Utc> {
        SENTINEL_TIMESTAMP
    }

    fn event_type(&self) -> &'static str {
        "RevisionDiscarded"
    }
}

// ============================================================================
// AMBIGUITY DETECTED EVENT
// ============================================================================

/// Emitted when a group is held for manual review
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AmbiguityDetected {
    pub submission_key: String,
    pub reasons: Vec<String>,
    pub paths: Vec<PathBuf>,
    pub fingerprint: String,
}

impl AmbiguityDetected {
    pub fn new(submission_key: String, reasons: Vec<String>, paths: Vec<PathBuf>) -> Self {
        let mut parts: Vec<String> = vec![submission_key.clone()];
        parts.extend(reasons.iter().cloned());
        parts.extend(paths.iter().map(|p| path_str(p)));
        let borrowed: Vec<&str> = parts.iter().map(String::as_str).collect();
        let fingerprint = fingerprint("ambiguous", &borrowed);

        Self {
            submission_key,
            reasons,
            paths,
            fingerprint,
        }
    }
}

impl DomainEvent for AmbiguityDetected {
    fn event_id(&self) -> Uuid {
        Uuid::new_v5(&Uuid::NAMESPACE_OID, self.fingerprint.as_bytes())
    }

    fn occurred_at(&self) -> DateTime<Utc> {
        SENTINEL_TIMESTAMP
    }

    fn event_type(&self) -> &'static str {
        "AmbiguityDetected"
    }
}

// ============================================================================
// RESOLUTION BATCH COMPLETED EVENT
// ============================================================================

/// Emitted once per run after every group has an outcome
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ResolutionBatchCompleted {
    pub total_groups: usize,
    pub resolved_count: usize,
    pub ambiguous_count: usize,
    pub unparseable_count: usize,
}

impl ResolutionBatchCompleted {
    pub fn new(
        total_groups: usize,
        resolved_count: usize,
        ambiguous_count: usize,
        unparseable_count: usize,
    ) -> Self {
        Self {
            total_groups,
            resolved_count,
            ambiguous_count,
            unparseable_count,
        }
    }
}

impl DomainEvent for ResolutionBatchCompleted {
    fn event_id(&self) -> Uuid {
        let fp = fingerprint(
            "batch",
            &[
                &self.total_groups.to_string(),
                &self.resolved_count.to_string(),
                &self.ambiguous_count.to_string(),
                &self.unparseable_count.to_string(),
            ],
        );
        Uuid::new_v5(&Uuid::NAMESPACE_OID, fp.as_bytes())
    }

    fn occurred_at(&self) -> DateTime<Utc> {
        SENTINEL_TIMESTAMP
    }

    fn event_type(&self) -> &'static str {
        "ResolutionBatchCompleted"
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    /// Identical input produces identical events
    #[test]
    fn test_identical_input_produces_identical_events() {
        let event1 = SubmissionResolved::new(
            "zhang_wen_utk_wang_1 (paper)".to_string(),
            PathBuf::from("/in/Papers/Area/Zhang_Wen_UTK_Wang_1_R1.docx"),
            1,
            1,
        );
        let event2 = SubmissionResolved::new(
            "zhang_wen_utk_wang_1 (paper)".to_string(),
            PathBuf::from("/in/Papers/Area/Zhang_Wen_UTK_Wang_1_R1.docx"),
            1,
            1,
        );

        assert_eq!(event1, event2);
        assert_eq!(event1.event_id(), event2.event_id());
        assert_eq!(
            serde_json::to_string(&event1).unwrap(),
            serde_json::to_string(&event2).unwrap()
        );
    }

    #[test]
    fn test_different_payloads_produce_different_event_ids() {
        let first = FileRejected::new(PathBuf::from("/in/a.txt"), "unsupported".to_string());
        let second = FileRejected::new(PathBuf::from("/in/b.txt"), "unsupported".to_string());

        assert_ne!(first.event_id(), second.event_id());
    }

    #[test]
    fn test_resolution_events_use_sentinel_timestamp() {
        let event = AmbiguityDetected::new(
            "key".to_string(),
            vec!["tie".to_string()],
            vec![PathBuf::from("/in/x.pdf")],
        );
        assert_eq!(event.occurred_at(), DateTime::<Utc>::UNIX_EPOCH);
        assert_eq!(event.event_type(), "AmbiguityDetected");
    }
}
