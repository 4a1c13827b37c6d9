// src/services/resolution_service.rs
//
// Resolution Service
//
// Turns scanned identities into one outcome per logical submission.
//
// CRITICAL RULES:
// - Consumes the scan outcome, never touches the filesystem
// - Every group yields exactly one GroupOutcome (resolved XOR ambiguous)
// - An ambiguous group is terminal; it never blocks other groups
// - Deterministic: same input → same output
// - Idempotent: running twice produces identical results and identical events
//
// ORDER PER GROUP:
// 1. Detect filing problems (metadata conflict, unknown category, unparseable sibling)
// 2. Select the latest revision (a tie is one more reason)
// 3. Any reason → AmbiguityReport, otherwise ResolvedGroup

use std::sync::Arc;

use crate::domain::{
    AmbiguityReport, DiscardedRevision, GroupOutcome, ParseFailure, ResolvedGroup,
    SubmissionGroup,
};
use crate::error::AppResult;
use crate::events::{
    AmbiguityDetected, EventBus, ResolutionBatchCompleted, RevisionDiscarded, SubmissionResolved,
};
use crate::services::ambiguity_detector;
use crate::services::grouping_service::group_identities;
use crate::services::revision_resolver::select_latest;
use crate::services::scan_service::ScanOutcome;

// ============================================================================
// RESOLUTION BATCH
// ============================================================================

/// Outcome of one resolution pass over a scanned tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolutionBatch {
    /// One entry per group, in first-seen order
    pub outcomes: Vec<GroupOutcome>,

    /// Files rejected by the parser, in scan order
    pub unparseable: Vec<ParseFailure>,
}

impl ResolutionBatch {
    pub fn resolved(&self) -> impl Iterator<Item = &ResolvedGroup> {
        self.outcomes.iter().filter_map(GroupOutcome::resolved)
    }

    pub fn ambiguous(&self) -> impl Iterator<Item = &AmbiguityReport> {
        self.outcomes.iter().filter_map(GroupOutcome::ambiguity)
    }

    pub fn discarded(&self) -> impl Iterator<Item = &DiscardedRevision> {
        self.resolved().flat_map(|group| group.discarded.iter())
    }

    pub fn resolved_count(&self) -> usize {
        self.resolved().count()
    }

    pub fn ambiguous_count(&self) -> usize {
        self.ambiguous().count()
    }
}

// ============================================================================
// RESOLUTION SERVICE
// ============================================================================

pub struct ResolutionService {
    event_bus: Arc<EventBus>,
}

impl ResolutionService {
    pub fn new(event_bus: Arc<EventBus>) -> Self {
        Self { event_bus }
    }

    /// Group the scanned identities and resolve every group
    pub fn resolve(&self, scan: ScanOutcome) -> AppResult<ResolutionBatch> {
        let groups = group_identities(scan.identities)?;
        let total_groups = groups.len();

        let outcomes: Vec<GroupOutcome> = groups
            .iter()
            .map(|group| {
                let outcome = resolve_group(group, &scan.failures);
                self.emit_outcome_events(&outcome);
                outcome
            })
            .collect();

        let batch = ResolutionBatch {
            outcomes,
            unparseable: scan.failures,
        };

        log::info!(
            "Resolved {} of {} submissions; {} held for review, {} unparseable files",
            batch.resolved_count(),
            total_groups,
            batch.ambiguous_count(),
            batch.unparseable.len()
        );

        self.event_bus.emit(ResolutionBatchCompleted::new(
            total_groups,
            batch.resolved_count(),
            batch.ambiguous_count(),
            batch.unparseable.len(),
        ));

        Ok(batch)
    }

    fn emit_outcome_events(&self, outcome: &GroupOutcome) {
        match outcome {
            GroupOutcome::Resolved(group) => {
                let key = group.key.to_string();
                for discarded in &group.discarded {
                    self.event_bus.emit(RevisionDiscarded::new(
                        key.clone(),
                        discarded.path.clone(),
                        discarded.revision,
                        discarded.kept_revision,
                    ));
                }
                self.event_bus.emit(SubmissionResolved::new(
                    key,
                    group.kept.path.clone(),
                    group.kept.revision,
                    group.discarded.len(),
                ));
            }
            GroupOutcome::Ambiguous(report) => {
                let reasons: Vec<String> = report
                    .reasons
                    .iter()
                    .map(|reason| format!("{}: {}", reason.taxonomy(), reason))
                    .collect();
                log::warn!("Holding {} for review: {}", report.key, reasons.join("; "));
                self.event_bus.emit(AmbiguityDetected::new(
                    report.key.to_string(),
                    reasons,
                    report.paths.clone(),
                ));
            }
        }
    }
}

/// Resolve one group against the run's parse failures
pub fn resolve_group(group: &SubmissionGroup, failures: &[ParseFailure]) -> GroupOutcome {
    let mut reasons = ambiguity_detector::detect(group, failures);

    let selection = select_latest(group);
    match selection {
        Ok(resolved) if reasons.is_empty() => return GroupOutcome::Resolved(resolved),
        Ok(_) => {}
        Err(tie) => reasons.push(tie),
    }

    GroupOutcome::Ambiguous(AmbiguityReport {
        key: group.key().clone(),
        reasons,
        paths: group.paths(),
    })
}
