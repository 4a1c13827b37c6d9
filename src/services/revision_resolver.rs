// src/services/revision_resolver.rs
//
// Revision Resolver
//
// CRITICAL RULES:
// - A unique maximum revision is kept, every other member is discarded
// - A tied maximum is never broken (not by extension, not by mtime)

use crate::domain::{AmbiguityReason, DiscardedRevision, ResolvedGroup, SubmissionGroup};

/// Pick the newest member of a group, or report the tie that prevents it
pub fn select_latest(group: &SubmissionGroup) -> Result<ResolvedGroup, AmbiguityReason> {
    let latest = group
        .members()
        .iter()
        .map(|member| member.revision)
        .max()
        .unwrap_or_default();

    let newest: Vec<_> = group
        .members()
        .iter()
        .filter(|member| member.revision == latest)
        .collect();

    match newest.as_slice() {
        [kept] => Ok(ResolvedGroup {
            key: group.key().clone(),
            kept: (*kept).clone(),
            discarded: group
                .members()
                .iter()
                .filter(|member| member.revision != latest)
                .map(|member| DiscardedRevision {
                    path: member.path.clone(),
                    revision: member.revision,
                    kept_revision: latest,
                })
                .collect(),
        }),
        tied => Err(AmbiguityReason::RevisionTie {
            revision: latest,
            paths: tied.iter().map(|member| member.path.clone()).collect(),
        }),
    }
}
