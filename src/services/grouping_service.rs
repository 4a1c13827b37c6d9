// src/services/grouping_service.rs
//
// Submission Grouper
//
// CRITICAL RULES:
// - Partition: every identity lands in exactly one group
// - Groups appear in first-seen order, members in input order
// - Groups are never merged or split afterwards

use std::collections::HashMap;

use crate::domain::{DomainResult, SubmissionGroup, SubmissionIdentity, SubmissionKey};

/// Bucket identities by logical-submission key
pub fn group_identities(
    identities: Vec<SubmissionIdentity>,
) -> DomainResult<Vec<SubmissionGroup>> {
    let mut positions: HashMap<SubmissionKey, usize> = HashMap::new();
    let mut groups: Vec<SubmissionGroup> = Vec::new();

    for identity in identities {
        let key = identity.key();
        match positions.get(&key).copied() {
            Some(position) => groups[position].push(identity)?,
            None => {
                positions.insert(key, groups.len());
                groups.push(SubmissionGroup::new(identity));
            }
        }
    }

    Ok(groups)
}
