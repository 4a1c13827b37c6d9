// src/services/ambiguity_detector.rs
//
// Duplicate / Ambiguity Detector
//
// Finds the filing problems that make a group unsafe to resolve automatically.
// Revision ties come from the revision resolver; everything else is found here.
//
// CRITICAL RULES:
// - Collect every reason, do not stop at the first
// - Area names are compared exactly (a typo is a conflict, not a match)
// - A group is judged alone; other groups never influence it

use std::path::PathBuf;

use crate::domain::{AmbiguityReason, CategoryLabel, ParseFailure, SubmissionGroup};

/// All non-revision reasons to hold `group` for review
pub fn detect(group: &SubmissionGroup, failures: &[ParseFailure]) -> Vec<AmbiguityReason> {
    let mut reasons = Vec::new();

    let areas = distinct(group.members().iter().map(|m| m.area.clone()));
    let labels: Vec<CategoryLabel> = distinct(
        group
            .members()
            .iter()
            .filter_map(|m| m.category.clone()),
    );

    if areas.len() > 1 || labels.len() > 1 {
        reasons.push(AmbiguityReason::MetadataConflict {
            areas: if areas.len() > 1 { areas } else { Vec::new() },
            categories: if labels.len() > 1 {
                labels.iter().map(|label| label.to_string()).collect()
            } else {
                Vec::new()
            },
        });
    }

    for label in &labels {
        if let CategoryLabel::Unrecognized(raw) = label {
            reasons.push(AmbiguityReason::UnrecognizedCategory { label: raw.clone() });
        }
    }

    let shadowing: Vec<PathBuf> = failures
        .iter()
        .filter(|failure| failure.would_be_key.as_ref() == Some(group.key()))
        .map(|failure| failure.path.clone())
        .collect();
    if !shadowing.is_empty() {
        reasons.push(AmbiguityReason::UnparseableMember { paths: shadowing });
    }

    reasons
}

/// Unique values in first-seen order
fn distinct<T: PartialEq>(values: impl Iterator<Item = T>) -> Vec<T> {
    let mut unique = Vec::new();
    for value in values {
        if !unique.contains(&value) {
            unique.push(value);
        }
    }
    unique
}
