use super::entity::{DocumentKind, SubmissionIdentity};
use crate::domain::{DomainError, DomainResult};

/// Validates all SubmissionIdentity invariants
pub fn validate_identity(identity: &SubmissionIdentity) -> DomainResult<()> {
    validate_names(identity)?;
    validate_filing(identity)?;
    Ok(())
}

/// Name fields must be non-empty and must not contain the field delimiter
fn validate_names(identity: &SubmissionIdentity) -> DomainResult<()> {
    let fields = [
        ("last name", &identity.last_name),
        ("first name", &identity.first_name),
        ("school", &identity.school),
        ("advisor", &identity.advisor),
    ];

    for (label, value) in fields {
        if value.trim().is_empty() {
            return Err(DomainError::InvariantViolation(format!(
                "Submission {} cannot be empty: {:?}",
                label, identity.path
            )));
        }
        if value.contains('_') {
            return Err(DomainError::InvariantViolation(format!(
                "Submission {} cannot contain '_': {:?}",
                label, value
            )));
        }
    }

    Ok(())
}

/// Posters carry a category, papers never do; both carry an area
fn validate_filing(identity: &SubmissionIdentity) -> DomainResult<()> {
    if identity.area.trim().is_empty() {
        return Err(DomainError::InvariantViolation(format!(
            "Submission area cannot be empty: {:?}",
            identity.path
        )));
    }

    match (identity.kind, &identity.category) {
        (DocumentKind::Paper, Some(_)) => Err(DomainError::InvariantViolation(format!(
            "Papers have no category: {:?}",
            identity.path
        ))),
        (DocumentKind::Poster, None) => Err(DomainError::InvariantViolation(format!(
            "Posters must carry a category: {:?}",
            identity.path
        ))),
        _ => Ok(()),
    }
}
