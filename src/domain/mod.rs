// src/domain/mod.rs
//
// Domain Root - The Single Source of Truth for Domain API
//
// All other modules import from `crate::domain::*`

// ============================================================================
// MODULE DECLARATIONS
// ============================================================================

pub mod resolution;
pub mod submission;

// ============================================================================
// PUBLIC API RE-EXPORTS
// ============================================================================

// Submission Domain
pub use submission::{
    validate_identity, CategoryLabel, DocumentKind, PosterCategory, SourceFormat,
    SubmissionIdentity, SubmissionKey,
};

// Resolution Domain
pub use resolution::{
    AmbiguityReason, AmbiguityReport, ConversionFailure, ConversionStage, DiscardedRevision,
    GroupOutcome, ParseFailure, ProducedFile, ResolvedGroup, ResolvedSubmission,
    SubmissionGroup, UnparseableReason,
};

// ============================================================================
// DOMAIN ERROR TYPES
// ============================================================================

use thiserror::Error;

/// Domain-level errors
/// These represent violations of invariants, never expected bad input
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Invariant violation: {0}")]
    InvariantViolation(String),
}

/// Domain result type
pub type DomainResult<T> = Result<T, DomainError>;
