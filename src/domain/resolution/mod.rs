// src/domain/resolution/mod.rs
//
// Resolution Domain
//
// Value objects describing the outcome of grouping and revision resolution.
//
// CRITICAL RULES:
// - All types are pure value objects
// - No side effects, no persistence
// - No event emission (that's the service's job)

pub mod value_objects;

pub use value_objects::{
    AmbiguityReason,
    AmbiguityReport,
    ConversionFailure,
    ConversionStage,
    DiscardedRevision,
    GroupOutcome,
    ParseFailure,
    ProducedFile,
    ResolvedGroup,
    ResolvedSubmission,
    SubmissionGroup,
    UnparseableReason,
};
