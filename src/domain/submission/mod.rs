pub mod entity;
pub mod invariants;

pub use entity::{
    CategoryLabel, DocumentKind, PosterCategory, SourceFormat, SubmissionIdentity, SubmissionKey,
};
pub use invariants::validate_identity;
