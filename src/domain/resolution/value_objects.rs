// src/domain/resolution/value_objects.rs
//
// Resolution Value Objects
//
// Pure data structures describing what the resolution phase decided about
// every scanned file. They are the only input the layout planner, the
// conversion driver and the audit report see.
//
// CRITICAL INVARIANTS:
// - A group is never empty and all members share one key
// - A group yields exactly one GroupOutcome (resolved XOR ambiguous)
// - No I/O, no clocks: same input → same values

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

use crate::domain::submission::{SubmissionIdentity, SubmissionKey};
use crate::domain::{DomainError, DomainResult};

// ============================================================================
// PARSE FAILURES (UnparseableName)
// ============================================================================

/// A file that could not be read through the naming convention.
/// Excluded from grouping, always reported.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParseFailure {
    pub path: PathBuf,
    pub reason: UnparseableReason,

    /// Key the file would have had if only its extension was wrong.
    /// Used to hold that group for review.
    pub would_be_key: Option<SubmissionKey>,
}

impl ParseFailure {
    pub fn new(path: PathBuf, reason: UnparseableReason) -> Self {
        Self {
            path,
            reason,
            would_be_key: None,
        }
    }

    pub fn with_key(mut self, key: SubmissionKey) -> Self {
        self.would_be_key = Some(key);
        self
    }
}

/// Why a filename was rejected
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "detail")]
pub enum UnparseableReason {
    #[error("expected at least 4 name fields, found {0}")]
    TooFewTokens(usize),

    #[error("expected at most 6 name fields, found {0}")]
    TooManyTokens(usize),

    #[error("empty name field at position {0}")]
    EmptyToken(usize),

    #[error("name field {0:?} looks like an index or revision marker")]
    MisplacedMarker(String),

    #[error("trailing field {0:?} is neither an index nor an R<n> revision")]
    UnrecognizedToken(String),

    #[error("unsupported extension .{0}")]
    UnsupportedExtension(String),

    #[error("file has no extension")]
    MissingExtension,

    #[error("filename is not valid UTF-8")]
    NonUtf8,

    #[error("file is not under Papers/<area>/ or Posters/<category>/<area>/: {0}")]
    UnexpectedLocation(String),

    #[error("cannot be read: {0}")]
    Unreadable(String),
}

// ============================================================================
// SUBMISSION GROUP
// ============================================================================

/// All identities sharing one logical-submission key
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmissionGroup {
    key: SubmissionKey,
    members: Vec<SubmissionIdentity>,
}

impl SubmissionGroup {
    /// Opens a group with its first member
    pub fn new(first: SubmissionIdentity) -> Self {
        Self {
            key: first.key(),
            members: vec![first],
        }
    }

    /// Builds a group from a full member list
    pub fn from_members(members: Vec<SubmissionIdentity>) -> DomainResult<Self> {
        let mut members = members.into_iter();
        let first = members.next().ok_or_else(|| {
            DomainError::InvariantViolation("Submission group cannot be empty".to_string())
        })?;

        let mut group = Self::new(first);
        for member in members {
            group.push(member)?;
        }
        Ok(group)
    }

    pub(crate) fn push(&mut self, identity: SubmissionIdentity) -> DomainResult<()> {
        if identity.key() != self.key {
            return Err(DomainError::InvariantViolation(format!(
                "{:?} does not belong to group {}",
                identity.path, self.key
            )));
        }
        self.members.push(identity);
        Ok(())
    }

    pub fn key(&self) -> &SubmissionKey {
        &self.key
    }

    pub fn members(&self) -> &[SubmissionIdentity] {
        &self.members
    }

    pub fn paths(&self) -> Vec<PathBuf> {
        self.members.iter().map(|m| m.path.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}

// ============================================================================
// RESOLVED GROUP / RESOLVED SUBMISSION
// ============================================================================

/// An older revision removed in favour of the kept one
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiscardedRevision {
    pub path: PathBuf,
    pub revision: u32,
    pub kept_revision: u32,
}

/// A group whose maximum revision is unique
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedGroup {
    pub key: SubmissionKey,
    pub kept: SubmissionIdentity,
    pub discarded: Vec<DiscardedRevision>,
}

/// The kept file plus where it goes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedSubmission {
    pub identity: SubmissionIdentity,
    pub destination: PathBuf,

    /// Only posters get a QR code
    pub qr_link: Option<String>,
}

// ============================================================================
// AMBIGUITY
// ============================================================================

/// Why a group needs a human decision
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum AmbiguityReason {
    /// Two or more members share the maximum revision
    RevisionTie { revision: u32, paths: Vec<PathBuf> },

    /// Members are filed under different areas or categories
    MetadataConflict {
        areas: Vec<String>,
        categories: Vec<String>,
    },

    /// Poster filed under a category directory that is not Core/Non-core/Associated
    UnrecognizedCategory { label: String },

    /// An unparseable file carries this group's name and might be its newest revision
    UnparseableMember { paths: Vec<PathBuf> },
}

impl AmbiguityReason {
    /// Taxonomy name used in reports
    pub fn taxonomy(&self) -> &'static str {
        match self {
            AmbiguityReason::RevisionTie { .. } => "RevisionTieAmbiguity",
            AmbiguityReason::MetadataConflict { .. }
            | AmbiguityReason::UnrecognizedCategory { .. } => "MetadataConflictAmbiguity",
            AmbiguityReason::UnparseableMember { .. } => "UnparseableName",
        }
    }
}

impl std::fmt::Display for AmbiguityReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AmbiguityReason::RevisionTie { revision, paths } => {
                write!(f, "{} files share the latest revision R{}", paths.len(), revision)
            }
            AmbiguityReason::MetadataConflict { areas, categories } => {
                write!(f, "filed inconsistently")?;
                if areas.len() > 1 {
                    write!(f, "; areas: {}", areas.join(", "))?;
                }
                if categories.len() > 1 {
                    write!(f, "; categories: {}", categories.join(", "))?;
                }
                Ok(())
            }
            AmbiguityReason::UnrecognizedCategory { label } => {
                write!(f, "unknown poster category {:?}", label)
            }
            AmbiguityReason::UnparseableMember { paths } => {
                write!(f, "{} unparseable file(s) carry this name", paths.len())
            }
        }
    }
}

/// A group that failed resolution. Terminal: no output is produced for it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AmbiguityReport {
    pub key: SubmissionKey,
    pub reasons: Vec<AmbiguityReason>,

    /// Every member of the group, for direct review
    pub paths: Vec<PathBuf>,
}

// ============================================================================
// GROUP OUTCOME (TOP-LEVEL RESULT PER GROUP)
// ============================================================================

/// Resolved or ambiguous, never both
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum GroupOutcome {
    Resolved(ResolvedGroup),
    Ambiguous(AmbiguityReport),
}

impl GroupOutcome {
    pub fn is_resolved(&self) -> bool {
        matches!(self, GroupOutcome::Resolved(_))
    }

    pub fn resolved(&self) -> Option<&ResolvedGroup> {
        match self {
            GroupOutcome::Resolved(group) => Some(group),
            GroupOutcome::Ambiguous(_) => None,
        }
    }

    pub fn ambiguity(&self) -> Option<&AmbiguityReport> {
        match self {
            GroupOutcome::Resolved(_) => None,
            GroupOutcome::Ambiguous(report) => Some(report),
        }
    }

    pub fn key(&self) -> &SubmissionKey {
        match self {
            GroupOutcome::Resolved(group) => &group.key,
            GroupOutcome::Ambiguous(report) => &report.key,
        }
    }
}

// ============================================================================
// CONVERSION RESULTS
// ============================================================================

/// Step of the conversion pipeline that failed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConversionStage {
    Prepare,
    Copy,
    Render,
    Stamp,
}

impl std::fmt::Display for ConversionStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConversionStage::Prepare => write!(f, "prepare"),
            ConversionStage::Copy => write!(f, "copy"),
            ConversionStage::Render => write!(f, "render"),
            ConversionStage::Stamp => write!(f, "stamp"),
        }
    }
}

/// One resolved submission whose output could not be produced
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversionFailure {
    pub source: PathBuf,
    pub destination: PathBuf,
    pub stage: ConversionStage,
    pub message: String,
}

/// One output file that was written
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProducedFile {
    pub source: PathBuf,
    pub destination: PathBuf,
    pub stamped: bool,
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::submission::{DocumentKind, SourceFormat};

    fn paper(last: &str, revision: u32) -> SubmissionIdentity {
        SubmissionIdentity {
            last_name: last.to_string(),
            first_name: "Wen".to_string(),
            school: "UTK".to_string(),
            advisor: "Wang".to_string(),
            index: 1,
            revision,
            kind: DocumentKind::Paper,
            format: SourceFormat::Word,
            path: PathBuf::from(format!("/in/Papers/Area/{}_Wen_UTK_Wang_1_R{}.docx", last, revision)),
            area: "Area".to_string(),
            category: None,
        }
    }

    #[test]
    fn test_group_rejects_foreign_member() {
        let result = SubmissionGroup::from_members(vec![paper("Zhang", 0), paper("Li", 0)]);
        assert!(matches!(result, Err(DomainError::InvariantViolation(_))));
    }

    #[test]
    fn test_group_cannot_be_empty() {
        assert!(SubmissionGroup::from_members(Vec::new()).is_err());
    }

    #[test]
    fn test_group_keeps_member_order() {
        let group =
            SubmissionGroup::from_members(vec![paper("Zhang", 2), paper("zhang", 0)]).unwrap();
        assert_eq!(group.len(), 2);
        assert_eq!(group.members()[0].revision, 2);
        assert_eq!(group.members()[1].revision, 0);
    }

    #[test]
    fn test_outcome_accessors() {
        let group = paper("Zhang", 1);
        let resolved = GroupOutcome::Resolved(ResolvedGroup {
            key: group.key(),
            kept: group.clone(),
            discarded: Vec::new(),
        });
        assert!(resolved.is_resolved());
        assert!(resolved.resolved().is_some());
        assert!(resolved.ambiguity().is_none());

        let ambiguous = GroupOutcome::Ambiguous(AmbiguityReport {
            key: group.key(),
            reasons: vec![AmbiguityReason::RevisionTie {
                revision: 1,
                paths: vec![group.path.clone()],
            }],
            paths: vec![group.path.clone()],
        });
        assert!(!ambiguous.is_resolved());
        assert_eq!(ambiguous.key(), &group.key());
    }

    #[test]
    fn test_reason_taxonomy() {
        let tie = AmbiguityReason::RevisionTie {
            revision: 1,
            paths: Vec::new(),
        };
        let conflict = AmbiguityReason::MetadataConflict {
            areas: vec!["A".to_string(), "B".to_string()],
            categories: Vec::new(),
        };
        assert_eq!(tie.taxonomy(), "RevisionTieAmbiguity");
        assert_eq!(conflict.taxonomy(), "MetadataConflictAmbiguity");
        assert_eq!(conflict.to_string(), "filed inconsistently; areas: A, B");
    }

    #[test]
    fn test_unparseable_reason_display() {
        assert_eq!(
            UnparseableReason::TooFewTokens(3).to_string(),
            "expected at least 4 name fields, found 3"
        );
        assert_eq!(
            UnparseableReason::UnsupportedExtension("key".to_string()).to_string(),
            "unsupported extension .key"
        );
    }
}
