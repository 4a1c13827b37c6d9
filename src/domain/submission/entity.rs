use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// One file, read through the submission naming convention
///
/// `Lastname_Firstname_School_Advisor[_Index][_R<Revision>].<ext>`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmissionIdentity {
    pub last_name: String,
    pub first_name: String,
    pub school: String,
    pub advisor: String,

    /// Distinguishes several submissions by the same author (default 1)
    pub index: u32,

    /// Higher is newer (default 0)
    pub revision: u32,

    /// Paper or poster, from the top-level directory
    pub kind: DocumentKind,

    /// Source format, from the file extension
    pub format: SourceFormat,

    /// Where the file was found
    pub path: PathBuf,

    /// Research area (enclosing directory name)
    pub area: String,

    /// Poster category; always `None` for papers
    pub category: Option<CategoryLabel>,
}

impl SubmissionIdentity {
    /// The logical-submission key this file belongs to
    pub fn key(&self) -> SubmissionKey {
        SubmissionKey::new(
            &self.last_name,
            &self.first_name,
            &self.school,
            &self.advisor,
            self.index,
            self.kind,
        )
    }

    /// `Last_First_School_Advisor_Index`, the name every output file carries
    pub fn canonical_stem(&self) -> String {
        format!(
            "{}_{}_{}_{}_{}",
            self.last_name, self.first_name, self.school, self.advisor, self.index
        )
    }

    /// Canonical stem plus the revision marker, as listed in the CSV exports
    pub fn canonical_name(&self) -> String {
        format!("{}_R{}", self.canonical_stem(), self.revision)
    }
}

/// Key of a logical submission. Name fields are stored lower-cased so that
/// `Zhang_Wen` and `zhang_wen` land in the same group.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SubmissionKey {
    pub last_name: String,
    pub first_name: String,
    pub school: String,
    pub advisor: String,
    pub index: u32,
    pub kind: DocumentKind,
}

impl SubmissionKey {
    pub fn new(
        last_name: &str,
        first_name: &str,
        school: &str,
        advisor: &str,
        index: u32,
        kind: DocumentKind,
    ) -> Self {
        Self {
            last_name: last_name.to_lowercase(),
            first_name: first_name.to_lowercase(),
            school: school.to_lowercase(),
            advisor: advisor.to_lowercase(),
            index,
            kind,
        }
    }
}

impl std::fmt::Display for SubmissionKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}_{}_{}_{}_{} ({})",
            self.last_name, self.first_name, self.school, self.advisor, self.index, self.kind
        )
    }
}

/// Paper or poster
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentKind {
    Paper,
    Poster,
}

impl DocumentKind {
    /// Top-level directory name, both in the input tree and the output tree
    pub fn dir_name(&self) -> &'static str {
        match self {
            DocumentKind::Paper => "Papers",
            DocumentKind::Poster => "Posters",
        }
    }

    /// Match a top-level directory name, ignoring case
    pub fn from_dir_name(name: &str) -> Option<Self> {
        if name.eq_ignore_ascii_case("papers") {
            Some(DocumentKind::Paper)
        } else if name.eq_ignore_ascii_case("posters") {
            Some(DocumentKind::Poster)
        } else {
            None
        }
    }
}

impl std::fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DocumentKind::Paper => write!(f, "paper"),
            DocumentKind::Poster => write!(f, "poster"),
        }
    }
}

/// Source document family, from the extension
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceFormat {
    /// .doc / .docx
    Word,
    /// .ppt / .pptx
    Slides,
    /// Already a PDF, copied as-is
    Pdf,
}

impl SourceFormat {
    /// Infer the format from an extension (case-insensitive)
    pub fn from_extension(extension: &str) -> Option<Self> {
        match extension.to_ascii_lowercase().as_str() {
            "doc" | "docx" => Some(SourceFormat::Word),
            "ppt" | "pptx" => Some(SourceFormat::Slides),
            "pdf" => Some(SourceFormat::Pdf),
            _ => None,
        }
    }

    pub fn needs_rendering(&self) -> bool {
        !matches!(self, SourceFormat::Pdf)
    }
}

impl std::fmt::Display for SourceFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SourceFormat::Word => write!(f, "word"),
            SourceFormat::Slides => write!(f, "slides"),
            SourceFormat::Pdf => write!(f, "pdf"),
        }
    }
}

/// The three poster categories
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PosterCategory {
    Core,
    NonCore,
    Associated,
}

impl PosterCategory {
    pub fn dir_name(&self) -> &'static str {
        match self {
            PosterCategory::Core => "Core",
            PosterCategory::NonCore => "Non-core",
            PosterCategory::Associated => "Associated",
        }
    }

    pub fn all() -> [PosterCategory; 3] {
        [
            PosterCategory::Core,
            PosterCategory::NonCore,
            PosterCategory::Associated,
        ]
    }
}

/// A poster category directory as found on disk.
///
/// Unknown labels are kept verbatim instead of being rejected at parse time,
/// so the group they belong to can be held for review.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CategoryLabel {
    Known(PosterCategory),
    Unrecognized(String),
}

impl CategoryLabel {
    pub fn from_dir_name(name: &str) -> Self {
        PosterCategory::all()
            .into_iter()
            .find(|category| category.dir_name().eq_ignore_ascii_case(name.trim()))
            .map(CategoryLabel::Known)
            .unwrap_or_else(|| CategoryLabel::Unrecognized(name.to_string()))
    }

    pub fn known(&self) -> Option<PosterCategory> {
        match self {
            CategoryLabel::Known(category) => Some(*category),
            CategoryLabel::Unrecognized(_) => None,
        }
    }
}

impl std::fmt::Display for CategoryLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CategoryLabel::Known(category) => write!(f, "{}", category.dir_name()),
            CategoryLabel::Unrecognized(label) => write!(f, "{}", label),
        }
    }
}
