// src/services/filename_parser.rs
//
// Filename Parser
//
// Reads one file path through the submission naming convention:
//
//   <root>/Papers/<area>/Last_First_School_Advisor[_Index][_R<Rev>].<ext>
//   <root>/Posters/<category>/<area>/Last_First_School_Advisor[_Index][_R<Rev>].<ext>
//
// CRITICAL RULES:
// - Pure: no filesystem access, only the path itself is inspected
// - Strict: no fuzzy matching, a name either parses or it is rejected
// - Deterministic: same path → same identity or same failure
// - Index defaults to 1, revision defaults to 0

use regex::Regex;
use std::path::{Component, Path};

use crate::domain::{
    validate_identity, CategoryLabel, DocumentKind, ParseFailure, SourceFormat,
    SubmissionIdentity, SubmissionKey, UnparseableReason,
};

const REQUIRED_TOKENS: usize = 4;
const MAX_TOKENS: usize = REQUIRED_TOKENS + 2;

pub const DEFAULT_INDEX: u32 = 1;
pub const DEFAULT_REVISION: u32 = 0;

/// The name fields of a stem, before location and extension are considered
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NameTokens {
    pub last_name: String,
    pub first_name: String,
    pub school: String,
    pub advisor: String,
    pub index: u32,
    pub revision: u32,
}

impl NameTokens {
    fn key(&self, kind: DocumentKind) -> SubmissionKey {
        SubmissionKey::new(
            &self.last_name,
            &self.first_name,
            &self.school,
            &self.advisor,
            self.index,
            kind,
        )
    }
}

/// Where a file sits inside the input tree
#[derive(Debug, Clone, PartialEq, Eq)]
struct Filing {
    kind: DocumentKind,
    area: String,
    category: Option<CategoryLabel>,
}

// ============================================================================
// FILENAME RULES
// ============================================================================

/// Compiled patterns of the naming convention
pub struct FilenameRules {
    /// Runs of underscores, with any whitespace around them
    separator: Regex,

    /// Whitespace runs inside a field
    whitespace: Regex,

    /// `1`, `02`
    index_marker: Regex,

    /// `R1`, `r12`
    revision_marker: Regex,
}

impl Default for FilenameRules {
    fn default() -> Self {
        Self {
            separator: Regex::new(r"\s*_+\s*").unwrap(),
            whitespace: Regex::new(r"\s+").unwrap(),
            index_marker: Regex::new(r"^\d+$").unwrap(),
            revision_marker: Regex::new(r"^[Rr](\d+)$").unwrap(),
        }
    }
}

impl FilenameRules {
    /// Split a file stem into name fields, index and revision
    pub fn tokenize(&self, stem: &str) -> Result<NameTokens, UnparseableReason> {
        let stem = stem.trim();
        if stem.is_empty() {
            return Err(UnparseableReason::TooFewTokens(0));
        }

        let tokens: Vec<String> = self
            .separator
            .split(stem)
            .map(|token| self.whitespace.replace_all(token.trim(), " ").into_owned())
            .collect();

        if tokens.len() < REQUIRED_TOKENS {
            return Err(UnparseableReason::TooFewTokens(tokens.len()));
        }
        if tokens.len() > MAX_TOKENS {
            return Err(UnparseableReason::TooManyTokens(tokens.len()));
        }
        if let Some(position) = tokens.iter().position(|token| token.is_empty()) {
            return Err(UnparseableReason::EmptyToken(position + 1));
        }

        let (required, trailing) = tokens.split_at(REQUIRED_TOKENS);

        if let Some(marker) = required.iter().find(|token| self.is_marker(token)) {
            return Err(UnparseableReason::MisplacedMarker(marker.clone()));
        }

        let (index, revision) = self.parse_trailing(trailing)?;

        Ok(NameTokens {
            last_name: required[0].clone(),
            first_name: required[1].clone(),
            school: required[2].clone(),
            advisor: required[3].clone(),
            index,
            revision,
        })
    }

    /// Parse a file found under `root`
    ///
    /// Checks run in order: name fields, location, extension. When only the
    /// extension is wrong the failure carries the key the file would have had.
    pub fn parse(&self, root: &Path, path: &Path) -> Result<SubmissionIdentity, ParseFailure> {
        let reject = |reason: UnparseableReason| ParseFailure::new(path.to_path_buf(), reason);

        let file_name = path
            .file_name()
            .ok_or_else(|| reject(UnparseableReason::MissingExtension))?
            .to_str()
            .ok_or_else(|| reject(UnparseableReason::NonUtf8))?;

        let (stem, extension) = split_extension(file_name);
        let tokens = self.tokenize(stem).map_err(reject)?;
        let filing = locate(root, path).map_err(reject)?;

        let format = match extension {
            None => Err(UnparseableReason::MissingExtension),
            Some(ext) => SourceFormat::from_extension(ext)
                .ok_or_else(|| UnparseableReason::UnsupportedExtension(ext.to_string())),
        }
        .map_err(|reason| reject(reason).with_key(tokens.key(filing.kind)))?;

        let identity = SubmissionIdentity {
            last_name: tokens.last_name,
            first_name: tokens.first_name,
            school: tokens.school,
            advisor: tokens.advisor,
            index: tokens.index,
            revision: tokens.revision,
            kind: filing.kind,
            format,
            path: path.to_path_buf(),
            area: filing.area,
            category: filing.category,
        };

        validate_identity(&identity)
            .map_err(|e| reject(UnparseableReason::UnexpectedLocation(e.to_string())))?;

        Ok(identity)
    }

    fn is_marker(&self, token: &str) -> bool {
        self.index_marker.is_match(token) || self.revision_marker.is_match(token)
    }

    fn parse_index(&self, token: &str) -> Option<u32> {
        if self.index_marker.is_match(token) {
            token.parse().ok()
        } else {
            None
        }
    }

    fn parse_revision(&self, token: &str) -> Option<u32> {
        self.revision_marker
            .captures(token)
            .and_then(|captures| captures.get(1))
            .and_then(|digits| digits.as_str().parse().ok())
    }

    /// `[]`, `[index]`, `[R<rev>]` or `[index, R<rev>]`
    fn parse_trailing(&self, trailing: &[String]) -> Result<(u32, u32), UnparseableReason> {
        let unrecognized = |token: &String| UnparseableReason::UnrecognizedToken(token.clone());

        match trailing {
            [] => Ok((DEFAULT_INDEX, DEFAULT_REVISION)),
            [only] => {
                if let Some(index) = self.parse_index(only) {
                    Ok((index, DEFAULT_REVISION))
                } else if let Some(revision) = self.parse_revision(only) {
                    Ok((DEFAULT_INDEX, revision))
                } else {
                    Err(unrecognized(only))
                }
            }
            [first, second] => {
                let index = self.parse_index(first).ok_or_else(|| unrecognized(first))?;
                let revision = self.parse_revision(second).ok_or_else(|| unrecognized(second))?;
                Ok((index, revision))
            }
            // tokenize() caps the count
            _ => Err(UnparseableReason::TooManyTokens(REQUIRED_TOKENS + trailing.len())),
        }
    }
}

/// `name.ext` → (`name`, Some(`ext`)); a leading dot is not an extension
fn split_extension(file_name: &str) -> (&str, Option<&str>) {
    match file_name.rfind('.') {
        Some(dot) if dot > 0 => (&file_name[..dot], Some(&file_name[dot + 1..])),
        _ => (file_name, None),
    }
}

/// Match the path against `Papers/<area>/<file>` or `Posters/<category>/<area>/<file>`
fn locate(root: &Path, path: &Path) -> Result<Filing, UnparseableReason> {
    let relative = path
        .strip_prefix(root)
        .map_err(|_| UnparseableReason::UnexpectedLocation(path.display().to_string()))?;

    let mut parts = Vec::new();
    for component in relative.components() {
        match component {
            Component::Normal(part) => {
                parts.push(part.to_str().ok_or(UnparseableReason::NonUtf8)?)
            }
            _ => {
                return Err(UnparseableReason::UnexpectedLocation(
                    relative.display().to_string(),
                ))
            }
        }
    }

    let unexpected = || UnparseableReason::UnexpectedLocation(relative.display().to_string());

    match parts.as_slice() {
        [top, area, _file] if DocumentKind::from_dir_name(top) == Some(DocumentKind::Paper) => {
            Ok(Filing {
                kind: DocumentKind::Paper,
                area: area.to_string(),
                category: None,
            })
        }
        [top, category, area, _file]
            if DocumentKind::from_dir_name(top) == Some(DocumentKind::Poster) =>
        {
            Ok(Filing {
                kind: DocumentKind::Poster,
                area: area.to_string(),
                category: Some(CategoryLabel::from_dir_name(category)),
            })
        }
        _ => Err(unexpected()),
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::PosterCategory;
    use std::path::PathBuf;

    fn root() -> PathBuf {
        PathBuf::from("/data/2024 Annual Site Visit")
    }

    fn paper(name: &str) -> PathBuf {
        root().join("Papers").join("Hardware Testbed").join(name)
    }

    #[test]
    fn test_full_name_parses() {
        let rules = FilenameRules::default();
        let identity = rules
            .parse(&root(), &paper("Zhang_Wen_UTK_Wang_2_R3.docx"))
            .unwrap();

        assert_eq!(identity.last_name, "Zhang");
        assert_eq!(identity.first_name, "Wen");
        assert_eq!(identity.school, "UTK");
        assert_eq!(identity.advisor, "Wang");
        assert_eq!(identity.index, 2);
        assert_eq!(identity.revision, 3);
        assert_eq!(identity.kind, DocumentKind::Paper);
        assert_eq!(identity.format, SourceFormat::Word);
        assert_eq!(identity.area, "Hardware Testbed");
        assert_eq!(identity.category, None);
    }

    #[test]
    fn test_defaults_when_index_and_revision_are_omitted() {
        let rules = FilenameRules::default();

        let bare = rules.tokenize("Zhang_Wen_UTK_Wang").unwrap();
        assert_eq!((bare.index, bare.revision), (DEFAULT_INDEX, DEFAULT_REVISION));

        let index_only = rules.tokenize("Zhang_Wen_UTK_Wang_3").unwrap();
        assert_eq!((index_only.index, index_only.revision), (3, 0));

        let revision_only = rules.tokenize("Zhang_Wen_UTK_Wang_r2").unwrap();
        assert_eq!((revision_only.index, revision_only.revision), (1, 2));
    }

    #[test]
    fn test_separator_tolerates_spaces_and_repeated_underscores() {
        let rules = FilenameRules::default();
        let tokens = rules.tokenize(" Zhang _ Wen__UTK_Fran   Wang _R1 ").unwrap();

        assert_eq!(tokens.last_name, "Zhang");
        assert_eq!(tokens.first_name, "Wen");
        assert_eq!(tokens.advisor, "Fran Wang");
        assert_eq!(tokens.revision, 1);
    }

    #[test]
    fn test_too_few_fields() {
        let rules = FilenameRules::default();
        let failure = rules
            .parse(&root(), &paper("Zhang_Wen_UTK.docx"))
            .unwrap_err();

        assert_eq!(failure.reason, UnparseableReason::TooFewTokens(3));
        assert_eq!(failure.would_be_key, None);
    }

    #[test]
    fn test_too_many_fields() {
        let rules = FilenameRules::default();
        assert_eq!(
            rules.tokenize("A_B_C_D_1_R1_extra"),
            Err(UnparseableReason::TooManyTokens(7))
        );
    }

    #[test]
    fn test_empty_field() {
        let rules = FilenameRules::default();
        assert_eq!(
            rules.tokenize("_Wen_UTK_Wang"),
            Err(UnparseableReason::EmptyToken(1))
        );
    }

    #[test]
    fn test_marker_in_name_field_is_rejected() {
        let rules = FilenameRules::default();
        assert_eq!(
            rules.tokenize("Zhang_Wen_UTK_R1"),
            Err(UnparseableReason::MisplacedMarker("R1".to_string()))
        );
        assert_eq!(
            rules.tokenize("Zhang_Wen_2_Wang"),
            Err(UnparseableReason::MisplacedMarker("2".to_string()))
        );
    }

    #[test]
    fn test_unrecognized_trailing_fields() {
        let rules = FilenameRules::default();
        assert_eq!(
            rules.tokenize("Zhang_Wen_UTK_Wang_final"),
            Err(UnparseableReason::UnrecognizedToken("final".to_string()))
        );
        // revision before index
        assert_eq!(
            rules.tokenize("Zhang_Wen_UTK_Wang_R1_2"),
            Err(UnparseableReason::UnrecognizedToken("R1".to_string()))
        );
    }

    #[test]
    fn test_unsupported_extension_keeps_would_be_key() {
        let rules = FilenameRules::default();
        let failure = rules
            .parse(&root(), &paper("Zhang_Wen_UTK_Wang_1_R2.key"))
            .unwrap_err();

        assert_eq!(
            failure.reason,
            UnparseableReason::UnsupportedExtension("key".to_string())
        );
        assert_eq!(
            failure.would_be_key,
            Some(SubmissionKey::new("zhang", "wen", "utk", "wang", 1, DocumentKind::Paper))
        );
    }

    #[test]
    fn test_missing_extension() {
        let rules = FilenameRules::default();
        let failure = rules
            .parse(&root(), &paper("Zhang_Wen_UTK_Wang"))
            .unwrap_err();
        assert_eq!(failure.reason, UnparseableReason::MissingExtension);
    }

    #[test]
    fn test_poster_location() {
        let rules = FilenameRules::default();
        let path = root()
            .join("posters")
            .join("non-core")
            .join("Grid Control")
            .join("Ma_Yiwei_UTK_Wang.PPTX");

        let identity = rules.parse(&root(), &path).unwrap();
        assert_eq!(identity.kind, DocumentKind::Poster);
        assert_eq!(identity.format, SourceFormat::Slides);
        assert_eq!(identity.area, "Grid Control");
        assert_eq!(
            identity.category,
            Some(CategoryLabel::Known(PosterCategory::NonCore))
        );
    }

    #[test]
    fn test_unknown_poster_category_is_kept() {
        let rules = FilenameRules::default();
        let path = root()
            .join("Posters")
            .join("Keynote")
            .join("Grid Control")
            .join("Ma_Yiwei_UTK_Wang.pdf");

        let identity = rules.parse(&root(), &path).unwrap();
        assert_eq!(
            identity.category,
            Some(CategoryLabel::Unrecognized("Keynote".to_string()))
        );
    }

    #[test]
    fn test_unexpected_location() {
        let rules = FilenameRules::default();

        let loose = root().join("Zhang_Wen_UTK_Wang.docx");
        assert!(matches!(
            rules.parse(&root(), &loose).unwrap_err().reason,
            UnparseableReason::UnexpectedLocation(_)
        ));

        let poster_without_category = root()
            .join("Posters")
            .join("Grid Control")
            .join("Ma_Yiwei_UTK_Wang.pdf");
        assert!(matches!(
            rules.parse(&root(), &poster_without_category).unwrap_err().reason,
            UnparseableReason::UnexpectedLocation(_)
        ));
    }

    #[test]
    fn test_parsing_is_deterministic() {
        let rules = FilenameRules::default();
        let path = paper("Zhang_Wen_UTK_Wang_1_R1.pdf");

        let first = rules.parse(&root(), &path);
        for _ in 0..50 {
            assert_eq!(rules.parse(&root(), &path), first);
        }
    }
}
