// src/services/listing_service.rs
//
// Submission Listing & Listing Diff
//
// Papers.csv / Posters.csv record what a run produced. Comparing the listings
// of two runs shows what changed between submission rounds.
//
// CRITICAL RULES:
// - One row per produced submission, sorted by file name
// - Rows are matched across listings by file name without its revision
// - Checksums are SHA-256 of the source file, never of the generated PDF
// - A source that cannot be hashed gets an empty checksum, not a missing row

use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize};
use sha2::{Digest, Sha256};

use crate::domain::{DocumentKind, ResolvedSubmission};
use crate::error::{AppError, AppResult};

const HEADERS: [&str; 10] = [
    "File name",
    "Category",
    "Area",
    "Last name",
    "First name",
    "University",
    "Professor",
    "Index",
    "Revision",
    "SHA256",
];

/// File name of the listing for one document kind
pub fn listing_file_name(kind: DocumentKind) -> String {
    format!("{}.csv", kind.dir_name())
}

// ============================================================================
// LISTING ROW
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListingRow {
    /// Canonical name with revision, e.g. `Zhang_Wen_UTK_Wang_1_R1`
    #[serde(rename = "File name")]
    pub file_name: String,

    /// Empty for papers
    #[serde(rename = "Category", default)]
    pub category: String,

    #[serde(rename = "Area")]
    pub area: String,

    #[serde(rename = "Last name")]
    pub last_name: String,

    #[serde(rename = "First name")]
    pub first_name: String,

    #[serde(rename = "University")]
    pub school: String,

    #[serde(rename = "Professor")]
    pub advisor: String,

    #[serde(rename = "Index")]
    pub index: u32,

    /// Older listings write `R2` instead of `2`
    #[serde(rename = "Revision", deserialize_with = "revision_number")]
    pub revision: u32,

    /// Missing in listings written by older tools
    #[serde(rename = "SHA256", default)]
    pub checksum: String,
}

impl ListingRow {
    pub fn from_submission(submission: &ResolvedSubmission, checksum: String) -> Self {
        let identity = &submission.identity;
        Self {
            file_name: identity.canonical_name(),
            category: identity
                .category
                .as_ref()
                .map(|label| label.to_string())
                .unwrap_or_default(),
            area: identity.area.clone(),
            last_name: identity.last_name.clone(),
            first_name: identity.first_name.clone(),
            school: identity.school.clone(),
            advisor: identity.advisor.clone(),
            index: identity.index,
            revision: identity.revision,
            checksum,
        }
    }

    fn record(&self) -> [String; 10] {
        [
            self.file_name.clone(),
            self.category.clone(),
            self.area.clone(),
            self.last_name.clone(),
            self.first_name.clone(),
            self.school.clone(),
            self.advisor.clone(),
            self.index.to_string(),
            self.revision.to_string(),
            self.checksum.clone(),
        ]
    }
}

fn revision_number<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    let trimmed = raw.trim();
    let digits = trimmed
        .strip_prefix(|c: char| c == 'R' || c == 'r')
        .unwrap_or(trimmed);

    digits
        .parse()
        .map_err(|_| serde::de::Error::custom(format!("invalid revision {:?}", raw)))
}

/// SHA-256 of a file, lowercase hex
pub fn checksum(path: &Path) -> AppResult<String> {
    let mut file = File::open(path)?;
    let mut hasher = Sha256::new();
    let mut buffer = [0u8; 8192];

    loop {
        let bytes_read = file.read(&mut buffer)?;
        if bytes_read == 0 {
            break;
        }
        hasher.update(&buffer[..bytes_read]);
    }

    Ok(format!("{:x}", hasher.finalize()))
}

// ============================================================================
// WRITE / READ
// ============================================================================

/// Write `rows` to `path`, header included even when there are no rows
pub fn write_listing(path: &Path, rows: &[ListingRow]) -> AppResult<()> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_path(path)?;

    writer.write_record(HEADERS)?;
    for row in rows {
        writer.write_record(row.record())?;
    }
    writer.flush()?;
    Ok(())
}

/// Write Papers.csv and Posters.csv into the run root
pub fn write_listings(
    run_root: &Path,
    submissions: &[ResolvedSubmission],
) -> AppResult<Vec<PathBuf>> {
    let mut written = Vec::new();

    for kind in [DocumentKind::Paper, DocumentKind::Poster] {
        let mut rows = submissions
            .iter()
            .filter(|submission| submission.identity.kind == kind)
            .map(|submission| {
                let source = &submission.identity.path;
                let digest = checksum(source).unwrap_or_else(|e| {
                    log::warn!("Cannot hash {}: {}", source.display(), e);
                    String::new()
                });
                ListingRow::from_submission(submission, digest)
            })
            .collect::<Vec<_>>();
        rows.sort_by(|a, b| a.file_name.cmp(&b.file_name));

        let path = run_root.join(listing_file_name(kind));
        write_listing(&path, &rows)?;
        log::info!("Wrote {} rows to {}", rows.len(), path.display());
        written.push(path);
    }

    Ok(written)
}

pub fn read_listing(path: &Path) -> AppResult<Vec<ListingRow>> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_path(path)?;

    let mut rows = Vec::new();
    for row in reader.deserialize() {
        rows.push(row?);
    }
    Ok(rows)
}

/// The two CSV files of a directory, in file-name order
pub fn find_listing_pair(directory: &Path) -> AppResult<(PathBuf, PathBuf)> {
    let mut listings: Vec<PathBuf> = std::fs::read_dir(directory)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| {
            path.extension()
                .and_then(|ext| ext.to_str())
                .map(|ext| ext.eq_ignore_ascii_case("csv"))
                .unwrap_or(false)
        })
        .collect();
    listings.sort();

    match <[PathBuf; 2]>::try_from(listings) {
        Ok([old, new]) => Ok((old, new)),
        Err(found) => Err(AppError::Other(format!(
            "Expected 2 csv files in {}, found {}",
            directory.display(),
            found.len()
        ))),
    }
}

// ============================================================================
// DIFF
// ============================================================================

/// Changes between two listings, by revision-less file name
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ListingDiff {
    pub added: Vec<String>,
    pub deleted: Vec<String>,
    pub content_modified: Vec<String>,
    pub recategorized: Vec<String>,
}

impl ListingDiff {
    pub fn is_empty(&self) -> bool {
        self.added.is_empty()
            && self.deleted.is_empty()
            && self.content_modified.is_empty()
            && self.recategorized.is_empty()
    }

    pub fn render_text(&self, old_label: &str, new_label: &str) -> String {
        let mut out = format!("Comparing {} against {}\n", new_label, old_label);

        let sections = [
            ("Total new submissions", '+', &self.added),
            ("Deleted submissions", '-', &self.deleted),
            ("Content modified", '@', &self.content_modified),
            ("Category change", '#', &self.recategorized),
        ];

        for (title, marker, names) in sections {
            out.push_str(&format!("\n{}: {}\n", title, names.len()));
            for name in names {
                out.push_str(&format!("{} {}\n", marker, name));
            }
        }
        out
    }
}

pub struct ListingDiffer {
    revision_suffix: Regex,
}

impl Default for ListingDiffer {
    fn default() -> Self {
        Self {
            revision_suffix: Regex::new(r"^(.*)_[Rr]\d+$").unwrap(),
        }
    }
}

impl ListingDiffer {
    /// `Zhang_Wen_UTK_Wang_1_R2` → `Zhang_Wen_UTK_Wang_1`
    pub fn base_name<'a>(&self, file_name: &'a str) -> &'a str {
        self.revision_suffix
            .captures(file_name)
            .and_then(|captures| captures.get(1))
            .map(|base| base.as_str())
            .unwrap_or(file_name)
    }

    /// Compare `new` against the reference listing `old`
    pub fn diff(&self, old: &[ListingRow], new: &[ListingRow]) -> ListingDiff {
        let mut diff = ListingDiff::default();

        for row in new {
            let name = self.base_name(&row.file_name);
            match old.iter().find(|o| self.base_name(&o.file_name) == name) {
                None => diff.added.push(name.to_string()),
                Some(previous) => {
                    let both_hashed = !previous.checksum.is_empty() && !row.checksum.is_empty();
                    if both_hashed && previous.checksum != row.checksum {
                        diff.content_modified.push(name.to_string());
                    }
                    if previous.category != row.category || previous.area != row.area {
                        diff.recategorized.push(name.to_string());
                    }
                }
            }
        }

        for row in old {
            let name = self.base_name(&row.file_name);
            if !new.iter().any(|n| self.base_name(&n.file_name) == name) {
                diff.deleted.push(name.to_string());
            }
        }

        diff
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{CategoryLabel, PosterCategory, SourceFormat, SubmissionIdentity};
    use tempfile::TempDir;

    fn row(file_name: &str, category: &str, area: &str, checksum: &str) -> ListingRow {
        ListingRow {
            file_name: file_name.to_string(),
            category: category.to_string(),
            area: area.to_string(),
            last_name: "Zhang".to_string(),
            first_name: "Wen".to_string(),
            school: "UTK".to_string(),
            advisor: "Wang".to_string(),
            index: 1,
            revision: 0,
            checksum: checksum.to_string(),
        }
    }

    fn poster_submission(dir: &Path, last: &str, revision: u32) -> ResolvedSubmission {
        let source = dir.join(format!("{}.pdf", last));
        std::fs::write(&source, last.as_bytes()).unwrap();
        ResolvedSubmission {
            identity: SubmissionIdentity {
                last_name: last.to_string(),
                first_name: "Wen".to_string(),
                school: "UTK".to_string(),
                advisor: "Wang".to_string(),
                index: 1,
                revision,
                kind: DocumentKind::Poster,
                format: SourceFormat::Pdf,
                path: source,
                area: "Grid".to_string(),
                category: Some(CategoryLabel::Known(PosterCategory::NonCore)),
            },
            destination: dir.join("out.pdf"),
            qr_link: None,
        }
    }

    #[test]
    fn test_base_name_strips_revision() {
        let differ = ListingDiffer::default();
        assert_eq!(differ.base_name("Zhang_Wen_UTK_Wang_1_R12"), "Zhang_Wen_UTK_Wang_1");
        assert_eq!(differ.base_name("Zhang_Wen_UTK_Wang_1"), "Zhang_Wen_UTK_Wang_1");
    }

    #[test]
    fn test_diff_classifies_changes() {
        let old = vec![
            row("Kept_A_UTK_Wang_1_R0", "Core", "Grid", "aa"),
            row("Gone_A_UTK_Wang_1_R0", "Core", "Grid", "bb"),
            row("Moved_A_UTK_Wang_1_R0", "Core", "Grid", "cc"),
        ];
        let new = vec![
            row("Kept_A_UTK_Wang_1_R1", "Core", "Grid", "a2"),
            row("Moved_A_UTK_Wang_1_R0", "Associated", "Grid", "cc"),
            row("Fresh_A_UTK_Wang_1_R0", "Core", "Grid", "dd"),
        ];

        let diff = ListingDiffer::default().diff(&old, &new);

        assert_eq!(diff.added, vec!["Fresh_A_UTK_Wang_1"]);
        assert_eq!(diff.deleted, vec!["Gone_A_UTK_Wang_1"]);
        assert_eq!(diff.content_modified, vec!["Kept_A_UTK_Wang_1"]);
        assert_eq!(diff.recategorized, vec!["Moved_A_UTK_Wang_1"]);
    }

    #[test]
    fn test_missing_checksums_are_not_modifications() {
        let old = vec![row("A_B_C_D_1_R0", "", "Grid", "")];
        let new = vec![row("A_B_C_D_1_R1", "", "Grid", "ff")];

        assert!(ListingDiffer::default().diff(&old, &new).is_empty());
    }

    #[test]
    fn test_render_text_uses_markers() {
        let diff = ListingDiff {
            added: vec!["New_A_B_C_1".to_string()],
            recategorized: vec!["Moved_A_B_C_1".to_string()],
            ..ListingDiff::default()
        };
        let text = diff.render_text("old.csv", "new.csv");

        assert!(text.starts_with("Comparing new.csv against old.csv"));
        assert!(text.contains("Total new submissions: 1\n+ New_A_B_C_1"));
        assert!(text.contains("Deleted submissions: 0"));
        assert!(text.contains("# Moved_A_B_C_1"));
    }

    #[test]
    fn test_listings_are_written_and_read_back() {
        let dir = TempDir::new().unwrap();
        let submissions = vec![
            poster_submission(dir.path(), "Zhang", 2),
            poster_submission(dir.path(), "Chen", 0),
        ];

        let written = write_listings(dir.path(), &submissions).unwrap();
        assert_eq!(written.len(), 2);

        let papers = read_listing(&dir.path().join("Papers.csv")).unwrap();
        assert!(papers.is_empty());

        let posters = read_listing(&dir.path().join("Posters.csv")).unwrap();
        assert_eq!(posters.len(), 2);
        assert_eq!(posters[0].file_name, "Chen_Wen_UTK_Wang_1_R0");
        assert_eq!(posters[1].file_name, "Zhang_Wen_UTK_Wang_1_R2");
        assert_eq!(posters[1].category, "Non-core");
        assert_eq!(posters[1].checksum, checksum(&submissions[0].identity.path).unwrap());
    }

    #[test]
    fn test_old_listing_without_checksum_column() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("old.csv");
        std::fs::write(
            &path,
            "File name, Area, Last name, First name, University, Professor, Index, Revision\n\
             Zhang_Wen_UTK_Wang_1_R0, Grid, Zhang, Wen, UTK, Wang, 1, 0\n",
        )
        .unwrap();

        let rows = read_listing(&path).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].area, "Grid");
        assert_eq!(rows[0].category, "");
        assert_eq!(rows[0].checksum, "");
    }

    #[test]
    fn test_unhashable_source_gets_empty_checksum() {
        let dir = TempDir::new().unwrap();
        let kept = poster_submission(dir.path(), "Zhang", 1);
        let moved = poster_submission(dir.path(), "Chen", 0);
        std::fs::remove_file(&moved.identity.path).unwrap();

        write_listings(dir.path(), &[kept, moved]).unwrap();

        let posters = read_listing(&dir.path().join("Posters.csv")).unwrap();
        assert_eq!(posters.len(), 2);
        assert_eq!(posters[0].file_name, "Chen_Wen_UTK_Wang_1_R0");
        assert_eq!(posters[0].checksum, "");
        assert_eq!(posters[1].checksum.len(), 64);
    }

    #[test]
    fn test_revision_with_r_prefix_is_read() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("old.csv");
        std::fs::write(
            &path,
            "File name,Area,Last name,First name,University,Professor,Index,Revision\n\
             Zhang_Wen_UTK_Wang_1_R2,Grid,Zhang,Wen,UTK,Wang,1,R2\n\
             Chen_Yu_UTK_Wang_1_R0,Grid,Chen,Yu,UTK,Wang,1,0\n",
        )
        .unwrap();

        let rows = read_listing(&path).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].revision, 2);
        assert_eq!(rows[1].revision, 0);
    }

    #[test]
    fn test_malformed_revision_is_an_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("old.csv");
        std::fs::write(
            &path,
            "File name,Area,Last name,First name,University,Professor,Index,Revision\n\
             Zhang_Wen_UTK_Wang_1_R2,Grid,Zhang,Wen,UTK,Wang,1,Rx\n",
        )
        .unwrap();

        assert!(read_listing(&path).is_err());
    }

    #[test]
    fn test_find_listing_pair() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("b.csv"), "").unwrap();
        std::fs::write(dir.path().join("a.CSV"), "").unwrap();
        std::fs::write(dir.path().join("notes.txt"), "").unwrap();

        let (old, new) = find_listing_pair(dir.path()).unwrap();
        assert_eq!(old.file_name().unwrap(), "a.CSV");
        assert_eq!(new.file_name().unwrap(), "b.csv");

        std::fs::write(dir.path().join("c.csv"), "").unwrap();
        assert!(find_listing_pair(dir.path()).is_err());
    }
}
