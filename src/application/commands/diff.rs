// src/application/commands/diff.rs
//
// Listing Diff Command
//
// Compares two Papers.csv / Posters.csv exports from different runs.

use std::path::{Path, PathBuf};

use crate::application::dto::DiffRequest;
use crate::error::{AppError, AppResult};
use crate::services::{find_listing_pair, read_listing, ListingDiff, ListingDiffer};

/// A diff plus the listings it was computed from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiffOutcome {
    pub old: PathBuf,
    pub new: PathBuf,
    pub diff: ListingDiff,
}

impl DiffOutcome {
    pub fn render_text(&self) -> String {
        self.diff.render_text(&label(&self.old), &label(&self.new))
    }
}

pub fn diff_listings(request: DiffRequest) -> AppResult<DiffOutcome> {
    let (old, new) = match request.new {
        Some(new) => (request.old, new),
        None if request.old.is_dir() => find_listing_pair(&request.old)?,
        None => {
            return Err(AppError::Other(format!(
                "{} is not a directory; give two listing files",
                request.old.display()
            )))
        }
    };

    let old_rows = read_listing(&old)?;
    let new_rows = read_listing(&new)?;
    let diff = ListingDiffer::default().diff(&old_rows, &new_rows);

    log::info!(
        "{} new, {} deleted, {} modified, {} recategorized",
        diff.added.len(),
        diff.deleted.len(),
        diff.content_modified.len(),
        diff.recategorized.len()
    );

    Ok(DiffOutcome { old, new, diff })
}

fn label(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
