// src/services/scan_service.rs
//
// Directory Scanner
//
// Walks the submission tree and reads every file through the filename parser.
//
// CRITICAL RULES:
// - Re-scans from scratch on every run, nothing is cached
// - Walks in file-name order so two scans of one tree agree
// - Every file yields exactly one identity or one parse failure
// - Hidden files and office lock files (`~$...`) are skipped, not rejected
// - Symlinks are followed; an entry that cannot be read is reported, the walk goes on

use std::path::{Path, PathBuf};
use std::sync::Arc;

use walkdir::{DirEntry, WalkDir};

use crate::domain::{ParseFailure, SubmissionIdentity, UnparseableReason};
use crate::error::{AppError, AppResult};
use crate::events::{DirectoryScanned, EventBus, FileRejected};
use crate::services::filename_parser::FilenameRules;

/// Everything the scanner found under one root
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanOutcome {
    pub root: PathBuf,
    pub identities: Vec<SubmissionIdentity>,
    pub failures: Vec<ParseFailure>,
    pub skipped: usize,
}

impl ScanOutcome {
    pub fn files_found(&self) -> usize {
        self.identities.len() + self.failures.len()
    }
}

pub struct ScanService {
    event_bus: Arc<EventBus>,
    rules: FilenameRules,
}

impl ScanService {
    pub fn new(event_bus: Arc<EventBus>) -> Self {
        Self {
            event_bus,
            rules: FilenameRules::default(),
        }
    }

    /// Scan `root` recursively
    pub fn scan(&self, root: &Path) -> AppResult<ScanOutcome> {
        if !root.is_dir() {
            return Err(AppError::InvalidRoot(root.to_path_buf()));
        }

        let mut outcome = ScanOutcome {
            root: root.to_path_buf(),
            ..ScanOutcome::default()
        };

        let walker = WalkDir::new(root)
            .follow_links(true)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|entry| entry.depth() == 0 || !is_hidden(entry));

        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(err) if err.depth() == 0 => return Err(err.into()),
                Err(err) => {
                    let path = err
                        .path()
                        .map(Path::to_path_buf)
                        .unwrap_or_else(|| root.to_path_buf());
                    log::warn!("Cannot read {:?}: {}", path, err);
                    self.reject(
                        &mut outcome,
                        ParseFailure::new(path, UnparseableReason::Unreadable(err.to_string())),
                    );
                    continue;
                }
            };
            if !entry.file_type().is_file() {
                continue;
            }
            if is_lock_file(&entry) {
                log::debug!("Skipping lock file {:?}", entry.path());
                outcome.skipped += 1;
                continue;
            }

            match self.rules.parse(root, entry.path()) {
                Ok(identity) => outcome.identities.push(identity),
                Err(failure) => {
                    log::debug!("Rejected {:?}: {}", failure.path, failure.reason);
                    self.reject(&mut outcome, failure);
                }
            }
        }

        log::info!(
            "Scanned {:?}: {} submissions, {} unparseable, {} skipped",
            root,
            outcome.identities.len(),
            outcome.failures.len(),
            outcome.skipped
        );

        self.event_bus.emit(DirectoryScanned::new(
            root.to_path_buf(),
            outcome.files_found(),
            outcome.skipped,
        ));

        Ok(outcome)
    }

    fn reject(&self, outcome: &mut ScanOutcome, failure: ParseFailure) {
        self.event_bus.emit(FileRejected::new(
            failure.path.clone(),
            failure.reason.to_string(),
        ));
        outcome.failures.push(failure);
    }
}

fn file_name(entry: &DirEntry) -> &str {
    entry.file_name().to_str().unwrap_or_default()
}

fn is_hidden(entry: &DirEntry) -> bool {
    file_name(entry).starts_with('.')
}

fn is_lock_file(entry: &DirEntry) -> bool {
    file_name(entry).starts_with("~$")
}
