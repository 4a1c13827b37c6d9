// src/application/report.rs
//
// Audit Report
//
// What a run did, in the order a reviewer reads it:
// produced (or planned), removed revisions, needs review, unparseable, failures.
//
// RULES:
// - Built from values only; rendering never touches the filesystem
// - Written as audit.json into the run root, never in a dry run

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use crate::application::dto::OutputEntry;
use crate::domain::{AmbiguityReport, ConversionFailure, DiscardedRevision, ParseFailure};
use crate::error::AppResult;

pub const AUDIT_FILE_NAME: &str = "audit.json";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditReport {
    pub input_root: PathBuf,
    pub run_root: PathBuf,
    pub dry_run: bool,
    pub generated_at: DateTime<Utc>,

    /// Written files, or the planned ones in a dry run
    pub outputs: Vec<OutputEntry>,
    pub removed: Vec<DiscardedRevision>,
    pub needs_review: Vec<AmbiguityReport>,
    pub unparseable: Vec<ParseFailure>,
    pub conversion_failures: Vec<ConversionFailure>,
}

impl AuditReport {
    pub fn new(input_root: PathBuf, run_root: PathBuf, dry_run: bool) -> Self {
        Self {
            input_root,
            run_root,
            dry_run,
            generated_at: Utc::now(),
            outputs: Vec::new(),
            removed: Vec::new(),
            needs_review: Vec::new(),
            unparseable: Vec::new(),
            conversion_failures: Vec::new(),
        }
    }

    /// Anything a human has to look at
    pub fn needs_attention(&self) -> bool {
        !self.needs_review.is_empty()
            || !self.unparseable.is_empty()
            || !self.conversion_failures.is_empty()
    }

    pub fn render_text(&self) -> String {
        let mut out = String::new();
        let outputs_title = if self.dry_run { "Planned" } else { "Produced" };

        let _ = writeln!(out, "Submission root: {}", self.input_root.display());
        let _ = writeln!(
            out,
            "Run root: {}{}",
            self.run_root.display(),
            if self.dry_run { " (dry run, nothing written)" } else { "" }
        );

        section(&mut out, outputs_title, self.outputs.len());
        for entry in &self.outputs {
            let _ = writeln!(out, "  {}", entry.destination.display());
            let _ = writeln!(out, "      from {}", entry.source.display());
            if let Some(link) = &entry.qr_link {
                let _ = writeln!(out, "      QR {}", link);
            }
        }

        section(&mut out, "Removed as older revision", self.removed.len());
        for removed in &self.removed {
            let _ = writeln!(
                out,
                "  {} (R{}, kept R{})",
                removed.path.display(),
                removed.revision,
                removed.kept_revision
            );
        }

        section(&mut out, "Needs manual review", self.needs_review.len());
        for report in &self.needs_review {
            let _ = writeln!(out, "  {}", report.key);
            for reason in &report.reasons {
                let _ = writeln!(out, "      {}: {}", reason.taxonomy(), reason);
            }
            for path in &report.paths {
                let _ = writeln!(out, "      {}", path.display());
            }
        }

        section(&mut out, "Unparseable filenames", self.unparseable.len());
        for failure in &self.unparseable {
            let _ = writeln!(out, "  {}: {}", failure.path.display(), failure.reason);
        }

        section(&mut out, "Conversion failures", self.conversion_failures.len());
        for failure in &self.conversion_failures {
            let _ = writeln!(
                out,
                "  {} ({}): {}",
                failure.destination.display(),
                failure.stage,
                failure.message
            );
        }

        out
    }

    /// Pretty JSON into `<run_root>/audit.json`
    pub fn write_json(&self, run_root: &Path) -> AppResult<PathBuf> {
        let path = run_root.join(AUDIT_FILE_NAME);
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(&path, json)?;
        log::info!("Wrote audit report to {}", path.display());
        Ok(path)
    }
}

fn section(out: &mut String, title: &str, count: usize) {
    let _ = writeln!(out);
    let _ = writeln!(out, "{} ({})", title, count);
    if count == 0 {
        let _ = writeln!(out, "  none");
    }
}
