// src/infrastructure/output_tree.rs
//
// Output Tree Management
//
// CRITICAL RULES:
// - One run root per invocation, created fresh next to the submission root
// - The run root never lies inside the submission root (a later scan would
//   pick up generated files)
// - Submission files are NEVER modified

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Datelike, Local, TimeZone};

use crate::domain::{DocumentKind, PosterCategory};
use crate::error::{AppError, AppResult};

/// `<Downloads>/<year> Annual Site Visit`
pub fn default_input_root() -> PathBuf {
    let downloads = dirs::download_dir()
        .or_else(|| dirs::home_dir().map(|home| home.join("Downloads")))
        .unwrap_or_else(|| PathBuf::from("."));
    downloads.join(format!("{} Annual Site Visit", Local::now().year()))
}

/// `Generated <Mon DD YY HHMMSS>`
pub fn run_root_name<Tz: TimeZone>(at: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    format!("Generated {}", at.format("%b %d %y %H%M%S"))
}

/// The directory one run writes into
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputTree {
    root: PathBuf,
}

impl OutputTree {
    /// Pick the run root for `input_root`: the requested path, or a
    /// timestamped sibling of the input root
    pub fn for_input(input_root: &Path, requested: Option<PathBuf>) -> AppResult<Self> {
        let root = match requested {
            Some(path) => path,
            None => {
                let parent = absolute(input_root)
                    .parent()
                    .map(Path::to_path_buf)
                    .unwrap_or_else(|| PathBuf::from("."));
                parent.join(run_root_name(&Local::now()))
            }
        };

        if is_inside(&root, input_root) {
            return Err(AppError::InvalidOutput {
                input: input_root.to_path_buf(),
                output: root,
            });
        }

        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Every directory a run may write into, even when it stays empty
    pub fn skeleton(&self) -> Vec<PathBuf> {
        let mut directories = vec![self.root.join(DocumentKind::Paper.dir_name())];
        let posters = self.root.join(DocumentKind::Poster.dir_name());
        directories.extend(
            PosterCategory::all()
                .iter()
                .map(|category| posters.join(category.dir_name())),
        );
        directories
    }

    pub fn create_skeleton(&self) -> AppResult<()> {
        for directory in self.skeleton() {
            fs::create_dir_all(&directory)?;
        }
        log::info!("Created output tree at {}", self.root.display());
        Ok(())
    }
}

/// Absolute form of a path that may not exist yet
fn absolute(path: &Path) -> PathBuf {
    if let Ok(canonical) = path.canonicalize() {
        return canonical;
    }
    match (path.parent(), path.file_name()) {
        (Some(parent), Some(name)) if !parent.as_os_str().is_empty() => {
            absolute(parent).join(name)
        }
        _ => std::env::current_dir()
            .map(|cwd| cwd.join(path))
            .unwrap_or_else(|_| path.to_path_buf()),
    }
}

fn is_inside(candidate: &Path, container: &Path) -> bool {
    absolute(candidate).starts_with(absolute(container))
}
