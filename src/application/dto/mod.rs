// src/application/dto/mod.rs
//
// Data Transfer Objects
//
// CRITICAL PRINCIPLES:
// - DTOs are what the CLI hands to commands, nothing more
// - DTOs NEVER carry domain invariants
// - DTOs are simple, serializable structs

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

// ============================================================================
// ORGANIZE DTOs
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrganizeRequest {
    /// Submission root (`Papers/`, `Posters/` inside)
    pub input_root: PathBuf,

    /// Run root; a timestamped sibling of the input root when `None`
    pub output_root: Option<PathBuf>,

    /// Resolve and plan only, write nothing
    pub dry_run: bool,
}

/// One output file, planned or produced
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputEntry {
    pub source: PathBuf,
    pub destination: PathBuf,
    pub qr_link: Option<String>,
}

// ============================================================================
// DIFF DTOs
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiffRequest {
    /// Reference listing, or a directory holding exactly two listings
    pub old: PathBuf,

    /// Newer listing; `None` when `old` is a directory
    pub new: Option<PathBuf>,
}
