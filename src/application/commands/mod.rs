// src/application/commands/mod.rs
//
// Command Handlers
//
// ARCHITECTURE:
// - Commands are thin adapters between the CLI and the services
// - Commands accept DTOs, return reports
// - Commands NEVER contain resolution logic

pub mod diff;
pub mod organize;

pub use diff::{diff_listings, DiffOutcome};
pub use organize::organize;
