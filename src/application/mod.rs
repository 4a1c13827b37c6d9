// src/application/mod.rs
//
// Application Layer
//
// ARCHITECTURE:
// - Sits between the CLI and the services
// - Wires collaborators once per invocation (AppState)
// - Turns service results into the audit report

pub mod commands;
pub mod dto;
pub mod report;
pub mod state;

pub use commands::*;
pub use dto::*;
pub use report::{AuditReport, AUDIT_FILE_NAME};
pub use state::AppState;
