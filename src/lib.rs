// src/lib.rs
// SiteVisit - Conference submission organizer
//
// Architecture:
// - Domain-centric: naming convention, grouping and revision rules live in the domain
// - Event-driven: services report what they decided through the event bus
// - Explicit: every file is produced, removed, held for review or reported unparseable
// - Resolution is pure and synchronous; only conversion touches external tools

// ============================================================================
// FOUNDATION
// ============================================================================

pub mod config;
pub mod domain;
pub mod error;
pub mod events;
pub mod infrastructure;
pub mod services;

// ============================================================================
// APPLICATION LAYER
// ============================================================================

pub mod application;
pub mod integrations;

// ============================================================================
// PUBLIC API - Domain
// ============================================================================

pub use domain::{
    validate_identity,
    AmbiguityReason,
    AmbiguityReport,
    CategoryLabel,
    ConversionFailure,
    ConversionStage,
    DiscardedRevision,
    DocumentKind,
    GroupOutcome,
    ParseFailure,
    PosterCategory,
    ProducedFile,
    ResolvedGroup,
    ResolvedSubmission,
    SourceFormat,
    SubmissionGroup,
    SubmissionIdentity,
    SubmissionKey,
    UnparseableReason,
};

// ============================================================================
// PUBLIC API - Errors & Config
// ============================================================================

pub use config::{load_config, AppConfig, QrPlacement, RendererConfig, StampingConfig};
pub use error::{AppError, AppResult};

// ============================================================================
// PUBLIC API - Events
// ============================================================================

pub use events::{
    create_event_bus,
    AmbiguityDetected,
    ConversionBatchCompleted,
    ConversionFailed,
    DirectoryScanned,
    DomainEvent,
    EventBus,
    EventLogEntry,
    FileRejected,
    ResolutionBatchCompleted,
    RevisionDiscarded,
    SubmissionConverted,
    SubmissionResolved,
};

// ============================================================================
// PUBLIC API - Services
// ============================================================================

pub use services::{
    ConversionDriver,
    ConversionSummary,
    FilenameRules,
    LayoutPlanner,
    ListingDiff,
    ListingDiffer,
    ListingRow,
    ResolutionBatch,
    ResolutionService,
    ScanOutcome,
    ScanService,
};

// ============================================================================
// PUBLIC API - Application Layer
// ============================================================================

pub use application::{AppState, AuditReport};

pub use application::commands;
pub use application::dto;

// ============================================================================
// PUBLIC API - Integrations
// ============================================================================

pub use infrastructure::{default_input_root, OutputTree};
pub use integrations::{
    DocumentRenderer, IntegrationError, LopdfCompositor, OfficeRenderer, PageCompositor,
    QrCodeEncoder, QrEncoder, QrImage,
};
