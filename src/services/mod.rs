// src/services/mod.rs
//
// Services Module - Orchestration Layer
//
// Resolution (synchronous, in-memory):
//   scan → parse → group → detect → select latest → plan
// Production (async):
//   convert / stamp → listings

pub mod ambiguity_detector;
pub mod conversion_service;
pub mod filename_parser;
pub mod grouping_service;
pub mod layout_planner;
pub mod listing_service;
pub mod resolution_service;
pub mod revision_resolver;
pub mod scan_service;


// Re-export all services and their types
pub use ambiguity_detector::detect;

pub use conversion_service::{ConversionDriver, ConversionSummary};

pub use filename_parser::{FilenameRules, NameTokens};

pub use grouping_service::group_identities;

pub use layout_planner::LayoutPlanner;

pub use listing_service::{
    checksum, find_listing_pair, listing_file_name, read_listing, write_listing, write_listings,
    ListingDiff, ListingDiffer, ListingRow,
};

pub use resolution_service::{resolve_group, ResolutionBatch, ResolutionService};

pub use revision_resolver::select_latest;

pub use scan_service::{ScanOutcome, ScanService};
