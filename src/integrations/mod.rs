// src/integrations/mod.rs
//
// External Integrations Module
//
// Thin single-call wrappers around the tools the conversion driver needs:
// an office renderer, a QR encoder and a PDF page compositor.
//
// RULES:
// - One call either succeeds or returns an IntegrationError
// - No domain logic here; integrations never decide what gets produced
// - Every seam is a trait so the driver can be tested without the tools

pub mod office;
pub mod pdf;
pub mod qr;

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use thiserror::Error;

#[cfg(test)]
use mockall::automock;

use crate::config::QrPlacement;

pub use office::client::OfficeRenderer;
pub use pdf::stamper::LopdfCompositor;
pub use qr::encoder::{QrCodeEncoder, QrImage};

// ============================================================================
// ERRORS
// ============================================================================

#[derive(Debug, Error)]
pub enum IntegrationError {
    #[error("Failed to launch {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{program} exited with {status}: {stderr}")]
    RendererFailed {
        program: String,
        status: String,
        stderr: String,
    },

    #[error("Renderer produced no PDF for {0:?}")]
    MissingOutput(PathBuf),

    #[error("QR encoding failed: {0}")]
    QrEncoding(String),

    #[error("Unexpected PDF structure: {0}")]
    PdfStructure(String),

    #[error("PDF error: {0}")]
    Pdf(#[from] lopdf::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type IntegrationResult<T> = Result<T, IntegrationError>;

// ============================================================================
// COLLABORATOR TRAITS
// ============================================================================

/// Renders a Word or slides document to a PDF at `destination`
#[async_trait]
pub trait DocumentRenderer: Send + Sync {
    async fn render(&self, source: &Path, destination: &Path) -> IntegrationResult<()>;

    /// Whether two renders may run at the same time
    fn is_reentrant(&self) -> bool;
}

/// Encodes a link as a square grayscale QR image
#[cfg_attr(test, automock)]
pub trait QrEncoder: Send + Sync {
    fn encode(&self, link: &str, side: u32) -> IntegrationResult<QrImage>;
}

/// Draws an image onto the first page of a PDF, in place
pub trait PageCompositor: Send + Sync {
    fn overlay_first_page(
        &self,
        pdf: &Path,
        image: &QrImage,
        placement: &QrPlacement,
    ) -> IntegrationResult<()>;
}
