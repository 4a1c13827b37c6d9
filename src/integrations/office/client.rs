// src/integrations/office/client.rs
//
// Office Renderer - LibreOffice headless conversion
//
// Runs: <program> --headless --convert-to pdf --outdir <staging> <source>
//
// CRITICAL RULES:
// - The source document is never modified
// - Output is staged next to the destination, then renamed into place,
//   so a half-written PDF never appears under its final name
// - LibreOffice sharing one user profile is not reentrant

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Stdio;

use async_trait::async_trait;
use tokio::process::Command;

use crate::config::RendererConfig;
use crate::integrations::{DocumentRenderer, IntegrationError, IntegrationResult};

pub struct OfficeRenderer {
    program: PathBuf,
    reentrant: bool,
}

impl OfficeRenderer {
    pub fn new(config: &RendererConfig) -> Self {
        Self {
            program: config.program.clone(),
            reentrant: config.reentrant,
        }
    }

    fn program_name(&self) -> String {
        self.program.display().to_string()
    }

    /// Name LibreOffice gives its output: the source stem plus `.pdf`
    fn output_name(source: &Path) -> IntegrationResult<OsString> {
        let mut name = source
            .file_stem()
            .ok_or_else(|| IntegrationError::MissingOutput(source.to_path_buf()))?
            .to_os_string();
        name.push(".pdf");
        Ok(name)
    }
}

#[async_trait]
impl DocumentRenderer for OfficeRenderer {
    async fn render(&self, source: &Path, destination: &Path) -> IntegrationResult<()> {
        let parent = destination.parent().unwrap_or_else(|| Path::new("."));
        let staging = tempfile::Builder::new()
            .prefix(".render-")
            .tempdir_in(parent)?;

        log::debug!("Rendering {:?} with {}", source, self.program_name());

        let output = Command::new(&self.program)
            .arg("--headless")
            .arg("--convert-to")
            .arg("pdf")
            .arg("--outdir")
            .arg(staging.path())
            .arg(source)
            .stdin(Stdio::null())
            .output()
            .await
            .map_err(|source| IntegrationError::Spawn {
                program: self.program_name(),
                source,
            })?;

        if !output.status.success() {
            return Err(IntegrationError::RendererFailed {
                program: self.program_name(),
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        let produced = staging.path().join(Self::output_name(source)?);
        if !produced.is_file() {
            return Err(IntegrationError::MissingOutput(source.to_path_buf()));
        }

        tokio::fs::rename(&produced, destination).await?;
        Ok(())
    }

    fn is_reentrant(&self) -> bool {
        self.reentrant
    }
}
