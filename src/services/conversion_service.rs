// src/services/conversion_service.rs
//
// Conversion & Stamping Driver
//
// Produces one PDF per resolved submission:
// 1. Create the destination directory
// 2. Copy the source (already PDF) or render it (Word / slides)
// 3. Posters only: encode the QR link, overlay it on page 1
//
// CRITICAL RULES:
// - At most `jobs` submissions are in flight
// - A non-reentrant renderer never runs twice at once
// - One failure never aborts the others; its partial output is removed
// - Results are sorted by destination

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use tokio::sync::{Mutex, Semaphore};
use tokio::task::JoinSet;

use crate::config::{QrPlacement, StampingConfig};
use crate::domain::{ConversionFailure, ConversionStage, ProducedFile, ResolvedSubmission};
use crate::events::{ConversionBatchCompleted, ConversionFailed, EventBus, SubmissionConverted};
use crate::integrations::{DocumentRenderer, PageCompositor, QrEncoder};

/// What the driver produced and what it could not
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConversionSummary {
    pub produced: Vec<ProducedFile>,
    pub failures: Vec<ConversionFailure>,
}

/// Shared by every conversion task
struct ConversionContext {
    renderer: Arc<dyn DocumentRenderer>,
    encoder: Arc<dyn QrEncoder>,
    compositor: Arc<dyn PageCompositor>,
    placement: QrPlacement,
    qr_size: u32,

    /// Held around every render when the renderer is not reentrant
    render_lock: Mutex<()>,
}

pub struct ConversionDriver {
    context: Arc<ConversionContext>,
    jobs: usize,
    event_bus: Arc<EventBus>,
}

impl ConversionDriver {
    pub fn new(
        renderer: Arc<dyn DocumentRenderer>,
        encoder: Arc<dyn QrEncoder>,
        compositor: Arc<dyn PageCompositor>,
        stamping: &StampingConfig,
        jobs: usize,
        event_bus: Arc<EventBus>,
    ) -> Self {
        Self {
            context: Arc::new(ConversionContext {
                renderer,
                encoder,
                compositor,
                placement: stamping.placement,
                qr_size: stamping.qr_size,
                render_lock: Mutex::new(()),
            }),
            jobs: jobs.max(1),
            event_bus,
        }
    }

    /// Convert every submission, `jobs` at a time
    pub async fn convert_all(&self, submissions: Vec<ResolvedSubmission>) -> ConversionSummary {
        let started = Instant::now();
        let semaphore = Arc::new(Semaphore::new(self.jobs));
        let mut tasks = JoinSet::new();
        let mut pending: Vec<(PathBuf, PathBuf)> = Vec::with_capacity(submissions.len());

        log::info!(
            "Converting {} submissions ({} at a time)",
            submissions.len(),
            self.jobs
        );

        for submission in submissions {
            pending.push((
                submission.identity.path.clone(),
                submission.destination.clone(),
            ));
            let context = Arc::clone(&self.context);
            let semaphore = Arc::clone(&semaphore);

            tasks.spawn(async move {
                // The semaphore is never closed
                let _permit = semaphore.acquire_owned().await.ok();
                convert_one(&context, &submission).await
            });
        }

        let mut summary = ConversionSummary::default();

        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok(Ok(produced)) => {
                    log::info!("Produced {}", produced.destination.display());
                    self.event_bus.emit(SubmissionConverted::new(
                        produced.source.clone(),
                        produced.destination.clone(),
                        produced.stamped,
                    ));
                    summary.produced.push(produced);
                }
                Ok(Err(failure)) => self.record_failure(&mut summary, failure),
                Err(join_error) => log::error!("Conversion task aborted: {}", join_error),
            }
        }

        // A task that panicked left no result behind
        for (source, destination) in pending {
            let accounted = summary.produced.iter().any(|p| p.destination == destination)
                || summary.failures.iter().any(|f| f.destination == destination);
            if !accounted {
                remove_partial(&destination).await;
                let failure = ConversionFailure {
                    source,
                    destination,
                    stage: ConversionStage::Prepare,
                    message: "conversion task aborted".to_string(),
                };
                self.record_failure(&mut summary, failure);
            }
        }

        summary.produced.sort_by(|a, b| a.destination.cmp(&b.destination));
        summary.failures.sort_by(|a, b| a.destination.cmp(&b.destination));

        self.event_bus.emit(ConversionBatchCompleted::new(
            summary.produced.len(),
            summary.failures.len(),
            started.elapsed().as_millis() as u64,
        ));

        summary
    }

    fn record_failure(&self, summary: &mut ConversionSummary, failure: ConversionFailure) {
        log::warn!(
            "Failed to produce {} ({}): {}",
            failure.destination.display(),
            failure.stage,
            failure.message
        );
        self.event_bus.emit(ConversionFailed::new(
            failure.source.clone(),
            failure.destination.clone(),
            failure.stage.to_string(),
            failure.message.clone(),
        ));
        summary.failures.push(failure);
    }
}

async fn convert_one(
    context: &ConversionContext,
    submission: &ResolvedSubmission,
) -> Result<ProducedFile, ConversionFailure> {
    let source = &submission.identity.path;
    let destination = &submission.destination;

    let fail = |stage: ConversionStage, message: String| ConversionFailure {
        source: source.clone(),
        destination: destination.clone(),
        stage,
        message,
    };

    if let Some(parent) = destination.parent() {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|e| fail(ConversionStage::Prepare, e.to_string()))?;
    }

    let written = if submission.identity.format.needs_rendering() {
        render(context, source, destination)
            .await
            .map_err(|message| fail(ConversionStage::Render, message))
    } else {
        tokio::fs::copy(source, destination)
            .await
            .map(|_| ())
            .map_err(|e| fail(ConversionStage::Copy, e.to_string()))
    };

    if let Err(failure) = written {
        remove_partial(destination).await;
        return Err(failure);
    }

    let stamped = match &submission.qr_link {
        None => false,
        Some(link) => {
            if let Err(message) = stamp(context, link, destination).await {
                remove_partial(destination).await;
                return Err(fail(ConversionStage::Stamp, message));
            }
            true
        }
    };

    Ok(ProducedFile {
        source: source.clone(),
        destination: destination.clone(),
        stamped,
    })
}

async fn render(context: &ConversionContext, source: &Path, destination: &Path) -> Result<(), String> {
    let result = if context.renderer.is_reentrant() {
        context.renderer.render(source, destination).await
    } else {
        let _guard = context.render_lock.lock().await;
        context.renderer.render(source, destination).await
    };
    result.map_err(|e| e.to_string())
}

/// QR encoding and compositing are CPU and file bound; they run on the blocking pool
async fn stamp(context: &ConversionContext, link: &str, destination: &Path) -> Result<(), String> {
    let encoder = Arc::clone(&context.encoder);
    let compositor = Arc::clone(&context.compositor);
    let placement = context.placement;
    let side = context.qr_size;
    let link = link.to_string();
    let pdf = destination.to_path_buf();

    let outcome = tokio::task::spawn_blocking(move || {
        let image = encoder.encode(&link, side)?;
        compositor.overlay_first_page(&pdf, &image, &placement)
    })
    .await;

    match outcome {
        Ok(Ok(())) => Ok(()),
        Ok(Err(e)) => Err(e.to_string()),
        Err(join_error) => Err(join_error.to_string()),
    }
}

async fn remove_partial(destination: &Path) {
    if destination.as_os_str().is_empty() {
        return;
    }
    if let Err(e) = tokio::fs::remove_file(destination).await {
        if e.kind() != std::io::ErrorKind::NotFound {
            log::warn!("Could not remove partial output {}: {}", destination.display(), e);
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{
        CategoryLabel, DocumentKind, PosterCategory, SourceFormat, SubmissionIdentity,
    };
    use crate::integrations::{
        IntegrationError, IntegrationResult, MockQrEncoder, QrImage,
    };
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;
    use tempfile::TempDir;

    /// Writes a stub PDF; sources named `broken*` fail after a partial write
    struct FakeRenderer {
        reentrant: bool,
        running: AtomicUsize,
        peak: AtomicUsize,
    }

    impl FakeRenderer {
        fn new(reentrant: bool) -> Self {
            Self {
                reentrant,
                running: AtomicUsize::new(0),
                peak: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl DocumentRenderer for FakeRenderer {
        async fn render(&self, source: &Path, destination: &Path) -> IntegrationResult<()> {
            let now = self.running.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak.fetch_max(now, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(20)).await;
            self.running.fetch_sub(1, Ordering::SeqCst);

            tokio::fs::write(destination, b"%PDF-partial").await?;
            let name = source.file_name().unwrap().to_string_lossy();
            if name.starts_with("broken") {
                return Err(IntegrationError::MissingOutput(source.to_path_buf()));
            }
            Ok(())
        }

        fn is_reentrant(&self) -> bool {
            self.reentrant
        }
    }

    /// Records stamped files; fails when asked to
    struct FakeCompositor {
        stamped: std::sync::Mutex<Vec<PathBuf>>,
        fail: bool,
    }

    impl FakeCompositor {
        fn new(fail: bool) -> Self {
            Self {
                stamped: std::sync::Mutex::new(Vec::new()),
                fail,
            }
        }
    }

    impl PageCompositor for FakeCompositor {
        fn overlay_first_page(
            &self,
            pdf: &Path,
            image: &QrImage,
            _placement: &QrPlacement,
        ) -> IntegrationResult<()> {
            if self.fail {
                return Err(IntegrationError::PdfStructure("no pages".to_string()));
            }
            assert_eq!(image.side, 120);
            self.stamped.lock().unwrap().push(pdf.to_path_buf());
            Ok(())
        }
    }

    fn solid_encoder(expected_calls: usize) -> MockQrEncoder {
        let mut encoder = MockQrEncoder::new();
        encoder
            .expect_encode()
            .times(expected_calls)
            .returning(|_, side| QrImage::new(side, vec![0; (side * side) as usize]));
        encoder
    }

    fn submission(
        input: &Path,
        output: &Path,
        name: &str,
        format: SourceFormat,
        poster: bool,
    ) -> ResolvedSubmission {
        let source = input.join(name);
        std::fs::write(&source, b"%PDF-source").unwrap();
        let (kind, category) = if poster {
            (
                DocumentKind::Poster,
                Some(CategoryLabel::Known(PosterCategory::Core)),
            )
        } else {
            (DocumentKind::Paper, None)
        };
        let stem = name.split('.').next().unwrap();
        ResolvedSubmission {
            identity: SubmissionIdentity {
                last_name: stem.to_string(),
                first_name: "Wen".to_string(),
                school: "UTK".to_string(),
                advisor: "Wang".to_string(),
                index: 1,
                revision: 0,
                kind,
                format,
                path: source,
                area: "Grid".to_string(),
                category,
            },
            destination: output.join(kind.dir_name()).join("Grid").join(format!("{}.pdf", stem)),
            qr_link: poster.then(|| format!("https://example.org/{}.pdf", stem)),
        }
    }

    fn driver(
        renderer: Arc<FakeRenderer>,
        encoder: MockQrEncoder,
        compositor: Arc<FakeCompositor>,
        jobs: usize,
        bus: Arc<EventBus>,
    ) -> ConversionDriver {
        ConversionDriver::new(
            renderer,
            Arc::new(encoder),
            compositor,
            &StampingConfig::default(),
            jobs,
            bus,
        )
    }

    #[tokio::test]
    async fn test_papers_render_and_posters_get_stamped() {
        let input = TempDir::new().unwrap();
        let output = TempDir::new().unwrap();
        let compositor = Arc::new(FakeCompositor::new(false));
        let bus = Arc::new(EventBus::new());

        let summary = driver(
            Arc::new(FakeRenderer::new(false)),
            solid_encoder(1),
            Arc::clone(&compositor),
            2,
            Arc::clone(&bus),
        )
        .convert_all(vec![
            submission(input.path(), output.path(), "zhang.docx", SourceFormat::Word, false),
            submission(input.path(), output.path(), "ma.pdf", SourceFormat::Pdf, true),
        ])
        .await;

        assert!(summary.failures.is_empty());
        assert_eq!(summary.produced.len(), 2);
        // sorted by destination: Papers/... before Posters/...
        assert!(!summary.produced[0].stamped);
        assert!(summary.produced[1].stamped);

        let poster = output.path().join("Posters/Grid/ma.pdf");
        assert_eq!(std::fs::read(&poster).unwrap(), b"%PDF-source");
        assert_eq!(*compositor.stamped.lock().unwrap(), vec![poster]);
        assert_eq!(bus.count_of("SubmissionConverted"), 2);
        assert_eq!(bus.count_of("ConversionBatchCompleted"), 1);
    }

    #[tokio::test]
    async fn test_one_failure_leaves_others_produced() {
        let input = TempDir::new().unwrap();
        let output = TempDir::new().unwrap();
        let bus = Arc::new(EventBus::new());

        let summary = driver(
            Arc::new(FakeRenderer::new(false)),
            solid_encoder(0),
            Arc::new(FakeCompositor::new(false)),
            4,
            Arc::clone(&bus),
        )
        .convert_all(vec![
            submission(input.path(), output.path(), "broken.docx", SourceFormat::Word, false),
            submission(input.path(), output.path(), "li.docx", SourceFormat::Word, false),
            submission(input.path(), output.path(), "chen.pdf", SourceFormat::Pdf, false),
        ])
        .await;

        assert_eq!(summary.produced.len(), 2);
        assert_eq!(summary.failures.len(), 1);
        assert_eq!(summary.failures[0].stage, ConversionStage::Render);
        assert!(!summary.failures[0].destination.exists());
        assert_eq!(bus.count_of("ConversionFailed"), 1);
    }

    #[tokio::test]
    async fn test_stamp_failure_removes_output() {
        let input = TempDir::new().unwrap();
        let output = TempDir::new().unwrap();

        let summary = driver(
            Arc::new(FakeRenderer::new(false)),
            solid_encoder(1),
            Arc::new(FakeCompositor::new(true)),
            1,
            Arc::new(EventBus::new()),
        )
        .convert_all(vec![submission(
            input.path(),
            output.path(),
            "ma.pptx",
            SourceFormat::Slides,
            true,
        )])
        .await;

        assert!(summary.produced.is_empty());
        assert_eq!(summary.failures[0].stage, ConversionStage::Stamp);
        assert!(!output.path().join("Posters/Grid/ma.pdf").exists());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_non_reentrant_renderer_is_serialized() {
        let input = TempDir::new().unwrap();
        let output = TempDir::new().unwrap();
        let renderer = Arc::new(FakeRenderer::new(false));

        let submissions = ["a", "b", "c", "d", "e", "f"]
            .iter()
            .map(|name| {
                submission(
                    input.path(),
                    output.path(),
                    &format!("{}.docx", name),
                    SourceFormat::Word,
                    false,
                )
            })
            .collect();

        let summary = driver(
            Arc::clone(&renderer),
            solid_encoder(0),
            Arc::new(FakeCompositor::new(false)),
            4,
            Arc::new(EventBus::new()),
        )
        .convert_all(submissions)
        .await;

        assert_eq!(summary.produced.len(), 6);
        assert_eq!(renderer.peak.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_jobs_bound_concurrency() {
        let input = TempDir::new().unwrap();
        let output = TempDir::new().unwrap();
        let renderer = Arc::new(FakeRenderer::new(true));

        let submissions = (0..8)
            .map(|n| {
                submission(
                    input.path(),
                    output.path(),
                    &format!("s{}.docx", n),
                    SourceFormat::Word,
                    false,
                )
            })
            .collect();

        let summary = driver(
            Arc::clone(&renderer),
            solid_encoder(0),
            Arc::new(FakeCompositor::new(false)),
            2,
            Arc::new(EventBus::new()),
        )
        .convert_all(submissions)
        .await;

        assert_eq!(summary.produced.len(), 8);
        assert!(renderer.peak.load(Ordering::SeqCst) <= 2);
    }
}
