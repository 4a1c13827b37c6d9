// src/application/state.rs

use std::sync::Arc;

use crate::config::AppConfig;
use crate::events::EventBus;
use crate::integrations::{
    DocumentRenderer, LopdfCompositor, OfficeRenderer, PageCompositor, QrCodeEncoder, QrEncoder,
};
use crate::services::{ConversionDriver, ResolutionService, ScanService};

/// Everything a command needs for one invocation.
/// Services are Arc-wrapped and share one event bus.
pub struct AppState {
    pub config: AppConfig,
    pub event_bus: Arc<EventBus>,
    pub scan_service: Arc<ScanService>,
    pub resolution_service: Arc<ResolutionService>,
    pub renderer: Arc<dyn DocumentRenderer>,
    pub encoder: Arc<dyn QrEncoder>,
    pub compositor: Arc<dyn PageCompositor>,
}

impl AppState {
    /// Wire the real collaborators: LibreOffice, `qrcode`, `lopdf`
    pub fn new(config: AppConfig, event_bus: Arc<EventBus>) -> Self {
        let renderer: Arc<dyn DocumentRenderer> = Arc::new(OfficeRenderer::new(&config.renderer));
        Self::with_collaborators(
            config,
            event_bus,
            renderer,
            Arc::new(QrCodeEncoder),
            Arc::new(LopdfCompositor),
        )
    }

    pub fn with_collaborators(
        config: AppConfig,
        event_bus: Arc<EventBus>,
        renderer: Arc<dyn DocumentRenderer>,
        encoder: Arc<dyn QrEncoder>,
        compositor: Arc<dyn PageCompositor>,
    ) -> Self {
        Self {
            scan_service: Arc::new(ScanService::new(Arc::clone(&event_bus))),
            resolution_service: Arc::new(ResolutionService::new(Arc::clone(&event_bus))),
            config,
            event_bus,
            renderer,
            encoder,
            compositor,
        }
    }

    pub fn conversion_driver(&self) -> ConversionDriver {
        ConversionDriver::new(
            Arc::clone(&self.renderer),
            Arc::clone(&self.encoder),
            Arc::clone(&self.compositor),
            &self.config.stamping,
            self.config.jobs(),
            Arc::clone(&self.event_bus),
        )
    }
}
