use std::sync::Arc;

use glidedesk_core::config::AppConfig;
use glidedesk_core::domain::capability::UnknownCapability;
use glidedesk_core::CapabilityName;
use thiserror::Error;
use tracing::info;

use crate::capabilities::{
    BookingAgent, FaqAgent, IdValidationAgent, OnboardingAgent, TrackingAgent,
};
use crate::classify::IntentClassifier;
use crate::llm::{LlmClient, NoopLlmClient};
use crate::orchestrator::Orchestrator;
use crate::session::{InMemorySessionStore, SessionStore};
use crate::storage::{BlobStore, InMemoryBlobStore};
use crate::tools::{
    CreateBookingTool, DocumentIndex, ExtractTextTool, FixtureOcrEngine, OcrEngine, PanParseTool,
    RagQueryTool, ToolRegistry, TrackShipmentTool,
};

/// External collaborators injected at startup.
pub struct RuntimeDeps {
    pub llm: Arc<dyn LlmClient>,
    pub ocr: Arc<dyn OcrEngine>,
    pub blobs: Arc<dyn BlobStore>,
    pub sessions: Arc<dyn SessionStore>,
}

impl RuntimeDeps {
    /// All-in-process collaborators: noop model, fixture OCR, in-memory
    /// blob and session stores. Used by the CLI and by tests.
    pub fn in_memory(config: &AppConfig) -> Self {
        Self {
            llm: Arc::new(NoopLlmClient),
            ocr: Arc::new(FixtureOcrEngine),
            blobs: Arc::new(InMemoryBlobStore::new(
                config.storage.bucket.clone(),
                config.storage.temp_folder.clone(),
            )),
            sessions: Arc::new(InMemorySessionStore::default()),
        }
    }
}

/// Everything the transports need, built once at startup and shared by
/// reference across request handlers.
pub struct SupportRuntime {
    pub orchestrator: Orchestrator,
    pub tools: ToolRegistry,
    pub sessions: Arc<dyn SessionStore>,
    pub blobs: Arc<dyn BlobStore>,
    pub app_name: String,
}

#[derive(Debug, Error)]
pub enum BuildError {
    #[error("invalid default capability: {0}")]
    DefaultCapability(#[from] UnknownCapability),
    #[error("capability `{0}` missing from registry after construction")]
    MissingCapability(CapabilityName),
}

/// Constructs the full support runtime. Construction failures surface here
/// as startup errors; nothing is built lazily at dispatch time.
pub fn build_runtime(config: &AppConfig, deps: RuntimeDeps) -> Result<SupportRuntime, BuildError> {
    let default_capability: CapabilityName = config.support.default_capability.parse()?;
    let classifier = IntentClassifier::with_default(default_capability);

    let index = Arc::new(DocumentIndex::builtin());
    let tracking_tool = Arc::new(TrackShipmentTool::seeded());
    let booking_tool = Arc::new(CreateBookingTool::new(config.support.max_package_weight_kg));
    let extract_text_tool =
        Arc::new(ExtractTextTool::new(deps.blobs.clone(), deps.ocr.clone()));
    let pan_tool = Arc::new(PanParseTool);
    let rag_tool = Arc::new(RagQueryTool::new(index.clone()));

    let mut tools = ToolRegistry::default();
    tools.register(booking_tool);
    tools.register(tracking_tool.clone());
    tools.register(extract_text_tool);
    tools.register(pan_tool);
    tools.register(rag_tool);

    let mut orchestrator = Orchestrator::new(classifier);
    orchestrator.register(Arc::new(FaqAgent::new(index, deps.llm.clone())));
    orchestrator.register(Arc::new(BookingAgent));
    orchestrator.register(Arc::new(TrackingAgent::new(tracking_tool)));
    orchestrator.register(Arc::new(OnboardingAgent));
    orchestrator.register(Arc::new(IdValidationAgent::new(
        deps.blobs.clone(),
        deps.ocr.clone(),
    )));

    for capability in CapabilityName::ALL {
        if !orchestrator.is_registered(capability) {
            return Err(BuildError::MissingCapability(capability));
        }
    }

    info!(
        event_name = "support.runtime.built",
        capabilities = orchestrator.capabilities().len(),
        tools = tools.len(),
        app_name = %config.support.app_name,
        "support runtime constructed"
    );

    Ok(SupportRuntime {
        orchestrator,
        tools,
        sessions: deps.sessions,
        blobs: deps.blobs,
        app_name: config.support.app_name.clone(),
    })
}
