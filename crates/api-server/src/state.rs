//! Application state

use std::sync::Arc;

use anyhow::Context;
use tracing::{info, warn};

use crew_core::agent::FileAgentStore;
use crew_core::run::FileRunStore;
use crew_runner::{
    ChatClient, ChatCompletionApi, CrewEngine, EngineConfig, RunnerError, WorkerOrchestrator,
};
use page_fetcher::PageFetcher;

use crate::config::Settings;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    agent_store: FileAgentStore,
    run_store: FileRunStore,
    engine: CrewEngine,
    fetcher: PageFetcher,
}

impl AppState {
    /// Open the stores in the data directory and build the clients
    pub async fn new(settings: &Settings) -> anyhow::Result<Self> {
        let agent_store = FileAgentStore::new(settings.data_dir.join("agents.json"))
            .await
            .context("Failed to open agent store")?;
        let run_store = FileRunStore::new(settings.data_dir.join("runs.json"))
            .await
            .context("Failed to open run store")?;

        let chat: Option<Arc<dyn ChatCompletionApi>> =
            match ChatClient::new(settings.chat_config()) {
                Ok(client) => {
                    info!("Chat completions via {} ({})", settings.chat_base_url, client.model());
                    Some(Arc::new(client))
                }
                Err(RunnerError::MissingCredential) => {
                    warn!("CHAT_API_KEY is not set; direct runs will fail");
                    None
                }
                Err(e) => return Err(e).context("Failed to build chat client"),
            };

        let orchestrator = WorkerOrchestrator::new(settings.rich_orchestrator_url.clone());
        let engine = CrewEngine::new(
            EngineConfig {
                rich_enabled: settings.rich_enabled,
            },
            chat,
            Arc::new(orchestrator),
        );

        let fetcher =
            PageFetcher::new(settings.fetcher_config()).context("Failed to build page fetcher")?;

        Ok(Self::with_components(agent_store, run_store, engine, fetcher))
    }

    /// Assemble state from already constructed parts
    pub fn with_components(
        agent_store: FileAgentStore,
        run_store: FileRunStore,
        engine: CrewEngine,
        fetcher: PageFetcher,
    ) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                agent_store,
                run_store,
                engine,
                fetcher,
            }),
        }
    }

    pub fn agent_store(&self) -> &FileAgentStore {
        &self.inner.agent_store
    }

    pub fn run_store(&self) -> &FileRunStore {
        &self.inner.run_store
    }

    pub fn engine(&self) -> &CrewEngine {
        &self.inner.engine
    }

    pub fn fetcher(&self) -> &PageFetcher {
        &self.inner.fetcher
    }
}
