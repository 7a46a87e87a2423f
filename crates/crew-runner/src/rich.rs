//! Rich orchestration
//!
//! An external multi-agent service that can take a whole crew and a task
//! and return a single answer. The engine only asks it for a result when it
//! reports itself available; failures never escape the engine.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::engine::AgentDescriptor;
use crate::error::{Result, RunnerError};

/// Expected output attached to every rich task
pub const EXPECTED_OUTPUT: &str = "Actionable response.";

/// Agent definition as the orchestrator expects it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RichAgent {
    pub role: String,
    pub goal: String,
    pub backstory: String,
    pub allow_delegation: bool,
    pub model: String,
}

impl From<&AgentDescriptor> for RichAgent {
    fn from(agent: &AgentDescriptor) -> Self {
        Self {
            role: agent.role.clone(),
            goal: agent.goal.clone(),
            backstory: format!("Agent name: {}.", agent.name),
            allow_delegation: false,
            model: agent.model.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RichTask {
    pub description: String,
    pub expected_output: String,
}

/// One kickoff: a crew of agents working a single task
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RichSession {
    pub agents: Vec<RichAgent>,
    pub tasks: Vec<RichTask>,
}

impl RichSession {
    pub fn new(agents: &[AgentDescriptor], description: impl Into<String>) -> Self {
        Self {
            agents: agents.iter().map(RichAgent::from).collect(),
            tasks: vec![RichTask {
                description: description.into(),
                expected_output: EXPECTED_OUTPUT.to_string(),
            }],
        }
    }
}

/// What a rich attempt produced
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RichOutcome {
    /// The orchestrator answered
    Completed(String),
    /// The orchestrator is not wired up or reported itself unavailable
    Unavailable,
    /// The orchestrator was available but the kickoff failed
    Failed(String),
}

/// Capability-checked interface to an external orchestrator
#[async_trait]
pub trait RichOrchestrator: Send + Sync {
    /// Whether a kickoff can be attempted at all
    fn is_available(&self) -> bool;

    /// Run the session and return the orchestrator's textual result
    async fn kickoff(&self, session: &RichSession) -> Result<String>;
}

/// Orchestrator used when no rich backend is configured
pub struct DisabledOrchestrator;

#[async_trait]
impl RichOrchestrator for DisabledOrchestrator {
    fn is_available(&self) -> bool {
        false
    }

    async fn kickoff(&self, _session: &RichSession) -> Result<String> {
        Err(RunnerError::orchestrator("rich orchestration is not configured"))
    }
}

#[derive(Deserialize)]
struct KickoffResponse {
    output: String,
}

/// HTTP client for an orchestration worker exposing `POST /kickoff`
pub struct WorkerOrchestrator {
    client: Client,
    url: Option<String>,
}

impl WorkerOrchestrator {
    pub fn new(url: Option<String>) -> Self {
        Self::with_timeout(url, Duration::from_secs(120))
    }

    pub fn with_timeout(url: Option<String>, timeout: Duration) -> Self {
        Self {
            client: Client::builder()
                .timeout(timeout)
                .build()
                .unwrap_or_else(|_| Client::new()),
            url: url
                .map(|u| u.trim().trim_end_matches('/').to_string())
                .filter(|u| !u.is_empty()),
        }
    }
}

#[async_trait]
impl RichOrchestrator for WorkerOrchestrator {
    fn is_available(&self) -> bool {
        self.url.is_some()
    }

    async fn kickoff(&self, session: &RichSession) -> Result<String> {
        let url = self
            .url
            .as_ref()
            .ok_or_else(|| RunnerError::orchestrator("orchestrator URL is not configured"))?;

        info!(
            "Sending kickoff to orchestrator: {}/kickoff ({} agents)",
            url,
            session.agents.len()
        );

        let res = self
            .client
            .post(format!("{}/kickoff", url))
            .json(session)
            .send()
            .await?;

        let status = res.status();
        if !status.is_success() {
            let body = res.text().await.unwrap_or_default();
            return Err(RunnerError::UpstreamStatus {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: KickoffResponse = res.json().await?;
        Ok(parsed.output)
    }
}
