//! Crew engine - runs single agents and sequential crews
//!
//! Every call first offers the work to the rich orchestrator (when enabled
//! and available) and falls back to direct chat completions otherwise.
//! Crew fallbacks are a pipeline: each agent sees every earlier agent's
//! output.

use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{debug, info, warn};

use crew_core::agent::Agent;
use crew_core::run::DEFAULT_CREW_NAME;

use crate::chat::{ChatCompletionApi, ChatMessage};
use crate::error::{Result, RunnerError};
use crate::rich::{DisabledOrchestrator, RichOrchestrator, RichOutcome, RichSession};

/// The parts of an agent the engine needs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentDescriptor {
    pub name: String,
    pub role: String,
    pub goal: String,
    pub model: String,
}

impl From<&Agent> for AgentDescriptor {
    fn from(agent: &Agent) -> Self {
        Self {
            name: agent.name.clone(),
            role: agent.role.clone(),
            goal: agent.goal.clone(),
            model: agent.model.clone(),
        }
    }
}

/// Which path produced a result
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExecutionMode {
    Direct,
    Rich,
}

/// Per-request execution preference
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RunMode {
    /// Follow the engine configuration
    #[default]
    Auto,
    /// Same as `Auto`; a request cannot enable a disabled rich path
    Rich,
    /// Skip the rich attempt
    Direct,
}

impl RunMode {
    /// Parse an optional mode string; absent or blank means `Auto`
    pub fn parse(raw: Option<&str>) -> Result<Self> {
        match raw.map(str::trim).filter(|m| !m.is_empty()) {
            None => Ok(Self::Auto),
            Some(mode) => mode.parse(),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Auto => "auto",
            Self::Rich => "rich",
            Self::Direct => "direct",
        }
    }

    fn allows_rich(self) -> bool {
        !matches!(self, Self::Direct)
    }
}

impl FromStr for RunMode {
    type Err = RunnerError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "auto" => Ok(Self::Auto),
            "rich" => Ok(Self::Rich),
            "direct" => Ok(Self::Direct),
            _ => Err(RunnerError::InvalidMode {
                mode: s.to_string(),
            }),
        }
    }
}

/// Output of a single agent invocation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentResponse {
    pub agent: String,
    pub output: String,
    pub model: String,
    pub mode: ExecutionMode,
    /// Set when a rich attempt failed and the direct path answered instead
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fallback_reason: Option<String>,
}

/// Output of a crew invocation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CrewResponse {
    pub crew: String,
    pub objective: String,
    pub mode: ExecutionMode,
    /// Per-agent responses in invocation order; empty for rich results
    pub responses: Vec<AgentResponse>,
    /// The orchestrator's combined answer; only for rich results
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fallback_reason: Option<String>,
}

#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Attempt the rich orchestrator before direct completions
    pub rich_enabled: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self { rich_enabled: true }
    }
}

pub struct CrewEngine {
    config: EngineConfig,
    chat: Option<Arc<dyn ChatCompletionApi>>,
    rich: Arc<dyn RichOrchestrator>,
}

impl CrewEngine {
    /// `chat` is `None` when no credential is configured; direct runs then
    /// fail with [`RunnerError::MissingCredential`].
    pub fn new(
        config: EngineConfig,
        chat: Option<Arc<dyn ChatCompletionApi>>,
        rich: Arc<dyn RichOrchestrator>,
    ) -> Self {
        Self { config, chat, rich }
    }

    /// An engine that never attempts rich orchestration
    pub fn direct_only(chat: Option<Arc<dyn ChatCompletionApi>>) -> Self {
        Self::new(
            EngineConfig {
                rich_enabled: false,
            },
            chat,
            Arc::new(DisabledOrchestrator),
        )
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Run one agent against `input_text`
    pub async fn run_single(
        &self,
        agent: &AgentDescriptor,
        input_text: &str,
        context: Option<&Map<String, Value>>,
        mode: RunMode,
    ) -> Result<AgentResponse> {
        let mut fallback_reason = None;

        if self.rich_allowed(mode) {
            let session = RichSession::new(
                std::slice::from_ref(agent),
                append_context(input_text.to_string(), context),
            );
            match self.attempt_rich(&session).await {
                RichOutcome::Completed(output) => {
                    info!("Agent {} answered through the rich orchestrator", agent.name);
                    return Ok(AgentResponse {
                        agent: agent.name.clone(),
                        output,
                        model: agent.model.clone(),
                        mode: ExecutionMode::Rich,
                        fallback_reason: None,
                    });
                }
                RichOutcome::Unavailable => {}
                RichOutcome::Failed(reason) => fallback_reason = Some(reason),
            }
        }

        let mut response = self.run_direct(agent, input_text, context).await?;
        response.fallback_reason = fallback_reason;
        Ok(response)
    }

    /// Run a crew on a shared objective.
    ///
    /// The direct fallback invokes agents strictly in the given order; each
    /// agent's input carries every earlier output.
    pub async fn run_crew(
        &self,
        agents: &[AgentDescriptor],
        objective: &str,
        context: Option<&Map<String, Value>>,
        crew_name: Option<&str>,
        mode: RunMode,
    ) -> Result<CrewResponse> {
        let crew = crew_name
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .unwrap_or(DEFAULT_CREW_NAME)
            .to_string();
        let mut fallback_reason = None;

        if self.rich_allowed(mode) {
            let session = RichSession::new(agents, append_context(objective.to_string(), context));
            match self.attempt_rich(&session).await {
                RichOutcome::Completed(output) => {
                    info!("Crew {} answered through the rich orchestrator", crew);
                    return Ok(CrewResponse {
                        crew,
                        objective: objective.to_string(),
                        mode: ExecutionMode::Rich,
                        responses: Vec::new(),
                        output: Some(output),
                        fallback_reason: None,
                    });
                }
                RichOutcome::Unavailable => {}
                RichOutcome::Failed(reason) => fallback_reason = Some(reason),
            }
        }

        let mut responses: Vec<AgentResponse> = Vec::with_capacity(agents.len());
        for (step, agent) in agents.iter().enumerate() {
            let input = stitch_crew_input(objective, &responses, context);
            debug!(
                "Crew {} step {}/{}: agent {}",
                crew,
                step + 1,
                agents.len(),
                agent.name
            );
            let response = self.run_direct(agent, &input, None).await?;
            responses.push(response);
        }

        Ok(CrewResponse {
            crew,
            objective: objective.to_string(),
            mode: ExecutionMode::Direct,
            responses,
            output: None,
            fallback_reason,
        })
    }

    fn rich_allowed(&self, mode: RunMode) -> bool {
        self.config.rich_enabled && mode.allows_rich()
    }

    async fn attempt_rich(&self, session: &RichSession) -> RichOutcome {
        if !self.rich.is_available() {
            debug!("Rich orchestrator unavailable, using direct completions");
            return RichOutcome::Unavailable;
        }

        match self.rich.kickoff(session).await {
            Ok(output) => RichOutcome::Completed(output),
            Err(e) => {
                warn!("Rich orchestration failed, falling back to direct completions: {}", e);
                RichOutcome::Failed(e.to_string())
            }
        }
    }

    async fn run_direct(
        &self,
        agent: &AgentDescriptor,
        input_text: &str,
        context: Option<&Map<String, Value>>,
    ) -> Result<AgentResponse> {
        let chat = self.chat.as_ref().ok_or(RunnerError::MissingCredential)?;

        let completion = chat.chat(&build_messages(agent, input_text, context)).await?;
        let output = completion
            .first_content()
            .ok_or(RunnerError::EmptyCompletion)?
            .to_string();

        Ok(AgentResponse {
            agent: agent.name.clone(),
            output,
            model: agent.model.clone(),
            mode: ExecutionMode::Direct,
            fallback_reason: None,
        })
    }
}

/// Messages for one direct completion: persona, input, and the context as a
/// trailing user message when present.
pub fn build_messages(
    agent: &AgentDescriptor,
    input_text: &str,
    context: Option<&Map<String, Value>>,
) -> Vec<ChatMessage> {
    let mut messages = vec![
        ChatMessage::system(format!(
            "You are an autonomous data-retrieval agent. Role: {}. Goal: {}",
            agent.role, agent.goal
        )),
        ChatMessage::user(input_text),
    ];
    if let Some(rendered) = render_context(context) {
        messages.push(ChatMessage::user(format!("Context: {}", rendered)));
    }
    messages
}

/// Input for the next crew member: objective, then prior outputs, then context.
pub fn stitch_crew_input(
    objective: &str,
    prior: &[AgentResponse],
    context: Option<&Map<String, Value>>,
) -> String {
    let mut stitched = objective.to_string();
    if !prior.is_empty() {
        stitched.push_str("\n\nPrior agent outputs:\n");
        let outputs: Vec<&str> = prior.iter().map(|r| r.output.as_str()).collect();
        stitched.push_str(&outputs.join("\n"));
    }
    append_context(stitched, context)
}

fn append_context(mut text: String, context: Option<&Map<String, Value>>) -> String {
    if let Some(rendered) = render_context(context) {
        text.push_str("\n\nContext: ");
        text.push_str(&rendered);
    }
    text
}

/// Empty contexts count as absent
fn render_context(context: Option<&Map<String, Value>>) -> Option<String> {
    context
        .filter(|map| !map.is_empty())
        .map(|map| Value::Object(map.clone()).to_string())
}
