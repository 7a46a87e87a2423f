//! Run model definitions

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::{Error, Result};

/// Crew name recorded when a crew request does not name one
pub const DEFAULT_CREW_NAME: &str = "default-crew";

/// What a run dispatched
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunType {
    Agent,
    Crew,
}

/// Lifecycle of a run: pending -> running -> completed | failed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunStatus {
    Pending,
    Running,
    Completed,
    Failed,
}

impl RunStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Running => "running",
            Self::Completed => "completed",
            Self::Failed => "failed",
        }
    }
}

impl Default for RunStatus {
    fn default() -> Self {
        Self::Pending
    }
}

impl fmt::Display for RunStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A persisted invocation attempt
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Run {
    pub id: Uuid,
    pub run_type: RunType,
    pub agent_id: Option<Uuid>,
    pub crew_name: Option<String>,
    pub input_payload: serde_json::Value,
    pub output_payload: Option<serde_json::Value>,
    pub status: RunStatus,
    pub error: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Run {
    fn new(run_type: RunType, input_payload: serde_json::Value) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            run_type,
            agent_id: None,
            crew_name: None,
            input_payload,
            output_payload: None,
            status: RunStatus::default(),
            error: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// A pending single-agent run
    pub fn for_agent(agent_id: Uuid, input_payload: serde_json::Value) -> Self {
        let mut run = Self::new(RunType::Agent, input_payload);
        run.agent_id = Some(agent_id);
        run
    }

    /// A pending crew run; a missing name falls back to [`DEFAULT_CREW_NAME`]
    pub fn for_crew(crew_name: Option<String>, input_payload: serde_json::Value) -> Self {
        let mut run = Self::new(RunType::Crew, input_payload);
        run.crew_name = Some(crew_name.unwrap_or_else(|| DEFAULT_CREW_NAME.to_string()));
        run
    }

    pub fn mark_started(&mut self) -> Result<()> {
        self.transition(RunStatus::Pending, RunStatus::Running)
    }

    pub fn mark_completed(&mut self, output: serde_json::Value) -> Result<()> {
        self.transition(RunStatus::Running, RunStatus::Completed)?;
        self.output_payload = Some(output);
        Ok(())
    }

    pub fn mark_failed(&mut self, error: impl Into<String>) -> Result<()> {
        self.transition(RunStatus::Running, RunStatus::Failed)?;
        self.error = Some(error.into());
        Ok(())
    }

    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }

    fn transition(&mut self, expected: RunStatus, next: RunStatus) -> Result<()> {
        if self.status != expected {
            return Err(Error::InvalidTransition {
                from: self.status,
                to: next,
            });
        }
        self.status = next;
        Ok(())
    }
}
