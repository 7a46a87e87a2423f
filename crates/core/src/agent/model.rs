//! Agent model definitions

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Error, Result};

/// Model used when a create request does not name one
pub const DEFAULT_AGENT_MODEL: &str = "llama3-8b-8192";

/// A named persona that runs can invoke
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Agent {
    pub id: Uuid,
    pub name: String,
    pub role: String,
    pub goal: String,
    pub model: String,
    #[serde(default)]
    pub tools: Vec<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Agent {
    /// Create an active agent with the default model and no tools
    pub fn new(
        name: impl Into<String>,
        role: impl Into<String>,
        goal: impl Into<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            role: role.into(),
            goal: goal.into(),
            model: DEFAULT_AGENT_MODEL.to_string(),
            tools: Vec::new(),
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }

    /// Set the model
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Set the tool names
    pub fn with_tools(mut self, tools: Vec<String>) -> Self {
        self.tools = tools;
        self
    }

    /// Set the active flag
    pub fn with_active(mut self, is_active: bool) -> Self {
        self.is_active = is_active;
        self
    }

    /// Check that every required text field is non-empty
    pub fn validate(&self) -> Result<()> {
        require_text("name", &self.name)?;
        require_text("role", &self.role)?;
        require_text("goal", &self.goal)?;
        require_text("model", &self.model)?;
        Ok(())
    }

    /// Apply a partial update.
    ///
    /// Only the fields present in the patch change. The patched agent is
    /// validated before it is returned, so a patch cannot blank a required
    /// field. `updated_at` is left to the store.
    pub fn apply(mut self, patch: AgentPatch) -> Result<Self> {
        if let Some(name) = patch.name {
            self.name = name;
        }
        if let Some(role) = patch.role {
            self.role = role;
        }
        if let Some(goal) = patch.goal {
            self.goal = goal;
        }
        if let Some(model) = patch.model {
            self.model = model;
        }
        if let Some(tools) = patch.tools {
            self.tools = tools;
        }
        if let Some(is_active) = patch.is_active {
            self.is_active = is_active;
        }
        self.validate()?;
        Ok(self)
    }
}

/// Partial update for an agent; absent fields are left untouched
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AgentPatch {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub goal: Option<String>,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub tools: Option<Vec<String>>,
    #[serde(default)]
    pub is_active: Option<bool>,
}

fn require_text(field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(Error::InvalidInput(format!("{} cannot be empty", field)));
    }
    Ok(())
}
