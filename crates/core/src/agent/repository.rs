//! Agent repository trait
//!
//! Defines the interface for agent storage operations.

use async_trait::async_trait;
use uuid::Uuid;

use super::model::Agent;
use crate::Result;

/// Repository interface for agent CRUD operations
#[async_trait]
pub trait AgentRepository: Send + Sync {
    /// Create a new agent
    async fn create(&self, agent: Agent) -> Result<Agent>;

    /// Get an agent by ID
    async fn get(&self, id: Uuid) -> Result<Option<Agent>>;

    /// Get all agents, newest first
    async fn list(&self) -> Result<Vec<Agent>>;

    /// Replace an existing agent, refreshing `updated_at`
    async fn update(&self, agent: Agent) -> Result<Agent>;

    /// Delete an agent by ID
    async fn delete(&self, id: Uuid) -> Result<bool>;
}
