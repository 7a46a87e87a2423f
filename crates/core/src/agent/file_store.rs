//! File-based agent storage implementation
//!
//! Stores agents as JSON in a file on disk.

use async_trait::async_trait;
use chrono::Utc;
use std::path::PathBuf;
use uuid::Uuid;

use super::model::Agent;
use super::repository::AgentRepository;
use crate::store::{JsonFileStore, Record};
use crate::{Error, Result};

impl Record for Agent {
    fn id(&self) -> Uuid {
        self.id
    }
}

/// File-based agent store using JSON
pub struct FileAgentStore {
    inner: JsonFileStore<Agent>,
}

impl FileAgentStore {
    /// Open the store at `path`.
    ///
    /// If the file doesn't exist, it will be created on first write.
    pub async fn new(path: impl Into<PathBuf>) -> Result<Self> {
        Ok(Self {
            inner: JsonFileStore::open(path).await?,
        })
    }
}

#[async_trait]
impl AgentRepository for FileAgentStore {
    async fn create(&self, agent: Agent) -> Result<Agent> {
        agent.validate()?;
        self.inner
            .modify(|agents| {
                if agents.contains_key(&agent.id) {
                    return Err(Error::InvalidInput(format!(
                        "Agent with ID {} already exists",
                        agent.id
                    )));
                }
                agents.insert(agent.id, agent.clone());
                Ok(())
            })
            .await?;
        Ok(agent)
    }

    async fn get(&self, id: Uuid) -> Result<Option<Agent>> {
        Ok(self.inner.get(id).await)
    }

    async fn list(&self) -> Result<Vec<Agent>> {
        let mut agents = self.inner.values().await;
        agents.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(agents)
    }

    async fn update(&self, mut agent: Agent) -> Result<Agent> {
        agent.validate()?;
        agent.updated_at = Utc::now();
        self.inner
            .modify(|agents| {
                let Some(existing) = agents.get(&agent.id) else {
                    return Err(Error::AgentNotFound(agent.id.to_string()));
                };
                agent.created_at = existing.created_at;
                agents.insert(agent.id, agent.clone());
                Ok(())
            })
            .await?;
        Ok(agent)
    }

    async fn delete(&self, id: Uuid) -> Result<bool> {
        if self.inner.get(id).await.is_none() {
            return Ok(false);
        }
        self.inner
            .modify(|agents| Ok(agents.remove(&id).is_some()))
            .await
    }
}
