//! Run repository trait

use async_trait::async_trait;
use uuid::Uuid;

use super::model::Run;
use crate::Result;

/// Repository interface for run records
#[async_trait]
pub trait RunRepository: Send + Sync {
    /// Store a new run
    async fn create(&self, run: Run) -> Result<Run>;

    /// Get a run by ID
    async fn get(&self, id: Uuid) -> Result<Option<Run>>;

    /// Get all runs, newest first
    async fn list(&self) -> Result<Vec<Run>>;

    /// Write back a run whose status moved forward.
    ///
    /// Fails with [`crate::Error::RunFinished`] when the stored record is
    /// already terminal.
    async fn update(&self, run: Run) -> Result<Run>;
}
