//! File-based run storage
//!
//! Same layout as the agent store: one pretty-printed JSON array on disk
//! mirrored by an in-memory map.

use async_trait::async_trait;
use chrono::Utc;
use std::path::PathBuf;
use uuid::Uuid;

use super::model::Run;
use super::repository::RunRepository;
use crate::store::{JsonFileStore, Record};
use crate::{Error, Result};

impl Record for Run {
    fn id(&self) -> Uuid {
        self.id
    }
}

pub struct FileRunStore {
    inner: JsonFileStore<Run>,
}

impl FileRunStore {
    pub async fn new(path: impl Into<PathBuf>) -> Result<Self> {
        Ok(Self {
            inner: JsonFileStore::open(path).await?,
        })
    }
}

#[async_trait]
impl RunRepository for FileRunStore {
    async fn create(&self, run: Run) -> Result<Run> {
        self.inner
            .modify(|runs| {
                if runs.contains_key(&run.id) {
                    return Err(Error::InvalidInput(format!(
                        "Run with ID {} already exists",
                        run.id
                    )));
                }
                runs.insert(run.id, run.clone());
                Ok(())
            })
            .await?;
        Ok(run)
    }

    async fn get(&self, id: Uuid) -> Result<Option<Run>> {
        Ok(self.inner.get(id).await)
    }

    async fn list(&self) -> Result<Vec<Run>> {
        let mut runs = self.inner.values().await;
        runs.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(runs)
    }

    async fn update(&self, mut run: Run) -> Result<Run> {
        run.updated_at = Utc::now();
        self.inner
            .modify(|runs| {
                let Some(existing) = runs.get(&run.id) else {
                    return Err(Error::RunNotFound(run.id.to_string()));
                };
                if existing.is_terminal() {
                    return Err(Error::RunFinished(run.id.to_string()));
                }
                runs.insert(run.id, run.clone());
                Ok(())
            })
            .await?;
        Ok(run)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::run::RunStatus;
    use serde_json::json;
    use tempfile::TempDir;

    async fn create_test_store() -> (FileRunStore, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let store = FileRunStore::new(temp_dir.path().join("runs.json"))
            .await
            .unwrap();
        (store, temp_dir)
    }

    #[tokio::test]
    async fn test_status_transitions_are_persisted() {
        let (store, _temp) = create_test_store().await;

        let mut run = store
            .create(Run::for_agent(Uuid::new_v4(), json!({"input_text": "hi"})))
            .await
            .unwrap();
        assert_eq!(run.status, RunStatus::Pending);

        run.mark_started().unwrap();
        let mut run = store.update(run).await.unwrap();
        assert_eq!(store.get(run.id).await.unwrap().unwrap().status, RunStatus::Running);

        run.mark_completed(json!({"output": "done"})).unwrap();
        let run = store.update(run).await.unwrap();
        let stored = store.get(run.id).await.unwrap().unwrap();
        assert_eq!(stored.status, RunStatus::Completed);
        assert_eq!(stored.output_payload, Some(json!({"output": "done"})));
    }

    #[tokio::test]
    async fn test_terminal_run_rejects_updates() {
        let (store, _temp) = create_test_store().await;

        let mut run = store.create(Run::for_crew(None, json!({}))).await.unwrap();
        run.mark_started().unwrap();
        let mut run = store.update(run).await.unwrap();
        run.mark_failed("boom").unwrap();
        let finished = store.update(run).await.unwrap();

        let mut reopened = finished.clone();
        reopened.status = RunStatus::Running;
        reopened.error = None;
        match store.update(reopened).await {
            Err(Error::RunFinished(id)) => assert_eq!(id, finished.id.to_string()),
            other => panic!("Expected RunFinished, got: {:?}", other),
        }

        let stored = store.get(finished.id).await.unwrap().unwrap();
        assert_eq!(stored.status, RunStatus::Failed);
        assert_eq!(stored.error.as_deref(), Some("boom"));
    }

    #[tokio::test]
    async fn test_failed_final_write_keeps_run_retryable() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("runs.json");
        let store = FileRunStore::new(&path).await.unwrap();

        let mut run = store.create(Run::for_crew(None, json!({}))).await.unwrap();
        run.mark_started().unwrap();
        let mut run = store.update(run).await.unwrap();
        run.mark_completed(json!({"output": "done"})).unwrap();

        // Swap the file for a directory so the terminal write fails.
        std::fs::remove_file(&path).unwrap();
        std::fs::create_dir(&path).unwrap();
        assert!(matches!(store.update(run.clone()).await, Err(Error::Io(_))));
        assert_eq!(
            store.get(run.id).await.unwrap().unwrap().status,
            RunStatus::Running
        );

        std::fs::remove_dir(&path).unwrap();
        let finished = store.update(run).await.unwrap();
        assert_eq!(finished.status, RunStatus::Completed);

        let reopened = FileRunStore::new(&path).await.unwrap();
        assert_eq!(
            reopened.get(finished.id).await.unwrap().unwrap().status,
            RunStatus::Completed
        );
    }

    #[tokio::test]
    async fn test_update_unknown_run() {
        let (store, _temp) = create_test_store().await;
        let result = store.update(Run::for_crew(None, json!({}))).await;
        assert!(matches!(result, Err(Error::RunNotFound(_))));
    }

    #[tokio::test]
    async fn test_list_newest_first_and_reload() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("runs.json");

        {
            let store = FileRunStore::new(&path).await.unwrap();
            let mut older = Run::for_crew(Some("older".to_string()), json!({}));
            older.created_at = Utc::now() - chrono::Duration::seconds(30);
            store.create(older).await.unwrap();
            store
                .create(Run::for_crew(Some("newer".to_string()), json!({})))
                .await
                .unwrap();
        }

        let store = FileRunStore::new(&path).await.unwrap();
        let runs = store.list().await.unwrap();
        assert_eq!(runs.len(), 2);
        assert_eq!(runs[0].crew_name.as_deref(), Some("newer"));
        assert_eq!(runs[1].crew_name.as_deref(), Some("older"));
    }
}
