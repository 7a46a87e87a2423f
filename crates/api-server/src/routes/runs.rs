//! Run API endpoints
//!
//! Starting a run records it, executes it inline through the crew engine and
//! returns the finished record. Engine failures do not fail the request: they
//! are stored on the run, which comes back with status `failed`.

use std::future::Future;

use axum::{
    extract::{Path, State},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use tracing::{error, info};
use uuid::Uuid;

use crew_core::agent::AgentRepository;
use crew_core::run::{Run, RunRepository};
use crew_runner::{AgentDescriptor, RunMode};

use crate::state::AppState;

use super::{bad_request, map_core_error, not_found, RouteError};

#[derive(Debug, Deserialize)]
pub struct AgentRunRequest {
    pub agent_id: Uuid,
    pub input_text: String,
    #[serde(default)]
    pub context: Option<Value>,
    #[serde(default)]
    pub mode: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CrewRunRequest {
    pub agent_ids: Vec<Uuid>,
    pub objective: String,
    #[serde(default)]
    pub context: Option<Value>,
    #[serde(default)]
    pub crew_name: Option<String>,
    #[serde(default)]
    pub mode: Option<String>,
}

/// POST /api/v1/runs/agent
async fn run_agent(
    State(state): State<AppState>,
    Json(req): Json<AgentRunRequest>,
) -> Result<Json<Run>, RouteError> {
    if req.input_text.trim().is_empty() {
        return Err(bad_request("input_text cannot be empty"));
    }
    let mode = RunMode::parse(req.mode.as_deref()).map_err(|e| bad_request(e.to_string()))?;
    let context = parse_context(req.context)?;

    let agent = state
        .agent_store()
        .get(req.agent_id)
        .await
        .map_err(map_core_error)?
        .ok_or_else(|| not_found(format!("Agent {} not found", req.agent_id)))?;
    let descriptor = AgentDescriptor::from(&agent);

    let run = Run::for_agent(
        agent.id,
        json!({
            "input_text": &req.input_text,
            "context": &context,
            "mode": mode.as_str(),
        }),
    );
    let run = state.run_store().create(run).await.map_err(map_core_error)?;

    let run = execute_run(&state, run, async {
        state
            .engine()
            .run_single(&descriptor, &req.input_text, context.as_ref(), mode)
            .await
    })
    .await?;

    Ok(Json(run))
}

/// POST /api/v1/runs/crew
async fn run_crew(
    State(state): State<AppState>,
    Json(req): Json<CrewRunRequest>,
) -> Result<Json<Run>, RouteError> {
    if req.agent_ids.is_empty() {
        return Err(bad_request("agent_ids cannot be empty"));
    }
    if req.objective.trim().is_empty() {
        return Err(bad_request("objective cannot be empty"));
    }
    let mode = RunMode::parse(req.mode.as_deref()).map_err(|e| bad_request(e.to_string()))?;
    let context = parse_context(req.context)?;
    let crew_name = req
        .crew_name
        .map(|name| name.trim().to_string())
        .filter(|name| !name.is_empty());

    // Resolve every member before anything is recorded; order and repeats are kept.
    let mut descriptors = Vec::with_capacity(req.agent_ids.len());
    for id in &req.agent_ids {
        let agent = state
            .agent_store()
            .get(*id)
            .await
            .map_err(map_core_error)?
            .ok_or_else(|| not_found(format!("Agent {} not found", id)))?;
        descriptors.push(AgentDescriptor::from(&agent));
    }

    let run = Run::for_crew(
        crew_name.clone(),
        json!({
            "objective": &req.objective,
            "context": &context,
            "mode": mode.as_str(),
            "agent_ids": &req.agent_ids,
        }),
    );
    let run = state.run_store().create(run).await.map_err(map_core_error)?;

    let run = execute_run(&state, run, async {
        state
            .engine()
            .run_crew(
                &descriptors,
                &req.objective,
                context.as_ref(),
                crew_name.as_deref(),
                mode,
            )
            .await
    })
    .await?;

    Ok(Json(run))
}

/// GET /api/v1/runs
async fn list_runs(State(state): State<AppState>) -> Result<Json<Vec<Run>>, RouteError> {
    let runs = state.run_store().list().await.map_err(map_core_error)?;
    Ok(Json(runs))
}

/// GET /api/v1/runs/{id}
async fn get_run(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Run>, RouteError> {
    state
        .run_store()
        .get(id)
        .await
        .map_err(map_core_error)?
        .map(Json)
        .ok_or_else(|| not_found(format!("Run {} not found", id)))
}

/// Drive a pending run to a terminal status, persisting each step
async fn execute_run<T, F>(state: &AppState, mut run: Run, work: F) -> Result<Run, RouteError>
where
    T: Serialize,
    F: Future<Output = crew_runner::Result<T>>,
{
    run.mark_started().map_err(map_core_error)?;
    let mut run = state.run_store().update(run).await.map_err(map_core_error)?;
    info!("Run {} started", run.id);

    let outcome = work
        .await
        .map_err(|e| e.to_string())
        .and_then(|output| serde_json::to_value(output).map_err(|e| e.to_string()));

    match outcome {
        Ok(output) => {
            run.mark_completed(output).map_err(map_core_error)?;
            info!("Run {} completed", run.id);
        }
        Err(message) => {
            error!("Run {} failed: {}", run.id, message);
            run.mark_failed(message).map_err(map_core_error)?;
        }
    }

    state.run_store().update(run).await.map_err(map_core_error)
}

/// Absent and null contexts are the same; anything else must be an object
fn parse_context(context: Option<Value>) -> Result<Option<Map<String, Value>>, RouteError> {
    match context {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Object(map)) => Ok(Some(map)),
        Some(_) => Err(bad_request("context must be a JSON object")),
    }
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/v1/runs", get(list_runs))
        .route("/api/v1/runs/agent", post(run_agent))
        .route("/api/v1/runs/crew", post(run_crew))
        .route("/api/v1/runs/{id}", get(get_run))
}
