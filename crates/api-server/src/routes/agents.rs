//! Agent API endpoints
//!
//! CRUD over agent definitions.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crew_core::agent::{Agent, AgentPatch, AgentRepository};

use crate::state::AppState;

use super::{map_core_error, not_found, RouteError};

#[derive(Debug, Deserialize)]
pub struct CreateAgentRequest {
    pub name: String,
    pub role: String,
    pub goal: String,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub tools: Option<Vec<String>>,
    #[serde(default)]
    pub is_active: Option<bool>,
}

#[derive(Debug, Serialize)]
pub struct DeleteResponse {
    pub status: &'static str,
}

/// POST /api/v1/agents
async fn create_agent(
    State(state): State<AppState>,
    Json(req): Json<CreateAgentRequest>,
) -> Result<(StatusCode, Json<Agent>), RouteError> {
    let mut agent = Agent::new(req.name, req.role, req.goal);
    if let Some(model) = req.model {
        agent = agent.with_model(model);
    }
    if let Some(tools) = req.tools {
        agent = agent.with_tools(tools);
    }
    if let Some(is_active) = req.is_active {
        agent = agent.with_active(is_active);
    }

    let agent = state
        .agent_store()
        .create(agent)
        .await
        .map_err(map_core_error)?;
    info!("Created agent {} ({})", agent.name, agent.id);

    Ok((StatusCode::CREATED, Json(agent)))
}

/// GET /api/v1/agents
async fn list_agents(State(state): State<AppState>) -> Result<Json<Vec<Agent>>, RouteError> {
    let agents = state.agent_store().list().await.map_err(map_core_error)?;
    Ok(Json(agents))
}

/// GET /api/v1/agents/{id}
async fn get_agent(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Agent>, RouteError> {
    state
        .agent_store()
        .get(id)
        .await
        .map_err(map_core_error)?
        .map(Json)
        .ok_or_else(|| not_found(format!("Agent {} not found", id)))
}

/// PATCH /api/v1/agents/{id}
async fn update_agent(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(patch): Json<AgentPatch>,
) -> Result<Json<Agent>, RouteError> {
    let existing = state
        .agent_store()
        .get(id)
        .await
        .map_err(map_core_error)?
        .ok_or_else(|| not_found(format!("Agent {} not found", id)))?;

    let patched = existing.apply(patch).map_err(map_core_error)?;
    let agent = state
        .agent_store()
        .update(patched)
        .await
        .map_err(map_core_error)?;

    Ok(Json(agent))
}

/// DELETE /api/v1/agents/{id}
async fn delete_agent(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<DeleteResponse>, RouteError> {
    let deleted = state
        .agent_store()
        .delete(id)
        .await
        .map_err(map_core_error)?;

    if deleted {
        info!("Deleted agent {}", id);
        Ok(Json(DeleteResponse { status: "deleted" }))
    } else {
        Err(not_found(format!("Agent {} not found", id)))
    }
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/v1/agents", get(list_agents).post(create_agent))
        .route(
            "/api/v1/agents/{id}",
            get(get_agent).patch(update_agent).delete(delete_agent),
        )
}

#[cfg(test)]
mod tests {
    use super::*;

    use serde_json::json;
    use tower::ServiceExt;

    use crate::routes::testing::{build_state, empty_request, json_request, read_json};

    async fn seed(state: &AppState, name: &str) -> Agent {
        state
            .agent_store()
            .create(Agent::new(name, "Researcher", "Find filings"))
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn create_agent_applies_defaults() {
        let (state, _temp_dir) = build_state().await;

        let response = router()
            .with_state(state.clone())
            .oneshot(json_request(
                "POST",
                "/api/v1/agents",
                json!({"name": "scout", "role": "Researcher", "goal": "Find filings"}),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::CREATED);
        let payload = read_json(response).await;
        assert_eq!(payload["name"], "scout");
        assert_eq!(payload["model"], "llama3-8b-8192");
        assert_eq!(payload["tools"], json!([]));
        assert_eq!(payload["is_active"], true);
        assert!(payload["created_at"].is_string());

        let id: Uuid = payload["id"].as_str().unwrap().parse().unwrap();
        assert!(state.agent_store().get(id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn create_agent_rejects_blank_fields() {
        let (state, _temp_dir) = build_state().await;

        let response = router()
            .with_state(state.clone())
            .oneshot(json_request(
                "POST",
                "/api/v1/agents",
                json!({"name": "scout", "role": "  ", "goal": "Find filings"}),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let payload = read_json(response).await;
        assert!(payload["error"].as_str().unwrap().contains("role"));
        assert!(state.agent_store().list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn list_agents_newest_first() {
        let (state, _temp_dir) = build_state().await;
        seed(&state, "first").await;
        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        seed(&state, "second").await;

        let response = router()
            .with_state(state)
            .oneshot(empty_request("GET", "/api/v1/agents"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let payload = read_json(response).await;
        assert_eq!(payload[0]["name"], "second");
        assert_eq!(payload[1]["name"], "first");
    }

    #[tokio::test]
    async fn patch_goal_leaves_other_fields_unchanged() {
        let (state, _temp_dir) = build_state().await;
        let agent = seed(&state, "scout").await;

        let response = router()
            .with_state(state)
            .oneshot(json_request(
                "PATCH",
                &format!("/api/v1/agents/{}", agent.id),
                json!({"goal": "new goal"}),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let updated: Agent = serde_json::from_value(read_json(response).await).unwrap();
        assert_eq!(updated.goal, "new goal");
        assert_eq!(updated.name, agent.name);
        assert_eq!(updated.role, agent.role);
        assert_eq!(updated.model, agent.model);
        assert_eq!(updated.tools, agent.tools);
        assert_eq!(updated.is_active, agent.is_active);
        assert_eq!(updated.created_at, agent.created_at);
        assert!(updated.updated_at >= agent.updated_at);
    }

    #[tokio::test]
    async fn patch_cannot_blank_required_field() {
        let (state, _temp_dir) = build_state().await;
        let agent = seed(&state, "scout").await;

        let response = router()
            .with_state(state.clone())
            .oneshot(json_request(
                "PATCH",
                &format!("/api/v1/agents/{}", agent.id),
                json!({"name": ""}),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let stored = state.agent_store().get(agent.id).await.unwrap().unwrap();
        assert_eq!(stored.name, "scout");
    }

    #[tokio::test]
    async fn patch_missing_agent_is_not_found() {
        let (state, _temp_dir) = build_state().await;

        let response = router()
            .with_state(state)
            .oneshot(json_request(
                "PATCH",
                &format!("/api/v1/agents/{}", Uuid::new_v4()),
                json!({"goal": "new goal"}),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn delete_then_get_is_not_found() {
        let (state, _temp_dir) = build_state().await;
        let agent = seed(&state, "scout").await;
        let app = router().with_state(state);
        let uri = format!("/api/v1/agents/{}", agent.id);

        let response = app
            .clone()
            .oneshot(empty_request("DELETE", &uri))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(read_json(response).await, json!({"status": "deleted"}));

        let response = app.clone().oneshot(empty_request("GET", &uri)).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let response = app.oneshot(empty_request("DELETE", &uri)).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let payload = read_json(response).await;
        assert_eq!(payload["error"], format!("Agent {} not found", agent.id));
    }
}
