//! HTTP API over the same three agents the CLI drives.

use std::sync::Arc;

use anyhow::Result;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use resumeguide_agent::tools::career;
use serde::{Deserialize, Serialize};
use tower_http::cors::{Any, CorsLayer};
use tracing::info;

use crate::app::{agent_key, App, TranscriptEntry};

#[derive(Deserialize)]
struct ChatRequest {
    agent: String,
    message: String,
}

#[derive(Serialize)]
struct ChatReply {
    agent: String,
    reply: String,
}

#[derive(Serialize)]
struct AgentInfo {
    key: String,
    name: String,
    model: String,
}

#[derive(Serialize)]
struct AgentsResponse {
    agents: Vec<AgentInfo>,
}

#[derive(Deserialize)]
struct SkillCheckRequest {
    skill: String,
}

#[derive(Serialize)]
struct SkillCheckResponse {
    skill: String,
    result: String,
}

#[derive(Deserialize)]
struct TrendsRequest {
    branch: String,
}

#[derive(Serialize)]
struct TrendsResponse {
    branch: String,
    result: String,
}

#[derive(Deserialize)]
struct ClearRequest {
    agent: String,
}

#[derive(Serialize)]
struct ClearResponse {
    status: String,
}

#[derive(Serialize)]
struct TranscriptResponse {
    agent: String,
    messages: Vec<TranscriptEntry>,
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

fn unknown_agent(name: &str) -> axum::response::Response {
    (
        StatusCode::NOT_FOUND,
        Json(ErrorResponse {
            error: format!("unknown agent: {}", name),
        }),
    )
        .into_response()
}

async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}

async fn list_agents(State(app): State<Arc<App>>) -> impl IntoResponse {
    let agents = app
        .agents()
        .iter()
        .map(|(key, adapter)| AgentInfo {
            key: key.to_string(),
            name: adapter.name().to_string(),
            model: adapter.model().to_string(),
        })
        .collect();
    Json(AgentsResponse { agents })
}

async fn chat(State(app): State<Arc<App>>, Json(req): Json<ChatRequest>) -> impl IntoResponse {
    let Some(key) = agent_key(&req.agent) else {
        return unknown_agent(&req.agent);
    };

    match app.chat(key, &req.message).await {
        Ok(reply) => Json(ChatReply {
            agent: app.agent_name(key),
            reply,
        })
        .into_response(),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorResponse {
                error: e.to_string(),
            }),
        )
            .into_response(),
    }
}

async fn get_profile(State(app): State<Arc<App>>) -> impl IntoResponse {
    Json(app.profile_snapshot())
}

async fn get_transcript(
    State(app): State<Arc<App>>,
    Path(agent): Path<String>,
) -> impl IntoResponse {
    let Some(key) = agent_key(&agent) else {
        return unknown_agent(&agent);
    };

    Json(TranscriptResponse {
        agent: key.to_string(),
        messages: app.transcript(key),
    })
    .into_response()
}

async fn check_skill(Json(req): Json<SkillCheckRequest>) -> impl IntoResponse {
    let result = career::check_skill_demand(&req.skill);
    Json(SkillCheckResponse {
        skill: req.skill,
        result,
    })
}

async fn trends(Json(req): Json<TrendsRequest>) -> impl IntoResponse {
    let result = career::get_industry_trends(&req.branch);
    Json(TrendsResponse {
        branch: req.branch,
        result,
    })
}

async fn clear_agent(
    State(app): State<Arc<App>>,
    Json(req): Json<ClearRequest>,
) -> impl IntoResponse {
    match agent_key(&req.agent).and_then(|key| app.clear_agent(key)) {
        Some(status) => Json(ClearResponse { status }).into_response(),
        None => unknown_agent(&req.agent),
    }
}

async fn reset(State(app): State<Arc<App>>) -> impl IntoResponse {
    app.reset();
    Json(serde_json::json!({ "status": "reset" }))
}

fn router(app: Arc<App>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health))
        .route("/agents", get(list_agents))
        .route("/chat", post(chat))
        .route("/profile", get(get_profile))
        .route("/transcript/{agent}", get(get_transcript))
        .route("/skills/check", post(check_skill))
        .route("/trends", post(trends))
        .route("/clear", post(clear_agent))
        .route("/reset", post(reset))
        .layer(cors)
        .with_state(app)
}

/// Bind the API server and run it until interrupted.
pub async fn serve_command(host: String, port: u16) -> Result<()> {
    let app = Arc::new(App::new()?);
    let router = router(app);

    let addr = format!("{}:{}", host, port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("listening on {}", addr);

    println!("🌐 ResumeGuide API on http://{}", addr);
    println!("\nEndpoints:");
    println!("  GET  /health              - Liveness check");
    println!("  GET  /agents              - List the three agents");
    println!("  POST /chat                - {{agent, message}} -> reply");
    println!("  GET  /profile             - Saved student profile");
    println!("  GET  /transcript/{{agent}}  - Conversation history");
    println!("  POST /skills/check        - {{skill}} -> demand report");
    println!("  POST /trends              - {{branch}} -> industry trends");
    println!("  POST /clear               - {{agent}} -> wipe its memory");
    println!("  POST /reset               - Wipe everything");
    println!("\nPress Ctrl+C to stop");

    axum::serve(listener, router).await?;
    Ok(())
}
