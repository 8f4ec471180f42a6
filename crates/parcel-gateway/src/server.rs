use crate::config::{BotProfile, GatewayConfig};
use crate::error::{ApiError, ApiResult};
use axum::{
    extract::{rejection::JsonRejection, Query, State},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use parcel_dialogue::{DialogueEngine, SessionRegistry, DEFAULT_SESSION_ID};
use serde::{Deserialize, Serialize};
use std::any::Any;
use std::sync::Arc;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::{self, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{error, info};
use uuid::Uuid;

const HEALTH_OK: &str = "API is running and the oracle client is initialized";
const HEALTH_WARNING: &str = "API is running but oracle client initialization failed";

/// Shared application state.
pub struct AppState {
    pub engine: Arc<DialogueEngine>,
    pub sessions: Arc<SessionRegistry>,
    pub profile: BotProfile,
    pub max_message_length: usize,
}

impl AppState {
    pub fn new(engine: Arc<DialogueEngine>, profile: BotProfile, config: &GatewayConfig) -> Self {
        let sessions = Arc::new(SessionRegistry::with_limits(
            engine.system_prompt(),
            config.session_limits(),
        ));
        Self {
            engine,
            sessions,
            profile,
            max_message_length: config.max_message_length,
        }
    }

    fn oracle_available(&self) -> bool {
        self.engine.oracle().is_available()
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct SessionQuery {
    pub session_id: Option<Uuid>,
}

#[derive(Debug, Deserialize)]
pub struct SendMessageRequest {
    pub message: String,
    #[serde(default)]
    pub session_id: Option<Uuid>,
}

#[derive(Debug, Serialize)]
pub struct ChatbotData {
    pub greeting: String,
    pub name: String,
    pub capabilities: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct SendMessageResponse {
    pub response: String,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub message: &'static str,
}

/// The HTTP gateway.
pub struct GatewayServer;

impl GatewayServer {
    /// Build the router over `state`: the three API routes with permissive
    /// CORS, request tracing, and panic recovery.
    pub fn build(state: Arc<AppState>) -> Router {
        let api = Router::new()
            .route("/api/chatbot-data", get(chatbot_data_handler))
            .route("/api/send-message", post(send_message_handler))
            .route("/api/health", get(health_handler))
            .with_state(state);
        Self::with_layers(api)
    }

    fn with_layers(router: Router) -> Router {
        let cors_layer = CorsLayer::new()
            .allow_origin(cors::Any)
            .allow_methods(cors::Any)
            .allow_headers(cors::Any);

        router
            .layer(CatchPanicLayer::custom(panic_response))
            .layer(cors_layer)
            .layer(TraceLayer::new_for_http())
    }
}

async fn chatbot_data_handler(
    State(state): State<Arc<AppState>>,
    Query(query): Query<SessionQuery>,
) -> Json<ChatbotData> {
    let session_id = query.session_id.unwrap_or(DEFAULT_SESSION_ID);
    let session = state.sessions.get_or_create(session_id).await;
    let greeting = {
        let mut session = session.lock().await;
        state.engine.initial_greeting(&mut session)
    };
    info!(session_id = %session_id, "Session reset");

    Json(ChatbotData {
        greeting,
        name: state.profile.name.clone(),
        capabilities: state.profile.capabilities.clone(),
    })
}

async fn send_message_handler(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<SendMessageRequest>, JsonRejection>,
) -> ApiResult<Json<SendMessageResponse>> {
    let Json(request) = payload.map_err(|e| ApiError::unprocessable(e.body_text()))?;

    let length = request.message.chars().count();
    if length > state.max_message_length {
        return Err(ApiError::payload_too_large(format!(
            "Message is {length} characters, the limit is {}",
            state.max_message_length
        )));
    }

    let session_id = request.session_id.unwrap_or(DEFAULT_SESSION_ID);
    let session = state.sessions.get_or_create(session_id).await;
    let mut session = session.lock().await;
    let response = state.engine.process_input(&mut session, &request.message).await;
    info!(session_id = %session_id, state = %session.state, "Message processed");

    Ok(Json(SendMessageResponse { response }))
}

async fn health_handler(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let body = if state.oracle_available() {
        HealthResponse {
            status: "ok",
            message: HEALTH_OK,
        }
    } else {
        HealthResponse {
            status: "warning",
            message: HEALTH_WARNING,
        }
    };
    Json(body)
}

fn panic_response(panic: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = panic.downcast_ref::<String>() {
        s.as_str()
    } else if let Some(s) = panic.downcast_ref::<&str>() {
        s
    } else {
        "unknown panic payload"
    };
    error!(panic = %detail, "Request handler panicked");
    ApiError::internal("Internal server error").into_response()
}
