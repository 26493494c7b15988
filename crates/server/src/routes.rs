//! Conversational endpoints for logistics customer support.
//!
//! - `POST /chat`              — classify + dispatch, JSON response
//! - `POST /chat/stream`       — same, relayed as server-sent events
//! - `POST /upload_id`         — store an ID image, then dispatch id_validation
//! - `POST /api/tools/{name}`  — direct tool invocation (uniform envelope)
//!
//! The resolved session id is echoed in the `x-session-id` response header
//! so the documented response body stays exactly the dispatch contract.

use std::convert::Infallible;
use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::{Path, Query, State};
use axum::http::{HeaderName, StatusCode};
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Json, Router};
use glidedesk_agent::session::resolve_session;
use glidedesk_agent::storage::BlobStore;
use glidedesk_agent::tools::{error_envelope, success_envelope};
use glidedesk_agent::SupportRuntime;
use glidedesk_core::{SupportRequest, ToolError};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio_stream::wrappers::UnboundedReceiverStream;
use tokio_stream::StreamExt;
use tracing::info;
use uuid::Uuid;

use crate::stream::{sse_event, ChannelEventSink};

fn session_header() -> HeaderName {
    HeaderName::from_static("x-session-id")
}

#[derive(Clone)]
pub struct ApiState {
    runtime: Arc<SupportRuntime>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct ChatRequest {
    pub user_id: String,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub intent: Option<String>,
    #[serde(default)]
    pub attachment_ref: Option<String>,
    #[serde(default)]
    pub session_id: Option<String>,
}

impl ChatRequest {
    fn support_request(&self) -> SupportRequest {
        SupportRequest {
            user_id: self.user_id.clone(),
            text: self.text.clone(),
            intent: self.intent.clone(),
            attachment_ref: self.attachment_ref.clone(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
    pub correlation_id: String,
}

pub fn router(runtime: Arc<SupportRuntime>) -> Router {
    Router::new()
        .route("/chat", post(chat))
        .route("/chat/stream", post(chat_stream))
        .route("/upload_id", post(upload_id))
        .route("/api/tools/{name}", post(invoke_tool))
        .with_state(ApiState { runtime })
}

fn bad_request(message: impl Into<String>, correlation_id: String) -> Response {
    (
        StatusCode::BAD_REQUEST,
        Json(ErrorBody { error: message.into(), correlation_id }),
    )
        .into_response()
}

async fn chat(State(state): State<ApiState>, Json(payload): Json<ChatRequest>) -> Response {
    let correlation_id = Uuid::new_v4().to_string();
    let request = payload.support_request();
    if let Err(error) = request.validate() {
        return bad_request(error.to_string(), correlation_id);
    }

    let session = match resolve_session(
        state.runtime.sessions.as_ref(),
        &state.runtime.app_name,
        &request.user_id,
        payload.session_id.as_deref(),
    )
    .await
    {
        Ok(session) => session,
        Err(error) => {
            let interface = error.into_interface(correlation_id.clone());
            return (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(ErrorBody {
                    error: interface.user_message().to_string(),
                    correlation_id,
                }),
            )
                .into_response();
        }
    };

    info!(
        event_name = "transport.chat",
        correlation_id = %correlation_id,
        user_id = %request.user_id,
        session_id = %session.session_id,
        "handling chat request"
    );
    let response = state.runtime.orchestrator.dispatch(&request).await;
    ([(session_header(), session.session_id)], Json(response)).into_response()
}

async fn chat_stream(
    State(state): State<ApiState>,
    Json(payload): Json<ChatRequest>,
) -> Response {
    let correlation_id = Uuid::new_v4().to_string();
    let request = payload.support_request();
    if let Err(error) = request.validate() {
        return bad_request(error.to_string(), correlation_id);
    }

    let (sink, receiver) = ChannelEventSink::channel();
    let runtime = state.runtime.clone();
    tokio::spawn(async move {
        runtime.orchestrator.dispatch_streamed(&request, &sink).await;
    });

    let events = UnboundedReceiverStream::new(receiver)
        .map(|event| Ok::<Event, Infallible>(sse_event(&event)));
    Sse::new(events).keep_alive(KeepAlive::default()).into_response()
}

#[derive(Debug, Deserialize)]
pub struct UploadQuery {
    pub user_id: String,
    #[serde(default)]
    pub filename: Option<String>,
    #[serde(default)]
    pub session_id: Option<String>,
}

async fn upload_id(
    State(state): State<ApiState>,
    Query(query): Query<UploadQuery>,
    body: Bytes,
) -> Response {
    let correlation_id = Uuid::new_v4().to_string();
    if query.user_id.trim().is_empty() {
        return bad_request("user_id must be present and non-empty", correlation_id);
    }

    let attachment_ref =
        match state.runtime.blobs.put(body.to_vec(), query.filename.as_deref()).await {
            Ok(attachment_ref) => attachment_ref,
            Err(error) => return tool_error_response(error),
        };

    info!(
        event_name = "transport.upload_id",
        correlation_id = %correlation_id,
        user_id = %query.user_id,
        attachment_ref = %attachment_ref,
        "stored identity document upload"
    );

    let request = SupportRequest {
        user_id: query.user_id,
        text: None,
        intent: Some("id_validation".to_string()),
        attachment_ref: Some(attachment_ref),
    };
    let response = state.runtime.orchestrator.dispatch(&request).await;
    Json(response).into_response()
}

async fn invoke_tool(
    State(state): State<ApiState>,
    Path(name): Path<String>,
    Json(args): Json<Value>,
) -> Response {
    match state.runtime.tools.invoke(&name, args).await {
        Ok(fields) => (StatusCode::OK, Json(success_envelope(fields))).into_response(),
        Err(error) => tool_error_response(error),
    }
}

fn tool_error_response(error: ToolError) -> Response {
    let status = match error.kind() {
        "invalid_argument" => StatusCode::BAD_REQUEST,
        "not_found" => StatusCode::NOT_FOUND,
        "extraction_failed" => StatusCode::UNPROCESSABLE_ENTITY,
        _ => StatusCode::SERVICE_UNAVAILABLE,
    };
    (status, Json(error_envelope(&error))).into_response()
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use glidedesk_agent::{build_runtime, RuntimeDeps};
    use glidedesk_core::config::AppConfig;
    use serde_json::{json, Value};
    use tower::util::ServiceExt;

    use super::router;

    fn test_router() -> axum::Router {
        let config = AppConfig::default();
        let runtime =
            build_runtime(&config, RuntimeDeps::in_memory(&config)).expect("runtime builds");
        router(Arc::new(runtime))
    }

    fn json_request(uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .expect("request")
    }

    async fn body_json(response: axum::response::Response) -> Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body");
        serde_json::from_slice(&bytes).expect("json body")
    }

    #[tokio::test]
    async fn chat_routes_booking_utterances() {
        let response = test_router()
            .oneshot(json_request(
                "/chat",
                json!({"user_id": "u1", "text": "I want to book a shipment"}),
            ))
            .await
            .expect("response");

        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().contains_key("x-session-id"));
        let payload = body_json(response).await;
        assert_eq!(payload["agent"], "BookingAgent");
        assert_eq!(payload["text"], "Booking: Please provide booking details.");
    }

    #[tokio::test]
    async fn chat_reuses_a_supplied_session_id() {
        let response = test_router()
            .oneshot(json_request(
                "/chat",
                json!({"user_id": "u1", "text": "hello", "session_id": "s-42"}),
            ))
            .await
            .expect("response");

        let session_header =
            response.headers().get("x-session-id").expect("session header");
        assert_eq!(session_header, "s-42");
    }

    #[tokio::test]
    async fn chat_rejects_payload_free_requests() {
        let response = test_router()
            .oneshot(json_request("/chat", json!({"user_id": "u1"})))
            .await
            .expect("response");

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let payload = body_json(response).await;
        assert!(payload["error"].as_str().expect("message").contains("at least one"));
    }

    #[tokio::test]
    async fn chat_stream_responds_with_event_stream() {
        let response = test_router()
            .oneshot(json_request(
                "/chat/stream",
                json!({"user_id": "u1", "text": "track my package"}),
            ))
            .await
            .expect("response");

        assert_eq!(response.status(), StatusCode::OK);
        let content_type =
            response.headers().get("content-type").expect("content type");
        assert_eq!(content_type, "text/event-stream");
    }

    #[tokio::test]
    async fn upload_id_stores_and_dispatches() {
        let response = test_router()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/upload_id?user_id=u1&filename=card.jpg")
                    .body(Body::from(vec![0xFF, 0xD8, 0xFF]))
                    .expect("request"),
            )
            .await
            .expect("response");

        assert_eq!(response.status(), StatusCode::OK);
        let payload = body_json(response).await;
        assert_eq!(payload["agent"], "IDValidationAgent");
        assert_eq!(payload["next_action"], "await_confirmation");
        assert_eq!(payload["data"]["extracted_pan"]["pan_number"], "ABCDE1234F");
    }

    #[tokio::test]
    async fn upload_id_rejects_empty_bodies() {
        let response = test_router()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/upload_id?user_id=u1")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("response");

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let payload = body_json(response).await;
        assert_eq!(payload["status"], "error");
        assert_eq!(payload["error"]["kind"], "invalid_argument");
    }

    #[tokio::test]
    async fn tool_route_maps_error_kinds_to_status_codes() {
        let hit = test_router()
            .oneshot(json_request(
                "/api/tools/track_shipment",
                json!({"tracking_number": "123456789"}),
            ))
            .await
            .expect("response");
        assert_eq!(hit.status(), StatusCode::OK);
        let payload = body_json(hit).await;
        assert_eq!(payload["status"], "success");
        assert_eq!(payload["tracking"]["status"], "delivered");

        let miss = test_router()
            .oneshot(json_request(
                "/api/tools/track_shipment",
                json!({"tracking_number": "000000000"}),
            ))
            .await
            .expect("response");
        assert_eq!(miss.status(), StatusCode::NOT_FOUND);

        let unknown = test_router()
            .oneshot(json_request("/api/tools/no_such_tool", json!({})))
            .await
            .expect("response");
        assert_eq!(unknown.status(), StatusCode::BAD_REQUEST);
    }
}
