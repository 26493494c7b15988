use std::sync::Arc;

use axum::{extract::State, http::StatusCode, routing::get, Json, Router};
use chrono::Utc;
use glidedesk_agent::SupportRuntime;
use glidedesk_core::CapabilityName;
use serde::Serialize;
use tracing::{error, info};

#[derive(Clone)]
pub struct HealthState {
    runtime: Arc<SupportRuntime>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct HealthCheck {
    pub status: &'static str,
    pub detail: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: HealthCheck,
    pub registry: HealthCheck,
    pub checked_at: String,
}

pub fn router(runtime: Arc<SupportRuntime>) -> Router {
    Router::new().route("/health", get(health)).with_state(HealthState { runtime })
}

pub async fn spawn(
    bind_address: &str,
    port: u16,
    runtime: Arc<SupportRuntime>,
) -> std::io::Result<()> {
    let address = format!("{bind_address}:{port}");
    let listener = tokio::net::TcpListener::bind(&address).await?;

    info!(
        event_name = "system.health.start",
        correlation_id = "bootstrap",
        bind_address = %address,
        "health endpoint started"
    );

    tokio::spawn(async move {
        if let Err(error) = axum::serve(listener, router(runtime)).await {
            error!(
                event_name = "system.health.error",
                correlation_id = "bootstrap",
                error = %error,
                "health endpoint server terminated unexpectedly"
            );
        }
    });

    Ok(())
}

pub async fn health(State(state): State<HealthState>) -> (StatusCode, Json<HealthResponse>) {
    let registry = registry_check(&state.runtime);
    let ready = registry.status == "ready";

    let payload = HealthResponse {
        status: if ready { "ready" } else { "degraded" },
        service: HealthCheck {
            status: "ready",
            detail: "glidedesk-server runtime initialized".to_string(),
        },
        registry,
        checked_at: Utc::now().to_rfc3339(),
    };

    let status_code = if ready { StatusCode::OK } else { StatusCode::SERVICE_UNAVAILABLE };
    (status_code, Json(payload))
}

fn registry_check(runtime: &SupportRuntime) -> HealthCheck {
    let registered = runtime.orchestrator.capabilities();
    let missing = CapabilityName::ALL
        .iter()
        .copied()
        .filter(|capability| !registered.contains(capability))
        .map(|capability| capability.as_str())
        .collect::<Vec<_>>();

    if missing.is_empty() {
        HealthCheck {
            status: "ready",
            detail: format!(
                "{} capabilities and {} tools registered",
                registered.len(),
                runtime.tools.len()
            ),
        }
    } else {
        HealthCheck {
            status: "degraded",
            detail: format!("missing capabilities: {}", missing.join(", ")),
        }
    }
}
