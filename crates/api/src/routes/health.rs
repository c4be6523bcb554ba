//! Health check endpoint handlers.

use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;

use crate::app::AppState;

#[derive(Debug, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub database: DatabaseHealth,
    pub channels: ChannelsHealth,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct DatabaseHealth {
    pub connected: bool,
    pub latency_ms: Option<u64>,
}

/// Which outbound reminder channels are switched on.
#[derive(Debug, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct ChannelsHealth {
    pub email: bool,
    pub sms: bool,
}

/// Simple status response for liveness/readiness probes.
#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub status: String,
}

/// Full health check with database latency and channel status.
pub async fn health_check(
    State(state): State<AppState>,
) -> Result<Json<HealthResponse>, StatusCode> {
    let start = std::time::Instant::now();
    let db_connected = sqlx::query("SELECT 1").execute(&state.pool).await.is_ok();
    let latency_ms = start.elapsed().as_millis() as u64;

    if !db_connected {
        return Err(StatusCode::SERVICE_UNAVAILABLE);
    }

    Ok(Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        database: DatabaseHealth {
            connected: true,
            latency_ms: Some(latency_ms),
        },
        channels: ChannelsHealth {
            email: state.config.email.enabled,
            sms: state.config.sms.enabled,
        },
    }))
}

/// Returns 200 OK if the process is running.
pub async fn live() -> Json<StatusResponse> {
    Json(StatusResponse {
        status: "alive".to_string(),
    })
}

/// Returns 200 OK once the database is reachable. Also samples pool gauges.
pub async fn ready(State(state): State<AppState>) -> Result<Json<StatusResponse>, StatusCode> {
    persistence::metrics::record_pool_metrics(&state.pool);
    let db_connected = sqlx::query("SELECT 1").execute(&state.pool).await.is_ok();

    if db_connected {
        Ok(Json(StatusResponse {
            status: "ready".to_string(),
        }))
    } else {
        Err(StatusCode::SERVICE_UNAVAILABLE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_health_response_serialization() {
        let response = HealthResponse {
            status: "healthy".to_string(),
            version: "0.3.0".to_string(),
            database: DatabaseHealth {
                connected: true,
                latency_ms: Some(5),
            },
            channels: ChannelsHealth {
                email: true,
                sms: false,
            },
        };
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["database"]["latency_ms"], 5);
        assert_eq!(json["channels"]["email"], true);
        assert_eq!(json["channels"]["sms"], false);
    }

    #[tokio::test]
    async fn test_live() {
        let Json(response) = live().await;
        assert_eq!(response.status, "alive");
    }
}
