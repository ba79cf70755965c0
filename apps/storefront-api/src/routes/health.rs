//! Liveness endpoint.

use std::sync::Arc;

use axum::extract::State;
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::response::Envelope;
use crate::AppState;

#[derive(Debug, Serialize)]
pub struct HealthBody {
    pub status: &'static str,
    pub port: u16,
    pub database: &'static str,
    pub timestamp: DateTime<Utc>,
}

pub async fn health(State(state): State<Arc<AppState>>) -> Envelope<HealthBody> {
    let database = if state.db.health_check().await {
        "connected"
    } else {
        "unavailable"
    };

    Envelope::ok(HealthBody {
        status: "Server is running",
        port: state.config.port,
        database,
        timestamp: Utc::now(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::test_state;

    #[tokio::test]
    async fn test_health_reports_database() {
        let state = test_state().await;
        let body = health(State(state)).await;

        assert!(body.success);
        assert_eq!(body.data.status, "Server is running");
        assert_eq!(body.data.database, "connected");
    }
}
