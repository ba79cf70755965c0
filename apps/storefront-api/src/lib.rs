//! # Storefront API
//!
//! REST server behind the storefront SPA.
//!
//! ## Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Storefront API Routes                           │
//! │                                                                         │
//! │  ┌────────────────┐  ┌────────────────┐  ┌────────────────────────────┐│
//! │  │  auth          │  │  products      │  │  orders / reviews          ││
//! │  │                │  │                │  │                            ││
//! │  │ • register     │  │ • list         │  │ • place order              ││
//! │  │ • login        │  │ • search       │  │ • my orders                ││
//! │  │ • profile      │  │ • by category  │  │ • add review               ││
//! │  └────────────────┘  └────────────────┘  └────────────────────────────┘│
//! │                                                                         │
//! │  ┌────────────────┐  ┌────────────────┐  ┌────────────────────────────┐│
//! │  │  wishlist      │  │  admin         │  │  health                    ││
//! │  │                │  │                │  │                            ││
//! │  │ • list/add/del │  │ • stats        │  │ • liveness + db check      ││
//! │  │                │  │ • users/orders │  │                            ││
//! │  │                │  │ • catalog      │  │                            ││
//! │  └────────────────┘  └────────────────┘  └────────────────────────────┘│
//! │                                                                         │
//! │  ┌──────────────────────────────────────────────────────────────────┐  │
//! │  │  Infrastructure: SQLite (storefront-db) · JWT · argon2           │  │
//! │  └──────────────────────────────────────────────────────────────────┘  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration
//! Environment variables:
//! - `PORT` - HTTP port (default: 5001)
//! - `BIND_ADDR` - Interface to bind (default: 0.0.0.0)
//! - `DATABASE_PATH` - SQLite file (default: storefront.db)
//! - `DB_MAX_CONNECTIONS` - Pool size (default: 5)
//! - `JWT_SECRET` - Secret for JWT signing
//! - `JWT_EXPIRY_SECS` - Token lifetime (default: 86400)

pub mod auth;
pub mod config;
pub mod dto;
pub mod error;
pub mod response;
pub mod routes;

use std::sync::Arc;

use axum::http::Method;
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

// Re-exports
pub use auth::JwtManager;
pub use config::ApiConfig;
pub use error::{ApiError, ApiResult};
use storefront_db::Database;

/// Shared application state.
pub struct AppState {
    pub db: Database,
    pub jwt: JwtManager,
    pub config: ApiConfig,
}

impl AppState {
    pub fn new(db: Database, config: ApiConfig) -> Self {
        let jwt = JwtManager::new(config.jwt_secret.clone(), config.jwt_expiry_secs);
        AppState { db, jwt, config }
    }
}

/// Builds the full HTTP application.
pub fn build_router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers(Any);

    routes::router()
        .fallback(routes::not_found)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
