//! JSON routes for the study pages.
//!
//! Every route that acts on behalf of a person extracts
//! [`AnonymousUser`](crate::identity::AnonymousUser), which issues an
//! anonymous identity on first contact. Leader-only routes go through the
//! capability check in [`access`](crate::access).

mod error;
mod handlers;

use axum::routing::{get, post};
use axum::Router;
use sea_orm::DatabaseConnection;
use tower_http::trace::TraceLayer;
use tower_sessions::{Expiry, SessionManagerLayer};

pub use error::ApiError;

use crate::config::{AppConfig, SessionConfig};
use crate::IdentityStore;

/// State shared by all handlers.
#[derive(Clone, Debug)]
pub struct AppState {
    pub db: DatabaseConnection,
    /// Base for invite links, without a trailing slash.
    pub public_url: String,
}

impl AppState {
    pub fn new(db: DatabaseConnection, config: &AppConfig) -> Self {
        Self {
            db,
            public_url: config.public_url.clone(),
        }
    }
}

/// Routes without the session layer.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::index))
        .route("/create", post(handlers::create_study))
        .route("/created/{study_id}", get(handlers::created))
        .route(
            "/join/{code}",
            get(handlers::join_preview).post(handlers::join),
        )
        .route("/s/{study_id}", get(handlers::dashboard))
        .route("/s/{study_id}/new", post(handlers::new_session))
        .route(
            "/s/{study_id}/session/{session_id}",
            get(handlers::session_detail).put(handlers::update_session),
        )
        .route(
            "/s/{study_id}/session/{session_id}/recap",
            get(handlers::recap_draft).post(handlers::post_recap),
        )
        .route(
            "/s/{study_id}/session/{session_id}/recap/view",
            get(handlers::recap_view),
        )
}

/// The complete application: routes, anonymous identity sessions and request tracing.
pub fn build_app(state: AppState, sessions: &SessionConfig) -> Router {
    let store = IdentityStore::new(state.db.clone());
    let session_layer = SessionManagerLayer::new(store)
        .with_name(sessions.cookie_name.clone())
        .with_secure(sessions.secure)
        .with_expiry(Expiry::OnInactivity(time::Duration::days(sessions.ttl_days)));

    routes()
        .with_state(state)
        .layer(session_layer)
        .layer(TraceLayer::new_for_http())
}
