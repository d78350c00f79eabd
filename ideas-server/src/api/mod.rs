pub mod auth;
pub mod error;
pub mod extract;
pub mod friends;
pub mod ideas;

pub use error::{ApiError, ApiResult};
pub use extract::FormOrJson;

use axum::{
    routing::{get, post},
    Router,
};

use crate::state::AppState;

/// Build the application router. Cross-cutting layers (CORS, tracing) are added by the caller.
pub fn router(state: AppState) -> Router {
    Router::new()
        // Health check
        .route("/", get(health_check))
        // Idea routes
        .route("/all-ideas", get(ideas::get_all_ideas))
        .route("/my-ideas/:id", get(ideas::get_user_ideas))
        .route("/post", post(ideas::create_idea))
        // Account routes
        .route("/register", post(auth::register))
        .route("/login", post(auth::login))
        // Friend request routes
        .route("/send-request", post(friends::send_request))
        .route("/accept-request", post(friends::accept_request))
        .route("/reject-request", post(friends::reject_request))
        .route("/friends/:user_id", get(friends::get_friends))
        .route("/pending-requests/:user_id", get(friends::get_pending_requests))
        .route("/received-requests/:user_id", get(friends::get_received_requests))
        .with_state(state)
}

async fn health_check() -> &'static str {
    "get success!"
}
