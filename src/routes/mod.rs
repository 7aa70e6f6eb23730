pub mod applications;
pub mod auth;
pub mod pets;
pub mod users;

use axum::Router;

use crate::state::AppState;

/// The full JSON API surface.
pub fn api_router() -> Router<AppState> {
    Router::new()
        .nest("/api/auth", auth::router())
        .nest("/api/pets", pets::router())
        .nest("/api/applications", applications::router())
        .nest("/api/users", users::router())
}
