pub mod cases;
pub mod health;
pub mod model;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /model/generate_images                           batch image generation (POST)
///
/// /cases                                           create (POST)
/// /cases/{id}                                      get
/// /cases/{id}/generate                             generate images (POST)
/// /cases/{id}/reprompt                             regenerate images (POST)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/model", model::router())
        .nest("/cases", cases::router())
}
