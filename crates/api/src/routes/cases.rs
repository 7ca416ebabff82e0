//! Route definitions for imaging cases.
//!
//! Mounted at `/cases`.
//!
//! ```text
//! POST /                   create_case
//! GET  /{id}               get_case
//! POST /{id}/generate      generate_case_images
//! POST /{id}/reprompt      reprompt_case_images
//! ```

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::cases;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(cases::create_case))
        .route("/{id}", get(cases::get_case))
        .route("/{id}/generate", post(cases::generate_case_images))
        .route("/{id}/reprompt", post(cases::reprompt_case_images))
}
