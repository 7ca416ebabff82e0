//! Route definitions for model-backed generation.
//!
//! Mounted at `/model`.
//!
//! ```text
//! POST /generate_images    generate_images
//! ```

use axum::routing::post;
use axum::Router;

use crate::handlers::images;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/generate_images", post(images::generate_images))
}
