use axum::{extract::State, response::Response};
use std::sync::Arc;

use crate::flash::Flash;
use crate::render::Page;
use crate::{AppError, AppState};

/// GET /
pub async fn index(
    State(state): State<Arc<AppState>>,
    flash: Flash,
) -> Result<Response, AppError> {
    state.render(Page::new("pages/home.html"), flash)
}
