use axum::{
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
};
use sea_orm::{DbErr, TransactionError};
use std::sync::Arc;
use thiserror::Error;

use crate::flash::Flash;
use crate::forms::FormError;
use crate::render::{Page, RenderError};
use crate::AppState;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("{0} not found")]
    NotFound(String),

    #[error("invalid form: {0}")]
    Form(#[from] FormError),

    #[error("database error: {0}")]
    Database(#[from] DbErr),

    #[error("render error: {0}")]
    Render(#[from] RenderError),
}

impl AppError {
    pub fn not_found(what: impl Into<String>) -> Self {
        Self::NotFound(what.into())
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Form(_) => StatusCode::BAD_REQUEST,
            Self::Database(_) | Self::Render(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<TransactionError<AppError>> for AppError {
    fn from(err: TransactionError<AppError>) -> Self {
        match err {
            TransactionError::Connection(e) => Self::Database(e),
            TransactionError::Transaction(e) => e,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!("request failed: {self}");
        } else {
            tracing::debug!("request rejected: {self}");
        }
        (status, self.to_string()).into_response()
    }
}

/// Fallback for routes that match nothing.
pub async fn not_found() -> AppError {
    AppError::not_found("page")
}

/// Middleware: replace 404 and 500 responses with the rendered error
/// pages.
pub async fn render_error_pages(
    State(state): State<Arc<AppState>>,
    request: Request,
    next: Next,
) -> Response {
    let flash = Flash::from_headers(request.headers());
    let response = next.run(request).await;

    let template = match response.status() {
        StatusCode::NOT_FOUND => "errors/404.html",
        StatusCode::INTERNAL_SERVER_ERROR => "errors/500.html",
        _ => return response,
    };

    let page = Page::new(template).status(response.status());
    match state.render(page, flash) {
        Ok(rendered) => rendered,
        Err(e) => {
            tracing::error!("failed to render {template}: {e}");
            response
        }
    }
}
