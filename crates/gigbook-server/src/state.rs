use axum::{
    http::header,
    response::{IntoResponse, Response},
};
use sea_orm::DatabaseConnection;
use std::sync::Arc;

use crate::error::AppError;
use crate::flash::Flash;
use crate::render::{JsonRenderer, Page, Renderer};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
    pub renderer: Arc<dyn Renderer>,
}

impl AppState {
    pub fn new(db: DatabaseConnection) -> Self {
        Self::with_renderer(db, Arc::new(JsonRenderer))
    }

    pub fn with_renderer(db: DatabaseConnection, renderer: Arc<dyn Renderer>) -> Self {
        Self { db, renderer }
    }

    /// Render `page`, handing it any pending flash messages. Rendering
    /// consumes them, so the response also expires the flash cookie.
    pub fn render(&self, page: Page, flash: Flash) -> Result<Response, AppError> {
        let had_messages = !flash.is_empty();
        let page = page.with("messages", flash.messages())?;
        let body = self.renderer.render(page.template, &page.context)?;

        let mut response = (
            page.status,
            [(header::CONTENT_TYPE, self.renderer.content_type())],
            body,
        )
            .into_response();
        if had_messages {
            response
                .headers_mut()
                .append(header::SET_COOKIE, Flash::expired_cookie());
        }
        Ok(response)
    }
}
