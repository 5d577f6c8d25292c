//! Template rendering seam.
//!
//! Handlers build a [`Page`] (template name plus a JSON context) and the
//! configured [`Renderer`] turns it into a response body. The bundled
//! [`JsonRenderer`] emits the context itself; an HTML engine plugs in by
//! implementing the trait.

use axum::http::StatusCode;
use serde::Serialize;
use serde_json::{Map, Value};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("context serialization error: {0}")]
    Context(#[from] serde_json::Error),

    #[error("template error in {template}: {message}")]
    Template { template: String, message: String },
}

pub trait Renderer: Send + Sync {
    /// Value of the `Content-Type` header for rendered pages.
    fn content_type(&self) -> &'static str;

    fn render(&self, template: &str, context: &Map<String, Value>) -> Result<String, RenderError>;
}

/// Renders `{ "template": <name>, ...context }` as JSON.
#[derive(Debug, Default, Clone, Copy)]
pub struct JsonRenderer;

impl Renderer for JsonRenderer {
    fn content_type(&self) -> &'static str {
        "application/json"
    }

    fn render(&self, template: &str, context: &Map<String, Value>) -> Result<String, RenderError> {
        let mut body = Map::with_capacity(context.len() + 1);
        body.insert("template".into(), Value::String(template.to_string()));
        for (key, value) in context {
            body.insert(key.clone(), value.clone());
        }
        Ok(serde_json::to_string(&Value::Object(body))?)
    }
}

/// A template plus the values it is rendered with.
#[derive(Debug, Clone)]
pub struct Page {
    pub template: &'static str,
    pub context: Map<String, Value>,
    pub status: StatusCode,
}

impl Page {
    pub fn new(template: &'static str) -> Self {
        Self {
            template,
            context: Map::new(),
            status: StatusCode::OK,
        }
    }

    /// Add `value` to the context under `key`.
    pub fn with(mut self, key: &str, value: impl Serialize) -> Result<Self, RenderError> {
        self.context.insert(key.to_string(), serde_json::to_value(value)?);
        Ok(self)
    }

    pub fn status(mut self, status: StatusCode) -> Self {
        self.status = status;
        self
    }
}
