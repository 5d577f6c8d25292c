//! Single-display status messages carried across a redirect.
//!
//! A mutation queues messages and redirects; the messages ride in the
//! `flash` cookie (base64url JSON array) until the next rendered page
//! shows them and expires the cookie.

use axum::{
    extract::FromRequestParts,
    http::{header, request::Parts, HeaderMap, HeaderValue},
    response::{AppendHeaders, IntoResponse, Redirect, Response},
};
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use std::convert::Infallible;

pub const COOKIE_NAME: &str = "flash";

/// Oldest messages are dropped beyond this to keep the cookie small.
const MAX_MESSAGES: usize = 10;

/// Longer messages are cut to this many characters.
const MAX_MESSAGE_CHARS: usize = 300;

/// Encoded cookie value budget, well under the ~4 KB browsers keep.
const MAX_COOKIE_VALUE_BYTES: usize = 3072;

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Flash {
    messages: Vec<String>,
}

impl Flash {
    /// Pending messages from the request's `Cookie` headers.
    pub fn from_headers(headers: &HeaderMap) -> Self {
        let messages = headers
            .get_all(header::COOKIE)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .flat_map(|v| v.split(';'))
            .filter_map(|pair| pair.trim().split_once('='))
            .find(|(name, _)| *name == COOKIE_NAME)
            .map(|(_, value)| decode(value))
            .unwrap_or_default();
        Self { messages }
    }

    pub fn messages(&self) -> &[String] {
        &self.messages
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Queue a message, cutting it to `MAX_MESSAGE_CHARS` and dropping the
    /// oldest ones until the encoded cookie fits its byte budget.
    pub fn push(&mut self, message: impl Into<String>) {
        let mut message = message.into();
        if let Some((cut, _)) = message.char_indices().nth(MAX_MESSAGE_CHARS) {
            message.truncate(cut);
        }
        self.messages.push(message);
        if self.messages.len() > MAX_MESSAGES {
            let excess = self.messages.len() - MAX_MESSAGES;
            self.messages.drain(..excess);
        }
        while self.messages.len() > 1 && encode(&self.messages).len() > MAX_COOKIE_VALUE_BYTES {
            self.messages.remove(0);
        }
    }

    /// Queue `message` and answer with a 303 redirect to `to`.
    pub fn redirect(mut self, to: &str, message: impl Into<String>) -> Response {
        self.push(message);
        let cookie = format!(
            "{COOKIE_NAME}={}; Path=/; HttpOnly; SameSite=Lax",
            encode(&self.messages)
        );
        (AppendHeaders([(header::SET_COOKIE, cookie)]), Redirect::to(to)).into_response()
    }

    /// `Set-Cookie` value that removes the flash cookie.
    pub fn expired_cookie() -> HeaderValue {
        HeaderValue::from_static("flash=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0")
    }
}

impl<S> FromRequestParts<S> for Flash
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self::from_headers(&parts.headers))
    }
}

fn encode(messages: &[String]) -> String {
    // Serializing a slice of strings cannot fail.
    let json = serde_json::to_vec(messages).unwrap_or_default();
    URL_SAFE_NO_PAD.encode(json)
}

fn decode(value: &str) -> Vec<String> {
    URL_SAFE_NO_PAD
        .decode(value)
        .ok()
        .and_then(|bytes| serde_json::from_slice(&bytes).ok())
        .unwrap_or_else(|| {
            tracing::debug!("ignoring malformed flash cookie");
            Vec::new()
        })
}
