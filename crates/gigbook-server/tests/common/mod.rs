// Shared test utilities for integration tests
#![allow(dead_code)]

use axum::{
    body::Body,
    http::{header, HeaderMap, HeaderValue, Method, Request, StatusCode},
    response::Response,
};
use chrono::{DateTime, Utc};
use gigbook_db::entities::{artist, show, venue};
use gigbook_db::Genres;
use gigbook_migration::{Migrator, MigratorTrait};
use gigbook_server::flash::Flash;
use gigbook_server::AppState;
use sea_orm::{ActiveModelTrait, ConnectOptions, Database, NotSet, Set};
use std::sync::Arc;
use tower::ServiceExt;

/// A migrated in-memory SQLite database behind a fresh AppState.
pub async fn test_state() -> Arc<AppState> {
    let mut opt = ConnectOptions::new("sqlite::memory:");
    opt.max_connections(1)
        .min_connections(1)
        .sqlx_logging(false);
    let db = Database::connect(opt).await.unwrap();
    Migrator::up(&db, None).await.unwrap();
    Arc::new(AppState::new(db))
}

pub async fn send(state: &Arc<AppState>, request: Request<Body>) -> Response {
    gigbook_server::app(state.clone())
        .oneshot(request)
        .await
        .unwrap()
}

pub async fn get(state: &Arc<AppState>, uri: &str) -> Response {
    send(state, Request::get(uri).body(Body::empty()).unwrap()).await
}

pub async fn get_with_cookie(state: &Arc<AppState>, uri: &str, cookie: &str) -> Response {
    let request = Request::get(uri)
        .header(header::COOKIE, cookie)
        .body(Body::empty())
        .unwrap();
    send(state, request).await
}

pub async fn post_form(state: &Arc<AppState>, uri: &str, body: &str) -> Response {
    let request = Request::post(uri)
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(body.to_string()))
        .unwrap();
    send(state, request).await
}

pub async fn delete(state: &Arc<AppState>, uri: &str) -> Response {
    let request = Request::builder()
        .method(Method::DELETE)
        .uri(uri)
        .body(Body::empty())
        .unwrap();
    send(state, request).await
}

/// Decode a rendered page (JsonRenderer output).
pub async fn page_json(response: Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

/// `name=value` part of the flash `Set-Cookie` header.
pub fn flash_cookie(response: &Response) -> String {
    response
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .find(|v| v.starts_with("flash="))
        .and_then(|v| v.split(';').next())
        .unwrap()
        .to_string()
}

/// Messages queued by a redirecting response.
pub fn flash_messages(response: &Response) -> Vec<String> {
    let mut headers = HeaderMap::new();
    headers.insert(
        header::COOKIE,
        HeaderValue::from_str(&flash_cookie(response)).unwrap(),
    );
    Flash::from_headers(&headers).messages().to_vec()
}

/// Assert a 303 to `location` and return the flashed messages.
pub fn expect_redirect(response: &Response, location: &str) -> Vec<String> {
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(response.headers()[header::LOCATION], location);
    flash_messages(response)
}

pub async fn seed_venue(state: &AppState, name: &str, city: &str, st: &str) -> venue::Model {
    venue::ActiveModel {
        id: NotSet,
        name: Set(name.to_string()),
        city: Set(city.to_string()),
        state: Set(st.to_string()),
        address: Set("1015 Folsom Street".to_string()),
        phone: Set("123-123-1234".to_string()),
        image_link: Set(Some(format!("https://img.example.com/{}.jpg", name.len()))),
        facebook_link: Set(None),
        genres: Set(["Jazz", "Reggae"].into_iter().collect::<Genres>()),
        website: Set(None),
        seeking_talent: Set(true),
        seeking_description: Set(None),
    }
    .insert(&state.db)
    .await
    .unwrap()
}

pub async fn seed_artist(state: &AppState, name: &str) -> artist::Model {
    artist::ActiveModel {
        id: NotSet,
        name: Set(name.to_string()),
        city: Set("San Francisco".to_string()),
        state: Set("CA".to_string()),
        phone: Set(Some("326-123-5000".to_string())),
        genres: Set(["Rock n Roll"].into_iter().collect::<Genres>()),
        image_link: Set(Some("https://img.example.com/artist.jpg".to_string())),
        facebook_link: Set(Some("https://www.facebook.com/GunsNPetals".to_string())),
        website: Set(Some("https://www.gunsnpetalsband.com".to_string())),
        seeking_venue: Set(true),
        seeking_description: Set(Some("Looking for shows in the San Francisco Bay Area!".to_string())),
    }
    .insert(&state.db)
    .await
    .unwrap()
}

pub async fn seed_show(
    state: &AppState,
    artist_id: i32,
    venue_id: i32,
    start_time: DateTime<Utc>,
) -> show::Model {
    show::ActiveModel {
        id: NotSet,
        artist_id: Set(artist_id),
        venue_id: Set(venue_id),
        start_time: Set(start_time),
    }
    .insert(&state.db)
    .await
    .unwrap()
}
