use axum::{extract::State, response::Response};
use chrono::Utc;
use gigbook_db::entities::{artist, show, venue};
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, TransactionTrait};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use crate::flash::Flash;
use crate::forms::{FormFields, ShowForm, ShowFormDefaults};
use crate::render::Page;
use crate::views::ShowListing;
use crate::{AppError, AppState};

/// GET /shows
pub async fn list_shows(
    State(state): State<Arc<AppState>>,
    flash: Flash,
) -> Result<Response, AppError> {
    let shows = show::Entity::find()
        .order_by_asc(show::Column::StartTime)
        .all(&state.db)
        .await?;

    let artist_ids: HashSet<i32> = shows.iter().map(|s| s.artist_id).collect();
    let venue_ids: HashSet<i32> = shows.iter().map(|s| s.venue_id).collect();

    let artists: HashMap<i32, artist::Model> = if artist_ids.is_empty() {
        HashMap::new()
    } else {
        artist::Entity::find()
            .filter(artist::Column::Id.is_in(artist_ids))
            .all(&state.db)
            .await?
            .into_iter()
            .map(|a| (a.id, a))
            .collect()
    };
    let venues: HashMap<i32, venue::Model> = if venue_ids.is_empty() {
        HashMap::new()
    } else {
        venue::Entity::find()
            .filter(venue::Column::Id.is_in(venue_ids))
            .all(&state.db)
            .await?
            .into_iter()
            .map(|v| (v.id, v))
            .collect()
    };

    let listings: Vec<ShowListing> = shows
        .iter()
        .filter_map(|s| match (artists.get(&s.artist_id), venues.get(&s.venue_id)) {
            (Some(a), Some(v)) => Some(ShowListing::new(s, a, v)),
            _ => {
                tracing::warn!(show_id = s.id, "show references a missing artist or venue");
                None
            }
        })
        .collect();

    state.render(Page::new("pages/shows.html").with("shows", listings)?, flash)
}

/// GET /shows/create
pub async fn create_show_form(
    State(state): State<Arc<AppState>>,
    flash: Flash,
) -> Result<Response, AppError> {
    let page = Page::new("forms/new_show.html").with("form", ShowFormDefaults::at(Utc::now()))?;
    state.render(page, flash)
}

/// POST /shows/create
///
/// Unknown artist or venue ids fail on the foreign keys and land in the
/// error branch like any other failure.
pub async fn create_show(
    State(state): State<Arc<AppState>>,
    flash: Flash,
    fields: FormFields,
) -> Response {
    match insert_show(&state, &fields).await {
        Ok(created) => {
            tracing::info!(
                id = created.id,
                artist_id = created.artist_id,
                venue_id = created.venue_id,
                "show listed"
            );
            flash.redirect("/", "Show was successfully listed!")
        }
        Err(e) => {
            tracing::error!("failed to list show: {e}");
            flash.redirect("/", "An error occurred. Show could not be listed.")
        }
    }
}

async fn insert_show(state: &AppState, fields: &FormFields) -> Result<show::Model, AppError> {
    let model = ShowForm::from_fields(fields)?.into_new_model();
    let created = state
        .db
        .transaction::<_, show::Model, AppError>(|txn| {
            Box::pin(async move { Ok(model.insert(txn).await?) })
        })
        .await?;
    Ok(created)
}
