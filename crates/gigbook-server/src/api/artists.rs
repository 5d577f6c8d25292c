use axum::{
    extract::{Path, State},
    response::Response,
};
use chrono::Utc;
use gigbook_db::entities::{artist, show, venue};
use sea_orm::{
    ActiveModelTrait, ConnectionTrait, EntityTrait, ModelTrait, QueryFilter, QueryOrder,
    TransactionTrait,
};
use serde::Serialize;
use std::sync::Arc;

use super::{name_contains, upcoming_counts};
use crate::flash::Flash;
use crate::forms::{ArtistForm, FormFields};
use crate::render::Page;
use crate::views::{ArtistDetail, ArtistShow, SearchResults, Summary};
use crate::{AppError, AppState};

#[derive(Debug, Serialize)]
struct EditArtist<'a> {
    id: i32,
    #[serde(flatten)]
    form: &'a ArtistForm,
}

/// GET /artists
pub async fn list_artists(
    State(state): State<Arc<AppState>>,
    flash: Flash,
) -> Result<Response, AppError> {
    let artists = artist::Entity::find()
        .order_by_asc(artist::Column::Name)
        .all(&state.db)
        .await?;
    let upcoming = upcoming_counts(&state.db, Utc::now(), show::Column::ArtistId, None).await?;

    let data: Vec<Summary> = artists
        .into_iter()
        .map(|a| Summary::new(a.id, a.name, &upcoming))
        .collect();
    state.render(Page::new("pages/artists.html").with("artists", data)?, flash)
}

/// POST /artists/search
pub async fn search_artists(
    State(state): State<Arc<AppState>>,
    flash: Flash,
    form: FormFields,
) -> Result<Response, AppError> {
    let search_term = form.get("search_term").unwrap_or_default().to_string();

    let artists = artist::Entity::find()
        .filter(name_contains(
            state.db.get_database_backend(),
            artist::Column::Name,
            &search_term,
        ))
        .order_by_asc(artist::Column::Name)
        .all(&state.db)
        .await?;
    let ids: Vec<i32> = artists.iter().map(|m| m.id).collect();
    let upcoming = upcoming_counts(
        &state.db,
        Utc::now(),
        show::Column::ArtistId,
        Some(ids.as_slice()),
    )
    .await?;

    let results: SearchResults<Summary> = artists
        .into_iter()
        .map(|a| Summary::new(a.id, a.name, &upcoming))
        .collect::<Vec<_>>()
        .into();

    tracing::debug!(term = %search_term, count = results.count, "artist search");

    let page = Page::new("pages/search_artists.html")
        .with("results", results)?
        .with("search_term", search_term)?;
    state.render(page, flash)
}

/// GET /artists/:id
pub async fn show_artist(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
    flash: Flash,
) -> Result<Response, AppError> {
    let artist_model = artist::Entity::find_by_id(id)
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::not_found(format!("artist {id}")))?;

    let shows = artist_model
        .find_related(show::Entity)
        .find_also_related(venue::Entity)
        .order_by_asc(show::Column::StartTime)
        .all(&state.db)
        .await?
        .into_iter()
        .filter_map(|(s, v)| v.map(|v| ArtistShow::new(&s, &v)))
        .collect();

    let detail = ArtistDetail::new(artist_model, shows, Utc::now());
    state.render(Page::new("pages/show_artist.html").with("artist", detail)?, flash)
}

/// GET /artists/create
pub async fn create_artist_form(
    State(state): State<Arc<AppState>>,
    flash: Flash,
) -> Result<Response, AppError> {
    let page = Page::new("forms/new_artist.html").with("form", ArtistForm::default())?;
    state.render(page, flash)
}

/// POST /artists/create
pub async fn create_artist(
    State(state): State<Arc<AppState>>,
    flash: Flash,
    fields: FormFields,
) -> Response {
    let form = ArtistForm::from_fields(&fields);
    let name = form.name.clone();

    match insert_artist(&state, form).await {
        Ok(created) => {
            tracing::info!(id = created.id, name = %created.name, "artist listed");
            flash.redirect("/", format!("Artist {name} was successfully listed!"))
        }
        Err(e) => {
            tracing::error!("failed to list artist {name:?}: {e}");
            flash.redirect(
                "/",
                format!("An error occurred. Artist {name} could not be listed."),
            )
        }
    }
}

async fn insert_artist(state: &AppState, form: ArtistForm) -> Result<artist::Model, AppError> {
    form.validate()?;
    let model = form.into_new_model();
    let created = state
        .db
        .transaction::<_, artist::Model, AppError>(|txn| {
            Box::pin(async move { Ok(model.insert(txn).await?) })
        })
        .await?;
    Ok(created)
}

/// GET /artists/:id/edit
pub async fn edit_artist_form(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
    flash: Flash,
) -> Result<Response, AppError> {
    let artist_model = artist::Entity::find_by_id(id)
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::not_found(format!("artist {id}")))?;

    let form = ArtistForm::from_model(&artist_model);
    let page = Page::new("forms/edit_artist.html")
        .with("form", &form)?
        .with("artist", EditArtist { id, form: &form })?;
    state.render(page, flash)
}

/// POST /artists/:id/edit
///
/// Every column is overwritten with what was submitted; an unticked
/// `seeking_venue` box therefore clears the flag.
pub async fn edit_artist(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
    flash: Flash,
    fields: FormFields,
) -> Response {
    let form = ArtistForm::from_fields(&fields);
    let name = form.name.clone();
    let target = format!("/artists/{id}");

    match update_artist(&state, id, form).await {
        Ok(_) => {
            tracing::info!(id, "artist updated");
            flash.redirect(&target, format!("Artist {name} was successfully updated!"))
        }
        Err(e) => {
            tracing::error!("failed to update artist {id}: {e}");
            flash.redirect(
                &target,
                format!("An error occurred. Artist {name} could not be updated."),
            )
        }
    }
}

async fn update_artist(
    state: &AppState,
    id: i32,
    form: ArtistForm,
) -> Result<artist::Model, AppError> {
    form.validate()?;
    let updated = state
        .db
        .transaction::<_, artist::Model, AppError>(|txn| {
            Box::pin(async move {
                let existing = artist::Entity::find_by_id(id)
                    .one(txn)
                    .await?
                    .ok_or_else(|| AppError::not_found(format!("artist {id}")))?;
                let mut model: artist::ActiveModel = existing.into();
                form.write_to(&mut model);
                Ok(model.update(txn).await?)
            })
        })
        .await?;
    Ok(updated)
}
