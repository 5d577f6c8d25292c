use axum::{
    extract::{Path, State},
    response::Response,
};
use chrono::Utc;
use gigbook_db::entities::{artist, show, venue};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, ModelTrait, QueryFilter,
    QueryOrder, TransactionTrait,
};
use serde::Serialize;
use std::sync::Arc;

use super::{name_contains, upcoming_counts};
use crate::flash::Flash;
use crate::forms::{FormFields, VenueForm};
use crate::render::Page;
use crate::views::{group_by_area, SearchResults, Summary, VenueDetail, VenueShow};
use crate::{AppError, AppState};

#[derive(Debug, Serialize)]
struct EditVenue<'a> {
    id: i32,
    #[serde(flatten)]
    form: &'a VenueForm,
}

/// GET /venues
pub async fn list_venues(
    State(state): State<Arc<AppState>>,
    flash: Flash,
) -> Result<Response, AppError> {
    let venues = venue::Entity::find().all(&state.db).await?;
    let upcoming = upcoming_counts(&state.db, Utc::now(), show::Column::VenueId, None).await?;

    let page = Page::new("pages/venues.html").with("areas", group_by_area(venues, &upcoming))?;
    state.render(page, flash)
}

/// POST /venues/search
pub async fn search_venues(
    State(state): State<Arc<AppState>>,
    flash: Flash,
    form: FormFields,
) -> Result<Response, AppError> {
    let search_term = form.get("search_term").unwrap_or_default().to_string();

    let venues = venue::Entity::find()
        .filter(name_contains(
            state.db.get_database_backend(),
            venue::Column::Name,
            &search_term,
        ))
        .order_by_asc(venue::Column::Name)
        .all(&state.db)
        .await?;
    let ids: Vec<i32> = venues.iter().map(|m| m.id).collect();
    let upcoming = upcoming_counts(
        &state.db,
        Utc::now(),
        show::Column::VenueId,
        Some(ids.as_slice()),
    )
    .await?;

    let results: SearchResults<Summary> = venues
        .into_iter()
        .map(|v| Summary::new(v.id, v.name, &upcoming))
        .collect::<Vec<_>>()
        .into();

    tracing::debug!(term = %search_term, count = results.count, "venue search");

    let page = Page::new("pages/search_venues.html")
        .with("results", results)?
        .with("search_term", search_term)?;
    state.render(page, flash)
}

/// GET /venues/:id
pub async fn show_venue(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
    flash: Flash,
) -> Result<Response, AppError> {
    let venue_model = venue::Entity::find_by_id(id)
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::not_found(format!("venue {id}")))?;

    let shows = venue_model
        .find_related(show::Entity)
        .find_also_related(artist::Entity)
        .order_by_asc(show::Column::StartTime)
        .all(&state.db)
        .await?
        .into_iter()
        .filter_map(|(s, a)| a.map(|a| VenueShow::new(&s, &a)))
        .collect();

    let detail = VenueDetail::new(venue_model, shows, Utc::now());
    state.render(Page::new("pages/show_venue.html").with("venue", detail)?, flash)
}

/// GET /venues/create
pub async fn create_venue_form(
    State(state): State<Arc<AppState>>,
    flash: Flash,
) -> Result<Response, AppError> {
    let page = Page::new("forms/new_venue.html").with("form", VenueForm::default())?;
    state.render(page, flash)
}

/// POST /venues/create
pub async fn create_venue(
    State(state): State<Arc<AppState>>,
    flash: Flash,
    fields: FormFields,
) -> Response {
    let form = VenueForm::from_fields(&fields);
    let name = form.name.clone();

    match insert_venue(&state, form).await {
        Ok(created) => {
            tracing::info!(id = created.id, name = %created.name, "venue listed");
            flash.redirect("/", format!("Venue {name} was successfully listed!"))
        }
        Err(e) => {
            tracing::error!("failed to list venue {name:?}: {e}");
            flash.redirect(
                "/",
                format!("An error occurred. Venue {name} could not be listed."),
            )
        }
    }
}

async fn insert_venue(state: &AppState, form: VenueForm) -> Result<venue::Model, AppError> {
    form.validate()?;
    let model = form.into_new_model();
    let created = state
        .db
        .transaction::<_, venue::Model, AppError>(|txn| {
            Box::pin(async move { Ok(model.insert(txn).await?) })
        })
        .await?;
    Ok(created)
}

/// GET /venues/:id/edit
pub async fn edit_venue_form(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
    flash: Flash,
) -> Result<Response, AppError> {
    let venue_model = venue::Entity::find_by_id(id)
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::not_found(format!("venue {id}")))?;

    let form = VenueForm::from_model(&venue_model);
    let page = Page::new("forms/edit_venue.html")
        .with("form", &form)?
        .with("venue", EditVenue { id, form: &form })?;
    state.render(page, flash)
}

/// POST /venues/:id/edit
pub async fn edit_venue(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
    flash: Flash,
    fields: FormFields,
) -> Response {
    let form = VenueForm::from_fields(&fields);
    let name = form.name.clone();
    let target = format!("/venues/{id}");

    match update_venue(&state, id, form).await {
        Ok(_) => {
            tracing::info!(id, "venue updated");
            flash.redirect(&target, format!("Venue {name} was successfully updated!"))
        }
        Err(e) => {
            tracing::error!("failed to update venue {id}: {e}");
            flash.redirect(
                &target,
                format!("An error occurred. Venue {name} could not be updated."),
            )
        }
    }
}

async fn update_venue(state: &AppState, id: i32, form: VenueForm) -> Result<venue::Model, AppError> {
    form.validate()?;
    let updated = state
        .db
        .transaction::<_, venue::Model, AppError>(|txn| {
            Box::pin(async move {
                let existing = venue::Entity::find_by_id(id)
                    .one(txn)
                    .await?
                    .ok_or_else(|| AppError::not_found(format!("venue {id}")))?;
                let mut model: venue::ActiveModel = existing.into();
                form.write_to(&mut model);
                Ok(model.update(txn).await?)
            })
        })
        .await?;
    Ok(updated)
}

/// DELETE /venues/:id (also POST /venues/:id/delete)
///
/// The venue's shows go with it.
pub async fn delete_venue(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
    flash: Flash,
) -> Response {
    let result = state
        .db
        .transaction::<_, String, AppError>(|txn| {
            Box::pin(async move {
                let existing = venue::Entity::find_by_id(id)
                    .one(txn)
                    .await?
                    .ok_or_else(|| AppError::not_found(format!("venue {id}")))?;
                let name = existing.name.clone();
                show::Entity::delete_many()
                    .filter(show::Column::VenueId.eq(id))
                    .exec(txn)
                    .await?;
                existing.delete(txn).await?;
                Ok(name)
            })
        })
        .await
        .map_err(AppError::from);

    match result {
        Ok(name) => {
            tracing::info!(id, name = %name, "venue deleted");
            flash.redirect("/venues", format!("Venue {name} was successfully deleted."))
        }
        Err(e) => {
            tracing::error!("failed to delete venue {id}: {e}");
            flash.redirect(
                "/venues",
                format!("An error occurred. Venue {id} could not be deleted."),
            )
        }
    }
}
