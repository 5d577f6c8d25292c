//! Form submissions: urlencoded parsing, validation, and conversion into
//! active models.

use axum::{
    body::Bytes,
    extract::{FromRequest, Request},
    http::StatusCode,
};
use chrono::{DateTime, NaiveDateTime, Utc};
use gigbook_db::entities::{artist, show, venue};
use gigbook_db::Genres;
use sea_orm::{ActiveValue::NotSet, Set};
use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FormError {
    #[error("{0} is required")]
    Missing(&'static str),

    #[error("{field} is longer than {max} characters")]
    TooLong { field: &'static str, max: usize },

    #[error("{field} must be a number, got {value:?}")]
    InvalidId { field: &'static str, value: String },

    #[error("unrecognised start time {0:?}")]
    InvalidStartTime(String),
}

/// Decoded `application/x-www-form-urlencoded` body, in submission
/// order. Repeated keys (multi-selects) are kept.
#[derive(Debug, Default, Clone)]
pub struct FormFields {
    pairs: Vec<(String, String)>,
}

impl FormFields {
    pub fn parse(body: &[u8]) -> Self {
        Self {
            pairs: url::form_urlencoded::parse(body).into_owned().collect(),
        }
    }

    /// First value submitted for `key`.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn get_all<'a>(&'a self, key: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.pairs
            .iter()
            .filter(move |(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Trimmed value, empty when absent.
    pub fn text(&self, key: &str) -> String {
        self.get(key).map(str::trim).unwrap_or_default().to_string()
    }

    /// Checkbox semantics: an unchecked box is simply not submitted.
    pub fn checked(&self, key: &str) -> bool {
        self.get(key).is_some_and(|v| {
            !matches!(
                v.trim().to_ascii_lowercase().as_str(),
                "" | "false" | "0" | "off" | "n" | "no"
            )
        })
    }
}

impl<S> FromRequest<S> for FormFields
where
    S: Send + Sync,
{
    type Rejection = (StatusCode, String);

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let body = Bytes::from_request(req, state)
            .await
            .map_err(|e| (StatusCode::BAD_REQUEST, e.body_text()))?;
        Ok(Self::parse(&body))
    }
}

fn required(field: &'static str, value: &str) -> Result<(), FormError> {
    if value.trim().is_empty() {
        Err(FormError::Missing(field))
    } else {
        Ok(())
    }
}

/// Column width of names, places, phones, facebook links and seeking
/// descriptions.
const SHORT_TEXT_MAX: usize = 120;
/// Column width of image and website links.
const LINK_MAX: usize = 500;

fn within(field: &'static str, value: &str, max: usize) -> Result<(), FormError> {
    if value.chars().count() > max {
        Err(FormError::TooLong { field, max })
    } else {
        Ok(())
    }
}

fn optional(value: String) -> Option<String> {
    let value = value.trim();
    (!value.is_empty()).then(|| value.to_string())
}

/// Fields of the venue create/edit forms.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct VenueForm {
    pub name: String,
    pub city: String,
    pub state: String,
    pub address: String,
    pub phone: String,
    pub genres: Vec<String>,
    pub facebook_link: String,
    pub image_link: String,
    pub website_link: String,
    pub seeking_talent: bool,
    pub seeking_description: String,
}

impl VenueForm {
    pub fn from_fields(fields: &FormFields) -> Self {
        Self {
            name: fields.text("name"),
            city: fields.text("city"),
            state: fields.text("state"),
            address: fields.text("address"),
            phone: fields.text("phone"),
            genres: fields.get_all("genres").map(str::to_string).collect(),
            facebook_link: fields.text("facebook_link"),
            image_link: fields.text("image_link"),
            website_link: fields.text("website_link"),
            seeking_talent: fields.checked("seeking_talent"),
            seeking_description: fields.text("seeking_description"),
        }
    }

    /// Pre-fill for the edit page.
    pub fn from_model(model: &venue::Model) -> Self {
        Self {
            name: model.name.clone(),
            city: model.city.clone(),
            state: model.state.clone(),
            address: model.address.clone(),
            phone: model.phone.clone(),
            genres: model.genres.as_slice().to_vec(),
            facebook_link: model.facebook_link.clone().unwrap_or_default(),
            image_link: model.image_link.clone().unwrap_or_default(),
            website_link: model.website.clone().unwrap_or_default(),
            seeking_talent: model.seeking_talent,
            seeking_description: model.seeking_description.clone().unwrap_or_default(),
        }
    }

    pub fn validate(&self) -> Result<(), FormError> {
        required("name", &self.name)?;
        required("city", &self.city)?;
        required("state", &self.state)?;
        required("address", &self.address)?;
        required("phone", &self.phone)?;
        for (field, value) in [
            ("name", &self.name),
            ("city", &self.city),
            ("state", &self.state),
            ("address", &self.address),
            ("phone", &self.phone),
            ("facebook_link", &self.facebook_link),
            ("seeking_description", &self.seeking_description),
        ] {
            within(field, value, SHORT_TEXT_MAX)?;
        }
        within("image_link", &self.image_link, LINK_MAX)?;
        within("website_link", &self.website_link, LINK_MAX)
    }

    /// Overwrite every mutable column of `model` with the submitted values.
    pub fn write_to(self, model: &mut venue::ActiveModel) {
        model.name = Set(self.name);
        model.city = Set(self.city);
        model.state = Set(self.state);
        model.address = Set(self.address);
        model.phone = Set(self.phone);
        model.genres = Set(self.genres.into_iter().collect::<Genres>());
        model.facebook_link = Set(optional(self.facebook_link));
        model.image_link = Set(optional(self.image_link));
        model.website = Set(optional(self.website_link));
        model.seeking_talent = Set(self.seeking_talent);
        model.seeking_description = Set(optional(self.seeking_description));
    }

    pub fn into_new_model(self) -> venue::ActiveModel {
        let mut model = venue::ActiveModel {
            id: NotSet,
            ..Default::default()
        };
        self.write_to(&mut model);
        model
    }
}

/// Fields of the artist create/edit forms.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ArtistForm {
    pub name: String,
    pub city: String,
    pub state: String,
    pub phone: String,
    pub genres: Vec<String>,
    pub facebook_link: String,
    pub image_link: String,
    pub website_link: String,
    pub seeking_venue: bool,
    pub seeking_description: String,
}

impl ArtistForm {
    pub fn from_fields(fields: &FormFields) -> Self {
        Self {
            name: fields.text("name"),
            city: fields.text("city"),
            state: fields.text("state"),
            phone: fields.text("phone"),
            genres: fields.get_all("genres").map(str::to_string).collect(),
            facebook_link: fields.text("facebook_link"),
            image_link: fields.text("image_link"),
            website_link: fields.text("website_link"),
            seeking_venue: fields.checked("seeking_venue"),
            seeking_description: fields.text("seeking_description"),
        }
    }

    pub fn from_model(model: &artist::Model) -> Self {
        Self {
            name: model.name.clone(),
            city: model.city.clone(),
            state: model.state.clone(),
            phone: model.phone.clone().unwrap_or_default(),
            genres: model.genres.as_slice().to_vec(),
            facebook_link: model.facebook_link.clone().unwrap_or_default(),
            image_link: model.image_link.clone().unwrap_or_default(),
            website_link: model.website.clone().unwrap_or_default(),
            seeking_venue: model.seeking_venue,
            seeking_description: model.seeking_description.clone().unwrap_or_default(),
        }
    }

    pub fn validate(&self) -> Result<(), FormError> {
        required("name", &self.name)?;
        required("city", &self.city)?;
        required("state", &self.state)?;
        for (field, value) in [
            ("name", &self.name),
            ("city", &self.city),
            ("state", &self.state),
            ("phone", &self.phone),
            ("facebook_link", &self.facebook_link),
            ("seeking_description", &self.seeking_description),
        ] {
            within(field, value, SHORT_TEXT_MAX)?;
        }
        within("image_link", &self.image_link, LINK_MAX)?;
        within("website_link", &self.website_link, LINK_MAX)
    }

    pub fn write_to(self, model: &mut artist::ActiveModel) {
        model.name = Set(self.name);
        model.city = Set(self.city);
        model.state = Set(self.state);
        model.phone = Set(optional(self.phone));
        model.genres = Set(self.genres.into_iter().collect::<Genres>());
        model.facebook_link = Set(optional(self.facebook_link));
        model.image_link = Set(optional(self.image_link));
        model.website = Set(optional(self.website_link));
        model.seeking_venue = Set(self.seeking_venue);
        model.seeking_description = Set(optional(self.seeking_description));
    }

    pub fn into_new_model(self) -> artist::ActiveModel {
        let mut model = artist::ActiveModel {
            id: NotSet,
            ..Default::default()
        };
        self.write_to(&mut model);
        model
    }
}

/// Validated show submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShowForm {
    pub artist_id: i32,
    pub venue_id: i32,
    pub start_time: DateTime<Utc>,
}

impl ShowForm {
    pub fn from_fields(fields: &FormFields) -> Result<Self, FormError> {
        Ok(Self {
            artist_id: parse_id("artist_id", &fields.text("artist_id"))?,
            venue_id: parse_id("venue_id", &fields.text("venue_id"))?,
            start_time: parse_start_time(&fields.text("start_time"))?,
        })
    }

    pub fn into_new_model(self) -> show::ActiveModel {
        show::ActiveModel {
            id: NotSet,
            artist_id: Set(self.artist_id),
            venue_id: Set(self.venue_id),
            start_time: Set(self.start_time),
        }
    }
}

/// Values the empty show form is rendered with.
#[derive(Debug, Clone, Serialize)]
pub struct ShowFormDefaults {
    pub artist_id: String,
    pub venue_id: String,
    pub start_time: String,
}

impl ShowFormDefaults {
    pub fn at(now: DateTime<Utc>) -> Self {
        Self {
            artist_id: String::new(),
            venue_id: String::new(),
            start_time: now.format(START_TIME_FORMATS[0]).to_string(),
        }
    }
}

fn parse_id(field: &'static str, value: &str) -> Result<i32, FormError> {
    if value.is_empty() {
        return Err(FormError::Missing(field));
    }
    value.parse().map_err(|_| FormError::InvalidId {
        field,
        value: value.to_string(),
    })
}

/// Accepted naive layouts, interpreted as UTC. The first is the one the
/// form is pre-filled with.
const START_TIME_FORMATS: [&str; 4] = [
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M",
];

pub fn parse_start_time(value: &str) -> Result<DateTime<Utc>, FormError> {
    if value.is_empty() {
        return Err(FormError::Missing("start_time"));
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Ok(dt.with_timezone(&Utc));
    }
    START_TIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(value, fmt).ok())
        .map(|naive| naive.and_utc())
        .ok_or_else(|| FormError::InvalidStartTime(value.to_string()))
}
