//! Shaping of query results into template contexts.

use chrono::{DateTime, Utc};
use gigbook_db::entities::{artist, show, venue};
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};

/// Anything placed on the calendar.
pub trait Scheduled {
    fn start_time(&self) -> DateTime<Utc>;
}

/// Split into `(past, upcoming)`. Upcoming means strictly after `now`.
pub fn partition_shows<T: Scheduled>(shows: Vec<T>, now: DateTime<Utc>) -> (Vec<T>, Vec<T>) {
    shows.into_iter().partition(|s| s.start_time() <= now)
}

/// A show as listed on a venue page.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VenueShow {
    pub artist_id: i32,
    pub artist_name: String,
    pub artist_image_link: Option<String>,
    pub start_time: DateTime<Utc>,
    pub start_time_display: String,
}

impl VenueShow {
    pub fn new(show: &show::Model, artist: &artist::Model) -> Self {
        Self {
            artist_id: artist.id,
            artist_name: artist.name.clone(),
            artist_image_link: artist.image_link.clone(),
            start_time: show.start_time,
            start_time_display: format_datetime(show.start_time, DateStyle::Full),
        }
    }
}

impl Scheduled for VenueShow {
    fn start_time(&self) -> DateTime<Utc> {
        self.start_time
    }
}

/// A show as listed on an artist page.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ArtistShow {
    pub venue_id: i32,
    pub venue_name: String,
    pub venue_image_link: Option<String>,
    pub start_time: DateTime<Utc>,
    pub start_time_display: String,
}

impl ArtistShow {
    pub fn new(show: &show::Model, venue: &venue::Model) -> Self {
        Self {
            venue_id: venue.id,
            venue_name: venue.name.clone(),
            venue_image_link: venue.image_link.clone(),
            start_time: show.start_time,
            start_time_display: format_datetime(show.start_time, DateStyle::Full),
        }
    }
}

impl Scheduled for ArtistShow {
    fn start_time(&self) -> DateTime<Utc> {
        self.start_time
    }
}

#[derive(Debug, Serialize)]
pub struct VenueDetail {
    #[serde(flatten)]
    pub venue: venue::Model,
    pub past_shows: Vec<VenueShow>,
    pub upcoming_shows: Vec<VenueShow>,
    pub past_shows_count: usize,
    pub upcoming_shows_count: usize,
}

impl VenueDetail {
    pub fn new(venue: venue::Model, shows: Vec<VenueShow>, now: DateTime<Utc>) -> Self {
        let (past_shows, upcoming_shows) = partition_shows(shows, now);
        Self {
            venue,
            past_shows_count: past_shows.len(),
            upcoming_shows_count: upcoming_shows.len(),
            past_shows,
            upcoming_shows,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ArtistDetail {
    #[serde(flatten)]
    pub artist: artist::Model,
    pub past_shows: Vec<ArtistShow>,
    pub upcoming_shows: Vec<ArtistShow>,
    pub past_shows_count: usize,
    pub upcoming_shows_count: usize,
}

impl ArtistDetail {
    pub fn new(artist: artist::Model, shows: Vec<ArtistShow>, now: DateTime<Utc>) -> Self {
        let (past_shows, upcoming_shows) = partition_shows(shows, now);
        Self {
            artist,
            past_shows_count: past_shows.len(),
            upcoming_shows_count: upcoming_shows.len(),
            past_shows,
            upcoming_shows,
        }
    }
}

/// One line of a listing or search result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Summary {
    pub id: i32,
    pub name: String,
    pub num_upcoming_shows: usize,
}

impl Summary {
    pub fn new(id: i32, name: String, upcoming: &HashMap<i32, usize>) -> Self {
        Self {
            id,
            name,
            num_upcoming_shows: upcoming.get(&id).copied().unwrap_or(0),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Area {
    pub city: String,
    pub state: String,
    pub venues: Vec<Summary>,
}

/// Bucket venues by identical (city, state). Areas come out ordered by
/// state then city, venues by name within an area.
pub fn group_by_area(venues: Vec<venue::Model>, upcoming: &HashMap<i32, usize>) -> Vec<Area> {
    let mut buckets: BTreeMap<(String, String), Vec<Summary>> = BTreeMap::new();
    for v in venues {
        buckets
            .entry((v.state, v.city))
            .or_default()
            .push(Summary::new(v.id, v.name, upcoming));
    }

    buckets
        .into_iter()
        .map(|((state, city), mut venues)| {
            venues.sort_by(|a, b| a.name.cmp(&b.name));
            Area {
                city,
                state,
                venues,
            }
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchResults<T> {
    pub count: usize,
    pub data: Vec<T>,
}

impl<T> From<Vec<T>> for SearchResults<T> {
    fn from(data: Vec<T>) -> Self {
        Self {
            count: data.len(),
            data,
        }
    }
}

/// A row of the shows page.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ShowListing {
    pub venue_id: i32,
    pub venue_name: String,
    pub artist_id: i32,
    pub artist_name: String,
    pub artist_image_link: Option<String>,
    pub start_time: DateTime<Utc>,
    pub start_time_display: String,
}

impl ShowListing {
    pub fn new(show: &show::Model, artist: &artist::Model, venue: &venue::Model) -> Self {
        Self {
            venue_id: venue.id,
            venue_name: venue.name.clone(),
            artist_id: artist.id,
            artist_name: artist.name.clone(),
            artist_image_link: artist.image_link.clone(),
            start_time: show.start_time,
            start_time_display: format_datetime(show.start_time, DateStyle::Medium),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateStyle {
    Medium,
    Full,
}

/// The `datetime` display filter: "Mon 03, 30, 2020 10:55PM" (medium)
/// or "Monday March, 30, 2020 at 10:55PM" (full).
pub fn format_datetime(value: DateTime<Utc>, style: DateStyle) -> String {
    let pattern = match style {
        DateStyle::Medium => "%a %m, %d, %Y %-I:%M%p",
        DateStyle::Full => "%A %B, %-d, %Y at %-I:%M%p",
    };
    value.format(pattern).to_string()
}
