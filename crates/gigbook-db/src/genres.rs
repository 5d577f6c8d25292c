//! Genre list stored as a JSON array column.

use sea_orm::FromJsonQueryResult;
use serde::{Deserialize, Serialize};

/// Genres attached to a venue or artist.
///
/// Collecting into `Genres` trims entries, drops blank ones and removes
/// case-insensitive duplicates, keeping the first spelling seen.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, FromJsonQueryResult)]
pub struct Genres(Vec<String>);

impl Genres {
    pub fn as_slice(&self) -> &[String] {
        &self.0
    }
}

impl<S: AsRef<str>> FromIterator<S> for Genres {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut out: Vec<String> = Vec::new();
        for raw in iter {
            let genre = raw.as_ref().trim();
            if genre.is_empty() || out.iter().any(|g| g.eq_ignore_ascii_case(genre)) {
                continue;
            }
            out.push(genre.to_string());
        }
        Self(out)
    }
}
