//! Catalog record

use serde::{Deserialize, Serialize};

/// Image host prefix for `poster_path`
pub const POSTER_BASE_URL: &str = "https://image.tmdb.org/t/p/w500";

/// One movie as returned by the catalog
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct MovieRecord {
    pub id: i64,
    pub title: String,
    #[serde(default)]
    pub overview: String,
    /// `YYYY-MM-DD`, empty when the catalog has no date
    #[serde(default)]
    pub release_date: String,
    #[serde(default)]
    pub vote_average: f64,
    #[serde(default)]
    pub popularity: f64,
    #[serde(default)]
    pub poster_path: Option<String>,
}

impl MovieRecord {
    pub fn poster_url(&self) -> Option<String> {
        self.poster_path
            .as_deref()
            .map(|path| format!("{}{}", POSTER_BASE_URL, path))
    }
}
