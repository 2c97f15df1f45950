//! Catalog read from a local JSON file

use std::path::PathBuf;

use async_trait::async_trait;

use super::{CatalogSource, PopularMoviesResponse};
use crate::data::error::CatalogError;
use crate::domain::table::MovieRecord;

/// Reads a saved `movie/popular` response. The page argument is ignored;
/// the file is one page.
pub struct FileCatalog {
    path: PathBuf,
}

impl FileCatalog {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

#[async_trait]
impl CatalogSource for FileCatalog {
    fn name(&self) -> &'static str {
        "file"
    }

    async fn fetch_page(&self, _page: u32) -> Result<Vec<MovieRecord>, CatalogError> {
        tracing::debug!(path = %self.path.display(), "Reading catalog file");
        let content = tokio::fs::read_to_string(&self.path).await?;
        let parsed: PopularMoviesResponse = serde_json::from_str(&content).map_err(|e| {
            CatalogError::Decode(format!("{}: {}", self.path.display(), e))
        })?;
        Ok(parsed.results)
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[tokio::test]
    async fn reads_results_array() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"page": 1, "results": [
                {{"id": 603, "title": "The Matrix", "release_date": "1999-03-31", "vote_average": 8.2, "popularity": 74.5, "poster_path": "/m.jpg"}},
                {{"id": 27205, "title": "Inception", "vote_average": 8.4, "popularity": 90.0}}
            ]}}"#
        )
        .unwrap();

        let records = FileCatalog::new(file.path().to_path_buf())
            .fetch_page(1)
            .await
            .unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[1].title, "Inception");
        assert_eq!(records[1].release_date, "");
    }

    #[tokio::test]
    async fn missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = FileCatalog::new(dir.path().join("absent.json"))
            .fetch_page(1)
            .await
            .unwrap_err();
        assert!(matches!(err, CatalogError::Io(_)));
    }

    #[tokio::test]
    async fn wrong_shape_is_decode_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"[{{"id": 1, "title": "bare array"}}]"#).unwrap();

        let err = FileCatalog::new(file.path().to_path_buf())
            .fetch_page(1)
            .await
            .unwrap_err();
        assert!(matches!(err, CatalogError::Decode(_)));
    }
}
