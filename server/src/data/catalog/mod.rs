//! Movie catalog
//!
//! A [`CatalogSource`] fetches one page of records; [`CatalogService`] keeps
//! the latest successful fetch as an immutable snapshot that request handlers
//! read without blocking a refresh.

mod file;
mod tmdb;

pub use file::FileCatalog;
pub use tmdb::TmdbCatalog;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::RwLock;
use serde::Deserialize;
use tokio::sync::watch;
use tokio::task::JoinHandle;

use super::error::CatalogError;
use crate::core::config::{CatalogConfig, CatalogSourceKind};
use crate::domain::table::MovieRecord;

/// One page of a popular-movies listing
#[derive(Debug, Deserialize)]
pub struct PopularMoviesResponse {
    #[serde(default)]
    pub page: u32,
    pub results: Vec<MovieRecord>,
    #[serde(default)]
    pub total_pages: u32,
    #[serde(default)]
    pub total_results: u64,
}

#[async_trait]
pub trait CatalogSource: Send + Sync {
    /// Short name for logs
    fn name(&self) -> &'static str;

    async fn fetch_page(&self, page: u32) -> Result<Vec<MovieRecord>, CatalogError>;
}

pub struct CatalogService {
    source: Box<dyn CatalogSource>,
    page: u32,
    records: RwLock<Arc<Vec<MovieRecord>>>,
}

impl CatalogService {
    pub fn new(source: Box<dyn CatalogSource>, page: u32) -> Self {
        Self {
            source,
            page,
            records: RwLock::new(Arc::new(Vec::new())),
        }
    }

    pub fn from_config(config: &CatalogConfig) -> Result<Self, CatalogError> {
        let source: Box<dyn CatalogSource> = match config.source {
            CatalogSourceKind::Tmdb => Box::new(TmdbCatalog::new(&config.tmdb)?),
            CatalogSourceKind::File => {
                let path = config.file.clone().ok_or_else(|| {
                    CatalogError::Config("catalog.file.path is required for the file source".into())
                })?;
                Box::new(FileCatalog::new(path))
            }
        };
        Ok(Self::new(source, config.tmdb.page))
    }

    pub fn source_name(&self) -> &'static str {
        self.source.name()
    }

    /// Current snapshot; empty until the first successful refresh
    pub fn records(&self) -> Arc<Vec<MovieRecord>> {
        Arc::clone(&self.records.read())
    }

    /// Fetch the configured page and replace the snapshot.
    ///
    /// On failure the previous snapshot stays in place.
    pub async fn refresh(&self) -> Result<usize, CatalogError> {
        let records = match self.source.fetch_page(self.page).await {
            Ok(records) => records,
            Err(e) => {
                tracing::warn!(source = self.source.name(), error = %e, "Catalog refresh failed");
                return Err(e);
            }
        };

        let count = records.len();
        *self.records.write() = Arc::new(records);
        tracing::debug!(source = self.source.name(), count, "Catalog refreshed");
        Ok(count)
    }

    /// Periodic refresh until shutdown. `None` when `refresh_minutes` is 0.
    pub fn start_refresh_task(
        self: &Arc<Self>,
        refresh_minutes: u64,
        mut shutdown_rx: watch::Receiver<bool>,
    ) -> Option<JoinHandle<()>> {
        if refresh_minutes == 0 {
            return None;
        }

        let interval = Duration::from_secs(refresh_minutes.saturating_mul(60));
        let service = Arc::clone(self);

        Some(tokio::spawn(async move {
            let mut timer = tokio::time::interval(interval);
            timer.tick().await; // first tick is immediate

            loop {
                tokio::select! {
                    biased;
                    _ = shutdown_rx.changed() => {
                        if *shutdown_rx.borrow() {
                            break;
                        }
                    }
                    _ = timer.tick() => {
                        let _ = service.refresh().await;
                    }
                }
            }
            tracing::debug!("Catalog refresh task stopped");
        }))
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

    use super::*;

    /// In-memory source; can be switched to failing
    pub struct StaticCatalog {
        pub records: Vec<MovieRecord>,
        pub failing: AtomicBool,
        pub calls: AtomicUsize,
    }

    impl StaticCatalog {
        pub fn new(records: Vec<MovieRecord>) -> Self {
            Self {
                records,
                failing: AtomicBool::new(false),
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl CatalogSource for StaticCatalog {
        fn name(&self) -> &'static str {
            "static"
        }

        async fn fetch_page(&self, _page: u32) -> Result<Vec<MovieRecord>, CatalogError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.failing.load(Ordering::SeqCst) {
                return Err(CatalogError::Status {
                    status: 503,
                    body: "unavailable".into(),
                });
            }
            Ok(self.records.clone())
        }
    }

    #[async_trait]
    impl<T: CatalogSource> CatalogSource for Arc<T> {
        fn name(&self) -> &'static str {
            (**self).name()
        }

        async fn fetch_page(&self, page: u32) -> Result<Vec<MovieRecord>, CatalogError> {
            (**self).fetch_page(page).await
        }
    }

    pub fn sample_movies() -> Vec<MovieRecord> {
        let movie = |id: i64, title: &str, vote_average: f64, popularity: f64, date: &str| {
            MovieRecord {
                id,
                title: title.to_string(),
                overview: String::new(),
                release_date: date.to_string(),
                vote_average,
                popularity,
                poster_path: Some(format!("/{}.jpg", id)),
            }
        };
        vec![
            movie(27205, "Inception", 8.4, 90.0, "2010-07-15"),
            movie(603, "The Matrix", 8.2, 74.5, "1999-03-31"),
            movie(604, "The Matrix Reloaded", 7.0, 40.0, "2003-05-15"),
            movie(536869, "Cats", 2.6, 12.0, "2019-12-19"),
            movie(624860, "The Matrix Resurrections", 6.4, 55.0, "2021-12-16"),
        ]
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::Ordering;

    use super::testing::{StaticCatalog, sample_movies};
    use super::*;

    #[tokio::test]
    async fn refresh_replaces_snapshot() {
        let service = CatalogService::new(Box::new(StaticCatalog::new(sample_movies())), 1);
        assert!(service.records().is_empty());

        assert_eq!(service.refresh().await.unwrap(), 5);
        assert_eq!(service.records().len(), 5);
        assert_eq!(service.source_name(), "static");
    }

    #[tokio::test]
    async fn failed_refresh_keeps_previous_snapshot() {
        let source = Arc::new(StaticCatalog::new(sample_movies()));
        let service = CatalogService::new(Box::new(Arc::clone(&source)), 1);
        service.refresh().await.unwrap();

        source.failing.store(true, Ordering::SeqCst);
        let err = service.refresh().await.unwrap_err();
        assert!(matches!(err, CatalogError::Status { status: 503, .. }));
        assert_eq!(service.records().len(), 5);
    }

    #[tokio::test]
    async fn refresh_task_disabled_at_zero() {
        let service = Arc::new(CatalogService::new(Box::new(StaticCatalog::new(vec![])), 1));
        let (_tx, rx) = watch::channel(false);
        assert!(service.start_refresh_task(0, rx).is_none());
    }

    #[tokio::test]
    async fn refresh_task_stops_on_shutdown() {
        let service = Arc::new(CatalogService::new(Box::new(StaticCatalog::new(vec![])), 1));
        let (tx, rx) = watch::channel(false);
        let handle = service.start_refresh_task(60, rx).unwrap();

        tx.send(true).unwrap();
        tokio::time::timeout(Duration::from_secs(5), handle)
            .await
            .expect("task should stop")
            .unwrap();
    }

    #[test]
    fn from_config_requires_file_path() {
        let config = CatalogConfig {
            source: CatalogSourceKind::File,
            file: None,
            ..CatalogConfig::default()
        };
        let err = CatalogService::from_config(&config).err().unwrap();
        assert!(matches!(err, CatalogError::Config(_)));
    }
}
