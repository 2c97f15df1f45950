//! Catalog maintenance endpoints

use std::sync::Arc;

use axum::extract::State;
use axum::routing::post;
use axum::{Json, Router};
use serde::Serialize;

use crate::api::types::ApiError;
use crate::data::CatalogService;

#[derive(Clone)]
pub struct CatalogApiState {
    pub catalog: Arc<CatalogService>,
}

#[derive(Debug, Serialize)]
pub struct RefreshResponse {
    pub source: &'static str,
    pub records: usize,
}

pub fn routes(catalog: Arc<CatalogService>) -> Router<()> {
    let state = CatalogApiState { catalog };
    Router::new()
        .route("/refresh", post(refresh_catalog))
        .with_state(state)
}

/// Re-fetch the catalog now. A failed fetch keeps the current records.
pub async fn refresh_catalog(
    State(state): State<CatalogApiState>,
) -> Result<Json<RefreshResponse>, ApiError> {
    let records = state
        .catalog
        .refresh()
        .await
        .map_err(ApiError::from_catalog)?;

    Ok(Json(RefreshResponse {
        source: state.catalog.source_name(),
        records,
    }))
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::Ordering;

    use axum::body::Body;
    use axum::http::{Request, StatusCode};

    use super::*;
    use crate::api::middleware::AllowedOrigins;
    use crate::api::routes::testing::send;
    use crate::api::server::router;
    use crate::data::catalog::testing::{StaticCatalog, sample_movies};

    fn refresh_req() -> Request<Body> {
        Request::post("/api/v1/catalog/refresh")
            .body(Body::empty())
            .unwrap()
    }

    #[tokio::test]
    async fn refresh_reports_count_and_survives_failure() {
        let source = Arc::new(StaticCatalog::new(sample_movies()));
        let catalog = Arc::new(CatalogService::new(Box::new(Arc::clone(&source)), 1));
        let app = router(
            Arc::clone(&catalog),
            &AllowedOrigins::new("127.0.0.1", 5390),
        );

        let (status, _, body) = send(app.clone(), refresh_req()).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["records"], 5);
        assert_eq!(body["source"], "static");

        source.failing.store(true, Ordering::SeqCst);
        let (status, _, body) = send(app, refresh_req()).await;
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(body["code"], "CATALOG_UNAVAILABLE");
        assert_eq!(catalog.records().len(), 5);
    }
}
