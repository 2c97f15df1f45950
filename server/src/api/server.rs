//! API server initialization

use std::sync::Arc;

use anyhow::{Context, Result};
use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::response::Redirect;
use axum::routing::get;
use tokio::net::TcpListener;
use tower_http::compression::CompressionLayer;
use tower_http::trace::TraceLayer;

use super::middleware::{self, AllowedOrigins};
use super::routes::{catalog, health, movies};
use crate::core::CoreApp;
use crate::core::constants::{API_PREFIX, DEFAULT_BODY_LIMIT, MOVIES_PATH};
use crate::data::CatalogService;

pub struct ApiServer {
    app: CoreApp,
    allowed_origins: AllowedOrigins,
}

impl ApiServer {
    pub fn new(app: CoreApp) -> Self {
        let allowed_origins = AllowedOrigins::new(&app.config.server.host, app.config.server.port);
        Self {
            app,
            allowed_origins,
        }
    }

    /// Serve until shutdown; returns CoreApp for graceful shutdown
    pub async fn start(self) -> Result<CoreApp> {
        let Self {
            app,
            allowed_origins,
        } = self;

        let shutdown = app.shutdown.clone();
        let host = app.config.server.host.as_str();
        let port = app.config.server.port;

        let router = router(app.catalog.clone(), &allowed_origins);

        let listener = TcpListener::bind((host, port))
            .await
            .with_context(|| format!("Failed to bind {}:{}", host, port))?;
        tracing::debug!(addr = ?listener.local_addr().ok(), "HTTP server listening");

        axum::serve(listener, router)
            .with_graceful_shutdown(shutdown.wait())
            .await?;

        Ok(app)
    }
}

/// Full application router
pub(crate) fn router(catalog: Arc<CatalogService>, allowed_origins: &AllowedOrigins) -> Router {
    Router::new()
        .route("/", get(|| async { Redirect::temporary(MOVIES_PATH) }))
        .route(&format!("{}/health", API_PREFIX), get(health::health))
        .nest(MOVIES_PATH, movies::routes(catalog.clone()))
        .nest(&format!("{}/catalog", API_PREFIX), catalog::routes(catalog))
        .fallback(middleware::handle_404)
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(middleware::cors(allowed_origins))
        .layer(DefaultBodyLimit::max(DEFAULT_BODY_LIMIT))
}

#[cfg(test)]
mod tests {
    use axum::body::Body;
    use axum::http::{Request, StatusCode, header};

    use crate::api::routes::testing::{send, test_router};

    #[tokio::test]
    async fn root_redirects_to_movies() {
        let (status, headers, _) = send(
            test_router().await,
            Request::get("/").body(Body::empty()).unwrap(),
        )
        .await;

        assert_eq!(status, StatusCode::TEMPORARY_REDIRECT);
        assert_eq!(headers[header::LOCATION], "/api/v1/movies");
    }

    #[tokio::test]
    async fn unknown_path_is_404() {
        let (status, _, _) = send(
            test_router().await,
            Request::get("/api/v1/nope").body(Body::empty()).unwrap(),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
