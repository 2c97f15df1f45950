//! Movie table endpoints
//!
//! The query string is the whole filter state. Listing replays it into a
//! fresh row model; edits rewrite it and answer with a redirect to the
//! updated listing URL.

use std::sync::Arc;

use axum::extract::{RawQuery, State};
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, put};
use axum::{Json, Router};
use serde::{Deserialize, Deserializer, Serialize};
use validator::Validate;

use crate::api::extractors::{ColumnPath, ValidatedJson, ValidatedQuery};
use crate::api::types::{
    ApiError, OrderBy, PaginationMeta, default_limit, default_page, validate_limit, validate_page,
};
use crate::core::constants::MOVIES_PATH;
use crate::data::CatalogService;
use crate::domain::filters::{
    ApplyOutcome, ColumnFilterState, FilterController, FilterKind, FilterValue, QueryLocation,
    QueryParams, RangeFilter, parse_bound,
};
use crate::domain::table::{ColumnDef, MovieRecord, RowModel, movies_table};

/// Parameter names owned by paging and sorting, never read as filters
const RESERVED_PARAMS: [&str; 3] = ["page", "limit", "order_by"];

/// Longest accepted text filter
const MAX_TEXT_FILTER_LENGTH: u64 = 256;

// ============================================================================
// State
// ============================================================================

#[derive(Clone)]
pub struct MoviesApiState {
    pub catalog: Arc<CatalogService>,
}

// ============================================================================
// Request/Response DTOs
// ============================================================================

#[derive(Debug, Deserialize, Validate)]
pub struct ListMoviesQuery {
    #[serde(default = "default_page")]
    #[validate(custom(function = "validate_page"))]
    pub page: u32,
    #[serde(default = "default_limit")]
    #[validate(custom(function = "validate_limit"))]
    pub limit: u32,
    pub order_by: Option<String>,
}

/// Body of a filter edit.
///
/// Range bounds arrive the way a user types them: numbers, numeric strings,
/// empty strings or null. Anything that is not a finite number leaves the
/// bound open.
#[derive(Debug, Deserialize, Validate)]
pub struct FilterEditRequest {
    #[serde(rename = "type")]
    pub kind: FilterKind,
    #[validate(length(max = MAX_TEXT_FILTER_LENGTH))]
    pub value: Option<String>,
    #[serde(default, deserialize_with = "deserialize_bound")]
    pub min: Option<f64>,
    #[serde(default, deserialize_with = "deserialize_bound")]
    pub max: Option<f64>,
}

impl FilterEditRequest {
    pub fn into_filter_value(self) -> FilterValue {
        match self.kind {
            FilterKind::Text => FilterValue::Text(self.value.unwrap_or_default()),
            FilterKind::Range => FilterValue::Range(RangeFilter::new(self.min, self.max)),
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum BoundInput {
    Number(f64),
    Text(String),
}

fn deserialize_bound<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let input = Option::<BoundInput>::deserialize(deserializer)?;
    Ok(match input {
        Some(BoundInput::Number(n)) => Some(n).filter(|n| n.is_finite()),
        Some(BoundInput::Text(text)) => parse_bound(&text),
        None => None,
    })
}

#[derive(Debug, Serialize)]
pub struct MovieRow<'a> {
    #[serde(flatten)]
    pub movie: &'a MovieRecord,
    pub poster_url: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct MoviesResponse<'a> {
    pub data: Vec<MovieRow<'a>>,
    pub meta: PaginationMeta,
    /// Filters replayed from the query string
    pub filters: &'a ColumnFilterState,
    /// Filter part of the query string, without paging or sorting
    pub query: String,
    /// Size of the unfiltered catalog
    pub total_records: usize,
}

#[derive(Serialize)]
pub struct ColumnsResponse {
    pub data: &'static [ColumnDef<MovieRecord>],
}

#[derive(Debug, Serialize)]
pub struct FilterEditResponse {
    pub query: String,
    pub outcome: ApplyOutcome,
}

// ============================================================================
// Location adapter
// ============================================================================

/// Query string of one request, standing in for the browser location
struct RequestLocation {
    query: String,
}

impl RequestLocation {
    fn new(raw: Option<String>) -> Self {
        Self {
            query: raw.unwrap_or_default(),
        }
    }

    /// Drop one parameter, keeping the order of the rest
    fn without(&self, name: &str) -> String {
        let mut params = QueryParams::parse(&self.query);
        params.delete(name);
        params.to_query_string()
    }

    /// Listing URL for this location
    fn movies_url(&self) -> String {
        if self.query.is_empty() {
            MOVIES_PATH.to_string()
        } else {
            format!("{}?{}", MOVIES_PATH, self.query)
        }
    }
}

impl QueryLocation for RequestLocation {
    fn query(&self) -> &str {
        &self.query
    }

    fn push_query(&mut self, query: String) {
        self.query = query;
    }
}

/// Filter parameters only
fn filter_query(raw: Option<&str>) -> String {
    let mut params = QueryParams::parse(raw.unwrap_or_default());
    for name in RESERVED_PARAMS {
        params.delete(name);
    }
    params.to_query_string()
}

// ============================================================================
// Routes
// ============================================================================

pub fn routes(catalog: Arc<CatalogService>) -> Router<()> {
    let state = MoviesApiState { catalog };
    Router::new()
        .route("/", get(list_movies))
        .route("/columns", get(list_columns))
        .route(
            "/filters/{column_id}",
            put(apply_filter).delete(clear_filter),
        )
        .with_state(state)
}

// ============================================================================
// Handlers
// ============================================================================

/// One page of the movie table, filtered by the query string
pub async fn list_movies(
    State(state): State<MoviesApiState>,
    ValidatedQuery(params): ValidatedQuery<ListMoviesQuery>,
    RawQuery(raw): RawQuery,
) -> Result<Response, ApiError> {
    let table = movies_table();
    let sort = params
        .order_by
        .as_deref()
        .map(|s| OrderBy::parse(s, &table.sortable_ids()))
        .transpose()?;

    let records = state.catalog.records();
    let mut model = RowModel::new(table, &records);
    let mut location = RequestLocation {
        query: filter_query(raw.as_deref()),
    };
    FilterController::new(&mut model, &mut location).replay_from_url();
    model.set_sort(sort.map(Into::into));

    let page = model.page(params.page, params.limit);
    tracing::debug!(
        query = %location.query,
        matched = page.total_items,
        total = records.len(),
        "Listed movies"
    );

    let response = MoviesResponse {
        data: page
            .rows
            .into_iter()
            .map(|movie| MovieRow {
                movie,
                poster_url: movie.poster_url(),
            })
            .collect(),
        meta: PaginationMeta::new(params.page, params.limit, page.total_items),
        filters: model.filters(),
        query: location.query.clone(),
        total_records: records.len(),
    };

    Ok(Json(response).into_response())
}

/// Column definitions with their filter kinds
pub async fn list_columns() -> Json<ColumnsResponse> {
    Json(ColumnsResponse {
        data: movies_table().columns(),
    })
}

/// Apply a filter edit to the current query string
pub async fn apply_filter(
    ColumnPath { column_id }: ColumnPath,
    RawQuery(raw): RawQuery,
    ValidatedJson(req): ValidatedJson<FilterEditRequest>,
) -> Result<Response, ApiError> {
    let mut model = RowModel::new(movies_table(), &[]);
    let mut location = RequestLocation::new(raw);

    let outcome = FilterController::new(&mut model, &mut location)
        .apply_user_edit(&column_id, req.into_filter_value())
        .map_err(ApiError::from_filter)?;

    Ok(edit_response(location, outcome))
}

/// Remove a column's filter from the current query string
pub async fn clear_filter(
    ColumnPath { column_id }: ColumnPath,
    RawQuery(raw): RawQuery,
) -> Response {
    let mut model = RowModel::new(movies_table(), &[]);
    let mut location = RequestLocation::new(raw);

    let outcome = FilterController::new(&mut model, &mut location).clear_column(&column_id);

    edit_response(location, outcome)
}

/// `303 See Other` to the updated listing. A changed filter set starts
/// over at the first page.
fn edit_response(mut location: RequestLocation, outcome: ApplyOutcome) -> Response {
    if outcome != ApplyOutcome::Ignored {
        location.query = location.without("page");
    }

    (
        StatusCode::SEE_OTHER,
        [(header::LOCATION, location.movies_url())],
        Json(FilterEditResponse {
            query: location.query,
            outcome,
        }),
    )
        .into_response()
}
