//! Filter type definitions
//!
//! A column's filter is a tagged value whose tag must agree with the
//! column's declared [`FilterKind`]. Kinds are fixed when the table is
//! defined and never inferred from the shape of a value.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Which predicate and which query-string rules apply to a column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterKind {
    Text,
    Range,
}

impl FilterKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Range => "range",
        }
    }
}

impl fmt::Display for FilterKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Column-name-to-kind lookup shared by the table definition and URL replay.
///
/// The query string never stores a kind, so decoding re-derives it here.
/// Columns the lookup does not know resolve to [`FilterKind::Text`].
pub trait FilterKindLookup {
    fn filter_kind(&self, column_id: &str) -> FilterKind;
}

/// Named side of a range filter, as written in the query string (`min:7`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RangeBound {
    Min,
    Max,
}

impl RangeBound {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Min => "min",
            Self::Max => "max",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "min" => Some(Self::Min),
            "max" => Some(Self::Max),
            _ => None,
        }
    }
}

/// Numeric range; an absent bound is unbounded on that side
#[derive(Debug, Clone, Copy, Default, PartialEq, Deserialize, Serialize)]
pub struct RangeFilter {
    pub min: Option<f64>,
    pub max: Option<f64>,
}

impl RangeFilter {
    /// Both bounds absent; matches everything
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn new(min: Option<f64>, max: Option<f64>) -> Self {
        Self { min, max }
    }

    pub fn is_unbounded(&self) -> bool {
        self.min.is_none() && self.max.is_none()
    }

    pub fn bound(&self, bound: RangeBound) -> Option<f64> {
        match bound {
            RangeBound::Min => self.min,
            RangeBound::Max => self.max,
        }
    }

    /// Copy with one bound replaced, the other preserved
    pub fn with_bound(mut self, bound: RangeBound, value: Option<f64>) -> Self {
        match bound {
            RangeBound::Min => self.min = value,
            RangeBound::Max => self.max = value,
        }
        self
    }

    /// In-memory form applied after a user edit: absent min becomes `0`,
    /// absent max becomes `+inf`. Never written to the query string.
    pub fn normalized(&self) -> Self {
        Self {
            min: Some(self.min.unwrap_or(0.0)),
            max: Some(self.max.unwrap_or(f64::INFINITY)),
        }
    }
}

/// Current filter of a single column
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum FilterValue {
    Text(String),
    Range(RangeFilter),
}

impl FilterValue {
    pub fn empty_text() -> Self {
        Self::Text(String::new())
    }

    pub fn empty_range() -> Self {
        Self::Range(RangeFilter::empty())
    }

    pub fn kind(&self) -> FilterKind {
        match self {
            Self::Text(_) => FilterKind::Text,
            Self::Range(_) => FilterKind::Range,
        }
    }

    pub fn as_range(&self) -> Option<&RangeFilter> {
        match self {
            Self::Range(range) => Some(range),
            Self::Text(_) => None,
        }
    }
}

/// Column id -> current filter. A missing entry means "unfiltered".
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ColumnFilterState {
    entries: BTreeMap<String, FilterValue>,
}

impl ColumnFilterState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, column_id: &str) -> Option<&FilterValue> {
        self.entries.get(column_id)
    }

    pub fn set(&mut self, column_id: impl Into<String>, value: FilterValue) {
        self.entries.insert(column_id.into(), value);
    }

    pub fn remove(&mut self, column_id: &str) -> Option<FilterValue> {
        self.entries.remove(column_id)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FilterValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
