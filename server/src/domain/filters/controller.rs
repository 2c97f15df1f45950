//! Filter controller
//!
//! Keeps the row model's column filters and the location's query string in
//! step. User edits flow state -> query; a mount replays query -> state.

use std::collections::BTreeSet;

use thiserror::Error;

use super::codec::{self, DecodedValue};
use super::types::{FilterKind, FilterKindLookup, FilterValue};

/// Row-model side of the controller
pub trait FilterTarget {
    /// Declared kind of a filterable column, `None` when the column is
    /// unknown or has no filter.
    fn filter_kind_of(&self, column_id: &str) -> Option<FilterKind>;

    fn column_filter(&self, column_id: &str) -> Option<&FilterValue>;

    /// Replace the column's filter; `None` removes it.
    fn set_column_filter(&mut self, column_id: &str, value: Option<FilterValue>);
}

/// Read/write access to the current query string, the only persisted state
pub trait QueryLocation {
    fn query(&self) -> &str;

    /// Record a new query string (history push, no reload)
    fn push_query(&mut self, query: String);
}

#[derive(Debug, Error, PartialEq)]
pub enum FilterError {
    #[error("column '{column}' takes a {expected} filter, got {actual}")]
    KindMismatch {
        column: String,
        expected: FilterKind,
        actual: FilterKind,
    },
}

/// What an edit did
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ApplyOutcome {
    Applied,
    Cleared,
    /// Column unknown or not filterable; nothing changed
    Ignored,
}

/// Adapts a target's optional kinds to the codec's total lookup
struct TargetKinds<'t, T: ?Sized>(&'t T);

impl<T: FilterTarget + ?Sized> FilterKindLookup for TargetKinds<'_, T> {
    fn filter_kind(&self, column_id: &str) -> FilterKind {
        self.0.filter_kind_of(column_id).unwrap_or(FilterKind::Text)
    }
}

pub struct FilterController<'a, T: ?Sized, L: ?Sized> {
    target: &'a mut T,
    location: &'a mut L,
}

impl<'a, T, L> FilterController<'a, T, L>
where
    T: FilterTarget + ?Sized,
    L: QueryLocation + ?Sized,
{
    pub fn new(target: &'a mut T, location: &'a mut L) -> Self {
        Self { target, location }
    }

    /// Apply a user edit to one column and persist it to the query string.
    ///
    /// Empty text clears the column. Range bounds are normalized in memory
    /// only; the query string keeps unset bounds absent.
    pub fn apply_user_edit(
        &mut self,
        column_id: &str,
        value: FilterValue,
    ) -> Result<ApplyOutcome, FilterError> {
        let Some(expected) = self.target.filter_kind_of(column_id) else {
            tracing::debug!(column = %column_id, "Ignoring edit for non-filterable column");
            return Ok(ApplyOutcome::Ignored);
        };

        if value.kind() != expected {
            return Err(FilterError::KindMismatch {
                column: column_id.to_string(),
                expected,
                actual: value.kind(),
            });
        }

        if matches!(&value, FilterValue::Text(text) if text.is_empty()) {
            return Ok(self.clear_column(column_id));
        }

        let query = codec::encode(column_id, &value, self.location.query());
        let state = match value {
            FilterValue::Range(range) => FilterValue::Range(range.normalized()),
            text => text,
        };
        self.target.set_column_filter(column_id, Some(state));

        tracing::debug!(column = %column_id, kind = %expected, query = %query, "Applied filter edit");
        self.location.push_query(query);
        Ok(ApplyOutcome::Applied)
    }

    /// Drop the column's filter and every query parameter it owns
    pub fn clear_column(&mut self, column_id: &str) -> ApplyOutcome {
        if self.target.filter_kind_of(column_id).is_none() {
            tracing::debug!(column = %column_id, "Ignoring clear for non-filterable column");
            return ApplyOutcome::Ignored;
        }

        self.target.set_column_filter(column_id, None);
        let query = codec::clear(column_id, self.location.query());
        tracing::debug!(column = %column_id, query = %query, "Cleared filter");
        self.location.push_query(query);
        ApplyOutcome::Cleared
    }

    /// Seed filter state from the current query string.
    ///
    /// Range parameters for the same column merge bound by bound. Parameters
    /// naming unknown columns are skipped. Returns how many columns were seeded.
    pub fn replay_from_url(&mut self) -> usize {
        let params = codec::decode(self.location.query(), &TargetKinds(&*self.target));
        let mut seeded = BTreeSet::new();

        for param in params {
            if self.target.filter_kind_of(&param.column_id).is_none() {
                continue;
            }

            let value = match param.value {
                DecodedValue::Text(text) if text.is_empty() => continue,
                DecodedValue::Text(text) => FilterValue::Text(text),
                DecodedValue::Bound(bound, number) => {
                    let prev = self
                        .target
                        .column_filter(&param.column_id)
                        .and_then(FilterValue::as_range)
                        .copied()
                        .unwrap_or_default();
                    FilterValue::Range(prev.with_bound(bound, number))
                }
            };

            self.target.set_column_filter(&param.column_id, Some(value));
            seeded.insert(param.column_id);
        }

        tracing::debug!(count = seeded.len(), "Replayed filters from query string");
        seeded.len()
    }
}
