//! Query-string encoding of column filters
//!
//! The query string is the only persisted form of filter state:
//!
//! - text filter on `c`: `c=<value>` (at most one per column)
//! - range filter on `c`: `c=min:<n>` and/or `c=max:<n>`, each present only
//!   when that bound is a finite number
//!
//! Kinds are not stored; [`decode`] re-derives them through a
//! [`FilterKindLookup`]. Encoding and decoding are pure functions over the
//! query string; writing the result back to a location is the caller's job.

use url::form_urlencoded;

use super::types::{FilterKind, FilterKindLookup, FilterValue, RangeBound};

/// Separator between bound name and number in a range parameter
const BOUND_SEPARATOR: char = ':';

/// Ordered query parameters with URLSearchParams-style editing
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParams {
    pairs: Vec<(String, String)>,
}

impl QueryParams {
    /// Parse a query string, with or without the leading `?`
    pub fn parse(query: &str) -> Self {
        let query = query.strip_prefix('?').unwrap_or(query);
        Self {
            pairs: form_urlencoded::parse(query.as_bytes())
                .into_owned()
                .collect(),
        }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn get_all<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.pairs
            .iter()
            .filter(move |(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.pairs.iter().any(|(k, _)| k == name)
    }

    pub fn append(&mut self, name: &str, value: &str) {
        self.pairs.push((name.to_string(), value.to_string()));
    }

    /// Replace the first `name` parameter in place and drop the rest,
    /// or append when there is none.
    pub fn set(&mut self, name: &str, value: &str) {
        match self.pairs.iter().position(|(k, _)| k == name) {
            Some(first) => {
                self.pairs[first].1 = value.to_string();
                let mut index = 0;
                self.pairs.retain(|(k, _)| {
                    let keep = k != name || index == first;
                    index += 1;
                    keep
                });
            }
            None => self.append(name, value),
        }
    }

    pub fn delete(&mut self, name: &str) {
        self.pairs.retain(|(k, _)| k != name);
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.pairs.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// Serialize without the leading `?`
    pub fn to_query_string(&self) -> String {
        form_urlencoded::Serializer::new(String::new())
            .extend_pairs(self.pairs.iter())
            .finish()
    }
}

/// Parse a numeric bound. Malformed or non-finite input yields `None`,
/// which degrades to "bound absent".
pub fn parse_bound(text: &str) -> Option<f64> {
    text.trim()
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
}

fn format_bound(bound: RangeBound, value: f64) -> String {
    format!("{}{}{}", bound.as_str(), BOUND_SEPARATOR, value)
}

/// Write `value` for `column_id` into `query` and return the new query string.
///
/// Text uses set semantics (never more than one parameter per column); an
/// empty text value writes nothing. Range always deletes every existing
/// parameter of the column before re-adding its finite bounds.
pub fn encode(column_id: &str, value: &FilterValue, query: &str) -> String {
    let mut params = QueryParams::parse(query);

    match value {
        FilterValue::Text(text) => {
            if !text.is_empty() {
                params.set(column_id, text);
            }
        }
        FilterValue::Range(range) => {
            params.delete(column_id);
            for bound in [RangeBound::Min, RangeBound::Max] {
                if let Some(v) = range.bound(bound).filter(|v| v.is_finite()) {
                    params.append(column_id, &format_bound(bound, v));
                }
            }
        }
    }

    params.to_query_string()
}

/// Remove every parameter of `column_id` from `query`
pub fn clear(column_id: &str, query: &str) -> String {
    let mut params = QueryParams::parse(query);
    params.delete(column_id);
    params.to_query_string()
}

/// Raw value recovered from one query parameter
#[derive(Debug, Clone, PartialEq)]
pub enum DecodedValue {
    Text(String),
    /// One side of a range; `None` when the number was malformed
    Bound(RangeBound, Option<f64>),
}

/// One query parameter interpreted as a column filter
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedParam {
    pub column_id: String,
    pub kind: FilterKind,
    pub value: DecodedValue,
}

/// Interpret every parameter of `query`, in order.
///
/// Repeated parameters each yield their own entry. Range parameters that do
/// not follow the `min:<n>` / `max:<n>` convention are skipped.
pub fn decode<L>(query: &str, kinds: &L) -> Vec<DecodedParam>
where
    L: FilterKindLookup + ?Sized,
{
    QueryParams::parse(query)
        .iter()
        .filter_map(|(name, raw)| {
            let kind = kinds.filter_kind(name);
            let value = match kind {
                FilterKind::Text => DecodedValue::Text(raw.to_string()),
                FilterKind::Range => {
                    let Some((bound, number)) = raw.split_once(BOUND_SEPARATOR) else {
                        tracing::debug!(column = %name, value = %raw, "Range parameter without bound name");
                        return None;
                    };
                    let Some(bound) = RangeBound::parse(bound) else {
                        tracing::debug!(column = %name, bound = %bound, "Unknown range bound");
                        return None;
                    };
                    DecodedValue::Bound(bound, parse_bound(number))
                }
            };
            Some(DecodedParam {
                column_id: name.to_string(),
                kind,
                value,
            })
        })
        .collect()
}
