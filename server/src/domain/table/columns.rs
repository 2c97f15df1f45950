//! Table definition
//!
//! Columns, their accessors, and the filter kind each one declares. The
//! definition is the single source for column-name-to-kind lookup.

use std::borrow::Cow;
use std::cmp::Ordering;
use std::sync::LazyLock;

use serde::Serialize;

use super::record::MovieRecord;
use crate::domain::filters::{FilterKind, FilterKindLookup, parse_bound};

/// Borrowed cell content
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CellValue<'a> {
    Integer(i64),
    Number(f64),
    Text(&'a str),
}

impl<'a> CellValue<'a> {
    /// Numeric view; text is coerced and yields `None` when it is not a number
    pub fn as_number(&self) -> Option<f64> {
        match *self {
            Self::Integer(v) => Some(v as f64),
            Self::Number(v) => Some(v),
            Self::Text(s) => parse_bound(s),
        }
    }

    pub fn to_text(&self) -> Cow<'a, str> {
        match *self {
            Self::Integer(v) => Cow::Owned(v.to_string()),
            Self::Number(v) => Cow::Owned(v.to_string()),
            Self::Text(s) => Cow::Borrowed(s),
        }
    }

    /// Ascending order for sorting within one column
    pub fn compare(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Self::Integer(a), Self::Integer(b)) => a.cmp(b),
            (Self::Text(a), Self::Text(b)) => a.cmp(b),
            _ => match (self.as_number(), other.as_number()) {
                (Some(a), Some(b)) => a.total_cmp(&b),
                _ => self.to_text().cmp(&other.to_text()),
            },
        }
    }
}

/// Column of a table over rows of type `R`
#[derive(Serialize)]
#[serde(bound = "")]
pub struct ColumnDef<R> {
    pub id: &'static str,
    pub header: &'static str,
    /// Filter kind, `None` when the column cannot be filtered
    pub filter: Option<FilterKind>,
    pub sortable: bool,
    pub hideable: bool,
    #[serde(skip)]
    accessor: fn(&R) -> CellValue<'_>,
}

impl<R> ColumnDef<R> {
    pub fn new(id: &'static str, header: &'static str, accessor: fn(&R) -> CellValue<'_>) -> Self {
        Self {
            id,
            header,
            filter: None,
            sortable: true,
            hideable: true,
            accessor,
        }
    }

    pub fn with_filter(mut self, kind: FilterKind) -> Self {
        self.filter = Some(kind);
        self
    }

    pub fn value<'r>(&self, row: &'r R) -> CellValue<'r> {
        (self.accessor)(row)
    }
}

/// Ordered set of columns
#[derive(Serialize)]
#[serde(bound = "")]
pub struct TableDefinition<R> {
    columns: Vec<ColumnDef<R>>,
}

impl<R> TableDefinition<R> {
    pub fn new(columns: Vec<ColumnDef<R>>) -> Self {
        Self { columns }
    }

    pub fn columns(&self) -> &[ColumnDef<R>] {
        &self.columns
    }

    pub fn column(&self, id: &str) -> Option<&ColumnDef<R>> {
        self.columns.iter().find(|c| c.id == id)
    }

    /// Declared kind of a filterable column
    pub fn filter_kind_of(&self, id: &str) -> Option<FilterKind> {
        self.column(id).and_then(|c| c.filter)
    }

    pub fn sortable_ids(&self) -> Vec<&'static str> {
        self.columns
            .iter()
            .filter(|c| c.sortable)
            .map(|c| c.id)
            .collect()
    }
}

impl<R> FilterKindLookup for TableDefinition<R> {
    fn filter_kind(&self, column_id: &str) -> FilterKind {
        self.filter_kind_of(column_id).unwrap_or(FilterKind::Text)
    }
}

type MovieColumn = ColumnDef<MovieRecord>;

static MOVIES_TABLE: LazyLock<TableDefinition<MovieRecord>> = LazyLock::new(|| {
    TableDefinition::new(vec![
        MovieColumn::new("id", "ID", |m| CellValue::Integer(m.id)).with_filter(FilterKind::Text),
        MovieColumn::new("title", "Title", |m| CellValue::Text(&m.title))
            .with_filter(FilterKind::Text),
        MovieColumn::new("popularity", "Popularity", |m| CellValue::Number(m.popularity))
            .with_filter(FilterKind::Range),
        MovieColumn::new("vote_average", "Vote average", |m| {
            CellValue::Number(m.vote_average)
        })
        .with_filter(FilterKind::Range),
        MovieColumn::new("release_date", "Release date", |m| {
            CellValue::Text(&m.release_date)
        })
        .with_filter(FilterKind::Text),
    ])
});

/// The movies table
pub fn movies_table() -> &'static TableDefinition<MovieRecord> {
    &MOVIES_TABLE
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn movie_columns_declare_kinds() {
        let table = movies_table();
        assert_eq!(table.filter_kind_of("title"), Some(FilterKind::Text));
        assert_eq!(table.filter_kind_of("vote_average"), Some(FilterKind::Range));
        assert_eq!(table.filter_kind_of("popularity"), Some(FilterKind::Range));
        assert_eq!(table.filter_kind_of("overview"), None);

        assert_eq!(table.filter_kind("popularity"), FilterKind::Range);
        assert_eq!(table.filter_kind("overview"), FilterKind::Text);
    }

    #[test]
    fn accessors_read_record_fields() {
        let movie = MovieRecord {
            id: 7,
            title: "Alien".into(),
            overview: String::new(),
            release_date: "1979-05-25".into(),
            vote_average: 8.1,
            popularity: 40.0,
            poster_path: None,
        };
        let table = movies_table();
        let value = |id| table.column(id).map(|c| c.value(&movie));

        assert_eq!(value("id"), Some(CellValue::Integer(7)));
        assert_eq!(value("title"), Some(CellValue::Text("Alien")));
        assert_eq!(value("vote_average"), Some(CellValue::Number(8.1)));
    }

    #[test]
    fn cell_coercions() {
        assert_eq!(CellValue::Text(" 7.5").as_number(), Some(7.5));
        assert_eq!(CellValue::Text("1999-03-31").as_number(), None);
        assert_eq!(CellValue::Integer(603).to_text(), "603");
        assert_eq!(
            CellValue::Number(2.5).compare(&CellValue::Number(10.0)),
            Ordering::Less
        );
        assert_eq!(
            CellValue::Text("b").compare(&CellValue::Text("a")),
            Ordering::Greater
        );
    }

    #[test]
    fn serializes_without_accessor() {
        let json = serde_json::to_value(movies_table()).unwrap();
        let first = &json["columns"][0];
        assert_eq!(first["id"], "id");
        assert_eq!(first["filter"], "text");
        assert!(first.get("accessor").is_none());
        assert_eq!(json["columns"][3]["filter"], "range");
    }
}
