//! Row model: filter, sort and paginate one snapshot of rows

use std::cmp::Reverse;

use serde::{Deserialize, Serialize};

use super::columns::{CellValue, TableDefinition};
use crate::domain::filters::{
    ColumnFilterState, FilterKind, FilterTarget, FilterValue, range_matches, text_matches,
};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Asc,
    #[default]
    Desc,
}

/// Requested ordering on one column
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnSort {
    pub column: String,
    pub direction: SortDirection,
}

/// One page of rows plus the size of the filtered set
#[derive(Debug)]
pub struct TablePage<'a, R> {
    pub rows: Vec<&'a R>,
    pub total_items: u64,
}

struct Ranked<'a, R> {
    row: &'a R,
    rank: u32,
}

/// Filter and sort state over a borrowed set of rows
pub struct RowModel<'a, R> {
    table: &'a TableDefinition<R>,
    rows: &'a [R],
    filters: ColumnFilterState,
    sort: Option<ColumnSort>,
}

impl<'a, R> RowModel<'a, R> {
    pub fn new(table: &'a TableDefinition<R>, rows: &'a [R]) -> Self {
        Self {
            table,
            rows,
            filters: ColumnFilterState::new(),
            sort: None,
        }
    }

    pub fn filters(&self) -> &ColumnFilterState {
        &self.filters
    }

    pub fn set_sort(&mut self, sort: Option<ColumnSort>) {
        self.sort = sort;
    }

    /// Rows passing every column filter, in display order.
    ///
    /// With no sort requested and a text filter active, closer fuzzy matches
    /// come first.
    pub fn filtered_rows(&self) -> Vec<&'a R> {
        let mut ranked: Vec<Ranked<'a, R>> = self
            .rows
            .iter()
            .filter_map(|row| self.row_rank(row).map(|rank| Ranked { row, rank }))
            .collect();

        match &self.sort {
            Some(sort) => {
                if let Some(column) = self.table.column(&sort.column) {
                    ranked.sort_by(|a, b| {
                        let ord = column.value(a.row).compare(&column.value(b.row));
                        match sort.direction {
                            SortDirection::Asc => ord,
                            SortDirection::Desc => ord.reverse(),
                        }
                    });
                }
            }
            None if self.has_text_filter() => ranked.sort_by_key(|r| Reverse(r.rank)),
            None => {}
        }

        ranked.into_iter().map(|r| r.row).collect()
    }

    /// 1-based page of the filtered rows
    pub fn page(&self, page: u32, limit: u32) -> TablePage<'a, R> {
        let rows = self.filtered_rows();
        let total_items = rows.len() as u64;
        let offset = (page.saturating_sub(1) as usize).saturating_mul(limit as usize);

        TablePage {
            rows: rows.into_iter().skip(offset).take(limit as usize).collect(),
            total_items,
        }
    }

    fn has_text_filter(&self) -> bool {
        self.filters
            .iter()
            .any(|(_, v)| matches!(v, FilterValue::Text(q) if !q.trim().is_empty()))
    }

    /// Sum of text ranks when the row passes every filter
    fn row_rank(&self, row: &R) -> Option<u32> {
        let mut rank = 0u32;
        for (column_id, filter) in self.filters.iter() {
            let Some(column) = self.table.column(column_id) else {
                continue;
            };
            rank = rank.saturating_add(cell_rank(column.value(row), filter)?);
        }
        Some(rank)
    }
}

fn cell_rank(cell: CellValue<'_>, filter: &FilterValue) -> Option<u32> {
    match filter {
        FilterValue::Text(query) => {
            let hit = text_matches(&cell.to_text(), query);
            hit.passed.then_some(hit.rank)
        }
        FilterValue::Range(range) => cell
            .as_number()
            .filter(|value| range_matches(*value, range))
            .map(|_| 0),
    }
}

impl<R> FilterTarget for RowModel<'_, R> {
    fn filter_kind_of(&self, column_id: &str) -> Option<FilterKind> {
        self.table.filter_kind_of(column_id)
    }

    fn column_filter(&self, column_id: &str) -> Option<&FilterValue> {
        self.filters.get(column_id)
    }

    fn set_column_filter(&mut self, column_id: &str, value: Option<FilterValue>) {
        match value {
            Some(value) => self.filters.set(column_id, value),
            None => {
                self.filters.remove(column_id);
            }
        }
    }
}
