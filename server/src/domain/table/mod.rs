//! Movie table: columns, records, and the row model over them

mod columns;
mod record;
mod row_model;

pub use columns::{CellValue, ColumnDef, TableDefinition, movies_table};
pub use record::MovieRecord;
pub use row_model::{ColumnSort, RowModel, SortDirection, TablePage};
