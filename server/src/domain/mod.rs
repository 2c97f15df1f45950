//! Domain logic for the movie table
//!
//! - `filters` - column filter model, predicates, and query-string sync
//! - `table` - table definition and the row model that applies filters

pub mod filters;
pub mod table;
