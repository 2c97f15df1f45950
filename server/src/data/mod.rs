//! Data access layer
//!
//! - `catalog` - remote and file-backed movie catalogs plus the shared snapshot
//! - `error` - catalog error type

pub mod catalog;
pub mod error;

pub use catalog::{CatalogService, CatalogSource, FileCatalog, TmdbCatalog};
pub use error::CatalogError;
