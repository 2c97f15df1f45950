//! Column filter state and its query-string form
//!
//! - `types` - filter kinds, values, and per-column state
//! - `predicates` - per-cell text and range matching
//! - `codec` - encoding filters into and out of a query string
//! - `controller` - keeps row-model state and the query string in step

mod codec;
mod controller;
mod predicates;
mod types;

pub use codec::{DecodedParam, DecodedValue, QueryParams, clear, decode, encode, parse_bound};
pub use controller::{ApplyOutcome, FilterController, FilterError, FilterTarget, QueryLocation};
pub use predicates::{TextMatch, range_matches, text_matches};
pub use types::{
    ColumnFilterState, FilterKind, FilterKindLookup, FilterValue, RangeBound, RangeFilter,
};
