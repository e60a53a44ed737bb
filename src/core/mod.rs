//! Record model, classification, deduplication and aggregation.
//!
//! Everything in this module works on already-extracted
//! [`InvoiceRecord`]s and has no XML or archive dependency.

pub mod aggregate;
pub mod catalogs;
pub mod dedup;
mod error;
pub mod filter;
pub mod gate;
mod ledger;
mod numeric;
mod types;

pub use aggregate::{
    FieldSums, FlagSummary, GroupKey, GroupRow, flag_summary, group_sums, sum_fields,
    sum_named_fields,
};
pub use dedup::{
    DuplicateGroup, duplicate_groups, filter_new_against_existing, purge_duplicates_within,
};
pub use error::*;
pub use filter::{RecordFilter, issuer_options, latest_period, periods};
pub use gate::{batch_matches_role, check_batch_role};
pub use ledger::*;
pub use numeric::*;
pub use types::*;
