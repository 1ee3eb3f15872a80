//! Zone record management
//!
//! The record model and everything needed to change zone data safely:
//!
//! - [`codec`]: the `knotc zone-read` line format
//! - [`validation`]: per-type checks and normalization
//! - [`access`]: the zone allow-list
//! - [`transaction`]: begin/commit/abort guard
//! - [`store`]: list, get, create, update, delete and reload

pub mod access;
pub mod codec;
pub mod errors;
pub mod name;
pub mod record;
pub mod store;
pub mod transaction;
pub mod validation;

pub use access::AllowList;
pub use errors::{ParseError, ValidationError, ZoneError, ZoneResult};
pub use record::{Record, RecordType, UpdateDelta, DEFAULT_TTL};
pub use store::{CreateOutcome, RecordStore};
pub use transaction::{Mutation, Transaction};
