//! Storage Layer - in-memory tables, one per record kind
//!
//! The four tables are owned by a single [`Store`] value which callers pass
//! explicitly to the enforcer (`&mut Store`) and the resolver (`&Store`).

pub mod predicate;
pub mod store;
pub mod table;

pub use predicate::Predicate;
pub use store::{HasTable, Store, StoreStats};
pub use table::Table;
