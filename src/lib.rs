//! # Socialgraph - In-memory relational data service
//!
//! Four record kinds (accounts, profiles, posts, membership tiers) held in
//! memory and exposed through flat CRUD operations and a graph-query layer.
//!
//! Socialgraph provides:
//! - An owned [`Store`] of one in-memory table per record kind
//! - A static relationship [`catalog`] describing how the kinds relate
//! - An [`IntegrityEnforcer`] that keeps references valid across mutations
//! - A nested query [`Resolver`] that walks the catalog with per-pass memoization
//! - An axum HTTP surface and a small CLI around all of the above

pub mod record;
pub mod catalog;
pub mod storage;
pub mod integrity;
pub mod query;
pub mod server;
pub mod config;
pub mod ui;

// Re-exports for convenient access
pub use record::{
    Account, AccountDraft, AccountPatch, MembershipTier, MembershipTierDraft,
    MembershipTierPatch, Post, PostDraft, PostPatch, Profile, ProfileDraft, ProfilePatch,
    Record, RecordKind, RecordView, Sex,
};
pub use catalog::{Cardinality, Relation, ResolutionRule};
pub use storage::{Predicate, Store, Table};
pub use integrity::IntegrityEnforcer;
pub use query::{MutationEngine, QueryEngine, Resolver, ResolverStats, Selection};

/// Result type alias for Socialgraph operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for Socialgraph operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A store-level lookup by identifier found nothing
    #[error("{kind} not found: {id}")]
    NotFound { kind: RecordKind, id: String },

    /// A mutation referenced a missing record or asked for an illegal link change
    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    /// Malformed selection, arguments or draft
    #[error("Validation error: {0}")]
    Validation(String),

    /// The catalog and the record field sets disagree
    #[error("Invariant violation: {0}")]
    InvariantViolation(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Whether the caller (rather than the service) is at fault
    pub fn is_client_error(&self) -> bool {
        !matches!(
            self,
            Error::InvariantViolation(_) | Error::Io(_)
        )
    }
}
