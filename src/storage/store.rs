//! The owned state object holding every table

use serde::Serialize;
use crate::record::{Account, MembershipTier, Post, Profile, Record, RecordKind, RecordView};
use super::{Predicate, Table};

/// All tables of the service.
///
/// There is no internal locking: every method runs to completion on the
/// caller's thread. Shared use across tasks goes through a lock held by
/// the owner (see [`crate::server::AppState`]).
#[derive(Debug, Clone, Default)]
pub struct Store {
    accounts: Table<Account>,
    profiles: Table<Profile>,
    posts: Table<Post>,
    membership_tiers: Table<MembershipTier>,
}

/// Typed access to the table holding `R`.
pub trait HasTable<R: Record> {
    fn table(&self) -> &Table<R>;
    fn table_mut(&mut self) -> &mut Table<R>;
}

macro_rules! has_table {
    ($record:ty, $field:ident) => {
        impl HasTable<$record> for Store {
            fn table(&self) -> &Table<$record> {
                &self.$field
            }

            fn table_mut(&mut self) -> &mut Table<$record> {
                &mut self.$field
            }
        }
    };
}

has_table!(Account, accounts);
has_table!(Profile, profiles);
has_table!(Post, posts);
has_table!(MembershipTier, membership_tiers);

impl Store {
    /// Create a store with empty tables
    pub fn new() -> Self {
        Self::default()
    }

    pub fn accounts(&self) -> &Table<Account> {
        &self.accounts
    }

    pub fn profiles(&self) -> &Table<Profile> {
        &self.profiles
    }

    pub fn posts(&self) -> &Table<Post> {
        &self.posts
    }

    pub fn membership_tiers(&self) -> &Table<MembershipTier> {
        &self.membership_tiers
    }

    /// Point lookup for any kind
    pub fn get(&self, kind: RecordKind, id: &str) -> Option<&dyn RecordView> {
        match kind {
            RecordKind::Account => self.accounts.get(id).map(|r| r as &dyn RecordView),
            RecordKind::Profile => self.profiles.get(id).map(|r| r as &dyn RecordView),
            RecordKind::Post => self.posts.get(id).map(|r| r as &dyn RecordView),
            RecordKind::MembershipTier => {
                self.membership_tiers.get(id).map(|r| r as &dyn RecordView)
            }
        }
    }

    /// Predicate scan for any kind, in insertion order
    pub fn scan(&self, kind: RecordKind, predicate: Option<&Predicate>) -> Vec<&dyn RecordView> {
        match kind {
            RecordKind::Account => views(&self.accounts, predicate),
            RecordKind::Profile => views(&self.profiles, predicate),
            RecordKind::Post => views(&self.posts, predicate),
            RecordKind::MembershipTier => views(&self.membership_tiers, predicate),
        }
    }

    /// Get statistics about the store
    pub fn stats(&self) -> StoreStats {
        StoreStats {
            accounts: self.accounts.len(),
            profiles: self.profiles.len(),
            posts: self.posts.len(),
            membership_tiers: self.membership_tiers.len(),
        }
    }
}

fn views<'a, R: Record>(table: &'a Table<R>, predicate: Option<&Predicate>) -> Vec<&'a dyn RecordView> {
    table
        .find_many(predicate)
        .into_iter()
        .map(|r| r as &dyn RecordView)
        .collect()
}

/// Record counts per table
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreStats {
    pub accounts: usize,
    pub profiles: usize,
    pub posts: usize,
    pub membership_tiers: usize,
}

impl StoreStats {
    pub fn total(&self) -> usize {
        self.accounts + self.profiles + self.posts + self.membership_tiers
    }
}

impl std::fmt::Display for StoreStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Store Statistics:")?;
        writeln!(f, "  Accounts: {}", self.accounts)?;
        writeln!(f, "  Profiles: {}", self.profiles)?;
        writeln!(f, "  Posts: {}", self.posts)?;
        write!(f, "  Membership tiers: {}", self.membership_tiers)
    }
}
