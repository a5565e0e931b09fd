//! Record types - the four kinds held by the store
//!
//! Every kind has an opaque string identifier and a fixed set of scalar
//! fields. Relational fields are not stored on the record; they are
//! declared in the [`catalog`](crate::catalog) and resolved on demand.

pub mod account;
pub mod membership_tier;
pub mod post;
pub mod profile;

pub use account::{Account, AccountDraft, AccountPatch};
pub use membership_tier::{MembershipTier, MembershipTierDraft, MembershipTierPatch};
pub use post::{Post, PostDraft, PostPatch};
pub use profile::{Profile, ProfileDraft, ProfilePatch, Sex};

use crate::{Error, Result};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::str::FromStr;

/// The record kinds known to the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RecordKind {
    Account,
    Profile,
    Post,
    MembershipTier,
}

impl RecordKind {
    /// Get the singular name, as used for singular root fields
    pub fn as_str(&self) -> &'static str {
        match self {
            RecordKind::Account => "account",
            RecordKind::Profile => "profile",
            RecordKind::Post => "post",
            RecordKind::MembershipTier => "membershipTier",
        }
    }

    /// Get the plural name, as used for plural root fields
    pub fn plural(&self) -> &'static str {
        match self {
            RecordKind::Account => "accounts",
            RecordKind::Profile => "profiles",
            RecordKind::Post => "posts",
            RecordKind::MembershipTier => "membershipTiers",
        }
    }

    /// Get all record kinds
    pub fn all() -> &'static [RecordKind] {
        &[
            RecordKind::Account,
            RecordKind::Profile,
            RecordKind::Post,
            RecordKind::MembershipTier,
        ]
    }

    /// Stored scalar attributes of this kind, in declaration order
    pub fn scalar_fields(&self) -> &'static [&'static str] {
        match self {
            RecordKind::Account => Account::FIELDS,
            RecordKind::Profile => Profile::FIELDS,
            RecordKind::Post => Post::FIELDS,
            RecordKind::MembershipTier => MembershipTier::FIELDS,
        }
    }

    pub fn is_scalar(&self, field: &str) -> bool {
        self.scalar_fields().contains(&field)
    }
}

impl FromStr for RecordKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "account" | "accounts" => Ok(RecordKind::Account),
            "profile" | "profiles" => Ok(RecordKind::Profile),
            "post" | "posts" => Ok(RecordKind::Post),
            "membershipTier" | "membershipTiers" | "membership-tier" | "membership-tiers" => {
                Ok(RecordKind::MembershipTier)
            }
            _ => Err(Error::Validation(format!("Unknown record kind: {}", s))),
        }
    }
}

impl std::fmt::Display for RecordKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Dynamic, read-only view of a stored record.
///
/// This is what predicates and the resolver operate on, so that one
/// generic code path serves every kind.
pub trait RecordView {
    fn kind(&self) -> RecordKind;

    fn id(&self) -> &str;

    /// Value of a stored scalar field by its wire name.
    ///
    /// Absent optional fields are `Some(Value::Null)`; `None` means the
    /// kind has no such field.
    fn field(&self, name: &str) -> Option<Value>;
}

/// A concrete record kind with its creatable and patchable field sets.
pub trait Record: RecordView + Clone + Serialize + Send + Sync + 'static {
    const KIND: RecordKind;

    /// Wire names of the stored scalar fields
    const FIELDS: &'static [&'static str];

    /// Fields accepted on create (everything except the identifier)
    type Draft: DeserializeOwned + Send;

    /// Fields accepted on a partial update
    type Patch: DeserializeOwned + Default + Send;

    /// Build the stored record from a freshly allocated identifier
    fn from_draft(id: String, draft: Self::Draft) -> Self;

    /// Shallow merge: fields absent from the patch are left untouched
    fn apply(&mut self, patch: Self::Patch);
}

/// Decode a JSON object into a draft or patch, reporting failures as
/// validation errors.
pub fn decode<T: DeserializeOwned>(kind: RecordKind, value: Value) -> Result<T> {
    serde_json::from_value(value)
        .map_err(|e| Error::Validation(format!("invalid {} fields: {}", kind, e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_kind_roundtrip() {
        for kind in RecordKind::all() {
            assert_eq!(kind.as_str().parse::<RecordKind>().unwrap(), *kind);
            assert_eq!(kind.plural().parse::<RecordKind>().unwrap(), *kind);
        }
        assert!("users".parse::<RecordKind>().is_err());
    }

    #[test]
    fn test_scalar_fields_are_readable() {
        let account = Account::from_draft("a1".into(), AccountDraft::default());
        let profile = Profile::from_draft(
            "p1".into(),
            decode(RecordKind::Profile, serde_json::json!({"sex": "male", "accountId": "a1"})).unwrap(),
        );
        let post = Post::from_draft(
            "t1".into(),
            decode(RecordKind::Post, serde_json::json!({"title": "hi", "accountId": "a1"})).unwrap(),
        );
        let tier = MembershipTier::from_draft("basic".into(), MembershipTierDraft::default());

        let views: [&dyn RecordView; 4] = [&account, &profile, &post, &tier];
        for view in views {
            for field in view.kind().scalar_fields() {
                assert!(view.field(field).is_some(), "{} has no field {}", view.kind(), field);
            }
            assert!(view.field("nope").is_none());
            assert_eq!(view.field("id"), Some(Value::String(view.id().to_string())));
        }
    }

    #[test]
    fn test_decode_rejects_unknown_fields() {
        let err = decode::<PostPatch>(RecordKind::Post, serde_json::json!({"accountId": "a1"}))
            .unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
    }
}
