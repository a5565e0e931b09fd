//! Relationship Catalog - static declaration of how record kinds relate
//!
//! All relations reduce to five resolution rules:
//! - `ForeignKey`: the target stores the source id (account → posts)
//! - `Reference`: the source stores the target id (post → account)
//! - `IdList`: the source stores a list of target ids
//! - `ReverseIdList`: the target stores a list that contains the source id
//! - `DerivedJoin`: two hops through an intermediate kind
//!
//! The resolver consults only this table, so a new relation is one more
//! entry in [`CATALOG`].

use crate::record::RecordKind;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Cardinality {
    /// Resolves to a single object or `null`
    One,
    /// Resolves to a (possibly empty) list
    Many,
}

/// How the related records are looked up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResolutionRule {
    /// `find_many(target, foreign_key == source.id)`
    ForeignKey { foreign_key: &'static str },
    /// `find_one(target, id == source.key_field)`; an absent key yields nothing
    Reference { key_field: &'static str },
    /// `find_many(target, id ∈ source.list_field)`
    IdList { list_field: &'static str },
    /// `find_many(target, target.list_field ∋ source.id)`
    ReverseIdList { list_field: &'static str },
    /// Collect the distinct `key_field` values of the `via` records whose
    /// `foreign_key` is the source id, then `find_many(target, id ∈ keys)`
    DerivedJoin {
        via: RecordKind,
        foreign_key: &'static str,
        key_field: &'static str,
    },
}

impl ResolutionRule {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResolutionRule::ForeignKey { .. } => "foreign-key",
            ResolutionRule::Reference { .. } => "reference",
            ResolutionRule::IdList { .. } => "id-list",
            ResolutionRule::ReverseIdList { .. } => "reverse-id-list",
            ResolutionRule::DerivedJoin { .. } => "derived-join",
        }
    }
}

impl std::fmt::Display for ResolutionRule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A relational field on a source kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Relation {
    pub source: RecordKind,
    /// Field name as it appears in a selection
    pub field: &'static str,
    pub target: RecordKind,
    pub cardinality: Cardinality,
    pub rule: ResolutionRule,
}

pub static CATALOG: &[Relation] = &[
    Relation {
        source: RecordKind::Account,
        field: "profiles",
        target: RecordKind::Profile,
        cardinality: Cardinality::Many,
        rule: ResolutionRule::ForeignKey { foreign_key: "accountId" },
    },
    Relation {
        source: RecordKind::Account,
        field: "posts",
        target: RecordKind::Post,
        cardinality: Cardinality::Many,
        rule: ResolutionRule::ForeignKey { foreign_key: "accountId" },
    },
    Relation {
        source: RecordKind::Account,
        field: "membershipTiers",
        target: RecordKind::MembershipTier,
        cardinality: Cardinality::Many,
        rule: ResolutionRule::DerivedJoin {
            via: RecordKind::Profile,
            foreign_key: "accountId",
            key_field: "membershipTierId",
        },
    },
    // Accounts this account lists in its own subscribedToAccountIds
    Relation {
        source: RecordKind::Account,
        field: "subscribedToAccount",
        target: RecordKind::Account,
        cardinality: Cardinality::Many,
        rule: ResolutionRule::IdList { list_field: "subscribedToAccountIds" },
    },
    // Accounts whose subscribedToAccountIds list this account
    Relation {
        source: RecordKind::Account,
        field: "accountSubscribedTo",
        target: RecordKind::Account,
        cardinality: Cardinality::Many,
        rule: ResolutionRule::ReverseIdList { list_field: "subscribedToAccountIds" },
    },
    Relation {
        source: RecordKind::Profile,
        field: "account",
        target: RecordKind::Account,
        cardinality: Cardinality::One,
        rule: ResolutionRule::Reference { key_field: "accountId" },
    },
    Relation {
        source: RecordKind::Profile,
        field: "membershipTier",
        target: RecordKind::MembershipTier,
        cardinality: Cardinality::One,
        rule: ResolutionRule::Reference { key_field: "membershipTierId" },
    },
    Relation {
        source: RecordKind::Post,
        field: "account",
        target: RecordKind::Account,
        cardinality: Cardinality::One,
        rule: ResolutionRule::Reference { key_field: "accountId" },
    },
    Relation {
        source: RecordKind::MembershipTier,
        field: "profiles",
        target: RecordKind::Profile,
        cardinality: Cardinality::Many,
        rule: ResolutionRule::ForeignKey { foreign_key: "membershipTierId" },
    },
];

/// Find the relation declared for `field` on `source`
pub fn lookup(source: RecordKind, field: &str) -> Option<&'static Relation> {
    CATALOG
        .iter()
        .find(|relation| relation.source == source && relation.field == field)
}

/// All relations declared on `source`
pub fn relations_of(source: RecordKind) -> impl Iterator<Item = &'static Relation> {
    CATALOG.iter().filter(move |relation| relation.source == source)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_lookup() {
        let relation = lookup(RecordKind::Account, "posts").unwrap();
        assert_eq!(relation.target, RecordKind::Post);
        assert_eq!(relation.cardinality, Cardinality::Many);

        assert!(lookup(RecordKind::Post, "posts").is_none());
        assert!(lookup(RecordKind::Account, "title").is_none());
    }

    #[test]
    fn test_relation_names_do_not_shadow_scalars() {
        for relation in CATALOG {
            assert!(
                !relation.source.is_scalar(relation.field),
                "{}.{} is both scalar and relational",
                relation.source,
                relation.field
            );
        }
    }

    #[test]
    fn test_relation_names_are_unique_per_kind() {
        let mut seen = HashSet::new();
        for relation in CATALOG {
            assert!(seen.insert((relation.source, relation.field)));
        }
    }

    #[test]
    fn test_rule_fields_exist_on_their_kinds() {
        for relation in CATALOG {
            match relation.rule {
                ResolutionRule::ForeignKey { foreign_key } => {
                    assert!(relation.target.is_scalar(foreign_key));
                }
                ResolutionRule::Reference { key_field } => {
                    assert!(relation.source.is_scalar(key_field));
                    assert_eq!(relation.cardinality, Cardinality::One);
                }
                ResolutionRule::IdList { list_field } => {
                    assert!(relation.source.is_scalar(list_field));
                }
                ResolutionRule::ReverseIdList { list_field } => {
                    assert!(relation.target.is_scalar(list_field));
                }
                ResolutionRule::DerivedJoin { via, foreign_key, key_field } => {
                    assert!(via.is_scalar(foreign_key));
                    assert!(via.is_scalar(key_field));
                }
            }
        }
    }

    #[test]
    fn test_relations_of() {
        let fields: Vec<_> = relations_of(RecordKind::Account).map(|r| r.field).collect();
        assert_eq!(
            fields,
            vec!["profiles", "posts", "membershipTiers", "subscribedToAccount", "accountSubscribedTo"]
        );
    }
}
