//! Scan predicates understood by every table

use crate::record::RecordView;
use serde_json::Value;

/// A filter over one stored field.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Predicate {
    /// Field equals the literal
    Equals { field: &'static str, value: String },
    /// List field contains the literal
    Contains { field: &'static str, value: String },
    /// Field equals any of the literals
    EqualsAnyOf { field: &'static str, values: Vec<String> },
}

impl Predicate {
    pub fn equals(field: &'static str, value: impl Into<String>) -> Self {
        Predicate::Equals { field, value: value.into() }
    }

    pub fn contains(field: &'static str, value: impl Into<String>) -> Self {
        Predicate::Contains { field, value: value.into() }
    }

    pub fn equals_any_of(field: &'static str, values: Vec<String>) -> Self {
        Predicate::EqualsAnyOf { field, values }
    }

    /// Shorthand for an identifier lookup
    pub fn id(value: impl Into<String>) -> Self {
        Self::equals("id", value)
    }

    pub fn field(&self) -> &'static str {
        match self {
            Predicate::Equals { field, .. }
            | Predicate::Contains { field, .. }
            | Predicate::EqualsAnyOf { field, .. } => *field,
        }
    }

    /// The identifier this predicate pins down, if it is an id lookup
    pub fn as_id(&self) -> Option<&str> {
        match self {
            Predicate::Equals { field: "id", value } => Some(value),
            _ => None,
        }
    }

    /// Test a record against the predicate.
    ///
    /// A field the record does not have, or a value of the wrong shape,
    /// never matches.
    pub fn matches(&self, record: &dyn RecordView) -> bool {
        let Some(actual) = record.field(self.field()) else {
            return false;
        };

        match self {
            Predicate::Equals { value, .. } => actual.as_str() == Some(value.as_str()),
            Predicate::Contains { value, .. } => match actual {
                Value::Array(items) => items.iter().any(|item| item.as_str() == Some(value.as_str())),
                _ => false,
            },
            Predicate::EqualsAnyOf { values, .. } => actual
                .as_str()
                .is_some_and(|s| values.iter().any(|v| v == s)),
        }
    }
}

impl std::fmt::Display for Predicate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Predicate::Equals { field, value } => write!(f, "{} = {}", field, value),
            Predicate::Contains { field, value } => write!(f, "{} ∋ {}", field, value),
            Predicate::EqualsAnyOf { field, values } => {
                write!(f, "{} ∈ [{}]", field, values.join(", "))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::{Account, AccountDraft, Record};

    fn account(id: &str, subscribed: &[&str]) -> Account {
        let mut account = Account::from_draft(id.to_string(), AccountDraft::default());
        account.subscribed_to_account_ids = subscribed.iter().map(|s| s.to_string()).collect();
        account
    }

    #[test]
    fn test_equals() {
        let a = account("a1", &[]);
        assert!(Predicate::id("a1").matches(&a));
        assert!(!Predicate::id("a2").matches(&a));
        // optional field that is null
        assert!(!Predicate::equals("email", "x").matches(&a));
    }

    #[test]
    fn test_contains() {
        let a = account("a1", &["a2", "a3"]);
        assert!(Predicate::contains("subscribedToAccountIds", "a3").matches(&a));
        assert!(!Predicate::contains("subscribedToAccountIds", "a4").matches(&a));
        // scalar field is not a list
        assert!(!Predicate::contains("id", "a1").matches(&a));
    }

    #[test]
    fn test_equals_any_of() {
        let a = account("a1", &[]);
        assert!(Predicate::equals_any_of("id", vec!["a0".into(), "a1".into()]).matches(&a));
        assert!(!Predicate::equals_any_of("id", vec![]).matches(&a));
    }

    #[test]
    fn test_unknown_field_never_matches() {
        let a = account("a1", &[]);
        assert!(!Predicate::equals("title", "a1").matches(&a));
    }
}
