use super::{Record, RecordKind, RecordView};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

/// An account, the owner of profiles and posts.
///
/// `subscribed_to_account_ids` is ordered but carries set semantics: the
/// subscribe/unsubscribe operations never insert a duplicate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    pub id: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    #[serde(default)]
    pub subscribed_to_account_ids: Vec<String>,
}

impl Account {
    /// Check whether `id` is present in this account's subscription list
    pub fn lists(&self, id: &str) -> bool {
        self.subscribed_to_account_ids.iter().any(|s| s == id)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct AccountDraft {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct AccountPatch {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    /// Set only by the enforcer's subscription maintenance; never read from
    /// a request body
    #[serde(skip_deserializing)]
    pub subscribed_to_account_ids: Option<Vec<String>>,
}

impl RecordView for Account {
    fn kind(&self) -> RecordKind {
        RecordKind::Account
    }

    fn id(&self) -> &str {
        &self.id
    }

    fn field(&self, name: &str) -> Option<Value> {
        let value = match name {
            "id" => json!(self.id),
            "firstName" => json!(self.first_name),
            "lastName" => json!(self.last_name),
            "email" => json!(self.email),
            "subscribedToAccountIds" => json!(self.subscribed_to_account_ids),
            _ => return None,
        };
        Some(value)
    }
}

impl Record for Account {
    const KIND: RecordKind = RecordKind::Account;
    const FIELDS: &'static [&'static str] =
        &["id", "firstName", "lastName", "email", "subscribedToAccountIds"];

    type Draft = AccountDraft;
    type Patch = AccountPatch;

    fn from_draft(id: String, draft: AccountDraft) -> Self {
        Self {
            id,
            first_name: draft.first_name,
            last_name: draft.last_name,
            email: draft.email,
            subscribed_to_account_ids: Vec::new(),
        }
    }

    fn apply(&mut self, patch: AccountPatch) {
        if let Some(first_name) = patch.first_name {
            self.first_name = Some(first_name);
        }
        if let Some(last_name) = patch.last_name {
            self.last_name = Some(last_name);
        }
        if let Some(email) = patch.email {
            self.email = Some(email);
        }
        if let Some(ids) = patch.subscribed_to_account_ids {
            self.subscribed_to_account_ids = ids;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_patch_is_shallow() {
        let mut account = Account::from_draft(
            "a1".into(),
            AccountDraft {
                first_name: Some("Ada".into()),
                last_name: Some("Lovelace".into()),
                email: None,
            },
        );

        account.apply(AccountPatch {
            email: Some("ada@example.com".into()),
            ..Default::default()
        });

        assert_eq!(account.first_name.as_deref(), Some("Ada"));
        assert_eq!(account.last_name.as_deref(), Some("Lovelace"));
        assert_eq!(account.email.as_deref(), Some("ada@example.com"));
        assert!(account.subscribed_to_account_ids.is_empty());
    }

    #[test]
    fn test_patch_rejects_subscription_list() {
        let err = crate::record::decode::<AccountPatch>(
            RecordKind::Account,
            json!({ "subscribedToAccountIds": ["ghost", "ghost"] }),
        )
        .unwrap_err();
        assert!(matches!(err, crate::Error::Validation(_)));

        let patch: AccountPatch =
            crate::record::decode(RecordKind::Account, json!({ "email": "a@b.c" })).unwrap();
        assert_eq!(patch.subscribed_to_account_ids, None);
    }

    #[test]
    fn test_wire_names_are_camel_case() {
        let account = Account::from_draft("a1".into(), AccountDraft::default());
        let json = serde_json::to_value(&account).unwrap();
        assert!(json.get("subscribedToAccountIds").is_some());
        assert!(json.get("firstName").is_some());
    }
}
