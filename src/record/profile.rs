use super::{Record, RecordKind, RecordView};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sex {
    Male,
    Female,
}

impl Sex {
    pub fn as_str(&self) -> &'static str {
        match self {
            Sex::Male => "male",
            Sex::Female => "female",
        }
    }
}

/// Personal details of an account. At most one per account.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    pub id: String,
    pub avatar: Option<String>,
    pub sex: Sex,
    /// Birthday as a numeric timestamp
    pub birthday: Option<f64>,
    pub country: Option<String>,
    pub street: Option<String>,
    pub city: Option<String>,
    /// Validated on create only; may dangle after the tier is deleted
    pub membership_tier_id: Option<String>,
    pub account_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ProfileDraft {
    pub avatar: Option<String>,
    pub sex: Sex,
    pub birthday: Option<f64>,
    pub country: Option<String>,
    pub street: Option<String>,
    pub city: Option<String>,
    pub membership_tier_id: Option<String>,
    pub account_id: String,
}

impl ProfileDraft {
    pub fn new(account_id: impl Into<String>, sex: Sex) -> Self {
        Self {
            avatar: None,
            sex,
            birthday: None,
            country: None,
            street: None,
            city: None,
            membership_tier_id: None,
            account_id: account_id.into(),
        }
    }

    pub fn with_membership_tier(mut self, tier_id: impl Into<String>) -> Self {
        self.membership_tier_id = Some(tier_id.into());
        self
    }
}

/// The owning account cannot be changed after creation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ProfilePatch {
    pub avatar: Option<String>,
    pub sex: Option<Sex>,
    pub birthday: Option<f64>,
    pub country: Option<String>,
    pub street: Option<String>,
    pub city: Option<String>,
    pub membership_tier_id: Option<String>,
}

impl RecordView for Profile {
    fn kind(&self) -> RecordKind {
        RecordKind::Profile
    }

    fn id(&self) -> &str {
        &self.id
    }

    fn field(&self, name: &str) -> Option<Value> {
        let value = match name {
            "id" => json!(self.id),
            "avatar" => json!(self.avatar),
            "sex" => json!(self.sex.as_str()),
            "birthday" => json!(self.birthday),
            "country" => json!(self.country),
            "street" => json!(self.street),
            "city" => json!(self.city),
            "membershipTierId" => json!(self.membership_tier_id),
            "accountId" => json!(self.account_id),
            _ => return None,
        };
        Some(value)
    }
}

impl Record for Profile {
    const KIND: RecordKind = RecordKind::Profile;
    const FIELDS: &'static [&'static str] = &[
        "id",
        "avatar",
        "sex",
        "birthday",
        "country",
        "street",
        "city",
        "membershipTierId",
        "accountId",
    ];

    type Draft = ProfileDraft;
    type Patch = ProfilePatch;

    fn from_draft(id: String, draft: ProfileDraft) -> Self {
        Self {
            id,
            avatar: draft.avatar,
            sex: draft.sex,
            birthday: draft.birthday,
            country: draft.country,
            street: draft.street,
            city: draft.city,
            membership_tier_id: draft.membership_tier_id,
            account_id: draft.account_id,
        }
    }

    fn apply(&mut self, patch: ProfilePatch) {
        if let Some(avatar) = patch.avatar {
            self.avatar = Some(avatar);
        }
        if let Some(sex) = patch.sex {
            self.sex = sex;
        }
        if let Some(birthday) = patch.birthday {
            self.birthday = Some(birthday);
        }
        if let Some(country) = patch.country {
            self.country = Some(country);
        }
        if let Some(street) = patch.street {
            self.street = Some(street);
        }
        if let Some(city) = patch.city {
            self.city = Some(city);
        }
        if let Some(tier_id) = patch.membership_tier_id {
            self.membership_tier_id = Some(tier_id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sex_is_restricted() {
        let ok: std::result::Result<ProfileDraft, _> =
            serde_json::from_value(json!({"sex": "female", "accountId": "a1"}));
        assert_eq!(ok.unwrap().sex, Sex::Female);

        let bad: std::result::Result<ProfileDraft, _> =
            serde_json::from_value(json!({"sex": "other", "accountId": "a1"}));
        assert!(bad.is_err());
    }

    #[test]
    fn test_patch_cannot_move_profile() {
        let bad: std::result::Result<ProfilePatch, _> =
            serde_json::from_value(json!({"accountId": "a2"}));
        assert!(bad.is_err());
    }
}
