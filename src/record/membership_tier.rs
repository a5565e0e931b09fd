use super::{Record, RecordKind, RecordView};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

/// A membership tier referenced by profiles.
///
/// Tiers are seeded from configuration; deleting one leaves referencing
/// profiles untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MembershipTier {
    pub id: String,
    pub discount: Option<f64>,
    pub month_posts_limit: Option<i64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct MembershipTierDraft {
    pub discount: Option<f64>,
    pub month_posts_limit: Option<i64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct MembershipTierPatch {
    pub discount: Option<f64>,
    pub month_posts_limit: Option<i64>,
}

impl RecordView for MembershipTier {
    fn kind(&self) -> RecordKind {
        RecordKind::MembershipTier
    }

    fn id(&self) -> &str {
        &self.id
    }

    fn field(&self, name: &str) -> Option<Value> {
        let value = match name {
            "id" => json!(self.id),
            "discount" => json!(self.discount),
            "monthPostsLimit" => json!(self.month_posts_limit),
            _ => return None,
        };
        Some(value)
    }
}

impl Record for MembershipTier {
    const KIND: RecordKind = RecordKind::MembershipTier;
    const FIELDS: &'static [&'static str] = &["id", "discount", "monthPostsLimit"];

    type Draft = MembershipTierDraft;
    type Patch = MembershipTierPatch;

    fn from_draft(id: String, draft: MembershipTierDraft) -> Self {
        Self {
            id,
            discount: draft.discount,
            month_posts_limit: draft.month_posts_limit,
        }
    }

    fn apply(&mut self, patch: MembershipTierPatch) {
        if let Some(discount) = patch.discount {
            self.discount = Some(discount);
        }
        if let Some(limit) = patch.month_posts_limit {
            self.month_posts_limit = Some(limit);
        }
    }
}
