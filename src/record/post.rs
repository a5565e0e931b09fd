use super::{Record, RecordKind, RecordView};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    pub id: String,
    pub title: String,
    pub content: Option<String>,
    pub account_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct PostDraft {
    pub title: String,
    pub content: Option<String>,
    pub account_id: String,
}

impl PostDraft {
    pub fn new(account_id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            content: None,
            account_id: account_id.into(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct PostPatch {
    pub title: Option<String>,
    pub content: Option<String>,
}

impl RecordView for Post {
    fn kind(&self) -> RecordKind {
        RecordKind::Post
    }

    fn id(&self) -> &str {
        &self.id
    }

    fn field(&self, name: &str) -> Option<Value> {
        let value = match name {
            "id" => json!(self.id),
            "title" => json!(self.title),
            "content" => json!(self.content),
            "accountId" => json!(self.account_id),
            _ => return None,
        };
        Some(value)
    }
}

impl Record for Post {
    const KIND: RecordKind = RecordKind::Post;
    const FIELDS: &'static [&'static str] = &["id", "title", "content", "accountId"];

    type Draft = PostDraft;
    type Patch = PostPatch;

    fn from_draft(id: String, draft: PostDraft) -> Self {
        Self {
            id,
            title: draft.title,
            content: draft.content,
            account_id: draft.account_id,
        }
    }

    fn apply(&mut self, patch: PostPatch) {
        if let Some(title) = patch.title {
            self.title = title;
        }
        if let Some(content) = patch.content {
            self.content = Some(content);
        }
    }
}
