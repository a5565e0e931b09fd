//! Parsed selection trees
//!
//! The textual query language is parsed elsewhere; the resolver receives
//! its output as JSON of the shape
//!
//! ```text
//! { fieldName: null | true | { "args"?: { name: scalar }, "selection"?: <tree> } }
//! ```
//!
//! Field order is preserved and mirrored in the result.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};
use crate::{Error, Result};

/// An ordered set of requested fields
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Selection {
    fields: Vec<FieldSelection>,
}

/// One requested field with its arguments and nested selection
#[derive(Debug, Clone, PartialEq)]
pub struct FieldSelection {
    pub name: String,
    pub args: Arguments,
    pub selection: Selection,
}

/// Scalar arguments attached to a field
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Arguments(Map<String, Value>);

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder: add a leaf field
    pub fn field(mut self, name: impl Into<String>) -> Self {
        self.fields.push(FieldSelection::leaf(name));
        self
    }

    /// Builder: add a fully specified field
    pub fn with(mut self, field: FieldSelection) -> Self {
        self.fields.push(field);
        self
    }

    pub fn fields(&self) -> &[FieldSelection] {
        &self.fields
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Parse a selection tree from its JSON text
    pub fn parse(text: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(text)?;
        Self::from_json(&value)
    }

    /// Convert a JSON selection tree, validating its shape
    pub fn from_json(value: &Value) -> Result<Self> {
        let Value::Object(entries) = value else {
            return Err(Error::Validation("a selection must be a JSON object".into()));
        };

        let fields = entries
            .iter()
            .map(|(name, entry)| FieldSelection::from_json(name, entry))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { fields })
    }

    pub fn to_json(&self) -> Value {
        let entries = self
            .fields
            .iter()
            .map(|field| (field.name.clone(), field.to_json()))
            .collect();
        Value::Object(entries)
    }
}

impl FieldSelection {
    pub fn leaf(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            args: Arguments::default(),
            selection: Selection::default(),
        }
    }

    pub fn nested(name: impl Into<String>, selection: Selection) -> Self {
        Self {
            selection,
            ..Self::leaf(name)
        }
    }

    pub fn with_arg(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.args.0.insert(name.into(), value.into());
        self
    }

    fn from_json(name: &str, entry: &Value) -> Result<Self> {
        match entry {
            Value::Null | Value::Bool(true) => Ok(Self::leaf(name)),
            Value::Object(parts) => {
                let mut field = Self::leaf(name);
                for (key, part) in parts {
                    match key.as_str() {
                        "args" => field.args = Arguments::from_json(name, part)?,
                        "selection" => field.selection = Selection::from_json(part)?,
                        other => {
                            return Err(Error::Validation(format!(
                                "field `{}`: unexpected key `{}` (expected `args` or `selection`)",
                                name, other
                            )));
                        }
                    }
                }
                Ok(field)
            }
            _ => Err(Error::Validation(format!(
                "field `{}`: expected null, true or an object",
                name
            ))),
        }
    }

    fn to_json(&self) -> Value {
        if self.args.is_empty() && self.selection.is_empty() {
            return Value::Null;
        }
        let mut parts = Map::new();
        if !self.args.is_empty() {
            parts.insert("args".into(), Value::Object(self.args.0.clone()));
        }
        if !self.selection.is_empty() {
            parts.insert("selection".into(), self.selection.to_json());
        }
        Value::Object(parts)
    }
}

impl Arguments {
    fn from_json(field: &str, value: &Value) -> Result<Self> {
        let Value::Object(entries) = value else {
            return Err(Error::Validation(format!("field `{}`: `args` must be an object", field)));
        };
        for (name, arg) in entries {
            if arg.is_array() || arg.is_object() {
                return Err(Error::Validation(format!(
                    "field `{}`: argument `{}` must be a scalar",
                    field, name
                )));
            }
        }
        Ok(Self(entries.clone()))
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// A required string argument
    pub fn require_str(&self, name: &str) -> Result<&str> {
        match self.0.get(name) {
            Some(Value::String(s)) => Ok(s),
            Some(_) => Err(Error::Validation(format!("argument `{}` must be a string", name))),
            None => Err(Error::Validation(format!("missing argument `{}`", name))),
        }
    }

    /// Reject any argument not in `allowed`
    pub fn ensure_only(&self, allowed: &[&str]) -> Result<()> {
        match self.0.keys().find(|name| !allowed.contains(&name.as_str())) {
            Some(name) => Err(Error::Validation(format!("unknown argument `{}`", name))),
            None => Ok(()),
        }
    }

    /// The arguments minus `exclude`, as a JSON object for draft/patch decoding
    pub fn to_object(&self, exclude: &[&str]) -> Value {
        let entries = self
            .0
            .iter()
            .filter(|(name, _)| !exclude.contains(&name.as_str()))
            .map(|(name, value)| (name.clone(), value.clone()))
            .collect();
        Value::Object(entries)
    }
}

impl<'de> Deserialize<'de> for Selection {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Selection::from_json(&value).map_err(serde::de::Error::custom)
    }
}

impl Serialize for Selection {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        self.to_json().serialize(serializer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_nested_tree() {
        let selection = Selection::from_json(&json!({
            "account": {
                "args": { "id": "a1" },
                "selection": {
                    "id": null,
                    "posts": { "selection": { "title": true } }
                }
            }
        }))
        .unwrap();

        let root = &selection.fields()[0];
        assert_eq!(root.name, "account");
        assert_eq!(root.args.require_str("id").unwrap(), "a1");

        let names: Vec<_> = root.selection.fields().iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["id", "posts"]);
        assert_eq!(root.selection.fields()[1].selection.fields()[0].name, "title");
    }

    #[test]
    fn test_field_order_is_preserved() {
        let selection = Selection::parse(r#"{"zeta": null, "alpha": null, "mid": null}"#).unwrap();
        let names: Vec<_> = selection.fields().iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["zeta", "alpha", "mid"]);
    }

    #[test]
    fn test_rejects_malformed_shapes() {
        assert!(Selection::from_json(&json!(["id"])).is_err());
        assert!(Selection::from_json(&json!({"id": 1})).is_err());
        assert!(Selection::from_json(&json!({"id": {"alias": "x"}})).is_err());
        assert!(Selection::from_json(&json!({"account": {"args": {"id": ["a"]}}})).is_err());
    }

    #[test]
    fn test_builder_matches_json() {
        let built = Selection::new().with(
            FieldSelection::nested("account", Selection::new().field("id")).with_arg("id", "a1"),
        );
        let parsed = Selection::from_json(&built.to_json()).unwrap();
        assert_eq!(built, parsed);
    }

    #[test]
    fn test_arguments_helpers() {
        let field = FieldSelection::leaf("updatePost")
            .with_arg("id", "p1")
            .with_arg("title", "new");
        assert!(field.args.ensure_only(&["id", "title"]).is_ok());
        assert!(field.args.ensure_only(&["id"]).is_err());
        assert_eq!(field.args.to_object(&["id"]), json!({"title": "new"}));
        assert!(field.args.require_str("content").is_err());
    }
}
