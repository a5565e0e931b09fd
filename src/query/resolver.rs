//! Query Resolver
//!
//! Turns a selection tree into a nested result tree by walking the
//! relationship catalog.
//!
//! Resolution order for each record:
//! 1. Scalar fields are copied from the stored record
//! 2. Relational fields are looked up in the catalog and resolved by rule
//! 3. The nested selection is applied to the related records, recursively
//!
//! Every store scan issued during one pass is memoized by
//! (kind, predicate), so a lookup repeated anywhere in the tree is served
//! once.

use std::collections::{HashMap, HashSet};
use serde::Serialize;
use serde_json::{Map, Value};
use tracing::debug;
use crate::{Error, Result};
use crate::catalog::{self, Cardinality, Relation, ResolutionRule};
use crate::record::{RecordKind, RecordView};
use crate::storage::{Predicate, Store};
use super::selection::{Arguments, FieldSelection, Selection};

/// A root field of a read document
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RootField {
    pub kind: RecordKind,
    pub cardinality: Cardinality,
}

impl RootField {
    /// Map a root field name (`accounts`, `post`, ...) to its kind
    pub fn parse(name: &str) -> Option<Self> {
        RecordKind::all().iter().find_map(|kind| {
            if kind.plural() == name {
                Some(Self { kind: *kind, cardinality: Cardinality::Many })
            } else if kind.as_str() == name {
                Some(Self { kind: *kind, cardinality: Cardinality::One })
            } else {
                None
            }
        })
    }
}

/// Counters for one resolution pass
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolverStats {
    /// Scans and point lookups that reached the store
    pub lookups: usize,
    /// Scans answered from the per-pass memo
    pub memo_hits: usize,
}

impl std::fmt::Display for ResolverStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} store lookups, {} memo hits", self.lookups, self.memo_hits)
    }
}

type LookupKey = (RecordKind, Option<Predicate>);

/// Recursive resolver over a borrowed store.
///
/// One resolver is one pass: create a fresh one per request.
pub struct Resolver<'a> {
    store: &'a Store,
    memo: HashMap<LookupKey, Vec<&'a dyn RecordView>>,
    stats: ResolverStats,
}

impl<'a> Resolver<'a> {
    pub fn new(store: &'a Store) -> Self {
        Self {
            store,
            memo: HashMap::new(),
            stats: ResolverStats::default(),
        }
    }

    pub fn stats(&self) -> ResolverStats {
        self.stats
    }

    /// Resolve every root field of a read document, keyed by field name
    pub fn execute(&mut self, document: &Selection) -> Result<Value> {
        let mut data = Map::new();
        for field in document.fields() {
            let root = RootField::parse(&field.name).ok_or_else(|| {
                Error::Validation(format!("unknown root field `{}`", field.name))
            })?;
            let value = self.resolve(root, &field.args, &field.selection)?;
            data.insert(field.name.clone(), value);
        }
        debug!("Resolved {} root fields: {}", document.fields().len(), self.stats);
        Ok(Value::Object(data))
    }

    /// Resolve one root field.
    ///
    /// Singular roots take a required `id` argument and yield `null` when
    /// nothing matches; plural roots take no arguments and list every
    /// record of the kind.
    pub fn resolve(&mut self, root: RootField, args: &Arguments, selection: &Selection) -> Result<Value> {
        require_selection(root.kind.as_str(), selection)?;
        validate(root.kind, selection)?;

        match root.cardinality {
            Cardinality::One => {
                args.ensure_only(&["id"])?;
                let id = args.require_str("id")?;
                self.resolve_record(root.kind, id, selection)
            }
            Cardinality::Many => {
                args.ensure_only(&[])?;
                let records = self.find_many(root.kind, None);
                self.project_all(records, selection)
            }
        }
    }

    /// Resolve `selection` against a single stored record, or `null`
    pub fn resolve_record(&mut self, kind: RecordKind, id: &str, selection: &Selection) -> Result<Value> {
        self.stats.lookups += 1;
        match self.store.get(kind, id) {
            Some(record) => self.project(record, selection),
            None => Ok(Value::Null),
        }
    }

    /// Apply a selection to one record
    pub fn project(&mut self, record: &'a dyn RecordView, selection: &Selection) -> Result<Value> {
        let kind = record.kind();
        let mut out = Map::new();

        for field in selection.fields() {
            let value = if kind.is_scalar(&field.name) {
                scalar(record, field)?
            } else {
                let relation = catalog::lookup(kind, &field.name).ok_or_else(|| {
                    Error::Validation(format!("unknown field `{}` on {}", field.name, kind))
                })?;
                if !field.args.is_empty() {
                    return Err(Error::Validation(format!(
                        "field `{}` on {} takes no arguments",
                        field.name, kind
                    )));
                }
                require_selection(&field.name, &field.selection)?;

                let related = self.follow(record, relation)?;
                match relation.cardinality {
                    Cardinality::One => match related.first() {
                        Some(target) => self.project(*target, &field.selection)?,
                        None => Value::Null,
                    },
                    Cardinality::Many => self.project_all(related, &field.selection)?,
                }
            };
            out.insert(field.name.clone(), value);
        }

        Ok(Value::Object(out))
    }

    fn project_all(&mut self, records: Vec<&'a dyn RecordView>, selection: &Selection) -> Result<Value> {
        let items = records
            .into_iter()
            .map(|record| self.project(record, selection))
            .collect::<Result<Vec<_>>>()?;
        Ok(Value::Array(items))
    }

    /// Fetch the records on the other end of `relation`
    fn follow(&mut self, record: &'a dyn RecordView, relation: &Relation) -> Result<Vec<&'a dyn RecordView>> {
        let target = relation.target;

        match relation.rule {
            ResolutionRule::ForeignKey { foreign_key } => {
                Ok(self.find_many(target, Some(Predicate::equals(foreign_key, record.id()))))
            }
            ResolutionRule::Reference { key_field } => match optional_key(record, key_field)? {
                Some(key) => Ok(self.find_many(target, Some(Predicate::id(key)))),
                None => Ok(Vec::new()),
            },
            ResolutionRule::IdList { list_field } => {
                let ids = id_list(record, list_field)?;
                if ids.is_empty() {
                    return Ok(Vec::new());
                }
                Ok(self.find_many(target, Some(Predicate::equals_any_of("id", ids))))
            }
            ResolutionRule::ReverseIdList { list_field } => {
                Ok(self.find_many(target, Some(Predicate::contains(list_field, record.id()))))
            }
            ResolutionRule::DerivedJoin { via, foreign_key, key_field } => {
                let intermediates = self.find_many(via, Some(Predicate::equals(foreign_key, record.id())));

                // distinct keys, first-seen order
                let mut seen = HashSet::new();
                let mut keys = Vec::new();
                for intermediate in intermediates {
                    if let Some(key) = optional_key(intermediate, key_field)? {
                        if seen.insert(key.clone()) {
                            keys.push(key);
                        }
                    }
                }
                if keys.is_empty() {
                    return Ok(Vec::new());
                }
                Ok(self.find_many(target, Some(Predicate::equals_any_of("id", keys))))
            }
        }
    }

    /// Memoized store scan
    fn find_many(&mut self, kind: RecordKind, predicate: Option<Predicate>) -> Vec<&'a dyn RecordView> {
        let key = (kind, predicate);
        if let Some(hit) = self.memo.get(&key) {
            self.stats.memo_hits += 1;
            return hit.clone();
        }

        self.stats.lookups += 1;
        let records = self.store.scan(kind, key.1.as_ref());
        self.memo.insert(key, records.clone());
        records
    }
}

/// Check a selection against the fields of `kind` without touching the store.
///
/// Scalars take neither arguments nor a selection; relations take no
/// arguments and require a selection, which is checked against the target
/// kind in turn.
pub fn validate(kind: RecordKind, selection: &Selection) -> Result<()> {
    for field in selection.fields() {
        if kind.is_scalar(&field.name) {
            check_scalar(kind, field)?;
            continue;
        }

        let relation = catalog::relations_of(kind)
            .find(|relation| relation.field == field.name)
            .ok_or_else(|| Error::Validation(format!("unknown field `{}` on {}", field.name, kind)))?;
        if !field.args.is_empty() {
            return Err(Error::Validation(format!(
                "field `{}` on {} takes no arguments",
                field.name, kind
            )));
        }
        require_selection(&field.name, &field.selection)?;
        validate(relation.target, &field.selection)?;
    }
    Ok(())
}

fn check_scalar(kind: RecordKind, field: &FieldSelection) -> Result<()> {
    if !field.args.is_empty() || !field.selection.is_empty() {
        return Err(Error::Validation(format!(
            "scalar field `{}` on {} takes no arguments or selection",
            field.name, kind
        )));
    }
    Ok(())
}

fn scalar(record: &dyn RecordView, field: &FieldSelection) -> Result<Value> {
    check_scalar(record.kind(), field)?;
    record.field(&field.name).ok_or_else(|| {
        Error::InvariantViolation(format!("{} declares `{}` but does not store it", record.kind(), field.name))
    })
}

fn require_selection(name: &str, selection: &Selection) -> Result<()> {
    if selection.is_empty() {
        return Err(Error::Validation(format!("field `{}` requires a selection", name)));
    }
    Ok(())
}

/// A nullable identifier field
fn optional_key(record: &dyn RecordView, field: &str) -> Result<Option<String>> {
    match record.field(field) {
        Some(Value::String(key)) => Ok(Some(key)),
        Some(Value::Null) => Ok(None),
        _ => Err(Error::InvariantViolation(format!(
            "{}.{} is not an identifier field",
            record.kind(),
            field
        ))),
    }
}

/// An identifier list field
fn id_list(record: &dyn RecordView, field: &str) -> Result<Vec<String>> {
    match record.field(field) {
        Some(Value::Array(items)) => Ok(items
            .into_iter()
            .filter_map(|item| match item {
                Value::String(id) => Some(id),
                _ => None,
            })
            .collect()),
        Some(Value::Null) => Ok(Vec::new()),
        _ => Err(Error::InvariantViolation(format!(
            "{}.{} is not an identifier list",
            record.kind(),
            field
        ))),
    }
}
