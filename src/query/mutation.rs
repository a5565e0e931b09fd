//! Mutation engine - write documents
//!
//! Mutation root fields are thin pass-throughs to the
//! [`IntegrityEnforcer`]. Their arguments are decoded with the same
//! [`Arguments`] used by reads, and their selection is resolved against
//! the affected record once the mutation has been applied.

use std::str::FromStr;
use serde_json::{Map, Value};
use tracing::debug;
use crate::{Error, Result};
use crate::integrity::IntegrityEnforcer;
use crate::record::{
    self, Account, MembershipTier, Post, Profile, Record, RecordKind, RecordView,
};
use crate::storage::Store;
use super::resolver::{validate, Resolver};
use super::selection::{Arguments, FieldSelection, Selection};

/// The mutation root fields
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationRoot {
    CreateAccount,
    CreateProfile,
    CreatePost,
    UpdateAccount,
    UpdateProfile,
    UpdatePost,
    UpdateMembershipTier,
    DeleteAccount,
    SubscribeTo,
    UnsubscribeFrom,
}

impl MutationRoot {
    pub fn as_str(&self) -> &'static str {
        match self {
            MutationRoot::CreateAccount => "createAccount",
            MutationRoot::CreateProfile => "createProfile",
            MutationRoot::CreatePost => "createPost",
            MutationRoot::UpdateAccount => "updateAccount",
            MutationRoot::UpdateProfile => "updateProfile",
            MutationRoot::UpdatePost => "updatePost",
            MutationRoot::UpdateMembershipTier => "updateMembershipTier",
            MutationRoot::DeleteAccount => "deleteAccount",
            MutationRoot::SubscribeTo => "subscribeTo",
            MutationRoot::UnsubscribeFrom => "unsubscribeFrom",
        }
    }

    /// Kind of the record the field's selection is resolved against
    pub fn kind(&self) -> RecordKind {
        match self {
            MutationRoot::CreateProfile | MutationRoot::UpdateProfile => RecordKind::Profile,
            MutationRoot::CreatePost | MutationRoot::UpdatePost => RecordKind::Post,
            MutationRoot::UpdateMembershipTier => RecordKind::MembershipTier,
            MutationRoot::CreateAccount
            | MutationRoot::UpdateAccount
            | MutationRoot::DeleteAccount
            | MutationRoot::SubscribeTo
            | MutationRoot::UnsubscribeFrom => RecordKind::Account,
        }
    }

    pub fn all() -> &'static [MutationRoot] {
        &[
            MutationRoot::CreateAccount,
            MutationRoot::CreateProfile,
            MutationRoot::CreatePost,
            MutationRoot::UpdateAccount,
            MutationRoot::UpdateProfile,
            MutationRoot::UpdatePost,
            MutationRoot::UpdateMembershipTier,
            MutationRoot::DeleteAccount,
            MutationRoot::SubscribeTo,
            MutationRoot::UnsubscribeFrom,
        ]
    }
}

impl FromStr for MutationRoot {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        MutationRoot::all()
            .iter()
            .find(|root| root.as_str() == s)
            .copied()
            .ok_or_else(|| Error::Validation(format!("unknown mutation field `{}`", s)))
    }
}

/// What a mutation left behind for its selection to be resolved against
enum Applied {
    /// A record still in the store
    Stored { kind: RecordKind, id: String },
    /// A record that no longer exists
    Removed(Account),
}

/// Mutation engine over an exclusively borrowed store
pub struct MutationEngine<'a> {
    store: &'a mut Store,
}

impl<'a> MutationEngine<'a> {
    pub fn new(store: &'a mut Store) -> Self {
        Self { store }
    }

    /// Apply every root field of a write document in order.
    ///
    /// Root names and selections are checked for the whole document before
    /// anything is applied. Fields applied before a failing one stay applied.
    pub fn execute(&mut self, document: &Selection) -> Result<Value> {
        let roots = document
            .fields()
            .iter()
            .map(check_field)
            .collect::<Result<Vec<_>>>()?;

        let mut data = Map::new();
        for (root, field) in roots.into_iter().zip(document.fields()) {
            let value = self.execute_field(root, field)?;
            data.insert(field.name.clone(), value);
        }
        Ok(Value::Object(data))
    }

    fn execute_field(&mut self, root: MutationRoot, field: &FieldSelection) -> Result<Value> {
        let applied = self.apply(root, &field.args)?;
        debug!("Applied {}", root.as_str());

        match applied {
            Applied::Stored { kind, id } => {
                Resolver::new(self.store).resolve_record(kind, &id, &field.selection)
            }
            Applied::Removed(account) => {
                Resolver::new(self.store).project(&account as &dyn RecordView, &field.selection)
            }
        }
    }

    fn apply(&mut self, root: MutationRoot, args: &Arguments) -> Result<Applied> {
        let mut enforcer = IntegrityEnforcer::new(self.store);

        let applied = match root {
            MutationRoot::CreateAccount => {
                let account = enforcer.create_account(draft::<Account>(args)?);
                stored(&account)
            }
            MutationRoot::CreateProfile => stored(&enforcer.create_profile(draft::<Profile>(args)?)?),
            MutationRoot::CreatePost => stored(&enforcer.create_post(draft::<Post>(args)?)?),
            MutationRoot::UpdateAccount => {
                let (id, patch) = patch::<Account>(args)?;
                stored(&enforcer.update::<Account>(id, patch)?)
            }
            MutationRoot::UpdateProfile => {
                let (id, patch) = patch::<Profile>(args)?;
                stored(&enforcer.update::<Profile>(id, patch)?)
            }
            MutationRoot::UpdatePost => {
                let (id, patch) = patch::<Post>(args)?;
                stored(&enforcer.update::<Post>(id, patch)?)
            }
            MutationRoot::UpdateMembershipTier => {
                let (id, patch) = patch::<MembershipTier>(args)?;
                stored(&enforcer.update::<MembershipTier>(id, patch)?)
            }
            MutationRoot::DeleteAccount => {
                args.ensure_only(&["id"])?;
                Applied::Removed(enforcer.delete_account(args.require_str("id")?)?)
            }
            MutationRoot::SubscribeTo | MutationRoot::UnsubscribeFrom => {
                args.ensure_only(&["id", "accountId"])?;
                let subscriber = args.require_str("id")?;
                let target = args.require_str("accountId")?;
                let account = if root == MutationRoot::SubscribeTo {
                    enforcer.subscribe(subscriber, target)?
                } else {
                    enforcer.unsubscribe(subscriber, target)?
                };
                stored(&account)
            }
        };
        Ok(applied)
    }
}

fn check_field(field: &FieldSelection) -> Result<MutationRoot> {
    let root: MutationRoot = field.name.parse()?;
    if field.selection.is_empty() {
        return Err(Error::Validation(format!("field `{}` requires a selection", field.name)));
    }
    validate(root.kind(), &field.selection)?;
    Ok(root)
}

fn stored<R: Record>(record: &R) -> Applied {
    Applied::Stored {
        kind: R::KIND,
        id: record.id().to_string(),
    }
}

fn draft<R: Record>(args: &Arguments) -> Result<R::Draft> {
    record::decode(R::KIND, args.to_object(&[]))
}

fn patch<R: Record>(args: &Arguments) -> Result<(&str, R::Patch)> {
    let id = args.require_str("id")?;
    let patch = record::decode(R::KIND, args.to_object(&["id"]))?;
    Ok((id, patch))
}
