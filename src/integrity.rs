//! Integrity Enforcer - relationship-preserving mutations
//!
//! Every mutation of the store goes through here. Each operation is a
//! check-then-act sequence over `&mut Store`, so holding the mutable borrow
//! for the duration of the call is what makes it a critical section.
//!
//! Cascades are not transactional: a failure half way through a
//! [`IntegrityEnforcer::delete_account`] leaves the steps already applied.

use tracing::{debug, info, warn};
use crate::{Error, Result};
use crate::record::{
    Account, AccountDraft, AccountPatch, MembershipTier, MembershipTierDraft, Post, PostDraft,
    Profile, ProfileDraft, Record,
};
use crate::storage::{HasTable, Predicate, Store, Table};

/// Validating front door for store mutations
pub struct IntegrityEnforcer<'a> {
    store: &'a mut Store,
}

impl<'a> IntegrityEnforcer<'a> {
    pub fn new(store: &'a mut Store) -> Self {
        Self { store }
    }

    /// Create an account. Accounts reference nothing, so nothing is checked.
    pub fn create_account(&mut self, draft: AccountDraft) -> Account {
        let account = self.table_mut::<Account>().create(draft);
        info!("Created account {}", account.id);
        account
    }

    /// Create a profile for an existing account.
    ///
    /// Fails with `BadRequest` if the account or the referenced membership
    /// tier does not exist, and with `Conflict` if the account already has
    /// a profile.
    pub fn create_profile(&mut self, draft: ProfileDraft) -> Result<Profile> {
        self.require::<Account>(&draft.account_id)?;
        if let Some(tier_id) = &draft.membership_tier_id {
            self.require::<MembershipTier>(tier_id)?;
        }

        let existing = self
            .table::<Profile>()
            .find_one(&Predicate::equals("accountId", &draft.account_id));
        if let Some(existing) = existing {
            warn!("Account {} already has profile {}", draft.account_id, existing.id);
            return Err(Error::Conflict(format!(
                "account {} already has a profile",
                draft.account_id
            )));
        }

        let profile = self.table_mut::<Profile>().create(draft);
        info!("Created profile {} for account {}", profile.id, profile.account_id);
        Ok(profile)
    }

    /// Create a post owned by an existing account
    pub fn create_post(&mut self, draft: PostDraft) -> Result<Post> {
        self.require::<Account>(&draft.account_id)?;

        let post = self.table_mut::<Post>().create(draft);
        info!("Created post {} for account {}", post.id, post.account_id);
        Ok(post)
    }

    /// Insert a membership tier under a fixed identifier (used for seeding)
    pub fn seed_membership_tier(
        &mut self,
        id: impl Into<String>,
        draft: MembershipTierDraft,
    ) -> Result<MembershipTier> {
        let tier = self.table_mut::<MembershipTier>().insert_with_id(id, draft)?;
        debug!("Seeded membership tier {}", tier.id);
        Ok(tier)
    }

    /// Partially update any record.
    ///
    /// Foreign keys carried by the patch are not re-validated.
    pub fn update<R: Record>(&mut self, id: &str, patch: R::Patch) -> Result<R>
    where
        Store: HasTable<R>,
    {
        self.require::<R>(id)?;
        let updated = self.table_mut::<R>().update(id, patch)?;
        debug!("Updated {} {}", R::KIND, id);
        Ok(updated)
    }

    /// Delete an account together with everything that depends on it:
    /// reverse subscriptions, its profile and its posts.
    pub fn delete_account(&mut self, id: &str) -> Result<Account> {
        self.require::<Account>(id)?;

        let subscribers: Vec<Account> = self
            .table::<Account>()
            .find_many(Some(&Predicate::contains("subscribedToAccountIds", id)))
            .into_iter()
            .filter(|account| account.id != id)
            .cloned()
            .collect();
        for subscriber in &subscribers {
            let remaining = subscriber
                .subscribed_to_account_ids
                .iter()
                .filter(|s| *s != id)
                .cloned()
                .collect();
            self.table_mut::<Account>().update(
                &subscriber.id,
                AccountPatch {
                    subscribed_to_account_ids: Some(remaining),
                    ..Default::default()
                },
            )?;
        }

        let profiles = self.dependents::<Profile>(id);
        for profile_id in &profiles {
            self.table_mut::<Profile>().delete(profile_id)?;
        }

        let posts = self.dependents::<Post>(id);
        for post_id in &posts {
            self.table_mut::<Post>().delete(post_id)?;
        }

        let account = self.table_mut::<Account>().delete(id)?;
        info!(
            "Deleted account {} (unlinked {} subscribers, {} profiles, {} posts)",
            id,
            subscribers.len(),
            profiles.len(),
            posts.len()
        );
        Ok(account)
    }

    pub fn delete_profile(&mut self, id: &str) -> Result<Profile> {
        self.remove::<Profile>(id)
    }

    pub fn delete_post(&mut self, id: &str) -> Result<Post> {
        self.remove::<Post>(id)
    }

    /// Delete a membership tier. Profiles that reference it keep the
    /// now-dangling identifier.
    pub fn delete_membership_tier(&mut self, id: &str) -> Result<MembershipTier> {
        self.remove::<MembershipTier>(id)
    }

    /// Add `subscriber_id` to the subscription list of `target_id`.
    ///
    /// Note the direction: it is the *target's* list that changes. The
    /// operation is idempotent and returns the target account.
    pub fn subscribe(&mut self, subscriber_id: &str, target_id: &str) -> Result<Account> {
        self.require::<Account>(subscriber_id)?;
        let target = self.require::<Account>(target_id)?;

        if target.lists(subscriber_id) {
            debug!("Account {} already lists {}", target_id, subscriber_id);
            return Ok(target.clone());
        }

        let mut ids = target.subscribed_to_account_ids.clone();
        ids.push(subscriber_id.to_string());
        let updated = self.table_mut::<Account>().update(
            target_id,
            AccountPatch {
                subscribed_to_account_ids: Some(ids),
                ..Default::default()
            },
        )?;
        info!("Account {} now lists {}", target_id, subscriber_id);
        Ok(updated)
    }

    /// Remove `subscriber_id` from the subscription list of `target_id`.
    ///
    /// Fails with `BadRequest` if it is not currently listed.
    pub fn unsubscribe(&mut self, subscriber_id: &str, target_id: &str) -> Result<Account> {
        self.require::<Account>(subscriber_id)?;
        let target = self.require::<Account>(target_id)?;

        if !target.lists(subscriber_id) {
            warn!("Account {} does not list {}", target_id, subscriber_id);
            return Err(Error::BadRequest(format!(
                "account {} is not subscribed to account {}",
                subscriber_id, target_id
            )));
        }

        let ids = target
            .subscribed_to_account_ids
            .iter()
            .filter(|s| *s != subscriber_id)
            .cloned()
            .collect();
        let updated = self.table_mut::<Account>().update(
            target_id,
            AccountPatch {
                subscribed_to_account_ids: Some(ids),
                ..Default::default()
            },
        )?;
        info!("Account {} no longer lists {}", target_id, subscriber_id);
        Ok(updated)
    }

    fn remove<R: Record>(&mut self, id: &str) -> Result<R>
    where
        Store: HasTable<R>,
    {
        self.require::<R>(id)?;
        let removed = self.table_mut::<R>().delete(id)?;
        info!("Deleted {} {}", R::KIND, id);
        Ok(removed)
    }

    /// Identifiers of the `R` records owned by `account_id`
    fn dependents<R: Record>(&self, account_id: &str) -> Vec<String>
    where
        Store: HasTable<R>,
    {
        self.table::<R>()
            .find_many(Some(&Predicate::equals("accountId", account_id)))
            .into_iter()
            .map(|record| record.id().to_string())
            .collect()
    }

    /// Resolve a referenced record, reporting absence as a bad request
    fn require<R: Record>(&self, id: &str) -> Result<&R>
    where
        Store: HasTable<R>,
    {
        self.table::<R>().get(id).ok_or_else(|| {
            warn!("Rejected mutation: {} {} does not exist", R::KIND, id);
            Error::BadRequest(format!("{} {} does not exist", R::KIND, id))
        })
    }

    fn table<R: Record>(&self) -> &Table<R>
    where
        Store: HasTable<R>,
    {
        HasTable::<R>::table(&*self.store)
    }

    fn table_mut<R: Record>(&mut self) -> &mut Table<R>
    where
        Store: HasTable<R>,
    {
        HasTable::<R>::table_mut(&mut *self.store)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::{AccountPatch, ProfilePatch, Sex};

    fn store_with_tiers() -> Store {
        let mut store = Store::new();
        let mut enforcer = IntegrityEnforcer::new(&mut store);
        enforcer.seed_membership_tier("basic", MembershipTierDraft::default()).unwrap();
        enforcer.seed_membership_tier("business", MembershipTierDraft::default()).unwrap();
        store
    }

    #[test]
    fn test_profile_requires_existing_account_and_tier() {
        let mut store = store_with_tiers();
        let mut enforcer = IntegrityEnforcer::new(&mut store);

        let err = enforcer.create_profile(ProfileDraft::new("ghost", Sex::Male)).unwrap_err();
        assert!(matches!(err, Error::BadRequest(_)));

        let account = enforcer.create_account(AccountDraft::default());
        let err = enforcer
            .create_profile(ProfileDraft::new(&account.id, Sex::Male).with_membership_tier("gold"))
            .unwrap_err();
        assert!(matches!(err, Error::BadRequest(_)));

        let profile = enforcer
            .create_profile(ProfileDraft::new(&account.id, Sex::Male).with_membership_tier("basic"))
            .unwrap();
        assert_eq!(profile.membership_tier_id.as_deref(), Some("basic"));
    }

    #[test]
    fn test_second_profile_conflicts() {
        let mut store = store_with_tiers();
        let mut enforcer = IntegrityEnforcer::new(&mut store);
        let account = enforcer.create_account(AccountDraft::default());

        enforcer.create_profile(ProfileDraft::new(&account.id, Sex::Female)).unwrap();
        let err = enforcer
            .create_profile(ProfileDraft::new(&account.id, Sex::Male).with_membership_tier("business"))
            .unwrap_err();
        assert!(matches!(err, Error::Conflict(_)));
        assert_eq!(store.profiles().len(), 1);
    }

    #[test]
    fn test_post_requires_existing_account() {
        let mut store = Store::new();
        let mut enforcer = IntegrityEnforcer::new(&mut store);
        assert!(matches!(
            enforcer.create_post(PostDraft::new("ghost", "title")),
            Err(Error::BadRequest(_))
        ));
    }

    #[test]
    fn test_delete_account_cascades() {
        let mut store = store_with_tiers();
        let mut enforcer = IntegrityEnforcer::new(&mut store);

        let doomed = enforcer.create_account(AccountDraft::default());
        let other = enforcer.create_account(AccountDraft::default());
        let bystander = enforcer.create_account(AccountDraft::default());

        enforcer.create_profile(ProfileDraft::new(&doomed.id, Sex::Male)).unwrap();
        enforcer.create_post(PostDraft::new(&doomed.id, "first")).unwrap();
        enforcer.create_post(PostDraft::new(&doomed.id, "second")).unwrap();
        let kept_post = enforcer.create_post(PostDraft::new(&other.id, "kept")).unwrap();

        enforcer.subscribe(&doomed.id, &other.id).unwrap();
        enforcer.subscribe(&bystander.id, &other.id).unwrap();

        let removed = enforcer.delete_account(&doomed.id).unwrap();
        assert_eq!(removed.id, doomed.id);

        assert!(store.accounts().get(&doomed.id).is_none());
        assert!(store.profiles().is_empty());
        assert_eq!(store.posts().len(), 1);
        assert!(store.posts().get(&kept_post.id).is_some());
        assert_eq!(
            store.accounts().get(&other.id).unwrap().subscribed_to_account_ids,
            vec![bystander.id.clone()]
        );
    }

    #[test]
    fn test_delete_missing_account_is_bad_request() {
        let mut store = Store::new();
        let err = IntegrityEnforcer::new(&mut store).delete_account("ghost").unwrap_err();
        assert!(matches!(err, Error::BadRequest(_)));
    }

    #[test]
    fn test_subscribe_is_idempotent() {
        let mut store = Store::new();
        let mut enforcer = IntegrityEnforcer::new(&mut store);
        let s = enforcer.create_account(AccountDraft::default());
        let t = enforcer.create_account(AccountDraft::default());

        let first = enforcer.subscribe(&s.id, &t.id).unwrap();
        let second = enforcer.subscribe(&s.id, &t.id).unwrap();

        assert_eq!(first.subscribed_to_account_ids, vec![s.id.clone()]);
        assert_eq!(first, second);
        // only the target's list changes
        assert!(store.accounts().get(&s.id).unwrap().subscribed_to_account_ids.is_empty());
    }

    #[test]
    fn test_subscribe_requires_both_accounts() {
        let mut store = Store::new();
        let mut enforcer = IntegrityEnforcer::new(&mut store);
        let s = enforcer.create_account(AccountDraft::default());

        assert!(matches!(enforcer.subscribe(&s.id, "ghost"), Err(Error::BadRequest(_))));
        assert!(matches!(enforcer.subscribe("ghost", &s.id), Err(Error::BadRequest(_))));
    }

    #[test]
    fn test_self_subscription_is_allowed() {
        let mut store = Store::new();
        let mut enforcer = IntegrityEnforcer::new(&mut store);
        let a = enforcer.create_account(AccountDraft::default());

        let updated = enforcer.subscribe(&a.id, &a.id).unwrap();
        assert_eq!(updated.subscribed_to_account_ids, vec![a.id.clone()]);
    }

    #[test]
    fn test_unsubscribe() {
        let mut store = Store::new();
        let mut enforcer = IntegrityEnforcer::new(&mut store);
        let s = enforcer.create_account(AccountDraft::default());
        let t = enforcer.create_account(AccountDraft::default());

        let err = enforcer.unsubscribe(&s.id, &t.id).unwrap_err();
        assert!(matches!(err, Error::BadRequest(_)));

        enforcer.subscribe(&s.id, &t.id).unwrap();
        let updated = enforcer.unsubscribe(&s.id, &t.id).unwrap();
        assert!(updated.subscribed_to_account_ids.is_empty());
    }

    #[test]
    fn test_update_does_not_revalidate_references() {
        let mut store = store_with_tiers();
        let mut enforcer = IntegrityEnforcer::new(&mut store);
        let account = enforcer.create_account(AccountDraft::default());
        let profile = enforcer.create_profile(ProfileDraft::new(&account.id, Sex::Male)).unwrap();

        let updated: Profile = enforcer
            .update(
                &profile.id,
                ProfilePatch {
                    membership_tier_id: Some("platinum".into()),
                    ..Default::default()
                },
            )
            .unwrap();
        assert_eq!(updated.membership_tier_id.as_deref(), Some("platinum"));

        let err = enforcer
            .update::<Account>("ghost", AccountPatch::default())
            .unwrap_err();
        assert!(matches!(err, Error::BadRequest(_)));
    }

    #[test]
    fn test_tier_deletion_does_not_cascade() {
        let mut store = store_with_tiers();
        let mut enforcer = IntegrityEnforcer::new(&mut store);
        let account = enforcer.create_account(AccountDraft::default());
        let profile = enforcer
            .create_profile(ProfileDraft::new(&account.id, Sex::Male).with_membership_tier("basic"))
            .unwrap();

        enforcer.delete_membership_tier("basic").unwrap();
        assert_eq!(
            store.profiles().get(&profile.id).unwrap().membership_tier_id.as_deref(),
            Some("basic")
        );
    }
}
