//! Query engine - read documents over a borrowed store

use serde_json::Value;
use tracing::debug;
use crate::Result;
use crate::storage::Store;
use super::resolver::{Resolver, ResolverStats};
use super::selection::Selection;

/// Query result with the statistics of the pass that produced it
#[derive(Debug, serde::Serialize)]
pub struct QueryOutcome {
    pub data: Value,
    pub stats: ResolverStats,
}

/// Query engine for read documents
pub struct QueryEngine<'a> {
    store: &'a Store,
}

impl<'a> QueryEngine<'a> {
    /// Create a new query engine
    pub fn new(store: &'a Store) -> Self {
        Self { store }
    }

    /// Resolve a read document in a single pass
    pub fn execute(&self, document: &Selection) -> Result<Value> {
        Ok(self.execute_with_stats(document)?.data)
    }

    pub fn execute_with_stats(&self, document: &Selection) -> Result<QueryOutcome> {
        let mut resolver = Resolver::new(self.store);
        let data = resolver.execute(document)?;
        let stats = resolver.stats();
        debug!("Query pass finished: {}", stats);
        Ok(QueryOutcome { data, stats })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use crate::integrity::IntegrityEnforcer;
    use crate::record::{AccountDraft, MembershipTierDraft};

    #[test]
    fn test_multiple_roots() {
        let mut store = Store::new();
        let mut enforcer = IntegrityEnforcer::new(&mut store);
        enforcer.seed_membership_tier("basic", MembershipTierDraft { discount: Some(0.0), month_posts_limit: Some(20) }).unwrap();
        enforcer.create_account(AccountDraft { last_name: Some("Hopper".into()), ..Default::default() });

        let document = Selection::parse(
            r#"{
                "membershipTiers": { "selection": { "id": null, "monthPostsLimit": null } },
                "accounts": { "selection": { "lastName": null, "profiles": { "selection": { "id": null } } } }
            }"#,
        )
        .unwrap();

        let outcome = QueryEngine::new(&store).execute_with_stats(&document).unwrap();
        assert_eq!(
            outcome.data,
            json!({
                "membershipTiers": [ { "id": "basic", "monthPostsLimit": 20 } ],
                "accounts": [ { "lastName": "Hopper", "profiles": [] } ]
            })
        );
        assert_eq!(outcome.stats.lookups, 3);
    }
}
