pub mod engine;
pub mod mutation;
pub mod resolver;
pub mod selection;

pub use engine::{QueryEngine, QueryOutcome};
pub use mutation::{MutationEngine, MutationRoot};
pub use resolver::{validate, Resolver, ResolverStats, RootField};
pub use selection::{Arguments, FieldSelection, Selection};

use serde::Deserialize;
use crate::{Error, Result};

/// A graph request body: exactly one of `query` or `mutation`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GraphRequest {
    pub query: Option<Selection>,
    pub mutation: Option<Selection>,
}

/// A validated graph operation
#[derive(Debug, Clone, PartialEq)]
pub enum Operation {
    Query(Selection),
    Mutation(Selection),
}

impl TryFrom<GraphRequest> for Operation {
    type Error = Error;

    fn try_from(request: GraphRequest) -> Result<Self> {
        match (request.query, request.mutation) {
            (Some(query), None) => Ok(Operation::Query(query)),
            (None, Some(mutation)) => Ok(Operation::Mutation(mutation)),
            (Some(_), Some(_)) => Err(Error::Validation(
                "a request carries either `query` or `mutation`, not both".into(),
            )),
            (None, None) => Err(Error::Validation("missing `query` or `mutation`".into())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_operation_from_request() {
        let request: GraphRequest =
            serde_json::from_str(r#"{"query": {"accounts": {"selection": {"id": null}}}}"#).unwrap();
        assert!(matches!(Operation::try_from(request), Ok(Operation::Query(_))));

        let both: GraphRequest = serde_json::from_str(r#"{"query": {}, "mutation": {}}"#).unwrap();
        assert!(Operation::try_from(both).is_err());
        assert!(Operation::try_from(GraphRequest::default()).is_err());
    }

    #[test]
    fn test_malformed_selection_fails_to_deserialize() {
        let bad = serde_json::from_str::<GraphRequest>(r#"{"query": {"accounts": 3}}"#);
        assert!(bad.is_err());
    }
}
