use axum::{
    extract::State,
    http::StatusCode,
    Json,
};
use serde_json::{json, Value};
use std::sync::Arc;
use crate::{Error, Result};
use crate::query::{GraphRequest, MutationEngine, Operation, QueryEngine};
use crate::server::AppState;

/// POST /graphql - resolve a pre-parsed selection tree
///
/// Answers `{ "data": ... }` on success and `{ "errors": [{ "message": ... }] }`
/// otherwise.
pub async fn handle_graph(
    State(state): State<Arc<AppState>>,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    match execute(&state, body).await {
        Ok(data) => (StatusCode::OK, Json(json!({ "data": data }))),
        Err(err) => {
            tracing::warn!("Graph request failed: {}", err);
            let status = if err.is_client_error() {
                StatusCode::BAD_REQUEST
            } else {
                StatusCode::INTERNAL_SERVER_ERROR
            };
            (status, Json(json!({ "errors": [ { "message": err.to_string() } ] })))
        }
    }
}

async fn execute(state: &AppState, body: Value) -> Result<Value> {
    let request: GraphRequest =
        serde_json::from_value(body).map_err(|e| Error::Validation(e.to_string()))?;

    match Operation::try_from(request)? {
        Operation::Query(document) => {
            let store = state.store.read().await;
            QueryEngine::new(&store).execute(&document)
        }
        Operation::Mutation(document) => {
            let mut store = state.store.write().await;
            MutationEngine::new(&mut store).execute(&document)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum_test::TestServer;
    use crate::config::{seed_store, ServiceConfig};
    use crate::server::router;

    fn server() -> TestServer {
        let store = seed_store(&ServiceConfig::default()).unwrap();
        TestServer::new(router(Arc::new(AppState::new(store)))).unwrap()
    }

    #[tokio::test]
    async fn test_mutation_then_query() {
        let server = server();

        let created = server
            .post("/graphql")
            .json(&json!({
                "mutation": {
                    "createAccount": { "args": { "firstName": "Linus" }, "selection": { "id": null } }
                }
            }))
            .await;
        assert_eq!(created.status_code(), StatusCode::OK);
        let account_id = created.json::<Value>()["data"]["createAccount"]["id"]
            .as_str()
            .unwrap()
            .to_string();

        server
            .post("/graphql")
            .json(&json!({
                "mutation": {
                    "createPost": { "args": { "accountId": account_id, "title": "one" }, "selection": { "id": null } }
                }
            }))
            .await;

        let response = server
            .post("/graphql")
            .json(&json!({
                "query": {
                    "account": {
                        "args": { "id": account_id },
                        "selection": { "firstName": null, "posts": { "selection": { "title": null } } }
                    },
                    "membershipTiers": { "selection": { "id": null } }
                }
            }))
            .await;
        assert_eq!(response.status_code(), StatusCode::OK);
        assert_eq!(
            response.json::<Value>(),
            json!({ "data": {
                "account": { "firstName": "Linus", "posts": [ { "title": "one" } ] },
                "membershipTiers": [ { "id": "basic" }, { "id": "business" } ]
            } })
        );
    }

    #[tokio::test]
    async fn test_errors_are_reported() {
        let server = server();

        let response = server
            .post("/graphql")
            .json(&json!({ "query": { "accounts": { "selection": { "password": null } } } }))
            .await;
        assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
        let body = response.json::<Value>();
        assert!(body["errors"][0]["message"].as_str().unwrap().contains("password"));

        let response = server.post("/graphql").json(&json!({})).await;
        assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    }
}
