use axum::{
    extract::{Path, State},
    Json,
    http::StatusCode,
};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::Value;
use crate::server::AppState;
use crate::integrity::IntegrityEnforcer;
use crate::record::{self, Account, MembershipTier, Post, Profile, Record};
use crate::storage::{HasTable, Store, StoreStats};
use crate::Error;
use std::sync::Arc;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct SubscriptionBody {
    pub account_id: String,
}

#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

type ApiError = (StatusCode, Json<ErrorResponse>);
type ApiResult<T> = Result<Json<T>, ApiError>;

fn error_response(status: StatusCode, err: Error) -> ApiError {
    (status, Json(ErrorResponse { error: err.to_string() }))
}

/// Reads answer 404 for a missing record
fn read_error(err: Error) -> ApiError {
    let status = match &err {
        Error::NotFound { .. } => StatusCode::NOT_FOUND,
        e if e.is_client_error() => StatusCode::BAD_REQUEST,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };
    error_response(status, err)
}

fn write_error(err: Error) -> ApiError {
    tracing::warn!("Rejected mutation: {}", err);
    let status = if err.is_client_error() {
        StatusCode::BAD_REQUEST
    } else {
        StatusCode::INTERNAL_SERVER_ERROR
    };
    error_response(status, err)
}

fn body<T: DeserializeOwned>(kind: record::RecordKind, value: Value) -> Result<T, ApiError> {
    record::decode(kind, value).map_err(write_error)
}

pub async fn list<R>(State(state): State<Arc<AppState>>) -> Json<Vec<R>>
where
    R: Record,
    Store: HasTable<R>,
{
    let store = state.store.read().await;
    Json(HasTable::<R>::table(&*store).iter().cloned().collect())
}

pub async fn get_one<R>(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<R>
where
    R: Record,
    Store: HasTable<R>,
{
    let store = state.store.read().await;
    HasTable::<R>::table(&*store)
        .get(&id)
        .cloned()
        .map(Json)
        .ok_or_else(|| read_error(Error::NotFound { kind: R::KIND, id }))
}

pub async fn update<R>(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(patch): Json<Value>,
) -> ApiResult<R>
where
    R: Record,
    Store: HasTable<R>,
{
    let patch: R::Patch = body(R::KIND, patch)?;
    let mut store = state.store.write().await;
    IntegrityEnforcer::new(&mut store)
        .update::<R>(&id, patch)
        .map(Json)
        .map_err(write_error)
}

pub async fn create_account(
    State(state): State<Arc<AppState>>,
    Json(draft): Json<Value>,
) -> Result<(StatusCode, Json<Account>), ApiError> {
    let draft = body(Account::KIND, draft)?;
    let mut store = state.store.write().await;
    let account = IntegrityEnforcer::new(&mut store).create_account(draft);
    Ok((StatusCode::CREATED, Json(account)))
}

pub async fn create_profile(
    State(state): State<Arc<AppState>>,
    Json(draft): Json<Value>,
) -> Result<(StatusCode, Json<Profile>), ApiError> {
    let draft = body(Profile::KIND, draft)?;
    let mut store = state.store.write().await;
    let profile = IntegrityEnforcer::new(&mut store)
        .create_profile(draft)
        .map_err(write_error)?;
    Ok((StatusCode::CREATED, Json(profile)))
}

pub async fn create_post(
    State(state): State<Arc<AppState>>,
    Json(draft): Json<Value>,
) -> Result<(StatusCode, Json<Post>), ApiError> {
    let draft = body(Post::KIND, draft)?;
    let mut store = state.store.write().await;
    let post = IntegrityEnforcer::new(&mut store)
        .create_post(draft)
        .map_err(write_error)?;
    Ok((StatusCode::CREATED, Json(post)))
}

/// DELETE /accounts/{id} - cascades to the account's profile, posts and subscriptions
pub async fn delete_account(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<Account> {
    let mut store = state.store.write().await;
    IntegrityEnforcer::new(&mut store)
        .delete_account(&id)
        .map(Json)
        .map_err(write_error)
}

pub async fn delete_profile(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<Profile> {
    let mut store = state.store.write().await;
    IntegrityEnforcer::new(&mut store)
        .delete_profile(&id)
        .map(Json)
        .map_err(write_error)
}

pub async fn delete_post(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<Post> {
    let mut store = state.store.write().await;
    IntegrityEnforcer::new(&mut store)
        .delete_post(&id)
        .map(Json)
        .map_err(write_error)
}

/// DELETE /membership-tiers/{id} - profiles keep the dangling tier id
pub async fn delete_membership_tier(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<MembershipTier> {
    let mut store = state.store.write().await;
    IntegrityEnforcer::new(&mut store)
        .delete_membership_tier(&id)
        .map(Json)
        .map_err(write_error)
}

/// POST /accounts/{id}/subscribeTo - add `{id}` to the subscriber list of `accountId`
pub async fn subscribe_to(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(payload): Json<Value>,
) -> ApiResult<Account> {
    let payload: SubscriptionBody = body(Account::KIND, payload)?;
    let mut store = state.store.write().await;
    IntegrityEnforcer::new(&mut store)
        .subscribe(&id, &payload.account_id)
        .map(Json)
        .map_err(write_error)
}

pub async fn unsubscribe_from(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(payload): Json<Value>,
) -> ApiResult<Account> {
    let payload: SubscriptionBody = body(Account::KIND, payload)?;
    let mut store = state.store.write().await;
    IntegrityEnforcer::new(&mut store)
        .unsubscribe(&id, &payload.account_id)
        .map(Json)
        .map_err(write_error)
}

pub async fn get_stats(State(state): State<Arc<AppState>>) -> Json<StoreStats> {
    let store = state.store.read().await;
    Json(store.stats())
}
