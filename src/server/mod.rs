use axum::{
    routing::{get, post},
    Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::sync::RwLock;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use crate::config::ServiceConfig;
use crate::record::{Account, MembershipTier, Post, Profile};
use crate::storage::Store;

pub mod graph;
pub mod routes;

/// Server state
///
/// The store sits behind one lock: reads hold the shared guard for a whole
/// resolution pass, mutations hold the exclusive guard for their whole
/// check-then-act sequence.
pub struct AppState {
    pub store: RwLock<Store>,
}

impl AppState {
    pub fn new(store: Store) -> Self {
        Self {
            store: RwLock::new(store),
        }
    }
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/accounts", get(routes::list::<Account>).post(routes::create_account))
        .route(
            "/accounts/{id}",
            get(routes::get_one::<Account>)
                .patch(routes::update::<Account>)
                .delete(routes::delete_account),
        )
        .route("/accounts/{id}/subscribeTo", post(routes::subscribe_to))
        .route("/accounts/{id}/unsubscribeFrom", post(routes::unsubscribe_from))
        .route("/profiles", get(routes::list::<Profile>).post(routes::create_profile))
        .route(
            "/profiles/{id}",
            get(routes::get_one::<Profile>)
                .patch(routes::update::<Profile>)
                .delete(routes::delete_profile),
        )
        .route("/posts", get(routes::list::<Post>).post(routes::create_post))
        .route(
            "/posts/{id}",
            get(routes::get_one::<Post>)
                .patch(routes::update::<Post>)
                .delete(routes::delete_post),
        )
        .route("/membership-tiers", get(routes::list::<MembershipTier>))
        .route(
            "/membership-tiers/{id}",
            get(routes::get_one::<MembershipTier>)
                .patch(routes::update::<MembershipTier>)
                .delete(routes::delete_membership_tier),
        )
        .route("/graphql", post(graph::handle_graph))
        .route("/stats", get(routes::get_stats))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

pub async fn start_server(config: &ServiceConfig, store: Store) -> anyhow::Result<()> {
    let state = Arc::new(AppState::new(store));
    let app = router(state);

    let listener = tokio::net::TcpListener::bind(config.bind_address()).await?;
    let addr: SocketAddr = listener.local_addr()?;
    tracing::info!("Starting server on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
