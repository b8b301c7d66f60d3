use axum::{
    Router,
    http::HeaderValue,
    middleware,
    routing::{get, post},
};
use std::sync::Arc;
use tokio::sync::RwLock;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::config::Config;
use crate::state::SharedState;

mod addresses;
pub mod auth;
mod contacts;
mod error;
mod observability;
pub mod rpc;
mod system;
mod types;

pub use error::ApiError;
pub use types::*;

use crate::services::{AddressService, AuthService, ContactService};
use metrics_exporter_prometheus::PrometheusHandle;

#[derive(Clone)]
pub struct AppState {
    pub shared: Arc<SharedState>,

    pub start_time: std::time::Instant,

    pub prometheus_handle: Option<PrometheusHandle>,
}

impl AppState {
    #[must_use]
    pub fn config(&self) -> &Arc<RwLock<Config>> {
        &self.shared.config
    }

    #[must_use]
    pub fn store(&self) -> &crate::db::Store {
        &self.shared.store
    }

    #[must_use]
    pub fn auth_service(&self) -> &Arc<dyn AuthService> {
        &self.shared.auth_service
    }

    #[must_use]
    pub fn contact_service(&self) -> &Arc<dyn ContactService> {
        &self.shared.contact_service
    }

    #[must_use]
    pub fn address_service(&self) -> &Arc<dyn AddressService> {
        &self.shared.address_service
    }
}

#[must_use]
pub fn create_app_state(
    shared: Arc<SharedState>,
    prometheus_handle: Option<PrometheusHandle>,
) -> Arc<AppState> {
    Arc::new(AppState {
        shared,
        start_time: std::time::Instant::now(),
        prometheus_handle,
    })
}

pub async fn create_app_state_from_config(
    config: Config,
    prometheus_handle: Option<PrometheusHandle>,
) -> anyhow::Result<Arc<AppState>> {
    let shared = Arc::new(SharedState::new(config).await?);
    Ok(create_app_state(shared, prometheus_handle))
}

pub async fn router(state: Arc<AppState>) -> Router {
    let cors_origins = {
        let config = state.config().read().await;
        config.server.cors_allowed_origins.clone()
    };

    let protected_routes = create_protected_router(state.clone());

    let api_router = Router::new()
        .merge(protected_routes)
        .route("/register", post(auth::register))
        .route("/login", post(auth::login))
        .route("/health", get(system::health))
        // RPC authenticates per operation: createUser and login are public.
        .route("/rpc", post(rpc::handle))
        .route("/rpc/{operation}", post(rpc::handle_named))
        .with_state(state.clone());

    let cors_layer = if cors_origins.contains(&"*".to_string()) {
        CorsLayer::new().allow_origin(Any)
    } else {
        let origins: Vec<HeaderValue> =
            cors_origins.iter().filter_map(|s| s.parse().ok()).collect();
        CorsLayer::new().allow_origin(origins)
    };

    Router::new()
        .nest("/api", api_router)
        .layer(cors_layer.allow_methods(Any).allow_headers(Any))
        .layer(middleware::from_fn(
            observability::security_headers_middleware,
        ))
        // Innermost of the two so its span is current when auth records `user_id`.
        .layer(middleware::from_fn(observability::logging_middleware))
        .layer(TraceLayer::new_for_http())
}

fn create_protected_router(state: Arc<AppState>) -> Router<Arc<AppState>> {
    Router::new()
        .route("/logout", post(auth::logout))
        .route(
            "/user",
            get(auth::current_user)
                .put(auth::update_user)
                .patch(auth::update_user),
        )
        .route(
            "/contacts",
            get(contacts::list_contacts).post(contacts::create_contact),
        )
        .route(
            "/contacts/{id}",
            get(contacts::get_contact)
                .put(contacts::update_contact)
                .patch(contacts::update_contact)
                .delete(contacts::delete_contact),
        )
        .route(
            "/contacts/{id}/addresses",
            get(addresses::list_addresses).post(addresses::create_address),
        )
        .route(
            "/contacts/{id}/addresses/{address_id}",
            get(addresses::get_address)
                .put(addresses::update_address)
                .patch(addresses::update_address)
                .delete(addresses::delete_address),
        )
        .route("/metrics", get(observability::get_metrics))
        .route_layer(middleware::from_fn_with_state(
            state,
            auth::auth_middleware,
        ))
}
