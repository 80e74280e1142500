//! Tarmac API
//!
//! HTTP surface for the plan catalog and router catalog: bearer-token
//! authentication, permission-gated handlers, and the error-to-status
//! mapping. The server binary lives in `main.rs`; everything needed to
//! assemble the application is exported here so integration tests drive
//! the real router.

use std::sync::Arc;

use axum::{
    extract::Request,
    middleware::{self, Next},
    response::Response,
    routing::{delete, get},
    Router,
};
use tarmac_core::{PlanService, PlanStore};
use tarmac_router::RouterCatalogService;
use uuid::Uuid;

pub mod auth;
pub mod handlers;

use auth::TokenVerifier;

/// Request ID for tracking requests through the system
#[derive(Debug, Clone)]
pub struct RequestId(pub String);

/// Middleware to add a request ID to every request
pub async fn request_id_middleware(mut req: Request, next: Next) -> Response {
    let request_id = RequestId(Uuid::new_v4().to_string());
    req.extensions_mut().insert(request_id);
    next.run(req).await
}

/// Application state shared across handlers
pub struct AppState<S> {
    pub plans: Arc<PlanService<S>>,
    pub catalog: Arc<RouterCatalogService>,
}

impl<S> Clone for AppState<S> {
    fn clone(&self) -> Self {
        Self {
            plans: self.plans.clone(),
            catalog: self.catalog.clone(),
        }
    }
}

/// Assemble the application router.
///
/// Every route sits behind the request-id and authentication layers;
/// permission checks happen per handler.
pub fn build_router<S: PlanStore + 'static>(
    state: AppState<S>,
    verifier: Arc<dyn TokenVerifier>,
) -> Router {
    Router::new()
        .route("/routers", get(handlers::list_routers::<S>))
        .route("/plans/routers", get(handlers::list_plan_routers::<S>))
        .route(
            "/plans",
            get(handlers::list_plans::<S>).post(handlers::create_plan::<S>),
        )
        .route("/plans/{name}", delete(handlers::remove_plan::<S>))
        .layer(middleware::from_fn_with_state(verifier, auth::auth_middleware))
        .layer(middleware::from_fn(request_id_middleware))
        .with_state(state)
}
