//! Authentication and permission checks
//!
//! Requests carry a bearer token which a [`TokenVerifier`] resolves to an
//! [`Identity`] before any handler runs; the identity is attached to
//! request extensions. Permission checks are synchronous predicates over
//! the identity's permission set, evaluated in handlers before any
//! catalog or store call.
//!
//! # Security Model
//!
//! - A missing or unknown token is rejected with 401 by the middleware.
//! - A known token with an insufficient permission set is rejected with
//!   403 by the handler's permission guard, before any service work.
//! - Token verification itself is pluggable; the static table
//!   implementation reads the `auth:tokens` configuration subtree.

use std::collections::{HashMap, HashSet};

use axum::{
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use std::sync::Arc;
use tarmac_core::{ConfigSnapshot, PlanError, Result};
use tracing::debug;

use crate::handlers::ErrorResponse;
use crate::RequestId;

/// A permission scope a caller may hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Permission {
    /// Create applications; also gates the router catalog views
    AppCreate,
    /// Create resource plans
    PlanCreate,
    /// Remove resource plans
    PlanDelete,
}

impl Permission {
    pub fn as_str(&self) -> &'static str {
        match self {
            Permission::AppCreate => "app.create",
            Permission::PlanCreate => "plan.create",
            Permission::PlanDelete => "plan.delete",
        }
    }

    /// Parse a scope string such as `app.create`.
    pub fn parse(scope: &str) -> Option<Self> {
        match scope {
            "app.create" => Some(Permission::AppCreate),
            "plan.create" => Some(Permission::PlanCreate),
            "plan.delete" => Some(Permission::PlanDelete),
            _ => None,
        }
    }
}

impl std::fmt::Display for Permission {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The caller identity resolved from a verified token.
#[derive(Debug, Clone)]
pub struct Identity {
    user: String,
    permissions: HashSet<Permission>,
}

impl Identity {
    pub fn new(user: &str, permissions: impl IntoIterator<Item = Permission>) -> Self {
        Self {
            user: user.to_string(),
            permissions: permissions.into_iter().collect(),
        }
    }

    pub fn user(&self) -> &str {
        &self.user
    }

    /// Whether the caller holds the given permission scope.
    pub fn has_permission(&self, permission: Permission) -> bool {
        self.permissions.contains(&permission)
    }
}

/// Token verification seam.
///
/// Implementations turn an opaque bearer token into a caller identity.
/// How tokens are minted and stored is outside this core.
pub trait TokenVerifier: Send + Sync {
    fn verify(&self, token: &str) -> Option<Identity>;
}

/// Token table built once at startup, typically from configuration.
#[derive(Debug, Default)]
pub struct StaticTokenVerifier {
    tokens: HashMap<String, Identity>,
}

impl StaticTokenVerifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a token for the given identity.
    pub fn insert(&mut self, token: &str, identity: Identity) {
        self.tokens.insert(token.to_string(), identity);
    }

    /// Build the token table from the `auth:tokens` configuration subtree.
    ///
    /// Each entry maps a token to a record with a `user` and an optional
    /// `permissions` list of scope strings. Unknown scopes are a startup
    /// configuration error, not silently dropped.
    pub fn from_config(config: &ConfigSnapshot) -> Result<Self> {
        let mut verifier = Self::new();
        let Some(tokens) = config.subtree("auth:tokens") else {
            return Ok(verifier);
        };

        for (token, record) in tokens {
            let user = record.get("user").and_then(|v| v.as_str()).ok_or_else(|| {
                PlanError::Config("auth token entry does not declare a user".to_string())
            })?;
            let mut permissions = Vec::new();
            if let Some(scopes) = record.get("permissions").and_then(|v| v.as_array()) {
                for scope in scopes {
                    let scope = scope.as_str().ok_or_else(|| {
                        PlanError::Config(format!("invalid permission entry for user {:?}", user))
                    })?;
                    let permission = Permission::parse(scope).ok_or_else(|| {
                        PlanError::Config(format!("unknown permission scope {:?}", scope))
                    })?;
                    permissions.push(permission);
                }
            }
            verifier.insert(token, Identity::new(user, permissions));
        }
        Ok(verifier)
    }
}

impl TokenVerifier for StaticTokenVerifier {
    fn verify(&self, token: &str) -> Option<Identity> {
        self.tokens.get(token).cloned()
    }
}

/// Extract the bearer token from the Authorization header.
///
/// The scheme is matched case-insensitively.
fn extract_bearer_token(req: &Request) -> Option<String> {
    let header = req
        .headers()
        .get(axum::http::header::AUTHORIZATION)?
        .to_str()
        .ok()?;
    let (scheme, token) = header.split_once(' ')?;
    if scheme.eq_ignore_ascii_case("bearer") {
        Some(token.trim().to_string())
    } else {
        None
    }
}

fn request_id_of(req: &Request) -> String {
    req.extensions()
        .get::<RequestId>()
        .map(|id| id.0.clone())
        .unwrap_or_default()
}

/// Middleware resolving the bearer token to an [`Identity`].
///
/// Rejects with 401 before the handler runs when the token is missing or
/// unknown.
pub async fn auth_middleware(
    State(verifier): State<Arc<dyn TokenVerifier>>,
    mut req: Request,
    next: Next,
) -> Response {
    let request_id = request_id_of(&req);

    let Some(token) = extract_bearer_token(&req) else {
        return unauthorized("missing authorization token", &request_id);
    };

    match verifier.verify(&token) {
        Some(identity) => {
            debug!(user = %identity.user(), "authenticated request");
            req.extensions_mut().insert(identity);
            next.run(req).await
        }
        None => unauthorized("invalid authorization token", &request_id),
    }
}

fn unauthorized(message: &str, request_id: &str) -> Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(ErrorResponse {
            error: message.to_string(),
            request_id: request_id.to_string(),
        }),
    )
        .into_response()
}

/// Guard a handler behind a permission scope.
///
/// Evaluated before any catalog or store call; has no side effects.
pub fn require_permission(
    identity: &Identity,
    permission: Permission,
    request_id: &str,
) -> std::result::Result<(), (StatusCode, Json<ErrorResponse>)> {
    if identity.has_permission(permission) {
        Ok(())
    } else {
        Err((
            StatusCode::FORBIDDEN,
            Json(ErrorResponse {
                error: format!("permission denied: requires {}", permission),
                request_id: request_id.to_string(),
            }),
        ))
    }
}
