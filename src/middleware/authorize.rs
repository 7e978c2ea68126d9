use axum::{
    body::Body,
    extract::{Request, State},
    http::{Response, StatusCode},
    middleware::Next,
    response::IntoResponse,
    BoxError, Json,
};
use serde_json::json;
use strum_macros::AsRefStr;
use tracing::{error, info, instrument};

use crate::{
    authorizer::{Authorizer, RoleSource},
    principal::CurrentUser,
    route::RouteMeta,
    trace_err,
};

#[derive(Debug, thiserror::Error, AsRefStr)]
#[strum(serialize_all = "snake_case")]
pub enum AuthzError {
    #[error("You are unauthorized to perform the requested action")]
    Unauthorized,

    #[error("No authenticated principal attached to the request")]
    MissingPrincipal,

    #[error("Matched route carries no authorization metadata")]
    MissingRouteMeta,

    #[error("Role lookup failed")]
    RoleLookup(#[source] BoxError),

    #[error("Policy evaluation failed")]
    Evaluation(#[from] casbin::Error),
}

impl IntoResponse for AuthzError {
    fn into_response(self) -> axum::response::Response {
        let status = match &self {
            // A denial is a policy outcome, not a fault in the chain.
            AuthzError::Unauthorized => StatusCode::UNAUTHORIZED,
            AuthzError::MissingPrincipal
            | AuthzError::MissingRouteMeta
            | AuthzError::RoleLookup { .. }
            | AuthzError::Evaluation { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        };

        if status == StatusCode::UNAUTHORIZED {
            info!(error = ?self, "request denied");
        } else {
            error!(error = ?self, "AuthzError");
        }

        let body = Json(json!({
            "error": self.as_ref(),
            "message": self.to_string(),
        }));

        (status, body).into_response()
    }
}

/// Gates a route behind a policy decision. Compose per route with
/// `axum::middleware::from_fn_with_state(authorizer, authorize)`, layered
/// inside the route's `Extension(RouteMeta)` and below the authentication
/// layer, so both the metadata and the principal are already attached when
/// the gate reads the request (see [`RouteMeta`]).
#[instrument(name = "middleware::authorize", skip_all)]
pub async fn authorize(
    State(authorizer): State<Authorizer>,
    request: Request,
    next: Next,
) -> Result<Response<Body>, AuthzError> {
    let role = trace_err!(resolve_role(&authorizer, &request), "failed to resolve role")?;
    let meta = trace_err!(resolve_route_meta(&request), "failed to resolve route metadata")?;

    info!(role = %role, resource = %meta.resource(), action = %meta.action(), "authorize middleware");

    let allowed = authorizer
        .evaluate(&role, meta.resource(), meta.action())
        .await?;
    if allowed {
        return Ok(next.run(request).await);
    }

    Err(AuthzError::Unauthorized)
}

#[instrument(name = "resolve_role", skip_all)]
fn resolve_role(authorizer: &Authorizer, request: &Request) -> Result<String, AuthzError> {
    match authorizer.role_source() {
        RoleSource::Getter(getter) => getter(request).map_err(AuthzError::RoleLookup),
        RoleSource::Principal => request
            .extensions()
            .get::<CurrentUser>()
            .map(|user| user.role.clone())
            .ok_or(AuthzError::MissingPrincipal),
    }
}

fn resolve_route_meta(request: &Request) -> Result<RouteMeta, AuthzError> {
    request
        .extensions()
        .get::<RouteMeta>()
        .cloned()
        .ok_or(AuthzError::MissingRouteMeta)
}
