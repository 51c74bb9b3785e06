//! Bearer token authentication and role guards.

use axum::{
    extract::{FromRequestParts, Request, State},
    middleware::Next,
    response::Response,
};
use axum_auth::AuthBearer;
use serde_json::json;

use crate::domain::entities::{Principal, Role};
use crate::{error::AppError, state::AppState};

/// Raw bearer token of the current request, kept so logout can revoke it.
#[derive(Debug, Clone)]
pub struct SessionToken(pub String);

/// Guards `/api/admin/*`.
pub async fn admin(
    State(st): State<AppState>,
    req: Request,
    next: Next,
) -> Result<Response, AppError> {
    authorize(&st, req, next, Role::Admin).await
}

/// Guards `/api/vendor/*`.
pub async fn vendor(
    State(st): State<AppState>,
    req: Request,
    next: Next,
) -> Result<Response, AppError> {
    authorize(&st, req, next, Role::Vendor).await
}

/// Guards `/api/user/*`.
pub async fn user(
    State(st): State<AppState>,
    req: Request,
    next: Next,
) -> Result<Response, AppError> {
    authorize(&st, req, next, Role::User).await
}

/// Authenticates requests using Bearer tokens from Authorization header.
///
/// # Header Format
///
/// ```text
/// Authorization: Bearer <token>
/// ```
///
/// # Authentication Flow
///
/// 1. Extract token from `Authorization` header
/// 2. Resolve the session by token hash (unknown, revoked or expired → 401)
/// 3. Require the session role to match the route group (→ 403)
/// 4. Require the account behind the session to still be active (→ 403)
/// 5. Insert [`Principal`] and [`SessionToken`] into request extensions
///
/// Adds `WWW-Authenticate: Bearer` header to 401 responses per RFC 6750.
///
/// # Example
///
/// ```rust,ignore
/// use axum::{Router, routing::get, middleware};
/// use crate::api::middleware::auth;
///
/// let vendor_routes = Router::new()
///     .route("/me", get(vendor_me_handler))
///     .route_layer(middleware::from_fn_with_state(state.clone(), auth::vendor));
/// ```
async fn authorize(
    st: &AppState,
    req: Request,
    next: Next,
    required: Role,
) -> Result<Response, AppError> {
    let (mut parts, body) = req.into_parts();

    let AuthBearer(token) = AuthBearer::from_request_parts(&mut parts, &())
        .await
        .map_err(|_| {
            AppError::unauthorized(
                "Unauthorized",
                json!({"reason": "Authorization header is missing or invalid"}),
            )
        })?;

    let principal = st.auth_service.authenticate(&token).await?;

    if principal.role != required {
        return Err(AppError::forbidden(
            "Insufficient role",
            json!({"required": required.as_str(), "actual": principal.role.as_str()}),
        ));
    }

    ensure_account_active(st, principal).await?;

    parts.extensions.insert(principal);
    parts.extensions.insert(SessionToken(token));

    Ok(next.run(Request::from_parts(parts, body)).await)
}

async fn ensure_account_active(st: &AppState, principal: Principal) -> Result<(), AppError> {
    match principal.role {
        Role::Admin => {
            st.admin_service.ensure_active(principal.subject_id).await?;
        }
        Role::Vendor => {
            st.catalog_service
                .ensure_vendor_active(principal.subject_id)
                .await?;
        }
        Role::User => {
            st.user_service.ensure_active(principal.subject_id).await?;
        }
    }
    Ok(())
}
