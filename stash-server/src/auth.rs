//! Bearer-token identity boundary
//!
//! Authentication itself lives with the external auth provider; the server
//! only resolves an opaque `Authorization: Bearer <token>` header to an
//! owner id via the `api_tokens` table. Anything else is a 401 before any
//! processing happens.

use std::sync::Arc;

use axum::async_trait;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum::http::StatusCode;
use axum::Json;
use uuid::Uuid;

use crate::http::{ErrorResponse, HttpState};

/// The authenticated owner of the request.
#[derive(Debug, Clone, Copy)]
pub struct AuthedUser(pub Uuid);

fn unauthorized(msg: &str) -> (StatusCode, Json<ErrorResponse>) {
    (StatusCode::UNAUTHORIZED, Json(ErrorResponse::new(msg)))
}

#[async_trait]
impl FromRequestParts<Arc<HttpState>> for AuthedUser {
    type Rejection = (StatusCode, Json<ErrorResponse>);

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<HttpState>,
    ) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(axum::http::header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| unauthorized("No authorization header"))?;

        let token = header
            .strip_prefix("Bearer ")
            .ok_or_else(|| unauthorized("No authorization header"))?;

        let row: Option<(Uuid,)> =
            sqlx::query_as("SELECT user_id FROM api_tokens WHERE token = $1")
                .bind(token)
                .fetch_optional(&state.pool)
                .await
                .map_err(|e| {
                    tracing::error!(error = %e, "Token lookup failed");
                    unauthorized("Unauthorized")
                })?;

        match row {
            Some((user_id,)) => Ok(AuthedUser(user_id)),
            None => Err(unauthorized("Unauthorized")),
        }
    }
}
