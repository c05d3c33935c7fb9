use axum::Json;
use axum::extract::{Query, State};
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};

use crate::application::ports::{CompletionClient, IdentityVerifier, Retriever};
use crate::domain::UserId;
use crate::presentation::state::AppState;

#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

#[derive(Deserialize)]
pub struct VerifyTokenParams {
    pub token: String,
}

#[derive(Serialize)]
pub struct VerifyTokenResponse {
    pub user_id: String,
}

#[tracing::instrument(skip(state, params))]
pub async fn verify_token_handler<C, R>(
    State(state): State<AppState<C, R>>,
    Query(params): Query<VerifyTokenParams>,
) -> impl IntoResponse
where
    C: CompletionClient + 'static,
    R: Retriever + 'static,
{
    match state.identity_verifier.verify(&params.token) {
        Ok(user_id) => (
            StatusCode::OK,
            Json(VerifyTokenResponse {
                user_id: user_id.into_string(),
            }),
        )
            .into_response(),
        Err(e) => {
            tracing::warn!(error = %e, "Token verification failed");
            (
                StatusCode::UNAUTHORIZED,
                Json(ErrorResponse {
                    error: e.to_string(),
                }),
            )
                .into_response()
        }
    }
}

/// Resolves the caller from the `Authorization: Bearer` header. A missing
/// credential is 403, a bad or expired one is 401.
pub(super) fn authenticate(
    headers: &HeaderMap,
    verifier: &dyn IdentityVerifier,
) -> Result<UserId, Response> {
    let token = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "));

    match token {
        None => Err((
            StatusCode::FORBIDDEN,
            Json(ErrorResponse {
                error: "Not authenticated".to_string(),
            }),
        )
            .into_response()),
        Some(token) => verifier.verify(token).map_err(|e| {
            (
                StatusCode::UNAUTHORIZED,
                Json(ErrorResponse {
                    error: e.to_string(),
                }),
            )
                .into_response()
        }),
    }
}
