//! Caller identity extraction.

use async_trait::async_trait;
use axum::{extract::FromRequestParts, http::request::Parts};
use moneypot_core::AccountId;

use super::error::ApiError;

/// Header carrying the authenticated caller's account id.
pub const CALLER_HEADER: &str = "x-caller";

/// The account on whose behalf a request is made.
///
/// Authentication happens in front of the node; the header is trusted as-is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Caller(pub AccountId);

#[async_trait]
impl<S> FromRequestParts<S> for Caller
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let value = parts
            .headers
            .get(CALLER_HEADER)
            .ok_or(ApiError::MissingCaller)?;
        let id = value
            .to_str()
            .map_err(|_| ApiError::BadRequest(format!("{CALLER_HEADER} must be visible ASCII")))?
            .trim();

        if id.is_empty() {
            return Err(ApiError::MissingCaller);
        }
        Ok(Caller(AccountId::new(id)))
    }
}
