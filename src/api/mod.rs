//! API handlers for Sharestead REST endpoints

pub mod bookings;
pub mod health;
pub mod items;
pub mod openapi;
pub mod requests;
pub mod users;

use axum::{async_trait, extract::FromRequestParts, http::request::Parts};

use crate::{error::AppError, AppState};

/// Name of the header carrying the caller's user id
pub const SHARER_USER_ID: &str = "X-Sharer-User-Id";

/// Extractor for the caller identity supplied out-of-band by the gateway.
///
/// The id is trusted as-is; authenticating it is the gateway's concern,
/// not this server's.
pub struct SharerId(pub i32);

#[async_trait]
impl FromRequestParts<AppState> for SharerId {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &AppState) -> Result<Self, Self::Rejection> {
        let value = parts
            .headers
            .get(SHARER_USER_ID)
            .and_then(|value| value.to_str().ok())
            .ok_or_else(|| AppError::Validation(format!("Missing {} header", SHARER_USER_ID)))?;

        let id = value
            .trim()
            .parse::<i32>()
            .map_err(|_| AppError::Validation(format!("Invalid {} header: {}", SHARER_USER_ID, value)))?;

        Ok(SharerId(id))
    }
}
