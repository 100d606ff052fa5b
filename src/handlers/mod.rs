pub mod contact;
pub mod health;
pub mod orders;
pub mod payments;
pub mod products;

use actix_web::HttpRequest;

use crate::errors::AppError;
use crate::AppState;

pub const ADMIN_KEY_HEADER: &str = "X-Admin-Key";

/// Guards admin routes. With no key configured every caller is let through.
pub fn require_admin(req: &HttpRequest, state: &AppState) -> Result<(), AppError> {
    let Some(expected) = state.admin_api_key.as_deref() else {
        return Ok(());
    };

    match req
        .headers()
        .get(ADMIN_KEY_HEADER)
        .and_then(|v| v.to_str().ok())
    {
        Some(key) if key == expected => Ok(()),
        _ => Err(AppError::Forbidden),
    }
}
