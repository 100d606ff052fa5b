use actix_web::http::StatusCode;
use actix_web::HttpResponse;
use thiserror::Error;

use crate::domain::errors::DomainError;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    BadRequest(String),

    #[error("Forbidden")]
    Forbidden,

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    #[error("Service unavailable: {0}")]
    Unavailable(String),

    #[error("Payment provider error: {0}")]
    PaymentProvider(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<DomainError> for AppError {
    fn from(e: DomainError) -> Self {
        match e {
            DomainError::Validation(_) => AppError::BadRequest(e.to_string()),
            DomainError::ProductNotFound(_) | DomainError::OrderNotFound(_) => {
                AppError::NotFound(e.to_string())
            }
            DomainError::OutOfStock { .. } => AppError::Conflict(e.to_string()),
            DomainError::StoreUnavailable(msg) => AppError::Unavailable(msg),
            DomainError::PaymentProvider(msg) => AppError::PaymentProvider(msg),
            DomainError::Internal(msg) => AppError::Internal(msg),
        }
    }
}

impl actix_web::ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Forbidden => StatusCode::FORBIDDEN,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            AppError::PaymentProvider(_) => StatusCode::BAD_GATEWAY,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        // Infrastructure details stay in the log.
        let message = match self {
            AppError::Unavailable(detail) => {
                log::error!("Store unavailable: {}", detail);
                "Service temporarily unavailable".to_string()
            }
            AppError::PaymentProvider(detail) => {
                log::error!("Payment provider failure: {}", detail);
                "Payment provider error".to_string()
            }
            AppError::Internal(detail) => {
                log::error!("Internal error: {}", detail);
                "Internal server error".to_string()
            }
            other => other.to_string(),
        };

        HttpResponse::build(self.status_code()).json(serde_json::json!({ "error": message }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::ResponseError;
    use uuid::Uuid;

    #[test]
    fn not_found_returns_404() {
        let resp = AppError::NotFound("Order x not found".to_string()).error_response();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn internal_error_returns_500() {
        let err = AppError::Internal("something went wrong".to_string());
        assert_eq!(
            err.error_response().status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn validation_maps_to_bad_request() {
        let app_err: AppError = DomainError::validation("bad value").into();
        assert!(matches!(app_err, AppError::BadRequest(_)));
        assert_eq!(app_err.to_string(), "Invalid input: bad value");
    }

    #[test]
    fn domain_not_found_maps_to_app_not_found() {
        let app_err: AppError = DomainError::ProductNotFound(Uuid::nil()).into();
        assert!(matches!(app_err, AppError::NotFound(_)));
        let app_err: AppError = DomainError::OrderNotFound("ref".to_string()).into();
        assert!(matches!(app_err, AppError::NotFound(_)));
    }

    #[test]
    fn out_of_stock_is_conflict() {
        let app_err: AppError = DomainError::OutOfStock {
            product_id: Uuid::nil(),
            requested: 3,
            available: 2,
        }
        .into();
        assert_eq!(app_err.status_code(), StatusCode::CONFLICT);
    }

    #[test]
    fn store_and_provider_failures_are_transient_statuses() {
        let store: AppError = DomainError::StoreUnavailable("pool timeout".to_string()).into();
        assert_eq!(store.status_code(), StatusCode::SERVICE_UNAVAILABLE);

        let provider: AppError = DomainError::PaymentProvider("502 upstream".to_string()).into();
        assert_eq!(provider.status_code(), StatusCode::BAD_GATEWAY);
    }

    #[test]
    fn forbidden_display() {
        assert_eq!(AppError::Forbidden.to_string(), "Forbidden");
        assert_eq!(
            AppError::Forbidden.error_response().status(),
            StatusCode::FORBIDDEN
        );
    }
}
