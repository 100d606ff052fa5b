use actix_web::{web, HttpResponse};
use serde::Deserialize;
use serde_json::json;
use utoipa::ToSchema;

use crate::application::contact_service::ContactService;
use crate::domain::contact::NewContactMessage;
use crate::errors::AppError;
use crate::AppState;

#[derive(Debug, Deserialize, ToSchema)]
pub struct ContactRequest {
    pub name: String,
    pub email: String,
    pub message: String,
}

/// POST /contact
#[utoipa::path(
    post,
    path = "/contact",
    request_body = ContactRequest,
    responses(
        (status = 201, description = "Message stored"),
        (status = 400, description = "Missing field or invalid email"),
    ),
    tag = "contact"
)]
pub async fn submit_contact(
    state: web::Data<AppState>,
    body: web::Json<ContactRequest>,
) -> Result<HttpResponse, AppError> {
    let body = body.into_inner();
    let msg = NewContactMessage {
        name: body.name,
        email: body.email,
        message: body.message,
    };
    let store = state.store.clone();

    web::block(move || ContactService::new(store).submit(msg))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;

    Ok(HttpResponse::Created().json(json!({ "message": "Message received" })))
}
