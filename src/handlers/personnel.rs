use actix_web::{web, HttpResponse};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::personnel::{DeliveryPersonnel, RegisterPersonnel};
use crate::errors::AppError;
use crate::handlers::auth::AuthenticatedPersonnel;
use crate::AppState;

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub contact_details: Option<String>,
    pub vehicle_type: Option<String>,
    /// "Delivery" (default) or "Admin"
    pub role: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AvailabilityRequest {
    pub is_available: Option<bool>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct RegisterResponse {
    pub id: String,
    pub message: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct LoginResponse {
    pub id: String,
    pub message: String,
    pub token: String,
}

/// Personnel as exposed over HTTP; the password hash never leaves the
/// service.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PersonnelResponse {
    pub id: String,
    pub name: String,
    pub email: String,
    pub contact_details: Option<String>,
    pub vehicle_type: Option<String>,
    pub is_available: bool,
    pub role: String,
    pub created_at: String,
    pub updated_at: String,
}

impl From<DeliveryPersonnel> for PersonnelResponse {
    fn from(p: DeliveryPersonnel) -> Self {
        Self {
            id: p.id.into(),
            name: p.name,
            email: p.email,
            contact_details: p.contact_details,
            vehicle_type: p.vehicle_type,
            is_available: p.is_available,
            role: p.role.to_string(),
            created_at: p.created_at.to_rfc3339(),
            updated_at: p.updated_at.to_rfc3339(),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PersonnelListResponse {
    pub message: String,
    pub delivery_personnel: Vec<PersonnelResponse>,
}

#[utoipa::path(
    post,
    path = "/api/customer/register",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Personnel registered", body = RegisterResponse),
        (status = 400, description = "Missing fields, unknown role or email already used"),
    ),
    tag = "personnel"
)]
pub async fn register(
    state: web::Data<AppState>,
    body: web::Json<RegisterRequest>,
) -> Result<HttpResponse, AppError> {
    let body = body.into_inner();
    let request = RegisterPersonnel {
        name: body.name,
        email: body.email,
        password: body.password,
        contact_details: body.contact_details,
        vehicle_type: body.vehicle_type,
        role: body.role,
    };
    let personnel = web::block(move || state.personnel.register(request)).await??;

    Ok(HttpResponse::Created().json(RegisterResponse {
        id: personnel.id.into(),
        message: "Welcome! Delivery Partner registered successfully".to_string(),
    }))
}

/// POST /api/customer/login
///
/// Every successful login invalidates tokens issued by earlier logins.
#[utoipa::path(
    post,
    path = "/api/customer/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Logged in", body = LoginResponse),
        (status = 400, description = "Email or password missing"),
        (status = 401, description = "Unknown email or wrong password"),
        (status = 403, description = "Account is not a delivery partner"),
    ),
    tag = "personnel"
)]
pub async fn login(
    state: web::Data<AppState>,
    body: web::Json<LoginRequest>,
) -> Result<HttpResponse, AppError> {
    let body = body.into_inner();
    let outcome = web::block(move || {
        state
            .personnel
            .login(body.email.as_deref(), body.password.as_deref())
    })
    .await??;

    Ok(HttpResponse::Ok().json(LoginResponse {
        id: outcome.personnel.id.into(),
        message: "Login successful".to_string(),
        token: outcome.token,
    }))
}

#[utoipa::path(
    get,
    path = "/api/customer/delivery-personnel",
    responses(
        (status = 200, description = "Delivery personnel", body = PersonnelListResponse),
        (status = 404, description = "No delivery personnel registered"),
    ),
    tag = "personnel"
)]
pub async fn list_delivery_personnel(state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
    let personnel = web::block(move || state.personnel.list_delivery()).await??;

    Ok(HttpResponse::Ok().json(PersonnelListResponse {
        message: "Delivery personnel fetched successfully".to_string(),
        delivery_personnel: personnel.into_iter().map(PersonnelResponse::from).collect(),
    }))
}

#[utoipa::path(
    put,
    path = "/api/customer/availability",
    request_body = AvailabilityRequest,
    responses(
        (status = 200, description = "Availability updated", body = PersonnelResponse),
        (status = 400, description = "isAvailable missing"),
        (status = 401, description = "Missing, invalid or superseded token"),
    ),
    security(("bearer_auth" = [])),
    tag = "personnel"
)]
pub async fn set_availability(
    state: web::Data<AppState>,
    caller: AuthenticatedPersonnel,
    body: web::Json<AvailabilityRequest>,
) -> Result<HttpResponse, AppError> {
    let personnel = caller.0;
    let is_available = body.into_inner().is_available;
    let updated =
        web::block(move || state.personnel.set_availability(&personnel, is_available)).await??;
    Ok(HttpResponse::Ok().json(PersonnelResponse::from(updated)))
}
