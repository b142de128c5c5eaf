use actix_web::{web, HttpResponse};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::user::{Signup, User};
use crate::errors::AppError;
use crate::AppState;

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SignupRequest {
    #[serde(default)]
    pub first_name: String,
    pub last_name: Option<String>,
    #[serde(default)]
    pub email_id: String,
    #[serde(default)]
    pub password: String,
    /// customer, restaurant, delivery or admin
    #[serde(default)]
    pub role: String,
    /// male, female or other
    pub gender: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: String,
    pub first_name: String,
    pub last_name: Option<String>,
    pub email_id: String,
    pub role: String,
    pub gender: Option<String>,
    pub status: String,
    pub created_at: String,
    pub updated_at: String,
}

impl From<User> for UserResponse {
    fn from(u: User) -> Self {
        Self {
            id: u.id.into(),
            first_name: u.first_name,
            last_name: u.last_name,
            email_id: u.email,
            role: u.role.as_str().to_string(),
            gender: u.gender.map(|g| g.as_str().to_string()),
            status: u.status.as_str().to_string(),
            created_at: u.created_at.to_rfc3339(),
            updated_at: u.updated_at.to_rfc3339(),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SignupResponse {
    pub message: String,
    pub data: UserResponse,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserLoginRequest {
    pub email_id: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct UserLoginResponse {
    pub message: String,
    pub token: String,
    pub data: UserResponse,
}

#[utoipa::path(
    post,
    path = "/api/signup",
    request_body = SignupRequest,
    responses(
        (status = 200, description = "User created", body = SignupResponse),
        (status = 400, description = "Invalid field or email already registered"),
    ),
    tag = "users"
)]
pub async fn signup(
    state: web::Data<AppState>,
    body: web::Json<SignupRequest>,
) -> Result<HttpResponse, AppError> {
    let body = body.into_inner();
    let request = Signup {
        first_name: body.first_name,
        last_name: body.last_name,
        email: body.email_id,
        password: body.password,
        role: body.role,
        gender: body.gender,
    };
    let user = web::block(move || state.users.signup(request)).await??;

    Ok(HttpResponse::Ok().json(SignupResponse {
        message: "User Added successfully!".to_string(),
        data: user.into(),
    }))
}

/// POST /api/login
#[utoipa::path(
    post,
    path = "/api/login",
    request_body = UserLoginRequest,
    responses(
        (status = 200, description = "Logged in", body = UserLoginResponse),
        (status = 400, description = "Invalid credentials"),
    ),
    tag = "users"
)]
pub async fn login(
    state: web::Data<AppState>,
    body: web::Json<UserLoginRequest>,
) -> Result<HttpResponse, AppError> {
    let body = body.into_inner();
    let login = web::block(move || {
        state
            .users
            .login(body.email_id.as_deref(), body.password.as_deref())
    })
    .await??;

    Ok(HttpResponse::Ok().json(UserLoginResponse {
        message: "Login successful".to_string(),
        token: login.token,
        data: login.user.into(),
    }))
}
