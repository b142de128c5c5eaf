pub mod auth;
pub mod orders;
pub mod personnel;
pub mod users;

use actix_web::HttpResponse;
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

#[derive(OpenApi)]
#[openapi(
    info(title = "Order Service APIs"),
    paths(
        orders::place_order,
        orders::list_available,
        orders::get_order,
        orders::accept_order,
        orders::set_status,
        personnel::register,
        personnel::login,
        personnel::list_delivery_personnel,
        personnel::set_availability,
        users::signup,
        users::login,
    ),
    modifiers(&BearerAuth),
    tags(
        (name = "orders", description = "Order placement and delivery lifecycle"),
        (name = "personnel", description = "Delivery partner accounts"),
        (name = "users", description = "Customer and staff accounts"),
    )
)]
pub struct ApiDoc;

struct BearerAuth;

impl Modify for BearerAuth {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

pub async fn banner() -> HttpResponse {
    HttpResponse::Ok().body("Order Service APIs")
}

pub async fn openapi_json() -> HttpResponse {
    HttpResponse::Ok().json(ApiDoc::openapi())
}
