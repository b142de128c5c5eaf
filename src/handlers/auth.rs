use actix_web::dev::Payload;
use actix_web::http::header::AUTHORIZATION;
use actix_web::{web, FromRequest, HttpRequest};
use futures_util::future::LocalBoxFuture;

use crate::domain::personnel::DeliveryPersonnel;
use crate::errors::AppError;
use crate::AppState;

/// The delivery personnel behind the request's bearer token.
///
/// Rejects with 401 when the header is missing, the token does not verify,
/// or a later login has superseded it.
pub struct AuthenticatedPersonnel(pub DeliveryPersonnel);

impl FromRequest for AuthenticatedPersonnel {
    type Error = AppError;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        let state = req.app_data::<web::Data<AppState>>().cloned();
        let token = bearer_token(req);

        Box::pin(async move {
            let state =
                state.ok_or_else(|| AppError::Internal("application state is not registered".into()))?;
            let Some(token) = token else {
                log::warn!("Request without bearer token");
                return Err(AppError::Unauthorized("Not authorized, no token".into()));
            };

            let personnel = web::block(move || state.personnel.authenticate(&token)).await??;
            Ok(AuthenticatedPersonnel(personnel))
        })
    }
}

fn bearer_token(req: &HttpRequest) -> Option<String> {
    req.headers()
        .get(AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use actix_web::test::TestRequest;

    use super::*;

    #[test]
    fn extracts_token_after_bearer_prefix() {
        let req = TestRequest::default()
            .insert_header((AUTHORIZATION, "Bearer abc.def.ghi"))
            .to_http_request();
        assert_eq!(bearer_token(&req).as_deref(), Some("abc.def.ghi"));
    }

    #[test]
    fn other_schemes_and_empty_tokens_are_ignored() {
        for value in ["Basic dXNlcjpwYXNz", "Bearer ", "abc.def.ghi"] {
            let req = TestRequest::default()
                .insert_header((AUTHORIZATION, value))
                .to_http_request();
            assert_eq!(bearer_token(&req), None);
        }
        assert_eq!(bearer_token(&TestRequest::default().to_http_request()), None);
    }
}
