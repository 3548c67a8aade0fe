use actix_web::middleware::Next;
use actix_web::{
    Error, HttpMessage, ResponseError,
    body::BoxBody,
    dev::{ServiceRequest, ServiceResponse},
    http::header::{AUTHORIZATION, HeaderMap},
    web::Data,
};
use tracing::debug;

use crate::auth::auth::AuthUser;
use crate::auth::jwt::verify_token;
use crate::config::Config;
use crate::error::ApiError;

/// Token from `Authorization: Bearer <token>`.
fn bearer_token(headers: &HeaderMap) -> Result<&str, ApiError> {
    let value = headers
        .get(AUTHORIZATION)
        .ok_or_else(|| ApiError::Unauthorized("Missing Authorization header".into()))?
        .to_str()
        .map_err(|_| ApiError::Unauthorized("Invalid Authorization header encoding".into()))?;

    value
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or_else(|| {
            ApiError::Unauthorized("Authorization header must start with Bearer".into())
        })
}

fn authenticate(req: &ServiceRequest) -> Result<AuthUser, ApiError> {
    let config = req
        .app_data::<Data<Config>>()
        .ok_or_else(|| ApiError::Internal("App config missing".into()))?;

    let token = bearer_token(req.headers())?;
    let claims = verify_token(token, &config.jwt_secret).map_err(|e| {
        debug!(error = %e, "Rejected bearer token");
        ApiError::Unauthorized("Invalid or expired token".into())
    })?;

    Ok(AuthUser {
        user_id: claims.user_id,
        email: claims.sub,
    })
}

pub async fn auth_middleware(
    req: ServiceRequest,
    next: Next<BoxBody>,
) -> Result<ServiceResponse<BoxBody>, Error> {
    match authenticate(&req) {
        Ok(user) => {
            req.extensions_mut().insert(user);
            next.call(req).await
        }
        Err(e) => {
            let resp = e.error_response();
            Ok(req.into_response(resp))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::jwt::generate_access_token;
    use actix_web::test::{TestRequest, call_and_read_body, call_service, init_service};
    use actix_web::{App, HttpResponse, middleware::from_fn, web};

    fn config() -> Config {
        Config::from_lookup(|key| match key {
            "DATABASE_URL" => Some("mysql://localhost/overtime".into()),
            "JWT_SECRET" => Some("middleware-secret".into()),
            _ => None,
        })
        .unwrap()
    }

    #[test]
    fn bearer_token_parsing() {
        let mut headers = HeaderMap::new();
        assert!(bearer_token(&headers).is_err());

        headers.insert(AUTHORIZATION, "Basic abc".parse().unwrap());
        assert!(bearer_token(&headers).is_err());

        headers.insert(AUTHORIZATION, "Bearer ".parse().unwrap());
        assert!(bearer_token(&headers).is_err());

        headers.insert(AUTHORIZATION, "Bearer abc.def".parse().unwrap());
        assert_eq!(bearer_token(&headers).unwrap(), "abc.def");
    }

    #[actix_web::test]
    async fn guards_scope_and_exposes_user() {
        let app = init_service(
            App::new().app_data(Data::new(config())).service(
                web::scope("/api")
                    .wrap(from_fn(auth_middleware))
                    .route(
                        "/me",
                        web::get().to(|user: AuthUser| async move {
                            HttpResponse::Ok().body(user.email)
                        }),
                    ),
            ),
        )
        .await;

        let req = TestRequest::get().uri("/api/me").to_request();
        let resp = call_service(&app, req).await;
        assert_eq!(resp.status(), 401);

        let token =
            generate_access_token(5, "hr@company.com".into(), "middleware-secret", 60).unwrap();
        let req = TestRequest::get()
            .uri("/api/me")
            .insert_header((AUTHORIZATION, format!("Bearer {token}")))
            .to_request();
        let body = call_and_read_body(&app, req).await;
        assert_eq!(body, "hr@company.com");

        let forged =
            generate_access_token(5, "hr@company.com".into(), "other-secret", 60).unwrap();
        let req = TestRequest::get()
            .uri("/api/me")
            .insert_header((AUTHORIZATION, format!("Bearer {forged}")))
            .to_request();
        let resp = call_service(&app, req).await;
        assert_eq!(resp.status(), 401);
    }
}
