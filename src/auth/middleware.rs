use crate::auth::auth::AuthUser;
use crate::auth::jwt::verify_token;
use crate::config::Config;
use crate::model::role::Role;
use actix_web::middleware::Next;
use actix_web::{
    Error, HttpMessage, HttpResponse,
    body::BoxBody,
    dev::{ServiceRequest, ServiceResponse},
    web::Data,
};
use serde_json::json;
use tracing::debug;

fn reject(req: ServiceRequest, body: serde_json::Value) -> ServiceResponse<BoxBody> {
    let resp = HttpResponse::Unauthorized().json(body);
    req.into_response(resp.map_into_boxed_body())
}

/// Verifies the bearer token and stores the caller as an `AuthUser`.
pub async fn auth_middleware(
    req: ServiceRequest,
    next: Next<BoxBody>,
) -> Result<ServiceResponse<BoxBody>, Error> {
    let config = req
        .app_data::<Data<Config>>()
        .ok_or_else(|| actix_web::error::ErrorInternalServerError("App config missing"))?
        .clone();

    let header_value = match req.headers().get("Authorization").map(|h| h.to_str()) {
        Some(Ok(h)) => h.to_owned(),
        Some(Err(_)) => {
            return Ok(reject(
                req,
                json!({"error": "Invalid Authorization header encoding"}),
            ));
        }
        None => return Ok(reject(req, json!({"error": "Missing Authorization header"}))),
    };

    let token = match header_value.strip_prefix("Bearer ") {
        Some(t) => t,
        None => {
            return Ok(reject(
                req,
                json!({"error": "Authorization header must start with Bearer"}),
            ));
        }
    };

    let claims = match verify_token(token, &config.jwt_secret) {
        Ok(c) => c,
        Err(e) => {
            debug!(error = %e, "Rejected bearer token");
            return Ok(reject(
                req,
                json!({"error": "Invalid or expired token", "details": e}),
            ));
        }
    };

    let role = match Role::from_id(claims.role) {
        Some(role) => role,
        None => return Ok(reject(req, json!({"error": "Invalid role"}))),
    };

    debug!(
        user = %claims.sub,
        role = %role,
        exp = claims.exp,
        employee_id = ?claims.employee_id,
        "Bearer token accepted"
    );

    let auth_user = AuthUser {
        user_id: claims.user_id,
        username: claims.sub,
        role,
    };

    req.extensions_mut().insert(auth_user);

    next.call(req).await
}
