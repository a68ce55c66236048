//! Staff JWT authentication middleware.

use axum::{
    body::Body,
    extract::State,
    http::{Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use uuid::Uuid;

use crate::app::AppState;
use crate::config::JwtAuthConfig;
use domain::models::user::StaffRole;
use shared::jwt::JwtConfig;

/// Authenticated staff member extracted from a validated JWT.
#[derive(Debug, Clone)]
pub struct StaffAuth {
    pub user_id: Uuid,
    pub display_name: String,
    pub role: StaffRole,
    pub jti: String,
}

impl StaffAuth {
    /// Validates an access token and returns the staff identity.
    pub fn validate(jwt_config: &JwtConfig, token: &str) -> Result<Self, String> {
        let claims = jwt_config
            .validate_access_token(token)
            .map_err(|e| format!("Invalid token: {}", e))?;

        let user_id =
            Uuid::parse_str(&claims.sub).map_err(|_| "Invalid user ID in token".to_string())?;

        let role: StaffRole = claims
            .role
            .parse()
            .map_err(|_| format!("Unknown role '{}' in token", claims.role))?;

        Ok(StaffAuth {
            user_id,
            display_name: claims.name,
            role,
            jti: claims.jti,
        })
    }

    /// Creates a JwtConfig from the configured validation mode.
    pub fn create_jwt_config(config: &JwtAuthConfig) -> Result<JwtConfig, String> {
        match config.mode.as_str() {
            "hs256" => Ok(JwtConfig::from_shared_secret(
                &config.shared_secret,
                config.access_token_expiry_secs,
                config.leeway_secs,
            )),
            _ => JwtConfig::from_rsa_pem(
                &config.private_key,
                &config.public_key,
                config.access_token_expiry_secs,
                config.leeway_secs,
            )
            .map_err(|e| format!("Failed to initialize JWT config: {}", e)),
        }
    }
}

/// Middleware that requires JWT staff authentication.
///
/// Validates the Bearer token in the Authorization header and rejects
/// requests without a valid JWT. The staff identity is stored in request
/// extensions for downstream handlers.
pub async fn require_user_auth(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    let auth_header = req
        .headers()
        .get("Authorization")
        .and_then(|v| v.to_str().ok());

    let token = match auth_header {
        Some(header) if header.starts_with("Bearer ") => &header[7..],
        _ => {
            return unauthorized_response("Missing or invalid Authorization header");
        }
    };

    let jwt_config = match StaffAuth::create_jwt_config(&state.config.jwt) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("Failed to create JWT config: {}", e);
            return internal_error_response("Authentication service unavailable");
        }
    };

    match StaffAuth::validate(&jwt_config, token) {
        Ok(auth) => {
            req.extensions_mut().insert(auth);
            next.run(req).await
        }
        Err(e) => {
            tracing::debug!("JWT validation failed: {}", e);
            unauthorized_response("Invalid or expired token")
        }
    }
}

fn unauthorized_response(message: &str) -> Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(json!({
            "error": "unauthorized",
            "message": message
        })),
    )
        .into_response()
}

fn internal_error_response(message: &str) -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({
            "error": "internal_error",
            "message": message
        })),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hs256_config() -> JwtAuthConfig {
        JwtAuthConfig {
            mode: "hs256".to_string(),
            private_key: String::new(),
            public_key: String::new(),
            shared_secret: "middleware-test-secret".to_string(),
            access_token_expiry_secs: 3600,
            leeway_secs: 0,
        }
    }

    #[test]
    fn test_validate_round_trip() {
        let jwt = StaffAuth::create_jwt_config(&hs256_config()).unwrap();
        let user_id = Uuid::new_v4();
        let (token, jti) = jwt
            .generate_access_token(user_id, "Alice Johnson", "admin")
            .unwrap();

        let auth = StaffAuth::validate(&jwt, &token).unwrap();
        assert_eq!(auth.user_id, user_id);
        assert_eq!(auth.display_name, "Alice Johnson");
        assert_eq!(auth.role, StaffRole::Admin);
        assert_eq!(auth.jti, jti);
    }

    #[test]
    fn test_validate_rejects_unknown_role() {
        let jwt = StaffAuth::create_jwt_config(&hs256_config()).unwrap();
        let (token, _) = jwt
            .generate_access_token(Uuid::new_v4(), "Eve", "superuser")
            .unwrap();
        assert!(StaffAuth::validate(&jwt, &token).is_err());
    }

    #[test]
    fn test_validate_rejects_garbage_token() {
        let jwt = StaffAuth::create_jwt_config(&hs256_config()).unwrap();
        assert!(StaffAuth::validate(&jwt, "not.a.token").is_err());
    }

    #[test]
    fn test_create_jwt_config_rs256_requires_keys() {
        let mut config = hs256_config();
        config.mode = "rs256".to_string();
        assert!(StaffAuth::create_jwt_config(&config).is_err());
    }

    #[test]
    fn test_unauthorized_response_status() {
        let response = unauthorized_response("Missing or invalid Authorization header");
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }
}
