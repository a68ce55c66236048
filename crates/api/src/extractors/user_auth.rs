//! Staff JWT authentication extractor.

use axum::{async_trait, extract::FromRequestParts, http::request::Parts};
use uuid::Uuid;

use crate::app::AppState;
use crate::error::ApiError;
use crate::middleware::user_auth::StaffAuth;
use domain::models::user::StaffRole;

/// Authenticated staff member from a validated JWT.
///
/// The extractor first looks for identity inserted by the auth middleware,
/// then falls back to validating the Bearer token itself so handlers work
/// both inside and outside the protected router.
#[derive(Debug, Clone)]
pub struct StaffUser {
    pub user_id: Uuid,
    pub display_name: String,
    pub role: StaffRole,
}

impl StaffUser {
    /// Rejects staff whose role cannot operate the gate.
    pub fn require_gate_operator(&self) -> Result<(), ApiError> {
        if self.role.can_operate_gate() {
            Ok(())
        } else {
            Err(ApiError::Forbidden(
                "Only security staff and administrators can operate the gate".to_string(),
            ))
        }
    }
}

impl From<StaffAuth> for StaffUser {
    fn from(auth: StaffAuth) -> Self {
        Self {
            user_id: auth.user_id,
            display_name: auth.display_name,
            role: auth.role,
        }
    }
}

#[async_trait]
impl FromRequestParts<AppState> for StaffUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        if let Some(auth) = parts.extensions.get::<StaffAuth>() {
            return Ok(auth.clone().into());
        }

        let auth_header = parts
            .headers
            .get("Authorization")
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| ApiError::Unauthorized("Missing Authorization header".to_string()))?;

        if !auth_header.starts_with("Bearer ") {
            return Err(ApiError::Unauthorized(
                "Invalid Authorization header format".to_string(),
            ));
        }

        let token = &auth_header[7..];

        let jwt_config =
            StaffAuth::create_jwt_config(&state.config.jwt).map_err(ApiError::Internal)?;

        let auth = StaffAuth::validate(&jwt_config, token)
            .map_err(|_| ApiError::Unauthorized("Invalid or expired token".to_string()))?;

        Ok(auth.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn staff(role: StaffRole) -> StaffUser {
        StaffUser {
            user_id: Uuid::new_v4(),
            display_name: "Alice Johnson".to_string(),
            role,
        }
    }

    #[test]
    fn test_gate_operator_gate() {
        assert!(staff(StaffRole::Security).require_gate_operator().is_ok());
        assert!(staff(StaffRole::Admin).require_gate_operator().is_ok());
        assert!(staff(StaffRole::Employee).require_gate_operator().is_err());
    }

    #[test]
    fn test_from_staff_auth() {
        let auth = StaffAuth {
            user_id: Uuid::new_v4(),
            display_name: "Bob Smith".to_string(),
            role: StaffRole::Employee,
            jti: "jti".to_string(),
        };
        let user: StaffUser = auth.clone().into();
        assert_eq!(user.user_id, auth.user_id);
        assert_eq!(user.role, StaffRole::Employee);
        assert_eq!(user.display_name, "Bob Smith");
    }
}
