use axum::{extract::FromRequestParts, http::request::Parts};

use crate::{
    error::{AppError, Result},
    utils::jwt::{self, Claims},
};

pub fn extract_user_id(claims: &Claims) -> Result<i32> {
    claims
        .sub
        .parse::<i32>()
        .map_err(|_| AppError::Unauthorized("Unauthorized".to_string()))
}

fn bearer_token(parts: &Parts) -> Option<&str> {
    parts
        .headers
        .get(http::header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
}

/// Requires a valid token whose holder may act as admin. The demo identity
/// passes this gate on purpose; its writes never reach the database.
pub struct AdminClaims(pub Claims);

impl<S> FromRequestParts<S> for AdminClaims
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self> {
        let token = bearer_token(parts)
            .ok_or_else(|| AppError::Unauthorized("Authentication required".to_string()))?;
        let claims = jwt::verify_token(token)?;

        if !claims.is_admin && !claims.is_demo {
            return Err(AppError::Forbidden("Admin access required".to_string()));
        }

        Ok(AdminClaims(claims))
    }
}

/// Identity when present, None otherwise. Lets public endpoints widen their
/// responses for admins without splitting the path in two.
pub struct OptionalClaims(pub Option<Claims>);

impl<S> FromRequestParts<S> for OptionalClaims
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self> {
        let claims = bearer_token(parts).and_then(|token| jwt::verify_token(token).ok());
        Ok(OptionalClaims(claims))
    }
}
