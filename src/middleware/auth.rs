// src/middleware/auth.rs

use axum::{
    extract::{FromRequestParts, Request, State},
    http::{header::AUTHORIZATION, request::Parts, HeaderMap},
    middleware::Next,
    response::Response,
};

use crate::{common::error::AppError, config::AppState, models::auth::Principal};

/// Lê o header `Authorization: Bearer <token>`. Cada falha tem o seu código.
pub fn bearer_token(headers: &HeaderMap) -> Result<&str, AppError> {
    let value = headers
        .get(AUTHORIZATION)
        .ok_or(AppError::MissingToken)?
        .to_str()
        .map_err(|_| AppError::InvalidTokenFormat)?;

    let parts: Vec<&str> = value.split(' ').collect();
    match parts.as_slice() {
        ["Bearer", token] if !token.is_empty() => Ok(token),
        _ => Err(AppError::InvalidTokenFormat),
    }
}

// Primeira camada: valida o JWT e deixa o Principal nas extensions
pub async fn auth_guard(
    State(app_state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = bearer_token(request.headers())?;
    let principal = app_state.auth_service.validate_token(token)?;

    request.extensions_mut().insert(principal);
    Ok(next.run(request).await)
}

// Segunda camada: exige perfil ADMIN, conferido no banco a cada requisição
pub async fn admin_guard(
    State(app_state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let principal = request
        .extensions()
        .get::<Principal>()
        .cloned()
        .ok_or(AppError::Unauthorized)?;

    app_state.auth_service.authorize_admin(&principal).await?;
    Ok(next.run(request).await)
}

// Extrator para obter o usuário autenticado diretamente nos handlers
pub struct AuthenticatedUser(pub Principal);

impl<S> FromRequestParts<S> for AuthenticatedUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Principal>()
            .cloned()
            .map(AuthenticatedUser)
            .ok_or(AppError::Unauthorized)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn missing_header() {
        assert!(matches!(bearer_token(&HeaderMap::new()), Err(AppError::MissingToken)));
    }

    #[test]
    fn malformed_headers() {
        for value in ["abc.def.ghi", "Basic abc", "Bearer", "Bearer a b", "bearer abc"] {
            assert!(
                matches!(bearer_token(&headers(value)), Err(AppError::InvalidTokenFormat)),
                "{value}"
            );
        }
    }

    #[test]
    fn bearer_token_is_extracted() {
        assert_eq!(bearer_token(&headers("Bearer abc.def.ghi")).unwrap(), "abc.def.ghi");
    }
}
