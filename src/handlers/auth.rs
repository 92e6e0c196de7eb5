// src/handlers/auth.rs

use axum::extract::State;

use crate::{
    common::{error::AppError, extract::ValidatedJson, response::ApiResponse},
    config::AppState,
    middleware::auth::AuthenticatedUser,
    models::auth::{
        AuthResponse, ChangePasswordPayload, LoginUserPayload, RecoverPasswordPayload,
        RecoverPasswordResponse, UserProfile,
    },
};

#[utoipa::path(
    post,
    path = "/api/auth/login",
    tag = "Auth",
    request_body = LoginUserPayload,
    responses(
        (status = 200, description = "Login realizado", body = AuthResponse),
        (status = 401, description = "INVALID_CREDENTIALS")
    )
)]
pub async fn login(
    State(app_state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<LoginUserPayload>,
) -> Result<ApiResponse<AuthResponse>, AppError> {
    let response = app_state
        .auth_service
        .login_user(&payload.email, &payload.password)
        .await?;

    Ok(ApiResponse::ok(response).with_message("Login realizado com sucesso"))
}

#[utoipa::path(
    post,
    path = "/api/auth/recover-password",
    tag = "Auth",
    request_body = RecoverPasswordPayload,
    responses(
        (status = 200, description = "Senha temporária gerada", body = RecoverPasswordResponse),
        (status = 404, description = "USER_NOT_FOUND"),
        (status = 400, description = "INVALID_RECOVERY_EMAIL")
    )
)]
pub async fn recover_password(
    State(app_state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<RecoverPasswordPayload>,
) -> Result<ApiResponse<RecoverPasswordResponse>, AppError> {
    let senha_temporaria = app_state
        .auth_service
        .recover_password(&payload.email, &payload.email_recuperacao)
        .await?;

    Ok(ApiResponse::ok(RecoverPasswordResponse { senha_temporaria }).with_message(
        "Senha temporária gerada com sucesso. Anote esta senha, ela não será exibida novamente.",
    ))
}

#[utoipa::path(
    patch,
    path = "/api/auth/change-password",
    tag = "Auth",
    request_body = ChangePasswordPayload,
    responses((status = 200, description = "Senha alterada")),
    security(("api_jwt" = []))
)]
pub async fn change_password(
    State(app_state): State<AppState>,
    AuthenticatedUser(principal): AuthenticatedUser,
    ValidatedJson(payload): ValidatedJson<ChangePasswordPayload>,
) -> Result<ApiResponse<()>, AppError> {
    app_state
        .auth_service
        .change_password(principal.user_id, &payload.nova_senha)
        .await?;

    Ok(ApiResponse::message("Senha alterada com sucesso"))
}

// JWT é stateless: o cliente descarta o token
#[utoipa::path(
    post,
    path = "/api/auth/logout",
    tag = "Auth",
    responses((status = 200, description = "Logout realizado")),
    security(("api_jwt" = []))
)]
pub async fn logout(AuthenticatedUser(principal): AuthenticatedUser) -> ApiResponse<()> {
    tracing::info!(user_id = %principal.user_id, "Logout");
    ApiResponse::message("Logout realizado com sucesso")
}

// Handler da rota protegida /me
#[utoipa::path(
    get,
    path = "/api/auth/me",
    tag = "Auth",
    responses(
        (status = 200, description = "Usuário autenticado", body = UserProfile),
        (status = 404, description = "USER_NOT_FOUND")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_me(
    State(app_state): State<AppState>,
    AuthenticatedUser(principal): AuthenticatedUser,
) -> Result<ApiResponse<UserProfile>, AppError> {
    let profile = app_state.auth_service.me(principal.user_id).await?;
    Ok(ApiResponse::ok(profile))
}
