// src/handlers/users.rs

use axum::extract::State;
use uuid::Uuid;

use crate::{
    common::{
        error::AppError,
        extract::{ValidPath, ValidatedJson},
        response::ApiResponse,
    },
    config::AppState,
    models::auth::{CreateUserPayload, UpdateUserPayload, UserWithPerfil},
};

#[utoipa::path(
    get,
    path = "/api/users",
    tag = "Users",
    responses(
        (status = 200, description = "Todos os usuários, inclusive inativos", body = [UserWithPerfil]),
        (status = 403, description = "FORBIDDEN")
    ),
    security(("api_jwt" = []))
)]
pub async fn list_users(
    State(app_state): State<AppState>,
) -> Result<ApiResponse<Vec<UserWithPerfil>>, AppError> {
    let users = app_state.user_service.list_users().await?;
    Ok(ApiResponse::ok(users))
}

#[utoipa::path(
    get,
    path = "/api/users/{id}",
    tag = "Users",
    params(("id" = Uuid, Path, description = "ID do usuário")),
    responses(
        (status = 200, description = "Usuário", body = UserWithPerfil),
        (status = 404, description = "USER_NOT_FOUND")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_user(
    State(app_state): State<AppState>,
    ValidPath(id): ValidPath<Uuid>,
) -> Result<ApiResponse<UserWithPerfil>, AppError> {
    let user = app_state.user_service.get_user(id).await?;
    Ok(ApiResponse::ok(user))
}

#[utoipa::path(
    post,
    path = "/api/users",
    tag = "Users",
    request_body = CreateUserPayload,
    responses(
        (status = 201, description = "Usuário criado", body = UserWithPerfil),
        (status = 409, description = "USER_EXISTS"),
        (status = 404, description = "PERFIL_NOT_FOUND")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_user(
    State(app_state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<CreateUserPayload>,
) -> Result<ApiResponse<UserWithPerfil>, AppError> {
    let user = app_state.user_service.create_user(payload).await?;
    Ok(ApiResponse::created(user, "Usuário criado com sucesso"))
}

#[utoipa::path(
    put,
    path = "/api/users/{id}",
    tag = "Users",
    params(("id" = Uuid, Path, description = "ID do usuário")),
    request_body = UpdateUserPayload,
    responses(
        (status = 200, description = "Usuário atualizado", body = UserWithPerfil),
        (status = 409, description = "EMAIL_IN_USE"),
        (status = 400, description = "CANNOT_UPDATE_ADMIN")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_user(
    State(app_state): State<AppState>,
    ValidPath(id): ValidPath<Uuid>,
    ValidatedJson(payload): ValidatedJson<UpdateUserPayload>,
) -> Result<ApiResponse<UserWithPerfil>, AppError> {
    let user = app_state.user_service.update_user(id, payload).await?;
    Ok(ApiResponse::ok(user).with_message("Usuário atualizado com sucesso"))
}

#[utoipa::path(
    delete,
    path = "/api/users/{id}",
    tag = "Users",
    params(("id" = Uuid, Path, description = "ID do usuário")),
    responses(
        (status = 200, description = "Usuário desativado"),
        (status = 400, description = "CANNOT_DELETE_ADMIN")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_user(
    State(app_state): State<AppState>,
    ValidPath(id): ValidPath<Uuid>,
) -> Result<ApiResponse<()>, AppError> {
    app_state.user_service.delete_user(id).await?;
    Ok(ApiResponse::message("Usuário excluído com sucesso"))
}
