// src/handlers/bens.rs

use axum::extract::State;
use uuid::Uuid;

use crate::{
    common::{
        error::AppError,
        extract::{ValidPath, ValidatedJson},
        response::ApiResponse,
    },
    config::AppState,
    models::bem::{BemDetail, CreateBemPayload, UpdateBemPayload},
};

#[utoipa::path(
    get,
    path = "/api/bens",
    tag = "Bens",
    responses((status = 200, description = "Bens ativos, mais recentes primeiro", body = [BemDetail])),
    security(("api_jwt" = []))
)]
pub async fn list_bens(
    State(app_state): State<AppState>,
) -> Result<ApiResponse<Vec<BemDetail>>, AppError> {
    let bens = app_state.bem_service.list_bens().await?;
    Ok(ApiResponse::ok(bens))
}

#[utoipa::path(
    get,
    path = "/api/bens/{id}",
    tag = "Bens",
    params(("id" = Uuid, Path, description = "ID do bem")),
    responses(
        (status = 200, description = "Bem (ativo ou não)", body = BemDetail),
        (status = 404, description = "BEM_NOT_FOUND")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_bem(
    State(app_state): State<AppState>,
    ValidPath(id): ValidPath<Uuid>,
) -> Result<ApiResponse<BemDetail>, AppError> {
    let bem = app_state.bem_service.get_bem(id).await?;
    Ok(ApiResponse::ok(bem))
}

#[utoipa::path(
    get,
    path = "/api/bens/tombo/{tombo}",
    tag = "Bens",
    params(("tombo" = String, Path, description = "Número de tombo")),
    responses(
        (status = 200, description = "Bem ativo com este tombo", body = BemDetail),
        (status = 404, description = "BEM_NOT_FOUND")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_bem_by_tombo(
    State(app_state): State<AppState>,
    ValidPath(tombo): ValidPath<String>,
) -> Result<ApiResponse<BemDetail>, AppError> {
    let bem = app_state.bem_service.get_by_tombo(&tombo).await?;
    Ok(ApiResponse::ok(bem))
}

#[utoipa::path(
    post,
    path = "/api/bens",
    tag = "Bens",
    request_body = CreateBemPayload,
    responses(
        (status = 201, description = "Bem criado", body = BemDetail),
        (status = 409, description = "TOMBO_EXISTS"),
        (status = 404, description = "CATEGORIA_NOT_FOUND / LOCALIZACAO_NOT_FOUND")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_bem(
    State(app_state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<CreateBemPayload>,
) -> Result<ApiResponse<BemDetail>, AppError> {
    let bem = app_state.bem_service.create_bem(payload).await?;
    Ok(ApiResponse::created(bem, "Bem criado com sucesso"))
}

#[utoipa::path(
    put,
    path = "/api/bens/{id}",
    tag = "Bens",
    params(("id" = Uuid, Path, description = "ID do bem")),
    request_body = UpdateBemPayload,
    responses(
        (status = 200, description = "Bem atualizado", body = BemDetail),
        (status = 409, description = "TOMBO_IN_USE")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_bem(
    State(app_state): State<AppState>,
    ValidPath(id): ValidPath<Uuid>,
    ValidatedJson(payload): ValidatedJson<UpdateBemPayload>,
) -> Result<ApiResponse<BemDetail>, AppError> {
    let bem = app_state.bem_service.update_bem(id, payload).await?;
    Ok(ApiResponse::ok(bem).with_message("Bem atualizado com sucesso"))
}

#[utoipa::path(
    delete,
    path = "/api/bens/{id}",
    tag = "Bens",
    params(("id" = Uuid, Path, description = "ID do bem")),
    responses(
        (status = 200, description = "Bem desativado"),
        (status = 400, description = "HAS_ACTIVE_LOANS")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_bem(
    State(app_state): State<AppState>,
    ValidPath(id): ValidPath<Uuid>,
) -> Result<ApiResponse<()>, AppError> {
    app_state.bem_service.delete_bem(id).await?;
    Ok(ApiResponse::message("Bem excluído com sucesso"))
}
