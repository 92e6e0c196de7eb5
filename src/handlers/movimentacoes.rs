// src/handlers/movimentacoes.rs

use axum::extract::State;
use uuid::Uuid;

use crate::{
    common::{
        error::AppError,
        extract::{ValidPath, ValidatedJson},
        response::ApiResponse,
    },
    config::AppState,
    middleware::auth::AuthenticatedUser,
    models::movimentacao::{
        CreateMovimentacaoPayload, MovimentacaoDetail, UpdateMovimentacaoPayload,
    },
};

#[utoipa::path(
    get,
    path = "/api/movimentacoes",
    tag = "Movimentações",
    responses((status = 200, description = "Histórico, mais recentes primeiro", body = [MovimentacaoDetail])),
    security(("api_jwt" = []))
)]
pub async fn list_movimentacoes(
    State(app_state): State<AppState>,
) -> Result<ApiResponse<Vec<MovimentacaoDetail>>, AppError> {
    let rows = app_state.movimentacao_service.list_movimentacoes().await?;
    Ok(ApiResponse::ok(rows))
}

#[utoipa::path(
    get,
    path = "/api/movimentacoes/active",
    tag = "Movimentações",
    responses((status = 200, description = "Empréstimos em aberto", body = [MovimentacaoDetail])),
    security(("api_jwt" = []))
)]
pub async fn list_active_loans(
    State(app_state): State<AppState>,
) -> Result<ApiResponse<Vec<MovimentacaoDetail>>, AppError> {
    let rows = app_state.movimentacao_service.list_active_loans().await?;
    Ok(ApiResponse::ok(rows))
}

#[utoipa::path(
    get,
    path = "/api/movimentacoes/{id}",
    tag = "Movimentações",
    params(("id" = Uuid, Path, description = "ID da movimentação")),
    responses(
        (status = 200, description = "Movimentação", body = MovimentacaoDetail),
        (status = 404, description = "MOVIMENTACAO_NOT_FOUND")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_movimentacao(
    State(app_state): State<AppState>,
    ValidPath(id): ValidPath<Uuid>,
) -> Result<ApiResponse<MovimentacaoDetail>, AppError> {
    let row = app_state.movimentacao_service.get_movimentacao(id).await?;
    Ok(ApiResponse::ok(row))
}

#[utoipa::path(
    post,
    path = "/api/movimentacoes",
    tag = "Movimentações",
    request_body = CreateMovimentacaoPayload,
    responses(
        (status = 201, description = "Movimentação registrada", body = MovimentacaoDetail),
        (status = 404, description = "BEM_NOT_FOUND / TIPO_NOT_FOUND"),
        (status = 400, description = "ITEM_ALREADY_ON_LOAN")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_movimentacao(
    State(app_state): State<AppState>,
    AuthenticatedUser(principal): AuthenticatedUser,
    ValidatedJson(payload): ValidatedJson<CreateMovimentacaoPayload>,
) -> Result<ApiResponse<MovimentacaoDetail>, AppError> {
    let row = app_state
        .movimentacao_service
        .create_movimentacao(principal.user_id, payload)
        .await?;
    Ok(ApiResponse::created(row, "Movimentação criada com sucesso"))
}

#[utoipa::path(
    put,
    path = "/api/movimentacoes/{id}",
    tag = "Movimentações",
    params(("id" = Uuid, Path, description = "ID da movimentação")),
    request_body = UpdateMovimentacaoPayload,
    responses(
        (status = 200, description = "Movimentação atualizada", body = MovimentacaoDetail),
        (status = 400, description = "ALREADY_RETURNED / INVALID_RETURN_DATE")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_movimentacao(
    State(app_state): State<AppState>,
    ValidPath(id): ValidPath<Uuid>,
    ValidatedJson(payload): ValidatedJson<UpdateMovimentacaoPayload>,
) -> Result<ApiResponse<MovimentacaoDetail>, AppError> {
    let row = app_state
        .movimentacao_service
        .update_movimentacao(id, payload)
        .await?;
    Ok(ApiResponse::ok(row).with_message("Movimentação atualizada com sucesso"))
}

#[utoipa::path(
    post,
    path = "/api/movimentacoes/{id}/return",
    tag = "Movimentações",
    params(("id" = Uuid, Path, description = "ID da movimentação")),
    responses(
        (status = 200, description = "Devolução registrada com a data de hoje", body = MovimentacaoDetail),
        (status = 400, description = "ALREADY_RETURNED")
    ),
    security(("api_jwt" = []))
)]
pub async fn register_return(
    State(app_state): State<AppState>,
    ValidPath(id): ValidPath<Uuid>,
) -> Result<ApiResponse<MovimentacaoDetail>, AppError> {
    let row = app_state.movimentacao_service.register_return(id).await?;
    Ok(ApiResponse::ok(row).with_message("Devolução registrada com sucesso"))
}
