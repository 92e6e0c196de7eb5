// src/handlers/reference.rs
//
// Handlers genéricos das tabelas de referência. As rotas instanciam cada um
// com o tipo concreto, ex.: `get(reference::list::<Categoria>)`.

use axum::extract::State;
use uuid::Uuid;

use crate::{
    common::{
        error::AppError,
        extract::{ValidPath, ValidatedJson},
        response::ApiResponse,
    },
    db::ReferenceTable,
    services::ReferenceService,
};

// Ativos, por nome
pub async fn list<T: ReferenceTable>(
    State(service): State<ReferenceService<T>>,
) -> Result<ApiResponse<Vec<T>>, AppError> {
    let rows = service.list().await?;
    Ok(ApiResponse::ok(rows))
}

pub async fn get<T: ReferenceTable>(
    State(service): State<ReferenceService<T>>,
    ValidPath(id): ValidPath<Uuid>,
) -> Result<ApiResponse<T>, AppError> {
    let row = service.get(id).await?;
    Ok(ApiResponse::ok(row))
}

pub async fn create<T: ReferenceTable>(
    State(service): State<ReferenceService<T>>,
    ValidatedJson(payload): ValidatedJson<T::Create>,
) -> Result<ApiResponse<T>, AppError> {
    let row = service.create(payload).await?;
    Ok(ApiResponse::created(row, format!("{} criado(a) com sucesso", T::LABEL)))
}

pub async fn update<T: ReferenceTable>(
    State(service): State<ReferenceService<T>>,
    ValidPath(id): ValidPath<Uuid>,
    ValidatedJson(payload): ValidatedJson<T::Update>,
) -> Result<ApiResponse<T>, AppError> {
    let row = service.update(id, payload).await?;
    Ok(ApiResponse::ok(row).with_message(format!("{} atualizado(a) com sucesso", T::LABEL)))
}

pub async fn delete<T: ReferenceTable>(
    State(service): State<ReferenceService<T>>,
    ValidPath(id): ValidPath<Uuid>,
) -> Result<ApiResponse<()>, AppError> {
    service.delete(id).await?;
    Ok(ApiResponse::message(format!("{} excluído(a) com sucesso", T::LABEL)))
}
