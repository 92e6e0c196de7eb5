// src/services/reference_service.rs

use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{ReferenceRepository, ReferenceTable},
};

/// Contrato comum das tabelas de referência: nome único na criação e na
/// renomeação, exclusão lógica (por DELETE ou `ativo: false`) bloqueada
/// enquanto houver dependentes.
pub struct ReferenceService<T> {
    repo: ReferenceRepository<T>,
}

impl<T> Clone for ReferenceService<T> {
    fn clone(&self) -> Self {
        Self {
            repo: self.repo.clone(),
        }
    }
}

impl<T: ReferenceTable> ReferenceService<T> {
    pub fn new(repo: ReferenceRepository<T>) -> Self {
        Self { repo }
    }

    pub async fn list(&self) -> Result<Vec<T>, AppError> {
        self.repo.list_active().await
    }

    pub async fn get(&self, id: Uuid) -> Result<T, AppError> {
        self.repo
            .find_by_id(id)
            .await?
            .ok_or(AppError::ReferenceNotFound(T::LABEL))
    }

    pub async fn create(&self, payload: T::Create) -> Result<T, AppError> {
        if self.repo.find_by_name(T::create_name(&payload)).await?.is_some() {
            return Err(AppError::ReferenceAlreadyExists(T::LABEL));
        }
        self.repo.create(&payload).await
    }

    pub async fn update(&self, id: Uuid, payload: T::Update) -> Result<T, AppError> {
        let current = self.get(id).await?;

        if let Some(nome) = T::update_name(&payload) {
            if let Some(other) = self.repo.find_by_name(nome).await? {
                if other.id() != current.id() {
                    return Err(AppError::NameInUse);
                }
            }
        }

        let deactivating = current.is_active() && T::update_ativo(&payload) == Some(false);
        if deactivating || current.alters_dependents(&payload) {
            self.ensure_no_dependents(id).await?;
        }

        let row = self
            .repo
            .update(id, &payload)
            .await?
            .ok_or(AppError::ReferenceNotFound(T::LABEL))?;

        if deactivating {
            tracing::info!(tabela = T::TABLE, id = %id, "🗑️ Registro desativado");
        }
        Ok(row)
    }

    pub async fn delete(&self, id: Uuid) -> Result<(), AppError> {
        self.get(id).await?;
        self.ensure_no_dependents(id).await?;

        self.repo.soft_delete(id).await?;
        tracing::info!(tabela = T::TABLE, id = %id, "🗑️ Registro desativado");
        Ok(())
    }

    async fn ensure_no_dependents(&self, id: Uuid) -> Result<(), AppError> {
        if self.repo.count_dependents(id).await? > 0 {
            return Err(AppError::HasDependencies(T::LABEL));
        }
        Ok(())
    }
}
