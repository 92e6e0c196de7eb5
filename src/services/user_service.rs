// src/services/user_service.rs

use std::collections::HashMap;

use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{ReferenceRepository, UserRepository},
    models::{
        auth::{CreateUserPayload, UpdateUserPayload, User, UserWithPerfil},
        reference::Perfil,
    },
    services::{auth::hash_password, bem_service::unique_ids, rules},
};

#[derive(Clone)]
pub struct UserService {
    user_repo: UserRepository,
    perfil_repo: ReferenceRepository<Perfil>,
}

impl UserService {
    pub fn new(user_repo: UserRepository, perfil_repo: ReferenceRepository<Perfil>) -> Self {
        Self {
            user_repo,
            perfil_repo,
        }
    }

    pub async fn list_users(&self) -> Result<Vec<UserWithPerfil>, AppError> {
        let users = self.user_repo.list_all().await?;

        let perfil_ids = unique_ids(users.iter().map(|u| u.perfil_id));

        let perfis: HashMap<Uuid, Perfil> = self
            .perfil_repo
            .find_by_ids(&perfil_ids)
            .await?
            .into_iter()
            .map(|p| (p.id, p))
            .collect();

        Ok(users
            .into_iter()
            .map(|user| {
                let perfil = perfis.get(&user.perfil_id).cloned();
                UserWithPerfil { user, perfil }
            })
            .collect())
    }

    pub async fn get_user(&self, id: Uuid) -> Result<UserWithPerfil, AppError> {
        let user = self.find_user(id).await?;
        self.with_perfil(user).await
    }

    pub async fn create_user(&self, payload: CreateUserPayload) -> Result<UserWithPerfil, AppError> {
        if self.user_repo.find_by_email(&payload.email).await?.is_some() {
            return Err(AppError::UserAlreadyExists);
        }
        self.ensure_perfil(payload.perfil_id).await?;

        let password_hash = hash_password(&payload.password).await?;
        let user = self
            .user_repo
            .create_user(
                self.user_repo.pool(),
                &payload.email,
                &password_hash,
                payload.perfil_id,
                payload.email_recuperacao.as_deref(),
            )
            .await?;

        tracing::info!(user_id = %user.id, "👤 Usuário criado");
        self.with_perfil(user).await
    }

    pub async fn update_user(
        &self,
        id: Uuid,
        payload: UpdateUserPayload,
    ) -> Result<UserWithPerfil, AppError> {
        let current = self.find_user(id).await?;
        rules::ensure_can_update_user(&current, payload.email.as_deref(), payload.ativo)?;

        if let Some(email) = payload.email.as_deref().filter(|e| *e != current.email) {
            if self.user_repo.find_by_email(email).await?.is_some() {
                return Err(AppError::EmailInUse);
            }
        }
        if let Some(perfil_id) = payload.perfil_id {
            self.ensure_perfil(perfil_id).await?;
        }

        let user = self
            .user_repo
            .update_user(
                id,
                payload.email.as_deref(),
                payload.perfil_id,
                payload.email_recuperacao.as_deref(),
                payload.ativo,
            )
            .await?
            .ok_or(AppError::UserNotFound)?;

        self.with_perfil(user).await
    }

    pub async fn delete_user(&self, id: Uuid) -> Result<(), AppError> {
        let user = self.find_user(id).await?;
        rules::ensure_can_delete_user(&user)?;

        self.user_repo.soft_delete(id).await?;
        tracing::info!(user_id = %id, "🗑️ Usuário desativado");
        Ok(())
    }

    async fn find_user(&self, id: Uuid) -> Result<User, AppError> {
        self.user_repo
            .find_by_id(id)
            .await?
            .ok_or(AppError::UserNotFound)
    }

    async fn ensure_perfil(&self, perfil_id: Uuid) -> Result<(), AppError> {
        self.perfil_repo
            .find_active_by_id(perfil_id)
            .await?
            .map(|_| ())
            .ok_or(AppError::PerfilNotFound)
    }

    async fn with_perfil(&self, user: User) -> Result<UserWithPerfil, AppError> {
        let perfil = self.perfil_repo.find_by_id(user.perfil_id).await?;
        Ok(UserWithPerfil { user, perfil })
    }
}
