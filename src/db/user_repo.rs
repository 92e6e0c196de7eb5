// src/db/user_repo.rs

use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{common::error::AppError, models::auth::User};

// Constraint UNIQUE criada pela migration de usuários
const EMAIL_KEY: &str = "usuarios_email_key";

// O repositório de usuários, responsável por todas as interações com a tabela 'usuarios'
#[derive(Clone)]
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    // Login e recuperação só enxergam contas ativas
    pub async fn find_active_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        let maybe_user = sqlx::query_as::<_, User>(
            "SELECT * FROM usuarios WHERE email = $1 AND ativo = true",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;
        Ok(maybe_user)
    }

    pub async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        let maybe_user = sqlx::query_as::<_, User>("SELECT * FROM usuarios WHERE email = $1")
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;
        Ok(maybe_user)
    }

    // Busca um usuário pelo seu ID, ativo ou não
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, AppError> {
        let maybe_user = sqlx::query_as::<_, User>("SELECT * FROM usuarios WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(maybe_user)
    }

    pub async fn find_by_ids(&self, ids: &[Uuid]) -> Result<Vec<User>, AppError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let users = sqlx::query_as::<_, User>("SELECT * FROM usuarios WHERE id = ANY($1)")
            .bind(ids)
            .fetch_all(&self.pool)
            .await?;
        Ok(users)
    }

    // Todos os usuários, inclusive inativos, mais novos primeiro
    pub async fn list_all(&self) -> Result<Vec<User>, AppError> {
        let users =
            sqlx::query_as::<_, User>("SELECT * FROM usuarios ORDER BY created_at DESC")
                .fetch_all(&self.pool)
                .await?;
        Ok(users)
    }

    // Cria um novo usuário no banco de dados.
    // A checagem de email duplicado é feita antes no service; a constraint é o último recurso.
    pub async fn create_user<'e, E>(
        &self,
        executor: E,
        email: &str,
        password_hash: &str,
        perfil_id: Uuid,
        email_recuperacao: Option<&str>,
    ) -> Result<User, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, User>(
            r#"
            INSERT INTO usuarios (email, password_hash, perfil_id, email_recuperacao)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(email)
        .bind(password_hash)
        .bind(perfil_id)
        .bind(email_recuperacao)
        .fetch_one(executor)
        .await
        .map_err(map_email_conflict)
    }

    // Campos ausentes mantêm o valor atual
    pub async fn update_user(
        &self,
        id: Uuid,
        email: Option<&str>,
        perfil_id: Option<Uuid>,
        email_recuperacao: Option<&str>,
        ativo: Option<bool>,
    ) -> Result<Option<User>, AppError> {
        sqlx::query_as::<_, User>(
            r#"
            UPDATE usuarios SET
                email = COALESCE($2, email),
                perfil_id = COALESCE($3, perfil_id),
                email_recuperacao = COALESCE($4, email_recuperacao),
                ativo = COALESCE($5, ativo),
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(email)
        .bind(perfil_id)
        .bind(email_recuperacao)
        .bind(ativo)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| match map_email_conflict(e) {
            AppError::UserAlreadyExists => AppError::EmailInUse,
            other => other,
        })
    }

    pub async fn update_password(
        &self,
        id: Uuid,
        password_hash: &str,
        temp_password: bool,
    ) -> Result<(), AppError> {
        let result = sqlx::query(
            r#"
            UPDATE usuarios
            SET password_hash = $2, temp_password = $3, updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(password_hash)
        .bind(temp_password)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::UserNotFound);
        }
        Ok(())
    }

    pub async fn soft_delete(&self, id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query(
            "UPDATE usuarios SET ativo = false, updated_at = NOW() WHERE id = $1",
        )
        .bind(id)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }
}

fn map_email_conflict(e: sqlx::Error) -> AppError {
    if let sqlx::Error::Database(db_err) = &e {
        if db_err.is_unique_violation() && db_err.constraint() == Some(EMAIL_KEY) {
            return AppError::UserAlreadyExists;
        }
    }
    e.into()
}
