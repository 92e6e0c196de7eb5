// src/db/bem_repo.rs

use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::bem::{Bem, CreateBemPayload, UpdateBemPayload},
};

const TOMBO_KEY: &str = "bens_tombo_key";

#[derive(Clone)]
pub struct BemRepository {
    pool: PgPool,
}

impl BemRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // Ativos, mais recentes primeiro
    pub async fn list_active(&self) -> Result<Vec<Bem>, AppError> {
        let bens = sqlx::query_as::<_, Bem>(
            "SELECT * FROM bens WHERE ativo = true ORDER BY created_at DESC",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(bens)
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Bem>, AppError> {
        let bem = sqlx::query_as::<_, Bem>("SELECT * FROM bens WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(bem)
    }

    pub async fn find_by_ids(&self, ids: &[Uuid]) -> Result<Vec<Bem>, AppError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let bens = sqlx::query_as::<_, Bem>("SELECT * FROM bens WHERE id = ANY($1)")
            .bind(ids)
            .fetch_all(&self.pool)
            .await?;
        Ok(bens)
    }

    // Consulta pública por tombo: só bens ativos
    pub async fn find_active_by_tombo(&self, tombo: &str) -> Result<Option<Bem>, AppError> {
        let bem = sqlx::query_as::<_, Bem>(
            "SELECT * FROM bens WHERE tombo = $1 AND ativo = true",
        )
        .bind(tombo)
        .fetch_optional(&self.pool)
        .await?;
        Ok(bem)
    }

    // Unicidade do tombo vale para todos os bens, inclusive os excluídos
    pub async fn find_by_tombo(&self, tombo: &str) -> Result<Option<Bem>, AppError> {
        let bem = sqlx::query_as::<_, Bem>("SELECT * FROM bens WHERE tombo = $1")
            .bind(tombo)
            .fetch_optional(&self.pool)
            .await?;
        Ok(bem)
    }

    /// Trava a linha do bem até o fim da transação. Serializa a criação de
    /// empréstimos e a exclusão do mesmo bem.
    pub async fn lock_active<'e, E>(&self, executor: E, id: Uuid) -> Result<Option<Bem>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let bem = sqlx::query_as::<_, Bem>(
            "SELECT * FROM bens WHERE id = $1 AND ativo = true FOR UPDATE",
        )
        .bind(id)
        .fetch_optional(executor)
        .await?;
        Ok(bem)
    }

    pub async fn create(&self, payload: &CreateBemPayload) -> Result<Bem, AppError> {
        sqlx::query_as::<_, Bem>(
            r#"
            INSERT INTO bens (
                tombo, nome, categoria_id, localizacao_id, sala, imagem_tombo, foto_bem
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING *
            "#,
        )
        .bind(&payload.tombo)
        .bind(&payload.nome)
        .bind(payload.categoria_id)
        .bind(payload.localizacao_id)
        .bind(&payload.sala)
        .bind(&payload.imagem_tombo)
        .bind(&payload.foto_bem)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_tombo_conflict(e, AppError::TomboExists))
    }

    pub async fn update<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        payload: &UpdateBemPayload,
    ) -> Result<Option<Bem>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, Bem>(
            r#"
            UPDATE bens SET
                tombo = COALESCE($2, tombo),
                nome = COALESCE($3, nome),
                categoria_id = COALESCE($4, categoria_id),
                localizacao_id = COALESCE($5, localizacao_id),
                sala = COALESCE($6, sala),
                imagem_tombo = COALESCE($7, imagem_tombo),
                foto_bem = COALESCE($8, foto_bem),
                ativo = COALESCE($9, ativo),
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(&payload.tombo)
        .bind(&payload.nome)
        .bind(payload.categoria_id)
        .bind(payload.localizacao_id)
        .bind(&payload.sala)
        .bind(&payload.imagem_tombo)
        .bind(&payload.foto_bem)
        .bind(payload.ativo)
        .fetch_optional(executor)
        .await
        .map_err(|e| map_tombo_conflict(e, AppError::TomboInUse))
    }

    pub async fn soft_delete<'e, E>(&self, executor: E, id: Uuid) -> Result<bool, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query("UPDATE bens SET ativo = false, updated_at = NOW() WHERE id = $1")
            .bind(id)
            .execute(executor)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

fn map_tombo_conflict(e: sqlx::Error, conflict: AppError) -> AppError {
    if let sqlx::Error::Database(db_err) = &e {
        if db_err.is_unique_violation() && db_err.constraint() == Some(TOMBO_KEY) {
            return conflict;
        }
    }
    e.into()
}
