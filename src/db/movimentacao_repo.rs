// src/db/movimentacao_repo.rs

use chrono::NaiveDate;
use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::movimentacao::{Movimentacao, NewMovimentacao},
};

#[derive(Clone)]
pub struct MovimentacaoRepository {
    pool: PgPool,
}

impl MovimentacaoRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn list_all(&self) -> Result<Vec<Movimentacao>, AppError> {
        let rows = sqlx::query_as::<_, Movimentacao>(
            "SELECT * FROM movimentacoes ORDER BY created_at DESC",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    // Empréstimos em aberto: sem devolução e de um tipo que exige devolução
    pub async fn list_open_loans(&self) -> Result<Vec<Movimentacao>, AppError> {
        let rows = sqlx::query_as::<_, Movimentacao>(
            r#"
            SELECT m.*
            FROM movimentacoes m
            JOIN tipos_movimentacao t ON t.id = m.tipo_id
            WHERE m.data_devolucao IS NULL
              AND t.requer_devolucao = true
            ORDER BY m.data_emprestimo DESC, m.created_at DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Movimentacao>, AppError> {
        let row = sqlx::query_as::<_, Movimentacao>("SELECT * FROM movimentacoes WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    pub async fn count_open_loans<'e, E>(&self, executor: E, bem_id: Uuid) -> Result<i64, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let (count,): (i64,) = sqlx::query_as(
            r#"
            SELECT COUNT(*)
            FROM movimentacoes m
            JOIN tipos_movimentacao t ON t.id = m.tipo_id
            WHERE m.bem_id = $1
              AND m.data_devolucao IS NULL
              AND t.requer_devolucao = true
            "#,
        )
        .bind(bem_id)
        .fetch_one(executor)
        .await?;
        Ok(count)
    }

    pub async fn create<'e, E>(&self, executor: E, new: &NewMovimentacao) -> Result<Movimentacao, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let row = sqlx::query_as::<_, Movimentacao>(
            r#"
            INSERT INTO movimentacoes (
                bem_id, tombo, nome_item, tipo_id,
                pessoa, contato, pastoral, observacao,
                data_emprestimo, data_devolucao, usuario_id
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            RETURNING *
            "#,
        )
        .bind(new.bem_id)
        .bind(&new.tombo)
        .bind(&new.nome_item)
        .bind(new.tipo_id)
        .bind(&new.pessoa)
        .bind(&new.contato)
        .bind(&new.pastoral)
        .bind(&new.observacao)
        .bind(new.data_emprestimo)
        .bind(new.data_devolucao)
        .bind(new.usuario_id)
        .fetch_one(executor)
        .await?;
        Ok(row)
    }

    /// Grava a devolução só se ainda não houver uma. `None` significa que outra
    /// requisição devolveu o item primeiro (ou que ele já estava devolvido).
    pub async fn register_return(
        &self,
        id: Uuid,
        data_devolucao: NaiveDate,
        observacao: Option<&str>,
    ) -> Result<Option<Movimentacao>, AppError> {
        let row = sqlx::query_as::<_, Movimentacao>(
            r#"
            UPDATE movimentacoes SET
                data_devolucao = $2,
                observacao = COALESCE($3, observacao),
                updated_at = NOW()
            WHERE id = $1 AND data_devolucao IS NULL
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(data_devolucao)
        .bind(observacao)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    pub async fn update_observacao(
        &self,
        id: Uuid,
        observacao: &str,
    ) -> Result<Option<Movimentacao>, AppError> {
        let row = sqlx::query_as::<_, Movimentacao>(
            r#"
            UPDATE movimentacoes SET observacao = $2, updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(observacao)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }
}
