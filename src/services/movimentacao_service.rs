// src/services/movimentacao_service.rs

use std::collections::HashMap;

use chrono::{NaiveDate, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{BemRepository, MovimentacaoRepository, ReferenceRepository, UserRepository},
    models::{
        auth::User,
        bem::Bem,
        movimentacao::{
            CreateMovimentacaoPayload, Movimentacao, MovimentacaoDetail, NewMovimentacao,
            UpdateMovimentacaoPayload,
        },
        reference::TipoMovimentacao,
    },
    services::{
        bem_service::unique_ids,
        rules::{self, LoanState},
    },
};

#[derive(Clone)]
pub struct MovimentacaoService {
    pool: PgPool,
    movimentacao_repo: MovimentacaoRepository,
    bem_repo: BemRepository,
    tipo_repo: ReferenceRepository<TipoMovimentacao>,
    user_repo: UserRepository,
}

impl MovimentacaoService {
    pub fn new(
        pool: PgPool,
        movimentacao_repo: MovimentacaoRepository,
        bem_repo: BemRepository,
        tipo_repo: ReferenceRepository<TipoMovimentacao>,
        user_repo: UserRepository,
    ) -> Self {
        Self {
            pool,
            movimentacao_repo,
            bem_repo,
            tipo_repo,
            user_repo,
        }
    }

    pub async fn list_movimentacoes(&self) -> Result<Vec<MovimentacaoDetail>, AppError> {
        let rows = self.movimentacao_repo.list_all().await?;
        self.attach_details(rows).await
    }

    pub async fn list_active_loans(&self) -> Result<Vec<MovimentacaoDetail>, AppError> {
        let rows = self.movimentacao_repo.list_open_loans().await?;
        self.attach_details(rows).await
    }

    pub async fn get_movimentacao(&self, id: Uuid) -> Result<MovimentacaoDetail, AppError> {
        let row = self.find(id).await?;
        self.single_detail(row).await
    }

    /// Registra uma movimentação. Para tipos que exigem devolução, a checagem de
    /// empréstimo em aberto e o INSERT rodam com a linha do bem travada.
    pub async fn create_movimentacao(
        &self,
        usuario_id: Uuid,
        payload: CreateMovimentacaoPayload,
    ) -> Result<MovimentacaoDetail, AppError> {
        if let Some(data_devolucao) = payload.data_devolucao {
            rules::ensure_valid_return_date(payload.data_emprestimo, data_devolucao)?;
        }

        // Consultado antes da transação para não segurar duas conexões;
        // o bem inexistente continua tendo precedência no erro.
        let tipo = self
            .tipo_repo
            .find_active_by_id(payload.tipo_id)
            .await?
            .ok_or(AppError::TipoNotFound);

        let mut tx = self.pool.begin().await?;

        let bem = self
            .bem_repo
            .lock_active(&mut *tx, payload.bem_id)
            .await?
            .ok_or(AppError::BemNotFound)?;
        let tipo = tipo?;

        if tipo.requer_devolucao {
            let open_loans = self.movimentacao_repo.count_open_loans(&mut *tx, bem.id).await?;
            rules::ensure_can_open_loan(true, LoanState::from_open_loans(open_loans))?;
        }

        let new = NewMovimentacao {
            bem_id: bem.id,
            tombo: payload.tombo.unwrap_or_else(|| bem.tombo.clone()),
            nome_item: payload.nome_item.unwrap_or_else(|| bem.nome.clone()),
            tipo_id: tipo.id,
            pessoa: payload.pessoa,
            contato: payload.contato,
            pastoral: payload.pastoral,
            observacao: payload.observacao,
            data_emprestimo: payload.data_emprestimo,
            data_devolucao: payload.data_devolucao,
            usuario_id,
        };
        let row = self.movimentacao_repo.create(&mut *tx, &new).await?;
        tx.commit().await?;

        tracing::info!(
            movimentacao_id = %row.id,
            bem_id = %bem.id,
            tipo = %tipo.nome,
            "📤 Movimentação registrada"
        );

        let usuario = self.user_repo.find_by_id(usuario_id).await?;
        Ok(MovimentacaoDetail {
            movimentacao: row,
            bem: Some(bem),
            tipo: Some(tipo),
            usuario,
        })
    }

    /// Atualiza data de devolução e/ou observação. Só a observação pode mudar
    /// depois que o item foi devolvido.
    pub async fn update_movimentacao(
        &self,
        id: Uuid,
        payload: UpdateMovimentacaoPayload,
    ) -> Result<MovimentacaoDetail, AppError> {
        let current = self.find(id).await?;

        let row = match (payload.data_devolucao, payload.observacao.as_deref()) {
            (Some(data), observacao) => self.apply_return(&current, data, observacao).await?,
            (None, Some(observacao)) => self
                .movimentacao_repo
                .update_observacao(id, observacao)
                .await?
                .ok_or(AppError::MovimentacaoNotFound)?,
            (None, None) => current,
        };

        self.single_detail(row).await
    }

    /// Devolução com a data de hoje.
    pub async fn register_return(&self, id: Uuid) -> Result<MovimentacaoDetail, AppError> {
        let current = self.find(id).await?;
        let today = Utc::now().date_naive();

        let row = self.apply_return(&current, today, None).await?;
        self.single_detail(row).await
    }

    async fn apply_return(
        &self,
        current: &Movimentacao,
        data_devolucao: NaiveDate,
        observacao: Option<&str>,
    ) -> Result<Movimentacao, AppError> {
        rules::ensure_can_register_return(
            current.data_emprestimo,
            current.data_devolucao,
            data_devolucao,
        )?;

        // O WHERE data_devolucao IS NULL decide entre devoluções concorrentes
        let row = self
            .movimentacao_repo
            .register_return(current.id, data_devolucao, observacao)
            .await?
            .ok_or(AppError::AlreadyReturned)?;

        tracing::info!(
            movimentacao_id = %row.id,
            bem_id = %row.bem_id,
            data_devolucao = %data_devolucao,
            "📥 Devolução registrada"
        );
        Ok(row)
    }

    async fn find(&self, id: Uuid) -> Result<Movimentacao, AppError> {
        self.movimentacao_repo
            .find_by_id(id)
            .await?
            .ok_or(AppError::MovimentacaoNotFound)
    }

    async fn single_detail(&self, row: Movimentacao) -> Result<MovimentacaoDetail, AppError> {
        let mut details = self.attach_details(vec![row]).await?;
        details.pop().ok_or(AppError::MovimentacaoNotFound)
    }

    async fn attach_details(
        &self,
        rows: Vec<Movimentacao>,
    ) -> Result<Vec<MovimentacaoDetail>, AppError> {
        let bem_ids = unique_ids(rows.iter().map(|m| m.bem_id));
        let tipo_ids = unique_ids(rows.iter().map(|m| m.tipo_id));
        let usuario_ids = unique_ids(rows.iter().filter_map(|m| m.usuario_id));

        let bens: HashMap<Uuid, Bem> = self
            .bem_repo
            .find_by_ids(&bem_ids)
            .await?
            .into_iter()
            .map(|b| (b.id, b))
            .collect();
        let tipos: HashMap<Uuid, TipoMovimentacao> = self
            .tipo_repo
            .find_by_ids(&tipo_ids)
            .await?
            .into_iter()
            .map(|t| (t.id, t))
            .collect();
        let usuarios: HashMap<Uuid, User> = self
            .user_repo
            .find_by_ids(&usuario_ids)
            .await?
            .into_iter()
            .map(|u| (u.id, u))
            .collect();

        Ok(rows
            .into_iter()
            .map(|m| MovimentacaoDetail {
                bem: bens.get(&m.bem_id).cloned(),
                tipo: tipos.get(&m.tipo_id).cloned(),
                usuario: m.usuario_id.and_then(|id| usuarios.get(&id).cloned()),
                movimentacao: m,
            })
            .collect())
    }
}
