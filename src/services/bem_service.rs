// src/services/bem_service.rs

use std::collections::HashMap;

use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{BemRepository, MovimentacaoRepository, ReferenceRepository},
    models::{
        bem::{Bem, BemDetail, CreateBemPayload, UpdateBemPayload},
        reference::{Categoria, Localizacao},
    },
    services::rules::{self, LoanState},
};

#[derive(Clone)]
pub struct BemService {
    pool: PgPool,
    bem_repo: BemRepository,
    movimentacao_repo: MovimentacaoRepository,
    categoria_repo: ReferenceRepository<Categoria>,
    localizacao_repo: ReferenceRepository<Localizacao>,
}

impl BemService {
    pub fn new(
        pool: PgPool,
        bem_repo: BemRepository,
        movimentacao_repo: MovimentacaoRepository,
        categoria_repo: ReferenceRepository<Categoria>,
        localizacao_repo: ReferenceRepository<Localizacao>,
    ) -> Self {
        Self {
            pool,
            bem_repo,
            movimentacao_repo,
            categoria_repo,
            localizacao_repo,
        }
    }

    pub async fn list_bens(&self) -> Result<Vec<BemDetail>, AppError> {
        let bens = self.bem_repo.list_active().await?;
        self.attach_references(bens).await
    }

    pub async fn get_bem(&self, id: Uuid) -> Result<BemDetail, AppError> {
        let bem = self.bem_repo.find_by_id(id).await?.ok_or(AppError::BemNotFound)?;
        self.detail(bem).await
    }

    pub async fn get_by_tombo(&self, tombo: &str) -> Result<BemDetail, AppError> {
        let bem = self
            .bem_repo
            .find_active_by_tombo(tombo)
            .await?
            .ok_or(AppError::BemNotFound)?;
        self.detail(bem).await
    }

    pub async fn create_bem(&self, payload: CreateBemPayload) -> Result<BemDetail, AppError> {
        if self.bem_repo.find_by_tombo(&payload.tombo).await?.is_some() {
            return Err(AppError::TomboExists);
        }
        self.ensure_categoria(payload.categoria_id).await?;
        self.ensure_localizacao(payload.localizacao_id).await?;

        let bem = self.bem_repo.create(&payload).await?;
        tracing::info!(bem_id = %bem.id, tombo = %bem.tombo, "📦 Bem cadastrado");
        self.detail(bem).await
    }

    pub async fn update_bem(&self, id: Uuid, payload: UpdateBemPayload) -> Result<BemDetail, AppError> {
        let current = self.bem_repo.find_by_id(id).await?.ok_or(AppError::BemNotFound)?;

        if let Some(tombo) = payload.tombo.as_deref().filter(|t| *t != current.tombo) {
            if self.bem_repo.find_by_tombo(tombo).await?.is_some() {
                return Err(AppError::TomboInUse);
            }
        }
        if let Some(categoria_id) = payload.categoria_id {
            self.ensure_categoria(categoria_id).await?;
        }
        if let Some(localizacao_id) = payload.localizacao_id {
            self.ensure_localizacao(localizacao_id).await?;
        }

        let mut tx = self.pool.begin().await?;

        // Desativar pelo update é uma exclusão: mesma trava e mesma checagem
        let deactivating = current.ativo && payload.ativo == Some(false);
        if deactivating {
            self.ensure_no_open_loans(&mut tx, id).await?;
        }

        let bem = self
            .bem_repo
            .update(&mut *tx, id, &payload)
            .await?
            .ok_or(AppError::BemNotFound)?;
        tx.commit().await?;

        if deactivating {
            tracing::info!(bem_id = %id, "🗑️ Bem desativado");
        }
        self.detail(bem).await
    }

    // Mesma trava de linha usada na criação de empréstimos: um empréstimo
    // concorrente espera esta transação terminar.
    pub async fn delete_bem(&self, id: Uuid) -> Result<(), AppError> {
        let mut tx = self.pool.begin().await?;

        self.ensure_no_open_loans(&mut tx, id).await?;
        self.bem_repo.soft_delete(&mut *tx, id).await?;
        tx.commit().await?;

        tracing::info!(bem_id = %id, "🗑️ Bem desativado");
        Ok(())
    }

    async fn ensure_no_open_loans(
        &self,
        tx: &mut Transaction<'static, Postgres>,
        id: Uuid,
    ) -> Result<(), AppError> {
        self.bem_repo
            .lock_active(&mut **tx, id)
            .await?
            .ok_or(AppError::BemNotFound)?;

        let open_loans = self.movimentacao_repo.count_open_loans(&mut **tx, id).await?;
        rules::ensure_can_delete_bem(LoanState::from_open_loans(open_loans))
    }

    async fn ensure_categoria(&self, id: Uuid) -> Result<(), AppError> {
        self.categoria_repo
            .find_active_by_id(id)
            .await?
            .map(|_| ())
            .ok_or(AppError::CategoriaNotFound)
    }

    async fn ensure_localizacao(&self, id: Uuid) -> Result<(), AppError> {
        self.localizacao_repo
            .find_active_by_id(id)
            .await?
            .map(|_| ())
            .ok_or(AppError::LocalizacaoNotFound)
    }

    async fn detail(&self, bem: Bem) -> Result<BemDetail, AppError> {
        let categoria = self.categoria_repo.find_by_id(bem.categoria_id).await?;
        let localizacao = self.localizacao_repo.find_by_id(bem.localizacao_id).await?;
        Ok(BemDetail {
            bem,
            categoria,
            localizacao,
        })
    }

    // Duas consultas em lote em vez de uma por bem
    async fn attach_references(&self, bens: Vec<Bem>) -> Result<Vec<BemDetail>, AppError> {
        let categoria_ids = unique_ids(bens.iter().map(|b| b.categoria_id));
        let localizacao_ids = unique_ids(bens.iter().map(|b| b.localizacao_id));

        let categorias: HashMap<Uuid, Categoria> = self
            .categoria_repo
            .find_by_ids(&categoria_ids)
            .await?
            .into_iter()
            .map(|c| (c.id, c))
            .collect();
        let localizacoes: HashMap<Uuid, Localizacao> = self
            .localizacao_repo
            .find_by_ids(&localizacao_ids)
            .await?
            .into_iter()
            .map(|l| (l.id, l))
            .collect();

        Ok(bens
            .into_iter()
            .map(|bem| BemDetail {
                categoria: categorias.get(&bem.categoria_id).cloned(),
                localizacao: localizacoes.get(&bem.localizacao_id).cloned(),
                bem,
            })
            .collect())
    }
}

pub(crate) fn unique_ids(ids: impl Iterator<Item = Uuid>) -> Vec<Uuid> {
    let mut ids: Vec<Uuid> = ids.collect();
    ids.sort_unstable();
    ids.dedup();
    ids
}
