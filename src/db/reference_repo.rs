// src/db/reference_repo.rs
//
// Perfis, categorias, localizações e tipos de movimentação compartilham o mesmo
// CRUD. O que muda entre eles (tabela, colunas extras, quem os referencia) fica
// na implementação de `ReferenceTable`; o resto é o `ReferenceRepository<T>`.

use std::{future::Future, marker::PhantomData};

use serde::{de::DeserializeOwned, Serialize};
use sqlx::{postgres::PgRow, types::Json, FromRow, PgPool};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::error::AppError,
    models::reference::{
        Categoria, CreateCategoriaPayload, CreateLocalizacaoPayload, CreatePerfilPayload,
        CreateTipoMovimentacaoPayload, Localizacao, Perfil, TipoMovimentacao,
        UpdateCategoriaPayload, UpdateLocalizacaoPayload, UpdatePerfilPayload,
        UpdateTipoMovimentacaoPayload,
    },
};

/// Tabela que aponta para uma tabela de referência.
#[derive(Debug)]
pub struct Dependent {
    pub table: &'static str,
    pub column: &'static str,
    /// Conta só as linhas ativas (exclusão lógica)
    pub only_active: bool,
}

pub trait ReferenceTable:
    for<'r> FromRow<'r, PgRow> + Serialize + ToSchema + Clone + Send + Sync + Unpin + 'static
{
    const TABLE: &'static str;
    /// Nome usado nas mensagens de erro
    const LABEL: &'static str;
    const DEPENDENTS: &'static [Dependent];

    type Create: DeserializeOwned + Validate + Send + Sync + 'static;
    type Update: DeserializeOwned + Validate + Send + Sync + 'static;

    fn id(&self) -> Uuid;
    fn is_active(&self) -> bool;
    fn create_name(payload: &Self::Create) -> &str;
    fn update_name(payload: &Self::Update) -> Option<&str>;
    fn update_ativo(payload: &Self::Update) -> Option<bool>;

    /// A atualização muda o significado das linhas que já apontam para esta.
    fn alters_dependents(&self, _payload: &Self::Update) -> bool {
        false
    }

    fn insert(
        pool: &PgPool,
        payload: &Self::Create,
    ) -> impl Future<Output = Result<Self, sqlx::Error>> + Send;

    // Campos ausentes mantêm o valor atual
    fn update(
        pool: &PgPool,
        id: Uuid,
        payload: &Self::Update,
    ) -> impl Future<Output = Result<Option<Self>, sqlx::Error>> + Send;
}

pub struct ReferenceRepository<T> {
    pool: PgPool,
    _table: PhantomData<fn() -> T>,
}

impl<T> Clone for ReferenceRepository<T> {
    fn clone(&self) -> Self {
        Self {
            pool: self.pool.clone(),
            _table: PhantomData,
        }
    }
}

impl<T: ReferenceTable> ReferenceRepository<T> {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool,
            _table: PhantomData,
        }
    }

    pub async fn list_active(&self) -> Result<Vec<T>, AppError> {
        let sql = format!("SELECT * FROM {} WHERE ativo = true ORDER BY nome ASC", T::TABLE);
        let rows = sqlx::query_as::<_, T>(&sql).fetch_all(&self.pool).await?;
        Ok(rows)
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<T>, AppError> {
        let sql = format!("SELECT * FROM {} WHERE id = $1", T::TABLE);
        let row = sqlx::query_as::<_, T>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    pub async fn find_active_by_id(&self, id: Uuid) -> Result<Option<T>, AppError> {
        let sql = format!("SELECT * FROM {} WHERE id = $1 AND ativo = true", T::TABLE);
        let row = sqlx::query_as::<_, T>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    // A constraint UNIQUE vale para todas as linhas, ativas ou não
    pub async fn find_by_name(&self, nome: &str) -> Result<Option<T>, AppError> {
        let sql = format!("SELECT * FROM {} WHERE nome = $1", T::TABLE);
        let row = sqlx::query_as::<_, T>(&sql)
            .bind(nome)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    pub async fn find_by_ids(&self, ids: &[Uuid]) -> Result<Vec<T>, AppError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let sql = format!("SELECT * FROM {} WHERE id = ANY($1)", T::TABLE);
        let rows = sqlx::query_as::<_, T>(&sql)
            .bind(ids)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    pub async fn create(&self, payload: &T::Create) -> Result<T, AppError> {
        T::insert(&self.pool, payload).await.map_err(|e| {
            if is_name_conflict::<T>(&e) {
                return AppError::ReferenceAlreadyExists(T::LABEL);
            }
            e.into()
        })
    }

    pub async fn update(&self, id: Uuid, payload: &T::Update) -> Result<Option<T>, AppError> {
        T::update(&self.pool, id, payload).await.map_err(|e| {
            if is_name_conflict::<T>(&e) {
                return AppError::NameInUse;
            }
            e.into()
        })
    }

    pub async fn count_dependents(&self, id: Uuid) -> Result<i64, AppError> {
        let mut total = 0;
        for dep in T::DEPENDENTS {
            let filter = if dep.only_active { " AND ativo = true" } else { "" };
            let sql = format!(
                "SELECT COUNT(*) FROM {} WHERE {} = $1{}",
                dep.table, dep.column, filter
            );
            let (count,): (i64,) = sqlx::query_as(&sql)
                .bind(id)
                .fetch_one(&self.pool)
                .await?;
            total += count;
        }
        Ok(total)
    }

    pub async fn soft_delete(&self, id: Uuid) -> Result<bool, AppError> {
        let sql = format!(
            "UPDATE {} SET ativo = false, updated_at = NOW() WHERE id = $1",
            T::TABLE
        );
        let result = sqlx::query(&sql).bind(id).execute(&self.pool).await?;
        Ok(result.rows_affected() > 0)
    }
}

// Todas as tabelas de referência usam o nome padrão do Postgres: <tabela>_nome_key
fn is_name_conflict<T: ReferenceTable>(e: &sqlx::Error) -> bool {
    match e {
        sqlx::Error::Database(db_err) if db_err.is_unique_violation() => db_err
            .constraint()
            .is_some_and(|c| c.strip_prefix(T::TABLE) == Some("_nome_key")),
        _ => false,
    }
}

// --- Perfis ---
impl ReferenceTable for Perfil {
    const TABLE: &'static str = "perfis";
    const LABEL: &'static str = "Perfil";
    const DEPENDENTS: &'static [Dependent] = &[Dependent {
        table: "usuarios",
        column: "perfil_id",
        only_active: true,
    }];

    type Create = CreatePerfilPayload;
    type Update = UpdatePerfilPayload;

    fn id(&self) -> Uuid {
        self.id
    }

    fn is_active(&self) -> bool {
        self.ativo
    }

    fn create_name(payload: &Self::Create) -> &str {
        &payload.nome
    }

    fn update_name(payload: &Self::Update) -> Option<&str> {
        payload.nome.as_deref()
    }

    fn update_ativo(payload: &Self::Update) -> Option<bool> {
        payload.ativo
    }

    async fn insert(pool: &PgPool, payload: &Self::Create) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, Perfil>(
            r#"
            INSERT INTO perfis (nome, descricao, permissoes)
            VALUES ($1, $2, $3)
            RETURNING *
            "#,
        )
        .bind(&payload.nome)
        .bind(&payload.descricao)
        .bind(Json(&payload.permissoes))
        .fetch_one(pool)
        .await
    }

    async fn update(
        pool: &PgPool,
        id: Uuid,
        payload: &Self::Update,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Perfil>(
            r#"
            UPDATE perfis SET
                nome = COALESCE($2, nome),
                descricao = COALESCE($3, descricao),
                permissoes = COALESCE($4, permissoes),
                ativo = COALESCE($5, ativo),
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(&payload.nome)
        .bind(&payload.descricao)
        .bind(payload.permissoes.as_ref().map(Json))
        .bind(payload.ativo)
        .fetch_optional(pool)
        .await
    }
}

// --- Categorias ---
impl ReferenceTable for Categoria {
    const TABLE: &'static str = "categorias";
    const LABEL: &'static str = "Categoria";
    const DEPENDENTS: &'static [Dependent] = &[Dependent {
        table: "bens",
        column: "categoria_id",
        only_active: true,
    }];

    type Create = CreateCategoriaPayload;
    type Update = UpdateCategoriaPayload;

    fn id(&self) -> Uuid {
        self.id
    }

    fn is_active(&self) -> bool {
        self.ativo
    }

    fn create_name(payload: &Self::Create) -> &str {
        &payload.nome
    }

    fn update_name(payload: &Self::Update) -> Option<&str> {
        payload.nome.as_deref()
    }

    fn update_ativo(payload: &Self::Update) -> Option<bool> {
        payload.ativo
    }

    async fn insert(pool: &PgPool, payload: &Self::Create) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, Categoria>(
            "INSERT INTO categorias (nome, descricao) VALUES ($1, $2) RETURNING *",
        )
        .bind(&payload.nome)
        .bind(&payload.descricao)
        .fetch_one(pool)
        .await
    }

    async fn update(
        pool: &PgPool,
        id: Uuid,
        payload: &Self::Update,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Categoria>(
            r#"
            UPDATE categorias SET
                nome = COALESCE($2, nome),
                descricao = COALESCE($3, descricao),
                ativo = COALESCE($4, ativo),
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(&payload.nome)
        .bind(&payload.descricao)
        .bind(payload.ativo)
        .fetch_optional(pool)
        .await
    }
}

// --- Localizações ---
impl ReferenceTable for Localizacao {
    const TABLE: &'static str = "localizacoes";
    const LABEL: &'static str = "Localização";
    const DEPENDENTS: &'static [Dependent] = &[Dependent {
        table: "bens",
        column: "localizacao_id",
        only_active: true,
    }];

    type Create = CreateLocalizacaoPayload;
    type Update = UpdateLocalizacaoPayload;

    fn id(&self) -> Uuid {
        self.id
    }

    fn is_active(&self) -> bool {
        self.ativo
    }

    fn create_name(payload: &Self::Create) -> &str {
        &payload.nome
    }

    fn update_name(payload: &Self::Update) -> Option<&str> {
        payload.nome.as_deref()
    }

    fn update_ativo(payload: &Self::Update) -> Option<bool> {
        payload.ativo
    }

    async fn insert(pool: &PgPool, payload: &Self::Create) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, Localizacao>(
            r#"
            INSERT INTO localizacoes (nome, endereco, responsavel, telefone)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(&payload.nome)
        .bind(&payload.endereco)
        .bind(&payload.responsavel)
        .bind(&payload.telefone)
        .fetch_one(pool)
        .await
    }

    async fn update(
        pool: &PgPool,
        id: Uuid,
        payload: &Self::Update,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Localizacao>(
            r#"
            UPDATE localizacoes SET
                nome = COALESCE($2, nome),
                endereco = COALESCE($3, endereco),
                responsavel = COALESCE($4, responsavel),
                telefone = COALESCE($5, telefone),
                ativo = COALESCE($6, ativo),
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(&payload.nome)
        .bind(&payload.endereco)
        .bind(&payload.responsavel)
        .bind(&payload.telefone)
        .bind(payload.ativo)
        .fetch_optional(pool)
        .await
    }
}

// --- Tipos de movimentação ---
impl ReferenceTable for TipoMovimentacao {
    const TABLE: &'static str = "tipos_movimentacao";
    const LABEL: &'static str = "Tipo de movimentação";
    // O histórico inteiro conta: movimentações nunca são excluídas
    const DEPENDENTS: &'static [Dependent] = &[Dependent {
        table: "movimentacoes",
        column: "tipo_id",
        only_active: false,
    }];

    type Create = CreateTipoMovimentacaoPayload;
    type Update = UpdateTipoMovimentacaoPayload;

    fn id(&self) -> Uuid {
        self.id
    }

    fn is_active(&self) -> bool {
        self.ativo
    }

    fn create_name(payload: &Self::Create) -> &str {
        &payload.nome
    }

    fn update_name(payload: &Self::Update) -> Option<&str> {
        payload.nome.as_deref()
    }

    fn update_ativo(payload: &Self::Update) -> Option<bool> {
        payload.ativo
    }

    // Ligar requer_devolucao abriria empréstimos retroativos no histórico
    fn alters_dependents(&self, payload: &Self::Update) -> bool {
        payload
            .requer_devolucao
            .is_some_and(|requer| requer != self.requer_devolucao)
    }

    async fn insert(pool: &PgPool, payload: &Self::Create) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, TipoMovimentacao>(
            r#"
            INSERT INTO tipos_movimentacao (nome, descricao, requer_devolucao)
            VALUES ($1, $2, $3)
            RETURNING *
            "#,
        )
        .bind(&payload.nome)
        .bind(&payload.descricao)
        .bind(payload.requer_devolucao)
        .fetch_one(pool)
        .await
    }

    async fn update(
        pool: &PgPool,
        id: Uuid,
        payload: &Self::Update,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, TipoMovimentacao>(
            r#"
            UPDATE tipos_movimentacao SET
                nome = COALESCE($2, nome),
                descricao = COALESCE($3, descricao),
                requer_devolucao = COALESCE($4, requer_devolucao),
                ativo = COALESCE($5, ativo),
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(&payload.nome)
        .bind(&payload.descricao)
        .bind(payload.requer_devolucao)
        .bind(payload.ativo)
        .fetch_optional(pool)
        .await
    }
}
