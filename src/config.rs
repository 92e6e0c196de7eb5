// src/config.rs

use std::{env, str::FromStr, sync::Arc, time::Duration};

use anyhow::Context;
use axum::extract::FromRef;
use sqlx::{postgres::PgPoolOptions, PgPool};

use crate::{
    db::{BemRepository, MovimentacaoRepository, ReferenceRepository, UserRepository},
    models::reference::{Categoria, Localizacao, Perfil, TipoMovimentacao},
    services::{AuthService, BemService, MovimentacaoService, ReferenceService, UserService},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnv {
    Development,
    Production,
    Test,
}

impl FromStr for AppEnv {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "development" | "dev" => Ok(Self::Development),
            "production" | "prod" => Ok(Self::Production),
            "test" => Ok(Self::Test),
            other => anyhow::bail!("APP_ENV inválido: {other}"),
        }
    }
}

// Configuração lida do ambiente (e do .env, se existir)
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub jwt_secret: String,
    pub jwt_expiration_hours: i64,
    pub host: String,
    pub port: u16,
    pub frontend_url: String,
    pub app_env: AppEnv,
    pub db_max_connections: u32,
    pub db_acquire_timeout: Duration,
    pub seed_defaults: bool,
    pub admin_password: String,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    // Separado de `from_env` para os testes não mexerem em variáveis do processo
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &str| {
            lookup(key)
                .filter(|v| !v.is_empty())
                .with_context(|| format!("{key} deve ser definida"))
        };
        let or_default = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_owned());

        fn parse<T>(key: &str, raw: String) -> anyhow::Result<T>
        where
            T: FromStr,
            T::Err: std::fmt::Display,
        {
            raw.parse::<T>()
                .map_err(|e| anyhow::anyhow!("{key} inválida ({raw}): {e}"))
        }

        Ok(Self {
            database_url: required("DATABASE_URL")?,
            jwt_secret: required("JWT_SECRET")?,
            jwt_expiration_hours: parse(
                "JWT_EXPIRATION_HOURS",
                or_default("JWT_EXPIRATION_HOURS", "168"),
            )?,
            host: or_default("HOST", "0.0.0.0"),
            port: parse("PORT", or_default("PORT", "3000"))?,
            frontend_url: or_default("FRONTEND_URL", "http://localhost:5173"),
            app_env: or_default("APP_ENV", "development").parse()?,
            db_max_connections: parse("DB_MAX_CONNECTIONS", or_default("DB_MAX_CONNECTIONS", "5"))?,
            db_acquire_timeout: Duration::from_secs(parse(
                "DB_ACQUIRE_TIMEOUT_SECS",
                or_default("DB_ACQUIRE_TIMEOUT_SECS", "3"),
            )?),
            seed_defaults: parse("SEED_DEFAULTS", or_default("SEED_DEFAULTS", "true"))?,
            admin_password: or_default("ADMIN_PASSWORD", "admin123"),
        })
    }

    pub fn is_development(&self) -> bool {
        self.app_env == AppEnv::Development
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[derive(Clone)]
pub struct AppState {
    pub db_pool: PgPool,
    pub config: Arc<Config>,
    pub auth_service: AuthService,
    pub user_service: UserService,
    pub bem_service: BemService,
    pub movimentacao_service: MovimentacaoService,
    pub perfil_service: ReferenceService<Perfil>,
    pub categoria_service: ReferenceService<Categoria>,
    pub localizacao_service: ReferenceService<Localizacao>,
    pub tipo_service: ReferenceService<TipoMovimentacao>,
}

impl AppState {
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        // Conecta ao banco de dados, usando '?' para propagar erros
        let db_pool = PgPoolOptions::new()
            .max_connections(config.db_max_connections)
            .acquire_timeout(config.db_acquire_timeout)
            .connect(&config.database_url)
            .await
            .context("Falha ao conectar ao banco de dados")?;

        tracing::info!("✅ Conexão com o banco de dados estabelecida com sucesso!");

        Ok(Self::from_pool(db_pool, config))
    }

    // --- Monta o gráfico de dependências ---
    pub fn from_pool(db_pool: PgPool, config: Config) -> Self {
        let user_repo = UserRepository::new(db_pool.clone());
        let bem_repo = BemRepository::new(db_pool.clone());
        let movimentacao_repo = MovimentacaoRepository::new(db_pool.clone());
        let perfil_repo = ReferenceRepository::<Perfil>::new(db_pool.clone());
        let categoria_repo = ReferenceRepository::<Categoria>::new(db_pool.clone());
        let localizacao_repo = ReferenceRepository::<Localizacao>::new(db_pool.clone());
        let tipo_repo = ReferenceRepository::<TipoMovimentacao>::new(db_pool.clone());

        let auth_service = AuthService::new(
            user_repo.clone(),
            perfil_repo.clone(),
            config.jwt_secret.clone(),
            config.jwt_expiration_hours,
        );
        let user_service = UserService::new(user_repo.clone(), perfil_repo.clone());
        let bem_service = BemService::new(
            db_pool.clone(),
            bem_repo.clone(),
            movimentacao_repo.clone(),
            categoria_repo.clone(),
            localizacao_repo.clone(),
        );
        let movimentacao_service = MovimentacaoService::new(
            db_pool.clone(),
            movimentacao_repo,
            bem_repo,
            tipo_repo.clone(),
            user_repo,
        );

        Self {
            db_pool,
            config: Arc::new(config),
            auth_service,
            user_service,
            bem_service,
            movimentacao_service,
            perfil_service: ReferenceService::new(perfil_repo),
            categoria_service: ReferenceService::new(categoria_repo),
            localizacao_service: ReferenceService::new(localizacao_repo),
            tipo_service: ReferenceService::new(tipo_repo),
        }
    }
}

// Os handlers genéricos de referência extraem só o service de que precisam
impl FromRef<AppState> for ReferenceService<Perfil> {
    fn from_ref(state: &AppState) -> Self {
        state.perfil_service.clone()
    }
}

impl FromRef<AppState> for ReferenceService<Categoria> {
    fn from_ref(state: &AppState) -> Self {
        state.categoria_service.clone()
    }
}

impl FromRef<AppState> for ReferenceService<Localizacao> {
    fn from_ref(state: &AppState) -> Self {
        state.localizacao_service.clone()
    }
}

impl FromRef<AppState> for ReferenceService<TipoMovimentacao> {
    fn from_ref(state: &AppState) -> Self {
        state.tipo_service.clone()
    }
}
