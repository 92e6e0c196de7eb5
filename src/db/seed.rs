// src/db/seed.rs
//
// Dados iniciais: perfis, categorias, localizações, tipos de movimentação e o
// administrador padrão. Pode rodar a cada boot; nada é duplicado.

use anyhow::Context;
use serde_json::json;
use sqlx::{types::Json, PgPool};
use uuid::Uuid;

use crate::models::auth::{ADMIN_ROLE_NAME, DEFAULT_ADMIN_EMAIL};

const DEFAULT_ADMIN_RECOVERY_EMAIL: &str = "admin@patrimonio.com";

const CATEGORIAS: &[(&str, &str)] = &[
    ("móvel", "Móveis e mobiliário em geral"),
    ("objeto litúrgico", "Objetos utilizados em cerimônias litúrgicas"),
    ("eletrônico", "Equipamentos eletrônicos e tecnológicos"),
];

const LOCALIZACOES: &[&str] = &["igreja matriz", "igreja do P.O", "igreja do P.I"];

// (nome, descrição, requer devolução)
const TIPOS: &[(&str, &str, bool)] = &[
    ("empréstimo", "Empréstimo de bem patrimonial", true),
    ("devolução", "Devolução de bem patrimonial emprestado", false),
];

pub async fn run(pool: &PgPool, admin_password: &str) -> anyhow::Result<()> {
    seed_perfis(pool).await?;

    for (nome, descricao) in CATEGORIAS {
        sqlx::query(
            "INSERT INTO categorias (nome, descricao) VALUES ($1, $2) ON CONFLICT (nome) DO NOTHING",
        )
        .bind(nome)
        .bind(descricao)
        .execute(pool)
        .await
        .context("Falha ao semear categorias")?;
    }

    for nome in LOCALIZACOES {
        sqlx::query("INSERT INTO localizacoes (nome) VALUES ($1) ON CONFLICT (nome) DO NOTHING")
            .bind(nome)
            .execute(pool)
            .await
            .context("Falha ao semear localizações")?;
    }

    for (nome, descricao, requer_devolucao) in TIPOS {
        sqlx::query(
            r#"
            INSERT INTO tipos_movimentacao (nome, descricao, requer_devolucao)
            VALUES ($1, $2, $3)
            ON CONFLICT (nome) DO NOTHING
            "#,
        )
        .bind(nome)
        .bind(descricao)
        .bind(requer_devolucao)
        .execute(pool)
        .await
        .context("Falha ao semear tipos de movimentação")?;
    }

    seed_admin(pool, admin_password).await?;

    tracing::info!("🌱 Dados iniciais verificados");
    Ok(())
}

async fn seed_perfis(pool: &PgPool) -> anyhow::Result<()> {
    let admin = json!({
        "usuarios": { "criar": true, "editar": true, "excluir": true, "visualizar": true },
        "bens": { "criar": true, "editar": true, "excluir": true, "visualizar": true },
        "movimentacoes": { "criar": true, "editar": true, "excluir": true, "visualizar": true },
        "relatorios": { "visualizar": true, "exportar": true },
        "configuracoes": { "editar": true }
    });
    let user = json!({
        "usuarios": { "criar": false, "editar": false, "excluir": false, "visualizar": false },
        "bens": { "criar": true, "editar": true, "excluir": false, "visualizar": true },
        "movimentacoes": { "criar": true, "editar": false, "excluir": false, "visualizar": true },
        "relatorios": { "visualizar": true, "exportar": false },
        "configuracoes": { "editar": false }
    });

    let perfis = [
        (ADMIN_ROLE_NAME, "Administrador com acesso total ao sistema", admin),
        ("USER", "Usuário padrão com permissões limitadas", user),
    ];

    for (nome, descricao, permissoes) in perfis {
        sqlx::query(
            r#"
            INSERT INTO perfis (nome, descricao, permissoes)
            VALUES ($1, $2, $3)
            ON CONFLICT (nome) DO NOTHING
            "#,
        )
        .bind(nome)
        .bind(descricao)
        .bind(Json(permissoes))
        .execute(pool)
        .await
        .context("Falha ao semear perfis")?;
    }
    Ok(())
}

async fn seed_admin(pool: &PgPool, admin_password: &str) -> anyhow::Result<()> {
    let exists: Option<(Uuid,)> = sqlx::query_as("SELECT id FROM usuarios WHERE email = $1")
        .bind(DEFAULT_ADMIN_EMAIL)
        .fetch_optional(pool)
        .await?;
    if exists.is_some() {
        return Ok(());
    }

    // Buscado pelo nome a cada execução
    let (perfil_id,): (Uuid,) = sqlx::query_as("SELECT id FROM perfis WHERE nome = $1")
        .bind(ADMIN_ROLE_NAME)
        .fetch_optional(pool)
        .await?
        .context("Perfil ADMIN não encontrado")?;

    let password = admin_password.to_owned();
    let password_hash =
        tokio::task::spawn_blocking(move || bcrypt::hash(password, bcrypt::DEFAULT_COST))
            .await
            .context("Falha na task de hashing")??;

    sqlx::query(
        r#"
        INSERT INTO usuarios (email, password_hash, perfil_id, email_recuperacao)
        VALUES ($1, $2, $3, $4)
        ON CONFLICT (email) DO NOTHING
        "#,
    )
    .bind(DEFAULT_ADMIN_EMAIL)
    .bind(password_hash)
    .bind(perfil_id)
    .bind(DEFAULT_ADMIN_RECOVERY_EMAIL)
    .execute(pool)
    .await
    .context("Falha ao criar o administrador padrão")?;

    tracing::info!(email = DEFAULT_ADMIN_EMAIL, "👤 Administrador padrão criado");
    Ok(())
}
