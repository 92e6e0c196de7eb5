//! Autenticação, gate administrativo e tabelas de referência contra um Postgres real.
//!
//! Rodar com `DATABASE_URL` apontando para um servidor de testes:
//! `cargo test -- --ignored`

mod common;

use axum::{http::StatusCode, Router};
use common::{
    body_json, delete_auth, get_auth, login, patch_json_auth, post_json, post_json_auth,
    put_json_auth, reference_id, seeded_admin, ADMIN_EMAIL, ADMIN_PASSWORD,
};
use serde_json::json;
use sqlx::PgPool;

/// Cria um usuário com perfil USER e devolve o token dele.
async fn regular_user(pool: &PgPool, app: Router, admin_token: &str, email: &str) -> String {
    let perfil_id = reference_id(pool, "perfis", "USER").await;
    let response = post_json_auth(
        app.clone(),
        "/api/users",
        admin_token,
        json!({
            "email": email,
            "password": "senha123",
            "perfilId": perfil_id,
            "emailRecuperacao": "recupera@paroquia.org"
        }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    login(app, email, "senha123").await
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requer DATABASE_URL"]
async fn wrong_password_and_unknown_email_look_the_same(pool: PgPool) {
    let (app, _) = seeded_admin(&pool).await;

    let wrong_password = post_json(
        app.clone(),
        "/api/auth/login",
        json!({ "email": ADMIN_EMAIL, "password": "errada" }),
    )
    .await;
    let unknown_email = post_json(
        app,
        "/api/auth/login",
        json!({ "email": "ninguem@paroquia.org", "password": "errada" }),
    )
    .await;

    assert_eq!(wrong_password.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(unknown_email.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(body_json(wrong_password).await, body_json(unknown_email).await);
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requer DATABASE_URL"]
async fn login_returns_profile_without_password(pool: PgPool) {
    let (app, _) = seeded_admin(&pool).await;

    let response = post_json(
        app,
        "/api/auth/login",
        json!({ "email": ADMIN_EMAIL, "password": ADMIN_PASSWORD }),
    )
    .await;
    let json = body_json(response).await;

    assert!(json["data"]["token"].is_string());
    assert_eq!(json["data"]["user"]["perfil"]["nome"], "ADMIN");
    assert!(json["data"]["user"].get("passwordHash").is_none());
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requer DATABASE_URL"]
async fn only_admins_write_reference_data(pool: PgPool) {
    let (app, admin) = seeded_admin(&pool).await;
    let user = regular_user(&pool, app.clone(), &admin, "maria@paroquia.org").await;

    let forbidden = post_json_auth(app.clone(), "/api/categorias", &user, json!({ "nome": "acervo" })).await;
    assert_eq!(forbidden.status(), StatusCode::FORBIDDEN);
    assert_eq!(body_json(forbidden).await["error"]["code"], "FORBIDDEN");

    let created = post_json_auth(app.clone(), "/api/categorias", &admin, json!({ "nome": "acervo" })).await;
    assert_eq!(created.status(), StatusCode::CREATED);

    // Leitura liberada para qualquer usuário autenticado, ordenada por nome
    let listing = body_json(get_auth(app, "/api/categorias", &user).await).await;
    let nomes: Vec<&str> = listing["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|c| c["nome"].as_str().unwrap())
        .collect();
    assert!(nomes.contains(&"acervo"));
    let mut sorted = nomes.clone();
    sorted.sort();
    assert_eq!(nomes, sorted);
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requer DATABASE_URL"]
async fn role_revocation_takes_effect_without_new_token(pool: PgPool) {
    let (app, admin) = seeded_admin(&pool).await;
    let user = regular_user(&pool, app.clone(), &admin, "jose@paroquia.org").await;
    let admin_perfil = reference_id(&pool, "perfis", "ADMIN").await;
    let user_perfil = reference_id(&pool, "perfis", "USER").await;

    let me = body_json(get_auth(app.clone(), "/api/auth/me", &user).await).await;
    let user_id = me["data"]["id"].as_str().unwrap().to_owned();
    let uri = format!("/api/users/{user_id}");

    put_json_auth(app.clone(), &uri, &admin, json!({ "perfilId": admin_perfil })).await;
    assert_eq!(get_auth(app.clone(), "/api/users", &user).await.status(), StatusCode::OK);

    put_json_auth(app.clone(), &uri, &admin, json!({ "perfilId": user_perfil })).await;
    assert_eq!(get_auth(app, "/api/users", &user).await.status(), StatusCode::FORBIDDEN);
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requer DATABASE_URL"]
async fn reference_names_are_unique_and_delete_is_guarded(pool: PgPool) {
    let (app, admin) = seeded_admin(&pool).await;

    let duplicate = post_json_auth(app.clone(), "/api/categorias", &admin, json!({ "nome": "móvel" })).await;
    assert_eq!(duplicate.status(), StatusCode::CONFLICT);
    assert_eq!(body_json(duplicate).await["error"]["code"], "ALREADY_EXISTS");

    let eletronico = reference_id(&pool, "categorias", "eletrônico").await;
    let rename = put_json_auth(
        app.clone(),
        &format!("/api/categorias/{eletronico}"),
        &admin,
        json!({ "nome": "móvel" }),
    )
    .await;
    assert_eq!(rename.status(), StatusCode::CONFLICT);
    assert_eq!(body_json(rename).await["error"]["code"], "NAME_IN_USE");

    // Perfil USER ainda tem usuários ativos
    let user_perfil = reference_id(&pool, "perfis", "USER").await;
    regular_user(&pool, app.clone(), &admin, "ana@paroquia.org").await;
    let blocked = delete_auth(app.clone(), &format!("/api/perfis/{user_perfil}"), &admin).await;
    assert_eq!(blocked.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(blocked).await["error"]["code"], "HAS_DEPENDENCIES");

    let deleted = delete_auth(app.clone(), &format!("/api/categorias/{eletronico}"), &admin).await;
    assert_eq!(deleted.status(), StatusCode::OK);

    let missing = get_auth(app, &format!("/api/categorias/{}", uuid::Uuid::new_v4()), &admin).await;
    assert_eq!(missing.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_json(missing).await["error"]["code"], "NOT_FOUND");
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requer DATABASE_URL"]
async fn deactivating_by_update_respects_dependents(pool: PgPool) {
    let (app, admin) = seeded_admin(&pool).await;
    let categoria_id = reference_id(&pool, "categorias", "móvel").await;
    let localizacao_id = reference_id(&pool, "localizacoes", "igreja matriz").await;
    let categoria_uri = format!("/api/categorias/{categoria_id}");

    let bem = post_json_auth(
        app.clone(),
        "/api/bens",
        &admin,
        json!({
            "tombo": "M-010",
            "nome": "Banco de madeira",
            "categoriaId": categoria_id,
            "localizacaoId": localizacao_id,
            "sala": "Nave"
        }),
    )
    .await;
    assert_eq!(bem.status(), StatusCode::CREATED);
    let bem_id = body_json(bem).await["data"]["id"].as_str().unwrap().to_owned();

    let blocked = put_json_auth(app.clone(), &categoria_uri, &admin, json!({ "ativo": false })).await;
    assert_eq!(blocked.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(blocked).await["error"]["code"], "HAS_DEPENDENCIES");

    // Renomear não depende dos bens
    let renamed = put_json_auth(
        app.clone(),
        &categoria_uri,
        &admin,
        json!({ "descricao": "Bancos, mesas e armários" }),
    )
    .await;
    assert_eq!(renamed.status(), StatusCode::OK);

    delete_auth(app.clone(), &format!("/api/bens/{bem_id}"), &admin).await;

    let deactivated = put_json_auth(app.clone(), &categoria_uri, &admin, json!({ "ativo": false })).await;
    assert_eq!(deactivated.status(), StatusCode::OK);
    assert_eq!(body_json(deactivated).await["data"]["ativo"], false);

    let listing = body_json(get_auth(app, "/api/categorias", &admin).await).await;
    assert!(listing["data"].as_array().unwrap().iter().all(|c| c["nome"] != "móvel"));
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requer DATABASE_URL"]
async fn tipo_in_use_keeps_its_return_requirement(pool: PgPool) {
    let (app, admin) = seeded_admin(&pool).await;

    let tipo = post_json_auth(
        app.clone(),
        "/api/tipos-movimentacao",
        &admin,
        json!({ "nome": "outro", "requerDevolucao": false }),
    )
    .await;
    assert_eq!(tipo.status(), StatusCode::CREATED);
    let tipo_id = body_json(tipo).await["data"]["id"].as_str().unwrap().to_owned();
    let tipo_uri = format!("/api/tipos-movimentacao/{tipo_id}");

    // Sem movimentações ainda: pode mudar à vontade
    let toggled = put_json_auth(app.clone(), &tipo_uri, &admin, json!({ "requerDevolucao": true })).await;
    assert_eq!(toggled.status(), StatusCode::OK);
    let toggled = put_json_auth(app.clone(), &tipo_uri, &admin, json!({ "requerDevolucao": false })).await;
    assert_eq!(toggled.status(), StatusCode::OK);

    let bem = post_json_auth(
        app.clone(),
        "/api/bens",
        &admin,
        json!({
            "tombo": "O-001",
            "nome": "Toalha de altar",
            "categoriaId": reference_id(&pool, "categorias", "objeto litúrgico").await,
            "localizacaoId": reference_id(&pool, "localizacoes", "igreja matriz").await,
            "sala": "Sacristia"
        }),
    )
    .await;
    let bem_id = body_json(bem).await["data"]["id"].clone();

    for _ in 0..2 {
        let movement = post_json_auth(
            app.clone(),
            "/api/movimentacoes",
            &admin,
            json!({
                "bemId": bem_id,
                "tipoId": tipo_id,
                "pessoa": "Maria",
                "contato": "maria@paroquia.org",
                "pastoral": "Liturgia",
                "dataEmprestimo": "2024-05-01"
            }),
        )
        .await;
        assert_eq!(movement.status(), StatusCode::CREATED);
    }

    let blocked = put_json_auth(app.clone(), &tipo_uri, &admin, json!({ "requerDevolucao": true })).await;
    assert_eq!(blocked.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(blocked).await["error"]["code"], "HAS_DEPENDENCIES");

    // Repetir o valor atual não é mudança
    let same = put_json_auth(app.clone(), &tipo_uri, &admin, json!({ "requerDevolucao": false })).await;
    assert_eq!(same.status(), StatusCode::OK);

    let active = body_json(get_auth(app, "/api/movimentacoes/active", &admin).await).await;
    assert!(active["data"].as_array().unwrap().is_empty());
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requer DATABASE_URL"]
async fn recovering_twice_yields_different_passwords(pool: PgPool) {
    let (app, _) = seeded_admin(&pool).await;
    let body = json!({ "email": ADMIN_EMAIL, "emailRecuperacao": "admin@patrimonio.com" });

    let first = body_json(post_json(app.clone(), "/api/auth/recover-password", body.clone()).await).await;
    let first = first["data"]["senhaTemporaria"].as_str().unwrap().to_owned();
    let second = body_json(post_json(app.clone(), "/api/auth/recover-password", body).await).await;
    let second = second["data"]["senhaTemporaria"].as_str().unwrap().to_owned();

    assert_ne!(first, second);
    assert_eq!(second.len(), 6);

    // Só a última vale
    let old = post_json(
        app.clone(),
        "/api/auth/login",
        json!({ "email": ADMIN_EMAIL, "password": first }),
    )
    .await;
    assert_eq!(old.status(), StatusCode::UNAUTHORIZED);

    let token = login(app.clone(), ADMIN_EMAIL, &second).await;
    let me = body_json(get_auth(app.clone(), "/api/auth/me", &token).await).await;
    assert_eq!(me["data"]["tempPassword"], true);

    let changed = patch_json_auth(
        app.clone(),
        "/api/auth/change-password",
        &token,
        json!({ "novaSenha": "nova-senha" }),
    )
    .await;
    assert_eq!(changed.status(), StatusCode::OK);

    let me = body_json(get_auth(app.clone(), "/api/auth/me", &token).await).await;
    assert_eq!(me["data"]["tempPassword"], false);
    login(app, ADMIN_EMAIL, "nova-senha").await;
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requer DATABASE_URL"]
async fn recovery_checks_the_recovery_email(pool: PgPool) {
    let (app, _) = seeded_admin(&pool).await;

    let wrong = post_json(
        app.clone(),
        "/api/auth/recover-password",
        json!({ "email": ADMIN_EMAIL, "emailRecuperacao": "outro@paroquia.org" }),
    )
    .await;
    assert_eq!(wrong.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(wrong).await["error"]["code"], "INVALID_RECOVERY_EMAIL");

    let unknown = post_json(
        app,
        "/api/auth/recover-password",
        json!({ "email": "ninguem@paroquia.org", "emailRecuperacao": "x@paroquia.org" }),
    )
    .await;
    assert_eq!(unknown.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_json(unknown).await["error"]["code"], "USER_NOT_FOUND");
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requer DATABASE_URL"]
async fn default_admin_is_protected(pool: PgPool) {
    let (app, admin) = seeded_admin(&pool).await;
    let me = body_json(get_auth(app.clone(), "/api/auth/me", &admin).await).await;
    let uri = format!("/api/users/{}", me["data"]["id"].as_str().unwrap());

    let rename = put_json_auth(app.clone(), &uri, &admin, json!({ "email": "novo@email.com" })).await;
    assert_eq!(rename.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(rename).await["error"]["code"], "CANNOT_UPDATE_ADMIN");

    let delete = delete_auth(app.clone(), &uri, &admin).await;
    assert_eq!(delete.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(delete).await["error"]["code"], "CANNOT_DELETE_ADMIN");

    let duplicate = post_json_auth(
        app,
        "/api/users",
        &admin,
        json!({
            "email": ADMIN_EMAIL,
            "password": "senha123",
            "perfilId": me["data"]["perfil"]["id"]
        }),
    )
    .await;
    assert_eq!(duplicate.status(), StatusCode::CONFLICT);
    assert_eq!(body_json(duplicate).await["error"]["code"], "USER_EXISTS");
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requer DATABASE_URL"]
async fn seeding_twice_is_harmless(pool: PgPool) {
    patrimonio_backend::db::seed::run(&pool, ADMIN_PASSWORD).await.unwrap();
    patrimonio_backend::db::seed::run(&pool, "outra-senha").await.unwrap();

    let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM categorias")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(count, 3);

    // A senha do admin já existente não muda
    let app = common::build_test_app(pool);
    login(app, ADMIN_EMAIL, ADMIN_PASSWORD).await;
}
