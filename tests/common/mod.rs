#![allow(dead_code)]

use axum::{
    body::Body,
    http::{header, Method, Request},
    response::Response,
    Router,
};
use chrono::Utc;
use http_body_util::BodyExt;
use sqlx::{postgres::PgPoolOptions, PgPool};
use tower::ServiceExt;
use uuid::Uuid;

use patrimonio_backend::{build_router, models::auth::User, AppState, Config};

pub const ADMIN_EMAIL: &str = "admin@email.com";
pub const ADMIN_PASSWORD: &str = "admin123";

/// Configuração fixa para os testes, sem ler o ambiente.
pub fn test_config(jwt_expiration_hours: i64) -> Config {
    let expiration = jwt_expiration_hours.to_string();
    Config::from_lookup(|key| {
        match key {
            "DATABASE_URL" => Some("postgres://localhost/patrimonio_test"),
            "JWT_SECRET" => Some("segredo-de-teste"),
            "JWT_EXPIRATION_HOURS" => Some(expiration.as_str()),
            "APP_ENV" => Some("test"),
            _ => None,
        }
        .map(str::to_owned)
    })
    .unwrap()
}

pub fn test_state(pool: PgPool) -> AppState {
    AppState::from_pool(pool, test_config(1))
}

pub fn build_test_app(pool: PgPool) -> Router {
    build_router(test_state(pool)).unwrap()
}

/// Pool que nunca conecta: serve para rotas que respondem antes de ir ao banco.
pub fn lazy_pool() -> PgPool {
    PgPoolOptions::new()
        .connect_lazy("postgres://localhost/patrimonio_test")
        .unwrap()
}

/// Token válido para um usuário que não precisa existir no banco.
pub fn token_for(state: &AppState, user_id: Uuid) -> String {
    let user = User {
        id: user_id,
        email: "teste@paroquia.org".into(),
        password_hash: String::new(),
        perfil_id: Uuid::new_v4(),
        email_recuperacao: None,
        temp_password: false,
        ativo: true,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    };
    state.auth_service.create_token(&user).unwrap()
}

pub async fn send(app: Router, request: Request<Body>) -> Response {
    app.oneshot(request).await.unwrap()
}

fn request(method: Method, uri: &str, token: Option<&str>, body: Option<serde_json::Value>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    match body {
        Some(json) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

pub async fn get(app: Router, uri: &str) -> Response {
    send(app, request(Method::GET, uri, None, None)).await
}

pub async fn get_auth(app: Router, uri: &str, token: &str) -> Response {
    send(app, request(Method::GET, uri, Some(token), None)).await
}

pub async fn post_json(app: Router, uri: &str, body: serde_json::Value) -> Response {
    send(app, request(Method::POST, uri, None, Some(body))).await
}

pub async fn post_json_auth(app: Router, uri: &str, token: &str, body: serde_json::Value) -> Response {
    send(app, request(Method::POST, uri, Some(token), Some(body))).await
}

pub async fn post_auth(app: Router, uri: &str, token: &str) -> Response {
    send(app, request(Method::POST, uri, Some(token), None)).await
}

pub async fn put_json_auth(app: Router, uri: &str, token: &str, body: serde_json::Value) -> Response {
    send(app, request(Method::PUT, uri, Some(token), Some(body))).await
}

pub async fn patch_json_auth(app: Router, uri: &str, token: &str, body: serde_json::Value) -> Response {
    send(app, request(Method::PATCH, uri, Some(token), Some(body))).await
}

pub async fn delete_auth(app: Router, uri: &str, token: &str) -> Response {
    send(app, request(Method::DELETE, uri, Some(token), None)).await
}

pub async fn body_json(response: Response) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

/// Faz login pela API e devolve o token.
pub async fn login(app: Router, email: &str, password: &str) -> String {
    let response = post_json(
        app,
        "/api/auth/login",
        serde_json::json!({ "email": email, "password": password }),
    )
    .await;
    assert_eq!(response.status(), 200, "login de {email} falhou");
    let json = body_json(response).await;
    json["data"]["token"].as_str().unwrap().to_owned()
}

/// Dados iniciais + token do administrador padrão.
pub async fn seeded_admin(pool: &PgPool) -> (Router, String) {
    patrimonio_backend::db::seed::run(pool, ADMIN_PASSWORD).await.unwrap();
    let app = build_test_app(pool.clone());
    let token = login(app.clone(), ADMIN_EMAIL, ADMIN_PASSWORD).await;
    (app, token)
}

/// Id de uma linha de referência semeada, buscada pelo nome.
pub async fn reference_id(pool: &PgPool, table: &str, nome: &str) -> Uuid {
    let sql = format!("SELECT id FROM {table} WHERE nome = $1");
    let (id,): (Uuid,) = sqlx::query_as(&sql).bind(nome).fetch_one(pool).await.unwrap();
    id
}
