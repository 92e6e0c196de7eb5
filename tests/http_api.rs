//! Testes HTTP que não precisam de banco: o pool é preguiçoso e nunca conecta,
//! então só valem para respostas dadas antes de qualquer consulta.

mod common;

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
};
use common::{body_json, get, get_auth, lazy_pool, post_json, send, test_config, token_for};
use patrimonio_backend::{build_router, AppState};
use uuid::Uuid;

fn app() -> axum::Router {
    build_router(AppState::from_pool(lazy_pool(), test_config(1))).unwrap()
}

#[tokio::test]
async fn health_is_public() {
    let response = get(app(), "/health").await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["status"], "ok");
    assert!(json["timestamp"].is_string());
}

#[tokio::test]
async fn openapi_document_is_served() {
    let response = get(app(), "/api-docs/openapi.json").await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert!(json["paths"]["/api/movimentacoes/{id}/return"].is_object());
    assert!(json["components"]["securitySchemes"]["api_jwt"].is_object());
}

#[tokio::test]
async fn unknown_route_uses_error_envelope() {
    let response = get(app(), "/api/nao-existe").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let json = body_json(response).await;
    assert_eq!(json["success"], false);
    assert_eq!(json["error"]["code"], "NOT_FOUND");
}

#[tokio::test]
async fn protected_route_without_token() {
    let response = get(app(), "/api/bens").await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let json = body_json(response).await;
    assert_eq!(json["error"]["code"], "MISSING_TOKEN");
}

#[tokio::test]
async fn admin_route_checks_token_before_role() {
    let response = post_json(app(), "/api/categorias", serde_json::json!({ "nome": "x" })).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let json = body_json(response).await;
    assert_eq!(json["error"]["code"], "MISSING_TOKEN");
}

#[tokio::test]
async fn malformed_authorization_header() {
    for value in ["Token abc", "Bearer", "Bearer a b"] {
        let request = Request::builder()
            .uri("/api/movimentacoes")
            .header(header::AUTHORIZATION, value)
            .body(Body::empty())
            .unwrap();
        let response = send(app(), request).await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED, "{value}");

        let json = body_json(response).await;
        assert_eq!(json["error"]["code"], "INVALID_TOKEN_FORMAT", "{value}");
    }
}

#[tokio::test]
async fn garbage_token_is_invalid() {
    let response = get_auth(app(), "/api/auth/me", "nao.e.jwt").await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let json = body_json(response).await;
    assert_eq!(json["error"]["code"], "INVALID_TOKEN");
}

#[tokio::test]
async fn expired_token_is_invalid() {
    let state = AppState::from_pool(lazy_pool(), test_config(-2));
    let token = token_for(&state, Uuid::new_v4());
    let app = build_router(state).unwrap();

    let response = get_auth(app, "/api/bens", &token).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let json = body_json(response).await;
    assert_eq!(json["error"]["code"], "INVALID_TOKEN");
}

#[tokio::test]
async fn login_payload_is_validated() {
    let response = post_json(
        app(),
        "/api/auth/login",
        serde_json::json!({ "email": "nao-e-email", "password": "" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let json = body_json(response).await;
    assert_eq!(json["error"]["code"], "VALIDATION_ERROR");
    let fields: Vec<&str> = json["error"]["details"]
        .as_array()
        .unwrap()
        .iter()
        .map(|d| d["field"].as_str().unwrap())
        .collect();
    assert_eq!(fields, ["email", "password"]);
}

#[tokio::test]
async fn malformed_json_is_a_validation_error() {
    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/auth/login")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{\"email\": "))
        .unwrap();
    let response = send(app(), request).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let json = body_json(response).await;
    assert_eq!(json["error"]["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn non_uuid_id_is_rejected_before_the_database() {
    let state = AppState::from_pool(lazy_pool(), test_config(1));
    let token = token_for(&state, Uuid::new_v4());
    let app = build_router(state).unwrap();

    let response = get_auth(app, "/api/bens/123", &token).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let json = body_json(response).await;
    assert_eq!(json["error"]["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn cors_allows_the_frontend_origin() {
    let request = Request::builder()
        .method(Method::OPTIONS)
        .uri("/api/bens")
        .header(header::ORIGIN, "http://localhost:5173")
        .header(header::ACCESS_CONTROL_REQUEST_METHOD, "GET")
        .body(Body::empty())
        .unwrap();
    let response = send(app(), request).await;

    assert_eq!(
        response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN],
        "http://localhost:5173"
    );
    assert_eq!(response.headers()[header::ACCESS_CONTROL_ALLOW_CREDENTIALS], "true");
}
