// src/routes.rs

use anyhow::Context;
use axum::{
    http::{
        header::{AUTHORIZATION, CONTENT_TYPE},
        HeaderValue, Method,
    },
    middleware::from_fn_with_state,
    routing::{get, patch, post, put},
    Json, Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use utoipa::OpenApi;

use crate::{
    common::error::AppError,
    config::AppState,
    docs::ApiDoc,
    handlers::{self, reference},
    middleware::auth::{admin_guard, auth_guard},
    models::reference::{Categoria, Localizacao, Perfil, TipoMovimentacao},
};

// Leitura autenticada, escrita só para ADMIN. O admin_guard fica por dentro:
// o auth_guard roda antes e deixa o Principal nas extensions.
macro_rules! reference_routes {
    ($state:expr, $table:ty) => {{
        let read = Router::new()
            .route("/", get(reference::list::<$table>))
            .route("/{id}", get(reference::get::<$table>));

        let write = Router::new()
            .route("/", post(reference::create::<$table>))
            .route(
                "/{id}",
                put(reference::update::<$table>).delete(reference::delete::<$table>),
            )
            .route_layer(from_fn_with_state($state.clone(), admin_guard));

        read.merge(write)
            .route_layer(from_fn_with_state($state.clone(), auth_guard))
    }};
}

pub fn build_router(app_state: AppState) -> anyhow::Result<Router> {
    // Rotas públicas de autenticação
    let auth_routes = Router::new()
        .route("/login", post(handlers::auth::login))
        .route("/recover-password", post(handlers::auth::recover_password))
        .merge(
            Router::new()
                .route("/logout", post(handlers::auth::logout))
                .route("/change-password", patch(handlers::auth::change_password))
                .route("/me", get(handlers::auth::get_me))
                .route_layer(from_fn_with_state(app_state.clone(), auth_guard)),
        );

    // GET /users/{id} só exige login; o resto é administrativo
    let user_routes = Router::new()
        .route("/{id}", get(handlers::users::get_user))
        .merge(
            Router::new()
                .route(
                    "/",
                    get(handlers::users::list_users).post(handlers::users::create_user),
                )
                .route(
                    "/{id}",
                    put(handlers::users::update_user).delete(handlers::users::delete_user),
                )
                .route_layer(from_fn_with_state(app_state.clone(), admin_guard)),
        )
        .route_layer(from_fn_with_state(app_state.clone(), auth_guard));

    let bem_routes = Router::new()
        .route(
            "/",
            get(handlers::bens::list_bens).post(handlers::bens::create_bem),
        )
        .route("/tombo/{tombo}", get(handlers::bens::get_bem_by_tombo))
        .route(
            "/{id}",
            get(handlers::bens::get_bem)
                .put(handlers::bens::update_bem)
                .delete(handlers::bens::delete_bem),
        )
        .route_layer(from_fn_with_state(app_state.clone(), auth_guard));

    let movimentacao_routes = Router::new()
        .route(
            "/",
            get(handlers::movimentacoes::list_movimentacoes)
                .post(handlers::movimentacoes::create_movimentacao),
        )
        .route("/active", get(handlers::movimentacoes::list_active_loans))
        .route(
            "/{id}",
            get(handlers::movimentacoes::get_movimentacao)
                .put(handlers::movimentacoes::update_movimentacao),
        )
        .route("/{id}/return", post(handlers::movimentacoes::register_return))
        .route_layer(from_fn_with_state(app_state.clone(), auth_guard));

    let api_routes = Router::new()
        .nest("/auth", auth_routes)
        .nest("/users", user_routes)
        .nest("/bens", bem_routes)
        .nest("/movimentacoes", movimentacao_routes)
        .nest("/perfis", reference_routes!(app_state, Perfil))
        .nest("/categorias", reference_routes!(app_state, Categoria))
        .nest("/localizacoes", reference_routes!(app_state, Localizacao))
        .nest("/tipos-movimentacao", reference_routes!(app_state, TipoMovimentacao));

    let cors = CorsLayer::new()
        .allow_origin(
            app_state
                .config
                .frontend_url
                .parse::<HeaderValue>()
                .context("FRONTEND_URL inválida")?,
        )
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([AUTHORIZATION, CONTENT_TYPE])
        .allow_credentials(true);

    // Combina tudo no router principal
    let app = Router::new()
        .route("/health", get(handlers::health::health))
        .route("/api-docs/openapi.json", get(|| async { Json(ApiDoc::openapi()) }))
        .nest("/api", api_routes)
        .fallback(|| async { AppError::RouteNotFound })
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(app_state);

    Ok(app)
}
