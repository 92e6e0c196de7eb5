// src/docs.rs

use utoipa::{
    openapi::{
        path::{HttpMethod, OperationBuilder, ParameterBuilder, ParameterIn},
        request_body::RequestBodyBuilder,
        security::{Http, HttpAuthScheme, SecurityRequirement, SecurityScheme},
        Content, Ref, Required, Response,
    },
    OpenApi,
};

use crate::handlers;
use crate::models;

#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::health::health,

        // --- Auth ---
        handlers::auth::login,
        handlers::auth::recover_password,
        handlers::auth::change_password,
        handlers::auth::logout,
        handlers::auth::get_me,

        // --- Users ---
        handlers::users::list_users,
        handlers::users::get_user,
        handlers::users::create_user,
        handlers::users::update_user,
        handlers::users::delete_user,

        // --- Bens ---
        handlers::bens::list_bens,
        handlers::bens::get_bem,
        handlers::bens::get_bem_by_tombo,
        handlers::bens::create_bem,
        handlers::bens::update_bem,
        handlers::bens::delete_bem,

        // --- Movimentações ---
        handlers::movimentacoes::list_movimentacoes,
        handlers::movimentacoes::list_active_loans,
        handlers::movimentacoes::get_movimentacao,
        handlers::movimentacoes::create_movimentacao,
        handlers::movimentacoes::update_movimentacao,
        handlers::movimentacoes::register_return,
    ),
    components(
        schemas(
            handlers::health::HealthStatus,

            // --- Auth ---
            models::auth::User,
            models::auth::UserWithPerfil,
            models::auth::UserProfile,
            models::auth::LoginUserPayload,
            models::auth::AuthResponse,
            models::auth::RecoverPasswordPayload,
            models::auth::RecoverPasswordResponse,
            models::auth::ChangePasswordPayload,
            models::auth::CreateUserPayload,
            models::auth::UpdateUserPayload,

            // --- Bens ---
            models::bem::Bem,
            models::bem::BemDetail,
            models::bem::CreateBemPayload,
            models::bem::UpdateBemPayload,

            // --- Movimentações ---
            models::movimentacao::Movimentacao,
            models::movimentacao::MovimentacaoDetail,
            models::movimentacao::CreateMovimentacaoPayload,
            models::movimentacao::UpdateMovimentacaoPayload,

            // --- Referência ---
            models::reference::Perfil,
            models::reference::CreatePerfilPayload,
            models::reference::UpdatePerfilPayload,
            models::reference::Categoria,
            models::reference::CreateCategoriaPayload,
            models::reference::UpdateCategoriaPayload,
            models::reference::Localizacao,
            models::reference::CreateLocalizacaoPayload,
            models::reference::UpdateLocalizacaoPayload,
            models::reference::TipoMovimentacao,
            models::reference::CreateTipoMovimentacaoPayload,
            models::reference::UpdateTipoMovimentacaoPayload,
        )
    ),
    tags(
        (name = "Health", description = "Liveness"),
        (name = "Auth", description = "Login, recuperação e troca de senha"),
        (name = "Users", description = "Gestão de usuários (administrativo)"),
        (name = "Bens", description = "Cadastro de bens patrimoniais"),
        (name = "Movimentações", description = "Empréstimos e devoluções"),
        (name = "Referência", description = "Perfis, categorias, localizações e tipos de movimentação")
    ),
    modifiers(&SecurityAddon, &ReferenceRoutesAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "api_jwt",
            SecurityScheme::Http(Http::new(HttpAuthScheme::Bearer)),
        );
    }
}

// Os handlers de referência são genéricos e o `#[utoipa::path]` não os
// alcança; as operações são montadas aqui, uma vez por tabela.
struct ReferenceRoutesAddon;

// (segmento da rota, schema da entidade, payload de criação, payload de atualização)
const REFERENCE_TABLES: &[(&str, &str, &str, &str)] = &[
    ("perfis", "Perfil", "CreatePerfilPayload", "UpdatePerfilPayload"),
    ("categorias", "Categoria", "CreateCategoriaPayload", "UpdateCategoriaPayload"),
    ("localizacoes", "Localizacao", "CreateLocalizacaoPayload", "UpdateLocalizacaoPayload"),
    (
        "tipos-movimentacao",
        "TipoMovimentacao",
        "CreateTipoMovimentacaoPayload",
        "UpdateTipoMovimentacaoPayload",
    ),
];

fn json_body(schema: &str) -> utoipa::openapi::request_body::RequestBody {
    RequestBodyBuilder::new()
        .content("application/json", Content::new(Some(Ref::from_schema_name(schema))))
        .required(Some(Required::True))
        .build()
}

fn reference_operation(summary: String, with_id: bool) -> OperationBuilder {
    let mut op = OperationBuilder::new()
        .tag("Referência")
        .summary(Some(summary))
        .security(SecurityRequirement::new("api_jwt", Vec::<String>::new()));
    if with_id {
        op = op
            .parameter(
                ParameterBuilder::new()
                    .name("id")
                    .parameter_in(ParameterIn::Path)
                    .required(Required::True)
                    .build(),
            )
            .response("404", Response::new("NOT_FOUND"));
    }
    op
}

impl utoipa::Modify for ReferenceRoutesAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        for (segment, entity, create, update) in REFERENCE_TABLES {
            let collection = format!("/api/{segment}");
            let item = format!("/api/{segment}/{{id}}");

            openapi.paths.add_path_operation(
                &collection,
                vec![HttpMethod::Get],
                reference_operation(format!("Lista {entity} ativos por nome"), false)
                    .response("200", Response::new("Registros ativos"))
                    .build(),
            );
            openapi.paths.add_path_operation(
                &collection,
                vec![HttpMethod::Post],
                reference_operation(format!("Cria {entity} (ADMIN)"), false)
                    .request_body(Some(json_body(create)))
                    .response("201", Response::new("Criado"))
                    .response("409", Response::new("ALREADY_EXISTS"))
                    .response("403", Response::new("FORBIDDEN"))
                    .build(),
            );
            openapi.paths.add_path_operation(
                &item,
                vec![HttpMethod::Get],
                reference_operation(format!("Busca {entity} por id"), true)
                    .response("200", Response::new("Registro"))
                    .build(),
            );
            openapi.paths.add_path_operation(
                &item,
                vec![HttpMethod::Put],
                reference_operation(format!("Atualiza {entity} (ADMIN)"), true)
                    .request_body(Some(json_body(update)))
                    .response("200", Response::new("Atualizado"))
                    .response("409", Response::new("NAME_IN_USE"))
                    .build(),
            );
            openapi.paths.add_path_operation(
                &item,
                vec![HttpMethod::Delete],
                reference_operation(format!("Desativa {entity} (ADMIN)"), true)
                    .response("200", Response::new("Desativado"))
                    .response("400", Response::new("HAS_DEPENDENCIES"))
                    .build(),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_lists_every_route_group() {
        let doc = ApiDoc::openapi();
        let paths = &doc.paths.paths;

        for path in [
            "/health",
            "/api/auth/login",
            "/api/users/{id}",
            "/api/bens/tombo/{tombo}",
            "/api/movimentacoes/{id}/return",
            "/api/categorias",
            "/api/tipos-movimentacao/{id}",
        ] {
            assert!(paths.contains_key(path), "{path} ausente");
        }

        let categorias = &paths["/api/categorias"];
        assert!(categorias.get.is_some());
        assert!(categorias.post.is_some());
    }
}
