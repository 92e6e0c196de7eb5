// src/models/reference.rs
//
// Tabelas de referência: perfis, categorias, localizações e tipos de movimentação.
// Todas seguem o mesmo contrato (nome único, exclusão lógica via `ativo`).

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{types::Json, FromRow};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::{Validate, ValidationError};

/// recurso -> ação -> permitido. Ex.: `{"bens": {"criar": true}}`.
pub type PermissionMap = BTreeMap<String, BTreeMap<String, bool>>;

fn validate_permission_map(map: &PermissionMap) -> Result<(), ValidationError> {
    if map.keys().chain(map.values().flat_map(|a| a.keys())).any(|k| k.trim().is_empty()) {
        let mut err = ValidationError::new("permissoes");
        err.message = Some("Recursos e ações não podem ser vazios.".into());
        return Err(err);
    }
    Ok(())
}

// --- Perfil ---
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Perfil {
    pub id: Uuid,
    #[schema(example = "ADMIN")]
    pub nome: String,
    pub descricao: Option<String>,
    // Reservado: a autorização hoje só olha o nome do perfil.
    #[schema(value_type = Object, example = json!({"bens": {"criar": true, "excluir": false}}))]
    pub permissoes: Json<PermissionMap>,
    pub ativo: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreatePerfilPayload {
    #[validate(length(min = 1, message = "Nome é obrigatório"))]
    pub nome: String,
    pub descricao: Option<String>,
    #[serde(default)]
    #[validate(custom(function = "validate_permission_map"))]
    #[schema(value_type = Object)]
    pub permissoes: PermissionMap,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePerfilPayload {
    #[validate(length(min = 1, message = "Nome é obrigatório"))]
    pub nome: Option<String>,
    pub descricao: Option<String>,
    #[validate(custom(function = "validate_permission_map"))]
    #[schema(value_type = Option<Object>)]
    pub permissoes: Option<PermissionMap>,
    pub ativo: Option<bool>,
}

// --- Categoria ---
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Categoria {
    pub id: Uuid,
    #[schema(example = "eletrônico")]
    pub nome: String,
    pub descricao: Option<String>,
    pub ativo: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateCategoriaPayload {
    #[validate(length(min = 1, message = "Nome é obrigatório"))]
    pub nome: String,
    pub descricao: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCategoriaPayload {
    #[validate(length(min = 1, message = "Nome é obrigatório"))]
    pub nome: Option<String>,
    pub descricao: Option<String>,
    pub ativo: Option<bool>,
}

// --- Localização ---
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Localizacao {
    pub id: Uuid,
    #[schema(example = "igreja matriz")]
    pub nome: String,
    pub endereco: Option<String>,
    pub responsavel: Option<String>,
    pub telefone: Option<String>,
    pub ativo: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateLocalizacaoPayload {
    #[validate(length(min = 1, message = "Nome é obrigatório"))]
    pub nome: String,
    pub endereco: Option<String>,
    pub responsavel: Option<String>,
    pub telefone: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateLocalizacaoPayload {
    #[validate(length(min = 1, message = "Nome é obrigatório"))]
    pub nome: Option<String>,
    pub endereco: Option<String>,
    pub responsavel: Option<String>,
    pub telefone: Option<String>,
    pub ativo: Option<bool>,
}

// --- Tipo de Movimentação ---
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TipoMovimentacao {
    pub id: Uuid,
    #[schema(example = "empréstimo")]
    pub nome: String,
    pub descricao: Option<String>,
    /// TRUE para empréstimos: o bem fica emprestado até a devolução.
    pub requer_devolucao: bool,
    pub ativo: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateTipoMovimentacaoPayload {
    #[validate(length(min = 1, message = "Nome é obrigatório"))]
    pub nome: String,
    pub descricao: Option<String>,
    #[serde(default)]
    pub requer_devolucao: bool,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTipoMovimentacaoPayload {
    #[validate(length(min = 1, message = "Nome é obrigatório"))]
    pub nome: Option<String>,
    pub descricao: Option<String>,
    pub requer_devolucao: Option<bool>,
    pub ativo: Option<bool>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn perfil_payload_defaults_to_empty_permissions() {
        let payload: CreatePerfilPayload =
            serde_json::from_value(serde_json::json!({ "nome": "USER" })).unwrap();

        assert!(payload.permissoes.is_empty());
        assert!(payload.validate().is_ok());
    }

    #[test]
    fn permission_map_must_be_resource_action_bool() {
        let parsed = serde_json::from_value::<CreatePerfilPayload>(serde_json::json!({
            "nome": "USER",
            "permissoes": { "bens": { "criar": "sim" } }
        }));
        assert!(parsed.is_err());

        let payload: CreatePerfilPayload = serde_json::from_value(serde_json::json!({
            "nome": "USER",
            "permissoes": { "bens": { "": true } }
        }))
        .unwrap();
        assert!(payload.validate().is_err());
    }

    #[test]
    fn tipo_requer_devolucao_defaults_to_false() {
        let payload: CreateTipoMovimentacaoPayload =
            serde_json::from_value(serde_json::json!({ "nome": "manutenção" })).unwrap();

        assert!(!payload.requer_devolucao);
    }

    #[test]
    fn empty_name_is_rejected_on_update() {
        let payload = UpdateCategoriaPayload {
            nome: Some(String::new()),
            descricao: None,
            ativo: None,
        };

        assert!(payload.validate().is_err());
    }
}
