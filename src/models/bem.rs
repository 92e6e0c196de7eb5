// src/models/bem.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::models::reference::{Categoria, Localizacao};

// --- Bem patrimonial ---
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Bem {
    pub id: Uuid,
    #[schema(example = "T-001")]
    pub tombo: String,
    #[schema(example = "Cálice dourado")]
    pub nome: String,
    pub categoria_id: Uuid,
    pub localizacao_id: Uuid,
    #[schema(example = "Sacristia")]
    pub sala: String,
    /// PNG do tombo em base64
    pub imagem_tombo: Option<String>,
    /// JPEG do bem em base64
    pub foto_bem: Option<String>,
    pub ativo: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// Bem com categoria e localização resolvidas
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BemDetail {
    #[serde(flatten)]
    pub bem: Bem,
    pub categoria: Option<Categoria>,
    pub localizacao: Option<Localizacao>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateBemPayload {
    #[validate(length(min = 1, message = "Tombo é obrigatório"))]
    pub tombo: String,
    #[validate(length(min = 1, message = "Nome é obrigatório"))]
    pub nome: String,
    pub categoria_id: Uuid,
    pub localizacao_id: Uuid,
    #[validate(length(min = 1, message = "Sala é obrigatória"))]
    pub sala: String,
    pub imagem_tombo: Option<String>,
    pub foto_bem: Option<String>,
}

#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateBemPayload {
    #[validate(length(min = 1, message = "Tombo é obrigatório"))]
    pub tombo: Option<String>,
    #[validate(length(min = 1, message = "Nome é obrigatório"))]
    pub nome: Option<String>,
    pub categoria_id: Option<Uuid>,
    pub localizacao_id: Option<Uuid>,
    #[validate(length(min = 1, message = "Sala é obrigatória"))]
    pub sala: Option<String>,
    pub imagem_tombo: Option<String>,
    pub foto_bem: Option<String>,
    pub ativo: Option<bool>,
}
