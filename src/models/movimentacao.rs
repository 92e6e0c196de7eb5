// src/models/movimentacao.rs

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::models::{auth::User, bem::Bem, reference::TipoMovimentacao};

// --- Movimentação (empréstimo, devolução ou outro registro) ---
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Movimentacao {
    pub id: Uuid,
    pub bem_id: Uuid,

    // Cópia do bem no momento do registro, para o histórico
    #[schema(example = "T-001")]
    pub tombo: String,
    pub nome_item: String,

    pub tipo_id: Uuid,
    #[schema(example = "João da Silva")]
    pub pessoa: String,
    pub contato: String,
    #[schema(example = "Pastoral da Juventude")]
    pub pastoral: String,
    pub observacao: Option<String>,

    #[schema(value_type = String, format = Date, example = "2024-03-01")]
    pub data_emprestimo: NaiveDate,
    #[schema(value_type = Option<String>, format = Date)]
    pub data_devolucao: Option<NaiveDate>,

    // Quem registrou; vira NULL se o usuário for removido fisicamente
    pub usuario_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MovimentacaoDetail {
    #[serde(flatten)]
    pub movimentacao: Movimentacao,
    pub bem: Option<Bem>,
    pub tipo: Option<TipoMovimentacao>,
    pub usuario: Option<User>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateMovimentacaoPayload {
    pub bem_id: Uuid,
    pub tipo_id: Uuid,

    // Opcionais: quando ausentes, copiamos do bem
    #[validate(length(min = 1, message = "Tombo é obrigatório"))]
    pub tombo: Option<String>,
    #[validate(length(min = 1, message = "Nome do item é obrigatório"))]
    pub nome_item: Option<String>,

    #[validate(length(min = 1, message = "Pessoa é obrigatória"))]
    pub pessoa: String,
    #[validate(length(min = 1, message = "Contato é obrigatório"))]
    pub contato: String,
    #[validate(length(min = 1, message = "Pastoral é obrigatória"))]
    pub pastoral: String,
    #[validate(length(max = 500, message = "Observação deve ter no máximo 500 caracteres"))]
    pub observacao: Option<String>,

    /// Formato YYYY-MM-DD
    #[schema(value_type = String, format = Date)]
    pub data_emprestimo: NaiveDate,
    #[schema(value_type = Option<String>, format = Date)]
    pub data_devolucao: Option<NaiveDate>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateMovimentacaoPayload {
    #[schema(value_type = Option<String>, format = Date)]
    pub data_devolucao: Option<NaiveDate>,
    #[validate(length(max = 500, message = "Observação deve ter no máximo 500 caracteres"))]
    pub observacao: Option<String>,
}

// Linha pronta para o INSERT, já com o snapshot do bem resolvido
#[derive(Debug)]
pub struct NewMovimentacao {
    pub bem_id: Uuid,
    pub tombo: String,
    pub nome_item: String,
    pub tipo_id: Uuid,
    pub pessoa: String,
    pub contato: String,
    pub pastoral: String,
    pub observacao: Option<String>,
    pub data_emprestimo: NaiveDate,
    pub data_devolucao: Option<NaiveDate>,
    pub usuario_id: Uuid,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dates_use_iso_format() {
        let payload: CreateMovimentacaoPayload = serde_json::from_value(serde_json::json!({
            "bemId": Uuid::new_v4(),
            "tipoId": Uuid::new_v4(),
            "pessoa": "João",
            "contato": "(11) 99999-0000",
            "pastoral": "Catequese",
            "dataEmprestimo": "2024-03-01"
        }))
        .unwrap();

        assert_eq!(payload.data_emprestimo, NaiveDate::from_ymd_opt(2024, 3, 1).unwrap());
        assert!(payload.data_devolucao.is_none());
        assert!(payload.validate().is_ok());

        let bad = serde_json::from_value::<CreateMovimentacaoPayload>(serde_json::json!({
            "bemId": Uuid::new_v4(),
            "tipoId": Uuid::new_v4(),
            "pessoa": "João",
            "contato": "x",
            "pastoral": "y",
            "dataEmprestimo": "01/03/2024"
        }));
        assert!(bad.is_err());
    }

    #[test]
    fn observacao_is_limited_to_500_chars() {
        let payload = UpdateMovimentacaoPayload {
            data_devolucao: None,
            observacao: Some("a".repeat(501)),
        };

        assert!(payload.validate().is_err());
    }
}
