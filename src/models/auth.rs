// src/models/auth.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::models::reference::Perfil;

/// Email fixo do administrador padrão criado pelo seed.
pub const DEFAULT_ADMIN_EMAIL: &str = "admin@email.com";

/// Nome do perfil que libera as rotas administrativas.
pub const ADMIN_ROLE_NAME: &str = "ADMIN";

// Representa um usuário vindo do banco de dados
#[derive(Debug, Clone, Serialize, sqlx::FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,
    #[schema(example = "admin@email.com")]
    pub email: String,

    #[serde(skip_serializing)] // IMPORTANTE para segurança
    #[schema(ignore)]
    pub password_hash: String,

    pub perfil_id: Uuid,
    pub email_recuperacao: Option<String>,
    pub temp_password: bool,
    pub ativo: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// Usuário acompanhado do seu perfil (listagens e detalhe)
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserWithPerfil {
    #[serde(flatten)]
    pub user: User,
    pub perfil: Option<Perfil>,
}

// O que /auth/me e /auth/login devolvem sobre o usuário
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: Uuid,
    pub email: String,
    pub perfil: Option<Perfil>,
    pub email_recuperacao: Option<String>,
    pub temp_password: bool,
}

impl UserProfile {
    pub fn new(user: User, perfil: Option<Perfil>) -> Self {
        Self {
            id: user.id,
            email: user.email,
            perfil,
            email_recuperacao: user.email_recuperacao,
            temp_password: user.temp_password,
        }
    }
}

// Dados para login
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct LoginUserPayload {
    #[validate(email(message = "Email inválido"))]
    pub email: String,
    #[validate(length(min = 1, message = "Senha é obrigatória"))]
    pub password: String,
}

// Resposta do login com o token
#[derive(Debug, Serialize, ToSchema)]
pub struct AuthResponse {
    pub token: String,
    pub user: UserProfile,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RecoverPasswordPayload {
    #[validate(email(message = "Email inválido"))]
    pub email: String,
    #[validate(email(message = "Email de recuperação inválido"))]
    pub email_recuperacao: String,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RecoverPasswordResponse {
    /// Exibida uma única vez; só o hash fica no banco.
    pub senha_temporaria: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordPayload {
    #[validate(length(min = 6, message = "Senha deve ter no mínimo 6 caracteres"))]
    pub nova_senha: String,
}

// --- Gestão de usuários (admin) ---
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserPayload {
    #[validate(email(message = "Email inválido"))]
    pub email: String,
    #[validate(length(min = 6, message = "Senha deve ter no mínimo 6 caracteres"))]
    pub password: String,
    pub perfil_id: Uuid,
    #[validate(email(message = "Email de recuperação inválido"))]
    pub email_recuperacao: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserPayload {
    #[validate(email(message = "Email inválido"))]
    pub email: Option<String>,
    pub perfil_id: Option<Uuid>,
    #[validate(email(message = "Email de recuperação inválido"))]
    pub email_recuperacao: Option<String>,
    pub ativo: Option<bool>,
}

// Estrutura de dados ("claims") dentro do JWT
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Claims {
    pub sub: Uuid,  // Subject (ID do usuário)
    pub email: String,
    pub perfil_id: Uuid,
    pub exp: usize, // Expiration time (quando o token expira)
    pub iat: usize, // Issued At (quando o token foi criado)
}

/// Quem está fazendo a requisição, decodificado do token (sem ir ao banco).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    pub user_id: Uuid,
    pub email: String,
    pub perfil_id: Uuid,
}

impl From<Claims> for Principal {
    fn from(claims: Claims) -> Self {
        Self {
            user_id: claims.sub,
            email: claims.email,
            perfil_id: claims.perfil_id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_user() -> User {
        User {
            id: Uuid::new_v4(),
            email: "maria@paroquia.org".into(),
            password_hash: "$2b$12$segredo".into(),
            perfil_id: Uuid::new_v4(),
            email_recuperacao: Some("maria@gmail.com".into()),
            temp_password: false,
            ativo: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn user_serialization_strips_password_hash() {
        let json = serde_json::to_value(sample_user()).unwrap();

        assert!(json.get("passwordHash").is_none());
        assert!(json.get("password_hash").is_none());
        assert_eq!(json["emailRecuperacao"], "maria@gmail.com");
        assert_eq!(json["tempPassword"], false);
    }

    #[test]
    fn user_with_perfil_is_flattened() {
        let json = serde_json::to_value(UserWithPerfil {
            user: sample_user(),
            perfil: None,
        })
        .unwrap();

        assert_eq!(json["email"], "maria@paroquia.org");
        assert!(json["perfil"].is_null());
        assert!(json.get("passwordHash").is_none());
    }

    #[test]
    fn change_password_requires_six_characters() {
        let short = ChangePasswordPayload { nova_senha: "abc".into() };
        let ok = ChangePasswordPayload { nova_senha: "abcdef".into() };

        assert!(short.validate().is_err());
        assert!(ok.validate().is_ok());
    }
}
