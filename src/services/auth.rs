// src/services/auth.rs

use bcrypt::{hash, verify};
use chrono::Utc;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{ReferenceRepository, UserRepository},
    models::{
        auth::{AuthResponse, Claims, Principal, User, UserProfile},
        reference::Perfil,
    },
    services::rules,
};

// bcrypt é CPU-bound: roda fora do executor assíncrono
pub async fn hash_password(password: &str) -> Result<String, AppError> {
    let password_clone = password.to_owned();
    let hashed = tokio::task::spawn_blocking(move || hash(&password_clone, bcrypt::DEFAULT_COST))
        .await
        .map_err(|e| anyhow::anyhow!("Falha na task de hashing: {}", e))??;
    Ok(hashed)
}

pub async fn verify_password(password: &str, password_hash: &str) -> Result<bool, AppError> {
    let password_clone = password.to_owned();
    let password_hash_clone = password_hash.to_owned();
    let is_valid =
        tokio::task::spawn_blocking(move || verify(&password_clone, &password_hash_clone))
            .await
            .map_err(|e| anyhow::anyhow!("Falha na task de verificação de senha: {}", e))??;
    Ok(is_valid)
}

#[derive(Clone)]
pub struct AuthService {
    user_repo: UserRepository,
    perfil_repo: ReferenceRepository<Perfil>,
    jwt_secret: String,
    jwt_expiration_hours: i64,
}

impl AuthService {
    pub fn new(
        user_repo: UserRepository,
        perfil_repo: ReferenceRepository<Perfil>,
        jwt_secret: String,
        jwt_expiration_hours: i64,
    ) -> Self {
        Self {
            user_repo,
            perfil_repo,
            jwt_secret,
            jwt_expiration_hours,
        }
    }

    // Email desconhecido, conta inativa e senha errada devolvem o mesmo erro
    pub async fn login_user(&self, email: &str, password: &str) -> Result<AuthResponse, AppError> {
        let user = self
            .user_repo
            .find_active_by_email(email)
            .await?
            .ok_or(AppError::InvalidCredentials)?;

        if !verify_password(password, &user.password_hash).await? {
            return Err(AppError::InvalidCredentials);
        }

        let token = self.create_token(&user)?;
        let perfil = self.perfil_repo.find_by_id(user.perfil_id).await?;

        tracing::info!(user_id = %user.id, "🔑 Login realizado");
        Ok(AuthResponse {
            token,
            user: UserProfile::new(user, perfil),
        })
    }

    /// Verifica assinatura e expiração. Não consulta o banco.
    pub fn validate_token(&self, token: &str) -> Result<Principal, AppError> {
        let token_data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.jwt_secret.as_ref()),
            &Validation::default(),
        )
        .map_err(|_| AppError::InvalidToken)?;

        Ok(token_data.claims.into())
    }

    pub fn create_token(&self, user: &User) -> Result<String, AppError> {
        let now = Utc::now();
        let expires_at = now + chrono::Duration::hours(self.jwt_expiration_hours);

        let claims = Claims {
            sub: user.id,
            email: user.email.clone(),
            perfil_id: user.perfil_id,
            exp: expires_at.timestamp() as usize,
            iat: now.timestamp() as usize,
        };

        Ok(encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.jwt_secret.as_ref()),
        )?)
    }

    pub async fn me(&self, user_id: Uuid) -> Result<UserProfile, AppError> {
        let user = self
            .user_repo
            .find_by_id(user_id)
            .await?
            .ok_or(AppError::UserNotFound)?;
        let perfil = self.perfil_repo.find_by_id(user.perfil_id).await?;
        Ok(UserProfile::new(user, perfil))
    }

    /// Gera, grava (só o hash) e devolve uma senha temporária.
    pub async fn recover_password(
        &self,
        email: &str,
        email_recuperacao: &str,
    ) -> Result<String, AppError> {
        let user = self
            .user_repo
            .find_active_by_email(email)
            .await?
            .ok_or(AppError::UserNotFound)?;

        if user.email_recuperacao.as_deref() != Some(email_recuperacao) {
            return Err(AppError::InvalidRecoveryEmail);
        }

        let current_hash = user.temp_password.then(|| user.password_hash.clone());
        let senha = tokio::task::spawn_blocking(move || {
            rules::generate_fresh_temp_password(|candidate| match &current_hash {
                Some(h) => verify(candidate, h).unwrap_or(false),
                None => false,
            })
        })
        .await
        .map_err(|e| anyhow::anyhow!("Falha na task de senha temporária: {}", e))?;

        let hashed = hash_password(&senha).await?;
        self.user_repo.update_password(user.id, &hashed, true).await?;

        tracing::info!(user_id = %user.id, "🔁 Senha temporária gerada");
        Ok(senha)
    }

    pub async fn change_password(&self, user_id: Uuid, nova_senha: &str) -> Result<(), AppError> {
        let hashed = hash_password(nova_senha).await?;
        self.user_repo.update_password(user_id, &hashed, false).await?;

        tracing::info!(user_id = %user_id, "Senha alterada");
        Ok(())
    }

    /// Gate administrativo: relê usuário e perfil a cada requisição.
    pub async fn authorize_admin(&self, principal: &Principal) -> Result<(), AppError> {
        let user = self.user_repo.find_by_id(principal.user_id).await?;
        let perfil = match &user {
            Some(u) => self.perfil_repo.find_by_id(u.perfil_id).await?,
            None => None,
        };
        rules::authorize_admin(user.as_ref(), perfil.as_ref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::postgres::PgPoolOptions;

    fn service(expiration_hours: i64) -> AuthService {
        let pool = PgPoolOptions::new()
            .connect_lazy("postgres://localhost/patrimonio_test")
            .unwrap();
        AuthService::new(
            UserRepository::new(pool.clone()),
            ReferenceRepository::new(pool),
            "segredo-de-teste".into(),
            expiration_hours,
        )
    }

    fn user() -> User {
        User {
            id: Uuid::new_v4(),
            email: "maria@paroquia.org".into(),
            password_hash: String::new(),
            perfil_id: Uuid::new_v4(),
            email_recuperacao: None,
            temp_password: false,
            ativo: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn token_round_trip_yields_principal() {
        let service = service(1);
        let user = user();

        let token = service.create_token(&user).unwrap();
        let principal = service.validate_token(&token).unwrap();

        assert_eq!(principal.user_id, user.id);
        assert_eq!(principal.email, user.email);
        assert_eq!(principal.perfil_id, user.perfil_id);
    }

    #[tokio::test]
    async fn expired_token_is_rejected() {
        let service = service(-2);
        let token = service.create_token(&user()).unwrap();

        assert!(matches!(service.validate_token(&token), Err(AppError::InvalidToken)));
    }

    #[tokio::test]
    async fn token_signed_with_another_secret_is_rejected() {
        let mut other = service(1);
        other.jwt_secret = "outro-segredo".into();
        let token = other.create_token(&user()).unwrap();

        assert!(matches!(service(1).validate_token(&token), Err(AppError::InvalidToken)));
    }

    #[tokio::test]
    async fn password_hash_round_trip() {
        let hashed = hash_password("admin123").await.unwrap();

        assert!(verify_password("admin123", &hashed).await.unwrap());
        assert!(!verify_password("errada", &hashed).await.unwrap());
    }
}
