// src/common/error.rs

use std::sync::atomic::{AtomicBool, Ordering};

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

// Em desenvolvimento a mensagem real dos erros 500 vai para o cliente.
static EXPOSE_INTERNAL_ERRORS: AtomicBool = AtomicBool::new(false);

pub fn expose_internal_errors(enabled: bool) {
    EXPOSE_INTERNAL_ERRORS.store(enabled, Ordering::Relaxed);
}

const GENERIC_INTERNAL_MESSAGE: &str = "Erro interno do servidor";

// Nosso tipo de erro. Cada variante carrega o status HTTP e um código estável
// que o frontend usa para decidir o que mostrar.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Erro de validação")]
    ValidationError(#[from] validator::ValidationErrors),

    #[error("Corpo da requisição inválido: {0}")]
    MalformedBody(String),

    #[error("Parâmetro de rota inválido: {0}")]
    InvalidPathParam(String),

    // --- Autenticação / autorização ---
    #[error("Token de autenticação não fornecido")]
    MissingToken,

    #[error("Formato de token inválido. Use: Bearer <token>")]
    InvalidTokenFormat,

    #[error("Token inválido ou expirado")]
    InvalidToken,

    #[error("Usuário não autenticado")]
    Unauthorized,

    #[error("Acesso negado. Apenas administradores podem acessar este recurso.")]
    Forbidden,

    #[error("Usuário inativo")]
    UserInactive,

    #[error("Credenciais inválidas")]
    InvalidCredentials,

    #[error("Email de recuperação incorreto")]
    InvalidRecoveryEmail,

    // --- Usuários ---
    #[error("Usuário não encontrado")]
    UserNotFound,

    #[error("Usuário com este email já existe")]
    UserAlreadyExists,

    #[error("Email já está em uso")]
    EmailInUse,

    #[error("Não é possível alterar o administrador padrão")]
    CannotUpdateAdmin,

    #[error("Não é possível excluir o administrador padrão")]
    CannotDeleteAdmin,

    // --- Tabelas de referência ---
    #[error("Perfil não encontrado")]
    PerfilNotFound,

    #[error("Categoria não encontrada")]
    CategoriaNotFound,

    #[error("Localização não encontrada")]
    LocalizacaoNotFound,

    #[error("Tipo de movimentação não encontrado")]
    TipoNotFound,

    #[error("{0} não encontrado(a)")]
    ReferenceNotFound(&'static str),

    #[error("{0} com este nome já existe")]
    ReferenceAlreadyExists(&'static str),

    #[error("Nome já está em uso")]
    NameInUse,

    #[error("Não é possível excluir: existem registros vinculados a este(a) {0}")]
    HasDependencies(&'static str),

    // --- Bens ---
    #[error("Bem não encontrado")]
    BemNotFound,

    #[error("Já existe um bem com este número de tombo")]
    TomboExists,

    #[error("Tombo já está em uso")]
    TomboInUse,

    #[error("Não é possível excluir um bem com empréstimos ativos")]
    HasActiveLoans,

    // --- Movimentações ---
    #[error("Movimentação não encontrada")]
    MovimentacaoNotFound,

    #[error("Este bem já possui um empréstimo ativo")]
    ItemAlreadyOnLoan,

    #[error("Este item já foi devolvido")]
    AlreadyReturned,

    #[error("A data de devolução não pode ser anterior à data de empréstimo")]
    InvalidReturnDate,

    // --- Erros vindos do banco que escaparam das checagens da aplicação ---
    #[error("Registro já existe ({0})")]
    UniqueConstraintViolation(String),

    #[error("Referência inválida ({0})")]
    ForeignKeyViolation(String),

    #[error("Rota não encontrada")]
    RouteNotFound,

    #[error("Erro de banco de dados: {0}")]
    DatabaseError(sqlx::Error),

    #[error("Erro interno do servidor: {0}")]
    InternalServerError(#[from] anyhow::Error),

    #[error("Erro de Bcrypt: {0}")]
    BcryptError(#[from] bcrypt::BcryptError),

    #[error("Erro de JWT: {0}")]
    JwtError(#[from] jsonwebtoken::errors::Error),
}

// Violações de unicidade e de chave estrangeira viram erros de domínio;
// o resto é erro interno.
impl From<sqlx::Error> for AppError {
    fn from(e: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db_err) = &e {
            let constraint = db_err.constraint().unwrap_or("desconhecida").to_string();
            if db_err.is_unique_violation() {
                return AppError::UniqueConstraintViolation(constraint);
            }
            if db_err.is_foreign_key_violation() {
                return AppError::ForeignKeyViolation(constraint);
            }
        }
        AppError::DatabaseError(e)
    }
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        use AppError::*;
        match self {
            ValidationError(_) | MalformedBody(_) | InvalidPathParam(_) => StatusCode::BAD_REQUEST,

            MissingToken | InvalidTokenFormat | InvalidToken | Unauthorized
            | InvalidCredentials => StatusCode::UNAUTHORIZED,

            Forbidden | UserInactive => StatusCode::FORBIDDEN,

            UserNotFound | PerfilNotFound | CategoriaNotFound | LocalizacaoNotFound
            | TipoNotFound | ReferenceNotFound(_) | BemNotFound | MovimentacaoNotFound
            | RouteNotFound => StatusCode::NOT_FOUND,

            UserAlreadyExists | EmailInUse | ReferenceAlreadyExists(_) | NameInUse
            | TomboExists | TomboInUse | UniqueConstraintViolation(_) => StatusCode::CONFLICT,

            InvalidRecoveryEmail | CannotUpdateAdmin | CannotDeleteAdmin | HasDependencies(_)
            | HasActiveLoans | ItemAlreadyOnLoan | AlreadyReturned | InvalidReturnDate
            | ForeignKeyViolation(_) => StatusCode::BAD_REQUEST,

            DatabaseError(_) | InternalServerError(_) | BcryptError(_) | JwtError(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    pub fn code(&self) -> &'static str {
        use AppError::*;
        match self {
            ValidationError(_) | MalformedBody(_) | InvalidPathParam(_) => "VALIDATION_ERROR",
            MissingToken => "MISSING_TOKEN",
            InvalidTokenFormat => "INVALID_TOKEN_FORMAT",
            InvalidToken => "INVALID_TOKEN",
            Unauthorized => "UNAUTHORIZED",
            Forbidden => "FORBIDDEN",
            UserInactive => "USER_INACTIVE",
            InvalidCredentials => "INVALID_CREDENTIALS",
            InvalidRecoveryEmail => "INVALID_RECOVERY_EMAIL",
            UserNotFound => "USER_NOT_FOUND",
            UserAlreadyExists => "USER_EXISTS",
            EmailInUse => "EMAIL_IN_USE",
            CannotUpdateAdmin => "CANNOT_UPDATE_ADMIN",
            CannotDeleteAdmin => "CANNOT_DELETE_ADMIN",
            PerfilNotFound => "PERFIL_NOT_FOUND",
            CategoriaNotFound => "CATEGORIA_NOT_FOUND",
            LocalizacaoNotFound => "LOCALIZACAO_NOT_FOUND",
            TipoNotFound => "TIPO_NOT_FOUND",
            ReferenceNotFound(_) | RouteNotFound => "NOT_FOUND",
            ReferenceAlreadyExists(_) => "ALREADY_EXISTS",
            NameInUse => "NAME_IN_USE",
            HasDependencies(_) => "HAS_DEPENDENCIES",
            BemNotFound => "BEM_NOT_FOUND",
            TomboExists => "TOMBO_EXISTS",
            TomboInUse => "TOMBO_IN_USE",
            HasActiveLoans => "HAS_ACTIVE_LOANS",
            MovimentacaoNotFound => "MOVIMENTACAO_NOT_FOUND",
            ItemAlreadyOnLoan => "ITEM_ALREADY_ON_LOAN",
            AlreadyReturned => "ALREADY_RETURNED",
            InvalidReturnDate => "INVALID_RETURN_DATE",
            UniqueConstraintViolation(_) => "CONFLICT",
            ForeignKeyViolation(_) => "FOREIGN_KEY_ERROR",
            DatabaseError(_) | InternalServerError(_) | BcryptError(_) | JwtError(_) => {
                "INTERNAL_SERVER_ERROR"
            }
        }
    }
}

#[derive(Debug, Serialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub code: &'static str,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Vec<FieldError>>,
}

#[derive(Debug, Serialize)]
pub struct ErrorEnvelope {
    pub success: bool,
    pub error: ErrorBody,
}

fn validation_details(errors: &validator::ValidationErrors) -> Vec<FieldError> {
    let mut details: Vec<FieldError> = errors
        .field_errors()
        .into_iter()
        .flat_map(|(field, field_errors)| {
            field_errors.iter().map(move |e| FieldError {
                field: field.to_string(),
                message: e
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| e.code.to_string()),
            })
        })
        .collect();
    // HashMap não tem ordem; ordenamos para a resposta ser estável
    details.sort_by(|a, b| a.field.cmp(&b.field));
    details
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        let (message, details) = match &self {
            AppError::ValidationError(errors) => {
                (self.to_string(), Some(validation_details(errors)))
            }
            _ if status == StatusCode::INTERNAL_SERVER_ERROR => {
                tracing::error!(error = %self, "Erro Interno do Servidor");
                if EXPOSE_INTERNAL_ERRORS.load(Ordering::Relaxed) {
                    (self.to_string(), None)
                } else {
                    (GENERIC_INTERNAL_MESSAGE.to_string(), None)
                }
            }
            _ => (self.to_string(), None),
        };

        let body = ErrorEnvelope {
            success: false,
            error: ErrorBody {
                code: self.code(),
                message,
                details,
            },
        };
        (status, Json(body)).into_response()
    }
}
