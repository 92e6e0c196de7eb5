// src/services/rules.rs
//
// Regras de domínio sem acesso ao banco. Os services buscam os dados e
// chamam estas funções antes de gravar.

use chrono::NaiveDate;
use rand::Rng;

use crate::{
    common::error::AppError,
    models::{
        auth::{ADMIN_ROLE_NAME, DEFAULT_ADMIN_EMAIL, User},
        reference::Perfil,
    },
};

/// Situação de um bem, derivada das movimentações (não é gravada).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoanState {
    Available,
    OnLoan,
}

impl LoanState {
    pub fn from_open_loans(open_loans: i64) -> Self {
        if open_loans > 0 { Self::OnLoan } else { Self::Available }
    }
}

/// Um novo empréstimo só é aceito se o bem estiver disponível. Tipos que não
/// exigem devolução não mexem no estado e sempre passam.
pub fn ensure_can_open_loan(requer_devolucao: bool, state: LoanState) -> Result<(), AppError> {
    if requer_devolucao && state == LoanState::OnLoan {
        return Err(AppError::ItemAlreadyOnLoan);
    }
    Ok(())
}

pub fn ensure_valid_return_date(
    data_emprestimo: NaiveDate,
    data_devolucao: NaiveDate,
) -> Result<(), AppError> {
    if data_devolucao < data_emprestimo {
        return Err(AppError::InvalidReturnDate);
    }
    Ok(())
}

/// Devolução nunca sobrescreve uma devolução anterior.
pub fn ensure_can_register_return(
    data_emprestimo: NaiveDate,
    atual: Option<NaiveDate>,
    nova: NaiveDate,
) -> Result<(), AppError> {
    if atual.is_some() {
        return Err(AppError::AlreadyReturned);
    }
    ensure_valid_return_date(data_emprestimo, nova)
}

pub fn ensure_can_delete_bem(state: LoanState) -> Result<(), AppError> {
    match state {
        LoanState::OnLoan => Err(AppError::HasActiveLoans),
        LoanState::Available => Ok(()),
    }
}

// --- Administrador padrão ---

pub fn is_default_admin(user: &User) -> bool {
    user.email == DEFAULT_ADMIN_EMAIL
}

/// O admin padrão não troca de email nem é desativado.
pub fn ensure_can_update_user(
    user: &User,
    novo_email: Option<&str>,
    ativo: Option<bool>,
) -> Result<(), AppError> {
    if !is_default_admin(user) {
        return Ok(());
    }
    let changes_email = novo_email.is_some_and(|email| email != user.email);
    if changes_email || ativo == Some(false) {
        return Err(AppError::CannotUpdateAdmin);
    }
    Ok(())
}

pub fn ensure_can_delete_user(user: &User) -> Result<(), AppError> {
    if is_default_admin(user) {
        return Err(AppError::CannotDeleteAdmin);
    }
    Ok(())
}

/// Decide o acesso às rotas administrativas a partir do estado atual no banco.
pub fn authorize_admin(user: Option<&User>, perfil: Option<&Perfil>) -> Result<(), AppError> {
    let user = user.ok_or(AppError::UserNotFound)?;
    if !user.ativo {
        return Err(AppError::UserInactive);
    }
    match perfil {
        Some(perfil) if perfil.nome == ADMIN_ROLE_NAME => Ok(()),
        _ => Err(AppError::Forbidden),
    }
}

// --- Senha temporária ---

const TEMP_PASSWORD_CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";
pub const TEMP_PASSWORD_LEN: usize = 6;

pub fn generate_temp_password() -> String {
    let mut rng = rand::rng();
    (0..TEMP_PASSWORD_LEN)
        .map(|_| TEMP_PASSWORD_CHARSET[rng.random_range(0..TEMP_PASSWORD_CHARSET.len())] as char)
        .collect()
}

/// Gera uma senha temporária diferente da atual. `is_current` confere a
/// candidata contra o hash guardado.
pub fn generate_fresh_temp_password<F>(mut is_current: F) -> String
where
    F: FnMut(&str) -> bool,
{
    loop {
        let candidate = generate_temp_password();
        if !is_current(&candidate) {
            return candidate;
        }
    }
}
