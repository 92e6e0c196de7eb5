pub mod auth;
pub mod bens;
pub mod health;
pub mod movimentacoes;
pub mod reference;
pub mod users;
