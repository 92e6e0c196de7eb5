pub mod auth;
pub mod bem;
pub mod movimentacao;
pub mod reference;
