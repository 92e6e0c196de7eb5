pub mod auth;
pub mod bem_service;
pub mod movimentacao_service;
pub mod reference_service;
pub mod rules;
pub mod user_service;

pub use auth::AuthService;
pub use bem_service::BemService;
pub use movimentacao_service::MovimentacaoService;
pub use reference_service::ReferenceService;
pub use user_service::UserService;
