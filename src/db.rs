pub mod bem_repo;
pub mod movimentacao_repo;
pub mod reference_repo;
pub mod seed;
pub mod user_repo;

pub use bem_repo::BemRepository;
pub use movimentacao_repo::MovimentacaoRepository;
pub use reference_repo::{ReferenceRepository, ReferenceTable};
pub use user_repo::UserRepository;
