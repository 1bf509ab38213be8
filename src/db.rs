pub mod store;
pub use store::{MemoryStore, Store};
pub mod pg_store;
pub use pg_store::PgStore;
pub mod collection_repo;
pub use collection_repo::CollectionRepository;
pub mod session_repo;
pub use session_repo::SessionRepository;
pub mod seed;

use crate::models::{auth::User, fisioterapia::FisioterapiaRecord, regulacao::RegulacaoRecord};

pub type UserRepository = CollectionRepository<User>;
pub type RegulacaoRepository = CollectionRepository<RegulacaoRecord>;
pub type FisioterapiaRepository = CollectionRepository<FisioterapiaRecord>;
