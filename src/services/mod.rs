// Service exports
pub mod cache;
pub mod memory;
pub mod parser;
pub mod postgres;
pub mod repository;

pub use cache::{CacheError, CacheKey, CacheManager, CacheStats};
pub use memory::InMemoryCreatorRepository;
pub use parser::{ConversationalParser, HttpConversationalParser, ParserError};
pub use postgres::PostgresCreatorRepository;
pub use repository::{CreatorRepository, RepositoryError};
