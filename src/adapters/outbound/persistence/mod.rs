/// Persistence adapters.
mod sqlite_repository;

pub use sqlite_repository::SqliteSbomRepository;
