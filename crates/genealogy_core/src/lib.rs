//! Core domain logic for the genealogy graph.
//! This crate is the single source of truth for relationship invariants.

pub mod db;
pub mod graph;
pub mod logging;
pub mod model;
pub mod persistence;
pub mod repo;
pub mod search;
pub mod service;

pub use graph::integrity::{check_integrity, IntegrityIssue};
pub use graph::kinship::{is_related, shortest_path, KinshipEdge, KinshipPath};
pub use graph::levels::{ancestor_levels, build_levels, descendant_levels, LevelDirection};
pub use graph::{CancelFlag, GraphError, GraphResult};
pub use logging::{default_log_level, init_logging, logging_status, LoggingConfig};
pub use model::person::{Gender, Person, PersonId, PersonValidationError};
pub use persistence::json::{export_json, import_json, read_persons, PersistenceError};
pub use repo::memory_repo::InMemoryPersonRepository;
pub use repo::person_repo::{
    PersonBatch, PersonRepository, RepoError, RepoResult, SqlitePersonRepository,
};
pub use search::name::search_by_name;
pub use service::genealogy_service::{
    GenealogyError, GenealogyService, NewPerson, PersonPatch, ServiceResult,
};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
