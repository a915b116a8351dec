//! Genealogy domain model.
//!
//! # Responsibility
//! - Define the canonical person record and its relationship fields.
//! - Keep relationship edges as identifiers, never direct references.
//!
//! # Invariants
//! - Every person is identified by a stable `PersonId`.
//! - Relationship fields hold foreign keys resolved through a repository.

pub mod person;
