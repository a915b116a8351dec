//! Person record store contracts and implementations.
//!
//! # Responsibility
//! - Define the keyed-container contract the graph layers read and write
//!   through.
//! - Isolate SQLite details from service and traversal code.
//!
//! # Invariants
//! - Every write calls `Person::validate()` before persisting.
//! - `commit` applies a whole `PersonBatch` or nothing.
//! - Repositories never enforce cross-record symmetry; that is the service
//!   layer's job.

pub mod memory_repo;
pub mod person_repo;
