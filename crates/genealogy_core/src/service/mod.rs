//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate repository calls into genealogy use cases.
//! - Keep callers decoupled from storage details.

pub mod genealogy_service;
