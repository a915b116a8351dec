//! File import/export of the full person record set.
//!
//! # Responsibility
//! - Serialize every stored person to a JSON document and back.
//!
//! # Invariants
//! - Import replaces store content atomically; a failed import leaves the
//!   previous records untouched.

pub mod json;
