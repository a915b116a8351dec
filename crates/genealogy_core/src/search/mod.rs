//! Search module entry points.
//!
//! # Responsibility
//! - Expose name lookup over the person store.

pub mod name;
