//! Case-insensitive substring search over person names.
//!
//! # Invariants
//! - Matching runs against `Person::full_name()` after Unicode lower-casing
//!   of both sides, so Cyrillic and other non-ASCII names fold correctly.
//! - Result ordering is deterministic: last name, first name, then id, all
//!   by ordinal comparison.

use crate::model::person::Person;
use crate::repo::person_repo::{PersonRepository, RepoResult};
use log::debug;

/// Returns every person whose full name contains `query`, ignoring case.
///
/// An empty query matches every stored person.
pub fn search_by_name<R: PersonRepository + ?Sized>(
    repo: &R,
    query: &str,
) -> RepoResult<Vec<Person>> {
    let needle = query.to_lowercase();
    let mut hits: Vec<Person> = repo
        .list_persons()?
        .into_iter()
        .filter(|person| person.full_name().to_lowercase().contains(&needle))
        .collect();

    hits.sort_by(|left, right| {
        left.last_name
            .cmp(&right.last_name)
            .then_with(|| left.first_name.cmp(&right.first_name))
            .then_with(|| left.id.cmp(&right.id))
    });

    debug!(
        "event=search_by_name module=search status=ok query_chars={} hits={}",
        query.chars().count(),
        hits.len()
    );
    Ok(hits)
}
