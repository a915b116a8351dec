//! In-memory person repository.
//!
//! # Responsibility
//! - Provide a process-local keyed store with the same contract as the
//!   SQLite repository.
//!
//! # Invariants
//! - Every batch is validated in full before the map is touched.
//! - A batch is applied under one lock acquisition, so concurrent readers
//!   never observe a half-applied relationship update.

use crate::model::person::{Person, PersonId};
use crate::repo::person_repo::{PersonBatch, PersonRepository, RepoResult};
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

/// `HashMap`-backed person repository.
#[derive(Debug, Default)]
pub struct InMemoryPersonRepository {
    persons: Mutex<HashMap<PersonId, Person>>,
}

impl InMemoryPersonRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored records.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<PersonId, Person>> {
        // Writes validate before mutating, so a poisoned map is still consistent.
        self.persons.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl PersonRepository for InMemoryPersonRepository {
    fn get_person(&self, id: PersonId) -> RepoResult<Option<Person>> {
        Ok(self.lock().get(&id).cloned())
    }

    fn put_person(&self, person: &Person) -> RepoResult<()> {
        person.validate()?;
        self.lock().insert(person.id, person.clone());
        Ok(())
    }

    fn delete_person(&self, id: PersonId) -> RepoResult<bool> {
        Ok(self.lock().remove(&id).is_some())
    }

    fn list_persons(&self) -> RepoResult<Vec<Person>> {
        Ok(self.lock().values().cloned().collect())
    }

    fn clear(&self) -> RepoResult<()> {
        self.lock().clear();
        Ok(())
    }

    fn commit(&self, batch: &PersonBatch) -> RepoResult<()> {
        batch.validate()?;

        let mut persons = self.lock();
        if batch.clear_first {
            persons.clear();
        }
        for person in &batch.puts {
            persons.insert(person.id, person.clone());
        }
        for id in &batch.deletes {
            persons.remove(id);
        }
        Ok(())
    }
}
