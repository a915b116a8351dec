//! Genealogy use-case service.
//!
//! # Responsibility
//! - Create, edit and delete persons.
//! - Link and unlink parent/child and spouse relationships.
//! - Expose traversal and search entry points over the same repository.
//!
//! # Invariants
//! - Parent/child and spouse links stay symmetric after every mutation.
//! - A person has at most one spouse.
//! - A person is never linked to itself.
//! - Every multi-record change is one `PersonBatch`, so a failure leaves no
//!   half-applied relationship behind.

use crate::graph::kinship::{self, KinshipPath};
use crate::graph::levels::{self, LevelDirection};
use crate::graph::{CancelFlag, GraphError};
use crate::model::person::{Gender, Person, PersonId};
use crate::repo::person_repo::{PersonBatch, PersonRepository, RepoError};
use crate::search::name::search_by_name;
use chrono::NaiveDate;
use log::{info, warn};
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type ServiceResult<T> = Result<T, GenealogyError>;

/// Errors from genealogy service operations.
#[derive(Debug)]
pub enum GenealogyError {
    /// Referenced person has no record.
    PersonNotFound(PersonId),
    /// Person already has a spouse.
    AlreadyMarried(PersonId),
    /// The two people are not each other's recorded spouse.
    NotSpouses { a: PersonId, b: PersonId },
    /// Operation would relate a person to itself.
    SelfRelationship(PersonId),
    /// Traversal was cancelled or lost a record mid-walk.
    Graph(GraphError),
    /// Repository-level failure.
    Repo(RepoError),
}

impl GenealogyError {
    /// Referenced identifier has no record.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::PersonNotFound(_))
    }

    /// Operation would break a relationship invariant.
    pub fn is_invariant_violation(&self) -> bool {
        matches!(
            self,
            Self::AlreadyMarried(_) | Self::NotSpouses { .. } | Self::SelfRelationship(_)
        )
    }

    fn code(&self) -> &'static str {
        match self {
            Self::PersonNotFound(_) => "person_not_found",
            Self::AlreadyMarried(_) => "already_married",
            Self::NotSpouses { .. } => "not_spouses",
            Self::SelfRelationship(_) => "self_relationship",
            Self::Graph(_) => "graph_failed",
            Self::Repo(_) => "repo_failed",
        }
    }
}

impl Display for GenealogyError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::PersonNotFound(id) => write!(f, "person not found: {id}"),
            Self::AlreadyMarried(id) => write!(f, "person already has a spouse: {id}"),
            Self::NotSpouses { a, b } => write!(f, "persons are not spouses: {a} and {b}"),
            Self::SelfRelationship(id) => write!(f, "person cannot be related to itself: {id}"),
            Self::Graph(err) => write!(f, "{err}"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for GenealogyError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Graph(err) => Some(err),
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for GenealogyError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

impl From<GraphError> for GenealogyError {
    fn from(value: GraphError) -> Self {
        match value {
            GraphError::Repo(err) => Self::Repo(err),
            other => Self::Graph(other),
        }
    }
}

/// Request model for creating a person.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPerson {
    pub last_name: String,
    pub first_name: String,
    pub middle_name: Option<String>,
    pub birth_date: NaiveDate,
    /// `None` means living.
    pub death_date: Option<NaiveDate>,
    pub gender: Gender,
}

/// Field-level edit. `None` leaves a field unchanged.
///
/// `death_date: Some(None)` explicitly clears the death date.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PersonPatch {
    pub last_name: Option<String>,
    pub first_name: Option<String>,
    pub middle_name: Option<String>,
    pub birth_date: Option<NaiveDate>,
    pub death_date: Option<Option<NaiveDate>>,
    pub gender: Option<Gender>,
}

impl PersonPatch {
    fn apply(self, person: &mut Person) {
        if let Some(last_name) = self.last_name {
            person.last_name = last_name;
        }
        if let Some(first_name) = self.first_name {
            person.first_name = first_name;
        }
        if let Some(middle_name) = self.middle_name {
            person.middle_name = Some(middle_name);
        }
        if let Some(birth_date) = self.birth_date {
            person.birth_date = Some(birth_date);
        }
        if let Some(death_date) = self.death_date {
            person.death_date = death_date;
        }
        if let Some(gender) = self.gender {
            person.gender = gender;
        }
    }
}

/// Use-case facade over one person repository.
pub struct GenealogyService<R: PersonRepository> {
    repo: R,
}

impl<R: PersonRepository> GenealogyService<R> {
    /// Creates a service using the provided repository implementation.
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Underlying repository, for import/export and direct reads.
    pub fn repo(&self) -> &R {
        &self.repo
    }

    /// Creates and stores a person with a fresh id.
    pub fn add_person(&self, request: NewPerson) -> ServiceResult<Person> {
        let mut person = Person::new(request.last_name, request.first_name, request.gender);
        person.middle_name = request.middle_name;
        person.birth_date = Some(request.birth_date);
        person.death_date = request.death_date;

        self.repo.put_person(&person)?;
        info!(
            "event=person_add module=service status=ok person_id={}",
            person.id
        );
        Ok(person)
    }

    /// Overwrites the fields supplied in `patch`; relationships are untouched.
    pub fn edit_person(&self, id: PersonId, patch: PersonPatch) -> ServiceResult<Person> {
        let mut person = self.require(id)?;
        patch.apply(&mut person);
        self.repo.put_person(&person)?;
        info!("event=person_edit module=service status=ok person_id={id}");
        Ok(person)
    }

    pub fn get_person(&self, id: PersonId) -> ServiceResult<Option<Person>> {
        Ok(self.repo.get_person(id)?)
    }

    pub fn list_persons(&self) -> ServiceResult<Vec<Person>> {
        Ok(self.repo.list_persons()?)
    }

    /// Deletes a person after stripping every back-reference to it.
    ///
    /// # Contract
    /// - Parents lose `id` from `children`, children lose it from `parents`,
    ///   the spouse loses its `spouse` field.
    /// - Cascade and removal are committed as one batch.
    pub fn delete_person(&self, id: PersonId) -> ServiceResult<()> {
        let person = self.require(id)?;

        // One relative may hold several roles (parent and child in a cycle);
        // load each once and strip every back-reference from that copy.
        let mut relatives: BTreeMap<PersonId, Person> = BTreeMap::new();
        let related_ids = person
            .parents
            .iter()
            .chain(person.children.iter())
            .chain(person.spouse.iter());
        for relative_id in related_ids {
            if relatives.contains_key(relative_id) {
                continue;
            }
            if let Some(relative) = self.repo.get_person(*relative_id)? {
                relatives.insert(*relative_id, relative);
            }
        }

        for relative in relatives.values_mut() {
            relative.children.remove(&id);
            relative.parents.remove(&id);
            if relative.spouse == Some(id) {
                relative.spouse = None;
            }
        }

        let touched = relatives.len();
        let batch = PersonBatch {
            clear_first: false,
            puts: relatives.into_values().collect(),
            deletes: vec![id],
        };

        self.commit("person_delete", batch)?;
        info!(
            "event=person_delete module=service status=ok person_id={id} relatives_updated={touched}"
        );
        Ok(())
    }

    /// Records `child` as a child of `parent` on both records.
    ///
    /// Linking an already-linked pair succeeds without changes. Cycles
    /// (a person becoming its own ancestor) are not detected.
    pub fn link_parent_child(&self, parent_id: PersonId, child_id: PersonId) -> ServiceResult<()> {
        let (mut parent, mut child) = self.require_pair(parent_id, child_id)?;
        if parent_id == child_id {
            return Err(reject(
                "parent_link",
                GenealogyError::SelfRelationship(parent_id),
            ));
        }

        let changed = parent.children.insert(child_id) | child.parents.insert(parent_id);
        if changed {
            self.commit("parent_link", PersonBatch::new().put(parent).put(child))?;
        }
        info!(
            "event=parent_link module=service status=ok parent_id={parent_id} child_id={child_id} changed={changed}"
        );
        Ok(())
    }

    /// Removes the parent/child link in both directions.
    ///
    /// Unlinking a pair that is not linked succeeds without changes.
    pub fn unlink_parent_child(
        &self,
        parent_id: PersonId,
        child_id: PersonId,
    ) -> ServiceResult<()> {
        let (mut parent, mut child) = self.require_pair(parent_id, child_id)?;

        let changed = parent.children.remove(&child_id) | child.parents.remove(&parent_id);
        if changed {
            self.commit("parent_unlink", PersonBatch::new().put(parent).put(child))?;
        }
        info!(
            "event=parent_unlink module=service status=ok parent_id={parent_id} child_id={child_id} changed={changed}"
        );
        Ok(())
    }

    /// Marries two unmarried people.
    ///
    /// # Errors
    /// - `AlreadyMarried` when either side already has a spouse; nothing is
    ///   changed.
    pub fn link_spouses(&self, a_id: PersonId, b_id: PersonId) -> ServiceResult<()> {
        let (mut a, mut b) = self.require_pair(a_id, b_id)?;
        if a_id == b_id {
            return Err(reject("spouse_link", GenealogyError::SelfRelationship(a_id)));
        }
        if a.spouse.is_some() {
            return Err(reject("spouse_link", GenealogyError::AlreadyMarried(a_id)));
        }
        if b.spouse.is_some() {
            return Err(reject("spouse_link", GenealogyError::AlreadyMarried(b_id)));
        }

        a.spouse = Some(b_id);
        b.spouse = Some(a_id);
        self.commit("spouse_link", PersonBatch::new().put(a).put(b))?;
        info!("event=spouse_link module=service status=ok a_id={a_id} b_id={b_id}");
        Ok(())
    }

    /// Clears a spousal link.
    ///
    /// # Errors
    /// - `NotSpouses` unless `a` is recorded as married to `b`.
    pub fn unlink_spouses(&self, a_id: PersonId, b_id: PersonId) -> ServiceResult<()> {
        let (mut a, mut b) = self.require_pair(a_id, b_id)?;
        if a.spouse != Some(b_id) || b.spouse != Some(a_id) {
            return Err(reject(
                "spouse_unlink",
                GenealogyError::NotSpouses { a: a_id, b: b_id },
            ));
        }

        a.spouse = None;
        b.spouse = None;
        self.commit("spouse_unlink", PersonBatch::new().put(a).put(b))?;
        info!("event=spouse_unlink module=service status=ok a_id={a_id} b_id={b_id}");
        Ok(())
    }

    /// Ancestor generations, root first. Empty when `root` is missing.
    pub fn ancestor_levels(
        &self,
        root: PersonId,
        max_depth: usize,
    ) -> ServiceResult<Vec<Vec<Person>>> {
        Ok(levels::ancestor_levels(&self.repo, root, max_depth)?)
    }

    /// Descendant generations, root first. Empty when `root` is missing.
    pub fn descendant_levels(
        &self,
        root: PersonId,
        max_depth: usize,
    ) -> ServiceResult<Vec<Vec<Person>>> {
        Ok(levels::descendant_levels(&self.repo, root, max_depth)?)
    }

    /// Level expansion with an explicit direction and cancellation flag.
    pub fn build_levels(
        &self,
        root: PersonId,
        direction: LevelDirection,
        max_depth: usize,
        cancel: Option<&CancelFlag>,
    ) -> ServiceResult<Vec<Vec<Person>>> {
        Ok(levels::build_levels(
            &self.repo, root, direction, max_depth, cancel,
        )?)
    }

    /// Shortest kinship path, or `None` when the two are unrelated.
    pub fn shortest_path(&self, a: PersonId, b: PersonId) -> ServiceResult<Option<KinshipPath>> {
        Ok(kinship::shortest_path(&self.repo, a, b)?)
    }

    pub fn is_related(&self, a: PersonId, b: PersonId) -> ServiceResult<bool> {
        Ok(kinship::is_related(&self.repo, a, b)?)
    }

    /// Case-insensitive substring search over full names.
    pub fn search_by_name(&self, query: &str) -> ServiceResult<Vec<Person>> {
        Ok(search_by_name(&self.repo, query)?)
    }

    fn require(&self, id: PersonId) -> ServiceResult<Person> {
        self.repo
            .get_person(id)?
            .ok_or(GenealogyError::PersonNotFound(id))
    }

    fn require_pair(&self, a: PersonId, b: PersonId) -> ServiceResult<(Person, Person)> {
        let first = self.require(a)?;
        let second = self.require(b)?;
        Ok((first, second))
    }

    fn commit(&self, event: &str, batch: PersonBatch) -> ServiceResult<()> {
        self.repo.commit(&batch).map_err(|err| {
            warn!("event={event} module=service status=error error_code=commit_failed error={err}");
            GenealogyError::from(err)
        })
    }
}

fn reject(event: &str, err: GenealogyError) -> GenealogyError {
    warn!(
        "event={event} module=service status=rejected error_code={} error={err}",
        err.code()
    );
    err
}
