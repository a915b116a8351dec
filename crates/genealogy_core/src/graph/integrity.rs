//! Read-only audit of relationship symmetry.
//!
//! Used after bulk imports, where records arrive from outside the service
//! layer and may not satisfy the reciprocal-link invariants.

use crate::model::person::{Person, PersonId};
use crate::repo::person_repo::{PersonRepository, RepoResult};
use std::collections::HashMap;
use std::fmt::{Display, Formatter};

/// One broken relationship invariant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IntegrityIssue {
    /// `parent` lists `child`, but `child` does not list `parent`.
    ChildMissingParent { parent: PersonId, child: PersonId },
    /// `child` lists `parent`, but `parent` does not list `child`.
    ParentMissingChild { parent: PersonId, child: PersonId },
    /// `person` names `spouse`, but `spouse` names someone else or nobody.
    SpouseNotReciprocated { person: PersonId, spouse: PersonId },
    /// `person` references an id with no stored record.
    DanglingReference { person: PersonId, target: PersonId },
}

impl IntegrityIssue {
    /// Stable short label for log lines.
    pub fn code(&self) -> &'static str {
        match self {
            Self::ChildMissingParent { .. } => "child_missing_parent",
            Self::ParentMissingChild { .. } => "parent_missing_child",
            Self::SpouseNotReciprocated { .. } => "spouse_not_reciprocated",
            Self::DanglingReference { .. } => "dangling_reference",
        }
    }
}

impl Display for IntegrityIssue {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ChildMissingParent { parent, child } => {
                write!(f, "{parent} lists child {child} without back-reference")
            }
            Self::ParentMissingChild { parent, child } => {
                write!(f, "{child} lists parent {parent} without back-reference")
            }
            Self::SpouseNotReciprocated { person, spouse } => {
                write!(f, "{person} names spouse {spouse} who does not name them back")
            }
            Self::DanglingReference { person, target } => {
                write!(f, "{person} references missing person {target}")
            }
        }
    }
}

/// Scans every stored person and reports broken invariants, ordered by the
/// id of the person holding the offending reference.
pub fn check_integrity<R: PersonRepository + ?Sized>(repo: &R) -> RepoResult<Vec<IntegrityIssue>> {
    let persons: HashMap<PersonId, Person> = repo
        .list_persons()?
        .into_iter()
        .map(|person| (person.id, person))
        .collect();

    let mut ids: Vec<&PersonId> = persons.keys().collect();
    ids.sort();

    let mut issues = Vec::new();
    for id in ids {
        let person = &persons[id];

        for child in &person.children {
            match persons.get(child) {
                None => issues.push(IntegrityIssue::DanglingReference {
                    person: person.id,
                    target: *child,
                }),
                Some(found) if !found.parents.contains(&person.id) => {
                    issues.push(IntegrityIssue::ChildMissingParent {
                        parent: person.id,
                        child: *child,
                    })
                }
                Some(_) => {}
            }
        }

        for parent in &person.parents {
            match persons.get(parent) {
                None => issues.push(IntegrityIssue::DanglingReference {
                    person: person.id,
                    target: *parent,
                }),
                Some(found) if !found.children.contains(&person.id) => {
                    issues.push(IntegrityIssue::ParentMissingChild {
                        parent: *parent,
                        child: person.id,
                    })
                }
                Some(_) => {}
            }
        }

        if let Some(spouse) = person.spouse {
            match persons.get(&spouse) {
                None => issues.push(IntegrityIssue::DanglingReference {
                    person: person.id,
                    target: spouse,
                }),
                Some(found) if found.spouse != Some(person.id) => {
                    issues.push(IntegrityIssue::SpouseNotReciprocated {
                        person: person.id,
                        spouse,
                    })
                }
                Some(_) => {}
            }
        }
    }

    Ok(issues)
}
