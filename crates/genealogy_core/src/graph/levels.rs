//! Generation-by-generation expansion of ancestors and descendants.
//!
//! Level 0 holds only the root; level `k + 1` holds every person reachable
//! by one edge from level `k` that no earlier level already contains.

use crate::graph::{CancelFlag, GraphResult};
use crate::model::person::{Person, PersonId};
use crate::repo::person_repo::PersonRepository;
use log::debug;
use std::collections::{BTreeSet, HashSet};

/// Edge family followed by a level expansion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LevelDirection {
    /// Follow `parents` edges.
    Ancestors,
    /// Follow `children` edges.
    Descendants,
}

impl LevelDirection {
    fn edges(self, person: &Person) -> &BTreeSet<PersonId> {
        match self {
            Self::Ancestors => &person.parents,
            Self::Descendants => &person.children,
        }
    }

    fn as_str(self) -> &'static str {
        match self {
            Self::Ancestors => "ancestors",
            Self::Descendants => "descendants",
        }
    }
}

/// Ancestor generations of `root`, at most `max_depth + 1` levels.
pub fn ancestor_levels<R: PersonRepository + ?Sized>(
    repo: &R,
    root: PersonId,
    max_depth: usize,
) -> GraphResult<Vec<Vec<Person>>> {
    build_levels(repo, root, LevelDirection::Ancestors, max_depth, None)
}

/// Descendant generations of `root`, at most `max_depth + 1` levels.
pub fn descendant_levels<R: PersonRepository + ?Sized>(
    repo: &R,
    root: PersonId,
    max_depth: usize,
) -> GraphResult<Vec<Vec<Person>>> {
    build_levels(repo, root, LevelDirection::Descendants, max_depth, None)
}

/// Expands levels from `root` in `direction`.
///
/// # Contract
/// - Missing root yields an empty sequence.
/// - A person appears in at most one level, even when reachable through
///   several paths or through a relationship cycle.
/// - The result never ends with an empty level.
/// - Ids without a stored record are skipped.
///
/// # Errors
/// - `GraphError::Cancelled` when `cancel` is raised before a level is
///   expanded.
pub fn build_levels<R: PersonRepository + ?Sized>(
    repo: &R,
    root: PersonId,
    direction: LevelDirection,
    max_depth: usize,
    cancel: Option<&CancelFlag>,
) -> GraphResult<Vec<Vec<Person>>> {
    let mut levels: Vec<Vec<Person>> = Vec::new();
    let Some(root_person) = repo.get_person(root)? else {
        debug!(
            "event=graph_levels module=graph status=root_missing direction={} root_id={root}",
            direction.as_str()
        );
        return Ok(levels);
    };

    let mut visited = HashSet::from([root]);
    let mut current = vec![root_person];

    for depth in 0..=max_depth {
        let mut next = Vec::new();
        if depth < max_depth {
            CancelFlag::check(cancel)?;
            for person in &current {
                for id in direction.edges(person) {
                    if !visited.insert(*id) {
                        continue;
                    }
                    if let Some(found) = repo.get_person(*id)? {
                        next.push(found);
                    }
                }
            }
        }

        levels.push(current);
        if next.is_empty() {
            break;
        }
        current = next;
    }

    debug!(
        "event=graph_levels module=graph status=ok direction={} root_id={root} max_depth={max_depth} levels={}",
        direction.as_str(),
        levels.len()
    );
    Ok(levels)
}
