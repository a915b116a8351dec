//! Shortest kinship path search.
//!
//! # Responsibility
//! - Breadth-first search over the undirected graph formed by parent, child
//!   and spouse edges.
//! - Rebuild the discovered path through a predecessor map.
//!
//! # Invariants
//! - Returned paths have the minimum possible edge count.
//! - Neighbors are enumerated parents first, then children, then spouse;
//!   within a set, by ascending id. Which of several equally short paths is
//!   returned follows from that order and carries no further meaning.

use crate::graph::{GraphError, GraphResult};
use crate::model::person::{Person, PersonId};
use crate::repo::person_repo::PersonRepository;
use log::debug;
use std::collections::{HashMap, HashSet, VecDeque};

/// How a path step relates the next person to the previous one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KinshipEdge {
    /// Next person is a parent of the previous one.
    Parent,
    /// Next person is a child of the previous one.
    Child,
    /// Next person is the spouse of the previous one.
    Spouse,
}

/// People connected by consecutive kinship edges.
///
/// `edges[i]` describes `people[i + 1]` as seen from `people[i]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KinshipPath {
    pub people: Vec<Person>,
    pub edges: Vec<KinshipEdge>,
}

impl KinshipPath {
    fn single(person: Person) -> Self {
        Self {
            people: vec![person],
            edges: Vec::new(),
        }
    }

    /// Number of edges, i.e. people minus one.
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn ids(&self) -> Vec<PersonId> {
        self.people.iter().map(|person| person.id).collect()
    }

    pub fn start(&self) -> Option<&Person> {
        self.people.first()
    }

    pub fn end(&self) -> Option<&Person> {
        self.people.last()
    }
}

/// Finds a minimum-edge kinship path from `from` to `to`.
///
/// Returns `Ok(None)` when either endpoint has no record or the two people
/// sit in disconnected components.
pub fn shortest_path<R: PersonRepository + ?Sized>(
    repo: &R,
    from: PersonId,
    to: PersonId,
) -> GraphResult<Option<KinshipPath>> {
    if from == to {
        return Ok(repo.get_person(from)?.map(KinshipPath::single));
    }
    if repo.get_person(from)?.is_none() || repo.get_person(to)?.is_none() {
        return Ok(None);
    }

    let mut predecessors: HashMap<PersonId, (PersonId, KinshipEdge)> = HashMap::new();
    let mut visited = HashSet::from([from]);
    let mut queue = VecDeque::from([from]);

    while let Some(current_id) = queue.pop_front() {
        let Some(current) = repo.get_person(current_id)? else {
            continue;
        };

        for (neighbor, edge) in neighbors(&current) {
            if !visited.insert(neighbor) {
                continue;
            }
            predecessors.insert(neighbor, (current_id, edge));
            if neighbor == to {
                let path = rebuild_path(repo, &predecessors, from, to)?;
                debug!(
                    "event=kinship_path module=graph status=found from_id={from} to_id={to} edges={} visited={}",
                    path.edge_count(),
                    visited.len()
                );
                return Ok(Some(path));
            }
            queue.push_back(neighbor);
        }
    }

    debug!(
        "event=kinship_path module=graph status=not_found from_id={from} to_id={to} visited={}",
        visited.len()
    );
    Ok(None)
}

/// Whether any kinship path connects the two people.
pub fn is_related<R: PersonRepository + ?Sized>(
    repo: &R,
    a: PersonId,
    b: PersonId,
) -> GraphResult<bool> {
    Ok(shortest_path(repo, a, b)?.is_some())
}

fn neighbors(person: &Person) -> Vec<(PersonId, KinshipEdge)> {
    let parents = person
        .parents
        .iter()
        .map(|id| (*id, KinshipEdge::Parent));
    let children = person
        .children
        .iter()
        .map(|id| (*id, KinshipEdge::Child));
    let spouse = person.spouse.map(|id| (id, KinshipEdge::Spouse));

    parents.chain(children).chain(spouse).collect()
}

fn rebuild_path<R: PersonRepository + ?Sized>(
    repo: &R,
    predecessors: &HashMap<PersonId, (PersonId, KinshipEdge)>,
    from: PersonId,
    to: PersonId,
) -> GraphResult<KinshipPath> {
    let mut ids = vec![to];
    let mut edges = Vec::new();
    let mut cursor = to;
    while cursor != from {
        let (previous, edge) = predecessors
            .get(&cursor)
            .copied()
            .ok_or(GraphError::MissingPerson(cursor))?;
        ids.push(previous);
        edges.push(edge);
        cursor = previous;
    }
    ids.reverse();
    edges.reverse();

    let people = ids
        .into_iter()
        .map(|id| repo.get_person(id)?.ok_or(GraphError::MissingPerson(id)))
        .collect::<GraphResult<Vec<_>>>()?;

    Ok(KinshipPath { people, edges })
}
