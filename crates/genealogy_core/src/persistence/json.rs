//! JSON export/import.
//!
//! Wire format: a JSON array of person objects with camelCase keys
//! (`id`, `lastName`, `firstName`, `middleName`, `birthDate`, `deathDate`,
//! `gender`, `parentIds`, `childIds`, `spouseId`). Dates are `YYYY-MM-DD`;
//! a `null` or missing `deathDate` means the person is living.

use crate::graph::integrity::check_integrity;
use crate::model::person::Person;
use crate::repo::person_repo::{PersonBatch, PersonRepository, RepoError};
use log::{info, warn};
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

pub type PersistenceResult<T> = Result<T, PersistenceError>;

/// Errors from JSON import/export.
#[derive(Debug)]
pub enum PersistenceError {
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },
    Repo(RepoError),
}

impl Display for PersistenceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io { path, source } => write!(f, "i/o error on `{}`: {source}", path.display()),
            Self::Json { path, source } => {
                write!(f, "invalid person JSON in `{}`: {source}", path.display())
            }
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for PersistenceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Json { source, .. } => Some(source),
            Self::Repo(err) => Some(err),
        }
    }
}

impl From<RepoError> for PersistenceError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

/// Writes all stored persons to `path` as pretty-printed JSON, ordered by id.
///
/// Returns the number of exported records.
pub fn export_json<R: PersonRepository + ?Sized>(
    repo: &R,
    path: impl AsRef<Path>,
) -> PersistenceResult<usize> {
    let path = path.as_ref();
    let persons = repo.list_persons()?;
    let count = persons.len();
    let by_id: BTreeMap<_, _> = persons
        .into_iter()
        .map(|person| (person.id, person))
        .collect();
    let ordered: Vec<&Person> = by_id.values().collect();

    let io_error = |source: std::io::Error| PersistenceError::Io {
        path: path.to_path_buf(),
        source,
    };
    let file = File::create(path).map_err(io_error)?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, &ordered).map_err(|source| {
        PersistenceError::Json {
            path: path.to_path_buf(),
            source,
        }
    })?;
    writer.flush().map_err(io_error)?;

    info!(
        "event=json_export module=persistence status=ok records={count} path={}",
        path.display()
    );
    Ok(count)
}

/// Replaces store content with the persons read from `path`.
///
/// Runs a symmetry audit afterwards and logs any broken links; the imported
/// data is kept as-is. Returns the number of imported records.
pub fn import_json<R: PersonRepository + ?Sized>(
    repo: &R,
    path: impl AsRef<Path>,
) -> PersistenceResult<usize> {
    let path = path.as_ref();
    let persons = read_persons(path)?;
    let count = persons.len();

    repo.commit(&PersonBatch::replace_all(persons))?;

    let issues = check_integrity(repo)?;
    for issue in &issues {
        warn!(
            "event=json_import module=persistence status=integrity_issue code={} detail={issue}",
            issue.code()
        );
    }

    info!(
        "event=json_import module=persistence status=ok records={count} integrity_issues={} path={}",
        issues.len(),
        path.display()
    );
    Ok(count)
}

/// Parses a person JSON document without touching any store.
///
/// A `null` document is read as an empty list.
pub fn read_persons(path: impl AsRef<Path>) -> PersistenceResult<Vec<Person>> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|source| PersistenceError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let persons: Option<Vec<Person>> =
        serde_json::from_reader(BufReader::new(file)).map_err(|source| {
            PersistenceError::Json {
                path: path.to_path_buf(),
                source,
            }
        })?;
    Ok(persons.unwrap_or_default())
}
