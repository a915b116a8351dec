//! Person repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Provide get/put/delete/list/clear over canonical person storage.
//! - Apply multi-record batches inside one SQLite transaction.
//!
//! # Invariants
//! - Relationship sets are stored per owning person in `person_parents` and
//!   `person_children`; rows cascade away with the owning `persons` row.
//! - Read paths reject invalid persisted state instead of masking it.

use crate::db::migrations::latest_version;
use crate::db::DbError;
use crate::model::person::{Gender, Person, PersonId, PersonValidationError};
use chrono::NaiveDate;
use rusqlite::{params, Connection, OptionalExtension, Row, Transaction, TransactionBehavior};
use std::collections::{BTreeSet, HashMap};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

const PERSON_SELECT_SQL: &str = "SELECT
    person_uuid,
    last_name,
    first_name,
    middle_name,
    birth_date,
    death_date,
    gender,
    spouse_uuid
FROM persons";

const DATE_FORMAT: &str = "%Y-%m-%d";

pub type RepoResult<T> = Result<T, RepoError>;

/// Generic repository error for person persistence.
#[derive(Debug)]
pub enum RepoError {
    Validation(PersonValidationError),
    Db(DbError),
    InvalidData(String),
    /// Connection schema is not at the expected migrated version.
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::InvalidData(message) => write!(f, "invalid persisted person data: {message}"),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "person repository requires schema version {expected_version}, got {actual_version}"
            ),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            Self::InvalidData(_) => None,
            Self::UninitializedConnection { .. } => None,
        }
    }
}

impl From<PersonValidationError> for RepoError {
    fn from(value: PersonValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Set of record writes applied atomically by [`PersonRepository::commit`].
///
/// Order of application: optional clear, then puts, then deletes.
#[derive(Debug, Clone, Default)]
pub struct PersonBatch {
    pub clear_first: bool,
    pub puts: Vec<Person>,
    pub deletes: Vec<PersonId>,
}

impl PersonBatch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Batch that replaces the whole store content with `persons`.
    pub fn replace_all(persons: Vec<Person>) -> Self {
        Self {
            clear_first: true,
            puts: persons,
            deletes: Vec::new(),
        }
    }

    pub fn put(mut self, person: Person) -> Self {
        self.puts.push(person);
        self
    }

    pub fn delete(mut self, id: PersonId) -> Self {
        self.deletes.push(id);
        self
    }

    pub fn is_empty(&self) -> bool {
        !self.clear_first && self.puts.is_empty() && self.deletes.is_empty()
    }

    /// Validates every record scheduled for writing.
    pub fn validate(&self) -> Result<(), PersonValidationError> {
        self.puts.iter().try_for_each(Person::validate)
    }
}

/// Keyed person store used by every graph operation.
pub trait PersonRepository {
    /// Loads one person by id.
    fn get_person(&self, id: PersonId) -> RepoResult<Option<Person>>;
    /// Inserts or replaces one person record.
    fn put_person(&self, person: &Person) -> RepoResult<()>;
    /// Removes one person record. Returns whether a record existed.
    fn delete_person(&self, id: PersonId) -> RepoResult<bool>;
    /// Lists all persons in no particular order.
    fn list_persons(&self) -> RepoResult<Vec<Person>>;
    /// Removes every record.
    fn clear(&self) -> RepoResult<()>;
    /// Applies a batch of writes atomically.
    fn commit(&self, batch: &PersonBatch) -> RepoResult<()>;
}

/// SQLite-backed person repository.
pub struct SqlitePersonRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqlitePersonRepository<'conn> {
    /// Creates repository from a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_person_connection_ready(conn)?;
        Ok(Self { conn })
    }
}

impl PersonRepository for SqlitePersonRepository<'_> {
    fn get_person(&self, id: PersonId) -> RepoResult<Option<Person>> {
        let person = self
            .conn
            .query_row(
                &format!("{PERSON_SELECT_SQL} WHERE person_uuid = ?1;"),
                [id.to_string()],
                read_person_columns,
            )
            .optional()?;

        let Some(columns) = person else {
            return Ok(None);
        };

        let mut person = parse_person_columns(columns)?;
        person.parents = load_link_set(self.conn, LinkTable::Parents, id)?;
        person.children = load_link_set(self.conn, LinkTable::Children, id)?;
        person.validate()?;
        Ok(Some(person))
    }

    fn put_person(&self, person: &Person) -> RepoResult<()> {
        person.validate()?;

        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        write_person(&tx, person)?;
        tx.commit()?;
        Ok(())
    }

    fn delete_person(&self, id: PersonId) -> RepoResult<bool> {
        let changed = self
            .conn
            .execute("DELETE FROM persons WHERE person_uuid = ?1;", [id.to_string()])?;
        Ok(changed > 0)
    }

    fn list_persons(&self) -> RepoResult<Vec<Person>> {
        let mut parents = load_all_link_sets(self.conn, LinkTable::Parents)?;
        let mut children = load_all_link_sets(self.conn, LinkTable::Children)?;

        let mut stmt = self.conn.prepare(&format!("{PERSON_SELECT_SQL};"))?;
        let mut rows = stmt.query([])?;
        let mut persons = Vec::new();

        while let Some(row) = rows.next()? {
            let mut person = parse_person_columns(read_person_columns(row)?)?;
            person.parents = parents.remove(&person.id).unwrap_or_default();
            person.children = children.remove(&person.id).unwrap_or_default();
            person.validate()?;
            persons.push(person);
        }

        Ok(persons)
    }

    fn clear(&self) -> RepoResult<()> {
        self.conn.execute("DELETE FROM persons;", [])?;
        Ok(())
    }

    fn commit(&self, batch: &PersonBatch) -> RepoResult<()> {
        batch.validate()?;
        if batch.is_empty() {
            return Ok(());
        }

        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        if batch.clear_first {
            tx.execute("DELETE FROM persons;", [])?;
        }
        for person in &batch.puts {
            write_person(&tx, person)?;
        }
        for id in &batch.deletes {
            tx.execute("DELETE FROM persons WHERE person_uuid = ?1;", [id.to_string()])?;
        }
        tx.commit()?;
        Ok(())
    }
}

#[derive(Debug, Clone, Copy)]
enum LinkTable {
    Parents,
    Children,
}

impl LinkTable {
    fn table(self) -> &'static str {
        match self {
            Self::Parents => "person_parents",
            Self::Children => "person_children",
        }
    }

    fn column(self) -> &'static str {
        match self {
            Self::Parents => "parent_uuid",
            Self::Children => "child_uuid",
        }
    }
}

/// Raw column values of one `persons` row before domain parsing.
struct PersonColumns {
    uuid: String,
    last_name: String,
    first_name: String,
    middle_name: Option<String>,
    birth_date: Option<String>,
    death_date: Option<String>,
    gender: String,
    spouse_uuid: Option<String>,
}

fn read_person_columns(row: &Row<'_>) -> rusqlite::Result<PersonColumns> {
    Ok(PersonColumns {
        uuid: row.get("person_uuid")?,
        last_name: row.get("last_name")?,
        first_name: row.get("first_name")?,
        middle_name: row.get("middle_name")?,
        birth_date: row.get("birth_date")?,
        death_date: row.get("death_date")?,
        gender: row.get("gender")?,
        spouse_uuid: row.get("spouse_uuid")?,
    })
}

fn parse_person_columns(columns: PersonColumns) -> RepoResult<Person> {
    let id = parse_uuid(&columns.uuid, "persons.person_uuid")?;
    let gender = parse_gender(&columns.gender).ok_or_else(|| {
        RepoError::InvalidData(format!(
            "invalid gender `{}` in persons.gender",
            columns.gender
        ))
    })?;

    let mut person = Person::with_id(id, columns.last_name, columns.first_name, gender);
    person.middle_name = columns.middle_name;
    person.birth_date = columns
        .birth_date
        .as_deref()
        .map(|value| parse_date(value, "persons.birth_date"))
        .transpose()?;
    person.death_date = columns
        .death_date
        .as_deref()
        .map(|value| parse_date(value, "persons.death_date"))
        .transpose()?;
    person.spouse = columns
        .spouse_uuid
        .as_deref()
        .map(|value| parse_uuid(value, "persons.spouse_uuid"))
        .transpose()?;
    Ok(person)
}

fn write_person(conn: &Connection, person: &Person) -> RepoResult<()> {
    let id = person.id.to_string();
    conn.execute(
        "INSERT INTO persons (
            person_uuid,
            last_name,
            first_name,
            middle_name,
            birth_date,
            death_date,
            gender,
            spouse_uuid
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
        ON CONFLICT (person_uuid) DO UPDATE SET
            last_name = excluded.last_name,
            first_name = excluded.first_name,
            middle_name = excluded.middle_name,
            birth_date = excluded.birth_date,
            death_date = excluded.death_date,
            gender = excluded.gender,
            spouse_uuid = excluded.spouse_uuid,
            updated_at = (strftime('%s', 'now') * 1000);",
        params![
            id,
            person.last_name.as_str(),
            person.first_name.as_str(),
            person.middle_name.as_deref(),
            person.birth_date.map(format_date),
            person.death_date.map(format_date),
            gender_to_db(person.gender),
            person.spouse.map(|value| value.to_string()),
        ],
    )?;

    replace_link_set(conn, LinkTable::Parents, &id, &person.parents)?;
    replace_link_set(conn, LinkTable::Children, &id, &person.children)?;
    Ok(())
}

fn replace_link_set(
    conn: &Connection,
    link: LinkTable,
    owner: &str,
    targets: &BTreeSet<PersonId>,
) -> RepoResult<()> {
    conn.execute(
        &format!("DELETE FROM {} WHERE person_uuid = ?1;", link.table()),
        [owner],
    )?;

    let mut stmt = conn.prepare(&format!(
        "INSERT INTO {} (person_uuid, {}) VALUES (?1, ?2);",
        link.table(),
        link.column()
    ))?;
    for target in targets {
        stmt.execute(params![owner, target.to_string()])?;
    }
    Ok(())
}

fn load_link_set(
    conn: &Connection,
    link: LinkTable,
    owner: PersonId,
) -> RepoResult<BTreeSet<PersonId>> {
    let column = format!("{}.{}", link.table(), link.column());
    let mut stmt = conn.prepare(&format!(
        "SELECT {} FROM {} WHERE person_uuid = ?1;",
        link.column(),
        link.table()
    ))?;
    let mut rows = stmt.query([owner.to_string()])?;
    let mut targets = BTreeSet::new();

    while let Some(row) = rows.next()? {
        let value: String = row.get(0)?;
        targets.insert(parse_uuid(&value, &column)?);
    }

    Ok(targets)
}

fn load_all_link_sets(
    conn: &Connection,
    link: LinkTable,
) -> RepoResult<HashMap<PersonId, BTreeSet<PersonId>>> {
    let column = format!("{}.{}", link.table(), link.column());
    let mut stmt = conn.prepare(&format!(
        "SELECT person_uuid, {} FROM {};",
        link.column(),
        link.table()
    ))?;
    let mut rows = stmt.query([])?;
    let mut sets: HashMap<PersonId, BTreeSet<PersonId>> = HashMap::new();

    while let Some(row) = rows.next()? {
        let owner: String = row.get(0)?;
        let target: String = row.get(1)?;
        let owner = parse_uuid(&owner, &format!("{}.person_uuid", link.table()))?;
        sets.entry(owner)
            .or_default()
            .insert(parse_uuid(&target, &column)?);
    }

    Ok(sets)
}

fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

fn parse_date(value: &str, column: &str) -> RepoResult<NaiveDate> {
    NaiveDate::parse_from_str(value, DATE_FORMAT)
        .map_err(|_| RepoError::InvalidData(format!("invalid date `{value}` in {column}")))
}

fn parse_uuid(value: &str, column: &str) -> RepoResult<Uuid> {
    Uuid::parse_str(value)
        .map_err(|_| RepoError::InvalidData(format!("invalid uuid `{value}` in {column}")))
}

fn gender_to_db(gender: Gender) -> &'static str {
    match gender {
        Gender::Male => "male",
        Gender::Female => "female",
    }
}

fn parse_gender(value: &str) -> Option<Gender> {
    match value {
        "male" => Some(Gender::Male),
        "female" => Some(Gender::Female),
        _ => None,
    }
}

fn ensure_person_connection_ready(conn: &Connection) -> RepoResult<()> {
    let expected_version = latest_version();
    let actual_version: u32 = conn.query_row("PRAGMA user_version;", [], |row| row.get(0))?;
    if actual_version != expected_version {
        return Err(RepoError::UninitializedConnection {
            expected_version,
            actual_version,
        });
    }
    Ok(())
}
