//! Person domain model.
//!
//! # Responsibility
//! - Define the canonical record for one individual in the family graph.
//! - Provide record-local validation and display helpers.
//!
//! # Invariants
//! - `id` is stable and never reused for another person.
//! - A person never references itself as parent, child or spouse.
//! - `death_date` is not earlier than `birth_date` when both are set.
//! - Cross-record symmetry (parent/child, spouse) is owned by the service
//!   layer, not by this type.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Stable identifier for every person in the graph.
pub type PersonId = Uuid;

/// Closed two-valued gender enumeration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Gender {
    Male,
    Female,
}

/// Record-local validation failures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PersonValidationError {
    /// The person lists itself as parent, child or spouse.
    SelfReference(PersonId),
    /// Death date precedes birth date.
    DeathBeforeBirth {
        id: PersonId,
        birth_date: NaiveDate,
        death_date: NaiveDate,
    },
}

impl Display for PersonValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::SelfReference(id) => write!(f, "person {id} references itself"),
            Self::DeathBeforeBirth {
                id,
                birth_date,
                death_date,
            } => write!(
                f,
                "person {id} has death date {death_date} earlier than birth date {birth_date}"
            ),
        }
    }
}

impl Error for PersonValidationError {}

/// One individual plus its relationship edges.
///
/// Parent and child sets are ordered by id, which pins the neighbor
/// enumeration order used by graph traversals.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Person {
    pub id: PersonId,
    pub last_name: String,
    pub first_name: String,
    /// Patronymic or middle name.
    #[serde(default)]
    pub middle_name: Option<String>,
    /// Required on creation; optional for imported records.
    #[serde(default)]
    pub birth_date: Option<NaiveDate>,
    /// `None` means living.
    #[serde(default)]
    pub death_date: Option<NaiveDate>,
    pub gender: Gender,
    #[serde(default, rename = "parentIds")]
    pub parents: BTreeSet<PersonId>,
    #[serde(default, rename = "childIds")]
    pub children: BTreeSet<PersonId>,
    #[serde(default, rename = "spouseId")]
    pub spouse: Option<PersonId>,
}

impl Person {
    /// Creates a person with a generated id and no relationships.
    pub fn new(
        last_name: impl Into<String>,
        first_name: impl Into<String>,
        gender: Gender,
    ) -> Self {
        Self::with_id(Uuid::new_v4(), last_name, first_name, gender)
    }

    /// Creates a person with a caller-provided id.
    ///
    /// Used by import paths where identity already exists externally.
    pub fn with_id(
        id: PersonId,
        last_name: impl Into<String>,
        first_name: impl Into<String>,
        gender: Gender,
    ) -> Self {
        Self {
            id,
            last_name: last_name.into(),
            first_name: first_name.into(),
            middle_name: None,
            birth_date: None,
            death_date: None,
            gender,
            parents: BTreeSet::new(),
            children: BTreeSet::new(),
            spouse: None,
        }
    }

    /// Returns `"last first"` plus the middle name when present.
    pub fn full_name(&self) -> String {
        let mut name = format!("{} {}", self.last_name, self.first_name);
        if let Some(middle) = self.middle_name.as_deref() {
            name.push(' ');
            name.push_str(middle);
        }
        name
    }

    /// First eight hex digits of the id, for compact display.
    pub fn short_id(&self) -> String {
        self.id.to_string()[..8].to_string()
    }

    pub fn is_living(&self) -> bool {
        self.death_date.is_none()
    }

    /// Whether `other` appears in any relationship field.
    pub fn references(&self, other: PersonId) -> bool {
        self.parents.contains(&other)
            || self.children.contains(&other)
            || self.spouse == Some(other)
    }

    /// Validates record-local invariants.
    pub fn validate(&self) -> Result<(), PersonValidationError> {
        if self.references(self.id) {
            return Err(PersonValidationError::SelfReference(self.id));
        }

        if let (Some(birth_date), Some(death_date)) = (self.birth_date, self.death_date) {
            if death_date < birth_date {
                return Err(PersonValidationError::DeathBeforeBirth {
                    id: self.id,
                    birth_date,
                    death_date,
                });
            }
        }

        Ok(())
    }
}

impl Display for Person {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.full_name())?;
        if let Some(birth_date) = self.birth_date {
            write!(f, " b. {birth_date}")?;
        }
        if let Some(death_date) = self.death_date {
            write!(f, " d. {death_date}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{Gender, Person, PersonValidationError};
    use chrono::NaiveDate;

    fn date(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    #[test]
    fn full_name_appends_middle_name_only_when_present() {
        let mut person = Person::new("Ivanov", "Ivan", Gender::Male);
        assert_eq!(person.full_name(), "Ivanov Ivan");

        person.middle_name = Some("Petrovich".to_string());
        assert_eq!(person.full_name(), "Ivanov Ivan Petrovich");
    }

    #[test]
    fn short_id_is_eight_hex_chars() {
        let person = Person::new("Ivanov", "Ivan", Gender::Male);
        assert_eq!(person.short_id().len(), 8);
        assert!(person.id.to_string().starts_with(&person.short_id()));
    }

    #[test]
    fn validate_rejects_self_reference() {
        let mut person = Person::new("Ivanov", "Ivan", Gender::Male);
        person.spouse = Some(person.id);
        assert_eq!(
            person.validate(),
            Err(PersonValidationError::SelfReference(person.id))
        );
    }

    #[test]
    fn validate_rejects_death_before_birth() {
        let mut person = Person::new("Ivanov", "Ivan", Gender::Male);
        person.birth_date = Some(date(1950, 1, 1));
        person.death_date = Some(date(1949, 12, 31));
        assert!(matches!(
            person.validate(),
            Err(PersonValidationError::DeathBeforeBirth { .. })
        ));

        person.death_date = Some(date(1950, 1, 1));
        assert!(person.validate().is_ok());
    }

    #[test]
    fn serializes_with_camel_case_wire_names() {
        let mut person = Person::new("Ivanov", "Ivan", Gender::Female);
        person.birth_date = Some(date(1990, 5, 17));
        let value = serde_json::to_value(&person).unwrap();

        assert_eq!(value["lastName"], "Ivanov");
        assert_eq!(value["birthDate"], "1990-05-17");
        assert_eq!(value["deathDate"], serde_json::Value::Null);
        assert_eq!(value["gender"], "FEMALE");
        assert!(value["parentIds"].as_array().unwrap().is_empty());
        assert_eq!(value["spouseId"], serde_json::Value::Null);
    }
}
