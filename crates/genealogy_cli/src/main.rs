//! CLI smoke entry point.
//!
//! # Responsibility
//! - Verify `genealogy_core` linkage end to end on an in-memory database.
//! - Seed a small demo family and print its generations and one kinship path.
//! - Own all display formatting; the core only returns data.

use chrono::NaiveDate;
use genealogy_core::db::open_db_in_memory;
use genealogy_core::{
    core_version, GenealogyService, Gender, KinshipEdge, KinshipPath, LoggingConfig, NewPerson,
    Person, PersonRepository, SqlitePersonRepository,
};
use std::error::Error;
use std::process::ExitCode;

const DEMO_DEPTH: usize = 10;

struct DemoFamily {
    grandfather: Person,
    granddaughter: Person,
    son_in_law_father: Person,
}

fn main() -> ExitCode {
    if let Some(config) = LoggingConfig::from_env() {
        if let Err(err) = config.init() {
            eprintln!("logging disabled: {err}");
        }
    }

    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<(), Box<dyn Error>> {
    println!("genealogy_core version={}", core_version());

    let conn = open_db_in_memory()?;
    let service = GenealogyService::new(SqlitePersonRepository::try_new(&conn)?);
    let family = seed_demo_family(&service)?;

    let ancestors = service.ancestor_levels(family.granddaughter.id, DEMO_DEPTH)?;
    print_levels("Ancestors", &ancestors);

    let descendants = service.descendant_levels(family.grandfather.id, DEMO_DEPTH)?;
    print_levels("Descendants", &descendants);

    match service.shortest_path(family.grandfather.id, family.son_in_law_father.id)? {
        Some(path) => print_path(&path),
        None => println!("\nNo kinship path found."),
    }

    println!("\nPeople stored: {}", service.repo().list_persons()?.len());
    Ok(())
}

fn seed_demo_family<R: PersonRepository>(
    service: &GenealogyService<R>,
) -> Result<DemoFamily, Box<dyn Error>> {
    let person = |last: &str,
                  first: &str,
                  middle: &str,
                  birth: (i32, u32, u32),
                  gender: Gender|
     -> Result<Person, Box<dyn Error>> {
        let birth_date = NaiveDate::from_ymd_opt(birth.0, birth.1, birth.2)
            .ok_or_else(|| format!("invalid demo birth date {birth:?}"))?;
        let created = service.add_person(NewPerson {
            last_name: last.to_string(),
            first_name: first.to_string(),
            middle_name: Some(middle.to_string()),
            birth_date,
            death_date: None,
            gender,
        })?;
        Ok(created)
    };

    let grandfather = person("Orlov", "Nikolai", "Petrovich", (1949, 1, 5), Gender::Male)?;
    let grandmother = person("Orlova", "Galina", "Sergeevna", (1951, 3, 2), Gender::Female)?;
    let daughter = person("Orlova", "Vera", "Nikolaevna", (1978, 6, 12), Gender::Female)?;
    let son = person("Orlov", "Daniil", "Nikolaevich", (1982, 11, 23), Gender::Male)?;
    let son_in_law = person("Belov", "Artem", "Igorevich", (1976, 9, 30), Gender::Male)?;
    let son_in_law_father = person("Belov", "Igor", "Olegovich", (1950, 4, 18), Gender::Male)?;
    let granddaughter = person("Belova", "Nina", "Artemovna", (2004, 2, 1), Gender::Female)?;

    service.link_spouses(grandfather.id, grandmother.id)?;
    service.link_parent_child(grandfather.id, daughter.id)?;
    service.link_parent_child(grandmother.id, daughter.id)?;
    service.link_parent_child(grandfather.id, son.id)?;
    service.link_parent_child(grandmother.id, son.id)?;
    service.link_spouses(daughter.id, son_in_law.id)?;
    service.link_parent_child(son_in_law_father.id, son_in_law.id)?;
    service.link_parent_child(daughter.id, granddaughter.id)?;
    service.link_parent_child(son_in_law.id, granddaughter.id)?;

    Ok(DemoFamily {
        grandfather,
        granddaughter,
        son_in_law_father,
    })
}

fn print_levels(title: &str, levels: &[Vec<Person>]) {
    println!("\n=== {title} ===");
    for (depth, level) in levels.iter().enumerate() {
        println!("Level {depth}:");
        for person in level {
            println!("  - {person}  (ID={})", person.short_id());
        }
    }
}

fn print_path(path: &KinshipPath) {
    println!("\n=== Kinship ===");
    println!("Related. Edges in shortest path: {}", path.edge_count());
    for (index, person) in path.people.iter().enumerate() {
        match index.checked_sub(1).and_then(|edge| path.edges.get(edge)) {
            None => println!("Start: {person}"),
            Some(edge) => println!("  -> {} {person}", edge_label(*edge)),
        }
    }
}

fn edge_label(edge: KinshipEdge) -> &'static str {
    match edge {
        KinshipEdge::Parent => "parent",
        KinshipEdge::Child => "child",
        KinshipEdge::Spouse => "spouse",
    }
}
