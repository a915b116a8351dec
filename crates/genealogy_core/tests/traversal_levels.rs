use chrono::NaiveDate;
use genealogy_core::db::open_db_in_memory;
use genealogy_core::{
    GenealogyService, Gender, InMemoryPersonRepository, NewPerson, Person, PersonId,
    PersonRepository, SqlitePersonRepository,
};
use std::collections::HashSet;

fn add<R: PersonRepository>(service: &GenealogyService<R>, first: &str) -> Person {
    service
        .add_person(NewPerson {
            last_name: "Family".to_string(),
            first_name: first.to_string(),
            middle_name: None,
            birth_date: NaiveDate::from_ymd_opt(1900, 1, 1).unwrap(),
            death_date: None,
            gender: Gender::Female,
        })
        .unwrap()
}

fn level_ids(levels: &[Vec<Person>]) -> Vec<HashSet<PersonId>> {
    levels
        .iter()
        .map(|level| level.iter().map(|person| person.id).collect())
        .collect()
}

/// Two grandparents, two children sharing them, one grandchild per child,
/// and a shared great-grandchild of both grandchildren.
struct Pedigree {
    grandma: Person,
    grandpa: Person,
    aunt: Person,
    mother: Person,
    cousin: Person,
    me: Person,
    baby: Person,
}

fn pedigree<R: PersonRepository>(service: &GenealogyService<R>) -> Pedigree {
    let family = Pedigree {
        grandma: add(service, "Grandma"),
        grandpa: add(service, "Grandpa"),
        aunt: add(service, "Aunt"),
        mother: add(service, "Mother"),
        cousin: add(service, "Cousin"),
        me: add(service, "Me"),
        baby: add(service, "Baby"),
    };
    for child in [&family.aunt, &family.mother] {
        service
            .link_parent_child(family.grandma.id, child.id)
            .unwrap();
        service
            .link_parent_child(family.grandpa.id, child.id)
            .unwrap();
    }
    service
        .link_parent_child(family.aunt.id, family.cousin.id)
        .unwrap();
    service
        .link_parent_child(family.mother.id, family.me.id)
        .unwrap();
    service
        .link_parent_child(family.cousin.id, family.baby.id)
        .unwrap();
    service
        .link_parent_child(family.me.id, family.baby.id)
        .unwrap();
    family
}

#[test]
fn ancestor_levels_group_generations_and_skip_duplicates() {
    let service = GenealogyService::new(InMemoryPersonRepository::new());
    let family = pedigree(&service);

    let levels = service.ancestor_levels(family.baby.id, 10).unwrap();

    assert_eq!(
        level_ids(&levels),
        vec![
            HashSet::from([family.baby.id]),
            HashSet::from([family.cousin.id, family.me.id]),
            HashSet::from([family.aunt.id, family.mother.id]),
            HashSet::from([family.grandma.id, family.grandpa.id]),
        ]
    );
    assert_eq!(levels[3].len(), 2, "shared grandparents appear once");
}

#[test]
fn descendant_levels_place_shared_descendant_once() {
    let conn = open_db_in_memory().unwrap();
    let service = GenealogyService::new(SqlitePersonRepository::try_new(&conn).unwrap());
    let family = pedigree(&service);

    let levels = service.descendant_levels(family.grandma.id, 10).unwrap();

    assert_eq!(
        level_ids(&levels),
        vec![
            HashSet::from([family.grandma.id]),
            HashSet::from([family.aunt.id, family.mother.id]),
            HashSet::from([family.cousin.id, family.me.id]),
            HashSet::from([family.baby.id]),
        ]
    );
}

#[test]
fn max_depth_bounds_number_of_levels() {
    let service = GenealogyService::new(InMemoryPersonRepository::new());
    let family = pedigree(&service);

    let levels = service.descendant_levels(family.grandpa.id, 1).unwrap();
    assert_eq!(levels.len(), 2);

    let levels = service.ancestor_levels(family.baby.id, 0).unwrap();
    assert_eq!(level_ids(&levels), vec![HashSet::from([family.baby.id])]);
}

#[test]
fn leaf_root_has_no_trailing_empty_level() {
    let service = GenealogyService::new(InMemoryPersonRepository::new());
    let family = pedigree(&service);

    let levels = service.descendant_levels(family.baby.id, 10).unwrap();
    assert_eq!(levels.len(), 1);
    assert!(levels.iter().all(|level| !level.is_empty()));
}

#[test]
fn missing_root_yields_no_levels() {
    let service = GenealogyService::new(InMemoryPersonRepository::new());

    assert!(service
        .ancestor_levels(uuid::Uuid::new_v4(), 5)
        .unwrap()
        .is_empty());
}

#[test]
fn relationship_cycle_terminates_within_depth_bound() {
    let service = GenealogyService::new(InMemoryPersonRepository::new());
    let a = add(&service, "A");
    let b = add(&service, "B");
    let c = add(&service, "C");
    service.link_parent_child(a.id, b.id).unwrap();
    service.link_parent_child(b.id, c.id).unwrap();
    service.link_parent_child(c.id, a.id).unwrap();

    for depth in [0, 1, 2, 5, 100] {
        let levels = service.descendant_levels(a.id, depth).unwrap();
        assert!(levels.len() <= depth + 1);
        let total: usize = levels.iter().map(Vec::len).sum();
        assert!(total <= 3);
    }

    let levels = service.descendant_levels(a.id, 100).unwrap();
    assert_eq!(
        level_ids(&levels),
        vec![
            HashSet::from([a.id]),
            HashSet::from([b.id]),
            HashSet::from([c.id]),
        ]
    );
}

#[test]
fn traversal_reads_fresh_relationship_state() {
    let service = GenealogyService::new(InMemoryPersonRepository::new());
    let family = pedigree(&service);

    service
        .unlink_parent_child(family.mother.id, family.me.id)
        .unwrap();
    let levels = service.ancestor_levels(family.me.id, 10).unwrap();
    assert_eq!(levels.len(), 1);
}
