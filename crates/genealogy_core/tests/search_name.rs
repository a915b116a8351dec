use genealogy_core::db::open_db_in_memory;
use genealogy_core::{
    search_by_name, Gender, InMemoryPersonRepository, Person, PersonRepository,
    SqlitePersonRepository,
};

fn store(repo: &dyn PersonRepository, last: &str, first: &str, middle: Option<&str>) -> Person {
    let mut person = Person::new(last, first, Gender::Male);
    person.middle_name = middle.map(str::to_string);
    repo.put_person(&person).unwrap();
    person
}

#[test]
fn search_is_case_insensitive_substring() {
    let repo = InMemoryPersonRepository::new();
    let ivanov = store(&repo, "Ivanov", "Ivan", None);
    store(&repo, "Petrov", "Petr", None);

    let hits = search_by_name(&repo, "ivan").unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].id, ivanov.id);

    let hits = search_by_name(&repo, "OV IV").unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].id, ivanov.id);
}

#[test]
fn search_matches_middle_name_and_non_ascii_case() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqlitePersonRepository::try_new(&conn).unwrap();
    let person = store(&repo, "Смирнова", "Мария", Some("Петровна"));
    store(&repo, "Smirnov", "Pavel", None);

    let hits = search_by_name(&repo, "ПЕТРОВНА").unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].id, person.id);

    assert!(search_by_name(&repo, "Aldar").unwrap().is_empty());
}

#[test]
fn empty_query_returns_everyone_sorted_by_last_then_first_name() {
    let repo = InMemoryPersonRepository::new();
    let zaitsev = store(&repo, "Zaitsev", "Boris", None);
    let abramov_b = store(&repo, "Abramov", "Yuri", None);
    let abramov_a = store(&repo, "Abramov", "Anton", None);

    let ids: Vec<_> = search_by_name(&repo, "")
        .unwrap()
        .into_iter()
        .map(|person| person.id)
        .collect();

    assert_eq!(ids, vec![abramov_a.id, abramov_b.id, zaitsev.id]);
}

#[test]
fn identical_names_are_ordered_by_id() {
    let repo = InMemoryPersonRepository::new();
    let first = store(&repo, "Same", "Name", None);
    let second = store(&repo, "Same", "Name", None);

    let hits = search_by_name(&repo, "same").unwrap();
    let mut expected = vec![first.id, second.id];
    expected.sort();
    assert_eq!(
        hits.into_iter().map(|person| person.id).collect::<Vec<_>>(),
        expected
    );
}
