use chrono::NaiveDate;
use genealogy_core::db::open_db_in_memory;
use genealogy_core::{
    GenealogyService, Gender, InMemoryPersonRepository, KinshipEdge, NewPerson, Person,
    PersonRepository, SqlitePersonRepository,
};

fn add<R: PersonRepository>(service: &GenealogyService<R>, first: &str) -> Person {
    service
        .add_person(NewPerson {
            last_name: "Kin".to_string(),
            first_name: first.to_string(),
            middle_name: None,
            birth_date: NaiveDate::from_ymd_opt(1950, 6, 1).unwrap(),
            death_date: None,
            gender: Gender::Male,
        })
        .unwrap()
}

fn chain<R: PersonRepository>(service: &GenealogyService<R>) -> [Person; 4] {
    let a = add(service, "A");
    let b = add(service, "B");
    let c = add(service, "C");
    let d = add(service, "D");
    service.link_parent_child(a.id, b.id).unwrap();
    service.link_parent_child(b.id, c.id).unwrap();
    service.link_parent_child(c.id, d.id).unwrap();
    [a, b, c, d]
}

#[test]
fn linear_chain_path_has_three_edges() {
    let conn = open_db_in_memory().unwrap();
    let service = GenealogyService::new(SqlitePersonRepository::try_new(&conn).unwrap());
    let [a, b, c, d] = chain(&service);

    let path = service.shortest_path(a.id, d.id).unwrap().unwrap();

    assert_eq!(path.people.len(), 4);
    assert_eq!(path.edge_count(), 3);
    assert_eq!(path.ids(), vec![a.id, b.id, c.id, d.id]);
    assert_eq!(path.edges, vec![KinshipEdge::Child; 3]);
    assert!(service.is_related(a.id, d.id).unwrap());

    let reverse = service.shortest_path(d.id, a.id).unwrap().unwrap();
    assert_eq!(reverse.edges, vec![KinshipEdge::Parent; 3]);
}

#[test]
fn unrelated_person_is_not_found() {
    let service = GenealogyService::new(InMemoryPersonRepository::new());
    let [a, ..] = chain(&service);
    let stranger = add(&service, "Stranger");

    assert!(service.shortest_path(a.id, stranger.id).unwrap().is_none());
    assert!(!service.is_related(a.id, stranger.id).unwrap());
}

#[test]
fn same_person_path_is_single_node_when_present() {
    let service = GenealogyService::new(InMemoryPersonRepository::new());
    let [a, ..] = chain(&service);

    let path = service.shortest_path(a.id, a.id).unwrap().unwrap();
    assert_eq!(path.ids(), vec![a.id]);
    assert_eq!(path.edge_count(), 0);

    let missing = uuid::Uuid::new_v4();
    assert!(service.shortest_path(missing, missing).unwrap().is_none());
    assert!(service.shortest_path(a.id, missing).unwrap().is_none());
    assert!(service.shortest_path(missing, a.id).unwrap().is_none());
}

#[test]
fn spouse_edge_connects_in_laws() {
    let service = GenealogyService::new(InMemoryPersonRepository::new());
    let husband_father = add(&service, "HusbandFather");
    let husband = add(&service, "Husband");
    let wife = add(&service, "Wife");
    let wife_mother = add(&service, "WifeMother");
    service
        .link_parent_child(husband_father.id, husband.id)
        .unwrap();
    service.link_parent_child(wife_mother.id, wife.id).unwrap();
    service.link_spouses(husband.id, wife.id).unwrap();

    let path = service
        .shortest_path(husband_father.id, wife_mother.id)
        .unwrap()
        .unwrap();

    assert_eq!(
        path.ids(),
        vec![husband_father.id, husband.id, wife.id, wife_mother.id]
    );
    assert_eq!(
        path.edges,
        vec![KinshipEdge::Child, KinshipEdge::Spouse, KinshipEdge::Parent]
    );
}

#[test]
fn shortest_of_several_routes_is_chosen() {
    let service = GenealogyService::new(InMemoryPersonRepository::new());
    let [a, b, c, d] = chain(&service);
    let shortcut = add(&service, "Shortcut");
    service.link_parent_child(shortcut.id, a.id).unwrap();
    service.link_parent_child(shortcut.id, d.id).unwrap();

    let path = service.shortest_path(a.id, d.id).unwrap().unwrap();

    assert_eq!(path.edge_count(), 2);
    assert_eq!(path.start().map(|person| person.id), Some(a.id));
    assert_eq!(path.end().map(|person| person.id), Some(d.id));
    assert!(!path.ids().contains(&b.id));
    assert!(!path.ids().contains(&c.id));
}

#[test]
fn equal_length_paths_only_guarantee_length_and_endpoints() {
    let service = GenealogyService::new(InMemoryPersonRepository::new());
    let father = add(&service, "Father");
    let mother = add(&service, "Mother");
    let first = add(&service, "First");
    let second = add(&service, "Second");
    for parent in [&father, &mother] {
        service.link_parent_child(parent.id, first.id).unwrap();
        service.link_parent_child(parent.id, second.id).unwrap();
    }

    let path = service.shortest_path(first.id, second.id).unwrap().unwrap();

    assert_eq!(path.edge_count(), 2);
    assert_eq!(path.people[0].id, first.id);
    assert_eq!(path.people[2].id, second.id);
    assert!([father.id, mother.id].contains(&path.people[1].id));
}

#[test]
fn cycle_does_not_trap_search() {
    let service = GenealogyService::new(InMemoryPersonRepository::new());
    let [a, _, _, d] = chain(&service);
    service.link_parent_child(d.id, a.id).unwrap();
    let stranger = add(&service, "Stranger");

    assert_eq!(
        service.shortest_path(a.id, d.id).unwrap().unwrap().edge_count(),
        1
    );
    assert!(service.shortest_path(a.id, stranger.id).unwrap().is_none());
}
