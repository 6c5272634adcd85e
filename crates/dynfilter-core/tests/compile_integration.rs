//! Integration tests for condition compilation.

use std::sync::Arc;

use chrono::{NaiveDate, NaiveDateTime};
use dynfilter_core::{
    CompilerConfig, Entity, EntityDef, Error, Predicate, QueryCompiler, TypeRegistry,
};
use dynfilter_proto::{QueryCondition, QueryOperator};
use pretty_assertions::assert_eq;
use rust_decimal::Decimal;
use uuid::Uuid;

struct Address {
    city: String,
    zip: Option<String>,
}

struct Person {
    name: Option<String>,
    age: i32,
    address: Option<Address>,
}

struct Employee {
    person: Person,
    id: Uuid,
    hired_at: NaiveDateTime,
    salary: Decimal,
    active: bool,
    rating: Option<f64>,
}

impl Entity for Address {
    fn describe() -> EntityDef {
        EntityDef::builder::<Address>("Address")
            .field("City", |a| &a.city)
            .field("Zip", |a| &a.zip)
            .build()
    }
}

impl Entity for Person {
    fn describe() -> EntityDef {
        EntityDef::builder::<Person>("Person")
            .field("Name", |p| &p.name)
            .field("Age", |p| &p.age)
            .optional_embedded("Address", |p| p.address.as_ref())
            .build()
    }
}

impl Entity for Employee {
    fn describe() -> EntityDef {
        EntityDef::builder::<Employee>("Employee")
            .extends(|e| &e.person)
            .field("Id", |e| &e.id)
            .field("HiredAt", |e| &e.hired_at)
            .field("Salary", |e| &e.salary)
            .field("Active", |e| &e.active)
            .field("Rating", |e| &e.rating)
            .build()
    }
}

fn person(name: Option<&str>, age: i32, city: Option<&str>) -> Person {
    Person {
        name: name.map(Into::into),
        age,
        address: city.map(|c| Address {
            city: c.into(),
            zip: None,
        }),
    }
}

fn employee(name: &str, age: i32, hired: (i32, u32, u32), salary: i64) -> Employee {
    Employee {
        person: person(Some(name), age, Some("NYC")),
        id: Uuid::from_u128(age as u128),
        hired_at: NaiveDate::from_ymd_opt(hired.0, hired.1, hired.2)
            .unwrap()
            .and_hms_opt(9, 0, 0)
            .unwrap(),
        salary: Decimal::new(salary, 2),
        active: age % 2 == 0,
        rating: None,
    }
}

fn compiler() -> QueryCompiler {
    QueryCompiler::new(CompilerConfig::default()).with_registry(Arc::new(TypeRegistry::new()))
}

fn compile<T: Entity>(conditions: &[QueryCondition]) -> Predicate<T> {
    compiler().compile::<T>(conditions).unwrap()
}

#[test]
fn test_end_to_end_match() {
    let predicate = compile::<Person>(&[
        QueryCondition::contains("Name", "John"),
        QueryCondition::equal("Address.City", "NYC").not_null(),
    ]);

    assert!(predicate.matches(&person(Some("Johnathan"), 24, Some("NYC"))));
    assert!(!predicate.matches(&person(Some("Johnathan"), 24, Some("LA"))));
    assert!(!predicate.matches(&person(None, 24, Some("NYC"))));
    // Ordinal substring: no "John" in "Jonathan".
    assert!(!predicate.matches(&person(Some("Jonathan"), 24, Some("NYC"))));

    assert_eq!(
        predicate.to_string(),
        "(Name != null AND Name.Contains(\"John\")) AND Address.City == \"NYC\""
    );
}

#[test]
fn test_end_to_end_range_miss() {
    let predicate = compile::<Person>(&[QueryCondition::between("Age", "18", "20").not_null()]);
    assert!(!predicate.matches(&person(Some("Jonathan"), 24, Some("NYC"))));
    assert!(predicate.matches(&person(Some("Jonathan"), 19, Some("NYC"))));
}

#[test]
fn test_between_bounds_are_inclusive() {
    let predicate = compile::<Person>(&[QueryCondition::new("Age", QueryOperator::Between, "18|30")]);
    let results: Vec<(i32, bool)> = [17, 18, 24, 30, 31]
        .into_iter()
        .map(|age| (age, predicate.matches(&person(None, age, None))))
        .collect();
    assert_eq!(
        results,
        vec![(17, false), (18, true), (24, true), (30, true), (31, false)]
    );
}

#[test]
fn test_blank_only_lists_accept_everything() {
    let predicate = compile::<Person>(&[
        QueryCondition::equal("Name", ""),
        QueryCondition::without_value("Age", QueryOperator::Greater),
        QueryCondition::contains("Address.City", "   "),
    ]);
    assert!(predicate.is_identity());
    assert!(predicate.matches(&person(None, 0, None)));
}

#[test]
fn test_null_guard_on_text_match() {
    let guarded = compile::<Person>(&[QueryCondition::contains("Name", "John")]);
    assert!(!guarded.matches(&person(None, 30, None)));

    // The not-null promise is broken here; the result is still false.
    let unguarded = compile::<Person>(&[QueryCondition::contains("Name", "John").not_null()]);
    assert!(!unguarded.matches(&person(None, 30, None)));
    assert!(unguarded.matches(&person(Some("John"), 30, None)));
}

#[test]
fn test_null_intermediate_object() {
    let predicate = compile::<Person>(&[QueryCondition::not_equal("Address.City", "LA")]);
    // A missing address reads as a null city, which differs from "LA".
    assert!(predicate.matches(&person(None, 1, None)));

    let predicate = compile::<Person>(&[QueryCondition::starts_with("Address.Zip", "10")]);
    assert!(!predicate.matches(&person(None, 1, None)));
    assert!(!predicate.matches(&person(None, 1, Some("NYC"))));
}

#[test]
fn test_conjunction_is_order_independent() {
    let conditions = vec![
        QueryCondition::contains("Name", "a"),
        QueryCondition::new("Age", QueryOperator::GreaterEqual, "21"),
        QueryCondition::new("Address.City", QueryOperator::EndsWith, "C"),
    ];
    let reversed: Vec<_> = conditions.iter().rev().cloned().collect();

    let forward = compile::<Person>(&conditions);
    let backward = compile::<Person>(&reversed);

    let people = [
        person(Some("Anna"), 30, Some("NYC")),
        person(Some("Anna"), 20, Some("NYC")),
        person(Some("Bob"), 40, Some("NYC")),
        person(Some("Dana"), 21, Some("LA")),
        person(None, 50, Some("DC")),
        person(Some("Maria"), 22, None),
    ];
    for p in &people {
        assert_eq!(forward.matches(p), backward.matches(p));
    }
    assert_eq!(forward.filter(&people).count(), 1);
}

#[test]
fn test_bool_truthiness() {
    let staff = [employee("Ann", 30, (2020, 1, 1), 100), employee("Ben", 31, (2020, 1, 1), 100)];

    let active = compile::<Employee>(&[QueryCondition::equal("Active", "1")]);
    assert_eq!(active.filter(&staff).count(), 1);

    for raw in ["true", "0", "yes"] {
        let inactive = compile::<Employee>(&[QueryCondition::equal("Active", raw)]);
        let names: Vec<_> = inactive
            .filter(&staff)
            .map(|e| e.person.name.as_deref().unwrap_or_default())
            .collect();
        assert_eq!(names, vec!["Ben"], "raw value {raw:?}");
    }

    // An empty value is blank and contributes nothing.
    let blank = compile::<Employee>(&[QueryCondition::equal("Active", "")]);
    assert!(blank.is_identity());
}

#[test]
fn test_inherited_and_typed_fields() {
    let staff = [
        employee("Ann", 30, (2019, 6, 1), 550_000),
        employee("Ben", 41, (2021, 3, 15), 720_050),
        employee("Cat", 25, (2023, 11, 30), 480_000),
    ];

    let predicate = compile::<Employee>(&[
        QueryCondition::new("hiredat", QueryOperator::Between, "2020-01-01|2023-12-31"),
        QueryCondition::new("Salary", QueryOperator::GreaterEqual, "5000.00"),
        QueryCondition::contains("name", "e").not_null(),
    ]);
    let names: Vec<_> = predicate
        .filter(&staff)
        .map(|e| e.person.name.as_deref().unwrap_or_default())
        .collect();
    assert_eq!(names, vec!["Ben"]);

    let by_id = compile::<Employee>(&[QueryCondition::equal(
        "Id",
        Uuid::from_u128(25).hyphenated().to_string(),
    )]);
    assert_eq!(by_id.filter(&staff).count(), 1);

    let by_city = compile::<Employee>(&[QueryCondition::equal("ADDRESS.city", "NYC")]);
    assert_eq!(by_city.filter(&staff).count(), 3);
}

#[test]
fn test_nullable_float_ordering() {
    let mut rated = employee("Ann", 30, (2020, 1, 1), 100);
    rated.rating = Some(4.5);
    let unrated = employee("Ben", 31, (2020, 1, 1), 100);

    let predicate = compile::<Employee>(&[QueryCondition::greater("Rating", "4")]);
    assert!(predicate.matches(&rated));
    assert!(!predicate.matches(&unrated));
}

#[test]
fn test_unknown_path_fails() {
    let err = compiler()
        .compile::<Person>(&[QueryCondition::equal("Unknown.Path", "x")])
        .unwrap_err();
    match err {
        Error::FieldNotFound {
            entity,
            path,
            segment,
        } => {
            assert_eq!(entity, "Person");
            assert_eq!(path, "Unknown.Path");
            assert_eq!(segment, "Unknown");
        }
        other => panic!("Expected FieldNotFound, got {other:?}"),
    }
}

#[test]
fn test_error_kinds() {
    let c = compiler();

    assert!(matches!(
        c.compile::<Employee>(&[QueryCondition::greater("HiredAt", "someday")]),
        Err(Error::ValueParse { .. })
    ));
    assert!(matches!(
        c.compile::<Employee>(&[QueryCondition::new("Age", QueryOperator::Between, "18")]),
        Err(Error::ValueParse { .. })
    ));
    assert!(matches!(
        c.compile::<Employee>(&[QueryCondition::greater("Active", "1")]),
        Err(Error::UnsupportedOperator { .. })
    ));
    assert!(matches!(
        c.compile::<Employee>(&[QueryCondition::less("Id", "0")]),
        Err(Error::UnsupportedOperator { .. })
    ));
    assert!(matches!(
        c.compile::<Person>(&[QueryCondition::equal("Address", "x")]),
        Err(Error::UnsupportedOperator { .. })
    ));
}

#[test]
fn test_json_conditions() {
    let json = serde_json::json!([
        {"field": "Name", "operator": "StartsWith", "value": "Jo"},
        {"field": "Age", "operator": "LessEqual", "value": "40", "notNull": true},
        {"field": "Address.City", "operator": "Equal", "value": null}
    ])
    .to_string();

    let predicate = compiler().compile_json::<Person>(&json).unwrap();
    assert!(predicate.matches(&person(Some("Joe"), 40, None)));
    assert!(!predicate.matches(&person(Some("Joe"), 41, None)));
    assert_eq!(predicate.expr().leaf_count(), 3);
}

#[test]
fn test_compile_expr_for_dynamic_definition() {
    let registry = Arc::new(TypeRegistry::new());
    let compiler = QueryCompiler::new(CompilerConfig::default()).with_registry(Arc::clone(&registry));

    let entity = registry.entity::<Employee>();
    let expr = compiler
        .compile_expr(&entity, &[QueryCondition::equal("Address.City", "NYC")])
        .unwrap();

    let mut fields: Vec<_> = expr.fields().into_iter().collect();
    fields.sort_unstable();
    assert_eq!(fields, vec!["Address.City"]);
    assert!(expr.evaluate(&employee("Ann", 30, (2020, 1, 1), 1)));
    // A foreign type reads as null everywhere.
    assert!(!expr.evaluate(&person(Some("Ann"), 30, Some("NYC"))));
}

#[test]
fn test_in_on_embedded_entity_is_identity() {
    let predicate = compiler()
        .compile::<Person>(&[QueryCondition::new("Address", QueryOperator::In, "x")])
        .unwrap();
    assert!(predicate.is_identity());
    assert!(predicate.matches(&person(None, 30, None)));

    // Any other operator on an embedded entity is rejected.
    let err = compiler()
        .compile::<Person>(&[QueryCondition::equal("Address", "x")])
        .unwrap_err();
    assert!(matches!(err, Error::UnsupportedOperator { .. }));
}

#[test]
fn test_extra_datetime_formats_from_config() {
    let compiler = QueryCompiler::new(CompilerConfig::default().datetime_format("%d.%m.%Y %H:%M"))
        .with_registry(Arc::new(TypeRegistry::new()));
    let predicate = compiler
        .compile::<Employee>(&[QueryCondition::less("HiredAt", "01.01.2021 00:00")])
        .unwrap();
    assert!(predicate.matches(&employee("Ann", 30, (2020, 12, 31), 1)));
    assert!(!predicate.matches(&employee("Ann", 30, (2021, 1, 1), 1)));
}

#[test]
fn test_concurrent_compilation_converges() {
    let registry = Arc::new(TypeRegistry::new());
    let compiler = QueryCompiler::new(CompilerConfig::with_cache(16)).with_registry(registry);
    let conditions = vec![
        QueryCondition::contains("Name", "n"),
        QueryCondition::equal("Address.City", "NYC"),
    ];
    let staff: Vec<_> = (20..40)
        .map(|age| employee(if age % 3 == 0 { "Ann" } else { "Bo" }, age, (2020, 1, 1), 1))
        .collect();

    let counts: Vec<usize> = std::thread::scope(|scope| {
        let handles: Vec<_> = (0..8)
            .map(|_| {
                scope.spawn(|| {
                    let predicate = compiler.compile::<Employee>(&conditions).unwrap();
                    predicate.filter(&staff).count()
                })
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    let expected = staff.iter().filter(|e| e.person.age % 3 == 0).count();
    assert!(counts.iter().all(|&c| c == expected));
    assert_eq!(compiler.registry().len(), 3);
    assert_eq!(compiler.cached_len(), 1);
}

#[test]
fn test_predicates_are_shareable_across_threads() {
    let predicate = compile::<Person>(&[QueryCondition::greater("Age", "50")]);
    let people: Vec<_> = (45..56).map(|age| person(None, age, None)).collect();

    let matched: usize = std::thread::scope(|scope| {
        let handles: Vec<_> = people
            .chunks(4)
            .map(|chunk| {
                let predicate = predicate.clone();
                scope.spawn(move || predicate.filter(chunk).count())
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).sum()
    });
    assert_eq!(matched, 5);
}
