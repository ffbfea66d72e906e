//! End-to-end checks against the shipped `search_config.json`.

use sea_query::{Alias, Expr, SimpleExpr};
use talent_query::{EngineConfig, Matcher, QueryError, SearchEngine};

fn engine() -> SearchEngine {
    let config =
        EngineConfig::from_json_file(concat!(env!("CARGO_MANIFEST_DIR"), "/search_config.json"))
            .unwrap();
    SearchEngine::new(config).unwrap()
}

#[test]
fn test_shipped_config_is_valid() {
    let engine = engine();
    let registry = engine.registry();
    assert_eq!(registry.main_table, "candidates");
    assert_eq!(registry.id_column, "id");
    assert_eq!(registry.default_targets.len(), 6);
    for alias in [
        "firstname", "lastname", "name", "title", "city", "country", "skill", "skills",
        "language", "languages", "experience",
    ] {
        assert!(registry.is_registered(alias), "{alias} should be registered");
    }
    assert!(engine.config().implicit_and);
    assert_eq!(engine.config().limits.max_length, 512);
}

#[test]
fn test_unscoped_term_searches_every_default_column() {
    let filter = engine().build_where("python").unwrap().unwrap();
    assert_eq!(filter.params.len(), 6);
    assert!(filter.ordered_values().iter().all(|v| *v == "%python%"));
    for column in ["first_name", "last_name", "professional_title", "presentation", "city", "country"] {
        assert!(filter.sql.contains(&format!("candidates.\"{column}\" ILIKE")));
    }
}

#[test]
fn test_name_matches_first_or_last_name() {
    let filter = engine().build_where("name:dupont").unwrap().unwrap();
    assert_eq!(
        filter.sql,
        r#"(candidates."first_name" ILIKE :p0 OR candidates."last_name" ILIKE :p1)"#
    );
}

#[test]
fn test_recruiter_query() {
    let filter = engine()
        .build_where(r#"skill:python city:"Le Mans" -languages:german"#)
        .unwrap()
        .unwrap();
    assert_eq!(
        filter.sql,
        concat!(
            r#"(EXISTS (SELECT 1 FROM skill skill_p0 WHERE skill_p0."candidate_id" = candidates."id" AND skill_p0."name" ILIKE :p0)"#,
            r#" AND candidates."city" ILIKE :p1"#,
            r#" AND (NOT EXISTS (SELECT 1 FROM language language_p2 WHERE language_p2."candidate_id" = candidates."id" AND language_p2."language" ILIKE :p2)))"#,
        )
    );
    assert_eq!(filter.ordered_values(), vec!["%python%", "%Le Mans%", "%german%"]);
}

#[test]
fn test_experience_spans_three_columns() {
    let filter = engine().build_where("experience:(backend OR devops*)").unwrap().unwrap();
    assert_eq!(filter.params.len(), 6);
    assert_eq!(filter.param("p3"), Some("devops%"));
    assert_eq!(filter.sql.matches("FROM experience experience_p").count(), 6);
    assert!(filter.sql.contains(r#"experience_p2."description" ILIKE :p2"#));
}

#[test]
fn test_positional_statement() {
    let engine = engine();
    let filter = engine.build_where("skill:rust OR title:cto").unwrap().unwrap();
    let (sql, values) = filter.to_positional();
    assert!(sql.contains("ILIKE $1"));
    assert!(sql.contains("ILIKE $2"));
    assert!(!sql.contains(":p"));
    assert_eq!(values.0.len(), 2);

    let select = filter.select_statement(engine.registry());
    assert!(select.starts_with(r#"SELECT * FROM "candidates" WHERE"#));
}

#[test]
fn test_rejected_queries() {
    let engine = engine();
    for query in ["(python", "python)", "AND python", "skill:", "\"open"] {
        let err = engine.build_where(query).unwrap_err();
        assert!(err.is_user_error(), "{query}: {err}");
    }

    let long = "a".repeat(513);
    assert!(matches!(engine.build_where(&long), Err(QueryError::Limit(_))));
}

#[test]
fn test_predicate_over_profiles() {
    let engine = engine();
    let factory = |term: &str| {
        let term = term.to_lowercase();
        Some(Matcher::<str>::new(move |profile| profile.to_lowercase().contains(term.as_str())))
    };

    let matcher = engine
        .build_predicate("rust (lyon OR paris) -intern", factory)
        .unwrap()
        .unwrap();
    assert!(matcher.matches("Senior Rust developer, Lyon"));
    assert!(!matcher.matches("Rust intern, Paris"));
    assert!(!matcher.matches("Go developer, Lyon"));
}

#[test]
fn test_predicate_as_sea_query_expression() {
    let expr = engine()
        .build_predicate("python OR go", |term| {
            Some::<SimpleExpr>(Expr::col(Alias::new("professional_title")).like(format!("%{term}%")))
        })
        .unwrap();
    assert!(expr.is_some());
    assert_eq!(engine().build_predicate::<SimpleExpr, _>("  ", |_| None).unwrap(), None);
}
