use jpa_sampler::entity_catalog::EntityCatalogError;
use jpa_sampler::java_source::FileSourceLocator;
use jpa_sampler::sampler::declared_queries;
use jpa_sampler::sql_generator::Dialect;
use jpa_sampler::translator::{TenantScope, TranslatedQuery, TranslationError, Translator};

use super::common::{source_tree, REPOSITORY};

fn markers() -> Vec<String> {
    vec!["JpaRepository".to_string()]
}

/// Translates every declared query of the fixture repository in source order.
fn translate_all(dialect: Dialect) -> Vec<(String, Result<TranslatedQuery, TranslationError>)> {
    let dir = source_tree();
    let locator = FileSourceLocator::new(dir.path());
    let mut translator = Translator::new(&locator, TenantScope::default(), dialect);
    let repository = translator
        .resolver()
        .resolve_repository(REPOSITORY, &markers())
        .unwrap();

    declared_queries(&repository.declaration)
        .into_iter()
        .map(|query| {
            let result = translator.translate(&query.text, &repository.entity);
            (query.method, result)
        })
        .collect()
}

fn sql_for(results: &[(String, Result<TranslatedQuery, TranslationError>)], method: &str) -> String {
    results
        .iter()
        .find(|(m, _)| m == method)
        .and_then(|(_, r)| r.as_ref().ok())
        .map(|t| t.sql_text.clone())
        .unwrap_or_else(|| panic!("no translation for {}", method))
}

#[test]
fn test_queries_come_in_source_order() {
    let methods: Vec<String> = translate_all(Dialect::Generic)
        .into_iter()
        .map(|(method, _)| method)
        .collect();
    assert_eq!(
        methods,
        vec![
            "findByPatient",
            "findByRequestStatus",
            "nativeSample",
            "broken",
            "withNotes"
        ]
    );
}

#[test]
fn test_tenant_scoped_lookup() {
    let results = translate_all(Dialect::Generic);
    assert_eq!(
        sql_for(&results, "findByPatient"),
        "SELECT * FROM discharge_detail d WHERE d.hospital_id = 59 AND '1' = '1'"
    );
}

#[test]
fn test_relationship_join() {
    let results = translate_all(Dialect::Generic);
    assert_eq!(
        sql_for(&results, "findByRequestStatus"),
        "SELECT * FROM discharge_detail d JOIN \"DischargeNurseRequest\" n ON d.nurse_request_id = n.id WHERE '1' = '1'"
    );
}

#[test]
fn test_inverse_relationship_join() {
    let results = translate_all(Dialect::Generic);
    assert_eq!(
        sql_for(&results, "withNotes"),
        "SELECT * FROM discharge_detail d JOIN discharge_note x ON d.id = x.detail_id WHERE d.is_active = TRUE"
    );
}

#[test]
fn test_native_query_keeps_tenant_filter() {
    let results = translate_all(Dialect::Generic);
    assert_eq!(
        sql_for(&results, "nativeSample"),
        "SELECT * FROM discharge_detail WHERE hospital_id = 59 LIMIT 5"
    );
}

#[test]
fn test_broken_query_is_a_parse_error() {
    let results = translate_all(Dialect::Generic);
    let (_, broken) = results.iter().find(|(m, _)| m == "broken").unwrap();
    let err = broken.as_ref().unwrap_err();
    assert!(matches!(err, TranslationError::Parse(_)));
    assert!(!err.is_fatal());
}

#[test]
fn test_oracle_output() {
    let results = translate_all(Dialect::Oracle);
    let with_notes = results
        .iter()
        .find(|(m, _)| m == "withNotes")
        .and_then(|(_, r)| r.as_ref().ok())
        .unwrap();
    assert_eq!(
        with_notes.executable_sql,
        "SELECT * FROM discharge_detail d JOIN discharge_note x ON d.id = x.detail_id WHERE d.is_active = 1"
    );

    let join = results
        .iter()
        .find(|(m, _)| m == "findByRequestStatus")
        .and_then(|(_, r)| r.as_ref().ok())
        .unwrap();
    assert!(!join.executable_sql.contains('"'));
    assert!(join.executable_sql.contains("JOIN DischargeNurseRequest n"));
}

#[test]
fn test_placeholder_count_matches_executable_sql() {
    for (method, result) in translate_all(Dialect::Generic) {
        if let Ok(translated) = result {
            assert_eq!(
                translated.placeholder_count,
                translated.executable_sql.matches('?').count(),
                "placeholder count mismatch for {}",
                method
            );
        }
    }
}

#[test]
fn test_translation_is_deterministic() {
    let first = translate_all(Dialect::Oracle);
    let second = translate_all(Dialect::Oracle);
    assert_eq!(first, second);
}

#[test]
fn test_missing_entity_source() {
    let dir = source_tree();
    let locator = FileSourceLocator::new(dir.path());
    let mut translator = Translator::new(&locator, TenantScope::default(), Dialect::Generic);
    let err = translator
        .resolver()
        .resolve_repository("com.acme.ehr.dao.OrphanRepository", &markers())
        .unwrap_err();
    assert!(matches!(
        err,
        EntityCatalogError::MetadataNotFound { ref type_name, .. } if type_name == "Missing"
    ));
}
