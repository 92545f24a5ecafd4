use async_trait::async_trait;
use std::sync::Mutex;

use jpa_sampler::java_source::FileSourceLocator;
use jpa_sampler::sampler::{
    ProcessReport, RepositoryProcessor, SampleExecutor, SampleResult, SamplerError, Session,
};
use jpa_sampler::sql_generator::Dialect;
use jpa_sampler::translator::{TenantScope, TranslatedQuery};

use super::common::{source_tree, REPOSITORY};

/// Records every executed statement and answers with one fixed row. Statements
/// containing `LIMIT` fail, standing in for a database error.
#[derive(Default)]
struct RecordingExecutor {
    executed: Mutex<Vec<(String, usize)>>,
}

#[async_trait]
impl SampleExecutor for RecordingExecutor {
    async fn sample(&self, query: &TranslatedQuery) -> Result<SampleResult, SamplerError> {
        self.executed
            .lock()
            .unwrap()
            .push((query.executable_sql.clone(), query.placeholder_count));
        if query.executable_sql.contains("LIMIT") {
            return Err(SamplerError::Execution("syntax error at or near \"LIMIT\"".to_string()));
        }
        Ok(SampleResult {
            columns: vec!["id".to_string(), "hospital_id".to_string()],
            rows: vec![vec!["1".to_string(), "59".to_string()]],
        })
    }
}

/// Delegates to a shared recorder so the test can inspect it afterwards.
struct SharedExecutor(std::sync::Arc<RecordingExecutor>);

#[async_trait]
impl SampleExecutor for SharedExecutor {
    async fn sample(&self, query: &TranslatedQuery) -> Result<SampleResult, SamplerError> {
        self.0.sample(query).await
    }
}

fn markers() -> Vec<String> {
    vec!["JpaRepository".to_string()]
}

#[tokio::test]
async fn test_process_with_executor() {
    let dir = source_tree();
    let locator = FileSourceLocator::new(dir.path());
    let recorder = std::sync::Arc::new(RecordingExecutor::default());
    let session = Session::with_executor(
        Dialect::Generic,
        Box::new(SharedExecutor(recorder.clone())),
    );
    let processor = RepositoryProcessor::new(&locator, &session, markers(), TenantScope::default());

    let mut out = Vec::new();
    let report = processor.process_into(REPOSITORY, &mut out).await.unwrap();

    assert_eq!(
        report,
        ProcessReport {
            translated: 4,
            unparsable: 1,
            untranslatable: 0,
            sampled: 3,
            failed: 1,
            unresolved_joins: 0,
        }
    );

    let executed = recorder.executed.lock().unwrap().clone();
    assert_eq!(executed.len(), 4);
    assert_eq!(
        executed[0],
        (
            "SELECT * FROM discharge_detail d WHERE d.hospital_id = 59 AND '1' = '1'".to_string(),
            0
        )
    );

    let output = String::from_utf8(out).unwrap();
    assert!(output.starts_with(
        "findByPatient\n\tSELECT * FROM discharge_detail d WHERE d.hospital_id = 59 AND '1' = '1'\nid\thospital_id\n1\t59\n"
    ));
    assert!(output.contains("nativeSample\n\tSELECT * FROM discharge_detail WHERE hospital_id = 59 LIMIT 5\n"));
    assert!(!output.contains("broken"));
}

#[tokio::test]
async fn test_process_translate_only() {
    let dir = source_tree();
    let locator = FileSourceLocator::new(dir.path());
    let session = Session::translate_only(Dialect::Oracle);
    let processor = RepositoryProcessor::new(&locator, &session, markers(), TenantScope::default());

    let mut out = Vec::new();
    let report = processor
        .process_into(&format!("{}.java", REPOSITORY), &mut out)
        .await
        .unwrap();

    assert_eq!(report.translated, 4);
    assert_eq!(report.sampled, 0);
    assert_eq!(report.failed, 0);

    let output = String::from_utf8(out).unwrap();
    let lines: Vec<&str> = output.lines().collect();
    assert_eq!(lines.len(), 8);
    assert_eq!(lines[0], "findByPatient");
    assert_eq!(lines[6], "withNotes");
}

#[tokio::test]
async fn test_missing_entity_is_fatal() {
    let dir = source_tree();
    let locator = FileSourceLocator::new(dir.path());
    let session = Session::translate_only(Dialect::Generic);
    let processor = RepositoryProcessor::new(&locator, &session, markers(), TenantScope::default());

    let mut out = Vec::new();
    let err = processor
        .process_into("com.acme.ehr.dao.OrphanRepository", &mut out)
        .await
        .unwrap_err();
    assert!(matches!(err, SamplerError::Catalog(_)));
    assert!(out.is_empty());
}

#[tokio::test]
async fn test_custom_tenant_columns() {
    let dir = source_tree();
    let locator = FileSourceLocator::new(dir.path());
    let session = Session::translate_only(Dialect::Generic);
    let tenants = TenantScope::new(vec![jpa_sampler::translator::TenantColumn::new("patientId", 7)]);
    let processor = RepositoryProcessor::new(&locator, &session, markers(), tenants);

    let mut out = Vec::new();
    processor.process_into(REPOSITORY, &mut out).await.unwrap();
    let output = String::from_utf8(out).unwrap();
    assert!(output.contains("WHERE '1' = '1' AND d.patient_id = 7"));
}
