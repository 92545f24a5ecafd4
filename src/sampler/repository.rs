use std::fmt;
use std::io::Write;

use crate::java_source::SourceLocator;
use crate::translator::{TenantScope, TranslationError, Translator};

use super::errors::SamplerError;
use super::session::Session;
use super::source_query::declared_queries;

/// Per-repository outcome counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProcessReport {
    pub translated: usize,
    pub unparsable: usize,
    pub untranslatable: usize,
    pub sampled: usize,
    pub failed: usize,
    pub unresolved_joins: usize,
}

impl fmt::Display for ProcessReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} translated, {} unparsable, {} untranslatable, {} sampled, {} failed, {} unresolved joins",
            self.translated,
            self.unparsable,
            self.untranslatable,
            self.sampled,
            self.failed,
            self.unresolved_joins
        )
    }
}

/// Translates and samples every `@Query` of a repository interface.
pub struct RepositoryProcessor<'a> {
    locator: &'a dyn SourceLocator,
    session: &'a Session,
    markers: Vec<String>,
    tenants: TenantScope,
}

impl<'a> RepositoryProcessor<'a> {
    pub fn new(
        locator: &'a dyn SourceLocator,
        session: &'a Session,
        markers: Vec<String>,
        tenants: TenantScope,
    ) -> Self {
        RepositoryProcessor {
            locator,
            session,
            markers,
            tenants,
        }
    }

    /// Writes results to stdout.
    pub async fn process(&self, repository: &str) -> Result<ProcessReport, SamplerError> {
        let mut out = std::io::stdout();
        self.process_into(repository, &mut out).await
    }

    /// Metadata failures abort the repository; parse and execution failures
    /// are logged and the remaining queries still run.
    pub async fn process_into<W: Write + Send>(
        &self,
        repository: &str,
        out: &mut W,
    ) -> Result<ProcessReport, SamplerError> {
        let repository = repository.strip_suffix(".java").unwrap_or(repository);
        let mut translator = Translator::new(self.locator, self.tenants.clone(), self.session.dialect());
        let definition = translator
            .resolver()
            .resolve_repository(repository, &self.markers)?;
        let queries = declared_queries(&definition.declaration);
        log::info!(
            "{}: {} declared queries on {}",
            definition.declaration.name,
            queries.len(),
            definition.entity.type_name
        );

        let mut report = ProcessReport::default();
        for query in &queries {
            log::debug!(
                "{} ({})",
                query.method,
                if query.is_native { "native" } else { "JPQL" }
            );

            let translated = match translator.translate(&query.text, &definition.entity) {
                Ok(translated) => translated,
                Err(e) if e.is_fatal() => return Err(e.into()),
                Err(TranslationError::Parse(e)) => {
                    report.unparsable += 1;
                    log::error!("\tUnparsable: {}", query.text);
                    log::debug!("\t{}", e);
                    continue;
                }
                Err(e) => {
                    report.untranslatable += 1;
                    log::error!("\tUntranslatable: {} ({})", query.text, e);
                    continue;
                }
            };

            report.translated += 1;
            report.unresolved_joins += translated.unresolved_joins;
            for discarded in &translated.discarded {
                log::debug!("\tDropped predicate on {}", discarded);
            }
            writeln!(out, "{}\n\t{}", query.method, translated.sql_text)?;

            let Some(executor) = self.session.executor() else {
                continue;
            };
            match executor.sample(&translated).await {
                Ok(result) => {
                    report.sampled += 1;
                    result.write_to(out)?;
                }
                Err(e) => {
                    report.failed += 1;
                    log::error!("\tSQL Error: {}", e);
                }
            }
        }

        Ok(report)
    }
}
