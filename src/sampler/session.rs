use crate::config::SamplerConfig;
use crate::sql_generator::Dialect;

use super::errors::SamplerError;
use super::executor::SampleExecutor;
use super::postgres::PostgresExecutor;

/// The database side of a run. Without an executor only translation happens.
pub struct Session {
    dialect: Dialect,
    executor: Option<Box<dyn SampleExecutor>>,
}

impl Session {
    pub fn translate_only(dialect: Dialect) -> Self {
        Session {
            dialect,
            executor: None,
        }
    }

    pub fn with_executor(dialect: Dialect, executor: Box<dyn SampleExecutor>) -> Self {
        Session {
            dialect,
            executor: Some(executor),
        }
    }

    /// Opens the configured database. Falls back to translate-only when no
    /// database is configured, `translate_only` is set or the dialect has no
    /// driver.
    pub async fn open(config: &SamplerConfig, translate_only: bool) -> Result<Self, SamplerError> {
        let Some(database) = &config.database else {
            log::info!("No database configured, translating only");
            return Ok(Session::translate_only(Dialect::Generic));
        };

        match Dialect::from_url(&database.url) {
            dialect if translate_only => Ok(Session::translate_only(dialect)),
            Dialect::Oracle => {
                log::warn!("{}, translating only", SamplerError::UnsupportedDialect(Dialect::Oracle));
                Ok(Session::translate_only(Dialect::Oracle))
            }
            Dialect::Generic => {
                let executor =
                    PostgresExecutor::connect(database, config.sample_rows, config.filler_value)
                        .await?;
                Ok(Session::with_executor(Dialect::Generic, Box::new(executor)))
            }
        }
    }

    pub fn dialect(&self) -> Dialect {
        self.dialect
    }

    pub fn executor(&self) -> Option<&dyn SampleExecutor> {
        self.executor.as_deref()
    }
}
