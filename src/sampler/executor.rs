use async_trait::async_trait;
use std::io::Write;

use crate::translator::TranslatedQuery;

use super::errors::SamplerError;

/// Column names and stringified rows of one sampled query.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SampleResult {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl SampleResult {
    /// Tab separated header followed by one line per row.
    pub fn write_to<W: Write>(&self, out: &mut W) -> std::io::Result<()> {
        writeln!(out, "{}", self.columns.join("\t"))?;
        for row in &self.rows {
            writeln!(out, "{}", row.join("\t"))?;
        }
        Ok(())
    }
}

/// Runs translated queries against a live database.
#[async_trait]
pub trait SampleExecutor: Send + Sync {
    async fn sample(&self, query: &TranslatedQuery) -> Result<SampleResult, SamplerError>;
}
