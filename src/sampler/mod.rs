//! Runs translated repository queries against a live database and prints a
//! preview of their rows.

pub mod errors;
pub mod executor;
pub mod postgres;
pub mod repository;
pub mod session;
pub mod source_query;

pub use errors::SamplerError;
pub use executor::{SampleExecutor, SampleResult};
pub use postgres::PostgresExecutor;
pub use repository::{ProcessReport, RepositoryProcessor};
pub use session::Session;
pub use source_query::{declared_queries, SourceQuery};
