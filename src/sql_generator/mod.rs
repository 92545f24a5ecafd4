pub mod dialect;
pub mod to_sql;

pub use dialect::{Dialect, NormalizedSql};
pub use to_sql::ToSql;
