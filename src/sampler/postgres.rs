//! Sampling driver for the generic dialect, on `tokio-postgres`.

use async_trait::async_trait;
use futures_util::{pin_mut, TryStreamExt};
use tokio_postgres::types::{FromSql, ToSql, Type};
use tokio_postgres::{Client, Config, NoTls, Row};

use crate::config::DatabaseConfig;
use crate::sql_generator::Dialect;
use crate::translator::TranslatedQuery;

use super::errors::SamplerError;
use super::executor::{SampleExecutor, SampleResult};

pub struct PostgresExecutor {
    client: Client,
    sample_rows: usize,
    filler_value: i64,
}

impl PostgresExecutor {
    /// Connects and makes the configured schema current. JDBC-style URLs are
    /// accepted.
    pub async fn connect(
        database: &DatabaseConfig,
        sample_rows: usize,
        filler_value: i64,
    ) -> Result<Self, SamplerError> {
        let url = database.url.strip_prefix("jdbc:").unwrap_or(&database.url);
        let mut config: Config = url.parse().map_err(|e: tokio_postgres::Error| {
            SamplerError::InvalidUrl {
                url: database.url.clone(),
                message: e.to_string(),
            }
        })?;
        if let Some(user) = &database.user {
            config.user(user.as_str());
        }
        if let Some(password) = &database.password {
            config.password(password.as_str());
        }

        let (client, connection) = config
            .connect(NoTls)
            .await
            .map_err(|e| SamplerError::Connection(describe(&e)))?;
        tokio::spawn(async move {
            if let Err(e) = connection.await {
                log::error!("Database connection error: {}", e);
            }
        });
        log::info!("Connected to {}", url);

        if let Some(schema) = &database.schema {
            client
                .batch_execute(&Dialect::Generic.schema_switch_statement(schema))
                .await
                .map_err(|e| SamplerError::SchemaSwitch {
                    schema: schema.clone(),
                    message: describe(&e),
                })?;
            log::info!("Using schema {}", schema);
        }

        Ok(PostgresExecutor {
            client,
            sample_rows,
            filler_value,
        })
    }
}

#[async_trait]
impl SampleExecutor for PostgresExecutor {
    async fn sample(&self, query: &TranslatedQuery) -> Result<SampleResult, SamplerError> {
        let sql = renumber_placeholders(&query.executable_sql);
        let statement = self.client.prepare(&sql).await.map_err(execution)?;
        check_parameter_count(query.placeholder_count, statement.params().len())?;

        let params: Vec<Box<dyn ToSql + Sync + Send>> = statement
            .params()
            .iter()
            .map(|ty| filler_for(ty, self.filler_value))
            .collect();
        let columns = statement
            .columns()
            .iter()
            .map(|c| c.name().to_string())
            .collect();

        let stream = self
            .client
            .query_raw(
                &statement,
                params.iter().map(|p| p.as_ref() as &(dyn ToSql + Sync)),
            )
            .await
            .map_err(execution)?;
        pin_mut!(stream);

        let mut rows = Vec::new();
        while rows.len() < self.sample_rows {
            match stream.try_next().await.map_err(execution)? {
                Some(row) => rows.push(render_row(&row)),
                None => break,
            }
        }
        Ok(SampleResult { columns, rows })
    }
}

fn describe(error: &tokio_postgres::Error) -> String {
    match error.as_db_error() {
        Some(db_error) => db_error.message().to_string(),
        None => error.to_string(),
    }
}

fn execution(error: tokio_postgres::Error) -> SamplerError {
    SamplerError::Execution(describe(&error))
}

/// Every normalized placeholder must receive exactly one filler value.
fn check_parameter_count(placeholders: usize, inferred: usize) -> Result<(), SamplerError> {
    if placeholders != inferred {
        return Err(SamplerError::Execution(format!(
            "{} placeholders but the server expects {} parameters",
            placeholders, inferred
        )));
    }
    Ok(())
}

/// `?` markers outside literals become `$1..$n`.
pub fn renumber_placeholders(sql: &str) -> String {
    let mut out = String::with_capacity(sql.len() + 8);
    let mut quote: Option<char> = None;
    let mut next = 0;
    for c in sql.chars() {
        match (quote, c) {
            (Some(q), c) if c == q => {
                quote = None;
                out.push(c);
            }
            (None, '\'' | '"') => {
                quote = Some(c);
                out.push(c);
            }
            (None, '?') => {
                next += 1;
                out.push('$');
                out.push_str(&next.to_string());
            }
            _ => out.push(c),
        }
    }
    out
}

/// The filler value converted to the type the server inferred for a parameter.
fn filler_for(ty: &Type, filler: i64) -> Box<dyn ToSql + Sync + Send> {
    if *ty == Type::INT2 {
        Box::new(filler as i16)
    } else if *ty == Type::INT4 {
        Box::new(filler as i32)
    } else if *ty == Type::INT8 {
        Box::new(filler)
    } else if *ty == Type::FLOAT4 {
        Box::new(filler as f32)
    } else if *ty == Type::FLOAT8 {
        Box::new(filler as f64)
    } else if *ty == Type::BOOL {
        Box::new(filler != 0)
    } else {
        Box::new(filler.to_string())
    }
}

/// A value of a type without a Rust decoding here; only its presence is known.
struct Opaque;

impl<'a> FromSql<'a> for Opaque {
    fn from_sql(
        _ty: &Type,
        _raw: &'a [u8],
    ) -> Result<Self, Box<dyn std::error::Error + Sync + Send>> {
        Ok(Opaque)
    }

    fn accepts(_ty: &Type) -> bool {
        true
    }
}

fn render_row(row: &Row) -> Vec<String> {
    (0..row.len()).map(|index| render_value(row, index)).collect()
}

fn render_value(row: &Row, index: usize) -> String {
    fn show<T: ToString>(value: Result<Option<T>, tokio_postgres::Error>) -> Option<String> {
        value.ok().map(|v| v.map_or_else(|| "null".to_string(), |v| v.to_string()))
    }

    let ty = row.columns()[index].type_();
    let rendered = if *ty == Type::BOOL {
        show(row.try_get::<_, Option<bool>>(index))
    } else if *ty == Type::INT2 {
        show(row.try_get::<_, Option<i16>>(index))
    } else if *ty == Type::INT4 {
        show(row.try_get::<_, Option<i32>>(index))
    } else if *ty == Type::INT8 {
        show(row.try_get::<_, Option<i64>>(index))
    } else if *ty == Type::FLOAT4 {
        show(row.try_get::<_, Option<f32>>(index))
    } else if *ty == Type::FLOAT8 {
        show(row.try_get::<_, Option<f64>>(index))
    } else if *ty == Type::OID {
        show(row.try_get::<_, Option<u32>>(index))
    } else if <String as FromSql<'_>>::accepts(ty) {
        show(row.try_get::<_, Option<String>>(index))
    } else {
        None
    };

    rendered.unwrap_or_else(|| match row.try_get::<_, Option<Opaque>>(index) {
        Ok(None) => "null".to_string(),
        _ => format!("<{}>", ty.name()),
    })
}
