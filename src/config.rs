use serde::{Deserialize, Serialize};
use std::env;
use std::path::{Path, PathBuf};
use thiserror::Error;
use validator::Validate;

use crate::translator::{default_tenant_columns, TenantColumn};

/// Config file read when `--config` is not given. Optional.
pub const DEFAULT_CONFIG_FILE: &str = "sampler.yml";

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Parse error for {field}: {value} - {source}")]
    Parse {
        field: String,
        value: String,
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("Config file {path} not found")]
    MissingFile { path: PathBuf },

    #[error("Validation error: {0}")]
    Validation(#[from] validator::ValidationErrors),
}

/// Live database used for sampling
#[derive(Clone, Debug, PartialEq, Validate, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// JDBC or native connection URL. Selects the dialect.
    #[validate(length(min = 1, message = "Database url cannot be empty"))]
    pub url: String,

    #[serde(default)]
    pub user: Option<String>,

    #[serde(default)]
    pub password: Option<String>,

    /// Schema made current once the session is open
    #[serde(default)]
    pub schema: Option<String>,
}

impl DatabaseConfig {
    pub fn new(url: impl Into<String>) -> Self {
        DatabaseConfig {
            url: url.into(),
            user: None,
            password: None,
            schema: None,
        }
    }
}

/// Sampler configuration with validation
#[derive(Clone, Debug, PartialEq, Validate, Serialize, Deserialize)]
#[serde(default)]
pub struct SamplerConfig {
    /// Root of the Java source tree
    #[validate(length(min = 1, message = "Source base path cannot be empty"))]
    pub base_path: String,

    /// Without a database only translation happens
    #[validate(nested)]
    pub database: Option<DatabaseConfig>,

    /// Rows printed per query (1-1000)
    #[validate(range(
        min = 1,
        max = 1000,
        message = "Sample rows must be between 1 and 1000"
    ))]
    pub sample_rows: usize,

    /// Value bound to every query parameter
    pub filler_value: i64,

    /// Prefixes of the supertype that marks a repository interface
    #[validate(length(min = 1, message = "At least one repository marker is required"))]
    pub repository_markers: Vec<String>,

    /// Columns whose predicates are kept, bound to a sampling value
    pub tenant_columns: Vec<TenantColumn>,
}

impl Default for SamplerConfig {
    fn default() -> Self {
        Self {
            base_path: ".".to_string(),
            database: None,
            sample_rows: 10,
            filler_value: 1,
            repository_markers: vec!["JpaRepository".to_string()],
            tenant_columns: default_tenant_columns(),
        }
    }
}

impl SamplerConfig {
    /// Defaults, then the YAML file, then environment variables, then CLI
    /// flags. The result is validated.
    pub fn load(cli: &CliConfig) -> Result<Self, ConfigError> {
        let mut config = match &cli.config_path {
            Some(path) if !path.exists() => {
                return Err(ConfigError::MissingFile { path: path.clone() })
            }
            Some(path) => Self::from_yaml_file(path)?,
            None if Path::new(DEFAULT_CONFIG_FILE).exists() => {
                Self::from_yaml_file(DEFAULT_CONFIG_FILE)?
            }
            None => Self::default(),
        };

        config.apply_env()?;
        config.merge_cli(cli);
        config.validate()?;
        Ok(config)
    }

    /// Create configuration from YAML file
    pub fn from_yaml_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Parse {
            field: "yaml_file".to_string(),
            value: "file read failed".to_string(),
            source: Box::new(e),
        })?;

        let config: Self = serde_yaml::from_str(&content).map_err(|e| ConfigError::Parse {
            field: "yaml_content".to_string(),
            value: content,
            source: Box::new(e),
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Overrides fields from `SAMPLER_*` environment variables that are set.
    pub fn apply_env(&mut self) -> Result<(), ConfigError> {
        if let Ok(base_path) = env::var("SAMPLER_BASE_PATH") {
            self.base_path = base_path;
        }
        if let Some(sample_rows) = parse_env_var("SAMPLER_SAMPLE_ROWS")? {
            self.sample_rows = sample_rows;
        }

        if let Ok(url) = env::var("SAMPLER_DB_URL") {
            match &mut self.database {
                Some(database) => database.url = url,
                None => self.database = Some(DatabaseConfig::new(url)),
            }
        }
        if let Some(database) = &mut self.database {
            if let Ok(user) = env::var("SAMPLER_DB_USER") {
                database.user = Some(user);
            }
            if let Ok(password) = env::var("SAMPLER_DB_PASSWORD") {
                database.password = Some(password);
            }
            if let Ok(schema) = env::var("SAMPLER_DB_SCHEMA") {
                database.schema = Some(schema);
            }
        }
        Ok(())
    }

    /// Merge CLI flags (CLI overrides file and environment)
    pub fn merge_cli(&mut self, cli: &CliConfig) {
        if let Some(base_path) = &cli.base_path {
            self.base_path = base_path.clone();
        }
    }
}

/// CLI configuration (parsed from command line arguments)
#[derive(Clone, Debug, Default)]
pub struct CliConfig {
    pub config_path: Option<PathBuf>,
    pub base_path: Option<String>,
    /// Skip the database even when one is configured. The dialect still
    /// follows its URL.
    pub translate_only: bool,
}

/// Parse an environment variable when it is set
fn parse_env_var<T: std::str::FromStr>(key: &str) -> Result<Option<T>, ConfigError>
where
    T::Err: std::error::Error + Send + Sync + 'static,
{
    let Ok(value) = env::var(key) else {
        return Ok(None);
    };
    value.parse().map(Some).map_err(|e| ConfigError::Parse {
        field: key.to_string(),
        value,
        source: Box::new(e),
    })
}
