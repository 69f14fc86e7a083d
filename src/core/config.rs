use config::{Config, Environment, File};
use serde::Deserialize;
use std::path::Path;
use super::error::{OrmError, Result};

/// Upper bound on rows returned by one filtered or unfiltered read.
pub const DEFAULT_MAX_LIMIT: i64 = 100_000;

/// Runtime knobs for [`Orm`](crate::Orm).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct OrmConfig {
    #[serde(default = "default_max_limit")]
    pub max_limit: i64,
    /// Emit every statement and its arguments at debug level.
    #[serde(default = "default_log_statements")]
    pub log_statements: bool,
}

const fn default_max_limit() -> i64 { DEFAULT_MAX_LIMIT }
const fn default_log_statements() -> bool { true }

impl Default for OrmConfig {
    fn default() -> Self {
        Self {
            max_limit: default_max_limit(),
            log_statements: default_log_statements(),
        }
    }
}

impl OrmConfig {
    /// Load configuration with priority: ENV (`TAGORM_*`) > config file > defaults
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut builder = Config::builder()
            .set_default("max_limit", DEFAULT_MAX_LIMIT)?
            .set_default("log_statements", true)?;

        if let Some(path) = path {
            builder = builder.add_source(File::from(path));
        }

        builder = builder.add_source(Environment::with_prefix("TAGORM").try_parsing(true));

        let config = builder.build()?.try_deserialize::<Self>()?;
        if config.max_limit < 1 {
            return Err(OrmError::InvalidLimit(config.max_limit));
        }
        Ok(config)
    }
}
