//! Feed configuration.
//!
//! Sources, lowest precedence first: built-in defaults, an optional TOML
//! file, `WHOSOUT_*` environment variables, then `PEOPLEHR_CALENDAR_URL`.

use std::path::Path;
use std::time::Duration;

use config::{Config, Environment, File};
use serde::Deserialize;

use crate::error::{WhosOutError, WhosOutResult};
use crate::projector::DEFAULT_WORKDAYS;

static DEFAULT_REFRESH_INTERVAL: &str = "1h";

/// Environment variable holding the calendar feed URL.
pub const CALENDAR_URL_ENV: &str = "PEOPLEHR_CALENDAR_URL";

fn default_refresh_interval() -> String {
    DEFAULT_REFRESH_INTERVAL.to_string()
}

fn default_workdays() -> usize {
    DEFAULT_WORKDAYS
}

#[derive(Debug, Clone, Deserialize)]
pub struct FeedConfig {
    /// Upstream ICS feed
    #[serde(default)]
    pub calendar_url: String,

    /// How long fetched data is served before refetching, e.g. "1h" or "15m"
    #[serde(default = "default_refresh_interval")]
    pub refresh_interval: String,

    /// Number of workdays to report, today included
    #[serde(default = "default_workdays")]
    pub workdays: usize,
}

impl FeedConfig {
    /// Load from the optional file and the process environment.
    pub fn load(path: Option<&Path>) -> WhosOutResult<Self> {
        Self::load_with(
            path,
            std::env::var(CALENDAR_URL_ENV).ok(),
            Environment::with_prefix("WHOSOUT"),
        )
    }

    fn load_with(
        path: Option<&Path>,
        calendar_url: Option<String>,
        environment: Environment,
    ) -> WhosOutResult<Self> {
        let mut builder = Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(File::from(path).required(true));
        }

        let config: FeedConfig = builder
            .add_source(environment.try_parsing(true))
            .set_override_option("calendar_url", calendar_url)
            .map_err(|e| WhosOutError::Config(e.to_string()))?
            .build()
            .map_err(|e| WhosOutError::Config(e.to_string()))?
            .try_deserialize()
            .map_err(|e| WhosOutError::Config(e.to_string()))?;

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> WhosOutResult<()> {
        if self.calendar_url.trim().is_empty() {
            return Err(WhosOutError::Config(format!(
                "Please specify {CALENDAR_URL_ENV} in the environment or calendar_url in the config file"
            )));
        }
        if self.workdays == 0 {
            return Err(WhosOutError::Config("workdays must be at least 1".into()));
        }
        self.refresh_interval()?;
        Ok(())
    }

    pub fn refresh_interval(&self) -> WhosOutResult<Duration> {
        humantime::parse_duration(&self.refresh_interval).map_err(|e| {
            WhosOutError::Config(format!(
                "Invalid refresh_interval '{}': {e}",
                self.refresh_interval
            ))
        })
    }
}
