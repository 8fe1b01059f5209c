//! Loader configuration.
//!
//! Defaults point at the RKI hospitalization dataset. Every value can be
//! overridden from the environment (a `.env` file is honoured) and then
//! again from the command line.
//!
//! | Variable                 | Default                    |
//! |--------------------------|----------------------------|
//! | `HOSPIT_SOURCE_URL`      | [`DEFAULT_SOURCE_URL`]     |
//! | `HOSPIT_SOURCE_FILE`     | unset (takes precedence)   |
//! | `HOSPIT_DELIMITER`       | `,`                        |
//! | `HOSPIT_NATIONAL_REGION` | `Bundesgebiet`             |

use std::env;
use std::path::PathBuf;

use crate::error::{ConfigError, ConfigResult};

/// Upstream CSV with 7-day hospitalization counts and incidences.
pub const DEFAULT_SOURCE_URL: &str = "https://raw.githubusercontent.com/robert-koch-institut/COVID-19-Hospitalisierungen_in_Deutschland/master/Aktuell_Deutschland_COVID-19-Hospitalisierungen.csv";

/// Field separator of the upstream CSV.
pub const DEFAULT_DELIMITER: char = ',';

/// Region key of the whole country.
pub const NATIONAL_REGION: &str = "Bundesgebiet";

pub const ENV_SOURCE_URL: &str = "HOSPIT_SOURCE_URL";
pub const ENV_SOURCE_FILE: &str = "HOSPIT_SOURCE_FILE";
pub const ENV_DELIMITER: &str = "HOSPIT_DELIMITER";
pub const ENV_NATIONAL_REGION: &str = "HOSPIT_NATIONAL_REGION";

/// Where the CSV comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Source {
    /// Fetched with a single HTTP GET.
    Url(String),
    /// Read from disk (offline builds, fixtures).
    File(PathBuf),
}

impl Source {
    /// Human-readable location for logs.
    pub fn describe(&self) -> String {
        match self {
            Source::Url(url) => url.clone(),
            Source::File(path) => path.display().to_string(),
        }
    }
}

/// Settings for one load.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoaderConfig {
    pub source: Source,
    pub delimiter: char,
    pub national_region: String,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            source: Source::Url(DEFAULT_SOURCE_URL.to_string()),
            delimiter: DEFAULT_DELIMITER,
            national_region: NATIONAL_REGION.to_string(),
        }
    }
}

impl LoaderConfig {
    /// Build a config from the process environment.
    pub fn from_env() -> ConfigResult<Self> {
        // Try loading .env file
        let _ = dotenvy::dotenv();

        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build a config from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> ConfigResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(url) = lookup(ENV_SOURCE_URL).filter(|v| !v.trim().is_empty()) {
            config = config.with_source_url(url.trim());
        }
        if let Some(file) = lookup(ENV_SOURCE_FILE).filter(|v| !v.trim().is_empty()) {
            config = config.with_source_file(file.trim());
        }
        if let Some(delimiter) = lookup(ENV_DELIMITER) {
            config = config.with_delimiter(parse_delimiter(&delimiter)?);
        }
        if let Some(region) = lookup(ENV_NATIONAL_REGION) {
            let region = region.trim();
            if region.is_empty() {
                return Err(ConfigError::EmptyNationalRegion);
            }
            config = config.with_national_region(region);
        }

        Ok(config)
    }

    pub fn with_source_url(mut self, url: impl Into<String>) -> Self {
        self.source = Source::Url(url.into());
        self
    }

    pub fn with_source_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.source = Source::File(path.into());
        self
    }

    pub fn with_delimiter(mut self, delimiter: char) -> Self {
        self.delimiter = delimiter;
        self
    }

    pub fn with_national_region(mut self, region: impl Into<String>) -> Self {
        self.national_region = region.into();
        self
    }
}

/// Parse a delimiter setting. Accepts one character, `\t` or `tab`.
pub fn parse_delimiter(raw: &str) -> ConfigResult<char> {
    match raw {
        "\\t" | "tab" | "TAB" => return Ok('\t'),
        _ => {}
    }

    let mut chars = raw.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => Ok(c),
        _ => Err(ConfigError::InvalidDelimiter(raw.to_string())),
    }
}
