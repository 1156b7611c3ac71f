// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Run configuration read from the environment.
//!
//! | Variable             | Meaning                                        |
//! |----------------------|------------------------------------------------|
//! | `DOCSNIP_CLASSPATH`  | library directories, platform path-list syntax |
//! | `DOCSNIP_RUSTC`      | compiler to run (else `RUSTC`, else `rustc`)   |
//! | `DOCSNIP_EDITION`    | edition for snippets, default `2021`           |
//! | `DOCSNIP_TIMEOUT`    | seconds per snippet, default 60, `0` = none    |
//! | `DOCSNIP_WORKSPACE`  | existing output directory, never deleted       |

use std::env;
use std::ffi::OsString;
use std::path::PathBuf;
use std::time::Duration;

pub const CLASSPATH_VAR: &str = "DOCSNIP_CLASSPATH";
pub const RUSTC_VAR: &str = "DOCSNIP_RUSTC";
pub const EDITION_VAR: &str = "DOCSNIP_EDITION";
pub const TIMEOUT_VAR: &str = "DOCSNIP_TIMEOUT";
pub const WORKSPACE_VAR: &str = "DOCSNIP_WORKSPACE";

const EDITIONS: &[&str] = &["2015", "2018", "2021", "2024"];
const DEFAULT_TIMEOUT_SECS: u64 = 60;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid {var} `{value}`: expected a whole number of seconds")]
    InvalidTimeout { var: String, value: String },
    #[error("invalid {var} `{value}`: expected one of {}", EDITIONS.join(", "))]
    InvalidEdition { var: String, value: String },
    #[error("{var} is not valid unicode")]
    NotUnicode { var: String },
}

/// Everything a run needs besides the documentation tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Directories searched for libraries and artifacts, in order.
    pub classpath: Vec<PathBuf>,
    pub rustc: PathBuf,
    pub edition: String,
    /// `None` disables the watchdog.
    pub timeout: Option<Duration>,
    /// Caller-supplied output directory; a temporary one is used otherwise.
    pub workspace: Option<PathBuf>,
    /// Crates passed to rustc with `--extern`.
    pub externs: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            classpath: Vec::new(),
            rustc: PathBuf::from("rustc"),
            edition: "2021".to_string(),
            timeout: Some(Duration::from_secs(DEFAULT_TIMEOUT_SECS)),
            workspace: None,
            externs: Vec::new(),
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| env::var_os(var))
    }

    /// Build a config from any variable lookup. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<OsString>,
    {
        let get = |var: &str| lookup(var).filter(|v| !v.is_empty());
        let mut config = Config::default();

        if let Some(paths) = get(CLASSPATH_VAR) {
            config.classpath = env::split_paths(&paths)
                .filter(|p| !p.as_os_str().is_empty())
                .collect();
        }
        if let Some(rustc) = get(RUSTC_VAR).or_else(|| get("RUSTC")) {
            config.rustc = PathBuf::from(rustc);
        }
        if let Some(edition) = get(EDITION_VAR) {
            config.edition = parse_edition(EDITION_VAR, &to_string(EDITION_VAR, edition)?)?;
        }
        if let Some(timeout) = get(TIMEOUT_VAR) {
            config.timeout = parse_timeout(TIMEOUT_VAR, &to_string(TIMEOUT_VAR, timeout)?)?;
        }
        if let Some(dir) = get(WORKSPACE_VAR) {
            config.workspace = Some(PathBuf::from(dir));
        }

        tracing::debug!(?config, "loaded configuration");
        Ok(config)
    }
}

fn to_string(var: &str, value: OsString) -> Result<String, ConfigError> {
    value.into_string().map_err(|_| ConfigError::NotUnicode {
        var: var.to_string(),
    })
}

/// Seconds as a timeout; `0` means no timeout.
pub fn parse_timeout(var: &str, value: &str) -> Result<Option<Duration>, ConfigError> {
    let secs: u64 = value
        .trim()
        .parse()
        .map_err(|_| ConfigError::InvalidTimeout {
            var: var.to_string(),
            value: value.to_string(),
        })?;
    Ok((secs > 0).then(|| Duration::from_secs(secs)))
}

pub fn parse_edition(var: &str, value: &str) -> Result<String, ConfigError> {
    let value = value.trim();
    if EDITIONS.contains(&value) {
        Ok(value.to_string())
    } else {
        Err(ConfigError::InvalidEdition {
            var: var.to_string(),
            value: value.to_string(),
        })
    }
}
