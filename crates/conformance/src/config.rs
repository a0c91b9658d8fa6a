use std::path::PathBuf;

use thiserror::Error;

pub const ENV_FILTER: &str = "BINDING_CONFORMANCE_FILTER";
pub const ENV_REPORT_PATH: &str = "BINDING_CONFORMANCE_REPORT_PATH";
pub const ENV_JOBS: &str = "BINDING_CONFORMANCE_JOBS";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("invalid {var}={value:?}: expected a positive integer")]
    InvalidJobs { var: &'static str, value: String },
}

/// Knobs for a conformance run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConformanceConfig {
    /// Case selection expression; see [`crate::Filter`].
    pub filter: Option<String>,
    /// Write a JSON report here at the end of the run.
    pub report_path: Option<PathBuf>,
    /// Worker threads. `None` uses the rayon default, `Some(1)` runs on the calling thread.
    pub jobs: Option<usize>,
}

impl ConformanceConfig {
    /// Reads `BINDING_CONFORMANCE_FILTER`, `BINDING_CONFORMANCE_REPORT_PATH` and
    /// `BINDING_CONFORMANCE_JOBS`.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let filter = lookup(ENV_FILTER)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty());
        let report_path = lookup(ENV_REPORT_PATH)
            .filter(|v| !v.trim().is_empty())
            .map(PathBuf::from);
        let jobs = match lookup(ENV_JOBS) {
            Some(value) if !value.trim().is_empty() => {
                Some(parse_jobs(&value).ok_or(ConfigError::InvalidJobs {
                    var: ENV_JOBS,
                    value,
                })?)
            }
            _ => None,
        };

        Ok(Self {
            filter,
            report_path,
            jobs,
        })
    }
}

/// Accepts `_` separators, rejects zero.
pub fn parse_jobs(input: &str) -> Option<usize> {
    let cleaned: String = input.trim().chars().filter(|c| *c != '_').collect();
    if cleaned.is_empty() {
        return None;
    }
    cleaned.parse::<usize>().ok().filter(|n| *n > 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn defaults_when_unset() {
        assert_eq!(
            ConformanceConfig::from_lookup(lookup(&[])),
            Ok(ConformanceConfig::default())
        );
    }

    #[test]
    fn reads_all_variables() {
        let config = ConformanceConfig::from_lookup(lookup(&[
            (ENV_FILTER, "  scenario:single_entry_point "),
            (ENV_REPORT_PATH, "target/binding.json"),
            (ENV_JOBS, "1_6"),
        ]))
        .unwrap();
        assert_eq!(config.filter.as_deref(), Some("scenario:single_entry_point"));
        assert_eq!(config.report_path, Some(PathBuf::from("target/binding.json")));
        assert_eq!(config.jobs, Some(16));
    }

    #[test]
    fn blank_values_are_ignored() {
        let config = ConformanceConfig::from_lookup(lookup(&[
            (ENV_FILTER, "   "),
            (ENV_REPORT_PATH, ""),
            (ENV_JOBS, " "),
        ]))
        .unwrap();
        assert_eq!(config, ConformanceConfig::default());
    }

    #[test]
    fn bad_jobs_value_is_an_error() {
        for value in ["zero", "0", "-1"] {
            let err = ConformanceConfig::from_lookup(lookup(&[(ENV_JOBS, value)])).unwrap_err();
            assert_eq!(
                err,
                ConfigError::InvalidJobs {
                    var: ENV_JOBS,
                    value: value.to_string()
                }
            );
        }
    }

    #[test]
    fn jobs_parse_underscores() {
        assert_eq!(parse_jobs("4"), Some(4));
        assert_eq!(parse_jobs("1_000"), Some(1000));
        assert_eq!(parse_jobs("_"), None);
    }
}
