use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Failure to obtain a kernel_task sample from `top`
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SampleError {
    /// `top` could not be launched or exited abnormally. The message carries
    /// the utility's own stderr so privilege problems stay recognisable.
    #[error("{0}")]
    ExecutionFailed(String),

    #[error("unexpected top output: {0}")]
    ParseFailed(String),
}

/// Keyword match used by the display layer to choose remediation hints
pub fn is_privilege_message(message: &str) -> bool {
    let lower = message.to_lowercase();
    ["privileged", "sudo", "permission"]
        .iter()
        .any(|keyword| lower.contains(keyword))
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Error reading config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Error parsing config file: {0}")]
    Parse(String),

    #[error("Invalid esp_url '{url}': {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("Error writing config file {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

#[derive(Error, Debug)]
pub enum NotifyError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("endpoint answered HTTP {0}")]
    Status(reqwest::StatusCode),
}
