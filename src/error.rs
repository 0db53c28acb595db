//! Error types for configuration and scan execution.

use std::io;
use std::time::Duration;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, ScanError>;

/// Ways a scan can fail. A pattern missing from the scanner output is not
/// one of them; the parser leaves the field empty instead.
#[derive(Debug, Error)]
pub enum ScanError {
    #[error("{program} is not installed on this system. Please install {program} first.")]
    ToolUnavailable { program: String },

    #[error("Scan timed out after {}", describe_duration(.0))]
    Timeout(Duration),

    #[error("failed to execute {program}: {source}")]
    Execution {
        program: String,
        #[source]
        source: io::Error,
    },
}

impl ScanError {
    pub(crate) fn execution(program: impl Into<String>, source: io::Error) -> Self {
        ScanError::Execution {
            program: program.into(),
            source,
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("scan target must not be empty")]
    EmptyTarget,

    #[error("invalid scan target {0:?}: must be a single host token not starting with '-'")]
    InvalidTarget(String),

    #[error("scanner program must not be empty")]
    EmptyProgram,

    #[error("scan timeout must be greater than zero")]
    ZeroTimeout,
}

/// Human wording for a timeout: whole minutes when exact, seconds otherwise.
pub fn describe_duration(d: &Duration) -> String {
    let secs = d.as_secs();
    if secs >= 60 && secs % 60 == 0 && d.subsec_nanos() == 0 {
        let mins = secs / 60;
        if mins == 1 {
            "1 minute".to_string()
        } else {
            format!("{mins} minutes")
        }
    } else if secs == 1 && d.subsec_nanos() == 0 {
        "1 second".to_string()
    } else if d.subsec_nanos() == 0 {
        format!("{secs} seconds")
    } else {
        format!("{:.1} seconds", d.as_secs_f64())
    }
}
