use std::time::Duration;

use crate::error::ConfigError;

/// Official nmap test host. Change to the lab's approved IP/hostname.
pub const DEFAULT_TARGET: &str = "scanme.nmap.org";
pub const DEFAULT_PROGRAM: &str = "nmap";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(300);

/// Process-wide scan settings, fixed at startup and injected into the scanner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanConfig {
    target: String,
    program: String,
    timeout: Duration,
}

impl ScanConfig {
    pub fn new(
        target: impl Into<String>,
        program: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, ConfigError> {
        let target = target.into().trim().to_string();
        let program = program.into().trim().to_string();

        if target.is_empty() {
            return Err(ConfigError::EmptyTarget);
        }
        // The target is the last argv token; it must not read as a flag or split into several.
        if target.starts_with('-') || target.chars().any(char::is_whitespace) {
            return Err(ConfigError::InvalidTarget(target));
        }
        if program.is_empty() {
            return Err(ConfigError::EmptyProgram);
        }
        if timeout.is_zero() {
            return Err(ConfigError::ZeroTimeout);
        }

        Ok(Self {
            target,
            program,
            timeout,
        })
    }

    pub fn target(&self) -> &str {
        &self.target
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            target: DEFAULT_TARGET.to_string(),
            program: DEFAULT_PROGRAM.to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }
}
