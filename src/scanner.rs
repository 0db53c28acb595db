use std::process::Stdio;
use std::time::Duration;

use ::time::{format_description::well_known, OffsetDateTime};
use tokio::process::Command;
use tokio::time::{self, Instant};
use tracing::{debug, info, warn};

use crate::command::{build_command, ScanCommand};
use crate::config::ScanConfig;
use crate::error::{Result, ScanError};
use crate::options::OptionRegistry;
use crate::parser;
use crate::toolcheck;
use crate::types::{ScanRequest, ScanResult};

/// Runs whitelisted scans against the single configured target.
///
/// Holds only immutable state, so one instance is shared by every request.
#[derive(Debug, Clone)]
pub struct Scanner {
    config: ScanConfig,
    registry: OptionRegistry,
}

impl Scanner {
    pub fn new(config: ScanConfig) -> Self {
        Self {
            config,
            registry: OptionRegistry::standard(),
        }
    }

    pub fn config(&self) -> &ScanConfig {
        &self.config
    }

    pub fn target(&self) -> &str {
        self.config.target()
    }

    pub fn registry(&self) -> &OptionRegistry {
        &self.registry
    }

    /// Re-checked on every call.
    pub fn is_available(&self) -> bool {
        toolcheck::is_scanner_available(self.config.program())
    }

    pub fn build_command(&self, req: &ScanRequest) -> ScanCommand {
        build_command(
            self.config.program(),
            &self.registry,
            &req.options,
            self.config.target(),
        )
    }

    /// Check availability, run the scan, and parse its output.
    pub async fn scan(&self, req: &ScanRequest) -> Result<ScanResult> {
        if !self.is_available() {
            warn!(program = self.config.program(), "scanner not found on PATH");
            return Err(ScanError::ToolUnavailable {
                program: self.config.program().to_string(),
            });
        }

        let cmd = self.build_command(req);
        info!(command = %cmd, "starting scan");
        let start = Instant::now();
        let output = execute(&cmd, self.config.timeout()).await?;

        let mut result = parser::parse_output(&output, self.config.target());
        result.command = cmd.to_string();
        result.finished_at = Some(now_iso_like());
        info!(
            ports = result.ports.len(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "scan finished"
        );
        Ok(result)
    }
}

/// Run `cmd` to completion within `timeout` and return its merged output.
///
/// The exit status is not inspected: nmap reports most problems on stderr,
/// which is appended after stdout. On timeout the child is killed and no
/// output is returned.
pub async fn execute(cmd: &ScanCommand, timeout: Duration) -> Result<String> {
    let program = cmd.program().ok_or_else(|| {
        ScanError::execution(
            "",
            std::io::Error::new(std::io::ErrorKind::InvalidInput, "empty command"),
        )
    })?;

    let child = Command::new(program)
        .args(cmd.args())
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .spawn()
        .map_err(|e| ScanError::execution(program, e))?;
    debug!(pid = child.id(), "spawned {program}");

    // Dropping the wait future on timeout drops the child, which kills it.
    let output = match time::timeout(timeout, child.wait_with_output()).await {
        Ok(Ok(output)) => output,
        Ok(Err(e)) => return Err(ScanError::execution(program, e)),
        Err(_) => {
            warn!(timeout_secs = timeout.as_secs(), "scan timed out, killing {program}");
            return Err(ScanError::Timeout(timeout));
        }
    };
    debug!(status = %output.status, "{program} exited");

    Ok(merge_output(&output.stdout, &output.stderr))
}

fn merge_output(stdout: &[u8], stderr: &[u8]) -> String {
    let mut text = String::from_utf8_lossy(stdout).into_owned();
    if !stderr.is_empty() {
        text.push('\n');
        text.push_str(&String::from_utf8_lossy(stderr));
    }
    text
}

fn now_iso_like() -> String {
    let now = OffsetDateTime::now_utc();
    now.format(&well_known::Rfc3339)
        .unwrap_or_else(|_| String::from("1970-01-01T00:00:00Z"))
}
