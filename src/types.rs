use std::fmt;

use serde::{Deserialize, Serialize};

/// Transport protocol column of an nmap port line.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Protocol {
    Tcp,
    Udp,
}

impl Protocol {
    pub fn as_str(self) -> &'static str {
        match self {
            Protocol::Tcp => "tcp",
            Protocol::Udp => "udp",
        }
    }

    pub(crate) fn from_token(s: &str) -> Option<Self> {
        match s {
            "tcp" => Some(Protocol::Tcp),
            "udp" => Some(Protocol::Udp),
            _ => None,
        }
    }
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One port line as reported by the scanner.
///
/// `name` is the SERVICE column. `service` is the most specific description
/// on the line: the version text when present, otherwise the service name.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct PortRecord {
    pub port: String,
    pub protocol: Protocol,
    pub state: String,
    pub name: String,
    pub service: String,
}

impl PortRecord {
    pub fn is_open(&self) -> bool {
        self.state == "open"
    }
}

/// Structured view of one finished scan.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ScanResult {
    #[serde(rename = "raw")]
    pub raw_output: String,
    pub host: String,
    pub ports: Vec<PortRecord>,
    pub os_info: Option<String>,
    pub scan_info: Option<String>,
    pub command: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub finished_at: Option<String>,
}

impl ScanResult {
    pub fn open_ports(&self) -> impl Iterator<Item = &PortRecord> {
        self.ports.iter().filter(|p| p.is_open())
    }
}

/// Body of `POST /api/scan`.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanRequest {
    #[serde(default)]
    pub options: Vec<String>,
}

impl ScanRequest {
    pub fn new<I, S>(options: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            options: options.into_iter().map(Into::into).collect(),
        }
    }
}
