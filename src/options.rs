use serde::ser::{Serialize, SerializeMap, Serializer};

/// Key of the option that already bounds the port range.
pub const TOP_PORTS_KEY: &str = "top_ports";

/// Appended when the caller did not select `top_ports`.
pub const FALLBACK_PORT_LIMIT: [&str; 2] = ["--top-ports", "20"];

/// One whitelisted scanner toggle.
#[derive(serde::Serialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanOption {
    #[serde(skip)]
    pub key: &'static str,
    pub flag: &'static str,
    pub label: &'static str,
    pub description: &'static str,
    pub default: bool,
}

impl ScanOption {
    /// Flag text split into separate argv tokens.
    pub fn flag_tokens(&self) -> impl Iterator<Item = &'static str> {
        self.flag.split_whitespace()
    }
}

const STANDARD: &[ScanOption] = &[
    ScanOption {
        key: "top_ports",
        flag: "--top-ports 100",
        label: "Top 100 Ports",
        description: "Scan the 100 most common ports",
        default: true,
    },
    ScanOption {
        key: "service_detection",
        flag: "-sV",
        label: "Service Detection",
        description: "Detect service versions on open ports",
        default: true,
    },
    ScanOption {
        key: "os_detection",
        flag: "-O",
        label: "OS Detection",
        description: "Attempt to identify the operating system",
        default: false,
    },
    ScanOption {
        key: "skip_ping",
        flag: "-Pn",
        label: "Skip Host Discovery",
        description: "Treat host as online (skip ping)",
        default: false,
    },
    ScanOption {
        key: "fast_scan",
        flag: "-T4",
        label: "Fast Timing",
        description: "Faster scan timing (T4)",
        default: true,
    },
    ScanOption {
        key: "verbose",
        flag: "-v",
        label: "Verbose Output",
        description: "Show more detailed output",
        default: false,
    },
    ScanOption {
        key: "script_default",
        flag: "-sC",
        label: "Default Scripts",
        description: "Run default NSE scripts",
        default: false,
    },
];

/// Immutable, ordered set of scan options keyed by `ScanOption::key`.
///
/// Serializes as a JSON object in registry order, which is what the UI
/// renders its checkboxes from.
#[derive(Debug, Clone, Copy)]
pub struct OptionRegistry {
    options: &'static [ScanOption],
}

impl OptionRegistry {
    /// The whitelisted options exposed by the web UI.
    pub fn standard() -> Self {
        Self { options: STANDARD }
    }

    pub fn get(&self, key: &str) -> Option<&'static ScanOption> {
        self.options.iter().find(|o| o.key == key)
    }

    pub fn iter(&self) -> impl Iterator<Item = &'static ScanOption> {
        self.options.iter()
    }

    /// Keys enabled by default, in registry order.
    pub fn default_keys(&self) -> Vec<&'static str> {
        self.options
            .iter()
            .filter(|o| o.default)
            .map(|o| o.key)
            .collect()
    }
}

impl Default for OptionRegistry {
    fn default() -> Self {
        Self::standard()
    }
}

impl Serialize for OptionRegistry {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.options.len()))?;
        for opt in self.options {
            map.serialize_entry(opt.key, opt)?;
        }
        map.end()
    }
}
