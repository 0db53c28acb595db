//! Best-effort extraction of structured fields from nmap's console output.
//!
//! Every rule is independent. A rule that finds nothing leaves its field
//! empty; parsing itself never fails, so output from other nmap versions
//! degrades to fewer fields instead of an error.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::types::{PortRecord, Protocol, ScanResult};

static PORT_LINE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\d+)/(tcp|udp)\s+(\w+)\s+(.+)").expect("port pattern"));
static OS_DETAILS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"OS details?:\s*(.+)").expect("os details pattern"));
static OS_GUESS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"Aggressive OS guess(?:es)?:\s*(.+)").expect("os guess pattern"));
static NMAP_DONE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"Nmap done:.+in (.+)").expect("timing pattern"));

/// Parse merged scanner output into a [`ScanResult`] for `host`.
///
/// `command` is left empty; the caller that ran the scan fills it in.
pub fn parse_output(output: &str, host: &str) -> ScanResult {
    ScanResult {
        raw_output: output.to_string(),
        host: host.to_string(),
        ports: parse_ports(output),
        os_info: parse_os_info(output),
        scan_info: parse_scan_time(output),
        command: String::new(),
        finished_at: None,
    }
}

/// All `<port>/<proto> <state> <service...>` lines in order of appearance.
pub fn parse_ports(output: &str) -> Vec<PortRecord> {
    PORT_LINE
        .captures_iter(output)
        .filter_map(|caps| {
            let protocol = Protocol::from_token(&caps[2])?;
            let (name, service) = split_service(&caps[4]);
            Some(PortRecord {
                port: caps[1].to_string(),
                protocol,
                state: caps[3].to_string(),
                name,
                service,
            })
        })
        .collect()
}

/// Exact `OS details:` line, else the aggressive guess line.
pub fn parse_os_info(output: &str) -> Option<String> {
    first_capture(&OS_DETAILS, output).or_else(|| first_capture(&OS_GUESS, output))
}

/// Elapsed-time text from the `Nmap done:` summary line.
pub fn parse_scan_time(output: &str) -> Option<String> {
    first_capture(&NMAP_DONE, output)
}

fn first_capture(re: &Regex, output: &str) -> Option<String> {
    let caps = re.captures(output)?;
    let text = caps.get(1)?.as_str().trim();
    (!text.is_empty()).then(|| text.to_string())
}

// "http  Apache httpd 2.4.7" -> ("http", "Apache httpd 2.4.7"); "http" -> ("http", "http")
fn split_service(text: &str) -> (String, String) {
    let text = text.trim();
    match text.split_once(char::is_whitespace) {
        Some((name, rest)) if !rest.trim().is_empty() => {
            (name.to_string(), rest.trim().to_string())
        }
        _ => (text.to_string(), text.to_string()),
    }
}
