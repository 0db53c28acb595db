use std::fmt;

use crate::options::{OptionRegistry, FALLBACK_PORT_LIMIT, TOP_PORTS_KEY};

/// Fully assembled scanner invocation: program first, approved target last.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanCommand {
    tokens: Vec<String>,
}

impl ScanCommand {
    /// Wrap an already assembled argv. Used for running arbitrary commands
    /// through the executor; scans go through [`build_command`].
    pub fn from_tokens<I, S>(tokens: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            tokens: tokens.into_iter().map(Into::into).collect(),
        }
    }

    pub fn tokens(&self) -> &[String] {
        &self.tokens
    }

    pub fn program(&self) -> Option<&str> {
        self.tokens.first().map(String::as_str)
    }

    pub fn args(&self) -> &[String] {
        self.tokens.get(1..).unwrap_or(&[])
    }

    /// Whether `a` is immediately followed by `b` somewhere in the argv.
    pub fn contains_pair(&self, a: &str, b: &str) -> bool {
        self.tokens.windows(2).any(|w| w[0] == a && w[1] == b)
    }
}

impl fmt::Display for ScanCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.tokens.join(" "))
    }
}

/// Assemble the argv for one scan.
///
/// - flags of selected keys known to `registry`, in selection order
/// - unknown keys are dropped without error
/// - `--top-ports 20` when `top_ports` was not selected
/// - `target` always last
pub fn build_command<S: AsRef<str>>(
    program: &str,
    registry: &OptionRegistry,
    selected: &[S],
    target: &str,
) -> ScanCommand {
    let mut tokens = vec![program.to_string()];
    let mut seen: Vec<&str> = Vec::new();

    for key in selected {
        let key: &str = key.as_ref();
        if seen.contains(&key) {
            continue;
        }
        seen.push(key);
        if let Some(opt) = registry.get(key) {
            tokens.extend(opt.flag_tokens().map(str::to_string));
        }
    }

    if !seen.contains(&TOP_PORTS_KEY) {
        tokens.extend(FALLBACK_PORT_LIMIT.iter().map(|t| t.to_string()));
    }

    tokens.push(target.to_string());
    ScanCommand { tokens }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn build(keys: &[&str]) -> ScanCommand {
        build_command("nmap", &OptionRegistry::standard(), keys, "scanme.nmap.org")
    }

    #[test]
    fn empty_selection_gets_fallback() {
        let cmd = build(&[]);
        assert_eq!(
            cmd.tokens(),
            &["nmap", "--top-ports", "20", "scanme.nmap.org"]
        );
    }

    #[test]
    fn flags_follow_selection_order() {
        let cmd = build(&["fast_scan", "top_ports", "service_detection"]);
        assert_eq!(
            cmd.to_string(),
            "nmap -T4 --top-ports 100 -sV scanme.nmap.org"
        );
    }

    #[test]
    fn unknown_keys_dropped() {
        let cmd = build(&["-iL /etc/passwd", "verbose", "; rm -rf /"]);
        assert_eq!(
            cmd.tokens(),
            &["nmap", "-v", "--top-ports", "20", "scanme.nmap.org"]
        );
    }

    #[test]
    fn repeated_key_added_once() {
        let cmd = build(&["verbose", "verbose", "top_ports"]);
        assert_eq!(cmd.args().iter().filter(|t| *t == "-v").count(), 1);
    }

    #[test]
    fn program_and_args_split() {
        let cmd = ScanCommand::from_tokens(["sleep", "1"]);
        assert_eq!(cmd.program(), Some("sleep"));
        assert_eq!(cmd.args(), &["1".to_string()]);
        assert!(ScanCommand::from_tokens(Vec::<String>::new()).args().is_empty());
    }
}
