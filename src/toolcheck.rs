use std::env;
use std::ffi::OsStr;
use std::path::{Path, PathBuf};

/// Locate `program` the way a shell would: directly when it contains a path
/// separator, otherwise in each `PATH` entry.
///
/// Looked up fresh on every call so a scanner installed or removed while the
/// server runs is noticed on the next request.
pub fn find_program(program: &str) -> Option<PathBuf> {
    if program.is_empty() {
        return None;
    }
    let as_path = Path::new(program);
    if as_path.components().count() > 1 || as_path.is_absolute() {
        return is_executable(as_path).then(|| as_path.to_path_buf());
    }
    let paths = env::var_os("PATH")?;
    find_in_paths(program, &paths)
}

/// True when the scanner executable can currently be found.
pub fn is_scanner_available(program: &str) -> bool {
    find_program(program).is_some()
}

fn find_in_paths(program: &str, paths: &OsStr) -> Option<PathBuf> {
    for dir in env::split_paths(paths) {
        if dir.as_os_str().is_empty() {
            continue;
        }
        for candidate in candidates(&dir, program) {
            if is_executable(&candidate) {
                return Some(candidate);
            }
        }
    }
    None
}

#[cfg(windows)]
fn candidates(dir: &Path, program: &str) -> Vec<PathBuf> {
    let mut out = vec![dir.join(program)];
    let exts = env::var("PATHEXT").unwrap_or_else(|_| ".EXE;.BAT;.CMD".to_string());
    for ext in exts.split(';').filter(|e| !e.is_empty()) {
        out.push(dir.join(format!("{program}{ext}")));
    }
    out
}

#[cfg(not(windows))]
fn candidates(dir: &Path, program: &str) -> Vec<PathBuf> {
    vec![dir.join(program)]
}

#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;
    match path.metadata() {
        Ok(meta) => meta.is_file() && meta.permissions().mode() & 0o111 != 0,
        Err(_) => false,
    }
}

#[cfg(not(unix))]
fn is_executable(path: &Path) -> bool {
    path.is_file()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_name_is_missing() {
        assert!(find_program("").is_none());
    }

    #[test]
    fn nonexistent_program_is_missing() {
        assert!(!is_scanner_available("lab-nmap-rs-no-such-tool-4f1c"));
    }

    #[cfg(unix)]
    #[test]
    fn finds_sh_on_path() {
        let found = find_program("sh").expect("sh on PATH");
        assert!(found.ends_with("sh"));
    }

    #[cfg(unix)]
    #[test]
    fn absolute_path_checked_directly() {
        assert!(is_scanner_available("/bin/sh"));
        assert!(!is_scanner_available("/bin/lab-nmap-rs-missing"));
    }

    #[cfg(unix)]
    #[test]
    fn search_respects_given_path_list() {
        let paths = std::ffi::OsString::from("/nonexistent-dir:/bin");
        assert!(find_in_paths("sh", &paths).is_some());
        let paths = std::ffi::OsString::from("/nonexistent-dir");
        assert!(find_in_paths("sh", &paths).is_none());
    }
}
