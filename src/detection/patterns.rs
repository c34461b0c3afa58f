//! Pure extraction helpers shared by the analyzer.
//!
//! Each function maps file or script text to an optional value and never
//! touches the file system.

use regex::Regex;
use std::sync::OnceLock;

pub const DEFAULT_PYTHON_VERSION: &str = "3.11";

const MAX_PYTHON_VERSION_LEN: usize = 4;

fn script_port_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?:--port[=\s]+|PORT=|:)(\d+)").expect("valid regex"))
}

fn expose_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?im)^\s*EXPOSE\s+(\d+)").expect("valid regex"))
}

fn pyproject_python_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#"(?m)(?:^|[{,])\s*(?:requires-)?python\s*=\s*["']([^"']+)["']"#)
            .expect("valid regex")
    })
}

fn runtime_txt_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"python-(\d+\.\d+)").expect("valid regex"))
}

/// First `--port N`, `PORT=N` or `:N` in a package script. Port 0 counts as
/// no port.
pub fn port_from_script(script: &str) -> Option<u16> {
    script_port_re()
        .captures(script)
        .and_then(|cap| cap.get(1))
        .and_then(|m| m.as_str().parse().ok())
        .filter(|port| *port != 0)
}

/// First `EXPOSE N` instruction in a Dockerfile, case-insensitive
pub fn port_from_dockerfile(content: &str) -> Option<u16> {
    expose_re()
        .captures(content)
        .and_then(|cap| cap.get(1))
        .and_then(|m| m.as_str().parse().ok())
        .filter(|port| *port != 0)
}

/// Python version from the first `python = "..."` binding in pyproject.toml.
///
/// Constraint operators are dropped by keeping only digits and dots, then the
/// result is cut to four characters (`"^3.9"` -> `"3.9"`, `">=3.10,<4"` -> `"3.10"`).
pub fn python_version_from_pyproject(content: &str) -> Option<String> {
    let raw = pyproject_python_re().captures(content)?.get(1)?.as_str();

    let version: String = raw
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.')
        .take(MAX_PYTHON_VERSION_LEN)
        .collect();

    if version.is_empty() {
        None
    } else {
        Some(version)
    }
}

/// `major.minor` from a Heroku-style runtime.txt (`python-3.11.4` -> `3.11`)
pub fn python_version_from_runtime_txt(content: &str) -> Option<String> {
    runtime_txt_re()
        .captures(content)
        .and_then(|cap| cap.get(1))
        .map(|m| m.as_str().to_string())
}
