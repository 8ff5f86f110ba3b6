//! Filesystem helpers for generated files

use std::fs;
use std::io;
use std::path::{Component, Path};
use std::process::Command;

use tracing::{debug, warn};

/// Write a generated file, creating its parent directories
pub fn write_file(path: &Path, content: &str) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    fs::write(path, content)
}

/// Best-effort run of an external formatter (e.g. "prettier --write") on a file.
pub fn format_file(path: &Path, formatter: Option<&str>) {
    let Some(formatter) = formatter else {
        return;
    };
    let mut parts = formatter.split_whitespace();
    let Some(program) = parts.next() else {
        return;
    };

    match Command::new(program).args(parts).arg(path).status() {
        Ok(status) if status.success() => debug!("Formatted {}", path.display()),
        Ok(status) => warn!("Formatter exited with {} on {}", status, path.display()),
        Err(e) => warn!("Could not run formatter '{}': {}", program, e),
    }
}

/// Module specifier importing `target` (a path without extension) from a file in `from_dir`.
///
/// Both paths are normalized lexically; a relative path is resolved against the
/// working directory only when the other one is absolute.
pub fn relative_import(from_dir: &Path, target: &Path) -> io::Result<String> {
    let (from, to) = if from_dir.is_absolute() == target.is_absolute() {
        (normalize(from_dir), normalize(target))
    } else {
        let cwd = std::env::current_dir()?;
        (normalize(&cwd.join(from_dir)), normalize(&cwd.join(target)))
    };

    let common = from
        .iter()
        .zip(to.iter())
        .take_while(|(a, b)| a == b)
        .count();

    let mut segments: Vec<&str> = Vec::new();
    for _ in common..from.len() {
        segments.push("..");
    }
    segments.extend(to[common..].iter().map(|s| s.as_str()));

    let joined = segments.join("/");
    if joined.starts_with("..") {
        Ok(joined)
    } else {
        Ok(format!("./{}", joined))
    }
}

/// Path components with `.` dropped and `..` folded into its parent where possible
fn normalize(path: &Path) -> Vec<String> {
    let mut parts: Vec<String> = Vec::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if parts.last().is_some_and(|p| p != ".." && p != "/") {
                    parts.pop();
                } else {
                    parts.push("..".to_string());
                }
            }
            Component::RootDir => parts.push("/".to_string()),
            Component::Prefix(prefix) => {
                parts.push(prefix.as_os_str().to_string_lossy().into_owned())
            }
            Component::Normal(name) => parts.push(name.to_string_lossy().into_owned()),
        }
    }
    parts
}
