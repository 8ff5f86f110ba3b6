//! Registration patcher - wires a generated controller into the registry file
//!
//! The registry is a source file with two marker comment lines. A controller is
//! registered by inserting its import before the import marker and its binding before
//! the controller marker. Patching is idempotent: a registry that already imports the
//! controller module is left untouched. A registry that imports the same class name or
//! binds the same property from another module is a conflict and is left untouched too.

use std::fs;
use std::path::Path;

use tracing::{debug, info, warn};

use super::fs_util::write_file;
use crate::error::Result;

/// A controller as it appears in the registry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistryEntry {
    pub class_name: String,
    /// Module specifier of the controller file, relative to the registry
    pub import_path: String,
    /// Property the controller instance is bound to
    pub binding: String,
}

impl RegistryEntry {
    pub fn import_line(&self) -> String {
        format!("import {{ {} }} from '{}';", self.class_name, self.import_path)
    }

    pub fn binding_line(&self) -> String {
        format!("{}: new {}(),", self.binding, self.class_name)
    }

    fn is_imported_by(&self, source: &str) -> bool {
        source.contains(&format!("from '{}'", self.import_path))
            || source.contains(&format!("from \"{}\"", self.import_path))
    }

    /// Class name already imported, or binding already declared, by another module
    fn collides_in(&self, source: &str) -> bool {
        let imports_class = source
            .split(';')
            .map(str::trim_start)
            .filter(|stmt| stmt.starts_with("import"))
            .flat_map(imported_names)
            .any(|name| name == self.class_name);
        let binds_property = source.lines().any(|line| {
            line.trim_start()
                .strip_prefix(self.binding.as_str())
                .is_some_and(|rest| rest.trim_start().starts_with(':'))
        });
        imports_class || binds_property
    }
}

/// Local names bound by the `{ ... }` list of an import statement
fn imported_names(stmt: &str) -> Vec<&str> {
    let Some(open) = stmt.find('{') else {
        return Vec::new();
    };
    let Some(close) = stmt[open..].find('}') else {
        return Vec::new();
    };
    stmt[open + 1..open + close]
        .split(',')
        .filter_map(|spec| spec.split_whitespace().last())
        .collect()
}

/// What a patch did to the registry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatchOutcome {
    /// Registry did not exist; it was created from the template and patched
    Created,
    Inserted,
    AlreadyPresent,
    /// Class name or binding is already taken by another module; nothing was changed
    NameConflict,
    /// One of the markers is missing; nothing was changed
    MarkersMissing,
}

/// Minimal registry containing both markers
pub fn registry_template(import_marker: &str, binding_marker: &str) -> String {
    format!(
        "import {{ Router }} from 'express';\n\
         {import_marker}\n\
         \n\
         export const controllers = {{\n\
         \x20 {binding_marker}\n\
         }};\n\
         \n\
         export function route(router: Router): void {{\n\
         \x20 for (const controller of Object.values(controllers)) {{\n\
         \x20   controller.route(router);\n\
         \x20 }}\n\
         }}\n"
    )
}

/// Patch registry source text. Returns the new text and the outcome; the text is
/// unchanged unless the outcome is `Inserted`.
pub fn patch_source(
    source: &str,
    entry: &RegistryEntry,
    import_marker: &str,
    binding_marker: &str,
) -> (String, PatchOutcome) {
    if entry.is_imported_by(source) {
        return (source.to_string(), PatchOutcome::AlreadyPresent);
    }
    if entry.collides_in(source) {
        return (source.to_string(), PatchOutcome::NameConflict);
    }

    let lines: Vec<&str> = source.split_inclusive('\n').collect();
    let import_at = find_marker(&lines, import_marker);
    let binding_at = find_marker(&lines, binding_marker);
    let (Some(import_at), Some(binding_at)) = (import_at, binding_at) else {
        return (source.to_string(), PatchOutcome::MarkersMissing);
    };

    let mut out = String::with_capacity(source.len() + 128);
    for (i, line) in lines.iter().enumerate() {
        if i == import_at {
            push_before(&mut out, line, &entry.import_line());
        }
        if i == binding_at {
            push_before(&mut out, line, &entry.binding_line());
        }
        out.push_str(line);
    }
    (out, PatchOutcome::Inserted)
}

/// Patch the registry file at `path`, creating it from the template when absent
pub fn patch_registry(
    path: &Path,
    entry: &RegistryEntry,
    import_marker: &str,
    binding_marker: &str,
) -> Result<PatchOutcome> {
    let (source, created) = if path.exists() {
        (fs::read_to_string(path)?, false)
    } else {
        info!("Creating registry {}", path.display());
        (registry_template(import_marker, binding_marker), true)
    };

    let (patched, outcome) = patch_source(&source, entry, import_marker, binding_marker);
    match outcome {
        PatchOutcome::Inserted => {
            write_file(path, &patched)?;
            debug!("Registered {} in {}", entry.class_name, path.display());
            if created {
                return Ok(PatchOutcome::Created);
            }
        }
        PatchOutcome::AlreadyPresent => {
            debug!("{} already registered in {}", entry.class_name, path.display());
        }
        PatchOutcome::NameConflict => {
            warn!(
                "Registry {} already has a {} or '{}' binding from another module, {} not registered",
                path.display(),
                entry.class_name,
                entry.binding,
                entry.import_path
            );
        }
        _ => {
            warn!(
                "Registry {} has no '{}' / '{}' markers, {} not registered",
                path.display(),
                import_marker,
                binding_marker,
                entry.class_name
            );
        }
    }
    Ok(outcome)
}

fn find_marker(lines: &[&str], marker: &str) -> Option<usize> {
    let marker = marker.trim();
    lines.iter().position(|l| l.trim() == marker)
}

/// Push `code` as a line with the indentation and line ending of `marker_line`
fn push_before(out: &mut String, marker_line: &str, code: &str) {
    let indent_len = marker_line.len() - marker_line.trim_start().len();
    let ending = if marker_line.ends_with("\r\n") {
        "\r\n"
    } else {
        "\n"
    };
    out.push_str(&marker_line[..indent_len]);
    out.push_str(code);
    out.push_str(ending);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::defaults::{BINDING_MARKER, IMPORT_MARKER};
    use tempfile::TempDir;

    fn entry() -> RegistryEntry {
        RegistryEntry {
            class_name: "ProfileController".to_string(),
            import_path: "./profile.controller".to_string(),
            binding: "profile".to_string(),
        }
    }

    fn patch(source: &str) -> (String, PatchOutcome) {
        patch_source(source, &entry(), IMPORT_MARKER, BINDING_MARKER)
    }

    #[test]
    fn test_inserts_before_markers() {
        let source = "import { Router } from 'express';\n// restgen:imports\n\nexport const controllers = {\n    // restgen:controllers\n};\n";
        let (patched, outcome) = patch(source);
        assert_eq!(outcome, PatchOutcome::Inserted);
        assert_eq!(
            patched,
            "import { Router } from 'express';\nimport { ProfileController } from './profile.controller';\n// restgen:imports\n\nexport const controllers = {\n    profile: new ProfileController(),\n    // restgen:controllers\n};\n"
        );
    }

    #[test]
    fn test_second_patch_is_identical() {
        let template = registry_template(IMPORT_MARKER, BINDING_MARKER);
        let (first, outcome) = patch(&template);
        assert_eq!(outcome, PatchOutcome::Inserted);
        let (second, outcome) = patch(&first);
        assert_eq!(outcome, PatchOutcome::AlreadyPresent);
        assert_eq!(first, second);
        assert_eq!(second.matches("new ProfileController()").count(), 1);
    }

    #[test]
    fn test_same_class_from_other_module_is_a_conflict() {
        let template = registry_template(IMPORT_MARKER, BINDING_MARKER);
        let (first, _) = patch(&template);
        let v2 = RegistryEntry {
            import_path: "./v2/profile.controller".to_string(),
            ..entry()
        };
        let (second, outcome) = patch_source(&first, &v2, IMPORT_MARKER, BINDING_MARKER);
        assert_eq!(outcome, PatchOutcome::NameConflict);
        assert_eq!(second, first);
        assert_eq!(second.matches("import { ProfileController }").count(), 1);
        assert_eq!(second.matches("profile: ").count(), 1);
    }

    #[test]
    fn test_taken_binding_or_aliased_import_is_a_conflict() {
        let source = "import {\n  Base,\n  ProfileController as Profile,\n} from './legacy';\n// restgen:imports\nconst c = {\n  // restgen:controllers\n};\n";
        assert_eq!(patch(source).1, PatchOutcome::Inserted);

        let aliased = source.replace("ProfileController as Profile", "Legacy as ProfileController");
        assert_eq!(patch(&aliased).1, PatchOutcome::NameConflict);

        let bound = "// restgen:imports\nconst c = {\n  profile : new Legacy(),\n  profileV1: new Old(),\n  // restgen:controllers\n};\n";
        assert_eq!(patch(bound).1, PatchOutcome::NameConflict);
    }

    #[test]
    fn test_missing_marker_is_noop() {
        let source = "// restgen:imports\nexport const controllers = {};\n";
        let (patched, outcome) = patch(source);
        assert_eq!(outcome, PatchOutcome::MarkersMissing);
        assert_eq!(patched, source);
    }

    #[test]
    fn test_keeps_crlf_line_endings() {
        let source = "// restgen:imports\r\nconst c = {\r\n  // restgen:controllers\r\n};\r\n";
        let (patched, _) = patch(source);
        assert!(patched.contains("import { ProfileController } from './profile.controller';\r\n// restgen:imports"));
        assert!(patched.contains("  profile: new ProfileController(),\r\n  // restgen:controllers"));
    }

    #[test]
    fn test_patch_registry_creates_missing_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("v1").join("index.ts");

        let outcome = patch_registry(&path, &entry(), IMPORT_MARKER, BINDING_MARKER).unwrap();
        assert_eq!(outcome, PatchOutcome::Created);
        let written = fs::read_to_string(&path).unwrap();
        assert!(written.contains("import { ProfileController } from './profile.controller';"));
        assert!(written.contains("  profile: new ProfileController(),\n  // restgen:controllers"));

        let outcome = patch_registry(&path, &entry(), IMPORT_MARKER, BINDING_MARKER).unwrap();
        assert_eq!(outcome, PatchOutcome::AlreadyPresent);
        assert_eq!(fs::read_to_string(&path).unwrap(), written);
    }
}
