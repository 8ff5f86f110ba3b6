//! Source-file builder: an accumulator of imports, classes and methods

use std::collections::{BTreeMap, BTreeSet};

/// Named imports grouped by module specifier
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportSet {
    entries: BTreeMap<String, BTreeSet<String>>,
}

impl ImportSet {
    pub fn insert(&mut self, name: &str, from: &str) {
        self.entries
            .entry(from.to_string())
            .or_default()
            .insert(name.to_string());
    }

    pub fn contains(&self, name: &str, from: &str) -> bool {
        self.entries
            .get(from)
            .map(|names| names.contains(name))
            .unwrap_or(false)
    }

    /// Module specifiers in emission order: packages first, then relative paths
    pub fn modules(&self) -> Vec<&str> {
        let (packages, relative): (Vec<&str>, Vec<&str>) = self
            .entries
            .keys()
            .map(|k| k.as_str())
            .partition(|k| !k.starts_with('.'));
        packages.into_iter().chain(relative).collect()
    }

    pub fn names(&self, from: &str) -> Vec<&str> {
        self.entries
            .get(from)
            .map(|names| names.iter().map(|n| n.as_str()).collect())
            .unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
    Public,
    Private,
}

impl Visibility {
    fn keyword(&self) -> &'static str {
        match self {
            Self::Public => "public",
            Self::Private => "private",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassSpec {
    pub name: String,
    pub extends: Option<String>,
    pub exported: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodSpec {
    pub name: String,
    pub visibility: Visibility,
    pub is_async: bool,
    pub return_type: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Parameter {
    pub name: String,
    pub ty: String,
}

impl Parameter {
    pub fn new(name: &str, ty: &str) -> Self {
        Self {
            name: name.to_string(),
            ty: ty.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodDecl {
    spec: MethodSpec,
    parameters: Vec<Parameter>,
    content: Vec<String>,
}

impl MethodDecl {
    pub fn add_parameter(&mut self, parameter: Parameter) -> &mut Self {
        self.parameters.push(parameter);
        self
    }

    /// Append body code; each line is indented relative to the method
    pub fn append_content(&mut self, code: &str) -> &mut Self {
        self.content.extend(code.lines().map(|l| l.to_string()));
        self
    }

    fn generate(&self, out: &mut String) {
        let params = self
            .parameters
            .iter()
            .map(|p| format!("{}: {}", p.name, p.ty))
            .collect::<Vec<_>>()
            .join(", ");
        let asyncness = if self.spec.is_async { "async " } else { "" };
        let ret = self
            .spec
            .return_type
            .as_ref()
            .map(|t| format!(": {}", t))
            .unwrap_or_default();

        out.push_str(&format!(
            "  {} {}{}({}){} {{\n",
            self.spec.visibility.keyword(),
            asyncness,
            self.spec.name,
            params,
            ret
        ));
        for line in &self.content {
            if line.trim().is_empty() {
                out.push('\n');
            } else {
                out.push_str("    ");
                out.push_str(line);
                out.push('\n');
            }
        }
        out.push_str("  }\n");
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassDecl {
    spec: ClassSpec,
    methods: Vec<MethodDecl>,
}

impl ClassDecl {
    pub fn add_method(&mut self, spec: MethodSpec) -> &mut MethodDecl {
        self.methods.push(MethodDecl {
            spec,
            parameters: Vec::new(),
            content: Vec::new(),
        });
        let last = self.methods.len() - 1;
        &mut self.methods[last]
    }

    fn generate(&self, out: &mut String) {
        let export = if self.spec.exported { "export " } else { "" };
        let extends = self
            .spec
            .extends
            .as_ref()
            .map(|b| format!(" extends {}", b))
            .unwrap_or_default();
        out.push_str(&format!("{}class {}{} {{\n", export, self.spec.name, extends));
        for (i, method) in self.methods.iter().enumerate() {
            if i > 0 {
                out.push('\n');
            }
            method.generate(out);
        }
        out.push_str("}\n");
    }
}

/// A generated source file
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SourceFile {
    imports: ImportSet,
    classes: Vec<ClassDecl>,
}

impl SourceFile {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_import(&mut self, names: &[&str], from: &str) {
        for name in names {
            self.imports.insert(name, from);
        }
    }

    pub fn imports(&self) -> &ImportSet {
        &self.imports
    }

    pub fn add_class(&mut self, spec: ClassSpec) -> &mut ClassDecl {
        self.classes.push(ClassDecl {
            spec,
            methods: Vec::new(),
        });
        let last = self.classes.len() - 1;
        &mut self.classes[last]
    }

    pub fn generate(&self) -> String {
        let mut out = String::new();
        for module in self.imports.modules() {
            out.push_str(&format!(
                "import {{ {} }} from '{}';\n",
                self.imports.names(module).join(", "),
                module
            ));
        }
        for class in &self.classes {
            if !out.is_empty() {
                out.push('\n');
            }
            class.generate(&mut out);
        }
        out
    }
}
