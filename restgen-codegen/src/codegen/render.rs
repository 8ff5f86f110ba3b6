//! Lowers handler statement trees and route plans to TypeScript

use std::collections::BTreeSet;

use super::clause::{
    Clause, FilePurge, FileReplacement, HandlerBody, IdSource, OwnerField, Payload, Persistence,
    Redaction, Response, Retrieval,
};
use super::naming::{member, optional_member, to_model_class, ts_string};
use super::route_plan::RoutePlan;

/// Runtime module of the generated project that a name is imported from
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum CoreModule {
    BaseController,
    Security,
    Wrap,
    Errors,
    Query,
    Files,
    Logger,
}

impl CoreModule {
    /// File stem inside the core directory
    pub fn file_stem(&self) -> &'static str {
        match self {
            Self::BaseController => "base-controller",
            Self::Security => "security",
            Self::Wrap => "wrap",
            Self::Errors => "errors",
            Self::Query => "query",
            Self::Files => "files",
            Self::Logger => "logger",
        }
    }
}

/// A name the rendered code refers to and that must be imported
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Requirement {
    Core(CoreModule, &'static str),
    /// Model type, with its declaration directory override
    Model { name: String, path: Option<String> },
}

/// Names used while rendering one controller
#[derive(Debug, Clone)]
pub struct RenderContext {
    pub controller_class: String,
    pub model_class: String,
    pub model_path: Option<String>,
}

/// Renders handler bodies, collecting the imports they need
#[derive(Debug)]
pub struct Renderer<'a> {
    ctx: &'a RenderContext,
    requirements: BTreeSet<Requirement>,
}

impl<'a> Renderer<'a> {
    pub fn new(ctx: &'a RenderContext) -> Self {
        Self {
            ctx,
            requirements: BTreeSet::new(),
        }
    }

    pub fn require(&mut self, requirement: Requirement) {
        self.requirements.insert(requirement);
    }

    pub fn into_requirements(self) -> BTreeSet<Requirement> {
        self.requirements
    }

    fn core(&mut self, module: CoreModule, name: &'static str) {
        self.require(Requirement::Core(module, name));
    }

    fn model(&mut self) -> String {
        self.require(Requirement::Model {
            name: self.ctx.model_class.clone(),
            path: self.ctx.model_path.clone(),
        });
        self.ctx.model_class.clone()
    }

    fn no_record(&mut self, w: &mut CodeWriter) {
        self.core(CoreModule::Errors, "DatabaseError");
        self.core(CoreModule::Errors, "DatabaseErrorType");
        w.line("throw new DatabaseError(DatabaseErrorType.NoRecord);");
    }

    /// Body of `route(router)`: one registration per plan entry, in plan order
    pub fn render_routes(&mut self, plan: &RoutePlan) -> String {
        self.core(CoreModule::Security, "acl");
        self.core(CoreModule::Security, "ACLAction");
        self.core(CoreModule::Wrap, "wrap");

        let mut w = CodeWriter::new();
        for entry in &plan.entries {
            w.line(&format!(
                "router.{}({}, acl({}, ACLAction.{}), wrap(this.{}.bind(this)));",
                entry.verb.router_method(),
                ts_string(&entry.url_path),
                ts_string(&entry.acl_id),
                entry.acl_action.as_str(),
                entry.method_name
            ));
        }
        w.finish()
    }

    /// Body of one handler method
    pub fn render_handler(&mut self, body: &HandlerBody) -> String {
        let action = body.kind.method_name();
        let mut w = CodeWriter::new();
        for (i, clause) in body.clauses.iter().enumerate() {
            if i > 0 && starts_block(clause) {
                w.blank();
            }
            self.render_clause(&mut w, clause, action);
        }
        w.finish()
    }

    fn render_clause(&mut self, w: &mut CodeWriter, clause: &Clause, action: &str) {
        match clause {
            Clause::AuthCheck => {
                self.core(CoreModule::Security, "AuthUser");
                w.line("const user = req.session.user as AuthUser;");
                w.line("const isAdmin = user.isAdmin === true;");
            }
            Clause::BuildFilter => {
                self.core(CoreModule::Query, "toFilter");
                w.line("const filter = toFilter(req.query);");
            }
            Clause::OwnershipScope(fields) => {
                w.open("if (!isAdmin) {");
                for field in fields {
                    w.line(&format!("{} = user.id;", member("filter", &field.name)));
                }
                w.close("}");
            }
            Clause::Retrieve(retrieval) => self.render_retrieve(w, retrieval),
            Clause::ResolveUnique => {
                let model = self.model();
                w.line(&format!(
                    "const matches = await {}.count({{ id: req.params.id }});",
                    model
                ));
                w.open("if (matches !== 1) {");
                w.line(&format!(
                    "throw new Error(`Cannot resolve a unique {} record for id ${{req.params.id}}`);",
                    model
                ));
                w.close("}");
            }
            Clause::OwnershipCheck(fields) => {
                let mismatches: Vec<String> = fields
                    .iter()
                    .map(|f| format!("String({}) !== String(user.id)", owner_value("record", f)))
                    .collect();
                let condition = if mismatches.len() == 1 {
                    mismatches[0].clone()
                } else {
                    format!("({})", mismatches.join(" || "))
                };
                w.open(&format!("if (!isAdmin && {}) {{", condition));
                self.no_record(w);
                w.close("}");
            }
            Clause::Build { merge_existing } => {
                if *merge_existing {
                    w.line("const { id: _id, ...changes } = req.body;");
                    w.line("Object.assign(record, changes);");
                } else {
                    let model = self.model();
                    w.line(&format!("const record = new {}(req.body);", model));
                }
            }
            Clause::OwnershipAssign(fields) => {
                w.open("if (!isAdmin) {");
                for field in fields {
                    w.line(&format!("{} = user.id;", member("record", &field.name)));
                }
                w.close("}");
            }
            Clause::Validate => {
                self.core(CoreModule::Errors, "ValidationError");
                w.line("const errors = await record.validate();");
                w.open("if (errors.length > 0) {");
                w.line("throw new ValidationError(errors);");
                w.close("}");
            }
            Clause::ReplaceFiles(replacement) => self.render_replace_files(w, replacement, action),
            Clause::PurgeFiles(purge) => self.render_purge_files(w, purge, action),
            Clause::Persist(Persistence::Save) => w.line("await record.save();"),
            Clause::Persist(Persistence::Remove) => w.line("await record.remove();"),
            Clause::Assemble(Payload::Single) => {
                w.line("const payload: Array<Record<string, any>> = [record.toJSON()];");
            }
            Clause::Assemble(Payload::Many) => {
                w.line(
                    "const payload: Array<Record<string, any>> = records.map((item) => item.toJSON());",
                );
            }
            Clause::Redact(redaction) => self.render_redact(w, redaction),
            Clause::Respond(response) => w.line(match response {
                Response::Record => "res.json(payload[0]);",
                Response::Collection => "res.json(payload);",
                Response::Count => "res.json({ count: total });",
                Response::Removed => "res.json({ id: req.params.id });",
            }),
        }
    }

    fn render_retrieve(&mut self, w: &mut CodeWriter, retrieval: &Retrieval) {
        let model = self.model();
        match retrieval {
            Retrieval::ById { id, eager } => {
                let id = match id {
                    IdSource::Param => "req.params.id",
                    IdSource::Body => "req.body.id",
                };
                if eager.is_empty() {
                    w.line(&format!("const record = await {}.findById({});", model, id));
                } else {
                    let populate = eager
                        .iter()
                        .map(|f| ts_string(f))
                        .collect::<Vec<_>>()
                        .join(", ");
                    w.line(&format!(
                        "const record = await {}.findById({}, {{ populate: [{}] }});",
                        model, id, populate
                    ));
                }
                w.open("if (!record) {");
                self.no_record(w);
                w.close("}");
            }
            Retrieval::Many => {
                w.line(&format!("const records = await {}.find(filter);", model));
            }
            Retrieval::Count => {
                w.line(&format!("const total = await {}.count(filter);", model));
            }
        }
    }

    fn render_replace_files(&mut self, w: &mut CodeWriter, replacement: &FileReplacement, action: &str) {
        self.core(CoreModule::Files, "storeUploads");
        self.core(CoreModule::Files, "deleteFile");
        self.core(CoreModule::Logger, "logger");

        let storage = ts_string(&replacement.storage_dir);
        w.line(&format!("const uploads = await storeUploads(req, {});", storage));

        if !replacement.is_joint() {
            // previous file is deleted in the background; the response does not wait
            for field in &replacement.fields {
                let upload = member("uploads", field);
                let stored = member("record", field);
                w.open(&format!("if ({}) {{", upload));
                w.line(&format!("const previous = {};", stored));
                w.line(&format!("{} = {};", stored, upload));
                w.open("if (previous) {");
                w.open(&format!("deleteFile({}, previous).catch((err: Error) => {{", storage));
                w.line(&self.delete_warning(action, "previous"));
                w.close("});");
                w.close("}");
                w.close("}");
            }
            return;
        }

        w.open("await Promise.all([");
        for field in &replacement.fields {
            let upload = member("uploads", field);
            let stored = member("record", field);
            w.open("(async () => {");
            w.open(&format!("if (!{}) {{", upload));
            w.line("return;");
            w.close("}");
            w.line(&format!("const previous = {};", stored));
            w.line(&format!("{} = {};", stored, upload));
            w.open("if (previous) {");
            w.open(&format!(
                "await deleteFile({}, previous).catch((err: Error) => {{",
                storage
            ));
            w.line(&self.delete_warning(action, "previous"));
            w.close("});");
            w.close("}");
            w.close("})(),");
        }
        w.close("]);");
    }

    fn render_purge_files(&mut self, w: &mut CodeWriter, purge: &FilePurge, action: &str) {
        self.core(CoreModule::Files, "deleteFile");
        self.core(CoreModule::Logger, "logger");

        w.line("const storedFiles: string[] = [];");
        for field in &purge.files {
            let stored = member("record", field);
            w.open(&format!("if ({}) {{", stored));
            w.line(&format!("storedFiles.push({});", stored));
            w.close("}");
        }
        for field in &purge.file_lists {
            w.line(&format!(
                "storedFiles.push(...({} ?? []));",
                member("record", field)
            ));
        }
        w.open("await Promise.all(");
        w.open("storedFiles.map((file) =>");
        w.open(&format!(
            "deleteFile({}, file).catch((err: Error) => {{",
            ts_string(&purge.storage_dir)
        ));
        w.line(&self.delete_warning(action, "file"));
        w.close("}),");
        w.close("),");
        w.close(");");
    }

    fn delete_warning(&self, action: &str, file_var: &str) -> String {
        format!(
            "logger.warn(`[{}] {}: failed to delete file ${{{}}}: ${{err.message}}`);",
            action, self.ctx.controller_class, file_var
        )
    }

    fn render_redact(&mut self, w: &mut CodeWriter, redaction: &Redaction) {
        w.open("for (const item of payload) {");
        for field in &redaction.fields {
            w.line(&format!("delete {};", member("item", field)));
        }
        for nested in &redaction.nested {
            let Some(target) = nested.target() else {
                continue;
            };
            let class = to_model_class(&target.model);
            self.require(Requirement::Model {
                name: class.clone(),
                path: target.path.clone(),
            });

            let mut guard = member("item", &nested.path[0].field);
            let mut access = guard.clone();
            for hop in &nested.path[1..] {
                guard = optional_member(&guard, &hop.field);
                access = member(&access, &hop.field);
            }
            w.open(&format!("if ({}) {{", guard));
            for field in &nested.fields {
                w.line(&format!(
                    "delete {};",
                    member(&format!("({} as Partial<{}>)", access, class), field)
                ));
            }
            w.close("}");
        }
        w.close("}");
    }
}

/// Clauses that begin a new visual block in the handler
fn starts_block(clause: &Clause) -> bool {
    !matches!(
        clause,
        Clause::OwnershipScope(_) | Clause::OwnershipAssign(_) | Clause::Persist(_) | Clause::Redact(_)
    )
}

/// Value compared against the user's id: scalar, or the related record's id
fn owner_value(object: &str, field: &OwnerField) -> String {
    let value = member(object, &field.name);
    if field.via_relation {
        format!("{}?.id ?? {}", value, value)
    } else {
        value
    }
}

/// Line-oriented writer with two-space block indentation
#[derive(Debug, Default)]
pub struct CodeWriter {
    lines: Vec<String>,
    indent: usize,
}

impl CodeWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn line(&mut self, text: &str) {
        self.lines.push(format!("{}{}", "  ".repeat(self.indent), text));
    }

    pub fn blank(&mut self) {
        self.lines.push(String::new());
    }

    /// Write a line and indent what follows
    pub fn open(&mut self, text: &str) {
        self.line(text);
        self.indent += 1;
    }

    /// Dedent and write a closing line
    pub fn close(&mut self, text: &str) {
        self.indent = self.indent.saturating_sub(1);
        self.line(text);
    }

    pub fn finish(self) -> String {
        self.lines.join("\n")
    }
}
