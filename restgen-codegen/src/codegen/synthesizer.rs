//! Handler body synthesizer - decides which clauses each route needs

use tracing::debug;

use super::clause::{
    Clause, FilePurge, FileReplacement, HandlerBody, IdSource, OwnerField, Payload, Persistence,
    Redaction, Response, Retrieval,
};
use super::naming::to_storage_dir;
use super::route_plan::{HandlerKind, RouteEntry, RoutePlan};
use crate::error::SchemaError;
use crate::schema::{
    FieldType, ModelFieldSet, ModelSchema, RelationRedaction, SchemaInspector, SecurityProfile,
};

/// Per-model facts the handler clauses are derived from
#[derive(Debug, Clone)]
pub struct HandlerSynthesizer<'a> {
    model: &'a ModelSchema,
    profile: SecurityProfile,
    owner_fields: Vec<OwnerField>,
    relations: Vec<String>,
    redactions: Vec<RelationRedaction>,
    file_fields: Vec<String>,
    file_list_fields: Vec<String>,
}

impl<'a> HandlerSynthesizer<'a> {
    pub fn new(
        inspector: &SchemaInspector<'a>,
        model: &str,
        max_relation_depth: usize,
    ) -> Result<Self, SchemaError> {
        let schema = inspector.model(model)?;
        let profile = inspector.security_profile(model)?;

        let owner_fields = profile
            .owner_verified_fields
            .iter()
            .map(|name| {
                let meta = inspector.field_meta(model, name)?;
                Ok(OwnerField {
                    name: name.clone(),
                    via_relation: meta.field_type == FieldType::Relation,
                })
            })
            .collect::<Result<Vec<_>, SchemaError>>()?;

        let relations = field_names(inspector.fields_by_type(model, FieldType::Relation)?);
        let file_fields = field_names(inspector.fields_by_type(model, FieldType::File)?);
        let file_list_fields = field_names(inspector.list_fields_of(model, FieldType::File)?);
        let redactions = inspector.relation_redactions(model, max_relation_depth)?;

        debug!(
            "Model {}: {} owner fields, {} confidential, {} nested redactions, {} file fields",
            schema.name,
            owner_fields.len(),
            profile.confidential_fields.len(),
            redactions.len(),
            file_fields.len() + file_list_fields.len()
        );

        Ok(Self {
            model: schema,
            profile,
            owner_fields,
            relations,
            redactions,
            file_fields,
            file_list_fields,
        })
    }

    pub fn model(&self) -> &'a ModelSchema {
        self.model
    }

    /// Whether the model has File fields (and therefore an upload route)
    pub fn has_file_fields(&self) -> bool {
        !self.file_fields.is_empty()
    }

    /// Synthesize every route of a plan, in plan order
    pub fn synthesize_all(&self, plan: &RoutePlan) -> Vec<HandlerBody> {
        plan.entries.iter().map(|e| self.synthesize(e)).collect()
    }

    /// Synthesize the body of one route
    pub fn synthesize(&self, route: &RouteEntry) -> HandlerBody {
        let mut clauses = Vec::new();
        let owned = self.profile.requires_owner();

        if owned {
            clauses.push(Clause::AuthCheck);
        }

        match route.kind {
            HandlerKind::Count => {
                self.push_filtered(&mut clauses, Retrieval::Count);
                clauses.push(Clause::Respond(Response::Count));
            }
            HandlerKind::GetMany => {
                self.push_filtered(&mut clauses, Retrieval::Many);
                self.push_response(&mut clauses, Payload::Many, Response::Collection);
            }
            HandlerKind::GetOne => {
                clauses.push(Clause::Retrieve(Retrieval::ById {
                    id: IdSource::Param,
                    eager: self.relations.clone(),
                }));
                self.push_ownership_check(&mut clauses);
                self.push_response(&mut clauses, Payload::Single, Response::Record);
            }
            HandlerKind::Create => {
                clauses.push(Clause::Build {
                    merge_existing: false,
                });
                self.push_ownership_assign(&mut clauses);
                clauses.push(Clause::Validate);
                clauses.push(Clause::Persist(Persistence::Save));
                self.push_response(&mut clauses, Payload::Single, Response::Record);
            }
            HandlerKind::Update => {
                clauses.push(Clause::Retrieve(Retrieval::ById {
                    id: IdSource::Body,
                    eager: Vec::new(),
                }));
                self.push_ownership_check(&mut clauses);
                clauses.push(Clause::Build {
                    merge_existing: true,
                });
                self.push_ownership_assign(&mut clauses);
                clauses.push(Clause::Validate);
                clauses.push(Clause::Persist(Persistence::Save));
                self.push_response(&mut clauses, Payload::Single, Response::Record);
            }
            HandlerKind::Delete => {
                clauses.push(Clause::Retrieve(Retrieval::ById {
                    id: IdSource::Param,
                    eager: Vec::new(),
                }));
                self.push_ownership_check(&mut clauses);
                if !self.file_fields.is_empty() || !self.file_list_fields.is_empty() {
                    clauses.push(Clause::PurgeFiles(FilePurge {
                        files: self.file_fields.clone(),
                        file_lists: self.file_list_fields.clone(),
                        storage_dir: to_storage_dir(&self.model.name),
                    }));
                }
                clauses.push(Clause::Persist(Persistence::Remove));
                clauses.push(Clause::Respond(Response::Removed));
            }
            HandlerKind::Upload => {
                clauses.push(Clause::ResolveUnique);
                clauses.push(Clause::Retrieve(Retrieval::ById {
                    id: IdSource::Param,
                    eager: Vec::new(),
                }));
                self.push_ownership_check(&mut clauses);
                clauses.push(Clause::ReplaceFiles(FileReplacement {
                    fields: self.file_fields.clone(),
                    storage_dir: to_storage_dir(&self.model.name),
                }));
                clauses.push(Clause::Persist(Persistence::Save));
                self.push_response(&mut clauses, Payload::Single, Response::Record);
            }
        }

        HandlerBody {
            kind: route.kind,
            clauses,
        }
    }

    fn push_filtered(&self, clauses: &mut Vec<Clause>, retrieval: Retrieval) {
        clauses.push(Clause::BuildFilter);
        if self.profile.requires_owner() {
            clauses.push(Clause::OwnershipScope(self.owner_fields.clone()));
        }
        clauses.push(Clause::Retrieve(retrieval));
    }

    fn push_ownership_check(&self, clauses: &mut Vec<Clause>) {
        if self.profile.requires_owner() {
            clauses.push(Clause::OwnershipCheck(self.owner_fields.clone()));
        }
    }

    fn push_ownership_assign(&self, clauses: &mut Vec<Clause>) {
        if self.profile.requires_owner() {
            clauses.push(Clause::OwnershipAssign(self.owner_fields.clone()));
        }
    }

    /// Assemble the payload, redact it, then respond
    fn push_response(&self, clauses: &mut Vec<Clause>, payload: Payload, response: Response) {
        clauses.push(Clause::Assemble(payload));
        if self.profile.has_confidential() || !self.redactions.is_empty() {
            clauses.push(Clause::Redact(Redaction {
                fields: self.profile.confidential_fields.clone(),
                nested: self.redactions.clone(),
            }));
        }
        clauses.push(Clause::Respond(response));
    }
}

fn field_names(set: Option<ModelFieldSet<'_>>) -> Vec<String> {
    set.map(|s| s.names()).unwrap_or_default()
}
