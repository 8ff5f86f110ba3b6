//! Handler statement tree
//!
//! A handler body is an ordered list of typed clauses. The synthesizer decides which
//! clauses a route needs; `render` lowers them to target syntax.

use super::route_plan::HandlerKind;
use crate::schema::RelationRedaction;

/// Synthesized body of one route handler
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HandlerBody {
    pub kind: HandlerKind,
    pub clauses: Vec<Clause>,
}

impl HandlerBody {
    pub fn has_auth(&self) -> bool {
        self.clauses.iter().any(|c| matches!(c, Clause::AuthCheck))
    }

    pub fn has_ownership(&self) -> bool {
        self.clauses.iter().any(|c| {
            matches!(
                c,
                Clause::OwnershipScope(_) | Clause::OwnershipCheck(_) | Clause::OwnershipAssign(_)
            )
        })
    }

    pub fn redaction(&self) -> Option<&Redaction> {
        self.clauses.iter().find_map(|c| match c {
            Clause::Redact(r) => Some(r),
            _ => None,
        })
    }

    /// Index of the first clause matching `pred`
    pub fn position(&self, pred: impl Fn(&Clause) -> bool) -> Option<usize> {
        self.clauses.iter().position(pred)
    }
}

/// One step of a handler
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Clause {
    /// Bind the session user and `isAdmin`
    AuthCheck,
    /// Translate request query parameters into a filter
    BuildFilter,
    /// Restrict the filter to the user's own records for non-admins
    OwnershipScope(Vec<OwnerField>),
    /// Fetch the record(s) the handler operates on
    Retrieve(Retrieval),
    /// Fail unless exactly one record matches the upload target id
    ResolveUnique,
    /// Fail with NoRecord for non-admins when any owner field differs from the user's id
    OwnershipCheck(Vec<OwnerField>),
    /// Construct the model instance from the request body
    Build { merge_existing: bool },
    /// Force owner fields to the user's id for non-admins
    OwnershipAssign(Vec<OwnerField>),
    /// Validate the instance, short-circuiting with ValidationError
    Validate,
    /// Store uploads and delete replaced files
    ReplaceFiles(FileReplacement),
    /// Delete every stored file of the record, best-effort
    PurgeFiles(FilePurge),
    Persist(Persistence),
    /// Turn the result into plain response objects
    Assemble(Payload),
    Redact(Redaction),
    Respond(Response),
}

/// Owner-verified field and how its value resolves to a user id
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OwnerField {
    pub name: String,
    /// Relation fields resolve through the related record's id
    pub via_relation: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Retrieval {
    /// Single record by id, failing with NoRecord when absent
    ById { id: IdSource, eager: Vec<String> },
    /// Records matching the filter
    Many,
    /// Number of records matching the filter
    Count,
}

/// Where a single-record handler reads the target id from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdSource {
    Param,
    Body,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileReplacement {
    pub fields: Vec<String>,
    pub storage_dir: String,
}

impl FileReplacement {
    /// Several fields are replaced in parallel and awaited jointly
    pub fn is_joint(&self) -> bool {
        self.fields.len() > 1
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilePurge {
    /// File fields
    pub files: Vec<String>,
    /// List-of-File fields, each element deleted individually
    pub file_lists: Vec<String>,
    pub storage_dir: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Persistence {
    Save,
    Remove,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Payload {
    Single,
    Many,
}

/// Fields deleted from every payload item
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Redaction {
    pub fields: Vec<String>,
    pub nested: Vec<RelationRedaction>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Response {
    /// First payload item
    Record,
    /// Whole payload
    Collection,
    Count,
    /// Id of the removed record
    Removed,
}
