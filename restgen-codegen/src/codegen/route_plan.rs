//! Route plan: the fixed route table of a generated controller

use std::fmt;

use super::naming::{normalize_route_path, to_acl_id};

/// HTTP verb of a route entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HttpVerb {
    Get,
    Post,
    Put,
    Delete,
}

impl HttpVerb {
    /// Router method used to register the route
    pub fn router_method(&self) -> &'static str {
        match self {
            Self::Get => "get",
            Self::Post => "post",
            Self::Put => "put",
            Self::Delete => "delete",
        }
    }
}

impl fmt::Display for HttpVerb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Delete => "DELETE",
        })
    }
}

/// Access-control operation class a route is authorized for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AclAction {
    Read,
    Add,
    Edit,
    Delete,
}

impl AclAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Read => "Read",
            Self::Add => "Add",
            Self::Edit => "Edit",
            Self::Delete => "Delete",
        }
    }
}

/// Which handler body a route gets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HandlerKind {
    Count,
    GetOne,
    GetMany,
    Create,
    Update,
    Delete,
    Upload,
}

impl HandlerKind {
    /// Controller method implementing the handler
    pub fn method_name(&self) -> &'static str {
        match self {
            Self::Count => "count",
            Self::GetOne => "getOne",
            Self::GetMany => "getMany",
            Self::Create => "create",
            Self::Update => "update",
            Self::Delete => "remove",
            Self::Upload => "upload",
        }
    }
}

/// One (verb, path, ACL, handler) tuple of the route table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteEntry {
    pub method_name: &'static str,
    pub verb: HttpVerb,
    pub url_path: String,
    /// Dotted access-control identifier of the controller's resource
    pub acl_id: String,
    pub acl_action: AclAction,
    pub kind: HandlerKind,
}

/// Ordered route table of one controller
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoutePlan {
    pub base_path: String,
    pub acl_id: String,
    pub version: String,
    pub entries: Vec<RouteEntry>,
}

impl RoutePlan {
    /// Build the route table.
    ///
    /// The detail and upload routes live under the list path; the upload route is
    /// only present when the model has File fields.
    pub fn build(controller_name: &str, route_base: &str, version: &str, with_upload: bool) -> Self {
        let base_path = normalize_route_path(route_base, controller_name);
        let acl_id = to_acl_id(&base_path);

        let mut table = vec![
            (HttpVerb::Get, format!("{}/count", base_path), AclAction::Read, HandlerKind::Count),
            (HttpVerb::Get, format!("{}/:id", base_path), AclAction::Read, HandlerKind::GetOne),
            (HttpVerb::Get, base_path.clone(), AclAction::Read, HandlerKind::GetMany),
            (HttpVerb::Post, base_path.clone(), AclAction::Add, HandlerKind::Create),
            (HttpVerb::Put, base_path.clone(), AclAction::Edit, HandlerKind::Update),
            (HttpVerb::Delete, format!("{}/:id", base_path), AclAction::Delete, HandlerKind::Delete),
        ];
        if with_upload {
            table.push((
                HttpVerb::Post,
                format!("{}/file/:id", base_path),
                AclAction::Edit,
                HandlerKind::Upload,
            ));
        }

        let entries = table
            .into_iter()
            .map(|(verb, url_path, acl_action, kind)| RouteEntry {
                method_name: kind.method_name(),
                verb,
                url_path,
                acl_id: acl_id.clone(),
                acl_action,
                kind,
            })
            .collect();

        Self {
            base_path,
            acl_id,
            version: version.to_string(),
            entries,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn routes(plan: &RoutePlan) -> Vec<(String, String)> {
        plan.entries
            .iter()
            .map(|e| (e.verb.to_string(), e.url_path.clone()))
            .collect()
    }

    #[test]
    fn test_account_profile_plan() {
        let plan = RoutePlan::build("profile", "account", "v1", false);
        assert_eq!(plan.base_path, "/account/profile");
        assert_eq!(plan.acl_id, "account.profile");
        assert_eq!(
            routes(&plan),
            vec![
                ("GET".to_string(), "/account/profile/count".to_string()),
                ("GET".to_string(), "/account/profile/:id".to_string()),
                ("GET".to_string(), "/account/profile".to_string()),
                ("POST".to_string(), "/account/profile".to_string()),
                ("PUT".to_string(), "/account/profile".to_string()),
                ("DELETE".to_string(), "/account/profile/:id".to_string()),
            ]
        );
        assert!(plan.entries.iter().all(|e| e.kind != HandlerKind::Upload));
    }

    #[test]
    fn test_upload_route_only_with_files() {
        let plan = RoutePlan::build("gallery", "/media/", "v2", true);
        assert_eq!(plan.entries.len(), 7);
        let upload = plan.entries.last().unwrap();
        assert_eq!(upload.verb, HttpVerb::Post);
        assert_eq!(upload.url_path, "/media/gallery/file/:id");
        assert_eq!(upload.acl_action, AclAction::Edit);
        assert_eq!(upload.method_name, "upload");
        assert_eq!(plan.version, "v2");
    }

    #[test]
    fn test_acl_actions() {
        let plan = RoutePlan::build("profile", "", "v1", true);
        let actions: Vec<AclAction> = plan.entries.iter().map(|e| e.acl_action).collect();
        assert_eq!(
            actions,
            vec![
                AclAction::Read,
                AclAction::Read,
                AclAction::Read,
                AclAction::Add,
                AclAction::Edit,
                AclAction::Delete,
                AclAction::Edit,
            ]
        );
        assert!(plan.entries.iter().all(|e| e.acl_id == "profile"));
    }

    #[test]
    fn test_method_names() {
        let plan = RoutePlan::build("profile", "", "v1", true);
        let names: Vec<&str> = plan.entries.iter().map(|e| e.method_name).collect();
        assert_eq!(
            names,
            vec!["count", "getOne", "getMany", "create", "update", "remove", "upload"]
        );
    }
}
