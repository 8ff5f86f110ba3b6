//! Naming utilities for code generation

use heck::{ToKebabCase, ToLowerCamelCase, ToPascalCase};

/// Convert a controller name to its class name
/// e.g., "profile" -> "ProfileController"
pub fn to_controller_class(name: &str) -> String {
    format!("{}Controller", name.to_pascal_case())
}

/// Controller file stem, e.g. "profile" -> "profile.controller"
pub fn to_controller_file_stem(name: &str) -> String {
    format!("{}.controller", name.to_kebab_case())
}

/// Convert a model name to the class name used in generated code
pub fn to_model_class(model: &str) -> String {
    model.to_pascal_case()
}

/// Module file stem of a model's type declaration
/// e.g., "BlogPost" -> "blog-post"
pub fn to_model_file_stem(model: &str) -> String {
    model.to_kebab_case()
}

/// Storage subdirectory holding a model's uploaded files
pub fn to_storage_dir(model: &str) -> String {
    model.to_kebab_case()
}

/// Property name a controller is bound to in the registry
pub fn to_binding_name(name: &str) -> String {
    name.to_lower_camel_case()
}

/// Build the canonical route path for a controller.
///
/// The route base gets a leading slash, the lower-camel-cased controller name is
/// appended as the final segment, and repeated or trailing slashes are collapsed.
/// e.g., ("account/", "profile") -> "/account/profile"
pub fn normalize_route_path(route_base: &str, controller_name: &str) -> String {
    let joined = format!("/{}/{}", route_base, controller_name.to_lower_camel_case());
    let segments: Vec<&str> = joined.split('/').filter(|s| !s.is_empty()).collect();
    format!("/{}", segments.join("/"))
}

/// Convert a route path to a dotted access-control identifier
/// e.g., "/account/profile" -> "account.profile"
pub fn to_acl_id(path: &str) -> String {
    let dotted = path.replace('/', ".");
    dotted.trim_start_matches('.').to_string()
}

/// Check if a name can be used after `.` in generated property access
pub fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' || c == '$' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$')
}

/// Property access expression, falling back to bracket syntax for odd names
/// e.g., ("item", "userId") -> "item.userId", ("item", "user-id") -> "item['user-id']"
pub fn member(object: &str, field: &str) -> String {
    if is_identifier(field) {
        format!("{}.{}", object, field)
    } else {
        format!("{}[{}]", object, ts_string(field))
    }
}

/// Optional-chained property access, e.g. ("item", "author") -> "item.author?"
/// used as a prefix for deeper access
pub fn optional_member(object: &str, field: &str) -> String {
    if is_identifier(field) {
        format!("{}?.{}", object, field)
    } else {
        format!("{}?.[{}]", object, ts_string(field))
    }
}

/// Single-quoted TypeScript string literal denoting exactly `value`
pub fn ts_string(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('\'');
    for c in value.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\'' => out.push_str("\\'"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '\u{2028}' | '\u{2029}' => out.push_str(&format!("\\u{:04x}", c as u32)),
            c if c.is_control() => out.push_str(&format!("\\u{:04x}", c as u32)),
            c => out.push(c),
        }
    }
    out.push('\'');
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_controller_class() {
        assert_eq!(to_controller_class("profile"), "ProfileController");
        assert_eq!(to_controller_file_stem("profile"), "profile.controller");
    }

    #[test]
    fn test_model_names() {
        assert_eq!(to_model_class("user"), "User");
        assert_eq!(to_model_file_stem("BlogPost"), "blog-post");
        assert_eq!(to_storage_dir("PhotoAlbum"), "photo-album");
    }

    #[test]
    fn test_normalize_route_path() {
        assert_eq!(normalize_route_path("account", "profile"), "/account/profile");
        assert_eq!(normalize_route_path("/account/", "profile"), "/account/profile");
        assert_eq!(normalize_route_path("//api//account", "profile"), "/api/account/profile");
        assert_eq!(normalize_route_path("", "profile"), "/profile");
        assert_eq!(normalize_route_path("/", "profile"), "/profile");
    }

    #[test]
    fn test_to_acl_id() {
        assert_eq!(to_acl_id("/account/profile"), "account.profile");
        assert_eq!(to_acl_id("/profile"), "profile");
        assert_eq!(to_acl_id("/api/account/profile"), "api.account.profile");
    }

    #[test]
    fn test_member_access() {
        assert_eq!(member("item", "userId"), "item.userId");
        assert_eq!(member("item", "$ref"), "item.$ref");
        assert_eq!(member("item", "user-id"), "item['user-id']");
        assert_eq!(member("item", "2fa"), "item['2fa']");
        assert_eq!(optional_member("item", "author"), "item?.author");
        assert_eq!(optional_member("item", "co-author"), "item?.['co-author']");
    }

    #[test]
    fn test_member_access_escapes_bracket_keys() {
        assert_eq!(member("item", "pass\\bword"), "item['pass\\\\bword']");
        assert_eq!(member("item", "api\nkey"), "item['api\\nkey']");
        assert_eq!(member("item", "o'neil"), "item['o\\'neil']");
        assert_eq!(optional_member("item", "a\\b"), "item?.['a\\\\b']");
        assert!(!member("item", "api\r\nkey").contains('\n'));
    }

    #[test]
    fn test_ts_string_escapes() {
        assert_eq!(ts_string("/a/b"), "'/a/b'");
        assert_eq!(ts_string("it's"), "'it\\'s'");
        assert_eq!(ts_string("a\\b"), "'a\\\\b'");
        assert_eq!(ts_string("a\tb\u{7}"), "'a\\tb\\u0007'");
        assert_eq!(ts_string("x\u{2028}"), "'x\\u2028'");
    }
}
