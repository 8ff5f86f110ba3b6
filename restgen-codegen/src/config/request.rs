//! Arguments of a single controller generation run

use regex::Regex;
use std::sync::OnceLock;

use crate::error::{CodegenError, Result};

/// One `controller <name> --model <model> --route <route> --version <version>` invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControllerRequest {
    /// Controller name, lower-case letters only
    pub name: String,
    /// Model the controller serves
    pub model: String,
    /// Route base the controller is mounted under
    pub route: String,
    /// API version; falls back to `CodegenConfig::api_version`
    pub version: Option<String>,
}

impl ControllerRequest {
    pub fn new(name: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            model: model.into(),
            route: String::new(),
            version: None,
        }
    }

    pub fn route(mut self, route: impl Into<String>) -> Self {
        self.route = route.into();
        self
    }

    pub fn version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    /// Version to generate for, given the configured default
    pub fn resolved_version<'a>(&'a self, default: &'a str) -> &'a str {
        self.version.as_deref().unwrap_or(default)
    }

    /// Reject malformed arguments before any file is touched
    pub fn validate(&self, default_version: &str) -> Result<()> {
        static NAME_RE: OnceLock<Regex> = OnceLock::new();
        static VERSION_RE: OnceLock<Regex> = OnceLock::new();

        let name_re = NAME_RE.get_or_init(|| Regex::new(r"^[a-z]+$").expect("valid name pattern"));
        let version_re =
            VERSION_RE.get_or_init(|| Regex::new(r"^v[0-9]+$").expect("valid version pattern"));

        if self.name.is_empty() {
            return Err(CodegenError::ConfigError(
                "a controller name is required".into(),
            ));
        }
        if !name_re.is_match(&self.name) {
            return Err(CodegenError::ConfigError(format!(
                "invalid controller name `{}`: only lower-case letters a-z are allowed",
                self.name
            )));
        }

        // `--model` given without `=value` is parsed upstream as a boolean flag
        if self.model == "true" {
            return Err(CodegenError::ConfigError(
                "malformed --model flag: use --model=<ModelName>".into(),
            ));
        }
        if self.model.trim().is_empty() {
            return Err(CodegenError::ConfigError("a model name is required".into()));
        }

        let version = self.resolved_version(default_version);
        if !version_re.is_match(version) {
            return Err(CodegenError::ConfigError(format!(
                "invalid API version `{}`: expected v<number>",
                version
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_request() {
        let request = ControllerRequest::new("profile", "User")
            .route("account")
            .version("v1");
        assert!(request.validate("v1").is_ok());
        assert_eq!(request.resolved_version("v9"), "v1");
    }

    #[test]
    fn test_name_with_digits_is_rejected() {
        let request = ControllerRequest::new("profile2", "User");
        let err = request.validate("v1").unwrap_err();
        assert!(matches!(err, CodegenError::ConfigError(_)));
        assert!(err.to_string().contains("profile2"));
    }

    #[test]
    fn test_name_rules() {
        for bad in ["", "Profile", "user_profile", "user-profile", "prof ile"] {
            assert!(
                ControllerRequest::new(bad, "User").validate("v1").is_err(),
                "{bad:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_bare_model_flag_is_rejected() {
        let request = ControllerRequest::new("profile", "true");
        let err = request.validate("v1").unwrap_err();
        assert!(err.to_string().contains("--model"));

        assert!(ControllerRequest::new("profile", "  ").validate("v1").is_err());
    }

    #[test]
    fn test_version_falls_back_to_default() {
        let request = ControllerRequest::new("profile", "User");
        assert_eq!(request.resolved_version("v3"), "v3");
        assert!(request.validate("v3").is_ok());
        assert!(request.validate("latest").is_err());
    }
}
