//! Validation of entries and of the whole document before it is written.

use std::collections::HashSet;

use crate::config::schema::{
    ConfigDocument, Context, ContextKind, Server, ORG_ID_KEY, PROJECT_NAME_KEY, SPACE_NAME_KEY,
};
use crate::error::{Error, Result};

/// Validates entries and documents.
///
/// # Examples
///
/// ```
/// use tanzu_config::config::ConfigValidator;
/// use tanzu_config::{Context, ContextKind};
///
/// let ctx = Context::new("dev", ContextKind::Kubernetes);
/// ConfigValidator::validate_context(&ctx).unwrap();
///
/// let unnamed = Context::new("  ", ContextKind::Kubernetes);
/// assert!(ConfigValidator::validate_context(&unnamed).is_err());
/// ```
pub struct ConfigValidator;

impl ConfigValidator {
    /// Validate a context before it is stored.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] if the name is invalid or the active
    /// resource of a `tanzu` context is inconsistent.
    pub fn validate_context(ctx: &Context) -> Result<()> {
        Self::validate_identifier("name", &ctx.name)?;

        if ctx.target == ContextKind::Tanzu {
            Self::validate_active_resource(ctx)?;
        }

        Ok(())
    }

    /// Validate a server before it is stored.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] if the name is invalid.
    pub fn validate_server(server: &Server) -> Result<()> {
        Self::validate_identifier("name", &server.name)
    }

    /// Validate document-level invariants: unique names and resolvable
    /// current pointers.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] describing the first violation found.
    pub fn validate_document(doc: &ConfigDocument) -> Result<()> {
        let mut seen = HashSet::new();
        for ctx in &doc.contexts {
            if !seen.insert(ctx.name.as_str()) {
                return Err(Error::Validation {
                    field: "contexts".into(),
                    message: format!("duplicate context name '{}'", ctx.name),
                });
            }
        }

        let mut seen = HashSet::new();
        for server in &doc.servers {
            if !seen.insert(server.name.as_str()) {
                return Err(Error::Validation {
                    field: "servers".into(),
                    message: format!("duplicate server name '{}'", server.name),
                });
            }
        }

        for (kind, name) in &doc.current_context {
            match doc.context(name) {
                Some(ctx) if &ctx.target == kind => {}
                Some(ctx) => {
                    return Err(Error::Validation {
                        field: "currentContext".into(),
                        message: format!(
                            "current {kind} context '{name}' is of type {}",
                            ctx.target
                        ),
                    })
                }
                None => {
                    return Err(Error::Validation {
                        field: "currentContext".into(),
                        message: format!("current {kind} context '{name}' does not exist"),
                    })
                }
            }
        }

        if let Some(name) = &doc.current_server {
            if doc.server(name).is_none() {
                return Err(Error::Validation {
                    field: "current".into(),
                    message: format!("current server '{name}' does not exist"),
                });
            }
        }

        Ok(())
    }

    /// Validate string identifiers (entry names).
    ///
    /// Checks that the identifier is non-empty after trimming, contains no
    /// null bytes, and is not longer than 255 characters.
    fn validate_identifier(field: &str, value: &str) -> Result<()> {
        let trimmed = value.trim();

        if trimmed.is_empty() {
            return Err(Error::Validation {
                field: field.into(),
                message: "Cannot be empty or only whitespace".into(),
            });
        }

        if trimmed.contains('\0') {
            return Err(Error::Validation {
                field: field.into(),
                message: "Cannot contain null bytes".into(),
            });
        }

        if trimmed.len() > 255 {
            return Err(Error::Validation {
                field: field.into(),
                message: "Cannot exceed 255 characters".into(),
            });
        }

        Ok(())
    }

    /// A selected project or space needs its parent scope.
    ///
    /// An absent metadata map is accepted here; reads report it as missing.
    fn validate_active_resource(ctx: &Context) -> Result<()> {
        let present = |key| ctx.metadata_str(key).is_some_and(|v| !v.is_empty());

        if (present(PROJECT_NAME_KEY) || present(SPACE_NAME_KEY)) && !present(ORG_ID_KEY) {
            return Err(Error::Validation {
                field: ORG_ID_KEY.into(),
                message: "an organization is required when a project or space is set".into(),
            });
        }

        if present(SPACE_NAME_KEY) && !present(PROJECT_NAME_KEY) {
            return Err(Error::Validation {
                field: PROJECT_NAME_KEY.into(),
                message: "a project is required when a space is set".into(),
            });
        }

        Ok(())
    }
}
