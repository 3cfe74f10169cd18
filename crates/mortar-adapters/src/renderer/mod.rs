//! Whole-file artifact renderers.
//!
//! Artifacts are rendered from built-in `{{VAR}}` templates and written only
//! when their content changes. There is no merge step: hand edits to an
//! artifact are overwritten on the next run.

mod proto;
mod sql;

use std::collections::BTreeMap;

use mortar_core::application::{ApplicationError, ports::ArtifactRenderer};
use mortar_core::error::MortarResult;

pub use proto::ProtoSchemaRenderer;
pub use sql::SqlSchemaRenderer;

/// Every built-in artifact renderer.
pub fn builtin() -> Vec<Box<dyn ArtifactRenderer>> {
    vec![Box::new(ProtoSchemaRenderer), Box::new(SqlSchemaRenderer)]
}

/// Variables for one template render.
///
/// Unlike a lenient substitution, rendering fails when a placeholder is left
/// without a value, so a typo in a template never reaches disk.
#[derive(Debug, Clone, Default)]
pub struct TemplateContext {
    variables: BTreeMap<String, String>,
}

impl TemplateContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_variable(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.variables.insert(key.into(), value.into());
        self
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.variables.get(key).map(String::as_str)
    }

    /// Replace every `{{KEY}}` in `template`.
    ///
    /// Values are inserted verbatim and never rescanned.
    pub fn render(&self, artifact: &str, template: &str) -> MortarResult<String> {
        let mut out = String::with_capacity(template.len());
        let mut rest = template;

        while let Some(start) = rest.find("{{") {
            out.push_str(&rest[..start]);
            let after = &rest[start + 2..];
            let Some(end) = after.find("}}") else {
                return Err(unterminated(artifact));
            };
            let key = &after[..end];
            let value = self.get(key).ok_or_else(|| ApplicationError::RenderingFailed {
                artifact: artifact.to_string(),
                reason: format!("no value for {{{{{key}}}}}"),
            })?;
            out.push_str(value);
            rest = &after[end + 2..];
        }
        out.push_str(rest);
        Ok(out)
    }
}

fn unterminated(artifact: &str) -> mortar_core::error::MortarError {
    ApplicationError::RenderingFailed {
        artifact: artifact.to_string(),
        reason: "unterminated placeholder".into(),
    }
    .into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn substitutes_every_placeholder() {
        let ctx = TemplateContext::new()
            .with_variable("ENTITY", "Widget")
            .with_variable("TABLE", "widgets");
        let text = ctx
            .render("test", "{{ENTITY}} lives in {{TABLE}}; {{ENTITY}}!")
            .unwrap();
        assert_eq!(text, "Widget lives in widgets; Widget!");
    }

    #[test]
    fn values_are_not_rescanned() {
        let ctx = TemplateContext::new().with_variable("A", "{{B}}");
        assert_eq!(ctx.render("test", "x{{A}}y").unwrap(), "x{{B}}y");
    }

    #[test]
    fn missing_variable_is_an_error() {
        let err = TemplateContext::new().render("proto", "{{NOPE}}").unwrap_err();
        assert!(err.to_string().contains("no value for {{NOPE}}"));
    }

    #[test]
    fn unterminated_placeholder_is_an_error() {
        assert!(TemplateContext::new().render("proto", "a {{B").is_err());
    }

    #[test]
    fn builtin_covers_both_artifacts() {
        let names: Vec<&str> = builtin().iter().map(|r| r.name()).collect();
        assert_eq!(names, ["proto", "sql-schema"]);
    }
}
