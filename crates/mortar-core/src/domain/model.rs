//! The entity model: what the user asks Mortar to generate.
//!
//! Read once at the start of a run (TOML or JSON via serde) and never
//! mutated afterwards.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::domain::error::DomainError;
use crate::domain::naming::{pluralize, to_camel_case, to_snake_case};
use crate::domain::value_objects::{Backend, FieldType, Format, Transport};

/// Owning application of every entity: the Go module path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Application {
    pub module: String,
}

impl Application {
    pub fn new(module: impl Into<String>) -> Self {
        Self {
            module: module.into(),
        }
    }

    /// Import path of a package inside this module.
    pub fn import_path(&self, package_dir: &str) -> String {
        format!("{}/{}", self.module.trim_end_matches('/'), package_dir)
    }
}

/// Top-level input document.
///
/// ```toml
/// [application]
/// module = "github.com/acme/shop"
///
/// [[entities]]
/// name = "Widget"
/// fields = ["Name:string(required)", "Weight:int"]
/// capabilities = { list = true, create = true }
/// transports = ["http"]
/// backends = ["memory"]
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityModel {
    pub application: Application,
    #[serde(default)]
    pub entities: Vec<EntityConfig>,
}

impl EntityModel {
    pub fn entity(&self, name: &str) -> Option<&EntityConfig> {
        self.entities.iter().find(|e| e.name == name)
    }
}

/// Optional behaviour switched on per entity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Capabilities {
    /// Listing with filtering and pagination.
    pub list: bool,
    pub create: bool,
    pub update: bool,
    /// Ordering of list results; only meaningful with `list`.
    pub order: bool,
    /// Per-operation permission checks in the use-case layer.
    pub permissions: bool,
}

/// One entity and everything generated for it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityConfig {
    pub name: String,
    pub fields: Vec<Field>,
    #[serde(default)]
    pub capabilities: Capabilities,
    #[serde(default)]
    pub transports: Vec<Transport>,
    #[serde(default)]
    pub backends: Vec<Backend>,
}

impl EntityConfig {
    pub fn new(name: impl Into<String>, fields: Vec<Field>) -> Self {
        Self {
            name: name.into(),
            fields,
            capabilities: Capabilities::default(),
            transports: Vec::new(),
            backends: Vec::new(),
        }
    }

    pub fn with_capabilities(mut self, capabilities: Capabilities) -> Self {
        self.capabilities = capabilities;
        self
    }

    pub fn with_transports(mut self, transports: impl IntoIterator<Item = Transport>) -> Self {
        self.transports = transports.into_iter().collect();
        self
    }

    pub fn with_backends(mut self, backends: impl IntoIterator<Item = Backend>) -> Self {
        self.backends = backends.into_iter().collect();
        self
    }

    /// `WidgetOrder` → `widget_order`; the file stem of every layer.
    pub fn file_stem(&self) -> String {
        to_snake_case(&self.name)
    }

    /// `Widget` → `widgets`; table name and route segment.
    pub fn plural(&self) -> String {
        pluralize(&self.file_stem())
    }

    /// `Widget` → `widget`; Go local variable name.
    pub fn var_name(&self) -> String {
        to_camel_case(&self.name)
    }

    pub fn has_transport(&self, transport: Transport) -> bool {
        self.transports.contains(&transport)
    }

    pub fn has_backend(&self, backend: Backend) -> bool {
        self.backends.contains(&backend)
    }

    /// Whether the generated record needs the `time` package.
    pub fn uses_time(&self) -> bool {
        self.fields.iter().any(|f| f.ty.uses_time())
    }

    /// Whether any field carries a format constraint (`is` rules).
    pub fn uses_formats(&self) -> bool {
        self.fields.iter().any(|f| f.format_rule().is_some())
    }
}

/// Constraint flags on one field.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Constraints {
    pub required: bool,
    pub format: Option<Format>,
}

/// One typed entity field.
///
/// Accepted either as a table or in compact form:
/// `"Email:string(required,email)"`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "FieldRepr")]
pub struct Field {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: FieldType,
    #[serde(flatten)]
    pub constraints: Constraints,
}

impl Field {
    pub fn new(name: impl Into<String>, ty: FieldType) -> Self {
        Self {
            name: name.into(),
            ty,
            constraints: Constraints::default(),
        }
    }

    pub fn required(mut self) -> Self {
        self.constraints.required = true;
        self
    }

    pub fn with_format(mut self, format: Format) -> Self {
        self.constraints.format = Some(format);
        self
    }

    /// Snake case column / proto field name.
    pub fn column(&self) -> String {
        to_snake_case(&self.name)
    }

    /// camelCase JSON key.
    pub fn json_name(&self) -> String {
        to_camel_case(&self.name)
    }

    /// The `is` rule for this field's format, when the type can carry one.
    pub fn format_rule(&self) -> Option<&'static str> {
        let textual = match &self.ty {
            FieldType::Optional(inner) => inner.is_textual(),
            other => other.is_textual(),
        };
        self.constraints
            .format
            .filter(|_| textual)
            .map(|format| format.go_rule())
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.name, self.ty)?;
        let mut flags = Vec::new();
        if self.constraints.required {
            flags.push("required".to_string());
        }
        if let Some(format) = self.constraints.format {
            flags.push(format.to_string());
        }
        if !flags.is_empty() {
            write!(f, "({})", flags.join(","))?;
        }
        Ok(())
    }
}

impl FromStr for Field {
    type Err = DomainError;

    /// `Name:type` with optional `(flag,...)` suffix.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let Some((name, rest)) = s.split_once(':') else {
            return Err(DomainError::InvalidField(format!(
                "`{s}` is not of the form Name:type"
            )));
        };
        let (ty, flags) = match rest.find('(') {
            Some(open) => {
                let Some(inner) = rest[open + 1..].strip_suffix(')') else {
                    return Err(DomainError::InvalidField(format!(
                        "unclosed constraint list in `{s}`"
                    )));
                };
                (&rest[..open], Some(inner))
            }
            None => (rest, None),
        };

        let mut field = Field::new(name.trim(), ty.parse()?);
        for flag in flags.into_iter().flat_map(|f| f.split(',')) {
            match flag.trim() {
                "" => {}
                "required" => field.constraints.required = true,
                other => field.constraints.format = Some(other.parse()?),
            }
        }
        Ok(field)
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum FieldRepr {
    Compact(String),
    Full {
        name: String,
        #[serde(rename = "type")]
        ty: FieldType,
        #[serde(default)]
        required: bool,
        #[serde(default)]
        format: Option<Format>,
    },
}

impl TryFrom<FieldRepr> for Field {
    type Error = DomainError;

    fn try_from(repr: FieldRepr) -> Result<Self, Self::Error> {
        match repr {
            FieldRepr::Compact(text) => text.parse(),
            FieldRepr::Full {
                name,
                ty,
                required,
                format,
            } => Ok(Field {
                name,
                ty,
                constraints: Constraints { required, format },
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compact_field_form() {
        let field: Field = "Email:string(required,email)".parse().unwrap();
        assert_eq!(field.name, "Email");
        assert_eq!(field.ty, FieldType::String);
        assert!(field.constraints.required);
        assert_eq!(field.constraints.format, Some(Format::Email));
        assert_eq!(field.to_string(), "Email:string(required,email)");
    }

    #[test]
    fn compact_field_rejects_garbage() {
        assert!("Email".parse::<Field>().is_err());
        assert!("Email:string(required".parse::<Field>().is_err());
        assert!("Email:string(shiny)".parse::<Field>().is_err());
    }

    #[test]
    fn model_deserializes_both_field_forms() {
        let json = r#"{
            "application": { "module": "github.com/acme/shop" },
            "entities": [{
                "name": "Widget",
                "fields": [
                    "Name:string(required)",
                    { "name": "Weight", "type": "int" }
                ],
                "capabilities": { "list": true },
                "transports": ["http"],
                "backends": ["memory"]
            }]
        }"#;
        let model: EntityModel = serde_json::from_str(json).unwrap();
        let widget = model.entity("Widget").unwrap();
        assert_eq!(widget.fields.len(), 2);
        assert_eq!(widget.fields[1].ty, FieldType::Int);
        assert!(widget.capabilities.list);
        assert!(!widget.capabilities.create);
        assert!(widget.has_transport(Transport::Http));
        assert!(widget.has_backend(Backend::Memory));
    }

    #[test]
    fn entity_names() {
        let e = EntityConfig::new("WidgetOrder", Vec::new());
        assert_eq!(e.file_stem(), "widget_order");
        assert_eq!(e.plural(), "widget_orders");
        assert_eq!(e.var_name(), "widgetOrder");
    }

    #[test]
    fn format_rule_needs_textual_type() {
        let email = Field::new("Email", FieldType::String).with_format(Format::Email);
        assert_eq!(email.format_rule(), Some("is.EmailFormat"));
        let count = Field::new("Count", FieldType::Int).with_format(Format::Email);
        assert_eq!(count.format_rule(), None);
    }

    #[test]
    fn import_path_joins_module() {
        let app = Application::new("github.com/acme/shop/");
        assert_eq!(app.import_path("internal/domain"), "github.com/acme/shop/internal/domain");
    }
}
