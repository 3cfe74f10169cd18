//! Go spellings shared by the components.

use crate::domain::{Application, EntityConfig, Field, FieldType};

pub(super) const VALIDATION: &str = "validation \"github.com/go-ozzo/ozzo-validation/v4\"";
pub(super) const VALIDATION_IS: &str = "\"github.com/go-ozzo/ozzo-validation/v4/is\"";

pub(super) fn quoted(path: &str) -> String {
    format!("\"{path}\"")
}

/// Import spec for a package of the generated module.
pub(super) fn module_import(app: &Application, package_dir: &str) -> String {
    quoted(&app.import_path(package_dir))
}

pub(super) fn domain_import(app: &Application) -> String {
    module_import(app, "internal/domain")
}

/// Method receiver variable: `Widget` → `w`.
pub(super) fn receiver(entity: &EntityConfig) -> String {
    entity
        .name
        .chars()
        .next()
        .map(|c| c.to_ascii_lowercase().to_string())
        .unwrap_or_else(|| "x".to_string())
}

/// `Name string \`json:"name"\``
pub(super) fn struct_field(field: &Field) -> String {
    tagged(&field.name, &field.ty.go_type(), &field.json_name(), field.ty.is_optional())
}

pub(super) fn tagged(name: &str, go_type: &str, json: &str, omitempty: bool) -> String {
    let omit = if omitempty { ",omitempty" } else { "" };
    format!("{name} {go_type} `json:\"{json}{omit}\"`")
}

/// Go type of `field` behind exactly one pointer.
pub(super) fn pointer_type(field: &Field) -> String {
    let go = field.ty.go_type();
    if field.ty.is_optional() { go } else { format!("*{go}") }
}

/// `validation.Field(&w.Name, rules...)`
pub(super) fn check(var: &str, field: &str, rules: &[&str]) -> String {
    let mut out = format!("validation.Field(&{var}.{field}");
    for rule in rules {
        out.push_str(", ");
        out.push_str(rule);
    }
    out.push(')');
    out
}

/// Rules for one field; `presence` is the rule used for required fields.
pub(super) fn rules<'a>(field: &'a Field, presence: &'a str) -> Vec<&'a str> {
    let mut rules = Vec::new();
    if field.constraints.required && !matches!(field.ty, FieldType::Bool) {
        rules.push(presence);
    }
    rules.extend(field.format_rule());
    rules
}

/// Operations an entity exposes, in method order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum Operation {
    Get,
    List,
    Create,
    Update,
    Delete,
}

impl Operation {
    pub(super) fn of(entity: &EntityConfig) -> Vec<Self> {
        let caps = entity.capabilities;
        let mut ops = vec![Self::Get];
        if caps.list {
            ops.push(Self::List);
        }
        if caps.create {
            ops.push(Self::Create);
        }
        if caps.update {
            ops.push(Self::Update);
        }
        ops.push(Self::Delete);
        ops
    }

    pub(super) fn method_name(&self) -> &'static str {
        match self {
            Self::Get => "Get",
            Self::List => "List",
            Self::Create => "Create",
            Self::Update => "Update",
            Self::Delete => "Delete",
        }
    }

    /// Signature shared by the service and use-case layers.
    pub(super) fn signature(&self, entity: &EntityConfig) -> Signature {
        let e = &entity.name;
        let record = format!("(*domain.{e}, error)");
        let (params, results, args) = match self {
            Self::Get => ("ctx context.Context, id string".to_string(), record, "ctx, id"),
            Self::List => (
                format!("ctx context.Context, filter domain.{e}Filter"),
                format!("([]domain.{e}, error)"),
                "ctx, filter",
            ),
            Self::Create => (
                format!("ctx context.Context, in domain.Create{e}Input"),
                record,
                "ctx, in",
            ),
            Self::Update => (
                format!("ctx context.Context, id string, in domain.Update{e}Input"),
                record,
                "ctx, id, in",
            ),
            Self::Delete => (
                "ctx context.Context, id string".to_string(),
                "error".to_string(),
                "ctx, id",
            ),
        };
        Signature {
            params,
            results,
            args,
            failure: if *self == Self::Delete { "err" } else { "nil, err" },
        }
    }

    /// Permission suffix; reads share one permission.
    pub(super) fn permission(&self) -> &'static str {
        match self {
            Self::Get | Self::List => "Read",
            Self::Create => "Create",
            Self::Update => "Update",
            Self::Delete => "Delete",
        }
    }

    /// `PermissionWidgetRead`
    pub(super) fn permission_const(&self, entity: &EntityConfig) -> String {
        format!("Permission{}{}", entity.name, self.permission())
    }
}

/// Parameter list, result list and forwarding arguments of one operation.
pub(super) struct Signature {
    pub(super) params: String,
    pub(super) results: String,
    pub(super) args: &'static str,
    /// Return statement operands after an error.
    pub(super) failure: &'static str,
}

/// Distinct permissions of an entity, in operation order.
pub(super) fn permissions(entity: &EntityConfig) -> Vec<&'static str> {
    let mut out: Vec<&'static str> = Vec::new();
    for op in Operation::of(entity) {
        if !out.contains(&op.permission()) {
            out.push(op.permission());
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Capabilities, Format};

    #[test]
    fn checks_carry_presence_and_format_rules() {
        let email = Field::new("Email", FieldType::String)
            .required()
            .with_format(Format::Email);
        assert_eq!(
            check("w", &email.name, &rules(&email, "validation.Required")),
            "validation.Field(&w.Email, validation.Required, is.EmailFormat)"
        );

        let flag = Field::new("Active", FieldType::Bool).required();
        assert_eq!(check("w", &flag.name, &rules(&flag, "validation.Required")), "validation.Field(&w.Active)");
    }

    #[test]
    fn operations_follow_capabilities() {
        let entity = EntityConfig::new("Widget", vec![]).with_capabilities(Capabilities {
            create: true,
            ..Capabilities::default()
        });
        assert_eq!(
            Operation::of(&entity),
            [Operation::Get, Operation::Create, Operation::Delete]
        );
        assert_eq!(permissions(&entity), ["Read", "Create", "Delete"]);
        assert_eq!(Operation::Get.permission_const(&entity), "PermissionWidgetRead");
    }

    #[test]
    fn optional_fields_are_not_double_pointers() {
        let nick = Field::new("Nick", "string?".parse().unwrap());
        assert_eq!(pointer_type(&nick), "*string");
        assert_eq!(pointer_type(&Field::new("Weight", FieldType::Int)), "*int64");
        assert_eq!(struct_field(&nick), "Nick *string `json:\"nick,omitempty\"`");
    }
}
