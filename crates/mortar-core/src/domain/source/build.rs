//! Canonical constructors for the declarations generator components want.
//!
//! Every constructor produces exactly the node the parser would produce for
//! the same text, so a freshly generated file survives a render/parse cycle
//! unchanged.

use super::keys;
use super::scan::MemberStyle;
use super::{
    Aggregate, ConstDecl, Declaration, FunctionDecl, ImportDecl, Member, MethodBody, MethodDecl,
    TypeDecl, TypeShape, VarDecl,
};

fn lines<I, S>(indent: &str, codes: I, key_fn: fn(&str) -> Vec<String>) -> Vec<Member>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    codes
        .into_iter()
        .map(|code| {
            let code = code.into();
            let keys = key_fn(&code);
            let raw = format!("\n{indent}{code}");
            Member::new(raw, 1 + indent.len(), keys)
        })
        .collect()
}

impl Declaration {
    /// `type <name> struct { fields... }`
    pub fn structure<I, S>(name: &str, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let block = Aggregate::new(
            format!("type {name} struct {{"),
            lines("\t", fields, keys::field_keys),
            "\n}",
            MemberStyle::Lines,
        );
        Self::Type(TypeDecl {
            name: name.to_string(),
            shape: TypeShape::Struct(block),
        })
    }

    /// `type <name> interface { methods... }`
    pub fn interface<I, S>(name: &str, methods: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let block = Aggregate::new(
            format!("type {name} interface {{"),
            lines("\t", methods, keys::interface_keys),
            "\n}",
            MemberStyle::Lines,
        );
        Self::Type(TypeDecl {
            name: name.to_string(),
            shape: TypeShape::Interface(block),
        })
    }

    /// `type <name> <underlying>`
    pub fn named_type(name: &str, underlying: &str) -> Self {
        Self::Type(TypeDecl {
            name: name.to_string(),
            shape: TypeShape::Opaque(format!("type {name} {underlying}")),
        })
    }

    /// A free function. `source` is the full `func ...` text.
    pub fn function(name: &str, source: impl Into<String>) -> Self {
        Self::Function(FunctionDecl {
            name: name.to_string(),
            source: source.into(),
        })
    }

    /// A method with an opaque body. `source` is the full `func (...) ...` text.
    pub fn method(receiver: &str, name: &str, source: impl Into<String>) -> Self {
        Self::Method(MethodDecl {
            name: name.to_string(),
            receiver: receiver.to_string(),
            body: MethodBody::Opaque(source.into()),
        })
    }

    /// `func (<var> <receiver>) Validate() error` returning a
    /// `validation.ValidateStruct` call with one argument per check.
    pub fn validation<I, S>(receiver: &str, var: &str, checks: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let checks = checks.into_iter().map(|check| {
            let mut check = check.into();
            if !check.ends_with(',') {
                check.push(',');
            }
            check
        });
        let block = Aggregate::new(
            format!(
                "func ({var} {receiver}) Validate() error {{\n\treturn validation.ValidateStruct(&{var},"
            ),
            lines("\t\t", checks, keys::check_keys),
            "\n\t)\n}",
            MemberStyle::Commas,
        );
        Self::Method(MethodDecl {
            name: "Validate".to_string(),
            receiver: receiver.to_string(),
            body: MethodBody::Checks(block),
        })
    }

    /// `const ( specs... )`. `type_name` is the declared type of the specs,
    /// which also keys the group.
    pub fn const_group<I, S>(type_name: Option<&str>, specs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Const(ConstDecl {
            type_name: type_name.map(str::to_string),
            block: Aggregate::new(
                "const (",
                lines("\t", specs, keys::const_keys),
                "\n)",
                MemberStyle::Lines,
            ),
            grouped: true,
        })
    }

    /// `import ( specs... )`. Specs are quoted paths, optionally aliased.
    pub fn imports<I, S>(specs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Import(ImportDecl {
            block: Aggregate::new(
                "import (",
                lines("\t", specs, keys::import_keys),
                "\n)",
                MemberStyle::Lines,
            ),
            grouped: true,
        })
    }

    /// A single-spec `var`. `source` is the full `var ...` text.
    pub fn var(source: impl Into<String>) -> Self {
        let source = source.into();
        let spec = source.strip_prefix("var").unwrap_or(&source);
        Self::Var(VarDecl {
            names: keys::const_keys(spec),
            source,
        })
    }

    /// Text Mortar never merges.
    pub fn other(source: impl Into<String>) -> Self {
        Self::Other(source.into())
    }
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use super::super::{SourceFile, parse};
    use super::*;

    fn round_trip(decls: Vec<Declaration>) {
        let mut file = SourceFile::skeleton("x.go", "x");
        for decl in decls {
            match decl {
                Declaration::Import(_) => file.push_import(decl),
                _ => file.push_declaration(decl),
            }
        }
        let text = file.render();
        let reparsed = parse(Path::new("x.go"), &text).unwrap();
        assert_eq!(reparsed, file, "tree differs after reparse of:\n{text}");
    }

    #[test]
    fn canonical_declarations_reparse_identically() {
        round_trip(vec![
            Declaration::imports(["\"context\"", "validation \"github.com/go-ozzo/ozzo-validation/v4\""]),
            Declaration::structure("Widget", ["ID string `json:\"id\"`", "Name string"]),
            Declaration::structure("Empty", Vec::<String>::new()),
            Declaration::interface(
                "WidgetRepository",
                ["Get(ctx context.Context, id string) (Widget, error)"],
            ),
            Declaration::named_type("Permission", "string"),
            Declaration::const_group(
                Some("Permission"),
                ["PermissionWidgetRead Permission = \"widget:read\""],
            ),
            Declaration::validation(
                "Widget",
                "w",
                ["validation.Field(&w.Name, validation.Required)"],
            ),
            Declaration::var("var ErrNotFound = errors.New(\"not found\")"),
            Declaration::function("NewWidget", "func NewWidget() Widget {\n\treturn Widget{}\n}"),
            Declaration::method(
                "Widget",
                "String",
                "func (w Widget) String() string {\n\treturn w.Name\n}",
            ),
        ]);
    }

    #[test]
    fn validation_renders_one_check_per_line() {
        let decl = Declaration::validation(
            "CreateWidgetInput",
            "in",
            ["validation.Field(&in.Name, validation.Required)"],
        );
        assert_eq!(
            decl.render(),
            "func (in CreateWidgetInput) Validate() error {\n\
             \treturn validation.ValidateStruct(&in,\n\
             \t\tvalidation.Field(&in.Name, validation.Required),\n\
             \t)\n}"
        );
    }
}
