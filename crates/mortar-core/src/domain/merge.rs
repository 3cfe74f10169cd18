//! Structural merge of desired declarations into an existing file.
//!
//! `ensure` only ever appends: new declarations go to the end of the file
//! (imports to the end of the import section), new members to the end of
//! their aggregate. Nothing that already exists is rewritten.

use std::collections::HashSet;
use std::fmt;

use serde::Serialize;

use super::locate::{Located, locate};
use super::source::visit::{ConstNames, walk};
use super::source::{
    Aggregate, Declaration, IdentityKey, MethodBody, SourceFile, TypeDecl, TypeShape,
};

/// Same identity key, incompatible kind or shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Conflict {
    pub key: IdentityKey,
    /// Shape of the declaration already in the file.
    pub existing: String,
    /// Shape the generator wanted.
    pub desired: String,
}

impl fmt::Display for Conflict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} exists as a {} but a {} is required",
            self.key, self.existing, self.desired
        )
    }
}

/// What `ensure` did with one desired declaration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum MergeAction {
    Insert,
    AlreadyPresent,
    FillMembers { added: Vec<String> },
    Conflict(Conflict),
}

impl MergeAction {
    /// Whether the file text differs after this action.
    pub fn changes_file(&self) -> bool {
        matches!(self, Self::Insert | Self::FillMembers { .. })
    }

    fn filled(added: Vec<String>) -> Self {
        if added.is_empty() {
            Self::AlreadyPresent
        } else {
            Self::FillMembers { added }
        }
    }
}

/// Make sure `file` contains `desired`.
///
/// On conflict the returned file is the input, untouched.
pub fn ensure(mut file: SourceFile, desired: Declaration) -> (SourceFile, MergeAction) {
    let action = match &desired {
        Declaration::Import(_) => ensure_imports(&mut file, &desired),
        Declaration::Var(want) if declared_var(&file, want.names()) => MergeAction::AlreadyPresent,
        Declaration::Other(text) => {
            let present = file
                .declarations()
                .any(|d| matches!(d, Declaration::Other(existing) if existing == text));
            if present {
                MergeAction::AlreadyPresent
            } else {
                file.push_declaration(desired.clone());
                MergeAction::Insert
            }
        }
        _ => ensure_keyed(&mut file, desired),
    };
    (file, action)
}

/// A variable counts as present when any `var` in the file declares one of
/// its names, whatever its initializer now says.
fn declared_var(file: &SourceFile, names: &[String]) -> bool {
    file.declarations().any(|decl| match decl {
        Declaration::Var(existing) => names.iter().any(|name| existing.declares(name)),
        _ => false,
    })
}

fn ensure_keyed(file: &mut SourceFile, desired: Declaration) -> MergeAction {
    let Some(key) = desired.identity_key() else {
        return MergeAction::AlreadyPresent;
    };
    let conflict = |existing: &Declaration| {
        MergeAction::Conflict(Conflict {
            key: key.clone(),
            existing: existing.shape_name().to_string(),
            desired: desired.shape_name().to_string(),
        })
    };

    match locate(file, &key) {
        Located::Missing => {
            file.push_declaration(desired);
            MergeAction::Insert
        }
        Located::Clash(index) => conflict(&file.decls[index].decl),
        Located::Found(index) => {
            if let Declaration::Const(_) = desired {
                let mut names = ConstNames::default();
                walk(file, &mut names);
                let present: HashSet<String> = names.0.into_iter().collect();
                return fill_const(&mut file.decls[index].decl, &desired, present);
            }
            let existing = &mut file.decls[index].decl;
            if !compatible(existing, &desired) {
                return conflict(existing);
            }
            merge_found(existing, &desired)
        }
    }
}

fn compatible(existing: &Declaration, desired: &Declaration) -> bool {
    match (existing, desired) {
        (Declaration::Type(a), Declaration::Type(b)) => {
            std::mem::discriminant(&a.shape) == std::mem::discriminant(&b.shape)
        }
        (a, b) => a.kind() == b.kind(),
    }
}

/// Existing and desired have the same key and a compatible shape.
fn merge_found(existing: &mut Declaration, desired: &Declaration) -> MergeAction {
    match (existing, desired) {
        (
            Declaration::Type(TypeDecl {
                shape: TypeShape::Struct(have) | TypeShape::Interface(have),
                ..
            }),
            Declaration::Type(TypeDecl {
                shape: TypeShape::Struct(want) | TypeShape::Interface(want),
                ..
            }),
        ) => MergeAction::filled(fill_members(have, want)),
        (Declaration::Method(have), Declaration::Method(want)) => {
            match (&mut have.body, &want.body) {
                (MethodBody::Checks(have), MethodBody::Checks(want)) => {
                    MergeAction::filled(fill_members(have, want))
                }
                // A hand-written body replaced the generated check list.
                _ => MergeAction::AlreadyPresent,
            }
        }
        _ => MergeAction::AlreadyPresent,
    }
}

/// Constants share the package namespace, so a constant that already exists
/// in any group of the file is not added again.
fn fill_const(
    existing: &mut Declaration,
    desired: &Declaration,
    mut present: HashSet<String>,
) -> MergeAction {
    let (Declaration::Const(have), Declaration::Const(want)) = (existing, desired) else {
        return MergeAction::AlreadyPresent;
    };
    let missing: Vec<_> = want
        .block
        .members()
        .iter()
        .filter(|m| !m.keys().iter().any(|k| present.contains(k)))
        .collect();
    if missing.is_empty() {
        return MergeAction::AlreadyPresent;
    }
    if !have.grouped {
        have.block.regroup("const");
        have.grouped = true;
    }
    let mut added = Vec::new();
    for member in missing {
        if member.keys().iter().any(|k| present.contains(k)) {
            continue;
        }
        have.block.append(member);
        present.extend(member.keys().iter().cloned());
        added.push(member.label().to_string());
    }
    MergeAction::filled(added)
}

/// Append every desired member whose keys are all absent from `existing`.
///
/// Returns the labels of the appended members, in order.
pub fn fill_members(existing: &mut Aggregate, desired: &Aggregate) -> Vec<String> {
    let mut present: HashSet<String> = existing
        .key_set()
        .into_iter()
        .map(str::to_string)
        .collect();
    let mut added = Vec::new();
    for member in desired.members() {
        if member.keys().iter().any(|k| present.contains(k)) {
            continue;
        }
        existing.append(member);
        present.extend(member.keys().iter().cloned());
        added.push(member.label().to_string());
    }
    added
}

/// Imports are keyed per path across every import declaration. Missing paths
/// go into the last grouped import, or a new group when there is none.
fn ensure_imports(file: &mut SourceFile, desired: &Declaration) -> MergeAction {
    let Declaration::Import(want) = desired else {
        return MergeAction::AlreadyPresent;
    };
    let present: HashSet<String> = file
        .import_paths()
        .into_iter()
        .map(str::to_string)
        .collect();
    let missing: Vec<_> = want
        .block
        .members()
        .iter()
        .filter(|m| !m.keys().iter().any(|k| present.contains(k)))
        .collect();
    if missing.is_empty() {
        return MergeAction::AlreadyPresent;
    }
    let had_imports = !file.imports.is_empty();

    let group = file
        .imports
        .iter_mut()
        .rev()
        .find_map(|item| match &mut item.decl {
            Declaration::Import(decl) if decl.grouped => Some(decl),
            _ => None,
        });
    if let Some(group) = group {
        let labels = missing.iter().map(|m| m.label().to_string()).collect();
        for member in missing {
            group.block.append(member);
        }
        return MergeAction::filled(labels);
    }

    let labels: Vec<String> = missing.iter().map(|m| m.label().to_string()).collect();
    file.push_import(Declaration::imports(missing.iter().map(|m| m.code().to_string())));
    if had_imports {
        MergeAction::filled(labels)
    } else {
        MergeAction::Insert
    }
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use super::*;
    use crate::domain::source::{DeclKind, parse};

    fn load(src: &str) -> SourceFile {
        parse(Path::new("x.go"), src).unwrap()
    }

    fn widget() -> Declaration {
        Declaration::structure("Widget", ["ID string", "Name string"])
    }

    #[test]
    fn missing_declaration_is_appended() {
        let (file, action) = ensure(SourceFile::skeleton("x.go", "x"), widget());
        assert_eq!(action, MergeAction::Insert);
        assert_eq!(
            file.render(),
            "package x\n\ntype Widget struct {\n\tID string\n\tName string\n}\n"
        );
    }

    #[test]
    fn present_struct_gets_only_missing_fields() {
        let src = "package x\n\ntype Widget struct {\n    ID string // custom\n}\n\nfunc Keep() {}\n";
        let (file, action) = ensure(load(src), widget());
        assert_eq!(
            action,
            MergeAction::FillMembers {
                added: vec!["Name".to_string()]
            }
        );
        assert_eq!(
            file.render(),
            "package x\n\ntype Widget struct {\n    ID string // custom\n    Name string\n}\n\nfunc Keep() {}\n"
        );
    }

    #[test]
    fn complete_struct_is_already_present() {
        let (file, _) = ensure(SourceFile::skeleton("x.go", "x"), widget());
        let before = file.render();
        let (file, action) = ensure(file, widget());
        assert_eq!(action, MergeAction::AlreadyPresent);
        assert_eq!(file.render(), before);
    }

    #[test]
    fn function_body_is_never_replaced() {
        let src = "package x\n\nfunc NewWidget() Widget {\n\t// custom\n\treturn Widget{Name: \"x\"}\n}\n";
        let desired = Declaration::function(
            "NewWidget",
            "func NewWidget() Widget {\n\treturn Widget{}\n}",
        );
        let (file, action) = ensure(load(src), desired);
        assert_eq!(action, MergeAction::AlreadyPresent);
        assert_eq!(file.render(), src);
    }

    #[test]
    fn type_vs_function_is_a_conflict() {
        let src = "package x\n\nfunc Widget() {}\n";
        let (file, action) = ensure(load(src), widget());
        let MergeAction::Conflict(conflict) = action else {
            panic!("expected conflict, got {action:?}");
        };
        assert_eq!(conflict.key, IdentityKey::top_level(DeclKind::Type, "Widget"));
        assert_eq!(conflict.existing, "func");
        assert_eq!(conflict.desired, "struct");
        assert_eq!(file.render(), src);
    }

    #[test]
    fn struct_vs_interface_is_a_conflict() {
        let src = "package x\n\ntype Widget interface {\n\tName() string\n}\n";
        let (file, action) = ensure(load(src), widget());
        assert!(matches!(action, MergeAction::Conflict(_)));
        assert_eq!(file.render(), src);
    }

    #[test]
    fn check_list_appends_with_trailing_comma() {
        let src = "package x\n\nfunc (w Widget) Validate() error {\n\treturn validation.ValidateStruct(&w,\n\t\tvalidation.Field(&w.Name, validation.Required, validation.Length(1, 64))\n\t)\n}\n";
        let desired = Declaration::validation(
            "Widget",
            "w",
            [
                "validation.Field(&w.Name, validation.Required)",
                "validation.Field(&w.Weight)",
            ],
        );
        let (file, action) = ensure(load(src), desired);
        assert_eq!(
            action,
            MergeAction::FillMembers {
                added: vec!["Weight".to_string()]
            }
        );
        assert_eq!(
            file.render(),
            "package x\n\nfunc (w Widget) Validate() error {\n\treturn validation.ValidateStruct(&w,\n\t\tvalidation.Field(&w.Name, validation.Required, validation.Length(1, 64)),\n\t\tvalidation.Field(&w.Weight),\n\t)\n}\n"
        );
    }

    #[test]
    fn hand_written_validate_is_left_alone() {
        let src = "package x\n\nfunc (w Widget) Validate() error {\n\treturn nil\n}\n";
        let desired = Declaration::validation("Widget", "w", ["validation.Field(&w.Name)"]);
        let (file, action) = ensure(load(src), desired);
        assert_eq!(action, MergeAction::AlreadyPresent);
        assert_eq!(file.render(), src);
    }

    #[test]
    fn const_group_accumulates_across_contributors() {
        let a = Declaration::const_group(Some("Permission"), ["PermA Permission = \"a\""]);
        let b = Declaration::const_group(
            Some("Permission"),
            ["PermA Permission = \"a\"", "PermB Permission = \"b\""],
        );
        let (file, first) = ensure(SourceFile::skeleton("x.go", "x"), a);
        let (file, second) = ensure(file, b);
        assert_eq!(first, MergeAction::Insert);
        assert_eq!(
            second,
            MergeAction::FillMembers {
                added: vec!["PermB".to_string()]
            }
        );
        assert_eq!(
            file.render(),
            "package x\n\nconst (\n\tPermA Permission = \"a\"\n\tPermB Permission = \"b\"\n)\n"
        );
    }

    #[test]
    fn single_const_is_regrouped_when_filled() {
        let src = "package x\n\nconst PermA Permission = \"a\"\n";
        let desired = Declaration::const_group(Some("Permission"), ["PermB Permission = \"b\""]);
        let (file, action) = ensure(load(src), desired);
        assert!(action.changes_file());
        assert_eq!(
            file.render(),
            "package x\n\nconst (\n\tPermA Permission = \"a\"\n\tPermB Permission = \"b\"\n)\n"
        );
    }

    #[test]
    fn imports_go_to_the_import_section() {
        let src = "package x\n\nimport (\n\t\"fmt\"\n)\n\nfunc A() { fmt.Println() }\n";
        let (file, action) = ensure(load(src), Declaration::imports(["\"fmt\"", "\"time\""]));
        assert_eq!(
            action,
            MergeAction::FillMembers {
                added: vec!["time".to_string()]
            }
        );
        assert_eq!(
            file.render(),
            "package x\n\nimport (\n\t\"fmt\"\n\t\"time\"\n)\n\nfunc A() { fmt.Println() }\n"
        );
    }

    #[test]
    fn imports_into_file_without_imports_are_inserted_before_declarations() {
        let src = "package x\n\nfunc A() {}\n";
        let (file, action) = ensure(load(src), Declaration::imports(["\"time\""]));
        assert_eq!(action, MergeAction::Insert);
        assert_eq!(
            file.render(),
            "package x\n\nimport (\n\t\"time\"\n)\n\nfunc A() {}\n"
        );
    }

    #[test]
    fn commented_check_keeps_its_line() {
        let name = "\t\tvalidation.Field(&w.Name, validation.Required), // keep short\n";
        let src = format!(
            "package x\n\nfunc (w Widget) Validate() error {{\n\treturn validation.ValidateStruct(&w,\n{name}\t)\n}}\n"
        );
        let desired = Declaration::validation(
            "Widget",
            "w",
            [
                "validation.Field(&w.Name, validation.Required)",
                "validation.Field(&w.Weight)",
            ],
        );
        let (file, action) = ensure(load(&src), desired);
        assert_eq!(
            action,
            MergeAction::FillMembers {
                added: vec!["Weight".to_string()]
            }
        );
        let text = file.render();
        assert!(text.contains(name), "name check rewritten:\n{text}");
        assert!(text.contains("\n\t\tvalidation.Field(&w.Weight),\n\t)"));
        assert_eq!(load(&text), file);
    }

    #[test]
    fn missing_comma_goes_before_a_trailing_comment() {
        let src = "package x\n\nfunc (w Widget) Validate() error {\n\treturn validation.ValidateStruct(&w,\n\t\tvalidation.Field(&w.Name) // keep short\n\t)\n}\n";
        let desired = Declaration::validation("Widget", "w", ["validation.Field(&w.Weight)"]);
        let (file, _) = ensure(load(src), desired);
        let text = file.render();
        assert!(text.contains("\t\tvalidation.Field(&w.Name), // keep short\n"));
        assert!(text.contains("\t\tvalidation.Field(&w.Weight),\n"));
    }

    #[test]
    fn edited_var_is_not_declared_twice() {
        let src = "package x\n\nvar ErrNotFound = errors.New(\"not found\") // sentinel for 404\n";
        let desired = Declaration::var("var ErrNotFound = errors.New(\"not found\")");
        let (file, action) = ensure(load(src), desired);
        assert_eq!(action, MergeAction::AlreadyPresent);
        assert_eq!(file.render(), src);
    }

    #[test]
    fn var_moved_into_a_block_is_still_present() {
        let src = "package x\n\nvar (\n\tErrConflict = errors.New(\"conflict\")\n\tErrNotFound = errors.New(\"missing\")\n)\n";
        let desired = Declaration::var("var ErrNotFound = errors.New(\"not found\")");
        let (file, action) = ensure(load(src), desired);
        assert_eq!(action, MergeAction::AlreadyPresent);
        assert_eq!(file.render(), src);
    }

    #[test]
    fn missing_var_is_appended_and_blank_vars_do_not_count() {
        let src = "package x\n\nvar _ = errors.New\n";
        let desired = Declaration::var("var ErrNotFound = errors.New(\"not found\")");
        let (file, action) = ensure(load(src), desired);
        assert_eq!(action, MergeAction::Insert);
        assert_eq!(
            file.render(),
            "package x\n\nvar _ = errors.New\n\nvar ErrNotFound = errors.New(\"not found\")\n"
        );
    }

    #[test]
    fn var_named_like_a_function_is_a_conflict() {
        let src = "package x\n\nfunc ErrNotFound() error { return nil }\n";
        let desired = Declaration::var("var ErrNotFound = errors.New(\"not found\")");
        let (file, action) = ensure(load(src), desired);
        assert!(matches!(action, MergeAction::Conflict(_)));
        assert_eq!(file.render(), src);
    }

    #[test]
    fn unmodelled_text_is_matched_verbatim() {
        let text = "type (\n\tA int\n)";
        let (file, first) = ensure(SourceFile::skeleton("x.go", "x"), Declaration::other(text));
        let (_, second) = ensure(file, Declaration::other(text));
        assert_eq!(first, MergeAction::Insert);
        assert_eq!(second, MergeAction::AlreadyPresent);
    }

    #[test]
    fn hand_added_method_survives() {
        let src = "package x\n\ntype Widget struct {\n\tID string\n\tName string\n}\n\nfunc (w Widget) Custom() int { return 1 }\n";
        let (file, action) = ensure(load(src), widget());
        assert_eq!(action, MergeAction::AlreadyPresent);
        assert_eq!(file.render(), src);
    }
}
