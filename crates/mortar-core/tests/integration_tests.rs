//! Integration tests for mortar-core: generator output merged into files a
//! developer has been maintaining by hand.

use std::path::Path;

use mortar_core::application::GeneratorComponent;
use mortar_core::application::components::RecordComponent;
use mortar_core::domain::{DeclKind, IdentityKey, Located, find, locate};
use mortar_core::prelude::*;

const HAND_MAINTAINED: &str = r#"package domain

import (
	"strings"

	validation "github.com/go-ozzo/ozzo-validation/v4"
)

// Widget is a thing we sell.
type Widget struct {
	ID   string `json:"id"` // primary key
	Name string `json:"name"`
}

var defaultName = "widget"

func (w Widget) Validate() error {
	return validation.ValidateStruct(&w,
		validation.Field(&w.ID, validation.Required),
		validation.Field(&w.Name, validation.Required, validation.Length(1, 80)),
	)
}

// Slug is used in URLs.
func (w Widget) Slug() string {
	return strings.ToLower(w.Name)
}
"#;

fn app() -> Application {
    Application::new("github.com/acme/shop")
}

fn widget(fields: Vec<Field>) -> EntityConfig {
    EntityConfig::new("Widget", fields)
}

fn merge_record(file: SourceFile, entity: &EntityConfig) -> (SourceFile, Vec<MergeAction>) {
    let mut file = file;
    let mut actions = Vec::new();
    for decl in RecordComponent.desired(&app(), entity) {
        let (next, action) = ensure(file, decl);
        actions.push(action);
        file = next;
    }
    (file, actions)
}

#[test]
fn hand_maintained_file_only_gains_the_new_field() {
    let file = parse(Path::new("internal/domain/widget.go"), HAND_MAINTAINED).unwrap();
    let entity = widget(vec![
        Field::new("Name", FieldType::String).required(),
        Field::new("Weight", FieldType::Int),
    ]);

    let (file, actions) = merge_record(file, &entity);
    assert_eq!(
        actions,
        vec![
            MergeAction::AlreadyPresent,
            MergeAction::FillMembers { added: vec!["Weight".into()] },
            MergeAction::FillMembers { added: vec!["Weight".into()] },
        ]
    );

    let expected = HAND_MAINTAINED
        .replace(
            "\tName string `json:\"name\"`\n}",
            "\tName string `json:\"name\"`\n\tWeight int64 `json:\"weight\"`\n}",
        )
        .replace(
            "validation.Length(1, 80)),\n\t)",
            "validation.Length(1, 80)),\n\t\tvalidation.Field(&w.Weight),\n\t)",
        );
    assert_eq!(file.render(), expected);
}

#[test]
fn unchanged_model_leaves_hand_maintained_file_alone() {
    let file = parse(Path::new("widget.go"), HAND_MAINTAINED).unwrap();
    let entity = widget(vec![Field::new("Name", FieldType::String).required()]);

    let (file, actions) = merge_record(file, &entity);
    assert!(actions.iter().all(|a| !a.changes_file()));
    assert_eq!(file.render(), HAND_MAINTAINED);
}

#[test]
fn locator_sees_hand_written_declarations() {
    let file = parse(Path::new("widget.go"), HAND_MAINTAINED).unwrap();

    let slug = IdentityKey::method("Widget", "Slug");
    assert!(matches!(locate(&file, &slug), Located::Found(_)));
    assert_eq!(find(&file, &slug).map(|d| d.kind()), Some(DeclKind::Method));

    assert_eq!(
        locate(&file, &IdentityKey::method("Widget", "Label")),
        Located::Missing
    );
    assert!(find(&file, &IdentityKey::top_level(DeclKind::Function, "Widget")).is_none());
}

#[test]
fn conflict_returns_the_file_untouched() {
    let src = "package domain\n\n// Widget builds the default widget.\nfunc Widget() string {\n\treturn \"w\"\n}\n";
    let file = parse(Path::new("widget.go"), src).unwrap();

    let (file, action) = ensure(file, Declaration::structure("Widget", ["ID string"]));
    let MergeAction::Conflict(conflict) = action else {
        panic!("expected a conflict, got {action:?}");
    };
    assert_eq!(conflict.key, IdentityKey::top_level(DeclKind::Type, "Widget"));
    assert_eq!(file.render(), src);
}

#[test]
fn file_built_from_scratch_round_trips() {
    let entity = widget(vec![
        Field::new("Name", FieldType::String).required(),
        Field::new("Email", FieldType::String).with_format(Format::Email),
        Field::new("MadeAt", FieldType::Time),
    ])
    .with_capabilities(Capabilities {
        list: true,
        create: true,
        update: true,
        order: true,
        permissions: false,
    });

    let (file, _) = merge_record(SourceFile::skeleton("widget.go", "domain"), &entity);
    let text = file.render();
    let reparsed = parse(Path::new("widget.go"), &text).unwrap();

    assert_eq!(reparsed.render(), text);
    let (_, actions) = merge_record(reparsed, &entity);
    assert!(actions.iter().all(|a| *a == MergeAction::AlreadyPresent));
}
