//! `api/proto/<entity>.proto`: the gRPC service the generated server
//! implements.

use mortar_core::application::ports::ArtifactRenderer;
use mortar_core::domain::naming::proto_go_name;
use mortar_core::domain::{Application, EntityConfig, Field, FieldType, RelativePath, Transport};
use mortar_core::error::MortarResult;
use tracing::instrument;

use super::TemplateContext;

const TEMPLATE: &str = r#"// Code generated by mortar. DO NOT EDIT.
syntax = "proto3";

package {{PACKAGE}};

import "google/protobuf/empty.proto";

option go_package = "{{GO_PACKAGE}}";

service {{ENTITY}}Service {
{{RPCS}}}

message {{ENTITY}} {
  string id = 1;
{{FIELDS}}}
{{MESSAGES}}"#;

pub struct ProtoSchemaRenderer;

/// Whether a field appears in the entity message at all.
fn carried(ty: &FieldType) -> bool {
    match ty {
        FieldType::Optional(inner) | FieldType::List(inner) => {
            !matches!(**inner, FieldType::Optional(_) | FieldType::List(_))
        }
        _ => true,
    }
}

/// Whether a create request carries the field; time values are outbound only.
fn accepted(ty: &FieldType) -> bool {
    match ty {
        FieldType::Optional(inner) | FieldType::List(inner) => inner.is_proto_scalar(),
        other => other.is_proto_scalar(),
    }
}

/// Update requests carry scalars only, each as proto3 `optional`.
fn patchable(field: &Field) -> Option<String> {
    let scalar = match &field.ty {
        FieldType::Optional(inner) => inner.as_ref(),
        other => other,
    };
    scalar
        .is_proto_scalar()
        .then(|| format!("optional {}", scalar.proto_type()))
}

fn numbered(first: usize, lines: impl IntoIterator<Item = (String, String)>) -> String {
    lines
        .into_iter()
        .enumerate()
        .map(|(i, (ty, name))| format!("  {ty} {name} = {};\n", first + i))
        .collect()
}

fn message(name: &str, body: &str) -> String {
    format!("\nmessage {name} {{\n{body}}}\n")
}

impl ProtoSchemaRenderer {
    fn rpcs(entity: &EntityConfig, plural: &str) -> String {
        let e = &entity.name;
        let caps = entity.capabilities;
        let mut rpcs = vec![format!("  rpc Get{e}(Get{e}Request) returns ({e});\n")];
        if caps.list {
            rpcs.push(format!(
                "  rpc List{plural}(List{plural}Request) returns (List{plural}Response);\n"
            ));
        }
        if caps.create {
            rpcs.push(format!("  rpc Create{e}(Create{e}Request) returns ({e});\n"));
        }
        if caps.update {
            rpcs.push(format!("  rpc Update{e}(Update{e}Request) returns ({e});\n"));
        }
        rpcs.push(format!(
            "  rpc Delete{e}(Delete{e}Request) returns (google.protobuf.Empty);\n"
        ));
        rpcs.concat()
    }

    fn messages(entity: &EntityConfig, plural: &str) -> String {
        let e = &entity.name;
        let caps = entity.capabilities;
        let by_id = "  string id = 1;\n";

        let mut out = message(&format!("Get{e}Request"), by_id);
        if caps.list {
            out.push_str(&message(
                &format!("List{plural}Request"),
                "  int64 limit = 1;\n  int64 offset = 2;\n",
            ));
            out.push_str(&message(
                &format!("List{plural}Response"),
                &format!("  repeated {e} {} = 1;\n", entity.plural()),
            ));
        }
        if caps.create {
            let fields = entity
                .fields
                .iter()
                .filter(|f| accepted(&f.ty))
                .map(|f| (f.ty.proto_type(), f.column()));
            out.push_str(&message(&format!("Create{e}Request"), &numbered(1, fields)));
        }
        if caps.update {
            let fields = entity
                .fields
                .iter()
                .filter_map(|f| patchable(f).map(|ty| (ty, f.column())));
            out.push_str(&message(
                &format!("Update{e}Request"),
                &format!("{by_id}{}", numbered(2, fields)),
            ));
        }
        out.push_str(&message(&format!("Delete{e}Request"), by_id));
        out
    }
}

impl ArtifactRenderer for ProtoSchemaRenderer {
    fn name(&self) -> &'static str {
        "proto"
    }

    fn applies_to(&self, entity: &EntityConfig) -> bool {
        entity.has_transport(Transport::Grpc)
    }

    fn path(&self, entity: &EntityConfig) -> RelativePath {
        RelativePath::new(format!("api/proto/{}.proto", entity.file_stem()))
    }

    #[instrument(skip_all, fields(entity = %entity.name))]
    fn render(&self, app: &Application, entity: &EntityConfig) -> MortarResult<String> {
        let package = entity.file_stem().replace('_', "");
        let plural = proto_go_name(&entity.plural());
        let fields = entity
            .fields
            .iter()
            .filter(|f| carried(&f.ty))
            .map(|f| (f.ty.proto_type(), f.column()));

        TemplateContext::new()
            .with_variable("PACKAGE", package.as_str())
            .with_variable(
                "GO_PACKAGE",
                format!(
                    "{};{package}pb",
                    app.import_path(&format!("internal/gen/{package}pb"))
                ),
            )
            .with_variable("ENTITY", entity.name.as_str())
            .with_variable("RPCS", Self::rpcs(entity, &plural))
            .with_variable("FIELDS", numbered(2, fields))
            .with_variable("MESSAGES", Self::messages(entity, &plural))
            .render(self.name(), TEMPLATE)
    }
}

#[cfg(test)]
mod tests {
    use mortar_core::domain::{Capabilities, Format};

    use super::*;

    fn widget() -> EntityConfig {
        EntityConfig::new(
            "Widget",
            vec![
                Field::new("Name", FieldType::String).required(),
                Field::new("Email", FieldType::String).with_format(Format::Email),
                Field::new("Weight", FieldType::Int),
                Field::new("Nickname", FieldType::Optional(Box::new(FieldType::String))),
                Field::new("Tags", FieldType::List(Box::new(FieldType::String))),
                Field::new("MadeAt", FieldType::Time),
            ],
        )
        .with_capabilities(Capabilities {
            list: true,
            create: true,
            update: true,
            order: false,
            permissions: false,
        })
        .with_transports([Transport::Grpc])
    }

    fn render(entity: &EntityConfig) -> String {
        ProtoSchemaRenderer
            .render(&Application::new("github.com/acme/shop"), entity)
            .unwrap()
    }

    #[test]
    fn applies_only_with_grpc() {
        assert!(ProtoSchemaRenderer.applies_to(&widget()));
        let plain = EntityConfig::new("Gadget", vec![Field::new("Size", FieldType::Int)]);
        assert!(!ProtoSchemaRenderer.applies_to(&plain));
        assert_eq!(
            ProtoSchemaRenderer.path(&widget()).as_path(),
            std::path::Path::new("api/proto/widget.proto")
        );
    }

    #[test]
    fn entity_message_numbers_fields_after_id() {
        let text = render(&widget());
        assert!(text.starts_with("// Code generated by mortar. DO NOT EDIT.\nsyntax = \"proto3\";\n"));
        assert!(text.contains("package widget;\n"));
        assert!(text.contains("option go_package = \"github.com/acme/shop/internal/gen/widgetpb;widgetpb\";"));
        assert!(text.contains(
            "message Widget {\n  string id = 1;\n  string name = 2;\n  string email = 3;\n  int64 weight = 4;\n  optional string nickname = 5;\n  repeated string tags = 6;\n  string made_at = 7;\n}\n"
        ));
    }

    #[test]
    fn service_follows_capabilities() {
        let text = render(&widget());
        assert!(text.contains("service WidgetService {\n  rpc GetWidget(GetWidgetRequest) returns (Widget);\n  rpc ListWidgets(ListWidgetsRequest) returns (ListWidgetsResponse);\n"));
        assert!(text.contains("  rpc DeleteWidget(DeleteWidgetRequest) returns (google.protobuf.Empty);\n}\n"));
        assert!(text.contains("message ListWidgetsResponse {\n  repeated Widget widgets = 1;\n}\n"));

        let plain = EntityConfig::new("Gadget", vec![Field::new("Size", FieldType::Int)]);
        let text = render(&plain);
        assert!(!text.contains("ListGadgets"));
        assert!(!text.contains("CreateGadgetRequest"));
        assert!(text.contains("message DeleteGadgetRequest {\n  string id = 1;\n}\n"));
    }

    #[test]
    fn requests_carry_what_the_server_reads() {
        let text = render(&widget());
        assert!(text.contains(
            "message CreateWidgetRequest {\n  string name = 1;\n  string email = 2;\n  int64 weight = 3;\n  optional string nickname = 4;\n  repeated string tags = 5;\n}\n"
        ));
        assert!(text.contains(
            "message UpdateWidgetRequest {\n  string id = 1;\n  optional string name = 2;\n  optional string email = 3;\n  optional int64 weight = 4;\n  optional string nickname = 5;\n}\n"
        ));
    }

    #[test]
    fn rendering_is_deterministic() {
        assert_eq!(render(&widget()), render(&widget()));
    }
}
