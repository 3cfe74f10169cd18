//! `schema/postgres/<table>.sql`: the table the postgres repository queries.

use mortar_core::application::ports::ArtifactRenderer;
use mortar_core::domain::naming::{pluralize, to_snake_case};
use mortar_core::domain::{Application, Backend, EntityConfig, Field, FieldType, RelativePath};
use mortar_core::error::MortarResult;
use tracing::instrument;

use super::TemplateContext;

const TEMPLATE: &str = "-- Code generated by mortar. DO NOT EDIT.

CREATE TABLE IF NOT EXISTS {{TABLE}} (
    id TEXT PRIMARY KEY{{COLUMNS}}
);
{{INDEXES}}";

pub struct SqlSchemaRenderer;

fn column(field: &Field) -> String {
    let mut def = format!(",\n    {} {}", field.column(), field.ty.sql_type());
    if !field.ty.is_optional() {
        def.push_str(" NOT NULL");
    }
    if let Some(target) = foreign_key(field) {
        def.push_str(&format!(" REFERENCES {}(id)", pluralize(&to_snake_case(target))));
    }
    def
}

/// Referenced entity of a single-valued reference; lists live in JSONB.
fn foreign_key(field: &Field) -> Option<&str> {
    match &field.ty {
        FieldType::List(_) => None,
        other => other.referenced_entity(),
    }
}

impl ArtifactRenderer for SqlSchemaRenderer {
    fn name(&self) -> &'static str {
        "sql-schema"
    }

    fn applies_to(&self, entity: &EntityConfig) -> bool {
        entity.has_backend(Backend::Postgres)
    }

    fn path(&self, entity: &EntityConfig) -> RelativePath {
        RelativePath::new(format!("schema/postgres/{}.sql", entity.plural()))
    }

    #[instrument(skip_all, fields(entity = %entity.name))]
    fn render(&self, _app: &Application, entity: &EntityConfig) -> MortarResult<String> {
        let table = entity.plural();
        let columns: String = entity.fields.iter().map(column).collect();
        let indexes: String = entity
            .fields
            .iter()
            .filter(|f| foreign_key(f).is_some())
            .map(|f| {
                let col = f.column();
                format!("\nCREATE INDEX IF NOT EXISTS idx_{table}_{col} ON {table} ({col});\n")
            })
            .collect();

        TemplateContext::new()
            .with_variable("TABLE", table.as_str())
            .with_variable("COLUMNS", columns)
            .with_variable("INDEXES", indexes)
            .render(self.name(), TEMPLATE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render(entity: &EntityConfig) -> String {
        SqlSchemaRenderer
            .render(&Application::new("github.com/acme/shop"), entity)
            .unwrap()
    }

    #[test]
    fn table_follows_fields() {
        let entity = EntityConfig::new(
            "Widget",
            vec![
                Field::new("Name", FieldType::String).required(),
                Field::new("Weight", FieldType::Int),
                Field::new("Nickname", FieldType::Optional(Box::new(FieldType::String))),
                Field::new("Tags", FieldType::List(Box::new(FieldType::String))),
                Field::new("MadeAt", FieldType::Time),
            ],
        )
        .with_backends([Backend::Postgres]);

        assert_eq!(
            render(&entity),
            "-- Code generated by mortar. DO NOT EDIT.

CREATE TABLE IF NOT EXISTS widgets (
    id TEXT PRIMARY KEY,
    name TEXT NOT NULL,
    weight BIGINT NOT NULL,
    nickname TEXT,
    tags JSONB NOT NULL,
    made_at TIMESTAMPTZ NOT NULL
);
"
        );
        assert_eq!(
            SqlSchemaRenderer.path(&entity).as_path(),
            std::path::Path::new("schema/postgres/widgets.sql")
        );
    }

    #[test]
    fn references_get_a_foreign_key_and_an_index() {
        let entity = EntityConfig::new(
            "OrderLine",
            vec![Field::new("OrderID", FieldType::Ref("Order".into()))],
        )
        .with_backends([Backend::Postgres]);
        let text = render(&entity);

        assert!(text.contains("    order_id TEXT NOT NULL REFERENCES orders(id)\n);\n"));
        assert!(text.ends_with(
            "\nCREATE INDEX IF NOT EXISTS idx_order_lines_order_id ON order_lines (order_id);\n"
        ));
    }

    #[test]
    fn applies_only_with_postgres() {
        let entity = EntityConfig::new("Widget", vec![Field::new("Name", FieldType::String)]);
        assert!(!SqlSchemaRenderer.applies_to(&entity));
        assert!(!SqlSchemaRenderer.applies_to(&entity.clone().with_backends([Backend::Memory])));
        assert!(SqlSchemaRenderer.applies_to(&entity.with_backends([Backend::Postgres])));
    }
}
