//! The entity record: struct, validation, and the input types the
//! capabilities ask for.

use super::golang::{self, VALIDATION, VALIDATION_IS};
use super::{GeneratorComponent, Layer, TargetFile};
use crate::domain::{Application, Declaration, EntityConfig, FieldType};

pub struct RecordComponent;

impl RecordComponent {
    fn imports(entity: &EntityConfig) -> Declaration {
        let mut specs = Vec::new();
        if entity.uses_time() {
            specs.push(golang::quoted("time"));
        }
        specs.push(VALIDATION.to_string());
        if entity.uses_formats() {
            specs.push(VALIDATION_IS.to_string());
        }
        Declaration::imports(specs)
    }

    fn record(entity: &EntityConfig) -> [Declaration; 2] {
        let var = golang::receiver(entity);
        let mut fields = vec![golang::tagged("ID", "string", "id", false)];
        fields.extend(entity.fields.iter().map(golang::struct_field));

        let mut checks = vec![golang::check(&var, "ID", &["validation.Required"])];
        checks.extend(entity.fields.iter().map(|f| {
            golang::check(&var, &f.name, &golang::rules(f, "validation.Required"))
        }));

        [
            Declaration::structure(&entity.name, fields),
            Declaration::validation(&entity.name, &var, checks),
        ]
    }

    fn filter(entity: &EntityConfig) -> Declaration {
        let mut fields = vec![
            golang::tagged("Limit", "int", "limit", true),
            golang::tagged("Offset", "int", "offset", true),
        ];
        if entity.capabilities.order {
            fields.push(golang::tagged(
                "OrderBy",
                &format!("{}OrderField", entity.name),
                "orderBy",
                true,
            ));
            fields.push(golang::tagged("Descending", "bool", "descending", true));
        }
        fields.extend(
            entity
                .fields
                .iter()
                .filter(|f| !matches!(f.ty, FieldType::List(_)))
                .map(|f| golang::tagged(&f.name, &golang::pointer_type(f), &f.json_name(), true)),
        );
        Declaration::structure(&format!("{}Filter", entity.name), fields)
    }

    fn ordering(entity: &EntityConfig) -> [Declaration; 2] {
        let ty = format!("{}OrderField", entity.name);
        let spec = |suffix: &str, column: &str| {
            format!("{}OrderBy{suffix} {ty} = \"{column}\"", entity.name)
        };
        let mut specs = vec![spec("ID", "id")];
        specs.extend(
            entity
                .fields
                .iter()
                .filter(|f| !matches!(f.ty, FieldType::List(_)))
                .map(|f| spec(&f.name, &f.column())),
        );
        [
            Declaration::named_type(&ty, "string"),
            Declaration::const_group(Some(&ty), specs),
        ]
    }

    fn create_input(entity: &EntityConfig) -> [Declaration; 2] {
        let name = format!("Create{}Input", entity.name);
        let fields = entity.fields.iter().map(golang::struct_field);
        let checks = entity
            .fields
            .iter()
            .map(|f| golang::check("in", &f.name, &golang::rules(f, "validation.Required")));
        [
            Declaration::structure(&name, fields),
            Declaration::validation(&name, "in", checks),
        ]
    }

    fn update_input(entity: &EntityConfig) -> [Declaration; 2] {
        let name = format!("Update{}Input", entity.name);
        let fields = entity
            .fields
            .iter()
            .map(|f| golang::tagged(&f.name, &golang::pointer_type(f), &f.json_name(), true));
        let checks = entity
            .fields
            .iter()
            .map(|f| golang::check("in", &f.name, &golang::rules(f, "validation.NilOrNotEmpty")));
        [
            Declaration::structure(&name, fields),
            Declaration::validation(&name, "in", checks),
        ]
    }
}

impl GeneratorComponent for RecordComponent {
    fn name(&self) -> &'static str {
        "record"
    }

    fn layer(&self) -> Layer {
        Layer::Record
    }

    fn target(&self, _app: &Application, entity: &EntityConfig) -> TargetFile {
        TargetFile::new(format!("internal/domain/{}.go", entity.file_stem()), "domain")
    }

    fn desired(&self, _app: &Application, entity: &EntityConfig) -> Vec<Declaration> {
        let caps = entity.capabilities;
        let mut decls = vec![Self::imports(entity)];
        decls.extend(Self::record(entity));
        if caps.list {
            decls.push(Self::filter(entity));
            if caps.order {
                decls.extend(Self::ordering(entity));
            }
        }
        if caps.create {
            decls.extend(Self::create_input(entity));
        }
        if caps.update {
            decls.extend(Self::update_input(entity));
        }
        decls
    }
}
