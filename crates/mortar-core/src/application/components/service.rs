//! Business-logic service over the repository port.

use super::golang::{self, Operation};
use super::{GeneratorComponent, Layer, TargetFile};
use crate::domain::{Application, Declaration, EntityConfig};

pub struct ServiceComponent;

impl ServiceComponent {
    fn body(op: Operation, entity: &EntityConfig) -> String {
        let e = &entity.name;
        match op {
            Operation::Get | Operation::List | Operation::Delete => {
                let sig = op.signature(entity);
                format!("\treturn s.repo.{}({})\n", op.method_name(), sig.args)
            }
            Operation::Create => {
                let assignments: String = entity
                    .fields
                    .iter()
                    .map(|f| format!("\t\t{0}: in.{0},\n", f.name))
                    .collect();
                format!(
                    "\tif err := in.Validate(); err != nil {{
\t\treturn nil, err
\t}}
\titem := &domain.{e}{{
\t\tID: uuid.NewString(),
{assignments}\t}}
\tif err := s.repo.Create(ctx, item); err != nil {{
\t\treturn nil, err
\t}}
\treturn item, nil
"
                )
            }
            Operation::Update => {
                let patches: String = entity
                    .fields
                    .iter()
                    .map(|f| {
                        let value = if f.ty.is_optional() {
                            format!("in.{}", f.name)
                        } else {
                            format!("*in.{}", f.name)
                        };
                        format!("\tif in.{0} != nil {{\n\t\titem.{0} = {value}\n\t}}\n", f.name)
                    })
                    .collect();
                format!(
                    "\tif err := in.Validate(); err != nil {{
\t\treturn nil, err
\t}}
\titem, err := s.repo.Get(ctx, id)
\tif err != nil {{
\t\treturn nil, err
\t}}
{patches}\tif err := item.Validate(); err != nil {{
\t\treturn nil, err
\t}}
\tif err := s.repo.Update(ctx, item); err != nil {{
\t\treturn nil, err
\t}}
\treturn item, nil
"
                )
            }
        }
    }
}

impl GeneratorComponent for ServiceComponent {
    fn name(&self) -> &'static str {
        "service"
    }

    fn layer(&self) -> Layer {
        Layer::Service
    }

    fn target(&self, _app: &Application, entity: &EntityConfig) -> TargetFile {
        TargetFile::new(format!("internal/service/{}.go", entity.file_stem()), "service")
    }

    fn desired(&self, app: &Application, entity: &EntityConfig) -> Vec<Declaration> {
        let e = &entity.name;
        let svc = format!("{e}Service");

        let mut imports = vec![golang::quoted("context")];
        if entity.capabilities.create {
            imports.push(golang::quoted("github.com/google/uuid"));
        }
        imports.push(golang::domain_import(app));

        let mut decls = vec![
            Declaration::imports(imports),
            Declaration::structure(&svc, [format!("repo domain.{e}Repository")]),
            Declaration::function(
                &format!("New{svc}"),
                format!(
                    "func New{svc}(repo domain.{e}Repository) *{svc} {{\n\treturn &{svc}{{repo: repo}}\n}}"
                ),
            ),
        ];
        for op in Operation::of(entity) {
            let sig = op.signature(entity);
            let name = op.method_name();
            decls.push(Declaration::method(
                &svc,
                name,
                format!(
                    "func (s *{svc}) {name}({}) {} {{\n{}}}",
                    sig.params,
                    sig.results,
                    Self::body(op, entity)
                ),
            ));
        }
        decls
    }
}
