//! Use-case layer: the entry point transports call, with permission checks
//! when the entity asks for them.

use super::golang::{self, Operation};
use super::{GeneratorComponent, Layer, TargetFile};
use crate::domain::{Application, Declaration, EntityConfig};

pub struct UseCaseComponent;

impl UseCaseComponent {
    fn method(op: Operation, entity: &EntityConfig) -> Declaration {
        let uc = format!("{}UseCase", entity.name);
        let name = op.method_name();
        let sig = op.signature(entity);

        let mut body = String::new();
        if entity.capabilities.permissions {
            body.push_str(&format!(
                "\tif err := domain.Authorize(ctx, domain.{}); err != nil {{\n\t\treturn {}\n\t}}\n",
                op.permission_const(entity),
                sig.failure
            ));
        }
        body.push_str(&format!("\treturn u.svc.{name}({})\n", sig.args));

        Declaration::method(
            &uc,
            name,
            format!(
                "func (u *{uc}) {name}({}) {} {{\n{body}}}",
                sig.params, sig.results
            ),
        )
    }
}

impl GeneratorComponent for UseCaseComponent {
    fn name(&self) -> &'static str {
        "use-case"
    }

    fn layer(&self) -> Layer {
        Layer::UseCase
    }

    fn target(&self, _app: &Application, entity: &EntityConfig) -> TargetFile {
        TargetFile::new(format!("internal/usecase/{}.go", entity.file_stem()), "usecase")
    }

    fn desired(&self, app: &Application, entity: &EntityConfig) -> Vec<Declaration> {
        let e = &entity.name;
        let uc = format!("{e}UseCase");
        let svc = format!("*service.{e}Service");

        let mut decls = vec![
            Declaration::imports([
                golang::quoted("context"),
                golang::domain_import(app),
                golang::module_import(app, "internal/service"),
            ]),
            Declaration::structure(&uc, [format!("svc {svc}")]),
            Declaration::function(
                &format!("New{uc}"),
                format!("func New{uc}(svc {svc}) *{uc} {{\n\treturn &{uc}{{svc: svc}}\n}}"),
            ),
        ];
        decls.extend(
            Operation::of(entity)
                .into_iter()
                .map(|op| Self::method(op, entity)),
        );
        decls
    }
}
