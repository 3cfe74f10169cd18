//! Shared permission vocabulary. Every entity with permission checks adds
//! its constants to the one `Permission` group.

use super::golang::{self, permissions};
use super::{GeneratorComponent, Layer, TargetFile};
use crate::domain::{Application, Declaration, EntityConfig};

pub struct PermissionsComponent;

const ERR_FORBIDDEN: &str = "func ErrForbidden(p Permission) error {
\treturn fmt.Errorf(\"forbidden: missing permission %s\", p)
}";

const WITH_PRINCIPAL: &str = "func WithPrincipal(ctx context.Context, p Principal) context.Context {
\treturn context.WithValue(ctx, principalKey(0), p)
}";

const PRINCIPAL_FROM: &str = "func PrincipalFrom(ctx context.Context) (Principal, bool) {
\tp, ok := ctx.Value(principalKey(0)).(Principal)
\treturn p, ok
}";

const AUTHORIZE: &str = "func Authorize(ctx context.Context, perm Permission) error {
\tp, ok := PrincipalFrom(ctx)
\tif !ok || !p.HasPermission(perm) {
\t\treturn ErrForbidden(perm)
\t}
\treturn nil
}";

impl GeneratorComponent for PermissionsComponent {
    fn name(&self) -> &'static str {
        "permissions"
    }

    fn layer(&self) -> Layer {
        Layer::Record
    }

    fn applies_to(&self, entity: &EntityConfig) -> bool {
        entity.capabilities.permissions
    }

    fn target(&self, _app: &Application, _entity: &EntityConfig) -> TargetFile {
        TargetFile::new("internal/domain/permissions.go", "domain")
    }

    fn desired(&self, _app: &Application, entity: &EntityConfig) -> Vec<Declaration> {
        let stem = entity.file_stem();
        let specs = permissions(entity).into_iter().map(|suffix| {
            format!(
                "Permission{}{suffix} Permission = \"{stem}:{}\"",
                entity.name,
                suffix.to_ascii_lowercase()
            )
        });
        vec![
            Declaration::imports([golang::quoted("context"), golang::quoted("fmt")]),
            Declaration::named_type("Permission", "string"),
            Declaration::interface("Principal", ["HasPermission(p Permission) bool"]),
            Declaration::named_type("principalKey", "int"),
            Declaration::function("ErrForbidden", ERR_FORBIDDEN),
            Declaration::function("WithPrincipal", WITH_PRINCIPAL),
            Declaration::function("PrincipalFrom", PRINCIPAL_FROM),
            Declaration::function("Authorize", AUTHORIZE),
            Declaration::const_group(Some("Permission"), specs),
        ]
    }
}
