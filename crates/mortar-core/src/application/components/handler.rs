//! Protocol handlers over the use-case layer, one per transport.

use super::golang::{self, Operation};
use super::{GeneratorComponent, Layer, TargetFile};
use crate::domain::naming::proto_go_name;
use crate::domain::{Application, Declaration, EntityConfig, Field, FieldType, Transport};

fn usecase_type(entity: &EntityConfig) -> String {
    format!("*usecase.{}UseCase", entity.name)
}

fn transport_target(transport: Transport, entity: &EntityConfig) -> TargetFile {
    TargetFile::new(
        format!("internal/transport/{transport}/{}.go", entity.file_stem()),
        transport.package(),
    )
}

// ── HTTP ─────────────────────────────────────────────────────────────────────

/// `net/http` handler using method-qualified `ServeMux` patterns.
pub struct HttpHandler;

const RESPOND: &str = "(w http.ResponseWriter, status int, body any) {
\tw.Header().Set(\"Content-Type\", \"application/json\")
\tw.WriteHeader(status)
\t_ = json.NewEncoder(w).Encode(body)
}";

const FAIL: &str = "(w http.ResponseWriter, err error) {
\tstatus := http.StatusInternalServerError
\tif errors.Is(err, domain.ErrNotFound) {
\t\tstatus = http.StatusNotFound
\t}
\thttp.Error(w, err.Error(), status)
}";

impl HttpHandler {
    fn route(entity: &EntityConfig) -> String {
        format!("/{}", entity.plural().replace('_', "-"))
    }

    fn handler_name(op: Operation) -> &'static str {
        match op {
            Operation::Get => "get",
            Operation::List => "list",
            Operation::Create => "create",
            Operation::Update => "update",
            Operation::Delete => "remove",
        }
    }

    fn register(entity: &EntityConfig) -> String {
        let route = Self::route(entity);
        let lines: String = Operation::of(entity)
            .into_iter()
            .map(|op| {
                let (verb, path) = match op {
                    Operation::Get => ("GET", format!("{route}/{{id}}")),
                    Operation::List => ("GET", route.clone()),
                    Operation::Create => ("POST", route.clone()),
                    Operation::Update => ("PATCH", format!("{route}/{{id}}")),
                    Operation::Delete => ("DELETE", format!("{route}/{{id}}")),
                };
                format!("\tmux.HandleFunc(\"{verb} {path}\", h.{})\n", Self::handler_name(op))
            })
            .collect();
        format!(
            "func (h *{}Handler) Register(mux *http.ServeMux) {{\n{lines}}}",
            entity.name
        )
    }

    fn endpoint(op: Operation, entity: &EntityConfig) -> String {
        let e = &entity.name;
        let call = match op {
            Operation::Get => "item, err := h.uc.Get(r.Context(), r.PathValue(\"id\"))".to_string(),
            Operation::List => format!(
                "var filter domain.{e}Filter
\tfilter.Limit, _ = strconv.Atoi(r.URL.Query().Get(\"limit\"))
\tfilter.Offset, _ = strconv.Atoi(r.URL.Query().Get(\"offset\"))
\titems, err := h.uc.List(r.Context(), filter)"
            ),
            Operation::Create => format!(
                "var in domain.Create{e}Input
\tif err := json.NewDecoder(r.Body).Decode(&in); err != nil {{
\t\thttp.Error(w, err.Error(), http.StatusBadRequest)
\t\treturn
\t}}
\titem, err := h.uc.Create(r.Context(), in)"
            ),
            Operation::Update => format!(
                "var in domain.Update{e}Input
\tif err := json.NewDecoder(r.Body).Decode(&in); err != nil {{
\t\thttp.Error(w, err.Error(), http.StatusBadRequest)
\t\treturn
\t}}
\titem, err := h.uc.Update(r.Context(), r.PathValue(\"id\"), in)"
            ),
            Operation::Delete => "err := h.uc.Delete(r.Context(), r.PathValue(\"id\"))".to_string(),
        };
        let success = match op {
            Operation::Get | Operation::Update => "h.respond(w, http.StatusOK, item)",
            Operation::List => "h.respond(w, http.StatusOK, items)",
            Operation::Create => "h.respond(w, http.StatusCreated, item)",
            Operation::Delete => "w.WriteHeader(http.StatusNoContent)",
        };
        format!(
            "func (h *{e}Handler) {}(w http.ResponseWriter, r *http.Request) {{
\t{call}
\tif err != nil {{
\t\th.fail(w, err)
\t\treturn
\t}}
\t{success}
}}",
            Self::handler_name(op)
        )
    }
}

impl GeneratorComponent for HttpHandler {
    fn name(&self) -> &'static str {
        "http-handler"
    }

    fn layer(&self) -> Layer {
        Layer::Handler
    }

    fn applies_to(&self, entity: &EntityConfig) -> bool {
        entity.has_transport(Transport::Http)
    }

    fn target(&self, _app: &Application, entity: &EntityConfig) -> TargetFile {
        transport_target(Transport::Http, entity)
    }

    fn desired(&self, app: &Application, entity: &EntityConfig) -> Vec<Declaration> {
        let handler = format!("{}Handler", entity.name);
        let uc = usecase_type(entity);

        let mut imports = vec![
            golang::quoted("encoding/json"),
            golang::quoted("errors"),
            golang::quoted("net/http"),
        ];
        if entity.capabilities.list {
            imports.push(golang::quoted("strconv"));
        }
        imports.push(golang::domain_import(app));
        imports.push(golang::module_import(app, "internal/usecase"));

        let mut decls = vec![
            Declaration::imports(imports),
            Declaration::structure(&handler, [format!("uc {uc}")]),
            Declaration::function(
                &format!("New{handler}"),
                format!("func New{handler}(uc {uc}) *{handler} {{\n\treturn &{handler}{{uc: uc}}\n}}"),
            ),
            Declaration::method(&handler, "Register", Self::register(entity)),
        ];
        decls.extend(Operation::of(entity).into_iter().map(|op| {
            Declaration::method(&handler, Self::handler_name(op), Self::endpoint(op, entity))
        }));
        decls.push(Declaration::method(
            &handler,
            "respond",
            format!("func (h *{handler}) respond{RESPOND}"),
        ));
        decls.push(Declaration::method(
            &handler,
            "fail",
            format!("func (h *{handler}) fail{FAIL}"),
        ));
        decls
    }
}

// ── gRPC ─────────────────────────────────────────────────────────────────────

/// Server for the service in `api/proto/<e>.proto`.
pub struct GrpcHandler;

/// How a field crosses the protobuf boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Wire {
    /// Same Go type on both sides.
    Direct,
    /// `time.Time` sent as an RFC 3339 string; outbound only.
    Timestamp,
    /// Not carried.
    Skipped,
}

fn wire(ty: &FieldType) -> Wire {
    match ty {
        FieldType::Time => Wire::Timestamp,
        FieldType::Optional(inner) | FieldType::List(inner) if inner.is_proto_scalar() => {
            Wire::Direct
        }
        other if other.is_proto_scalar() => Wire::Direct,
        _ => Wire::Skipped,
    }
}

impl GrpcHandler {
    fn to_proto_name(entity: &EntityConfig) -> String {
        format!("{}ToProto", entity.var_name())
    }

    fn to_proto(entity: &EntityConfig) -> Declaration {
        let e = &entity.name;
        let assignments: String = entity
            .fields
            .iter()
            .filter_map(|f| {
                let proto = proto_go_name(&f.column());
                match wire(&f.ty) {
                    Wire::Direct => Some(format!("\t\t{proto}: item.{},\n", f.name)),
                    Wire::Timestamp => Some(format!(
                        "\t\t{proto}: item.{}.Format(time.RFC3339Nano),\n",
                        f.name
                    )),
                    Wire::Skipped => None,
                }
            })
            .collect();
        let name = Self::to_proto_name(entity);
        Declaration::function(
            &name,
            format!(
                "func {name}(item *domain.{e}) *pb.{e} {{\n\treturn &pb.{e}{{\n\t\tId: item.ID,\n{assignments}\t}}\n}}"
            ),
        )
    }

    /// Input fields read from a create request.
    fn create_fields(entity: &EntityConfig) -> String {
        entity
            .fields
            .iter()
            .filter(|f| wire(&f.ty) == Wire::Direct)
            .map(|f| {
                let proto = proto_go_name(&f.column());
                if f.ty.is_optional() {
                    format!("\t\t{}: req.{proto},\n", f.name)
                } else {
                    format!("\t\t{}: req.Get{proto}(),\n", f.name)
                }
            })
            .collect()
    }

    /// Input fields read from an update request; every field is `optional`.
    fn update_fields(entity: &EntityConfig) -> String {
        entity
            .fields
            .iter()
            .filter(|f| updatable(f))
            .map(|f| format!("\t\t{}: req.{},\n", f.name, proto_go_name(&f.column())))
            .collect()
    }

    fn rpc(op: Operation, entity: &EntityConfig) -> Declaration {
        let e = &entity.name;
        let server = format!("{e}Server");
        let plural = proto_go_name(&entity.plural());
        let to_proto = Self::to_proto_name(entity);
        let name = match op {
            Operation::List => format!("List{plural}"),
            other => format!("{}{e}", other.method_name()),
        };
        let (response, body) = match op {
            Operation::Get => (
                format!("*pb.{e}"),
                format!("\titem, err := s.uc.Get(ctx, req.GetId())\n{}\treturn {to_proto}(item), nil\n", fail("nil, err")),
            ),
            Operation::List => (
                format!("*pb.List{plural}Response"),
                format!(
                    "\titems, err := s.uc.List(ctx, domain.{e}Filter{{Limit: int(req.GetLimit()), Offset: int(req.GetOffset())}})
{}\tresp := &pb.List{plural}Response{{}}
\tfor i := range items {{
\t\tresp.{plural} = append(resp.{plural}, {to_proto}(&items[i]))
\t}}
\treturn resp, nil
",
                    fail("nil, err")
                ),
            ),
            Operation::Create => (
                format!("*pb.{e}"),
                format!(
                    "\titem, err := s.uc.Create(ctx, domain.Create{e}Input{{\n{}\t}})\n{}\treturn {to_proto}(item), nil\n",
                    Self::create_fields(entity),
                    fail("nil, err")
                ),
            ),
            Operation::Update => (
                format!("*pb.{e}"),
                format!(
                    "\titem, err := s.uc.Update(ctx, req.GetId(), domain.Update{e}Input{{\n{}\t}})\n{}\treturn {to_proto}(item), nil\n",
                    Self::update_fields(entity),
                    fail("nil, err")
                ),
            ),
            Operation::Delete => (
                "*emptypb.Empty".to_string(),
                "\tif err := s.uc.Delete(ctx, req.GetId()); err != nil {\n\t\treturn nil, err\n\t}\n\treturn &emptypb.Empty{}, nil\n".to_string(),
            ),
        };
        Declaration::method(
            &server,
            &name,
            format!(
                "func (s *{server}) {name}(ctx context.Context, req *pb.{name}Request) ({response}, error) {{\n{body}}}"
            ),
        )
    }
}

fn fail(values: &str) -> String {
    format!("\tif err != nil {{\n\t\treturn {values}\n\t}}\n")
}

/// Fields an update request carries, all as proto3 `optional` scalars.
fn updatable(field: &Field) -> bool {
    match &field.ty {
        FieldType::Optional(inner) => inner.is_proto_scalar(),
        other => other.is_proto_scalar(),
    }
}

impl GeneratorComponent for GrpcHandler {
    fn name(&self) -> &'static str {
        "grpc-handler"
    }

    fn layer(&self) -> Layer {
        Layer::Handler
    }

    fn applies_to(&self, entity: &EntityConfig) -> bool {
        entity.has_transport(Transport::Grpc)
    }

    fn target(&self, _app: &Application, entity: &EntityConfig) -> TargetFile {
        transport_target(Transport::Grpc, entity)
    }

    fn desired(&self, app: &Application, entity: &EntityConfig) -> Vec<Declaration> {
        let e = &entity.name;
        let server = format!("{e}Server");
        let uc = usecase_type(entity);

        let mut imports = vec![golang::quoted("context")];
        if entity.fields.iter().any(|f| wire(&f.ty) == Wire::Timestamp) {
            imports.push(golang::quoted("time"));
        }
        imports.push(format!(
            "pb {}",
            golang::module_import(app, &format!("internal/gen/{}pb", entity.file_stem().replace('_', "")))
        ));
        imports.push(golang::domain_import(app));
        imports.push(golang::module_import(app, "internal/usecase"));
        imports.push(golang::quoted("google.golang.org/protobuf/types/known/emptypb"));

        let mut decls = vec![
            Declaration::imports(imports),
            Declaration::structure(
                &server,
                [format!("pb.Unimplemented{e}ServiceServer"), format!("uc {uc}")],
            ),
            Declaration::function(
                &format!("New{server}"),
                format!("func New{server}(uc {uc}) *{server} {{\n\treturn &{server}{{uc: uc}}\n}}"),
            ),
            Self::to_proto(entity),
        ];
        decls.extend(
            Operation::of(entity)
                .into_iter()
                .map(|op| Self::rpc(op, entity)),
        );
        decls
    }
}
