//! Persistence: the shared repository port and one adapter per backend.

use super::golang::{self, Operation};
use super::{GeneratorComponent, Layer, TargetFile};
use crate::domain::{Application, Backend, Declaration, EntityConfig};

const ERR_NOT_FOUND: &str = "var ErrNotFound = errors.New(\"not found\")";

fn repo_type(entity: &EntityConfig) -> String {
    format!("{}Repository", entity.name)
}

fn backend_target(backend: Backend, entity: &EntityConfig) -> TargetFile {
    TargetFile::new(
        format!("internal/repository/{backend}/{}.go", entity.file_stem()),
        backend.as_str(),
    )
}

fn constructor(entity: &EntityConfig, params: &str, init: &str) -> Declaration {
    let repo = repo_type(entity);
    Declaration::function(
        &format!("New{repo}"),
        format!("func New{repo}({params}) *{repo} {{\n\treturn &{repo}{{{init}}}\n}}"),
    )
}

// ── Port ─────────────────────────────────────────────────────────────────────

/// `<E>Repository` interfaces, all entities in one file.
pub struct RepositoryPort;

impl RepositoryPort {
    fn signature(op: Operation, entity: &EntityConfig) -> String {
        let e = &entity.name;
        match op {
            Operation::Get => format!("Get(ctx context.Context, id string) (*{e}, error)"),
            Operation::List => {
                format!("List(ctx context.Context, filter {e}Filter) ([]{e}, error)")
            }
            Operation::Create => format!("Create(ctx context.Context, item *{e}) error"),
            Operation::Update => format!("Update(ctx context.Context, item *{e}) error"),
            Operation::Delete => "Delete(ctx context.Context, id string) error".to_string(),
        }
    }
}

impl GeneratorComponent for RepositoryPort {
    fn name(&self) -> &'static str {
        "repository-port"
    }

    fn layer(&self) -> Layer {
        Layer::Repository
    }

    fn target(&self, _app: &Application, _entity: &EntityConfig) -> TargetFile {
        TargetFile::new("internal/domain/repository.go", "domain")
    }

    fn desired(&self, _app: &Application, entity: &EntityConfig) -> Vec<Declaration> {
        let methods = Operation::of(entity)
            .into_iter()
            .map(|op| Self::signature(op, entity));
        vec![
            Declaration::imports([golang::quoted("context"), golang::quoted("errors")]),
            Declaration::var(ERR_NOT_FOUND),
            Declaration::interface(&repo_type(entity), methods),
        ]
    }
}

// ── Postgres ─────────────────────────────────────────────────────────────────

/// `database/sql` adapter with a typed column constant group.
pub struct PostgresRepository;

struct Sql {
    repo: String,
    entity: String,
    table: String,
    columns: Vec<String>,
    /// Go expressions for each column, relative to `item`.
    values: Vec<String>,
}

impl Sql {
    fn new(entity: &EntityConfig) -> Self {
        let mut columns = vec!["id".to_string()];
        let mut values = vec!["item.ID".to_string()];
        for field in &entity.fields {
            columns.push(field.column());
            values.push(format!("item.{}", field.name));
        }
        Self {
            repo: repo_type(entity),
            entity: entity.name.clone(),
            table: entity.plural(),
            columns,
            values,
        }
    }

    fn column_list(&self) -> String {
        self.columns.join(", ")
    }

    fn scan_targets(&self) -> String {
        self.values
            .iter()
            .map(|v| format!("&{v}"))
            .collect::<Vec<_>>()
            .join(", ")
    }

    fn method(&self, name: &str, source: String) -> Declaration {
        Declaration::method(&self.repo, name, source)
    }

    fn get(&self) -> Declaration {
        let (repo, e, table) = (&self.repo, &self.entity, &self.table);
        let (cols, scans) = (self.column_list(), self.scan_targets());
        self.method(
            "Get",
            format!(
                "func (r *{repo}) Get(ctx context.Context, id string) (*domain.{e}, error) {{
\trow := r.db.QueryRowContext(ctx, `SELECT {cols} FROM {table} WHERE id = $1`, id)
\tvar item domain.{e}
\tif err := row.Scan({scans}); err != nil {{
\t\tif errors.Is(err, sql.ErrNoRows) {{
\t\t\treturn nil, domain.ErrNotFound
\t\t}}
\t\treturn nil, err
\t}}
\treturn &item, nil
}}"
            ),
        )
    }

    fn list(&self, ordered: bool) -> Declaration {
        let (repo, e, table) = (&self.repo, &self.entity, &self.table);
        let (cols, scans) = (self.column_list(), self.scan_targets());
        let order = if ordered {
            format!(
                "\torder := string({var}ColumnID)
\tif filter.OrderBy != \"\" {{
\t\torder = string(filter.OrderBy)
\t}}
\tif filter.Descending {{
\t\torder += \" DESC\"
\t}}
",
                var = column_prefix(e)
            )
        } else {
            format!("\torder := string({}ColumnID)\n", column_prefix(e))
        };
        self.method(
            "List",
            format!(
                "func (r *{repo}) List(ctx context.Context, filter domain.{e}Filter) ([]domain.{e}, error) {{
{order}\trows, err := r.db.QueryContext(ctx, `SELECT {cols} FROM {table} ORDER BY `+order+` LIMIT NULLIF($1, 0) OFFSET $2`, filter.Limit, filter.Offset)
\tif err != nil {{
\t\treturn nil, err
\t}}
\tdefer rows.Close()
\tvar out []domain.{e}
\tfor rows.Next() {{
\t\tvar item domain.{e}
\t\tif err := rows.Scan({scans}); err != nil {{
\t\t\treturn nil, err
\t\t}}
\t\tout = append(out, item)
\t}}
\treturn out, rows.Err()
}}"
            ),
        )
    }

    fn create(&self) -> Declaration {
        let (repo, e, table) = (&self.repo, &self.entity, &self.table);
        let placeholders = (1..=self.columns.len())
            .map(|i| format!("${i}"))
            .collect::<Vec<_>>()
            .join(", ");
        let (cols, values) = (self.column_list(), self.values.join(", "));
        self.method(
            "Create",
            format!(
                "func (r *{repo}) Create(ctx context.Context, item *domain.{e}) error {{
\t_, err := r.db.ExecContext(ctx, `INSERT INTO {table} ({cols}) VALUES ({placeholders})`, {values})
\treturn err
}}"
            ),
        )
    }

    fn update(&self) -> Declaration {
        let (repo, e, table) = (&self.repo, &self.entity, &self.table);
        let assignments = self
            .columns
            .iter()
            .enumerate()
            .skip(1)
            .map(|(i, column)| format!("{column} = ${}", i + 1))
            .collect::<Vec<_>>()
            .join(", ");
        let values = self.values.join(", ");
        self.method(
            "Update",
            format!(
                "func (r *{repo}) Update(ctx context.Context, item *domain.{e}) error {{
\tres, err := r.db.ExecContext(ctx, `UPDATE {table} SET {assignments} WHERE id = $1`, {values})
{affected}}}",
                affected = ROWS_AFFECTED
            ),
        )
    }

    fn delete(&self) -> Declaration {
        let (repo, table) = (&self.repo, &self.table);
        self.method(
            "Delete",
            format!(
                "func (r *{repo}) Delete(ctx context.Context, id string) error {{
\tres, err := r.db.ExecContext(ctx, `DELETE FROM {table} WHERE id = $1`, id)
{affected}}}",
                affected = ROWS_AFFECTED
            ),
        )
    }
}

const ROWS_AFFECTED: &str = "\tif err != nil {
\t\treturn err
\t}
\tn, err := res.RowsAffected()
\tif err != nil {
\t\treturn err
\t}
\tif n == 0 {
\t\treturn domain.ErrNotFound
\t}
\treturn nil
";

/// `Widget` → `widget`, prefix of the unexported column constants.
fn column_prefix(entity: &str) -> String {
    let mut chars = entity.chars();
    match chars.next() {
        Some(first) => first.to_ascii_lowercase().to_string() + chars.as_str(),
        None => String::new(),
    }
}

impl GeneratorComponent for PostgresRepository {
    fn name(&self) -> &'static str {
        "postgres-repository"
    }

    fn layer(&self) -> Layer {
        Layer::Repository
    }

    fn applies_to(&self, entity: &EntityConfig) -> bool {
        entity.has_backend(Backend::Postgres)
    }

    fn target(&self, _app: &Application, entity: &EntityConfig) -> TargetFile {
        backend_target(Backend::Postgres, entity)
    }

    fn desired(&self, app: &Application, entity: &EntityConfig) -> Vec<Declaration> {
        let sql = Sql::new(entity);
        let prefix = column_prefix(&entity.name);
        let column_type = format!("{prefix}Column");
        let mut columns = vec![format!("{prefix}ColumnID {column_type} = \"id\"")];
        columns.extend(entity.fields.iter().map(|f| {
            format!("{prefix}Column{} {column_type} = \"{}\"", f.name, f.column())
        }));

        let mut decls = vec![
            Declaration::imports([
                golang::quoted("context"),
                golang::quoted("database/sql"),
                golang::quoted("errors"),
                golang::domain_import(app),
            ]),
            Declaration::named_type(&column_type, "string"),
            Declaration::const_group(Some(&column_type), columns),
            Declaration::structure(&sql.repo, ["db *sql.DB"]),
            constructor(entity, "db *sql.DB", "db: db"),
        ];
        for op in Operation::of(entity) {
            decls.push(match op {
                Operation::Get => sql.get(),
                Operation::List => sql.list(entity.capabilities.order),
                Operation::Create => sql.create(),
                Operation::Update => sql.update(),
                Operation::Delete => sql.delete(),
            });
        }
        decls
    }
}

// ── Memory ───────────────────────────────────────────────────────────────────

/// Map-backed adapter for tests and prototypes.
pub struct MemoryRepository;

impl MemoryRepository {
    fn method(entity: &EntityConfig, op: Operation) -> Declaration {
        let repo = repo_type(entity);
        let e = &entity.name;
        let (name, source) = match op {
            Operation::Get => (
                "Get",
                format!(
                    "func (r *{repo}) Get(ctx context.Context, id string) (*domain.{e}, error) {{
\tr.mu.RLock()
\tdefer r.mu.RUnlock()
\titem, ok := r.items[id]
\tif !ok {{
\t\treturn nil, domain.ErrNotFound
\t}}
\treturn &item, nil
}}"
                ),
            ),
            Operation::List => (
                "List",
                format!(
                    "func (r *{repo}) List(ctx context.Context, filter domain.{e}Filter) ([]domain.{e}, error) {{
\tr.mu.RLock()
\tdefer r.mu.RUnlock()
\tout := make([]domain.{e}, 0, len(r.items))
\tfor _, item := range r.items {{
\t\tout = append(out, item)
\t}}
\tsort.Slice(out, func(i, j int) bool {{ return out[i].ID < out[j].ID }})
\tif filter.Offset >= len(out) {{
\t\treturn []domain.{e}{{}}, nil
\t}}
\tout = out[filter.Offset:]
\tif filter.Limit > 0 && filter.Limit < len(out) {{
\t\tout = out[:filter.Limit]
\t}}
\treturn out, nil
}}"
                ),
            ),
            Operation::Create => (
                "Create",
                format!(
                    "func (r *{repo}) Create(ctx context.Context, item *domain.{e}) error {{
\tr.mu.Lock()
\tdefer r.mu.Unlock()
\tr.items[item.ID] = *item
\treturn nil
}}"
                ),
            ),
            Operation::Update => (
                "Update",
                format!(
                    "func (r *{repo}) Update(ctx context.Context, item *domain.{e}) error {{
\tr.mu.Lock()
\tdefer r.mu.Unlock()
\tif _, ok := r.items[item.ID]; !ok {{
\t\treturn domain.ErrNotFound
\t}}
\tr.items[item.ID] = *item
\treturn nil
}}"
                ),
            ),
            Operation::Delete => (
                "Delete",
                format!(
                    "func (r *{repo}) Delete(ctx context.Context, id string) error {{
\tr.mu.Lock()
\tdefer r.mu.Unlock()
\tif _, ok := r.items[id]; !ok {{
\t\treturn domain.ErrNotFound
\t}}
\tdelete(r.items, id)
\treturn nil
}}"
                ),
            ),
        };
        Declaration::method(&repo, name, source)
    }
}

impl GeneratorComponent for MemoryRepository {
    fn name(&self) -> &'static str {
        "memory-repository"
    }

    fn layer(&self) -> Layer {
        Layer::Repository
    }

    fn applies_to(&self, entity: &EntityConfig) -> bool {
        entity.has_backend(Backend::Memory)
    }

    fn target(&self, _app: &Application, entity: &EntityConfig) -> TargetFile {
        backend_target(Backend::Memory, entity)
    }

    fn desired(&self, app: &Application, entity: &EntityConfig) -> Vec<Declaration> {
        let repo = repo_type(entity);
        let mut imports = vec![golang::quoted("context")];
        if entity.capabilities.list {
            imports.push(golang::quoted("sort"));
        }
        imports.push(golang::quoted("sync"));
        imports.push(golang::domain_import(app));

        let mut decls = vec![
            Declaration::imports(imports),
            Declaration::structure(
                &repo,
                [
                    "mu sync.RWMutex".to_string(),
                    format!("items map[string]domain.{}", entity.name),
                ],
            ),
            constructor(
                entity,
                "",
                &format!("items: make(map[string]domain.{})", entity.name),
            ),
        ];
        decls.extend(
            Operation::of(entity)
                .into_iter()
                .map(|op| Self::method(entity, op)),
        );
        decls
    }
}

#[cfg(test)]
mod tests {
    use super::super::tests::{app, everything, generate};
    use super::*;
    use crate::domain::{Capabilities, Field, FieldType, MergeAction, ensure};

    #[test]
    fn port_collects_one_interface_per_entity() {
        let widget = everything();
        let gadget = EntityConfig::new("Gadget", vec![Field::new("Size", FieldType::Int)]);

        let mut file = generate(&RepositoryPort, &widget);
        for decl in RepositoryPort.desired(&app(), &gadget) {
            file = ensure(file, decl).0;
        }
        let text = file.render();
        assert_eq!(text.matches("var ErrNotFound").count(), 1);
        assert!(text.contains("type WidgetRepository interface {\n\tGet(ctx context.Context, id string) (*Widget, error)\n\tList("));
        assert!(text.contains("type GadgetRepository interface {\n\tGet(ctx context.Context, id string) (*Gadget, error)\n\tDelete(ctx context.Context, id string) error\n}"));
    }

    #[test]
    fn new_capability_fills_the_interface() {
        let plain = EntityConfig::new("Gadget", vec![Field::new("Size", FieldType::Int)]);
        let file = generate(&RepositoryPort, &plain);
        let listed = plain.clone().with_capabilities(Capabilities {
            list: true,
            ..Capabilities::default()
        });
        let decl = RepositoryPort.desired(&app(), &listed).pop().unwrap();
        let (_, action) = ensure(file, decl);
        assert_eq!(action, MergeAction::FillMembers { added: vec!["List".into()] });
    }

    #[test]
    fn postgres_sql_lists_every_column() {
        let text = generate(&PostgresRepository, &everything()).render();
        assert!(text.contains("package postgres\n"));
        assert!(text.contains("\"github.com/acme/shop/internal/domain\""));
        assert!(text.contains(
            "INSERT INTO widgets (id, name, email, weight, nickname, tags, made_at, active) VALUES ($1, $2, $3, $4, $5, $6, $7, $8)"
        ));
        assert!(text.contains("UPDATE widgets SET name = $2, email = $3,"));
        assert!(text.contains("\twidgetColumnMadeAt widgetColumn = \"made_at\""));
        assert!(text.contains("\t\torder = string(filter.OrderBy)"));
    }

    #[test]
    fn memory_repository_imports_sort_only_for_lists() {
        let plain = EntityConfig::new("Gadget", vec![Field::new("Size", FieldType::Int)])
            .with_backends([Backend::Memory]);
        let text = generate(&MemoryRepository, &plain).render();
        assert!(!text.contains("\"sort\""));
        assert!(text.contains("return &GadgetRepository{items: make(map[string]domain.Gadget)}"));

        let text = generate(&MemoryRepository, &everything()).render();
        assert!(text.contains("\"sort\""));
        assert!(text.starts_with("package memory\n"));
    }
}
