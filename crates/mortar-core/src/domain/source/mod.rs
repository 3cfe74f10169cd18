//! Structural representation of one generated Go source file.
//!
//! The tree is *lossless*: every node keeps the exact text it was parsed
//! from, so rendering an untouched tree reproduces its input byte-for-byte.
//! Nodes built by generator components come from canonical text that the
//! parser splits in exactly the same places, which keeps
//! `render(parse(render(f)))` equal to `render(f)`.
//!
//! ```text
//! SourceFile
//! ├── preamble      "// Code generated ...\npackage domain"
//! ├── imports       [Item { leading, Declaration::Import }]
//! ├── declarations  [Item { leading, Declaration::* }]
//! └── trailer       "\n"
//! ```

mod build;
mod keys;
pub mod parser;
mod scan;
pub mod visit;

use std::collections::HashSet;
use std::fmt;
use std::path::{Path, PathBuf};

use serde::Serialize;

pub use parser::{ParseError, parse};
pub use scan::MemberStyle;
pub use visit::{Visitor, walk};

/// Separator placed before every declaration Mortar appends.
pub(crate) const DECL_SEPARATOR: &str = "\n\n";

// ── Identity ─────────────────────────────────────────────────────────────────

/// The kind half of an identity key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DeclKind {
    Type,
    Function,
    Method,
    Const,
    Var,
    Import,
    Other,
}

impl DeclKind {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Type => "type",
            Self::Function => "func",
            Self::Method => "method",
            Self::Const => "const",
            Self::Var => "var",
            Self::Import => "import",
            Self::Other => "other",
        }
    }
}

impl fmt::Display for DeclKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// `(kind, name)` for top-level declarations, `(kind, name, receiver)` for
/// methods.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct IdentityKey {
    pub kind: DeclKind,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub receiver: Option<String>,
}

impl IdentityKey {
    pub fn top_level(kind: DeclKind, name: impl Into<String>) -> Self {
        Self {
            kind,
            name: name.into(),
            receiver: None,
        }
    }

    pub fn method(receiver: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            kind: DeclKind::Method,
            name: name.into(),
            receiver: Some(receiver.into()),
        }
    }

    /// Go allows any number of `init` functions and blank (`_`)
    /// declarations, so these never identify a single declaration.
    pub fn is_repeatable(&self) -> bool {
        self.name == "_" || (self.kind == DeclKind::Function && self.name == "init")
    }
}

impl fmt::Display for IdentityKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.receiver {
            Some(receiver) => write!(f, "{} {}.{}", self.kind, receiver, self.name),
            None => write!(f, "{} {}", self.kind, self.name),
        }
    }
}

// ── Members and aggregates ───────────────────────────────────────────────────

/// One member of an aggregate: a struct field, interface method, constant,
/// import spec or validation check.
///
/// `raw` holds the leading trivia (newline, indentation, comments) followed by
/// the member's code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Member {
    keys: Vec<String>,
    raw: String,
    code_start: usize,
}

impl Member {
    pub(crate) fn new(raw: String, code_start: usize, keys: Vec<String>) -> Self {
        Self {
            keys,
            raw,
            code_start,
        }
    }

    /// Identity keys of this member. Usually one; `A, B int` has two.
    pub fn keys(&self) -> &[String] {
        &self.keys
    }

    /// The first key, or the code itself for members with no recognizable key.
    pub fn label(&self) -> &str {
        self.keys.first().map_or_else(|| self.code(), String::as_str)
    }

    /// Exact source text, including leading trivia.
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// The member's code without leading trivia or trailing whitespace.
    pub fn code(&self) -> &str {
        self.raw[self.code_start..].trim_end()
    }

    fn leading(&self) -> &str {
        &self.raw[..self.code_start]
    }

    /// The code up to a trailing `// comment`.
    fn code_before_comment(&self) -> &str {
        strip_line_comment(self.code())
    }
}

/// `code` without its trailing line comment. String and rune literals are
/// skipped, so `"http://x"` is not a comment.
fn strip_line_comment(code: &str) -> &str {
    let bytes = code.as_bytes();
    let mut quote: Option<u8> = None;
    let mut i = 0;
    while i < bytes.len() {
        let b = bytes[i];
        match quote {
            Some(q) if b == q => quote = None,
            Some(q) if b == b'\\' && q != b'`' => i += 1,
            Some(_) => {}
            None => match b {
                b'"' | b'\'' | b'`' => quote = Some(b),
                b'/' if bytes.get(i + 1) == Some(&b'/') => return code[..i].trim_end(),
                _ => {}
            },
        }
        i += 1;
    }
    code
}

/// A declaration body that holds an internal list of members.
///
/// Rendered as `open + members + close`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Aggregate {
    open: String,
    members: Vec<Member>,
    close: String,
    style: MemberStyle,
}

impl Aggregate {
    pub(crate) fn new(
        open: impl Into<String>,
        members: Vec<Member>,
        close: impl Into<String>,
        style: MemberStyle,
    ) -> Self {
        Self {
            open: open.into(),
            members,
            close: close.into(),
            style,
        }
    }

    pub fn members(&self) -> &[Member] {
        &self.members
    }

    pub fn style(&self) -> MemberStyle {
        self.style
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// All member keys, for one-pass membership tests.
    pub fn key_set(&self) -> HashSet<&str> {
        self.members
            .iter()
            .flat_map(|m| m.keys.iter().map(String::as_str))
            .collect()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.members.iter().any(|m| m.keys.iter().any(|k| k == key))
    }

    /// Append `member`'s code after the last existing member.
    ///
    /// Indentation is copied from the last existing member. A missing
    /// separator comma after the last member is emitted as part of the new
    /// member, unless a trailing line comment is in the way; then it goes
    /// right before the comment.
    pub(crate) fn append(&mut self, member: &Member) {
        let indent = self.member_indent();
        let mut raw = String::new();
        let mut code = member.code().to_string();

        if self.style == MemberStyle::Commas {
            if let Some(last) = self.members.last_mut() {
                let before = last.code_before_comment().len();
                if !last.code_before_comment().ends_with(',') {
                    if before == last.code().len() {
                        raw.push(',');
                    } else {
                        last.raw.insert(last.code_start + before, ',');
                    }
                }
            }
            if !code.ends_with(',') {
                code.push(',');
            }
        }

        raw.push('\n');
        raw.push_str(&indent);
        let code_start = raw.len();
        raw.push_str(&code);

        self.ensure_close_on_own_line(&indent);
        self.members
            .push(Member::new(raw, code_start, member.keys.clone()));
    }

    fn member_indent(&self) -> String {
        let inferred = self.members.last().and_then(|last| {
            let leading = last.leading();
            leading
                .rfind('\n')
                .map(|nl| leading[nl + 1..].to_string())
                .filter(|indent| !indent.is_empty())
        });
        inferred.unwrap_or_else(|| self.default_indent().to_string())
    }

    fn default_indent(&self) -> &'static str {
        match self.style {
            MemberStyle::Lines => "\t",
            MemberStyle::Commas => "\t\t",
        }
    }

    fn ensure_close_on_own_line(&mut self, indent: &str) {
        let body = self.close.trim_start_matches([' ', '\t', '\r']);
        if body.starts_with('\n') || body.starts_with("//") {
            return;
        }
        let base = indent.strip_suffix('\t').unwrap_or("");
        self.close = format!("\n{base}{body}");
    }

    /// Turn a single-spec `const X T = v` / `import "p"` into a grouped form
    /// so members can be appended. The existing spec keeps its code.
    pub(crate) fn regroup(&mut self, keyword: &str) {
        self.open = format!("{keyword} (");
        for member in &mut self.members {
            let code = member.code().to_string();
            member.raw = format!("\n\t{code}");
            member.code_start = 2;
        }
        self.close = "\n)".to_string();
    }

    pub(crate) fn render_into(&self, out: &mut String) {
        out.push_str(&self.open);
        for member in &self.members {
            out.push_str(&member.raw);
        }
        out.push_str(&self.close);
    }
}

// ── Declarations ─────────────────────────────────────────────────────────────

/// Shape of a `type` declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeShape {
    Struct(Aggregate),
    Interface(Aggregate),
    /// Any other type definition, kept as source text (`type X string`).
    Opaque(String),
}

impl TypeShape {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Struct(_) => "struct",
            Self::Interface(_) => "interface",
            Self::Opaque(_) => "type",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeDecl {
    pub(crate) name: String,
    pub(crate) shape: TypeShape,
}

impl TypeDecl {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn shape(&self) -> &TypeShape {
        &self.shape
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionDecl {
    pub(crate) name: String,
    pub(crate) source: String,
}

impl FunctionDecl {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn source(&self) -> &str {
        &self.source
    }
}

/// Body of a method. `Checks` is recognized when the body returns a
/// `ValidateStruct(&recv, checks...)` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MethodBody {
    Opaque(String),
    Checks(Aggregate),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodDecl {
    pub(crate) name: String,
    pub(crate) receiver: String,
    pub(crate) body: MethodBody,
}

impl MethodDecl {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn receiver(&self) -> &str {
        &self.receiver
    }

    pub fn body(&self) -> &MethodBody {
        &self.body
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConstDecl {
    pub(crate) type_name: Option<String>,
    pub(crate) block: Aggregate,
    pub(crate) grouped: bool,
}

impl ConstDecl {
    /// The declared type of the group's first typed member.
    pub fn type_name(&self) -> Option<&str> {
        self.type_name.as_deref()
    }

    pub fn members(&self) -> &[Member] {
        self.block.members()
    }

    /// Identity name: the declared type, or the first constant for untyped groups.
    fn key_name(&self) -> String {
        self.type_name
            .clone()
            .or_else(|| self.block.members().first().map(|m| m.label().to_string()))
            .unwrap_or_default()
    }
}

/// A `var` declaration, single or grouped. The text is kept as written; only
/// the declared names are modelled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VarDecl {
    pub(crate) names: Vec<String>,
    pub(crate) source: String,
}

impl VarDecl {
    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    /// Whether this declaration introduces `name`. Blank names never match.
    pub fn declares(&self, name: &str) -> bool {
        name != "_" && self.names.iter().any(|n| n == name)
    }

    fn key_name(&self) -> &str {
        self.names
            .iter()
            .find(|n| *n != "_")
            .or_else(|| self.names.first())
            .map_or("_", String::as_str)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportDecl {
    pub(crate) block: Aggregate,
    pub(crate) grouped: bool,
}

impl ImportDecl {
    /// Import paths declared here.
    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.block.members().iter().map(Member::label)
    }
}

/// One named, kinded unit of source structure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Declaration {
    Type(TypeDecl),
    Function(FunctionDecl),
    Method(MethodDecl),
    Const(ConstDecl),
    Var(VarDecl),
    Import(ImportDecl),
    /// Top-level text Mortar does not model (grouped `type (...)`).
    Other(String),
}

impl Declaration {
    pub fn kind(&self) -> DeclKind {
        match self {
            Self::Type(_) => DeclKind::Type,
            Self::Function(_) => DeclKind::Function,
            Self::Method(_) => DeclKind::Method,
            Self::Const(_) => DeclKind::Const,
            Self::Var(_) => DeclKind::Var,
            Self::Import(_) => DeclKind::Import,
            Self::Other(_) => DeclKind::Other,
        }
    }

    /// Identity key, `None` for imports (keyed per member) and `Other`.
    pub fn identity_key(&self) -> Option<IdentityKey> {
        match self {
            Self::Type(t) => Some(IdentityKey::top_level(DeclKind::Type, &t.name)),
            Self::Function(f) => Some(IdentityKey::top_level(DeclKind::Function, &f.name)),
            Self::Method(m) => Some(IdentityKey::method(&m.receiver, &m.name)),
            Self::Const(c) => Some(IdentityKey::top_level(DeclKind::Const, c.key_name())),
            Self::Var(v) => Some(IdentityKey::top_level(DeclKind::Var, v.key_name())),
            Self::Import(_) | Self::Other(_) => None,
        }
    }

    /// Short shape name used in conflict reports.
    pub fn shape_name(&self) -> &'static str {
        match self {
            Self::Type(t) => t.shape.as_str(),
            Self::Function(_) => "func",
            Self::Method(m) => match m.body {
                MethodBody::Opaque(_) => "method",
                MethodBody::Checks(_) => "validation method",
            },
            Self::Const(_) => "const group",
            Self::Var(_) => "var",
            Self::Import(_) => "import",
            Self::Other(_) => "other",
        }
    }

    /// Human label for logs and reports.
    pub fn label(&self) -> String {
        match self.identity_key() {
            Some(key) => key.to_string(),
            None => match self {
                Self::Import(i) => format!("import {}", i.paths().collect::<Vec<_>>().join(", ")),
                _ => "other".to_string(),
            },
        }
    }

    /// The member list, when this declaration is aggregate-capable.
    pub fn aggregate(&self) -> Option<&Aggregate> {
        match self {
            Self::Type(TypeDecl {
                shape: TypeShape::Struct(a) | TypeShape::Interface(a),
                ..
            }) => Some(a),
            Self::Method(MethodDecl {
                body: MethodBody::Checks(a),
                ..
            }) => Some(a),
            Self::Const(c) => Some(&c.block),
            Self::Import(i) => Some(&i.block),
            _ => None,
        }
    }

    pub(crate) fn render_into(&self, out: &mut String) {
        match self {
            Self::Type(t) => match &t.shape {
                TypeShape::Struct(a) | TypeShape::Interface(a) => a.render_into(out),
                TypeShape::Opaque(source) => out.push_str(source),
            },
            Self::Function(f) => out.push_str(&f.source),
            Self::Method(m) => match &m.body {
                MethodBody::Opaque(source) => out.push_str(source),
                MethodBody::Checks(a) => a.render_into(out),
            },
            Self::Const(c) => c.block.render_into(out),
            Self::Var(v) => out.push_str(&v.source),
            Self::Import(i) => i.block.render_into(out),
            Self::Other(source) => out.push_str(source),
        }
    }

    /// Render this declaration alone.
    pub fn render(&self) -> String {
        let mut out = String::new();
        self.render_into(&mut out);
        out
    }
}

/// A declaration together with the trivia that precedes it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Item {
    pub(crate) leading: String,
    pub(crate) decl: Declaration,
}

impl Item {
    pub(crate) fn appended(decl: Declaration) -> Self {
        Self {
            leading: DECL_SEPARATOR.to_string(),
            decl,
        }
    }

    pub fn leading(&self) -> &str {
        &self.leading
    }

    pub fn declaration(&self) -> &Declaration {
        &self.decl
    }
}

// ── File ─────────────────────────────────────────────────────────────────────

/// An ordered sequence of declarations plus an import section, keyed by path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    pub(crate) path: PathBuf,
    pub(crate) preamble: String,
    pub(crate) package: String,
    pub(crate) imports: Vec<Item>,
    pub(crate) decls: Vec<Item>,
    pub(crate) trailer: String,
}

impl SourceFile {
    /// The minimal valid file: a package clause and nothing else.
    pub fn skeleton(path: impl Into<PathBuf>, package: impl Into<String>) -> Self {
        let package = package.into();
        Self {
            path: path.into(),
            preamble: format!("package {package}"),
            package,
            imports: Vec::new(),
            decls: Vec::new(),
            trailer: "\n".to_string(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn package(&self) -> &str {
        &self.package
    }

    pub fn imports(&self) -> impl Iterator<Item = &Declaration> {
        self.imports.iter().map(|item| &item.decl)
    }

    pub fn declarations(&self) -> impl Iterator<Item = &Declaration> {
        self.decls.iter().map(|item| &item.decl)
    }

    pub fn import_paths(&self) -> HashSet<&str> {
        self.imports
            .iter()
            .filter_map(|item| match &item.decl {
                Declaration::Import(i) => Some(i),
                _ => None,
            })
            .flat_map(ImportDecl::paths)
            .collect()
    }

    /// Append a declaration at the end of the declaration list.
    pub(crate) fn push_declaration(&mut self, decl: Declaration) {
        self.decls.push(Item::appended(decl));
    }

    /// Append an import declaration after the last existing one.
    pub(crate) fn push_import(&mut self, decl: Declaration) {
        self.imports.push(Item::appended(decl));
    }

    /// Serialize the tree back to source text. Deterministic.
    pub fn render(&self) -> String {
        let mut out = String::with_capacity(self.preamble.len() + 64 * self.decls.len());
        out.push_str(&self.preamble);
        for item in self.imports.iter().chain(&self.decls) {
            out.push_str(&item.leading);
            item.decl.render_into(&mut out);
        }
        out.push_str(&self.trailer);
        out
    }
}
