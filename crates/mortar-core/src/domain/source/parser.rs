//! Lossless parser for the Go subset Mortar generates.
//!
//! Every byte of the input lands in exactly one node: the preamble, an item's
//! leading trivia, a declaration, or the trailer. Anything outside the subset
//! that still has a recognizable top-level shape (grouped `type (...)`, `var`
//! blocks whose specs do not split) is kept as [`Declaration::Other`].

use std::collections::HashMap;
use std::path::Path;

use thiserror::Error;

use super::keys;
use super::scan::{MemberStyle, Scanner};
use super::{
    Aggregate, ConstDecl, DeclKind, Declaration, FunctionDecl, ImportDecl, Item, Member,
    MethodBody, MethodDecl, SourceFile, TypeDecl, TypeShape, VarDecl,
};

/// Why a file could not be loaded into a [`SourceFile`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("line {line}, column {column}: {message}")]
pub struct ParseError {
    pub line: usize,
    pub column: usize,
    pub message: String,
}

impl ParseError {
    pub(crate) fn at(src: &str, pos: usize, message: impl Into<String>) -> Self {
        let pos = pos.min(src.len());
        let before = &src.as_bytes()[..pos];
        let line = before.iter().filter(|&&b| b == b'\n').count() + 1;
        let line_start = before
            .iter()
            .rposition(|&b| b == b'\n')
            .map_or(0, |nl| nl + 1);
        Self {
            line,
            column: pos - line_start + 1,
            message: message.into(),
        }
    }
}

type KeyFn = fn(&str) -> Vec<String>;

/// Parse `src` into a lossless [`SourceFile`].
///
/// Fails on text outside the supported subset, on imports that follow other
/// declarations, and on files that repeat a type/function name or a
/// `(receiver, method)` pair.
pub fn parse(path: &Path, src: &str) -> Result<SourceFile, ParseError> {
    let sc = Scanner::new(src);

    let pos = sc.skip_trivia(0)?;
    if !sc.keyword_at(pos, "package") {
        return Err(sc.error(pos, "expected `package` clause"));
    }
    let name_pos = sc.skip_inline_space(pos + "package".len());
    let Some((package, preamble_end)) = sc.ident(name_pos) else {
        return Err(sc.error(name_pos, "expected package name"));
    };

    let mut imports = Vec::new();
    let mut decls = Vec::new();
    let mut starts = Vec::new();
    let mut pos = preamble_end;

    let trailer = loop {
        let next = sc.skip_trivia(pos)?;
        if next >= sc.len() {
            break src[pos..].to_string();
        }
        let leading = src[pos..next].to_string();
        let (decl, end) = declaration(&sc, next)?;

        let item = Item { leading, decl };
        if let Declaration::Import(_) = item.decl {
            if !decls.is_empty() {
                return Err(sc.error(next, "imports must appear before other declarations"));
            }
            imports.push(item);
        } else {
            starts.push(next);
            decls.push(item);
        }
        pos = end;
    };

    check_unique(&sc, &decls, &starts)?;

    Ok(SourceFile {
        path: path.to_path_buf(),
        preamble: src[..preamble_end].to_string(),
        package: package.to_string(),
        imports,
        decls,
        trailer,
    })
}

/// Types, functions and variables share the package namespace; methods are
/// unique per receiver. `init` functions and blank names may repeat.
fn check_unique(sc: &Scanner<'_>, decls: &[Item], starts: &[usize]) -> Result<(), ParseError> {
    let mut seen: HashMap<(bool, Option<String>, String), DeclKind> = HashMap::new();
    for (item, &start) in decls.iter().zip(starts) {
        let Some(key) = item.decl.identity_key() else {
            continue;
        };
        if key.is_repeatable() {
            continue;
        }
        let slot = match key.kind {
            DeclKind::Type | DeclKind::Function | DeclKind::Var => (false, None, key.name.clone()),
            DeclKind::Method => (true, key.receiver.clone(), key.name.clone()),
            _ => continue,
        };
        if let Some(previous) = seen.insert(slot, key.kind) {
            return Err(sc.error(
                start,
                format!("`{}` is already declared as a {previous}", key.name),
            ));
        }
    }
    Ok(())
}

fn declaration(sc: &Scanner<'_>, start: usize) -> Result<(Declaration, usize), ParseError> {
    let Some((keyword, after)) = sc.ident(start) else {
        return Err(sc.error(start, "expected declaration"));
    };
    match keyword {
        "import" => {
            let (block, grouped, end) =
                spec_block(sc, start, after, keys::import_keys)?;
            Ok((Declaration::Import(ImportDecl { block, grouped }), end))
        }
        "const" => {
            let (block, grouped, end) = spec_block(sc, start, after, keys::const_keys)?;
            let type_name = block
                .members()
                .iter()
                .find_map(|m| keys::const_spec(m.code()).1);
            Ok((
                Declaration::Const(ConstDecl {
                    type_name,
                    block,
                    grouped,
                }),
                end,
            ))
        }
        "type" => type_declaration(sc, start, after),
        "func" => func_declaration(sc, start, after),
        "var" => var_declaration(sc, start, after),
        other => Err(sc.error(start, format!("unexpected `{other}` at top level"))),
    }
}

/// The text is taken whole; the spec list is split only to learn the names.
fn var_declaration(
    sc: &Scanner<'_>,
    start: usize,
    after_keyword: usize,
) -> Result<(Declaration, usize), ParseError> {
    let end = sc.statement_end(start)?;
    let source = sc.src()[start..end].to_string();
    let names: Vec<String> = spec_block(sc, start, after_keyword, keys::const_keys)
        .ok()
        .filter(|&(_, _, block_end)| block_end == end)
        .map(|(block, _, _)| {
            block
                .members()
                .iter()
                .flat_map(|m| m.keys().iter().cloned())
                .collect()
        })
        .unwrap_or_default();
    let decl = if names.is_empty() {
        Declaration::Other(source)
    } else {
        Declaration::Var(VarDecl { names, source })
    };
    Ok((decl, end))
}

/// `import`/`const`/`var` in either single-spec or parenthesized form.
fn spec_block(
    sc: &Scanner<'_>,
    start: usize,
    after_keyword: usize,
    key_fn: KeyFn,
) -> Result<(Aggregate, bool, usize), ParseError> {
    let src = sc.src();
    let next = sc.skip_inline_space(after_keyword);
    if sc.byte(next) == Some(b'(') {
        let (members, rest, close_at) = members(sc, next + 1, b')', MemberStyle::Lines, key_fn)?;
        let end = close_at + 1;
        let block = Aggregate::new(
            &src[start..=next],
            members,
            &src[rest..end],
            MemberStyle::Lines,
        );
        return Ok((block, true, end));
    }

    let code_at = sc.skip_trivia(after_keyword)?;
    let end = sc.statement_end(code_at)?;
    let raw = src[after_keyword..end].to_string();
    let code_start = code_at - after_keyword;
    let keys = key_fn(raw[code_start..].trim_end());
    let block = Aggregate::new(
        &src[start..after_keyword],
        vec![Member::new(raw, code_start, keys)],
        "",
        MemberStyle::Lines,
    );
    Ok((block, false, end))
}

/// Members up to the `close` delimiter.
///
/// Returns the members, the start of the closing trivia and the index of the
/// delimiter itself.
fn members(
    sc: &Scanner<'_>,
    mut pos: usize,
    close: u8,
    style: MemberStyle,
    key_fn: KeyFn,
) -> Result<(Vec<Member>, usize, usize), ParseError> {
    let src = sc.src();
    let mut members = Vec::new();
    loop {
        let next = sc.skip_trivia(pos)?;
        match sc.byte(next) {
            None => return Err(sc.error(pos, format!("missing `{}`", close as char))),
            Some(b) if b == close => return Ok((members, pos, next)),
            Some(_) => {}
        }
        let end = sc.member_end(next, style, Some(close))?;
        if end == next {
            return Err(sc.error(next, "empty member"));
        }
        // Whitespace before the closing delimiter belongs to the close.
        let end = next + src[next..end].trim_end().len();
        let raw = src[pos..end].to_string();
        let code_start = next - pos;
        let keys = key_fn(raw[code_start..].trim_end());
        members.push(Member::new(raw, code_start, keys));
        pos = end;
    }
}

fn type_declaration(
    sc: &Scanner<'_>,
    start: usize,
    after_keyword: usize,
) -> Result<(Declaration, usize), ParseError> {
    let src = sc.src();
    let name_pos = sc.skip_inline_space(after_keyword);
    if sc.byte(name_pos) == Some(b'(') {
        let end = sc.statement_end(start)?;
        return Ok((Declaration::Other(src[start..end].to_string()), end));
    }
    let Some((name, mut pos)) = sc.ident(name_pos) else {
        return Err(sc.error(name_pos, "expected type name"));
    };
    if sc.byte(pos) == Some(b'[') {
        pos = sc.skip_balanced(pos)?;
    }

    let body_pos = sc.skip_inline_space(pos);
    let shape = if sc.keyword_at(body_pos, "struct") {
        Some((body_pos + "struct".len(), keys::field_keys as KeyFn, true))
    } else if sc.keyword_at(body_pos, "interface") {
        Some((body_pos + "interface".len(), keys::interface_keys as KeyFn, false))
    } else {
        None
    };

    let Some((after_shape, key_fn, is_struct)) = shape else {
        let end = sc.statement_end(start)?;
        let decl = TypeDecl {
            name: name.to_string(),
            shape: TypeShape::Opaque(src[start..end].to_string()),
        };
        return Ok((Declaration::Type(decl), end));
    };

    let brace = sc.skip_trivia(after_shape)?;
    if sc.byte(brace) != Some(b'{') {
        return Err(sc.error(brace, "expected `{`"));
    }
    let (members, rest, close_at) = members(sc, brace + 1, b'}', MemberStyle::Lines, key_fn)?;
    let end = close_at + 1;
    let block = Aggregate::new(&src[start..=brace], members, &src[rest..end], MemberStyle::Lines);
    let shape = if is_struct {
        TypeShape::Struct(block)
    } else {
        TypeShape::Interface(block)
    };
    Ok((
        Declaration::Type(TypeDecl {
            name: name.to_string(),
            shape,
        }),
        end,
    ))
}

fn func_declaration(
    sc: &Scanner<'_>,
    start: usize,
    after_keyword: usize,
) -> Result<(Declaration, usize), ParseError> {
    let src = sc.src();
    let end = sc.statement_end(start)?;
    let mut pos = sc.skip_inline_space(after_keyword);

    let receiver = if sc.byte(pos) == Some(b'(') {
        let close = sc.skip_balanced(pos)?;
        let receiver = keys::receiver_type(&src[pos + 1..close - 1]);
        pos = sc.skip_trivia(close)?;
        Some(receiver)
    } else {
        None
    };

    let Some((name, _)) = sc.ident(pos) else {
        return Err(sc.error(pos, "expected function name"));
    };
    let name = name.to_string();

    let Some(receiver) = receiver else {
        let source = src[start..end].to_string();
        return Ok((Declaration::Function(FunctionDecl { name, source }), end));
    };

    let body = match check_list(sc, start, pos, end) {
        Some(block) => MethodBody::Checks(block),
        None => MethodBody::Opaque(src[start..end].to_string()),
    };
    Ok((
        Declaration::Method(MethodDecl {
            name,
            receiver,
            body,
        }),
        end,
    ))
}

/// Recognize `return validation.ValidateStruct(&recv, checks...)` bodies.
/// Anything that does not split cleanly stays an opaque body.
fn check_list(sc: &Scanner<'_>, start: usize, name_pos: usize, end: usize) -> Option<Aggregate> {
    const CALL: &str = "ValidateStruct(";
    let src = sc.src();
    let args = name_pos + src[name_pos..end].find(CALL)? + CALL.len();
    let separator = sc.separator(args, b')').ok()?;
    if sc.byte(separator) != Some(b',') {
        return None;
    }
    let (members, rest, close_at) = members(
        sc,
        separator + 1,
        b')',
        MemberStyle::Commas,
        keys::check_keys,
    )
    .ok()?;
    (close_at < end).then(|| {
        Aggregate::new(
            &src[start..=separator],
            members,
            &src[rest..end],
            MemberStyle::Commas,
        )
    })
}
