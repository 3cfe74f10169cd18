//! Member identity keys, extracted from a member's code.

/// Last path segment of a type expression: `*pkg.Base[T]` → `Base`.
pub(crate) fn type_base_name(expr: &str) -> &str {
    let expr = expr.trim().trim_start_matches(['*', '~']);
    let expr = expr.split('[').next().unwrap_or(expr);
    expr.rsplit('.').next().unwrap_or(expr)
}

/// Receiver type name from the text inside a receiver's parentheses.
///
/// `w *Widget` → `Widget`, `Widget` → `Widget`, `r Repo[T]` → `Repo`.
pub(crate) fn receiver_type(receiver: &str) -> String {
    let last = receiver.split_whitespace().last().unwrap_or("");
    type_base_name(last).to_string()
}

/// Leading comma separated identifier list, and the remainder after it.
fn name_list(code: &str) -> (Vec<String>, &str) {
    let mut names = Vec::new();
    let mut rest = code.trim_start();
    loop {
        let len = rest
            .char_indices()
            .find(|&(_, ch)| !(ch == '_' || ch.is_alphanumeric()))
            .map_or(rest.len(), |(i, _)| i);
        if len == 0 {
            break;
        }
        names.push(rest[..len].to_string());
        let after = rest[len..].trim_start();
        match after.strip_prefix(',') {
            Some(more) => rest = more.trim_start(),
            None => {
                rest = after;
                break;
            }
        }
    }
    (names, rest)
}

/// Struct field: `Name string` → `Name`, `A, B int` → `A`, `B`,
/// embedded `*pkg.Base` → `Base`.
pub(crate) fn field_keys(code: &str) -> Vec<String> {
    let mut tokens = code.split_whitespace();
    let Some(first) = tokens.next() else {
        return Vec::new();
    };
    if first.ends_with(',') {
        return name_list(code).0;
    }
    let embedded = match tokens.next() {
        None => true,
        Some(second) => {
            second.starts_with('`') || second.starts_with('"') || second.starts_with("//")
        }
    };
    if embedded {
        vec![type_base_name(first).to_string()]
    } else {
        vec![first.to_string()]
    }
}

/// Interface member: method name, or embedded interface name.
pub(crate) fn interface_keys(code: &str) -> Vec<String> {
    if let Some(paren) = code.find('(') {
        let head = code[..paren].trim();
        if !head.is_empty() && head.chars().all(|ch| ch == '_' || ch.is_alphanumeric()) {
            return vec![head.to_string()];
        }
    }
    let first = code.split_whitespace().next().unwrap_or(code);
    vec![type_base_name(first).to_string()]
}

/// Constant spec: the declared names plus the optional explicit type.
pub(crate) fn const_spec(code: &str) -> (Vec<String>, Option<String>) {
    let (names, rest) = name_list(code);
    let declared = rest
        .split(|ch: char| ch.is_whitespace() || ch == '=')
        .next()
        .filter(|ty| !ty.is_empty() && !ty.starts_with("//") && !ty.starts_with(';'))
        .map(|ty| type_base_name(ty).to_string());
    (names, declared)
}

pub(crate) fn const_keys(code: &str) -> Vec<String> {
    const_spec(code).0
}

/// Import spec: the quoted path, alias ignored.
pub(crate) fn import_keys(code: &str) -> Vec<String> {
    let quoted = code.find(['"', '`']).and_then(|start| {
        let quote = code[start..].chars().next()?;
        let body = &code[start + 1..];
        body.find(quote).map(|end| body[..end].to_string())
    });
    vec![quoted.unwrap_or_else(|| code.trim().to_string())]
}

/// Validation check: the referenced field in `validation.Field(&w.Name, ...)`.
/// Checks that do not reference a field are keyed by their own text.
pub(crate) fn check_keys(code: &str) -> Vec<String> {
    let reference = code.find("Field(").and_then(|start| {
        let args = &code[start + "Field(".len()..];
        let end = args.find([',', ')'])?;
        let target = args[..end].trim();
        let name = target.rsplit('.').next()?.trim_start_matches('&');
        (!name.is_empty()).then(|| name.to_string())
    });
    vec![reference.unwrap_or_else(|| code.trim_end_matches(',').trim().to_string())]
}
