//! Declaration lookup by identity key.

use super::source::{DeclKind, Declaration, IdentityKey, SourceFile};

/// Outcome of [`locate`]. Positions index the file's declaration list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Located {
    /// A declaration with the same identity key.
    Found(usize),
    /// A declaration with the same name but a different kind in the shared
    /// type/function/var namespace.
    Clash(usize),
    Missing,
}

fn shares_namespace(kind: DeclKind) -> bool {
    matches!(kind, DeclKind::Type | DeclKind::Function | DeclKind::Var)
}

/// Locate `key` in `file`, reporting same-name declarations of another kind.
///
/// Imports are keyed per member and never located here. `init` functions and
/// blank declarations repeat freely, so they are never found or clashed with.
pub fn locate(file: &SourceFile, key: &IdentityKey) -> Located {
    let mut clash = None;
    for (index, decl) in file.declarations().enumerate() {
        let Some(candidate) = decl.identity_key() else {
            continue;
        };
        if candidate.is_repeatable() {
            continue;
        }
        if candidate == *key {
            return Located::Found(index);
        }
        if clash.is_none()
            && candidate.name == key.name
            && shares_namespace(candidate.kind)
            && shares_namespace(key.kind)
        {
            clash = Some(index);
        }
    }
    clash.map_or(Located::Missing, Located::Clash)
}

/// The declaration with exactly this identity key, if any.
pub fn find<'a>(file: &'a SourceFile, key: &IdentityKey) -> Option<&'a Declaration> {
    match locate(file, key) {
        Located::Found(index) => file.declarations().nth(index),
        Located::Clash(_) | Located::Missing => None,
    }
}
