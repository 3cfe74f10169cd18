//! Typed traversal over a [`SourceFile`].

use std::collections::BTreeMap;

use serde::Serialize;

use super::{DeclKind, Declaration, Member, SourceFile};

/// Callbacks for [`walk`].
///
/// `visit_declaration` returns whether the walk should descend into the
/// declaration's members.
pub trait Visitor {
    fn visit_declaration(&mut self, decl: &Declaration) -> bool {
        let _ = decl;
        true
    }

    fn visit_member(&mut self, owner: &Declaration, member: &Member) {
        let _ = (owner, member);
    }
}

/// Visit imports, then declarations, in source order.
pub fn walk<V: Visitor + ?Sized>(file: &SourceFile, visitor: &mut V) {
    for decl in file.imports().chain(file.declarations()) {
        if !visitor.visit_declaration(decl) {
            continue;
        }
        if let Some(aggregate) = decl.aggregate() {
            for member in aggregate.members() {
                visitor.visit_member(decl, member);
            }
        }
    }
}

/// Every constant name declared anywhere in the file.
#[derive(Debug, Default)]
pub struct ConstNames(pub Vec<String>);

impl Visitor for ConstNames {
    fn visit_declaration(&mut self, decl: &Declaration) -> bool {
        matches!(decl, Declaration::Const(_))
    }

    fn visit_member(&mut self, _owner: &Declaration, member: &Member) {
        self.0.extend(member.keys().iter().cloned());
    }
}

/// Declaration and member counts per kind.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct Stats {
    pub declarations: BTreeMap<DeclKind, usize>,
    pub members: usize,
}

impl Stats {
    pub fn of(file: &SourceFile) -> Self {
        let mut stats = Self::default();
        walk(file, &mut stats);
        stats
    }
}

impl Visitor for Stats {
    fn visit_declaration(&mut self, decl: &Declaration) -> bool {
        *self.declarations.entry(decl.kind()).or_default() += 1;
        true
    }

    fn visit_member(&mut self, _owner: &Declaration, _member: &Member) {
        self.members += 1;
    }
}
