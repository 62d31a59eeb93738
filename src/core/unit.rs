//! The translation unit: the ordered collection that owns every declaration.
//!
//! Declarations are built by the producer, then pushed here. Pushing is the
//! finalize step: the unit assigns the identity and from then on only hands
//! out shared references. Dropping the unit drops every declaration it owns,
//! and with them every type, field and nested method.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use super::decl::{Decl, RecordDecl, TypedefDecl};
use super::ident::{DeclId, IdAllocator};

/// The namespace a tagged declaration lives in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TagKind {
    Struct,
    Union,
    Enum,
}

impl TagKind {
    /// Tag kind of a record.
    pub fn record(is_union: bool) -> Self {
        if is_union {
            TagKind::Union
        } else {
            TagKind::Struct
        }
    }
}

/// All declarations extracted from one translation unit, in source order.
#[derive(Debug)]
pub struct TranslationUnit {
    source: Option<PathBuf>,
    decls: Vec<Decl>,
    ids: Arc<IdAllocator>,
    index: HashMap<DeclId, usize>,
    tags: HashMap<(TagKind, String), DeclId>,
    typedefs: HashMap<String, DeclId>,
}

impl Default for TranslationUnit {
    fn default() -> Self {
        Self::new()
    }
}

impl TranslationUnit {
    /// Create an empty unit with its own identity allocator.
    pub fn new() -> Self {
        Self::with_allocator(Arc::new(IdAllocator::new()))
    }

    /// Create an empty unit drawing identities from a shared allocator.
    ///
    /// Units extracted concurrently must share one allocator for their
    /// identities to stay unique.
    pub fn with_allocator(ids: Arc<IdAllocator>) -> Self {
        TranslationUnit {
            source: None,
            decls: Vec::new(),
            ids,
            index: HashMap::new(),
            tags: HashMap::new(),
            typedefs: HashMap::new(),
        }
    }

    /// Record the primary source file of the unit.
    pub fn with_source(mut self, source: impl Into<PathBuf>) -> Self {
        self.source = Some(source.into());
        self
    }

    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }

    /// Append a finished declaration and return its identity.
    ///
    /// A declaration that already carries an identity keeps it; otherwise the
    /// next identity from the allocator is assigned.
    pub fn push(&mut self, decl: impl Into<Decl>) -> DeclId {
        let mut decl = decl.into();

        if !decl.id().is_assigned() {
            // Unassigned, so this cannot fail.
            let _ = decl.set_id(self.ids.next_id());
        }
        let id = decl.id();

        match &decl {
            Decl::RecordDecl(r) if !r.name().is_empty() => {
                self.tags
                    .insert((TagKind::record(r.is_union()), r.name().to_string()), id);
            }
            Decl::EnumDecl(e) if !e.name().is_empty() => {
                self.tags.insert((TagKind::Enum, e.name().to_string()), id);
            }
            Decl::TypedefDecl(t) => {
                self.typedefs.insert(t.name().to_string(), id);
            }
            _ => {}
        }

        self.index.insert(id, self.decls.len());
        self.decls.push(decl);
        id
    }

    /// Declarations in the order they were pushed.
    pub fn decls(&self) -> &[Decl] {
        &self.decls
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Decl> {
        self.decls.iter()
    }

    pub fn len(&self) -> usize {
        self.decls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.decls.is_empty()
    }

    /// Look up a declaration by identity.
    pub fn get(&self, id: DeclId) -> Option<&Decl> {
        self.index.get(&id).map(|&i| &self.decls[i])
    }

    /// Identity of the latest struct, union or enum definition with this tag.
    pub fn lookup_tag(&self, kind: TagKind, name: &str) -> Option<DeclId> {
        self.tags.get(&(kind, name.to_string())).copied()
    }

    /// The latest typedef with this name.
    pub fn lookup_typedef(&self, name: &str) -> Option<&TypedefDecl> {
        match self.get(*self.typedefs.get(name)?)? {
            Decl::TypedefDecl(t) => Some(t),
            _ => None,
        }
    }

    /// The record with this identity.
    pub fn record(&self, id: DeclId) -> Option<&RecordDecl> {
        match self.get(id)? {
            Decl::RecordDecl(r) => Some(r),
            _ => None,
        }
    }

    /// Count of declarations per kind name, in first-seen order.
    pub fn summary(&self) -> Vec<(&'static str, usize)> {
        let mut counts: Vec<(&'static str, usize)> = Vec::new();
        for decl in &self.decls {
            let kind = decl.kind_name();
            match counts.iter_mut().find(|(k, _)| *k == kind) {
                Some((_, n)) => *n += 1,
                None => counts.push((kind, 1)),
            }
        }
        counts
    }
}

impl<'a> IntoIterator for &'a TranslationUnit {
    type Item = &'a Decl;
    type IntoIter = std::slice::Iter<'a, Decl>;

    fn into_iter(self) -> Self::IntoIter {
        self.decls.iter()
    }
}
