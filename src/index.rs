use std::collections::BTreeMap;
use std::sync::Mutex;

use crate::descriptors::TypeRef;
use crate::error::QueryDiagnostic;
use crate::model::ClassFacts;
use crate::query::{ClassQuery, ClassRegistry};

/// In-memory registry of parsed classes, keyed by class name.
///
/// When the same class is added from several sources the first one wins, the
/// way a class path resolves duplicates; the other sources are still recorded.
#[derive(Debug, Default)]
pub struct ClassIndex {
    classes: BTreeMap<TypeRef, ClassFacts>,
    sources: BTreeMap<TypeRef, Vec<String>>,
    diagnostics: Mutex<Vec<QueryDiagnostic>>,
}

impl ClassIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a class. Returns `false` when the name was already defined.
    pub fn insert(&mut self, source: impl Into<String>, facts: ClassFacts) -> bool {
        let name = facts.class_name().clone();
        let paths = self.sources.entry(name.clone()).or_default();
        let source = source.into();
        if !paths.contains(&source) {
            paths.push(source);
        }
        if self.classes.contains_key(&name) {
            return false;
        }
        self.classes.insert(name, facts);
        true
    }

    pub fn get(&self, type_ref: &TypeRef) -> Option<&ClassFacts> {
        self.classes.get(type_ref)
    }

    /// Sources that defined the class, in insertion order.
    pub fn sources(&self, type_ref: &TypeRef) -> &[String] {
        self.sources.get(type_ref).map_or(&[], Vec::as_slice)
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ClassFacts> {
        self.classes.values()
    }

    /// Classes matching `query`, in name order.
    pub fn select(&self, query: &ClassQuery) -> Vec<&ClassFacts> {
        self.iter().filter(|facts| query.matches(facts, self)).collect()
    }

    pub fn take_diagnostics(&self) -> Vec<QueryDiagnostic> {
        let mut diagnostics = self.diagnostics.lock().unwrap_or_else(|e| e.into_inner());
        std::mem::take(&mut *diagnostics)
    }
}

impl ClassRegistry for ClassIndex {
    fn find_class(&self, type_ref: &TypeRef) -> Option<&ClassFacts> {
        self.get(type_ref)
    }

    fn report(&self, diagnostic: QueryDiagnostic) {
        tracing::warn!("{}", diagnostic);
        let mut diagnostics = self.diagnostics.lock().unwrap_or_else(|e| e.into_inner());
        if !diagnostics.contains(&diagnostic) {
            diagnostics.push(diagnostic);
        }
    }
}
