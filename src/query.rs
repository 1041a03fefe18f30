//! Class queries.
//!
//! A [`ClassQuery`] pairs a [`Query`] property with a [`Pattern`] and decides
//! whether a class has that property. Name based properties that are not found
//! on the class itself continue on its superclass, which is looked up through
//! a [`ClassRegistry`].

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use regex::Regex;
use serde::Serialize;

use crate::descriptors::TypeRef;
use crate::error::{QueryDiagnostic, QueryError};
use crate::model::ClassFacts;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Query {
    Any,
    Named,
    Implements,
    Extends,
    Imports,
    Annotated,
    Version,
    Public,
    Abstract,
    Concrete,
    DefaultConstructor,
    RuntimeAnnotations,
    ClassAnnotations,
}

impl Query {
    pub const ALL: [Query; 13] = [
        Query::Any,
        Query::Named,
        Query::Implements,
        Query::Extends,
        Query::Imports,
        Query::Annotated,
        Query::Version,
        Query::Public,
        Query::Abstract,
        Query::Concrete,
        Query::DefaultConstructor,
        Query::RuntimeAnnotations,
        Query::ClassAnnotations,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Query::Any => "ANY",
            Query::Named => "NAMED",
            Query::Implements => "IMPLEMENTS",
            Query::Extends => "EXTENDS",
            Query::Imports => "IMPORTS",
            Query::Annotated => "ANNOTATED",
            Query::Version => "VERSION",
            Query::Public => "PUBLIC",
            Query::Abstract => "ABSTRACT",
            Query::Concrete => "CONCRETE",
            Query::DefaultConstructor => "DEFAULT_CONSTRUCTOR",
            Query::RuntimeAnnotations => "RUNTIMEANNOTATIONS",
            Query::ClassAnnotations => "CLASSANNOTATIONS",
        }
    }

    pub fn has_argument(&self) -> bool {
        matches!(
            self,
            Query::Named
                | Query::Implements
                | Query::Extends
                | Query::Imports
                | Query::Annotated
                | Query::Version
        )
    }

    /// Whether an unmatched class defers to its superclass.
    pub fn walks_ancestry(&self) -> bool {
        matches!(self, Query::Implements | Query::Extends | Query::Imports)
    }
}

impl fmt::Display for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Query {
    type Err = QueryError;

    /// Case insensitive; `-` and `_` are ignored, so `default-constructor`,
    /// `DEFAULT_CONSTRUCTOR` and `defaultconstructor` are the same query.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key: String = s
            .chars()
            .filter(|c| *c != '_' && *c != '-')
            .collect::<String>()
            .to_ascii_uppercase();
        Query::ALL
            .into_iter()
            .find(|q| q.as_str().replace('_', "") == key)
            .ok_or_else(|| QueryError::UnknownQuery(s.to_string()))
    }
}

/// A glob over dotted names, optionally negated with a leading `!`.
///
/// `*` matches any run of characters and `?` a single one. A pattern ending in
/// `.*` also matches the bare prefix, so `com.acme.*` matches `com.acme`.
#[derive(Debug, Clone)]
pub struct Pattern {
    source: String,
    regex: Regex,
    negated: bool,
}

impl Pattern {
    pub fn new(text: &str) -> Result<Self, QueryError> {
        let (negated, glob) = match text.strip_prefix('!') {
            Some(rest) => (true, rest),
            None => (false, text),
        };
        let expr = match glob.strip_suffix(".*") {
            Some(prefix) => format!("^{}(?:\\..*)?$", glob_to_regex(prefix)),
            None => format!("^{}$", glob_to_regex(glob)),
        };
        Ok(Self {
            source: text.to_string(),
            regex: Regex::new(&expr)?,
            negated,
        })
    }

    /// Tests the name against the glob; negation is not applied.
    pub fn matches(&self, name: &str) -> bool {
        self.regex.is_match(name)
    }

    pub fn is_negated(&self) -> bool {
        self.negated
    }

    pub fn as_str(&self) -> &str {
        &self.source
    }
}

impl FromStr for Pattern {
    type Err = QueryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Pattern::new(s)
    }
}

fn glob_to_regex(glob: &str) -> String {
    let mut out = String::with_capacity(glob.len() * 2);
    let mut buf = [0u8; 4];
    for c in glob.chars() {
        match c {
            '*' => out.push_str(".*"),
            '?' => out.push('.'),
            _ => out.push_str(&regex::escape(c.encode_utf8(&mut buf))),
        }
    }
    out
}

/// Resolves class names to parsed facts for ancestry walks.
pub trait ClassRegistry {
    fn find_class(&self, type_ref: &TypeRef) -> Option<&ClassFacts>;

    /// Receives non fatal problems met while evaluating a query.
    fn report(&self, diagnostic: QueryDiagnostic) {
        tracing::warn!("{}", diagnostic);
    }
}

#[derive(Debug, Clone)]
pub struct ClassQuery {
    query: Query,
    pattern: Pattern,
}

impl ClassQuery {
    pub fn new(query: Query, pattern: Pattern) -> Self {
        Self { query, pattern }
    }

    /// Builds a query from command line text. Flag queries ignore the pattern.
    pub fn parse(query: &str, pattern: Option<&str>) -> Result<Self, QueryError> {
        let query: Query = query.parse()?;
        let pattern = match pattern {
            Some(p) => Pattern::new(p)?,
            None if query.has_argument() => {
                return Err(QueryError::MissingPattern(query.to_string()));
            }
            None => Pattern::new("*")?,
        };
        Ok(Self { query, pattern })
    }

    pub fn query(&self) -> Query {
        self.query
    }

    pub fn pattern(&self) -> &Pattern {
        &self.pattern
    }

    /// Evaluates the query on `facts`, walking up the superclass chain
    /// through `registry` while the answer is still open.
    pub fn matches<'a>(&self, facts: &'a ClassFacts, registry: &'a dyn ClassRegistry) -> bool {
        let mut visited = BTreeSet::new();
        visited.insert(facts.class_name().clone());
        let mut current = facts;
        loop {
            if let Some(answer) = self.evaluate(current) {
                return answer;
            }
            let Some(super_class) = current.super_class() else {
                return false;
            };
            if !visited.insert(super_class.clone()) {
                registry.report(QueryDiagnostic::CyclicAncestry {
                    query: self.to_string(),
                    class: current.class_name().clone(),
                    repeated: super_class.clone(),
                });
                return false;
            }
            match registry.find_class(super_class) {
                Some(next) => current = next,
                None => {
                    registry.report(QueryDiagnostic::UnresolvedAncestor {
                        query: self.to_string(),
                        class: current.class_name().clone(),
                        missing: super_class.clone(),
                    });
                    return false;
                }
            }
        }
    }

    /// `Some` when the class alone decides the query.
    fn evaluate(&self, facts: &ClassFacts) -> Option<bool> {
        let hit = !self.pattern.is_negated();
        match self.query {
            Query::Any => Some(true),
            Query::Named => Some(self.pattern.matches(&facts.class_name().dotted()) && hit),
            Query::Version => Some(self.pattern.matches(&facts.version()) && hit),
            Query::Annotated => Some(self.any_match(facts.annotations().iter().map(TypeRef::fqn)) && hit),
            Query::Public => Some(facts.is_public()),
            Query::Abstract => Some(facts.is_abstract()),
            Query::Concrete => Some(!facts.is_abstract()),
            Query::DefaultConstructor => Some(facts.has_public_no_args_constructor()),
            Query::RuntimeAnnotations => Some(facts.has_runtime_annotations()),
            Query::ClassAnnotations => Some(facts.has_class_annotations()),
            Query::Implements => self
                .any_match(facts.interfaces().iter().map(TypeRef::dotted))
                .then_some(hit),
            Query::Extends => match facts.super_class() {
                None => Some(false),
                Some(s) => self.pattern.matches(&s.dotted()).then_some(hit),
            },
            Query::Imports => self
                .any_match(facts.imports().iter().map(|p| p.fqn()))
                .then_some(hit),
        }
    }

    fn any_match(&self, mut names: impl Iterator<Item = String>) -> bool {
        names.any(|name| self.pattern.matches(&name))
    }
}

impl fmt::Display for ClassQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.query.has_argument() {
            write!(f, "{} {}", self.query, self.pattern.as_str())
        } else {
            write!(f, "{}", self.query)
        }
    }
}
