//! Annotation occurrences and element values.

use indexmap::IndexMap;
use serde::Serialize;

use crate::descriptors::TypeRef;

/// Whether an annotation is visible to reflection at run time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Retention {
    Runtime,
    Class,
}

/// The kind of element an annotation was found on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ElementKind {
    Type,
    Field,
    Method,
    Constructor,
    Parameter,
}

/// A constant attached to a field, or an annotation element value.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Value {
    /// `int`, and the widened `byte`, `char` and `short` element values.
    Int(i32),
    Long(i64),
    Float(f32),
    Double(f64),
    Boolean(bool),
    String(String),
    Enum { type_ref: TypeRef, constant: String },
    Class(TypeRef),
    Annotation(Box<Annotation>),
    Array(Vec<Value>),
}

impl Value {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i32> {
        match self {
            Value::Int(v) => Some(*v),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Annotation {
    name: TypeRef,
    retention: Retention,
    element_kind: ElementKind,
    elements: IndexMap<String, Value>,
}

impl Annotation {
    pub fn new(name: TypeRef, retention: Retention, element_kind: ElementKind) -> Self {
        Self {
            name,
            retention,
            element_kind,
            elements: IndexMap::new(),
        }
    }

    pub fn name(&self) -> &TypeRef {
        &self.name
    }

    pub fn retention(&self) -> Retention {
        self.retention
    }

    pub fn element_kind(&self) -> ElementKind {
        self.element_kind
    }

    /// Element values in class-file order.
    pub fn elements(&self) -> &IndexMap<String, Value> {
        &self.elements
    }

    pub fn get(&self, element: &str) -> Option<&Value> {
        self.elements.get(element)
    }

    pub(crate) fn put(&mut self, element: String, value: Value) {
        self.elements.insert(element, value);
    }
}
