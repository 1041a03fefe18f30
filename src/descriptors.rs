//! Type and package identities.
//!
//! A [`TypeRef`] names a class, interface, primitive or array type in binary
//! notation (`java/lang/String`); a [`PackageRef`] names its package. Neither is
//! built ad hoc by the parser: every identity comes from a [`TypeInterner`], so
//! callers can share one interner across many class files and get the same
//! handle for the same name.

use std::collections::HashMap;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::{Arc, Mutex};

use serde::{Serialize, Serializer};

use crate::error::{ClassError, Result};

const PRIMITIVES: &str = "VZSIJFDBC";

/// Interned type identity.
#[derive(Clone)]
pub struct TypeRef(Arc<str>);

impl TypeRef {
    fn new(binary: &str) -> Self {
        Self(Arc::from(binary))
    }

    /// Binary name, e.g. `java/util/Map$Entry` or `[Ljava/lang/String;`.
    pub fn binary(&self) -> &str {
        &self.0
    }

    /// Dotted name that keeps `$`, e.g. `java.util.Map$Entry`.
    pub fn dotted(&self) -> String {
        self.0.replace('/', ".")
    }

    /// Fully qualified source name, e.g. `java.util.Map.Entry`.
    pub fn fqn(&self) -> String {
        self.0.replace(['/', '$'], ".")
    }

    pub fn short_name(&self) -> &str {
        match self.0.rfind('/') {
            Some(pos) => &self.0[pos + 1..],
            None => &self.0,
        }
    }

    pub fn is_primitive(&self) -> bool {
        self.0.len() == 1 && PRIMITIVES.contains(&*self.0)
    }

    pub fn is_array(&self) -> bool {
        self.0.starts_with('[')
    }

    pub fn is_java(&self) -> bool {
        self.0.starts_with("java/")
    }

    /// Binary name of the innermost array component, or `None` for non-arrays.
    ///
    /// `[[Lcom/acme/Foo;` yields `com/acme/Foo`, `[I` yields `I`.
    pub fn element_binary(&self) -> Option<&str> {
        if !self.is_array() {
            return None;
        }
        let element = self.0.trim_start_matches('[');
        Some(
            element
                .strip_prefix('L')
                .and_then(|s| s.strip_suffix(';'))
                .unwrap_or(element),
        )
    }
}

impl PartialEq for TypeRef {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0) || self.0 == other.0
    }
}

impl Eq for TypeRef {}

impl Hash for TypeRef {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.hash(state);
    }
}

impl PartialOrd for TypeRef {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for TypeRef {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.0.cmp(&other.0)
    }
}

impl fmt::Debug for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TypeRef({})", self.0)
    }
}

impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.dotted())
    }
}

impl Serialize for TypeRef {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.dotted())
    }
}

#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PackageRef {
    binary: Arc<str>,
    primitive: bool,
}

impl PackageRef {
    pub fn binary(&self) -> &str {
        &self.binary
    }

    /// Dotted package name; the default package is `.`.
    pub fn fqn(&self) -> String {
        if self.binary.is_empty() {
            ".".to_string()
        } else {
            self.binary.replace('/', ".")
        }
    }

    pub fn is_primitive_package(&self) -> bool {
        self.primitive
    }

    pub fn is_default_package(&self) -> bool {
        !self.primitive && self.binary.is_empty()
    }

    pub fn is_java(&self) -> bool {
        self.binary.starts_with("java/") || &*self.binary == "java"
    }
}

impl fmt::Debug for PackageRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PackageRef({})", self.fqn())
    }
}

impl fmt::Display for PackageRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.fqn())
    }
}

impl Serialize for PackageRef {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.fqn())
    }
}

/// Hands out canonical type and package identities.
///
/// Implementations must return the same identity for the same name across
/// calls, and must tolerate lookups from reentrant parses.
pub trait TypeInterner {
    /// Interns a binary name. Object descriptors (`Lcom/acme/Foo;`) are accepted
    /// and unwrapped.
    fn type_ref(&self, binary_name: &str) -> TypeRef;

    fn package_of(&self, type_ref: &TypeRef) -> PackageRef;

    /// Interns a dotted name such as `com.acme.Foo`.
    fn type_ref_from_fqn(&self, fqn: &str) -> TypeRef {
        self.type_ref(&fqn.replace('.', "/"))
    }
}

/// Default thread-safe interner.
#[derive(Debug, Default)]
pub struct Descriptors {
    types: Mutex<HashMap<String, TypeRef>>,
    packages: Mutex<HashMap<String, PackageRef>>,
}

impl Descriptors {
    pub fn new() -> Self {
        Self::default()
    }

    fn package(&self, binary: &str, primitive: bool) -> PackageRef {
        let key = if primitive { "=primitive" } else { binary };
        let mut packages = self.packages.lock().unwrap_or_else(|e| e.into_inner());
        packages
            .entry(key.to_string())
            .or_insert_with(|| PackageRef {
                binary: Arc::from(binary),
                primitive,
            })
            .clone()
    }
}

impl TypeInterner for Descriptors {
    fn type_ref(&self, binary_name: &str) -> TypeRef {
        let name = binary_name
            .strip_prefix('L')
            .and_then(|s| s.strip_suffix(';'))
            .unwrap_or(binary_name);
        let mut types = self.types.lock().unwrap_or_else(|e| e.into_inner());
        types
            .entry(name.to_string())
            .or_insert_with(|| TypeRef::new(name))
            .clone()
    }

    fn package_of(&self, type_ref: &TypeRef) -> PackageRef {
        let element = type_ref.element_binary().unwrap_or(type_ref.binary());
        if element.len() == 1 && PRIMITIVES.contains(element) {
            return self.package("", true);
        }
        match element.rfind('/') {
            Some(pos) => self.package(&element[..pos], false),
            None => self.package("", false),
        }
    }
}

/// Converts a single field descriptor into a source-level name.
///
/// `Ljava/lang/String;` becomes `java.lang.String`, `I` becomes `int` and
/// `[[J` becomes `long[][]`.
pub fn object_descriptor_to_fqn(descriptor: &str) -> Result<String> {
    if (descriptor.starts_with('L') || descriptor.starts_with('T')) && descriptor.ends_with(';')
    {
        return Ok(descriptor[1..descriptor.len() - 1].replace('/', "."));
    }

    let name = match descriptor.chars().next() {
        Some('V') => "void",
        Some('B') => "byte",
        Some('C') => "char",
        Some('I') => "int",
        Some('S') => "short",
        Some('D') => "double",
        Some('F') => "float",
        Some('J') => "long",
        Some('Z') => "boolean",
        Some('[') => return Ok(format!("{}[]", object_descriptor_to_fqn(&descriptor[1..])?)),
        _ => {
            return Err(ClassError::invalid(format!(
                "invalid type character in descriptor {descriptor:?}"
            )));
        }
    };
    Ok(name.to_string())
}
