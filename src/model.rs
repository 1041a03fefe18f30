//! Facts extracted from one class file.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Serialize, Serializer};

use crate::annotation::{Annotation, Value};
use crate::descriptors::{PackageRef, TypeRef, object_descriptor_to_fqn};
use crate::error::Result;
use crate::signature;

pub const ACC_PUBLIC: u16 = 0x0001;
pub const ACC_PRIVATE: u16 = 0x0002;
pub const ACC_PROTECTED: u16 = 0x0004;
pub const ACC_STATIC: u16 = 0x0008;
pub const ACC_FINAL: u16 = 0x0010;
pub const ACC_SUPER: u16 = 0x0020;
pub const ACC_VOLATILE: u16 = 0x0040;
pub const ACC_TRANSIENT: u16 = 0x0080;
pub const ACC_NATIVE: u16 = 0x0100;
pub const ACC_INTERFACE: u16 = 0x0200;
pub const ACC_ABSTRACT: u16 = 0x0400;
pub const ACC_SYNTHETIC: u16 = 0x1000;
pub const ACC_ANNOTATION: u16 = 0x2000;
pub const ACC_ENUM: u16 = 0x4000;

/// Public or protected access, i.e. part of what other packages can see.
pub fn is_api_visible(access: u16) -> bool {
    access & (ACC_PUBLIC | ACC_PROTECTED) != 0
}

/// Class-file format generations, keyed by major version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum JavaFormat {
    Jdk1_1,
    Jdk1_2,
    Jdk1_3,
    Jdk1_4,
    J2se5,
    J2se6,
    OpenJdk7,
    OpenJdk8,
    /// Java 9 and later, carrying the major version.
    Modern(u16),
    Unknown,
}

impl JavaFormat {
    pub fn from_major(major: u16) -> Self {
        match major {
            45 => JavaFormat::Jdk1_1,
            46 => JavaFormat::Jdk1_2,
            47 => JavaFormat::Jdk1_3,
            48 => JavaFormat::Jdk1_4,
            49 => JavaFormat::J2se5,
            50 => JavaFormat::J2se6,
            51 => JavaFormat::OpenJdk7,
            52 => JavaFormat::OpenJdk8,
            53.. => JavaFormat::Modern(major),
            _ => JavaFormat::Unknown,
        }
    }

    pub fn major(&self) -> Option<u16> {
        Some(match self {
            JavaFormat::Jdk1_1 => 45,
            JavaFormat::Jdk1_2 => 46,
            JavaFormat::Jdk1_3 => 47,
            JavaFormat::Jdk1_4 => 48,
            JavaFormat::J2se5 => 49,
            JavaFormat::J2se6 => 50,
            JavaFormat::OpenJdk7 => 51,
            JavaFormat::OpenJdk8 => 52,
            JavaFormat::Modern(major) => *major,
            JavaFormat::Unknown => return None,
        })
    }

    /// Release number used in environment names: `1.4`, `1.8`, `11`.
    fn release(&self) -> Option<String> {
        let major = self.major()?;
        Some(if major <= 52 {
            format!("1.{}", major - 44)
        } else {
            (major - 44).to_string()
        })
    }

    /// Execution environment name, e.g. `J2SE-1.4` or `JavaSE-17`.
    pub fn ee(&self) -> String {
        let prefix = match self {
            JavaFormat::Unknown => return "<>".to_string(),
            JavaFormat::Jdk1_1 => "JRE",
            JavaFormat::Jdk1_2 | JavaFormat::Jdk1_3 | JavaFormat::Jdk1_4 | JavaFormat::J2se5 => "J2SE",
            _ => "JavaSE",
        };
        format!("{prefix}-{}", self.release().unwrap_or_default())
    }

    /// Capability filter selecting a runtime that can load this format.
    pub fn filter(&self) -> Option<String> {
        let release = self.release()?;
        Some(format!("(&(osgi.ee=JavaSE)(version={release}))"))
    }

    pub fn has_annotations(&self) -> bool {
        self.major().is_some_and(|m| m >= 49)
    }

    pub fn has_generics(&self) -> bool {
        self.has_annotations()
    }

    pub fn has_enums(&self) -> bool {
        self.has_annotations()
    }
}

impl fmt::Display for JavaFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.ee())
    }
}

impl Serialize for JavaFormat {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.ee())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum MemberKind {
    Field,
    Method { prototype: Vec<TypeRef> },
    /// Synthetic `<extends>`/`<implements>` marker for a supertype.
    Type { type_ref: TypeRef, implements: bool },
}

/// A field, method or supertype of a class.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MemberDef {
    pub(crate) access: u16,
    pub(crate) name: String,
    pub(crate) descriptor: String,
    pub(crate) signature: Option<String>,
    pub(crate) constant: Option<Value>,
    pub(crate) annotations: Vec<Annotation>,
    pub(crate) deprecated: bool,
    #[serde(flatten)]
    pub(crate) kind: MemberKind,
}

impl MemberDef {
    fn new(access: u16, name: String, descriptor: String, kind: MemberKind) -> Self {
        Self {
            access,
            name,
            descriptor,
            signature: None,
            constant: None,
            annotations: Vec::new(),
            deprecated: false,
            kind,
        }
    }

    pub fn field(access: u16, name: impl Into<String>, descriptor: impl Into<String>) -> Self {
        Self::new(access, name.into(), descriptor.into(), MemberKind::Field)
    }

    pub fn method(
        access: u16,
        name: impl Into<String>,
        descriptor: impl Into<String>,
        prototype: Vec<TypeRef>,
    ) -> Self {
        Self::new(
            access,
            name.into(),
            descriptor.into(),
            MemberKind::Method { prototype },
        )
    }

    pub fn extends(type_ref: TypeRef) -> Self {
        let descriptor = format!("L{};", type_ref.binary());
        Self::new(
            ACC_PUBLIC,
            "<extends>".into(),
            descriptor,
            MemberKind::Type {
                type_ref,
                implements: false,
            },
        )
    }

    pub fn implements(type_ref: TypeRef) -> Self {
        let descriptor = format!("L{};", type_ref.binary());
        Self::new(
            ACC_PUBLIC,
            "<implements>".into(),
            descriptor,
            MemberKind::Type {
                type_ref,
                implements: true,
            },
        )
    }

    pub fn access(&self) -> u16 {
        self.access
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn descriptor(&self) -> &str {
        &self.descriptor
    }

    pub fn signature(&self) -> Option<&str> {
        self.signature.as_deref()
    }

    pub fn constant(&self) -> Option<&Value> {
        self.constant.as_ref()
    }

    pub fn annotations(&self) -> &[Annotation] {
        &self.annotations
    }

    pub fn is_deprecated(&self) -> bool {
        self.deprecated
    }

    pub fn kind(&self) -> &MemberKind {
        &self.kind
    }

    pub fn is_field(&self) -> bool {
        matches!(self.kind, MemberKind::Field)
    }

    pub fn is_method(&self) -> bool {
        matches!(self.kind, MemberKind::Method { .. })
    }

    pub fn is_constructor(&self) -> bool {
        self.is_method() && (self.name == "<init>" || self.name == "<clinit>")
    }

    /// Argument types of a method; `None` for fields and supertypes.
    pub fn prototype(&self) -> Option<&[TypeRef]> {
        match &self.kind {
            MemberKind::Method { prototype } => Some(prototype),
            _ => None,
        }
    }

    pub fn type_ref(&self) -> Option<&TypeRef> {
        match &self.kind {
            MemberKind::Type { type_ref, .. } => Some(type_ref),
            _ => None,
        }
    }

    /// Source-level return type, taken from the generic signature when there
    /// is one. Fails for members that are not methods.
    pub fn generic_return_type(&self) -> Result<String> {
        let descriptor = self.signature.as_deref().unwrap_or(&self.descriptor);
        object_descriptor_to_fqn(signature::return_type(descriptor)?)
    }

    pub fn is_public(&self) -> bool {
        self.access & ACC_PUBLIC != 0
    }

    pub fn is_protected(&self) -> bool {
        self.access & ACC_PROTECTED != 0
    }

    pub fn is_private(&self) -> bool {
        self.access & ACC_PRIVATE != 0
    }

    pub fn is_static(&self) -> bool {
        self.access & ACC_STATIC != 0
    }

    pub fn is_final(&self) -> bool {
        self.access & ACC_FINAL != 0
    }

    pub fn is_abstract(&self) -> bool {
        self.access & ACC_ABSTRACT != 0
    }

    pub fn is_native(&self) -> bool {
        self.access & ACC_NATIVE != 0
    }

    pub fn is_transient(&self) -> bool {
        self.access & ACC_TRANSIENT != 0
    }

    pub fn is_volatile(&self) -> bool {
        self.access & ACC_VOLATILE != 0
    }

    pub fn is_synthetic(&self) -> bool {
        self.access & ACC_SYNTHETIC != 0
    }

    pub fn is_enum(&self) -> bool {
        self.access & ACC_ENUM != 0
    }
}

impl fmt::Display for MemberDef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InnerClassRecord {
    pub inner: Option<TypeRef>,
    pub outer: Option<TypeRef>,
    pub simple_name: Option<String>,
    pub access: u16,
}

/// The `EnclosingMethod` attribute of a local or anonymous class.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EnclosingMethod {
    pub class: TypeRef,
    pub method_name: Option<String>,
    pub descriptor: Option<String>,
}

/// Everything a single parse learned about a class.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassFacts {
    pub(crate) class_name: TypeRef,
    pub(crate) major: u16,
    pub(crate) minor: u16,
    pub(crate) access: u16,
    pub(crate) inner_access: Option<u16>,
    pub(crate) super_class: Option<TypeRef>,
    pub(crate) interfaces: Vec<TypeRef>,
    pub(crate) fields: Vec<MemberDef>,
    pub(crate) methods: Vec<MemberDef>,
    pub(crate) source_file: Option<String>,
    pub(crate) class_signature: Option<String>,
    pub(crate) class_annotations: Vec<Annotation>,
    pub(crate) annotations: BTreeSet<TypeRef>,
    pub(crate) deprecated: bool,
    pub(crate) has_runtime_annotations: bool,
    pub(crate) has_class_annotations: bool,
    pub(crate) has_default_constructor: bool,
    pub(crate) imports: BTreeSet<PackageRef>,
    pub(crate) xref: BTreeSet<TypeRef>,
    pub(crate) api: Option<BTreeSet<PackageRef>>,
    pub(crate) inner_classes: Vec<InnerClassRecord>,
    pub(crate) enclosing_method: Option<EnclosingMethod>,
}

impl ClassFacts {
    pub(crate) fn new(class_name: TypeRef, major: u16, minor: u16, access: u16) -> Self {
        Self {
            class_name,
            major,
            minor,
            access,
            inner_access: None,
            super_class: None,
            interfaces: Vec::new(),
            fields: Vec::new(),
            methods: Vec::new(),
            source_file: None,
            class_signature: None,
            class_annotations: Vec::new(),
            annotations: BTreeSet::new(),
            deprecated: false,
            has_runtime_annotations: false,
            has_class_annotations: false,
            has_default_constructor: false,
            imports: BTreeSet::new(),
            xref: BTreeSet::new(),
            api: (access & ACC_PUBLIC != 0).then(BTreeSet::new),
            inner_classes: Vec::new(),
            enclosing_method: None,
        }
    }

    pub fn class_name(&self) -> &TypeRef {
        &self.class_name
    }

    pub fn fqn(&self) -> String {
        self.class_name.fqn()
    }

    pub fn major(&self) -> u16 {
        self.major
    }

    pub fn minor(&self) -> u16 {
        self.minor
    }

    pub fn version(&self) -> String {
        format!("{}.{}", self.major, self.minor)
    }

    pub fn format(&self) -> JavaFormat {
        JavaFormat::from_major(self.major)
    }

    /// Effective access: the flags from the class's own `InnerClasses` entry
    /// when it is a nested class, else the class-level flags.
    pub fn access(&self) -> u16 {
        self.inner_access.unwrap_or(self.access)
    }

    pub fn class_access(&self) -> u16 {
        self.access
    }

    pub fn super_class(&self) -> Option<&TypeRef> {
        self.super_class.as_ref()
    }

    pub fn interfaces(&self) -> &[TypeRef] {
        &self.interfaces
    }

    pub fn fields(&self) -> &[MemberDef] {
        &self.fields
    }

    pub fn methods(&self) -> &[MemberDef] {
        &self.methods
    }

    pub fn source_file(&self) -> Option<&str> {
        self.source_file.as_deref()
    }

    pub fn class_signature(&self) -> Option<&str> {
        self.class_signature.as_deref()
    }

    pub fn class_annotations(&self) -> &[Annotation] {
        &self.class_annotations
    }

    pub fn annotations(&self) -> &BTreeSet<TypeRef> {
        &self.annotations
    }

    pub fn imports(&self) -> &BTreeSet<PackageRef> {
        &self.imports
    }

    /// Every type the class mentions, regardless of visibility.
    pub fn xref(&self) -> &BTreeSet<TypeRef> {
        &self.xref
    }

    /// Packages reachable from the public or protected surface. Empty for
    /// classes that are not public.
    pub fn api_uses(&self) -> impl Iterator<Item = &PackageRef> {
        self.api.iter().flatten()
    }

    pub fn inner_classes(&self) -> &[InnerClassRecord] {
        &self.inner_classes
    }

    pub fn enclosing_method(&self) -> Option<&EnclosingMethod> {
        self.enclosing_method.as_ref()
    }

    pub fn extends_def(&self) -> Option<MemberDef> {
        self.super_class.clone().map(MemberDef::extends)
    }

    pub fn implements_defs(&self) -> Vec<MemberDef> {
        self.interfaces.iter().cloned().map(MemberDef::implements).collect()
    }

    pub fn is_deprecated(&self) -> bool {
        self.deprecated
    }

    pub fn has_runtime_annotations(&self) -> bool {
        self.has_runtime_annotations
    }

    pub fn has_class_annotations(&self) -> bool {
        self.has_class_annotations
    }

    pub fn has_public_no_args_constructor(&self) -> bool {
        self.has_default_constructor
    }

    pub fn is_public(&self) -> bool {
        self.access & ACC_PUBLIC != 0
    }

    pub fn is_protected(&self) -> bool {
        self.access & ACC_PROTECTED != 0
    }

    pub fn is_final(&self) -> bool {
        self.access & ACC_FINAL != 0
    }

    pub fn is_interface(&self) -> bool {
        self.access & ACC_INTERFACE != 0
    }

    pub fn is_abstract(&self) -> bool {
        self.access & ACC_ABSTRACT != 0
    }

    pub fn is_annotation(&self) -> bool {
        self.access & ACC_ANNOTATION != 0
    }

    pub fn is_synthetic(&self) -> bool {
        self.access & ACC_SYNTHETIC != 0
    }

    pub fn is_enum(&self) -> bool {
        self.super_class
            .as_ref()
            .is_some_and(|s| s.binary() == "java/lang/Enum")
    }

    pub fn cmp_by_name(&self, other: &Self) -> std::cmp::Ordering {
        self.class_name.cmp(&other.class_name)
    }
}

impl fmt::Display for ClassFacts {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.fqn())
    }
}
