use crate::annotation::{Annotation, Value};
use crate::descriptors::TypeRef;
use crate::model::{ClassFacts, MemberDef};

/// Structural callbacks fired while a class file is parsed.
///
/// Events arrive in class-file order: `version`, `class_start`,
/// `extends_class`, `implements_interfaces`, then each field and method
/// followed by the attribute events that belong to it, `member_end`, the class
/// level attribute events and finally `class_end`. `class_end` fires on every
/// path once `class_start` has been reached, including errors and vetoes.
///
/// All methods default to doing nothing.
#[allow(unused_variables)]
pub trait ClassDataCollector {
    fn version(&mut self, minor: u16, major: u16) {}

    /// Return `false` to stop parsing this class; the parse then yields no facts.
    fn class_start(&mut self, facts: &ClassFacts) -> bool {
        true
    }

    fn extends_class(&mut self, super_class: &TypeRef) {}

    fn implements_interfaces(&mut self, interfaces: &[TypeRef]) {}

    fn field(&mut self, field: &MemberDef) {}

    fn method(&mut self, method: &MemberDef) {}

    fn deprecated(&mut self) {}

    fn signature(&mut self, signature: &str) {}

    fn constant(&mut self, value: &Value) {}

    fn annotation(&mut self, annotation: &Annotation) {}

    /// The default value of an annotation interface method was decoded.
    fn annotation_default(&mut self, method: &MemberDef, value: &Value) {}

    /// The following annotations belong to parameter `index`.
    fn parameter(&mut self, index: u8) {}

    fn inner_class(
        &mut self,
        inner: Option<&TypeRef>,
        outer: Option<&TypeRef>,
        simple_name: Option<&str>,
        access: u16,
    ) {
    }

    fn enclosing_method(&mut self, class: &TypeRef, name: Option<&str>, descriptor: Option<&str>) {}

    /// A method invoked from bytecode.
    fn reference_method(&mut self, access: u16, class: &TypeRef, name: &str, descriptor: &str) {}

    /// An object type named in a descriptor or signature.
    fn add_reference(&mut self, type_ref: &TypeRef) {}

    /// A type was recorded as referenced with the given access flags.
    fn refer_to(&mut self, type_ref: &TypeRef, access: u16) {}

    fn member_end(&mut self) {}

    fn class_end(&mut self) {}
}
