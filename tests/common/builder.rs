//! A small class-file writer.
//!
//! It produces just enough structure to exercise the analyzer: constant pool,
//! members, and the attributes the parser understands. Constant pool entries
//! are deduplicated the way `javac` does it, so a builder that asks twice for
//! `java/lang/Object` gets one class constant.
//!
//! Shared by the unit tests of the library and the integration tests; each
//! user needs only part of it.

#![allow(dead_code)]

use std::collections::HashMap;

use class_analyzer::model::{ACC_PUBLIC, ACC_SUPER};
use class_analyzer::opcodes;
use class_analyzer::parser::MAGIC;
use class_analyzer::pool::{
    CONSTANT_CLASS, CONSTANT_DOUBLE, CONSTANT_FIELDREF, CONSTANT_INTEGER, CONSTANT_INTERFACE_METHODREF,
    CONSTANT_LONG, CONSTANT_METHODREF, CONSTANT_NAME_AND_TYPE, CONSTANT_STRING, CONSTANT_UTF8,
};

#[derive(Debug)]
pub struct PoolBuilder {
    bytes: Vec<u8>,
    next: u16,
    utf8: HashMap<String, u16>,
    class: HashMap<String, u16>,
    string: HashMap<String, u16>,
    integer: HashMap<i32, u16>,
    name_and_type: HashMap<(String, String), u16>,
    member_ref: HashMap<(u8, String, String, String), u16>,
}

impl PoolBuilder {
    pub fn new() -> Self {
        Self {
            bytes: Vec::new(),
            next: 1,
            utf8: HashMap::new(),
            class: HashMap::new(),
            string: HashMap::new(),
            integer: HashMap::new(),
            name_and_type: HashMap::new(),
            member_ref: HashMap::new(),
        }
    }

    /// Entry count as written in the class file, slot 0 included.
    pub fn count(&self) -> u16 {
        self.next
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    fn push(&mut self, entry: &[u8], slots: u16) -> u16 {
        let index = self.next;
        self.bytes.extend_from_slice(entry);
        self.next += slots;
        index
    }

    pub fn utf8(&mut self, value: &str) -> u16 {
        if let Some(index) = self.utf8.get(value) {
            return *index;
        }
        let encoded = encode_modified_utf8(value);
        let mut entry = vec![CONSTANT_UTF8];
        entry.extend_from_slice(&(encoded.len() as u16).to_be_bytes());
        entry.extend_from_slice(&encoded);
        let index = self.push(&entry, 1);
        self.utf8.insert(value.to_string(), index);
        index
    }

    pub fn class(&mut self, name: &str) -> u16 {
        if let Some(index) = self.class.get(name) {
            return *index;
        }
        let name_index = self.utf8(name);
        let mut entry = vec![CONSTANT_CLASS];
        entry.extend_from_slice(&name_index.to_be_bytes());
        let index = self.push(&entry, 1);
        self.class.insert(name.to_string(), index);
        index
    }

    pub fn string(&mut self, value: &str) -> u16 {
        if let Some(index) = self.string.get(value) {
            return *index;
        }
        let string_index = self.utf8(value);
        let mut entry = vec![CONSTANT_STRING];
        entry.extend_from_slice(&string_index.to_be_bytes());
        let index = self.push(&entry, 1);
        self.string.insert(value.to_string(), index);
        index
    }

    pub fn integer(&mut self, value: i32) -> u16 {
        if let Some(index) = self.integer.get(&value) {
            return *index;
        }
        let mut entry = vec![CONSTANT_INTEGER];
        entry.extend_from_slice(&value.to_be_bytes());
        let index = self.push(&entry, 1);
        self.integer.insert(value, index);
        index
    }

    pub fn long(&mut self, value: i64) -> u16 {
        let mut entry = vec![CONSTANT_LONG];
        entry.extend_from_slice(&value.to_be_bytes());
        self.push(&entry, 2)
    }

    pub fn double(&mut self, value: f64) -> u16 {
        let mut entry = vec![CONSTANT_DOUBLE];
        entry.extend_from_slice(&value.to_bits().to_be_bytes());
        self.push(&entry, 2)
    }

    pub fn name_and_type(&mut self, name: &str, descriptor: &str) -> u16 {
        let key = (name.to_string(), descriptor.to_string());
        if let Some(index) = self.name_and_type.get(&key) {
            return *index;
        }
        let name_index = self.utf8(name);
        let descriptor_index = self.utf8(descriptor);
        let mut entry = vec![CONSTANT_NAME_AND_TYPE];
        entry.extend_from_slice(&name_index.to_be_bytes());
        entry.extend_from_slice(&descriptor_index.to_be_bytes());
        let index = self.push(&entry, 1);
        self.name_and_type.insert(key, index);
        index
    }

    fn member_ref(&mut self, tag: u8, owner: &str, name: &str, descriptor: &str) -> u16 {
        let key = (tag, owner.to_string(), name.to_string(), descriptor.to_string());
        if let Some(index) = self.member_ref.get(&key) {
            return *index;
        }
        let class_index = self.class(owner);
        let name_and_type_index = self.name_and_type(name, descriptor);
        let mut entry = vec![tag];
        entry.extend_from_slice(&class_index.to_be_bytes());
        entry.extend_from_slice(&name_and_type_index.to_be_bytes());
        let index = self.push(&entry, 1);
        self.member_ref.insert(key, index);
        index
    }

    pub fn field_ref(&mut self, owner: &str, name: &str, descriptor: &str) -> u16 {
        self.member_ref(CONSTANT_FIELDREF, owner, name, descriptor)
    }

    pub fn method_ref(&mut self, owner: &str, name: &str, descriptor: &str) -> u16 {
        self.member_ref(CONSTANT_METHODREF, owner, name, descriptor)
    }

    pub fn interface_method_ref(&mut self, owner: &str, name: &str, descriptor: &str) -> u16 {
        self.member_ref(CONSTANT_INTERFACE_METHODREF, owner, name, descriptor)
    }
}

impl Default for PoolBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Encodes `value` the way class files store strings: NUL as two bytes and
/// supplementary characters as surrogate pairs.
pub fn encode_modified_utf8(value: &str) -> Vec<u8> {
    let mut out = Vec::with_capacity(value.len());
    for unit in value.encode_utf16() {
        match unit {
            0x0001..=0x007F => out.push(unit as u8),
            0x0000 | 0x0080..=0x07FF => {
                out.push(0xC0 | ((unit >> 6) & 0x1F) as u8);
                out.push(0x80 | (unit & 0x3F) as u8);
            }
            _ => {
                out.push(0xE0 | ((unit >> 12) & 0x0F) as u8);
                out.push(0x80 | ((unit >> 6) & 0x3F) as u8);
                out.push(0x80 | (unit & 0x3F) as u8);
            }
        }
    }
    out
}

/// Handle to a field or method added to a [`ClassBuilder`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Member {
    Field(usize),
    Method(usize),
}

#[derive(Debug, Default)]
struct Attributes {
    raw: Vec<(u16, u32, Vec<u8>)>,
    visible: Vec<Vec<u8>>,
    invisible: Vec<Vec<u8>>,
}

impl Attributes {
    fn add(&mut self, name_index: u16, body: Vec<u8>) {
        self.raw.push((name_index, body.len() as u32, body));
    }

    fn write(&self, pool: &mut PoolBuilder, out: &mut Vec<u8>) {
        let mut all: Vec<(u16, u32, Vec<u8>)> = self.raw.clone();
        for (name, annotations) in [
            ("RuntimeVisibleAnnotations", &self.visible),
            ("RuntimeInvisibleAnnotations", &self.invisible),
        ] {
            if annotations.is_empty() {
                continue;
            }
            let mut body = (annotations.len() as u16).to_be_bytes().to_vec();
            for annotation in annotations {
                body.extend_from_slice(annotation);
            }
            all.push((pool.utf8(name), body.len() as u32, body));
        }

        out.extend_from_slice(&(all.len() as u16).to_be_bytes());
        for (name_index, length, body) in all {
            out.extend_from_slice(&name_index.to_be_bytes());
            out.extend_from_slice(&length.to_be_bytes());
            out.extend_from_slice(&body);
        }
    }
}

#[derive(Debug)]
struct MemberEntry {
    access: u16,
    name_index: u16,
    descriptor_index: u16,
    attributes: Attributes,
}

/// Writes element-value pairs of one annotation.
pub struct AnnotationBuilder<'a> {
    pool: &'a mut PoolBuilder,
    pairs: u16,
    bytes: Vec<u8>,
}

impl AnnotationBuilder<'_> {
    pub fn raw(&mut self, element: &str, tag: u8, index: u16) {
        let name_index = self.pool.utf8(element);
        self.bytes.extend_from_slice(&name_index.to_be_bytes());
        self.bytes.push(tag);
        self.bytes.extend_from_slice(&index.to_be_bytes());
        self.pairs += 1;
    }

    pub fn string(&mut self, element: &str, value: &str) {
        let index = self.pool.utf8(value);
        self.raw(element, b's', index);
    }

    pub fn int(&mut self, element: &str, value: i32) {
        let index = self.pool.integer(value);
        self.raw(element, b'I', index);
    }

    pub fn boolean(&mut self, element: &str, value: bool) {
        let index = self.pool.integer(value as i32);
        self.raw(element, b'Z', index);
    }

    pub fn long(&mut self, element: &str, value: i64) {
        let index = self.pool.long(value);
        self.raw(element, b'J', index);
    }

    pub fn class_value(&mut self, element: &str, descriptor: &str) {
        let index = self.pool.utf8(descriptor);
        self.raw(element, b'c', index);
    }

    pub fn enum_value(&mut self, element: &str, type_descriptor: &str, constant: &str) {
        let name_index = self.pool.utf8(element);
        let type_index = self.pool.utf8(type_descriptor);
        let constant_index = self.pool.utf8(constant);
        self.bytes.extend_from_slice(&name_index.to_be_bytes());
        self.bytes.push(b'e');
        self.bytes.extend_from_slice(&type_index.to_be_bytes());
        self.bytes.extend_from_slice(&constant_index.to_be_bytes());
        self.pairs += 1;
    }

    pub fn strings(&mut self, element: &str, values: &[&str]) {
        let name_index = self.pool.utf8(element);
        self.bytes.extend_from_slice(&name_index.to_be_bytes());
        self.bytes.push(b'[');
        self.bytes.extend_from_slice(&(values.len() as u16).to_be_bytes());
        for value in values {
            let index = self.pool.utf8(value);
            self.bytes.push(b's');
            self.bytes.extend_from_slice(&index.to_be_bytes());
        }
        self.pairs += 1;
    }

    /// A nested annotation value.
    pub fn annotation(&mut self, element: &str, descriptor: &str, f: impl FnOnce(&mut AnnotationBuilder<'_>)) {
        let name_index = self.pool.utf8(element);
        let nested = build_annotation(self.pool, descriptor, f);
        self.bytes.extend_from_slice(&name_index.to_be_bytes());
        self.bytes.push(b'@');
        self.bytes.extend_from_slice(&nested);
        self.pairs += 1;
    }
}

fn build_annotation(
    pool: &mut PoolBuilder,
    descriptor: &str,
    f: impl FnOnce(&mut AnnotationBuilder<'_>),
) -> Vec<u8> {
    let type_index = pool.utf8(descriptor);
    let mut builder = AnnotationBuilder {
        pool,
        pairs: 0,
        bytes: Vec::new(),
    };
    f(&mut builder);
    let mut out = type_index.to_be_bytes().to_vec();
    out.extend_from_slice(&builder.pairs.to_be_bytes());
    out.extend_from_slice(&builder.bytes);
    out
}

/// Instruction stream of a method body.
#[derive(Debug, Default)]
pub struct CodeBuilder {
    code: Vec<u8>,
    catch_types: Vec<u16>,
}

impl CodeBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Emits a bare opcode, e.g. `0xb1` (`return`).
    pub fn op(&mut self, opcode: u8) -> &mut Self {
        self.code.push(opcode);
        self
    }

    fn with_index(&mut self, opcode: u8, index: u16) -> &mut Self {
        self.code.push(opcode);
        self.code.extend_from_slice(&index.to_be_bytes());
        self
    }

    pub fn ldc(&mut self, index: u16) -> &mut Self {
        match u8::try_from(index) {
            Ok(short) => {
                self.code.push(opcodes::LDC);
                self.code.push(short);
                self
            }
            Err(_) => self.with_index(opcodes::LDC_W, index),
        }
    }

    pub fn new_object(&mut self, class_index: u16) -> &mut Self {
        self.with_index(opcodes::NEW, class_index)
    }

    pub fn checkcast(&mut self, class_index: u16) -> &mut Self {
        self.with_index(opcodes::CHECKCAST, class_index)
    }

    pub fn invokestatic(&mut self, method_index: u16) -> &mut Self {
        self.with_index(opcodes::INVOKESTATIC, method_index)
    }

    pub fn invokevirtual(&mut self, method_index: u16) -> &mut Self {
        self.with_index(opcodes::INVOKEVIRTUAL, method_index)
    }

    pub fn invokeinterface(&mut self, method_index: u16, count: u8) -> &mut Self {
        self.with_index(opcodes::INVOKEINTERFACE, method_index);
        self.code.extend_from_slice(&[count, 0]);
        self
    }

    /// Adds an exception handler catching the class constant `class_index`.
    pub fn catch(&mut self, class_index: u16) -> &mut Self {
        self.catch_types.push(class_index);
        self
    }
}

/// Assembles a class file.
#[derive(Debug)]
pub struct ClassBuilder {
    pool: PoolBuilder,
    major: u16,
    minor: u16,
    access: u16,
    this_class: u16,
    super_class: u16,
    interfaces: Vec<u16>,
    fields: Vec<MemberEntry>,
    methods: Vec<MemberEntry>,
    attributes: Attributes,
    inner_classes: Vec<[u16; 4]>,
}

impl ClassBuilder {
    /// A public class extending `java/lang/Object`, class-file version 52.0.
    pub fn new(name: &str) -> Self {
        let mut pool = PoolBuilder::new();
        let this_class = pool.class(name);
        let super_class = pool.class("java/lang/Object");
        Self {
            pool,
            major: 52,
            minor: 0,
            access: ACC_PUBLIC | ACC_SUPER,
            this_class,
            super_class,
            interfaces: Vec::new(),
            fields: Vec::new(),
            methods: Vec::new(),
            attributes: Attributes::default(),
            inner_classes: Vec::new(),
        }
    }

    pub fn pool(&mut self) -> &mut PoolBuilder {
        &mut self.pool
    }

    pub fn version(&mut self, major: u16, minor: u16) -> &mut Self {
        self.major = major;
        self.minor = minor;
        self
    }

    pub fn access(&mut self, access: u16) -> &mut Self {
        self.access = access;
        self
    }

    pub fn super_class(&mut self, name: &str) -> &mut Self {
        self.super_class = self.pool.class(name);
        self
    }

    /// Makes this a root class without a superclass, like `java/lang/Object`.
    pub fn no_super_class(&mut self) -> &mut Self {
        self.super_class = 0;
        self
    }

    pub fn interface(&mut self, name: &str) -> &mut Self {
        let index = self.pool.class(name);
        self.interfaces.push(index);
        self
    }

    pub fn source_file(&mut self, name: &str) -> &mut Self {
        let value = self.pool.utf8(name).to_be_bytes().to_vec();
        let name_index = self.pool.utf8("SourceFile");
        self.attributes.add(name_index, value);
        self
    }

    pub fn class(&mut self, name: &str) -> u16 {
        self.pool.class(name)
    }

    pub fn string(&mut self, value: &str) -> u16 {
        self.pool.string(value)
    }

    pub fn method_ref(&mut self, owner: &str, name: &str, descriptor: &str) -> u16 {
        self.pool.method_ref(owner, name, descriptor)
    }

    pub fn field_ref(&mut self, owner: &str, name: &str, descriptor: &str) -> u16 {
        self.pool.field_ref(owner, name, descriptor)
    }

    fn member(&mut self, access: u16, name: &str, descriptor: &str) -> MemberEntry {
        MemberEntry {
            access,
            name_index: self.pool.utf8(name),
            descriptor_index: self.pool.utf8(descriptor),
            attributes: Attributes::default(),
        }
    }

    pub fn field(&mut self, access: u16, name: &str, descriptor: &str) -> Member {
        let entry = self.member(access, name, descriptor);
        self.fields.push(entry);
        Member::Field(self.fields.len() - 1)
    }

    pub fn method(&mut self, access: u16, name: &str, descriptor: &str) -> Member {
        let entry = self.member(access, name, descriptor);
        self.methods.push(entry);
        Member::Method(self.methods.len() - 1)
    }

    pub fn method_with_code(&mut self, access: u16, name: &str, descriptor: &str, code: CodeBuilder) -> Member {
        let member = self.method(access, name, descriptor);
        let mut body = Vec::new();
        body.extend_from_slice(&4u16.to_be_bytes()); // max_stack
        body.extend_from_slice(&4u16.to_be_bytes()); // max_locals
        body.extend_from_slice(&(code.code.len() as u32).to_be_bytes());
        body.extend_from_slice(&code.code);
        body.extend_from_slice(&(code.catch_types.len() as u16).to_be_bytes());
        let end = code.code.len() as u16;
        for catch_type in &code.catch_types {
            for value in [0, end, 0, *catch_type] {
                body.extend_from_slice(&value.to_be_bytes());
            }
        }
        body.extend_from_slice(&0u16.to_be_bytes()); // attributes
        self.member_attribute(member, "Code", body);
        member
    }

    fn attributes_of(&mut self, member: Option<Member>) -> &mut Attributes {
        match member {
            None => &mut self.attributes,
            Some(Member::Field(i)) => &mut self.fields[i].attributes,
            Some(Member::Method(i)) => &mut self.methods[i].attributes,
        }
    }

    /// Adds an attribute with a raw body to a member.
    pub fn member_attribute(&mut self, member: Member, name: &str, body: Vec<u8>) -> &mut Self {
        let name_index = self.pool.utf8(name);
        self.attributes_of(Some(member)).add(name_index, body);
        self
    }

    /// Adds a class attribute whose declared length may differ from its body.
    pub fn raw_class_attribute(&mut self, name: &str, declared_length: u32, body: &[u8]) -> &mut Self {
        let name_index = self.pool.utf8(name);
        self.attributes.raw.push((name_index, declared_length, body.to_vec()));
        self
    }

    pub fn deprecated_class(&mut self) -> &mut Self {
        let name_index = self.pool.utf8("Deprecated");
        self.attributes.add(name_index, Vec::new());
        self
    }

    pub fn deprecated(&mut self, member: Member) -> &mut Self {
        self.member_attribute(member, "Deprecated", Vec::new())
    }

    pub fn class_signature(&mut self, signature: &str) -> &mut Self {
        let value = self.pool.utf8(signature).to_be_bytes().to_vec();
        let name_index = self.pool.utf8("Signature");
        self.attributes.add(name_index, value);
        self
    }

    pub fn member_signature(&mut self, member: Member, signature: &str) -> &mut Self {
        let value = self.pool.utf8(signature).to_be_bytes().to_vec();
        self.member_attribute(member, "Signature", value)
    }

    pub fn constant_int(&mut self, member: Member, value: i32) -> &mut Self {
        let index = self.pool.integer(value).to_be_bytes().to_vec();
        self.member_attribute(member, "ConstantValue", index)
    }

    pub fn constant_string(&mut self, member: Member, value: &str) -> &mut Self {
        let index = self.pool.string(value).to_be_bytes().to_vec();
        self.member_attribute(member, "ConstantValue", index)
    }

    pub fn exceptions(&mut self, member: Member, classes: &[&str]) -> &mut Self {
        let mut body = (classes.len() as u16).to_be_bytes().to_vec();
        for class in classes {
            body.extend_from_slice(&self.pool.class(class).to_be_bytes());
        }
        self.member_attribute(member, "Exceptions", body)
    }

    /// Adds a runtime visible annotation to the class (`None`) or a member.
    pub fn runtime_annotation(
        &mut self,
        target: Option<Member>,
        descriptor: &str,
        f: impl FnOnce(&mut AnnotationBuilder<'_>),
    ) -> &mut Self {
        let bytes = build_annotation(&mut self.pool, descriptor, f);
        self.attributes_of(target).visible.push(bytes);
        self
    }

    /// Adds a class retention (runtime invisible) annotation.
    pub fn class_annotation(
        &mut self,
        target: Option<Member>,
        descriptor: &str,
        f: impl FnOnce(&mut AnnotationBuilder<'_>),
    ) -> &mut Self {
        let bytes = build_annotation(&mut self.pool, descriptor, f);
        self.attributes_of(target).invisible.push(bytes);
        self
    }

    /// Adds runtime visible parameter annotations, one list of annotation
    /// descriptors per parameter.
    pub fn parameter_annotations(&mut self, method: Member, parameters: &[&[&str]]) -> &mut Self {
        let mut body = vec![parameters.len() as u8];
        for annotations in parameters {
            body.extend_from_slice(&(annotations.len() as u16).to_be_bytes());
            for descriptor in *annotations {
                body.extend(build_annotation(&mut self.pool, descriptor, |_| {}));
            }
        }
        self.member_attribute(method, "RuntimeVisibleParameterAnnotations", body)
    }

    /// Adds one runtime visible type annotation with an empty type path.
    pub fn type_annotation(
        &mut self,
        target: Option<Member>,
        target_type: u8,
        target_info: &[u8],
        descriptor: &str,
    ) -> &mut Self {
        let mut body = 1u16.to_be_bytes().to_vec();
        body.push(target_type);
        body.extend_from_slice(target_info);
        body.push(0); // path_length
        body.extend(build_annotation(&mut self.pool, descriptor, |_| {}));
        let name_index = self.pool.utf8("RuntimeVisibleTypeAnnotations");
        self.attributes_of(target).add(name_index, body);
        self
    }

    /// Sets the string default of an annotation interface method.
    pub fn annotation_default(&mut self, method: Member, value: &str) -> &mut Self {
        let mut body = vec![b's'];
        body.extend_from_slice(&self.pool.utf8(value).to_be_bytes());
        self.member_attribute(method, "AnnotationDefault", body)
    }

    pub fn inner_class(&mut self, inner: &str, outer: Option<&str>, simple_name: Option<&str>, access: u16) -> &mut Self {
        let inner = self.pool.class(inner);
        let outer = outer.map_or(0, |o| self.pool.class(o));
        let name = simple_name.map_or(0, |n| self.pool.utf8(n));
        self.inner_classes.push([inner, outer, name, access]);
        self
    }

    pub fn enclosing_method(&mut self, class: &str, method: Option<(&str, &str)>) -> &mut Self {
        let class_index = self.pool.class(class);
        let method_index = method.map_or(0, |(name, descriptor)| self.pool.name_and_type(name, descriptor));
        let mut body = class_index.to_be_bytes().to_vec();
        body.extend_from_slice(&method_index.to_be_bytes());
        let name_index = self.pool.utf8("EnclosingMethod");
        self.attributes.add(name_index, body);
        self
    }

    pub fn build(&mut self) -> Vec<u8> {
        if !self.inner_classes.is_empty() {
            let mut body = (self.inner_classes.len() as u16).to_be_bytes().to_vec();
            for entry in self.inner_classes.drain(..) {
                for value in entry {
                    body.extend_from_slice(&value.to_be_bytes());
                }
            }
            let name_index = self.pool.utf8("InnerClasses");
            self.attributes.add(name_index, body);
        }

        // Attribute names must be in the pool before it is written.
        let mut members = Vec::new();
        for member in self.fields.iter().chain(&self.methods) {
            write_member(member, &mut self.pool, &mut members);
        }
        let mut class_attributes = Vec::new();
        self.attributes.write(&mut self.pool, &mut class_attributes);

        let mut out = Vec::new();
        out.extend_from_slice(&MAGIC.to_be_bytes());
        out.extend_from_slice(&self.minor.to_be_bytes());
        out.extend_from_slice(&self.major.to_be_bytes());
        out.extend_from_slice(&self.pool.count().to_be_bytes());
        out.extend_from_slice(self.pool.bytes());
        out.extend_from_slice(&self.access.to_be_bytes());
        out.extend_from_slice(&self.this_class.to_be_bytes());
        out.extend_from_slice(&self.super_class.to_be_bytes());
        out.extend_from_slice(&(self.interfaces.len() as u16).to_be_bytes());
        for interface in &self.interfaces {
            out.extend_from_slice(&interface.to_be_bytes());
        }

        let (fields, methods) = members.split_at(self.fields.len());
        for (count, members) in [(self.fields.len(), fields), (self.methods.len(), methods)] {
            out.extend_from_slice(&(count as u16).to_be_bytes());
            for member in members {
                out.extend_from_slice(member);
            }
        }
        out.extend_from_slice(&class_attributes);
        out
    }
}

fn write_member(member: &MemberEntry, pool: &mut PoolBuilder, out: &mut Vec<Vec<u8>>) {
    let mut bytes = Vec::new();
    bytes.extend_from_slice(&member.access.to_be_bytes());
    bytes.extend_from_slice(&member.name_index.to_be_bytes());
    bytes.extend_from_slice(&member.descriptor_index.to_be_bytes());
    member.attributes.write(pool, &mut bytes);
    out.push(bytes);
}
