//! Class-file parser.
//!
//! A [`ClassParser`] turns the bytes of one class file into [`ClassFacts`].
//! Parsing is a single forward pass over the input, after two extra passes over
//! the constant pool:
//!
//! 1. every field and method reference marks its class constant as referred,
//!    and every `NameAndType` descriptor is recorded as a (non API) reference;
//! 2. a class constant that nothing marked means the class uses it only from
//!    bytecode, so method bodies must be crawled.
//!
//! The parser is reentrant: a [`ClassDataCollector`] may call back into the
//! same parser from inside a callback. Each call owns its own state; only the
//! spare pool buffers are shared, and they are dropped once the outermost call
//! returns.

use std::cell::{Cell, RefCell};
use std::collections::BTreeSet;
use std::mem;

use crate::annotation::{Annotation, ElementKind, Retention, Value};
use crate::collector::ClassDataCollector;
use crate::crawler::{self, BytecodeVisitor, ReflectionTargets};
use crate::cursor::ByteCursor;
use crate::descriptors::{PackageRef, TypeInterner, TypeRef};
use crate::error::{ClassError, MAX_NESTING, Result};
use crate::model::{
    ACC_PUBLIC, ClassFacts, EnclosingMethod, InnerClassRecord, MemberDef, is_api_visible,
};
use crate::pool::{ConstantPool, PoolEntry};
use crate::signature::{self, ReferenceSink};

pub const MAGIC: u32 = 0xCAFE_BABE;

const CLASS_LOADER_DESCRIPTOR: &str = "(Ljava/lang/String;)Ljava/lang/Class;";
const MAX_ATTRIBUTE_LENGTH: u32 = 0x7FFF_FFFF;

#[derive(Debug, Clone, Copy)]
pub struct ParseOptions {
    /// Crawl method bodies whenever a collector is attached, so that
    /// [`ClassDataCollector::reference_method`] sees every invocation.
    pub crawl_with_collector: bool,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            crawl_with_collector: true,
        }
    }
}

pub struct ClassParser<'i> {
    interner: &'i dyn TypeInterner,
    options: ParseOptions,
    depth: Cell<usize>,
    spare_pools: RefCell<Vec<ConstantPool>>,
}

impl<'i> ClassParser<'i> {
    pub fn new(interner: &'i dyn TypeInterner) -> Self {
        Self::with_options(interner, ParseOptions::default())
    }

    pub fn with_options(interner: &'i dyn TypeInterner, options: ParseOptions) -> Self {
        Self {
            interner,
            options,
            depth: Cell::new(0),
            spare_pools: RefCell::new(Vec::new()),
        }
    }

    pub fn interner(&self) -> &'i dyn TypeInterner {
        self.interner
    }

    /// Number of parses currently in progress on this parser.
    pub fn depth(&self) -> usize {
        self.depth.get()
    }

    /// Parses one class file.
    pub fn parse(&self, bytes: &[u8]) -> Result<ClassFacts> {
        match self.run(bytes, None)? {
            Some(facts) => Ok(facts),
            None => Err(ClassError::invalid("parse stopped without a collector veto")),
        }
    }

    /// Parses one class file, reporting structure to `collector`. Returns
    /// `None` when the collector vetoed the class in `class_start`.
    pub fn parse_with_collector(
        &self,
        bytes: &[u8],
        collector: &mut dyn ClassDataCollector,
    ) -> Result<Option<ClassFacts>> {
        self.run(bytes, Some(collector))
    }

    /// Parses one class file and returns only the types it references.
    pub fn parse_references(&self, bytes: &[u8]) -> Result<BTreeSet<TypeRef>> {
        Ok(self.parse(bytes)?.xref)
    }

    fn run<'c>(
        &self,
        bytes: &[u8],
        collector: Option<&'c mut dyn ClassDataCollector>,
    ) -> Result<Option<ClassFacts>> {
        let mut frame = Frame::enter(self);
        tracing::debug!("parsing class file of {} bytes at depth {}", bytes.len(), self.depth());

        let crawl = self.options.crawl_with_collector && collector.is_some();
        let mut state = ParseState {
            pool: &mut frame.pool,
            refs: References {
                interner: self.interner,
                xref: BTreeSet::new(),
                imports: BTreeSet::new(),
                api: None,
                collector,
            },
            facts: None,
            last: None,
            crawl,
            targets: ReflectionTargets::default(),
        };
        let result = state.class_file(&mut ByteCursor::new(bytes));

        if let Ok(Some(facts)) = &result {
            tracing::debug!(
                "parsed {} ({} references) at depth {}",
                facts.class_name,
                facts.xref.len(),
                self.depth()
            );
        }
        result
    }

    #[cfg(test)]
    fn spare_pools(&self) -> usize {
        self.spare_pools.borrow().len()
    }
}

/// One active parse. Entering bumps the depth and borrows a pool buffer;
/// leaving returns it, and the outermost frame releases all spare buffers.
struct Frame<'a, 'i> {
    parser: &'a ClassParser<'i>,
    pool: ConstantPool,
}

impl<'a, 'i> Frame<'a, 'i> {
    fn enter(parser: &'a ClassParser<'i>) -> Self {
        parser.depth.set(parser.depth.get() + 1);
        let pool = parser.spare_pools.borrow_mut().pop().unwrap_or_default();
        Self { parser, pool }
    }
}

impl Drop for Frame<'_, '_> {
    fn drop(&mut self) {
        let depth = self.parser.depth.get().saturating_sub(1);
        self.parser.depth.set(depth);
        let mut spare = self.parser.spare_pools.borrow_mut();
        if depth == 0 {
            spare.clear();
        } else {
            let mut pool = mem::take(&mut self.pool);
            pool.clear();
            spare.push(pool);
        }
    }
}

/// Reference bookkeeping, kept apart from the pool so descriptors borrowed
/// from the pool can be fed straight into it.
struct References<'p, 'c> {
    interner: &'p dyn TypeInterner,
    xref: BTreeSet<TypeRef>,
    imports: BTreeSet<PackageRef>,
    api: Option<BTreeSet<PackageRef>>,
    collector: Option<&'c mut dyn ClassDataCollector>,
}

impl References<'_, '_> {
    /// Records a reference to `type_ref`. Arrays count as their element type
    /// and primitives are ignored.
    fn refer_to(&mut self, type_ref: &TypeRef, access: u16) {
        let element;
        let type_ref = match type_ref.element_binary() {
            Some(binary) => {
                element = self.interner.type_ref(binary);
                &element
            }
            None => type_ref,
        };
        if type_ref.is_primitive() {
            return;
        }
        let package = self.interner.package_of(type_ref);
        if package.is_primitive_package() {
            return;
        }

        self.xref.insert(type_ref.clone());
        if let Some(api) = &mut self.api
            && is_api_visible(access)
        {
            api.insert(package.clone());
        }
        self.imports.insert(package);

        if let Some(collector) = self.collector.as_mut() {
            collector.refer_to(type_ref, access);
        }
    }

    /// Adds the package of `type_ref` to the API surface when `access` makes
    /// it visible.
    fn expose(&mut self, type_ref: &TypeRef, access: u16) {
        if let Some(api) = &mut self.api
            && is_api_visible(access)
        {
            let package = self.interner.package_of(type_ref);
            if !package.is_primitive_package() {
                api.insert(package);
            }
        }
    }
}

impl ReferenceSink for References<'_, '_> {
    fn reference(&mut self, binary_name: &str, access: u16) {
        let type_ref = self.interner.type_ref(binary_name);
        if let Some(collector) = self.collector.as_mut() {
            collector.add_reference(&type_ref);
        }
        self.refer_to(&type_ref, access);
    }
}

#[derive(Debug, Clone, Copy)]
enum LastMember {
    Field(usize),
    Method(usize),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Attribute {
    Deprecated,
    Annotations(Retention),
    ParameterAnnotations(Retention),
    TypeAnnotations(Retention),
    InnerClasses,
    EnclosingMethod,
    SourceFile,
    Code,
    Signature,
    ConstantValue,
    AnnotationDefault,
    Exceptions,
    Other,
}

impl Attribute {
    fn from_name(name: &str) -> Self {
        match name {
            "Deprecated" => Attribute::Deprecated,
            "RuntimeVisibleAnnotations" => Attribute::Annotations(Retention::Runtime),
            "RuntimeInvisibleAnnotations" => Attribute::Annotations(Retention::Class),
            "RuntimeVisibleParameterAnnotations" => {
                Attribute::ParameterAnnotations(Retention::Runtime)
            }
            "RuntimeInvisibleParameterAnnotations" => {
                Attribute::ParameterAnnotations(Retention::Class)
            }
            "RuntimeVisibleTypeAnnotations" => Attribute::TypeAnnotations(Retention::Runtime),
            "RuntimeInvisibleTypeAnnotations" => Attribute::TypeAnnotations(Retention::Class),
            "InnerClasses" => Attribute::InnerClasses,
            "EnclosingMethod" => Attribute::EnclosingMethod,
            "SourceFile" => Attribute::SourceFile,
            "Code" => Attribute::Code,
            "Signature" => Attribute::Signature,
            "ConstantValue" => Attribute::ConstantValue,
            "AnnotationDefault" => Attribute::AnnotationDefault,
            "Exceptions" => Attribute::Exceptions,
            _ => Attribute::Other,
        }
    }
}

struct ParseState<'p, 'c> {
    pool: &'p mut ConstantPool,
    refs: References<'p, 'c>,
    facts: Option<ClassFacts>,
    last: Option<LastMember>,
    crawl: bool,
    targets: ReflectionTargets,
}

impl ParseState<'_, '_> {
    fn facts(&mut self) -> Result<&mut ClassFacts> {
        self.facts
            .as_mut()
            .ok_or_else(|| ClassError::invalid("class attributes before class header"))
    }

    fn last_member(&mut self) -> Option<&mut MemberDef> {
        let facts = self.facts.as_mut()?;
        match self.last? {
            LastMember::Field(i) => facts.fields.get_mut(i),
            LastMember::Method(i) => facts.methods.get_mut(i),
        }
    }

    fn type_ref(&self, binary_name: &str) -> TypeRef {
        self.refs.interner.type_ref(binary_name)
    }

    fn class_file(&mut self, c: &mut ByteCursor<'_>) -> Result<Option<ClassFacts>> {
        let magic = c.read_u4()?;
        if magic != MAGIC {
            return Err(ClassError::MalformedHeader(magic));
        }
        let minor = c.read_u2()?;
        let major = c.read_u2()?;
        if let Some(collector) = self.refs.collector.as_mut() {
            collector.version(minor, major);
        }

        self.pool.read(c)?;
        self.resolve_pool_references()?;
        let orphan_class_constant = self.pool.has_orphan_class_constant();

        let access = c.read_u2()?;
        let this_class = c.read_u2()?;
        let class_name = self.type_ref(self.pool.class_name(this_class)?);
        let facts = ClassFacts::new(class_name.clone(), major, minor, access);
        if facts.is_public() {
            self.refs.api = Some(BTreeSet::new());
        }
        self.refs.refer_to(&class_name, ACC_PUBLIC);
        self.facts = Some(facts);

        let Some(collector) = self.refs.collector.as_mut() else {
            return self.class_body(c, orphan_class_constant).map(Some);
        };
        let proceed = match &self.facts {
            Some(facts) => collector.class_start(facts),
            None => true,
        };
        let result = if proceed {
            self.class_body(c, orphan_class_constant).map(Some)
        } else {
            tracing::debug!("collector vetoed {}", class_name);
            Ok(None)
        };
        if let Some(collector) = self.refs.collector.as_mut() {
            collector.class_end();
        }
        result
    }

    /// Marks class constants reached from member references and records the
    /// descriptors of every `NameAndType`.
    fn resolve_pool_references(&mut self) -> Result<()> {
        for index in 1..self.pool.len() {
            match self.pool.entries()[index] {
                PoolEntry::Ref { class_index, .. } => self.class_constant_ref(class_index),
                PoolEntry::NameAndType {
                    descriptor_index, ..
                } => self.refer_descriptor(descriptor_index, 0)?,
                _ => {}
            }
        }
        Ok(())
    }

    fn class_body(&mut self, c: &mut ByteCursor<'_>, orphan_class_constant: bool) -> Result<ClassFacts> {
        let access = self.facts()?.access;
        let class_name = self.facts()?.class_name.clone();

        let super_class = c.read_u2()?;
        if super_class != 0 {
            let super_ref = self.type_ref(self.pool.class_name(super_class)?);
            self.refs.refer_to(&super_ref, access);
            if let Some(collector) = self.refs.collector.as_mut() {
                collector.extends_class(&super_ref);
            }
            self.facts()?.super_class = Some(super_ref);
        }

        let interface_count = c.read_u2()?;
        let mut interfaces = Vec::with_capacity(interface_count as usize);
        for _ in 0..interface_count {
            let interface = self.type_ref(self.pool.class_name(c.read_u2()?)?);
            self.refs.refer_to(&interface, access);
            interfaces.push(interface);
        }
        if !interfaces.is_empty()
            && let Some(collector) = self.refs.collector.as_mut()
        {
            collector.implements_interfaces(&interfaces);
        }
        self.facts()?.interfaces = interfaces;

        let field_count = c.read_u2()?;
        for _ in 0..field_count {
            let access_flags = c.read_u2()?;
            let name = self.pool.utf8(c.read_u2()?)?.to_string();
            let descriptor_index = c.read_u2()?;
            let descriptor = self.pool.utf8(descriptor_index)?.to_string();

            // Compilers before 1.5 cache class literals in synthetic
            // `class$com$acme$Foo` fields filled through Class.forName.
            if name.starts_with("class$") || name.starts_with("$class$") {
                self.crawl = true;
            }

            let field = MemberDef::field(access_flags, name, descriptor);
            if let Some(collector) = self.refs.collector.as_mut() {
                collector.field(&field);
            }
            self.refer_descriptor(descriptor_index, access_flags)?;

            let fields = &mut self.facts()?.fields;
            fields.push(field);
            let index = fields.len() - 1;
            self.last = Some(LastMember::Field(index));
            self.attributes(c, ElementKind::Field, false, access_flags)?;
        }

        let for_name =
            self.pool
                .find_method_reference("java/lang/Class", "forName", CLASS_LOADER_DESCRIPTOR);
        if !self.crawl && facts_major(&self.facts) == Some(48) && for_name.is_some() {
            self.crawl = true;
        }
        self.crawl |= orphan_class_constant;
        if self.crawl {
            self.targets = ReflectionTargets {
                for_name,
                class_dollar: self.pool.find_method_reference(
                    class_name.binary(),
                    "class$",
                    CLASS_LOADER_DESCRIPTOR,
                ),
            };
        }

        let method_count = c.read_u2()?;
        for _ in 0..method_count {
            let access_flags = c.read_u2()?;
            let name = self.pool.utf8(c.read_u2()?)?.to_string();
            let descriptor_index = c.read_u2()?;
            let descriptor = self.pool.utf8(descriptor_index)?.to_string();

            let prototype = signature::method_arguments(&descriptor)?
                .into_iter()
                .map(|arg| self.type_ref(arg))
                .collect();
            let constructor = name == "<init>";
            let default_constructor =
                constructor && access_flags & ACC_PUBLIC != 0 && descriptor == "()V";

            let method = MemberDef::method(access_flags, name, descriptor, prototype);
            if let Some(collector) = self.refs.collector.as_mut() {
                collector.method(&method);
            }
            self.refer_descriptor(descriptor_index, access_flags)?;

            let facts = self.facts()?;
            facts.has_default_constructor |= default_constructor;
            facts.methods.push(method);
            let index = facts.methods.len() - 1;
            self.last = Some(LastMember::Method(index));

            let kind = if constructor {
                ElementKind::Constructor
            } else {
                ElementKind::Method
            };
            let crawl = self.crawl;
            self.attributes(c, kind, crawl, access_flags)?;
        }
        if let Some(collector) = self.refs.collector.as_mut() {
            collector.member_end();
        }
        self.last = None;

        self.attributes(c, ElementKind::Type, false, access)?;

        let mut facts = self
            .facts
            .take()
            .ok_or_else(|| ClassError::invalid("class facts missing at end of parse"))?;
        facts.xref = mem::take(&mut self.refs.xref);
        facts.imports = mem::take(&mut self.refs.imports);
        facts.api = self.refs.api.take();
        Ok(facts)
    }

    fn refer_descriptor(&mut self, index: u16, access: u16) -> Result<()> {
        let descriptor = self.pool.utf8(index)?;
        signature::parse_descriptor(descriptor, access, &mut self.refs)
    }

    /// Records the class named by the class constant at `index`, once.
    fn class_constant_ref(&mut self, index: u16) {
        if let Some(name) = self.pool.mark_referred(index) {
            let type_ref = self.type_ref(&name);
            self.refs.refer_to(&type_ref, 0);
        }
    }

    fn attributes(
        &mut self,
        c: &mut ByteCursor<'_>,
        kind: ElementKind,
        crawl: bool,
        access: u16,
    ) -> Result<()> {
        let count = c.read_u2()?;
        for _ in 0..count {
            self.attribute(c, kind, crawl, access)?;
        }
        Ok(())
    }

    fn attribute(
        &mut self,
        c: &mut ByteCursor<'_>,
        kind: ElementKind,
        crawl: bool,
        access: u16,
    ) -> Result<()> {
        let attribute = Attribute::from_name(self.pool.utf8(c.read_u2()?)?);
        let length = c.read_u4()?;
        if length > MAX_ATTRIBUTE_LENGTH {
            return Err(ClassError::LimitExceeded(format!(
                "attribute of {length} bytes exceeds 2GB"
            )));
        }
        let body = &mut ByteCursor::new(c.take(length as usize)?);

        match attribute {
            Attribute::Deprecated => {
                match self.last_member() {
                    Some(member) => member.deprecated = true,
                    None if kind == ElementKind::Type => self.facts()?.deprecated = true,
                    None => {}
                }
                if let Some(collector) = self.refs.collector.as_mut() {
                    collector.deprecated();
                }
            }
            Attribute::Annotations(retention) => {
                self.annotations(body, kind, retention, access)?;
            }
            Attribute::ParameterAnnotations(retention) => {
                let parameters = body.read_u1()?;
                for parameter in 0..parameters {
                    if let Some(collector) = self.refs.collector.as_mut() {
                        collector.parameter(parameter);
                    }
                    self.annotations(body, ElementKind::Parameter, retention, access)?;
                }
            }
            Attribute::TypeAnnotations(retention) => {
                self.type_annotations(body, kind, retention, access)?;
            }
            Attribute::InnerClasses => self.inner_classes(body)?,
            Attribute::EnclosingMethod => self.enclosing_method(body)?,
            Attribute::SourceFile => {
                let source = self.pool.utf8(body.read_u2()?)?.to_string();
                self.facts()?.source_file = Some(source);
            }
            Attribute::Code if crawl => self.code(body)?,
            Attribute::Signature => self.signature(body, kind, access)?,
            Attribute::ConstantValue => {
                let value = self.constant_value(body.read_u2()?)?;
                if let Some(collector) = self.refs.collector.as_mut() {
                    collector.constant(&value);
                }
                if let Some(member) = self.last_member() {
                    member.constant = Some(value);
                }
            }
            Attribute::AnnotationDefault => {
                let value = self.element_value(body, kind, Retention::Runtime, access, 0)?;
                if let Some(LastMember::Method(_)) = self.last {
                    let Some(facts) = self.facts.as_mut() else {
                        return Ok(());
                    };
                    let Some(method) = facts.methods.last_mut() else {
                        return Ok(());
                    };
                    if let Some(collector) = self.refs.collector.as_mut() {
                        collector.annotation_default(method, &value);
                    }
                    method.constant = Some(value);
                }
            }
            Attribute::Exceptions => {
                let count = body.read_u2()?;
                for _ in 0..count {
                    let exception = self.type_ref(self.pool.class_name(body.read_u2()?)?);
                    self.refs.refer_to(&exception, access);
                }
            }
            Attribute::Code | Attribute::Other => {}
        }
        Ok(())
    }

    fn signature(&mut self, body: &mut ByteCursor<'_>, kind: ElementKind, access: u16) -> Result<()> {
        let index = body.read_u2()?;
        if let Err(err) = self.refer_descriptor(index, access) {
            // Obfuscators and some compilers emit signatures that do not follow
            // the grammar; they carry no information we can use.
            tracing::debug!("ignoring malformed signature: {}", err);
            return Ok(());
        }

        let signature = self.pool.utf8(index)?.to_string();
        if let Some(collector) = self.refs.collector.as_mut() {
            collector.signature(&signature);
        }
        if kind == ElementKind::Type {
            self.facts()?.class_signature = Some(signature);
        } else if let Some(member) = self.last_member() {
            member.signature = Some(signature);
        }
        Ok(())
    }

    fn constant_value(&self, index: u16) -> Result<Value> {
        Ok(match self.pool.entry(index)? {
            PoolEntry::Integer(v) => Value::Int(*v),
            PoolEntry::Float(v) => Value::Float(*v),
            PoolEntry::Long(v) => Value::Long(*v),
            PoolEntry::Double(v) => Value::Double(*v),
            PoolEntry::String { string_index } => {
                Value::String(self.pool.utf8(*string_index)?.to_string())
            }
            PoolEntry::Utf8(s) => Value::String(s.clone()),
            other => {
                return Err(ClassError::invalid(format!(
                    "constant value at pool index {index} is {other:?}"
                )));
            }
        })
    }

    fn inner_classes(&mut self, body: &mut ByteCursor<'_>) -> Result<()> {
        let count = body.read_u2()?;
        for _ in 0..count {
            let inner_index = body.read_u2()?;
            let outer_index = body.read_u2()?;
            let name_index = body.read_u2()?;
            let access = body.read_u2()?;

            let inner = self.optional_class(inner_index)?;
            let outer = self.optional_class(outer_index)?;
            let simple_name = match name_index {
                0 => None,
                i => Some(self.pool.utf8(i)?.to_string()),
            };

            if let Some(collector) = self.refs.collector.as_mut() {
                collector.inner_class(inner.as_ref(), outer.as_ref(), simple_name.as_deref(), access);
            }
            let facts = self.facts()?;
            if inner.as_ref() == Some(&facts.class_name) {
                facts.inner_access = Some(access);
            }
            facts.inner_classes.push(InnerClassRecord {
                inner,
                outer,
                simple_name,
                access,
            });
        }
        Ok(())
    }

    fn optional_class(&self, index: u16) -> Result<Option<TypeRef>> {
        if index == 0 {
            return Ok(None);
        }
        Ok(Some(self.type_ref(self.pool.class_name(index)?)))
    }

    fn enclosing_method(&mut self, body: &mut ByteCursor<'_>) -> Result<()> {
        let class_index = body.read_u2()?;
        let method_index = body.read_u2()?;
        self.class_constant_ref(class_index);

        let class = self.type_ref(self.pool.class_name(class_index)?);
        let (method_name, descriptor) = match method_index {
            0 => (None, None),
            i => {
                let (name, descriptor) = self.pool.name_and_type(i)?;
                (Some(name.to_string()), Some(descriptor.to_string()))
            }
        };
        if let Some(collector) = self.refs.collector.as_mut() {
            collector.enclosing_method(&class, method_name.as_deref(), descriptor.as_deref());
        }
        self.facts()?.enclosing_method = Some(EnclosingMethod {
            class,
            method_name,
            descriptor,
        });
        Ok(())
    }

    fn code(&mut self, body: &mut ByteCursor<'_>) -> Result<()> {
        let _max_stack = body.read_u2()?;
        let _max_locals = body.read_u2()?;
        let code_length = body.read_u4()?;
        let code = body.take(code_length as usize)?;
        let targets = self.targets;
        crawler::crawl(code, targets, self)?;

        let handlers = body.read_u2()?;
        for _ in 0..handlers {
            body.skip(6)?; // start_pc, end_pc, handler_pc
            let catch_type = body.read_u2()?;
            self.class_constant_ref(catch_type);
        }
        self.attributes(body, ElementKind::Method, false, 0)
    }

    fn annotations(
        &mut self,
        body: &mut ByteCursor<'_>,
        kind: ElementKind,
        retention: Retention,
        access: u16,
    ) -> Result<()> {
        let count = body.read_u2()?;
        for _ in 0..count {
            let annotation = self.annotation(body, kind, retention, access, 0)?;
            if let Some(collector) = self.refs.collector.as_mut() {
                collector.annotation(&annotation);
            }
            if kind == ElementKind::Type {
                self.facts()?.class_annotations.push(annotation);
            } else if let Some(member) = self.last_member() {
                member.annotations.push(annotation);
            }
        }
        Ok(())
    }

    fn type_annotations(
        &mut self,
        body: &mut ByteCursor<'_>,
        kind: ElementKind,
        retention: Retention,
        access: u16,
    ) -> Result<()> {
        let count = body.read_u2()?;
        for _ in 0..count {
            let target_type = body.read_u1()?;
            let target_info = match target_type {
                // type parameter, formal parameter
                0x00 | 0x01 | 0x16 => 1,
                // supertype, type parameter bound, throws
                0x10..=0x12 | 0x17 => 2,
                // field, return and receiver types
                0x13..=0x15 => 0,
                // local and resource variables: a table of (start_pc, length, index)
                0x40 | 0x41 => body.read_u2()? as usize * 6,
                // catch, instanceof, new, method references
                0x42..=0x46 => 2,
                // cast and type arguments
                0x47..=0x4B => 3,
                other => {
                    return Err(ClassError::invalid(format!(
                        "unknown type annotation target 0x{other:02x}"
                    )));
                }
            };
            body.skip(target_info)?;
            let path_length = body.read_u1()? as usize;
            body.skip(path_length * 2)?;

            self.annotation(body, kind, retention, access, 0)?;
        }
        Ok(())
    }

    fn annotation(
        &mut self,
        body: &mut ByteCursor<'_>,
        kind: ElementKind,
        retention: Retention,
        access: u16,
        depth: usize,
    ) -> Result<Annotation> {
        let type_index = body.read_u2()?;
        let name = self.type_ref(self.pool.utf8(type_index)?);

        let facts = self.facts()?;
        facts.annotations.insert(name.clone());
        match retention {
            Retention::Runtime => {
                facts.has_runtime_annotations = true;
                self.refer_descriptor(type_index, 0)?;
                self.refs.expose(&name, access);
            }
            Retention::Class => facts.has_class_annotations = true,
        }

        let mut annotation = Annotation::new(name, retention, kind);
        let pairs = body.read_u2()?;
        for _ in 0..pairs {
            let element = self.pool.utf8(body.read_u2()?)?.to_string();
            let value = self.element_value(body, kind, retention, access, depth)?;
            annotation.put(element, value);
        }
        Ok(annotation)
    }

    fn element_value(
        &mut self,
        body: &mut ByteCursor<'_>,
        kind: ElementKind,
        retention: Retention,
        access: u16,
        depth: usize,
    ) -> Result<Value> {
        if depth > MAX_NESTING {
            return Err(ClassError::too_deep("annotation element values"));
        }
        let tag = body.read_u1()? as char;
        Ok(match tag {
            'B' | 'C' | 'I' | 'S' => Value::Int(self.int_constant(body.read_u2()?)?),
            'Z' => Value::Boolean(self.int_constant(body.read_u2()?)? != 0),
            'J' => match self.pool.entry(body.read_u2()?)? {
                PoolEntry::Long(v) => Value::Long(*v),
                other => return Err(ClassError::invalid(format!("expected Long, found {other:?}"))),
            },
            'F' => match self.pool.entry(body.read_u2()?)? {
                PoolEntry::Float(v) => Value::Float(*v),
                other => return Err(ClassError::invalid(format!("expected Float, found {other:?}"))),
            },
            'D' => match self.pool.entry(body.read_u2()?)? {
                PoolEntry::Double(v) => Value::Double(*v),
                other => {
                    return Err(ClassError::invalid(format!("expected Double, found {other:?}")));
                }
            },
            's' => Value::String(self.pool.utf8(body.read_u2()?)?.to_string()),
            'e' => {
                let type_index = body.read_u2()?;
                let type_ref = self.type_ref(self.pool.utf8(type_index)?);
                if retention == Retention::Runtime {
                    self.refer_descriptor(type_index, 0)?;
                    self.refs.expose(&type_ref, access);
                }
                let constant = self.pool.utf8(body.read_u2()?)?.to_string();
                Value::Enum { type_ref, constant }
            }
            'c' => {
                let class_index = body.read_u2()?;
                let type_ref = self.type_ref(self.pool.utf8(class_index)?);
                if retention == Retention::Runtime {
                    self.refer_descriptor(class_index, 0)?;
                    self.refs.expose(&type_ref, access);
                }
                Value::Class(type_ref)
            }
            '@' => Value::Annotation(Box::new(self.annotation(body, kind, retention, access, depth + 1)?)),
            '[' => {
                let count = body.read_u2()?;
                let mut values = Vec::with_capacity(count as usize);
                for _ in 0..count {
                    values.push(self.element_value(body, kind, retention, access, depth + 1)?);
                }
                Value::Array(values)
            }
            other => return Err(ClassError::UnsupportedElementValue(other)),
        })
    }

    fn int_constant(&self, index: u16) -> Result<i32> {
        match self.pool.entry(index)? {
            PoolEntry::Integer(v) => Ok(*v),
            other => Err(ClassError::invalid(format!(
                "expected Integer at pool index {index}, found {other:?}"
            ))),
        }
    }
}

fn facts_major(facts: &Option<ClassFacts>) -> Option<u16> {
    facts.as_ref().map(|f| f.major)
}

impl BytecodeVisitor for ParseState<'_, '_> {
    fn class_constant(&mut self, pool_index: u16) -> Result<()> {
        self.class_constant_ref(pool_index);
        Ok(())
    }

    fn method_reference(&mut self, pool_index: u16) -> Result<()> {
        if pool_index == 0 {
            return Ok(());
        }
        let Some(collector) = self.refs.collector.as_mut() else {
            return Ok(());
        };
        let (owner, name, descriptor) = self.pool.method_ref(pool_index)?;
        let owner = self.refs.interner.type_ref(owner);
        collector.reference_method(0, &owner, name, descriptor);
        Ok(())
    }

    fn string_constant(&self, pool_index: u16) -> Option<String> {
        self.pool.string_constant(pool_index).map(str::to_string)
    }

    fn reflective_class(&mut self, fqn: &str) -> Result<()> {
        let type_ref = self.refs.interner.type_ref_from_fqn(fqn);
        self.refs.refer_to(&type_ref, 0);
        Ok(())
    }
}
