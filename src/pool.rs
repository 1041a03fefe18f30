//! Constant pool decoding.
//!
//! The first pass ([`ConstantPool::read`]) decodes every slot into a typed
//! [`PoolEntry`]. Compound entries keep raw operand indices, which resolve only
//! once the whole pool is read since forward references are legal. The
//! reference marking and orphan detection passes run in the parser because they
//! record references as a side effect.

use crate::cursor::ByteCursor;
use crate::error::{ClassError, Result};

pub const CONSTANT_UTF8: u8 = 1;
pub const CONSTANT_INTEGER: u8 = 3;
pub const CONSTANT_FLOAT: u8 = 4;
pub const CONSTANT_LONG: u8 = 5;
pub const CONSTANT_DOUBLE: u8 = 6;
pub const CONSTANT_CLASS: u8 = 7;
pub const CONSTANT_STRING: u8 = 8;
pub const CONSTANT_FIELDREF: u8 = 9;
pub const CONSTANT_METHODREF: u8 = 10;
pub const CONSTANT_INTERFACE_METHODREF: u8 = 11;
pub const CONSTANT_NAME_AND_TYPE: u8 = 12;

/// Operand size of an entry this analyzer skips rather than decodes.
fn skipped_width(tag: u8) -> Option<usize> {
    match tag {
        15 => Some(3),           // MethodHandle
        16 | 19 | 20 => Some(2), // MethodType, Module, Package
        17 | 18 => Some(4),      // Dynamic, InvokeDynamic
        _ => None,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefKind {
    Field,
    Method,
    InterfaceMethod,
}

#[derive(Debug, Clone, PartialEq)]
pub enum PoolEntry {
    /// Slot 0, the shadow slot after a Long/Double, or slots after an early
    /// terminating tag 0.
    Unused,
    Utf8(String),
    Integer(i32),
    Float(f32),
    Long(i64),
    Double(f64),
    Class {
        name_index: u16,
        referred: bool,
    },
    String {
        string_index: u16,
    },
    Ref {
        kind: RefKind,
        class_index: u16,
        name_and_type_index: u16,
    },
    NameAndType {
        name_index: u16,
        descriptor_index: u16,
    },
    /// An entry this analyzer has no use for (method handles, indy, modules).
    Skipped(u8),
}

#[derive(Debug, Default)]
pub struct ConstantPool {
    entries: Vec<PoolEntry>,
}

impl ConstantPool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decodes the pool starting at the entry count, reusing this pool's
    /// allocation.
    pub fn read(&mut self, cursor: &mut ByteCursor<'_>) -> Result<()> {
        let count = cursor.read_u2()? as usize;
        if count == 0 {
            return Err(ClassError::invalid("constant pool count must be at least 1"));
        }

        self.entries.clear();
        self.entries.resize(count, PoolEntry::Unused);

        let mut index = 1;
        while index < count {
            let tag = cursor.read_u1()?;
            let entry = match tag {
                0 => break,
                CONSTANT_UTF8 => PoolEntry::Utf8(cursor.read_utf()?),
                CONSTANT_INTEGER => PoolEntry::Integer(cursor.read_i4()?),
                CONSTANT_FLOAT => PoolEntry::Float(f32::from_bits(cursor.read_u4()?)),
                CONSTANT_LONG => PoolEntry::Long(cursor.read_u8()? as i64),
                CONSTANT_DOUBLE => PoolEntry::Double(f64::from_bits(cursor.read_u8()?)),
                CONSTANT_CLASS => PoolEntry::Class {
                    name_index: cursor.read_u2()?,
                    referred: false,
                },
                CONSTANT_STRING => PoolEntry::String {
                    string_index: cursor.read_u2()?,
                },
                CONSTANT_FIELDREF | CONSTANT_METHODREF | CONSTANT_INTERFACE_METHODREF => {
                    let kind = match tag {
                        CONSTANT_FIELDREF => RefKind::Field,
                        CONSTANT_METHODREF => RefKind::Method,
                        _ => RefKind::InterfaceMethod,
                    };
                    PoolEntry::Ref {
                        kind,
                        class_index: cursor.read_u2()?,
                        name_and_type_index: cursor.read_u2()?,
                    }
                }
                CONSTANT_NAME_AND_TYPE => PoolEntry::NameAndType {
                    name_index: cursor.read_u2()?,
                    descriptor_index: cursor.read_u2()?,
                },
                2 => {
                    return Err(ClassError::invalid(format!(
                        "invalid constant pool tag 2 at slot {index}"
                    )));
                }
                _ => match skipped_width(tag) {
                    Some(width) => {
                        cursor.skip(width)?;
                        PoolEntry::Skipped(tag)
                    }
                    None => {
                        return Err(ClassError::invalid(format!(
                            "unknown constant pool tag {tag} at slot {index}"
                        )));
                    }
                },
            };

            self.entries[index] = entry;
            if tag == CONSTANT_LONG || tag == CONSTANT_DOUBLE {
                index += 2;
            } else {
                index += 1;
            }
        }

        Ok(())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.len() <= 1
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn entries(&self) -> &[PoolEntry] {
        &self.entries
    }

    pub fn entry(&self, index: u16) -> Result<&PoolEntry> {
        self.entries
            .get(index as usize)
            .ok_or_else(|| ClassError::invalid(format!("constant pool index {index} out of range")))
    }

    pub fn utf8(&self, index: u16) -> Result<&str> {
        match self.entry(index)? {
            PoolEntry::Utf8(value) => Ok(value),
            other => Err(ClassError::invalid(format!(
                "expected Utf8 at pool index {index}, found {other:?}"
            ))),
        }
    }

    pub fn class_name(&self, index: u16) -> Result<&str> {
        match self.entry(index)? {
            PoolEntry::Class { name_index, .. } => self.utf8(*name_index),
            other => Err(ClassError::invalid(format!(
                "expected Class at pool index {index}, found {other:?}"
            ))),
        }
    }

    pub fn name_and_type(&self, index: u16) -> Result<(&str, &str)> {
        match self.entry(index)? {
            PoolEntry::NameAndType {
                name_index,
                descriptor_index,
            } => Ok((self.utf8(*name_index)?, self.utf8(*descriptor_index)?)),
            other => Err(ClassError::invalid(format!(
                "expected NameAndType at pool index {index}, found {other:?}"
            ))),
        }
    }

    /// Resolves a method reference to `(owner, name, descriptor)`.
    pub fn method_ref(&self, index: u16) -> Result<(&str, &str, &str)> {
        match self.entry(index)? {
            PoolEntry::Ref {
                kind: RefKind::Method | RefKind::InterfaceMethod,
                class_index,
                name_and_type_index,
            } => {
                let owner = self.class_name(*class_index)?;
                let (name, descriptor) = self.name_and_type(*name_and_type_index)?;
                Ok((owner, name, descriptor))
            }
            other => Err(ClassError::invalid(format!(
                "expected method reference at pool index {index}, found {other:?}"
            ))),
        }
    }

    pub fn string_constant(&self, index: u16) -> Option<&str> {
        match self.entries.get(index as usize)? {
            PoolEntry::String { string_index } => self.utf8(*string_index).ok(),
            _ => None,
        }
    }

    /// Marks the class constant at `index` as referred.
    ///
    /// Returns the class name the first time a class constant is marked and
    /// `None` for repeat marks or slots that are not class constants.
    pub fn mark_referred(&mut self, index: u16) -> Option<String> {
        let name_index = match self.entries.get_mut(index as usize)? {
            PoolEntry::Class {
                name_index,
                referred,
            } if !*referred => {
                *referred = true;
                *name_index
            }
            _ => return None,
        };
        self.utf8(name_index).ok().map(str::to_string)
    }

    /// True when some class constant was never reached from a field or method
    /// reference. Such orphans are only used from bytecode.
    pub fn has_orphan_class_constant(&self) -> bool {
        self.entries
            .iter()
            .any(|e| matches!(e, PoolEntry::Class { referred: false, .. }))
    }

    /// Finds the pool index of the method reference `class.name descriptor`.
    pub fn find_method_reference(&self, class: &str, name: &str, descriptor: &str) -> Option<u16> {
        self.entries
            .iter()
            .enumerate()
            .skip(1)
            .find_map(|(index, entry)| match entry {
                PoolEntry::Ref {
                    kind: RefKind::Method,
                    ..
                } => {
                    let index = index as u16;
                    let (owner, n, d) = self.method_ref(index).ok()?;
                    (owner == class && n == name && d == descriptor).then_some(index)
                }
                _ => None,
            })
    }
}
