//! Linear scan of a method body.
//!
//! The crawler does not build a control flow graph. It walks the instruction
//! stream once, reporting class constants and method references, and spots
//! the pre-1.5 class literal idiom: `ldc "com.acme.Foo"` immediately followed
//! by `invokestatic Class.forName(String)` or the synthetic `class$(String)`.

use crate::cursor::ByteCursor;
use crate::error::{ClassError, Result};
use crate::opcodes::*;

/// Receives what the crawler finds.
pub trait BytecodeVisitor {
    /// A class constant used by `ldc`, `new`, `checkcast` and friends.
    fn class_constant(&mut self, pool_index: u16) -> Result<()>;

    fn method_reference(&mut self, pool_index: u16) -> Result<()>;

    fn string_constant(&self, pool_index: u16) -> Option<String>;

    /// A dotted class name loaded through reflection.
    fn reflective_class(&mut self, fqn: &str) -> Result<()>;
}

/// Pool indices of the methods that load a class from a string.
#[derive(Debug, Default, Clone, Copy)]
pub struct ReflectionTargets {
    /// `java/lang/Class.forName(Ljava/lang/String;)Ljava/lang/Class;`
    pub for_name: Option<u16>,
    /// The compiler generated `class$(Ljava/lang/String;)Ljava/lang/Class;`.
    pub class_dollar: Option<u16>,
}

impl ReflectionTargets {
    fn matches(&self, pool_index: u16) -> bool {
        self.for_name == Some(pool_index) || self.class_dollar == Some(pool_index)
    }
}

pub fn crawl(code: &[u8], targets: ReflectionTargets, visitor: &mut dyn BytecodeVisitor) -> Result<()> {
    let mut cursor = ByteCursor::new(code);
    let mut last_loaded: Option<u16> = None;

    while cursor.remaining() > 0 {
        let opcode = cursor.read_u1()?;
        match opcode {
            LDC => {
                let index = cursor.read_u1()? as u16;
                last_loaded = Some(index);
                visitor.class_constant(index)?;
            }
            LDC_W => {
                let index = cursor.read_u2()?;
                last_loaded = Some(index);
                visitor.class_constant(index)?;
            }
            NEW | ANEWARRAY | CHECKCAST | INSTANCEOF => {
                visitor.class_constant(cursor.read_u2()?)?;
                last_loaded = None;
            }
            MULTIANEWARRAY => {
                visitor.class_constant(cursor.read_u2()?)?;
                cursor.skip(1)?;
                last_loaded = None;
            }
            INVOKEVIRTUAL | INVOKESPECIAL => {
                visitor.method_reference(cursor.read_u2()?)?;
            }
            INVOKEINTERFACE => {
                visitor.method_reference(cursor.read_u2()?)?;
                // count and the reserved zero byte
                cursor.skip(2)?;
            }
            INVOKESTATIC => {
                let method = cursor.read_u2()?;
                visitor.method_reference(method)?;

                if targets.matches(method)
                    && let Some(loaded) = last_loaded
                    && let Some(fqn) = visitor.string_constant(loaded)
                {
                    if fqn != "class" && fqn.find('.').is_some_and(|pos| pos > 0) {
                        visitor.reflective_class(&fqn)?;
                    }
                    last_loaded = None;
                }
            }
            WIDE => {
                let wrapped = cursor.read_u1()?;
                cursor.skip(2)?;
                if wrapped == IINC {
                    cursor.skip(2)?;
                }
            }
            TABLESWITCH => {
                align(&mut cursor)?;
                let _default = cursor.read_i4()?;
                let low = cursor.read_i4()?;
                let high = cursor.read_i4()?;
                let entries = (high as i64) - (low as i64) + 1;
                if entries < 0 {
                    return Err(ClassError::invalid(format!(
                        "tableswitch with low {low} above high {high}"
                    )));
                }
                skip_table(&mut cursor, entries as u64 * 4)?;
                last_loaded = None;
            }
            LOOKUPSWITCH => {
                align(&mut cursor)?;
                let _default = cursor.read_i4()?;
                let pairs = cursor.read_i4()?;
                if pairs < 0 {
                    return Err(ClassError::invalid(format!(
                        "lookupswitch with negative pair count {pairs}"
                    )));
                }
                skip_table(&mut cursor, pairs as u64 * 8)?;
                last_loaded = None;
            }
            _ => {
                last_loaded = None;
                cursor.skip(OPERAND_WIDTHS[opcode as usize] as usize)?;
            }
        }
    }

    Ok(())
}

/// Skips switch padding up to the next offset divisible by four, counted from
/// the start of the code array.
fn align(cursor: &mut ByteCursor<'_>) -> Result<()> {
    let padding = (4 - cursor.position() % 4) % 4;
    cursor.skip(padding)
}

fn skip_table(cursor: &mut ByteCursor<'_>, len: u64) -> Result<()> {
    let len = usize::try_from(len)
        .map_err(|_| ClassError::LimitExceeded(format!("switch table of {len} bytes")))?;
    cursor.skip(len)
}
