//! Descriptor and generic signature parsing.
//!
//! The grammar handled here is the generic signature grammar, which is a
//! superset of plain field and method descriptors:
//!
//! ```text
//! signature     ::= formalParams? ( '(' ref* ')' )? ref*
//! ref           ::= '['* ( primitive | 'L' name genericArgs? ';' | 'T' name ';' | '<' ref* '>' )
//! genericArgs   ::= '<' ref* '>'
//! formalParams  ::= '<' ( ident ':' classBound? ( ':' ref )* )+ '>'
//! ```
//!
//! Every object type encountered is handed to a [`ReferenceSink`] together
//! with the access flags of the member being described.

use crate::error::{ClassError, MAX_NESTING, Result};

pub trait ReferenceSink {
    /// Called once per object type mention, with its binary name.
    fn reference(&mut self, binary_name: &str, access: u16);
}

impl<F: FnMut(&str, u16)> ReferenceSink for F {
    fn reference(&mut self, binary_name: &str, access: u16) {
        self(binary_name, access)
    }
}

/// Parses a descriptor or signature, reporting every object type to `sink`.
pub fn parse_descriptor(descriptor: &str, access: u16, sink: &mut dyn ReferenceSink) -> Result<()> {
    if descriptor.is_empty() {
        return Err(ClassError::invalid("empty descriptor"));
    }
    let mut parser = SignatureParser {
        text: descriptor,
        bytes: descriptor.as_bytes(),
        access,
        sink,
        nesting: 0,
    };
    parser.parse()
}

struct SignatureParser<'a, 's> {
    text: &'a str,
    bytes: &'a [u8],
    access: u16,
    sink: &'s mut dyn ReferenceSink,
    nesting: usize,
}

impl SignatureParser<'_, '_> {
    fn at(&self, pos: usize) -> Result<u8> {
        self.bytes.get(pos).copied().ok_or_else(|| {
            ClassError::invalid(format!("unexpected end of descriptor {:?}", self.text))
        })
    }

    fn parse(&mut self) -> Result<()> {
        let mut pos = 0;
        if self.at(pos)? == b'<' {
            pos = self.formal_type_parameters(pos)?;
        }
        if self.bytes.get(pos) == Some(&b'(') {
            pos = self.references(pos + 1, Some(b')'))?;
            pos += 1;
        }
        self.references(pos, None)?;
        Ok(())
    }

    /// Parses references until `delimiter` (or the end of input when `None`)
    /// and returns the position of the delimiter.
    fn references(&mut self, mut pos: usize, delimiter: Option<u8>) -> Result<usize> {
        loop {
            match (self.bytes.get(pos).copied(), delimiter) {
                (None, None) => return Ok(pos),
                (None, Some(d)) => {
                    return Err(ClassError::invalid(format!(
                        "missing '{}' in descriptor {:?}",
                        d as char, self.text
                    )));
                }
                (Some(c), Some(d)) if c == d => return Ok(pos),
                _ => pos = self.reference(pos)?,
            }
        }
    }

    /// Parses one reference and returns the position just after it.
    fn reference(&mut self, mut pos: usize) -> Result<usize> {
        let mut c = self.at(pos)?;
        while c == b'[' {
            pos += 1;
            c = self.at(pos)?;
        }

        match c {
            b'<' => pos = self.type_arguments(pos + 1)?,
            b'T' => {
                pos += 1;
                while self.at(pos)? != b';' {
                    pos += 1;
                }
            }
            b'L' => {
                let mut name = String::new();
                let mut start = pos + 1;
                pos += 1;
                loop {
                    match self.at(pos)? {
                        b';' => break,
                        b'<' => {
                            name.push_str(&self.text[start..pos]);
                            pos = self.type_arguments(pos + 1)?;
                            start = pos + 1;
                        }
                        // Inner class of a parameterized outer: Outer<TT;>.Inner
                        b'.' => {
                            name.push_str(&self.text[start..pos]);
                            name.push('$');
                            start = pos + 1;
                        }
                        _ => {}
                    }
                    pos += 1;
                }
                name.push_str(&self.text[start..pos]);
                if name.is_empty() {
                    return Err(ClassError::invalid(format!(
                        "empty class name in descriptor {:?}",
                        self.text
                    )));
                }
                self.sink.reference(&name, self.access);
            }
            b'B' | b'C' | b'D' | b'F' | b'I' | b'J' | b'S' | b'Z' | b'V' | b'+' | b'-' | b'*' => {}
            other => {
                return Err(ClassError::invalid(format!(
                    "unexpected '{}' in descriptor {:?}",
                    other as char, self.text
                )));
            }
        }

        Ok(pos + 1)
    }

    /// Parses the references of a `<...>` list starting at `pos` and returns
    /// the position of the closing `>`.
    fn type_arguments(&mut self, pos: usize) -> Result<usize> {
        if self.nesting == MAX_NESTING {
            return Err(ClassError::too_deep("generic type arguments"));
        }
        self.nesting += 1;
        let end = self.references(pos, Some(b'>'));
        self.nesting -= 1;
        end
    }

    fn formal_type_parameters(&mut self, mut pos: usize) -> Result<usize> {
        pos += 1;
        while self.at(pos)? != b'>' {
            let colon = self.text[pos..].find(':').ok_or_else(|| {
                ClassError::invalid(format!("expected identifier in {:?}", self.text))
            })?;
            pos += colon + 1;

            // Class bound is optional; an interface-only bound starts with ':'.
            if self.at(pos)? != b':' {
                pos = self.reference(pos)?;
            }
            while self.at(pos)? == b':' {
                pos = self.reference(pos + 1)?;
            }
        }
        Ok(pos + 1)
    }
}

/// Splits a method descriptor's parameter list into one descriptor per
/// argument, e.g. `(I[Ljava/lang/String;J)V` gives `I`, `[Ljava/lang/String;`
/// and `J`.
pub fn method_arguments(descriptor: &str) -> Result<Vec<&str>> {
    let bytes = descriptor.as_bytes();
    if bytes.first() != Some(&b'(') {
        return Err(ClassError::invalid(format!(
            "method descriptor {descriptor:?} does not start with '('"
        )));
    }

    let mut args = Vec::new();
    let mut pos = 1;
    loop {
        let start = pos;
        while bytes.get(pos) == Some(&b'[') {
            pos += 1;
        }
        match bytes.get(pos) {
            Some(b')') if start == pos => return Ok(args),
            Some(b'L') => {
                let end = descriptor[pos..].find(';').ok_or_else(|| {
                    ClassError::invalid(format!("unterminated class name in {descriptor:?}"))
                })?;
                pos += end + 1;
            }
            Some(b'B' | b'C' | b'D' | b'F' | b'I' | b'J' | b'S' | b'Z') => pos += 1,
            _ => {
                return Err(ClassError::invalid(format!(
                    "malformed method descriptor {descriptor:?}"
                )));
            }
        }
        args.push(&descriptor[start..pos]);
    }
}

/// Return type part of a method descriptor or signature, i.e. everything after
/// the last `)`.
pub fn return_type(descriptor: &str) -> Result<&str> {
    match descriptor.rfind(')') {
        Some(pos) if pos + 1 < descriptor.len() && descriptor.contains('(') => {
            Ok(&descriptor[pos + 1..])
        }
        _ => Err(ClassError::invalid(format!(
            "{descriptor:?} is not a method descriptor"
        ))),
    }
}
