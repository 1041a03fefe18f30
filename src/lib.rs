//! # class-analyzer
//!
//! Static analysis of compiled JVM class files, without loading or running
//! them.
//!
//! ## Architecture
//!
//! - **cursor**: bounds checked big-endian reads and modified UTF-8
//! - **pool**: constant pool decoding and lookups
//! - **descriptors**: interned type and package identities
//! - **signature**: descriptor and generic signature parsing
//! - **crawler**: bytecode walk for class constants and reflective lookups
//! - **parser**: the class-file parser that produces [`model::ClassFacts`]
//! - **collector**: structural callbacks fired while parsing
//! - **query**: class queries with ancestry walks through a registry
//! - **index**: in-memory registry of parsed classes
//! - **scan**: batch parsing of directories and jars

pub mod annotation;
pub mod cli;
pub mod collector;
pub mod config;
pub mod crawler;
pub mod cursor;
pub mod descriptors;
pub mod error;
pub mod index;
pub mod model;
pub mod opcodes;
pub mod parser;
pub mod pool;
pub mod query;
pub mod scan;
pub mod signature;

pub use error::{ClassError, QueryDiagnostic, Result};
pub use parser::ClassParser;

#[cfg(test)]
extern crate self as class_analyzer;

#[cfg(test)]
#[path = "../tests/common/builder.rs"]
mod builder;
