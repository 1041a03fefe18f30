//! Error taxonomy for class-file analysis.
//!
//! Parse failures abort the current parse and surface to the caller. Query
//! problems are never fatal: they are reported as [`QueryDiagnostic`]s and the
//! query evaluates to `false`.

use crate::descriptors::TypeRef;

pub type Result<T> = std::result::Result<T, ClassError>;

/// Deepest nesting of generic type arguments or annotation element values
/// accepted in one class file. Matches the JVM limit on array dimensions.
pub const MAX_NESTING: usize = 255;

#[derive(Debug, thiserror::Error)]
pub enum ClassError {
    #[error("not a valid class file (magic 0x{0:08x}, expected 0xcafebabe)")]
    MalformedHeader(u32),
    #[error("invalid class file format: {0}")]
    InvalidFormat(String),
    #[error("limit exceeded: {0}")]
    LimitExceeded(String),
    #[error("unsupported annotation element value tag '{0}'")]
    UnsupportedElementValue(char),
    #[error("unexpected end of input at offset {offset} (wanted {wanted} bytes)")]
    UnexpectedEof {
        offset: usize,
        wanted: usize,
    },
}

impl ClassError {
    pub(crate) fn invalid(msg: impl Into<String>) -> Self {
        ClassError::InvalidFormat(msg.into())
    }

    pub(crate) fn too_deep(what: &str) -> Self {
        ClassError::LimitExceeded(format!("{what} nested deeper than {MAX_NESTING} levels"))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum QueryDiagnostic {
    #[error("while traversing the type tree searching {query} on {class}, cannot find class {missing}")]
    UnresolvedAncestor {
        query: String,
        class: TypeRef,
        missing: TypeRef,
    },
    #[error("type tree of {class} loops back to {repeated} while searching {query}")]
    CyclicAncestry {
        query: String,
        class: TypeRef,
        repeated: TypeRef,
    },
}

/// A query or pattern given as text could not be understood.
#[derive(Debug, thiserror::Error)]
pub enum QueryError {
    #[error("unknown query {0:?}")]
    UnknownQuery(String),
    #[error("query {0} needs a pattern")]
    MissingPattern(String),
    #[error("invalid pattern: {0}")]
    BadPattern(#[from] regex::Error),
}
