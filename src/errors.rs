//! Errors raised while compiling a schema document.
//!
//! Only *schema* problems are errors in the Rust sense. Problems with an
//! instance are reported as [`Violation`](../validator/struct.Violation.html)
//! values instead.

use failure::Fail;

/// The reasons a schema document can be rejected by the compiler.
#[derive(Debug, Fail, PartialEq, Clone, Eq, Hash)]
pub enum CompileErrorKind {
    /// A `$ref` points at a location that does not exist.
    ///
    /// For local references this means the JSON Pointer did not resolve
    /// against the document. For external references it means the target
    /// document was never added to the [`Registry`](../registry/struct.Registry.html).
    #[fail(display = "dangling reference: {}", reference)]
    DanglingReference { reference: String },

    /// Following `$ref`s leads back to a schema that is still being compiled.
    ///
    /// Recursive schemas are rejected so that validation always terminates.
    #[fail(display = "cyclic reference: {}", reference)]
    CyclicReference { reference: String },

    /// A keyword carries a value of the wrong shape, e.g. `"minimum": "3"`.
    #[fail(display = "invalid value for {}: expected {}", keyword, expected)]
    InvalidKeywordValue {
        keyword: String,
        expected: &'static str,
    },

    /// A `$ref` is neither a `#` fragment nor something that resolves to an
    /// absolute URL with a JSON Pointer fragment.
    #[fail(display = "unsupported reference: {}", reference)]
    UnsupportedReference { reference: String },

    /// A schema is neither an object nor a boolean.
    #[fail(display = "schema must be an object or a boolean")]
    InvalidSchema,
}

/// A schema document could not be compiled.
///
/// `path` is the JSON Pointer of the schema location that was rejected,
/// relative to the document that contains it.
#[derive(Debug, Fail, PartialEq, Clone, Eq, Hash)]
#[fail(display = "{} (at {:?})", kind, path)]
pub struct SchemaCompileError {
    pub kind: CompileErrorKind,
    pub path: String,
}

impl SchemaCompileError {
    pub fn new(kind: CompileErrorKind, path: impl Into<String>) -> Self {
        SchemaCompileError {
            kind,
            path: path.into(),
        }
    }

    pub(crate) fn invalid_keyword(
        path: impl Into<String>,
        keyword: &str,
        expected: &'static str,
    ) -> Self {
        Self::new(
            CompileErrorKind::InvalidKeywordValue {
                keyword: keyword.to_owned(),
                expected,
            },
            path,
        )
    }

    /// The kind of problem.
    pub fn kind(&self) -> &CompileErrorKind {
        &self.kind
    }

    /// Where in the schema document the problem was found.
    pub fn path(&self) -> &str {
        &self.path
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_names_the_keyword_and_location() {
        let err = SchemaCompileError::invalid_keyword("/properties/a/minimum", "minimum", "a number");
        assert_eq!(
            err.to_string(),
            "invalid value for minimum: expected a number (at \"/properties/a/minimum\")"
        );
    }
}
