//! Validate input data against compiled schemas.
//!
//! This module contains logic related to *validation*, the process of taking a
//! piece of input data (called an "instance") and checking if it's valid
//! according to a [`SchemaModel`](../schema/struct.SchemaModel.html).
//!
//! See the docs for [`Validator`](struct.Validator.html) for more.

use crate::format::{self, FormatChecker};
use crate::schema::{SchemaModel, Type};
use crate::vm::validate;
use json_pointer::JsonPointer;
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use url::Url;

/// Validates instances against compiled schemas.
///
/// A `Validator` holds no state besides its configuration, so one validator
/// can be shared freely, including across threads.
#[derive(Debug, Default, Clone)]
pub struct Validator {
    config: Config,
}

impl Validator {
    /// Constructs a new validator using the default configuration.
    pub fn new() -> Self {
        Self::new_with_config(Config::default())
    }

    /// Constructs a new validator using a configuration.
    pub fn new_with_config(config: Config) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Validate an instance against a model.
    ///
    /// Despite the name, a non-empty result is the _successful_ outcome of
    /// validating a bad instance; validation itself cannot fail. Violations
    /// are ordered by the order in which keywords and members were visited,
    /// which is stable for a given model and instance.
    pub fn validate(&self, model: &SchemaModel, instance: &Value) -> Vec<Violation> {
        validate(&self.config, self.config.max_errors, model, instance)
    }

    /// Check whether an instance is valid, stopping at the first violation.
    pub fn is_valid(&self, model: &SchemaModel, instance: &Value) -> bool {
        validate(&self.config, 1, model, instance).is_empty()
    }
}

/// Configuration for how validation should proceed.
#[derive(Clone)]
pub struct Config {
    pub(crate) max_errors: usize,
    pub(crate) assert_formats: bool,
    pub(crate) formats: BTreeMap<String, FormatChecker>,
}

impl Config {
    /// Create a new, default `Config`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the maximum number of violations to produce before stopping
    /// validation. 0, the default value, indicates that all violations should
    /// be produced.
    ///
    /// The limit applies to reported violations only. `anyOf`, `oneOf`,
    /// `not`, `contains` and `if` always evaluate their branches completely.
    ///
    /// A definition reached through several `$ref`s is compiled once but
    /// evaluated once per path that reaches it. Schemas that fan out through
    /// shared definitions (an `allOf` of two refs to a definition that does
    /// the same, and so on) cost time exponential in the nesting depth. The
    /// limit bounds the size of the result, not the work done inside the
    /// branches above.
    pub fn max_errors(&mut self, max_errors: usize) -> &mut Self {
        self.max_errors = max_errors;
        self
    }

    /// Sets whether the `format` keyword is asserted. The default is to treat
    /// it as an annotation, as Draft 7 does.
    pub fn assert_formats(&mut self, assert_formats: bool) -> &mut Self {
        self.assert_formats = assert_formats;
        self
    }

    /// Registers a checker for a format name, replacing any existing one.
    pub fn format(&mut self, name: &str, checker: FormatChecker) -> &mut Self {
        self.formats.insert(name.to_owned(), checker);
        self
    }

    pub(crate) fn format_checker(&self, name: &str) -> Option<FormatChecker> {
        if self.assert_formats {
            self.formats.get(name).copied()
        } else {
            None
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_errors: 0,
            assert_formats: false,
            formats: format::builtin(),
        }
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("Config")
            .field("max_errors", &self.max_errors)
            .field("assert_formats", &self.assert_formats)
            .field("formats", &self.formats.keys().collect::<Vec<_>>())
            .finish()
    }
}

/// One step from a value to one of its children.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(untagged)]
pub enum PathToken {
    /// A property name.
    Key(String),
    /// An array index.
    Index(usize),
}

impl fmt::Display for PathToken {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            PathToken::Key(key) => f.write_str(key),
            PathToken::Index(index) => write!(f, "{}", index),
        }
    }
}

impl From<&str> for PathToken {
    fn from(key: &str) -> Self {
        PathToken::Key(key.to_owned())
    }
}

impl From<usize> for PathToken {
    fn from(index: usize) -> Self {
        PathToken::Index(index)
    }
}

/// Which side of a range a limit bounds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum RangeBound {
    Minimum,
    ExclusiveMinimum,
    Maximum,
    ExclusiveMaximum,
}

/// Whether a count limit is a lower or an upper bound.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum CountBound {
    Min,
    Max,
}

/// What kind of constraint an instance broke.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "kind")]
pub enum ViolationKind {
    /// The schema was `false`.
    FalseSchema,
    TypeMismatch {
        expected: Vec<Type>,
        found: Type,
    },
    EnumViolation,
    ConstViolation,
    RangeViolation {
        bound: RangeBound,
        limit: f64,
    },
    MultipleOfViolation {
        multiple_of: f64,
    },
    /// `minLength`/`maxLength`, counted in Unicode code points.
    LengthViolation {
        bound: CountBound,
        limit: usize,
    },
    PatternViolation {
        pattern: String,
    },
    FormatViolation {
        format: String,
    },
    ItemCountViolation {
        bound: CountBound,
        limit: usize,
    },
    /// Elements `first` and `second` are equal.
    UniqueItemsViolation {
        first: usize,
        second: usize,
    },
    AdditionalItemNotAllowed {
        index: usize,
    },
    ContainsViolation,
    RequiredPropertyMissing {
        property_name: String,
    },
    AdditionalPropertyNotAllowed {
        property_name: String,
    },
    PropertyCountViolation {
        bound: CountBound,
        limit: usize,
    },
    /// `property_name` is present, so `dependency` must be too.
    DependencyMissing {
        property_name: String,
        dependency: String,
    },
    /// No `anyOf` branch matched. Holds each branch's violations, in branch
    /// order.
    AnyOfViolation {
        branches: Vec<Vec<Violation>>,
    },
    /// `matched` is the number of `oneOf` branches that matched; anything but
    /// one is a violation.
    OneOfViolation {
        matched: usize,
    },
    NotViolation,
}

/// Contains a single problem with an instance when evaluated against a schema.
///
/// Note that, despite its role, `Violation` is not an error in the usual Rust
/// sense. It is an ordinary value describing why some data was
/// unsatisfactory against a given schema.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Violation {
    instance_path: Vec<PathToken>,
    schema_path: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    schema_document: Option<Url>,
    #[serde(flatten)]
    kind: ViolationKind,
    message: String,
}

impl Violation {
    pub fn new(
        instance_path: Vec<PathToken>,
        schema_path: Vec<String>,
        kind: ViolationKind,
        message: String,
    ) -> Violation {
        Violation {
            instance_path,
            schema_path,
            schema_document: None,
            kind,
            message,
        }
    }

    /// The path from the instance root to the rejected value.
    pub fn instance_path(&self) -> &[PathToken] {
        &self.instance_path
    }

    /// Set the document that [`schema_path`](#method.schema_path) is relative to.
    pub fn with_schema_document(mut self, document: Option<Url>) -> Violation {
        self.schema_document = document;
        self
    }

    /// The path to the keyword that rejected the value, within the document
    /// that declares it.
    pub fn schema_path(&self) -> &[String] {
        &self.schema_path
    }

    /// The URL of the document that declares the rejecting keyword. `None`
    /// for the root document when it has no `$id`.
    pub fn schema_document(&self) -> Option<&Url> {
        self.schema_document.as_ref()
    }

    pub fn kind(&self) -> &ViolationKind {
        &self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// [`instance_path`](#method.instance_path) as a JSON Pointer string.
    pub fn instance_pointer(&self) -> String {
        let tokens: Vec<String> = self.instance_path.iter().map(ToString::to_string).collect();
        JsonPointer::<String, Vec<String>>::new(tokens).to_string()
    }

    /// [`schema_path`](#method.schema_path) as a JSON Pointer string.
    pub fn schema_pointer(&self) -> String {
        JsonPointer::<String, &[String]>::new(&self.schema_path).to_string()
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}: {}", self.instance_pointer(), self.message)
    }
}
