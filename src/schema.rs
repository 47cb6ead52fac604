//! Compiled schema representations.
//!
//! A [`SchemaModel`](struct.SchemaModel.html) is an arena of
//! [`Schema`](struct.Schema.html) nodes. Nodes refer to each other through
//! [`NodeId`](struct.NodeId.html) handles, including nodes reached through a
//! `$ref`, so the model never contains shared pointers or cycles.
//!
//! Models are built by [`compile`](../fn.compile.html) and are immutable
//! afterwards. They are `Send + Sync`, so one model can serve validations on
//! many threads at once.

use crate::compiler::Compiler;
use crate::errors::SchemaCompileError;
use crate::registry::Registry;
use regex::Regex;
use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;
use url::Url;

/// A handle to a node inside a [`SchemaModel`](struct.SchemaModel.html).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(pub(crate) usize);

impl NodeId {
    /// The position of the node in the model's node table.
    pub fn index(self) -> usize {
        self.0
    }
}

/// A compiled, immutable schema document.
#[derive(Debug, Clone, PartialEq)]
pub struct SchemaModel {
    pub(crate) nodes: Vec<Schema>,
    pub(crate) root: NodeId,
    /// URL of every document that contributed nodes. Index 0 is the root
    /// document, which has no URL unless it declared an `$id`.
    pub(crate) documents: Vec<Option<Url>>,
}

impl SchemaModel {
    /// Compile a self-contained schema document.
    ///
    /// Equivalent to [`compile_with`](#method.compile_with) with an empty
    /// registry.
    pub fn compile(document: &Value) -> Result<SchemaModel, SchemaCompileError> {
        Self::compile_with(document, &Registry::new())
    }

    /// Compile a schema document whose external `$ref`s point into documents
    /// held by `registry`.
    pub fn compile_with(
        document: &Value,
        registry: &Registry,
    ) -> Result<SchemaModel, SchemaCompileError> {
        Compiler::new(document, registry)?.compile()
    }

    /// The handle of the root schema.
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Get a node by handle.
    ///
    /// Handles are only meaningful for the model that produced them.
    pub fn node(&self, id: NodeId) -> &Schema {
        &self.nodes[id.0]
    }

    /// The root schema node.
    pub fn root_node(&self) -> &Schema {
        self.node(self.root)
    }

    /// All nodes in the model, in compilation order. The root comes last.
    pub fn nodes(&self) -> &[Schema] {
        &self.nodes
    }

    /// The root document's `$id`, if it declared one.
    pub fn id(&self) -> Option<&Url> {
        self.documents[0].as_ref()
    }

    /// The URL of the document a node was compiled from. `None` means the
    /// root document, when it has no `$id`.
    pub fn document_of(&self, id: NodeId) -> Option<&Url> {
        self.documents[self.node(id).document].as_ref()
    }
}

/// A single compiled schema node.
#[derive(Debug, Clone, PartialEq)]
pub struct Schema {
    pub(crate) document: usize,
    pub(crate) location: Vec<String>,
    pub(crate) form: Form,
    pub(crate) extra: Map<String, Value>,
}

impl Schema {
    /// The JSON Pointer tokens of this node within its document.
    pub fn location(&self) -> &[String] {
        &self.location
    }

    /// Get the form of the schema.
    pub fn form(&self) -> &Form {
        &self.form
    }

    /// Keywords that were present on the schema but are not enforced, such as
    /// `title`, `description`, `$schema`, `$comment` or unknown keywords.
    ///
    /// They are kept as-is for tooling built on top of the model.
    pub fn extra(&self) -> &Map<String, Value> {
        &self.extra
    }
}

/// The shapes a compiled schema can take.
#[derive(Debug, Clone, PartialEq)]
pub enum Form {
    /// A boolean schema. `true` accepts everything and `false` nothing.
    Boolean(bool),

    /// A `$ref` schema. Draft 7 ignores the keywords next to `$ref`, so the
    /// node simply defers to its target.
    Ref(Reference),

    /// An object schema with its assertion keywords.
    Keywords(Box<Keywords>),
}

/// A resolved `$ref`.
#[derive(Debug, Clone, PartialEq)]
pub struct Reference {
    /// The `$ref` string as written in the schema.
    pub uri: String,
    /// The node the reference resolved to.
    pub target: NodeId,
}

/// The JSON types the `type` keyword can name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Type {
    Null,
    Boolean,
    Integer,
    Number,
    String,
    Array,
    Object,
}

impl Type {
    pub fn from_name(name: &str) -> Option<Type> {
        match name {
            "null" => Some(Type::Null),
            "boolean" => Some(Type::Boolean),
            "integer" => Some(Type::Integer),
            "number" => Some(Type::Number),
            "string" => Some(Type::String),
            "array" => Some(Type::Array),
            "object" => Some(Type::Object),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Type::Null => "null",
            Type::Boolean => "boolean",
            Type::Integer => "integer",
            Type::Number => "number",
            Type::String => "string",
            Type::Array => "array",
            Type::Object => "object",
        }
    }

    /// The most specific type of a value. Numbers without a fractional part
    /// are `Integer`.
    pub fn of(value: &Value) -> Type {
        match value {
            Value::Null => Type::Null,
            Value::Bool(_) => Type::Boolean,
            Value::Number(n) => {
                if n.is_i64() || n.is_u64() || n.as_f64().map_or(false, |f| f.fract() == 0.0) {
                    Type::Integer
                } else {
                    Type::Number
                }
            }
            Value::String(_) => Type::String,
            Value::Array(_) => Type::Array,
            Value::Object(_) => Type::Object,
        }
    }

    /// Whether a value of type `actual` satisfies this declared type.
    pub fn accepts(self, actual: Type) -> bool {
        self == actual || (self == Type::Number && actual == Type::Integer)
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A `minimum` or `maximum` limit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Limit {
    pub value: f64,
    /// Set by the Draft 4 boolean form of `exclusiveMinimum`/`exclusiveMaximum`.
    pub exclusive: bool,
}

/// A compiled `pattern`. Compared by source text.
#[derive(Debug, Clone)]
pub struct Pattern(pub(crate) Regex);

impl Pattern {
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    /// Unanchored search, as JSON Schema prescribes.
    pub fn is_match(&self, text: &str) -> bool {
        self.0.is_match(text)
    }
}

impl PartialEq for Pattern {
    fn eq(&self, other: &Pattern) -> bool {
        self.as_str() == other.as_str()
    }
}

/// The two forms of the `items` keyword.
#[derive(Debug, Clone, PartialEq)]
pub enum Items {
    /// Every element must satisfy the schema.
    Single(NodeId),
    /// Element `i` must satisfy schema `i`; the rest fall to `additionalItems`.
    Tuple(Vec<NodeId>),
}

/// `additionalProperties` or `additionalItems` when it is not `true`.
#[derive(Debug, Clone, PartialEq)]
pub enum Additional {
    /// `false`: nothing extra is allowed.
    Forbidden,
    /// Extra members must satisfy the schema.
    Schema(NodeId),
}

/// One entry of the `dependencies` keyword.
#[derive(Debug, Clone, PartialEq)]
pub enum Dependency {
    /// If the key is present, these properties must be present too.
    Properties(Vec<String>),
    /// If the key is present, the whole object must satisfy the schema.
    Schema(NodeId),
}

/// The assertion keywords of an object schema.
///
/// Every field is optional; an empty `Keywords` accepts everything.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Keywords {
    pub types: Option<Vec<Type>>,
    pub enumeration: Option<Vec<Value>>,
    pub constant: Option<Value>,

    pub minimum: Option<Limit>,
    pub maximum: Option<Limit>,
    pub exclusive_minimum: Option<f64>,
    pub exclusive_maximum: Option<f64>,
    pub multiple_of: Option<f64>,

    pub min_length: Option<usize>,
    pub max_length: Option<usize>,
    pub pattern: Option<Pattern>,
    pub format: Option<String>,

    pub items: Option<Items>,
    pub additional_items: Option<Additional>,
    pub contains: Option<NodeId>,
    pub min_items: Option<usize>,
    pub max_items: Option<usize>,
    pub unique_items: bool,

    pub properties: BTreeMap<String, NodeId>,
    pub pattern_properties: Vec<(Pattern, NodeId)>,
    pub additional_properties: Option<Additional>,
    pub required: Vec<String>,
    pub min_properties: Option<usize>,
    pub max_properties: Option<usize>,
    pub property_names: Option<NodeId>,
    pub dependencies: BTreeMap<String, Dependency>,

    pub all_of: Vec<NodeId>,
    pub any_of: Vec<NodeId>,
    pub one_of: Vec<NodeId>,
    pub not: Option<NodeId>,

    pub condition: Option<NodeId>,
    pub then: Option<NodeId>,
    pub otherwise: Option<NodeId>,

    /// Compiled so that problems inside them fail compilation; never
    /// evaluated directly.
    pub definitions: BTreeMap<String, NodeId>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn integral_numbers_are_integers() {
        assert_eq!(Type::of(&json!(3)), Type::Integer);
        assert_eq!(Type::of(&json!(3.0)), Type::Integer);
        assert_eq!(Type::of(&json!(-7)), Type::Integer);
        assert_eq!(Type::of(&json!(3.5)), Type::Number);
    }

    #[test]
    fn number_accepts_integers_but_not_the_reverse() {
        assert!(Type::Number.accepts(Type::Integer));
        assert!(!Type::Integer.accepts(Type::Number));
        assert!(!Type::String.accepts(Type::Null));
    }

    #[test]
    fn type_names_roundtrip() {
        for name in &["null", "boolean", "integer", "number", "string", "array", "object"] {
            assert_eq!(Type::from_name(name).map(Type::name), Some(*name));
        }
        assert_eq!(Type::from_name("float"), None);
    }

    #[test]
    fn model_is_thread_safe() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<SchemaModel>();
    }
}
