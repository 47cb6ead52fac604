//! `confschema` compiles [JSON Schema][json-schema] (Draft 7) documents and
//! validates configuration files against them.
//!
//! It covers the keywords configuration schemas actually use: types,
//! enumerations, numeric and string bounds, array and object shape, boolean
//! composition, conditionals and local `$ref`s. It is meant to sit behind a
//! CLI or an editor integration that loads files and formats the results;
//! the crate itself never touches the filesystem or the network.
//!
//! # Validating data
//!
//! Compile a schema once, then validate as many instances as you like:
//!
//! ```
//! use confschema::{compile, validate, PathToken, ViolationKind};
//! use failure::Error;
//! use serde_json::json;
//!
//! fn main() -> Result<(), Error> {
//!     let schema = json!({
//!         "type": "object",
//!         "required": ["commitizen"],
//!         "properties": {
//!             "commitizen": {
//!                 "type": "object",
//!                 "properties": {
//!                     "name": { "type": "string" },
//!                     "version_provider": {
//!                         "enum": ["commitizen", "scm", "pep621", "poetry", "cargo", "npm"]
//!                     },
//!                     "major_version_zero": { "type": "boolean" }
//!                 }
//!             }
//!         }
//!     });
//!
//!     // Problems with the schema itself surface here.
//!     let model = compile(&schema)?;
//!
//!     let ok = json!({ "commitizen": { "name": "cz_conventional_commits" } });
//!     assert!(validate(&model, &ok).is_empty());
//!
//!     // Problems with the instance are returned as data. Every violation
//!     // carries the path to the offending value and to the schema keyword
//!     // that rejected it.
//!     let bad = json!({
//!         "commitizen": {
//!             "version_provider": "maven",
//!             "major_version_zero": "yes"
//!         }
//!     });
//!
//!     let violations = validate(&model, &bad);
//!     assert_eq!(violations.len(), 2);
//!
//!     assert_eq!(violations[0].kind(), &ViolationKind::EnumViolation);
//!     assert_eq!(
//!         violations[0].instance_path(),
//!         &[PathToken::from("commitizen"), PathToken::from("version_provider")]
//!     );
//!     assert_eq!(
//!         violations[0].schema_pointer(),
//!         "/properties/commitizen/properties/version_provider/enum"
//!     );
//!
//!     assert_eq!(violations[1].instance_pointer(), "/commitizen/major_version_zero");
//!
//!     Ok(())
//! }
//! ```
//!
//! # Compile errors
//!
//! A schema with a dangling or cyclic `$ref`, or with a keyword holding the
//! wrong kind of value, fails to compile with a
//! [`SchemaCompileError`](errors/struct.SchemaCompileError.html). There is no
//! partially compiled model to fall back on.
//!
//! # Hot reloading
//!
//! [`SharedModel`](shared/struct.SharedModel.html) holds the current model
//! behind an `Arc`, so a schema can be recompiled and swapped in while other
//! threads keep validating.
//!
//! [json-schema]: https://json-schema.org/specification-links.html#draft-7

mod compiler;
mod vm;

pub mod equality;
pub mod errors;
pub mod format;
pub mod registry;
pub mod schema;
pub mod shared;
pub mod validator;

pub use crate::errors::{CompileErrorKind, SchemaCompileError};
pub use crate::registry::Registry;
pub use crate::schema::{Form, Keywords, NodeId, Schema, SchemaModel, Type};
pub use crate::shared::SharedModel;
pub use crate::validator::{Config, PathToken, Validator, Violation, ViolationKind};

use serde_json::Value;

/// Compile a self-contained schema document.
pub fn compile(document: &Value) -> Result<SchemaModel, SchemaCompileError> {
    SchemaModel::compile(document)
}

/// Validate an instance with the default [`Config`](validator/struct.Config.html).
pub fn validate(model: &SchemaModel, instance: &Value) -> Vec<Violation> {
    Validator::new().validate(model, instance)
}
