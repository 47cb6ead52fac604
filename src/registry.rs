//! Caller-supplied documents for external `$ref`s.
//!
//! The compiler never fetches anything. If a schema refers to
//! `https://example.com/common.json#/definitions/name`, the caller parses
//! that document beforehand and adds it to a `Registry`.

use crate::errors::SchemaCompileError;
use serde_json::Value;
use std::collections::HashMap;
use url::Url;

/// Pre-resolved schema documents keyed by absolute URL.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Registry {
    documents: HashMap<Url, Value>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a document under an explicit URL. Any fragment on `url` is
    /// dropped. Returns the document previously stored under that URL.
    pub fn insert(&mut self, mut url: Url, document: Value) -> Option<Value> {
        url.set_fragment(None);
        self.documents.insert(url, document)
    }

    /// Add a document under the URL named by its own `$id`.
    pub fn register(&mut self, document: Value) -> Result<Url, SchemaCompileError> {
        let mut id = document
            .get("$id")
            .and_then(Value::as_str)
            .and_then(|id| Url::parse(id).ok())
            .ok_or_else(|| SchemaCompileError::invalid_keyword("", "$id", "an absolute URL"))?;

        id.set_fragment(None);
        self.insert(id.clone(), document);
        Ok(id)
    }

    /// Look up a document. Fragments on `url` are ignored.
    pub fn get(&self, url: &Url) -> Option<&Value> {
        if url.fragment().is_some() {
            let mut url = url.clone();
            url.set_fragment(None);
            self.documents.get(&url)
        } else {
            self.documents.get(url)
        }
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }
}
