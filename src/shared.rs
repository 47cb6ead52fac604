//! Hot-reloadable access to a compiled model.
//!
//! Validations grab an `Arc` to the current model and keep using it even if a
//! reload happens meanwhile. A reload compiles the new document first and only
//! then swaps the pointer, so readers see either the old or the new model in
//! full.

use crate::errors::SchemaCompileError;
use crate::registry::Registry;
use crate::schema::SchemaModel;
use parking_lot::RwLock;
use serde_json::Value;
use std::sync::Arc;
use tracing::{info, warn};

#[derive(Debug)]
pub struct SharedModel {
    current: RwLock<Arc<SchemaModel>>,
}

impl SharedModel {
    pub fn new(model: SchemaModel) -> Self {
        SharedModel {
            current: RwLock::new(Arc::new(model)),
        }
    }

    /// The model in effect right now.
    pub fn load(&self) -> Arc<SchemaModel> {
        Arc::clone(&self.current.read())
    }

    /// Publish a new model, returning the one it replaced.
    pub fn store(&self, model: SchemaModel) -> Arc<SchemaModel> {
        let nodes = model.nodes().len();
        let previous = std::mem::replace(&mut *self.current.write(), Arc::new(model));
        info!(nodes, "schema model replaced");
        previous
    }

    /// Compile `document` and publish it. On failure the current model stays.
    pub fn reload(&self, document: &Value) -> Result<(), SchemaCompileError> {
        self.reload_with(document, &Registry::new())
    }

    pub fn reload_with(&self, document: &Value, registry: &Registry) -> Result<(), SchemaCompileError> {
        match SchemaModel::compile_with(document, registry) {
            Ok(model) => {
                self.store(model);
                Ok(())
            }
            Err(err) => {
                warn!(error = %err, "schema reload rejected");
                Err(err)
            }
        }
    }
}
