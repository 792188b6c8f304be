//! In-memory IR oracle

use crate::errors::Result;
use crate::features::ir::domain::MethodBody;
use crate::features::ir::ports::IrOracle;
use crate::shared::models::MethodRef;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// One method and its body in a serialized program
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MethodBodyEntry {
    pub method: MethodRef,
    pub body: MethodBody,
}

/// Serialized IR document
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IrModel {
    pub bodies: Vec<MethodBodyEntry>,
}

#[derive(Debug, Default, Clone)]
pub struct InMemoryIr {
    bodies: FxHashMap<MethodRef, Arc<MethodBody>>,
}

impl InMemoryIr {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a body, replacing any earlier one
    pub fn insert(&mut self, method: MethodRef, body: MethodBody) {
        self.bodies.insert(method, Arc::new(body));
    }

    pub fn with(mut self, method: MethodRef, body: MethodBody) -> Self {
        self.insert(method, body);
        self
    }

    pub fn from_model(model: IrModel) -> Self {
        let mut ir = Self::new();
        for entry in model.bodies {
            ir.insert(entry.method, entry.body);
        }
        ir
    }

    /// Load a `{"bodies": [{"method": ..., "body": ...}]}` document
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(Self::from_model(serde_json::from_str(json)?))
    }

    pub fn len(&self) -> usize {
        self.bodies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bodies.is_empty()
    }
}

impl IrOracle for InMemoryIr {
    fn body(&self, method: &MethodRef) -> Option<Arc<MethodBody>> {
        self.bodies.get(method).cloned()
    }
}
