//! In-memory class hierarchy
//!
//! Built from `ClassDef`s (by hand or from JSON). The reflexive-transitive
//! supertype closure is computed once at build time so subtype queries are a
//! hash lookup.

use crate::errors::{CallGraphError, Result};
use crate::features::hierarchy::domain::{ClassDef, ClassInfo};
use crate::features::hierarchy::ports::{walk_is_subtype, ClassHierarchy};
use crate::shared::constants::types;
use crate::shared::models::TypeName;
use rustc_hash::{FxHashMap, FxHashSet};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use tracing::debug;

/// Serialized hierarchy document
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HierarchyModel {
    pub classes: Vec<ClassDef>,
}

#[derive(Debug, Default)]
pub struct InMemoryHierarchy {
    classes: BTreeMap<TypeName, ClassInfo>,
    /// Reflexive-transitive supertypes of every class
    supertypes: FxHashMap<TypeName, FxHashSet<TypeName>>,
}

#[derive(Debug, Default)]
pub struct InMemoryHierarchyBuilder {
    defs: Vec<ClassDef>,
}

impl InMemoryHierarchyBuilder {
    pub fn class(mut self, def: ClassDef) -> Self {
        self.defs.push(def);
        self
    }

    pub fn classes(mut self, defs: impl IntoIterator<Item = ClassDef>) -> Self {
        self.defs.extend(defs);
        self
    }

    /// Resolve, validate and close the hierarchy
    pub fn build(self) -> Result<InMemoryHierarchy> {
        let object = TypeName::object();
        let has_object = self.defs.iter().any(|d| d.name == object);
        let default_super = has_object.then_some(&object);

        let mut classes = BTreeMap::new();
        for def in &self.defs {
            let info = ClassInfo::from_def(def, default_super)?;
            if classes.insert(def.name.clone(), info).is_some() {
                return Err(CallGraphError::hierarchy(format!(
                    "class {} defined more than once",
                    def.name
                )));
            }
        }

        for info in classes.values() {
            for sup in info.superclass.iter().chain(info.interfaces.iter()) {
                if !classes.contains_key(sup) {
                    return Err(CallGraphError::hierarchy(format!(
                        "{} refers to unknown supertype {sup}",
                        info.name
                    )));
                }
            }
            if let Some(sup) = &info.superclass {
                if classes.get(sup).is_some_and(|s| s.is_interface) {
                    return Err(CallGraphError::hierarchy(format!(
                        "{} extends interface {sup}",
                        info.name
                    )));
                }
            }
        }

        let mut supertypes = FxHashMap::default();
        for name in classes.keys() {
            let closure = supertype_closure(&classes, name)?;
            supertypes.insert(name.clone(), closure);
        }

        debug!(classes = classes.len(), "Class hierarchy built");
        Ok(InMemoryHierarchy {
            classes,
            supertypes,
        })
    }
}

fn supertype_closure(
    classes: &BTreeMap<TypeName, ClassInfo>,
    start: &TypeName,
) -> Result<FxHashSet<TypeName>> {
    let mut closure = FxHashSet::default();
    let mut stack = vec![start.clone()];
    while let Some(ty) = stack.pop() {
        if !closure.insert(ty.clone()) {
            continue;
        }
        if let Some(info) = classes.get(&ty) {
            for sup in info.superclass.iter().chain(info.interfaces.iter()) {
                if sup == start {
                    return Err(CallGraphError::hierarchy(format!(
                        "cyclic inheritance involving {start}"
                    )));
                }
                stack.push(sup.clone());
            }
        }
    }
    Ok(closure)
}

impl InMemoryHierarchy {
    pub fn builder() -> InMemoryHierarchyBuilder {
        InMemoryHierarchyBuilder::default()
    }

    pub fn from_model(model: HierarchyModel) -> Result<Self> {
        Self::builder().classes(model.classes).build()
    }

    /// Load a `{"classes": [...]}` document
    pub fn from_json(json: &str) -> Result<Self> {
        Self::from_model(serde_json::from_str(json)?)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let raw = std::fs::read_to_string(path.as_ref()).map_err(|e| {
            CallGraphError::hierarchy(format!("cannot read {}: {e}", path.as_ref().display()))
        })?;
        Self::from_json(&raw)
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }
}

impl ClassHierarchy for InMemoryHierarchy {
    fn lookup_class(&self, ty: &TypeName) -> Option<&ClassInfo> {
        self.classes.get(ty)
    }

    fn classes(&self) -> Vec<&ClassInfo> {
        self.classes.values().collect()
    }

    fn is_subtype(&self, sub: &TypeName, sup: &TypeName) -> bool {
        if sub.is_array() || sup.is_array() || sup.as_str() == types::OBJECT {
            return walk_is_subtype(self, sub, sup);
        }
        match self.supertypes.get(sub) {
            Some(closure) => closure.contains(sup),
            None => sub == sup,
        }
    }
}
