//! Class hierarchy model
//!
//! `ClassDef`/`MethodDef`/`FieldDef` are the plain, serde-friendly input form
//! (what a loader or a test writes). `ClassInfo`/`MethodInfo` are the resolved
//! form a hierarchy hands out, with descriptors already parsed.

use crate::errors::Result;
use crate::shared::models::{FieldRef, MethodRef, Selector, TypeName};
use serde::{Deserialize, Serialize};

/// Modifiers of a declared method
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct MethodFlags {
    pub is_static: bool,
    pub is_abstract: bool,
    pub is_public: bool,
    pub is_native: bool,
}

impl Default for MethodFlags {
    fn default() -> Self {
        Self {
            is_static: false,
            is_abstract: false,
            is_public: true,
            is_native: false,
        }
    }
}

/// Declared method, as written by a loader
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MethodDef {
    pub name: String,
    pub descriptor: String,
    #[serde(flatten)]
    pub flags: MethodFlags,
}

impl MethodDef {
    pub fn new(name: impl Into<String>, descriptor: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            descriptor: descriptor.into(),
            flags: MethodFlags::default(),
        }
    }

    /// `<init>` with the given descriptor
    pub fn constructor(descriptor: impl Into<String>) -> Self {
        Self::new("<init>", descriptor)
    }

    /// `<clinit>()V`
    pub fn class_initializer() -> Self {
        Self::new("<clinit>", "()V").as_static()
    }

    pub fn as_static(mut self) -> Self {
        self.flags.is_static = true;
        self
    }

    pub fn as_abstract(mut self) -> Self {
        self.flags.is_abstract = true;
        self
    }

    pub fn as_native(mut self) -> Self {
        self.flags.is_native = true;
        self
    }

    /// Non-public (private, protected or package-private)
    pub fn as_hidden(mut self) -> Self {
        self.flags.is_public = false;
        self
    }
}

/// Declared field
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDef {
    pub name: String,
    #[serde(default)]
    pub is_static: bool,
}

/// Declared class or interface, as written by a loader
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassDef {
    pub name: TypeName,
    /// Defaults to `java.lang.Object` when that class is part of the hierarchy
    #[serde(default)]
    pub superclass: Option<TypeName>,
    #[serde(default)]
    pub interfaces: Vec<TypeName>,
    #[serde(default)]
    pub is_interface: bool,
    #[serde(default)]
    pub is_abstract: bool,
    #[serde(default)]
    pub methods: Vec<MethodDef>,
    #[serde(default)]
    pub fields: Vec<FieldDef>,
}

impl ClassDef {
    pub fn new(name: impl Into<TypeName>) -> Self {
        Self {
            name: name.into(),
            superclass: None,
            interfaces: Vec::new(),
            is_interface: false,
            is_abstract: false,
            methods: Vec::new(),
            fields: Vec::new(),
        }
    }

    pub fn interface(name: impl Into<TypeName>) -> Self {
        let mut def = Self::new(name);
        def.is_interface = true;
        def.is_abstract = true;
        def
    }

    pub fn extends(mut self, superclass: impl Into<TypeName>) -> Self {
        self.superclass = Some(superclass.into());
        self
    }

    pub fn implements(mut self, interface: impl Into<TypeName>) -> Self {
        self.interfaces.push(interface.into());
        self
    }

    pub fn as_abstract(mut self) -> Self {
        self.is_abstract = true;
        self
    }

    pub fn method(mut self, method: MethodDef) -> Self {
        self.methods.push(method);
        self
    }

    /// Public `<init>` with the given descriptor
    pub fn constructor(self, descriptor: impl Into<String>) -> Self {
        self.method(MethodDef::constructor(descriptor))
    }

    pub fn field(mut self, name: impl Into<String>) -> Self {
        self.fields.push(FieldDef {
            name: name.into(),
            is_static: false,
        });
        self
    }

    pub fn static_field(mut self, name: impl Into<String>) -> Self {
        self.fields.push(FieldDef {
            name: name.into(),
            is_static: true,
        });
        self
    }
}

/// Resolved method declaration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodInfo {
    pub reference: MethodRef,
    pub flags: MethodFlags,
}

impl MethodInfo {
    #[inline]
    pub fn is_static(&self) -> bool {
        self.flags.is_static
    }

    #[inline]
    pub fn is_abstract(&self) -> bool {
        self.flags.is_abstract
    }

    #[inline]
    pub fn is_public(&self) -> bool {
        self.flags.is_public
    }

    #[inline]
    pub fn is_native(&self) -> bool {
        self.flags.is_native
    }

    pub fn selector(&self) -> &Selector {
        self.reference.selector()
    }
}

/// Resolved class declaration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassInfo {
    pub name: TypeName,
    pub superclass: Option<TypeName>,
    pub interfaces: Vec<TypeName>,
    pub is_interface: bool,
    pub is_abstract: bool,
    pub methods: Vec<MethodInfo>,
    pub fields: Vec<(FieldRef, bool)>,
}

impl ClassInfo {
    /// Resolve a definition; `default_super` applies when none is declared
    pub fn from_def(def: &ClassDef, default_super: Option<&TypeName>) -> Result<Self> {
        let methods = def
            .methods
            .iter()
            .map(|m| {
                Ok(MethodInfo {
                    reference: MethodRef::new(def.name.clone(), &m.name, &m.descriptor)?,
                    flags: m.flags,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        let superclass = match (&def.superclass, def.is_interface) {
            (Some(sup), _) => Some(sup.clone()),
            (None, false) => default_super.filter(|o| **o != def.name).cloned(),
            (None, true) => None,
        };

        Ok(Self {
            name: def.name.clone(),
            superclass,
            interfaces: def.interfaces.clone(),
            is_interface: def.is_interface,
            is_abstract: def.is_abstract || def.is_interface,
            methods,
            fields: def
                .fields
                .iter()
                .map(|f| (FieldRef::new(def.name.clone(), &f.name), f.is_static))
                .collect(),
        })
    }

    /// Instantiable with `new`
    #[inline]
    pub fn is_concrete(&self) -> bool {
        !self.is_interface && !self.is_abstract
    }

    pub fn declared_method(&self, selector: &Selector) -> Option<&MethodInfo> {
        self.methods.iter().find(|m| m.selector() == selector)
    }

    pub fn declares_field(&self, name: &str) -> bool {
        self.fields.iter().any(|(f, _)| &*f.name == name)
    }

    pub fn constructors(&self) -> impl Iterator<Item = &MethodInfo> + '_ {
        self.methods.iter().filter(|m| m.reference.is_constructor())
    }

    /// Declared methods excluding constructors and the class initializer
    pub fn ordinary_methods(&self) -> impl Iterator<Item = &MethodInfo> + '_ {
        self.methods
            .iter()
            .filter(|m| !m.reference.is_constructor() && !m.reference.is_class_initializer())
    }
}
