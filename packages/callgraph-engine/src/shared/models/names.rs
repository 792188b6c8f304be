//! Type, method and field identities
//!
//! All identities are cheap to clone (`Arc` backed) and compare structurally.
//! Type names use the dotted binary form (`java.lang.Integer`, `pkg.Outer$Inner`),
//! arrays append `[]` and primitives use their keyword.

use crate::errors::{CallGraphError, Result};
use crate::shared::constants::{methods, types};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

// ═══════════════════════════════════════════════════════════════════════════
// TypeName
// ═══════════════════════════════════════════════════════════════════════════

/// Dotted binary name of a class, array or primitive type
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TypeName(Arc<str>);

impl TypeName {
    pub fn new(name: impl AsRef<str>) -> Self {
        Self(Arc::from(name.as_ref()))
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn object() -> Self {
        Self::new(types::OBJECT)
    }

    #[inline]
    pub fn is_array(&self) -> bool {
        self.0.ends_with("[]")
    }

    pub fn is_primitive(&self) -> bool {
        types::PRIMITIVES.contains(&self.as_str())
    }

    /// Element type of an array type
    pub fn element_type(&self) -> Option<TypeName> {
        self.0.strip_suffix("[]").map(TypeName::new)
    }

    /// Array type whose elements are `self`
    pub fn array_of(&self) -> TypeName {
        TypeName::new(format!("{}[]", self.0))
    }

    /// Parse a single JVM field descriptor (`I`, `Ljava/lang/Object;`, `[[J`)
    pub fn from_descriptor(descriptor: &str) -> Result<TypeName> {
        let bytes = descriptor.as_bytes();
        let mut pos = 0;
        let ty = parse_field_type(bytes, &mut pos, descriptor)?;
        if pos != bytes.len() {
            return Err(CallGraphError::descriptor(descriptor, "trailing characters"));
        }
        Ok(ty)
    }

    /// Interpret a name as passed to `Class.forName`.
    ///
    /// Accepts dotted class names (`java.lang.Integer`) and array names
    /// (`[Ljava.lang.String;`, `[I`). Returns `None` for strings that cannot name a type.
    pub fn from_binary_name(name: &str) -> Option<TypeName> {
        if name.is_empty() || name.contains('/') || name.contains(char::is_whitespace) {
            return None;
        }
        if name.starts_with('[') {
            return TypeName::from_descriptor(&name.replace('.', "/")).ok();
        }
        if name.split('.').any(str::is_empty) {
            return None;
        }
        Some(TypeName::new(name))
    }
}

impl fmt::Display for TypeName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Debug for TypeName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TypeName({})", self.0)
    }
}

impl From<&str> for TypeName {
    fn from(name: &str) -> Self {
        TypeName::new(name)
    }
}

fn parse_field_type(bytes: &[u8], pos: &mut usize, raw: &str) -> Result<TypeName> {
    let Some(&tag) = bytes.get(*pos) else {
        return Err(CallGraphError::descriptor(raw, "unexpected end of descriptor"));
    };
    *pos += 1;
    let primitive = match tag {
        b'Z' => "boolean",
        b'B' => "byte",
        b'C' => "char",
        b'S' => "short",
        b'I' => "int",
        b'J' => "long",
        b'F' => "float",
        b'D' => "double",
        b'L' => {
            let start = *pos;
            while *pos < bytes.len() && bytes[*pos] != b';' {
                *pos += 1;
            }
            if *pos >= bytes.len() || *pos == start {
                return Err(CallGraphError::descriptor(raw, "unterminated class name"));
            }
            let internal = &raw[start..*pos];
            *pos += 1;
            return Ok(TypeName::new(internal.replace('/', ".")));
        }
        b'[' => return Ok(parse_field_type(bytes, pos, raw)?.array_of()),
        other => {
            return Err(CallGraphError::descriptor(
                raw,
                format!("unknown type tag '{}'", other as char),
            ))
        }
    };
    Ok(TypeName::new(primitive))
}

// ═══════════════════════════════════════════════════════════════════════════
// Selector
// ═══════════════════════════════════════════════════════════════════════════

#[derive(PartialEq, Eq, Hash, PartialOrd, Ord)]
struct SelectorData {
    name: Arc<str>,
    descriptor: Arc<str>,
    params: Vec<TypeName>,
    ret: Option<TypeName>,
}

/// Method name plus descriptor, the unit of overriding
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Selector(Arc<SelectorData>);

impl Selector {
    /// Build a selector, parsing the descriptor once
    pub fn new(name: impl AsRef<str>, descriptor: impl AsRef<str>) -> Result<Self> {
        let descriptor = descriptor.as_ref();
        let bytes = descriptor.as_bytes();
        if bytes.first() != Some(&b'(') {
            return Err(CallGraphError::descriptor(descriptor, "missing '('"));
        }
        let mut pos = 1;
        let mut params = Vec::new();
        while bytes.get(pos) != Some(&b')') {
            if pos >= bytes.len() {
                return Err(CallGraphError::descriptor(descriptor, "missing ')'"));
            }
            params.push(parse_field_type(bytes, &mut pos, descriptor)?);
        }
        pos += 1;
        let ret = if bytes.get(pos) == Some(&b'V') && pos + 1 == bytes.len() {
            None
        } else {
            let ty = parse_field_type(bytes, &mut pos, descriptor)?;
            if pos != bytes.len() {
                return Err(CallGraphError::descriptor(descriptor, "trailing characters"));
            }
            Some(ty)
        };

        let name = name.as_ref();
        if name.is_empty() {
            return Err(CallGraphError::descriptor(descriptor, "empty method name"));
        }

        Ok(Self(Arc::new(SelectorData {
            name: Arc::from(name),
            descriptor: Arc::from(descriptor),
            params,
            ret,
        })))
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.0.name
    }

    #[inline]
    pub fn descriptor(&self) -> &str {
        &self.0.descriptor
    }

    /// Declared parameter types, receiver excluded
    #[inline]
    pub fn parameter_types(&self) -> &[TypeName] {
        &self.0.params
    }

    /// Return type, `None` for `void`
    #[inline]
    pub fn return_type(&self) -> Option<&TypeName> {
        self.0.ret.as_ref()
    }

    pub fn is_constructor(&self) -> bool {
        self.name() == methods::INIT
    }

    pub fn is_class_initializer(&self) -> bool {
        self.name() == methods::CLINIT
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.name(), self.descriptor())
    }
}

impl fmt::Debug for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Selector({self})")
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// MethodRef
// ═══════════════════════════════════════════════════════════════════════════

#[derive(PartialEq, Eq, Hash, PartialOrd, Ord)]
struct MethodRefData {
    declaring: TypeName,
    selector: Selector,
}

/// Method identity: (declaring type, name, descriptor)
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "MethodRefRepr", into = "MethodRefRepr")]
pub struct MethodRef(Arc<MethodRefData>);

impl MethodRef {
    pub fn new(
        declaring: impl Into<TypeName>,
        name: impl AsRef<str>,
        descriptor: impl AsRef<str>,
    ) -> Result<Self> {
        Ok(Self::from_selector(declaring, Selector::new(name, descriptor)?))
    }

    pub fn from_selector(declaring: impl Into<TypeName>, selector: Selector) -> Self {
        Self(Arc::new(MethodRefData {
            declaring: declaring.into(),
            selector,
        }))
    }

    #[inline]
    pub fn declaring_class(&self) -> &TypeName {
        &self.0.declaring
    }

    #[inline]
    pub fn selector(&self) -> &Selector {
        &self.0.selector
    }

    #[inline]
    pub fn name(&self) -> &str {
        self.0.selector.name()
    }

    #[inline]
    pub fn descriptor(&self) -> &str {
        self.0.selector.descriptor()
    }

    #[inline]
    pub fn parameter_types(&self) -> &[TypeName] {
        self.0.selector.parameter_types()
    }

    /// Number of declared parameters, receiver excluded
    #[inline]
    pub fn arity(&self) -> usize {
        self.parameter_types().len()
    }

    pub fn return_type(&self) -> Option<&TypeName> {
        self.0.selector.return_type()
    }

    pub fn is_constructor(&self) -> bool {
        self.0.selector.is_constructor()
    }

    pub fn is_class_initializer(&self) -> bool {
        self.0.selector.is_class_initializer()
    }
}

impl fmt::Display for MethodRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.0.declaring, self.0.selector)
    }
}

impl fmt::Debug for MethodRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<{self}>")
    }
}

#[derive(Serialize, Deserialize)]
struct MethodRefRepr {
    class: TypeName,
    name: String,
    descriptor: String,
}

impl TryFrom<MethodRefRepr> for MethodRef {
    type Error = CallGraphError;

    fn try_from(repr: MethodRefRepr) -> Result<Self> {
        MethodRef::new(repr.class, repr.name, repr.descriptor)
    }
}

impl From<MethodRef> for MethodRefRepr {
    fn from(method: MethodRef) -> Self {
        MethodRefRepr {
            class: method.declaring_class().clone(),
            name: method.name().to_string(),
            descriptor: method.descriptor().to_string(),
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// FieldRef
// ═══════════════════════════════════════════════════════════════════════════

/// Field identity: (declaring type, name)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct FieldRef {
    pub class: TypeName,
    pub name: Arc<str>,
}

impl FieldRef {
    pub fn new(class: impl Into<TypeName>, name: impl AsRef<str>) -> Self {
        Self {
            class: class.into(),
            name: Arc::from(name.as_ref()),
        }
    }
}

impl fmt::Display for FieldRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.class, self.name)
    }
}
