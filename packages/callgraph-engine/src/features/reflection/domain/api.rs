//! Recognized reflective API methods
//!
//! Methods are recognized by exact (class, name, descriptor). Overloads that
//! are not listed are ordinary calls.

use crate::features::context::domain::{Context, ContextKind};
use crate::shared::models::MethodRef;
use once_cell::sync::Lazy;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

/// Reflective operation performed by an API method
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum ReflectiveOp {
    /// `Class.forName`
    ForName,
    /// `Class.newInstance()`
    ClassNewInstance,
    /// `Constructor.newInstance(Object[])`
    ConstructorNewInstance,
    /// `getDeclaredConstructor` (declared) / `getConstructor` (public)
    GetConstructor { declared: bool },
    /// `getDeclaredConstructors` / `getConstructors`
    GetConstructors { declared: bool },
    /// `getDeclaredMethod` (declared) / `getMethod` (public, inherited)
    GetMethod { declared: bool },
    /// `getDeclaredMethods` / `getMethods`
    GetMethods { declared: bool },
    /// `Method.invoke(Object, Object[])`
    MethodInvoke,
    /// `Object.getClass()`
    GetClass,
}

type ApiKey = (&'static str, &'static str, &'static str);

/// Method name → [(class, descriptor, op)]
static REFLECTIVE_API: Lazy<FxHashMap<&'static str, Vec<(&'static str, &'static str, ReflectiveOp)>>> = Lazy::new(|| {
    const CLASS: &str = "java.lang.Class";
    let entries: [(ApiKey, ReflectiveOp); 14] = [
        ((CLASS, "forName", "(Ljava/lang/String;)Ljava/lang/Class;"), ReflectiveOp::ForName),
        (
            (CLASS, "forName", "(Ljava/lang/String;ZLjava/lang/ClassLoader;)Ljava/lang/Class;"),
            ReflectiveOp::ForName,
        ),
        ((CLASS, "newInstance", "()Ljava/lang/Object;"), ReflectiveOp::ClassNewInstance),
        (
            ("java.lang.reflect.Constructor", "newInstance", "([Ljava/lang/Object;)Ljava/lang/Object;"),
            ReflectiveOp::ConstructorNewInstance,
        ),
        (
            (CLASS, "getDeclaredConstructor", "([Ljava/lang/Class;)Ljava/lang/reflect/Constructor;"),
            ReflectiveOp::GetConstructor { declared: true },
        ),
        (
            (CLASS, "getConstructor", "([Ljava/lang/Class;)Ljava/lang/reflect/Constructor;"),
            ReflectiveOp::GetConstructor { declared: false },
        ),
        (
            (CLASS, "getDeclaredConstructors", "()[Ljava/lang/reflect/Constructor;"),
            ReflectiveOp::GetConstructors { declared: true },
        ),
        (
            (CLASS, "getConstructors", "()[Ljava/lang/reflect/Constructor;"),
            ReflectiveOp::GetConstructors { declared: false },
        ),
        (
            (CLASS, "getDeclaredMethod", "(Ljava/lang/String;[Ljava/lang/Class;)Ljava/lang/reflect/Method;"),
            ReflectiveOp::GetMethod { declared: true },
        ),
        (
            (CLASS, "getMethod", "(Ljava/lang/String;[Ljava/lang/Class;)Ljava/lang/reflect/Method;"),
            ReflectiveOp::GetMethod { declared: false },
        ),
        (
            (CLASS, "getDeclaredMethods", "()[Ljava/lang/reflect/Method;"),
            ReflectiveOp::GetMethods { declared: true },
        ),
        (
            (CLASS, "getMethods", "()[Ljava/lang/reflect/Method;"),
            ReflectiveOp::GetMethods { declared: false },
        ),
        (
            ("java.lang.reflect.Method", "invoke", "(Ljava/lang/Object;[Ljava/lang/Object;)Ljava/lang/Object;"),
            ReflectiveOp::MethodInvoke,
        ),
        (("java.lang.Object", "getClass", "()Ljava/lang/Class;"), ReflectiveOp::GetClass),
    ];
    let mut table: FxHashMap<&'static str, Vec<_>> = FxHashMap::default();
    for ((class, name, descriptor), op) in entries {
        table.entry(name).or_default().push((class, descriptor, op));
    }
    table
});

impl ReflectiveOp {
    /// Reflective operation performed by `method`, if any
    pub fn classify(method: &MethodRef) -> Option<ReflectiveOp> {
        REFLECTIVE_API.get(method.name())?.iter().find_map(|(class, descriptor, op)| {
            (*class == method.declaring_class().as_str() && *descriptor == method.descriptor())
                .then_some(*op)
        })
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ForName => "forName",
            Self::ClassNewInstance => "Class.newInstance",
            Self::ConstructorNewInstance => "Constructor.newInstance",
            Self::GetConstructor { declared: true } => "getDeclaredConstructor",
            Self::GetConstructor { declared: false } => "getConstructor",
            Self::GetConstructors { declared: true } => "getDeclaredConstructors",
            Self::GetConstructors { declared: false } => "getConstructors",
            Self::GetMethod { declared: true } => "getDeclaredMethod",
            Self::GetMethod { declared: false } => "getMethod",
            Self::GetMethods { declared: true } => "getDeclaredMethods",
            Self::GetMethods { declared: false } => "getMethods",
            Self::MethodInvoke => "Method.invoke",
            Self::GetClass => "getClass",
        }
    }

    /// Receiver is a `java.lang.Class` object
    pub fn has_class_receiver(self) -> bool {
        matches!(
            self,
            Self::ClassNewInstance
                | Self::GetConstructor { .. }
                | Self::GetConstructors { .. }
                | Self::GetMethod { .. }
                | Self::GetMethods { .. }
        )
    }

    /// Receiver is a `Constructor`/`Method` object
    pub fn has_member_receiver(self) -> bool {
        matches!(self, Self::ConstructorNewInstance | Self::MethodInvoke)
    }

    /// Creates an object of a reflectively chosen class
    pub fn is_instantiation(self) -> bool {
        matches!(self, Self::ClassNewInstance | Self::ConstructorNewInstance)
    }

    /// Kind of context a node of this API method gets when resolved
    pub fn context_kind(self) -> ContextKind {
        match self {
            Self::ForName => ContextKind::ConstantParameter,
            Self::GetClass => ContextKind::ReceiverType,
            _ => ContextKind::ReceiverInstance,
        }
    }

    /// The context carries a resolved reflective fact for this operation
    pub fn is_specialized(self, context: &Context) -> bool {
        context.is_a(self.context_kind())
    }
}

impl std::fmt::Display for ReflectiveOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
