//! Miniature runtime library
//!
//! Just enough of `java.lang` and `java.lang.reflect` for the reflective
//! API methods to resolve. Library bodies are only used by nodes in ordinary
//! contexts (e.g. every reflective call under `ReflectionOptions::None`).

use callgraph_engine::features::hierarchy::{ClassDef, MethodDef};
use callgraph_engine::features::ir::{BodyBuilder, InMemoryIr};
use callgraph_engine::shared::models::MethodRef;

pub const OBJECT: &str = "java.lang.Object";
pub const CLASS: &str = "java.lang.Class";
pub const STRING: &str = "java.lang.String";
pub const INTEGER: &str = "java.lang.Integer";
pub const THROWABLE: &str = "java.lang.Throwable";
pub const CLASS_NOT_FOUND: &str = "java.lang.ClassNotFoundException";
pub const CONSTRUCTOR: &str = "java.lang.reflect.Constructor";
pub const METHOD: &str = "java.lang.reflect.Method";

pub fn m(class: &str, name: &str, descriptor: &str) -> MethodRef {
    MethodRef::new(class, name, descriptor).unwrap()
}

pub fn init(class: &str, descriptor: &str) -> MethodRef {
    m(class, "<init>", descriptor)
}

pub fn clinit(class: &str) -> MethodRef {
    m(class, "<clinit>", "()V")
}

// ═══════════════════════════════════════════════════════════════════════════
// Reflective API
// ═══════════════════════════════════════════════════════════════════════════

pub fn for_name() -> MethodRef {
    m(CLASS, "forName", "(Ljava/lang/String;)Ljava/lang/Class;")
}

pub fn for_name_with_loader() -> MethodRef {
    m(CLASS, "forName", "(Ljava/lang/String;ZLjava/lang/ClassLoader;)Ljava/lang/Class;")
}

pub fn class_new_instance() -> MethodRef {
    m(CLASS, "newInstance", "()Ljava/lang/Object;")
}

pub fn get_declared_constructor() -> MethodRef {
    m(CLASS, "getDeclaredConstructor", "([Ljava/lang/Class;)Ljava/lang/reflect/Constructor;")
}

pub fn get_constructor() -> MethodRef {
    m(CLASS, "getConstructor", "([Ljava/lang/Class;)Ljava/lang/reflect/Constructor;")
}

pub fn get_declared_constructors() -> MethodRef {
    m(CLASS, "getDeclaredConstructors", "()[Ljava/lang/reflect/Constructor;")
}

pub fn get_method() -> MethodRef {
    m(CLASS, "getMethod", "(Ljava/lang/String;[Ljava/lang/Class;)Ljava/lang/reflect/Method;")
}

pub fn get_declared_method() -> MethodRef {
    m(CLASS, "getDeclaredMethod", "(Ljava/lang/String;[Ljava/lang/Class;)Ljava/lang/reflect/Method;")
}

pub fn get_methods() -> MethodRef {
    m(CLASS, "getMethods", "()[Ljava/lang/reflect/Method;")
}

pub fn constructor_new_instance() -> MethodRef {
    m(CONSTRUCTOR, "newInstance", "([Ljava/lang/Object;)Ljava/lang/Object;")
}

pub fn method_invoke() -> MethodRef {
    m(METHOD, "invoke", "(Ljava/lang/Object;[Ljava/lang/Object;)Ljava/lang/Object;")
}

pub fn get_class() -> MethodRef {
    m(OBJECT, "getClass", "()Ljava/lang/Class;")
}

pub fn print_stack_trace() -> MethodRef {
    m(THROWABLE, "printStackTrace", "()V")
}

// ═══════════════════════════════════════════════════════════════════════════
// Library classes and bodies
// ═══════════════════════════════════════════════════════════════════════════

pub fn runtime_classes() -> Vec<ClassDef> {
    vec![
        ClassDef::new(OBJECT)
            .constructor("()V")
            .method(MethodDef::new("getClass", "()Ljava/lang/Class;").as_native())
            .method(MethodDef::new("hashCode", "()I")),
        ClassDef::new(STRING).constructor("()V"),
        ClassDef::new("java.lang.ClassLoader").as_abstract(),
        ClassDef::new(CLASS)
            .method(MethodDef::new("forName", "(Ljava/lang/String;)Ljava/lang/Class;").as_static())
            .method(
                MethodDef::new("forName", "(Ljava/lang/String;ZLjava/lang/ClassLoader;)Ljava/lang/Class;").as_static(),
            )
            .method(MethodDef::new("newInstance", "()Ljava/lang/Object;").as_native())
            .method(MethodDef::new("getDeclaredConstructor", "([Ljava/lang/Class;)Ljava/lang/reflect/Constructor;").as_native())
            .method(MethodDef::new("getConstructor", "([Ljava/lang/Class;)Ljava/lang/reflect/Constructor;").as_native())
            .method(MethodDef::new("getDeclaredConstructors", "()[Ljava/lang/reflect/Constructor;").as_native())
            .method(MethodDef::new("getConstructors", "()[Ljava/lang/reflect/Constructor;").as_native())
            .method(
                MethodDef::new("getDeclaredMethod", "(Ljava/lang/String;[Ljava/lang/Class;)Ljava/lang/reflect/Method;")
                    .as_native(),
            )
            .method(
                MethodDef::new("getMethod", "(Ljava/lang/String;[Ljava/lang/Class;)Ljava/lang/reflect/Method;").as_native(),
            )
            .method(MethodDef::new("getDeclaredMethods", "()[Ljava/lang/reflect/Method;").as_native())
            .method(MethodDef::new("getMethods", "()[Ljava/lang/reflect/Method;").as_native()),
        ClassDef::new(CONSTRUCTOR)
            .method(MethodDef::new("newInstance", "([Ljava/lang/Object;)Ljava/lang/Object;").as_native()),
        ClassDef::new(METHOD).method(
            MethodDef::new("invoke", "(Ljava/lang/Object;[Ljava/lang/Object;)Ljava/lang/Object;").as_native(),
        ),
        ClassDef::new(THROWABLE)
            .constructor("()V")
            .method(MethodDef::new("printStackTrace", "()V")),
        ClassDef::new(CLASS_NOT_FOUND).extends(THROWABLE).constructor("()V"),
        ClassDef::new(INTEGER)
            .constructor("(I)V")
            .static_field("MAX_VALUE")
            .method(MethodDef::class_initializer())
            .method(MethodDef::new("valueOf", "(I)Ljava/lang/Integer;").as_static())
            .method(MethodDef::new("intValue", "()I")),
    ]
}

/// `forName` may fail: it allocates and throws a `ClassNotFoundException`
fn throwing_for_name(method: &MethodRef) -> callgraph_engine::features::ir::MethodBody {
    let mut b = BodyBuilder::for_method(method, true);
    let error = b.new_object(CLASS_NOT_FOUND);
    b.invoke_special(&init(CLASS_NOT_FOUND, "()V"), &[error]);
    b.throw(error);
    let class = b.opaque();
    b.ret(class);
    b.build()
}

fn empty(method: &MethodRef, is_static: bool) -> callgraph_engine::features::ir::MethodBody {
    let mut b = BodyBuilder::for_method(method, is_static);
    b.ret_void();
    b.build()
}

pub fn runtime_bodies(ir: &mut InMemoryIr) {
    ir.insert(for_name(), throwing_for_name(&for_name()));
    ir.insert(for_name_with_loader(), throwing_for_name(&for_name_with_loader()));
    for ctor in [init(OBJECT, "()V"), init(STRING, "()V"), init(THROWABLE, "()V"), init(CLASS_NOT_FOUND, "()V")] {
        ir.insert(ctor.clone(), empty(&ctor, false));
    }
    ir.insert(print_stack_trace(), empty(&print_stack_trace(), false));
    ir.insert(init(INTEGER, "(I)V"), empty(&init(INTEGER, "(I)V"), false));
    ir.insert(clinit(INTEGER), empty(&clinit(INTEGER), true));

    let value_of = m(INTEGER, "valueOf", "(I)Ljava/lang/Integer;");
    let mut b = BodyBuilder::for_method(&value_of, true);
    let boxed = b.new_object(INTEGER);
    b.invoke_special(&init(INTEGER, "(I)V"), &[boxed, b.param(0)]);
    b.ret(boxed);
    ir.insert(value_of, b.build());
}
