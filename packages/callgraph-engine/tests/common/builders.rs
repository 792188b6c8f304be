//! Program builders
//!
//! `Program` couples user classes with the runtime library fixture, so a test
//! only describes the classes and bodies it is about.

use super::fixtures::{runtime_bodies, runtime_classes, CLASS, OBJECT};
use callgraph_engine::config::AnalysisConfig;
use callgraph_engine::features::builder::{BuildResult, CallGraphBuilder, CancellationToken, Entrypoint};
use callgraph_engine::features::hierarchy::{ClassDef, InMemoryHierarchy};
use callgraph_engine::features::ir::{BodyBuilder, InMemoryIr, ValueId};
use callgraph_engine::shared::models::MethodRef;
use callgraph_engine::Result;

#[derive(Clone)]
pub struct Program {
    classes: Vec<ClassDef>,
    ir: InMemoryIr,
}

impl Default for Program {
    fn default() -> Self {
        Self::new()
    }
}

impl Program {
    /// Empty program on top of the runtime library
    pub fn new() -> Self {
        let mut ir = InMemoryIr::new();
        runtime_bodies(&mut ir);
        Self {
            classes: runtime_classes(),
            ir,
        }
    }

    pub fn class(mut self, def: ClassDef) -> Self {
        self.classes.push(def);
        self
    }

    /// Body of `method`, written by `build` (which must emit the return)
    pub fn body(mut self, method: &MethodRef, is_static: bool, build: impl FnOnce(&mut BodyBuilder)) -> Self {
        let mut b = BodyBuilder::for_method(method, is_static);
        build(&mut b);
        self.ir.insert(method.clone(), b.build());
        self
    }

    /// Body that only returns
    pub fn empty_body(self, method: &MethodRef, is_static: bool) -> Self {
        self.body(method, is_static, |b| b.ret_void())
    }

    pub fn hierarchy(&self) -> InMemoryHierarchy {
        InMemoryHierarchy::builder()
            .classes(self.classes.iter().cloned())
            .build()
            .expect("program hierarchy should be valid")
    }

    pub fn ir(&self) -> &InMemoryIr {
        &self.ir
    }

    pub fn try_analyze(&self, config: AnalysisConfig, entries: &[Entrypoint]) -> Result<BuildResult> {
        let hierarchy = self.hierarchy();
        CallGraphBuilder::new(&hierarchy, &self.ir, config).build(entries)
    }

    /// Build from a single entry in the `Everywhere` context
    pub fn analyze(&self, config: AnalysisConfig, entry: &MethodRef) -> BuildResult {
        self.try_analyze(config, &[Entrypoint::new(entry.clone())])
            .expect("build should succeed")
    }

    pub fn analyze_with_token(&self, config: AnalysisConfig, entry: &MethodRef, token: &CancellationToken) -> BuildResult {
        let hierarchy = self.hierarchy();
        CallGraphBuilder::new(&hierarchy, &self.ir, config)
            .build_with_cancellation(&[Entrypoint::new(entry.clone())], token)
            .expect("build should succeed")
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// Body helpers
// ═══════════════════════════════════════════════════════════════════════════

/// `new Class[] { A.class, B.class, ... }`
pub fn class_array(b: &mut BodyBuilder, classes: &[&str]) -> ValueId {
    let array = b.new_array(CLASS, Some(classes.len() as u32));
    for class in classes {
        let literal = b.class_literal(*class);
        b.array_store(array, literal);
    }
    array
}

/// `new Object[] { v1, v2, ... }`
pub fn object_array(b: &mut BodyBuilder, values: &[ValueId]) -> ValueId {
    let array = b.new_array(OBJECT, Some(values.len() as u32));
    for value in values {
        b.array_store(array, *value);
    }
    array
}

/// `new T()` including the constructor call
pub fn construct(b: &mut BodyBuilder, class: &str) -> ValueId {
    let object = b.new_object(class);
    b.invoke_special(&super::fixtures::init(class, "()V"), &[object]);
    object
}

// ═══════════════════════════════════════════════════════════════════════════
// Sample programs
// ═══════════════════════════════════════════════════════════════════════════

/// Entry of `shapes_program`
pub fn shapes_main() -> MethodRef {
    super::fixtures::m("Main", "main", "()V")
}

/// A program touching every kind of statement: virtual dispatch through
/// fields, statics and arrays, recursion, and each reflective API shape
pub fn shapes_program() -> Program {
    use super::fixtures::*;
    use callgraph_engine::features::hierarchy::MethodDef;
    use callgraph_engine::shared::models::FieldRef;

    let main = shapes_main();
    let visit = m("Main", "visit", "(LShape;)V");
    let spin = m("Main", "spin", "(I)V");
    let area = m("Shape", "area", "()I");
    let next = FieldRef::new("Circle", "next");
    let registry = FieldRef::new("Main", "registry");

    let mut program = Program::new()
        .class(
            ClassDef::new("Main")
                .method(MethodDef::new("main", "()V").as_static())
                .method(MethodDef::new("visit", "(LShape;)V").as_static())
                .method(MethodDef::new("spin", "(I)V").as_static())
                .method(MethodDef::class_initializer())
                .static_field("registry"),
        )
        .class(ClassDef::interface("Shape").method(MethodDef::new("area", "()I").as_abstract()))
        .class(
            ClassDef::new("Loader")
                .method(MethodDef::new("load", "()Ljava/lang/Class;").as_static()),
        )
        .empty_body(&clinit("Main"), true)
        .body(&m("Loader", "load", "()Ljava/lang/Class;"), true, |b| {
            let class = b.new_object(CLASS);
            b.ret(class);
        });

    for shape in ["Circle", "Square", "Triangle", "Hexagon"] {
        let mut def = ClassDef::new(shape)
            .implements("Shape")
            .constructor("()V")
            .method(MethodDef::new("area", "()I"));
        if shape == "Circle" {
            def = def.field("next");
        }
        program = program
            .class(def)
            .empty_body(&init(shape, "()V"), false)
            .body(&m(shape, "area", "()I"), false, |b| {
                let v = b.opaque();
                b.ret(v);
            });
    }

    program
        .body(&main, true, |b| {
            let c = construct(b, "Circle");
            let s = construct(b, "Square");
            b.put_field(c, &next, s);
            let n = b.get_field(c, &next);
            b.put_static(&registry, c);
            let r = b.get_static(&registry);
            let shapes = b.new_array("Shape", Some(2));
            b.array_store(shapes, n);
            b.array_store(shapes, r);
            let e = b.array_load(shapes);
            b.invoke_static(&visit, &[e]);

            // constant reflection
            let name = b.string("Triangle");
            let class = b.invoke_static(&for_name(), &[name]);
            let t = b.invoke_virtual(&class_new_instance(), &[class]);
            let t = b.check_cast(t, "Shape");
            b.invoke_static(&visit, &[t]);

            let circle = b.class_literal("Circle");
            let method_name = b.string("area");
            let types = class_array(b, &[]);
            let method = b.invoke_virtual(&get_method(), &[circle, method_name, types]);
            let args = object_array(b, &[]);
            b.invoke_virtual(&method_invoke(), &[method, c, args]);
            b.invoke_virtual(&get_class(), &[s]);

            // unresolvable reflection with a static bound
            let unknown = b.invoke_static(&m("Loader", "load", "()Ljava/lang/Class;"), &[]);
            let plugin = b.invoke_virtual(&class_new_instance(), &[unknown]);
            let plugin = b.check_cast(plugin, "Shape");
            b.invoke_static(&visit, &[plugin]);

            let depth = b.opaque();
            b.invoke_static(&spin, &[depth]);
            b.ret_void();
        })
        .body(&visit, true, |b| {
            b.invoke_interface(&area, &[b.param(0)]);
            b.ret_void();
        })
        .body(&spin, true, |b| {
            b.invoke_static(&spin, &[b.param(0)]);
            b.ret_void();
        })
}
