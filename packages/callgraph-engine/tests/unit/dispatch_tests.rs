//! Ordinary call resolution through the whole builder
//!
//! No reflection here: virtual and interface dispatch, special and static
//! calls, class initialization, field and array flow, exceptions and the
//! context policies.

#[path = "../common/mod.rs"]
mod common;

use callgraph_engine::features::call_graph::{recursive_components, CgNode, EdgeCause};
use callgraph_engine::features::context::{Context, ContextPolicy};
use callgraph_engine::features::hierarchy::{ClassDef, MethodDef};
use callgraph_engine::features::ir::InvokeKind;
use callgraph_engine::features::points_to::{HeapAbstraction, InstanceKey};
use callgraph_engine::shared::models::{FieldRef, MethodRef, TypeName};
use callgraph_engine::{AnalysisConfig, BuildResult, Preset, WarningKind};
use common::*;
use pretty_assertions::assert_eq;
use std::collections::BTreeSet;

fn main_method() -> MethodRef {
    m("Main", "main", "()V")
}

fn main_class() -> ClassDef {
    ClassDef::new("Main").method(MethodDef::new("main", "()V").as_static())
}

fn node(result: &BuildResult, method: &MethodRef) -> CgNode {
    let nodes = nodes_of(&result.call_graph, method);
    assert_eq!(nodes.len(), 1, "expected one node for {method}");
    nodes[0].clone()
}

/// Concrete types a local may point to
fn types_at(result: &BuildResult, node: &CgNode, value: u32) -> BTreeSet<TypeName> {
    let analysis = &result.pointer_analysis;
    analysis
        .points_to_local(node.id, value)
        .into_iter()
        .map(|ik| analysis.instance_key(ik).concrete_type())
        .collect()
}

/// Shape hierarchy with Circle and Square implementing `Shape.area` and `Shape.me`
fn shapes() -> Program {
    let mut program = Program::new()
        .class(
            ClassDef::interface("Shape")
                .method(MethodDef::new("area", "()I").as_abstract())
                .method(MethodDef::new("me", "()LShape;").as_abstract()),
        )
        .class(ClassDef::new("Triangle").implements("Shape").constructor("()V").method(MethodDef::new("area", "()I")));
    for shape in ["Circle", "Square"] {
        program = program
            .class(
                ClassDef::new(shape)
                    .implements("Shape")
                    .constructor("()V")
                    .method(MethodDef::new("area", "()I"))
                    .method(MethodDef::new("me", "()LShape;")),
            )
            .empty_body(&init(shape, "()V"), false)
            .body(&m(shape, "area", "()I"), false, |b| {
                let v = b.opaque();
                b.ret(v);
            })
            .body(&m(shape, "me", "()LShape;"), false, |b| {
                b.ret(b.param(0));
            });
    }
    program
}

// ═══════════════════════════════════════════════════════════════════════════
// Dispatch
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn test_interface_dispatch_follows_points_to() {
    let area = m("Shape", "area", "()I");
    let program = shapes().class(main_class()).body(&main_method(), true, |b| {
        let c = construct(b, "Circle");
        let s = construct(b, "Square");
        let shape = b.phi(&[c, s]);
        b.invoke_interface(&area, &[shape]);
        b.ret_void();
    });
    let result = program.analyze(AnalysisConfig::default(), &main_method());

    assert_calls(&result, &main_method(), &m("Circle", "area", "()I"));
    assert_calls(&result, &main_method(), &m("Square", "area", "()I"));
    assert_not_reachable(&result, &m("Triangle", "area", "()I"));

    let main = node(&result, &main_method());
    let circle = result.call_graph.nodes_for_method(&m("Circle", "area", "()I"))[0];
    let causes: Vec<EdgeCause> = result
        .call_graph
        .edge_provenance(main.id, circle)
        .iter()
        .map(|p| p.cause.clone())
        .collect();
    assert_eq!(causes, vec![EdgeCause::VirtualDispatch]);
}

#[test]
fn test_receiver_formal_gets_only_the_dispatching_object() {
    let me = m("Shape", "me", "()LShape;");
    let program = shapes().class(main_class()).body(&main_method(), true, |b| {
        let c = construct(b, "Circle");
        let s = construct(b, "Square");
        let shape = b.phi(&[c, s]);
        b.invoke_interface(&me, &[shape]);
        b.ret_void();
    });
    let result = program.analyze(AnalysisConfig::default(), &main_method());

    for shape in ["Circle", "Square"] {
        let target = node(&result, &m(shape, "me", "()LShape;"));
        assert_eq!(types_at(&result, &target, 1), BTreeSet::from([TypeName::new(shape)]));
        let returned: BTreeSet<TypeName> = result
            .pointer_analysis
            .types_of(&callgraph_engine::PointerKey::ReturnValue(target.id))
            .into_iter()
            .collect();
        assert_eq!(returned, BTreeSet::from([TypeName::new(shape)]));
    }
}

#[test]
fn test_empty_receiver_yields_no_edge() {
    let area = m("Shape", "area", "()I");
    let program = shapes().class(main_class()).body(&main_method(), true, |b| {
        let unknown = b.opaque();
        b.invoke_interface(&area, &[unknown]);
        b.ret_void();
    });
    let result = program.analyze(AnalysisConfig::default(), &main_method());
    assert!(result.is_complete());
    let main = node(&result, &main_method());
    assert_eq!(result.call_graph.successors(main.id).count(), 0);
    assert!(result.warnings.is_empty());
}

#[test]
fn test_special_call_ignores_overrides() {
    let program = Program::new()
        .class(main_class())
        .class(ClassDef::new("Base").constructor("()V").method(MethodDef::new("f", "()V")))
        .class(ClassDef::new("Derived").extends("Base").constructor("()V").method(MethodDef::new("f", "()V")))
        .empty_body(&init("Derived", "()V"), false)
        .empty_body(&m("Base", "f", "()V"), false)
        .empty_body(&m("Derived", "f", "()V"), false)
        .body(&main_method(), true, |b| {
            let d = construct(b, "Derived");
            b.invoke_special(&m("Base", "f", "()V"), &[d]);
            b.ret_void();
        });
    let result = program.analyze(AnalysisConfig::default(), &main_method());
    assert_reachable(&result, &m("Base", "f", "()V"));
    assert_not_reachable(&result, &m("Derived", "f", "()V"));
}

#[test]
fn test_inherited_static_method_resolves_to_declaration() {
    let program = Program::new()
        .class(main_class())
        .class(
            ClassDef::new("Base")
                .method(MethodDef::new("util", "()V").as_static())
                .method(MethodDef::class_initializer()),
        )
        .class(ClassDef::new("Derived").extends("Base").method(MethodDef::class_initializer()))
        .empty_body(&m("Base", "util", "()V"), true)
        .empty_body(&clinit("Base"), true)
        .empty_body(&clinit("Derived"), true)
        .body(&main_method(), true, |b| {
            b.invoke_static(&m("Derived", "util", "()V"), &[]);
            b.ret_void();
        });
    let result = program.analyze(AnalysisConfig::default(), &main_method());
    assert_reachable(&result, &m("Base", "util", "()V"));
    // the static call initializes the declaring class only
    assert_reachable(&result, &clinit("Base"));
    assert_not_reachable(&result, &clinit("Derived"));
}

// ═══════════════════════════════════════════════════════════════════════════
// Class initialization
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn test_allocation_initializes_superclasses_once() {
    let program = Program::new()
        .class(main_class())
        .class(ClassDef::new("Parent").constructor("()V").method(MethodDef::class_initializer()))
        .class(
            ClassDef::new("Child")
                .extends("Parent")
                .constructor("()V")
                .method(MethodDef::class_initializer()),
        )
        .empty_body(&clinit("Parent"), true)
        .empty_body(&clinit("Child"), true)
        .body(&main_method(), true, |b| {
            b.new_object("Child");
            b.new_object("Child");
            b.ret_void();
        });
    let result = program.analyze(AnalysisConfig::default(), &main_method());
    let graph = &result.call_graph;
    let root = graph.root().unwrap();

    for class in ["Parent", "Child"] {
        let clinits = graph.nodes_for_method(&clinit(class));
        assert_eq!(clinits.len(), 1);
        let node = graph.node(clinits[0]).unwrap();
        assert_eq!(node.context, Context::Everywhere);
        let causes: Vec<EdgeCause> = graph
            .edge_provenance(root, clinits[0])
            .iter()
            .map(|p| p.cause.clone())
            .collect();
        assert_eq!(causes, vec![EdgeCause::ClassInitialization]);
    }
}

#[test]
fn test_unknown_class_allocation_warns() {
    let program = Program::new().class(main_class()).body(&main_method(), true, |b| {
        b.new_object("com.example.Ghost");
        b.ret_void();
    });
    let result = program.analyze(AnalysisConfig::default(), &main_method());
    assert!(result.is_complete());
    assert_warning(&result, WarningKind::UnresolvedClass, "com.example.Ghost");
}

// ═══════════════════════════════════════════════════════════════════════════
// Heap
// ═══════════════════════════════════════════════════════════════════════════

fn boxes() -> Program {
    let value = FieldRef::new("Box", "value");
    let area = m("Shape", "area", "()I");
    shapes()
        .class(main_class())
        .class(ClassDef::new("Box").constructor("()V").field("value"))
        .empty_body(&init("Box", "()V"), false)
        .body(&main_method(), true, move |b| {
            let first = construct(b, "Box");
            let second = construct(b, "Box");
            let c = construct(b, "Circle");
            let s = construct(b, "Square");
            b.put_field(first, &value, c);
            b.put_field(second, &value, s);
            let out = b.get_field(first, &value);
            b.invoke_interface(&area, &[out]);
            b.ret_void();
        })
}

#[test]
fn test_fields_are_separated_by_allocation_site() {
    let result = boxes().analyze(AnalysisConfig::preset(Preset::Balanced), &main_method());
    assert_reachable(&result, &m("Circle", "area", "()I"));
    assert_not_reachable(&result, &m("Square", "area", "()I"));
}

#[test]
fn test_type_based_heap_merges_objects() {
    let config = AnalysisConfig::preset(Preset::Fast);
    assert_eq!(config.heap_abstraction, HeapAbstraction::TypeBased);
    let result = boxes().analyze(config, &main_method());
    assert_reachable(&result, &m("Circle", "area", "()I"));
    assert_reachable(&result, &m("Square", "area", "()I"));

    let boxes: Vec<_> = result
        .pointer_analysis
        .heap()
        .instance_keys()
        .filter(|(_, key)| matches!(key, InstanceKey::TypeBased(ty) if ty.as_str() == "Box"))
        .collect();
    assert_eq!(boxes.len(), 1);
}

#[test]
fn test_static_fields_and_arrays_carry_objects() {
    let registry = FieldRef::new("Main", "registry");
    let area = m("Shape", "area", "()I");
    let program = shapes()
        .class(main_class().static_field("registry"))
        .body(&main_method(), true, move |b| {
            let c = construct(b, "Circle");
            let array = b.new_array("Shape", None);
            b.array_store(array, c);
            let element = b.array_load(array);
            b.put_static(&registry, element);
            let loaded = b.get_static(&registry);
            b.invoke_interface(&area, &[loaded]);
            b.ret_void();
        });
    let result = program.analyze(AnalysisConfig::default(), &main_method());
    assert_reachable(&result, &m("Circle", "area", "()I"));
    assert_not_reachable(&result, &m("Square", "area", "()I"));
}

// ═══════════════════════════════════════════════════════════════════════════
// Exceptions
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn test_thrown_objects_reach_handlers_and_callers() {
    let fail = m("Main", "fail", "()V");
    let relay = m("Main", "relay", "()V");
    let program = Program::new()
        .class(
            main_class()
                .method(MethodDef::new("fail", "()V").as_static())
                .method(MethodDef::new("relay", "()V").as_static()),
        )
        .body(&fail, true, |b| {
            let error = construct(b, THROWABLE);
            b.throw(error);
            b.ret_void();
        })
        .body(&relay, true, |b| {
            b.invoke_static(&fail, &[]);
            b.ret_void();
        })
        .body(&main_method(), true, |b| {
            let (_, caught) = b.invoke_with_handler(InvokeKind::Static, &relay, &[]);
            b.invoke_virtual(&print_stack_trace(), &[caught]);
            b.ret_void();
        });
    let result = program.analyze(AnalysisConfig::default(), &main_method());
    assert_reachable(&result, &print_stack_trace());

    let relay_node = node(&result, &relay);
    let escaping = result
        .pointer_analysis
        .types_of(&callgraph_engine::PointerKey::ExceptionalReturn(relay_node.id));
    assert_eq!(escaping, vec![TypeName::new(THROWABLE)]);
}

// ═══════════════════════════════════════════════════════════════════════════
// Context policies
// ═══════════════════════════════════════════════════════════════════════════

fn identity_program() -> Program {
    let id = m("Main", "id", "(LShape;)LShape;");
    let area = m("Shape", "area", "()I");
    let id_call = id.clone();
    shapes()
        .class(main_class().method(MethodDef::new("id", "(LShape;)LShape;").as_static()))
        .body(&id, true, |b| b.ret(b.param(0)))
        .body(&main_method(), true, move |b| {
            let c = construct(b, "Circle");
            let s = construct(b, "Square");
            let c2 = b.invoke_static(&id_call, &[c]);
            b.invoke_static(&id_call, &[s]);
            b.invoke_interface(&area, &[c2]);
            b.ret_void();
        })
}

#[test]
fn test_insensitive_policy_merges_call_sites() {
    let result = identity_program().analyze(AnalysisConfig::default(), &main_method());
    assert_eq!(nodes_of(&result.call_graph, &m("Main", "id", "(LShape;)LShape;")).len(), 1);
    // both shapes flow back out of the shared node
    assert_reachable(&result, &m("Square", "area", "()I"));
}

#[test]
fn test_call_strings_separate_call_sites() {
    let config = AnalysisConfig::default().context_policy(ContextPolicy::CallString { depth: 1 });
    let result = identity_program().analyze(config, &main_method());
    let ids = nodes_of(&result.call_graph, &m("Main", "id", "(LShape;)LShape;"));
    assert_eq!(ids.len(), 2);
    for id in &ids {
        assert!(matches!(&id.context, Context::CallString(cs) if cs.len() == 1));
    }
    assert_reachable(&result, &m("Circle", "area", "()I"));
    assert_not_reachable(&result, &m("Square", "area", "()I"));
}

#[test]
fn test_recursion_forms_a_component() {
    let spin = m("Main", "spin", "()V");
    let program = Program::new()
        .class(main_class().method(MethodDef::new("spin", "()V").as_static()))
        .body(&spin, true, |b| {
            b.invoke_static(&spin, &[]);
            b.ret_void();
        })
        .body(&main_method(), true, |b| {
            b.invoke_static(&spin, &[]);
            b.ret_void();
        });
    let result = program.analyze(AnalysisConfig::default(), &main_method());
    let spin_node = node(&result, &spin);
    assert_eq!(recursive_components(&result.call_graph), vec![vec![spin_node.id]]);
}
