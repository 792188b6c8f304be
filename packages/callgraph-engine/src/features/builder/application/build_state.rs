//! Mutable state of one build
//!
//! The call graph and the propagation engine grow together. Invokes of
//! lowered bodies either connect immediately (static and special calls) or
//! register observers on the pointer keys their targets depend on; the
//! engine reports new instance keys through notifications and the state
//! turns them into edges and formal bindings.
//!
//! Decisions that depend on the absence of facts (empty argument sets,
//! relaxed member lookups, the bounded fallback, warnings) are only taken
//! in `quiescence_round`, once nothing is pending anywhere.

use crate::config::AnalysisConfig;
use crate::errors::Result;
use crate::features::builder::domain::{BuildResult, BuildStats, BuildStatus, Diagnostics, Warning, WarningKind};
use crate::features::builder::infrastructure::{
    dispatch_target, edge_cause, static_target, Binding, LoweredBody, LoweredInvoke, LoweredOp, LoweringContext,
};
use crate::features::call_graph::domain::{CallGraph, CgNode, EdgeCause, NodeId};
use crate::features::context::domain::{CallSiteRef, Context};
use crate::features::context::infrastructure::SelectorChain;
use crate::features::context::ports::{DispatchKey, SelectionRequest};
use crate::features::hierarchy::ports::ClassHierarchy;
use crate::features::ir::domain::{InvokeKind, MethodBody};
use crate::features::ir::ports::IrOracle;
use crate::features::points_to::application::PointerAnalysis;
use crate::features::points_to::domain::{
    ConstantValue, HeapAbstraction, InstanceKey, InstanceKeyId, PointerKey, PointerKeyId, Slot,
};
use crate::features::points_to::infrastructure::{Notification, ObserverId, PropagationEngine};
use crate::features::reflection::domain::{ReflectionOptions, ReflectiveOp};
use crate::features::reflection::infrastructure::{
    fallback_targets, site_state, FallbackTarget, MemberLookup, ReflectiveSite, SiteState,
};
use crate::shared::models::{MethodRef, TypeName};
use rustc_hash::{FxHashMap, FxHashSet};
use std::sync::Arc;
use std::time::Instant;
use tracing::debug;

#[cfg(feature = "trace")]
use tracing::trace;

/// What an engine observer stands for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Observer {
    /// Receiver of a dispatched invoke
    Receiver(usize),
    /// Argument a selector keys a static call on
    Parameter { invoke: usize, index: usize },
    LookupName(usize),
    LookupTypes(usize),
    LookupElements { lookup: usize, array: InstanceKeyId },
}

/// Invoke waiting on points-to facts
#[derive(Debug)]
struct InvokeRecord {
    caller: NodeId,
    caller_method: MethodRef,
    caller_context: Context,
    invoke: LoweredInvoke,
    /// Resolved target of a static or special invoke
    target: Option<MethodRef>,
    /// Observed argument of a parameter-keyed invoke
    argument: Option<PointerKeyId>,
}

#[derive(Debug)]
struct LookupRecord {
    node: NodeId,
    lookup: MemberLookup,
    unresolved: Option<String>,
}

#[derive(Debug)]
struct SiteRecord {
    site: ReflectiveSite,
    pointer: PointerKeyId,
}

/// Bounded fallback chosen for one unresolved site
struct Fallback {
    site: usize,
    targets: Vec<FallbackTarget>,
}

pub(crate) struct BuildState<'a> {
    hierarchy: &'a dyn ClassHierarchy,
    ir: &'a dyn IrOracle,
    config: &'a AnalysisConfig,
    chain: &'a SelectorChain,

    engine: PropagationEngine<'a>,
    graph: CallGraph,
    diagnostics: Diagnostics,

    root: NodeId,
    root_body: Arc<MethodBody>,
    /// Context of the entry invoked at each root call site
    entries: FxHashMap<u32, Context>,

    pending: Vec<NodeId>,
    invokes: Vec<InvokeRecord>,
    observers: Vec<Observer>,
    lookups: Vec<LookupRecord>,
    sites: Vec<SiteRecord>,

    initialized: FxHashSet<TypeName>,
    /// Parameter-keyed invokes whose ordinary edge was added
    default_connected: FxHashSet<usize>,
    wired: FxHashSet<(NodeId, Option<u32>, NodeId, Binding)>,

    stats: BuildStats,
}

impl<'a> BuildState<'a> {
    pub(crate) fn new(
        hierarchy: &'a dyn ClassHierarchy,
        ir: &'a dyn IrOracle,
        config: &'a AnalysisConfig,
        chain: &'a SelectorChain,
        root_method: MethodRef,
        root_body: MethodBody,
        entries: FxHashMap<u32, Context>,
    ) -> Result<Self> {
        let mut graph = CallGraph::new();
        let root = graph.add_node(root_method, Context::Everywhere)?;
        graph.set_root(root);

        Ok(Self {
            hierarchy,
            ir,
            config,
            chain,
            engine: PropagationEngine::new(hierarchy, config.worklist_order),
            graph,
            diagnostics: Diagnostics::new(),
            root,
            root_body: Arc::new(root_body),
            entries,
            pending: vec![root],
            invokes: Vec::new(),
            observers: Vec::new(),
            lookups: Vec::new(),
            sites: Vec::new(),
            initialized: FxHashSet::default(),
            default_connected: FxHashSet::default(),
            wired: FxHashSet::default(),
            stats: BuildStats::default(),
        })
    }

    fn options(&self) -> ReflectionOptions {
        self.config.reflection
    }

    pub(crate) fn count_step(&mut self) -> usize {
        self.stats.steps += 1;
        self.stats.steps
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Driver hooks
    // ═══════════════════════════════════════════════════════════════════════

    /// Lower every pending node. Returns false if there was nothing to lower.
    pub(crate) fn lower_pending(&mut self) -> Result<bool> {
        if self.pending.is_empty() {
            return Ok(false);
        }
        let nodes: Vec<CgNode> = std::mem::take(&mut self.pending)
            .into_iter()
            .filter_map(|id| self.graph.node(id).cloned())
            .collect();

        let parallel = self.config.parallel_lowering && nodes.len() >= self.config.parallel_threshold;
        let lowered = {
            let ctx = LoweringContext {
                hierarchy: self.hierarchy,
                ir: self.ir,
                heap: self.engine.heap(),
                options: self.options(),
                heap_abstraction: self.config.heap_abstraction,
                diagnostics: &self.diagnostics,
                root: Some((self.root, Arc::clone(&self.root_body))),
            };
            ctx.lower_batch(&nodes, parallel)
        };

        for (node, body) in nodes.iter().zip(lowered) {
            self.apply_body(node, body)?;
        }
        Ok(true)
    }

    /// Deliver one engine notification. Returns false if none was queued.
    pub(crate) fn deliver_notification(&mut self) -> Result<bool> {
        let Some(notification) = self.engine.pop_notification() else {
            return Ok(false);
        };
        self.handle_notification(notification)?;
        Ok(true)
    }

    pub(crate) fn propagate(&mut self) -> bool {
        self.engine.step()
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Lowered bodies
    // ═══════════════════════════════════════════════════════════════════════

    fn apply_body(&mut self, node: &CgNode, body: LoweredBody) -> Result<()> {
        if body.has_body {
            self.stats.bodies_lowered += 1;
        }
        if body.synthetic.is_some() {
            self.stats.synthetic_bodies += 1;
        }

        for op in body.ops {
            match op {
                LoweredOp::Alloc { dst, key } => {
                    let pk = self.engine.pointer_key(dst);
                    let ik = self.engine.instance_key(key);
                    self.engine.add_points_to(pk, ik);
                }
                LoweredOp::Copy { src, dst, filter } => {
                    let src = self.engine.pointer_key(src);
                    let dst = self.engine.pointer_key(dst);
                    self.engine.add_copy(src, dst, filter);
                }
                LoweredOp::Load { base, slot, dst } => {
                    let base = self.engine.pointer_key(base);
                    let dst = self.engine.pointer_key(dst);
                    self.engine.add_load(base, slot, dst);
                }
                LoweredOp::Store { base, slot, src } => {
                    let base = self.engine.pointer_key(base);
                    let src = self.engine.pointer_key(src);
                    self.engine.add_store(base, slot, src);
                }
                LoweredOp::Initialize(ty) => self.initialize(&ty)?,
                LoweredOp::Lookup(request) => {
                    let index = self.lookups.len();
                    let name = request.name_param.map(|v| PointerKey::local(node.id, v));
                    let types = PointerKey::local(node.id, request.types_param);
                    self.lookups.push(LookupRecord {
                        node: node.id,
                        lookup: MemberLookup::new(request),
                        unresolved: None,
                    });
                    if let Some(name) = name {
                        let pk = self.engine.pointer_key(name);
                        self.observe(pk, Observer::LookupName(index));
                    }
                    let pk = self.engine.pointer_key(types);
                    self.observe(pk, Observer::LookupTypes(index));
                }
                LoweredOp::Invoke(invoke) => self.apply_invoke(node, invoke)?,
            }
        }

        for site in body.reflective_sites {
            let pointer = self.engine.pointer_key(site.key.clone());
            self.stats.reflective_sites += 1;
            self.sites.push(SiteRecord { site, pointer });
        }
        Ok(())
    }

    fn observe(&mut self, pk: PointerKeyId, observer: Observer) {
        let id = self.observers.len() as ObserverId;
        self.observers.push(observer);
        self.engine.observe(pk, id);
    }

    fn apply_invoke(&mut self, node: &CgNode, invoke: LoweredInvoke) -> Result<()> {
        if node.id == self.root {
            return self.connect_entry(invoke);
        }

        if invoke.kind.is_dispatched() {
            let Some(receiver) = invoke.receiver() else {
                return Ok(());
            };
            let pk = self.engine.pointer_key(PointerKey::local(node.id, receiver));
            let index = self.record(node, invoke, None, None);
            self.observe(pk, Observer::Receiver(index));
            return Ok(());
        }

        let Some(target) = static_target(self.hierarchy, invoke.kind, &invoke.target) else {
            debug!(caller = %node.method, target = %invoke.target, "Unresolved static call");
            return Ok(());
        };

        if target.is_class_initializer() {
            let class = target.declaring_class().clone();
            self.initialized.insert(class.clone());
            if let Some(parent) = self.hierarchy.lookup_class(&class).and_then(|c| c.superclass.clone()) {
                self.initialize(&parent)?;
            }
        } else if invoke.kind.is_static() {
            self.initialize(target.declaring_class())?;
        }

        if let Some(index) = self.chain.relevant_parameter(&target) {
            if let Some(arg) = invoke.args.get(invoke.position_of(index)).copied() {
                let pk = self.engine.pointer_key(PointerKey::local(node.id, arg));
                let record = self.record(node, invoke, Some(target), Some(pk));
                self.observe(pk, Observer::Parameter { invoke: record, index });
                return Ok(());
            }
        }

        let context = self.select(&node.context, &node.method, invoke.site, &target, None);
        let cause = edge_cause(&node.method, &node.context, invoke.kind, false);
        self.connect(node.id, &invoke, &target, context, Binding::All, cause)?;
        Ok(())
    }

    fn record(&mut self, node: &CgNode, invoke: LoweredInvoke, target: Option<MethodRef>, argument: Option<PointerKeyId>) -> usize {
        self.invokes.push(InvokeRecord {
            caller: node.id,
            caller_method: node.method.clone(),
            caller_context: node.context.clone(),
            invoke,
            target,
            argument,
        });
        self.invokes.len() - 1
    }

    fn connect_entry(&mut self, invoke: LoweredInvoke) -> Result<()> {
        let context = self.entries.get(&invoke.site).cloned().unwrap_or_default();
        let target = invoke.target.clone();
        if invoke.kind.is_static() {
            self.initialize(target.declaring_class())?;
        }
        let id = self.connect(self.root, &invoke, &target, context, Binding::All, EdgeCause::EntryPoint)?;
        self.graph.add_entry_node(id);
        Ok(())
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Edges
    // ═══════════════════════════════════════════════════════════════════════

    fn select(
        &self,
        caller_context: &Context,
        caller_method: &MethodRef,
        site: u32,
        callee: &MethodRef,
        dispatch_key: Option<DispatchKey>,
    ) -> Context {
        let site = CallSiteRef::new(caller_method.clone(), site);
        self.chain.select(&SelectionRequest {
            caller_context,
            site: &site,
            callee,
            dispatch_key,
            heap: self.engine.heap(),
        })
    }

    fn find_or_create(&mut self, method: &MethodRef, context: &Context) -> Result<NodeId> {
        let (id, created) = self.graph.find_or_create(method, context)?;
        if created {
            debug!(node = %id, method = %method, context = %context, "Discovered node");
            self.pending.push(id);
        }
        Ok(id)
    }

    /// Edge from `caller` to (callee, context) plus argument, return and
    /// exception flow
    fn connect(
        &mut self,
        caller: NodeId,
        invoke: &LoweredInvoke,
        callee: &MethodRef,
        context: Context,
        binding: Binding,
        cause: EdgeCause,
    ) -> Result<NodeId> {
        // class initializers run once per class, whatever triggered them
        let context = if callee.is_class_initializer() {
            Context::Everywhere
        } else {
            context
        };
        let id = self.find_or_create(callee, &context)?;
        self.graph.add_edge(caller, Some(invoke.site), id, cause);

        if !self.wired.insert((caller, Some(invoke.site), id, binding)) {
            return Ok(id);
        }

        for (position, arg) in invoke.args.iter().enumerate() {
            if binding.skipped() == Some(position) {
                continue;
            }
            let actual = self.engine.pointer_key(PointerKey::local(caller, *arg));
            let formal = self.engine.pointer_key(PointerKey::local(id, position as u32 + 1));
            self.engine.add_copy(actual, formal, None);
        }
        if let Binding::Argument { position, key } = binding {
            let formal = self.engine.pointer_key(PointerKey::local(id, position as u32 + 1));
            self.engine.add_points_to(formal, key);
        }

        if let Some(def) = invoke.def {
            let ret = self.engine.pointer_key(PointerKey::ReturnValue(id));
            let dst = self.engine.pointer_key(PointerKey::local(caller, def));
            self.engine.add_copy(ret, dst, None);
        }
        self.wire_exceptions(caller, invoke.exception, id);
        Ok(id)
    }

    fn wire_exceptions(&mut self, caller: NodeId, handler: Option<u32>, callee: NodeId) {
        let thrown = self.engine.pointer_key(PointerKey::ExceptionalReturn(callee));
        let dst = match handler {
            Some(value) => PointerKey::local(caller, value),
            None => PointerKey::ExceptionalReturn(caller),
        };
        let dst = self.engine.pointer_key(dst);
        self.engine.add_copy(thrown, dst, None);
    }

    /// Root edges to the class initializers of `ty` and its superclasses
    fn initialize(&mut self, ty: &TypeName) -> Result<()> {
        if ty.is_array() || ty.is_primitive() {
            return Ok(());
        }
        for class in self.hierarchy.superclass_chain(ty) {
            if !self.initialized.insert(class.clone()) {
                break;
            }
            if let Some(clinit) = self.hierarchy.class_initializer(&class) {
                let id = self.find_or_create(&clinit, &Context::Everywhere)?;
                self.graph.add_edge(self.root, None, id, EdgeCause::ClassInitialization);
            }
        }
        Ok(())
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Notifications
    // ═══════════════════════════════════════════════════════════════════════

    fn handle_notification(&mut self, notification: Notification) -> Result<()> {
        let Some(observer) = self.observers.get(notification.observer as usize).copied() else {
            return Ok(());
        };
        match observer {
            Observer::Receiver(index) => {
                for key in notification.keys {
                    self.dispatch_receiver(index, key)?;
                }
            }
            Observer::Parameter { invoke, index } => {
                for key in notification.keys {
                    self.dispatch_parameter(invoke, index, key)?;
                }
            }
            Observer::LookupName(lookup) => {
                for key in notification.keys {
                    let record = &mut self.lookups[lookup];
                    record.lookup.add_name(self.engine.heap().instance_key(key));
                }
                self.emit_strict(lookup);
            }
            Observer::LookupTypes(lookup) => {
                for key in notification.keys {
                    let record = &mut self.lookups[lookup];
                    if record.lookup.add_types(key, self.engine.heap().instance_key(key)) {
                        let contents = self.engine.pointer_key(PointerKey::ArrayContents(key));
                        self.observe(contents, Observer::LookupElements { lookup, array: key });
                    }
                }
                self.emit_strict(lookup);
            }
            Observer::LookupElements { lookup, array } => {
                for key in notification.keys {
                    let record = &mut self.lookups[lookup];
                    record.lookup.add_element(array, self.engine.heap().instance_key(key));
                }
                self.emit_strict(lookup);
            }
        }
        Ok(())
    }

    fn dispatch_receiver(&mut self, index: usize, key: InstanceKeyId) -> Result<()> {
        let record = &self.invokes[index];
        let receiver_type = self.engine.heap().instance_type(key);
        let Some(target) = dispatch_target(self.hierarchy, &receiver_type, &record.invoke.target) else {
            return Ok(());
        };
        let (caller, invoke) = (record.caller, record.invoke.clone());
        let (caller_method, caller_context) = (record.caller_method.clone(), record.caller_context.clone());

        #[cfg(feature = "trace")]
        trace!(caller = %caller, receiver = %receiver_type, target = %target, "Dispatch");

        let context = self.select(
            &caller_context,
            &caller_method,
            invoke.site,
            &target,
            Some(DispatchKey::Receiver(key)),
        );
        let cause = edge_cause(&caller_method, &caller_context, invoke.kind, false);
        self.connect(caller, &invoke, &target, context, Binding::receiver(key), cause)?;
        Ok(())
    }

    fn dispatch_parameter(&mut self, index: usize, parameter: usize, key: InstanceKeyId) -> Result<()> {
        let record = &self.invokes[index];
        let Some(target) = record.target.clone() else {
            return Ok(());
        };
        let (caller, invoke) = (record.caller, record.invoke.clone());
        let (caller_method, caller_context) = (record.caller_method.clone(), record.caller_context.clone());

        let context = self.select(
            &caller_context,
            &caller_method,
            invoke.site,
            &target,
            Some(DispatchKey::Parameter { index: parameter, key }),
        );
        let cause = edge_cause(&caller_method, &caller_context, invoke.kind, false);
        if context.keyed_instance() == Some(key) {
            let binding = Binding::Argument {
                position: invoke.position_of(parameter),
                key,
            };
            self.connect(caller, &invoke, &target, context, binding, cause)?;
        } else if self.default_connected.insert(index) {
            let context = self.select(&caller_context, &caller_method, invoke.site, &target, None);
            self.connect(caller, &invoke, &target, context, Binding::All, cause)?;
        }
        Ok(())
    }

    fn emit_strict(&mut self, lookup: usize) {
        let matches = self.lookups[lookup].lookup.strict_matches();
        self.emit_members(lookup, matches);
    }

    fn emit_members(&mut self, lookup: usize, members: Vec<MethodRef>) {
        if members.is_empty() {
            return;
        }
        let node = self.lookups[lookup].node;
        let ret = self.engine.pointer_key(PointerKey::ReturnValue(node));
        for member in members {
            debug!(node = %node, member = %member, "Resolved reflective member");
            let key = self.engine.instance_key(InstanceKey::Constant(ConstantValue::Method(member)));
            self.engine.add_points_to(ret, key);
        }
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Quiescence
    // ═══════════════════════════════════════════════════════════════════════

    /// Evaluate deferred decisions against the quiescent facts. Returns true
    /// if they produced anything new.
    pub(crate) fn quiescence_round(&mut self) -> Result<bool> {
        debug_assert!(self.pending.is_empty() && self.engine.is_quiescent());
        self.stats.quiescence_rounds += 1;
        let edges_before = self.graph.edge_count();

        // Decide everything from the same state before applying anything
        let defaults: Vec<usize> = self
            .invokes
            .iter()
            .enumerate()
            .filter(|(i, r)| {
                r.argument.is_some_and(|pk| self.engine.points_to(pk).is_empty())
                    && !self.default_connected.contains(i)
            })
            .map(|(i, _)| i)
            .collect();

        let options = self.options();
        let mut relaxed = Vec::new();
        for (index, record) in self.lookups.iter_mut().enumerate() {
            let result = record.lookup.relaxed_matches(options);
            record.unresolved = result.unresolved;
            relaxed.push((index, result.matches));
        }

        let fallbacks = if options.allows_fallback() {
            self.plan_fallbacks()
        } else {
            Vec::new()
        };

        debug!(
            round = self.stats.quiescence_rounds,
            defaults = defaults.len(),
            fallbacks = fallbacks.len(),
            "Quiescence round"
        );

        for index in defaults {
            self.connect_default(index)?;
        }
        for (index, matches) in relaxed {
            self.emit_members(index, matches);
        }
        for fallback in fallbacks {
            self.apply_fallback(fallback)?;
        }

        Ok(!self.pending.is_empty() || !self.engine.is_quiescent() || self.graph.edge_count() != edges_before)
    }

    fn connect_default(&mut self, index: usize) -> Result<()> {
        self.default_connected.insert(index);
        let record = &self.invokes[index];
        let Some(target) = record.target.clone() else {
            return Ok(());
        };
        let (caller, invoke) = (record.caller, record.invoke.clone());
        let (caller_method, caller_context) = (record.caller_method.clone(), record.caller_context.clone());
        let context = self.select(&caller_context, &caller_method, invoke.site, &target, None);
        let cause = edge_cause(&caller_method, &caller_context, invoke.kind, false);
        self.connect(caller, &invoke, &target, context, Binding::All, cause)?;
        Ok(())
    }

    fn site_state(&self, record: &SiteRecord) -> SiteState {
        let heap = self.engine.heap();
        site_state(
            record.site.op,
            self.engine.points_to(record.pointer).iter().map(|ik| heap.instance_key(ik)),
        )
    }

    fn plan_fallbacks(&self) -> Vec<Fallback> {
        let candidates: Vec<usize> = self
            .sites
            .iter()
            .enumerate()
            .filter(|(_, r)| r.site.op.is_instantiation() && r.site.bound.is_some())
            .filter(|(_, r)| self.site_state(r).has_unresolved_keys())
            .map(|(i, _)| i)
            .collect();
        if candidates.is_empty() {
            return Vec::new();
        }

        let reachable: FxHashSet<&TypeName> = self.graph.methods().map(MethodRef::declaring_class).collect();
        candidates
            .into_iter()
            .filter_map(|index| {
                let site = &self.sites[index].site;
                let bound = site.bound.as_ref()?;
                let targets = fallback_targets(site.op, bound, self.hierarchy, |ty| reachable.contains(ty));
                (!targets.is_empty()).then_some(Fallback { site: index, targets })
            })
            .collect()
    }

    fn apply_fallback(&mut self, fallback: Fallback) -> Result<()> {
        let site = self.sites[fallback.site].site.clone();
        let Some(bound) = site.bound.clone() else {
            return Ok(());
        };
        let Some((caller_method, caller_context)) =
            self.graph.node(site.caller).map(|n| (n.method.clone(), n.context.clone()))
        else {
            return Ok(());
        };
        let invoke = LoweredInvoke {
            site: site.site,
            kind: InvokeKind::Special,
            target: site.target.clone(),
            args: Vec::new(),
            def: None,
            exception: site.exception,
        };

        for target in fallback.targets {
            let key = match self.config.heap_abstraction {
                HeapAbstraction::TypeBased => InstanceKey::TypeBased(target.class.clone()),
                HeapAbstraction::AllocationSite => InstanceKey::AllocationSite {
                    node: site.caller,
                    site: site.site,
                    ty: target.class.clone(),
                    length: None,
                },
            };
            let object = self.engine.instance_key(key);
            if let Some(def) = site.def {
                let dst = self.engine.pointer_key(PointerKey::local(site.caller, def));
                self.engine.add_points_to(dst, object);
            }
            self.initialize(&target.class)?;

            for constructor in &target.constructors {
                let context = self.select(
                    &caller_context,
                    &caller_method,
                    site.site,
                    constructor,
                    Some(DispatchKey::Receiver(object)),
                );
                let cause = EdgeCause::ReflectiveFallback {
                    op: site.op,
                    bound: bound.clone(),
                };
                let id = self.connect(site.caller, &invoke, constructor, context, Binding::receiver(object), cause)?;

                // Constructor.newInstance(Object[]) spreads the array over the formals
                if site.op == ReflectiveOp::ConstructorNewInstance {
                    if let Some(array) = site.args.get(1).copied() {
                        let base = self.engine.pointer_key(PointerKey::local(site.caller, array));
                        for j in 0..constructor.arity() {
                            let formal = self.engine.pointer_key(PointerKey::local(id, j as u32 + 2));
                            self.engine.add_load(base, Slot::ArrayContents, formal);
                        }
                    }
                }
            }
        }
        Ok(())
    }

    /// Warnings for sites and lookups still unresolved at the final fixpoint
    pub(crate) fn report_unresolved(&mut self) {
        let full = self.options().allows_fallback();
        for record in &self.sites {
            if !self.site_state(record).has_unresolved_keys() {
                continue;
            }
            let site = &record.site;
            let message = if full && site.op.is_instantiation() {
                if site.bound.is_some() {
                    continue;
                }
                format!("{} target is not constant and has no static bound; dropped", site.op)
            } else {
                format!("{} argument is not constant", site.op)
            };
            self.diagnostics
                .report(Warning::new(WarningKind::UnresolvedReflectiveTarget, message).at(self.describe_site(site)));
        }

        for record in &self.lookups {
            if let Some(reason) = &record.unresolved {
                let at = self
                    .graph
                    .node(record.node)
                    .map(|n| format!("{} [{}]", n.method, n.context))
                    .unwrap_or_else(|| record.node.to_string());
                self.diagnostics
                    .report(Warning::new(WarningKind::UnresolvedReflectiveTarget, reason.clone()).at(at));
            }
        }
    }

    fn describe_site(&self, site: &ReflectiveSite) -> String {
        match self.graph.node(site.caller) {
            Some(n) => format!("{}#{} [{}]", n.method, site.site, n.context),
            None => site.describe(),
        }
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Result
    // ═══════════════════════════════════════════════════════════════════════

    pub(crate) fn check_consistency(&self) -> Result<()> {
        self.graph.check_consistency()
    }

    pub(crate) fn finish(self, status: BuildStatus, started: Instant) -> BuildResult {
        let mut stats = self.stats;
        stats.nodes = self.graph.node_count();
        stats.edges = self.graph.edge_count();
        stats.propagations = self.engine.stats().propagations;
        stats.duration = started.elapsed();

        let warnings = self.diagnostics.drain();
        let (heap, sets, engine_stats) = self.engine.into_parts();
        stats.instance_keys = heap.instance_count();
        stats.pointer_keys = heap.pointer_count();

        BuildResult {
            status,
            call_graph: self.graph,
            pointer_analysis: PointerAnalysis::new(heap, sets, engine_stats),
            warnings,
            stats,
        }
    }
}
