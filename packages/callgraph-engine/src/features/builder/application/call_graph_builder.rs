//! Call graph builder
//!
//! Seeds a synthetic root node that calls every entry point, then runs the
//! driver loop: lower newly discovered nodes, deliver engine notifications,
//! propagate one pointer key, and when all three are idle evaluate a
//! quiescence round. The loop ends when a round produces nothing new.

use super::build_state::BuildState;
use crate::config::{AnalysisConfig, ConfigError};
use crate::errors::Result;
use crate::features::builder::domain::{BuildResult, BuildStatus, CancellationToken, Entrypoint};
use crate::features::context::domain::Context;
use crate::features::context::infrastructure::SelectorChain;
use crate::features::context::ports::ContextSelector;
use crate::features::hierarchy::ports::ClassHierarchy;
use crate::features::ir::domain::MethodBody;
use crate::features::ir::infrastructure::BodyBuilder;
use crate::features::ir::ports::IrOracle;
use crate::features::reflection::infrastructure::ReflectionContextSelector;
use crate::shared::constants::root;
use crate::shared::models::{MethodRef, TypeName};
use rustc_hash::FxHashMap;
use std::time::Instant;
use tracing::{debug, info};

/// Whole-program call graph builder
///
/// ```
/// use callgraph_engine::config::AnalysisConfig;
/// use callgraph_engine::features::builder::{CallGraphBuilder, Entrypoint};
/// use callgraph_engine::features::hierarchy::{ClassDef, InMemoryHierarchy, MethodDef};
/// use callgraph_engine::features::ir::{BodyBuilder, InMemoryIr};
/// use callgraph_engine::shared::models::MethodRef;
///
/// let hierarchy = InMemoryHierarchy::builder()
///     .class(ClassDef::new("java.lang.Object").constructor("()V"))
///     .class(ClassDef::new("Main").method(MethodDef::new("main", "()V").as_static()))
///     .build()
///     .unwrap();
/// let main = MethodRef::new("Main", "main", "()V").unwrap();
/// let mut body = BodyBuilder::for_method(&main, true);
/// body.ret_void();
/// let ir = InMemoryIr::new().with(main.clone(), body.build());
///
/// let builder = CallGraphBuilder::new(&hierarchy, &ir, AnalysisConfig::default());
/// let result = builder.build(&[Entrypoint::new(main.clone())]).unwrap();
/// assert!(result.is_complete());
/// assert_eq!(result.call_graph.nodes_for_method(&main).len(), 1);
/// ```
pub struct CallGraphBuilder<'a> {
    hierarchy: &'a dyn ClassHierarchy,
    ir: &'a dyn IrOracle,
    config: AnalysisConfig,
    chain: SelectorChain,
}

impl<'a> CallGraphBuilder<'a> {
    pub fn new(hierarchy: &'a dyn ClassHierarchy, ir: &'a dyn IrOracle, config: AnalysisConfig) -> Self {
        let mut chain = SelectorChain::from_policy(config.context_policy);
        chain.push_front(Box::new(ReflectionContextSelector::new(config.reflection)));
        Self {
            hierarchy,
            ir,
            config,
            chain,
        }
    }

    /// Consult `selector` before every selector already installed
    pub fn with_selector(mut self, selector: Box<dyn ContextSelector>) -> Self {
        self.chain.push_front(selector);
        self
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    pub fn build(&self, entrypoints: &[Entrypoint]) -> Result<BuildResult> {
        self.build_with_cancellation(entrypoints, &CancellationToken::new())
    }

    pub fn build_with_cancellation(&self, entrypoints: &[Entrypoint], token: &CancellationToken) -> Result<BuildResult> {
        let started = Instant::now();
        self.config.validate()?;

        info!(
            entrypoints = entrypoints.len(),
            config = %self.config.describe(),
            selectors = ?self.chain.names(),
            "Building call graph"
        );

        let root_method = MethodRef::new(root::CLASS, root::NAME, root::DESCRIPTOR)?;
        let (root_body, entries) = self.root_body(entrypoints)?;
        let mut state = BuildState::new(
            self.hierarchy,
            self.ir,
            &self.config,
            &self.chain,
            root_method,
            root_body,
            entries,
        )?;

        let status = loop {
            if token.is_cancelled() {
                break BuildStatus::Cancelled;
            }
            let steps = state.count_step();
            if self.config.max_steps.is_some_and(|max| steps > max) {
                break BuildStatus::BudgetExhausted;
            }

            if state.lower_pending()? || state.deliver_notification()? || state.propagate() {
                continue;
            }
            if state.quiescence_round()? {
                continue;
            }
            state.report_unresolved();
            break BuildStatus::Completed;
        };

        state.check_consistency()?;
        let result = state.finish(status, started);

        info!(
            status = ?result.status,
            nodes = result.stats.nodes,
            edges = result.stats.edges,
            warnings = result.warnings.len(),
            duration_ms = result.stats.duration.as_millis() as u64,
            "Call graph built"
        );
        Ok(result)
    }

    /// Synthetic body invoking every entry point with abstract arguments
    fn root_body(&self, entrypoints: &[Entrypoint]) -> Result<(MethodBody, FxHashMap<u32, Context>)> {
        let mut body = BodyBuilder::new(0);
        let mut entries = FxHashMap::default();

        for entry in entrypoints {
            let method = &entry.method;
            let info = self
                .hierarchy
                .method_info(method)
                .ok_or_else(|| ConfigError::Validation(format!("Unknown entry point {method}")))?;
            let is_static = info.is_static();

            let mut args = Vec::with_capacity(method.arity() + 1);
            if !is_static {
                args.push(self.abstract_value(&mut body, method.declaring_class()));
            }
            for ty in method.parameter_types() {
                args.push(self.abstract_value(&mut body, ty));
            }

            entries.insert(body.next_index(), entry.context.clone());
            if is_static {
                body.invoke_static(method, &args);
            } else {
                body.invoke_special(method, &args);
            }
            debug!(entry = %method, context = %entry.context, "Seeded entry point");
        }
        body.ret_void();
        Ok((body.build(), entries))
    }

    fn abstract_value(&self, body: &mut BodyBuilder, ty: &TypeName) -> u32 {
        if let Some(element) = ty.element_type() {
            body.new_array(element, None)
        } else if !ty.is_primitive() && self.hierarchy.is_concrete(ty) {
            body.new_object(ty.clone())
        } else {
            body.opaque()
        }
    }
}
