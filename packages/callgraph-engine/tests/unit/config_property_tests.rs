//! Property-based tests for analysis configuration
//!
//! Invariants that should hold for all inputs:
//! - Roundtrip: from_yaml_str(to_yaml(x)) == x
//! - Validity: every preset validates, ranges are enforced
//! - Independence: setters only touch their own field

use callgraph_engine::config::{AnalysisConfig, ConfigError, Preset};
use callgraph_engine::features::context::ContextPolicy;
use callgraph_engine::features::points_to::{HeapAbstraction, WorklistOrder};
use callgraph_engine::features::reflection::ReflectionOptions;
use proptest::prelude::*;
use quickcheck::TestResult;
use quickcheck_macros::quickcheck;
use std::io::Write;
use tempfile::NamedTempFile;

fn preset_from(index: u8) -> Preset {
    Preset::all()[index as usize % 3]
}

fn reflection_from(index: u8) -> ReflectionOptions {
    match index % 3 {
        0 => ReflectionOptions::None,
        1 => ReflectionOptions::StringOnly,
        _ => ReflectionOptions::Full,
    }
}

// ============================================================================
// QuickCheck Tests (simpler, faster)
// ============================================================================

#[quickcheck]
fn qc_presets_always_validate(preset: u8, reflection: u8) -> bool {
    AnalysisConfig::preset(preset_from(preset))
        .reflection(reflection_from(reflection))
        .validate()
        .is_ok()
}

#[quickcheck]
fn qc_call_string_depth_range(depth: usize) -> bool {
    let config = AnalysisConfig::default().context_policy(ContextPolicy::CallString { depth });
    config.validate().is_ok() == (1..=8).contains(&depth)
}

#[quickcheck]
fn qc_budget_and_threshold_range(steps: usize, threshold: usize) -> TestResult {
    if steps > 1_000_000_000 {
        return TestResult::discard();
    }
    let config = AnalysisConfig::default()
        .max_steps(Some(steps))
        .parallel_threshold(threshold);
    let expected = steps > 0 && threshold > 0;
    TestResult::from_bool(config.validate().is_ok() == expected)
}

#[quickcheck]
fn qc_yaml_roundtrip(preset: u8, reflection: u8, depth: u8, steps: Option<u32>, seed: u64, parallel: bool) -> TestResult {
    let depth = depth as usize % 9;
    let policy = if depth == 0 {
        ContextPolicy::Insensitive
    } else {
        ContextPolicy::CallString { depth }
    };
    let steps = steps.map(|s| s as usize).filter(|s| *s > 0);

    let config = AnalysisConfig::preset(preset_from(preset))
        .reflection(reflection_from(reflection))
        .context_policy(policy)
        .worklist_order(WorklistOrder::Scrambled { seed })
        .max_steps(steps)
        .parallel_lowering(parallel);
    if config.validate().is_err() {
        return TestResult::discard();
    }

    let yaml = match config.to_yaml() {
        Ok(yaml) => yaml,
        Err(_) => return TestResult::failed(),
    };
    match AnalysisConfig::from_yaml_str(&yaml) {
        Ok(recovered) => TestResult::from_bool(recovered == config),
        Err(_) => TestResult::failed(),
    }
}

#[quickcheck]
fn qc_reflection_option_names_roundtrip(index: u8) -> bool {
    let option = reflection_from(index);
    ReflectionOptions::from_str(option.as_str()) == Ok(option)
        && ReflectionOptions::from_str(&option.as_str().to_lowercase()) == Ok(option)
}

// ============================================================================
// Proptest (setter independence)
// ============================================================================

proptest! {
    #[test]
    fn prop_setters_touch_only_their_field(
        preset in 0u8..3,
        threshold in 1usize..10_000,
        steps in prop::option::of(1usize..1_000_000),
    ) {
        let base = AnalysisConfig::preset(preset_from(preset));
        let changed = base.clone().parallel_threshold(threshold).max_steps(steps);

        prop_assert_eq!(changed.reflection, base.reflection);
        prop_assert_eq!(changed.context_policy, base.context_policy);
        prop_assert_eq!(changed.heap_abstraction, base.heap_abstraction);
        prop_assert_eq!(changed.worklist_order, base.worklist_order);
        prop_assert_eq!(changed.parallel_threshold, threshold);
        prop_assert_eq!(changed.max_steps, steps);
        prop_assert!(changed.validate().is_ok());
    }

    #[test]
    fn prop_unknown_preset_names_are_rejected(name in "[a-z]{1,12}") {
        prop_assume!(!["fast", "balanced", "precise"].contains(&name.as_str()));
        let yaml = format!("version: 1\npreset: {name}\n");
        let is_unknown_preset = matches!(
            AnalysisConfig::from_yaml_str(&yaml),
            Err(ConfigError::UnknownPreset(_))
        );
        prop_assert!(is_unknown_preset);
    }
}

// ============================================================================
// Documents
// ============================================================================

#[test]
fn test_preset_characteristics() {
    let fast = AnalysisConfig::preset(Preset::Fast);
    assert_eq!(fast.heap_abstraction, HeapAbstraction::TypeBased);
    assert_eq!(fast.context_policy, ContextPolicy::Insensitive);

    let precise = AnalysisConfig::preset(Preset::Precise);
    assert_eq!(precise.context_policy.depth(), 1);
    assert_eq!(precise.heap_abstraction, HeapAbstraction::AllocationSite);

    assert_eq!(AnalysisConfig::default(), AnalysisConfig::preset(Preset::Balanced));
    assert_eq!(AnalysisConfig::default().reflection, ReflectionOptions::Full);
}

#[test]
fn test_yaml_file_with_overrides() {
    let yaml = r#"
version: 1
preset: precise
overrides:
  reflection: STRING_ONLY
  max_steps: 100000
  worklist_order: lifo
"#;
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(yaml.as_bytes()).unwrap();

    let config = AnalysisConfig::from_yaml_file(file.path()).unwrap();
    assert_eq!(config.reflection, ReflectionOptions::StringOnly);
    assert_eq!(config.max_steps, Some(100_000));
    assert_eq!(config.worklist_order, WorklistOrder::Lifo);
    assert_eq!(config.context_policy, ContextPolicy::CallString { depth: 1 });
}

// ========== EDGE CASES ==========

#[test]
fn test_unknown_override_field_is_rejected() {
    let yaml = "version: 1\npreset: fast\noverrides:\n  sparkles: true\n";
    assert!(matches!(AnalysisConfig::from_yaml_str(yaml), Err(ConfigError::Yaml(_))));
}

#[test]
fn test_out_of_range_depth_has_hint() {
    let err = AnalysisConfig::default()
        .context_policy(ContextPolicy::CallString { depth: 0 })
        .validate()
        .unwrap_err();
    assert!(matches!(err, ConfigError::Range { .. }));
    assert!(err.to_string().contains("insensitive"));
}
