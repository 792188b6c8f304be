//! Well-known names and tunable defaults
//!
//! Runtime library names are given in dotted binary form, which is the form
//! `TypeName` uses everywhere in the engine.

/// Runtime library types the engine needs to recognize
pub mod types {
    pub const OBJECT: &str = "java.lang.Object";
    pub const CLASS: &str = "java.lang.Class";
    pub const STRING: &str = "java.lang.String";
    pub const CONSTRUCTOR: &str = "java.lang.reflect.Constructor";
    pub const METHOD: &str = "java.lang.reflect.Method";
    pub const THROWABLE: &str = "java.lang.Throwable";

    /// Keyword names of the primitive types
    pub const PRIMITIVES: [&str; 8] = [
        "boolean", "byte", "char", "short", "int", "long", "float", "double",
    ];
}

/// Distinguished method names and descriptors
pub mod methods {
    pub const INIT: &str = "<init>";
    pub const CLINIT: &str = "<clinit>";
    pub const NO_ARG_DESCRIPTOR: &str = "()V";
}

/// Synthetic root method that calls entry points and class initializers
pub mod root {
    pub const CLASS: &str = "<synthetic>.FakeRoot";
    pub const NAME: &str = "fakeRootMethod";
    pub const DESCRIPTOR: &str = "()V";
}

/// Capacity hints and thresholds
pub mod capacity {
    /// Initial capacity for node arenas
    pub const INITIAL_NODE_CAPACITY: usize = 256;

    /// Initial capacity for pointer key tables (roughly 16 locals per node)
    pub const INITIAL_POINTER_KEY_CAPACITY: usize = 4096;

    /// Batches of newly discovered nodes smaller than this are lowered sequentially
    pub const PARALLEL_LOWERING_THRESHOLD: usize = 64;

    /// Maximum call-string depth accepted by configuration validation
    pub const MAX_CALL_STRING_DEPTH: usize = 8;
}
