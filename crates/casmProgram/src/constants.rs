pub use stark_felt::PRIME_HEX;

/// Top-level document keys
pub const BYTECODE_KEY: &str = "bytecode";
pub const COMPILER_VERSION_KEY: &str = "compiler_version";
pub const ENTRY_POINTS_KEY: &str = "entry_points_by_type";
pub const HINTS_KEY: &str = "hints";

/// Entry point object keys
pub const SELECTOR_KEY: &str = "selector";
pub const OFFSET_KEY: &str = "offset";
pub const BUILTINS_KEY: &str = "builtins";

/// Number of elements in a serialized `[index, [hint, ...]]` record
pub const HINT_TUPLE_ARITY: usize = 2;
