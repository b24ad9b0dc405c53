// Fixed names shared by the analyzer and the code generator

/// Name of the static entry routine
pub const ENTRY_METHOD: &str = "main";
/// Declared type of the entry routine's parameter
pub const ENTRY_ARGS_TYPE: &str = "String[]";
/// Descriptor of the entry routine
pub const ENTRY_DESCRIPTOR: &str = "([Ljava/lang/String;)V";

/// Implicit superclass of every class without `extends`
pub const OBJECT_CLASS: &str = "java/lang/Object";
/// Name of the instance initializer routine
pub const INIT_METHOD: &str = "<init>";
pub const INIT_DESCRIPTOR: &str = "()V";

// Printing goes through System.out
pub const SYSTEM_CLASS: &str = "java/lang/System";
pub const OUT_FIELD: &str = "out";
pub const PRINT_STREAM_CLASS: &str = "java/io/PrintStream";
pub const PRINT_STREAM_DESCRIPTOR: &str = "Ljava/io/PrintStream;";
pub const PRINTLN_METHOD: &str = "println";
pub const PRINTLN_INT_DESCRIPTOR: &str = "(I)V";
pub const PRINTLN_OBJECT_DESCRIPTOR: &str = "(Ljava/lang/Object;)V";

/// Owner class emitted for calls whose receiver class cannot be deduced
pub const UNRESOLVED_CLASS: &str = "UnresolvedReceiver";

/// Separator used when naming an inheritance path in diagnostics
pub const HIERARCHY_SEPARATOR: &str = " -> ";
