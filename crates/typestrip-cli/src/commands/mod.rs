pub mod spans;
pub mod strip;
pub mod version;

/// Schema version of the JSON documents printed with `--json`.
pub const OUTPUT_SCHEMA_VERSION: u32 = 1;
