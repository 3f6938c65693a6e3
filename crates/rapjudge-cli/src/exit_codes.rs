//! Process exit codes. Part of the CLI contract.

pub const SUCCESS: i32 = 0;
pub const EVALUATION_FAILED: i32 = 1; // Unreadable or empty input, empty panel, record store failure
pub const CONFIG_ERROR: i32 = 2; // Invalid configuration, or internal setup failure (HTTP client)
