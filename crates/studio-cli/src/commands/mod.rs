//! Command implementations.

pub mod extract;
pub mod presets;

pub use self::extract::{ensure_ready, execute_extract, run_extraction, write_outputs, RunOptions};
pub use self::presets::execute_presets;
