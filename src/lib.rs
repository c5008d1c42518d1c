//! Block Drop (workspace facade crate).
//!
//! Re-exports the workspace crates under one name so the binary, integration
//! tests and benches can use `block_drop::{core, host, term, input, adapter, types}`.

pub use block_drop_adapter as adapter;
pub use block_drop_core as core;
pub use block_drop_host as host;
pub use block_drop_input as input;
pub use block_drop_term as term;
pub use block_drop_types as types;
