//! Library entrypoint for closed-windows.
//!
//! The primary interface is the `closed-windows` binary. The extraction
//! engine (`value` → `heuristics` → `miner` → `assembler` → `collector`)
//! is pure and synchronous; the remaining modules load documents, render
//! results and hand URLs back to the browser.

pub mod assembler;
pub mod collector;
pub mod config;
pub mod heuristics;
pub mod loader;
pub mod miner;
pub mod output;
pub mod present;
pub mod restore;
pub mod value;

pub use assembler::WindowRecord;
pub use collector::collect_windows;
pub use miner::{ExtractOptions, TabRecord};
pub use value::DynamicValue;
