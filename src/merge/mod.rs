// src/merge/mod.rs
pub mod coordinator;

pub use coordinator::{AliasAddOutcome, MergeCoordinator, MergeOutcome};
