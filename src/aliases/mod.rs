// src/aliases/mod.rs
pub mod alias_set;
pub mod manager;
pub mod scope_terms;

// Re-export main alias functions for clean API
pub use alias_set::{
    add_original_text_as_alias, merge_aliases, remove_duplicates, validate_scope_constraints,
    AliasAddition, AliasConfig, AliasMergeResult, ScopeValidation,
};
pub use manager::{AliasManager, MergePreparation};
