// kmertab: dense count tables from sparse (entity, feature, count) tuples
//
// Collects per-(entity, feature) counts produced by an upstream aggregation
// stage and materializes them into a rectangular CSV table.

#![doc = include_str!("../README.md")]
#![warn(missing_docs)]

pub mod call_filter;
pub mod constants;
pub mod error;
pub mod hasher;
pub mod table;
pub mod tuple;

// Re-export common types at crate root
pub use call_filter::{filter_calls, samples_with_variant_of_min_genotype, Variant, VariantCall};
pub use error::TableError;
pub use table::{IdentifierPolicy, MatrixTable, MatrixTableBuilder, TableConfiguration};
pub use tuple::CountTuple;

/// Version information
pub fn version() -> (u8, u8, u8) {
    constants::VERSION
}
