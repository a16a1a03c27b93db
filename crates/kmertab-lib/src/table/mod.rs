//! Sparse-to-dense table materialization
//!
//! Building a table is a two-phase operation:
//! 1. Ingest every count tuple into a [`MatrixTableBuilder`], sequentially
//!    or in parallel chunks merged in input order
//! 2. [`MatrixTableBuilder::finish`] fixes the column order and hands back an
//!    immutable [`MatrixTable`] whose rows can be iterated or written out
//!
//! No row is produced before the last tuple has been ingested.

pub mod builder;
pub mod config;
pub mod matrix;
pub mod reader;

pub use builder::MatrixTableBuilder;
pub use config::{IdentifierPolicy, TableConfiguration};
pub use matrix::MatrixTable;
pub use reader::{read_tuple_file, read_tuples};
