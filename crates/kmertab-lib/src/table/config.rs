//! Table build configuration
//!
//! Parameters for header labelling, identifier handling, parallel ingestion
//! and the scale warning threshold.

use crate::constants::{
    is_plain_identifier, DEFAULT_PARALLEL_CHUNK_SIZE, DEFAULT_ROW_KEY_LABEL,
    DEFAULT_SCALE_WARNING_CELLS, DEFAULT_SEED,
};

/// What to do with identifiers containing a delimiter, quote or line break
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IdentifierPolicy {
    /// Fail the build with an input error
    #[default]
    Reject,
    /// Emit the identifier wrapped in quotes, doubling inner quotes
    Quote,
}

/// Configuration parameters for building a dense count table
#[derive(Debug, Clone)]
pub struct TableConfiguration {
    /// Header text of the row-key column
    pub row_key_label: String,

    /// Handling of identifiers that would break the row layout
    pub identifier_policy: IdentifierPolicy,

    /// Log a warning when entities x features exceeds this (0 = never)
    pub scale_warning_cells: u64,

    /// Number of threads for parallel ingestion (0 = all available cores)
    pub num_threads: usize,

    /// Tuples per rayon task during parallel ingestion
    pub parallel_chunk_size: usize,

    /// Seed for the composite-key hash map
    pub seed: u64,
}

impl Default for TableConfiguration {
    fn default() -> Self {
        Self {
            row_key_label: DEFAULT_ROW_KEY_LABEL.to_string(),
            identifier_policy: IdentifierPolicy::Reject,
            scale_warning_cells: DEFAULT_SCALE_WARNING_CELLS,
            num_threads: 0,
            parallel_chunk_size: DEFAULT_PARALLEL_CHUNK_SIZE,
            seed: DEFAULT_SEED,
        }
    }
}

impl TableConfiguration {
    /// Create a configuration with a custom row-key label
    pub fn new(row_key_label: impl Into<String>) -> Result<Self, String> {
        let config = Self {
            row_key_label: row_key_label.into(),
            ..Self::default()
        };
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration parameters
    pub fn validate(&self) -> Result<(), String> {
        if self.row_key_label.is_empty() {
            return Err("row key label must not be empty".to_string());
        }
        if self.identifier_policy == IdentifierPolicy::Reject
            && !is_plain_identifier(&self.row_key_label)
        {
            return Err(format!(
                "row key label {:?} contains a delimiter, quote or line break",
                self.row_key_label
            ));
        }
        if self.parallel_chunk_size == 0 {
            return Err("parallel_chunk_size must be greater than 0".to_string());
        }
        Ok(())
    }

    /// Log configuration parameters via tracing
    pub fn print(&self) {
        tracing::info!("Table Configuration:");
        tracing::info!("  row_key_label = {}", self.row_key_label);
        tracing::info!("  identifier_policy = {:?}", self.identifier_policy);
        if self.scale_warning_cells == 0 {
            tracing::debug!("  scale_warning_cells = disabled");
        } else {
            tracing::debug!("  scale_warning_cells = {}", self.scale_warning_cells);
        }
        if self.num_threads == 0 {
            tracing::debug!("  num_threads = all available cores");
        } else {
            tracing::debug!("  num_threads = {}", self.num_threads);
        }
        tracing::debug!("  parallel_chunk_size = {}", self.parallel_chunk_size);
        tracing::debug!("  seed = {}", self.seed);
    }
}
