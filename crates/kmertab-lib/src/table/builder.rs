//! Table builder orchestration
//!
//! Collects count tuples into three structures:
//! 1. An insertion-ordered entity set (fixes row order)
//! 2. An interned feature set (sorted only when the table is finished)
//! 3. A sparse map from `(entity index, feature index)` to count
//!
//! Ingestion can run sequentially or split across a rayon pool. Partial
//! builders are merged in input order, so both paths yield the same table.

use crate::{
    error::TableError,
    hasher::{DeterministicHasher, SeededHashMap, SeededIndexSet},
    table::{config::TableConfiguration, matrix::MatrixTable},
    tuple::{validate_parts, CountTuple},
};
use rayon::prelude::*;
use tracing::{debug, info, trace, warn};

/// Composite key of one cell: positions in the entity and feature sets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct CellKey {
    pub(crate) entity: usize,
    pub(crate) feature: usize,
}

/// Accumulates count tuples until the table is finished
pub struct MatrixTableBuilder {
    config: TableConfiguration,
    entities: SeededIndexSet<String>,
    features: SeededIndexSet<String>,
    counts: SeededHashMap<CellKey, u64>,
    num_tuples: u64,
    num_overwrites: u64,
}

impl MatrixTableBuilder {
    /// Create an empty builder with the given configuration
    pub fn new(config: TableConfiguration) -> Result<Self, TableError> {
        config.validate().map_err(TableError::InvalidConfiguration)?;
        Ok(Self::with_validated(config))
    }

    fn with_validated(config: TableConfiguration) -> Self {
        let hasher = DeterministicHasher::new(config.seed);
        Self {
            entities: hasher.index_set(),
            features: hasher.index_set(),
            counts: hasher.map(),
            num_tuples: 0,
            num_overwrites: 0,
            config,
        }
    }

    /// Build a table from a complete tuple sequence on the calling thread
    pub fn build_from_tuples<'a, I>(
        config: TableConfiguration,
        tuples: I,
    ) -> Result<MatrixTable, TableError>
    where
        I: IntoIterator<Item = &'a CountTuple>,
    {
        let mut builder = Self::new(config)?;
        info!("Loading count tuples");
        builder.extend_from(tuples)?;
        Ok(builder.finish())
    }

    /// Build a table from a complete tuple slice using a rayon thread pool
    ///
    /// The slice is split into chunks of `config.parallel_chunk_size`; each
    /// chunk fills a private builder and the partial builders are merged
    /// left to right. The result is identical to [`Self::build_from_tuples`].
    ///
    /// The number of threads is controlled by `config.num_threads`:
    /// - `0` — use all available CPU cores (rayon default)
    /// - `N` — use exactly N threads
    pub fn build_parallel(
        config: TableConfiguration,
        tuples: &[CountTuple],
    ) -> Result<MatrixTable, TableError> {
        config.validate().map_err(TableError::InvalidConfiguration)?;

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(config.num_threads)
            .build()
            .map_err(|e| TableError::ThreadPool(e.to_string()))?;

        info!(
            "Loading {} count tuples on {} threads",
            tuples.len(),
            pool.current_num_threads()
        );
        let chunk_size = config.parallel_chunk_size;
        let builder = pool.install(|| {
            tuples
                .par_chunks(chunk_size)
                .map(|chunk| -> Result<Self, TableError> {
                    let mut partial = Self::with_validated(config.clone());
                    partial.extend_from(chunk)?;
                    Ok(partial)
                })
                .try_reduce(
                    || Self::with_validated(config.clone()),
                    |left, right| left.merge(right),
                )
        })?;

        Ok(builder.finish())
    }

    /// Ingest one tuple
    ///
    /// The tuple is validated before anything is recorded, so a failed call
    /// leaves the builder unchanged.
    pub fn ingest(&mut self, tuple: &CountTuple) -> Result<(), TableError> {
        self.insert(&tuple.entity, &tuple.feature, tuple.count)
    }

    /// Ingest one `(entity, feature, count)` observation
    ///
    /// A repeated `(entity, feature)` pair overwrites the previous count.
    pub fn insert(&mut self, entity: &str, feature: &str, count: i64) -> Result<(), TableError> {
        let count = validate_parts(entity, feature, count, self.config.identifier_policy)?;

        let key = CellKey {
            entity: intern(&mut self.entities, entity),
            feature: intern(&mut self.features, feature),
        };
        if let Some(previous) = self.counts.insert(key, count) {
            self.num_overwrites += 1;
            trace!("overwrote count {} with {} for ({}, {})", previous, count, entity, feature);
        }
        self.num_tuples += 1;
        Ok(())
    }

    /// Ingest every tuple of a sequence, stopping at the first invalid one
    pub fn extend_from<'a, I>(&mut self, tuples: I) -> Result<(), TableError>
    where
        I: IntoIterator<Item = &'a CountTuple>,
    {
        for tuple in tuples {
            self.ingest(tuple)?;
        }
        Ok(())
    }

    /// Fold a builder that saw later tuples into this one
    ///
    /// Entities first seen in `other` are appended after those of `self`,
    /// and counts from `other` overwrite counts from `self`. Merging is
    /// associative, which is what the parallel path relies on.
    ///
    /// Both builders must share the row-key label and identifier policy;
    /// identifiers accepted under one policy may be unsafe under the other.
    pub fn merge(mut self, other: Self) -> Result<Self, TableError> {
        if self.config.identifier_policy != other.config.identifier_policy {
            return Err(TableError::IncompatibleMerge(format!(
                "identifier policy {:?} vs {:?}",
                self.config.identifier_policy, other.config.identifier_policy
            )));
        }
        if self.config.row_key_label != other.config.row_key_label {
            return Err(TableError::IncompatibleMerge(format!(
                "row key label {:?} vs {:?}",
                self.config.row_key_label, other.config.row_key_label
            )));
        }

        let entity_remap: Vec<usize> = other
            .entities
            .into_iter()
            .map(|entity| self.entities.insert_full(entity).0)
            .collect();
        let feature_remap: Vec<usize> = other
            .features
            .into_iter()
            .map(|feature| self.features.insert_full(feature).0)
            .collect();

        for (key, count) in other.counts {
            let key = CellKey {
                entity: entity_remap[key.entity],
                feature: feature_remap[key.feature],
            };
            if self.counts.insert(key, count).is_some() {
                self.num_overwrites += 1;
            }
        }
        self.num_tuples += other.num_tuples;
        self.num_overwrites += other.num_overwrites;
        Ok(self)
    }

    /// Number of distinct entities seen so far
    pub fn num_entities(&self) -> usize {
        self.entities.len()
    }

    /// Number of distinct features seen so far
    pub fn num_features(&self) -> usize {
        self.features.len()
    }

    /// Number of distinct (entity, feature) pairs with a stored count
    pub fn num_observed_pairs(&self) -> usize {
        self.counts.len()
    }

    /// Number of tuples ingested, duplicates included
    pub fn num_tuples(&self) -> u64 {
        self.num_tuples
    }

    /// Number of tuples that replaced an earlier count for the same pair
    pub fn num_overwrites(&self) -> u64 {
        self.num_overwrites
    }

    /// Close ingestion and fix the column order
    ///
    /// Rows keep first-seen entity order; columns are sorted by feature
    /// identifier so the same input always yields the same header.
    pub fn finish(self) -> MatrixTable {
        info!(
            "Loaded {} rows and {} columns",
            self.entities.len(),
            self.features.len()
        );
        debug!(
            "  {} tuples, {} observed pairs, {} overwrites",
            self.num_tuples,
            self.counts.len(),
            self.num_overwrites
        );

        let dense_cells = dense_cell_count(self.entities.len(), self.features.len());
        if exceeds_scale_threshold(dense_cells, self.config.scale_warning_cells) {
            warn!(
                "Dense table has {} cells ({} rows x {} columns), above the warning threshold of {}",
                dense_cells,
                self.entities.len(),
                self.features.len(),
                self.config.scale_warning_cells
            );
        }

        let mut column_order: Vec<usize> = (0..self.features.len()).collect();
        column_order.sort_unstable_by(|&a, &b| self.features[a].cmp(&self.features[b]));

        MatrixTable::new(
            self.config.row_key_label,
            self.config.identifier_policy,
            self.entities,
            self.features,
            column_order,
            self.counts,
        )
    }
}

/// Cells of a `rows x columns` grid, saturating at `u64::MAX`
#[inline]
pub(crate) fn dense_cell_count(rows: usize, columns: usize) -> u64 {
    (rows as u64).saturating_mul(columns as u64)
}

/// Whether a grid of `cells` should raise the scale warning (0 disables it)
#[inline]
pub(crate) fn exceeds_scale_threshold(cells: u64, threshold: u64) -> bool {
    threshold > 0 && cells > threshold
}

/// Position of `id` in `set`, appending it if absent
#[inline]
fn intern(set: &mut SeededIndexSet<String>, id: &str) -> usize {
    match set.get_index_of(id) {
        Some(index) => index,
        None => set.insert_full(id.to_string()).0,
    }
}
