//! Per-sample variant call filtering
//!
//! Selects the calls of a variant in which at least one allele index reaches
//! a minimum genotype. No-calls are encoded as `-1`, so with any
//! non-negative threshold they never qualify on their own.

use crate::constants::{COMMENT_PREFIX, NO_CALL_GENOTYPE};
use anyhow::{Context, Result};
use std::io::BufRead;
use thiserror::Error;

/// Error type for genotype parsing
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CallParseError {
    /// An allele is neither `.` nor an integer
    #[error("invalid allele {0:?}")]
    InvalidAllele(String),
    /// An allele index is below the no-call value
    #[error("allele index {0} is below -1")]
    AlleleOutOfRange(i32),
}

/// One sample's call at a variant site
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariantCall {
    /// Name of the sample (call set)
    pub call_set_name: String,
    /// Allele indices, `-1` for a no-call
    pub genotype: Vec<i32>,
}

impl VariantCall {
    /// Create a call
    pub fn new(call_set_name: impl Into<String>, genotype: Vec<i32>) -> Self {
        Self {
            call_set_name: call_set_name.into(),
            genotype,
        }
    }

    /// Whether any allele index is at least `min_genotype`
    #[inline]
    pub fn has_genotype_at_least(&self, min_genotype: i32) -> bool {
        self.genotype.iter().any(|&g| g >= min_genotype)
    }
}

/// A variant site with its per-sample calls
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Variant {
    /// Reference sequence (chromosome) name
    pub reference_name: String,
    /// Zero-based start position
    pub start: u64,
    /// Calls, one per sample
    pub calls: Vec<VariantCall>,
}

/// Calls of `variant` with at least one allele index `>= min_genotype`
pub fn samples_with_variant_of_min_genotype(
    variant: &Variant,
    min_genotype: i32,
) -> Vec<&VariantCall> {
    filter_calls(&variant.calls, min_genotype)
}

/// Calls with at least one allele index `>= min_genotype`, in input order
///
/// A call with an empty genotype never qualifies.
pub fn filter_calls(calls: &[VariantCall], min_genotype: i32) -> Vec<&VariantCall> {
    calls
        .iter()
        .filter(|call| call.has_genotype_at_least(min_genotype))
        .collect()
}

/// Parse a genotype such as `0/1`, `1|1`, `./.` or `-1,0`
///
/// `.` stands for a no-call. An empty string is an empty genotype.
pub fn parse_genotype(s: &str) -> Result<Vec<i32>, CallParseError> {
    let s = s.trim();
    if s.is_empty() {
        return Ok(Vec::new());
    }
    s.split(['/', '|', ','])
        .map(|allele| {
            let allele = allele.trim();
            if allele == "." {
                return Ok(NO_CALL_GENOTYPE);
            }
            let value: i32 = allele
                .parse()
                .map_err(|_| CallParseError::InvalidAllele(allele.to_string()))?;
            if value < NO_CALL_GENOTYPE {
                return Err(CallParseError::AlleleOutOfRange(value));
            }
            Ok(value)
        })
        .collect()
}

/// Read `sample<TAB>genotype` lines into calls
///
/// Blank lines and `#` comments are skipped. A line with only a sample name
/// yields a call with an empty genotype.
pub fn read_calls<R: BufRead>(reader: R, source: &str) -> Result<Vec<VariantCall>> {
    let mut calls = Vec::new();
    for (i, line) in reader.lines().enumerate() {
        let line = line.with_context(|| format!("Failed to read line {} of {}", i + 1, source))?;
        let line = line.trim_end_matches(['\r', '\n']);
        if line.trim().is_empty() || line.starts_with(COMMENT_PREFIX) {
            continue;
        }
        let (name, genotype) = line.split_once('\t').unwrap_or((line, ""));
        let genotype = parse_genotype(genotype)
            .with_context(|| format!("Invalid genotype at line {} of {}", i + 1, source))?;
        calls.push(VariantCall::new(name, genotype));
    }
    Ok(calls)
}
