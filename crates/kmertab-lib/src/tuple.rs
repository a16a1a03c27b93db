//! Sparse count tuples
//!
//! A [`CountTuple`] is one observed `(entity, feature, count)` fact handed
//! over by the upstream aggregation stage. Absence of a tuple for a pair
//! means a count of zero in the dense table.

use crate::error::{IdentifierKind, TableError};
use crate::table::IdentifierPolicy;

/// One observed (entity, feature) count
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CountTuple {
    /// Row key, e.g. an accession or sample name
    pub entity: String,
    /// Column key, e.g. a k-mer
    pub feature: String,
    /// Number of occurrences; negative values are rejected at ingestion
    pub count: i64,
}

impl CountTuple {
    /// Create a tuple from anything string-like
    pub fn new(entity: impl Into<String>, feature: impl Into<String>, count: i64) -> Self {
        Self {
            entity: entity.into(),
            feature: feature.into(),
            count,
        }
    }

    /// Check the tuple and return its count as unsigned
    pub fn validate(&self, policy: IdentifierPolicy) -> Result<u64, TableError> {
        validate_parts(&self.entity, &self.feature, self.count, policy)
    }
}

impl<E: Into<String>, F: Into<String>> From<(E, F, i64)> for CountTuple {
    fn from((entity, feature, count): (E, F, i64)) -> Self {
        Self::new(entity, feature, count)
    }
}

/// Validate the pieces of a tuple without owning them
pub(crate) fn validate_parts(
    entity: &str,
    feature: &str,
    count: i64,
    policy: IdentifierPolicy,
) -> Result<u64, TableError> {
    validate_identifier(entity, IdentifierKind::Entity, policy)?;
    validate_identifier(feature, IdentifierKind::Feature, policy)?;
    u64::try_from(count).map_err(|_| TableError::NegativeCount {
        entity: entity.to_string(),
        feature: feature.to_string(),
        count,
    })
}

/// Reject empty identifiers, and unsafe ones unless they will be quoted
pub(crate) fn validate_identifier(
    id: &str,
    kind: IdentifierKind,
    policy: IdentifierPolicy,
) -> Result<(), TableError> {
    if id.is_empty() {
        return Err(TableError::EmptyIdentifier { kind });
    }
    if policy == IdentifierPolicy::Reject && !crate::constants::is_plain_identifier(id) {
        return Err(TableError::ForbiddenCharacter {
            kind,
            identifier: id.to_string(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_tuple() {
        let tuple = CountTuple::new("SRR01", "ACGT", 12);
        assert_eq!(tuple.validate(IdentifierPolicy::Reject), Ok(12));
    }

    #[test]
    fn test_zero_count_is_valid() {
        let tuple: CountTuple = ("A", "x", 0).into();
        assert_eq!(tuple.validate(IdentifierPolicy::Reject), Ok(0));
    }

    #[test]
    fn test_empty_identifiers() {
        let err = CountTuple::new("", "x", 1).validate(IdentifierPolicy::Reject).unwrap_err();
        assert_eq!(err, TableError::EmptyIdentifier { kind: IdentifierKind::Entity });

        let err = CountTuple::new("A", "", 1).validate(IdentifierPolicy::Quote).unwrap_err();
        assert_eq!(err, TableError::EmptyIdentifier { kind: IdentifierKind::Feature });
    }

    #[test]
    fn test_negative_count() {
        let err = CountTuple::new("A", "x", -1).validate(IdentifierPolicy::Reject).unwrap_err();
        assert!(matches!(err, TableError::NegativeCount { count: -1, .. }));
    }

    #[test]
    fn test_delimiter_depends_on_policy() {
        let tuple = CountTuple::new("A,B", "x", 1);
        assert!(matches!(
            tuple.validate(IdentifierPolicy::Reject),
            Err(TableError::ForbiddenCharacter { kind: IdentifierKind::Entity, .. })
        ));
        assert_eq!(tuple.validate(IdentifierPolicy::Quote), Ok(1));
    }
}
