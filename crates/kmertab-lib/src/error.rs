//! Error types for table construction

use thiserror::Error;

/// Which identifier of a tuple an error refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdentifierKind {
    /// Row key
    Entity,
    /// Column key
    Feature,
    /// Header label of the row-key column
    RowKeyLabel,
}

impl std::fmt::Display for IdentifierKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            IdentifierKind::Entity => write!(f, "entity"),
            IdentifierKind::Feature => write!(f, "feature"),
            IdentifierKind::RowKeyLabel => write!(f, "row key label"),
        }
    }
}

/// Error raised while ingesting tuples or configuring a table build
///
/// Any of these aborts the whole build; no partial table is produced.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TableError {
    /// An entity or feature identifier is empty
    #[error("empty {kind} identifier")]
    EmptyIdentifier {
        /// Which identifier was empty
        kind: IdentifierKind,
    },
    /// A tuple carries a negative count
    #[error("negative count {count} for entity {entity:?}, feature {feature:?}")]
    NegativeCount {
        /// Entity of the offending tuple
        entity: String,
        /// Feature of the offending tuple
        feature: String,
        /// The rejected count
        count: i64,
    },
    /// An identifier contains a delimiter, quote or line break
    #[error("{kind} identifier {identifier:?} contains a delimiter, quote or line break")]
    ForbiddenCharacter {
        /// Which identifier was rejected
        kind: IdentifierKind,
        /// The rejected identifier
        identifier: String,
    },
    /// Configuration failed validation
    #[error("invalid table configuration: {0}")]
    InvalidConfiguration(String),
    /// Two builders with different labels or identifier policies were merged
    #[error("cannot merge builders with different settings: {0}")]
    IncompatibleMerge(String),
    /// The rayon pool for parallel ingestion could not be created
    #[error("failed to create thread pool: {0}")]
    ThreadPool(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = TableError::EmptyIdentifier { kind: IdentifierKind::Feature };
        assert_eq!(err.to_string(), "empty feature identifier");

        let err = TableError::NegativeCount {
            entity: "A".to_string(),
            feature: "x".to_string(),
            count: -4,
        };
        assert_eq!(err.to_string(), "negative count -4 for entity \"A\", feature \"x\"");
    }
}
