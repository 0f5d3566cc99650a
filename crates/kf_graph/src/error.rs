use thiserror::Error;

use kf_structure::Pair;
use kf_structure::StructureError;

/// Error type for pseudoknot resolution and graph construction.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GraphError {
    /// Sequence length above the configured dynamic-programming bound.
    /// Carries the offending length and the configured limit so callers
    /// can raise the limit or pre-filter.
    #[error("sequence length {length} exceeds the resolver limit of {limit} positions")]
    ResourceLimitExceeded { length: usize, limit: usize },

    /// The graph builder received a pair table that is not crossing-free.
    /// This is a contract violation (the caller bypassed the resolver),
    /// never repaired silently.
    #[error("pair table is not crossing-free: {first} crosses {second}")]
    StructuralInconsistency { first: Pair, second: Pair },

    /// Invalid structure input, forwarded from `kf_structure`.
    #[error(transparent)]
    Structure(#[from] StructureError),
}
