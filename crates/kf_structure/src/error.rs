use thiserror::Error;

use crate::NAIDX;

/// Error type for secondary structure inputs.
///
/// Columns and positions are 1-based, consistent with the rest of the
/// public API.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StructureError {
    /// A closing symbol found its tier stack empty.
    #[error("unmatched closing '{symbol}' at column {column}")]
    UnmatchedClosing { symbol: char, column: usize },

    /// A tier still had open symbols at the end of the input.
    #[error("unclosed opening '{symbol}' at column {column}")]
    UnclosedOpening { symbol: char, column: usize },

    /// A character outside the notation alphabet.
    #[error("unknown symbol '{symbol}' at column {column}")]
    UnknownSymbol { symbol: char, column: usize },

    /// A pairing needs more tiers than the notation alphabet provides.
    #[error("pairing requires more than {limit} notation tiers")]
    TierOverflow { limit: usize },

    /// A position occurred in two different pairs of a raw pair list.
    #[error("position {position} is paired with both {first} and {second}")]
    DoublePairing {
        position: NAIDX,
        first: NAIDX,
        second: NAIDX,
    },

    /// A pair (i, i).
    #[error("position {position} cannot pair with itself")]
    SelfPairing { position: NAIDX },

    /// A pair reaching outside [1, length].
    #[error("pair ({i},{j}) is out of range for sequence length {length}")]
    PairOutOfRange { i: NAIDX, j: NAIDX, length: usize },
}
