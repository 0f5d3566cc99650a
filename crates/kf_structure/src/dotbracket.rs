//! Dot-bracket notation with independent symbol tiers.
//!
//! Classic dot-bracket notation uses a single pair of symbols, which
//! cannot express crossing base pairs. We keep one tier per symbol pair
//! (`()`, `[]`, `{}`, `<>`, then `Aa` through `Zz`), so a pseudoknotted
//! pairing can always be written as long as no more than [`NUM_TIERS`]
//! mutually crossing layers are needed.

use std::fmt;

use ahash::AHashMap;
use once_cell::sync::Lazy;

use crate::StructureError;

/// Number of independent symbol tiers.
pub const NUM_TIERS: usize = 30;

/// Opening symbol of each tier, in tier order.
pub const TIER_OPEN: [char; NUM_TIERS] = [
    '(', '[', '{', '<', 'A', 'B', 'C', 'D', 'E', 'F', 'G', 'H', 'I', 'J', 'K',
    'L', 'M', 'N', 'O', 'P', 'Q', 'R', 'S', 'T', 'U', 'V', 'W', 'X', 'Y', 'Z',
];

/// Closing symbol of each tier, in tier order.
pub const TIER_CLOSE: [char; NUM_TIERS] = [
    ')', ']', '}', '>', 'a', 'b', 'c', 'd', 'e', 'f', 'g', 'h', 'i', 'j', 'k',
    'l', 'm', 'n', 'o', 'p', 'q', 'r', 's', 't', 'u', 'v', 'w', 'x', 'y', 'z',
];

static SYMBOLS: Lazy<AHashMap<char, DotBracket>> = Lazy::new(|| {
    let mut map = AHashMap::default();
    map.insert('.', DotBracket::Unpaired);
    for t in 0..NUM_TIERS {
        map.insert(TIER_OPEN[t], DotBracket::Open(t as u8));
        map.insert(TIER_CLOSE[t], DotBracket::Close(t as u8));
    }
    map
});

/// One column of tiered dot-bracket notation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DotBracket {
    Unpaired,
    Open(u8),
    Close(u8),
}

impl DotBracket {
    /// Decode a notation character, if it belongs to the alphabet.
    pub fn from_char(c: char) -> Option<Self> {
        SYMBOLS.get(&c).copied()
    }

    /// Tier index of an opening or closing symbol.
    pub fn tier(&self) -> Option<usize> {
        match self {
            DotBracket::Unpaired => None,
            DotBracket::Open(t) | DotBracket::Close(t) => Some(*t as usize),
        }
    }
}

impl From<DotBracket> for char {
    fn from(db: DotBracket) -> Self {
        match db {
            DotBracket::Unpaired => '.',
            DotBracket::Open(t) => TIER_OPEN[t as usize],
            DotBracket::Close(t) => TIER_CLOSE[t as usize],
        }
    }
}

/// A full notation line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DotBracketVec(pub Vec<DotBracket>);

impl DotBracketVec {
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &DotBracket> {
        self.0.iter()
    }
}

impl TryFrom<&str> for DotBracketVec {
    type Error = StructureError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let mut dbv = Vec::with_capacity(value.len());
        for (idx, c) in value.chars().enumerate() {
            match DotBracket::from_char(c) {
                Some(db) => dbv.push(db),
                None => {
                    return Err(StructureError::UnknownSymbol {
                        symbol: c,
                        column: idx + 1,
                    });
                }
            }
        }
        Ok(DotBracketVec(dbv))
    }
}

impl fmt::Display for DotBracketVec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for &db in &self.0 {
            write!(f, "{}", char::from(db))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_symbol_roundtrip() {
        for t in 0..NUM_TIERS {
            let open = TIER_OPEN[t];
            let close = TIER_CLOSE[t];
            assert_eq!(DotBracket::from_char(open), Some(DotBracket::Open(t as u8)));
            assert_eq!(DotBracket::from_char(close), Some(DotBracket::Close(t as u8)));
            assert_eq!(char::from(DotBracket::Open(t as u8)), open);
            assert_eq!(char::from(DotBracket::Close(t as u8)), close);
        }
        assert_eq!(DotBracket::from_char('.'), Some(DotBracket::Unpaired));
    }

    #[test]
    fn test_parse_tiers() {
        let dbv = DotBracketVec::try_from("([.)]Aa").unwrap();
        assert_eq!(
            dbv.0,
            vec![
                DotBracket::Open(0),
                DotBracket::Open(1),
                DotBracket::Unpaired,
                DotBracket::Close(0),
                DotBracket::Close(1),
                DotBracket::Open(4),
                DotBracket::Close(4),
            ]
        );
        assert_eq!(dbv.to_string(), "([.)]Aa");
    }

    #[test]
    fn test_unknown_symbol() {
        let err = DotBracketVec::try_from("(.&.)").unwrap_err();
        assert_eq!(
            err,
            StructureError::UnknownSymbol {
                symbol: '&',
                column: 3
            }
        );
    }
}
