//! Validated position↔partner tables.
//!
//! A `PairTable` is a total map from sequence positions to pairing
//! partners, decoded from tiered dot-bracket notation or built from a
//! raw pair list. Positions are **1-based** throughout the public API.
//!
//! Invariants guaranteed after construction:
//!  - involution: if partner(i) = j then partner(j) = i,
//!  - no position pairs with itself,
//!  - no position has two partners.
//!
//! A `PairTable` may contain crossing (pseudoknotted) pairs; the
//! crossing queries below tell the two situations apart.

use serde::Deserialize;
use serde::Serialize;

use crate::DotBracket;
use crate::DotBracketVec;
use crate::NAIDX;
use crate::NUM_TIERS;
use crate::Pair;
use crate::PairSet;
use crate::StructureError;
use crate::TIER_OPEN;

/// Position -> partner mapping for one sequence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PairTable {
    partners: Vec<Option<NAIDX>>,
}

impl PairTable {
    /// A table of the given length with every position unpaired.
    pub fn unpaired(length: usize) -> Self {
        PairTable {
            partners: vec![None; length],
        }
    }

    /// Build a table from a raw pair list over a sequence of `length`
    /// positions. Pairs may be given in either orientation; (j, i) with
    /// j > i is normalized to (i, j).
    pub fn from_pairs<I>(length: usize, pairs: I) -> Result<Self, StructureError>
    where
        I: IntoIterator<Item = (NAIDX, NAIDX)>,
    {
        let mut partners: Vec<Option<NAIDX>> = vec![None; length];
        for (a, b) in pairs {
            if a == b {
                return Err(StructureError::SelfPairing { position: a });
            }
            let (i, j) = if a < b { (a, b) } else { (b, a) };
            if i < 1 || j as usize > length {
                return Err(StructureError::PairOutOfRange { i, j, length });
            }
            for (pos, other) in [(i, j), (j, i)] {
                let slot = &mut partners[pos as usize - 1];
                match *slot {
                    None => *slot = Some(other),
                    Some(prev) if prev == other => {} // same pair listed twice
                    Some(prev) => {
                        return Err(StructureError::DoublePairing {
                            position: pos,
                            first: prev,
                            second: other,
                        });
                    }
                }
            }
        }
        Ok(PairTable { partners })
    }

    /// Sequence length N.
    pub fn len(&self) -> usize {
        self.partners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.partners.is_empty()
    }

    /// Partner of a position, or `None` if unpaired.
    ///
    /// Panics if `pos` is not in [1, N].
    pub fn partner(&self, pos: NAIDX) -> Option<NAIDX> {
        self.partners[pos as usize - 1]
    }

    /// Iterate over `(position, partner)` in sequence order.
    pub fn partners(&self) -> impl Iterator<Item = (NAIDX, Option<NAIDX>)> + '_ {
        self.partners
            .iter()
            .enumerate()
            .map(|(idx, &p)| ((idx + 1) as NAIDX, p))
    }

    /// Number of pairs in the table.
    pub fn pair_count(&self) -> usize {
        self.partners.iter().filter(|p| p.is_some()).count() / 2
    }

    /// All pairs in canonical (i < j) form.
    pub fn pairs(&self) -> PairSet {
        PairSet::from(self)
    }

    /// Find one witness of a crossing, if any.
    ///
    /// Single scan with a stack of open pairs: a closing position whose
    /// partner is not the innermost open pair proves that the two pairs
    /// interleave.
    pub fn find_crossing(&self) -> Option<(Pair, Pair)> {
        let mut stack: Vec<Pair> = Vec::new();
        for (pos, partner) in self.partners() {
            let Some(j) = partner else { continue };
            if j > pos {
                stack.push(Pair::new(pos, j));
            } else if let Some(top) = stack.pop() {
                if top.i() != j {
                    return Some((top, Pair::new(j, pos)));
                }
            } else {
                debug_assert!(false, "involution violated: {j} closed twice");
            }
        }
        None
    }

    /// True iff no two pairs of the table cross.
    pub fn is_crossing_free(&self) -> bool {
        self.find_crossing().is_none()
    }

    /// Encode the table as tiered notation.
    ///
    /// Pairs are assigned greedily, in order of their opening position,
    /// to the lowest tier they do not conflict with. A crossing-free
    /// table therefore always encodes on tier 0 alone.
    pub fn to_notation(&self) -> Result<DotBracketVec, StructureError> {
        let mut tiers: Vec<Vec<Pair>> = Vec::new();
        for p in self.pairs().to_vec() {
            let tier = tiers
                .iter()
                .position(|members| members.iter().all(|q| !p.crosses(q)));
            match tier {
                Some(t) => tiers[t].push(p),
                None if tiers.len() == NUM_TIERS => {
                    return Err(StructureError::TierOverflow { limit: NUM_TIERS });
                }
                None => tiers.push(vec![p]),
            }
        }
        let mut dbv = vec![DotBracket::Unpaired; self.len()];
        for (t, members) in tiers.iter().enumerate() {
            for p in members {
                dbv[p.i() as usize - 1] = DotBracket::Open(t as u8);
                dbv[p.j() as usize - 1] = DotBracket::Close(t as u8);
            }
        }
        Ok(DotBracketVec(dbv))
    }
}

impl TryFrom<&DotBracketVec> for PairTable {
    type Error = StructureError;

    /// Decode notation with one stack per tier, left to right.
    fn try_from(dbv: &DotBracketVec) -> Result<Self, Self::Error> {
        debug_assert!(dbv.len() < NAIDX::MAX as usize);
        let mut partners: Vec<Option<NAIDX>> = vec![None; dbv.len()];
        let mut stacks: Vec<Vec<NAIDX>> = vec![Vec::new(); NUM_TIERS];
        for (idx, &db) in dbv.iter().enumerate() {
            let pos = (idx + 1) as NAIDX;
            match db {
                DotBracket::Unpaired => {}
                DotBracket::Open(t) => stacks[t as usize].push(pos),
                DotBracket::Close(t) => match stacks[t as usize].pop() {
                    Some(open) => {
                        partners[open as usize - 1] = Some(pos);
                        partners[idx] = Some(open);
                    }
                    None => {
                        return Err(StructureError::UnmatchedClosing {
                            symbol: char::from(db),
                            column: idx + 1,
                        });
                    }
                },
            }
        }
        for (t, stack) in stacks.iter().enumerate() {
            if let Some(&open) = stack.last() {
                return Err(StructureError::UnclosedOpening {
                    symbol: TIER_OPEN[t],
                    column: open as usize,
                });
            }
        }
        Ok(PairTable { partners })
    }
}

impl TryFrom<&str> for PairTable {
    type Error = StructureError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        PairTable::try_from(&DotBracketVec::try_from(value)?)
    }
}
