//! Typed structural elements.
//!
//! The seven element kinds form a closed sum type, so every consumer
//! matches exhaustively and a new kind cannot slip through unhandled.
//! Elements live in the arena owned by their `StructureGraph` and are
//! referred to by index; adjacency never holds owned references, which
//! keeps the cyclic junctions of multiloops free of ownership cycles.

use std::fmt;

use serde::Deserialize;
use serde::Serialize;

use kf_structure::NAIDX;

/// Kinds of structural elements.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ElementKind {
    Stem,
    HairpinLoop,
    InteriorLoop,
    Bulge,
    MultiloopSegment,
    FivePrimeTail,
    ThreePrimeTail,
}

impl ElementKind {
    /// One-letter label prefix, bulge-graph convention.
    pub fn prefix(self) -> char {
        match self {
            ElementKind::Stem => 's',
            ElementKind::HairpinLoop => 'h',
            ElementKind::InteriorLoop => 'i',
            ElementKind::Bulge => 'b',
            ElementKind::MultiloopSegment => 'm',
            ElementKind::FivePrimeTail => 'f',
            ElementKind::ThreePrimeTail => 't',
        }
    }

    pub fn tag(self) -> &'static str {
        match self {
            ElementKind::Stem => "stem",
            ElementKind::HairpinLoop => "hairpin_loop",
            ElementKind::InteriorLoop => "interior_loop",
            ElementKind::Bulge => "bulge",
            ElementKind::MultiloopSegment => "multiloop_segment",
            ElementKind::FivePrimeTail => "five_prime_tail",
            ElementKind::ThreePrimeTail => "three_prime_tail",
        }
    }
}

impl fmt::Display for ElementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// Inclusive 1-based position range. Never empty.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PosRange {
    start: NAIDX,
    end: NAIDX,
}

impl PosRange {
    /// Create a new range. Panics in debug if start is 0 or past end.
    pub fn new(start: NAIDX, end: NAIDX) -> Self {
        debug_assert!(0 < start && start <= end);
        PosRange { start, end }
    }

    pub fn start(&self) -> NAIDX {
        self.start
    }

    pub fn end(&self) -> NAIDX {
        self.end
    }

    pub fn len(&self) -> usize {
        (self.end - self.start + 1) as usize
    }

    pub fn contains(&self, pos: NAIDX) -> bool {
        self.start <= pos && pos <= self.end
    }

    pub fn positions(&self) -> impl Iterator<Item = NAIDX> {
        self.start..=self.end
    }
}

impl fmt::Display for PosRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.start, self.end)
    }
}

/// Arena index of an element within its `StructureGraph`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct ElementId(pub(crate) usize);

impl ElementId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// One structural element.
///
/// Stems carry two ranges (5' and 3' strand); single-stranded elements
/// carry one; zero-length connectors (an empty hairpin of an innermost
/// (k, k+1) pair, or a junction strand with no unpaired residues) carry
/// none but still take part in adjacency.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Element {
    id: ElementId,
    kind: ElementKind,
    ordinal: usize,
    ranges: Vec<PosRange>,
}

impl Element {
    pub(crate) fn new(id: ElementId, kind: ElementKind, ordinal: usize, ranges: Vec<PosRange>) -> Self {
        Element {
            id,
            kind,
            ordinal,
            ranges,
        }
    }

    pub fn id(&self) -> ElementId {
        self.id
    }

    pub fn kind(&self) -> ElementKind {
        self.kind
    }

    /// Defining position range(s), in sequence order.
    pub fn ranges(&self) -> &[PosRange] {
        &self.ranges
    }

    /// Stable per-kind label, e.g. `s0`, `h2`, `m1`.
    pub fn label(&self) -> String {
        format!("{}{}", self.kind.prefix(), self.ordinal)
    }

    pub fn contains(&self, pos: NAIDX) -> bool {
        self.ranges.iter().any(|r| r.contains(pos))
    }

    pub fn is_zero_length(&self) -> bool {
        self.ranges.is_empty()
    }

    /// Number of residues owned by this element.
    pub fn residue_count(&self) -> usize {
        self.ranges.iter().map(|r| r.len()).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_range_queries() {
        let r = PosRange::new(3, 5);
        assert_eq!(r.len(), 3);
        assert!(r.contains(3) && r.contains(5));
        assert!(!r.contains(2) && !r.contains(6));
        assert_eq!(r.positions().collect::<Vec<_>>(), vec![3, 4, 5]);
        assert_eq!(r.to_string(), "3..5");
    }

    #[test]
    fn test_element_label() {
        let e = Element::new(
            ElementId(0),
            ElementKind::Stem,
            0,
            vec![PosRange::new(1, 2), PosRange::new(7, 8)],
        );
        assert_eq!(e.label(), "s0");
        assert_eq!(e.residue_count(), 4);
        assert!(e.contains(8));
        assert!(!e.contains(4));
    }

    #[test]
    fn test_kind_tags() {
        assert_eq!(ElementKind::MultiloopSegment.tag(), "multiloop_segment");
        assert_eq!(ElementKind::MultiloopSegment.prefix(), 'm');
        assert_eq!(ElementKind::FivePrimeTail.to_string(), "five_prime_tail");
    }
}
