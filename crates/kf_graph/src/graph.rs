//! The immutable structure graph.
//!
//! A `StructureGraph` owns its elements in an arena and stores adjacency
//! as index pairs; multiloop junctions are graph-cyclic, and index edges
//! keep that cycle out of the ownership graph. Built once from a
//! crossing-free `PairTable`, never mutated afterwards.

use std::fmt;

use serde::Deserialize;
use serde::Serialize;

use kf_structure::DotBracket;
use kf_structure::DotBracketVec;
use kf_structure::NAIDX;
use kf_structure::PairSet;
use kf_structure::PairTable;

use crate::Element;
use crate::ElementId;
use crate::GraphError;
use crate::PseudoknotResolver;
use crate::Resolution;
use crate::builder;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StructureGraph {
    table: PairTable,
    elements: Vec<Element>,
    edges: Vec<(ElementId, ElementId)>,
    position_index: Vec<Option<ElementId>>,
}

impl StructureGraph {
    pub(crate) fn assemble(
        table: PairTable,
        elements: Vec<Element>,
        edges: Vec<(ElementId, ElementId)>,
        position_index: Vec<Option<ElementId>>,
    ) -> Self {
        StructureGraph {
            table,
            elements,
            edges,
            position_index,
        }
    }

    /// Decompose a crossing-free table into its element graph.
    pub fn build(table: &PairTable) -> Result<Self, GraphError> {
        builder::build(table)
    }

    /// Full pipeline: decode notation, resolve pseudoknots, build the
    /// graph. Returns the resolution alongside the graph so callers can
    /// audit which pairs were dropped.
    pub fn from_notation(
        notation: &str,
        resolver: &PseudoknotResolver,
    ) -> Result<(Self, Resolution), GraphError> {
        let table = PairTable::try_from(notation).map_err(GraphError::from)?;
        let resolution = resolver.resolve(&table.pairs())?;
        let graph = Self::build(&resolution.to_table()?)?;
        Ok((graph, resolution))
    }

    /// Sequence length N.
    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    /// The underlying crossing-free pair table.
    pub fn table(&self) -> &PairTable {
        &self.table
    }

    /// Partner of a position, delegated to the table.
    pub fn partner(&self, pos: NAIDX) -> Option<NAIDX> {
        self.table.partner(pos)
    }

    pub fn pairs(&self) -> PairSet {
        self.table.pairs()
    }

    pub fn element_count(&self) -> usize {
        self.elements.len()
    }

    /// Element owning a position, if the position is in [1, N].
    /// Zero-length elements own no positions.
    pub fn element_at(&self, pos: NAIDX) -> Option<ElementId> {
        self.position_index.get(pos as usize).copied().flatten()
    }

    /// Look up an element by id. Panics if the id is not from this graph.
    pub fn element(&self, id: ElementId) -> &Element {
        &self.elements[id.index()]
    }

    pub fn elements(&self) -> impl Iterator<Item = &Element> {
        self.elements.iter()
    }

    /// Undirected adjacency as index pairs, sorted and deduplicated.
    pub fn edges(&self) -> &[(ElementId, ElementId)] {
        &self.edges
    }

    /// Neighbors of an element, in ascending id order.
    pub fn neighbors(&self, id: ElementId) -> Vec<ElementId> {
        let mut out: Vec<ElementId> = self
            .edges
            .iter()
            .filter_map(|&(a, b)| {
                if a == id {
                    Some(b)
                } else if b == id {
                    Some(a)
                } else {
                    None
                }
            })
            .collect();
        out.sort_unstable();
        out
    }

    /// Canonical notation. The table is crossing-free by construction,
    /// so a single tier always suffices.
    pub fn to_notation(&self) -> String {
        let mut dbv = vec![DotBracket::Unpaired; self.len()];
        for p in self.pairs().to_vec() {
            dbv[p.i() as usize - 1] = DotBracket::Open(0);
            dbv[p.j() as usize - 1] = DotBracket::Close(0);
        }
        DotBracketVec(dbv).to_string()
    }
}

impl TryFrom<&PairTable> for StructureGraph {
    type Error = GraphError;

    fn try_from(table: &PairTable) -> Result<Self, Self::Error> {
        Self::build(table)
    }
}

/// Element-graph text dump: a `define` line per element (label followed
/// by the flat start/end numbers of its ranges), then a `connect` line
/// per element with neighbors.
impl fmt::Display for StructureGraph {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for element in &self.elements {
            write!(f, "define {}", element.label())?;
            for range in element.ranges() {
                write!(f, " {} {}", range.start(), range.end())?;
            }
            writeln!(f)?;
        }
        for element in &self.elements {
            let neighbors = self.neighbors(element.id());
            if neighbors.is_empty() {
                continue;
            }
            write!(f, "connect {}", element.label())?;
            for id in neighbors {
                write!(f, " {}", self.element(id).label())?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ElementKind;

    fn graph(notation: &str) -> StructureGraph {
        let table = PairTable::try_from(notation).unwrap();
        StructureGraph::build(&table).unwrap()
    }

    #[test]
    fn test_multiloop_junction_cycle() {
        let g = graph("((.(...).(...)))");
        // s0 closing, two hairpin stems, three junction strands
        let kinds: Vec<ElementKind> = g.elements().map(|e| e.kind()).collect();
        assert_eq!(
            kinds.iter().filter(|&&k| k == ElementKind::Stem).count(),
            3
        );
        assert_eq!(
            kinds
                .iter()
                .filter(|&&k| k == ElementKind::MultiloopSegment)
                .count(),
            3
        );
        assert_eq!(
            kinds
                .iter()
                .filter(|&&k| k == ElementKind::HairpinLoop)
                .count(),
            2
        );
        assert_eq!(g.element_count(), 8);

        let m0 = g
            .elements()
            .find(|e| e.label() == "m0")
            .map(|e| e.id())
            .unwrap();
        let m2 = g
            .elements()
            .find(|e| e.label() == "m2")
            .map(|e| e.id())
            .unwrap();
        // segments of one junction are mutually adjacent
        assert!(g.neighbors(m0).contains(&m2));
        assert!(g.element(m2).is_zero_length());
        // the cycle: m0 and m2 share two distinct stem-hopping paths
        assert_eq!(g.neighbors(m0).len(), 4);
    }

    #[test]
    fn test_exterior_segment_between_root_stems() {
        let g = graph(".((...))..((...)).");
        assert_eq!(g.element_count(), 7);
        let f0 = g.elements().find(|e| e.label() == "f0").unwrap();
        assert_eq!(f0.kind(), ElementKind::FivePrimeTail);
        assert_eq!(f0.ranges()[0].start(), 1);
        let t0 = g.elements().find(|e| e.label() == "t0").unwrap();
        assert_eq!(t0.kind(), ElementKind::ThreePrimeTail);
        assert_eq!(t0.ranges()[0].end(), 18);
        let m0 = g.elements().find(|e| e.label() == "m0").unwrap();
        // open exterior: flanked by the two root stems, no segment clique
        assert_eq!(
            g.neighbors(m0.id()),
            vec![ElementId(0), ElementId(1)]
        );
    }

    #[test]
    fn test_element_at_is_total() {
        let g = graph("(.(.).)");
        for pos in 1..=7 {
            assert!(g.element_at(pos).is_some(), "position {pos} unowned");
        }
        assert_eq!(g.element_at(0), None);
        assert_eq!(g.element_at(8), None);
        assert_eq!(g.element_at(4), Some(ElementId(3))); // hairpin
        assert_eq!(g.element_at(1), g.element_at(7)); // same stem
    }

    #[test]
    fn test_partner_delegation() {
        let g = graph("(.(.).)");
        assert_eq!(g.partner(1), Some(7));
        assert_eq!(g.partner(2), None);
        assert_eq!(g.partner(5), Some(3));
    }

    #[test]
    fn test_notation_roundtrip() {
        for notation in ["(.(.).)", "((.(...).(...)))", ".((...))..((...)).", "...."] {
            let g = graph(notation);
            let out = g.to_notation();
            assert_eq!(out, notation);
            let back = PairTable::try_from(out.as_str()).unwrap();
            assert_eq!(back.pairs(), g.pairs());
        }
    }

    #[test]
    fn test_pipeline_from_notation() {
        // decoded via two tiers; (1,9) crosses (8,10), one must go
        let resolver = PseudoknotResolver::new();
        let (g, resolution) = StructureGraph::from_notation("([(.)].[)]", &resolver).unwrap();
        assert!(!resolution.is_lossless());
        assert!(g.table().is_crossing_free());
        assert_eq!(g.len(), 10);
    }

    #[test]
    fn test_pipeline_lossless() {
        let resolver = PseudoknotResolver::new();
        let (g, resolution) = StructureGraph::from_notation("(.(.).)", &resolver).unwrap();
        assert!(resolution.is_lossless());
        assert_eq!(g.element_count(), 4);
        assert_eq!(g.to_notation(), "(.(.).)");
    }

    #[test]
    fn test_serde_roundtrip() {
        let g = graph("((.(...).(...)))");
        let json = serde_json::to_string(&g).unwrap();
        let back: StructureGraph = serde_json::from_str(&json).unwrap();
        assert_eq!(back, g);
    }

    #[test]
    fn test_display_dump() {
        let text = graph("(.(.).)").to_string();
        assert!(text.contains("define s0 1 1 7 7"));
        assert!(text.contains("define i0 2 2 6 6"));
        assert!(text.contains("define h0 4 4"));
        assert!(text.contains("connect s1 i0 h0"));
    }
}
