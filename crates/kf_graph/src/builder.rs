//! Decomposition of a crossing-free `PairTable` into structural elements.
//!
//! Two passes over the table:
//!  1. collect maximal stems (runs of pairs (i,j), (i+1,j-1), ...),
//!  2. recursively split each region between stem ends into its
//!     single-stranded elements, classified by boundary context.
//!
//! Junction strands and hairpins are materialized even when they have no
//! unpaired residues, so adjacency stays connected across flush helix
//! ends. Runs between root-level stems count as junction segments of the
//! exterior loop, but the exterior is open, so only closed junctions get
//! the segment-to-segment cycle.

use log::debug;

use kf_structure::NAIDX;
use kf_structure::PairTable;

use crate::Element;
use crate::ElementId;
use crate::ElementKind;
use crate::GraphError;
use crate::PosRange;
use crate::StructureGraph;

/// One maximal helix. The outer pair is (five.start, three.end), the
/// inner pair (five.end, three.start).
struct Stem {
    five: PosRange,
    three: PosRange,
}

pub(crate) fn build(table: &PairTable) -> Result<StructureGraph, GraphError> {
    if let Some((first, second)) = table.find_crossing() {
        return Err(GraphError::StructuralInconsistency { first, second });
    }
    let n = table.len();
    let mut builder = Builder {
        table,
        stems: Vec::new(),
        stem_at: vec![None; n + 1],
        stem_elem: Vec::new(),
        elements: Vec::new(),
        edges: Vec::new(),
        ordinals: [0; 7],
    };
    builder.collect_stems();
    for idx in 0..builder.stems.len() {
        let ranges = vec![builder.stems[idx].five, builder.stems[idx].three];
        let id = builder.push_element(ElementKind::Stem, ranges);
        builder.stem_elem.push(id);
    }
    if n > 0 {
        builder.scan_region(1, n, None);
    }
    Ok(builder.finish())
}

struct Builder<'a> {
    table: &'a PairTable,
    stems: Vec<Stem>,
    /// Position -> index of the stem covering it (paired positions only).
    stem_at: Vec<Option<usize>>,
    /// Element id per stem, parallel to `stems`.
    stem_elem: Vec<ElementId>,
    elements: Vec<Element>,
    edges: Vec<(ElementId, ElementId)>,
    ordinals: [usize; 7],
}

impl Builder<'_> {
    /// Left-to-right scan for maximal helices.
    fn collect_stems(&mut self) {
        let n = self.table.len();
        for pos in 1..=n {
            if self.stem_at[pos].is_some() {
                continue;
            }
            let i = pos as NAIDX;
            let Some(j) = self.table.partner(i) else {
                continue;
            };
            if j < i {
                continue;
            }
            let mut len: NAIDX = 1;
            while i + len < j - len && self.table.partner(i + len) == Some(j - len) {
                len += 1;
            }
            let idx = self.stems.len();
            for d in 0..len {
                self.stem_at[(i + d) as usize] = Some(idx);
                self.stem_at[(j - d) as usize] = Some(idx);
            }
            self.stems.push(Stem {
                five: PosRange::new(i, i + len - 1),
                three: PosRange::new(j - len + 1, j),
            });
        }
    }

    /// Decompose the single-stranded content of one region.
    ///
    /// `lo..=hi` spans the positions between the boundary stem ends (lo >
    /// hi for an empty region); `closing` is the stem whose inner pair
    /// closes the region, `None` for the exterior.
    fn scan_region(&mut self, lo: usize, hi: usize, closing: Option<usize>) {
        let mut children: Vec<usize> = Vec::new();
        let mut runs: Vec<Option<PosRange>> = Vec::new();
        let mut run_start = lo;
        let mut pos = lo;
        while pos <= hi {
            match self.table.partner(pos as NAIDX) {
                Some(j) if (j as usize) > pos => {
                    runs.push(make_run(run_start, pos - 1));
                    if let Some(child) = self.stem_at[pos] {
                        children.push(child);
                    }
                    pos = j as usize + 1;
                    run_start = pos;
                }
                Some(_) => {
                    debug_assert!(false, "closing partner before its opening in {lo}..{hi}");
                    pos += 1;
                }
                None => pos += 1,
            }
        }
        runs.push(make_run(run_start, hi));

        match (closing, children.len()) {
            (None, 0) => {
                // a completely unpaired sequence is a single 5' tail
                if let Some(r) = runs[0] {
                    self.push_element(ElementKind::FivePrimeTail, vec![r]);
                }
            }
            (None, k) => {
                if let Some(r) = runs[0] {
                    let id = self.push_element(ElementKind::FivePrimeTail, vec![r]);
                    self.connect(id, self.stem_elem[children[0]]);
                }
                for c in 1..k {
                    let id =
                        self.push_element(ElementKind::MultiloopSegment, runs[c].into_iter().collect());
                    self.connect(id, self.stem_elem[children[c - 1]]);
                    self.connect(id, self.stem_elem[children[c]]);
                }
                if let Some(r) = runs[k] {
                    let id = self.push_element(ElementKind::ThreePrimeTail, vec![r]);
                    self.connect(id, self.stem_elem[children[k - 1]]);
                }
            }
            (Some(s), 0) => {
                let id =
                    self.push_element(ElementKind::HairpinLoop, runs[0].into_iter().collect());
                self.connect(id, self.stem_elem[s]);
            }
            (Some(s), 1) => {
                debug_assert!(
                    runs[0].is_some() || runs[1].is_some(),
                    "flush helices must have merged into one stem"
                );
                let kind = if runs[0].is_some() && runs[1].is_some() {
                    ElementKind::InteriorLoop
                } else {
                    ElementKind::Bulge
                };
                let ranges: Vec<PosRange> = runs.iter().copied().flatten().collect();
                let id = self.push_element(kind, ranges);
                self.connect(id, self.stem_elem[s]);
                self.connect(id, self.stem_elem[children[0]]);
            }
            (Some(s), k) => {
                // closed junction: k+1 strands, mutually adjacent
                let mut segments = Vec::with_capacity(k + 1);
                for c in 0..=k {
                    let id =
                        self.push_element(ElementKind::MultiloopSegment, runs[c].into_iter().collect());
                    let before = if c == 0 { s } else { children[c - 1] };
                    let after = if c == k { s } else { children[c] };
                    self.connect(id, self.stem_elem[before]);
                    self.connect(id, self.stem_elem[after]);
                    segments.push(id);
                }
                for a in 0..segments.len() {
                    for b in a + 1..segments.len() {
                        self.connect(segments[a], segments[b]);
                    }
                }
            }
        }

        for &c in &children {
            let (ilo, ihi) = {
                let stem = &self.stems[c];
                (stem.five.end() as usize + 1, stem.three.start() as usize - 1)
            };
            self.scan_region(ilo, ihi, Some(c));
        }
    }

    fn push_element(&mut self, kind: ElementKind, ranges: Vec<PosRange>) -> ElementId {
        let id = ElementId(self.elements.len());
        let slot = kind_slot(kind);
        let ordinal = self.ordinals[slot];
        self.ordinals[slot] += 1;
        self.elements.push(Element::new(id, kind, ordinal, ranges));
        id
    }

    fn connect(&mut self, a: ElementId, b: ElementId) {
        debug_assert!(a != b);
        self.edges.push(if a <= b { (a, b) } else { (b, a) });
    }

    fn finish(self) -> StructureGraph {
        let mut edges = self.edges;
        edges.sort_unstable();
        edges.dedup();
        let mut position_index = vec![None; self.table.len() + 1];
        for element in &self.elements {
            for range in element.ranges() {
                for pos in range.positions() {
                    position_index[pos as usize] = Some(element.id());
                }
            }
        }
        debug!(
            "decomposed length-{} table into {} elements and {} edges",
            self.table.len(),
            self.elements.len(),
            edges.len()
        );
        StructureGraph::assemble(self.table.clone(), self.elements, edges, position_index)
    }
}

fn make_run(start: usize, end: usize) -> Option<PosRange> {
    (start <= end).then(|| PosRange::new(start as NAIDX, end as NAIDX))
}

fn kind_slot(kind: ElementKind) -> usize {
    match kind {
        ElementKind::Stem => 0,
        ElementKind::HairpinLoop => 1,
        ElementKind::InteriorLoop => 2,
        ElementKind::Bulge => 3,
        ElementKind::MultiloopSegment => 4,
        ElementKind::FivePrimeTail => 5,
        ElementKind::ThreePrimeTail => 6,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kf_structure::Pair;

    fn labels(graph: &StructureGraph) -> Vec<(String, ElementKind)> {
        graph
            .elements()
            .map(|e| (e.label(), e.kind()))
            .collect()
    }

    #[test]
    fn test_nested_stem_and_hairpin() {
        let table = PairTable::try_from("(.(.).)").unwrap();
        let graph = build(&table).unwrap();
        assert_eq!(
            labels(&graph),
            vec![
                ("s0".to_string(), ElementKind::Stem),
                ("s1".to_string(), ElementKind::Stem),
                ("i0".to_string(), ElementKind::InteriorLoop),
                ("h0".to_string(), ElementKind::HairpinLoop),
            ]
        );
        let s0 = graph.element(ElementId(0));
        assert_eq!(s0.ranges(), &[PosRange::new(1, 1), PosRange::new(7, 7)]);
        let i0 = graph.element(ElementId(2));
        assert_eq!(i0.ranges(), &[PosRange::new(2, 2), PosRange::new(6, 6)]);
        // chain: s0 - i0 - s1 - h0
        assert_eq!(graph.neighbors(ElementId(0)), vec![ElementId(2)]);
        assert_eq!(
            graph.neighbors(ElementId(2)),
            vec![ElementId(0), ElementId(1)]
        );
        assert_eq!(
            graph.neighbors(ElementId(1)),
            vec![ElementId(2), ElementId(3)]
        );
    }

    #[test]
    fn test_bulge() {
        let table = PairTable::try_from("((..((...))))").unwrap();
        let graph = build(&table).unwrap();
        let bulge = graph
            .elements()
            .find(|e| e.kind() == ElementKind::Bulge)
            .unwrap();
        assert_eq!(bulge.label(), "b0");
        assert_eq!(bulge.ranges(), &[PosRange::new(3, 4)]);
        // one strand empty, still bounded by both stems
        assert_eq!(
            graph.neighbors(bulge.id()),
            vec![ElementId(0), ElementId(1)]
        );
    }

    #[test]
    fn test_interior_loop_needs_both_strands() {
        let table = PairTable::try_from("((.((...)).))").unwrap();
        let graph = build(&table).unwrap();
        let interior = graph
            .elements()
            .find(|e| e.kind() == ElementKind::InteriorLoop)
            .unwrap();
        assert_eq!(
            interior.ranges(),
            &[PosRange::new(3, 3), PosRange::new(11, 11)]
        );
    }

    #[test]
    fn test_empty_hairpin_is_materialized() {
        let table = PairTable::try_from("()").unwrap();
        let graph = build(&table).unwrap();
        assert_eq!(graph.element_count(), 2);
        let hairpin = graph
            .elements()
            .find(|e| e.kind() == ElementKind::HairpinLoop)
            .unwrap();
        assert!(hairpin.is_zero_length());
        assert_eq!(graph.neighbors(hairpin.id()), vec![ElementId(0)]);
    }

    #[test]
    fn test_unpaired_sequence_is_five_prime_tail() {
        let table = PairTable::try_from("....").unwrap();
        let graph = build(&table).unwrap();
        assert_eq!(graph.element_count(), 1);
        let tail = graph.element(ElementId(0));
        assert_eq!(tail.kind(), ElementKind::FivePrimeTail);
        assert_eq!(tail.ranges(), &[PosRange::new(1, 4)]);
        assert!(graph.neighbors(ElementId(0)).is_empty());
    }

    #[test]
    fn test_crossing_input_rejected() {
        let table = PairTable::from_pairs(4, [(1, 3), (2, 4)]).unwrap();
        let err = build(&table).unwrap_err();
        assert_eq!(
            err,
            GraphError::StructuralInconsistency {
                first: Pair::new(2, 4),
                second: Pair::new(1, 3),
            }
        );
    }
}
