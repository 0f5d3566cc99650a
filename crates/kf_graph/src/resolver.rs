//! Maximum-weight pseudoknot removal.
//!
//! [`PseudoknotResolver`] selects, from an arbitrary set of base pairs,
//! a crossing-free subset of maximum total weight. The dynamic program
//! is the classic nested-pairing recurrence over position ranges:
//!
//! ```text
//! best(i, j) = max( best(i, j-1),
//!                   max over input pairs (k, j) with i <= k < j:
//!                       w(k, j) + best(i, k-1) + best(k+1, j-1) )
//! ```
//!
//! The inner maximization only visits positions k that actually pair
//! with j in the input, so the fill is O(N²·d) for d candidate partners
//! per position, O(N³) worst case, with the full O(N²) table in memory.
//! Resolution is therefore guarded by a caller-tunable length limit.

use std::cmp::Ordering;

use log::debug;
use ndarray::Array2;
use nohash_hasher::IntMap;
use nohash_hasher::IntSet;

use kf_structure::NAIDX;
use kf_structure::P1KEY;
use kf_structure::Pair;
use kf_structure::PairSet;
use kf_structure::PairTable;
use kf_structure::StructureError;

use crate::GraphError;

/// Default upper bound on the sequence length accepted by the exact
/// strategy. At this length the table holds ~9M entries and the fill
/// visits on the order of 10⁹ candidates worst case.
pub const DEFAULT_MAX_LENGTH: usize = 3000;

/// Named resolution strategies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Strategy {
    /// Exact maximum-weight selection by dynamic programming.
    #[default]
    MaximumWeight,
    /// Repeatedly discard the pair with the most crossings. No
    /// optimality guarantee, but quadratic in the number of pairs and
    /// exempt from the length limit.
    ConflictElimination,
}

/// Computes maximum-weight crossing-free subsets of pair sets.
#[derive(Debug, Clone)]
pub struct PseudoknotResolver {
    max_length: usize,
}

impl Default for PseudoknotResolver {
    fn default() -> Self {
        Self {
            max_length: DEFAULT_MAX_LENGTH,
        }
    }
}

impl PseudoknotResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// A resolver with a custom length limit for the exact strategy.
    pub fn with_max_length(max_length: usize) -> Self {
        Self { max_length }
    }

    pub fn max_length(&self) -> usize {
        self.max_length
    }

    /// Resolve with uniform weight 1, i.e. keep as many pairs as possible.
    pub fn resolve(&self, pairs: &PairSet) -> Result<Resolution, GraphError> {
        self.resolve_weighted(pairs, |_| 1.0)
    }

    /// Resolve with a per-pair weight function. Weights must be positive;
    /// the result is the exact optimum among all crossing-free subsets,
    /// so a crossing-free input is always returned unchanged.
    pub fn resolve_weighted<W>(&self, pairs: &PairSet, weight: W) -> Result<Resolution, GraphError>
    where
        W: Fn(Pair) -> f64,
    {
        self.resolve_with(pairs, weight, Strategy::MaximumWeight)
    }

    /// Resolve with an explicitly named strategy.
    pub fn resolve_with<W>(
        &self,
        pairs: &PairSet,
        weight: W,
        strategy: Strategy,
    ) -> Result<Resolution, GraphError>
    where
        W: Fn(Pair) -> f64,
    {
        validate_endpoints(pairs)?;
        match strategy {
            Strategy::MaximumWeight => self.maximum_weight(pairs, weight),
            Strategy::ConflictElimination => Ok(conflict_elimination(pairs, weight)),
        }
    }

    fn maximum_weight<W>(&self, pairs: &PairSet, weight: W) -> Result<Resolution, GraphError>
    where
        W: Fn(Pair) -> f64,
    {
        let n = pairs.length();
        if n > self.max_length {
            return Err(GraphError::ResourceLimitExceeded {
                length: n,
                limit: self.max_length,
            });
        }
        if pairs.is_empty() {
            return Ok(Resolution {
                kept: pairs.clone(),
                removed: PairSet::new(n),
                weight: 0.0,
            });
        }

        // Candidate partners of j with their weights, ascending in k
        // (to_vec is sorted, so insertion order is already ascending).
        let mut partners_of: Vec<Vec<(usize, f64)>> = vec![Vec::new(); n + 1];
        for p in pairs.to_vec() {
            partners_of[p.j() as usize].push((p.i() as usize, weight(p)));
        }

        let mut best = Array2::<f64>::zeros((n + 1, n + 1));
        for span in 1..n {
            for i in 1..=(n - span) {
                let j = i + span;
                let mut opt = best[(i, j - 1)];
                for &(k, w) in &partners_of[j] {
                    if k < i {
                        continue;
                    }
                    let cand = w + best[(i, k - 1)] + best[(k + 1, j - 1)];
                    if cand > opt {
                        opt = cand;
                    }
                }
                best[(i, j)] = opt;
            }
        }

        let mut kept = PairSet::new(n);
        traceback(1, n, &best, &partners_of, &mut kept);
        let removed = difference(pairs, &kept);
        if !removed.is_empty() {
            debug!(
                "pseudoknot removal dropped {} of {} pairs: {}",
                removed.len(),
                pairs.len(),
                removed
            );
        }
        Ok(Resolution {
            kept,
            removed,
            weight: best[(1, n)],
        })
    }
}

/// Recover one optimal pair set from the filled table.
///
/// Candidate branches are recomputed with the same expression as the
/// fill, so the equality tests are bit-exact. On ties, a pairing branch
/// wins over leaving j unpaired, and the lowest k wins among pairing
/// branches; equal-weight optima therefore resolve deterministically to
/// the pair closest to the left edge of the subrange.
fn traceback(
    i: usize,
    j: usize,
    best: &Array2<f64>,
    partners_of: &[Vec<(usize, f64)>],
    kept: &mut PairSet,
) {
    if i >= j {
        return;
    }
    let target = best[(i, j)];
    if target == 0.0 {
        return;
    }
    for &(k, w) in &partners_of[j] {
        if k < i {
            continue;
        }
        if w + best[(i, k - 1)] + best[(k + 1, j - 1)] == target {
            kept.insert(Pair::new(k as NAIDX, j as NAIDX));
            traceback(i, k - 1, best, partners_of, kept);
            traceback(k + 1, j - 1, best, partners_of, kept);
            return;
        }
    }
    traceback(i, j - 1, best, partners_of, kept);
}

/// Heuristic elimination: drop the most-crossing pair until none cross.
///
/// Ties break by lower weight, then by higher packed key; the comparator
/// is total, so the victim is unique regardless of map iteration order.
fn conflict_elimination<W>(pairs: &PairSet, weight: W) -> Resolution
where
    W: Fn(Pair) -> f64,
{
    let v = pairs.to_vec();
    let mut conflicts: IntMap<P1KEY, IntSet<P1KEY>> = IntMap::default();
    for (a, p) in v.iter().enumerate() {
        for q in &v[a + 1..] {
            if p.crosses(q) {
                conflicts.entry(p.key()).or_default().insert(q.key());
                conflicts.entry(q.key()).or_default().insert(p.key());
            }
        }
    }

    let mut removed = PairSet::new(pairs.length());
    loop {
        let victim = conflicts
            .iter()
            .filter(|(_, set)| !set.is_empty())
            .max_by(|(ka, sa), (kb, sb)| {
                sa.len()
                    .cmp(&sb.len())
                    .then_with(|| {
                        weight(Pair::from_key(**kb))
                            .partial_cmp(&weight(Pair::from_key(**ka)))
                            .unwrap_or(Ordering::Equal)
                    })
                    .then(ka.cmp(kb))
            })
            .map(|(k, _)| *k);
        let Some(vk) = victim else { break };
        removed.insert(Pair::from_key(vk));
        let neighbors = conflicts.remove(&vk).unwrap_or_default();
        for nk in neighbors {
            if let Some(set) = conflicts.get_mut(&nk) {
                set.remove(&vk);
            }
        }
    }

    let kept = difference(pairs, &removed);
    if !removed.is_empty() {
        debug!(
            "conflict elimination dropped {} of {} pairs: {}",
            removed.len(),
            pairs.len(),
            removed
        );
    }
    let weight = kept.iter().map(&weight).sum();
    Resolution {
        kept,
        removed,
        weight,
    }
}

/// Reject inputs where one position occurs in two pairs: the selection
/// can never retain both, so the fixed-point contract would be broken.
fn validate_endpoints(pairs: &PairSet) -> Result<(), GraphError> {
    let mut seen: IntMap<NAIDX, NAIDX> = IntMap::default();
    for p in pairs.to_vec() {
        for (pos, other) in [(p.i(), p.j()), (p.j(), p.i())] {
            if let Some(&prev) = seen.get(&pos) {
                return Err(GraphError::Structure(StructureError::DoublePairing {
                    position: pos,
                    first: prev,
                    second: other,
                }));
            }
            seen.insert(pos, other);
        }
    }
    Ok(())
}

fn difference(all: &PairSet, subset: &PairSet) -> PairSet {
    let mut out = PairSet::new(all.length());
    for p in all.iter() {
        if !subset.contains(&p) {
            out.insert(p);
        }
    }
    out
}

/// Outcome of one resolution: the crossing-free subset that was kept,
/// the pairs that had to go, and the total weight achieved. Dropping
/// pairs is expected, recoverable behavior, reported here for audit.
#[derive(Debug, Clone, PartialEq)]
pub struct Resolution {
    kept: PairSet,
    removed: PairSet,
    weight: f64,
}

impl Resolution {
    pub fn kept(&self) -> &PairSet {
        &self.kept
    }

    pub fn removed(&self) -> &PairSet {
        &self.removed
    }

    pub fn weight(&self) -> f64 {
        self.weight
    }

    pub fn removed_count(&self) -> usize {
        self.removed.len()
    }

    /// True iff no pair was dropped.
    pub fn is_lossless(&self) -> bool {
        self.removed.is_empty()
    }

    /// Re-materialize the kept pairs as a crossing-free `PairTable`.
    pub fn to_table(&self) -> Result<PairTable, GraphError> {
        let pairs = self.kept.to_vec().into_iter().map(|p| (p.i(), p.j()));
        Ok(PairTable::from_pairs(self.kept.length(), pairs)?)
    }
}
