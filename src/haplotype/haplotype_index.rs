use log::trace;

use crate::haplotype::haplotype_string::HaplotypeString;
use crate::interval_tree::{IntervalHandle, IntervalTree};
use crate::projector::Fragment;

/// The augmented interval index (component A) specialized to haplotype
/// strings (component B). Owns every haplotype string live in the current
/// region.
pub struct HaplotypeIndex {
    pub(crate) tree: IntervalTree<HaplotypeString>,
    next_seq: u64,
}

impl Default for HaplotypeIndex {
    fn default() -> Self {
        Self::new()
    }
}

impl HaplotypeIndex {
    pub fn new() -> Self {
        HaplotypeIndex {
            tree: IntervalTree::new(),
            next_seq: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.tree.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tree.is_empty()
    }

    pub fn tree(&self) -> &IntervalTree<HaplotypeString> {
        &self.tree
    }

    pub fn tree_mut(&mut self) -> &mut IntervalTree<HaplotypeString> {
        &mut self.tree
    }

    /// `haplotype_str_add`: compares `fragment` against the haplotype
    /// strings already in the index and either merges it into the best
    /// compatible one or inserts it as a new string.
    ///
    /// Strict mode (the default, `allow_containments == false`) only
    /// considers candidates whose interval matches the fragment's exactly,
    /// and stops at the first compatible one -- after each clustering pass
    /// there is at most one live string per `(start, end)` key, so ties
    /// among strict candidates shouldn't arise in practice, but the
    /// first-match behavior is preserved from the original regardless.
    ///
    /// Containment mode accepts any candidate whose interval contains the
    /// fragment and keeps the one with the largest overlap, widening it
    /// (delete, resize, reinsert) to cover the fragment if needed. It is
    /// opt-in and off by default -- see `HaplotypeFinderConfig`.
    pub fn add_fragment(&mut self, fragment: Fragment, allow_containments: bool) -> IntervalHandle {
        let Fragment {
            snps,
            start_idx,
            end_idx,
            rec1,
            rec2,
        } = fragment;

        let mut best: Option<(IntervalHandle, i64)> = None;

        for candidate in self.tree.range_iter(start_idx, end_idx) {
            let (c_start, c_end) = self.tree.key(candidate);

            if allow_containments {
                if !(c_start <= start_idx && c_end >= end_idx) {
                    continue;
                }
            } else if c_start != start_idx || c_end != end_idx {
                continue;
            }

            let payload = self.tree.get(candidate).unwrap();
            let lo = c_start.max(start_idx);
            let hi = c_end.min(end_idx);
            let mut overlap = 0i64;
            let mut compatible = true;
            for pos in lo..=hi {
                let a = payload.snps[(pos - c_start) as usize];
                let b = snps[(pos - start_idx) as usize];
                if a != b'-' && b != b'-' {
                    if a == b {
                        overlap += 1;
                    } else {
                        compatible = false;
                        break;
                    }
                }
            }
            if !compatible {
                continue;
            }

            if allow_containments {
                if best.map_or(true, |(_, best_overlap)| overlap > best_overlap) {
                    best = Some((candidate, overlap));
                }
            } else {
                best = Some((candidate, overlap));
                break;
            }
        }

        match best {
            Some((handle, _)) => self.merge_fragment_into(handle, snps, start_idx, end_idx, rec1, rec2),
            None => self.insert_new(snps, start_idx, end_idx, rec1, rec2),
        }
    }

    fn merge_fragment_into(
        &mut self,
        mut handle: IntervalHandle,
        snps: Vec<u8>,
        start_idx: i64,
        end_idx: i64,
        rec1: crate::oracle::RecordId,
        rec2: Option<crate::oracle::RecordId>,
    ) -> IntervalHandle {
        let (c_start, c_end) = self.tree.key(handle);
        if end_idx > c_end {
            // Containment mode only: the candidate needs widening to cover
            // the fragment. This is the one place the index legitimately
            // changes a live node's tree key, via remove-resize-reinsert
            // rather than mutating the key of a node still in the tree.
            let mut payload = self.tree.del(handle).unwrap();
            let new_len = (end_idx - payload.start + 1) as usize;
            payload.snps.resize(new_len, b'-');
            payload.count.resize(new_len, 0);
            payload.end = end_idx;
            handle = self.tree.add(payload.start, payload.end, payload);
        }

        let payload = self.tree.get_mut(handle).unwrap();
        for pos in start_idx..=end_idx {
            let frag_base = snps[(pos - start_idx) as usize];
            if frag_base != b'-' {
                let i = (pos - payload.start) as usize;
                payload.snps[i] = frag_base;
                payload.count[i] += 1;
            }
        }
        payload.nseq += 1;
        payload.recs.push(rec1);
        if let Some(r2) = rec2 {
            payload.recs.push(r2);
        }

        trace!(
            "merged fragment [{}, {}] into haplotype [{}, {}), nseq={}",
            start_idx,
            end_idx,
            c_start,
            c_end,
            payload.nseq
        );

        handle
    }

    fn insert_new(
        &mut self,
        snps: Vec<u8>,
        start_idx: i64,
        end_idx: i64,
        rec1: crate::oracle::RecordId,
        rec2: Option<crate::oracle::RecordId>,
    ) -> IntervalHandle {
        let seq = self.next_seq;
        self.next_seq += 1;
        let hstr = HaplotypeString::from_fragment(start_idx, end_idx, snps, rec1, rec2, seq);
        trace!("new haplotype [{}, {}]", start_idx, end_idx);
        self.tree.add(start_idx, end_idx, hstr)
    }
}
