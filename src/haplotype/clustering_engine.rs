use log::{debug, trace};

use crate::config::HaplotypeFinderConfig;
use crate::haplotype::haplotype_index::HaplotypeIndex;
use crate::interval_tree::IntervalHandle;

/// Greedy, block-bounded haplotype clustering (`haplotype_str_cluster` /
/// `haplotype_str_cluster_subregion` in the original). Operates in place on
/// a `HaplotypeIndex`, merging compatible strings within each block and
/// tombstoning (`nseq = 0`) the ones merged away. Never mutates a live
/// node's tree key -- see the module note on `merge_into`.
pub struct ClusteringEngine<'a> {
    config: &'a HaplotypeFinderConfig,
}

impl<'a> ClusteringEngine<'a> {
    pub fn new(config: &'a HaplotypeFinderConfig) -> Self {
        ClusteringEngine { config }
    }

    /// Partitions the index into contiguous blocks by running-max-end, then
    /// clusters each block independently. Two haplotype strings land in the
    /// same block iff one starts before the running max-end of everything
    /// seen so far in the current block -- i.e. the blocks are exactly the
    /// connected components of the "overlaps transitively" relation over
    /// interval starts taken in sorted order.
    pub fn cluster(&self, index: &mut HaplotypeIndex) {
        let all: Vec<IntervalHandle> = index.tree().range_iter(i64::MIN, i64::MAX).collect();
        if all.is_empty() {
            return;
        }

        let mut blocks: Vec<Vec<IntervalHandle>> = Vec::new();
        let mut current: Vec<IntervalHandle> = Vec::new();
        let mut longest_end = i64::MIN;

        for handle in all {
            let (start, end) = index.tree().key(handle);
            if !current.is_empty() && start > longest_end {
                blocks.push(std::mem::take(&mut current));
                longest_end = i64::MIN;
            }
            current.push(handle);
            longest_end = longest_end.max(end);
        }
        if !current.is_empty() {
            blocks.push(current);
        }

        debug!("clustering {} block(s)", blocks.len());
        for block in blocks {
            self.cluster_subregion(index, block);
        }
    }

    /// Clusters a single block: sort by descending priority (by default
    /// `sqrt(len) * nseq`, see `HaplotypeFinderConfig::priority_fn`), then
    /// sweep each still-live string as an anchor, absorbing every other
    /// live, compatible string in the block into it. Whenever anything gets
    /// recruited, the sweep restarts from the same anchor position -- a
    /// later recruit may now be compatible with strings an earlier pass
    /// skipped -- mirroring the original's `goto again` retry.
    fn cluster_subregion(&self, index: &mut HaplotypeIndex, mut block: Vec<IntervalHandle>) {
        block.sort_by(|&a, &b| {
            let pa = self.priority(index, a);
            let pb = self.priority(index, b);
            pb.partial_cmp(&pa)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| {
                    let (sa, _) = index.tree().key(a);
                    let (sb, _) = index.tree().key(b);
                    sa.cmp(&sb)
                })
                .then_with(|| {
                    let (_, ea) = index.tree().key(a);
                    let (_, eb) = index.tree().key(b);
                    ea.cmp(&eb)
                })
        });

        for anchor_pos in 0..block.len() {
            loop {
                let anchor = block[anchor_pos];
                if index.tree().get(anchor).map_or(true, |h| h.is_tombstoned()) {
                    break;
                }

                let mut recruited_any = false;
                for &candidate in block.iter().skip(anchor_pos + 1) {
                    if candidate == anchor {
                        continue;
                    }
                    let is_tombstoned = index
                        .tree()
                        .get(candidate)
                        .map_or(true, |h| h.is_tombstoned());
                    if is_tombstoned {
                        continue;
                    }
                    if self.compatible(index, anchor, candidate) {
                        self.merge_into(index, anchor, candidate);
                        recruited_any = true;
                    }
                }

                if !recruited_any {
                    break;
                }
                trace!("anchor {:?} recruited, retrying from anchor", anchor);
            }
        }
    }

    fn priority(&self, index: &HaplotypeIndex, handle: IntervalHandle) -> f64 {
        let (start, end) = index.tree().key(handle);
        let nseq = index.tree().get(handle).map_or(0, |h| h.nseq);
        (self.config.priority_fn)(end - start + 1, nseq)
    }

    /// Two strings are recruitable into one another iff their *current*
    /// logical intervals overlap (`iv2->start > iv_end || iv2->end <
    /// iv_start` rules a candidate out in the original) and, over that
    /// overlap, they agree at every position both of them have actually
    /// observed (ignoring `-` positions); they need not share the same
    /// `(start, end)` tree key, only overlap logically.
    fn compatible(&self, index: &HaplotypeIndex, a: IntervalHandle, b: IntervalHandle) -> bool {
        let ha = index.tree().get(a).unwrap();
        let hb = index.tree().get(b).unwrap();
        let lo = ha.start.max(hb.start);
        let hi = ha.end.min(hb.end);
        if lo > hi {
            // Disjoint intervals never overlap and are never recruitable,
            // regardless of having no conflicting observations.
            return false;
        }
        for pos in lo..=hi {
            let xa = ha.snps[(pos - ha.start) as usize];
            let xb = hb.snps[(pos - hb.start) as usize];
            if xa != b'-' && xb != b'-' && xa != xb {
                return false;
            }
        }
        true
    }

    /// Folds `donor`'s observations into `anchor` and tombstones `donor`.
    /// `anchor`'s tree key is never touched: per the original's warning,
    /// changing a live node's `(start, end)` in place corrupts the tree and
    /// breaks subsequent deletion. If `donor` observed positions outside
    /// `anchor`'s current span, `anchor`'s *logical* string widens but its
    /// tree key does not follow -- the filter pass's final `reclist` walks
    /// logical data, not tree keys, so this is safe.
    fn merge_into(&self, index: &mut HaplotypeIndex, anchor: IntervalHandle, donor: IntervalHandle) {
        let donor_start;
        let donor_end;
        {
            let (ds, de) = index.tree().key(donor);
            donor_start = ds;
            donor_end = de;
        }

        let (anchor_payload, donor_payload) = index.tree_mut().get_pair_mut(anchor, donor);

        if donor_start < anchor_payload.start || donor_end > anchor_payload.end {
            let new_start = anchor_payload.start.min(donor_start);
            let new_end = anchor_payload.end.max(donor_end);
            let new_len = (new_end - new_start + 1) as usize;
            let mut snps = vec![b'-'; new_len];
            let mut count = vec![0u32; new_len];
            let shift = (anchor_payload.start - new_start) as usize;
            snps[shift..shift + anchor_payload.len()].copy_from_slice(&anchor_payload.snps);
            count[shift..shift + anchor_payload.len()].copy_from_slice(&anchor_payload.count);
            anchor_payload.start = new_start;
            anchor_payload.end = new_end;
            anchor_payload.snps = snps;
            anchor_payload.count = count;
        }

        for pos in donor_start..=donor_end {
            let base = donor_payload.snps[(pos - donor_start) as usize];
            if base != b'-' {
                let i = (pos - anchor_payload.start) as usize;
                let cnt = donor_payload.count[(pos - donor_start) as usize];
                anchor_payload.snps[i] = base;
                anchor_payload.count[i] += cnt;
            }
        }
        anchor_payload.nseq += donor_payload.nseq;
        anchor_payload.recs.append(&mut donor_payload.recs);
        donor_payload.nseq = 0;
    }
}
