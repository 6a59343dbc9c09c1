//! Projects raw reads onto the SNP-index grid, producing the fragments the
//! haplotype index consumes. Grounded on `find_haplotypes`'s read loop and
//! `clip_pair` in the original source.

use std::collections::HashMap;

use log::trace;

use crate::oracle::{ReadOracle, RecordId, ReadRecord};
use crate::snp_site::SnpSiteList;
use crate::HaplotypeError;

/// One read's (or read pair's) observations projected onto the SNP grid,
/// ready for `HaplotypeIndex::add_fragment`. `start_idx`/`end_idx` are
/// indices into the region's `SnpSiteList`, not genomic coordinates.
pub struct Fragment {
    pub snps: Vec<u8>,
    pub start_idx: i64,
    pub end_idx: i64,
    pub rec1: RecordId,
    pub rec2: Option<RecordId>,
}

/// Complements a single IUPAC base; anything not in `ACGT` (including `N`
/// and the gap/pad markers) passes through unchanged.
pub fn complement_base(b: u8) -> u8 {
    match b {
        b'A' => b'T',
        b'C' => b'G',
        b'G' => b'C',
        b'T' => b'A',
        b'a' => b't',
        b'c' => b'g',
        b'g' => b'c',
        b't' => b'a',
        other => other,
    }
}

/// Computes the clip bounds for one read within `[region_start, region_end]`
/// using the original's orientation rule: whether the read's stored length
/// is negative and whether its complement flag is set are XORed to decide
/// which end gets the stricter (clip-aware) bound.
fn clipped_bounds(read: &ReadRecord, region_start: i64, region_end: i64) -> (i64, i64) {
    let reversed = (read.length < 0) ^ read.complement_flag;

    let (mut left, mut right) = if reversed {
        (read.start + read.clip_right, read.end - read.clip_left)
    } else {
        (read.start + read.clip_left, read.end - read.clip_right)
    };

    left = left.max(read.start).max(region_start);
    right = right.min(read.end).min(region_end);

    (left, right)
}

/// Returns the base a read contributes at genomic position `pos`, applying
/// complementation using the same `(length < 0) XOR complement_flag`
/// orientation rule `clipped_bounds` uses -- the stored length's sign and
/// the record's own strand flag are independent bits, and it's their XOR
/// that decides whether the base is read complemented.
fn base_at(read: &ReadRecord, pos: i64) -> u8 {
    let offset = pos - read.start;
    let base = read.base(offset);
    let reversed = (read.length < 0) ^ read.complement_flag;
    if reversed {
        complement_base(base)
    } else {
        base
    }
}

/// Projects every read overlapping `[region_start, region_end]` onto
/// `sites`, fusing mate pairs when `pair_aware` is set. Returns one
/// `Fragment` per read or per fused pair.
///
/// Pairing sentinel resolution (see DESIGN.md): for each read keyed by its
/// mate's record id, the *first-encountered* (lower array index) mate has
/// its fragment suppressed and instead folds into the *second-encountered*
/// mate's fragment -- this mirrors `rng[hi->data.i].pair_rec = -i` in the
/// original exactly, which rewrites the earlier-seen read's pair_rec to the
/// negative index of the later one, not the other way around.
pub fn project_reads<O: ReadOracle>(
    oracle: &O,
    contig: &str,
    region_start: i64,
    region_end: i64,
    sites: &SnpSiteList,
    pair_aware: bool,
) -> Result<Vec<Fragment>, HaplotypeError> {
    let reads = oracle.reads(contig, region_start, region_end)?;

    // Maps a read's own record id to its index in `reads`, so a
    // later-encountered mate can find and fuse with the earlier one.
    let mut seen: HashMap<RecordId, usize> = HashMap::new();
    // index -> index of the earlier mate it should be fused with, if any.
    let mut fuse_into: Vec<Option<usize>> = vec![None; reads.len()];
    // indices that should be skipped entirely because they were folded into
    // a later mate.
    let mut suppressed = vec![false; reads.len()];

    if pair_aware {
        for (i, read) in reads.iter().enumerate() {
            if read.pair_rec <= 0 {
                continue;
            }
            let mate_id = read.pair_rec as RecordId;
            if let Some(&earlier_idx) = seen.get(&mate_id) {
                // `i` is the later-encountered mate: it absorbs the earlier
                // one's observations. The earlier read is suppressed.
                fuse_into[i] = Some(earlier_idx);
                suppressed[earlier_idx] = true;
                trace!(
                    "fusing read pair: rec {} (earlier) into rec {} (later)",
                    reads[earlier_idx].rec_id,
                    read.rec_id
                );
            } else {
                seen.insert(read.rec_id, i);
            }
        }
    }

    let mut fragments = Vec::new();

    for (i, read) in reads.iter().enumerate() {
        if suppressed[i] {
            continue;
        }

        let (left, right) = clipped_bounds(read, region_start, region_end);
        if left > right {
            continue;
        }

        let mut lo_idx = sites.as_slice().partition_point(|s| s.pos < left);
        let mut hi_idx = sites.as_slice().partition_point(|s| s.pos <= right);

        let earlier = fuse_into[i].map(|earlier_idx| &reads[earlier_idx]);
        let earlier_bounds = earlier.and_then(|e| {
            let (elo, ehi) = clipped_bounds(e, region_start, region_end);
            if elo > ehi {
                return None;
            }
            let elo_idx = sites.as_slice().partition_point(|s| s.pos < elo);
            let ehi_idx = sites.as_slice().partition_point(|s| s.pos <= ehi);
            if elo_idx >= ehi_idx {
                None
            } else {
                Some((elo_idx, ehi_idx))
            }
        });

        // The fragment's snp-index span must cover both mates, including
        // the gap between them, so the earlier mate's positions aren't
        // silently dropped when they fall outside the later mate's own
        // clipped range.
        if let Some((elo_idx, ehi_idx)) = earlier_bounds {
            lo_idx = lo_idx.min(elo_idx);
            hi_idx = hi_idx.max(ehi_idx);
        }

        if lo_idx >= hi_idx {
            continue;
        }

        let start_idx = lo_idx as i64;
        let end_idx = (hi_idx - 1) as i64;
        let mut snps = vec![b'-'; hi_idx - lo_idx];

        for (offset, site) in sites.as_slice()[lo_idx..hi_idx].iter().enumerate() {
            let pos = site.pos;
            if pos >= read.start && pos <= read.end {
                snps[offset] = base_at(read, pos);
            }
        }

        let mut rec2 = None;
        if let Some(e) = earlier {
            if let Some((elo_idx, ehi_idx)) = earlier_bounds {
                for (pos_idx, site) in sites.as_slice()[elo_idx..ehi_idx].iter().enumerate() {
                    let global_idx = elo_idx + pos_idx;
                    let b = base_at(e, site.pos);
                    if b != b'-' && snps[global_idx - lo_idx] == b'-' {
                        snps[global_idx - lo_idx] = b;
                    }
                }
            }
            rec2 = Some(e.rec_id);
        }

        fragments.push(Fragment {
            snps,
            start_idx,
            end_idx,
            rec1: read.rec_id,
            rec2,
        });
    }

    Ok(fragments)
}
