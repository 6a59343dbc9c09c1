use log::debug;

use crate::haplotype::haplotype_index::HaplotypeIndex;
use crate::haplotype::haplotype_string::HaplotypeString;
use crate::oracle::RecordId;

/// A haplotype string that survived filtering, detached from the index.
#[derive(Debug, Clone)]
pub struct Haplotype {
    pub start: i64,
    pub end: i64,
    pub snps: Vec<u8>,
    pub count: Vec<u32>,
    pub nseq: u32,
    pub recs: Vec<RecordId>,
}

impl From<HaplotypeString> for Haplotype {
    fn from(h: HaplotypeString) -> Self {
        Haplotype {
            start: h.start,
            end: h.end,
            snps: h.snps,
            count: h.count,
            nseq: h.nseq,
            recs: h.recs,
        }
    }
}

/// `haplotype_str_filter`: removes every tombstoned string (merged away by
/// the clustering engine) and every live string whose `nseq` falls below
/// `min_count`, from the tree. Handles are staged into a side `Vec` while
/// iterating and deleted only after the iterator is dropped, per the tree's
/// mutation discipline.
pub fn filter(index: &mut HaplotypeIndex, min_count: u32) {
    let doomed: Vec<_> = index
        .tree()
        .range_iter(i64::MIN, i64::MAX)
        .filter(|&h| {
            let hs = index.tree().get(h).unwrap();
            hs.is_tombstoned() || hs.nseq < min_count
        })
        .collect();

    debug!("filter: removing {} haplotype string(s)", doomed.len());
    for handle in doomed {
        index.tree_mut().del(handle);
    }
}

/// `haplotype_str_reclist`: drains every surviving string out of the index
/// in ascending `(start, end)` order, handing ownership of each to the
/// caller. The index is left empty.
pub fn reclist(index: &mut HaplotypeIndex) -> Vec<Haplotype> {
    let handles: Vec<_> = index.tree().range_iter(i64::MIN, i64::MAX).collect();
    let mut out = Vec::with_capacity(handles.len());
    for handle in handles {
        if let Some(hs) = index.tree_mut().del(handle) {
            out.push(Haplotype::from(hs));
        }
    }
    out
}
