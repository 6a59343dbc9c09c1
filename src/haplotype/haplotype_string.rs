use crate::oracle::RecordId;

/// A partially-observed haplotype over the SNP grid: a run of bases, one
/// per SNP site in `[start, end]`, where `b'-'` means "not observed by any
/// read contributing to this group."
///
/// `count[i]` tracks *cumulative arrivals* at position `i`, not the number
/// of distinct reads that ever disagreed -- a read re-observing the same
/// base just increments the same counter a contributing merge already
/// bumped. This mirrors `add_haplotype_pos` in the original source exactly
/// and is preserved deliberately rather than "fixed" (see DESIGN.md).
#[derive(Debug, Clone)]
pub struct HaplotypeString {
    pub start: i64,
    pub end: i64,
    pub snps: Vec<u8>,
    pub count: Vec<u32>,
    pub nseq: u32,
    pub recs: Vec<RecordId>,
    /// Monotonic insertion order, used only to break ties in the
    /// clustering engine's priority sort for reproducible output.
    pub(crate) seq: u64,
}

impl HaplotypeString {
    pub(crate) fn from_fragment(
        start: i64,
        end: i64,
        snps: Vec<u8>,
        rec1: RecordId,
        rec2: Option<RecordId>,
        seq: u64,
    ) -> Self {
        debug_assert_eq!(snps.len(), (end - start + 1) as usize);
        let count = snps
            .iter()
            .map(|&c| if c == b'-' { 0 } else { 1 })
            .collect();
        let mut recs = Vec::with_capacity(2);
        recs.push(rec1);
        if let Some(r2) = rec2 {
            recs.push(r2);
        }
        HaplotypeString {
            start,
            end,
            snps,
            count,
            nseq: 1,
            recs,
            seq,
        }
    }

    /// A string with `nseq == 0` has had its data merged into another
    /// string by the clustering engine and is awaiting removal by the
    /// filter pass.
    pub fn is_tombstoned(&self) -> bool {
        self.nseq == 0
    }

    pub fn len(&self) -> usize {
        self.snps.len()
    }

    /// Checks the invariants from the data model section: array lengths
    /// agree, and every position is defined iff its count is nonzero.
    pub fn check_invariants(&self) -> Result<(), String> {
        let expected_len = (self.end - self.start + 1) as usize;
        if self.is_tombstoned() {
            return Ok(());
        }
        if self.snps.len() != expected_len || self.count.len() != expected_len {
            return Err(format!(
                "length mismatch: snps={} count={} expected={}",
                self.snps.len(),
                self.count.len(),
                expected_len
            ));
        }
        for (i, (&base, &count)) in self.snps.iter().zip(self.count.iter()).enumerate() {
            if (base == b'-') != (count == 0) {
                return Err(format!(
                    "position {}: base={} count={} violates snps[i]='-' <=> count[i]=0",
                    i, base as char, count
                ));
            }
        }
        Ok(())
    }
}
