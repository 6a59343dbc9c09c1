use crate::error::HaplotypeError;

/// Identifier for a single read or read-pair record, as handed back by the
/// read store oracle and carried through to the final per-group output.
pub type RecordId = u64;

/// One position's worth of consensus evidence, as returned by the consensus
/// oracle. The oracle itself (scoring model, pileup construction) is an
/// external collaborator and is not implemented here -- this is just the
/// shape of its answer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConsensusCall {
    pub primary_call: u8,
    pub het_call: (u8, u8),
    pub het_score: f64,
    pub discrep_score: f64,
}

/// A single read or read-pair-half record, as returned by the read store
/// oracle for a queried range. Fields mirror the `rangec_t` / `seq_t`
/// contract described in the spec: `length` sign-encodes orientation the
/// same way the original's `s->len` does, and `complement_flag` is the
/// record's own strand flag; the actual strand used for base lookup is the
/// XOR of the two.
#[derive(Debug, Clone)]
pub struct ReadRecord {
    pub rec_id: RecordId,
    /// Leftmost aligned (unclipped) contig coordinate.
    pub start: i64,
    /// Rightmost aligned (unclipped) contig coordinate.
    pub end: i64,
    /// Signed stored-sequence length; negative encodes reverse orientation.
    pub length: i64,
    pub complement_flag: bool,
    /// Mate's record id, or a negative sentinel once pairing has rewritten
    /// it (see `crate::projector`). Oracles should populate this with the
    /// mate's `rec_id`, or the record's own `rec_id` when unpaired.
    pub pair_rec: i64,
    /// False for non-sequence range entries (e.g. consensus markers) that
    /// share the read store's range index but carry no bases.
    pub is_sequence: bool,
    /// Number of bases clipped from the left (genomically leftmost) end,
    /// before orientation is taken into account. Zero if unclipped there.
    pub clip_left: i64,
    /// Number of bases clipped from the right end. Zero if unclipped there.
    pub clip_right: i64,
    pub bases: Vec<u8>,
}

impl ReadRecord {
    pub fn base(&self, offset: i64) -> u8 {
        self.bases[offset as usize]
    }
}

/// A contiguous genomic region on one contig to find haplotypes over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ContigRegion<'a> {
    pub contig: &'a str,
    pub start: i64,
    pub end: i64,
}

/// The consensus caller, treated as an oracle. Given a region, returns one
/// `ConsensusCall` per position in `[start, end]`, ordered ascending by
/// position. Not implemented by this crate -- non-goal.
pub trait ConsensusOracle: Sync {
    fn consensus(
        &self,
        contig: &str,
        start: i64,
        end: i64,
    ) -> Result<Vec<ConsensusCall>, HaplotypeError>;
}

/// The read store, treated as an oracle. Given a region, returns reads
/// sorted by leftmost clipped position ascending -- the core's projector
/// relies on this ordering and does not re-sort. Not implemented by this
/// crate -- non-goal.
pub trait ReadOracle: Sync {
    fn reads(&self, contig: &str, start: i64, end: i64) -> Result<Vec<ReadRecord>, HaplotypeError>;
}
