use std::fmt;

/// Errors surfaced by the haplotype-finding core.
///
/// A region that produces one of these is fatal for that region only;
/// `find_haplotypes` aggregates a failure flag across regions in its
/// `FindHaplotypesOutcome` rather than aborting the whole run, so other
/// contigs' output still comes back.
#[derive(Debug, Clone, PartialEq)]
pub enum HaplotypeError {
    /// Allocation-class failure while growing a tree node, haplotype string,
    /// or record array. Kept for fidelity with the C source's malloc-failure
    /// taxonomy even though safe Rust aborts on OOM rather than returning here.
    Allocation(String),
    /// The consensus or read-store oracle failed to answer for a region.
    Oracle(String),
    /// An invariant the core relies on did not hold. Indicates a bug.
    InvariantViolation(String),
}

impl fmt::Display for HaplotypeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HaplotypeError::Allocation(msg) => write!(f, "allocation failure: {}", msg),
            HaplotypeError::Oracle(msg) => write!(f, "oracle failure: {}", msg),
            HaplotypeError::InvariantViolation(msg) => {
                write!(f, "invariant violation: {}", msg)
            }
        }
    }
}

impl std::error::Error for HaplotypeError {}
