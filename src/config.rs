/// Tunables threaded through `find_haplotypes`. Not a CLI or config-file
/// layer (that's an explicit non-goal) -- just the in-process knobs the
/// core's engines accept, the same way `HaplotypeClusteringEngine::new`
/// takes its thresholds as constructor arguments rather than reaching for
/// globals.
#[derive(Debug, Clone)]
pub struct HaplotypeFinderConfig {
    /// If true, mated reads are fused into a single fragment spanning both
    /// mates with gap-fill between them. If false every read is projected
    /// independently.
    pub pairs: bool,
    /// Minimum heterozygosity score for a position to become a SNP site.
    pub het_score: f64,
    /// A position is also a SNP site when its discrepancy score exceeds this
    /// threshold (logical OR with `het_score`).
    pub discrep_score: f64,
    /// Any haplotype group with fewer merged reads than this is dropped.
    pub min_count: u32,
    /// Accept haplotype_str_add candidates whose interval merely *contains*
    /// the incoming fragment, rather than requiring an exact interval match.
    /// Off by default: the shipping C configuration disables this with a
    /// comment that it yields poorer matches, and this crate preserves that
    /// default.
    pub allow_containments: bool,
    /// Priority key used to rank haplotype strings as cluster anchors,
    /// `(len, nseq) -> priority`, larger sorts first. Defaults to
    /// `floor(sqrt(len) * nseq)`.
    pub priority_fn: fn(len: i64, nseq: u32) -> f64,
}

impl HaplotypeFinderConfig {
    /// `floor(sqrt(len) * nseq)`, matching the original's `int nl = sqrt(...)
    /// * nseq` truncation exactly rather than sorting on the un-floored
    /// float product.
    pub fn default_priority(len: i64, nseq: u32) -> f64 {
        ((len as f64).sqrt() * nseq as f64).floor()
    }
}

impl Default for HaplotypeFinderConfig {
    fn default() -> Self {
        HaplotypeFinderConfig {
            pairs: false,
            het_score: 0.0,
            discrep_score: f64::INFINITY,
            min_count: 1,
            allow_containments: false,
            priority_fn: HaplotypeFinderConfig::default_priority,
        }
    }
}
