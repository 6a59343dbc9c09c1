//! Augmented interval-tree indexing and iterative haplotype clustering for
//! aligned read collections.
//!
//! Given a consensus oracle and a read oracle for a contig, `find_haplotypes`
//! locates SNP sites, projects overlapping reads onto the SNP grid, indexes
//! the resulting fragments in an augmented interval tree, clusters
//! compatible haplotype strings greedily within block-bounded subregions,
//! and returns the surviving haplotypes. See `SPEC_FULL.md` for the full
//! module breakdown this mirrors.

pub mod config;
pub mod error;
pub mod haplotype;
pub mod interval_tree;
pub mod oracle;
pub mod projector;
pub mod snp_site;

pub use config::HaplotypeFinderConfig;
pub use error::HaplotypeError;
pub use haplotype::{filter, reclist, ClusteringEngine, Haplotype, HaplotypeIndex};
pub use oracle::{ConsensusOracle, ReadOracle};
pub use snp_site::SnpSiteList;

use log::{error, info};
use rayon::prelude::*;

/// Everything `find_haplotypes` produced for one contig.
#[derive(Debug, Clone)]
pub struct ContigHaplotypes {
    pub contig: String,
    pub haplotypes: Vec<Haplotype>,
}

/// Aggregate result of `find_haplotypes` across every contig: the output of
/// every region that succeeded, plus a flag recording whether any region
/// failed. A failed region's oracle error is logged and that region is
/// omitted from `per_contig` -- it does not poison the output of its
/// siblings.
#[derive(Debug, Clone, Default)]
pub struct FindHaplotypesOutcome {
    pub per_contig: Vec<ContigHaplotypes>,
    pub failed: bool,
}

/// Runs the full pipeline -- SNP site discovery, read projection, indexing,
/// clustering, and filtering -- independently over every contig in
/// `contigs`, in parallel via `rayon`. This cross-region parallelism is an
/// addition over the original, which walks contigs serially; nothing in the
/// per-region algorithm is order-sensitive across contigs, so it parallelizes
/// cleanly once the oracle traits are `Sync` (see SPEC_FULL.md).
///
/// A region that errors does not abort the batch: its failure is logged and
/// folded into `FindHaplotypesOutcome::failed`, while every other region's
/// output is still returned in `per_contig`.
pub fn find_haplotypes<C, R>(
    contigs: &[(String, i64, i64)],
    consensus_oracle: &C,
    read_oracle: &R,
    config: &HaplotypeFinderConfig,
) -> FindHaplotypesOutcome
where
    C: ConsensusOracle,
    R: ReadOracle,
{
    let results: Vec<Result<ContigHaplotypes, HaplotypeError>> = contigs
        .par_iter()
        .map(|(contig, start, end)| find_haplotypes_in_region(contig, *start, *end, consensus_oracle, read_oracle, config))
        .collect();

    let mut outcome = FindHaplotypesOutcome::default();
    for (region, result) in contigs.iter().zip(results) {
        match result {
            Ok(contig_haplotypes) => outcome.per_contig.push(contig_haplotypes),
            Err(err) => {
                error!("{}:{}-{}: region failed: {}", region.0, region.1, region.2, err);
                outcome.failed = true;
            }
        }
    }
    outcome
}

/// Runs the pipeline over a single region. Exposed separately so callers
/// that already have their own parallelization strategy (or want a single
/// region) aren't forced through the `rayon` fan-out in `find_haplotypes`.
pub fn find_haplotypes_in_region<C, R>(
    contig: &str,
    region_start: i64,
    region_end: i64,
    consensus_oracle: &C,
    read_oracle: &R,
    config: &HaplotypeFinderConfig,
) -> Result<ContigHaplotypes, HaplotypeError>
where
    C: ConsensusOracle,
    R: ReadOracle,
{
    let calls = consensus_oracle.consensus(contig, region_start, region_end)?;
    let sites = SnpSiteList::build(&calls, region_start, config.het_score, config.discrep_score);
    info!(
        "{}:{}-{}: {} SNP site(s)",
        contig,
        region_start,
        region_end,
        sites.len()
    );

    if sites.is_empty() {
        return Ok(ContigHaplotypes {
            contig: contig.to_string(),
            haplotypes: Vec::new(),
        });
    }

    let fragments = projector::project_reads(
        read_oracle,
        contig,
        region_start,
        region_end,
        &sites,
        config.pairs,
    )?;

    let mut index = HaplotypeIndex::new();
    for fragment in fragments {
        index.add_fragment(fragment, config.allow_containments);
    }

    let engine = ClusteringEngine::new(config);
    engine.cluster(&mut index);

    filter(&mut index, config.min_count);
    let haplotypes = reclist(&mut index);

    info!(
        "{}:{}-{}: {} haplotype(s) after clustering",
        contig,
        region_start,
        region_end,
        haplotypes.len()
    );

    Ok(ContigHaplotypes {
        contig: contig.to_string(),
        haplotypes,
    })
}
