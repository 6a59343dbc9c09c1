use log::debug;
use std::ops::Index;

use crate::oracle::ConsensusCall;

/// A genomic position flagged by the consensus oracle as carrying evidence
/// for two alleles.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SnpSite {
    pub pos: i64,
    pub score: f64,
}

/// Ordered, deduplicated sequence of SNP sites for one region. Built once
/// at region entry and owned by the region worker for its lifetime.
#[derive(Debug, Clone, Default)]
pub struct SnpSiteList(Vec<SnpSite>);

impl SnpSiteList {
    /// A position becomes a site when its heterozygosity score clears
    /// `het_threshold` OR its discrepancy score clears `discrep_threshold`
    /// -- the two entry criteria are ORed, not ANDed.
    pub fn build(
        calls: &[ConsensusCall],
        region_start: i64,
        het_threshold: f64,
        discrep_threshold: f64,
    ) -> Self {
        let mut sites = Vec::new();
        for (offset, call) in calls.iter().enumerate() {
            if call.het_score >= het_threshold || call.discrep_score >= discrep_threshold {
                let pos = region_start + offset as i64;
                debug!(
                    "snp site pos={} het={:.3} discrep={:.3}",
                    pos, call.het_score, call.discrep_score
                );
                sites.push(SnpSite {
                    pos,
                    score: call.het_score.max(call.discrep_score),
                });
            }
        }
        SnpSiteList(sites)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_slice(&self) -> &[SnpSite] {
        &self.0
    }
}

impl Index<usize> for SnpSiteList {
    type Output = SnpSite;

    fn index(&self, idx: usize) -> &SnpSite {
        &self.0[idx]
    }
}
