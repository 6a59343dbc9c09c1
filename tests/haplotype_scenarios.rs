extern crate haplotype_cluster;

use haplotype_cluster::config::HaplotypeFinderConfig;
use haplotype_cluster::error::HaplotypeError;
use haplotype_cluster::oracle::{ConsensusCall, ConsensusOracle, ReadOracle, ReadRecord};
use haplotype_cluster::snp_site::SnpSiteList;
use haplotype_cluster::{filter, find_haplotypes_in_region, reclist, ClusteringEngine, HaplotypeIndex};

struct FixedConsensus {
    calls: Vec<ConsensusCall>,
}

impl ConsensusOracle for FixedConsensus {
    fn consensus(&self, _contig: &str, _start: i64, _end: i64) -> Result<Vec<ConsensusCall>, HaplotypeError> {
        Ok(self.calls.clone())
    }
}

struct FixedReads {
    reads: Vec<ReadRecord>,
}

impl ReadOracle for FixedReads {
    fn reads(&self, _contig: &str, _start: i64, _end: i64) -> Result<Vec<ReadRecord>, HaplotypeError> {
        Ok(self.reads.clone())
    }
}

fn het_call() -> ConsensusCall {
    ConsensusCall {
        primary_call: b'A',
        het_call: (b'A', b'C'),
        het_score: 1.0,
        discrep_score: 0.0,
    }
}

fn flat_call() -> ConsensusCall {
    ConsensusCall {
        primary_call: b'A',
        het_call: (b'A', b'A'),
        het_score: 0.0,
        discrep_score: 0.0,
    }
}

fn read(rec_id: u64, start: i64, end: i64, bases: &[u8]) -> ReadRecord {
    ReadRecord {
        rec_id,
        start,
        end,
        length: bases.len() as i64,
        complement_flag: false,
        pair_rec: rec_id as i64,
        is_sequence: true,
        clip_left: 0,
        clip_right: 0,
        bases: bases.to_vec(),
    }
}

#[test]
fn snp_site_list_only_includes_het_or_discrep_positions() {
    let calls = vec![flat_call(), het_call(), flat_call()];
    let sites = SnpSiteList::build(&calls, 100, 0.5, f64::INFINITY);
    assert_eq!(sites.len(), 1);
    assert_eq!(sites.as_slice()[0].pos, 101);
}

#[test]
fn two_reads_agreeing_at_every_site_merge_into_one_haplotype() {
    let calls = vec![het_call(), het_call(), het_call()];
    let consensus = FixedConsensus { calls };
    let reads = FixedReads {
        reads: vec![read(1, 0, 2, b"ACA"), read(2, 0, 2, b"ACA")],
    };
    let config = HaplotypeFinderConfig::default();

    let result = find_haplotypes_in_region("contig1", 0, 2, &consensus, &reads, &config).unwrap();
    assert_eq!(result.haplotypes.len(), 1);
    assert_eq!(result.haplotypes[0].nseq, 2);
    assert_eq!(result.haplotypes[0].snps, b"ACA");
}

#[test]
fn two_reads_disagreeing_stay_as_separate_haplotypes() {
    let calls = vec![het_call(), het_call(), het_call()];
    let consensus = FixedConsensus { calls };
    let reads = FixedReads {
        reads: vec![read(1, 0, 2, b"ACA"), read(2, 0, 2, b"ACC")],
    };
    let config = HaplotypeFinderConfig::default();

    let result = find_haplotypes_in_region("contig1", 0, 2, &consensus, &reads, &config).unwrap();
    assert_eq!(result.haplotypes.len(), 2);
    for h in &result.haplotypes {
        assert_eq!(h.nseq, 1);
    }
}

#[test]
fn min_count_filter_drops_low_support_haplotypes() {
    let calls = vec![het_call(), het_call()];
    let consensus = FixedConsensus { calls };
    let reads = FixedReads {
        reads: vec![
            read(1, 0, 1, b"AC"),
            read(2, 0, 1, b"AC"),
            read(3, 0, 1, b"CA"),
        ],
    };
    let mut config = HaplotypeFinderConfig::default();
    config.min_count = 2;

    let result = find_haplotypes_in_region("contig1", 0, 1, &consensus, &reads, &config).unwrap();
    assert_eq!(result.haplotypes.len(), 1);
    assert_eq!(result.haplotypes[0].nseq, 2);
}

#[test]
fn no_snp_sites_yields_no_haplotypes() {
    let calls = vec![flat_call(), flat_call()];
    let consensus = FixedConsensus { calls };
    let reads = FixedReads {
        reads: vec![read(1, 0, 1, b"AA")],
    };
    let config = HaplotypeFinderConfig::default();

    let result = find_haplotypes_in_region("contig1", 0, 1, &consensus, &reads, &config).unwrap();
    assert!(result.haplotypes.is_empty());
}

#[test]
fn clustering_engine_merges_compatible_strings_across_a_block() {
    let mut index = HaplotypeIndex::new();
    let frag_a = haplotype_cluster::projector::Fragment {
        snps: vec![b'A', b'C'],
        start_idx: 0,
        end_idx: 1,
        rec1: 1,
        rec2: None,
    };
    let frag_b = haplotype_cluster::projector::Fragment {
        snps: vec![b'-', b'C', b'G'],
        start_idx: 1,
        end_idx: 3,
        rec1: 2,
        rec2: None,
    };
    index.add_fragment(frag_a, false);
    index.add_fragment(frag_b, false);
    assert_eq!(index.len(), 2);

    let config = HaplotypeFinderConfig::default();
    let engine = ClusteringEngine::new(&config);
    engine.cluster(&mut index);

    filter(&mut index, 1);
    let haplotypes = reclist(&mut index);
    assert_eq!(haplotypes.len(), 1);
    assert_eq!(haplotypes[0].nseq, 2);
    assert_eq!(haplotypes[0].start, 0);
    assert_eq!(haplotypes[0].end, 3);
    // position 0 from frag_a, position 1 from frag_a (frag_b leaves it '-'),
    // positions 2-3 from frag_b.
    assert_eq!(haplotypes[0].snps, b"ACCG");
}

#[test]
fn read_pairing_fuses_mates_into_a_single_fragment() {
    let calls = vec![het_call(), het_call(), het_call(), het_call()];
    let consensus = FixedConsensus { calls };

    let mut r1 = read(1, 0, 1, b"AC");
    r1.pair_rec = 2;
    let mut r2 = read(2, 2, 3, b"GT");
    r2.pair_rec = 1;

    let reads = FixedReads { reads: vec![r1, r2] };
    let mut config = HaplotypeFinderConfig::default();
    config.pairs = true;

    let result = find_haplotypes_in_region("contig1", 0, 3, &consensus, &reads, &config).unwrap();
    assert_eq!(result.haplotypes.len(), 1);
    assert_eq!(result.haplotypes[0].snps, b"ACGT");
    assert_eq!(result.haplotypes[0].recs, vec![2, 1]);
}
