pub mod clustering_engine;
pub mod filter;
pub mod haplotype_index;
pub mod haplotype_string;

pub use clustering_engine::ClusteringEngine;
pub use filter::{filter, reclist, Haplotype};
pub use haplotype_index::HaplotypeIndex;
pub use haplotype_string::HaplotypeString;
