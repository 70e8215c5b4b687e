pub mod data;

pub use data::genotype::*;
