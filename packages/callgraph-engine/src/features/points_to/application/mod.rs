//! Finished points-to relation

pub mod pointer_analysis;

pub use pointer_analysis::PointerAnalysis;
