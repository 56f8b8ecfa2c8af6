//! # Core Module
//!
//! Stateless building blocks of the repeatskmer pipeline.
//!
//! ## Architecture
//!
//! - **Structural Representation** ([`models`]) - Structures, chains, residues and regions
//! - **Residue Identifiers** ([`utils`]) - The naturally ordered [`utils::identifiers::ResidueKey`]
//! - **File I/O** ([`io`]) - PDB and mmCIF readers, region and sequence tables
//!
//! Nothing in this layer holds shared state; concurrency and orchestration
//! live in [`crate::engine`] and [`crate::workflows`].

pub mod io;
pub mod models;
pub mod utils;
