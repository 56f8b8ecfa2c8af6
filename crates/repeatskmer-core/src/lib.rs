//! # repeatskmer Core Library
//!
//! Reconstructs amino-acid sequences of structural regions (such as repeat
//! regions) from macromolecular structure files and turns them into k-mer
//! count tables whose columns are discovered on the fly.
//!
//! ## Architecture
//!
//! - **[`core`]: The Foundation.** Stateless data models (`Structure`,
//!   `Region`, `ResidueKey`), the residue translation table and readers for
//!   PDB, mmCIF and region/sequence tables.
//!
//! - **[`engine`]: The Logic Core.** Structure sources with format fallback,
//!   sequence reconstruction, k-mer counting, the dynamic-schema table writer
//!   and the partitioned worker pool.
//!
//! - **[`workflows`]: The Public API.** Complete runs from regions to sequences
//!   and from regions or sequences to k-mer tables.

pub mod core;
pub mod engine;
pub mod workflows;
