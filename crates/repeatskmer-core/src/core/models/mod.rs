//! # Core Models Module
//!
//! Residue-level data structures for structural records and the regions cut
//! out of them.
//!
//! ## Key Components
//!
//! - [`structure`] - Parsed structures: models, chains, residues and the
//!   supplemental missing-residue listing
//! - [`chain`] - Per-model chain with residues in file order
//! - [`residue`] - Structural residues and the three-letter to one-letter table
//! - [`region`] - Regions, their identifiers and upstream query records
//! - [`ids`] - Stable slot-map keys for chains and residues
//!
//! ## Usage
//!
//! ```ignore
//! use repeatskmer::core::models::structure::StructureBuilder;
//!
//! let mut builder = StructureBuilder::new("1abc");
//! builder.start_model(1);
//! builder.add_residue("A", 1, None, "ALA");
//! let structure = builder.build();
//! ```

pub mod chain;
pub mod ids;
pub mod region;
pub mod residue;
pub mod structure;
