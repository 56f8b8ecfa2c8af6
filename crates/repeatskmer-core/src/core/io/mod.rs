//! Provides input/output functionality for structural files and region tables.
//!
//! Structural readers ([`pdb`], [`mmcif`]) reduce coordinate files to residue
//! level behind the [`traits::StructureFile`] interface. [`regions`] reads
//! upstream region queries and reads/writes reconstructed-sequence tables.

pub mod mmcif;
pub mod pdb;
pub mod regions;
pub mod traits;
