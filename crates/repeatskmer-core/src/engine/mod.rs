//! # Engine Module
//!
//! The stateful layer between the pure data models in [`crate::core`] and the
//! end-to-end [`crate::workflows`]. It turns regions into sequences and
//! sequences into k-mer tables, and runs that work in parallel.
//!
//! ## Architecture
//!
//! - **Configuration** ([`config`]) - Worker count, channel capacity, k-mer and table options
//! - **Structure Sources** ([`source`]) - Fetching parsed structures by id and format
//! - **Reconstruction** ([`reconstruct`]) - Rebuilding one-letter sequences from residues
//! - **Counting** ([`kmer`]) - Exact and cumulative k-mer counting
//! - **Tables** ([`table`]) - The dynamic-schema k-mer table writer
//! - **Region Preparation** ([`regions`]) - Grouping and validating raw region records
//! - **Partitioning** ([`partition`]) and the worker pool in `tasks`
//! - **Progress** ([`progress`]) and **Reports** ([`report`]) for feedback to callers
//! - **Error Handling** ([`error`])

pub mod config;
pub mod error;
pub mod kmer;
pub mod partition;
pub mod progress;
pub mod reconstruct;
pub mod regions;
pub mod report;
pub mod source;
pub mod table;
pub(crate) mod tasks;
