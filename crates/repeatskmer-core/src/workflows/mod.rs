//! # Workflows Module
//!
//! End-to-end entry points that tie [`crate::engine`] and [`crate::core`]
//! together.
//!
//! - **Sequence Reconstruction** ([`sequences`]) - Regions in, regions with
//!   one-letter sequences out.
//! - **K-mer Tables** ([`kmer_table`]) - Regions or sequence tables in, a
//!   dynamic-schema k-mer count table out.
//!
//! Both run on the parallel region pipeline: regions are partitioned across a
//! fixed number of workers and results are delivered to a single writer in
//! input order. Per-region failures are collected into a
//! [`BatchReport`](crate::engine::report::BatchReport) instead of aborting the
//! run.

pub mod kmer_table;
pub mod sequences;
