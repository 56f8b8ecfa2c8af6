//! Parallel execution units used by the workflows.
//!
//! `region_batch` owns the worker pool: partitioning, the bounded result
//! channel and in-order delivery to a single consumer.

pub mod region_batch;
