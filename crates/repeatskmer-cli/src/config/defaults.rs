use repeatskmer::engine::config::{CountingMode, DEFAULT_NON_KMER_COLUMNS, MissingCell};
use std::num::NonZeroUsize;
use std::thread;

pub struct DefaultsConfig {
    pub workers: usize,
    pub k: usize,
    pub mode: CountingMode,
    pub separator: char,
    pub missing_cell: MissingCell,
    pub columns: Vec<String>,
    pub skip_empty_sequences: bool,
    pub merge_regions: bool,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            workers: thread::available_parallelism()
                .map(NonZeroUsize::get)
                .unwrap_or(1),
            k: 3,
            mode: CountingMode::Cumulative,
            separator: ',',
            missing_cell: MissingCell::Empty,
            columns: DEFAULT_NON_KMER_COLUMNS.iter().map(|c| c.to_string()).collect(),
            skip_empty_sequences: false,
            merge_regions: false,
        }
    }
}
