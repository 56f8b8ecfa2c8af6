use thiserror::Error;

use super::config::ConfigError;
use super::partition::ZeroPartitionsError;
use super::table::TableError;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Initialization failed: {0}")]
    Initialization(String),

    #[error("Invalid configuration: {source}")]
    Config {
        #[from]
        source: ConfigError,
    },

    #[error("Work partitioning failed: {source}")]
    Partition {
        #[from]
        source: ZeroPartitionsError,
    },

    #[error("Table output failed: {source}")]
    Table {
        #[from]
        source: TableError,
    },

    #[error("Internal logic error: {0}")]
    Internal(String),
}
