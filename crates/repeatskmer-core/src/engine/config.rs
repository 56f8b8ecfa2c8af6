use std::fmt;
use std::str::FromStr;
use thiserror::Error;

pub const DEFAULT_NON_KMER_COLUMNS: [&str; 3] = ["region_id", "label", "sequence"];
const CHANNEL_SLOTS_PER_WORKER: usize = 4;

#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum ConfigError {
    #[error("Missing required parameter: {0}")]
    MissingParameter(&'static str),
    #[error("Invalid value for '{name}': {reason}")]
    InvalidParameter { name: &'static str, reason: String },
}

/// Which substrings a k-mer count covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CountingMode {
    /// Only windows of exactly `k` residues.
    Exact,
    /// Windows of every length from 1 to `k`.
    #[default]
    Cumulative,
}

impl FromStr for CountingMode {
    type Err = ConfigError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "exact" => Ok(CountingMode::Exact),
            "cumulative" => Ok(CountingMode::Cumulative),
            other => Err(ConfigError::InvalidParameter {
                name: "mode",
                reason: format!("expected 'exact' or 'cumulative', got '{}'", other),
            }),
        }
    }
}

impl fmt::Display for CountingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}",
            match self {
                CountingMode::Exact => "exact",
                CountingMode::Cumulative => "cumulative",
            }
        )
    }
}

/// Cell emitted for a k-mer column a row has no count for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum MissingCell {
    #[default]
    Empty,
    Zero,
}

impl MissingCell {
    pub fn as_str(&self) -> &'static str {
        match self {
            MissingCell::Empty => "",
            MissingCell::Zero => "0",
        }
    }
}

impl FromStr for MissingCell {
    type Err = ConfigError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "empty" => Ok(MissingCell::Empty),
            "zero" | "0" => Ok(MissingCell::Zero),
            other => Err(ConfigError::InvalidParameter {
                name: "missing-cell",
                reason: format!("expected 'empty' or 'zero', got '{}'", other),
            }),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionConfig {
    pub workers: usize,
    pub channel_capacity: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KmerConfig {
    pub k: usize,
    pub mode: CountingMode,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableConfig {
    pub separator: u8,
    pub missing_cell: MissingCell,
    pub non_kmer_columns: Vec<String>,
    pub skip_empty_sequences: bool,
}

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            separator: b',',
            missing_cell: MissingCell::default(),
            non_kmer_columns: DEFAULT_NON_KMER_COLUMNS.iter().map(|c| c.to_string()).collect(),
            skip_empty_sequences: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineConfig {
    pub execution: ExecutionConfig,
    pub kmer: KmerConfig,
    pub table: TableConfig,
}

#[derive(Default)]
pub struct PipelineConfigBuilder {
    workers: Option<usize>,
    channel_capacity: Option<usize>,
    k: Option<usize>,
    mode: Option<CountingMode>,
    separator: Option<char>,
    missing_cell: Option<MissingCell>,
    non_kmer_columns: Option<Vec<String>>,
    skip_empty_sequences: Option<bool>,
}

impl PipelineConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn workers(mut self, n: usize) -> Self {
        self.workers = Some(n);
        self
    }
    pub fn channel_capacity(mut self, capacity: usize) -> Self {
        self.channel_capacity = Some(capacity);
        self
    }
    pub fn k(mut self, k: usize) -> Self {
        self.k = Some(k);
        self
    }
    pub fn mode(mut self, mode: CountingMode) -> Self {
        self.mode = Some(mode);
        self
    }
    pub fn separator(mut self, separator: char) -> Self {
        self.separator = Some(separator);
        self
    }
    pub fn missing_cell(mut self, cell: MissingCell) -> Self {
        self.missing_cell = Some(cell);
        self
    }
    pub fn non_kmer_columns(mut self, columns: Vec<String>) -> Self {
        self.non_kmer_columns = Some(columns);
        self
    }
    pub fn skip_empty_sequences(mut self, skip: bool) -> Self {
        self.skip_empty_sequences = Some(skip);
        self
    }

    pub fn build(self) -> Result<PipelineConfig, ConfigError> {
        let workers = self
            .workers
            .ok_or(ConfigError::MissingParameter("workers"))?;
        if workers == 0 {
            return Err(ConfigError::InvalidParameter {
                name: "workers",
                reason: "at least one worker is required".into(),
            });
        }
        let channel_capacity = self
            .channel_capacity
            .unwrap_or(workers * CHANNEL_SLOTS_PER_WORKER);
        if channel_capacity == 0 {
            return Err(ConfigError::InvalidParameter {
                name: "channel_capacity",
                reason: "must be positive".into(),
            });
        }

        let k = self.k.ok_or(ConfigError::MissingParameter("k"))?;
        if k == 0 {
            return Err(ConfigError::InvalidParameter {
                name: "k",
                reason: "k-mer length must be at least 1".into(),
            });
        }

        let defaults = TableConfig::default();
        let separator = match self.separator {
            None => defaults.separator,
            Some(c) => validate_separator(c)?,
        };
        let non_kmer_columns = self.non_kmer_columns.unwrap_or(defaults.non_kmer_columns);
        if non_kmer_columns.len() != DEFAULT_NON_KMER_COLUMNS.len() {
            return Err(ConfigError::InvalidParameter {
                name: "non_kmer_columns",
                reason: format!(
                    "expected {} names (region id, label, sequence), got {}",
                    DEFAULT_NON_KMER_COLUMNS.len(),
                    non_kmer_columns.len()
                ),
            });
        }

        Ok(PipelineConfig {
            execution: ExecutionConfig {
                workers,
                channel_capacity,
            },
            kmer: KmerConfig {
                k,
                mode: self.mode.unwrap_or_default(),
            },
            table: TableConfig {
                separator,
                missing_cell: self.missing_cell.unwrap_or(defaults.missing_cell),
                non_kmer_columns,
                skip_empty_sequences: self
                    .skip_empty_sequences
                    .unwrap_or(defaults.skip_empty_sequences),
            },
        })
    }
}

fn validate_separator(c: char) -> Result<u8, ConfigError> {
    let invalid = |reason: &str| ConfigError::InvalidParameter {
        name: "separator",
        reason: reason.to_string(),
    };
    if !c.is_ascii() {
        return Err(invalid("must be a single ASCII character"));
    }
    if c.is_ascii_alphanumeric() || matches!(c, '\n' | '\r' | '"') {
        return Err(invalid("cannot be a letter, digit, quote or line break"));
    }
    Ok(c as u8)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn build_applies_defaults_for_optional_parameters() {
        let config = PipelineConfigBuilder::new().workers(3).k(2).build().unwrap();
        assert_eq!(config.execution.workers, 3);
        assert_eq!(config.execution.channel_capacity, 12);
        assert_eq!(config.kmer.mode, CountingMode::Cumulative);
        assert_eq!(config.table.separator, b',');
        assert_eq!(config.table.missing_cell, MissingCell::Empty);
        assert_eq!(
            config.table.non_kmer_columns,
            vec!["region_id", "label", "sequence"]
        );
        assert!(!config.table.skip_empty_sequences);
    }

    #[test]
    fn build_requires_workers_and_k() {
        assert_eq!(
            PipelineConfigBuilder::new().k(2).build().unwrap_err(),
            ConfigError::MissingParameter("workers")
        );
        assert_eq!(
            PipelineConfigBuilder::new().workers(1).build().unwrap_err(),
            ConfigError::MissingParameter("k")
        );
    }

    #[test]
    fn build_rejects_zero_values() {
        assert!(matches!(
            PipelineConfigBuilder::new().workers(0).k(2).build(),
            Err(ConfigError::InvalidParameter { name: "workers", .. })
        ));
        assert!(matches!(
            PipelineConfigBuilder::new().workers(1).k(0).build(),
            Err(ConfigError::InvalidParameter { name: "k", .. })
        ));
        assert!(matches!(
            PipelineConfigBuilder::new()
                .workers(1)
                .k(1)
                .channel_capacity(0)
                .build(),
            Err(ConfigError::InvalidParameter {
                name: "channel_capacity",
                ..
            })
        ));
    }

    #[test]
    fn build_validates_separator_and_column_names() {
        let tab = PipelineConfigBuilder::new()
            .workers(1)
            .k(1)
            .separator('\t')
            .build()
            .unwrap();
        assert_eq!(tab.table.separator, b'\t');

        for bad in ['a', '7', '"', '\n', 'é'] {
            assert!(
                PipelineConfigBuilder::new()
                    .workers(1)
                    .k(1)
                    .separator(bad)
                    .build()
                    .is_err(),
                "separator {:?} should be rejected",
                bad
            );
        }

        assert!(matches!(
            PipelineConfigBuilder::new()
                .workers(1)
                .k(1)
                .non_kmer_columns(vec!["id".into(), "label".into()])
                .build(),
            Err(ConfigError::InvalidParameter {
                name: "non_kmer_columns",
                ..
            })
        ));
    }

    #[test]
    fn counting_mode_and_missing_cell_parse_case_insensitively() {
        assert_eq!("Exact".parse::<CountingMode>().unwrap(), CountingMode::Exact);
        assert_eq!(
            "CUMULATIVE".parse::<CountingMode>().unwrap(),
            CountingMode::Cumulative
        );
        assert!("sliding".parse::<CountingMode>().is_err());
        assert_eq!(CountingMode::Exact.to_string(), "exact");

        assert_eq!("zero".parse::<MissingCell>().unwrap(), MissingCell::Zero);
        assert_eq!("empty".parse::<MissingCell>().unwrap().as_str(), "");
        assert!("blank".parse::<MissingCell>().is_err());
    }
}
