use crate::engine::config::{MissingCell, TableConfig};
use std::collections::HashMap;
use std::io::{self, Write};
use std::path::Path;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum TableError {
    #[error("Row has {actual} fixed fields but the table declares {expected}")]
    SchemaViolation { expected: usize, actual: usize },
    #[error("Table has already been finalized")]
    Finalized,
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

/// Ordered k-mer column names, grown as rows introduce new k-mers.
#[derive(Debug, Clone, Default)]
pub struct ColumnSchema {
    columns: Vec<String>,
    index: HashMap<String, usize>,
}

impl ColumnSchema {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn position(&self, kmer: &str) -> Option<usize> {
        self.index.get(kmer).copied()
    }

    fn position_or_append(&mut self, kmer: &str) -> usize {
        if let Some(&i) = self.index.get(kmer) {
            return i;
        }
        let i = self.columns.len();
        self.columns.push(kmer.to_string());
        self.index.insert(kmer.to_string(), i);
        i
    }
}

#[derive(Debug)]
struct BufferedRow {
    fields: Vec<String>,
    counts: Vec<(usize, u64)>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum WriterState {
    Open,
    Finalized,
}

/// Accumulates rows whose k-mer columns are not known up front.
///
/// Each row carries the fixed fields plus a sparse set of counts. A k-mer seen
/// for the first time appends a column; rows written before it get a missing
/// cell there once the table is finalized. Column order is the order in which
/// k-mers were first seen across all rows.
#[derive(Debug)]
pub struct KmerTableWriter {
    fixed_columns: Vec<String>,
    missing_cell: MissingCell,
    schema: ColumnSchema,
    rows: Vec<BufferedRow>,
    state: WriterState,
}

impl KmerTableWriter {
    pub fn new(fixed_columns: Vec<String>, missing_cell: MissingCell) -> Self {
        Self {
            fixed_columns,
            missing_cell,
            schema: ColumnSchema::new(),
            rows: Vec::new(),
            state: WriterState::Open,
        }
    }

    pub fn from_config(config: &TableConfig) -> Self {
        Self::new(config.non_kmer_columns.clone(), config.missing_cell)
    }

    pub fn schema(&self) -> &ColumnSchema {
        &self.schema
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn is_finalized(&self) -> bool {
        self.state == WriterState::Finalized
    }

    /// Appends a row. Zero counts are treated as absent.
    pub fn write_row<I, K>(&mut self, fields: Vec<String>, counts: I) -> Result<(), TableError>
    where
        I: IntoIterator<Item = (K, u64)>,
        K: AsRef<str>,
    {
        if self.state == WriterState::Finalized {
            return Err(TableError::Finalized);
        }
        if fields.len() != self.fixed_columns.len() {
            return Err(TableError::SchemaViolation {
                expected: self.fixed_columns.len(),
                actual: fields.len(),
            });
        }

        let counts = counts
            .into_iter()
            .filter(|(_, count)| *count > 0)
            .map(|(kmer, count)| (self.schema.position_or_append(kmer.as_ref()), count))
            .collect();
        self.rows.push(BufferedRow { fields, counts });
        Ok(())
    }

    /// Closes the writer and materializes the table with every row spanning the
    /// full column set.
    pub fn finalize(&mut self) -> Result<KmerTable, TableError> {
        if self.state == WriterState::Finalized {
            return Err(TableError::Finalized);
        }
        self.state = WriterState::Finalized;

        let width = self.schema.len();
        let missing = self.missing_cell.as_str();
        let rows = std::mem::take(&mut self.rows)
            .into_iter()
            .map(|row| {
                let mut cells = vec![missing.to_string(); width];
                for (column, count) in row.counts {
                    cells[column] = count.to_string();
                }
                let mut full = row.fields;
                full.extend(cells);
                full
            })
            .collect::<Vec<_>>();

        let mut header = self.fixed_columns.clone();
        header.extend(self.schema.columns().iter().cloned());
        debug!(
            rows = rows.len(),
            kmer_columns = width,
            "Finalized k-mer table."
        );
        Ok(KmerTable { header, rows })
    }
}

/// A finalized table where every row has a cell for every column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KmerTable {
    header: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl KmerTable {
    pub fn header(&self) -> &[String] {
        &self.header
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Writes the table as delimited text. Fields are written verbatim.
    pub fn write_to(&self, writer: impl Write, separator: u8) -> Result<(), TableError> {
        let mut out = csv::WriterBuilder::new()
            .delimiter(separator)
            .quote_style(csv::QuoteStyle::Never)
            .from_writer(writer);
        out.write_record(&self.header)?;
        for row in &self.rows {
            out.write_record(row)?;
        }
        out.flush()?;
        Ok(())
    }

    pub fn write_to_path<P: AsRef<Path>>(&self, path: P, separator: u8) -> Result<(), TableError> {
        let file = std::fs::File::create(path)?;
        self.write_to(io::BufWriter::new(file), separator)
    }

    pub fn to_delimited_string(&self, separator: u8) -> Result<String, TableError> {
        let mut buf = Vec::new();
        self.write_to(&mut buf, separator)?;
        String::from_utf8(buf).map_err(|e| TableError::Io(io::Error::new(io::ErrorKind::InvalidData, e)))
    }
}
