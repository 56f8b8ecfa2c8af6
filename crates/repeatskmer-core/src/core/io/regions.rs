use crate::core::models::region::{Region, RegionRecord};
use serde::{Deserialize, Serialize};
use std::io::{self, Read, Write};
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RegionIoError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

/// A row of a reconstructed-sequence table, the input of k-mer counting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SequenceRecord {
    pub region_id: String,
    #[serde(default, alias = "repeatsdb_id")]
    pub unit_id: Option<String>,
    #[serde(alias = "class_topology_fold_clan")]
    pub label: String,
    #[serde(default)]
    pub sequence: Option<String>,
}

#[derive(Debug, Serialize)]
struct SequenceTableRow<'a> {
    region_id: &'a str,
    unit_id: Option<&'a str>,
    structure_id: &'a str,
    chain_id: &'a str,
    start: isize,
    end: isize,
    label: &'a str,
    #[serde(rename = "type")]
    unit_types: String,
    sequence: Option<&'a str>,
}

const UNIT_TYPE_SEPARATOR: &str = ";";

pub fn read_region_records(reader: impl Read) -> Result<Vec<RegionRecord>, RegionIoError> {
    let mut csv_reader = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);
    let records = csv_reader
        .deserialize()
        .collect::<Result<Vec<RegionRecord>, _>>()?;
    Ok(records)
}

pub fn read_region_records_from_path<P: AsRef<Path>>(
    path: P,
) -> Result<Vec<RegionRecord>, RegionIoError> {
    read_region_records(std::fs::File::open(path)?)
}

/// Reads a sequence table; empty sequence and unit id cells become `None`.
pub fn read_sequence_records(reader: impl Read) -> Result<Vec<SequenceRecord>, RegionIoError> {
    let mut csv_reader = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);
    let mut records = Vec::new();
    for result in csv_reader.deserialize() {
        let mut record: SequenceRecord = result?;
        if record.sequence.as_deref().is_some_and(str::is_empty) {
            record.sequence = None;
        }
        if record.unit_id.as_deref().is_some_and(str::is_empty) {
            record.unit_id = None;
        }
        records.push(record);
    }
    Ok(records)
}

pub fn read_sequence_records_from_path<P: AsRef<Path>>(
    path: P,
) -> Result<Vec<SequenceRecord>, RegionIoError> {
    read_sequence_records(std::fs::File::open(path)?)
}

/// Writes regions with their reconstructed sequences; regions whose retrieval
/// failed get an empty sequence cell. The `type` column lists the unit types
/// collected for the region, separated by `;`.
pub fn write_sequence_table(regions: &[Region], writer: impl Write) -> Result<(), RegionIoError> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    for region in regions {
        csv_writer.serialize(SequenceTableRow {
            region_id: &region.region_id,
            unit_id: region.unit_id.as_deref(),
            structure_id: &region.structure_id,
            chain_id: &region.chain_id,
            start: region.start,
            end: region.end,
            label: &region.label,
            unit_types: region.unit_types.join(UNIT_TYPE_SEPARATOR),
            sequence: region.sequence(),
        })?;
    }
    csv_writer.flush()?;
    Ok(())
}

pub fn write_sequence_table_to_path<P: AsRef<Path>>(
    regions: &[Region],
    path: P,
) -> Result<(), RegionIoError> {
    let file = std::fs::File::create(path)?;
    write_sequence_table(regions, io::BufWriter::new(file))
}
