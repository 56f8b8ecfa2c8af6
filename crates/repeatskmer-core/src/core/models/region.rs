use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RegionError {
    #[error("Invalid region id '{0}': expected '<structure><chain>_<start>_<end>'")]
    InvalidRegionId(String),
    #[error("Region '{region_id}' has start {start} after end {end}")]
    InvertedBounds {
        region_id: String,
        start: isize,
        end: isize,
    },
    #[error(
        "Region '{region_id}' spans {start}..={end} in its records, which disagrees with the bounds in its id"
    )]
    BoundsMismatch {
        region_id: String,
        start: isize,
        end: isize,
    },
}

/// Start and end bounds encoded in a region identifier such as `2xqhA_36_294`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegionBounds {
    pub start: isize,
    pub end: isize,
}

impl RegionBounds {
    pub fn from_region_id(region_id: &str) -> Result<Self, RegionError> {
        let invalid = || RegionError::InvalidRegionId(region_id.to_string());
        let mut parts = region_id.rsplitn(3, '_');
        let end = parts.next().ok_or_else(invalid)?;
        let start = parts.next().ok_or_else(invalid)?;
        match parts.next() {
            Some(prefix) if !prefix.is_empty() => {}
            _ => return Err(invalid()),
        }
        Ok(Self {
            start: start.parse().map_err(|_| invalid())?,
            end: end.parse().map_err(|_| invalid())?,
        })
    }
}

/// A contiguous structural window to reconstruct and featurize.
///
/// `sequence` stays `None` until the region is reconstructed, and stays `None`
/// when retrieval failed. Regions cut per repeat unit carry a `unit_id`; the
/// `region_id` is shared by every unit of the same region.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Region {
    pub region_id: String,
    pub structure_id: String,
    pub chain_id: String,
    pub start: isize,
    pub end: isize,
    pub label: String,
    pub unit_id: Option<String>,
    pub unit_types: Vec<String>,
    sequence: Option<String>,
}

impl Region {
    pub fn new(
        region_id: &str,
        structure_id: &str,
        chain_id: &str,
        start: isize,
        end: isize,
        label: &str,
    ) -> Result<Self, RegionError> {
        if start > end {
            return Err(RegionError::InvertedBounds {
                region_id: region_id.to_string(),
                start,
                end,
            });
        }
        Ok(Self {
            region_id: region_id.to_string(),
            structure_id: structure_id.to_string(),
            chain_id: chain_id.to_string(),
            start,
            end,
            label: label.to_string(),
            unit_id: None,
            unit_types: Vec::new(),
            sequence: None,
        })
    }

    pub fn with_sequence(mut self, sequence: Option<String>) -> Self {
        self.sequence = sequence;
        self
    }

    pub fn sequence(&self) -> Option<&str> {
        self.sequence.as_deref()
    }

    /// The identifier a region's output row is keyed on: the unit id when the
    /// region is a single repeat unit, the region id otherwise.
    pub fn row_id(&self) -> &str {
        self.unit_id.as_deref().unwrap_or(&self.region_id)
    }
}

/// A raw row from an upstream region query, one per repeat unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegionRecord {
    pub region_id: String,
    #[serde(alias = "pdb_id")]
    pub structure_id: String,
    #[serde(alias = "pdb_chain")]
    pub chain_id: String,
    pub start: isize,
    pub end: isize,
    #[serde(alias = "class_topology_fold_clan")]
    pub label: String,
    #[serde(default, rename = "type")]
    pub unit_type: Option<String>,
    /// Identifier of the repeat unit this row describes, if the query has one.
    #[serde(default, alias = "repeatsdb_id")]
    pub unit_id: Option<String>,
}
