use crate::core::models::region::{Region, RegionBounds, RegionError, RegionRecord};
use crate::engine::config::ConfigError;
use std::collections::HashMap;
use std::str::FromStr;
use tracing::{info, warn};

/// How raw per-unit records become regions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RegionMode {
    /// One region per region id, spanning the bounds encoded in the id.
    Merged,
    /// One region per record, in input order. Each keeps its region id and
    /// gets a unit id suffixed `_<n>`, numbered within runs of consecutive
    /// records sharing a unit id.
    #[default]
    Units,
}

impl FromStr for RegionMode {
    type Err = ConfigError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "merged" | "region" | "regions" => Ok(RegionMode::Merged),
            "units" | "unit" => Ok(RegionMode::Units),
            other => Err(ConfigError::InvalidParameter {
                name: "region-mode",
                reason: format!("expected 'merged' or 'units', got '{}'", other),
            }),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DroppedRegion {
    pub region_id: String,
    pub reason: RegionError,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PreparedRegions {
    pub regions: Vec<Region>,
    pub dropped: Vec<DroppedRegion>,
}

/// Groups raw records by region id (first-seen order), discards inconsistent
/// regions and builds [`Region`]s according to `mode`.
///
/// A region is discarded when any of its records has start after end, when
/// its id does not encode bounds, or when the encoded bounds differ from the
/// smallest start and largest end among its records. Every record of a
/// discarded region is left out, wherever it appears in the input.
pub fn prepare_regions(records: Vec<RegionRecord>, mode: RegionMode) -> PreparedRegions {
    let mut order: Vec<&str> = Vec::new();
    let mut groups: HashMap<&str, Vec<&RegionRecord>> = HashMap::new();
    for record in &records {
        groups
            .entry(record.region_id.as_str())
            .or_insert_with(|| {
                order.push(record.region_id.as_str());
                Vec::new()
            })
            .push(record);
    }

    let mut prepared = PreparedRegions::default();
    let mut valid: HashMap<&str, RegionBounds> = HashMap::new();
    for &region_id in &order {
        match validate_group(region_id, &groups[region_id]) {
            Ok(bounds) => {
                valid.insert(region_id, bounds);
            }
            Err(reason) => drop_region(&mut prepared, region_id, reason),
        }
    }

    match mode {
        RegionMode::Merged => {
            for region_id in order {
                let Some(bounds) = valid.get(region_id) else {
                    continue;
                };
                match merge_group(region_id, &groups[region_id], *bounds) {
                    Ok(region) => prepared.regions.push(region),
                    Err(reason) => drop_region(&mut prepared, region_id, reason),
                }
            }
        }
        RegionMode::Units => {
            let mut previous_unit: Option<&str> = None;
            let mut ordinal = 0usize;
            for record in records.iter().filter(|r| valid.contains_key(r.region_id.as_str())) {
                let unit = record.unit_id.as_deref().unwrap_or(&record.region_id);
                ordinal = if previous_unit == Some(unit) { ordinal + 1 } else { 0 };
                previous_unit = Some(unit);
                match unit_region(record, format!("{}_{}", unit, ordinal)) {
                    Ok(region) => prepared.regions.push(region),
                    Err(reason) => drop_region(&mut prepared, &record.region_id, reason),
                }
            }
        }
    }

    info!(
        kept = prepared.regions.len(),
        dropped = prepared.dropped.len(),
        ?mode,
        "Prepared regions."
    );
    prepared
}

fn drop_region(prepared: &mut PreparedRegions, region_id: &str, reason: RegionError) {
    warn!(region = %region_id, "Dropping region: {}", reason);
    prepared.dropped.push(DroppedRegion {
        region_id: region_id.to_string(),
        reason,
    });
}

fn validate_group(region_id: &str, group: &[&RegionRecord]) -> Result<RegionBounds, RegionError> {
    if let Some(bad) = group.iter().find(|r| r.start > r.end) {
        return Err(RegionError::InvertedBounds {
            region_id: region_id.to_string(),
            start: bad.start,
            end: bad.end,
        });
    }

    let bounds = RegionBounds::from_region_id(region_id)?;
    // Groups are never empty; each starts with the record that created it.
    let start = group.iter().map(|r| r.start).min().unwrap_or(bounds.start);
    let end = group.iter().map(|r| r.end).max().unwrap_or(bounds.end);
    if start != bounds.start || end != bounds.end {
        return Err(RegionError::BoundsMismatch {
            region_id: region_id.to_string(),
            start,
            end,
        });
    }
    Ok(bounds)
}

fn merge_group(
    region_id: &str,
    group: &[&RegionRecord],
    bounds: RegionBounds,
) -> Result<Region, RegionError> {
    let first = group[0];
    let mut region = Region::new(
        region_id,
        &first.structure_id,
        &first.chain_id,
        bounds.start,
        bounds.end,
        &first.label,
    )?;
    region.unit_types = group.iter().filter_map(|r| r.unit_type.clone()).collect();
    Ok(region)
}

fn unit_region(record: &RegionRecord, unit_id: String) -> Result<Region, RegionError> {
    let mut region = Region::new(
        &record.region_id,
        &record.structure_id,
        &record.chain_id,
        record.start,
        record.end,
        &record.label,
    )?;
    region.unit_id = Some(unit_id);
    region.unit_types = record.unit_type.iter().cloned().collect();
    Ok(region)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(region_id: &str, start: isize, end: isize, unit_type: &str) -> RegionRecord {
        RegionRecord {
            region_id: region_id.into(),
            structure_id: "2xqh".into(),
            chain_id: "A".into(),
            start,
            end,
            label: "3.3.1.1".into(),
            unit_type: Some(unit_type.into()),
            unit_id: None,
        }
    }

    fn unit(region_id: &str, start: isize, end: isize, unit_id: &str) -> RegionRecord {
        RegionRecord {
            unit_id: Some(unit_id.into()),
            ..record(region_id, start, end, "unit")
        }
    }

    #[test]
    fn merged_mode_builds_one_region_per_id_in_first_seen_order() {
        let records = vec![
            record("2xqhA_36_294", 36, 80, "unit"),
            record("2xqhA_300_310", 300, 310, "unit"),
            record("2xqhA_36_294", 81, 294, "insertion"),
        ];
        let prepared = prepare_regions(records, RegionMode::Merged);
        assert!(prepared.dropped.is_empty());

        let ids: Vec<_> = prepared.regions.iter().map(|r| r.region_id.as_str()).collect();
        assert_eq!(ids, vec!["2xqhA_36_294", "2xqhA_300_310"]);
        let first = &prepared.regions[0];
        assert_eq!((first.start, first.end), (36, 294));
        assert_eq!(first.unit_types, vec!["unit", "insertion"]);
    }

    #[test]
    fn units_mode_keeps_region_ids_and_numbers_unit_ids() {
        let records = vec![
            record("2xqhA_36_294", 36, 80, "unit"),
            record("2xqhA_36_294", 81, 294, "unit"),
        ];
        let prepared = prepare_regions(records, RegionMode::Units);
        let units: Vec<_> = prepared
            .regions
            .iter()
            .map(|r| (r.region_id.as_str(), r.row_id(), r.start, r.end))
            .collect();
        assert_eq!(
            units,
            vec![
                ("2xqhA_36_294", "2xqhA_36_294_0", 36, 80),
                ("2xqhA_36_294", "2xqhA_36_294_1", 81, 294),
            ]
        );
    }

    #[test]
    fn units_mode_preserves_input_order_and_numbers_consecutive_runs() {
        let records = vec![
            unit("2xqhA_1_30", 1, 10, "2xqhA_u"),
            unit("2xqhA_1_30", 11, 20, "2xqhA_u"),
            unit("2xqhB_5_9", 5, 9, "2xqhB_u"),
            unit("2xqhA_1_30", 21, 30, "2xqhA_v"),
            unit("2xqhA_1_30", 21, 30, "2xqhA_v"),
        ];
        let prepared = prepare_regions(records, RegionMode::Units);
        assert!(prepared.dropped.is_empty());

        let units: Vec<_> = prepared
            .regions
            .iter()
            .map(|r| (r.region_id.as_str(), r.unit_id.as_deref().unwrap(), r.start))
            .collect();
        assert_eq!(
            units,
            vec![
                ("2xqhA_1_30", "2xqhA_u_0", 1),
                ("2xqhA_1_30", "2xqhA_u_1", 11),
                ("2xqhB_5_9", "2xqhB_u_0", 5),
                ("2xqhA_1_30", "2xqhA_v_0", 21),
                ("2xqhA_1_30", "2xqhA_v_1", 21),
            ]
        );
    }

    #[test]
    fn units_mode_restarts_numbering_when_a_unit_id_reappears_later() {
        let records = vec![
            unit("1abcA_1_9", 1, 3, "1abcA"),
            unit("1abcB_1_2", 1, 2, "1abcB"),
            unit("1abcA_1_9", 4, 9, "1abcA"),
        ];
        let prepared = prepare_regions(records, RegionMode::Units);
        let ids: Vec<_> = prepared.regions.iter().map(Region::row_id).collect();
        assert_eq!(ids, vec!["1abcA_0", "1abcB_0", "1abcA_0"]);
    }

    #[test]
    fn units_mode_leaves_out_every_record_of_a_dropped_region() {
        let records = vec![
            unit("1abcA_1_10", 1, 5, "1abcA"),
            unit("1abcB_1_3", 1, 3, "1abcB"),
            unit("1abcA_1_10", 10, 6, "1abcA"),
        ];
        let prepared = prepare_regions(records, RegionMode::Units);
        let ids: Vec<_> = prepared.regions.iter().map(Region::row_id).collect();
        assert_eq!(ids, vec!["1abcB_0"]);
        assert_eq!(prepared.dropped.len(), 1);
        assert_eq!(prepared.dropped[0].region_id, "1abcA_1_10");
    }

    #[test]
    fn drops_regions_with_inverted_records() {
        let records = vec![
            record("1abcA_1_10", 1, 5, "unit"),
            record("1abcA_1_10", 10, 6, "unit"),
            record("1abcB_1_3", 1, 3, "unit"),
        ];
        let prepared = prepare_regions(records, RegionMode::Merged);
        assert_eq!(prepared.regions.len(), 1);
        assert_eq!(prepared.dropped[0].region_id, "1abcA_1_10");
        assert!(matches!(
            prepared.dropped[0].reason,
            RegionError::InvertedBounds { start: 10, end: 6, .. }
        ));
    }

    #[test]
    fn drops_regions_whose_records_disagree_with_id_bounds() {
        let records = vec![record("1abcA_1_10", 2, 10, "unit")];
        let prepared = prepare_regions(records, RegionMode::Merged);
        assert!(prepared.regions.is_empty());
        assert!(matches!(
            prepared.dropped[0].reason,
            RegionError::BoundsMismatch { start: 2, end: 10, .. }
        ));
    }

    #[test]
    fn drops_regions_with_unparseable_ids() {
        let prepared = prepare_regions(vec![record("weird", 1, 2, "unit")], RegionMode::Units);
        assert!(matches!(
            prepared.dropped[0].reason,
            RegionError::InvalidRegionId(_)
        ));
    }

    #[test]
    fn region_mode_parses_aliases() {
        assert_eq!("units".parse::<RegionMode>().unwrap(), RegionMode::Units);
        assert_eq!("Merged".parse::<RegionMode>().unwrap(), RegionMode::Merged);
        assert!("chains".parse::<RegionMode>().is_err());
    }
}
