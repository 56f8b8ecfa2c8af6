use super::defaults::DefaultsConfig;
use super::file::FileConfig;
use super::models::AppConfig;
use crate::cli::{ConfigArgs, CountingArgs, RegionArgs};
use crate::error::{CliError, Result};
use repeatskmer::engine::config::{CountingMode, MissingCell, PipelineConfigBuilder};
use repeatskmer::engine::regions::RegionMode;
use std::str::FromStr;

/// Resolves settings with precedence: CLI flags, then `--set` values, then the
/// config file, then built-in defaults.
pub fn build_config(
    config_args: &ConfigArgs,
    counting: &CountingArgs,
    region: &RegionArgs,
    threads: Option<usize>,
) -> Result<AppConfig> {
    let defaults = DefaultsConfig::default();

    let file_config = if let Some(config_path) = &config_args.config {
        FileConfig::from_file(config_path)?
    } else {
        FileConfig::default()
    };
    let mut file_config = apply_set_values(file_config, &config_args.set_values)?;

    let kmer_file = file_config.kmer.take().unwrap_or_default();
    let table_file = file_config.table.take().unwrap_or_default();
    let region_file = file_config.regions.take().unwrap_or_default();

    let workers = threads
        .or(file_config.workers)
        .unwrap_or(defaults.workers);
    let k = counting.k.or(kmer_file.k).unwrap_or(defaults.k);
    let mode = match counting.mode {
        Some(mode) => mode,
        None => parse_optional::<CountingMode>(kmer_file.mode.as_deref())?.unwrap_or(defaults.mode),
    };
    let separator = counting
        .separator
        .or(table_file.separator)
        .unwrap_or(defaults.separator);
    let missing_cell = match counting.missing_cell {
        Some(cell) => cell,
        None => parse_optional::<MissingCell>(table_file.missing_cell.as_deref())?
            .unwrap_or(defaults.missing_cell),
    };
    let skip_empty_sequences = counting.skip_empty_sequences
        || table_file
            .skip_empty_sequences
            .unwrap_or(defaults.skip_empty_sequences);
    let merge_regions = region.merge_regions || region_file.merge.unwrap_or(defaults.merge_regions);

    let mut builder = PipelineConfigBuilder::new()
        .workers(workers)
        .k(k)
        .mode(mode)
        .separator(separator)
        .missing_cell(missing_cell)
        .non_kmer_columns(table_file.columns.unwrap_or(defaults.columns))
        .skip_empty_sequences(skip_empty_sequences);
    if let Some(capacity) = config_args.channel_capacity.or(file_config.channel_capacity) {
        builder = builder.channel_capacity(capacity);
    }
    let pipeline = builder
        .build()
        .map_err(|e| CliError::Config(e.to_string()))?;

    Ok(AppConfig {
        pipeline,
        region_mode: if merge_regions {
            RegionMode::Merged
        } else {
            RegionMode::Units
        },
    })
}

fn parse_optional<T>(value: Option<&str>) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    value
        .map(|v| v.parse::<T>().map_err(|e| CliError::Config(e.to_string())))
        .transpose()
}

fn parse_set_value<T: FromStr>(key: &str, value: &str, kind: &str) -> Result<T> {
    value.parse().map_err(|_| {
        CliError::Config(format!("Invalid {} value for {}: {}", kind, key, value))
    })
}

fn apply_set_values(mut config: FileConfig, set_values: &[String]) -> Result<FileConfig> {
    for kv_pair in set_values {
        let Some((key, value_str)) = kv_pair.split_once('=') else {
            return Err(CliError::Config(format!(
                "Invalid --set format: '{}'. Expected KEY=VALUE.",
                kv_pair
            )));
        };

        match key {
            "workers" => config.workers = Some(parse_set_value(key, value_str, "integer")?),
            "channel-capacity" => {
                config.channel_capacity = Some(parse_set_value(key, value_str, "integer")?)
            }
            "kmer.k" => {
                config.kmer.get_or_insert_with(Default::default).k =
                    Some(parse_set_value(key, value_str, "integer")?)
            }
            "kmer.mode" => {
                config.kmer.get_or_insert_with(Default::default).mode = Some(value_str.to_string())
            }
            "table.separator" => {
                config.table.get_or_insert_with(Default::default).separator =
                    Some(parse_set_value(key, value_str, "character")?)
            }
            "table.missing-cell" => {
                config.table.get_or_insert_with(Default::default).missing_cell =
                    Some(value_str.to_string())
            }
            "table.skip-empty-sequences" => {
                config
                    .table
                    .get_or_insert_with(Default::default)
                    .skip_empty_sequences = Some(parse_set_value(key, value_str, "boolean")?)
            }
            "regions.merge" => {
                config.regions.get_or_insert_with(Default::default).merge =
                    Some(parse_set_value(key, value_str, "boolean")?)
            }
            _ => {
                return Err(CliError::Config(format!(
                    "Unsupported configuration key for --set: '{}'",
                    key
                )));
            }
        }
    }
    Ok(config)
}
