use repeatskmer::engine::config::PipelineConfig;
use repeatskmer::engine::regions::RegionMode;

/// Fully resolved settings for one command run.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub pipeline: PipelineConfig,
    pub region_mode: RegionMode,
}
