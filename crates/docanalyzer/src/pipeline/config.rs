use crate::config::{Config, InferenceConfig};

pub struct PipelineConfig {
    pub inference: InferenceConfig,
}

impl PipelineConfig {
    pub fn from_config(config: &Config) -> Self {
        Self {
            inference: config.inference.clone(),
        }
    }
}
