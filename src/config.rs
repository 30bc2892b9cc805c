use std::env;

use crate::models::EditPreset;

/// Post-processing knobs, applied uniformly to every generated image.
#[derive(Debug, Clone, Copy)]
pub struct PostprocessConfig {
    pub downscale_factor: u32,
    pub posterize_bits: u8,
}

impl Default for PostprocessConfig {
    fn default() -> Self {
        PostprocessConfig {
            downscale_factor: 2,
            posterize_bits: 3,
        }
    }
}

impl PostprocessConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_downscale_factor(mut self, factor: u32) -> Self {
        self.downscale_factor = factor;
        self
    }

    pub fn with_posterize_bits(mut self, bits: u8) -> Self {
        self.posterize_bits = bits;
        self
    }
}

/// Configuration for the Stable Diffusion WebUI backend and the filter
/// parameters. Read-only after startup; the only process-wide state.
#[derive(Debug, Clone)]
pub struct SdConfig {
    pub base_url: Option<String>,
    pub preset: EditPreset,
    pub postprocess: PostprocessConfig,
}

impl Default for SdConfig {
    fn default() -> Self {
        SdConfig {
            base_url: None,
            preset: EditPreset::HeavyEdit,
            postprocess: PostprocessConfig::default(),
        }
    }
}

impl SdConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_env() -> Self {
        let base_url = env::var("SD_BASE_URL").ok();
        let preset = env::var("SD_PRESET")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(EditPreset::HeavyEdit);
        let downscale_factor = env::var("SD_DOWNSCALE_FACTOR")
            .ok()
            .and_then(|s| s.parse().ok());
        let posterize_bits = env::var("SD_POSTERIZE_BITS")
            .ok()
            .and_then(|s| s.parse().ok());

        let mut postprocess = PostprocessConfig::default();
        if let Some(factor) = downscale_factor {
            postprocess.downscale_factor = factor;
        }
        if let Some(bits) = posterize_bits {
            postprocess.posterize_bits = bits;
        }

        SdConfig {
            base_url,
            preset,
            postprocess,
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    pub fn with_preset(mut self, preset: EditPreset) -> Self {
        self.preset = preset;
        self
    }

    pub fn with_postprocess(mut self, postprocess: PostprocessConfig) -> Self {
        self.postprocess = postprocess;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let config = SdConfig::new();
        assert!(config.base_url.is_none());
        assert_eq!(config.postprocess.downscale_factor, 2);
        assert_eq!(config.postprocess.posterize_bits, 3);
    }

    #[test]
    fn builder_overrides_defaults() {
        let config = SdConfig::new()
            .with_base_url("http://10.0.0.5:7860")
            .with_preset(EditPreset::LightEdit)
            .with_postprocess(
                PostprocessConfig::new()
                    .with_downscale_factor(4)
                    .with_posterize_bits(2),
            );

        assert_eq!(config.base_url.as_deref(), Some("http://10.0.0.5:7860"));
        assert_eq!(config.preset, EditPreset::LightEdit);
        assert_eq!(config.postprocess.downscale_factor, 4);
        assert_eq!(config.postprocess.posterize_bits, 2);
    }
}
