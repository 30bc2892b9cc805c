use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{ImitateError, Result};

pub const OUTPUT_WIDTH: u32 = 512;
pub const OUTPUT_HEIGHT: u32 = 512;

/// Named parameter preset for the img2img request. The two presets trade
/// fidelity to the source image against prompt freedom.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditPreset {
    /// Subtle edit: few steps, low denoising, strong edge conditioning.
    LightEdit,
    /// Heavier rework: more steps, high denoising, balanced conditioning.
    HeavyEdit,
}

impl EditPreset {
    pub fn params(&self) -> PresetParams {
        match self {
            EditPreset::LightEdit => PresetParams {
                steps: 15,
                denoising_strength: 0.3,
                controlnet_weight: 1.35,
                controlnet_model: "control_sd15_canny [fef5e48e]",
                control_mode: ControlMode::ControlNetImportant,
            },
            EditPreset::HeavyEdit => PresetParams {
                steps: 20,
                denoising_strength: 0.75,
                controlnet_weight: 1.0,
                controlnet_model: "control_v11p_sd15_canny [d14c016b]",
                control_mode: ControlMode::Balanced,
            },
        }
    }
}

impl FromStr for EditPreset {
    type Err = ImitateError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "light" | "light_edit" => Ok(EditPreset::LightEdit),
            "heavy" | "heavy_edit" => Ok(EditPreset::HeavyEdit),
            other => Err(ImitateError::InvalidInput(format!(
                "unknown preset '{}', expected 'light' or 'heavy'",
                other
            ))),
        }
    }
}

/// Concrete sampling and conditioning parameters behind a preset.
#[derive(Debug, Clone, Copy)]
pub struct PresetParams {
    pub steps: u32,
    pub denoising_strength: f64,
    pub controlnet_weight: f64,
    pub controlnet_model: &'static str,
    pub control_mode: ControlMode,
}

/// Sampler identifiers as the WebUI spells them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Sampler {
    #[serde(rename = "Euler a")]
    EulerAncestral,
    #[serde(rename = "Euler")]
    Euler,
    #[serde(rename = "DPM++ 2M Karras")]
    DpmPlusPlus2mKarras,
}

/// How the ControlNet extension fits the conditioning image to the
/// generation resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ResizeMode {
    #[serde(rename = "Just Resize")]
    JustResize,
    #[serde(rename = "Crop and Resize")]
    CropAndResize,
    #[serde(rename = "Resize and Fill")]
    ResizeAndFill,
}

/// Blend priority between the text prompt and the conditioning signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ControlMode {
    #[serde(rename = "Balanced")]
    Balanced,
    #[serde(rename = "My prompt is more important")]
    PromptImportant,
    #[serde(rename = "ControlNet is more important")]
    ControlNetImportant,
}

/// One ControlNet conditioning unit. The conditioning image field is named
/// `image`, matching the current ControlNet extension API.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ControlNetUnit {
    pub image: String,
    pub module: String,
    pub model: String,
    pub weight: f64,
    pub resize_mode: ResizeMode,
    pub control_mode: ControlMode,
    pub guidance_start: f64,
    pub guidance_end: f64,
    pub pixel_perfect: bool,
}

impl ControlNetUnit {
    /// Canny edge conditioning over the given reference image, full
    /// guidance range. Guidance bounds are fixed at [0.0, 1.0] here; the
    /// invariant start <= end holds by construction.
    pub fn canny(image_b64: &str, model: &str, weight: f64, control_mode: ControlMode) -> Self {
        ControlNetUnit {
            image: image_b64.to_string(),
            module: "canny".to_string(),
            model: model.to_string(),
            weight,
            resize_mode: ResizeMode::ResizeAndFill,
            control_mode,
            guidance_start: 0.0,
            guidance_end: 1.0,
            pixel_perfect: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ControlNetScript {
    pub args: Vec<ControlNetUnit>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlwaysonScripts {
    pub controlnet: ControlNetScript,
}

/// Wire-shape img2img request for the WebUI's `/sdapi/v1/img2img` endpoint.
/// Immutable after construction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Img2ImgRequest {
    pub prompt: String,
    pub init_images: Vec<String>,
    pub steps: u32,
    pub denoising_strength: f64,
    pub sampler_name: Sampler,
    pub batch_size: u32,
    pub width: u32,
    pub height: u32,
    pub alwayson_scripts: AlwaysonScripts,
}

impl Img2ImgRequest {
    /// Build a request from user input. The source image serves both as the
    /// img2img base and as the ControlNet conditioning reference.
    pub fn new(prompt: &str, image_b64: &str, amount: u32, preset: EditPreset) -> Result<Self> {
        if prompt.trim().is_empty() {
            return Err(ImitateError::InvalidInput("prompt is empty".to_string()));
        }
        if amount < 1 {
            return Err(ImitateError::InvalidInput(format!(
                "amount must be >= 1, got {}",
                amount
            )));
        }

        let params = preset.params();

        Ok(Img2ImgRequest {
            prompt: prompt.to_string(),
            init_images: vec![image_b64.to_string()],
            steps: params.steps,
            denoising_strength: params.denoising_strength,
            sampler_name: Sampler::EulerAncestral,
            batch_size: amount,
            width: OUTPUT_WIDTH,
            height: OUTPUT_HEIGHT,
            alwayson_scripts: AlwaysonScripts {
                controlnet: ControlNetScript {
                    args: vec![ControlNetUnit::canny(
                        image_b64,
                        params.controlnet_model,
                        params.controlnet_weight,
                        params.control_mode,
                    )],
                },
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn batch_size_equals_requested_amount() {
        let request = Img2ImgRequest::new("a cat", "aGVsbG8=", 3, EditPreset::HeavyEdit).unwrap();
        assert_eq!(request.batch_size, 3);
        assert_eq!(request.width, 512);
        assert_eq!(request.height, 512);
    }

    #[test]
    fn guidance_range_is_ordered() {
        let request = Img2ImgRequest::new("a cat", "aGVsbG8=", 1, EditPreset::LightEdit).unwrap();
        let unit = &request.alwayson_scripts.controlnet.args[0];
        assert!(unit.guidance_start <= unit.guidance_end);
        assert!((0.0..=1.0).contains(&unit.guidance_start));
        assert!((0.0..=1.0).contains(&unit.guidance_end));
    }

    #[test]
    fn source_image_is_both_base_and_conditioning() {
        let request = Img2ImgRequest::new("a cat", "c29tZQ==", 1, EditPreset::HeavyEdit).unwrap();
        assert_eq!(request.init_images, vec!["c29tZQ==".to_string()]);
        assert_eq!(request.alwayson_scripts.controlnet.args[0].image, "c29tZQ==");
    }

    #[test]
    fn empty_prompt_is_rejected() {
        let err = Img2ImgRequest::new("  ", "aGVsbG8=", 1, EditPreset::HeavyEdit).unwrap_err();
        assert!(matches!(err, ImitateError::InvalidInput(_)));
    }

    #[test]
    fn zero_amount_is_rejected() {
        let err = Img2ImgRequest::new("a cat", "aGVsbG8=", 0, EditPreset::HeavyEdit).unwrap_err();
        assert!(matches!(err, ImitateError::InvalidInput(_)));
    }

    #[test]
    fn presets_differ_in_documented_parameters() {
        let light = EditPreset::LightEdit.params();
        let heavy = EditPreset::HeavyEdit.params();

        assert_eq!(light.steps, 15);
        assert_eq!(light.denoising_strength, 0.3);
        assert_eq!(light.controlnet_weight, 1.35);
        assert_eq!(light.controlnet_model, "control_sd15_canny [fef5e48e]");

        assert_eq!(heavy.steps, 20);
        assert_eq!(heavy.denoising_strength, 0.75);
        assert_eq!(heavy.controlnet_weight, 1.0);
        assert_ne!(light.controlnet_model, heavy.controlnet_model);
    }

    #[test]
    fn serializes_to_webui_wire_shape() {
        let request = Img2ImgRequest::new("a cat", "aGVsbG8=", 2, EditPreset::LightEdit).unwrap();
        let value = serde_json::to_value(&request).unwrap();

        assert_eq!(value["init_images"][0], "aGVsbG8=");
        assert_eq!(value["sampler_name"], "Euler a");
        assert_eq!(value["batch_size"], 2);

        let unit = &value["alwayson_scripts"]["controlnet"]["args"][0];
        assert_eq!(unit["image"], "aGVsbG8=");
        assert_eq!(unit["module"], "canny");
        assert_eq!(unit["resize_mode"], "Resize and Fill");
        assert_eq!(unit["control_mode"], "ControlNet is more important");
        assert_eq!(unit["pixel_perfect"], true);
    }

    #[test]
    fn preset_parses_from_env_strings() {
        assert_eq!("light".parse::<EditPreset>().unwrap(), EditPreset::LightEdit);
        assert_eq!("HEAVY".parse::<EditPreset>().unwrap(), EditPreset::HeavyEdit);
        assert!("medium".parse::<EditPreset>().is_err());
    }
}
