use serde::{Deserialize, Serialize};

use crate::error::{HfError, Result};

/// Output dimensions the API is asked for. Square only, matching the sizes
/// the surrounding UI offers; anything else is unrepresentable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ImageSize {
    S512,
    S768,
    #[default]
    S1024,
}

impl ImageSize {
    pub fn side(&self) -> u32 {
        match self {
            ImageSize::S512 => 512,
            ImageSize::S768 => 768,
            ImageSize::S1024 => 1024,
        }
    }

    pub fn width(&self) -> u32 {
        self.side()
    }

    pub fn height(&self) -> u32 {
        self.side()
    }

    /// Parses `"512"` or `"512x512"` style labels.
    pub fn parse(label: &str) -> Result<Self> {
        let side = label.split('x').next().unwrap_or(label).trim();
        match side {
            "512" => Ok(ImageSize::S512),
            "768" => Ok(ImageSize::S768),
            "1024" => Ok(ImageSize::S1024),
            other => Err(HfError::InvalidRequest(format!(
                "unsupported size '{other}'; expected 512, 768 or 1024"
            ))),
        }
    }
}

/// A validated text-to-image request. Immutable once built; construction is
/// the only place validation happens, so a held value is always sendable.
///
/// Steps and guidance carry the slider ranges (10-50, 1.0-12.0) as defaults
/// and recommendations only; out-of-range values are forwarded as-is, as is
/// any seed the caller supplies.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationRequest {
    prompt: String,
    negative_prompt: Option<String>,
    steps: u32,
    guidance: f32,
    size: ImageSize,
    seed: Option<u64>,
}

impl GenerationRequest {
    pub fn new(prompt: impl Into<String>) -> Result<Self> {
        let prompt = prompt.into();
        if prompt.trim().is_empty() {
            return Err(HfError::InvalidRequest("prompt must not be empty".into()));
        }

        Ok(GenerationRequest {
            prompt,
            negative_prompt: None,
            steps: 30,
            guidance: 7.0,
            size: ImageSize::default(),
            seed: None,
        })
    }

    /// An empty negative prompt means "omit", not "send empty string".
    pub fn with_negative_prompt(mut self, negative_prompt: impl Into<String>) -> Self {
        let value = negative_prompt.into();
        self.negative_prompt = if value.is_empty() { None } else { Some(value) };
        self
    }

    pub fn with_steps(mut self, steps: u32) -> Self {
        self.steps = steps;
        self
    }

    pub fn with_guidance(mut self, guidance: f32) -> Self {
        self.guidance = guidance;
        self
    }

    pub fn with_size(mut self, size: ImageSize) -> Self {
        self.size = size;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    pub fn size(&self) -> ImageSize {
        self.size
    }

    pub(crate) fn payload(&self) -> GenerationPayload {
        GenerationPayload {
            inputs: self.prompt.clone(),
            parameters: Parameters {
                num_inference_steps: self.steps,
                guidance_scale: self.guidance,
                width: self.size.width(),
                height: self.size.height(),
                negative_prompt: self.negative_prompt.clone(),
                seed: self.seed,
            },
            options: Options {
                wait_for_model: true,
            },
        }
    }
}

/// Wire shape of the inference request body.
#[derive(Debug, Clone, Serialize)]
pub struct GenerationPayload {
    pub inputs: String,
    pub parameters: Parameters,
    pub options: Options,
}

#[derive(Debug, Clone, Serialize)]
pub struct Parameters {
    pub num_inference_steps: u32,
    pub guidance_scale: f32,
    pub width: u32,
    pub height: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub negative_prompt: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Options {
    /// Ask the service to hold the request while the model loads instead of
    /// rejecting outright. 503s still happen under load.
    pub wait_for_model: bool,
}

/// Body the service returns alongside 503/504 while the model loads.
#[derive(Debug, Clone, Deserialize)]
pub struct WarmupBody {
    pub estimated_time: Option<f64>,
}
