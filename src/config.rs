use crate::error::DetectError;
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Runtime settings for the detection pipeline.
///
/// Each of the three job sections is optional; the pipeline runs whichever
/// ones are present, in image -> directory -> video order.
#[derive(Debug, Deserialize, Clone)]
pub struct Settings {
    pub model: ModelSettings,
    #[serde(default)]
    pub image: Option<ImageJob>,
    #[serde(default)]
    pub image_dir: Option<DirJob>,
    #[serde(default)]
    pub video: Option<VideoJob>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ModelSettings {
    pub model_dir: PathBuf,
    pub onnx_file: String,
    pub classes_file: String,
    #[serde(default = "default_input_size")]
    pub input_width: usize,
    #[serde(default = "default_input_size")]
    pub input_height: usize,
    #[serde(default = "default_confidence_threshold")]
    pub confidence_threshold: f32,
    #[serde(default = "default_nms_iou_threshold")]
    pub nms_iou_threshold: f32,
}

fn default_input_size() -> usize {
    416
}

fn default_confidence_threshold() -> f32 {
    0.5
}

fn default_nms_iou_threshold() -> f32 {
    0.4
}

impl ModelSettings {
    pub fn model_path(&self) -> PathBuf {
        self.model_dir.join(&self.onnx_file)
    }

    pub fn classes_path(&self) -> PathBuf {
        self.model_dir.join(&self.classes_file)
    }

    pub fn validate(&self) -> Result<(), DetectError> {
        if !self.model_path().exists() {
            return Err(DetectError::Config(format!(
                "model file not found: {}",
                self.model_path().display()
            )));
        }
        if !self.classes_path().exists() {
            return Err(DetectError::Config(format!(
                "classes file not found: {}",
                self.classes_path().display()
            )));
        }
        if !(0.0..=1.0).contains(&self.confidence_threshold) {
            return Err(DetectError::Config(format!(
                "confidence threshold must be within [0, 1], got {}",
                self.confidence_threshold
            )));
        }
        if !(0.0..=1.0).contains(&self.nms_iou_threshold) {
            return Err(DetectError::Config(format!(
                "NMS IoU threshold must be within [0, 1], got {}",
                self.nms_iou_threshold
            )));
        }
        Ok(())
    }
}

/// Detect on a single still image.
#[derive(Debug, Deserialize, Clone)]
pub struct ImageJob {
    pub input: PathBuf,
    pub output: PathBuf,
    /// Also write the detections as a JSON file next to the output image.
    #[serde(default)]
    pub dump_detections: bool,
}

/// Detect on every image file found under a directory.
#[derive(Debug, Deserialize, Clone)]
pub struct DirJob {
    pub input_dir: PathBuf,
    pub output_dir: PathBuf,
    #[serde(default)]
    pub dump_detections: bool,
}

/// Detect on a video file, writing an annotated copy.
#[derive(Debug, Deserialize, Clone)]
pub struct VideoJob {
    pub input: PathBuf,
    pub output: PathBuf,
    /// Used when the container does not report a frame rate.
    #[serde(default = "default_fallback_fps")]
    pub fallback_fps: f64,
}

fn default_fallback_fps() -> f64 {
    30.0
}

pub fn load_settings(path: &Path) -> Result<Settings, DetectError> {
    let raw = std::fs::read_to_string(path)?;
    let settings: Settings = serde_json::from_str(&raw)?;
    settings.model.validate()?;
    Ok(settings)
}
