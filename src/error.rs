use std::path::PathBuf;
use thiserror::Error;

/// Errors surfaced by the detection pipeline.
#[derive(Error, Debug)]
pub enum DetectError {
    #[error("inference session error: {0}")]
    Ort(#[from] ort::Error),
    #[error("image error: {0}")]
    Image(#[from] image::ImageError),
    #[error("OpenCV error: {0}")]
    OpenCv(#[from] opencv::Error),
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
    #[error("configuration error: {0}")]
    Config(String),
    #[error("invalid bounding box: {0}")]
    InvalidBox(String),
    #[error("model output had unexpected shape {0:?}")]
    OutputShape(Vec<usize>),
    #[error("tensor shape error: {0}")]
    TensorShape(#[from] ndarray::ShapeError),
    #[error("failed to open video stream at {0}")]
    VideoOpen(PathBuf),
    #[error("serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}
