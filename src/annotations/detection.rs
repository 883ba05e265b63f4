use crate::annotations::bounding_box::BoundingBox;
use serde::Serialize;

/// A detection is what is produced as output from an object detection model.
///
/// A detection is a bounding box combined with a confidence score: a probability
/// value that encodes the model's belief that the detection is true. Detections
/// are only meaningful for the image or frame that produced them.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Detection {
    pub bbox: BoundingBox,
    pub confidence: f32,
}
