use crate::annotations::bounding_box::BoundingBox;
use crate::annotations::detection::Detection;
use crate::error::DetectError;
use crate::object_detection::ort_inference_session::OrtInferenceSession;
use ndarray::{ArrayD, ArrayView2, ArrayView4, Axis, s};
use ort::value::TensorRef;
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;

/// Reads a file with the class names into a vector so that the number ids
/// which come directly from the ORT inference session can be given meaning.
pub fn read_classes_txt_file(filepath: &Path) -> io::Result<Vec<String>> {
    BufReader::new(File::open(filepath)?).lines().collect()
}

/// A YOLOv3 detector trained on COCO, loaded from an ONNX export.
///
/// The network takes one `(1, 3, input_height, input_width)` blob of f32
/// pixel values in `[0, 1]` and predicts a `(1, N, 5 + classes)` tensor of
/// candidate boxes. One forward pass per image or video frame.
pub struct Yolov3 {
    ort_session: OrtInferenceSession,
    output_name: String,
    class_names: Vec<String>,
    input_width: usize,
    input_height: usize,
}

impl Yolov3 {
    pub fn new(
        model_path: &Path,
        class_names: Vec<String>,
        input_width: usize,
        input_height: usize,
    ) -> ort::Result<Self> {
        let ort_session = OrtInferenceSession::new(model_path)?;
        let output_name = ort_session.session.outputs[0].name.clone();
        Ok(Yolov3 {
            ort_session,
            output_name,
            class_names,
            input_width,
            input_height,
        })
    }

    pub fn input_width(&self) -> usize {
        self.input_width
    }

    pub fn input_height(&self) -> usize {
        self.input_height
    }

    pub fn class_names(&self) -> &[String] {
        &self.class_names
    }

    /// Runs one forward pass on a preprocessed blob and decodes the raw
    /// prediction tensor into detections in pixel coordinates of the
    /// original `image_width` x `image_height` image.
    pub fn run_inference(
        &mut self,
        input_array: ArrayView4<f32>,
        confidence_threshold: f32,
        image_width: u32,
        image_height: u32,
    ) -> Result<Vec<Detection>, DetectError> {
        let tensor = TensorRef::from_array_view(input_array)?;
        let outputs = self.ort_session.session.run(ort::inputs![tensor])?;
        let (shape, data) = outputs[self.output_name.as_str()].try_extract_tensor::<f32>()?;
        let output = ArrayD::from_shape_vec(shape.to_ixdyn(), data.to_vec())?;

        let dims = output.shape().to_vec();
        if dims.len() != 3 || dims[0] != 1 || dims[2] != 5 + self.class_names.len() {
            return Err(DetectError::OutputShape(dims));
        }
        let rows = output.index_axis(Axis(0), 0);
        let rows = rows
            .into_dimensionality::<ndarray::Ix2>()
            .map_err(DetectError::TensorShape)?;
        decode_predictions(
            rows,
            &self.class_names,
            confidence_threshold,
            image_width,
            image_height,
        )
    }
}

/// Decodes a `(N, 5 + classes)` prediction tensor into detections.
///
/// Each row is `cx, cy, w, h, objectness, class scores...` with the box
/// coordinates normalized to `[0, 1]` relative to the network input. The
/// class with the highest score wins, rows scoring below the confidence
/// threshold are dropped, and the surviving boxes are scaled to pixel
/// coordinates of the original image and clamped to its bounds.
pub fn decode_predictions(
    output: ArrayView2<f32>,
    class_names: &[String],
    confidence_threshold: f32,
    image_width: u32,
    image_height: u32,
) -> Result<Vec<Detection>, DetectError> {
    let mut detections: Vec<Detection> = Vec::new();
    for row in output.axis_iter(Axis(0)) {
        let scores = row.slice(s![5..]);
        let best = scores
            .iter()
            .copied()
            .enumerate()
            .reduce(|accum, candidate| {
                if candidate.1 > accum.1 {
                    candidate
                } else {
                    accum
                }
            });
        let Some((class_id, prob)) = best else {
            continue;
        };
        if prob < confidence_threshold {
            continue;
        }
        let label = match class_names.get(class_id) {
            Some(name) => name.clone(),
            None => class_id.to_string(),
        };
        let cx = row[0] * image_width as f32;
        let cy = row[1] * image_height as f32;
        let w = row[2] * image_width as f32;
        let h = row[3] * image_height as f32;
        let bbox = BoundingBox::new(
            (cx - w / 2.0).clamp(0.0, image_width as f32),
            (cy - h / 2.0).clamp(0.0, image_height as f32),
            (cx + w / 2.0).clamp(0.0, image_width as f32),
            (cy + h / 2.0).clamp(0.0, image_height as f32),
            class_id,
            label,
        )
        .map_err(DetectError::InvalidBox)?;
        detections.push(Detection {
            bbox,
            confidence: prob,
        });
    }
    Ok(detections)
}
