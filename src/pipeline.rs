use crate::annotations::detection::Detection;
use crate::config::{DirJob, ImageJob, ModelSettings, VideoJob};
use crate::error::DetectError;
use crate::image_utils::image_conversion::preprocess_image;
use crate::image_utils::image_io::read_image_as_rgb8;
use crate::object_detection::object_detection_utils::non_maximum_suppression;
use crate::object_detection::yolov3::Yolov3;
use crate::video_utils::drawing::{ClassPalette, annotate};
use crate::video_utils::mat_conversion::{mat_to_rgb_image, rgb_image_to_mat};
use image::RgbImage;
use itertools::Itertools;
use opencv::core::{Mat, Size, Vector};
use opencv::prelude::*;
use opencv::videoio::{self, VideoCapture, VideoWriter};
use opencv::imgcodecs;
use std::path::Path;
use walkdir::WalkDir;

const IMAGE_EXTENSIONS: [&str; 4] = ["jpg", "jpeg", "png", "bmp"];
const PROGRESS_LOG_INTERVAL: i64 = 50;

/// One forward pass plus post-processing on an already-decoded frame.
fn detect(
    model: &mut Yolov3,
    settings: &ModelSettings,
    img: &RgbImage,
) -> Result<Vec<Detection>, DetectError> {
    let blob = preprocess_image(img, model.input_width(), model.input_height());
    let detections = model.run_inference(
        blob.view(),
        settings.confidence_threshold,
        img.width(),
        img.height(),
    )?;
    Ok(non_maximum_suppression(
        detections,
        settings.nms_iou_threshold,
    ))
}

fn write_mat(path: &Path, mat: &Mat) -> Result<(), DetectError> {
    let written = imgcodecs::imwrite(&path.to_string_lossy(), mat, &Vector::new())?;
    if !written {
        return Err(DetectError::Config(format!(
            "could not write image to {}",
            path.display()
        )));
    }
    Ok(())
}

fn dump_detections_json(path: &Path, detections: &[Detection]) -> Result<(), DetectError> {
    let json = serde_json::to_string_pretty(detections)?;
    std::fs::write(path, json)?;
    Ok(())
}

/// Detects objects on one still image and writes the annotated copy.
pub fn process_image(
    model: &mut Yolov3,
    settings: &ModelSettings,
    palette: &ClassPalette,
    job: &ImageJob,
) -> Result<Vec<Detection>, DetectError> {
    let img = read_image_as_rgb8(&job.input)?;
    let detections = detect(model, settings, &img)?;
    tracing::info!(
        input = %job.input.display(),
        detections = detections.len(),
        "image processed"
    );

    let mut frame = rgb_image_to_mat(&img)?;
    annotate(&mut frame, &detections, palette)?;
    write_mat(&job.output, &frame)?;
    if job.dump_detections {
        dump_detections_json(&job.output.with_extension("json"), &detections)?;
    }
    Ok(detections)
}

/// Runs image detection over every image file found under a directory.
pub fn process_directory(
    model: &mut Yolov3,
    settings: &ModelSettings,
    palette: &ClassPalette,
    job: &DirJob,
) -> Result<(), DetectError> {
    std::fs::create_dir_all(&job.output_dir)?;
    let image_paths = WalkDir::new(&job.input_dir)
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_file())
        .map(|entry| entry.into_path())
        .filter(|path| {
            path.extension()
                .and_then(|ext| ext.to_str())
                .is_some_and(|ext| IMAGE_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
        })
        .sorted();
    let mut processed = 0usize;
    for input in image_paths {
        let Some(file_name) = input.file_name() else {
            continue;
        };
        let image_job = ImageJob {
            input: input.clone(),
            output: job.output_dir.join(file_name),
            dump_detections: job.dump_detections,
        };
        process_image(model, settings, palette, &image_job)?;
        processed += 1;
    }
    tracing::info!(
        input_dir = %job.input_dir.display(),
        images = processed,
        "directory processed"
    );
    Ok(())
}

/// Detects objects on every frame of a video and writes the annotated copy.
///
/// The capture and writer handles are opened once and released once after
/// the loop; frames flow through the same detect/annotate path as stills.
pub fn process_video(
    model: &mut Yolov3,
    settings: &ModelSettings,
    palette: &ClassPalette,
    job: &VideoJob,
) -> Result<(), DetectError> {
    let mut capture = VideoCapture::from_file(&job.input.to_string_lossy(), videoio::CAP_ANY)?;
    if !capture.is_opened()? {
        return Err(DetectError::VideoOpen(job.input.clone()));
    }

    // Frame count is best effort; some containers cannot report it.
    let total_frames = match capture.get(videoio::CAP_PROP_FRAME_COUNT) {
        Ok(count) if count >= 1.0 => count as i64,
        Ok(_) => {
            tracing::warn!("could not determine total frame count");
            -1
        }
        Err(err) => {
            tracing::warn!(%err, "could not determine total frame count");
            -1
        }
    };
    let fps = capture
        .get(videoio::CAP_PROP_FPS)
        .ok()
        .filter(|fps| fps.is_finite() && *fps > 0.0)
        .unwrap_or(job.fallback_fps);
    let frame_width = capture.get(videoio::CAP_PROP_FRAME_WIDTH)? as i32;
    let frame_height = capture.get(videoio::CAP_PROP_FRAME_HEIGHT)? as i32;
    tracing::info!(
        input = %job.input.display(),
        total_frames,
        fps,
        frame_width,
        frame_height,
        "video opened"
    );

    let fourcc = VideoWriter::fourcc('m', 'p', '4', 'v')?;
    let mut writer = VideoWriter::new(
        &job.output.to_string_lossy(),
        fourcc,
        fps,
        Size::new(frame_width, frame_height),
        true,
    )?;
    if !writer.is_opened()? {
        return Err(DetectError::VideoOpen(job.output.clone()));
    }

    let mut frame = Mat::default();
    let mut frame_index: i64 = 0;
    loop {
        if !capture.read(&mut frame)? || frame.empty() {
            break;
        }
        let rgb = mat_to_rgb_image(&frame)?;
        let detections = detect(model, settings, &rgb)?;
        annotate(&mut frame, &detections, palette)?;
        writer.write(&frame)?;
        frame_index += 1;
        if frame_index % PROGRESS_LOG_INTERVAL == 0 {
            tracing::info!(frame = frame_index, total = total_frames, "processing frames");
        }
    }

    writer.release()?;
    capture.release()?;
    tracing::info!(
        frames = frame_index,
        output = %job.output.display(),
        "video processed"
    );
    Ok(())
}
