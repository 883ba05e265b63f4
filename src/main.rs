mod annotations;
mod config;
mod error;
mod image_utils;
mod object_detection;
mod pipeline;
mod telemetry;
mod video_utils;

use anyhow::Context;
use object_detection::yolov3::{Yolov3, read_classes_txt_file};
use std::path::PathBuf;
use video_utils::drawing::class_palette;

fn main() -> anyhow::Result<()> {
    telemetry::init_tracing();

    let config_path = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("configuration/cocodetect.json"));
    let settings = config::load_settings(&config_path)
        .with_context(|| format!("failed to load settings from {}", config_path.display()))?;

    let class_names = read_classes_txt_file(&settings.model.classes_path())
        .with_context(|| format!("failed to read {}", settings.model.classes_path().display()))?;
    let palette = class_palette(class_names.len());
    tracing::info!(
        model = %settings.model.model_path().display(),
        classes = class_names.len(),
        "loading model"
    );
    let mut model = Yolov3::new(
        &settings.model.model_path(),
        class_names,
        settings.model.input_width,
        settings.model.input_height,
    )
    .context("failed to load the YOLOv3 model")?;

    if settings.image.is_none() && settings.image_dir.is_none() && settings.video.is_none() {
        tracing::warn!("no image, image_dir, or video job configured; nothing to do");
    }
    if let Some(job) = &settings.image {
        pipeline::process_image(&mut model, &settings.model, &palette, job)?;
    }
    if let Some(job) = &settings.image_dir {
        pipeline::process_directory(&mut model, &settings.model, &palette, job)?;
    }
    if let Some(job) = &settings.video {
        pipeline::process_video(&mut model, &settings.model, &palette, job)?;
    }
    Ok(())
}
