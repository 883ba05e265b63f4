use crate::error::DetectError;
use image::RgbImage;
use opencv::core::Mat;
use opencv::imgproc;
use opencv::prelude::*;

/// Converts a BGR frame from an OpenCV capture into an `RgbImage`.
pub fn mat_to_rgb_image(mat: &Mat) -> Result<RgbImage, DetectError> {
    let mut rgb_mat = Mat::default();
    imgproc::cvt_color(
        mat,
        &mut rgb_mat,
        imgproc::COLOR_BGR2RGB,
        0,
    )?;
    let width = rgb_mat.cols() as u32;
    let height = rgb_mat.rows() as u32;
    let data = rgb_mat.data_bytes()?.to_vec();
    RgbImage::from_vec(width, height, data)
        .ok_or_else(|| DetectError::Config("frame buffer does not match its dimensions".into()))
}

/// Converts an `RgbImage` into a BGR `Mat` so still images can go through
/// the same annotation and encoding path as video frames.
pub fn rgb_image_to_mat(img: &RgbImage) -> Result<Mat, DetectError> {
    let height = img.height() as i32;
    let rgb_mat = Mat::from_slice(img.as_raw())?
        .reshape(3, height)?
        .try_clone()?;
    let mut bgr_mat = Mat::default();
    imgproc::cvt_color(
        &rgb_mat,
        &mut bgr_mat,
        imgproc::COLOR_RGB2BGR,
        0,
    )?;
    Ok(bgr_mat)
}
