use crate::error::DetectError;
use crate::image_utils::image_conversion::convert_rgb_image_to_owned_array;
use image::{self, RgbImage};
use ndarray::Array4;
use std::path::Path;

pub fn read_image_as_rgb8(filepath: &Path) -> Result<RgbImage, DetectError> {
    Ok(image::open(filepath)?.into_rgb8())
}

pub fn read_image_as_array4(filepath: &Path) -> Result<Array4<f32>, DetectError> {
    let img = read_image_as_rgb8(filepath)?;
    Ok(convert_rgb_image_to_owned_array(&img))
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    fn test_image() -> RgbImage {
        let mut img = RgbImage::new(3, 3);
        img.put_pixel(0, 1, Rgb([255, 0, 0]));
        img.put_pixel(1, 1, Rgb([0, 255, 0]));
        img.put_pixel(2, 1, Rgb([0, 0, 255]));
        img.put_pixel(0, 2, Rgb([255, 255, 255]));
        img.put_pixel(1, 2, Rgb([255, 255, 255]));
        img.put_pixel(2, 2, Rgb([255, 255, 255]));
        img
    }

    #[test]
    fn read_written_image_as_rgb8() {
        let path = std::env::temp_dir().join("cocodetect_image_io_rgb8.png");
        test_image().save(&path).unwrap();
        let img = read_image_as_rgb8(&path).unwrap();
        assert_eq!(img.get_pixel(0, 0), &Rgb([0, 0, 0]));
        assert_eq!(img.get_pixel(0, 1), &Rgb([255, 0, 0]));
        assert_eq!(img.get_pixel(1, 1), &Rgb([0, 255, 0]));
        assert_eq!(img.get_pixel(2, 1), &Rgb([0, 0, 255]));
        assert_eq!(img.get_pixel(2, 2), &Rgb([255, 255, 255]));
    }

    #[test]
    fn read_written_image_as_array4() {
        let path = std::env::temp_dir().join("cocodetect_image_io_array4.png");
        test_image().save(&path).unwrap();
        let img = read_image_as_array4(&path).unwrap();
        // Array4s for images encode (image, channel, row, column).
        assert_eq!(img.shape(), &[1, 3, 3, 3]);
        assert_eq!(
            (img[[0, 0, 0, 0]], img[[0, 1, 0, 0]], img[[0, 2, 0, 0]]),
            (0.0, 0.0, 0.0)
        );
        assert_eq!(
            (img[[0, 0, 1, 0]], img[[0, 1, 1, 0]], img[[0, 2, 1, 0]]),
            (1.0, 0.0, 0.0)
        );
        assert_eq!(
            (img[[0, 0, 1, 1]], img[[0, 1, 1, 1]], img[[0, 2, 1, 1]]),
            (0.0, 1.0, 0.0)
        );
        assert_eq!(
            (img[[0, 0, 1, 2]], img[[0, 1, 1, 2]], img[[0, 2, 1, 2]]),
            (0.0, 0.0, 1.0)
        );
        assert_eq!(
            (img[[0, 0, 2, 2]], img[[0, 1, 2, 2]], img[[0, 2, 2, 2]]),
            (1.0, 1.0, 1.0)
        );
    }
}
