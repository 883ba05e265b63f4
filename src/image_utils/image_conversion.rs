use image::imageops::FilterType;
use image::{self, Rgb, RgbImage, imageops};
use ndarray::{Array, Array4, ArrayView4};

/// Converts an rgb8 image into the `(1, 3, height, width)` f32 blob the
/// network consumes, with channel values normalized to `[0, 1]`.
pub fn convert_rgb_image_to_owned_array(rgb_image: &RgbImage) -> Array4<f32> {
    let mut image_array = Array::zeros((
        1,
        3,
        rgb_image.height() as usize,
        rgb_image.width() as usize,
    ));
    for pixel in rgb_image.enumerate_pixels() {
        let x = pixel.0 as usize;
        let y = pixel.1 as usize;
        let [r, g, b] = pixel.2.0;
        image_array[[0, 0, y, x]] = (r as f32) / 255.;
        image_array[[0, 1, y, x]] = (g as f32) / 255.;
        image_array[[0, 2, y, x]] = (b as f32) / 255.;
    }
    image_array
}

pub fn convert_array_view_to_rgb_image(image_array: ArrayView4<f32>) -> RgbImage {
    let image_height = image_array.shape()[2] as u32;
    let image_width = image_array.shape()[3] as u32;

    let mut rgb_image = RgbImage::new(image_width, image_height);
    for y in 0..image_height {
        for x in 0..image_width {
            let r = (image_array[[0, 0, y as usize, x as usize]] * 255.0)
                .round()
                .clamp(0.0, 255.0) as u8;
            let g = (image_array[[0, 1, y as usize, x as usize]] * 255.0)
                .round()
                .clamp(0.0, 255.0) as u8;
            let b = (image_array[[0, 2, y as usize, x as usize]] * 255.0)
                .round()
                .clamp(0.0, 255.0) as u8;
            rgb_image.put_pixel(x, y, Rgb([r, g, b]));
        }
    }
    rgb_image
}

/// Resizes an image to the network input size and converts it to a blob.
///
/// The resize is exact rather than aspect-preserving, matching how the
/// original frame is blobbed for YOLOv3; the decoded boxes are scaled
/// straight back to the original dimensions afterwards.
pub fn preprocess_image(img: &RgbImage, input_width: usize, input_height: usize) -> Array4<f32> {
    let resized = imageops::resize(
        img,
        input_width as u32,
        input_height as u32,
        FilterType::CatmullRom,
    );
    convert_rgb_image_to_owned_array(&resized)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gradient_image(width: u32, height: u32) -> RgbImage {
        RgbImage::from_fn(width, height, |x, y| {
            Rgb([(x * 20) as u8, (y * 20) as u8, 128])
        })
    }

    #[test]
    fn rgb_image_to_array_roundtrip() {
        let rgb_img = gradient_image(4, 6);
        let arr4_img = convert_rgb_image_to_owned_array(&rgb_img);
        assert_eq!(arr4_img.shape(), &[1, 3, 6, 4]);
        assert_eq!(convert_array_view_to_rgb_image(arr4_img.view()), rgb_img);
    }

    #[test]
    fn array_values_are_normalized() {
        let mut rgb_img = RgbImage::new(2, 2);
        rgb_img.put_pixel(1, 0, Rgb([255, 0, 51]));
        let arr = convert_rgb_image_to_owned_array(&rgb_img);
        assert_eq!(arr[[0, 0, 0, 1]], 1.0);
        assert_eq!(arr[[0, 1, 0, 1]], 0.0);
        assert_eq!(arr[[0, 2, 0, 1]], 0.2);
    }

    #[test]
    fn preprocess_resizes_to_input_dimensions() {
        let rgb_img = gradient_image(12, 7);
        let blob = preprocess_image(&rgb_img, 416, 416);
        assert_eq!(blob.shape(), &[1, 3, 416, 416]);
        assert!(blob.iter().all(|v| (0.0..=1.0).contains(v)));
    }

    #[test]
    fn preprocess_of_uniform_image_is_uniform() {
        let rgb_img = RgbImage::from_pixel(100, 50, Rgb([51, 102, 204]));
        let blob = preprocess_image(&rgb_img, 32, 32);
        assert!(blob.index_axis(ndarray::Axis(1), 0).iter().all(|v| (v - 0.2).abs() < 1e-6));
        assert!(blob.index_axis(ndarray::Axis(1), 1).iter().all(|v| (v - 0.4).abs() < 1e-6));
        assert!(blob.index_axis(ndarray::Axis(1), 2).iter().all(|v| (v - 0.8).abs() < 1e-6));
    }
}
