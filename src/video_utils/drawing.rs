use crate::annotations::detection::Detection;
use crate::error::DetectError;
use opencv::core::{Mat, Point, Rect, Scalar};
use opencv::imgproc;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

const PALETTE_SEED: u64 = 2;

/// A display color per class id, stored as BGR to match OpenCV drawing.
pub type ClassPalette = Vec<(f64, f64, f64)>;

/// Generates one display color per class from a fixed seed, so a class
/// keeps the same color across frames and runs.
pub fn class_palette(num_classes: usize) -> ClassPalette {
    let mut rng = StdRng::seed_from_u64(PALETTE_SEED);
    (0..num_classes)
        .map(|_| {
            (
                rng.random_range(0.0..255.0),
                rng.random_range(0.0..255.0),
                rng.random_range(0.0..255.0),
            )
        })
        .collect()
}

/// Draws each detection's rectangle and `label: confidence` text onto a frame.
pub fn annotate(
    frame: &mut Mat,
    detections: &[Detection],
    palette: &ClassPalette,
) -> Result<(), DetectError> {
    for detection in detections {
        let bbox = &detection.bbox;
        let x1 = bbox.left().round() as i32;
        let y1 = bbox.top().round() as i32;
        let x2 = bbox.right().round() as i32;
        let y2 = bbox.bottom().round() as i32;
        let (blue, green, red) = palette
            .get(bbox.class_id())
            .copied()
            .unwrap_or((255.0, 255.0, 255.0));
        let color = Scalar::new(blue, green, red, 0.0);
        let label = format!("{}: {:.2}", bbox.label(), detection.confidence);

        imgproc::rectangle(
            frame,
            Rect::new(x1, y1, x2 - x1, y2 - y1),
            color,
            2,
            imgproc::LINE_8,
            0,
        )?;
        // Keep the label inside the frame when the box touches the top edge.
        let text_origin = Point::new(x1, (y1 - 5).max(12));
        imgproc::put_text(
            frame,
            &label,
            text_origin,
            imgproc::FONT_HERSHEY_SIMPLEX,
            0.5,
            color,
            1,
            imgproc::LINE_AA,
            false,
        )?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::annotations::bounding_box::BoundingBox;
    use opencv::core::CV_8UC3;

    #[test]
    fn palette_has_one_color_per_class() {
        let palette = class_palette(80);
        assert_eq!(palette.len(), 80);
        for (b, g, r) in &palette {
            assert!((0.0..255.0).contains(b));
            assert!((0.0..255.0).contains(g));
            assert!((0.0..255.0).contains(r));
        }
    }

    #[test]
    fn palette_is_deterministic() {
        assert_eq!(class_palette(80), class_palette(80));
    }

    #[test]
    fn annotate_modifies_the_frame() {
        let mut frame =
            Mat::new_rows_cols_with_default(64, 64, CV_8UC3, Scalar::all(0.0)).unwrap();
        let detections = vec![Detection {
            bbox: BoundingBox::new(8.0, 8.0, 40.0, 40.0, 0, "person".to_string()).unwrap(),
            confidence: 0.9,
        }];
        let palette = class_palette(1);
        annotate(&mut frame, &detections, &palette).unwrap();
        let sum = opencv::core::sum_elems(&frame).unwrap();
        assert!(sum[0] + sum[1] + sum[2] > 0.0);
    }
}
