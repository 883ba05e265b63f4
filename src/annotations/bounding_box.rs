use serde::Serialize;

/// A struct representing a bounding box.
///
/// A bounding box is the rectangle an object detection model predicts around an
/// object, together with the class it believes the object belongs to. This
/// project uses the standard convention of the left side of the image being x=0
/// and the top of the image being y=0, with coordinates in pixels of the
/// original image.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BoundingBox {
    left: f32,
    top: f32,
    right: f32,
    bottom: f32,
    class_id: usize,
    label: String,
}

impl BoundingBox {
    /// Checks if a box has valid parameters before constructing.
    pub fn new(
        left: f32,
        top: f32,
        right: f32,
        bottom: f32,
        class_id: usize,
        label: String,
    ) -> Result<Self, String> {
        if left > right {
            Err(format!(
                "Failed to create BoundingBox, value for left > value for right ({} > {}).",
                left, right
            ))
        } else if top > bottom {
            Err(format!(
                "Failed to create BoundingBox, value for top > value for bottom ({} > {}).",
                top, bottom
            ))
        } else {
            Ok(BoundingBox {
                left,
                top,
                right,
                bottom,
                class_id,
                label,
            })
        }
    }

    pub fn left(&self) -> f32 {
        self.left
    }

    pub fn top(&self) -> f32 {
        self.top
    }

    pub fn right(&self) -> f32 {
        self.right
    }

    pub fn bottom(&self) -> f32 {
        self.bottom
    }

    pub fn class_id(&self) -> usize {
        self.class_id
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn width(&self) -> f32 {
        self.right - self.left
    }

    pub fn height(&self) -> f32 {
        self.bottom - self.top
    }

    pub fn area(&self) -> f32 {
        self.width() * self.height()
    }

    pub fn intersection_over_union(&self, other: &BoundingBox) -> f32 {
        let overlap_width = (self.right.min(other.right) - self.left.max(other.left)).max(0.0);
        let overlap_height = (self.bottom.min(other.bottom) - self.top.max(other.top)).max(0.0);
        let intersection = overlap_width * overlap_height;
        let union = self.area() + other.area() - intersection;
        if union <= 0.0 {
            0.0
        } else {
            intersection / union
        }
    }
}
