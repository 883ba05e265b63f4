use crate::annotations::detection::Detection;

/// Non maximum suppression is a way of removing duplicate detections.
///
/// Detections are ranked by confidence; a lower-ranked detection of the same
/// class is dropped when it overlaps a kept one past the IoU threshold.
/// Detections of different classes never suppress each other.
pub fn non_maximum_suppression(
    mut detections: Vec<Detection>,
    iou_threshold: f32,
) -> Vec<Detection> {
    detections.sort_by(|a, b| b.confidence.total_cmp(&a.confidence));
    let mut detections_to_remove: Vec<bool> = vec![false; detections.len()];
    for (current_index, current_det) in detections.iter().enumerate() {
        if detections_to_remove[current_index] {
            continue;
        }
        for (other_index, other_det) in detections[current_index + 1..].iter().enumerate() {
            if detections_to_remove[current_index + other_index + 1] {
                continue;
            }
            if current_det.bbox.class_id() != other_det.bbox.class_id() {
                continue;
            }
            let iou = current_det.bbox.intersection_over_union(&other_det.bbox);
            if iou > iou_threshold {
                detections_to_remove[current_index + other_index + 1] = true;
            }
        }
    }
    let mut drop_iter = detections_to_remove.iter();
    detections.retain(|_| !drop_iter.next().unwrap());
    detections
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::annotations::bounding_box::BoundingBox;

    fn det(
        left: f32,
        top: f32,
        right: f32,
        bottom: f32,
        class_id: usize,
        confidence: f32,
    ) -> Detection {
        Detection {
            bbox: BoundingBox::new(left, top, right, bottom, class_id, format!("class{class_id}"))
                .unwrap(),
            confidence,
        }
    }

    #[test]
    fn nms_empty_input() {
        let nms_result = non_maximum_suppression(Vec::new(), 0.5);
        assert!(nms_result.is_empty());
    }

    #[test]
    fn nms_no_overlap() {
        let dets = vec![det(0.0, 0.0, 1.0, 1.0, 0, 0.6), det(2.0, 2.0, 3.0, 3.0, 0, 0.6)];
        let nms_result = non_maximum_suppression(dets.clone(), 0.5);
        assert_eq!(dets, nms_result);
    }

    #[test]
    fn nms_standard_usage() {
        let dets = vec![
            det(0.0, 0.0, 4.0, 4.0, 0, 0.6),
            det(0.0, 0.0, 5.0, 5.0, 0, 0.55),
            det(6.0, 6.0, 10.0, 10.0, 0, 0.75),
        ];
        let nms_result = non_maximum_suppression(dets, 0.5);
        let true_dets = vec![
            det(6.0, 6.0, 10.0, 10.0, 0, 0.75),
            det(0.0, 0.0, 4.0, 4.0, 0, 0.6),
        ];
        assert_eq!(true_dets, nms_result);
    }

    #[test]
    fn nms_overlap_but_different_classes() {
        let dets = vec![
            det(0.0, 0.0, 4.5, 4.5, 0, 0.6),
            det(0.0, 0.0, 5.0, 5.0, 1, 0.55),
            det(0.5, 0.5, 4.0, 4.0, 0, 0.8),
            det(6.0, 6.0, 10.0, 10.0, 0, 0.75),
        ];
        let nms_result = non_maximum_suppression(dets, 0.5);
        let true_dets = vec![
            det(0.5, 0.5, 4.0, 4.0, 0, 0.8),
            det(6.0, 6.0, 10.0, 10.0, 0, 0.75),
            det(0.0, 0.0, 5.0, 5.0, 1, 0.55),
        ];
        assert_eq!(true_dets, nms_result);
    }
}
