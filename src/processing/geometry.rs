use crate::models::{Line, Point, Quadrilateral};
use crate::utils::{MrzError, Result};

const PARALLEL_EPSILON: f32 = 1e-6;

/// Recovers true document corners from the detector's edge keypoints.
///
/// The detector marks each edge with two points set slightly inside the
/// corners: `k0,k1` on the top edge, `k2,k3` right, `k4,k5` bottom and
/// `k6,k7` left, walking clockwise from the top-left corner.
pub struct QuadCorrector;

impl QuadCorrector {
    /// Maps keypoints from model-input space to the space of the crop that
    /// was resized into the model.
    pub fn rescale_keypoints(
        keypoints: &[Point; 8],
        model_size: (u32, u32),
        crop_size: (u32, u32),
    ) -> [Point; 8] {
        let sx = crop_size.0 as f32 / model_size.0 as f32;
        let sy = crop_size.1 as f32 / model_size.1 as f32;
        keypoints.map(|p| Point::new(p.x * sx, p.y * sy))
    }

    pub fn find_intersection(a: &Line, b: &Line) -> Result<Point> {
        let (x1, y1, x2, y2) = (a.p1.x, a.p1.y, a.p2.x, a.p2.y);
        let (x3, y3, x4, y4) = (b.p1.x, b.p1.y, b.p2.x, b.p2.y);

        let denom = (x1 - x2) * (y3 - y4) - (y1 - y2) * (x3 - x4);
        if denom.abs() < PARALLEL_EPSILON {
            return Err(MrzError::DegenerateGeometry(
                "edge lines are parallel or coincident".to_string(),
            ));
        }

        let a_cross = x1 * y2 - y1 * x2;
        let b_cross = x3 * y4 - y3 * x4;
        let px = (a_cross * (x3 - x4) - (x1 - x2) * b_cross) / denom;
        let py = (a_cross * (y3 - y4) - (y1 - y2) * b_cross) / denom;
        Ok(Point::new(px, py))
    }

    pub fn correct(keypoints: &[Point; 8]) -> Result<Quadrilateral> {
        let k = keypoints;
        let top = Line::new(k[0], k[1]);
        let right = Line::new(k[2], k[3]);
        let bottom = Line::new(k[4], k[5]);
        let left = Line::new(k[6], k[7]);

        let quad = Quadrilateral {
            top_left: Self::find_intersection(&left, &top)?,
            top_right: Self::find_intersection(&top, &right)?,
            bottom_right: Self::find_intersection(&right, &bottom)?,
            bottom_left: Self::find_intersection(&bottom, &left)?,
        };

        if !Self::is_convex_clockwise(&quad) {
            return Err(MrzError::DegenerateGeometry(format!(
                "corners do not form a convex clockwise region: {:?}",
                quad.corners()
            )));
        }
        Ok(quad)
    }

    /// Every turn along TL, TR, BR, BL must bend the same way (clockwise on
    /// screen, which is a positive cross product with y pointing down).
    pub fn is_convex_clockwise(quad: &Quadrilateral) -> bool {
        let c = quad.corners();
        (0..4).all(|i| {
            let (a, b, n) = (c[i], c[(i + 1) % 4], c[(i + 2) % 4]);
            let cross = (b.x - a.x) * (n.y - b.y) - (b.y - a.y) * (n.x - b.x);
            cross > 0.0
        })
    }

    /// Output size of the rectified crop: the longer of each pair of
    /// opposite edges.
    pub fn crop_size(quad: &Quadrilateral) -> (f32, f32) {
        let width = quad
            .top_left
            .distance(&quad.top_right)
            .max(quad.bottom_left.distance(&quad.bottom_right));
        let height = quad
            .top_left
            .distance(&quad.bottom_left)
            .max(quad.top_right.distance(&quad.bottom_right));
        (width, height)
    }
}
