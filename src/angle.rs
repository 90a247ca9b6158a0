use crate::pose::Point2D;

/// Added to the product of vector norms so a zero-length limb yields 0 instead of NaN.
const EPSILON: f64 = 1e-7;

/// Compute the angle in degrees at `vertex` formed by the segments to `a` and `c`.
pub fn angle(a: Point2D, vertex: Point2D, c: Point2D) -> f64 {
    let ba = a - vertex;
    let bc = c - vertex;

    let cosine = ba.dot(bc) / (ba.norm() * bc.norm() + EPSILON);

    // f64::clamp propagates NaN, so guard explicitly before acos
    let cosine = if cosine.is_nan() {
        0.0
    } else {
        cosine.clamp(-1.0, 1.0)
    };
    cosine.acos().to_degrees()
}

#[cfg(test)]
mod tests {
    use super::{angle, Point2D};
    use assert_approx_eq::assert_approx_eq;

    #[test]
    fn straight_leg() {
        let hip = Point2D::new(0.0, 0.0);
        let knee = Point2D::new(0.0, 1.0);
        let ankle = Point2D::new(0.0, 2.0);
        assert_approx_eq!(angle(hip, knee, ankle), 180.0, 0.1);
    }

    #[test]
    fn right_angle() {
        let hip = Point2D::new(0.0, 0.0);
        let knee = Point2D::new(1.0, 0.0);
        let ankle = Point2D::new(1.0, 1.0);
        assert_approx_eq!(angle(hip, knee, ankle), 90.0, 1e-3);
    }

    #[test]
    fn is_symmetric() {
        let a = Point2D::new(3.0, 7.5);
        let b = Point2D::new(-1.0, 2.0);
        let c = Point2D::new(4.25, -6.0);
        assert_approx_eq!(angle(a, b, c), angle(c, b, a));
    }

    #[test]
    fn stays_within_range() {
        let points = [
            Point2D::new(0.0, 0.0),
            Point2D::new(1.0, 0.0),
            Point2D::new(-3.0, 2.0),
            Point2D::new(100.0, -40.0),
            Point2D::new(0.5, 0.25),
        ];
        for &a in &points {
            for &b in &points {
                for &c in &points {
                    let theta = angle(a, b, c);
                    assert!((0.0..=180.0).contains(&theta), "{}", theta);
                }
            }
        }
    }

    #[test]
    fn coincident_endpoints() {
        let a = Point2D::new(2.0, 3.0);
        let vertex = Point2D::new(-4.0, 1.0);
        assert_approx_eq!(angle(a, vertex, a), 0.0, 1e-2);
    }

    #[test]
    fn zero_length_segment() {
        let vertex = Point2D::new(1.0, 1.0);
        let c = Point2D::new(5.0, 1.0);
        assert_approx_eq!(angle(vertex, vertex, c), 90.0);
    }

    #[test]
    fn non_finite_input() {
        let theta = angle(
            Point2D::new(f64::NAN, 0.0),
            Point2D::new(0.0, 0.0),
            Point2D::new(f64::INFINITY, 1.0),
        );
        assert!(theta.is_finite());
    }
}
