//! Pictogram location inside a photograph.

use nalgebra::Point2;
use serde::{Deserialize, Serialize};

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum QuadParseError {
    #[error("invalid coordinate {token:?} at position {index}")]
    InvalidNumber { index: usize, token: String },
    #[error("expected 8 coordinates (4 x,y pairs), got {got}")]
    WrongCount { got: usize },
    #[error("coordinate at position {index} is not finite")]
    NonFinite { index: usize },
}

/// Four pixel-space corners in canonical order:
/// bottom-left, top-left, top-right, bottom-right.
///
/// Image coordinates are used, so "bottom" is the larger `y`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Quad {
    pub points: [Point2<f32>; 4],
}

impl Quad {
    /// Build a quad from four corners in arbitrary order.
    pub fn canonical(points: [Point2<f32>; 4]) -> Self {
        let mut p = points;
        // stable, so ties on x keep their input order
        p.sort_by(|a, b| a.x.total_cmp(&b.x));

        let crossed = (p[0].y > p[1].y && p[2].y > p[3].y) || (p[0].y < p[1].y && p[2].y < p[3].y);
        if crossed {
            p.swap(2, 3);
        }

        if p[0].y < p[1].y {
            Self {
                points: [p[1], p[0], p[3], p[2]],
            }
        } else {
            Self { points: p }
        }
    }

    /// Parse a flat `x0,y0,x1,y1,...` list of four corners.
    ///
    /// An empty (or whitespace-only) string means the location is unknown and
    /// yields `Ok(None)`.
    pub fn parse_flat(s: &str) -> Result<Option<Self>, QuadParseError> {
        if s.trim().is_empty() {
            return Ok(None);
        }

        let mut values = Vec::with_capacity(8);
        for (index, token) in s.split(',').enumerate() {
            let token = token.trim();
            let v: f32 = token.parse().map_err(|_| QuadParseError::InvalidNumber {
                index,
                token: token.to_string(),
            })?;
            if !v.is_finite() {
                return Err(QuadParseError::NonFinite { index });
            }
            values.push(v);
        }
        if values.len() != 8 {
            return Err(QuadParseError::WrongCount { got: values.len() });
        }

        let points = [0, 1, 2, 3].map(|i| Point2::new(values[2 * i], values[2 * i + 1]));
        Ok(Some(Self::canonical(points)))
    }

    /// The full `width x height` frame as a canonical quad.
    pub fn frame(width: u32, height: u32) -> Self {
        let (w, h) = (width as f32, height as f32);
        Self {
            points: [
                Point2::new(0.0, h),
                Point2::new(0.0, 0.0),
                Point2::new(w, 0.0),
                Point2::new(w, h),
            ],
        }
    }

    pub fn bottom_left(&self) -> Point2<f32> {
        self.points[0]
    }

    pub fn top_left(&self) -> Point2<f32> {
        self.points[1]
    }

    pub fn top_right(&self) -> Point2<f32> {
        self.points[2]
    }

    pub fn bottom_right(&self) -> Point2<f32> {
        self.points[3]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pts(q: &Quad) -> [(f32, f32); 4] {
        q.points.map(|p| (p.x, p.y))
    }

    #[test]
    fn axis_aligned_square_is_bottom_left_first() {
        let q = Quad::parse_flat("0,0,0,10,10,10,10,0").unwrap().unwrap();
        assert_eq!(pts(&q), [(0.0, 10.0), (0.0, 0.0), (10.0, 0.0), (10.0, 10.0)]);
    }

    #[test]
    fn corner_order_in_input_does_not_matter() {
        let a = Quad::parse_flat("10,10,0,0,10,0,0,10").unwrap().unwrap();
        let b = Quad::parse_flat("0,10,10,0,0,0,10,10").unwrap().unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn crossed_right_side_is_uncrossed() {
        // left side ascending, right side ascending -> right pair swapped
        let q = Quad::canonical([
            Point2::new(10.0, 12.0),
            Point2::new(12.0, 40.0),
            Point2::new(50.0, 8.0),
            Point2::new(52.0, 45.0),
        ]);
        assert_eq!(
            pts(&q),
            [(12.0, 40.0), (10.0, 12.0), (50.0, 8.0), (52.0, 45.0)]
        );
    }

    #[test]
    fn normalization_is_idempotent() {
        for s in [
            "0,0,0,10,10,10,10,0",
            "10,12,12,40,50,8,52,45",
            "101.5,220,98,130,230,125,236.25,228",
        ] {
            let once = Quad::parse_flat(s).unwrap().unwrap();
            let twice = Quad::canonical(once.points);
            assert_eq!(once, twice, "input {s}");
        }
    }

    #[test]
    fn frame_is_already_canonical() {
        let f = Quad::frame(32, 24);
        assert_eq!(Quad::canonical(f.points), f);
        assert_eq!(f.bottom_right(), Point2::new(32.0, 24.0));
    }

    #[test]
    fn empty_input_means_no_geometry() {
        assert_eq!(Quad::parse_flat("").unwrap(), None);
        assert_eq!(Quad::parse_flat("   ").unwrap(), None);
    }

    #[test]
    fn malformed_input_is_rejected() {
        assert!(matches!(
            Quad::parse_flat("0,0,0,ten,10,10,10,0"),
            Err(QuadParseError::InvalidNumber { index: 3, .. })
        ));
        assert_eq!(
            Quad::parse_flat("0,0,1,1"),
            Err(QuadParseError::WrongCount { got: 4 })
        );
        assert!(matches!(
            Quad::parse_flat("0,0,0,10,10,10,10,inf"),
            Err(QuadParseError::NonFinite { index: 7 })
        ));
    }
}
