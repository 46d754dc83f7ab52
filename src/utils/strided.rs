use crate::math::{Point, Real};
use num::cast::AsPrimitive;

/// Reads 3D points out of a flat buffer of `f32` or `f64` coordinates.
///
/// Point `i` is read from `data[i * stride..i * stride + 3]`, so `stride` is
/// expressed in elements, not in bytes. Trailing elements that do not form a
/// complete point are ignored. A stride smaller than 3 is treated as 3.
///
/// # Example
///
/// ```
/// use hacd3d::utils::points_from_strided;
///
/// // Positions interleaved with a 2D texture coordinate.
/// let data = [0.0f32, 1.0, 2.0, 0.5, 0.5, 3.0, 4.0, 5.0, 1.0, 1.0];
/// let points = points_from_strided(&data, 5);
/// assert_eq!(points.len(), 2);
/// assert_eq!(points[1].y, 4.0);
/// ```
pub fn points_from_strided<N: AsPrimitive<Real>>(data: &[N], stride: usize) -> Vec<Point<Real>> {
    let stride = stride.max(3);
    let count = if data.len() >= 3 {
        (data.len() - 3) / stride + 1
    } else {
        0
    };

    (0..count)
        .map(|i| {
            let base = i * stride;
            Point::new(
                data[base].as_(),
                data[base + 1].as_(),
                data[base + 2].as_(),
            )
        })
        .collect()
}

#[cfg(test)]
mod test {
    use super::points_from_strided;
    use crate::math::Point;

    #[test]
    fn tightly_packed_doubles() {
        let data = [1.0f64, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0];
        assert_eq!(
            points_from_strided(&data, 3),
            vec![Point::new(1.0, 2.0, 3.0), Point::new(4.0, 5.0, 6.0)]
        );
    }

    #[test]
    fn too_short_buffer() {
        assert!(points_from_strided(&[1.0f32, 2.0], 3).is_empty());
    }
}
