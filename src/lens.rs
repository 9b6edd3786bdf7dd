use serde::{Deserialize, Serialize};

use crate::{LensSpec, Point, Surface};

#[derive(Debug, thiserror::Error)]
pub enum LensError {
    #[error("lens refractive index must be positive, found {0}")]
    RefractiveIndex(f64),
    #[error("lens surfaces share the same vertex (x={0})")]
    Thickness(f64),
}
pub type Result<T> = std::result::Result<T, LensError>;

/// # Lens
///
/// A lens is a medium of refractive index $n$ between 2 surfaces,
/// `surface_1` is always on the left of `surface_2`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "LensSpec", into = "LensSpec")]
pub struct Lens {
    surface_1: Surface,
    surface_2: Surface,
    refractive_index: f64,
}
impl Lens {
    /// Creates a new `Lens`, the surfaces are reordered by [extent](Surface::extent) if needed
    pub fn new(surface_1: Surface, surface_2: Surface, refractive_index: f64) -> Result<Self> {
        if !(refractive_index > 0f64 && refractive_index.is_finite()) {
            return Err(LensError::RefractiveIndex(refractive_index));
        }
        if surface_1.extent() == surface_2.extent() {
            return Err(LensError::Thickness(surface_1.extent()));
        }
        let (surface_1, surface_2) = if surface_1.extent() > surface_2.extent() {
            (surface_2, surface_1)
        } else {
            (surface_1, surface_2)
        };
        Ok(Self {
            surface_1,
            surface_2,
            refractive_index,
        })
    }
    /// Entry surface
    pub fn surface_1(&self) -> &Surface {
        &self.surface_1
    }
    /// Exit surface
    pub fn surface_2(&self) -> &Surface {
        &self.surface_2
    }
    pub fn refractive_index(&self) -> f64 {
        self.refractive_index
    }
    /// Lens ordering key, the vertex of the entry surface
    pub fn extent(&self) -> f64 {
        self.surface_1.extent()
    }
    /// Closed outline of the lens
    ///
    /// The outline goes up `surface_1`, across the top edges, down `surface_2`
    /// and back across the bottom edges.
    pub fn points(&self, n_points: usize) -> Vec<Point> {
        let (s1, s2) = (&self.surface_1, &self.surface_2);
        s1.sample(n_points, false)
            .into_iter()
            .chain(s1.point_at_y(s1.y_max()))
            .chain(s2.point_at_y(s2.y_max()))
            .chain(s2.sample(n_points, true))
            .chain(s2.point_at_y(s2.y_min()))
            .chain(s1.point_at_y(s1.y_min()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn biconvex() -> (Surface, Surface) {
        (
            Surface::new(-1., 10., 0., None, None).unwrap(),
            Surface::new(1., 10., 0., None, None).unwrap(),
        )
    }

    #[test]
    fn surface_order() {
        let (left, right) = biconvex();
        for lens in [
            Lens::new(left, right, 1.5).unwrap(),
            Lens::new(right, left, 1.5).unwrap(),
        ] {
            assert_eq!(lens.surface_1(), &left);
            assert_eq!(lens.surface_2(), &right);
            assert!(lens.surface_1().extent() < lens.surface_2().extent());
        }
    }

    #[test]
    fn invalid() {
        let (left, right) = biconvex();
        assert!(matches!(
            Lens::new(left, right, 0.),
            Err(LensError::RefractiveIndex(_))
        ));
        assert!(Lens::new(left, right, f64::NAN).is_err());
        assert!(matches!(
            Lens::new(left, left, 1.5),
            Err(LensError::Thickness(_))
        ));
    }

    #[test]
    fn outline() {
        let (left, right) = biconvex();
        let lens = Lens::new(left, right, 1.5).unwrap();
        let points = lens.points(50);
        assert_eq!(points.len(), 104);
        let first = points.first().unwrap();
        let last = points.last().unwrap();
        assert!((first[0] - last[0]).abs() < 1e-3);
        assert!((first[1] - last[1]).abs() < 1e-6);
        assert!(points.iter().all(|p| p[0].abs() <= 1. + 1e-9));
    }
}
