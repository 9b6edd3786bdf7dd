use serde::{Deserialize, Serialize};

use crate::{
    quadratic::{self, Sign},
    OpticalRay, Point, SurfaceSpec,
};

/// Margin kept from the aperture edges when sampling a surface
const SAMPLING_SAFETY: f64 = 1e-10;
/// Offsets tried in turn when [`Surface::point_at_y`] misses the conic
const POINT_AT_Y_RETRIES: [f64; 2] = [-1e-5, 1e-5];

#[derive(Debug, thiserror::Error)]
pub enum SurfaceError {
    #[error("neither r_x ({r_x}) nor r_y ({r_y}) can be 0 or non-finite")]
    Radius { r_x: f64, r_y: f64 },
    #[error("surface x position must be finite, found {0}")]
    Position(f64),
    #[error("y_min ({y_min}) is greater than |r_y| ({r_y})")]
    YMin { y_min: f64, r_y: f64 },
    #[error("y_max ({y_max}) is less than -|r_y| ({r_y})")]
    YMax { y_max: f64, r_y: f64 },
    #[error("y_min ({y_min}) is greater than y_max ({y_max})")]
    YRange { y_min: f64, y_max: f64 },
    #[error("optical ray (x={ray_x}) must be left of the surface (x={x})")]
    RayPosition { ray_x: f64, x: f64 },
}
pub type Result<T> = std::result::Result<T, SurfaceError>;

/// # Conic surface
///
/// A surface is the arc of the ellipse
/// $$\left(\frac{x^\prime-x}{r_x}\right)^2 + \left(\frac{y}{r_y}\right)^2 = 1$$
/// with $y\in[y_{min},y_{max}]$.
/// The sign of $r_x$ selects the half of the ellipse: the surface vertex is at $x+r_x$ on the optical axis.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "SurfaceSpec", into = "SurfaceSpec")]
pub struct Surface {
    r_x: f64,
    r_y: f64,
    x: f64,
    y_min: f64,
    y_max: f64,
}
impl Surface {
    /// Creates a new `Surface`
    ///
    /// Missing aperture bounds default to $\mp|r_y|$, bounds beyond $\pm|r_y|$ are clamped.
    pub fn new(r_x: f64, r_y: f64, x: f64, y_min: Option<f64>, y_max: Option<f64>) -> Result<Self> {
        if r_x == 0f64 || r_y == 0f64 || !r_x.is_finite() || !r_y.is_finite() {
            return Err(SurfaceError::Radius { r_x, r_y });
        }
        if !x.is_finite() {
            return Err(SurfaceError::Position(x));
        }
        let r_y = r_y.abs();
        let y_min = match y_min {
            Some(y_min) if y_min > r_y => return Err(SurfaceError::YMin { y_min, r_y }),
            Some(y_min) if y_min < -r_y => {
                log::warn!("y_min ({}) is less than -|r_y| ({}), clamping", y_min, -r_y);
                -r_y
            }
            Some(y_min) => y_min,
            None => -r_y,
        };
        let y_max = match y_max {
            Some(y_max) if y_max < -r_y => return Err(SurfaceError::YMax { y_max, r_y }),
            Some(y_max) if y_max > r_y => {
                log::warn!("y_max ({}) is greater than |r_y| ({}), clamping", y_max, r_y);
                r_y
            }
            Some(y_max) => y_max,
            None => r_y,
        };
        if y_min > y_max {
            return Err(SurfaceError::YRange { y_min, y_max });
        }
        Ok(Self {
            r_x,
            r_y,
            x,
            y_min,
            y_max,
        })
    }
    /// Signed x radius
    pub fn r_x(&self) -> f64 {
        self.r_x
    }
    /// y radius magnitude
    pub fn r_y(&self) -> f64 {
        self.r_y
    }
    /// x coordinate of the ellipse center
    pub fn x(&self) -> f64 {
        self.x
    }
    pub fn y_min(&self) -> f64 {
        self.y_min
    }
    pub fn y_max(&self) -> f64 {
        self.y_max
    }
    /// Position of the surface vertex on the optical axis, $x+r_x$
    ///
    /// This is the key surfaces and lenses are ordered with.
    pub fn extent(&self) -> f64 {
        self.x + self.r_x
    }
    /// Checks if `y` is within the surface aperture
    pub fn contains_y(&self, y: f64) -> bool {
        (self.y_min..=self.y_max).contains(&y)
    }
    /// Signed radius of curvature at the vertex, $-r_y^2/r_x$
    ///
    /// The radius is positive if the center of curvature is on the right of the vertex.
    pub fn vertex_curvature_radius(&self) -> f64 {
        -self.r_y * self.r_y / self.r_x
    }
    fn sign(&self) -> Sign {
        Sign::of(self.r_x)
    }
    /// Solves the conic for $x$ at a given $y$
    fn x_at(&self, y: f64) -> Option<f64> {
        let r_x2 = self.r_x * self.r_x;
        let a = r_x2.recip();
        let b = -2f64 * self.x / r_x2;
        let c = self.x * self.x / r_x2 + (y / self.r_y).powi(2) - 1f64;
        quadratic::solve(self.sign(), a, b, c)
    }
    /// Intersection of the line through $(x_0,y_0)$ with direction $\theta$ and the conic
    ///
    /// With $m=\tan\theta$, the abscissa of the intersection is the root of
    /// $$ \left(\frac{1}{r_x^2}+\frac{m^2}{r_y^2}\right)x^2
    ///  + \left(-\frac{2x_c}{r_x^2}+\frac{m}{r_y^2}(2y_0-2mx_0)\right)x
    ///  + \frac{x_c^2}{r_x^2}+\left(\frac{mx_0-y_0}{r_y}\right)^2-1=0$$
    /// selected with the sign of $r_x$.
    /// The aperture bounds are not applied.
    pub fn intersect(&self, x0: f64, y0: f64, theta: f64) -> Option<Point> {
        self.intersect_with_slope(x0, y0, theta.tan())
    }
    pub(crate) fn intersect_with_slope(&self, x0: f64, y0: f64, m: f64) -> Option<Point> {
        let r_x2 = self.r_x * self.r_x;
        let r_y2 = self.r_y * self.r_y;
        let a = r_x2.recip() + m * m / r_y2;
        let b = -2f64 * self.x / r_x2 + m * (2f64 * y0 - 2f64 * m * x0) / r_y2;
        let c = self.x * self.x / r_x2 + ((m * x0 - y0) / self.r_y).powi(2) - 1f64;
        quadratic::solve(self.sign(), a, b, c).map(|x| [x, m * (x - x0) + y0])
    }
    /// Samples `n_points` points evenly spaced in $y$ across the aperture
    ///
    /// Points are ordered from `y_min` to `y_max`, or the other way around if `reverse` is true.
    /// Values of $y$ that miss the conic are skipped.
    pub fn sample(&self, n_points: usize, reverse: bool) -> Vec<Point> {
        let (start, end) = if reverse {
            (self.y_max - SAMPLING_SAFETY, self.y_min + SAMPLING_SAFETY)
        } else {
            (self.y_min + SAMPLING_SAFETY, self.y_max - SAMPLING_SAFETY)
        };
        let step = if n_points > 1 {
            (end - start) / (n_points - 1) as f64
        } else {
            0f64
        };
        (0..n_points)
            .filter_map(|i| {
                let y = start + step * i as f64;
                self.x_at(y).map(|x| [x, y])
            })
            .collect()
    }
    /// Point on the conic at ordinate `y`
    ///
    /// If `y` misses the conic, the inversion is attempted again at `y-1e-5` and `y+1e-5`.
    pub fn point_at_y(&self, y: f64) -> Option<Point> {
        self.x_at(y)
            .or_else(|| {
                POINT_AT_Y_RETRIES
                    .iter()
                    .find_map(|dy| self.x_at(y + dy))
            })
            .map(|x| [x, y])
    }
    /// Directions from the ray origin to the top and bottom edges of the ellipse, `[upper,lower]`
    pub fn max_theta_bounds(&self, ray: &OpticalRay) -> Result<[f64; 2]> {
        let delta_x = self.x - ray.x;
        if delta_x <= 0f64 {
            return Err(SurfaceError::RayPosition { ray_x: ray.x, x: self.x });
        }
        Ok([
            ((self.r_y - ray.y) / delta_x).atan(),
            ((-self.r_y - ray.y) / delta_x).atan(),
        ])
    }
    /// Angle of the surface normal at point `p` with the x axis, within $(-\pi/2,\pi/2)$
    ///
    /// The slope of the conic is given by implicit differentiation:
    /// $$\frac{dy}{dx}=\frac{r_y^2}{r_x^2}\frac{x_c-x}{\sqrt{r_y^2-\frac{r_y^2}{r_x^2}(x-x_c)^2}}$$
    /// with the sign flipped for $y<0$.
    pub fn normal_angle(&self, p: Point) -> f64 {
        let [x, y] = p;
        let q = self.r_y * self.r_y / (self.r_x * self.r_x);
        let mut num = self.r_y * self.r_y - q * (x - self.x).powi(2);
        if num < 0f64 {
            log::debug!("point ({x},{y}) is off the conic, slope denominator: {num:e}");
            num = 0f64;
        }
        if num == 0f64 {
            log::debug!("vertical slope at ({x},{y})");
            num = 1e-25;
        }
        let mut dydx = q * (self.x - x) / num.sqrt();
        if y < 0f64 {
            dydx = -dydx;
        }
        (-dydx.recip()).atan()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn on_conic(s: &Surface, p: Point) -> bool {
        let [x, y] = p;
        let f = ((x - s.x()) / s.r_x()).powi(2) + (y / s.r_y()).powi(2) - 1f64;
        f.abs() < 1e-6
    }

    #[test]
    fn degenerate_radii() {
        assert!(matches!(
            Surface::new(0., 1., 0., None, None),
            Err(SurfaceError::Radius { .. })
        ));
        assert!(Surface::new(1., 0., 0., None, None).is_err());
        assert!(Surface::new(f64::INFINITY, 1., 0., None, None).is_err());
    }

    #[test]
    fn aperture_bounds() {
        let s = Surface::new(5., -3., 1., None, None).unwrap();
        assert_eq!(s.r_y(), 3.);
        assert_eq!((s.y_min(), s.y_max()), (-3., 3.));
        let s = Surface::new(5., 3., 1., Some(-10.), Some(1.5)).unwrap();
        assert_eq!((s.y_min(), s.y_max()), (-3., 1.5));
        assert!(matches!(
            Surface::new(5., 3., 1., Some(4.), None),
            Err(SurfaceError::YMin { .. })
        ));
        assert!(matches!(
            Surface::new(5., 3., 1., None, Some(-4.)),
            Err(SurfaceError::YMax { .. })
        ));
        assert!(matches!(
            Surface::new(5., 3., 1., Some(1.), Some(-1.)),
            Err(SurfaceError::YRange { .. })
        ));
    }

    #[test]
    fn vertex() {
        let s = Surface::new(-4., 2., 10., None, None).unwrap();
        assert_eq!(s.extent(), 6.);
        let p = s.point_at_y(0.).unwrap();
        assert!((p[0] - 6.).abs() < 1e-12);
        let s = Surface::new(4., 2., 10., None, None).unwrap();
        let p = s.point_at_y(0.).unwrap();
        assert!((p[0] - 14.).abs() < 1e-12);
        assert_eq!(s.vertex_curvature_radius(), -1.);
    }

    #[test]
    fn sampling() {
        let s = Surface::new(-20., 8., 25., Some(-6.), Some(7.)).unwrap();
        let points = s.sample(101, false);
        assert_eq!(points.len(), 101);
        assert!(points.iter().all(|p| on_conic(&s, *p)));
        assert!(points.windows(2).all(|w| w[0][1] < w[1][1]));
        assert!((points[0][1] + 6.).abs() < 1e-9);
        let reversed = s.sample(101, true);
        assert!(reversed.windows(2).all(|w| w[0][1] > w[1][1]));
        assert!((reversed[0][1] - 7.).abs() < 1e-9);
        assert_eq!(s.sample(0, false).len(), 0);
    }

    #[test]
    fn intersection() {
        let s = Surface::new(-50., 10., 50., None, None).unwrap();
        let p = s.intersect(-10., 2., 0.).unwrap();
        assert!(on_conic(&s, p));
        assert!((p[1] - 2.).abs() < 1e-12);
        assert!((p[0] - (50. - 50. * 0.96f64.sqrt())).abs() < 1e-9);
        let p = s.intersect(-10., 0., 0.05).unwrap();
        assert!(on_conic(&s, p));
        assert!((p[1] - (p[0] + 10.) * 0.05f64.tan()).abs() < 1e-9);
        assert!(s.intersect(-10., 12., 0.).is_none());
    }

    #[test]
    fn point_at_edge() {
        let s = Surface::new(3., 2., 0., None, None).unwrap();
        let p = s.point_at_y(2.).unwrap();
        assert!(p[0].abs() < 1e-6);
        assert_eq!(p[1], 2.);
        assert!(s.point_at_y(2.1).is_none());
    }

    #[test]
    fn theta_bounds() {
        let s = Surface::new(-1., 2., 5., None, None).unwrap();
        let ray = OpticalRay::new(1., 0., 0.).unwrap();
        let [upper, lower] = s.max_theta_bounds(&ray).unwrap();
        assert!((upper - 0.5f64.atan()).abs() < 1e-12);
        assert!((lower + 0.5f64.atan()).abs() < 1e-12);
        let ray = OpticalRay::new(6., 0., 0.).unwrap();
        assert!(matches!(
            s.max_theta_bounds(&ray),
            Err(SurfaceError::RayPosition { .. })
        ));
    }

    #[test]
    fn normals() {
        // circle of radius 5 centered at the origin
        let s = Surface::new(5., 5., 0., None, None).unwrap();
        assert!(s.normal_angle([5., 0.]).abs() < 1e-6);
        let a = std::f64::consts::FRAC_PI_6;
        let upper = [5. * a.cos(), 5. * a.sin()];
        assert!((s.normal_angle(upper) - a).abs() < 1e-9);
        let lower = [5. * a.cos(), -5. * a.sin()];
        assert!((s.normal_angle(lower) + a).abs() < 1e-9);
    }
}
