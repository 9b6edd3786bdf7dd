//!
//! # Ray propagation
//!
//! A ray is propagated through an [`OpticalSystem`] surface after surface:
//! it is first translated to the intersection with the surface and then refracted into
//! the medium behind the surface, until either all the surfaces have been visited or
//! the ray is terminated.
//!

use std::f64::consts::FRAC_PI_2;

use rayon::prelude::*;

use crate::{
    angle::{self, AngleError},
    paraxial::{surface_refraction, ParaxialRay},
    ray::{RayError, Termination},
    OpticalRay, OpticalSystem, Point, Surface,
};

/// Direction substituted to a ray travelling exactly along the x axis when computing its slope
const DEGENERATE_ANGLE: f64 = 1e-5;

#[derive(Debug, thiserror::Error)]
pub enum PropagatorError {
    #[error("x-position of the optical ray ({ray_x}) is beyond the first surface (x={surface_x})")]
    RayPosition { ray_x: f64, surface_x: f64 },
    #[error("cannot propagate a terminated ray")]
    TerminatedRay,
    #[error("global y limits must be increasing, found ({0},{1})")]
    YLimits(f64, f64),
    #[error("lens aperture [{y_min},{y_max}] is not within the global y limits [{lower},{upper}]")]
    LensAperture {
        y_min: f64,
        y_max: f64,
        lower: f64,
        upper: f64,
    },
    #[error("Snell's law sine ({0}) is out of [-1,1] after the total internal reflection check")]
    SnellDomain(f64),
    #[error("cannot update the optical ray")]
    Ray(#[from] RayError),
    #[error("invalid angle")]
    Angle(#[from] AngleError),
}
pub type Result<T> = std::result::Result<T, PropagatorError>;

/// # Ray propagator
///
/// Binds an initial [`OpticalRay`] to an [`OpticalSystem`] with optional global y limits.
/// A ray leaving the system aperture is carried along its line to the global y limit it is heading to.
pub struct RayPropagator<'a> {
    optical_system: &'a OpticalSystem,
    optical_ray: OpticalRay,
    y_limits: Option<(f64, f64)>,
}
impl<'a> RayPropagator<'a> {
    /// Creates a new `RayPropagator`
    ///
    /// The ray must be active and on the left of the first surface vertex,
    /// and the lens apertures must fit within `y_limits`.
    pub fn new(
        optical_system: &'a OpticalSystem,
        optical_ray: OpticalRay,
        y_limits: Option<(f64, f64)>,
    ) -> Result<Self> {
        if !optical_ray.is_active() {
            return Err(PropagatorError::TerminatedRay);
        }
        if let Some(surface) = optical_system.surfaces().first() {
            if optical_ray.x > surface.extent() {
                return Err(PropagatorError::RayPosition {
                    ray_x: optical_ray.x,
                    surface_x: surface.extent(),
                });
            }
        }
        if let Some((lower, upper)) = y_limits {
            if !(lower < upper) {
                return Err(PropagatorError::YLimits(lower, upper));
            }
            if let Some(surface) = optical_system
                .lenses()
                .iter()
                .flat_map(|lens| [lens.surface_1(), lens.surface_2()])
                .find(|surface| surface.y_min() < lower || surface.y_max() > upper)
            {
                return Err(PropagatorError::LensAperture {
                    y_min: surface.y_min(),
                    y_max: surface.y_max(),
                    lower,
                    upper,
                });
            }
        }
        Ok(Self {
            optical_system,
            optical_ray,
            y_limits,
        })
    }
    pub fn optical_ray(&self) -> &OpticalRay {
        &self.optical_ray
    }
    pub fn y_limits(&self) -> Option<(f64, f64)> {
        self.y_limits
    }
    /// Propagates the ray through the optical system
    ///
    /// Returns the ray at the origin, then at each surface it reached.
    /// `max_steps` limits the number of refractions, the propagation stops early
    /// if the ray is terminated.
    /// With `paraxial`, surfaces are replaced by their vertex planes and refraction by the
    /// paraxial [transfer matrix](crate::paraxial::refraction).
    pub fn propagate_ray(&self, max_steps: Option<usize>, paraxial: bool) -> Result<Vec<OpticalRay>> {
        let surfaces = self.optical_system.surfaces();
        let n = self.optical_system.refractive_indices();
        let mut ray = self.optical_ray;
        let mut steps = vec![ray];
        let Some(first) = surfaces.first() else {
            return Ok(steps);
        };
        self.translate(first, &mut ray, paraxial);
        steps.push(ray);
        for i in 0..surfaces.len() - 1 {
            if !ray.is_active() || max_steps.map_or(false, |k| i >= k) {
                break;
            }
            self.refract(&surfaces[i], &mut ray, n[i], n[i + 1], paraxial)?;
            if ray.is_active() {
                self.translate(&surfaces[i + 1], &mut ray, paraxial);
            }
            steps.push(ray);
        }
        Ok(steps)
    }
    /// Moves the ray to its intersection with `surface`
    fn translate(&self, surface: &Surface, ray: &mut OpticalRay, paraxial: bool) {
        let Some(theta) = ray.theta() else {
            return;
        };
        let m = if theta == 0f64 {
            DEGENERATE_ANGLE.tan()
        } else {
            theta.tan()
        };
        let hit = if paraxial {
            let x = surface.extent();
            Some([x, ray.y + m * (x - ray.x)])
        } else {
            surface.intersect_with_slope(ray.x, ray.y, m)
        };
        match (hit, self.y_limits) {
            (Some(p), _) if surface.contains_y(p[1]) => ray.move_to(p),
            (Some([_, y]), y_limits) => {
                log::debug!(
                    "ray hits the surface at x={:.3} outside its aperture (y={:.6})",
                    surface.extent(),
                    y
                );
                if let Some((lower, upper)) = y_limits {
                    let y_limit = if y < surface.y_min() { lower } else { upper };
                    ray.move_to(along_line(ray, m, y_limit));
                }
                ray.terminate(Termination::Clipped);
            }
            (None, None) => {
                log::warn!(
                    "ray at [{:.6},{:.6}] misses the surface at x={:.3}, ray left in place",
                    ray.x,
                    ray.y,
                    surface.extent()
                );
            }
            (None, Some((lower, upper))) => {
                let y_limit = if theta < FRAC_PI_2 { upper } else { lower };
                ray.move_to(along_line(ray, m, y_limit));
                log::debug!("ray misses the surface at x={:.3}", surface.extent());
                ray.terminate(Termination::Clipped);
            }
        }
    }
    /// Refracts the ray at `surface` from the medium of index `n_i` into the medium of index `n_t`
    fn refract(
        &self,
        surface: &Surface,
        ray: &mut OpticalRay,
        n_i: f64,
        n_t: f64,
        paraxial: bool,
    ) -> Result<()> {
        let Some(theta) = ray.theta() else {
            return Ok(());
        };
        if paraxial {
            let r = surface_refraction(surface, n_i, n_t) * ParaxialRay::new(ray.y, theta.tan());
            ray.update_theta(r[1].atan())?;
            return Ok(());
        }
        let theta_n = surface.normal_angle(ray.position());
        let theta_in = angle::normalize(theta, -FRAC_PI_2, FRAC_PI_2)? - theta_n;
        if n_t <= n_i {
            let theta_c = (n_t / n_i).asin();
            if theta_in.abs() >= theta_c {
                log::debug!(
                    "total internal reflection at [{:.6},{:.6}]: {:.6} >= {:.6}",
                    ray.x,
                    ray.y,
                    theta_in.abs(),
                    theta_c
                );
                ray.terminate(Termination::TotalInternalReflection);
                return Ok(());
            }
        }
        let sin_theta_t = n_i / n_t * theta_in.sin();
        if sin_theta_t.abs() > 1f64 {
            return Err(PropagatorError::SnellDomain(sin_theta_t));
        }
        ray.update_theta(theta_n + sin_theta_t.asin())?;
        Ok(())
    }
}

/// Point on the ray line of slope `m` at ordinate `y`
fn along_line(ray: &OpticalRay, m: f64, y: f64) -> Point {
    [ray.x + (y - ray.y) / m, y]
}

/// Propagates independent rays through the same optical system in parallel
///
/// See [`RayPropagator::propagate_ray`], the first error aborts the propagation.
pub fn propagate_rays(
    optical_system: &OpticalSystem,
    rays: &[OpticalRay],
    y_limits: Option<(f64, f64)>,
    max_steps: Option<usize>,
    paraxial: bool,
) -> Result<Vec<Vec<OpticalRay>>> {
    rays.par_iter()
        .map(|ray| {
            RayPropagator::new(optical_system, *ray, y_limits)?.propagate_ray(max_steps, paraxial)
        })
        .collect()
}
