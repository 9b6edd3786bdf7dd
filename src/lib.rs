//!
//! # Meridional Ray Tracing
//!
//! Geometric optics of rays in the $(x,y)$ plane through a sequence of lenses
//! bounded by conic surfaces.
//!
//! An [`OpticalSystem`] is assembled from [`Lens`]es, each made of 2 [`Surface`]s,
//! and closed by a final surface.
//! A [`RayPropagator`] traces an [`OpticalRay`] through the system, refracting
//! it at each surface with Snell's law, and returns the ray at each surface:
//! ```
//! use ray_optics::{new_ray, Lens, OpticalSystem, RayPropagator, Surface};
//!
//! # fn main() -> ray_optics::Result<()> {
//! let lens = Lens::new(
//!     Surface::new(-2., 10., 0., None, None)?,
//!     Surface::new(2., 10., 0., None, None)?,
//!     1.5,
//! )?;
//! let system = OpticalSystem::builder()
//!     .lens(lens)
//!     .final_surface(Surface::new(1., 20., 99., None, None)?)
//!     .build()?;
//! let ray = new_ray().point_of_origin([-10., 1.]).build()?;
//! let trace = RayPropagator::new(&system, ray, Some((-20., 20.)))?.propagate_ray(None, false)?;
//! assert_eq!(trace.len(), system.surfaces().len() + 1);
//! # Ok(())
//! # }
//! ```

pub mod angle;
pub mod error;
pub mod lens;
pub mod paraxial;
pub mod propagator;
pub mod quadratic;
pub mod ray;
pub mod surface;
pub mod system;
pub use error::{OpticsError, Result};
pub use lens::Lens;
pub use propagator::{propagate_rays, RayPropagator};
pub use ray::{new_ray, OpticalRay, RayState, Termination, Trace};
pub use surface::Surface;
pub use system::{construct, LensSpec, OpticalSystem, SurfaceSpec, SystemSpec};

/// Point $[x,y]$ in the meridional plane
pub type Point = [f64; 2];
