use crate::{
    angle::AngleError, lens::LensError, propagator::PropagatorError, quadratic::QuadraticError,
    ray::RayError, surface::SurfaceError, system::SystemError,
};

#[derive(Debug, thiserror::Error)]
pub enum OpticsError {
    #[error("quadratic solver failed")]
    Quadratic(#[from] QuadraticError),
    #[error("angle normalization failed")]
    Angle(#[from] AngleError),
    #[error("cannot build `::ray_optics::Surface`")]
    Surface(#[from] SurfaceError),
    #[error("cannot build `::ray_optics::Lens`")]
    Lens(#[from] LensError),
    #[error("invalid `::ray_optics::OpticalRay`")]
    Ray(#[from] RayError),
    #[error("cannot build `::ray_optics::OpticalSystem`")]
    System(#[from] SystemError),
    #[error("ray propagation failed")]
    Propagator(#[from] PropagatorError),
}
pub type Result<T> = std::result::Result<T, OpticsError>;
