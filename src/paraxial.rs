//!
//! # Paraxial ray transfer matrices
//!
//! In the paraxial approximation a ray is the vector $[y,u]$ of its height and slope
//! at a plane normal to the optical axis, and each optical element is a $2\times 2$ matrix.
//!

use nalgebra::{Matrix2, Vector2};

use crate::{OpticalSystem, Surface};

/// Paraxial ray: height and slope
pub type ParaxialRay = Vector2<f64>;

/// Free propagation over the distance `d` along the optical axis
pub fn translation(d: f64) -> Matrix2<f64> {
    Matrix2::new(1f64, d, 0f64, 1f64)
}
/// Refraction at a spherical interface of radius `radius` from index `n_i` to index `n_t`
///
/// $$\begin{bmatrix} 1 & 0 \\\\ -\frac{n_t-n_i}{R n_t} & \frac{n_i}{n_t}\end{bmatrix}$$
pub fn refraction(radius: f64, n_i: f64, n_t: f64) -> Matrix2<f64> {
    Matrix2::new(1f64, 0f64, -(n_t - n_i) / (radius * n_t), n_i / n_t)
}
/// Refraction matrix of a conic surface approximated by its vertex curvature
pub fn surface_refraction(surface: &Surface, n_i: f64, n_t: f64) -> Matrix2<f64> {
    refraction(surface.vertex_curvature_radius(), n_i, n_t)
}
/// Transfer matrix from the vertex of the first lens surface to the vertex of the last lens surface
pub fn lenses_matrix(system: &OpticalSystem) -> Matrix2<f64> {
    let surfaces = system.surfaces();
    let n = system.refractive_indices();
    let n_lens_surfaces = surfaces.len() - 1;
    (0..n_lens_surfaces).fold(Matrix2::identity(), |m, i| {
        let refracted = surface_refraction(&surfaces[i], n[i], n[i + 1]) * m;
        if i + 1 < n_lens_surfaces {
            translation(surfaces[i + 1].extent() - surfaces[i].extent()) * refracted
        } else {
            refracted
        }
    })
}
/// Effective focal length of the lenses, `None` for an afocal system
pub fn effective_focal_length(system: &OpticalSystem) -> Option<f64> {
    let c = lenses_matrix(system)[(1, 0)];
    if c == 0f64 {
        None
    } else {
        Some(-c.recip())
    }
}
