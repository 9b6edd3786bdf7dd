use std::fmt;

use super::{angle, Point};

#[derive(Debug, thiserror::Error)]
pub enum RayError {
    #[error("ray angle {0} does not point toward +x (cos(theta)<=0)")]
    Backward(f64),
    #[error("invalid ray angle")]
    Angle(#[from] angle::AngleError),
}
pub type Result<T> = std::result::Result<T, RayError>;

/// Reason a ray stopped propagating
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Termination {
    /// The ray left the system through a global y limit or a surface aperture
    Clipped,
    /// The ray was totally reflected at a surface
    TotalInternalReflection,
}
impl fmt::Display for Termination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Termination::Clipped => write!(f, "clipped"),
            Termination::TotalInternalReflection => write!(f, "total internal reflection"),
        }
    }
}

/// Ray propagation status
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RayState {
    /// The ray is travelling with the angle `theta` in $[0,2\pi]$ with the x axis
    Active { theta: f64 },
    Terminated(Termination),
}

/// # Ray definition
///
/// A ray in the meridional plane is defined with:
///  - a point of origin: $[x,y]$,
///  - a state, either active with the direction $\theta$ or terminated.
///
/// An active ray always travels toward $+x$: $\cos\theta>0$.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OpticalRay {
    /// Ray x coordinate
    pub x: f64,
    /// Ray y coordinate
    pub y: f64,
    state: RayState,
}
/// # Ray builder
///
/// Build a new [`OpticalRay`](crate::OpticalRay)
pub struct NewRay {
    /// Ray point of origin
    pub p: Point,
    /// Ray direction
    pub theta: f64,
}
impl Default for NewRay {
    fn default() -> Self {
        Self {
            p: [0f64; 2],
            theta: 0f64,
        }
    }
}
impl NewRay {
    /// Build the [`OpticalRay`](crate::OpticalRay)
    pub fn build(self) -> Result<OpticalRay> {
        OpticalRay::new(self.p[0], self.p[1], self.theta)
    }
    /// Set the [`OpticalRay`](crate::OpticalRay) point of origin
    pub fn point_of_origin(self, p: Point) -> Self {
        Self { p, ..self }
    }
    /// Set the [`OpticalRay`](crate::OpticalRay) direction angle with the x axis in radians
    pub fn direction(self, theta: f64) -> Self {
        Self { theta, ..self }
    }
}
/// Create a [`NewRay`](crate::NewRay) at the origin propagating along the optical axis
pub fn new_ray() -> NewRay {
    NewRay::default()
}
impl OpticalRay {
    /// Creates an active ray at $(x,y)$ with the direction $\theta$
    pub fn new(x: f64, y: f64, theta: f64) -> Result<Self> {
        let mut ray = Self {
            x,
            y,
            state: RayState::Active { theta: 0f64 },
        };
        ray.update_theta(theta)?;
        Ok(ray)
    }
    pub fn state(&self) -> RayState {
        self.state
    }
    /// Ray direction, `None` once the ray is terminated
    pub fn theta(&self) -> Option<f64> {
        match self.state {
            RayState::Active { theta } => Some(theta),
            RayState::Terminated(_) => None,
        }
    }
    pub fn is_active(&self) -> bool {
        matches!(self.state, RayState::Active { .. })
    }
    pub fn termination(&self) -> Option<Termination> {
        match self.state {
            RayState::Active { .. } => None,
            RayState::Terminated(reason) => Some(reason),
        }
    }
    pub fn position(&self) -> Point {
        [self.x, self.y]
    }
    /// Sets the ray direction
    ///
    /// The angle is wrapped into $[0,2\pi]$ and must point toward $+x$.
    pub fn update_theta(&mut self, theta: f64) -> Result<()> {
        let theta = angle::normalize_full_turn(theta)?;
        if theta.cos() <= 0f64 {
            return Err(RayError::Backward(theta));
        }
        self.state = RayState::Active { theta };
        Ok(())
    }
    pub(crate) fn move_to(&mut self, p: Point) {
        self.x = p[0];
        self.y = p[1];
    }
    pub(crate) fn terminate(&mut self, reason: Termination) {
        self.state = RayState::Terminated(reason);
    }
}
impl fmt::Display for OpticalRay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.state {
            RayState::Active { theta } => write!(
                f,
                "P: [{:+15.9},{:+15.9}] ; THETA: {:+.9}",
                self.x, self.y, theta
            ),
            RayState::Terminated(reason) => write!(
                f,
                "P: [{:+15.9},{:+15.9}] ; {}",
                self.x, self.y, reason
            ),
        }
    }
}
/// Queries on a sequence of ray snapshots
pub trait Trace {
    /// Ray coordinates
    fn coordinates(&self) -> Vec<Point>;
    /// How the ray ended, `None` if it went through
    fn termination(&self) -> Option<Termination>;
}
impl Trace for [OpticalRay] {
    fn coordinates(&self) -> Vec<Point> {
        self.iter().map(|ray| ray.position()).collect()
    }
    fn termination(&self) -> Option<Termination> {
        self.last().and_then(|ray| ray.termination())
    }
}
