use serde::{Deserialize, Serialize};

use crate::{lens::LensError, surface::SurfaceError, Lens, Point, Surface};

/// Number of points sampled on a surface to locate its leftmost point
const OVERLAP_SAMPLES: usize = 1000;

#[derive(Debug, thiserror::Error)]
pub enum SystemError {
    #[error("cannot build surface")]
    Surface(#[from] SurfaceError),
    #[error("cannot build lens")]
    Lens(#[from] LensError),
    #[error("lens overlap detected: exit surface at x={left} and next entry surface at x={right}")]
    Overlap { left: f64, right: f64 },
    #[error("final surface (x={final_extent}) is not beyond the lens surface at x={lens_extent}")]
    FinalSurface { final_extent: f64, lens_extent: f64 },
    #[error("the optical system surfaces cannot be empty")]
    Empty,
    #[error("the optical system final surface is missing")]
    MissingFinalSurface,
    #[error("ambient refractive index must be positive, found {0}")]
    RefractiveIndex(f64),
    #[error("cannot parse the optical system prescription")]
    Toml(#[from] toml::de::Error),
}
pub type Result<T> = std::result::Result<T, SystemError>;

/// Surface prescription, see [`Surface::new`]
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SurfaceSpec {
    pub r_x: f64,
    pub r_y: f64,
    pub x: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub y_min: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub y_max: Option<f64>,
}
impl SurfaceSpec {
    pub fn new(r_x: f64, r_y: f64, x: f64) -> Self {
        Self {
            r_x,
            r_y,
            x,
            y_min: None,
            y_max: None,
        }
    }
    pub fn y_limits(self, y_min: f64, y_max: f64) -> Self {
        Self {
            y_min: Some(y_min),
            y_max: Some(y_max),
            ..self
        }
    }
    pub fn build(&self) -> Result<Surface> {
        Ok(Surface::new(
            self.r_x, self.r_y, self.x, self.y_min, self.y_max,
        )?)
    }
}
/// Lens prescription
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LensSpec {
    pub surfaces: [SurfaceSpec; 2],
    pub refractive_index: f64,
}
impl LensSpec {
    pub fn build(&self) -> Result<Lens> {
        let [s1, s2] = &self.surfaces;
        Ok(Lens::new(s1.build()?, s2.build()?, self.refractive_index)?)
    }
}
impl TryFrom<SurfaceSpec> for Surface {
    type Error = SystemError;
    fn try_from(spec: SurfaceSpec) -> Result<Self> {
        spec.build()
    }
}
impl From<Surface> for SurfaceSpec {
    fn from(surface: Surface) -> Self {
        SurfaceSpec::new(surface.r_x(), surface.r_y(), surface.x())
            .y_limits(surface.y_min(), surface.y_max())
    }
}
impl TryFrom<LensSpec> for Lens {
    type Error = SystemError;
    fn try_from(spec: LensSpec) -> Result<Self> {
        spec.build()
    }
}
impl From<Lens> for LensSpec {
    fn from(lens: Lens) -> Self {
        LensSpec {
            surfaces: [(*lens.surface_1()).into(), (*lens.surface_2()).into()],
            refractive_index: lens.refractive_index(),
        }
    }
}
fn default_ambient() -> f64 {
    1f64
}
/// Optical system prescription
///
/// ```toml
/// ambient_refractive_index = 1.0
/// final_surface = { r_x = 1.0, r_y = 20.0, x = 100.0 }
///
/// [[lenses]]
/// refractive_index = 1.5
/// surfaces = [
///     { r_x = -50.0, r_y = 10.0, x = 50.0 },
///     { r_x = 1.0, r_y = 10.0, x = 4.0 },
/// ]
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SystemSpec {
    #[serde(default = "default_ambient")]
    pub ambient_refractive_index: f64,
    #[serde(default)]
    pub lenses: Vec<LensSpec>,
    pub final_surface: SurfaceSpec,
}
impl SystemSpec {
    pub fn from_toml(prescription: &str) -> Result<Self> {
        Ok(toml::from_str(prescription)?)
    }
}

/// Builds the lenses and surfaces of a prescription and assembles them into an [`OpticalSystem`]
pub fn construct(spec: &SystemSpec) -> Result<OpticalSystem> {
    let lenses = spec
        .lenses
        .iter()
        .map(|lens| lens.build())
        .collect::<Result<Vec<_>>>()?;
    OpticalSystem::new(
        lenses,
        spec.final_surface.build()?,
        spec.ambient_refractive_index,
    )
}

/// # Optical system
///
/// A sequence of lenses, ordered along the optical axis, in an ambient medium and closed by a final surface.
///
/// The system flattens the lenses into the sequence of surfaces a ray goes through
/// and the refractive index of the medium in front of each surface:
/// `[n_0, n_lens_1, n_0, n_lens_2, n_0, ...]`
#[derive(Debug, Clone, PartialEq)]
pub struct OpticalSystem {
    lenses: Vec<Lens>,
    final_surface: Surface,
    ambient_refractive_index: f64,
    surfaces: Vec<Surface>,
    refractive_indices: Vec<f64>,
}
impl OpticalSystem {
    /// Creates a new `OpticalSystem`
    pub fn new(
        mut lenses: Vec<Lens>,
        final_surface: Surface,
        ambient_refractive_index: f64,
    ) -> Result<Self> {
        if !(ambient_refractive_index > 0f64 && ambient_refractive_index.is_finite()) {
            return Err(SystemError::RefractiveIndex(ambient_refractive_index));
        }
        lenses.sort_by(|a, b| a.extent().total_cmp(&b.extent()));
        check_lens_overlap(&lenses)?;
        check_final_surface(&lenses, &final_surface)?;
        let surfaces: Vec<Surface> = lenses
            .iter()
            .flat_map(|lens| [*lens.surface_1(), *lens.surface_2()])
            .chain(Some(final_surface))
            .collect();
        if surfaces.is_empty() {
            return Err(SystemError::Empty);
        }
        let refractive_indices: Vec<f64> = Some(ambient_refractive_index)
            .into_iter()
            .chain(
                lenses
                    .iter()
                    .flat_map(|lens| [lens.refractive_index(), ambient_refractive_index]),
            )
            .collect();
        Ok(Self {
            lenses,
            final_surface,
            ambient_refractive_index,
            surfaces,
            refractive_indices,
        })
    }
    pub fn builder() -> OpticalSystemBuilder {
        Default::default()
    }
    pub fn lenses(&self) -> &[Lens] {
        &self.lenses
    }
    pub fn final_surface(&self) -> &Surface {
        &self.final_surface
    }
    pub fn ambient_refractive_index(&self) -> f64 {
        self.ambient_refractive_index
    }
    /// Surfaces in propagation order
    pub fn surfaces(&self) -> &[Surface] {
        &self.surfaces
    }
    /// Refractive index of the medium in front of each surface
    pub fn refractive_indices(&self) -> &[f64] {
        &self.refractive_indices
    }
    /// Adds a lens to the system
    ///
    /// The system is left unchanged if the new lens breaks the ordering constraints.
    pub fn add_lens(&mut self, lens: Lens) -> Result<()> {
        // linear scan, a bisection would do for large systems
        let slot = self
            .lenses
            .iter()
            .position(|other| other.extent() > lens.extent())
            .unwrap_or(self.lenses.len());
        let mut lenses = self.lenses.clone();
        lenses.insert(slot, lens);
        check_lens_overlap(&lenses)?;
        check_final_surface(&lenses, &self.final_surface)?;
        self.lenses = lenses;
        let k = 2 * slot;
        self.surfaces.insert(k, *lens.surface_2());
        self.surfaces.insert(k, *lens.surface_1());
        self.refractive_indices
            .insert(k + 1, self.ambient_refractive_index);
        self.refractive_indices
            .insert(k + 1, lens.refractive_index());
        log::debug!(
            "lens #{} added at x={:.3}, {} surfaces",
            slot,
            lens.extent(),
            self.surfaces.len()
        );
        Ok(())
    }
    /// Points sampled on each surface
    pub fn surface_points(&self, n_points: usize) -> Vec<Vec<Point>> {
        self.surfaces
            .iter()
            .map(|surface| surface.sample(n_points, false))
            .collect()
    }
    /// Outline of each lens followed by the points sampled on the final surface
    pub fn lens_points(&self, n_points: usize) -> Vec<Vec<Point>> {
        self.lenses
            .iter()
            .map(|lens| lens.points(n_points))
            .chain(Some(self.final_surface.sample(n_points, false)))
            .collect()
    }
}

fn leftmost_point(surface: &Surface) -> Option<Point> {
    surface
        .sample(OVERLAP_SAMPLES, false)
        .into_iter()
        .min_by(|a, b| a[0].total_cmp(&b[0]))
}
/// Checks that each lens exit surface is not beyond the next lens entry surface
///
/// If both vertices coincide, the leftmost point of the entry surface must not be
/// on the left of the leftmost point of the exit surface.
fn check_lens_overlap(lenses: &[Lens]) -> Result<()> {
    for pair in lenses.windows(2) {
        let (exit, entry) = (pair[0].surface_2(), pair[1].surface_1());
        let overlap = SystemError::Overlap {
            left: exit.extent(),
            right: entry.extent(),
        };
        if exit.extent() > entry.extent() {
            return Err(overlap);
        }
        if exit.extent() == entry.extent() {
            if let (Some(p_exit), Some(p_entry)) = (leftmost_point(exit), leftmost_point(entry)) {
                if p_entry[0] < p_exit[0] {
                    return Err(overlap);
                }
            }
        }
    }
    Ok(())
}
/// Checks that the final surface is beyond all the lens surfaces
fn check_final_surface(lenses: &[Lens], final_surface: &Surface) -> Result<()> {
    let final_extent = final_surface.extent();
    lenses
        .iter()
        .flat_map(|lens| [lens.surface_1(), lens.surface_2()])
        .find(|surface| surface.extent() > final_extent)
        .map_or(Ok(()), |surface| {
            Err(SystemError::FinalSurface {
                final_extent,
                lens_extent: surface.extent(),
            })
        })
}

/// [`OpticalSystem`] builder
pub struct OpticalSystemBuilder {
    lenses: Vec<Lens>,
    final_surface: Option<Surface>,
    ambient_refractive_index: f64,
}
impl Default for OpticalSystemBuilder {
    fn default() -> Self {
        Self {
            lenses: Vec::new(),
            final_surface: None,
            ambient_refractive_index: 1f64,
        }
    }
}
impl OpticalSystemBuilder {
    pub fn ambient_refractive_index(self, ambient_refractive_index: f64) -> Self {
        Self {
            ambient_refractive_index,
            ..self
        }
    }
    pub fn lens(mut self, lens: Lens) -> Self {
        self.lenses.push(lens);
        self
    }
    pub fn final_surface(self, final_surface: Surface) -> Self {
        Self {
            final_surface: Some(final_surface),
            ..self
        }
    }
    pub fn build(self) -> Result<OpticalSystem> {
        let final_surface = self
            .final_surface
            .ok_or(SystemError::MissingFinalSurface)?;
        OpticalSystem::new(self.lenses, final_surface, self.ambient_refractive_index)
    }
}
