use ray_optics::*;
use skyangle::SkyAngle;
use std::time::Instant;

const PRESCRIPTION: &str = r#"
ambient_refractive_index = 1.0
final_surface = { r_x = 1.0, r_y = 40.0, x = 199.0 }

# plano-convex singlet
[[lenses]]
refractive_index = 1.5
surfaces = [
    { r_x = -1e-6, r_y = 10.0, x = 0.0 },
    { r_x = 2.0, r_y = 10.0, x = 0.0 },
]

# biconvex singlet
[[lenses]]
refractive_index = 1.6
surfaces = [
    { r_x = -1.5, r_y = 12.0, x = 40.0, y_min = -10.0, y_max = 10.0 },
    { r_x = 1.5, r_y = 12.0, x = 40.0, y_min = -10.0, y_max = 10.0 },
]
"#;

fn main() -> Result<()> {
    env_logger::init();

    let spec = SystemSpec::from_toml(PRESCRIPTION)?;
    let system = construct(&spec)?;
    println!("SURFACES:");
    system
        .surfaces()
        .iter()
        .zip(system.refractive_indices())
        .for_each(|(s, n)| println!(" x: {:+8.3} ; n: {:.3}", s.extent(), n));
    match paraxial::effective_focal_length(&system) {
        Some(f) => println!("Effective focal length: {:.3}", f),
        None => println!("Afocal system"),
    }
    let y_limits = Some((-30f64, 30f64));

    println!("CHIEF RAY:");
    let ray = new_ray().point_of_origin([-20., 0.]).build()?;
    let trace = RayPropagator::new(&system, ray, y_limits)?.propagate_ray(None, false)?;
    trace.iter().for_each(|ray| println!("{}", ray));

    println!("MARGINAL RAY:");
    let ray = new_ray().point_of_origin([-20., 8.]).build()?;
    let propagator = RayPropagator::new(&system, ray, y_limits)?;
    let trace = propagator.propagate_ray(None, false)?;
    trace.iter().for_each(|ray| println!("{}", ray));
    println!("PARAXIAL:");
    let trace = propagator.propagate_ray(None, true)?;
    trace.iter().for_each(|ray| println!("{}", ray));

    let n_ray = 1001;
    let field = SkyAngle::Degree(2f64).to_radians();
    let rays = (0..n_ray)
        .map(|i| {
            let y = -9.5 + 19. * i as f64 / (n_ray - 1) as f64;
            new_ray().point_of_origin([-20., y]).direction(field).build()
        })
        .collect::<std::result::Result<Vec<_>, _>>()?;
    let now = Instant::now();
    let traces = propagate_rays(&system, &rays, y_limits, None, false)?;
    let et = now.elapsed();
    println!(
        "Tracing {} rays in {}ms ({:.3E}rays/s)",
        rays.len(),
        et.as_millis(),
        (rays.len() as f64 / et.as_secs_f64()).round() as u64
    );
    let count = |reason: Termination| {
        traces
            .iter()
            .filter(|trace| trace.termination() == Some(reason))
            .count()
    };
    println!(
        "Clipped: {} ; TIR: {}",
        count(Termination::Clipped),
        count(Termination::TotalInternalReflection)
    );
    let image: Vec<Point> = traces
        .iter()
        .filter(|trace| trace.termination().is_none())
        .filter_map(|trace| trace.coordinates().last().copied())
        .collect();
    if !image.is_empty() {
        let mean = image.iter().map(|p| p[1]).sum::<f64>() / image.len() as f64;
        let std = (image.iter().map(|p| (p[1] - mean).powi(2)).sum::<f64>()
            / image.len() as f64)
            .sqrt();
        println!("Image height: {:.6} ; spread (STD): {:.6e}", mean, std);
    }
    Ok(())
}
