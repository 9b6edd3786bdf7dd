use ray_optics::{
    construct, new_ray, paraxial, propagate_rays, Lens, LensSpec, OpticalRay, OpticalSystem,
    RayPropagator, Surface, SurfaceSpec, SystemSpec, Termination, Trace,
};
use std::f64::consts::{PI, TAU};

fn plano_convex() -> OpticalSystem {
    let spec = SystemSpec {
        ambient_refractive_index: 1.,
        lenses: vec![LensSpec {
            surfaces: [SurfaceSpec::new(-1e-6, 10., 0.), SurfaceSpec::new(50., 10., 0.)],
            refractive_index: 1.5,
        }],
        final_surface: SurfaceSpec::new(1., 100., 199.),
    };
    construct(&spec).unwrap()
}

/// Ellipse lens of vertex curvature radius 100 between x=-1 and x=1
fn thick_biconvex() -> OpticalSystem {
    let lens = Lens::new(
        Surface::new(-1., 10., 0., None, None).unwrap(),
        Surface::new(1., 10., 0., None, None).unwrap(),
        1.5,
    )
    .unwrap();
    OpticalSystem::builder()
        .lens(lens)
        .final_surface(Surface::new(1., 50., 299., None, None).unwrap())
        .build()
        .unwrap()
}

/// Signed direction in $(-\pi,\pi]$
fn signed(theta: f64) -> f64 {
    if theta > PI {
        theta - TAU
    } else {
        theta
    }
}

/// Abscissa where the ray line crosses the optical axis
fn axis_crossing(ray: &OpticalRay) -> f64 {
    ray.x - ray.y / ray.theta().unwrap().tan()
}

#[test]
fn plano_convex_on_axis() {
    let system = plano_convex();
    assert_eq!(system.surfaces().len(), 3);
    let ray = OpticalRay::new(-10., 0., 0.).unwrap();
    let steps = RayPropagator::new(&system, ray, None)
        .unwrap()
        .propagate_ray(None, false)
        .unwrap();
    assert_eq!(steps.len(), system.surfaces().len() + 1);
    assert_eq!(steps.termination(), None);
    let last = steps.last().unwrap();
    assert!((last.x - 200.).abs() < 1e-3);
    assert!(last.y.abs() < 0.05, "{}", last);
    assert!(signed(last.theta().unwrap()).abs() < 1e-3, "{}", last);
}

#[test]
fn plano_convex_converging() {
    let system = plano_convex();
    let ray = OpticalRay::new(-10., 1., 0.).unwrap();
    let steps = RayPropagator::new(&system, ray, Some((-100., 100.)))
        .unwrap()
        .propagate_ray(None, false)
        .unwrap();
    assert_eq!(steps.len(), 4);
    // through the flat face, the ray is not deviated
    assert!(signed(steps[2].theta().unwrap()).abs() < 1e-6);
    assert!((steps[2].y - 1.).abs() < 1e-3);
    // and bent toward the axis by the convex face
    let last = steps.last().unwrap();
    assert!(signed(last.theta().unwrap()) < 0.);
    assert!(axis_crossing(last) > 50.);
}

#[test]
fn total_internal_reflection() {
    let lens = Lens::new(
        Surface::new(-1e3, 1e3, 1e3 - 1., Some(-10.), Some(10.)).unwrap(),
        Surface::new(12., 12., 0., None, None).unwrap(),
        1.5,
    )
    .unwrap();
    let system = OpticalSystem::new(
        vec![lens],
        Surface::new(1., 50., 49., None, None).unwrap(),
        1.,
    )
    .unwrap();
    let ray = new_ray().point_of_origin([-5., 9.]).build().unwrap();
    let steps = RayPropagator::new(&system, ray, None)
        .unwrap()
        .propagate_ray(None, false)
        .unwrap();
    assert_eq!(steps.termination(), Some(Termination::TotalInternalReflection));
    let last = steps.last().unwrap();
    assert!(last.theta().is_none());
    // the ray stops on the exit surface
    assert!((last.x - (144f64 - last.y * last.y).sqrt()).abs() < 1e-6);
    assert!(steps.iter().all(|ray| ray.x < 10.));
    // a ray closer to the axis goes through
    let ray = new_ray().point_of_origin([-5., 2.]).build().unwrap();
    let steps = RayPropagator::new(&system, ray, None)
        .unwrap()
        .propagate_ray(None, false)
        .unwrap();
    assert_eq!(steps.termination(), None);
    assert_eq!(steps.len(), 4);
}

#[test]
fn paraxial_focus() {
    let system = thick_biconvex();
    let m = paraxial::lenses_matrix(&system);
    let back_focal_distance = -m[(0, 0)] / m[(1, 0)];
    let f = paraxial::effective_focal_length(&system).unwrap();
    assert!((f - 100.33).abs() < 0.01, "{f}");

    let ray = OpticalRay::new(-10., 0.1, 0.).unwrap();
    let propagator = RayPropagator::new(&system, ray, None).unwrap();
    let paraxial_steps = propagator.propagate_ray(None, true).unwrap();
    let exact_steps = propagator.propagate_ray(None, false).unwrap();
    let paraxial_focus = axis_crossing(paraxial_steps.last().unwrap());
    let exact_focus = axis_crossing(exact_steps.last().unwrap());
    assert!(
        (paraxial_focus - (1. + back_focal_distance)).abs() < 1e-3,
        "{paraxial_focus} vs {back_focal_distance}"
    );
    assert!(
        (paraxial_focus - exact_focus).abs() < 1.,
        "{paraxial_focus} vs {exact_focus}"
    );
}

#[test]
fn ray_fan() {
    let system = thick_biconvex();
    let rays: Vec<OpticalRay> = (0..41)
        .map(|i| {
            new_ray()
                .point_of_origin([-10., -12. + 0.6 * i as f64])
                .direction(0.01)
                .build()
                .unwrap()
        })
        .collect();
    let y_limits = Some((-60., 60.));
    let traces = propagate_rays(&system, &rays, y_limits, None, false).unwrap();
    assert_eq!(traces.len(), rays.len());
    for (ray, trace) in rays.iter().zip(&traces) {
        let sequential = RayPropagator::new(&system, *ray, y_limits)
            .unwrap()
            .propagate_ray(None, false)
            .unwrap();
        assert_eq!(&sequential, trace);
    }
    // rays above and below the lens aperture are clipped
    assert_eq!(traces[0].termination(), Some(Termination::Clipped));
    assert_eq!(traces[40].termination(), Some(Termination::Clipped));
    assert!(traces
        .iter()
        .filter(|trace| trace.termination() == Some(Termination::Clipped))
        .all(|trace| trace.last().unwrap().y.abs() == 60.));
    assert_eq!(traces[20].termination(), None);
}

#[test]
fn added_lens() {
    let mut system = thick_biconvex();
    let ray = OpticalRay::new(-10., 1., 0.).unwrap();
    let single = RayPropagator::new(&system, ray, None)
        .unwrap()
        .propagate_ray(None, false)
        .unwrap();
    system
        .add_lens(
            Lens::new(
                Surface::new(-1., 10., 60., None, None).unwrap(),
                Surface::new(1., 10., 60., None, None).unwrap(),
                1.5,
            )
            .unwrap(),
        )
        .unwrap();
    assert_eq!(system.refractive_indices(), &[1., 1.5, 1., 1.5, 1.]);
    let double = RayPropagator::new(&system, ray, None)
        .unwrap()
        .propagate_ray(None, false)
        .unwrap();
    assert_eq!(double.len(), single.len() + 2);
    assert_eq!(double[..3], single[..3]);
    let (single_theta, double_theta) = (
        signed(single.last().unwrap().theta().unwrap()),
        signed(double.last().unwrap().theta().unwrap()),
    );
    assert!(double_theta < single_theta);
}

#[test]
fn system_without_lens() {
    let system =
        OpticalSystem::new(vec![], Surface::new(1., 20., 9., None, None).unwrap(), 1.).unwrap();
    let ray = OpticalRay::new(0., 1., 0.1).unwrap();
    let steps = RayPropagator::new(&system, ray, None)
        .unwrap()
        .propagate_ray(None, false)
        .unwrap();
    assert_eq!(steps.len(), 2);
    assert!((steps[1].y - (1. + steps[1].x * 0.1f64.tan())).abs() < 1e-9);
    assert_eq!(steps[1].theta(), ray.theta());
}
