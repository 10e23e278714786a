//! Round trips and edge cases of the numeric transforms.

use approx::assert_relative_eq;
use ndarray::Array1;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use std::f64::consts::PI;
use thermonets_rs::geodesy::{
    cartesian_to_geodetic, geodetic_to_cartesian, ArrayBackend, CartesianPoint,
    CoordinateTransform, Ellipsoid, GeodeticPoint, NumericBackend,
};
use thermonets_rs::ThermoError;

/// Random geodetic points between 100 km and 2000 km altitude.
fn sample_points(count: usize, seed: u64) -> Vec<GeodeticPoint> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    (0..count)
        .map(|_| {
            GeodeticPoint::new(
                rng.gen_range(100_000.0..2_000_000.0),
                rng.gen_range(-85.0_f64..85.0).to_radians(),
                rng.gen_range(-PI..PI),
            )
        })
        .collect()
}

#[test]
fn test_altitude_round_trip() {
    let transform = CoordinateTransform::wgs84();

    for truth in sample_points(200, 42) {
        let cartesian = transform.to_cartesian(&truth).unwrap();
        let geo = transform.to_geodetic(&cartesian).unwrap();

        assert!(
            ((geo.h - truth.h) / truth.h).abs() < 1e-6,
            "altitude {} recovered as {}",
            truth.h,
            geo.h
        );
        assert_relative_eq!(geo.phi, truth.phi, epsilon = 1e-9);
        assert_relative_eq!(geo.lambda, truth.lambda, epsilon = 1e-12);
    }
}

#[test]
fn test_cartesian_round_trip() {
    let transform = CoordinateTransform::wgs84();

    for truth in sample_points(100, 7) {
        let point = transform.to_cartesian(&truth).unwrap();
        let back = transform
            .to_cartesian(&transform.to_geodetic(&point).unwrap())
            .unwrap();

        let norm = (point.x.powi(2) + point.y.powi(2) + point.z.powi(2)).sqrt();
        assert!((back.x - point.x).abs() < 1e-9 * norm);
        assert!((back.y - point.y).abs() < 1e-9 * norm);
        assert!((back.z - point.z).abs() < 1e-9 * norm);
    }
}

#[test]
fn test_accuracy_improves_with_iterations() {
    let wgs84 = Ellipsoid::wgs84();
    let truth = GeodeticPoint::new(1_500_000.0, 60.0_f64.to_radians(), 0.3);
    let point = geodetic_to_cartesian(&NumericBackend, &truth, &wgs84).unwrap();

    let errors: Vec<f64> = (1..=6)
        .map(|iterations| {
            let geo = cartesian_to_geodetic(&NumericBackend, &point, &wgs84, iterations).unwrap();
            (geo.h - truth.h).abs()
        })
        .collect();

    assert!(errors[0] > 1e-3, "one iteration should leave a visible error");
    for pair in errors.windows(2) {
        // Below a micrometre the comparison is rounding noise
        assert!(pair[1] <= pair[0] || pair[1] < 1e-6, "errors: {:?}", errors);
    }
    assert!(errors[3] < 1e-3);
}

#[test]
fn test_polar_axis_is_degenerate() {
    let transform = CoordinateTransform::wgs84();

    for z in [6_500_000.0, -7_000_000.0] {
        let geo = transform
            .to_geodetic(&CartesianPoint::new(0.0, 0.0, z))
            .unwrap();
        assert!(!geo.h.is_finite());
        assert!(!geo.phi.is_finite());
    }
}

#[test]
fn test_zero_iterations_rejected() {
    let wgs84 = Ellipsoid::wgs84();
    let point = CartesianPoint::new(7_000_000.0, 0.0, 0.0);

    let result = cartesian_to_geodetic(&NumericBackend, &point, &wgs84, 0);
    assert!(matches!(result, Err(ThermoError::InvalidInput(_))));
    assert!(CoordinateTransform::wgs84().with_iterations(0).is_err());
}

#[test]
fn test_array_backend_matches_scalar() {
    let wgs84 = Ellipsoid::wgs84();
    let points = sample_points(32, 3);

    let geo = GeodeticPoint::new(
        points.iter().map(|p| p.h).collect::<Array1<f64>>(),
        points.iter().map(|p| p.phi).collect::<Array1<f64>>(),
        points.iter().map(|p| p.lambda).collect::<Array1<f64>>(),
    );
    let cartesian = geodetic_to_cartesian(&ArrayBackend, &geo, &wgs84).unwrap();
    let batch = cartesian_to_geodetic(&ArrayBackend, &cartesian, &wgs84, 4).unwrap();

    for (i, truth) in points.iter().enumerate() {
        let single = geodetic_to_cartesian(&NumericBackend, truth, &wgs84).unwrap();
        assert_eq!(cartesian.x[i], single.x);
        assert_eq!(cartesian.z[i], single.z);

        let scalar = cartesian_to_geodetic(&NumericBackend, &single, &wgs84, 4).unwrap();
        assert_eq!(batch.h[i], scalar.h);
        assert_eq!(batch.phi[i], scalar.phi);
        assert_eq!(batch.lambda[i], scalar.lambda);
    }
}

#[test]
fn test_array_backend_shape_mismatch() {
    let point = CartesianPoint::new(
        Array1::from_elem(3, 7_000_000.0),
        Array1::zeros(3),
        Array1::zeros(2),
    );
    let result = cartesian_to_geodetic(&ArrayBackend, &point, &Ellipsoid::wgs84(), 4);
    assert!(matches!(result, Err(ThermoError::DimensionMismatch(_))));
}

#[test]
fn test_sphere_has_exact_altitude() {
    let sphere = Ellipsoid::sphere(6_371_000.0).unwrap();
    let transform = CoordinateTransform::new(sphere);
    let geo = transform
        .to_geodetic(&CartesianPoint::new(3_000_000.0, 4_000_000.0, 5_000_000.0))
        .unwrap();

    let radius = (3e6f64.powi(2) + 4e6f64.powi(2) + 5e6f64.powi(2)).sqrt();
    assert_relative_eq!(geo.h, radius - 6_371_000.0, max_relative = 1e-12);
}
