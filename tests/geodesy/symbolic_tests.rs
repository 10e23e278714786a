//! The symbolic backend must reproduce the numeric backend.

use approx::assert_relative_eq;
use ndarray::Array2;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use thermonets_rs::geodesy::{
    cartesian_to_geodetic, geodetic_to_cartesian, CartesianPoint, CoordinateTransform,
    Ellipsoid, GeodeticPoint, NumericBackend, SymbolicBackend,
};
use thermonets_rs::symbolic::{CompiledFunction, Expr, ExpressionError, SimpleContext};

fn random_cartesian(rng: &mut ChaCha8Rng) -> CartesianPoint {
    let radius = rng.gen_range(6_500_000.0..8_400_000.0);
    let lat: f64 = rng.gen_range(-1.5..1.5);
    let lon: f64 = rng.gen_range(-3.1..3.1);
    CartesianPoint::new(
        radius * lat.cos() * lon.cos(),
        radius * lat.cos() * lon.sin(),
        radius * lat.sin(),
    )
}

fn symbolic_geodetic() -> GeodeticPoint<Expr> {
    cartesian_to_geodetic(
        &SymbolicBackend,
        &CartesianPoint::symbolic("x", "y", "z"),
        &Ellipsoid::wgs84(),
        4,
    )
    .unwrap()
}

#[test]
fn test_graph_evaluation_matches_numeric() {
    let wgs84 = Ellipsoid::wgs84();
    let graph = symbolic_geodetic();
    let mut rng = ChaCha8Rng::seed_from_u64(11);

    for _ in 0..50 {
        let point = random_cartesian(&mut rng);
        let numeric = cartesian_to_geodetic(&NumericBackend, &point, &wgs84, 4).unwrap();

        let ctx = SimpleContext::new()
            .with("x", point.x)
            .with("y", point.y)
            .with("z", point.z);
        assert_relative_eq!(graph.h.evaluate(&ctx).unwrap(), numeric.h, max_relative = 1e-12);
        assert_relative_eq!(graph.phi.evaluate(&ctx).unwrap(), numeric.phi, max_relative = 1e-12);
        assert_relative_eq!(
            graph.lambda.evaluate(&ctx).unwrap(),
            numeric.lambda,
            max_relative = 1e-12
        );
    }
}

#[test]
fn test_compiled_batch_matches_numeric() {
    let wgs84 = Ellipsoid::wgs84();
    let graph = symbolic_geodetic();
    let function =
        CompiledFunction::new(&[graph.h, graph.phi, graph.lambda], &["x", "y", "z"]).unwrap();

    let mut rng = ChaCha8Rng::seed_from_u64(5);
    let points: Vec<CartesianPoint> = (0..64).map(|_| random_cartesian(&mut rng)).collect();
    let inputs = Array2::from_shape_fn((points.len(), 3), |(i, j)| match j {
        0 => points[i].x,
        1 => points[i].y,
        _ => points[i].z,
    });

    let outputs = function.eval_batch(&inputs).unwrap();
    assert_eq!(outputs.dim(), (points.len(), 3));

    for (i, point) in points.iter().enumerate() {
        let numeric = cartesian_to_geodetic(&NumericBackend, point, &wgs84, 4).unwrap();
        assert_relative_eq!(outputs[[i, 0]], numeric.h, max_relative = 1e-12);
        assert_relative_eq!(outputs[[i, 1]], numeric.phi, max_relative = 1e-12);
        assert_relative_eq!(outputs[[i, 2]], numeric.lambda, max_relative = 1e-12);
    }
}

#[test]
fn test_inverse_graph_matches_numeric() {
    let wgs84 = Ellipsoid::wgs84();
    let graph = geodetic_to_cartesian(
        &SymbolicBackend,
        &GeodeticPoint::symbolic("h", "phi", "lambda"),
        &wgs84,
    )
    .unwrap();
    let function =
        CompiledFunction::new(&[graph.x, graph.y, graph.z], &["h", "phi", "lambda"]).unwrap();

    let geo = GeodeticPoint::new(400_000.0, 0.7, -2.1);
    let numeric = geodetic_to_cartesian(&NumericBackend, &geo, &wgs84).unwrap();
    let xyz = function.eval(&[geo.h, geo.phi, geo.lambda]).unwrap();

    assert_relative_eq!(xyz[0], numeric.x, max_relative = 1e-12);
    assert_relative_eq!(xyz[1], numeric.y, max_relative = 1e-12);
    assert_relative_eq!(xyz[2], numeric.z, max_relative = 1e-12);
}

#[test]
fn test_configured_symbolic_transform() {
    let transform = CoordinateTransform::with_backend(SymbolicBackend, Ellipsoid::wgs84())
        .with_iterations(2)
        .unwrap();
    let geo = transform
        .to_geodetic(&CartesianPoint::symbolic("x", "y", "z"))
        .unwrap();

    assert_eq!(geo.h.variables(), vec!["x", "y", "z"]);

    // Fewer refinement steps give a smaller graph
    let deeper = symbolic_geodetic();
    assert!(geo.h.node_count() < deeper.h.node_count());
}

#[test]
fn test_missing_variable_is_reported() {
    let graph = symbolic_geodetic();
    let ctx = SimpleContext::new().with("x", 7e6).with("y", 0.0);

    match graph.phi.evaluate(&ctx) {
        Err(ExpressionError::UndefinedVariable { name }) => assert_eq!(name, "z"),
        other => panic!("expected an undefined variable error, got {:?}", other),
    }
}

#[test]
fn test_polar_axis_is_degenerate_symbolically() {
    let graph = symbolic_geodetic();
    let function = CompiledFunction::new(&[graph.h, graph.phi], &["x", "y", "z"]).unwrap();
    let out = function.eval(&[0.0, 0.0, 6_500_000.0]).unwrap();
    assert!(out.iter().all(|v| !v.is_finite()));
}

#[test]
fn test_many_iterations_build_evaluate_and_drop() {
    let wgs84 = Ellipsoid::wgs84();
    let iterations = 5_000;
    let point = CartesianPoint::new(4_000_000.0, 3_000_000.0, 4_500_000.0);
    let numeric = cartesian_to_geodetic(&NumericBackend, &point, &wgs84, iterations).unwrap();

    let graph = cartesian_to_geodetic(
        &SymbolicBackend,
        &CartesianPoint::symbolic("x", "y", "z"),
        &wgs84,
        iterations,
    )
    .unwrap();

    let ctx = SimpleContext::new()
        .with("x", point.x)
        .with("y", point.y)
        .with("z", point.z);
    assert_relative_eq!(graph.h.evaluate(&ctx).unwrap(), numeric.h, max_relative = 1e-12);

    let function = CompiledFunction::new(&[graph.h, graph.phi], &["x", "y", "z"]).unwrap();
    let out = function.eval(&[point.x, point.y, point.z]).unwrap();
    assert_relative_eq!(out[0], numeric.h, max_relative = 1e-12);
    assert_relative_eq!(out[1], numeric.phi, max_relative = 1e-12);

    drop(function);
    drop(graph.lambda);
}
