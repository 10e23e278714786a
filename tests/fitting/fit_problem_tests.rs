//! Integration tests for [`FitProblem`] through the generic `Problem` trait.

use approx::assert_relative_eq;
use ndarray::{array, Array1};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use thermonets_rs::density::evaluate;
use thermonets_rs::utils::{CentralDifference, ForwardDifference};
use thermonets_rs::{FitDataset, FitProblem, Problem, TermBounds, ThermoError};

/// Two-term profile with its amplitudes and decay rates inside the default
/// bounds.
fn known_params() -> Array1<f64> {
    array![2e-2, 1e-4, 0.06, 0.012, 95.0, 40.0]
}

fn synthetic_dataset() -> FitDataset {
    let x = Array1::linspace(120.0, 800.0, 35);
    let y = evaluate(&x, &known_params()).unwrap();
    FitDataset::new(x, y, 2).unwrap()
}

/// Best of `samples` uniform draws inside the bounds.
fn random_search<P: Problem>(problem: &P, samples: usize, seed: u64) -> (Array1<f64>, f64) {
    let bounds = problem.bounds();
    let mut rng = ChaCha8Rng::seed_from_u64(seed);

    let mut best = (bounds.lower().clone(), f64::INFINITY);
    for _ in 0..samples {
        let candidate = bounds.random_point(&mut rng);
        let fitness = problem.fitness(&candidate).unwrap();
        // NaN never compares less, so degenerate candidates are skipped
        if fitness < best.1 {
            best = (candidate, fitness);
        }
    }
    best
}

#[test]
fn test_known_parameters_fit_exactly() {
    let problem = FitProblem::new(synthetic_dataset());
    assert_relative_eq!(problem.fitness(&known_params()).unwrap(), 0.0, epsilon = 1e-12);
}

#[test]
fn test_bounds_shape() {
    for n in 1..=4 {
        let x = Array1::linspace(100.0, 500.0, 10);
        let y = Array1::from_elem(10, 1e-9);
        let problem = FitProblem::new(FitDataset::new(x, y, n).unwrap());
        let bounds = problem.bounds();

        assert_eq!(problem.dimension(), 3 * n);
        assert_eq!(bounds.dimension(), 3 * n);
        assert!(bounds.lower().iter().all(|&l| l == 0.0));

        let expected: Vec<f64> = std::iter::repeat(0.1)
            .take(2 * n)
            .chain(std::iter::repeat(100.0).take(n))
            .collect();
        assert_eq!(bounds.upper().to_vec(), expected);
    }
}

#[test]
fn test_zero_parameters_are_infinitely_bad() {
    let problem = FitProblem::new(synthetic_dataset());
    let fitness = problem.fitness(&Array1::zeros(6)).unwrap();
    assert!(fitness.is_infinite() && fitness > 0.0);
}

#[test]
fn test_random_search_through_problem_trait() {
    let problem = FitProblem::new(synthetic_dataset());
    let bounds = problem.bounds();

    let (best, fitness) = random_search(&problem, 500, 2024);
    assert!(bounds.contains(&best));
    assert!(fitness.is_finite());
    assert!(fitness > 0.0);

    // More samples can only match or improve the best draw
    let (_, longer) = random_search(&problem, 2000, 2024);
    assert!(longer <= fitness);
}

#[test]
fn test_gradient_contract() {
    let dataset = synthetic_dataset();
    // Inflated amplitudes keep every log residual on the same side
    let mut start = known_params();
    start[0] *= 1.1;
    start[1] *= 1.1;

    let central = FitProblem::new(dataset.clone());
    let forward = FitProblem::with_strategy(dataset.clone(), ForwardDifference::default());
    let parallel =
        FitProblem::with_strategy(dataset, CentralDifference::default().with_parallel(true));

    let g_central = central.gradient(&start).unwrap();
    let g_forward = forward.gradient(&start).unwrap();
    let g_parallel = parallel.gradient(&start).unwrap();

    assert!(central.has_gradient());
    assert_eq!(g_central.len(), central.dimension());
    assert_eq!(g_central, g_parallel);
    for (c, f) in g_central.iter().zip(g_forward.iter()) {
        assert_relative_eq!(*c, *f, epsilon = 1e-3, max_relative = 1e-3);
    }
}

#[test]
fn test_wrong_dimension_rejected() {
    let problem = FitProblem::new(synthetic_dataset());
    let short = array![1e-2, 0.05, 90.0];

    assert!(matches!(
        problem.fitness(&short),
        Err(ThermoError::DimensionMismatch(_))
    ));
    assert!(matches!(
        problem.gradient(&short),
        Err(ThermoError::DimensionMismatch(_))
    ));
}

#[test]
fn test_custom_term_bounds() {
    let term_bounds = TermBounds {
        alpha_max: 1.0,
        beta_max: 0.5,
        gamma_max: 1000.0,
    };
    let problem = FitProblem::new(synthetic_dataset())
        .with_term_bounds(term_bounds)
        .unwrap();

    assert_eq!(
        problem.bounds().upper(),
        &array![1.0, 1.0, 0.5, 0.5, 1000.0, 1000.0]
    );
}

#[test]
fn test_invalid_datasets() {
    let x = Array1::linspace(100.0, 200.0, 5);
    assert!(matches!(
        FitDataset::new(x.clone(), Array1::ones(4), 1),
        Err(ThermoError::DimensionMismatch(_))
    ));
    assert!(matches!(
        FitDataset::new(x, Array1::ones(5), 0),
        Err(ThermoError::InvalidInput(_))
    ));
    assert!(matches!(
        FitDataset::new(Array1::zeros(0), Array1::zeros(0), 1),
        Err(ThermoError::InvalidInput(_))
    ));
}
