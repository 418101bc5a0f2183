//! Test the histogram operators and the histogram estimator.
//!
//! Normalisation, blurring, shifting, sensing and judging are tested on small worlds where the expected
//! beliefs can be worked out by hand.

use bayes_histogram::error::Error;
use bayes_histogram::estimators::histogram::{
    blur, blur_kernel, check_blurring, judge, normalize, predict, sense, shift, HistogramState,
};
use bayes_histogram::grid::{BeliefGrid, ColorGrid};
use bayes_histogram::models::{Estimator, GridObserver, GridPredictor, Motion, SensorModel};

fn unit_mass_at(height: usize, width: usize, pos: (usize, usize)) -> BeliefGrid<f64> {
    BeliefGrid::from_fn(height, width, |i, j| if (i, j) == pos { 1. } else { 0. }).unwrap()
}

fn lumpy() -> BeliefGrid<f64> {
    BeliefGrid::from_rows(&[
        [0.3, 0.0, 1.2, 0.5],
        [2.0, 0.1, 0.0, 0.9],
        [0.4, 0.4, 0.7, 0.0],
    ])
    .unwrap()
}

fn assert_grid_eq(expect: &BeliefGrid<f64>, actual: &BeliefGrid<f64>) {
    assert_eq!(expect.shape(), actual.shape());
    for ((i, j), &e) in expect.cells() {
        approx::assert_abs_diff_eq!(*actual.get(i, j).unwrap(), e, epsilon = 0.001);
    }
}

#[test]
fn test_normalize() {
    let normalized = normalize(&lumpy()).unwrap();
    approx::assert_abs_diff_eq!(normalized.total(), 1., epsilon = 1e-12);
    approx::assert_relative_eq!(*normalized.get(1, 0).unwrap(), 2.0 / 6.5, max_relative = 1e-12);

    let again = normalize(&normalized).unwrap();
    assert_grid_eq(&normalized, &again);
}

#[test]
fn test_normalize_degenerate() {
    let zeros = BeliefGrid::<f64>::zeros(2, 3).unwrap();
    assert!(matches!(normalize(&zeros), Err(Error::DegenerateNormalization)));

    let infinite = BeliefGrid::from_rows(&[[f64::INFINITY, 1.]]).unwrap();
    assert!(matches!(normalize(&infinite), Err(Error::DegenerateNormalization)));
}

#[test]
fn test_normalize_rejects_negative_weights() {
    let negative = BeliefGrid::from_rows(&[[-1., 2.]]).unwrap();
    assert!(matches!(normalize(&negative), Err(Error::DegenerateNormalization)));
    assert!(matches!(HistogramState::new(&negative), Err(Error::DegenerateNormalization)));

    let not_a_number = BeliefGrid::from_rows(&[[f64::NAN, 1.], [0.5, 0.5]]).unwrap();
    assert!(matches!(normalize(&not_a_number), Err(Error::DegenerateNormalization)));

    // Zero cells are fine as long as some mass remains
    let sparse = normalize(&BeliefGrid::from_rows(&[[0., 2.]]).unwrap()).unwrap();
    assert_eq!(sparse.to_rows(), vec![vec![0., 1.]]);
}

#[test]
fn test_uniform() {
    let uniform = BeliefGrid::<f64>::uniform(5, 5).unwrap();
    for (_, &b) in uniform.cells() {
        approx::assert_abs_diff_eq!(b, 1. / 25., epsilon = 1e-15);
    }
    assert!(matches!(BeliefGrid::<f64>::uniform(0, 5), Err(Error::EmptyGrid)));
}

#[test]
fn test_blur_kernel_sums_to_one() {
    for &b in &[0., 0.1, 0.5, 0.9, 1.] {
        let kernel = blur_kernel(b).unwrap();
        let sum: f64 = kernel.iter().flatten().sum();
        approx::assert_abs_diff_eq!(sum, 1., epsilon = 1e-12);
        approx::assert_abs_diff_eq!(kernel[1][1], 1. - b, epsilon = 1e-15);
        approx::assert_abs_diff_eq!(kernel[0][1], b / 6., epsilon = 1e-15);
        approx::assert_abs_diff_eq!(kernel[2][2], b / 12., epsilon = 1e-15);
    }
}

#[test]
fn test_blur_conserves_mass_and_shape() {
    let prior = normalize(&lumpy()).unwrap();
    for &b in &[0., 0.12, 0.5, 1.] {
        let blurred = blur(&prior, b).unwrap();
        assert_eq!(blurred.shape(), (3, 4));
        approx::assert_abs_diff_eq!(blurred.total(), 1., epsilon = 0.001);
    }
}

#[test]
fn test_blur_zero_is_normalize() {
    let g = lumpy();
    assert_grid_eq(&normalize(&g).unwrap(), &blur(&g, 0.).unwrap());
}

#[test]
fn test_blur_wraps_toroidally() {
    let blurred = blur(&unit_mass_at(3, 3, (0, 0)), 0.5).unwrap();

    approx::assert_abs_diff_eq!(*blurred.get(0, 0).unwrap(), 0.5, epsilon = 1e-12);
    // Corner neighbours, all but (1, 1) reached through a wrapped edge
    for &(i, j) in &[(2, 2), (2, 1), (1, 2), (1, 1)] {
        approx::assert_abs_diff_eq!(*blurred.get(i, j).unwrap(), 0.5 / 12., epsilon = 1e-12);
    }
    // Adjacent neighbours
    for &(i, j) in &[(0, 1), (0, 2), (1, 0), (2, 0)] {
        approx::assert_abs_diff_eq!(*blurred.get(i, j).unwrap(), 0.5 / 6., epsilon = 1e-12);
    }
}

#[test]
fn test_check_blurring() {
    assert_eq!(check_blurring(0.).unwrap(), 0.);
    assert_eq!(check_blurring(1f32).unwrap(), 1f32);
    assert!(matches!(check_blurring(1.0001), Err(Error::InvalidBlurParameter(b)) if b == 1.0001));
    assert!(matches!(check_blurring(-0.5f32), Err(Error::InvalidBlurParameter(b)) if b == -0.5));
}

#[test]
fn test_blur_rejects_bad_parameter() {
    let g = normalize(&lumpy()).unwrap();
    assert!(matches!(blur(&g, -0.1), Err(Error::InvalidBlurParameter(_))));
    assert!(matches!(blur(&g, 1.5), Err(Error::InvalidBlurParameter(_))));
    assert!(matches!(blur(&g, f64::NAN), Err(Error::InvalidBlurParameter(_))));
}

#[test]
fn test_shift() {
    let shifted = shift(&unit_mass_at(3, 4, (0, 0)), Motion::new(-1, 7));
    assert_eq!(*shifted.get(2, 3).unwrap(), 1.);
    approx::assert_abs_diff_eq!(shifted.total(), 1., epsilon = 1e-15);

    let g = normalize(&lumpy()).unwrap();
    assert_eq!(shift(&g, Motion::STILL), g);
    assert_grid_eq(&blur(&g, 0.2).unwrap(), &predict(&g, Motion::STILL, 0.2).unwrap());

    // Motions of any magnitude reduce modulo the grid dimensions
    let far = shift(&unit_mass_at(3, 4, (1, 1)), Motion::new(isize::MAX, isize::MIN));
    let expect = ((1 + isize::MAX.rem_euclid(3)) as usize % 3, (1 + isize::MIN.rem_euclid(4)) as usize % 4);
    assert_eq!(*far.get(expect.0, expect.1).unwrap(), 1.);
}

#[test]
fn test_predict_moves_then_blurs() {
    let predicted = predict(&unit_mass_at(4, 4, (1, 1)), Motion::new(1, 2), 0.3).unwrap();
    approx::assert_abs_diff_eq!(*predicted.get(2, 3).unwrap(), 0.7, epsilon = 1e-12);
    approx::assert_abs_diff_eq!(*predicted.get(2, 0).unwrap(), 0.05, epsilon = 1e-12);
    approx::assert_abs_diff_eq!(*predicted.get(3, 0).unwrap(), 0.025, epsilon = 1e-12);
    approx::assert_abs_diff_eq!(predicted.total(), 1., epsilon = 1e-12);
}

fn rg_world() -> ColorGrid<char> {
    ColorGrid::from_strings(&["RGGRG", "GRRGG", "RRGGR", "GGGRR", "RGRGG"]).unwrap()
}

#[test]
fn test_sense_end_to_end() {
    let world = rg_world();
    let prior = BeliefGrid::<f64>::uniform(5, 5).unwrap();
    let sensor = SensorModel::new(0.8, 0.2).unwrap();

    let posterior = sense(&'R', &world, &prior, &sensor).unwrap();
    approx::assert_abs_diff_eq!(posterior.total(), 1., epsilon = 0.001);

    let reds = world.cells().filter(|&(_, &c)| c == 'R').count() as f64;
    let greens = 25. - reds;
    let expect_red = 0.8 / (0.8 * reds + 0.2 * greens);
    for ((i, j), &c) in world.cells() {
        let b = *posterior.get(i, j).unwrap();
        if c == 'R' {
            approx::assert_relative_eq!(b, expect_red, max_relative = 1e-9);
        } else {
            assert!(b < expect_red);
        }
    }
}

#[test]
fn test_sense_reweights_relative_belief() {
    let world = rg_world();
    let prior = normalize(&BeliefGrid::from_fn(5, 5, |i, j| (1 + i + 2 * j) as f64).unwrap()).unwrap();
    let posterior = sense(&'G', &world, &prior, &SensorModel::new(3., 1.).unwrap()).unwrap();

    approx::assert_abs_diff_eq!(posterior.total(), 1., epsilon = 0.001);
    // (0, 1) is G and (0, 0) is R
    let prior_ratio = prior.get(0, 1).unwrap() / prior.get(0, 0).unwrap();
    let posterior_ratio = posterior.get(0, 1).unwrap() / posterior.get(0, 0).unwrap();
    approx::assert_relative_eq!(posterior_ratio, 3. * prior_ratio, max_relative = 1e-9);
}

#[test]
fn test_sense_errors() {
    let world = rg_world();
    let prior = BeliefGrid::<f64>::uniform(5, 4).unwrap();
    let sensor = SensorModel { p_hit: 0.8, p_miss: 0.2 };
    match sense(&'R', &world, &prior, &sensor) {
        Err(Error::DimensionMismatch { expected, found }) => {
            assert_eq!(expected, (5, 4));
            assert_eq!(found, (5, 5));
        }
        other => panic!("expected a dimension mismatch, got {:?}", other),
    }

    let prior = BeliefGrid::<f64>::uniform(5, 5).unwrap();
    let no_miss = SensorModel { p_hit: 0.8, p_miss: 0. };
    assert!(matches!(sense(&'R', &world, &prior, &no_miss), Err(Error::InvalidSensorModel)));
    assert!(matches!(SensorModel::new(-1., 1.), Err(Error::InvalidSensorModel)));
}

#[test]
fn test_judge_confident() {
    let mut g = BeliefGrid::repeat(3, 3, 0.5 / 8.).unwrap();
    *g.get_mut(1, 1).unwrap() = 0.5;

    let right = judge(&g, (1, 1));
    assert_eq!(right.localized, Some(true));
    assert_eq!(right.best, (1, 1));

    let wrong = judge(&g, (0, 2));
    assert_eq!(wrong.localized, Some(false));
    assert_eq!(wrong.best, (1, 1));
    assert!(wrong.is_confident());
}

#[test]
fn test_judge_indeterminate() {
    let uniform = BeliefGrid::<f64>::uniform(3, 3).unwrap();
    let localization = judge(&uniform, (1, 1));
    assert_eq!(localization.localized, None);
    assert_eq!(localization.best, (0, 0));

    // Best only 1.5 times the runner up
    let g = BeliefGrid::from_rows(&[[0.1, 0.3], [0.45, 0.15]]).unwrap();
    let localization = judge(&g, (1, 0));
    assert_eq!(localization.localized, None);
    assert_eq!(localization.best, (1, 0));
}

#[test]
fn test_judge_single_mode() {
    let localization = judge(&unit_mass_at(4, 3, (3, 2)), (3, 2));
    assert_eq!(localization.localized, Some(true));
    assert_eq!(localization.best, (3, 2));
}

#[test]
fn test_judge_ties_go_to_first_cell() {
    let g = BeliefGrid::from_rows(&[[0.1, 0.4], [0.4, 0.1]]).unwrap();
    let localization = judge(&g, (1, 0));
    assert_eq!(localization.localized, None);
    assert_eq!(localization.best, (0, 1));
}

#[test]
fn test_histogram_state() {
    let world = rg_world();
    let sensor = SensorModel::new(0.9, 0.1).unwrap();
    let mut state = HistogramState::<f64>::new_uniform(5, 5).unwrap();

    state.observe(&'R', &world, &sensor).unwrap();
    state.predict(Motion::new(0, 1), 0.1).unwrap();
    state.observe(&'G', &world, &sensor).unwrap();
    approx::assert_abs_diff_eq!(state.belief.total(), 1., epsilon = 0.001);

    let best = state.state().unwrap();
    assert_eq!(state.localization(best).best, best);

    assert!(matches!(
        HistogramState::new(&BeliefGrid::<f64>::zeros(2, 2).unwrap()),
        Err(Error::DegenerateNormalization)
    ));
}

#[test]
fn test_histogram_state_f32() {
    let world = ColorGrid::from_strings(&["ab", "ba"]).unwrap();
    let mut state = HistogramState::<f32>::new_uniform(2, 2).unwrap();
    state.observe(&'a', &world, &SensorModel::new(3f32, 1f32).unwrap()).unwrap();
    approx::assert_abs_diff_eq!(*state.belief.get(0, 0).unwrap(), 0.375f32, epsilon = 1e-6);
    state.predict(Motion::new(1, 0), 0f32).unwrap();
    approx::assert_abs_diff_eq!(*state.belief.get(1, 0).unwrap(), 0.375f32, epsilon = 1e-6);
}
