//! Histogram state estimation.
//!
//! A discrete Bayesian estimator that uses a [`BeliefGrid`] to represent the belief over every cell of a
//! toroidal world. Observation multiplies the belief by the likelihood of the observed label at each cell.
//! Prediction shifts belief mass by the commanded motion and diffuses it with a 3x3 blurring kernel.
//! Both operations renormalise so the belief sums to one.
//!
//! The operators are also available as free functions which always return a fresh grid.
//!
//! [`BeliefGrid`]: ../../grid/type.BeliefGrid.html

use na::{RealField, Scalar};
use nalgebra as na;
use tracing::trace;

use crate::error::{Error, Result};
use crate::grid::{BeliefGrid, ColorGrid};
use crate::models::{Estimator, GridObserver, GridPredictor, Localization, Motion, SensorModel};

/// Second best beliefs at or below this are treated as no competition at all.
const SECOND_BEST_FLOOR: f64 = 0.00001;
/// The best belief must exceed the second best by this ratio to be a strong opinion.
const CONFIDENCE_RATIO: f64 = 2.0;

/// Rescales a grid of non-negative weights so they sum to one.
///
/// Every weight must be non-negative and the total positive and finite, an all-zero grid has no normalised form.
/// IEC 559 NaN weights are never non-negative.
pub fn normalize<N: RealField + Copy>(grid: &BeliefGrid<N>) -> Result<BeliefGrid<N>> {
    if grid.cells().any(|(_, &w)| !(w >= N::zero())) {
        return Err(Error::DegenerateNormalization);
    }
    let total = grid.total();
    if !(total > N::zero() && total.is_finite()) {
        return Err(Error::DegenerateNormalization);
    }
    let mut normalized = grid.clone();
    normalized.scale(N::one() / total);
    Ok(normalized)
}

/// Checks a blurring lies in `[0, 1]`.
pub fn check_blurring<N: RealField + Copy>(blurring: N) -> Result<N> {
    if blurring >= N::zero() && blurring <= N::one() {
        Ok(blurring)
    } else {
        Err(Error::InvalidBlurParameter(
            na::try_convert::<N, f64>(blurring).unwrap_or(f64::NAN),
        ))
    }
}

/// The 3x3 diffusion window for a blurring in `[0, 1]`, indexed `[dy + 1][dx + 1]`.
///
/// Kernel weights sum to one: `(1 - b) + 4 * b/6 + 4 * b/12`.
pub fn blur_kernel<N: RealField + Copy>(blurring: N) -> Result<[[N; 3]; 3]> {
    let blurring = check_blurring(blurring)?;
    let center = N::one() - blurring;
    let corner = blurring / na::convert::<f64, N>(12.0);
    let adjacent = blurring / na::convert::<f64, N>(6.0);

    Ok([
        [corner, adjacent, corner],
        [adjacent, center, adjacent],
        [corner, adjacent, corner],
    ])
}

/// Spreads belief over the 8 neighbours of each cell, wrapping at the edges.
///
/// A blurring of 0 leaves the belief unchanged apart from normalisation.
pub fn blur<N: RealField + Copy>(grid: &BeliefGrid<N>, blurring: N) -> Result<BeliefGrid<N>> {
    let window = blur_kernel(blurring)?;
    let (height, width) = grid.shape();
    trace!(height, width, "blur");

    let mut blurred = BeliefGrid::zeros(height, width)?;
    for ((i, j), &mass) in grid.cells() {
        for (ky, row) in window.iter().enumerate() {
            for (kx, &mult) in row.iter().enumerate() {
                let dest = grid.wrap(i as isize + ky as isize - 1, j as isize + kx as isize - 1);
                blurred.add_at(dest, mult * mass);
            }
        }
    }
    normalize(&blurred)
}

/// Moves the mass at `(i, j)` to `(i + dy, j + dx)`, modulo the grid dimensions.
pub fn shift<N: RealField + Copy>(grid: &BeliefGrid<N>, motion: Motion) -> BeliefGrid<N> {
    grid.rolled(motion.dy, motion.dx)
}

/// Motion update: [`shift`] by the motion then [`blur`].
pub fn predict<N: RealField + Copy>(
    grid: &BeliefGrid<N>,
    motion: Motion,
    blurring: N,
) -> Result<BeliefGrid<N>> {
    blur(&shift(grid, motion), blurring)
}

/// Sensor update: weight every cell by `p_hit` where the world label equals `observed`, `p_miss` elsewhere,
/// then normalise.
pub fn sense<N: RealField + Copy, C: Scalar>(
    observed: &C,
    world: &ColorGrid<C>,
    belief: &BeliefGrid<N>,
    sensor: &SensorModel<N>,
) -> Result<BeliefGrid<N>> {
    belief.check_same_shape(world)?;
    sensor.validate()?;
    trace!(shape = ?belief.shape(), "sense");

    let weighted = belief
        .as_matrix()
        .zip_map(world.as_matrix(), |b, label| b * sensor.weight(&label == observed));
    normalize(&BeliefGrid::from_matrix(weighted))
}

/// Decides whether the belief holds a strong opinion and whether that opinion is right.
///
/// The belief is confident when the second highest value is negligible or the highest is more than twice it.
/// Ties for the highest value go to the first cell in row-major order.
pub fn judge<N: RealField + Copy>(belief: &BeliefGrid<N>, true_pos: (usize, usize)) -> Localization {
    let (best, best_belief, second_best) = modes(belief);

    let confident = second_best <= na::convert::<f64, N>(SECOND_BEST_FLOOR)
        || best_belief / second_best > na::convert::<f64, N>(CONFIDENCE_RATIO);
    Localization {
        localized: if confident { Some(best == true_pos) } else { None },
        best,
    }
}

/// Position of the highest belief, the highest belief and the second highest belief value.
fn modes<N: RealField + Copy>(belief: &BeliefGrid<N>) -> ((usize, usize), N, N) {
    let mut best_belief = N::zero();
    let mut best = (0, 0);
    let mut second_best = N::zero();
    for (pos, &b) in belief.cells() {
        if b > best_belief {
            second_best = best_belief;
            best_belief = b;
            best = pos;
        } else if b > second_best {
            second_best = b;
        }
    }
    (best, best_belief, second_best)
}

/// Histogram State.
///
/// The belief over a grid world, updated in place by prediction and observation.
#[derive(PartialEq, Clone, Debug)]
pub struct HistogramState<N: RealField + Copy> {
    /// Normalised belief
    pub belief: BeliefGrid<N>,
}

impl<N: RealField + Copy> HistogramState<N> {
    /// A state with no knowledge: every cell equally likely.
    pub fn new_uniform(height: usize, width: usize) -> Result<HistogramState<N>> {
        Ok(HistogramState {
            belief: BeliefGrid::uniform(height, width)?,
        })
    }

    /// A state from arbitrary non-negative weights, normalised.
    pub fn new(weights: &BeliefGrid<N>) -> Result<HistogramState<N>> {
        Ok(HistogramState {
            belief: normalize(weights)?,
        })
    }

    /// Judge the belief against the true position.
    pub fn localization(&self, true_pos: (usize, usize)) -> Localization {
        judge(&self.belief, true_pos)
    }
}

impl<N: RealField + Copy> Estimator<N> for HistogramState<N> {
    fn state(&self) -> Result<(usize, usize)> {
        let (best, _, _) = modes(&self.belief);
        Ok(best)
    }
}

impl<N: RealField + Copy> GridPredictor<N> for HistogramState<N> {
    fn predict(&mut self, motion: Motion, blurring: N) -> Result<()> {
        self.belief = predict(&self.belief, motion, blurring)?;
        Ok(())
    }
}

impl<N: RealField + Copy, C: Scalar> GridObserver<N, C> for HistogramState<N> {
    fn observe(&mut self, observed: &C, world: &ColorGrid<C>, sensor: &SensorModel<N>) -> Result<()> {
        self.belief = sense(observed, world, &self.belief, sensor)?;
        Ok(())
    }
}
