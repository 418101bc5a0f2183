//! Histogram localization models.
//!
//! The belief representation is a [`BeliefGrid`]: a discrete probability distribution over the cells of a
//! toroidal world. Sensor and motion models are represented as structs.
//! Common discrete Bayesian estimation operations are defined as traits.

use na::RealField;
use nalgebra as na;

use crate::error::{Error, Result};
use crate::grid::ColorGrid;

/// Sensor model.
///
/// Relative likelihood weights of an observation: a cell whose label matches the observation is weighted
/// `p_hit`, a mismatching cell `p_miss`. Only the ratio of the two matters.
#[derive(PartialEq, Clone, Copy, Debug)]
pub struct SensorModel<N: RealField + Copy> {
    /// Weight of cells matching the observation
    pub p_hit: N,
    /// Weight of cells not matching the observation
    pub p_miss: N,
}

impl<N: RealField + Copy> SensorModel<N> {
    /// Creates a SensorModel, both weights must be strictly positive.
    pub fn new(p_hit: N, p_miss: N) -> Result<Self> {
        let model = SensorModel { p_hit, p_miss };
        model.validate()?;
        Ok(model)
    }

    /// Checks both weights are positive and finite.
    /// IEC 559 NaN values are never positive.
    pub fn validate(&self) -> Result<()> {
        let usable = |p: N| p > N::zero() && p.is_finite();
        if usable(self.p_hit) && usable(self.p_miss) {
            Ok(())
        } else {
            Err(Error::InvalidSensorModel)
        }
    }

    /// Likelihood weight of a cell.
    pub fn weight(&self, hit: bool) -> N {
        if hit {
            self.p_hit
        } else {
            self.p_miss
        }
    }
}

/// Motion.
///
/// A deterministic shift of `dy` rows and `dx` columns. Any magnitude is allowed, the effect is taken
/// modulo the grid dimensions.
#[derive(PartialEq, Eq, Clone, Copy, Debug, Default)]
pub struct Motion {
    pub dy: isize,
    pub dx: isize,
}

impl Motion {
    pub const STILL: Motion = Motion { dy: 0, dx: 0 };

    pub fn new(dy: isize, dx: isize) -> Self {
        Motion { dy, dx }
    }
}

/// Outcome of judging a belief grid against the true position.
#[derive(PartialEq, Eq, Clone, Copy, Debug)]
pub struct Localization {
    /// `None` when no single belief dominates, otherwise whether the dominant cell is the true position.
    pub localized: Option<bool>,
    /// The cell holding the highest belief, first in row-major order on ties.
    pub best: (usize, usize),
}

impl Localization {
    /// True when the belief has a strong opinion, right or wrong.
    pub fn is_confident(&self) -> bool {
        self.localized.is_some()
    }
}

/// A grid state estimator.
pub trait Estimator<N: RealField + Copy> {
    /// The estimator's most likely cell.
    fn state(&self) -> Result<(usize, usize)>;
}

/// A grid predictor.
///
/// Moves belief mass by a deterministic motion and then diffuses it with a blurring kernel.
pub trait GridPredictor<N: RealField + Copy> {
    fn predict(&mut self, motion: Motion, blurring: N) -> Result<()>;
}

/// A grid observer.
///
/// Reweights belief by the likelihood of an observed label given the label of each cell of the world.
pub trait GridObserver<N: RealField + Copy, C: na::Scalar> {
    fn observe(&mut self, observed: &C, world: &ColorGrid<C>, sensor: &SensorModel<N>) -> Result<()>;
}
