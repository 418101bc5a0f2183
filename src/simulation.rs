//! Simulated histogram localization.
//!
//! A robot wanders a toroidal world of colored cells. Each step it senses the color beneath it, with some chance
//! of misreading it, and then makes a small random move. A [`HistogramState`] tracks the robot's belief about
//! where it is.
//!
//! All randomness comes from the random number generator given to the simulation, so runs are repeatable
//! with a seeded generator.
//!
//! [`HistogramState`]: ../estimators/histogram/struct.HistogramState.html

use na::Scalar;
use nalgebra as na;
use rand_core::RngCore;
use rand_distr::{Bernoulli, Distribution, Uniform};
use serde::Deserialize;
use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::estimators::histogram::{check_blurring, HistogramState};
use crate::grid::{BeliefGrid, ColorGrid};
use crate::models::{GridObserver, GridPredictor, Localization, Motion, SensorModel};

/// Simulation parameters.
///
/// ```toml
/// blurring = 0.12
/// p_hit = 5.0
/// start = [2, 3]
/// world = ["RGGR", "GGRG", "RRGG"]
/// ```
#[derive(Deserialize, PartialEq, Clone, Debug)]
#[serde(deny_unknown_fields)]
pub struct SimulationConfig {
    /// Fraction of belief spilling into neighbouring cells on each move, in [0, 1]
    pub blurring: f64,
    /// Sensor weight of cells matching the observed color
    pub p_hit: f64,
    /// Sensor weight of cells not matching the observed color
    #[serde(default = "default_p_miss")]
    pub p_miss: f64,
    /// Initial true pose `(row, col)`, the centre of the world if absent
    #[serde(default)]
    pub start: Option<(usize, usize)>,
    /// The world, one string per row and one char per cell
    #[serde(default)]
    pub world: Option<Vec<String>>,
}

fn default_p_miss() -> f64 {
    1.0
}

impl SimulationConfig {
    pub fn new(blurring: f64, p_hit: f64) -> Self {
        SimulationConfig {
            blurring,
            p_hit,
            p_miss: default_p_miss(),
            start: None,
            world: None,
        }
    }

    pub fn from_toml_str(source: &str) -> Result<Self> {
        Ok(toml::from_str(source)?)
    }

    /// The configured world. A configuration without one describes an empty world.
    pub fn world(&self) -> Result<ColorGrid<char>> {
        match &self.world {
            Some(rows) => ColorGrid::from_strings(rows),
            None => Err(Error::EmptyGrid),
        }
    }
}

/// A robot localizing itself in a colored world.
pub struct Simulation<C: Scalar> {
    world: ColorGrid<C>,
    colors: Vec<C>,
    state: HistogramState<f64>,
    blurring: f64,
    sensor: SensorModel<f64>,
    misread: Bernoulli,
    true_pose: (usize, usize),
    prev_pose: (usize, usize),
    rng: Box<dyn RngCore>,
}

impl Simulation<char> {
    /// A simulation of the world described by the configuration.
    pub fn from_config(config: &SimulationConfig, rng: Box<dyn RngCore>) -> Result<Self> {
        Simulation::new(config.world()?, config, rng)
    }
}

impl<C: Scalar> Simulation<C> {
    /// Starts with a uniform belief over `world`.
    pub fn new(world: ColorGrid<C>, config: &SimulationConfig, rng: Box<dyn RngCore>) -> Result<Self> {
        let blurring = check_blurring(config.blurring)?;
        let sensor = SensorModel::new(config.p_hit, config.p_miss)?;
        let misread = Bernoulli::new(sensor.p_miss / (sensor.p_hit + sensor.p_miss))
            .map_err(|_| Error::InvalidSensorModel)?;

        let (height, width) = world.shape();
        let true_pose = match config.start {
            Some((row, col)) => (row % height, col % width),
            None => (height / 2, width / 2),
        };

        let mut colors: Vec<C> = Vec::new();
        for (_, color) in world.cells() {
            if !colors.contains(color) {
                colors.push(color.clone());
            }
        }

        Ok(Simulation {
            state: HistogramState::new_uniform(height, width)?,
            world,
            colors,
            blurring,
            sensor,
            misread,
            true_pose,
            prev_pose: true_pose,
            rng,
        })
    }

    pub fn world(&self) -> &ColorGrid<C> {
        &self.world
    }

    /// Distinct colors of the world in row-major order of first appearance.
    pub fn colors(&self) -> &[C] {
        &self.colors
    }

    pub fn beliefs(&self) -> &BeliefGrid<f64> {
        &self.state.belief
    }

    pub fn true_pose(&self) -> (usize, usize) {
        self.true_pose
    }

    pub fn prev_pose(&self) -> (usize, usize) {
        self.prev_pose
    }

    /// Chance the sensor reports a color other than the true one.
    pub fn incorrect_sense_probability(&self) -> f64 {
        self.sensor.p_miss / (self.sensor.p_hit + self.sensor.p_miss)
    }

    /// The color the sensor reports at the true pose.
    ///
    /// A misread reports one of the other colors of the world, chosen uniformly.
    /// In a single colored world every reading is correct.
    pub fn observed_color(&mut self) -> C {
        let true_color = self.world.wrapped(self.true_pose.0 as isize, self.true_pose.1 as isize).clone();
        if self.misread.sample(&mut *self.rng) {
            let others: Vec<&C> = self.colors.iter().filter(|c| **c != true_color).collect();
            if !others.is_empty() {
                let pick = Uniform::from(0..others.len()).sample(&mut *self.rng);
                return others[pick].clone();
            }
        }
        true_color
    }

    /// Observes a color and updates the belief with it. Returns the observed color.
    pub fn sense(&mut self) -> Result<C> {
        let color = self.observed_color();
        self.state.observe(&color, &self.world, &self.sensor)?;
        debug!(pose = ?self.true_pose, observed = ?color, "sensed");
        Ok(color)
    }

    /// Moves the robot by `motion` and predicts the belief forward.
    pub fn move_by(&mut self, motion: Motion) -> Result<()> {
        let (height, width) = self.world.shape();
        let (dy, dx) = self.world.wrap(motion.dy, motion.dx);
        self.prev_pose = self.true_pose;
        self.true_pose = (
            (self.true_pose.0 + dy) % height,
            (self.true_pose.1 + dx) % width,
        );
        self.state.predict(motion, self.blurring)?;
        debug!(?motion, pose = ?self.true_pose, "moved");
        Ok(())
    }

    /// A random step of -1, 0 or 1 cells on each axis.
    pub fn random_move(&mut self) -> Motion {
        let step = Uniform::new_inclusive(-1isize, 1);
        let dy = step.sample(&mut *self.rng);
        let dx = step.sample(&mut *self.rng);
        Motion::new(dy, dx)
    }

    /// Runs `steps` rounds of sense then random move.
    pub fn run(&mut self, steps: usize) -> Result<()> {
        for _ in 0..steps {
            self.sense()?;
            let motion = self.random_move();
            self.move_by(motion)?;
        }
        Ok(())
    }

    /// Judges the current belief against the true pose.
    pub fn localization(&self) -> Localization {
        let localization = self.state.localization(self.true_pose);
        match localization.localized {
            Some(true) => info!(pose = ?self.true_pose, "localized"),
            Some(false) => info!(pose = ?self.true_pose, best = ?localization.best, "confidently wrong"),
            None => debug!(best = ?localization.best, "not localized"),
        }
        localization
    }
}
