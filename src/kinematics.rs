//! Constant velocity vehicle motion and motion from data.
//!
//! A [`Car`] moves across a toroidal world with a constant velocity, turning in quarter turns.
//! [`derivative`] recovers speeds from sampled positions and timestamps.

use na::{DMatrix, RealField};
use nalgebra as na;
use tracing::trace;

use crate::error::{Error, Result};
use crate::matrix;

/// Grid position or velocity as `(y, x)`.
pub type Cell = (isize, isize);

/// A car moving with constant velocity in a circular world.
///
/// The state is the position `(y, x)` and velocity `(vy, vx)`. Every position the car has occupied is kept in
/// its path.
#[derive(PartialEq, Clone, Debug)]
pub struct Car {
    position: Cell,
    velocity: Cell,
    world: (usize, usize),
    path: Vec<Cell>,
}

impl Car {
    /// Creates a Car in a world of `(height, width)` cells.
    pub fn new(position: Cell, velocity: Cell, world: (usize, usize)) -> Result<Car> {
        if world.0 == 0 || world.1 == 0 {
            return Err(Error::EmptyGrid);
        }
        Ok(Car {
            position,
            velocity,
            world,
            path: vec![position],
        })
    }

    /// Position and velocity.
    pub fn state(&self) -> (Cell, Cell) {
        (self.position, self.velocity)
    }

    pub fn position(&self) -> Cell {
        self.position
    }

    pub fn velocity(&self) -> Cell {
        self.velocity
    }

    pub fn path(&self) -> &[Cell] {
        &self.path
    }

    /// Moves for `dt` time steps along the velocity, wrapping at the world edges.
    pub fn move_by(&mut self, dt: isize) {
        let (height, width) = self.world;
        self.position = (
            (self.position.0 + self.velocity.0 * dt).rem_euclid(height as isize),
            (self.position.1 + self.velocity.1 * dt).rem_euclid(width as isize),
        );
        trace!(position = ?self.position, "car moved");
        self.path.push(self.position);
    }

    /// Rotates the velocity a quarter turn to the left: `(vy, vx)` becomes `(-vx, vy)`.
    ///
    /// Moving right (0, 1) turns into moving up (-1, 0).
    pub fn turn_left(&mut self) {
        self.velocity = (-self.velocity.1, self.velocity.0);
    }

    /// The state vector `[y, x, vy, vx]` as a column.
    pub fn state_vector<N: RealField + Copy>(&self) -> DMatrix<N> {
        let (y, x) = self.position;
        let (vy, vx) = self.velocity;
        DMatrix::from_column_slice(
            4,
            1,
            &[
                na::convert::<f64, N>(y as f64),
                na::convert::<f64, N>(x as f64),
                na::convert::<f64, N>(vy as f64),
                na::convert::<f64, N>(vx as f64),
            ],
        )
    }

    /// Constant velocity state prediction `F * [y, x, vy, vx]'` after `dt`.
    ///
    /// The linear form does not wrap around the world.
    pub fn predict_state<N: RealField + Copy>(&self, dt: N) -> Result<DMatrix<N>> {
        matrix::multiply(&transition(dt), &self.state_vector())
    }
}

/// Constant velocity state transition for the state `[y, x, vy, vx]`.
pub fn transition<N: RealField + Copy>(dt: N) -> DMatrix<N> {
    let mut f = DMatrix::identity(4, 4);
    f[(0, 2)] = dt;
    f[(1, 3)] = dt;
    f
}

/// Speeds from positions and their timestamps.
///
/// Each speed is the slope between consecutive samples, so there is one speed fewer than samples.
/// No samples give no speeds.
pub fn derivative<N: RealField + Copy>(positions: &[N], times: &[N]) -> Result<Vec<N>> {
    if positions.len() != times.len() {
        return Err(Error::LengthMismatch {
            positions: positions.len(),
            times: times.len(),
        });
    }
    Ok(positions
        .windows(2)
        .zip(times.windows(2))
        .map(|(p, t)| (p[1] - p[0]) / (t[1] - t[0]))
        .collect())
}

/// The `n`th entry of every row, `None` if any row is too short.
pub fn column<T: Clone, R: AsRef<[T]>>(table: &[R], n: usize) -> Option<Vec<T>> {
    table.iter().map(|row| row.as_ref().get(n).cloned()).collect()
}
