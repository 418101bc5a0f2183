//! Rectangular grids with toroidal topology.
//!
//! A [`Grid`] holds a fixed `height x width` array of cells in a flat nalgebra backing store.
//! Cells are addressed `(row, col)`: row is the vertical (y) axis, col the horizontal (x) axis.
//! Index arithmetic through [`Grid::wrap`] is modulo the respective dimension on both axes, so the
//! top row neighbours the bottom row and the left column neighbours the right column.
//!
//! A [`BeliefGrid`] is a grid of belief values, a [`ColorGrid`] a grid of observable labels.

use core::fmt;

use na::{DMatrix, RealField, Scalar};
use nalgebra as na;

use crate::error::{Error, Result};

/// A non-empty rectangular grid with wrap-around addressing.
#[derive(PartialEq, Clone, Debug)]
pub struct Grid<T: Scalar> {
    cells: DMatrix<T>,
}

/// Grid of (usually normalised) belief values.
pub type BeliefGrid<N> = Grid<N>;

/// Grid of environment labels, the world a robot senses.
pub type ColorGrid<C> = Grid<C>;

impl<T: Scalar> Grid<T> {
    /// Creates a grid from rows of cells. All rows must have the same width.
    pub fn from_rows<R: AsRef<[T]>>(rows: &[R]) -> Result<Self> {
        let height = rows.len();
        let width = rows.first().map_or(0, |row| row.as_ref().len());
        if height == 0 || width == 0 {
            return Err(Error::EmptyGrid);
        }
        for (row, cells) in rows.iter().enumerate() {
            let found = cells.as_ref().len();
            if found != width {
                return Err(Error::RaggedRows { row, expected: width, found });
            }
        }
        Ok(Grid {
            cells: DMatrix::from_fn(height, width, |i, j| rows[i].as_ref()[j].clone()),
        })
    }

    /// Creates a grid by evaluating `f(row, col)` for every cell.
    pub fn from_fn(height: usize, width: usize, f: impl FnMut(usize, usize) -> T) -> Result<Self> {
        if height == 0 || width == 0 {
            return Err(Error::EmptyGrid);
        }
        Ok(Grid {
            cells: DMatrix::from_fn(height, width, f),
        })
    }

    /// Creates a grid with every cell set to `value`.
    pub fn repeat(height: usize, width: usize, value: T) -> Result<Self> {
        Self::from_fn(height, width, |_, _| value.clone())
    }

    pub fn height(&self) -> usize {
        self.cells.nrows()
    }

    pub fn width(&self) -> usize {
        self.cells.ncols()
    }

    /// `(height, width)`
    pub fn shape(&self) -> (usize, usize) {
        self.cells.shape()
    }

    /// The cell at `(row, col)`, or `None` outside the grid.
    pub fn get(&self, row: usize, col: usize) -> Option<&T> {
        self.cells.get((row, col))
    }

    pub fn get_mut(&mut self, row: usize, col: usize) -> Option<&mut T> {
        self.cells.get_mut((row, col))
    }

    /// Maps a signed position onto the torus.
    pub fn wrap(&self, row: isize, col: isize) -> (usize, usize) {
        (
            wrap_index(row, self.height()),
            wrap_index(col, self.width()),
        )
    }

    /// The cell at a signed position, wrapping on both axes.
    pub fn wrapped(&self, row: isize, col: isize) -> &T {
        &self.cells[self.wrap(row, col)]
    }

    /// The grid rolled by `dy` rows and `dx` columns: the cell at `(i, j)` moves to `(i + dy, j + dx)`,
    /// wrapped onto the torus.
    pub fn rolled(&self, dy: isize, dx: isize) -> Self {
        let (height, width) = self.shape();
        let dy = wrap_index(dy, height);
        let dx = wrap_index(dx, width);
        Grid {
            cells: DMatrix::from_fn(height, width, |i, j| {
                self.cells[((i + height - dy) % height, (j + width - dx) % width)].clone()
            }),
        }
    }

    /// Fails with [`Error::DimensionMismatch`] unless `other` has the same shape.
    pub fn check_same_shape<U: Scalar>(&self, other: &Grid<U>) -> Result<()> {
        if self.shape() == other.shape() {
            Ok(())
        } else {
            Err(Error::DimensionMismatch {
                expected: self.shape(),
                found: other.shape(),
            })
        }
    }

    /// Row-major iteration over `((row, col), cell)`.
    pub fn cells(&self) -> impl Iterator<Item = ((usize, usize), &T)> + '_ {
        let width = self.width();
        (0..self.height() * width).map(move |k| {
            let pos = (k / width, k % width);
            (pos, &self.cells[pos])
        })
    }

    /// A grid of the same shape with `f` applied to every cell.
    pub fn map<U: Scalar>(&self, mut f: impl FnMut(&T) -> U) -> Grid<U> {
        Grid {
            cells: DMatrix::from_fn(self.height(), self.width(), |i, j| f(&self.cells[(i, j)])),
        }
    }

    /// The rows as nested vectors, top row first.
    pub fn to_rows(&self) -> Vec<Vec<T>> {
        (0..self.height())
            .map(|i| self.cells.row(i).iter().cloned().collect())
            .collect()
    }

    pub fn as_matrix(&self) -> &DMatrix<T> {
        &self.cells
    }

    /// Wraps a matrix which is known to be non-empty.
    pub(crate) fn from_matrix(cells: DMatrix<T>) -> Self {
        debug_assert!(cells.nrows() > 0 && cells.ncols() > 0);
        Grid { cells }
    }
}

impl<N: RealField + Copy> Grid<N> {
    /// The uniform belief: every cell `1 / (height * width)`.
    pub fn uniform(height: usize, width: usize) -> Result<Self> {
        let cells: N = na::convert((height * width) as f64);
        Self::repeat(height, width, N::one() / cells)
    }

    /// A zero filled grid. Not a valid belief until mass is added.
    pub fn zeros(height: usize, width: usize) -> Result<Self> {
        Self::repeat(height, width, N::zero())
    }

    /// Sum of all cells.
    pub fn total(&self) -> N {
        self.cells.iter().fold(N::zero(), |sum, &v| sum + v)
    }

    pub(crate) fn add_at(&mut self, pos: (usize, usize), value: N) {
        self.cells[pos] += value;
    }

    pub(crate) fn scale(&mut self, factor: N) {
        self.cells *= factor;
    }
}

impl Grid<char> {
    /// Creates a label grid from strings, one string per row and one char per cell.
    pub fn from_strings<S: AsRef<str>>(rows: &[S]) -> Result<Self> {
        let rows: Vec<Vec<char>> = rows.iter().map(|r| r.as_ref().chars().collect()).collect();
        Self::from_rows(&rows)
    }
}

impl<T: Scalar + fmt::Display> fmt::Display for Grid<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for i in 0..self.height() {
            write!(f, "[")?;
            for j in 0..self.width() {
                if j > 0 {
                    write!(f, " ")?;
                }
                fmt::Display::fmt(&self.cells[(i, j)], f)?;
            }
            writeln!(f, "]")?;
        }
        Ok(())
    }
}

fn wrap_index(index: isize, len: usize) -> usize {
    index.rem_euclid(len as isize) as usize
}
