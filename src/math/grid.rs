use rayon::prelude::*;

/// Square, row-major editor raster: `res x res` cells of `T`.
///
/// Used for heights (`f32`), weight vectors (`[f32; N]`) and masks (`bool`).
#[derive(Debug, Clone, PartialEq)]
pub struct Grid<T> {
    res: usize,
    cells: Vec<T>,
}

impl<T: Copy> Grid<T> {
    pub fn new(res: usize, fill: T) -> Self {
        Self {
            res,
            cells: vec![fill; res * res],
        }
    }

    /// Wrap an existing row-major cell vector. Returns `None` if it is not `res * res` long.
    pub fn from_cells(res: usize, cells: Vec<T>) -> Option<Self> {
        if cells.len() != res * res {
            return None;
        }
        Some(Self { res, cells })
    }

    pub fn res(&self) -> usize {
        self.res
    }

    pub fn get(&self, row: usize, col: usize) -> T {
        self.cells[row * self.res + col]
    }

    pub fn set(&mut self, row: usize, col: usize, value: T) {
        self.cells[row * self.res + col] = value;
    }

    pub fn row(&self, row: usize) -> &[T] {
        &self.cells[row * self.res..(row + 1) * self.res]
    }

    pub fn cells(&self) -> &[T] {
        &self.cells
    }

    pub fn into_cells(self) -> Vec<T> {
        self.cells
    }
}

impl<T: Copy + Send + Sync> Grid<T> {
    /// Run `f(row_index, row_cells)` over every row in parallel.
    pub fn par_rows_mut<F>(&mut self, f: F)
    where
        F: Fn(usize, &mut [T]) + Sync + Send,
    {
        let res = self.res.max(1);
        self.cells
            .par_chunks_mut(res)
            .enumerate()
            .for_each(|(row, cells)| f(row, cells));
    }

    /// Build a grid row-parallel from a per-cell function.
    pub fn from_fn<F>(res: usize, fill: T, f: F) -> Self
    where
        F: Fn(usize, usize) -> T + Sync + Send,
    {
        let mut grid = Self::new(res, fill);
        grid.par_rows_mut(|row, cells| {
            for (col, cell) in cells.iter_mut().enumerate() {
                *cell = f(row, col);
            }
        });
        grid
    }
}
