//! Leaf shapes and sparsity patterns
//!
//! A [`Shape`] records the row/column extent of a leaf and which cells are
//! structurally present. Present cells are always kept in column-major order
//! (increasing column, then increasing row), which is the intra-leaf
//! flattening order used by every layout computation.

use crate::structure::error::StructureError;
use serde::{Deserialize, Serialize};

/// Row/column extent plus the set of structurally present cells
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "ShapeRepr", into = "ShapeRepr")]
pub struct Shape {
    rows: usize,
    cols: usize,
    /// Present cells as (row, col), sorted column-major, without duplicates
    cells: Vec<(usize, usize)>,
}

#[derive(Serialize, Deserialize)]
struct ShapeRepr {
    rows: usize,
    cols: usize,
    cells: Vec<(usize, usize)>,
}

impl TryFrom<ShapeRepr> for Shape {
    type Error = StructureError;

    fn try_from(repr: ShapeRepr) -> Result<Self, Self::Error> {
        Shape::from_cells(repr.rows, repr.cols, repr.cells)
    }
}

impl From<Shape> for ShapeRepr {
    fn from(shape: Shape) -> Self {
        ShapeRepr {
            rows: shape.rows,
            cols: shape.cols,
            cells: shape.cells,
        }
    }
}

impl Shape {
    /// Create a fully dense shape
    ///
    /// # Examples
    ///
    /// ```
    /// use varstruct_rs::structure::Shape;
    ///
    /// let shape = Shape::dense(2, 4).unwrap();
    /// assert_eq!(shape.numel(), 8);
    /// assert_eq!(shape.nnz(), 8);
    /// assert_eq!(shape.cells()[1], (1, 0));
    /// ```
    pub fn dense(rows: usize, cols: usize) -> Result<Self, StructureError> {
        Self::check_extent(rows, cols)?;

        let mut cells = Vec::with_capacity(rows * cols);
        for col in 0..cols {
            for row in 0..rows {
                cells.push((row, col));
            }
        }

        Ok(Self { rows, cols, cells })
    }

    /// Create a shape from an explicit set of present cells
    ///
    /// Cells may be given in any order; duplicates are merged. Fails with
    /// `InvalidShape` if a cell lies outside `[0, rows) x [0, cols)`.
    ///
    /// # Examples
    ///
    /// ```
    /// use varstruct_rs::structure::Shape;
    ///
    /// let shape = Shape::from_cells(2, 2, [(1, 1), (0, 0)]).unwrap();
    /// assert_eq!(shape.cells(), &[(0, 0), (1, 1)]);
    /// assert!(Shape::from_cells(2, 2, [(2, 0)]).is_err());
    /// ```
    pub fn from_cells<I>(rows: usize, cols: usize, cells: I) -> Result<Self, StructureError>
    where
        I: IntoIterator<Item = (usize, usize)>,
    {
        Self::check_extent(rows, cols)?;

        let mut cells: Vec<(usize, usize)> = cells.into_iter().collect();
        if let Some(&(row, col)) = cells.iter().find(|&&(r, c)| r >= rows || c >= cols) {
            return Err(StructureError::InvalidShape {
                message: format!(
                    "cell ({}, {}) lies outside a {}x{} shape",
                    row, col, rows, cols
                ),
            });
        }

        cells.sort_by_key(|&(r, c)| (c, r));
        cells.dedup();

        Ok(Self { rows, cols, cells })
    }

    /// A dense 1x1 shape
    pub fn scalar() -> Self {
        Self {
            rows: 1,
            cols: 1,
            cells: vec![(0, 0)],
        }
    }

    /// A dense column vector with `n` rows
    pub fn column(n: usize) -> Result<Self, StructureError> {
        Self::dense(n, 1)
    }

    /// An `n x n` shape with only the diagonal present
    pub fn diagonal(n: usize) -> Result<Self, StructureError> {
        Self::from_cells(n, n, (0..n).map(|i| (i, i)))
    }

    /// An `n x n` shape with the diagonal and everything below it present
    pub fn lower_triangular(n: usize) -> Result<Self, StructureError> {
        Self::from_cells(n, n, (0..n).flat_map(|c| (c..n).map(move |r| (r, c))))
    }

    fn check_extent(rows: usize, cols: usize) -> Result<(), StructureError> {
        if rows < 1 || cols < 1 {
            return Err(StructureError::InvalidShape {
                message: format!("extent {}x{} must be at least 1x1", rows, cols),
            });
        }
        if rows.checked_mul(cols).is_none() {
            return Err(StructureError::InvalidShape {
                message: format!("extent {}x{} overflows the cell count", rows, cols),
            });
        }
        Ok(())
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Number of cells, present or not
    pub fn numel(&self) -> usize {
        self.rows * self.cols
    }

    /// Number of structurally present cells
    pub fn nnz(&self) -> usize {
        self.cells.len()
    }

    pub fn is_dense(&self) -> bool {
        self.nnz() == self.numel()
    }

    /// Present cells in column-major order
    pub fn cells(&self) -> &[(usize, usize)] {
        &self.cells
    }

    pub fn contains(&self, row: usize, col: usize) -> bool {
        self.nz_index(row, col).is_some()
    }

    /// Local nonzero index of a present cell
    pub fn nz_index(&self, row: usize, col: usize) -> Option<usize> {
        self.cells
            .binary_search_by_key(&(col, row), |&(r, c)| (c, r))
            .ok()
    }

    /// Column-major dense index of a cell
    pub fn linear_index(&self, row: usize, col: usize) -> usize {
        col * self.rows + row
    }

    /// Cell addressed by a column-major dense index
    pub fn cell_at_linear(&self, index: usize) -> Option<(usize, usize)> {
        if index < self.numel() {
            Some((index % self.rows, index / self.rows))
        } else {
            None
        }
    }

    /// For every dense cell in column-major order, its local nonzero index
    pub fn dense_to_nz(&self) -> Vec<Option<usize>> {
        let mut map = vec![None; self.numel()];
        for (k, &(row, col)) in self.cells.iter().enumerate() {
            map[self.linear_index(row, col)] = Some(k);
        }
        map
    }
}

impl std::fmt::Display for Shape {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_dense() {
            write!(f, "{}x{}", self.rows, self.cols)
        } else {
            write!(f, "{}x{} ({} nz)", self.rows, self.cols, self.nnz())
        }
    }
}
