//! Leaves: named, shaped quantities
//!
//! A [`Leaf`] carries one element per structurally present cell of its
//! [`Shape`], stored in column-major order. The element type is opaque to the
//! registry; [`Symbol`] is the named atom used when no external symbolic
//! provider is involved.

use crate::structure::error::StructureError;
use crate::structure::shape::Shape;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A named symbolic atom
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Symbol {
    name: String,
}

impl Symbol {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// A named entity with a shape and one element per present cell
#[derive(Debug, Clone, PartialEq)]
pub struct Leaf<E> {
    name: String,
    shape: Shape,
    elements: Vec<E>,
}

impl<E> Leaf<E> {
    /// Create a leaf from its present-cell elements in column-major order
    ///
    /// Fails with `ShapeMismatch` if `elements.len()` differs from `shape.nnz()`.
    pub fn new(name: &str, shape: Shape, elements: Vec<E>) -> Result<Self, StructureError> {
        if elements.len() != shape.nnz() {
            return Err(StructureError::shape_mismatch(
                name,
                format!(
                    "{} shape needs {} elements, got {}",
                    shape,
                    shape.nnz(),
                    elements.len()
                ),
            ));
        }

        Ok(Self {
            name: name.to_string(),
            shape,
            elements,
        })
    }

    /// Create a leaf by asking `f` for the element of every present cell
    pub fn from_fn<F>(name: &str, shape: Shape, mut f: F) -> Self
    where
        F: FnMut(usize, usize) -> E,
    {
        let elements = shape.cells().iter().map(|&(r, c)| f(r, c)).collect();
        Self {
            name: name.to_string(),
            shape,
            elements,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn shape(&self) -> &Shape {
        &self.shape
    }

    /// Present-cell elements in column-major order
    pub fn elements(&self) -> &[E] {
        &self.elements
    }

    /// Element at `(row, col)`, or `None` for a structural zero
    pub fn element(&self, row: usize, col: usize) -> Option<&E> {
        self.shape.nz_index(row, col).map(|k| &self.elements[k])
    }

    /// Whether the leaf is a single present cell
    pub fn is_scalar(&self) -> bool {
        self.shape.numel() == 1 && self.shape.nnz() == 1
    }
}

impl Leaf<Symbol> {
    /// Create a leaf of fresh symbols
    ///
    /// A 1x1 leaf gets a single symbol called `name`; otherwise the cell at
    /// column-major dense index `k` gets `name_k`.
    ///
    /// # Examples
    ///
    /// ```
    /// use varstruct_rs::structure::{Leaf, Shape};
    ///
    /// let z = Leaf::symbolic("z", Shape::dense(2, 4).unwrap());
    /// assert_eq!(z.elements()[3].name(), "z_3");
    /// assert_eq!(z.element(1, 1).unwrap().name(), "z_3");
    /// ```
    pub fn symbolic(name: &str, shape: Shape) -> Self {
        if shape.numel() == 1 {
            return Self::from_fn(name, shape, |_, _| Symbol::new(name));
        }

        let rows = shape.rows();
        Self::from_fn(name, shape, |r, c| {
            Symbol::new(format!("{}_{}", name, c * rows + r))
        })
    }

    /// A 1x1 symbolic leaf
    pub fn scalar(name: &str) -> Self {
        Self::symbolic(name, Shape::scalar())
    }
}
