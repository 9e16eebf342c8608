//! Numeric mirrors of a frozen registry
//!
//! A [`Mirror`] holds one `f64` buffer per leaf, sized to the leaf's present
//! cells and laid out exactly like the registry's nonzero flattening. Any
//! number of mirrors may borrow the same frozen registry; each owns its own
//! buffers.

use crate::structure::error::StructureError;
use crate::structure::path::Path;
use crate::structure::registry::{Layout, LeafSlot, Registry, Target};
use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};

/// What a path addresses, in layout terms
enum Slot {
    Leaf(usize),
    Cell { leaf: usize, row: usize, col: usize },
    Subtree,
}

#[derive(Serialize, Deserialize)]
struct MirrorEntry {
    path: Path,
    values: Vec<f64>,
}

/// Numeric values staged against a frozen registry
///
/// # Examples
///
/// ```
/// use ndarray::array;
/// use varstruct_rs::structure::{Leaf, Mirror, Path, Registry, Shape, Symbol};
///
/// let mut registry: Registry<Symbol> = Registry::new();
/// registry.attach("a", Leaf::scalar("a")).unwrap();
/// registry.attach("b", Leaf::symbolic("b", Shape::diagonal(2).unwrap())).unwrap();
/// registry.freeze().unwrap();
///
/// let mut values = Mirror::bind(&registry).unwrap();
/// values.set(&Path::parse("b").unwrap(), &array![[7.0, 0.0], [0.0, 9.0]]).unwrap();
///
/// assert_eq!(values.flatten_nonzero().to_vec(), vec![0.0, 7.0, 9.0]);
/// assert_eq!(values.flatten_dense().to_vec(), vec![0.0, 7.0, 0.0, 0.0, 9.0]);
/// ```
#[derive(Debug, Clone)]
pub struct Mirror<'r, E> {
    registry: &'r Registry<E>,
    layout: &'r Layout,
    values: Vec<Vec<f64>>,
}

impl<'r, E> Mirror<'r, E> {
    /// Bind a zero-initialized mirror to a frozen registry
    ///
    /// Fails with `RegistryNotFrozen` if the registry is still building.
    pub fn bind(registry: &'r Registry<E>) -> Result<Self, StructureError> {
        let layout = registry.layout()?;
        let values = layout
            .leaves()
            .iter()
            .map(|slot| vec![0.0; slot.shape.nnz()])
            .collect();

        tracing::debug!(
            leaves = layout.leaves().len(),
            total_nnz = layout.total_nnz(),
            "mirror bound"
        );
        Ok(Self {
            registry,
            layout,
            values,
        })
    }

    pub fn registry(&self) -> &'r Registry<E> {
        self.registry
    }

    fn resolve(&self, path: &Path) -> Result<Slot, StructureError> {
        let leaf_index = |leaf_path: &Path| {
            self.layout
                .index_of(leaf_path)
                .ok_or_else(|| StructureError::not_found(leaf_path, "leaf missing from layout"))
        };

        Ok(match self.registry.locate(path)? {
            Target::Leaf(_) => Slot::Leaf(leaf_index(path)?),
            Target::Cell { row, col, .. } => Slot::Cell {
                leaf: leaf_index(&path.prefix(path.len() - 1))?,
                row,
                col,
            },
            Target::Group(_) | Target::List(_) => Slot::Subtree,
        })
    }

    fn slot(&self, leaf: usize) -> &'r LeafSlot {
        &self.layout.leaves()[leaf]
    }

    fn set_cell(
        &mut self,
        path: &Path,
        leaf: usize,
        row: usize,
        col: usize,
        value: f64,
    ) -> Result<(), StructureError> {
        let k = self.slot(leaf).shape.nz_index(row, col).ok_or_else(|| {
            StructureError::shape_mismatch(
                path,
                format!("cell ({}, {}) is a structural zero", row, col),
            )
        })?;
        self.values[leaf][k] = value;
        Ok(())
    }

    /// Overwrite a leaf with a dense matrix, or a cell with a 1x1 matrix
    ///
    /// Values at structurally absent cells must be zero.
    pub fn set(&mut self, path: &Path, value: &Array2<f64>) -> Result<(), StructureError> {
        match self.resolve(path)? {
            Slot::Leaf(leaf) => {
                let shape = &self.slot(leaf).shape;
                if value.dim() != (shape.rows(), shape.cols()) {
                    return Err(StructureError::shape_mismatch(
                        path,
                        format!(
                            "expected a {}x{} matrix, got {}x{}",
                            shape.rows(),
                            shape.cols(),
                            value.nrows(),
                            value.ncols()
                        ),
                    ));
                }
                if let Some(((row, col), _)) = value
                    .indexed_iter()
                    .find(|&((r, c), &v)| v != 0.0 && !shape.contains(r, c))
                {
                    return Err(StructureError::shape_mismatch(
                        path,
                        format!("nonzero value at structural zero ({}, {})", row, col),
                    ));
                }

                let buffer: Vec<f64> = shape.cells().iter().map(|&(r, c)| value[[r, c]]).collect();
                self.values[leaf] = buffer;
                Ok(())
            }
            Slot::Cell { leaf, row, col } => {
                if value.dim() != (1, 1) {
                    return Err(StructureError::shape_mismatch(
                        path,
                        format!(
                            "expected a 1x1 matrix for a cell, got {}x{}",
                            value.nrows(),
                            value.ncols()
                        ),
                    ));
                }
                self.set_cell(path, leaf, row, col, value[[0, 0]])
            }
            Slot::Subtree => Err(StructureError::shape_mismatch(
                path,
                "path addresses a group or list, not a leaf or cell",
            )),
        }
    }

    /// Overwrite a leaf from its present-cell values in column-major order
    pub fn set_nonzeros(&mut self, path: &Path, values: &[f64]) -> Result<(), StructureError> {
        let leaf = self.check_nonzeros(path, values.len())?;
        self.values[leaf].copy_from_slice(values);
        Ok(())
    }

    /// Leaf index of `path` if it is a leaf holding `count` nonzeros
    fn check_nonzeros(&self, path: &Path, count: usize) -> Result<usize, StructureError> {
        let Slot::Leaf(leaf) = self.resolve(path)? else {
            return Err(StructureError::shape_mismatch(
                path,
                "path does not address a leaf",
            ));
        };

        let nnz = self.slot(leaf).shape.nnz();
        if count != nnz {
            return Err(StructureError::shape_mismatch(
                path,
                format!("expected {} nonzeros, got {}", nnz, count),
            ));
        }
        Ok(leaf)
    }

    /// Set a single cell, or a 1x1 leaf
    pub fn set_scalar(&mut self, path: &Path, value: f64) -> Result<(), StructureError> {
        match self.resolve(path)? {
            Slot::Cell { leaf, row, col } => self.set_cell(path, leaf, row, col, value),
            Slot::Leaf(leaf) if self.slot(leaf).shape.numel() == 1 => {
                self.set_cell(path, leaf, 0, 0, value)
            }
            _ => Err(StructureError::shape_mismatch(
                path,
                "path does not address a single cell",
            )),
        }
    }

    /// Set every present cell under `path`
    pub fn fill(&mut self, path: &Path, value: f64) -> Result<(), StructureError> {
        match self.resolve(path)? {
            Slot::Leaf(leaf) => self.values[leaf].fill(value),
            Slot::Cell { leaf, row, col } => self.set_cell(path, leaf, row, col, value)?,
            Slot::Subtree => {
                let layout = self.layout;
                for (leaf, _) in layout.leaves_under(path) {
                    self.values[leaf].fill(value);
                }
            }
        }
        Ok(())
    }

    /// Dense matrix of a leaf, or a 1x1 matrix for a cell
    pub fn get(&self, path: &Path) -> Result<Array2<f64>, StructureError> {
        match self.resolve(path)? {
            Slot::Leaf(leaf) => {
                let shape = &self.slot(leaf).shape;
                let mut dense = Array2::zeros((shape.rows(), shape.cols()));
                for (&(r, c), &v) in shape.cells().iter().zip(&self.values[leaf]) {
                    dense[[r, c]] = v;
                }
                Ok(dense)
            }
            Slot::Cell { leaf, row, col } => {
                let value = self
                    .slot(leaf)
                    .shape
                    .nz_index(row, col)
                    .map_or(0.0, |k| self.values[leaf][k]);
                Ok(Array2::from_elem((1, 1), value))
            }
            Slot::Subtree => Err(StructureError::shape_mismatch(
                path,
                "path addresses a group or list, not a leaf or cell",
            )),
        }
    }

    /// Present-cell values of a leaf in column-major order
    pub fn nonzeros(&self, path: &Path) -> Result<&[f64], StructureError> {
        match self.resolve(path)? {
            Slot::Leaf(leaf) => Ok(&self.values[leaf]),
            _ => Err(StructureError::shape_mismatch(path, "path does not address a leaf")),
        }
    }

    /// Values of every cell in layout order, zeros at structural zeros
    pub fn flatten_dense(&self) -> Array1<f64> {
        let mut dense = Array1::zeros(self.layout.total_numel());
        for (slot, values) in self.layout.leaves().iter().zip(&self.values) {
            for (&(r, c), &v) in slot.shape.cells().iter().zip(values) {
                dense[slot.numel_offset + slot.shape.linear_index(r, c)] = v;
            }
        }
        dense
    }

    /// Values of every present cell in layout order
    pub fn flatten_nonzero(&self) -> Array1<f64> {
        self.values.iter().flatten().copied().collect()
    }

    /// Overwrite every buffer from a vector in nonzero layout order
    pub fn load_nonzero(&mut self, values: &[f64]) -> Result<(), StructureError> {
        if values.len() != self.layout.total_nnz() {
            return Err(StructureError::shape_mismatch(
                Path::new(),
                format!(
                    "expected {} nonzeros, got {}",
                    self.layout.total_nnz(),
                    values.len()
                ),
            ));
        }

        for (slot, buffer) in self.layout.leaves().iter().zip(self.values.iter_mut()) {
            buffer.copy_from_slice(&values[slot.nnz_offset..slot.nnz_offset + slot.shape.nnz()]);
        }
        Ok(())
    }

    /// Zero every buffer
    pub fn reset(&mut self) {
        for buffer in &mut self.values {
            buffer.fill(0.0);
        }
    }

    /// Path-keyed snapshot of every leaf's nonzeros as JSON
    pub fn to_json(&self) -> crate::Result<String> {
        let entries: Vec<MirrorEntry> = self
            .layout
            .leaves()
            .iter()
            .zip(&self.values)
            .map(|(slot, values)| MirrorEntry {
                path: slot.path.clone(),
                values: values.clone(),
            })
            .collect();
        Ok(serde_json::to_string_pretty(&entries)?)
    }

    /// Apply a snapshot produced by [`Mirror::to_json`]
    ///
    /// Leaves missing from the snapshot keep their values. Every entry is
    /// checked before any buffer is written.
    pub fn load_json(&mut self, json: &str) -> crate::Result<()> {
        let entries: Vec<MirrorEntry> = serde_json::from_str(json)?;
        let staged = entries
            .into_iter()
            .map(|entry| -> Result<(usize, Vec<f64>), StructureError> {
                let leaf = self.check_nonzeros(&entry.path, entry.values.len())?;
                Ok((leaf, entry.values))
            })
            .collect::<Result<Vec<_>, _>>()?;

        for (leaf, values) in staged {
            self.values[leaf] = values;
        }
        Ok(())
    }
}

#[cfg(feature = "nalgebra")]
impl<'r, E> Mirror<'r, E> {
    /// Overwrite a leaf or cell from a column-major nalgebra matrix
    pub fn set_dmatrix(
        &mut self,
        path: &Path,
        value: &nalgebra::DMatrix<f64>,
    ) -> Result<(), StructureError> {
        self.set(path, &crate::utils::dmatrix_to_ndarray(value))
    }

    /// Dense nalgebra matrix of a leaf or cell
    pub fn get_dmatrix(&self, path: &Path) -> Result<nalgebra::DMatrix<f64>, StructureError> {
        Ok(crate::utils::ndarray_to_dmatrix(&self.get(path)?))
    }
}
