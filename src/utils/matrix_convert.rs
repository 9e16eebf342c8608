//! Conversions between ndarray and nalgebra containers.
//!
//! Mirrors store values as ndarray arrays; these helpers let callers that work
//! in nalgebra read and write them without copying element by element
//! themselves. nalgebra storage is column-major, which is also the order
//! registry layouts use, so vectors convert without reordering.

use nalgebra::{DMatrix, DVector};
use ndarray::{Array1, Array2};

/// Convert an ndarray Array2 to a nalgebra DMatrix.
///
/// # Examples
///
/// ```
/// use ndarray::array;
/// use varstruct_rs::utils::ndarray_to_dmatrix;
///
/// let mat = ndarray_to_dmatrix(&array![[1.0, 2.0], [3.0, 4.0]]);
/// assert_eq!(mat[(0, 1)], 2.0);
/// assert_eq!(mat.as_slice(), &[1.0, 3.0, 2.0, 4.0]);
/// ```
pub fn ndarray_to_dmatrix<T: Clone + nalgebra::Scalar>(arr: &Array2<T>) -> DMatrix<T> {
    DMatrix::from_fn(arr.nrows(), arr.ncols(), |i, j| arr[[i, j]].clone())
}

/// Convert a nalgebra DMatrix to an ndarray Array2.
pub fn dmatrix_to_ndarray<T: Clone + nalgebra::Scalar>(mat: &DMatrix<T>) -> Array2<T> {
    Array2::from_shape_fn((mat.nrows(), mat.ncols()), |(i, j)| mat[(i, j)].clone())
}

/// Convert an ndarray Array1 to a nalgebra DVector.
pub fn ndarray_to_dvector<T: Clone + nalgebra::Scalar>(arr: &Array1<T>) -> DVector<T> {
    DVector::from_iterator(arr.len(), arr.iter().cloned())
}

/// Convert a nalgebra DVector to an ndarray Array1.
pub fn dvector_to_ndarray<T: Clone + nalgebra::Scalar>(vec: &DVector<T>) -> Array1<T> {
    vec.iter().cloned().collect()
}
