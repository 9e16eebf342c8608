//! Interop helpers for the optional `nalgebra` feature.

pub mod matrix_convert;

pub use matrix_convert::{
    dmatrix_to_ndarray, dvector_to_ndarray, ndarray_to_dmatrix, ndarray_to_dvector,
};
