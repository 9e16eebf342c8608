//! # varstruct-rs
//!
//! `varstruct-rs` organizes named, shaped quantities into a hierarchical
//! registry that flattens into a single vector and maps every flat position
//! back to the entry and cell it came from.
//!
//! The library provides:
//! - Sparse matrix shapes whose absent cells are structural zeros
//! - Nested groups and lists of leaves, with per-group traversal orders that
//!   can interleave siblings slot by slot
//! - A freeze step that computes dense and nonzero offsets once
//! - Numeric mirrors holding `f64` values on a frozen layout
//!
//! ## Basic Usage
//!
//! ```
//! use ndarray::array;
//! use varstruct_rs::structure::{Leaf, Path, Shape, Symbol};
//! use varstruct_rs::{Mirror, Registry};
//!
//! let mut registry: Registry<Symbol> = Registry::new();
//! registry.attach("a", Leaf::scalar("a")).unwrap();
//! registry.attach("b", Leaf::symbolic("b", Shape::diagonal(2).unwrap())).unwrap();
//! registry.freeze().unwrap();
//!
//! let mut values = Mirror::bind(&registry).unwrap();
//! values.set(&"b".parse::<Path>().unwrap(), &array![[7.0, 0.0], [0.0, 9.0]]).unwrap();
//! assert_eq!(values.flatten_nonzero().to_vec(), vec![0.0, 7.0, 9.0]);
//! ```

// Public modules
pub mod config;
pub mod error;

// Registry, layout and mirrors
pub mod structure;

// Conditional modules
#[cfg(feature = "nalgebra")]
pub mod utils;

// Re-exports for convenience
pub use config::RegistryConfig;
pub use error::{Result, VarStructError};
pub use structure::{Mirror, Registry};

/// Version of the library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
