//! # Structured Variables
//!
//! This module provides a hierarchical registry of named, shaped quantities
//! that can be flattened into one vector and addressed back from it.
//!
//! ## Key Features
//!
//! - **Sparse Shapes**: Leaves are matrices whose present cells are listed
//!   explicitly; absent cells are structural zeros
//! - **Nested Entries**: Groups of named entries and positional lists nest to
//!   any depth, including whole registries composed into a parent
//! - **Traversal Orders**: Groups may reorder their children and interleave
//!   sibling lists slot by slot
//! - **Frozen Layouts**: Freezing computes dense and nonzero offsets once and
//!   serves reverse lookups from them
//! - **Numeric Mirrors**: Concrete `f64` values stored on the same layout
//!
//! ## Core Components
//!
//! - [`Shape`]: Dimensions plus the set of present cells
//! - [`Leaf`] and [`TreeNode`]: Shaped quantities and the tree they form
//! - [`Path`]: Addresses of nodes, leaves and cells
//! - [`OrderSpec`]: Requested traversal order for a group
//! - [`Registry`] and [`Layout`]: The building registry and its frozen layout
//! - [`Mirror`]: Numeric values bound to a frozen registry
//!
//! ## Example Usage
//!
//! ```rust
//! use varstruct_rs::structure::{Leaf, OrderSpec, Path, Registry, Shape, Symbol, TreeNode};
//!
//! let mut registry: Registry<Symbol> = Registry::new();
//! registry.attach("x", Leaf::scalar("x")).unwrap();
//! registry
//!     .attach(
//!         "y",
//!         (0..3)
//!             .map(|i| Leaf::symbolic(&format!("y{}", i), Shape::column(2).unwrap()))
//!             .collect::<Vec<_>>(),
//!     )
//!     .unwrap();
//! registry
//!     .attach("z", (0..3).map(|i| Leaf::scalar(&format!("z{}", i))).collect::<Vec<_>>())
//!     .unwrap();
//! registry
//!     .set_order(OrderSpec::new().then("x").interleave(["y", "z"]))
//!     .unwrap();
//! registry.freeze().unwrap();
//!
//! let names: Vec<String> = registry
//!     .flatten_nonzero()
//!     .unwrap()
//!     .iter()
//!     .map(|symbol| symbol.to_string())
//!     .collect();
//! assert_eq!(names, ["x", "y0_0", "y0_1", "z0", "y1_0", "y1_1", "z1", "y2_0", "y2_1", "z2"]);
//! assert_eq!(registry.reverse_lookup(4).unwrap(), Path::parse("y[1](0,0)").unwrap());
//! ```

mod error;
mod leaf;
mod mirror;
mod node;
mod order;
mod path;
mod registry;
mod shape;


pub use error::StructureError;
pub use leaf::{Leaf, Symbol};
pub use mirror::Mirror;
pub use node::{Group, TreeNode};
pub use order::{OrderItem, OrderSpec};
pub use path::{is_identifier, Path, PathToken};
pub use registry::{DenseEntry, Layout, LeafSlot, Registry, RegistryState, Resolved};
pub use shape::Shape;
