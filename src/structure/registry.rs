//! The registry and its frozen layout
//!
//! A [`Registry`] accumulates named entries while building, then freezes
//! into an immutable [`Layout`]: every leaf gets a dense (`numel`) and a
//! nonzero (`nnz`) start offset, accumulated along the resolved visitation
//! order, and every flat nonzero index maps back to a leaf and a local
//! nonzero index. The layout is computed once and never recomputed.

use crate::config::RegistryConfig;
use crate::structure::error::StructureError;
use crate::structure::leaf::Leaf;
use crate::structure::node::{Group, TreeNode};
use crate::structure::order::{OrderSpec, Resolver};
use crate::structure::path::{Path, PathToken};
use crate::structure::shape::Shape;
use ndarray::Array2;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs::File;
use std::io::Read;

/// Lifecycle state of a registry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegistryState {
    /// Entries and order may still change
    Building,

    /// The layout is computed and the registry is read-only
    Frozen,
}

/// Placement of one leaf in the flat layout
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeafSlot {
    /// Path addressing the leaf from the registry root
    pub path: Path,

    /// Shape of the leaf
    pub shape: Shape,

    /// Start of the leaf in the dense flattening
    pub numel_offset: usize,

    /// Start of the leaf in the nonzero flattening
    pub nnz_offset: usize,
}

/// Offsets and reverse-lookup tables of a frozen registry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "LayoutRepr", try_from = "LayoutRepr")]
pub struct Layout {
    leaves: Vec<LeafSlot>,
    by_path: HashMap<Path, usize>,
    /// Flat nonzero index -> (leaf index, local nonzero index)
    nonzeros: Vec<(usize, usize)>,
    total_numel: usize,
    total_nnz: usize,
}

#[derive(Serialize, Deserialize)]
struct LayoutRepr {
    total_numel: usize,
    total_nnz: usize,
    leaves: Vec<LeafSlot>,
}

impl From<Layout> for LayoutRepr {
    fn from(layout: Layout) -> Self {
        LayoutRepr {
            total_numel: layout.total_numel,
            total_nnz: layout.total_nnz,
            leaves: layout.leaves,
        }
    }
}

impl TryFrom<LayoutRepr> for Layout {
    type Error = String;

    fn try_from(repr: LayoutRepr) -> Result<Self, Self::Error> {
        let layout = Layout::from_leaves(
            repr.leaves
                .iter()
                .map(|slot| (slot.path.clone(), slot.shape.clone())),
        )
        .map_err(|err| err.to_string())?;

        if layout.leaves != repr.leaves
            || layout.total_numel != repr.total_numel
            || layout.total_nnz != repr.total_nnz
        {
            return Err("layout offsets are inconsistent with leaf shapes".to_string());
        }
        Ok(layout)
    }
}

impl Layout {
    /// Accumulate offsets over leaves given in visitation order
    ///
    /// Each path must name exactly one leaf and no leaf may sit under
    /// another leaf's path.
    fn from_leaves<I>(leaves: I) -> Result<Self, StructureError>
    where
        I: IntoIterator<Item = (Path, Shape)>,
    {
        let mut slots = Vec::new();
        let mut by_path = HashMap::new();
        let mut nonzeros = Vec::new();
        let mut numel_offset = 0;
        let mut nnz_offset = 0;

        for (index, (path, shape)) in leaves.into_iter().enumerate() {
            if by_path.insert(path.clone(), index).is_some() {
                return Err(StructureError::DuplicateName {
                    name: path.to_string(),
                });
            }
            nonzeros.extend((0..shape.nnz()).map(|local| (index, local)));

            let (numel, nnz) = (shape.numel(), shape.nnz());
            slots.push(LeafSlot {
                path,
                shape,
                numel_offset,
                nnz_offset,
            });
            numel_offset += numel;
            nnz_offset += nnz;
        }

        for slot in &slots {
            let enclosing = (1..slot.path.len())
                .find(|&len| by_path.contains_key(&slot.path.prefix(len)));
            if let Some(len) = enclosing {
                return Err(StructureError::InvalidPath {
                    input: slot.path.to_string(),
                    message: format!("lies under the leaf at '{}'", slot.path.prefix(len)),
                });
            }
        }

        Ok(Self {
            leaves: slots,
            by_path,
            nonzeros,
            total_numel: numel_offset,
            total_nnz: nnz_offset,
        })
    }

    /// Leaves in visitation order
    pub fn leaves(&self) -> &[LeafSlot] {
        &self.leaves
    }

    pub fn total_numel(&self) -> usize {
        self.total_numel
    }

    pub fn total_nnz(&self) -> usize {
        self.total_nnz
    }

    /// Position of the leaf at `path` in visitation order
    pub fn index_of(&self, path: &Path) -> Option<usize> {
        self.by_path.get(path).copied()
    }

    pub fn slot(&self, path: &Path) -> Option<&LeafSlot> {
        self.index_of(path).map(|index| &self.leaves[index])
    }

    /// Leaf index and local nonzero index of a flat nonzero position
    pub fn nonzero_at(&self, index: usize) -> Option<(usize, usize)> {
        self.nonzeros.get(index).copied()
    }

    /// Leaves whose path lies under `prefix`, in visitation order
    pub fn leaves_under<'a>(
        &'a self,
        prefix: &'a Path,
    ) -> impl Iterator<Item = (usize, &'a LeafSlot)> + 'a {
        self.leaves
            .iter()
            .enumerate()
            .filter(move |(_, slot)| slot.path.starts_with(prefix))
    }

    /// Serialize the layout to pretty JSON
    pub fn to_json(&self) -> crate::Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Load a layout from JSON, rebuilding the lookup tables
    ///
    /// Fails if the stored offsets do not match the stored shapes.
    pub fn from_json(json: &str) -> crate::Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load a layout from a JSON file
    pub fn load_json<P: AsRef<std::path::Path>>(path: P) -> crate::Result<Self> {
        let mut file = File::open(path)?;
        let mut contents = String::new();
        file.read_to_string(&mut contents)?;
        Self::from_json(&contents)
    }
}

/// Result of a path lookup
#[derive(Debug, PartialEq)]
pub enum Resolved<'a, E> {
    Group(&'a Group<E>),
    List(&'a [TreeNode<E>]),
    Leaf(&'a Leaf<E>),

    /// A structurally present cell of a leaf
    Element(&'a E),

    /// An in-range cell that is not structurally present
    StructuralZero,
}

impl<'a, E> Resolved<'a, E> {
    /// The single element this result stands for, if any
    ///
    /// A 1x1 leaf with a present cell counts as its element.
    pub fn as_element(&self) -> Option<&'a E> {
        match *self {
            Resolved::Element(element) => Some(element),
            Resolved::Leaf(leaf) if leaf.is_scalar() => leaf.elements().first(),
            _ => None,
        }
    }
}

/// One cell of the dense flattening
#[derive(Debug, PartialEq)]
pub enum DenseEntry<'a, E> {
    Present(&'a E),
    StructuralZero,
}

impl<'a, E> DenseEntry<'a, E> {
    pub fn present(&self) -> Option<&'a E> {
        match *self {
            DenseEntry::Present(element) => Some(element),
            DenseEntry::StructuralZero => None,
        }
    }
}

/// Node reached by walking a path
pub(crate) enum Target<'a, E> {
    Group(&'a Group<E>),
    List(&'a [TreeNode<E>]),
    Leaf(&'a Leaf<E>),
    Cell {
        leaf: &'a Leaf<E>,
        row: usize,
        col: usize,
    },
}

impl<'a, E> Target<'a, E> {
    fn from_node(node: &'a TreeNode<E>) -> Self {
        match node {
            TreeNode::Leaf(leaf) => Target::Leaf(leaf),
            TreeNode::List(items) => Target::List(items),
            TreeNode::Group(group) => Target::Group(group),
        }
    }
}

/// A hierarchical registry of named, shaped quantities
///
/// # Examples
///
/// ```
/// use varstruct_rs::structure::{Leaf, Path, Registry, Shape, Symbol};
///
/// let mut registry: Registry<Symbol> = Registry::new();
/// registry.attach("a", Leaf::scalar("a")).unwrap();
/// registry.attach("b", Leaf::symbolic("b", Shape::diagonal(2).unwrap())).unwrap();
/// registry.freeze().unwrap();
///
/// assert_eq!(registry.total_numel().unwrap(), 5);
/// assert_eq!(registry.total_nnz().unwrap(), 3);
/// assert_eq!(registry.reverse_lookup(2).unwrap(), Path::parse("b(1,1)").unwrap());
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Registry<E> {
    root: Group<E>,
    config: RegistryConfig,
    layout: Option<Layout>,
}

impl<E> Registry<E> {
    /// Create an empty registry with the default configuration
    pub fn new() -> Self {
        Self::with_config(RegistryConfig::default())
    }

    pub fn with_config(config: RegistryConfig) -> Self {
        Self {
            root: Group::new(),
            config,
            layout: None,
        }
    }

    pub fn config(&self) -> &RegistryConfig {
        &self.config
    }

    pub fn state(&self) -> RegistryState {
        if self.layout.is_some() {
            RegistryState::Frozen
        } else {
            RegistryState::Building
        }
    }

    pub fn is_frozen(&self) -> bool {
        self.state() == RegistryState::Frozen
    }

    /// Top-level entries
    pub fn root(&self) -> &Group<E> {
        &self.root
    }

    /// Attach a named top-level entry
    ///
    /// Fails with `ImmutableRegistry` once frozen, `DuplicateName` if `name`
    /// is taken.
    pub fn attach(
        &mut self,
        name: &str,
        node: impl Into<TreeNode<E>>,
    ) -> Result<(), StructureError> {
        if self.is_frozen() {
            return Err(StructureError::immutable(&format!("attach '{}'", name)));
        }

        let node = node.into();
        tracing::trace!(name, leaves = node.leaf_count(), "attaching entry");
        self.root.attach(name, node)
    }

    /// Rename a top-level entry
    pub fn rename(&mut self, old: &str, new: &str) -> Result<(), StructureError> {
        if self.is_frozen() {
            return Err(StructureError::immutable(&format!("rename '{}'", old)));
        }

        tracing::trace!(old, new, "renaming entry");
        self.root.rename(old, new)
    }

    /// Set the traversal order of the top-level entries
    ///
    /// Fails with `ImmutableRegistry` once frozen, `OrderAlreadySet` on a
    /// second call.
    pub fn set_order(&mut self, order: impl Into<OrderSpec>) -> Result<(), StructureError> {
        if self.is_frozen() {
            return Err(StructureError::immutable("set the order"));
        }
        self.root.set_order(order)
    }

    /// Compute the layout and make the registry read-only
    ///
    /// A second call fails with `AlreadyFrozen`.
    pub fn freeze(&mut self) -> Result<&Layout, StructureError> {
        if self.layout.is_some() {
            return Err(StructureError::AlreadyFrozen);
        }

        let layout = {
            let visits = Resolver::new(self.config).resolve(&self.root)?;
            Layout::from_leaves(
                visits
                    .into_iter()
                    .map(|visit| (visit.path, visit.leaf.shape().clone())),
            )?
        };

        tracing::debug!(
            leaves = layout.leaves.len(),
            total_numel = layout.total_numel,
            total_nnz = layout.total_nnz,
            "registry frozen"
        );
        Ok(self.layout.insert(layout))
    }

    /// The frozen layout, or `RegistryNotFrozen`
    pub fn layout(&self) -> Result<&Layout, StructureError> {
        self.layout.as_ref().ok_or(StructureError::RegistryNotFrozen)
    }

    pub fn total_numel(&self) -> Result<usize, StructureError> {
        Ok(self.layout()?.total_numel)
    }

    pub fn total_nnz(&self) -> Result<usize, StructureError> {
        Ok(self.layout()?.total_nnz)
    }

    pub(crate) fn locate(&self, path: &Path) -> Result<Target<'_, E>, StructureError> {
        let mut target = Target::Group(&self.root);

        for (depth, token) in path.tokens().iter().enumerate() {
            let here = || path.prefix(depth + 1);
            target = match (target, token) {
                (Target::Group(group), PathToken::Name(name)) => group
                    .get(name)
                    .map(Target::from_node)
                    .ok_or_else(|| {
                        StructureError::not_found(here(), format!("no entry named '{}'", name))
                    })?,
                (Target::List(items), PathToken::Index(index)) => items
                    .get(*index)
                    .map(Target::from_node)
                    .ok_or_else(|| {
                        StructureError::not_found(
                            here(),
                            format!("index {} out of range for a list of {}", index, items.len()),
                        )
                    })?,
                (Target::Leaf(leaf), &PathToken::Cell(row, col)) => {
                    if row >= leaf.shape().rows() || col >= leaf.shape().cols() {
                        return Err(StructureError::not_found(
                            here(),
                            format!("cell ({}, {}) outside {} leaf", row, col, leaf.shape()),
                        ));
                    }
                    Target::Cell { leaf, row, col }
                }
                (Target::Leaf(leaf), &PathToken::Element(index)) => {
                    let (row, col) = leaf.shape().cell_at_linear(index).ok_or_else(|| {
                        StructureError::not_found(
                            here(),
                            format!("element {} outside {} leaf", index, leaf.shape()),
                        )
                    })?;
                    Target::Cell { leaf, row, col }
                }
                (Target::Group(_), _) => {
                    return Err(StructureError::not_found(here(), "groups are entered by name"))
                }
                (Target::List(_), _) => {
                    return Err(StructureError::not_found(here(), "lists are entered by index"))
                }
                (Target::Leaf(_), _) => {
                    return Err(StructureError::not_found(
                        here(),
                        "leaves are entered by cell or element",
                    ))
                }
                (Target::Cell { .. }, _) => {
                    return Err(StructureError::not_found(here(), "cannot descend into a cell"))
                }
            };
        }

        Ok(target)
    }

    /// Follow `path` from the root
    ///
    /// Works in either state. Fails with `PathNotFound` if a token does not
    /// resolve at its level.
    pub fn lookup(&self, path: &Path) -> Result<Resolved<'_, E>, StructureError> {
        Ok(match self.locate(path)? {
            Target::Group(group) => Resolved::Group(group),
            Target::List(items) => Resolved::List(items),
            Target::Leaf(leaf) => Resolved::Leaf(leaf),
            Target::Cell { leaf, row, col } => match leaf.element(row, col) {
                Some(element) => Resolved::Element(element),
                None => Resolved::StructuralZero,
            },
        })
    }

    /// Path that `lookup` needs to reach the flat nonzero position `index`
    ///
    /// 1x1 leaves are addressed by their own path; other leaves get a
    /// trailing cell token.
    pub fn reverse_lookup(&self, index: usize) -> Result<Path, StructureError> {
        let layout = self.layout()?;
        let (leaf, local) = layout.nonzero_at(index).ok_or_else(|| {
            StructureError::not_found(
                format!("#{}", index),
                format!("nonzero index out of range (total {})", layout.total_nnz),
            )
        })?;

        let slot = &layout.leaves[leaf];
        if slot.shape.numel() == 1 {
            return Ok(slot.path.clone());
        }
        let (row, col) = slot.shape.cells()[local];
        Ok(slot.path.clone().cell(row, col))
    }

    fn leaf_at(&self, path: &Path) -> Result<&Leaf<E>, StructureError> {
        match self.locate(path)? {
            Target::Leaf(leaf) => Ok(leaf),
            _ => Err(StructureError::not_found(path, "does not address a leaf")),
        }
    }

    /// Every cell in layout order, structural zeros included
    pub fn flatten_dense(&self) -> Result<Vec<DenseEntry<'_, E>>, StructureError> {
        let layout = self.layout()?;
        let mut entries = Vec::with_capacity(layout.total_numel);

        for slot in &layout.leaves {
            let leaf = self.leaf_at(&slot.path)?;
            entries.extend(slot.shape.dense_to_nz().into_iter().map(|nz| match nz {
                Some(k) => DenseEntry::Present(&leaf.elements()[k]),
                None => DenseEntry::StructuralZero,
            }));
        }

        Ok(entries)
    }

    /// Every structurally present element in layout order
    pub fn flatten_nonzero(&self) -> Result<Vec<&E>, StructureError> {
        let layout = self.layout()?;
        let mut elements = Vec::with_capacity(layout.total_nnz);

        for slot in &layout.leaves {
            elements.extend(self.leaf_at(&slot.path)?.elements().iter());
        }

        Ok(elements)
    }

    /// `(numel_offset, nnz_offset)` of a leaf, a cell, or a subtree
    ///
    /// For a cell, the nonzero offset is where the cell sits or would sit in
    /// the nonzero flattening. For a group or list, the offsets of its first
    /// leaf in visitation order.
    pub fn offset_of(&self, path: &Path) -> Result<(usize, usize), StructureError> {
        let layout = self.layout()?;

        match self.locate(path)? {
            Target::Leaf(_) => {
                let slot = self.slot(layout, path)?;
                Ok((slot.numel_offset, slot.nnz_offset))
            }
            Target::Cell { row, col, .. } => {
                let slot = self.slot(layout, &path.prefix(path.len() - 1))?;
                let before = slot
                    .shape
                    .cells()
                    .partition_point(|&(r, c)| (c, r) < (col, row));
                Ok((
                    slot.numel_offset + slot.shape.linear_index(row, col),
                    slot.nnz_offset + before,
                ))
            }
            Target::Group(_) | Target::List(_) => layout
                .leaves_under(path)
                .map(|(_, slot)| (slot.numel_offset, slot.nnz_offset))
                .min()
                .ok_or_else(|| StructureError::not_found(path, "subtree has no leaves")),
        }
    }

    /// Position of a leaf in visitation order
    pub fn leaf_index(&self, path: &Path) -> Result<usize, StructureError> {
        let layout = self.layout()?;
        self.leaf_at(path)?;
        layout
            .index_of(path)
            .ok_or_else(|| StructureError::not_found(path, "leaf missing from layout"))
    }

    /// Global nonzero indices of every present cell under `path`
    pub fn nonzero_indices(&self, path: &Path) -> Result<Vec<usize>, StructureError> {
        let layout = self.layout()?;

        match self.locate(path)? {
            Target::Cell { leaf, row, col } => {
                let slot = self.slot(layout, &path.prefix(path.len() - 1))?;
                Ok(leaf
                    .shape()
                    .nz_index(row, col)
                    .map(|k| slot.nnz_offset + k)
                    .into_iter()
                    .collect())
            }
            _ => Ok(layout
                .leaves_under(path)
                .flat_map(|(_, slot)| slot.nnz_offset..slot.nnz_offset + slot.shape.nnz())
                .collect()),
        }
    }

    /// Global nonzero index of every cell of a leaf, `None` at structural zeros
    pub fn index_matrix(&self, path: &Path) -> Result<Array2<Option<usize>>, StructureError> {
        let layout = self.layout()?;
        self.leaf_at(path)?;
        let slot = self.slot(layout, path)?;

        Ok(Array2::from_shape_fn(
            (slot.shape.rows(), slot.shape.cols()),
            |(row, col)| slot.shape.nz_index(row, col).map(|k| slot.nnz_offset + k),
        ))
    }

    fn slot<'l>(&self, layout: &'l Layout, path: &Path) -> Result<&'l LeafSlot, StructureError> {
        layout
            .slot(path)
            .ok_or_else(|| StructureError::not_found(path, "leaf missing from layout"))
    }

    /// Save the frozen layout to a JSON file
    pub fn save_layout_json<P: AsRef<std::path::Path>>(&self, path: P) -> crate::Result<()> {
        let layout = self.layout()?;
        let file = File::create(path)?;
        serde_json::to_writer_pretty(file, layout)?;
        Ok(())
    }
}

impl<E> Default for Registry<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> From<Registry<E>> for TreeNode<E> {
    /// Compose a registry into a parent as a group that keeps its order
    fn from(registry: Registry<E>) -> Self {
        TreeNode::Group(registry.root)
    }
}
