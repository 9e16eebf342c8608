//! Tree nodes: leaves, positional lists and named groups
//!
//! A [`Group`] is an insertion-ordered collection of named [`TreeNode`]s with
//! an optional [`OrderSpec`] of its own. Lists are positional and carry no
//! names; they are reached with `Index` path tokens.

use crate::structure::error::StructureError;
use crate::structure::leaf::Leaf;
use crate::structure::order::{OrderItem, OrderSpec};
use crate::structure::path::is_identifier;
use std::collections::HashMap;

/// A node of a registry tree
#[derive(Debug, Clone, PartialEq)]
pub enum TreeNode<E> {
    /// A single shaped quantity
    Leaf(Leaf<E>),

    /// Positional, unnamed children
    List(Vec<TreeNode<E>>),

    /// Named children with their own traversal order
    Group(Group<E>),
}

impl<E> TreeNode<E> {
    pub fn as_leaf(&self) -> Option<&Leaf<E>> {
        match self {
            TreeNode::Leaf(leaf) => Some(leaf),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[TreeNode<E>]> {
        match self {
            TreeNode::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_group(&self) -> Option<&Group<E>> {
        match self {
            TreeNode::Group(group) => Some(group),
            _ => None,
        }
    }

    /// Number of leaves in this subtree
    pub fn leaf_count(&self) -> usize {
        match self {
            TreeNode::Leaf(_) => 1,
            TreeNode::List(items) => items.iter().map(TreeNode::leaf_count).sum(),
            TreeNode::Group(group) => group.iter().map(|(_, node)| node.leaf_count()).sum(),
        }
    }

    /// Total number of cells in this subtree
    pub fn numel(&self) -> usize {
        self.fold_leaves(0, &|acc, leaf| acc + leaf.shape().numel())
    }

    /// Total number of present cells in this subtree
    pub fn nnz(&self) -> usize {
        self.fold_leaves(0, &|acc, leaf| acc + leaf.shape().nnz())
    }

    fn fold_leaves<F>(&self, init: usize, f: &F) -> usize
    where
        F: Fn(usize, &Leaf<E>) -> usize,
    {
        match self {
            TreeNode::Leaf(leaf) => f(init, leaf),
            TreeNode::List(items) => items.iter().fold(init, |acc, n| n.fold_leaves(acc, f)),
            TreeNode::Group(group) => group
                .iter()
                .fold(init, |acc, (_, n)| n.fold_leaves(acc, f)),
        }
    }
}

impl<E> From<Leaf<E>> for TreeNode<E> {
    fn from(leaf: Leaf<E>) -> Self {
        TreeNode::Leaf(leaf)
    }
}

impl<E> From<Group<E>> for TreeNode<E> {
    fn from(group: Group<E>) -> Self {
        TreeNode::Group(group)
    }
}

impl<E, T> From<Vec<T>> for TreeNode<E>
where
    T: Into<TreeNode<E>>,
{
    fn from(items: Vec<T>) -> Self {
        TreeNode::List(items.into_iter().map(Into::into).collect())
    }
}

/// Insertion-ordered named children plus an optional traversal order
#[derive(Debug, Clone, PartialEq)]
pub struct Group<E> {
    entries: Vec<(String, TreeNode<E>)>,
    /// Name -> position in `entries`
    positions: HashMap<String, usize>,
    order: Option<OrderSpec>,
}

impl<E> Group<E> {
    /// Create an empty group
    ///
    /// # Examples
    ///
    /// ```
    /// use varstruct_rs::structure::{Group, Leaf, Symbol};
    ///
    /// let mut group: Group<Symbol> = Group::new();
    /// group.attach("a", Leaf::scalar("a")).unwrap();
    /// assert!(group.attach("a", Leaf::scalar("other")).is_err());
    /// assert_eq!(group.len(), 1);
    /// ```
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            positions: HashMap::new(),
            order: None,
        }
    }

    /// Attach a named child
    ///
    /// Fails with `DuplicateName` if `name` is taken, or `InvalidPath` if
    /// `name` could not be written in a path.
    pub fn attach(
        &mut self,
        name: &str,
        node: impl Into<TreeNode<E>>,
    ) -> Result<(), StructureError> {
        if !is_identifier(name) {
            return Err(StructureError::InvalidPath {
                input: name.to_string(),
                message: "entry names must be identifiers".to_string(),
            });
        }
        if self.contains(name) {
            return Err(StructureError::DuplicateName {
                name: name.to_string(),
            });
        }

        self.positions.insert(name.to_string(), self.entries.len());
        self.entries.push((name.to_string(), node.into()));
        Ok(())
    }

    /// Rename a child, keeping its position and any order that mentions it
    pub fn rename(&mut self, old: &str, new: &str) -> Result<(), StructureError> {
        let position = self
            .position(old)
            .ok_or_else(|| StructureError::not_found(old, "no entry with this name"))?;
        if old == new {
            return Ok(());
        }
        if !is_identifier(new) {
            return Err(StructureError::InvalidPath {
                input: new.to_string(),
                message: "entry names must be identifiers".to_string(),
            });
        }
        if self.contains(new) {
            return Err(StructureError::DuplicateName {
                name: new.to_string(),
            });
        }

        self.positions.remove(old);
        self.positions.insert(new.to_string(), position);
        self.entries[position].0 = new.to_string();
        if let Some(order) = self.order.as_mut() {
            order.rename(old, new);
        }
        Ok(())
    }

    /// Set the traversal order of this group's children
    ///
    /// Fails with `OrderAlreadySet` on a second call. Names are checked when
    /// the owning registry is frozen.
    pub fn set_order(&mut self, order: impl Into<OrderSpec>) -> Result<(), StructureError> {
        if self.order.is_some() {
            return Err(StructureError::OrderAlreadySet);
        }
        self.order = Some(order.into());
        Ok(())
    }

    pub fn order(&self) -> Option<&OrderSpec> {
        self.order.as_ref()
    }

    pub fn get(&self, name: &str) -> Option<&TreeNode<E>> {
        self.position(name).map(|position| &self.entries[position].1)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.position(name).is_some()
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.positions.get(name).copied()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Names in insertion order
    pub fn names(&self) -> Vec<String> {
        self.entries.iter().map(|(n, _)| n.clone()).collect()
    }

    /// Entries in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &TreeNode<E>)> {
        self.entries.iter().map(|(n, node)| (n.as_str(), node))
    }

    /// Names the order spec mentions, in the spec's order
    pub(crate) fn ordered_names(&self) -> Vec<&str> {
        self.order
            .iter()
            .flat_map(|order| order.items())
            .flat_map(|item| match item {
                OrderItem::Name(name) => std::slice::from_ref(name),
                OrderItem::Interleave(names) => names.as_slice(),
            })
            .map(String::as_str)
            .collect()
    }
}

impl<E> Default for Group<E> {
    fn default() -> Self {
        Self::new()
    }
}
