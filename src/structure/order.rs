//! Traversal orders and their resolution into a leaf sequence
//!
//! An [`OrderSpec`] lists the children of a group either by bare name (visit
//! the whole subtree contiguously) or as an interleave tuple (merge the named
//! children slot by slot). The resolver turns a root group and its nested
//! orders into the definitive depth-first leaf sequence used at freeze time.
//!
//! Slots of a child are its own top-level visitation units: the items of a
//! list, the resolved units of a group (honouring that group's order), or
//! the child itself for a leaf.

use crate::config::{OrderPolicy, RegistryConfig};
use crate::structure::error::StructureError;
use crate::structure::leaf::Leaf;
use crate::structure::node::{Group, TreeNode};
use crate::structure::path::{Path, PathToken};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

/// One entry of an order spec
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrderItem {
    /// Visit this child's subtree contiguously
    Name(String),

    /// Visit these children element by element
    Interleave(Vec<String>),
}

impl From<&str> for OrderItem {
    fn from(name: &str) -> Self {
        OrderItem::Name(name.to_string())
    }
}

impl From<String> for OrderItem {
    fn from(name: String) -> Self {
        OrderItem::Name(name)
    }
}

/// Requested traversal order for the children of a group
///
/// # Examples
///
/// ```
/// use varstruct_rs::structure::{OrderItem, OrderSpec};
///
/// let order = OrderSpec::new().then("x").interleave(["y", "z"]);
/// assert_eq!(order.items().len(), 2);
/// assert_eq!(order.to_string(), "[x, (y, z)]");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderSpec {
    items: Vec<OrderItem>,
}

impl OrderSpec {
    pub fn new() -> Self {
        Self { items: Vec::new() }
    }

    /// Append a bare name
    pub fn then(mut self, name: impl Into<String>) -> Self {
        self.items.push(OrderItem::Name(name.into()));
        self
    }

    /// Append an interleave tuple
    pub fn interleave<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.items
            .push(OrderItem::Interleave(names.into_iter().map(Into::into).collect()));
        self
    }

    pub fn push(&mut self, item: OrderItem) {
        self.items.push(item);
    }

    pub fn items(&self) -> &[OrderItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub(crate) fn rename(&mut self, old: &str, new: &str) {
        for item in &mut self.items {
            let names = match item {
                OrderItem::Name(name) => std::slice::from_mut(name),
                OrderItem::Interleave(names) => names.as_mut_slice(),
            };
            for name in names.iter_mut().filter(|n| n.as_str() == old) {
                *name = new.to_string();
            }
        }
    }
}

impl From<Vec<OrderItem>> for OrderSpec {
    fn from(items: Vec<OrderItem>) -> Self {
        Self { items }
    }
}

impl FromIterator<OrderItem> for OrderSpec {
    fn from_iter<I: IntoIterator<Item = OrderItem>>(iter: I) -> Self {
        Self {
            items: iter.into_iter().collect(),
        }
    }
}

impl fmt::Display for OrderSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for (i, item) in self.items.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            match item {
                OrderItem::Name(name) => write!(f, "{}", name)?,
                OrderItem::Interleave(names) => write!(f, "({})", names.join(", "))?,
            }
        }
        write!(f, "]")
    }
}

/// A leaf reached by the resolver, with the path that addresses it
#[derive(Debug)]
pub(crate) struct Visit<'a, E> {
    pub path: Path,
    pub leaf: &'a Leaf<E>,
}

/// A subtree scheduled for contiguous visitation
struct Unit<'a, E> {
    path: Path,
    node: &'a TreeNode<E>,
}

/// Resolves groups and their order specs into leaf sequences
pub(crate) struct Resolver {
    config: RegistryConfig,
}

impl Resolver {
    pub(crate) fn new(config: RegistryConfig) -> Self {
        Self { config }
    }

    /// The definitive leaf sequence of `root`
    pub(crate) fn resolve<'a, E>(
        &self,
        root: &'a Group<E>,
    ) -> Result<Vec<Visit<'a, E>>, StructureError> {
        let mut visits = Vec::new();
        for unit in self.units(root, &Path::new())? {
            self.visit(&unit, &mut visits)?;
        }
        Ok(visits)
    }

    fn units<'a, E>(
        &self,
        group: &'a Group<E>,
        prefix: &Path,
    ) -> Result<Vec<Unit<'a, E>>, StructureError> {
        let Some(order) = group.order() else {
            return Ok(group
                .iter()
                .map(|(name, node)| Unit {
                    path: prefix.join(PathToken::Name(name.to_string())),
                    node,
                })
                .collect());
        };

        let mut seen = HashSet::new();
        for name in group.ordered_names() {
            if !seen.insert(name) {
                return Err(StructureError::DuplicateName {
                    name: prefix.join(PathToken::Name(name.to_string())).to_string(),
                });
            }
        }

        let mut units = Vec::with_capacity(group.len());
        for item in order.items() {
            match item {
                OrderItem::Name(name) => units.push(child(group, prefix, name)?),
                OrderItem::Interleave(names) => {
                    units.extend(self.interleave(group, prefix, names)?)
                }
            }
        }

        let omitted: Vec<&str> = group
            .iter()
            .map(|(name, _)| name)
            .filter(|name| !seen.contains(name))
            .collect();
        if !omitted.is_empty() {
            match self.config.order_policy {
                OrderPolicy::RequireComplete => {
                    return Err(StructureError::IncompleteOrder {
                        missing: omitted
                            .iter()
                            .map(|name| prefix.join(PathToken::Name(name.to_string())).to_string())
                            .collect(),
                    });
                }
                OrderPolicy::AppendOmitted => {
                    tracing::debug!(
                        group = %prefix,
                        order = %order,
                        omitted = ?omitted,
                        "appending names omitted from order"
                    );
                    for name in omitted {
                        units.push(child(group, prefix, name)?);
                    }
                }
            }
        }

        Ok(units)
    }

    fn slots<'a, E>(&self, unit: Unit<'a, E>) -> Result<Vec<Unit<'a, E>>, StructureError> {
        match unit.node {
            TreeNode::Leaf(_) => Ok(vec![unit]),
            TreeNode::List(items) => Ok(items
                .iter()
                .enumerate()
                .map(|(i, node)| Unit {
                    path: unit.path.join(PathToken::Index(i)),
                    node,
                })
                .collect()),
            TreeNode::Group(group) => self.units(group, &unit.path),
        }
    }

    fn interleave<'a, E>(
        &self,
        group: &'a Group<E>,
        prefix: &Path,
        names: &[String],
    ) -> Result<Vec<Unit<'a, E>>, StructureError> {
        let mut columns = Vec::with_capacity(names.len());
        for name in names {
            columns.push(self.slots(child(group, prefix, name)?)?);
        }

        let counts: Vec<usize> = columns.iter().map(Vec::len).collect();
        if !self.config.interleave_policy.accepts(&counts) {
            return Err(StructureError::IncompatibleInterleave {
                names: names
                    .iter()
                    .map(|name| prefix.join(PathToken::Name(name.clone())).to_string())
                    .collect(),
                counts,
            });
        }

        let rounds = counts.iter().copied().max().unwrap_or(0);
        let total = counts.iter().sum();
        let mut columns: Vec<_> = columns.into_iter().map(Vec::into_iter).collect();
        let mut merged = Vec::with_capacity(total);
        for _ in 0..rounds {
            for column in columns.iter_mut() {
                if let Some(unit) = column.next() {
                    merged.push(unit);
                }
            }
        }

        Ok(merged)
    }

    fn visit<'a, E>(
        &self,
        unit: &Unit<'a, E>,
        visits: &mut Vec<Visit<'a, E>>,
    ) -> Result<(), StructureError> {
        match unit.node {
            TreeNode::Leaf(leaf) => visits.push(Visit {
                path: unit.path.clone(),
                leaf,
            }),
            TreeNode::List(items) => {
                for (i, node) in items.iter().enumerate() {
                    let item = Unit {
                        path: unit.path.join(PathToken::Index(i)),
                        node,
                    };
                    self.visit(&item, visits)?;
                }
            }
            TreeNode::Group(group) => {
                for item in self.units(group, &unit.path)? {
                    self.visit(&item, visits)?;
                }
            }
        }
        Ok(())
    }
}

fn child<'a, E>(
    group: &'a Group<E>,
    prefix: &Path,
    name: &str,
) -> Result<Unit<'a, E>, StructureError> {
    let path = prefix.join(PathToken::Name(name.to_string()));
    match group.get(name) {
        Some(node) => Ok(Unit { path, node }),
        None => Err(StructureError::not_found(
            path,
            "order names an entry that is not attached",
        )),
    }
}
