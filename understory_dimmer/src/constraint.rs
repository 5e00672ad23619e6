// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Layout constraints as plain data.
//!
//! The dimmer never solves constraints. It builds [`ConstraintSet`]s without installing them,
//! hands them to a [`ConstraintLayout`](crate::ConstraintLayout) backend, and keeps a copy so the
//! exact installed set can be removed again later.
//!
//! ```
//! use understory_dimmer::{Axis, ConstraintBuilder, ConstraintIdAllocator, Edges};
//!
//! let mut ids = ConstraintIdAllocator::default();
//! let mut builder = ConstraintBuilder::new(&mut ids);
//! builder.pin_edges(7_u32, Edges::TOP | Edges::LEFT | Edges::RIGHT);
//! let height = builder.set_dimension(7, Axis::Height, 25.0);
//! let set = builder.finish();
//!
//! assert_eq!(set.len(), 4);
//! assert_eq!(set.constant(height), Some(25.0));
//! ```

use alloc::vec::Vec;

use crate::types::{Axis, Edge, Edges};

/// Identifier of a constraint, unique per [`ConstraintIdAllocator`].
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, PartialOrd, Ord)]
pub struct ConstraintId(u64);

/// Hands out fresh [`ConstraintId`]s.
///
/// Ids are 64-bit and never reused, so an id still installed in a backend is
/// never handed out again.
#[derive(Clone, Debug, Default)]
pub struct ConstraintIdAllocator {
    next: u64,
}

impl ConstraintIdAllocator {
    /// Allocate the next id.
    pub fn allocate(&mut self) -> ConstraintId {
        let id = ConstraintId(self.next);
        self.next += 1;
        id
    }
}

/// What a constraint asks of its item.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum ConstraintKind {
    /// Align `edge` of the item with the same edge of its parent, `inset` points inward.
    Pin {
        /// Edge being aligned.
        edge: Edge,
        /// Inward distance from the parent's edge.
        inset: f64,
    },
    /// Fix the item's extent along `axis`. The constant can be changed after install.
    Dimension {
        /// Constrained axis.
        axis: Axis,
        /// Extent in parent units.
        constant: f64,
    },
    /// Centre the item in its parent at its intrinsic size.
    Center,
}

/// A single constraint on `item`, relative to the item's parent.
#[derive(Clone, Debug, PartialEq)]
pub struct Constraint<Id> {
    /// Identifier used to uninstall or retune the constraint.
    pub id: ConstraintId,
    /// Constrained surface.
    pub item: Id,
    /// The relation.
    pub kind: ConstraintKind,
}

/// An ordered set of constraints.
#[derive(Clone, Debug, PartialEq)]
pub struct ConstraintSet<Id> {
    constraints: Vec<Constraint<Id>>,
}

impl<Id> Default for ConstraintSet<Id> {
    fn default() -> Self {
        Self {
            constraints: Vec::new(),
        }
    }
}

impl<Id> ConstraintSet<Id> {
    /// Create an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of constraints.
    pub fn len(&self) -> usize {
        self.constraints.len()
    }

    /// Whether the set holds no constraints.
    pub fn is_empty(&self) -> bool {
        self.constraints.is_empty()
    }

    /// The constraints in insertion order.
    pub fn as_slice(&self) -> &[Constraint<Id>] {
        &self.constraints
    }

    /// Iterate the constraints in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &Constraint<Id>> {
        self.constraints.iter()
    }

    /// Look up a constraint by id.
    pub fn get(&self, id: ConstraintId) -> Option<&Constraint<Id>> {
        self.constraints.iter().find(|c| c.id == id)
    }

    /// The constant of a [`ConstraintKind::Dimension`] constraint.
    pub fn constant(&self, id: ConstraintId) -> Option<f64> {
        match self.get(id)?.kind {
            ConstraintKind::Dimension { constant, .. } => Some(constant),
            _ => None,
        }
    }

    /// Update the constant of a [`ConstraintKind::Dimension`] constraint.
    ///
    /// Returns `false` when `id` is missing or not a dimension.
    pub fn set_constant(&mut self, id: ConstraintId, value: f64) -> bool {
        match self.constraints.iter_mut().find(|c| c.id == id) {
            Some(Constraint {
                kind: ConstraintKind::Dimension { constant, .. },
                ..
            }) => {
                *constant = value;
                true
            }
            _ => false,
        }
    }

    /// Append all constraints of `other`.
    pub fn extend(&mut self, other: Self) {
        self.constraints.extend(other.constraints);
    }
}

/// Builds a [`ConstraintSet`] without installing it.
#[derive(Debug)]
pub struct ConstraintBuilder<'a, Id> {
    ids: &'a mut ConstraintIdAllocator,
    set: ConstraintSet<Id>,
}

impl<'a, Id: Copy> ConstraintBuilder<'a, Id> {
    /// Start an empty set, drawing ids from `ids`.
    pub fn new(ids: &'a mut ConstraintIdAllocator) -> Self {
        Self {
            ids,
            set: ConstraintSet::new(),
        }
    }

    fn push(&mut self, item: Id, kind: ConstraintKind) -> ConstraintId {
        let id = self.ids.allocate();
        self.set.constraints.push(Constraint { id, item, kind });
        id
    }

    /// Pin each of `edges` of `item` flush with its parent.
    pub fn pin_edges(&mut self, item: Id, edges: Edges) -> &mut Self {
        for edge in edges.edges() {
            self.push(item, ConstraintKind::Pin { edge, inset: 0.0 });
        }
        self
    }

    /// Pin every edge of `item` except `excluded`.
    pub fn pin_edges_excluding(&mut self, item: Id, excluded: Edge) -> &mut Self {
        self.pin_edges(item, Edges::ALL - Edges::from(excluded))
    }

    /// Fix `item`'s extent along `axis`, returning the id for later retuning.
    pub fn set_dimension(&mut self, item: Id, axis: Axis, constant: f64) -> ConstraintId {
        self.push(item, ConstraintKind::Dimension { axis, constant })
    }

    /// Centre `item` in its parent.
    pub fn center(&mut self, item: Id) -> &mut Self {
        self.push(item, ConstraintKind::Center);
        self
    }

    /// Finish building.
    pub fn finish(self) -> ConstraintSet<Id> {
        self.set
    }
}
