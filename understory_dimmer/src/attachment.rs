// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The per-host attachment record.

use crate::constraint::{ConstraintId, ConstraintSet};
use crate::types::{Axis, Direction};

/// Identifies one pending teardown.
///
/// Returned by [`Dimmer::undim`](crate::Dimmer::undim) and passed to the backend's fade-out.
/// Tickets are never reused, so a completion that arrives after the teardown was
/// superseded is recognised as stale.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, PartialOrd, Ord)]
pub struct TeardownTicket(pub(crate) u64);

/// Lifecycle of an attachment.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Phase {
    /// Installed and accepting ratio updates.
    Active,
    /// The overlay is fading out; the record is cleared when `ticket` completes.
    TearingDown(TeardownTicket),
}

/// The directional sizing constraint of an overlay.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct SizeConstraint {
    /// Installed constraint id.
    pub id: ConstraintId,
    /// Axis it constrains.
    pub axis: Axis,
}

/// Overlay state the [`Dimmer`](crate::Dimmer) tracks for one host surface.
///
/// Surfaces the dimmer created itself are discarded through the backend on
/// teardown. Surfaces adopted through `replace_dimmer` / `replace_activity`
/// belong to the caller and are only detached.
#[derive(Clone, Debug)]
pub struct Attachment<Id> {
    pub(crate) dimmer: Option<Id>,
    pub(crate) activity: Option<Id>,
    pub(crate) owns_dimmer: bool,
    pub(crate) owns_activity: bool,
    pub(crate) ratio: f64,
    pub(crate) direction: Direction,
    pub(crate) constraints: ConstraintSet<Id>,
    pub(crate) size_constraint: Option<SizeConstraint>,
    pub(crate) phase: Phase,
}

impl<Id> Default for Attachment<Id> {
    fn default() -> Self {
        Self {
            dimmer: None,
            activity: None,
            owns_dimmer: false,
            owns_activity: false,
            ratio: 0.0,
            direction: Direction::Solid,
            constraints: ConstraintSet::new(),
            size_constraint: None,
            phase: Phase::Active,
        }
    }
}

impl<Id: Copy + PartialEq> Attachment<Id> {
    /// The overlay surface.
    pub fn dimmer(&self) -> Option<Id> {
        self.dimmer
    }

    /// The activity indicator surface.
    pub fn activity(&self) -> Option<Id> {
        self.activity
    }

    /// Current reveal fraction.
    pub fn ratio(&self) -> f64 {
        self.ratio
    }

    /// Direction fixed when the overlay was created.
    pub fn direction(&self) -> Direction {
        self.direction
    }

    /// Every constraint currently installed for the overlay and indicator.
    pub fn constraints(&self) -> &ConstraintSet<Id> {
        &self.constraints
    }

    /// The directional sizing constraint, if any.
    pub fn size_constraint(&self) -> Option<SizeConstraint> {
        self.size_constraint
    }

    /// The sizing constraint when it constrains width.
    pub fn width_constraint(&self) -> Option<ConstraintId> {
        self.size_constraint
            .filter(|c| c.axis == Axis::Width)
            .map(|c| c.id)
    }

    /// The sizing constraint when it constrains height.
    pub fn height_constraint(&self) -> Option<ConstraintId> {
        self.size_constraint
            .filter(|c| c.axis == Axis::Height)
            .map(|c| c.id)
    }

    /// Lifecycle phase.
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Whether a fade-out is pending.
    pub fn is_tearing_down(&self) -> bool {
        matches!(self.phase, Phase::TearingDown(_))
    }

    /// Whether an indicator is attached and the ratio is positive.
    pub fn is_loading(&self) -> bool {
        self.activity.is_some() && self.ratio > 0.0
    }

    /// Whether the record holds no surfaces at all.
    pub(crate) fn is_vacant(&self) -> bool {
        self.dimmer.is_none() && self.activity.is_none()
    }

    /// Decide what happens when `slot` is assigned `new`.
    pub(crate) fn replacement(slot: Option<Id>, new: Option<Id>) -> Replacement {
        match (slot, new) {
            (Some(old), Some(new)) if old == new => Replacement::Unchanged,
            (None, None) => Replacement::Unchanged,
            (None, Some(_)) => Replacement::Fill,
            (Some(_), _) => Replacement::TearDown,
        }
    }
}

/// Outcome of assigning a surface slot.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub(crate) enum Replacement {
    /// Same surface, or still empty.
    Unchanged,
    /// The slot was empty; record the new surface and keep the rest.
    Fill,
    /// A different surface occupied the slot; the whole record is torn down first.
    TearDown,
}
