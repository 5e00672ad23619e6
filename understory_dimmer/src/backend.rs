// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Capabilities the dimmer consumes from the host toolkit.
//!
//! ## Overview
//!
//! The dimmer does not render, lay out, or animate anything itself. A toolkit
//! exposes its surface tree through [`SurfaceTree`] and its constraint solver
//! through [`ConstraintLayout`]. Anything implementing both is a [`Backend`].
//!
//! ## Transitions
//!
//! [`SurfaceTree::fade_in`] and [`SurfaceTree::fade_out`] start visual transitions and
//! return immediately. When a fade-out finishes, the toolkit hands the
//! [`TeardownTicket`] it was given back to
//! [`Dimmer::complete_teardown`](crate::Dimmer::complete_teardown).

use core::fmt::Debug;

use kurbo::Size;

use crate::attachment::TeardownTicket;
use crate::constraint::{Constraint, ConstraintId};
use crate::types::ActivityStyle;

/// Surface containment and the per-surface queries the dimmer needs.
pub trait SurfaceTree {
    /// Handle of a surface. Must stay stable while the surface is alive.
    type SurfaceId: Copy + Ord + Debug;

    /// Current size of `surface`, used to turn ratios into extents.
    fn size(&self, surface: Self::SurfaceId) -> Size;

    /// Whether `surface` is hidden. Hidden overlays do not count as dimming.
    fn is_hidden(&self, surface: Self::SurfaceId) -> bool;

    /// Create a detached, opaque black surface drawn at `alpha`.
    fn create_overlay(&mut self, alpha: f64) -> Self::SurfaceId;

    /// Create a detached, stopped activity indicator.
    fn create_activity_indicator(&mut self, style: ActivityStyle) -> Self::SurfaceId;

    /// Start the spinning animation of an activity indicator.
    fn start_animating(&mut self, activity: Self::SurfaceId);

    /// Insert `child` as the topmost child of `parent` and fade it in.
    fn fade_in(&mut self, parent: Self::SurfaceId, child: Self::SurfaceId);

    /// Start fading `child` out. Report `ticket` when the fade finishes.
    fn fade_out(&mut self, child: Self::SurfaceId, ticket: TeardownTicket);

    /// Detach `child` from its parent immediately.
    fn remove_from_parent(&mut self, child: Self::SurfaceId);

    /// Release `surface` and anything it still owns.
    ///
    /// Only called for surfaces this toolkit created through
    /// [`create_overlay`](Self::create_overlay) or
    /// [`create_activity_indicator`](Self::create_activity_indicator), after they
    /// have been detached. The id is never used again afterwards.
    fn discard(&mut self, surface: Self::SurfaceId);
}

/// Constraint installation over the surfaces of a [`SurfaceTree`].
///
/// Solving is entirely up to the implementor.
pub trait ConstraintLayout: SurfaceTree {
    /// Install every constraint in `constraints`.
    fn install(&mut self, constraints: &[Constraint<Self::SurfaceId>]);

    /// Remove every constraint in `constraints`. Unknown ids are ignored.
    fn uninstall(&mut self, constraints: &[Constraint<Self::SurfaceId>]);

    /// Change the constant of an installed dimension constraint.
    fn set_constant(&mut self, id: ConstraintId, constant: f64);
}

/// A full host toolkit: surfaces plus constraints over the same ids.
pub trait Backend: ConstraintLayout {}

impl<T: ConstraintLayout> Backend for T {}
