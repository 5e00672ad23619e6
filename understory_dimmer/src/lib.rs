// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

// After you edit the crate's doc comment, run this command, then check README.md for any missing links
// cargo rdme --workspace-project=understory_dimmer --heading-base-level=0

//! Understory Dimmer: dimming overlays and loading indicators for retained UI surfaces.
//!
//! ## Overview
//!
//! [`Dimmer`] attaches a semi-transparent black overlay, and optionally a spinning activity
//! indicator, to any host surface of a retained-mode UI tree. Overlays either cover the whole
//! host or reveal from one edge by a ratio of the host's size.
//!
//! The dimmer keeps a side table from host to [`Attachment`]: the overlay, the indicator, the
//! current ratio, and the exact constraints installed to position them. Repeated calls update
//! that record in place; teardown removes every surface and constraint it installed.
//!
//! ## Not a toolkit
//!
//! This crate does not draw, animate, or solve layout. A toolkit provides those through
//! [`SurfaceTree`] (containment and fades) and [`ConstraintLayout`] (constraint installation).
//! The [`scene`] module has a small in-memory implementation for tests and prototyping.
//!
//! ## Operations
//!
//! - [`Dimmer::dim`]: create the overlay on first use, otherwise update its ratio.
//! - [`Dimmer::undim`] → [`TeardownTicket`], then [`Dimmer::complete_teardown`] when the
//!   toolkit's fade-out finishes.
//! - [`Dimmer::show_loading`] / [`Dimmer::hide_loading`]: solid dim plus a centred indicator.
//! - [`Dimmer::is_dimming`], [`Dimmer::is_loading`], [`Dimmer::dimming_ratio`].
//! - [`Dimmer::replace_dimmer`] / [`Dimmer::replace_activity`]: adopt caller-provided surfaces.
//!
//! Ratios and alphas outside `[0, 1]` are rejected with [`DimmerError`].
//!
//! ## Example
//!
//! ```
//! use kurbo::Rect;
//! use understory_dimmer::scene::Scene;
//! use understory_dimmer::{ActivityStyle, DimOptions, Dimmer, Direction};
//!
//! let mut scene = Scene::new();
//! let host = scene.insert(None, Rect::new(0.0, 0.0, 100.0, 50.0));
//! let mut dimmer = Dimmer::new();
//!
//! // Reveal from the top, half way.
//! dimmer.dim(&mut scene, host, DimOptions::new(Direction::FromTop).with_ratio(0.5)).unwrap();
//! scene.layout();
//! let overlay = dimmer.dimmer_surface(host).unwrap();
//! assert_eq!(scene.frame(overlay), Some(Rect::new(0.0, 0.0, 100.0, 25.0)));
//!
//! // Grow to 80% without recreating the overlay.
//! dimmer.dim(&mut scene, host, DimOptions::new(Direction::FromTop).with_ratio(0.8)).unwrap();
//! assert_eq!(dimmer.dimmer_surface(host), Some(overlay));
//! assert_eq!(dimmer.dimming_ratio(host), 0.8);
//!
//! // Show a spinner, then tear everything down once the fade-out completes.
//! dimmer.show_loading(&mut scene, host, 0.4, ActivityStyle::Gray).unwrap();
//! assert!(dimmer.is_loading(host));
//! dimmer.hide_loading(&mut scene, host).unwrap();
//! for ticket in scene.drain_completed() {
//!     dimmer.complete_teardown(&mut scene, ticket).unwrap();
//! }
//! assert!(!dimmer.is_dimming(&scene, host));
//! assert!(scene.children(host).is_empty());
//! ```
//!
//! ## Logging
//!
//! Attachment lifecycle events are reported through the [`log`] facade at `debug` and `trace`
//! level. Stale teardown completions and restarts during teardown are logged at `warn`.
//!
//! This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

mod attachment;
mod backend;
mod constraint;
mod dimmer;
mod error;
pub mod scene;
mod types;

pub use attachment::{Attachment, Phase, SizeConstraint, TeardownTicket};
pub use backend::{Backend, ConstraintLayout, SurfaceTree};
pub use constraint::{
    Constraint, ConstraintBuilder, ConstraintId, ConstraintIdAllocator, ConstraintKind,
    ConstraintSet,
};
pub use dimmer::Dimmer;
pub use error::DimmerError;
pub use types::{
    ActivityStyle, Axis, DEFAULT_ALPHA, DimOptions, DimmerConfig, Direction, Edge, Edges,
};
