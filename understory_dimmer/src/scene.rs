// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! An in-memory reference [`Backend`](crate::Backend).
//!
//! ## Overview
//!
//! [`Scene`] is a minimal retained surface tree: generational ids, parent/child links, frames in
//! parent-local coordinates, and a constraint table. It resolves the small set of constraints the
//! dimmer emits (edge pins, fixed dimensions, centring) in [`Scene::layout`] and records fade
//! transitions instead of animating them.
//!
//! It is useful for tests and for toolkits that want to see what the dimmer asks of them before
//! writing their own backend.
//!
//! ```
//! use kurbo::Rect;
//! use understory_dimmer::scene::Scene;
//! use understory_dimmer::{DimOptions, Dimmer, Direction};
//!
//! let mut scene = Scene::new();
//! let host = scene.insert(None, Rect::new(0.0, 0.0, 100.0, 50.0));
//! let mut dimmer = Dimmer::new();
//!
//! dimmer.dim(&mut scene, host, DimOptions::new(Direction::FromBottom).with_ratio(0.2)).unwrap();
//! scene.layout();
//!
//! let overlay = dimmer.dimmer_surface(host).unwrap();
//! assert_eq!(scene.frame(overlay), Some(Rect::new(0.0, 40.0, 100.0, 50.0)));
//! ```

use alloc::collections::BTreeMap;
use alloc::vec::Vec;

use kurbo::{Rect, Size};

use crate::attachment::TeardownTicket;
use crate::backend::{ConstraintLayout, SurfaceTree};
use crate::constraint::{Constraint, ConstraintId, ConstraintKind};
use crate::types::{ActivityStyle, Axis, Edge};

/// Identifier for a surface in a [`Scene`] (slot index and generation).
///
/// A stale id never aliases a surface inserted later into the same slot.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, PartialOrd, Ord)]
pub struct SurfaceId(u32, u32);

impl SurfaceId {
    const fn idx(self) -> usize {
        self.0 as usize
    }
}

/// What a surface is.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum SurfaceKind {
    /// An ordinary surface created by the application.
    Plain,
    /// An opaque black dimming overlay.
    Overlay,
    /// A loading spinner.
    Activity {
        /// Spinner style.
        style: ActivityStyle,
        /// Whether [`SurfaceTree::start_animating`] has been called.
        animating: bool,
    },
}

/// A recorded (not animated) fade transition.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Transition {
    /// `surface` was inserted with a fade-in.
    FadeIn(SurfaceId),
    /// `surface` started fading out; `ticket` completes when the fade finishes.
    FadeOut {
        /// Fading surface.
        surface: SurfaceId,
        /// Ticket to report on completion.
        ticket: TeardownTicket,
    },
}

/// Intrinsic spinner size for `style`, in points.
pub fn intrinsic_size(style: ActivityStyle) -> Size {
    match style {
        ActivityStyle::Gray | ActivityStyle::White => Size::new(20.0, 20.0),
        ActivityStyle::WhiteLarge => Size::new(37.0, 37.0),
    }
}

#[derive(Clone, Debug)]
struct Surface {
    generation: u32,
    parent: Option<SurfaceId>,
    children: Vec<SurfaceId>,
    kind: SurfaceKind,
    frame: Rect,
    alpha: f64,
    hidden: bool,
}

impl Surface {
    fn new(generation: u32, kind: SurfaceKind, frame: Rect, alpha: f64) -> Self {
        Self {
            generation,
            parent: None,
            children: Vec::new(),
            kind,
            frame,
            alpha,
            hidden: false,
        }
    }
}

/// In-memory surface tree with a constraint table.
#[derive(Debug, Default)]
pub struct Scene {
    surfaces: Vec<Option<Surface>>,
    generations: Vec<u32>,
    free_list: Vec<usize>,
    constraints: BTreeMap<ConstraintId, Constraint<SurfaceId>>,
    transitions: Vec<Transition>,
    installs: usize,
    constant_updates: usize,
}

impl Scene {
    /// Create an empty scene.
    pub fn new() -> Self {
        Self::default()
    }

    fn allocate(&mut self, surface: impl FnOnce(u32) -> Surface) -> SurfaceId {
        let idx = match self.reuse_slot() {
            Some(idx) => idx,
            None => {
                self.surfaces.push(None);
                self.generations.push(1);
                self.surfaces.len() - 1
            }
        };
        let generation = self.generations[idx];
        self.surfaces[idx] = Some(surface(generation));
        #[allow(
            clippy::cast_possible_truncation,
            reason = "SurfaceId uses 32-bit indices by design."
        )]
        let slot = idx as u32;
        SurfaceId(slot, generation)
    }

    /// Pop a free slot and bump its generation.
    ///
    /// A slot whose generation is exhausted is retired and never handed out again.
    fn reuse_slot(&mut self) -> Option<usize> {
        while let Some(idx) = self.free_list.pop() {
            if let Some(generation) = self.generations[idx].checked_add(1) {
                self.generations[idx] = generation;
                return Some(idx);
            }
        }
        None
    }

    /// Insert a plain surface with `frame` (parent-local) under `parent`, or as a root.
    pub fn insert(&mut self, parent: Option<SurfaceId>, frame: Rect) -> SurfaceId {
        let id = self.allocate(|g| Surface::new(g, SurfaceKind::Plain, frame, 1.0));
        if let Some(p) = parent {
            self.link(p, id);
        }
        id
    }

    /// Remove a surface and its subtree, along with constraints on them.
    pub fn remove(&mut self, id: SurfaceId) {
        if !self.is_alive(id) {
            return;
        }
        self.unlink(id);
        let mut stack = Vec::from([id]);
        while let Some(cur) = stack.pop() {
            if let Some(s) = self.surfaces[cur.idx()].take() {
                stack.extend(s.children);
                self.free_list.push(cur.idx());
            }
        }
        let dead: Vec<_> = self
            .constraints
            .iter()
            .filter(|(_, c)| !self.is_alive(c.item))
            .map(|(k, _)| *k)
            .collect();
        for k in dead {
            self.constraints.remove(&k);
        }
    }

    /// Number of slots ever allocated, live or free.
    pub fn slot_count(&self) -> usize {
        self.surfaces.len()
    }

    /// Number of live surfaces.
    pub fn live_count(&self) -> usize {
        self.surfaces.iter().flatten().count()
    }

    /// Whether `id` refers to a live surface.
    pub fn is_alive(&self, id: SurfaceId) -> bool {
        self.get(id).is_some()
    }

    fn get(&self, id: SurfaceId) -> Option<&Surface> {
        self.surfaces
            .get(id.idx())?
            .as_ref()
            .filter(|s| s.generation == id.1)
    }

    fn get_mut(&mut self, id: SurfaceId) -> Option<&mut Surface> {
        self.surfaces
            .get_mut(id.idx())?
            .as_mut()
            .filter(|s| s.generation == id.1)
    }

    fn link(&mut self, parent: SurfaceId, child: SurfaceId) {
        if !self.is_alive(parent) {
            return;
        }
        self.unlink(child);
        if let Some(c) = self.get_mut(child) {
            c.parent = Some(parent);
        } else {
            return;
        }
        if let Some(p) = self.get_mut(parent) {
            p.children.push(child);
        }
    }

    fn unlink(&mut self, child: SurfaceId) {
        let Some(parent) = self.get_mut(child).and_then(|c| c.parent.take()) else {
            return;
        };
        if let Some(p) = self.get_mut(parent) {
            p.children.retain(|c| *c != child);
        }
    }

    /// Resize a surface, keeping its origin.
    pub fn set_size(&mut self, id: SurfaceId, size: Size) {
        if let Some(s) = self.get_mut(id) {
            s.frame = Rect::from_origin_size(s.frame.origin(), size);
        }
    }

    /// Hide or show a surface.
    pub fn set_hidden(&mut self, id: SurfaceId, hidden: bool) {
        if let Some(s) = self.get_mut(id) {
            s.hidden = hidden;
        }
    }

    /// Parent-local frame.
    pub fn frame(&self, id: SurfaceId) -> Option<Rect> {
        self.get(id).map(|s| s.frame)
    }

    /// Drawing alpha.
    pub fn alpha(&self, id: SurfaceId) -> Option<f64> {
        self.get(id).map(|s| s.alpha)
    }

    /// Kind of surface.
    pub fn kind(&self, id: SurfaceId) -> Option<SurfaceKind> {
        self.get(id).map(|s| s.kind)
    }

    /// Parent, if attached.
    pub fn parent(&self, id: SurfaceId) -> Option<SurfaceId> {
        self.get(id)?.parent
    }

    /// Children in insertion (back to front) order.
    pub fn children(&self, id: SurfaceId) -> &[SurfaceId] {
        self.get(id).map(|s| s.children.as_slice()).unwrap_or(&[])
    }

    /// Look up an installed constraint.
    pub fn constraint(&self, id: ConstraintId) -> Option<&Constraint<SurfaceId>> {
        self.constraints.get(&id)
    }

    /// All installed constraints, ordered by id.
    pub fn constraints(&self) -> impl Iterator<Item = &Constraint<SurfaceId>> {
        self.constraints.values()
    }

    /// Installed constraints on `item`.
    pub fn constraints_on(&self, item: SurfaceId) -> impl Iterator<Item = &Constraint<SurfaceId>> {
        self.constraints.values().filter(move |c| c.item == item)
    }

    /// Number of [`ConstraintLayout::install`] calls so far.
    pub fn install_count(&self) -> usize {
        self.installs
    }

    /// Number of [`ConstraintLayout::set_constant`] calls so far.
    pub fn constant_update_count(&self) -> usize {
        self.constant_updates
    }

    /// Transitions started and not yet drained.
    pub fn transitions(&self) -> &[Transition] {
        &self.transitions
    }

    /// Finish every pending transition and return the fade-out tickets to report back.
    pub fn drain_completed(&mut self) -> Vec<TeardownTicket> {
        self.transitions
            .drain(..)
            .filter_map(|t| match t {
                Transition::FadeOut { ticket, .. } => Some(ticket),
                Transition::FadeIn(_) => None,
            })
            .collect()
    }

    /// Resolve the frames of every constrained surface from its installed constraints.
    ///
    /// Surfaces without constraints keep their frame. Detached surfaces are skipped.
    pub fn layout(&mut self) {
        let items: Vec<SurfaceId> = {
            let mut v: Vec<_> = self.constraints.values().map(|c| c.item).collect();
            v.sort_unstable();
            v.dedup();
            v
        };
        for item in items {
            let Some(parent) = self.parent(item) else {
                continue;
            };
            let Some(parent_size) = self.frame(parent).map(|r| r.size()) else {
                continue;
            };
            let Some(current) = self.frame(item) else {
                continue;
            };
            let intrinsic = match self.kind(item) {
                Some(SurfaceKind::Activity { style, .. }) => intrinsic_size(style),
                _ => current.size(),
            };
            let frame = resolve(
                self.constraints_on(item),
                parent_size,
                intrinsic,
                current,
            );
            if let Some(s) = self.get_mut(item) {
                s.frame = frame;
            }
        }
    }
}

/// Per-axis constraint summary.
#[derive(Default)]
struct Span {
    min: Option<f64>,
    max: Option<f64>,
    extent: Option<f64>,
    center: bool,
}

impl Span {
    fn resolve(&self, parent: f64, intrinsic: f64, current: (f64, f64)) -> (f64, f64) {
        match (self.min, self.max, self.extent) {
            (Some(a), Some(b), _) => (a, b),
            (Some(a), None, Some(e)) => (a, a + e),
            (None, Some(b), Some(e)) => (b - e, b),
            (Some(a), None, None) => (a, a + intrinsic),
            (None, Some(b), None) => (b - intrinsic, b),
            (None, None, extent) if self.center => {
                let e = extent.unwrap_or(intrinsic);
                let a = (parent - e) / 2.0;
                (a, a + e)
            }
            (None, None, Some(e)) => (current.0, current.0 + e),
            (None, None, None) => current,
        }
    }
}

fn resolve<'a>(
    constraints: impl Iterator<Item = &'a Constraint<SurfaceId>>,
    parent: Size,
    intrinsic: Size,
    current: Rect,
) -> Rect {
    let mut h = Span::default();
    let mut v = Span::default();
    for c in constraints {
        match c.kind {
            ConstraintKind::Pin { edge, inset } => match edge {
                Edge::Left => h.min = Some(inset),
                Edge::Right => h.max = Some(parent.width - inset),
                Edge::Top => v.min = Some(inset),
                Edge::Bottom => v.max = Some(parent.height - inset),
            },
            ConstraintKind::Dimension { axis, constant } => match axis {
                Axis::Width => h.extent = Some(constant),
                Axis::Height => v.extent = Some(constant),
            },
            ConstraintKind::Center => {
                h.center = true;
                v.center = true;
            }
        }
    }
    let (x0, x1) = h.resolve(parent.width, intrinsic.width, (current.x0, current.x1));
    let (y0, y1) = v.resolve(parent.height, intrinsic.height, (current.y0, current.y1));
    Rect::new(x0, y0, x1, y1)
}

impl SurfaceTree for Scene {
    type SurfaceId = SurfaceId;

    fn size(&self, surface: SurfaceId) -> Size {
        self.frame(surface).map(|r| r.size()).unwrap_or(Size::ZERO)
    }

    fn is_hidden(&self, surface: SurfaceId) -> bool {
        self.get(surface).is_none_or(|s| s.hidden)
    }

    fn create_overlay(&mut self, alpha: f64) -> SurfaceId {
        self.allocate(|g| Surface::new(g, SurfaceKind::Overlay, Rect::ZERO, alpha))
    }

    fn create_activity_indicator(&mut self, style: ActivityStyle) -> SurfaceId {
        let kind = SurfaceKind::Activity {
            style,
            animating: false,
        };
        let frame = Rect::from_origin_size((0.0, 0.0), intrinsic_size(style));
        self.allocate(|g| Surface::new(g, kind, frame, 1.0))
    }

    fn start_animating(&mut self, activity: SurfaceId) {
        if let Some(Surface {
            kind: SurfaceKind::Activity { animating, .. },
            ..
        }) = self.get_mut(activity)
        {
            *animating = true;
        }
    }

    fn fade_in(&mut self, parent: SurfaceId, child: SurfaceId) {
        self.link(parent, child);
        self.transitions.push(Transition::FadeIn(child));
    }

    fn fade_out(&mut self, child: SurfaceId, ticket: TeardownTicket) {
        self.transitions.push(Transition::FadeOut {
            surface: child,
            ticket,
        });
    }

    fn remove_from_parent(&mut self, child: SurfaceId) {
        self.unlink(child);
    }

    fn discard(&mut self, surface: SurfaceId) {
        self.remove(surface);
    }
}

impl ConstraintLayout for Scene {
    fn install(&mut self, constraints: &[Constraint<SurfaceId>]) {
        self.installs += 1;
        for c in constraints {
            self.constraints.insert(c.id, c.clone());
        }
    }

    fn uninstall(&mut self, constraints: &[Constraint<SurfaceId>]) {
        for c in constraints {
            self.constraints.remove(&c.id);
        }
    }

    fn set_constant(&mut self, id: ConstraintId, value: f64) {
        self.constant_updates += 1;
        if let Some(Constraint {
            kind: ConstraintKind::Dimension { constant, .. },
            ..
        }) = self.constraints.get_mut(&id)
        {
            *constant = value;
        }
    }
}
