// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The overlay attachment manager.

use alloc::collections::BTreeMap;

use log::{debug, trace, warn};

use crate::attachment::{Attachment, Phase, Replacement, SizeConstraint, TeardownTicket};
use crate::backend::{Backend, SurfaceTree};
use crate::constraint::{ConstraintBuilder, ConstraintIdAllocator};
use crate::error::DimmerError;
use crate::types::{ActivityStyle, DimOptions, DimmerConfig, Direction};

/// Tracks dimming overlays and loading indicators attached to host surfaces.
///
/// A side table maps each host to at most one [`Attachment`]. Hosts without an
/// attachment are simply absent.
///
/// ## Teardown
///
/// Undimming is two-phase. [`Dimmer::undim`] starts the overlay's fade-out and
/// returns a [`TeardownTicket`]; the toolkit calls [`Dimmer::complete_teardown`]
/// with that ticket when the fade finishes, and only then are the surfaces and
/// constraints removed.
///
/// Dimming a host whose teardown is still pending cancels and restarts: the old
/// overlay is removed immediately, a fresh one is created, and the old ticket
/// becomes stale.
#[derive(Debug)]
pub struct Dimmer<Id> {
    attachments: BTreeMap<Id, Attachment<Id>>,
    pending: BTreeMap<TeardownTicket, Id>,
    constraint_ids: ConstraintIdAllocator,
    next_ticket: u64,
    config: DimmerConfig,
}

impl<Id: Copy + Ord + core::fmt::Debug> Default for Dimmer<Id> {
    fn default() -> Self {
        Self::new()
    }
}

impl<Id: Copy + Ord + core::fmt::Debug> Dimmer<Id> {
    /// Create a manager with the default [`DimmerConfig`].
    pub fn new() -> Self {
        Self::with_config(DimmerConfig::default())
    }

    /// Create a manager with `config`.
    pub fn with_config(config: DimmerConfig) -> Self {
        Self {
            attachments: BTreeMap::new(),
            pending: BTreeMap::new(),
            constraint_ids: ConstraintIdAllocator::default(),
            next_ticket: 0,
            config,
        }
    }

    /// The configuration in use.
    pub fn config(&self) -> &DimmerConfig {
        &self.config
    }

    /// The attachment record of `host`.
    pub fn attachment(&self, host: Id) -> Option<&Attachment<Id>> {
        self.attachments.get(&host)
    }

    /// The overlay surface attached to `host`.
    pub fn dimmer_surface(&self, host: Id) -> Option<Id> {
        self.attachments.get(&host)?.dimmer
    }

    /// The activity indicator attached to `host`.
    pub fn activity_surface(&self, host: Id) -> Option<Id> {
        self.attachments.get(&host)?.activity
    }

    /// Current reveal fraction of `host`, `0.0` when nothing is attached.
    pub fn dimming_ratio(&self, host: Id) -> f64 {
        self.attachments.get(&host).map_or(0.0, |a| a.ratio)
    }

    /// Whether `host` has a visible overlay with a positive ratio.
    ///
    /// Stays true while a fade-out is pending.
    pub fn is_dimming<B>(&self, backend: &B, host: Id) -> bool
    where
        B: SurfaceTree<SurfaceId = Id>,
    {
        self.attachments.get(&host).is_some_and(|a| {
            a.dimmer
                .is_some_and(|d| !backend.is_hidden(d) && a.ratio > 0.0)
        })
    }

    /// Whether `host` has an activity indicator and a positive ratio.
    pub fn is_loading(&self, host: Id) -> bool {
        self.attachments
            .get(&host)
            .is_some_and(Attachment::is_loading)
    }

    /// Whether `host` is waiting for [`Dimmer::complete_teardown`].
    pub fn is_tearing_down(&self, host: Id) -> bool {
        self.attachments
            .get(&host)
            .is_some_and(Attachment::is_tearing_down)
    }

    /// Dim `host`, creating the overlay on first use. Returns the applied ratio.
    ///
    /// On an existing overlay only the ratio is updated; the stored direction and
    /// alpha win over `options`.
    pub fn dim<B>(
        &mut self,
        backend: &mut B,
        host: Id,
        options: DimOptions,
    ) -> Result<f64, DimmerError>
    where
        B: Backend<SurfaceId = Id>,
    {
        options.validate()?;
        let phase = self.attachments.get(&host).map(|a| a.phase);
        if let Some(Phase::TearingDown(ticket)) = phase {
            warn!("dim on {host:?} while teardown {ticket:?} is pending; restarting");
            self.detach(backend, host);
        }
        if self.attachments.get(&host).is_none_or(|a| a.dimmer.is_none()) {
            self.attach_overlay(backend, host, options);
        }
        Ok(self.update_ratio(backend, host, options.ratio))
    }

    /// [`Dimmer::dim`], then hand the applied ratio to `completion`.
    pub fn dim_with<B>(
        &mut self,
        backend: &mut B,
        host: Id,
        options: DimOptions,
        completion: impl FnOnce(f64),
    ) -> Result<(), DimmerError>
    where
        B: Backend<SurfaceId = Id>,
    {
        let ratio = self.dim(backend, host, options)?;
        completion(ratio);
        Ok(())
    }

    fn attach_overlay<B>(&mut self, backend: &mut B, host: Id, options: DimOptions)
    where
        B: Backend<SurfaceId = Id>,
    {
        let overlay = backend.create_overlay(options.alpha);
        backend.fade_in(host, overlay);

        let direction = options.direction;
        let mut builder = ConstraintBuilder::new(&mut self.constraint_ids);
        builder.pin_edges(overlay, direction.pinned_edges());
        let size_constraint = direction.axis().map(|axis| {
            let constant = axis.of(backend.size(host)) * options.ratio;
            let id = builder.set_dimension(overlay, axis, constant);
            SizeConstraint { id, axis }
        });
        let constraints = builder.finish();

        let attachment = self.attachments.entry(host).or_default();
        attachment.dimmer = Some(overlay);
        attachment.owns_dimmer = true;
        attachment.direction = direction;
        attachment.size_constraint = size_constraint;
        attachment.phase = Phase::Active;
        if !attachment.constraints.is_empty() {
            let stale = attachment.constraints.len();
            trace!("removing {stale} stale constraints on {host:?}");
            backend.uninstall(attachment.constraints.as_slice());
        }
        trace!("installing {} constraints on {host:?}", constraints.len());
        backend.install(constraints.as_slice());
        attachment.constraints = constraints;
        debug!("attached {direction:?} overlay {overlay:?} to {host:?}");
    }

    fn update_ratio<B>(&mut self, backend: &mut B, host: Id, ratio: f64) -> f64
    where
        B: Backend<SurfaceId = Id>,
    {
        let size = backend.size(host);
        let Some(attachment) = self.attachments.get_mut(&host) else {
            return 0.0;
        };
        #[allow(clippy::float_cmp, reason = "Any change in ratio is applied.")]
        let changed = attachment.ratio != ratio;
        if changed {
            if let Some(c) = attachment.size_constraint {
                let constant = c.axis.of(size) * ratio;
                backend.set_constant(c.id, constant);
                attachment.constraints.set_constant(c.id, constant);
            }
            debug!("{host:?} ratio {} -> {ratio}", attachment.ratio);
            attachment.ratio = ratio;
        }
        attachment.ratio
    }

    /// Begin fading out the overlay of `host`.
    ///
    /// Returns `None` without side effects when `host` has no overlay or is already
    /// tearing down.
    pub fn undim<B>(&mut self, backend: &mut B, host: Id) -> Option<TeardownTicket>
    where
        B: Backend<SurfaceId = Id>,
    {
        let attachment = self.attachments.get_mut(&host)?;
        if attachment.is_tearing_down() {
            return None;
        }
        let overlay = attachment.dimmer?;
        let ticket = TeardownTicket(self.next_ticket);
        self.next_ticket += 1;
        attachment.phase = Phase::TearingDown(ticket);
        self.pending.insert(ticket, host);
        debug!("tearing down {host:?} with {ticket:?}");
        backend.fade_out(overlay, ticket);
        Some(ticket)
    }

    /// Finish the teardown started by [`Dimmer::undim`] once its fade-out has ended.
    ///
    /// Removes the overlay and indicator, uninstalls their constraints, discards
    /// the surfaces the dimmer created, and clears the host's record.
    pub fn complete_teardown<B>(
        &mut self,
        backend: &mut B,
        ticket: TeardownTicket,
    ) -> Result<(), DimmerError>
    where
        B: Backend<SurfaceId = Id>,
    {
        let Some(host) = self.pending.remove(&ticket) else {
            warn!("ignoring completion of stale teardown {ticket:?}");
            return Err(DimmerError::StaleTeardown(ticket));
        };
        if let Some(attachment) = self.attachments.remove(&host) {
            Self::tear_down(backend, host, attachment);
        }
        Ok(())
    }

    /// Dim `host` solid at full ratio and show a spinning indicator in its centre.
    pub fn show_loading<B>(
        &mut self,
        backend: &mut B,
        host: Id,
        alpha: f64,
        style: ActivityStyle,
    ) -> Result<(), DimmerError>
    where
        B: Backend<SurfaceId = Id>,
    {
        let options = DimOptions::new(Direction::Solid).with_alpha(alpha);
        self.dim(backend, host, options)?;
        let Some(attachment) = self.attachments.get_mut(&host) else {
            return Ok(());
        };
        if attachment.activity.is_some() {
            return Ok(());
        }
        let activity = backend.create_activity_indicator(style);
        backend.fade_in(host, activity);
        let mut builder = ConstraintBuilder::new(&mut self.constraint_ids);
        builder.center(activity);
        let centre = builder.finish();
        backend.install(centre.as_slice());
        attachment.constraints.extend(centre);
        backend.start_animating(activity);
        attachment.activity = Some(activity);
        attachment.owns_activity = true;
        debug!("showing {style:?} activity {activity:?} on {host:?}");
        Ok(())
    }

    /// [`Dimmer::show_loading`] with the configured alpha and style.
    pub fn show_loading_default<B>(
        &mut self,
        backend: &mut B,
        host: Id,
    ) -> Result<(), DimmerError>
    where
        B: Backend<SurfaceId = Id>,
    {
        let DimmerConfig {
            default_alpha,
            activity_style,
        } = self.config;
        self.show_loading(backend, host, default_alpha, activity_style)
    }

    /// Fade out the overlay and indicator together. Same as [`Dimmer::undim`].
    pub fn hide_loading<B>(&mut self, backend: &mut B, host: Id) -> Option<TeardownTicket>
    where
        B: Backend<SurfaceId = Id>,
    {
        self.undim(backend, host)
    }

    /// Assign the overlay surface of `host` directly.
    ///
    /// Assigning the current surface does nothing. Assigning a different surface, or
    /// `None`, first tears down the whole attachment without a transition. A surface
    /// assigned here starts at ratio `0.0` with no constraints; placing it is up to
    /// the caller. It stays the caller's: teardown detaches it but never discards it.
    pub fn replace_dimmer<B>(&mut self, backend: &mut B, host: Id, surface: Option<Id>)
    where
        B: Backend<SurfaceId = Id>,
    {
        let current = self.dimmer_surface(host);
        self.replace(backend, host, current, surface, |a, s| {
            a.dimmer = Some(s);
            a.owns_dimmer = false;
        });
    }

    /// Assign the activity surface of `host` directly, with the policy of
    /// [`Dimmer::replace_dimmer`].
    pub fn replace_activity<B>(&mut self, backend: &mut B, host: Id, surface: Option<Id>)
    where
        B: Backend<SurfaceId = Id>,
    {
        let current = self.activity_surface(host);
        self.replace(backend, host, current, surface, |a, s| {
            a.activity = Some(s);
            a.owns_activity = false;
        });
    }

    fn replace<B>(
        &mut self,
        backend: &mut B,
        host: Id,
        current: Option<Id>,
        surface: Option<Id>,
        assign: impl FnOnce(&mut Attachment<Id>, Id),
    ) where
        B: Backend<SurfaceId = Id>,
    {
        match Attachment::replacement(current, surface) {
            Replacement::Unchanged => return,
            Replacement::Fill => {}
            Replacement::TearDown => {
                debug!("replacing surfaces of {host:?}");
                self.detach(backend, host);
            }
        }
        if let Some(s) = surface {
            assign(self.attachments.entry(host).or_default(), s);
        }
    }

    /// Drop the attachment of `host` immediately, without a transition.
    ///
    /// Call this when the host itself goes away. Any pending teardown ticket for the
    /// host becomes stale.
    pub fn forget<B>(&mut self, backend: &mut B, host: Id)
    where
        B: Backend<SurfaceId = Id>,
    {
        self.detach(backend, host);
    }

    fn detach<B>(&mut self, backend: &mut B, host: Id)
    where
        B: Backend<SurfaceId = Id>,
    {
        let Some(attachment) = self.attachments.remove(&host) else {
            return;
        };
        if let Phase::TearingDown(ticket) = attachment.phase {
            self.pending.remove(&ticket);
        }
        Self::tear_down(backend, host, attachment);
    }

    fn tear_down<B>(backend: &mut B, host: Id, attachment: Attachment<Id>)
    where
        B: Backend<SurfaceId = Id>,
    {
        if attachment.is_vacant() && attachment.constraints.is_empty() {
            return;
        }
        if let Some(d) = attachment.dimmer {
            backend.remove_from_parent(d);
        }
        if let Some(a) = attachment.activity {
            backend.remove_from_parent(a);
        }
        if !attachment.constraints.is_empty() {
            let count = attachment.constraints.len();
            trace!("uninstalling {count} constraints on {host:?}");
            backend.uninstall(attachment.constraints.as_slice());
        }
        let owned = [
            attachment.dimmer.filter(|_| attachment.owns_dimmer),
            attachment.activity.filter(|_| attachment.owns_activity),
        ];
        for surface in owned.into_iter().flatten() {
            trace!("discarding {surface:?}");
            backend.discard(surface);
        }
        debug!("detached overlay from {host:?}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constraint::ConstraintKind;
    use crate::scene::{Scene, SurfaceId, SurfaceKind, Transition};
    use crate::types::{Axis, Edge};
    use alloc::vec::Vec;
    use kurbo::{Rect, Size};

    fn setup(width: f64, height: f64) -> (Scene, SurfaceId, Dimmer<SurfaceId>) {
        let mut scene = Scene::new();
        let host = scene.insert(None, Rect::new(0.0, 0.0, width, height));
        (scene, host, Dimmer::new())
    }

    fn finish(scene: &mut Scene, dimmer: &mut Dimmer<SurfaceId>) {
        for ticket in scene.drain_completed() {
            dimmer.complete_teardown(scene, ticket).unwrap();
        }
    }

    fn pinned(scene: &Scene, item: SurfaceId) -> Vec<Edge> {
        scene
            .constraints_on(item)
            .filter_map(|c| match c.kind {
                ConstraintKind::Pin { edge, .. } => Some(edge),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn fresh_host_is_idle() {
        let (scene, host, dimmer) = setup(100.0, 50.0);
        assert!(!dimmer.is_dimming(&scene, host));
        assert!(!dimmer.is_loading(host));
        assert_eq!(dimmer.dimming_ratio(host), 0.0);
        assert!(dimmer.attachment(host).is_none());
    }

    #[test]
    fn dim_reports_requested_ratio_for_every_direction() {
        for direction in [
            Direction::Solid,
            Direction::FromTop,
            Direction::FromLeft,
            Direction::FromBottom,
            Direction::FromRight,
        ] {
            for ratio in [0.25, 0.5, 1.0] {
                let (mut scene, host, mut dimmer) = setup(100.0, 50.0);
                let opts = DimOptions::new(direction).with_ratio(ratio);
                assert_eq!(dimmer.dim(&mut scene, host, opts), Ok(ratio));
                assert_eq!(dimmer.dimming_ratio(host), ratio);
                assert!(dimmer.is_dimming(&scene, host), "{direction:?} at {ratio}");
            }
        }
    }

    #[test]
    fn solid_dim_pins_all_edges() {
        let (mut scene, host, mut dimmer) = setup(100.0, 50.0);
        dimmer.dim(&mut scene, host, DimOptions::default()).unwrap();
        let overlay = dimmer.dimmer_surface(host).unwrap();

        assert_eq!(scene.kind(overlay), Some(SurfaceKind::Overlay));
        assert_eq!(scene.alpha(overlay), Some(0.4));
        assert_eq!(scene.parent(overlay), Some(host));
        assert_eq!(
            pinned(&scene, overlay),
            [Edge::Top, Edge::Left, Edge::Bottom, Edge::Right]
        );
        assert!(dimmer.attachment(host).unwrap().size_constraint().is_none());
        assert_eq!(scene.transitions(), &[Transition::FadeIn(overlay)]);

        scene.layout();
        assert_eq!(scene.frame(overlay), Some(Rect::new(0.0, 0.0, 100.0, 50.0)));
    }

    #[test]
    fn from_top_scenario() {
        let (mut scene, host, mut dimmer) = setup(100.0, 50.0);
        dimmer
            .dim(&mut scene, host, DimOptions::new(Direction::FromTop).with_ratio(0.5))
            .unwrap();
        let overlay = dimmer.dimmer_surface(host).unwrap();
        let attachment = dimmer.attachment(host).unwrap();
        let height = attachment.height_constraint().unwrap();
        assert!(attachment.width_constraint().is_none());
        assert_eq!(pinned(&scene, overlay), [Edge::Top, Edge::Left, Edge::Right]);
        assert_eq!(attachment.constraints().constant(height), Some(25.0));
        assert_eq!(
            scene.constraint(height).map(|c| c.kind),
            Some(ConstraintKind::Dimension {
                axis: Axis::Height,
                constant: 25.0
            })
        );
        scene.layout();
        assert_eq!(scene.frame(overlay), Some(Rect::new(0.0, 0.0, 100.0, 25.0)));

        let installs = scene.install_count();
        dimmer
            .dim(&mut scene, host, DimOptions::new(Direction::FromTop).with_ratio(0.8))
            .unwrap();
        assert_eq!(
            dimmer.dimmer_surface(host),
            Some(overlay),
            "overlay identity is kept"
        );
        assert_eq!(scene.install_count(), installs, "no new constraint set");
        assert_eq!(
            dimmer.attachment(host).unwrap().constraints().constant(height),
            Some(40.0)
        );
        scene.layout();
        assert_eq!(scene.frame(overlay), Some(Rect::new(0.0, 0.0, 100.0, 40.0)));
    }

    #[test]
    fn from_right_sizes_width() {
        let (mut scene, host, mut dimmer) = setup(100.0, 50.0);
        dimmer
            .dim(&mut scene, host, DimOptions::new(Direction::FromRight).with_ratio(0.25))
            .unwrap();
        let overlay = dimmer.dimmer_surface(host).unwrap();
        assert!(dimmer.attachment(host).unwrap().width_constraint().is_some());
        scene.layout();
        assert_eq!(scene.frame(overlay), Some(Rect::new(75.0, 0.0, 100.0, 50.0)));
    }

    #[test]
    fn from_left_sizes_width() {
        let (mut scene, host, mut dimmer) = setup(100.0, 50.0);
        dimmer
            .dim(&mut scene, host, DimOptions::new(Direction::FromLeft).with_ratio(0.25))
            .unwrap();
        let overlay = dimmer.dimmer_surface(host).unwrap();
        assert!(dimmer.attachment(host).unwrap().width_constraint().is_some());
        assert_eq!(
            pinned(&scene, overlay),
            [Edge::Top, Edge::Left, Edge::Bottom],
            "right edge stays free"
        );
        scene.layout();
        assert_eq!(scene.frame(overlay), Some(Rect::new(0.0, 0.0, 25.0, 50.0)));
    }

    #[test]
    fn from_bottom_sizes_height() {
        let (mut scene, host, mut dimmer) = setup(100.0, 50.0);
        dimmer
            .dim(&mut scene, host, DimOptions::new(Direction::FromBottom).with_ratio(0.2))
            .unwrap();
        let overlay = dimmer.dimmer_surface(host).unwrap();
        assert!(dimmer.attachment(host).unwrap().height_constraint().is_some());
        scene.layout();
        assert_eq!(scene.frame(overlay), Some(Rect::new(0.0, 40.0, 100.0, 50.0)));
    }

    #[test]
    fn repeated_dim_with_same_ratio_is_a_no_op() {
        let (mut scene, host, mut dimmer) = setup(100.0, 50.0);
        let opts = DimOptions::new(Direction::FromLeft).with_ratio(0.3);
        dimmer.dim(&mut scene, host, opts).unwrap();
        let overlay = dimmer.dimmer_surface(host);
        let installs = scene.install_count();
        let updates = scene.constant_update_count();
        let constraints = scene.constraints().count();

        dimmer.dim(&mut scene, host, opts).unwrap();
        assert_eq!(dimmer.dimmer_surface(host), overlay);
        assert_eq!(scene.install_count(), installs);
        assert_eq!(scene.constant_update_count(), updates);
        assert_eq!(scene.constraints().count(), constraints);
        assert_eq!(scene.transitions().len(), 1, "only the first fade-in");
    }

    #[test]
    fn direction_is_fixed_at_creation() {
        let (mut scene, host, mut dimmer) = setup(100.0, 50.0);
        dimmer
            .dim(&mut scene, host, DimOptions::new(Direction::FromTop).with_ratio(0.5))
            .unwrap();
        dimmer
            .dim(&mut scene, host, DimOptions::new(Direction::FromLeft).with_ratio(0.2))
            .unwrap();
        let attachment = dimmer.attachment(host).unwrap();
        assert_eq!(attachment.direction(), Direction::FromTop);
        let height = attachment.height_constraint().unwrap();
        assert_eq!(
            scene.constraint(height).map(|c| c.kind),
            Some(ConstraintKind::Dimension {
                axis: Axis::Height,
                constant: 10.0
            })
        );
    }

    #[test]
    fn zero_ratio_is_not_dimming() {
        let (mut scene, host, mut dimmer) = setup(100.0, 50.0);
        dimmer
            .dim(&mut scene, host, DimOptions::new(Direction::FromTop).with_ratio(0.0))
            .unwrap();
        assert!(dimmer.dimmer_surface(host).is_some());
        assert!(!dimmer.is_dimming(&scene, host));
    }

    #[test]
    fn hidden_overlay_is_not_dimming() {
        let (mut scene, host, mut dimmer) = setup(100.0, 50.0);
        dimmer.dim(&mut scene, host, DimOptions::default()).unwrap();
        scene.set_hidden(dimmer.dimmer_surface(host).unwrap(), true);
        assert!(!dimmer.is_dimming(&scene, host));
    }

    #[test]
    fn invalid_inputs_change_nothing() {
        let (mut scene, host, mut dimmer) = setup(100.0, 50.0);
        assert_eq!(
            dimmer.dim(&mut scene, host, DimOptions::default().with_ratio(1.2)),
            Err(DimmerError::InvalidRatio(1.2))
        );
        assert_eq!(
            dimmer.show_loading(&mut scene, host, 2.0, ActivityStyle::Gray),
            Err(DimmerError::InvalidAlpha(2.0))
        );
        assert!(dimmer.attachment(host).is_none());
        assert!(scene.children(host).is_empty());
        assert!(scene.transitions().is_empty());
    }

    #[test]
    fn undim_is_two_phase() {
        let (mut scene, host, mut dimmer) = setup(100.0, 50.0);
        dimmer
            .dim(&mut scene, host, DimOptions::new(Direction::FromBottom).with_ratio(0.5))
            .unwrap();
        let overlay = dimmer.dimmer_surface(host).unwrap();
        scene.drain_completed();

        let ticket = dimmer.undim(&mut scene, host).unwrap();
        assert_eq!(
            scene.transitions(),
            &[Transition::FadeOut {
                surface: overlay,
                ticket
            }]
        );
        assert!(dimmer.is_tearing_down(host));
        assert!(dimmer.is_dimming(&scene, host), "still visible while fading");
        assert_eq!(dimmer.undim(&mut scene, host), None, "already tearing down");

        finish(&mut scene, &mut dimmer);
        assert!(!dimmer.is_dimming(&scene, host));
        assert!(dimmer.attachment(host).is_none());
        assert!(scene.children(host).is_empty());
        assert_eq!(scene.constraints().count(), 0);
        assert_eq!(dimmer.dimming_ratio(host), 0.0);
    }

    #[test]
    fn undim_on_idle_host_is_a_no_op() {
        let (mut scene, host, mut dimmer) = setup(100.0, 50.0);
        assert_eq!(dimmer.undim(&mut scene, host), None);
        assert!(scene.transitions().is_empty());
        assert!(dimmer.attachment(host).is_none());
    }

    #[test]
    fn completing_twice_is_stale() {
        let (mut scene, host, mut dimmer) = setup(100.0, 50.0);
        dimmer.dim(&mut scene, host, DimOptions::default()).unwrap();
        let ticket = dimmer.undim(&mut scene, host).unwrap();
        assert_eq!(dimmer.complete_teardown(&mut scene, ticket), Ok(()));
        assert_eq!(
            dimmer.complete_teardown(&mut scene, ticket),
            Err(DimmerError::StaleTeardown(ticket))
        );
    }

    #[test]
    fn dim_during_teardown_restarts() {
        let (mut scene, host, mut dimmer) = setup(100.0, 50.0);
        dimmer.dim(&mut scene, host, DimOptions::default()).unwrap();
        let first = dimmer.dimmer_surface(host).unwrap();
        let ticket = dimmer.undim(&mut scene, host).unwrap();

        dimmer
            .dim(&mut scene, host, DimOptions::default().with_ratio(0.6))
            .unwrap();
        let second = dimmer.dimmer_surface(host).unwrap();
        assert_ne!(first, second, "a fresh overlay replaces the fading one");
        assert_eq!(scene.parent(first), None);
        assert_eq!(scene.children(host), &[second]);
        assert!(!dimmer.is_tearing_down(host));
        assert_eq!(scene.constraints().count(), 4, "only the new overlay's pins");

        assert_eq!(
            dimmer.complete_teardown(&mut scene, ticket),
            Err(DimmerError::StaleTeardown(ticket))
        );
        assert!(dimmer.is_dimming(&scene, host), "late completion is ignored");
        assert_eq!(dimmer.dimming_ratio(host), 0.6);
    }

    #[test]
    fn teardown_discards_created_surfaces() {
        let (mut scene, host, mut dimmer) = setup(100.0, 50.0);
        dimmer.show_loading_default(&mut scene, host).unwrap();
        let overlay = dimmer.dimmer_surface(host).unwrap();
        let spinner = dimmer.activity_surface(host).unwrap();
        dimmer.hide_loading(&mut scene, host).unwrap();
        assert!(scene.is_alive(overlay), "kept alive for the fade-out");

        finish(&mut scene, &mut dimmer);
        assert!(!scene.is_alive(overlay));
        assert!(!scene.is_alive(spinner));
        assert_eq!(scene.live_count(), 1, "only the host is left");
    }

    #[test]
    fn repeated_loading_cycles_reuse_slots() {
        let (mut scene, host, mut dimmer) = setup(100.0, 50.0);
        dimmer.show_loading_default(&mut scene, host).unwrap();
        let first = dimmer.dimmer_surface(host).unwrap();
        dimmer.hide_loading(&mut scene, host).unwrap();
        finish(&mut scene, &mut dimmer);
        let slots = scene.slot_count();

        for _ in 0..1000 {
            dimmer.show_loading_default(&mut scene, host).unwrap();
            dimmer.hide_loading(&mut scene, host).unwrap();
            finish(&mut scene, &mut dimmer);
        }
        assert_eq!(scene.slot_count(), slots, "host, overlay and spinner only");
        assert_eq!(scene.live_count(), 1);
        assert!(!scene.is_alive(first));
    }

    #[test]
    fn restart_and_forget_discard_created_surfaces() {
        let (mut scene, host, mut dimmer) = setup(100.0, 50.0);
        dimmer.dim(&mut scene, host, DimOptions::default()).unwrap();
        let first = dimmer.dimmer_surface(host).unwrap();
        dimmer.undim(&mut scene, host).unwrap();
        dimmer.dim(&mut scene, host, DimOptions::default()).unwrap();
        assert!(!scene.is_alive(first), "restart discards the fading overlay");

        let second = dimmer.dimmer_surface(host).unwrap();
        dimmer.forget(&mut scene, host);
        assert!(!scene.is_alive(second));
        assert_eq!(scene.live_count(), 1);
    }

    #[test]
    fn show_loading_centres_an_animating_spinner() {
        let (mut scene, host, mut dimmer) = setup(100.0, 60.0);
        dimmer
            .show_loading(&mut scene, host, 0.5, ActivityStyle::WhiteLarge)
            .unwrap();
        assert!(dimmer.is_loading(host));
        assert!(dimmer.is_dimming(&scene, host));

        let overlay = dimmer.dimmer_surface(host).unwrap();
        let spinner = dimmer.activity_surface(host).unwrap();
        assert_eq!(scene.alpha(overlay), Some(0.5));
        assert_eq!(
            scene.kind(spinner),
            Some(SurfaceKind::Activity {
                style: ActivityStyle::WhiteLarge,
                animating: true
            })
        );
        assert_eq!(
            scene.children(host),
            &[overlay, spinner],
            "spinner above overlay"
        );
        assert_eq!(dimmer.attachment(host).unwrap().constraints().len(), 5);

        scene.layout();
        assert_eq!(scene.frame(spinner), Some(Rect::new(31.5, 11.5, 68.5, 48.5)));
    }

    #[test]
    fn show_loading_twice_keeps_one_spinner() {
        let (mut scene, host, mut dimmer) = setup(100.0, 50.0);
        dimmer.show_loading_default(&mut scene, host).unwrap();
        let spinner = dimmer.activity_surface(host);
        dimmer.show_loading_default(&mut scene, host).unwrap();
        assert_eq!(dimmer.activity_surface(host), spinner);
        assert_eq!(scene.children(host).len(), 2);
    }

    #[test]
    fn loading_over_directional_overlay_fills_ratio() {
        let (mut scene, host, mut dimmer) = setup(100.0, 50.0);
        dimmer
            .dim(&mut scene, host, DimOptions::new(Direction::FromLeft).with_ratio(0.5))
            .unwrap();
        dimmer.show_loading_default(&mut scene, host).unwrap();
        let attachment = dimmer.attachment(host).unwrap();
        let width = attachment.width_constraint().unwrap();
        assert_eq!(attachment.ratio(), 1.0);
        assert_eq!(attachment.constraints().constant(width), Some(100.0));
    }

    #[test]
    fn solid_loading_lifecycle() {
        let (mut scene, host, mut dimmer) = setup(100.0, 50.0);
        dimmer.dim(&mut scene, host, DimOptions::default()).unwrap();
        dimmer.show_loading_default(&mut scene, host).unwrap();
        assert!(dimmer.hide_loading(&mut scene, host).is_some());
        assert!(dimmer.is_loading(host), "loading until the fade completes");

        finish(&mut scene, &mut dimmer);
        assert!(dimmer.dimmer_surface(host).is_none());
        assert!(dimmer.activity_surface(host).is_none());
        assert!(!dimmer.is_dimming(&scene, host));
        assert!(!dimmer.is_loading(host));
        assert!(scene.children(host).is_empty());
        assert_eq!(scene.constraints().count(), 0);
    }

    #[test]
    fn replace_with_same_surface_is_a_no_op() {
        let (mut scene, host, mut dimmer) = setup(100.0, 50.0);
        dimmer.dim(&mut scene, host, DimOptions::default()).unwrap();
        let overlay = dimmer.dimmer_surface(host);
        dimmer.replace_dimmer(&mut scene, host, overlay);
        assert_eq!(dimmer.dimmer_surface(host), overlay);
        assert_eq!(dimmer.dimming_ratio(host), 1.0);
        assert_eq!(scene.constraints().count(), 4);
    }

    #[test]
    fn replace_with_other_surface_tears_down() {
        let (mut scene, host, mut dimmer) = setup(100.0, 50.0);
        dimmer.show_loading_default(&mut scene, host).unwrap();
        let old = dimmer.dimmer_surface(host).unwrap();
        let custom = scene.insert(Some(host), Rect::new(0.0, 0.0, 100.0, 10.0));

        dimmer.replace_dimmer(&mut scene, host, Some(custom));
        assert_eq!(dimmer.dimmer_surface(host), Some(custom));
        assert_eq!(dimmer.activity_surface(host), None, "whole record torn down");
        assert_eq!(dimmer.dimming_ratio(host), 0.0);
        assert!(!scene.is_alive(old));
        assert_eq!(scene.constraints().count(), 0);
        assert!(!dimmer.is_dimming(&scene, host));

        // A later dim only updates the ratio of the adopted surface.
        dimmer.dim(&mut scene, host, DimOptions::default()).unwrap();
        assert_eq!(dimmer.dimmer_surface(host), Some(custom));
        assert!(dimmer.is_dimming(&scene, host));
    }

    #[test]
    fn replace_into_empty_slot_keeps_the_rest() {
        let (mut scene, host, mut dimmer) = setup(100.0, 50.0);
        let spinner = scene.insert(Some(host), Rect::ZERO);
        dimmer.replace_activity(&mut scene, host, Some(spinner));
        assert_eq!(dimmer.activity_surface(host), Some(spinner));
        assert!(!dimmer.is_loading(host), "ratio is still zero");

        dimmer.dim(&mut scene, host, DimOptions::default()).unwrap();
        assert_eq!(dimmer.activity_surface(host), Some(spinner));
        assert!(dimmer.is_loading(host));

        let overlay = dimmer.dimmer_surface(host).unwrap();
        dimmer.replace_activity(&mut scene, host, None);
        assert!(dimmer.attachment(host).is_none());
        assert!(scene.children(host).is_empty());
        assert!(!scene.is_alive(overlay));
        assert!(scene.is_alive(spinner), "adopted surfaces are only detached");
    }

    #[test]
    fn adopted_surfaces_survive_teardown() {
        let (mut scene, host, mut dimmer) = setup(100.0, 50.0);
        let custom = scene.insert(Some(host), Rect::new(0.0, 0.0, 100.0, 10.0));
        dimmer.replace_dimmer(&mut scene, host, Some(custom));
        dimmer.dim(&mut scene, host, DimOptions::default()).unwrap();

        dimmer.undim(&mut scene, host).unwrap();
        finish(&mut scene, &mut dimmer);
        assert!(dimmer.attachment(host).is_none());
        assert!(scene.is_alive(custom));
        assert_eq!(scene.parent(custom), None);
    }

    #[test]
    fn replace_during_teardown_drops_ticket() {
        let (mut scene, host, mut dimmer) = setup(100.0, 50.0);
        dimmer.dim(&mut scene, host, DimOptions::default()).unwrap();
        let ticket = dimmer.undim(&mut scene, host).unwrap();
        dimmer.replace_dimmer(&mut scene, host, None);
        assert!(dimmer.attachment(host).is_none());
        assert!(dimmer.complete_teardown(&mut scene, ticket).is_err());
    }

    #[test]
    fn forget_clears_without_transition() {
        let (mut scene, host, mut dimmer) = setup(100.0, 50.0);
        dimmer.show_loading_default(&mut scene, host).unwrap();
        scene.drain_completed();
        dimmer.forget(&mut scene, host);
        assert!(dimmer.attachment(host).is_none());
        assert!(scene.transitions().is_empty());
        assert!(scene.children(host).is_empty());
        assert_eq!(scene.constraints().count(), 0);
    }

    #[test]
    fn hosts_are_independent() {
        let mut scene = Scene::new();
        let a = scene.insert(None, Rect::new(0.0, 0.0, 100.0, 50.0));
        let b = scene.insert(None, Rect::new(0.0, 0.0, 40.0, 40.0));
        let mut dimmer = Dimmer::new();
        dimmer.dim(&mut scene, a, DimOptions::default()).unwrap();
        dimmer.show_loading_default(&mut scene, b).unwrap();

        dimmer.undim(&mut scene, a).unwrap();
        finish(&mut scene, &mut dimmer);
        assert!(!dimmer.is_dimming(&scene, a));
        assert!(dimmer.is_loading(b));
        assert_eq!(scene.children(b).len(), 2);
    }

    #[test]
    fn ratio_uses_current_host_size() {
        let (mut scene, host, mut dimmer) = setup(100.0, 50.0);
        dimmer
            .dim(&mut scene, host, DimOptions::new(Direction::FromTop).with_ratio(0.5))
            .unwrap();
        scene.set_size(host, Size::new(100.0, 200.0));
        dimmer
            .dim(&mut scene, host, DimOptions::new(Direction::FromTop).with_ratio(0.25))
            .unwrap();
        let overlay = dimmer.dimmer_surface(host).unwrap();
        scene.layout();
        assert_eq!(scene.frame(overlay), Some(Rect::new(0.0, 0.0, 100.0, 50.0)));
    }

    #[test]
    fn dim_with_reports_applied_ratio() {
        let (mut scene, host, mut dimmer) = setup(100.0, 50.0);
        let mut seen = None;
        dimmer
            .dim_with(
                &mut scene,
                host,
                DimOptions::new(Direction::FromRight).with_ratio(0.75),
                |r| seen = Some(r),
            )
            .unwrap();
        assert_eq!(seen, Some(0.75));
    }
}
