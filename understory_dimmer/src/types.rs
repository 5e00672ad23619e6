// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Public value types: reveal directions, edges, axes, indicator styles, and dim options.

use kurbo::Size;

use crate::error::DimmerError;

/// Overlay alpha used when the caller does not pick one.
pub const DEFAULT_ALPHA: f64 = 0.4;

/// The edge an overlay reveals from.
///
/// `Solid` covers the whole host. The directional variants cover a fraction of the
/// host (the dimming ratio) measured from the named edge.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash)]
#[cfg_attr(any(test, feature = "serde"), derive(serde::Serialize, serde::Deserialize))]
pub enum Direction {
    /// Full coverage, all four edges pinned.
    #[default]
    Solid,
    /// Grows down from the top edge.
    FromTop,
    /// Grows right from the left edge.
    FromLeft,
    /// Grows up from the bottom edge.
    FromBottom,
    /// Grows left from the right edge.
    FromRight,
}

impl Direction {
    /// The edge left unpinned so the overlay can be sized along [`Direction::axis`].
    ///
    /// `Solid` maps to [`Edge::Left`], but solid overlays pin every edge so the
    /// value is never consulted.
    pub const fn excluded_edge(self) -> Edge {
        match self {
            Self::FromTop => Edge::Bottom,
            Self::FromLeft => Edge::Right,
            Self::FromBottom => Edge::Top,
            Self::FromRight | Self::Solid => Edge::Left,
        }
    }

    /// The axis the ratio is applied along, or `None` for solid overlays.
    pub const fn axis(self) -> Option<Axis> {
        match self {
            Self::FromTop | Self::FromBottom => Some(Axis::Height),
            Self::FromLeft | Self::FromRight => Some(Axis::Width),
            Self::Solid => None,
        }
    }

    /// Edges pinned to the host for this direction.
    pub fn pinned_edges(self) -> Edges {
        match self {
            Self::Solid => Edges::ALL,
            _ => Edges::ALL - Edges::from(self.excluded_edge()),
        }
    }
}

/// A single edge of a surface.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum Edge {
    /// Top edge (minimum y).
    Top,
    /// Left edge (minimum x).
    Left,
    /// Bottom edge (maximum y).
    Bottom,
    /// Right edge (maximum x).
    Right,
}

bitflags::bitflags! {
    /// A set of edges, used when pinning a surface to its parent.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct Edges: u8 {
        /// See [`Edge::Top`].
        const TOP    = 0b0001;
        /// See [`Edge::Left`].
        const LEFT   = 0b0010;
        /// See [`Edge::Bottom`].
        const BOTTOM = 0b0100;
        /// See [`Edge::Right`].
        const RIGHT  = 0b1000;
        /// All four edges.
        const ALL = Self::TOP.bits() | Self::LEFT.bits() | Self::BOTTOM.bits() | Self::RIGHT.bits();
    }
}

impl From<Edge> for Edges {
    fn from(edge: Edge) -> Self {
        match edge {
            Edge::Top => Self::TOP,
            Edge::Left => Self::LEFT,
            Edge::Bottom => Self::BOTTOM,
            Edge::Right => Self::RIGHT,
        }
    }
}

impl Edges {
    /// Iterate the contained edges in top, left, bottom, right order.
    pub fn edges(self) -> impl Iterator<Item = Edge> {
        [Edge::Top, Edge::Left, Edge::Bottom, Edge::Right]
            .into_iter()
            .filter(move |&e| self.contains(Self::from(e)))
    }
}

/// A layout dimension.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum Axis {
    /// Horizontal extent.
    Width,
    /// Vertical extent.
    Height,
}

impl Axis {
    /// Pick this axis' dimension out of `size`.
    pub const fn of(self, size: Size) -> f64 {
        match self {
            Self::Width => size.width,
            Self::Height => size.height,
        }
    }
}

/// Visual style of the activity indicator shown while loading.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash)]
#[cfg_attr(any(test, feature = "serde"), derive(serde::Serialize, serde::Deserialize))]
pub enum ActivityStyle {
    /// Small gray spinner, for light backgrounds.
    #[default]
    Gray,
    /// Small white spinner.
    White,
    /// Large white spinner.
    WhiteLarge,
}

/// Defaults applied by [`Dimmer`](crate::Dimmer) when the caller leaves them out.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(any(test, feature = "serde"), derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(any(test, feature = "serde"), serde(default))]
pub struct DimmerConfig {
    /// Overlay alpha for [`DimOptions::from_config`] and default loading calls.
    pub default_alpha: f64,
    /// Indicator style for default loading calls.
    pub activity_style: ActivityStyle,
}

impl Default for DimmerConfig {
    fn default() -> Self {
        Self {
            default_alpha: DEFAULT_ALPHA,
            activity_style: ActivityStyle::default(),
        }
    }
}

/// Arguments to [`Dimmer::dim`](crate::Dimmer::dim).
///
/// Defaults to a solid overlay at ratio `1.0` and alpha [`DEFAULT_ALPHA`].
///
/// ```
/// use understory_dimmer::{DimOptions, Direction};
///
/// let opts = DimOptions::new(Direction::FromTop).with_ratio(0.5);
/// assert_eq!(opts.alpha, 0.4);
/// ```
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct DimOptions {
    /// Edge the overlay reveals from. Only consulted when the overlay is created.
    pub direction: Direction,
    /// Fraction of the host covered along the direction's axis, in `[0, 1]`.
    pub ratio: f64,
    /// Overlay alpha in `[0, 1]`. Only consulted when the overlay is created.
    pub alpha: f64,
}

impl Default for DimOptions {
    fn default() -> Self {
        Self {
            direction: Direction::Solid,
            ratio: 1.0,
            alpha: DEFAULT_ALPHA,
        }
    }
}

impl DimOptions {
    /// Full-ratio options for `direction`.
    pub fn new(direction: Direction) -> Self {
        Self {
            direction,
            ..Self::default()
        }
    }

    /// Solid options taking their alpha from `config`.
    pub fn from_config(config: &DimmerConfig) -> Self {
        Self {
            alpha: config.default_alpha,
            ..Self::default()
        }
    }

    /// Replace the ratio.
    pub fn with_ratio(mut self, ratio: f64) -> Self {
        self.ratio = ratio;
        self
    }

    /// Replace the alpha.
    pub fn with_alpha(mut self, alpha: f64) -> Self {
        self.alpha = alpha;
        self
    }

    /// Reject ratios and alphas outside `[0, 1]`, including NaN and infinities.
    pub fn validate(&self) -> Result<(), DimmerError> {
        if !is_unit(self.ratio) {
            return Err(DimmerError::InvalidRatio(self.ratio));
        }
        if !is_unit(self.alpha) {
            return Err(DimmerError::InvalidAlpha(self.alpha));
        }
        Ok(())
    }
}

pub(crate) fn is_unit(v: f64) -> bool {
    (0.0..=1.0).contains(&v)
}
