// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Errors reported by the [`Dimmer`](crate::Dimmer).

use crate::attachment::TeardownTicket;

/// Misuse detected by the [`Dimmer`](crate::Dimmer).
///
/// Redundant calls (undimming a host that is not dimmed, showing loading twice)
/// are no-ops, not errors.
#[derive(Clone, Copy, Debug, PartialEq, thiserror::Error)]
pub enum DimmerError {
    /// Ratio was NaN, infinite, or outside `[0, 1]`.
    #[error("dimming ratio {0} is outside [0, 1]")]
    InvalidRatio(f64),
    /// Alpha was NaN, infinite, or outside `[0, 1]`.
    #[error("overlay alpha {0} is outside [0, 1]")]
    InvalidAlpha(f64),
    /// The teardown was already completed or superseded by a later `dim`.
    #[error("teardown {0:?} is not pending")]
    StaleTeardown(TeardownTicket),
}
