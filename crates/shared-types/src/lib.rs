//! Shared types for the perfcharts workspace
//!
//! This crate contains the types passed between the data-manager,
//! chart-core and wasm-bridge crates: the result/change-point wire model,
//! the derived per-metric dataset, pointer events, tooltip state and the
//! page view state.

use serde::{Deserialize, Serialize};

#[cfg(feature = "typescript")]
use tsify::Tsify;

pub mod data_types;
pub mod errors;
pub mod events;
pub mod store_state;
pub mod tooltip;

pub use data_types::{
    Attributes, Change, ChangePoint, ChartDataset, Direction, MagnitudeScale, Metric,
    TimeSeriesPoint,
};
pub use errors::{ErrorResponse, PerfChartsError, PerfChartsResult};

/// Visible window of the x axis, in point-index space
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[cfg_attr(feature = "typescript", derive(Tsify))]
pub struct XRange {
    pub min: f64,
    pub max: f64,
}

impl XRange {
    pub fn new(min: f64, max: f64) -> Self {
        if min <= max {
            Self { min, max }
        } else {
            Self { min: max, max: min }
        }
    }

    /// Default window for a series of `len` points
    pub fn full(len: usize) -> Self {
        Self {
            min: 0.0,
            max: len.saturating_sub(1) as f64,
        }
    }

    pub fn span(&self) -> f64 {
        self.max - self.min
    }

    pub fn contains(&self, x: f64) -> bool {
        x >= self.min && x <= self.max
    }

    /// Shift by `delta` without leaving `bounds`; the span is preserved
    pub fn shifted_within(&self, delta: f64, bounds: &XRange) -> Self {
        let span = self.span().min(bounds.span());
        let min = (self.min + delta).clamp(bounds.min, bounds.max - span);
        Self {
            min,
            max: min + span,
        }
    }

    /// Intersection with `bounds`, or `bounds` itself when disjoint
    pub fn clamp_to(&self, bounds: &XRange) -> Self {
        let min = self.min.max(bounds.min);
        let max = self.max.min(bounds.max);
        if min <= max {
            Self { min, max }
        } else {
            *bounds
        }
    }
}
