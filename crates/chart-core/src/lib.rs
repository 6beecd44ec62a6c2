//! Chart core for perfcharts
//!
//! One [`ChartInstance`] per metric owns its viewport, gesture state and
//! tooltip. Instances mounted on the same page coordinate zoom, pan and hover
//! through an explicit [`SyncRegistry`]; the [`DetailOverlay`] shows one point
//! in full.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub mod chart;
pub mod controls;
pub mod deep_link;
pub mod markers;
pub mod overlay;
pub mod sync;
pub mod tooltip;

pub use chart::{ChartGeometry, ChartInstance, ChartResponse, ChartSnapshot};
pub use controls::canvas_controller::{CanvasController, Gesture, GestureState};
pub use deep_link::{DeepLinkAction, DeepLinkState};
pub use markers::{point_styles, PointStyle};
pub use overlay::{DetailOverlay, PointDetail};
pub use sync::{SyncEvent, SyncRegistry, SyncStats, SyncTarget, SyncedChart};

/// Stable identity of a mounted chart
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ChartId(Uuid);

impl ChartId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn parse(s: &str) -> Option<Self> {
        Uuid::parse_str(s).ok().map(Self)
    }
}

impl Default for ChartId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ChartId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}
