//! Cross-chart synchronization
//!
//! Charts never reach into each other. A chart's response names a
//! [`SyncEvent`]; the [`SyncRegistry`] fans it out to every other mounted
//! chart through the silent [`SyncTarget`] operations.

use crate::ChartId;
use serde::Serialize;
use shared_types::XRange;

pub mod registry;
pub mod synced_chart;

pub use registry::{SyncRegistry, SyncStats};
pub use synced_chart::SyncedChart;

/// Something one chart tells its siblings
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SyncEvent {
    /// A zoom or pan completed; siblings adopt the window and drop their tooltips
    ZoomChanged(XRange),
    ResetZoom,
    /// The pointer is over `index`; siblings show a ghost tooltip there
    HoverAt { index: usize },
    HoverCleared,
    /// A drag or pan began; siblings hide their tooltips entirely
    DragStarted,
}

impl SyncEvent {
    pub fn is_zoom(&self) -> bool {
        matches!(self, SyncEvent::ZoomChanged(_) | SyncEvent::ResetZoom)
    }

    pub fn is_hover(&self) -> bool {
        !self.is_zoom()
    }
}

/// Receiving side of the sync protocol
///
/// None of these may publish: they are the silent counterparts of the
/// user-initiated operations on a chart.
pub trait SyncTarget {
    fn chart_id(&self) -> ChartId;

    fn apply_external_zoom(&mut self, range: XRange);

    /// Back to the default view; `false` when there was nothing to reset
    fn apply_external_reset(&mut self) -> bool;

    fn show_ghost_tooltip(&mut self, index: usize, opacity: f32);

    fn clear_ghost_tooltip(&mut self);

    fn suppress_tooltip(&mut self);
}
