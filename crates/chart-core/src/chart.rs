//! One chart per metric
//!
//! A [`ChartInstance`] turns pointer events into viewport, selection and
//! tooltip changes. It never talks to its siblings itself: every response
//! carries the [`SyncEvent`] to publish, and the `apply_*` methods are the
//! silent counterparts used when a sibling's event arrives.

use crate::controls::canvas_controller::{CanvasController, Gesture};
use crate::markers::{point_styles, PointStyle};
use crate::sync::{SyncEvent, SyncTarget};
use crate::tooltip::tooltip_lines;
use crate::ChartId;
use config_system::{ChartSettings, MarkerConfig};
use serde::Serialize;
use shared_types::events::{PhysicalPosition, WindowEvent};
use shared_types::tooltip::TooltipState;
use shared_types::{ChangePoint, ChartDataset, XRange};

/// Plot area size in CSS pixels
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ChartGeometry {
    pub width: f64,
    pub height: f64,
}

impl Default for ChartGeometry {
    fn default() -> Self {
        Self {
            width: 800.0,
            height: 300.0,
        }
    }
}

/// Result of feeding one pointer event to a chart
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChartResponse {
    /// Event to publish to sibling charts
    pub sync: Option<SyncEvent>,
    /// Index whose detail overlay should open
    pub open_detail: Option<usize>,
}

impl ChartResponse {
    fn publish(event: SyncEvent) -> Self {
        Self {
            sync: Some(event),
            open_detail: None,
        }
    }
}

/// Serializable view of a chart for the page
#[derive(Debug, Clone, Serialize)]
pub struct ChartSnapshot {
    pub id: String,
    pub metric_name: String,
    pub axis_label: String,
    pub viewport: XRange,
    pub reset_visible: bool,
    pub selection: Option<XRange>,
    pub selected_index: Option<usize>,
    pub tooltip: TooltipState,
}

pub struct ChartInstance {
    id: ChartId,
    dataset: ChartDataset,
    /// Change points reporting this chart's metric
    change_points: Vec<ChangePoint>,
    markers: MarkerConfig,
    default_range: XRange,
    viewport: XRange,
    controller: CanvasController,
    tooltip: TooltipState,
    /// Drag-to-zoom rectangle, in index space
    selection: Option<XRange>,
    selected_index: Option<usize>,
    geometry: ChartGeometry,
    /// Viewport when the current pan began
    pan_origin: Option<XRange>,
}

impl ChartInstance {
    pub fn new(dataset: ChartDataset, change_points: &[ChangePoint], settings: &ChartSettings) -> Self {
        let change_points = change_points
            .iter()
            .filter(|cp| cp.reports(&dataset.metric_name))
            .cloned()
            .collect();
        let default_range = XRange::full(dataset.len());

        Self {
            id: ChartId::new(),
            dataset,
            change_points,
            markers: settings.markers.clone(),
            default_range,
            viewport: default_range,
            controller: CanvasController::new(settings.interaction.clone()),
            tooltip: TooltipState::default(),
            selection: None,
            selected_index: None,
            geometry: ChartGeometry::default(),
            pan_origin: None,
        }
    }

    pub fn id(&self) -> ChartId {
        self.id
    }

    pub fn dataset(&self) -> &ChartDataset {
        &self.dataset
    }

    pub fn change_points(&self) -> &[ChangePoint] {
        &self.change_points
    }

    pub fn viewport(&self) -> XRange {
        self.viewport
    }

    pub fn default_range(&self) -> XRange {
        self.default_range
    }

    pub fn tooltip(&self) -> &TooltipState {
        &self.tooltip
    }

    pub fn selection(&self) -> Option<XRange> {
        self.selection
    }

    pub fn selected_index(&self) -> Option<usize> {
        self.selected_index
    }

    pub fn controller(&self) -> &CanvasController {
        &self.controller
    }

    pub fn geometry(&self) -> ChartGeometry {
        self.geometry
    }

    pub fn set_geometry(&mut self, geometry: ChartGeometry) {
        self.geometry = geometry;
    }

    pub fn is_zoomed(&self) -> bool {
        self.viewport != self.default_range
    }

    /// The reset-zoom control is shown only while zoomed
    pub fn reset_visible(&self) -> bool {
        self.is_zoomed()
    }

    /// Bold the point recorded at `timestamp`, if any
    pub fn set_selected_timestamp(&mut self, timestamp: Option<i64>) {
        self.selected_index = timestamp.and_then(|t| self.dataset.index_of_timestamp(t));
    }

    pub fn point_styles(&self) -> Vec<PointStyle> {
        point_styles(&self.dataset, self.selected_index, &self.markers)
    }

    /// Fractional index under horizontal pixel `x`
    pub fn index_at(&self, x: f64) -> f64 {
        let width = self.geometry.width.max(1.0);
        self.viewport.min + (x / width).clamp(0.0, 1.0) * self.viewport.span()
    }

    /// Nearest index that has a value, searching outward from `x`
    pub fn nearest_point_index(&self, x: f64) -> Option<usize> {
        let len = self.dataset.len();
        if len == 0 {
            return None;
        }
        let center = (self.index_at(x).round() as usize).min(len - 1);
        (0..len)
            .flat_map(|offset| {
                let below = center.checked_sub(offset);
                let above = Some(center + offset).filter(|i| *i < len && offset > 0);
                below.into_iter().chain(above)
            })
            .find(|i| self.dataset.value_at(*i).is_some())
    }

    pub fn snapshot(&self) -> ChartSnapshot {
        ChartSnapshot {
            id: self.id.to_string(),
            metric_name: self.dataset.metric_name.clone(),
            axis_label: self.dataset.axis_label(),
            viewport: self.viewport,
            reset_visible: self.reset_visible(),
            selection: self.selection,
            selected_index: self.selected_index,
            tooltip: self.tooltip.clone(),
        }
    }

    pub fn handle_event(&mut self, event: WindowEvent) -> ChartResponse {
        let gesture = self.controller.handle_cursor_event(event, self.is_zoomed());
        match gesture {
            Gesture::None => ChartResponse::default(),
            Gesture::Hover(position) => self.hover(position),
            Gesture::DragStarted(position) => {
                let at = self.index_at(position.x);
                self.selection = Some(XRange::new(at, at));
                self.tooltip.hide();
                ChartResponse::publish(SyncEvent::DragStarted)
            }
            Gesture::DragMoved { start, current } => {
                self.selection = Some(XRange::new(
                    self.index_at(start.x),
                    self.index_at(current.x),
                ));
                ChartResponse::default()
            }
            Gesture::PanStarted(_) => {
                self.pan_origin = Some(self.viewport);
                self.tooltip.hide();
                ChartResponse::publish(SyncEvent::DragStarted)
            }
            Gesture::PanMoved { delta_x } => {
                self.pan_by(delta_x);
                ChartResponse::default()
            }
            Gesture::ZoomSelected { start_x, end_x } => {
                self.selection = None;
                let range = XRange::new(self.index_at(start_x), self.index_at(end_x));
                ChartResponse {
                    sync: self.user_initiated_zoom(range),
                    open_detail: None,
                }
            }
            Gesture::PanCompleted { delta_x } => {
                self.pan_by(delta_x);
                self.pan_origin = None;
                ChartResponse::publish(SyncEvent::ZoomChanged(self.viewport))
            }
            Gesture::Click(position) => {
                self.selection = None;
                // A pan too short to count is undone so siblings stay aligned
                if let Some(origin) = self.pan_origin.take() {
                    self.viewport = origin;
                }
                ChartResponse {
                    sync: Some(SyncEvent::HoverCleared),
                    open_detail: self.nearest_point_index(position.x),
                }
            }
            Gesture::Cancelled => {
                self.selection = None;
                ChartResponse::publish(SyncEvent::HoverCleared)
            }
            Gesture::Left { pan_completed } => {
                self.selection = None;
                self.tooltip.hide();
                let origin = self.pan_origin.take();
                if pan_completed {
                    ChartResponse::publish(SyncEvent::ZoomChanged(self.viewport))
                } else {
                    if let Some(origin) = origin {
                        self.viewport = origin;
                    }
                    ChartResponse::publish(SyncEvent::HoverCleared)
                }
            }
        }
    }

    fn pan_by(&mut self, delta_x: f64) {
        let width = self.geometry.width.max(1.0);
        let delta = -delta_x / width * self.viewport.span();
        self.viewport = self.viewport.shifted_within(delta, &self.default_range);
    }

    fn hover(&mut self, position: PhysicalPosition) -> ChartResponse {
        match self.nearest_point_index(position.x) {
            Some(index) => {
                let lines = tooltip_lines(&self.dataset, index, &self.change_points);
                self.tooltip.show_active(index, lines);
                ChartResponse::publish(SyncEvent::HoverAt { index })
            }
            None => {
                self.tooltip.hide();
                ChartResponse::publish(SyncEvent::HoverCleared)
            }
        }
    }

    /// Zoom requested by the user on this chart; returns the event to broadcast
    pub fn user_initiated_zoom(&mut self, range: XRange) -> Option<SyncEvent> {
        if self.dataset.is_empty() {
            return None;
        }
        self.viewport = range.clamp_to(&self.default_range);
        self.tooltip.hide();
        log::debug!("[ChartInstance] {} zoomed to {:?}", self.id, self.viewport);
        Some(SyncEvent::ZoomChanged(self.viewport))
    }

    /// Reset requested from this chart's own control; `None` when not zoomed
    pub fn user_reset_zoom(&mut self) -> Option<SyncEvent> {
        self.apply_reset().then_some(SyncEvent::ResetZoom)
    }

    fn apply_reset(&mut self) -> bool {
        self.selection = None;
        if !self.is_zoomed() {
            return false;
        }
        self.viewport = self.default_range;
        true
    }
}

impl SyncTarget for ChartInstance {
    fn chart_id(&self) -> ChartId {
        self.id
    }

    fn apply_external_zoom(&mut self, range: XRange) {
        if self.dataset.is_empty() {
            return;
        }
        self.viewport = range.clamp_to(&self.default_range);
        self.tooltip.hide();
    }

    fn apply_external_reset(&mut self) -> bool {
        self.apply_reset()
    }

    fn show_ghost_tooltip(&mut self, index: usize, opacity: f32) {
        if self.dataset.value_at(index).is_none() {
            self.tooltip.hide();
            return;
        }
        let lines = tooltip_lines(&self.dataset, index, &self.change_points);
        self.tooltip.show_ghost(index, lines, opacity);
    }

    fn clear_ghost_tooltip(&mut self) {
        if self.tooltip.is_ghost() {
            self.tooltip.hide();
        }
    }

    fn suppress_tooltip(&mut self) {
        self.tooltip.hide();
    }
}
