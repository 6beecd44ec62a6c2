use super::{SyncEvent, SyncRegistry, SyncTarget};
use crate::chart::ChartInstance;
use crate::ChartId;
use shared_types::events::{ElementState, MouseButton, PhysicalPosition, WindowEvent};
use shared_types::XRange;
use std::cell::RefCell;
use std::rc::Rc;

/// A chart mounted on a page, registered with the page's [`SyncRegistry`]
///
/// Dropping it unregisters the chart.
pub struct SyncedChart {
    chart: Rc<RefCell<ChartInstance>>,
    registry: Rc<SyncRegistry>,
    id: ChartId,
}

impl SyncedChart {
    pub fn mount(chart: ChartInstance, registry: &Rc<SyncRegistry>) -> Self {
        let chart = Rc::new(RefCell::new(chart));
        let target: Rc<RefCell<dyn SyncTarget>> = chart.clone();
        let id = registry.register(&target);
        log::info!(
            "[SyncedChart] Mounted {} chart {id}",
            chart.borrow().dataset().metric_name
        );

        Self {
            chart,
            registry: Rc::clone(registry),
            id,
        }
    }

    pub fn id(&self) -> ChartId {
        self.id
    }

    pub fn registry(&self) -> &Rc<SyncRegistry> {
        &self.registry
    }

    /// Shared handle to the underlying chart
    pub fn handle(&self) -> Rc<RefCell<ChartInstance>> {
        Rc::clone(&self.chart)
    }

    pub fn with_chart<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&ChartInstance) -> R,
    {
        f(&self.chart.borrow())
    }

    /// Feed a pointer event and publish whatever it means for the siblings.
    ///
    /// Returns the index whose detail overlay should open.
    pub fn handle_event(&self, event: WindowEvent) -> Option<usize> {
        // The chart borrow ends before publishing so siblings can be reached
        let response = self.chart.borrow_mut().handle_event(event);
        if let Some(sync) = response.sync {
            self.registry.publish(self.id, sync);
        }
        response.open_detail
    }

    pub fn pointer_move(&self, x: f64, y: f64) -> Option<usize> {
        self.handle_event(WindowEvent::CursorMoved {
            position: PhysicalPosition::new(x, y),
        })
    }

    pub fn pointer_down(&self, x: f64, y: f64) -> Option<usize> {
        self.handle_event(WindowEvent::MouseInput {
            state: ElementState::Pressed,
            button: MouseButton::Left,
            position: PhysicalPosition::new(x, y),
        })
    }

    pub fn pointer_up(&self, x: f64, y: f64) -> Option<usize> {
        self.handle_event(WindowEvent::MouseInput {
            state: ElementState::Released,
            button: MouseButton::Left,
            position: PhysicalPosition::new(x, y),
        })
    }

    pub fn pointer_leave(&self) -> Option<usize> {
        self.handle_event(WindowEvent::CursorLeft)
    }

    /// Programmatic zoom that propagates like a drag-to-zoom
    pub fn zoom_to(&self, range: XRange) -> bool {
        let event = self.chart.borrow_mut().user_initiated_zoom(range);
        self.publish_if_any(event)
    }

    /// This chart's own reset control; `false` when it was not zoomed
    pub fn reset_zoom(&self) -> bool {
        let event = self.chart.borrow_mut().user_reset_zoom();
        self.publish_if_any(event)
    }

    fn publish_if_any(&self, event: Option<SyncEvent>) -> bool {
        let Some(event) = event else {
            return false;
        };
        self.registry.publish(self.id, event);
        true
    }
}

impl Drop for SyncedChart {
    fn drop(&mut self) {
        self.registry.unregister(self.id);
        log::info!("[SyncedChart] Unmounted chart {}", self.id);
    }
}
