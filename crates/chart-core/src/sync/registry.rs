use super::{SyncEvent, SyncTarget};
use crate::ChartId;
use config_system::SyncConfig;
use serde::Serialize;
use shared_types::XRange;
use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

type TargetHandle = Weak<RefCell<dyn SyncTarget>>;

/// Counters exposed for tests and diagnostics
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SyncStats {
    /// Completed broadcasts of any kind
    pub broadcasts: u64,
    pub zoom_broadcasts: u64,
    pub hover_broadcasts: u64,
    /// Publishes dropped because a broadcast was already running
    pub suppressed: u64,
    /// Deliveries skipped on dropped or busy handles
    pub stale_skipped: u64,
}

/// Registry of the charts mounted on one page
///
/// Shared as `Rc<SyncRegistry>` and handed to each chart on mount. Holds only
/// weak handles, so a chart that goes away without unregistering is skipped
/// and pruned on the next broadcast.
pub struct SyncRegistry {
    config: SyncConfig,
    entries: RefCell<Vec<(ChartId, TargetHandle)>>,
    broadcasting: Cell<bool>,
    stats: Cell<SyncStats>,
    last_zoom: Cell<Option<XRange>>,
    last_hover: Cell<Option<usize>>,
}

/// Clears the broadcasting flag even if a target panics
struct BroadcastGuard<'a>(&'a Cell<bool>);

impl<'a> BroadcastGuard<'a> {
    fn enter(flag: &'a Cell<bool>) -> Self {
        flag.set(true);
        Self(flag)
    }
}

impl Drop for BroadcastGuard<'_> {
    fn drop(&mut self) {
        self.0.set(false);
    }
}

impl SyncRegistry {
    pub fn new(config: SyncConfig) -> Rc<Self> {
        Rc::new(Self {
            config,
            entries: RefCell::new(Vec::new()),
            broadcasting: Cell::new(false),
            stats: Cell::new(SyncStats::default()),
            last_zoom: Cell::new(None),
            last_hover: Cell::new(None),
        })
    }

    pub fn config(&self) -> &SyncConfig {
        &self.config
    }

    pub fn stats(&self) -> SyncStats {
        self.stats.get()
    }

    /// Zoom, pan and reset propagations; one per completed gesture
    pub fn broadcast_count(&self) -> u64 {
        self.stats.get().zoom_broadcasts
    }

    /// Zoom window shared by the page, if any chart is zoomed
    pub fn last_zoom(&self) -> Option<XRange> {
        self.last_zoom.get()
    }

    pub fn last_hover(&self) -> Option<usize> {
        self.last_hover.get()
    }

    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }

    pub fn contains(&self, id: ChartId) -> bool {
        self.entries.borrow().iter().any(|(entry, _)| *entry == id)
    }

    /// Add a chart; it silently adopts the shared zoom window if one is active
    pub fn register(&self, target: &Rc<RefCell<dyn SyncTarget>>) -> ChartId {
        let id = target.borrow().chart_id();
        {
            let mut entries = self.entries.borrow_mut();
            entries.retain(|(entry, _)| *entry != id);
            entries.push((id, Rc::downgrade(target)));
        }

        if self.config.sync_zoom {
            if let Some(range) = self.last_zoom.get() {
                if let Ok(mut chart) = target.try_borrow_mut() {
                    chart.apply_external_zoom(range);
                }
            }
        }
        log::debug!("[SyncRegistry] Registered {id} ({} charts)", self.len());
        id
    }

    pub fn unregister(&self, id: ChartId) -> bool {
        let mut entries = self.entries.borrow_mut();
        let before = entries.len();
        entries.retain(|(entry, _)| *entry != id);
        let removed = entries.len() != before;
        if entries.is_empty() {
            self.last_zoom.set(None);
            self.last_hover.set(None);
        }
        removed
    }

    /// Drop entries whose chart no longer exists; returns how many were removed
    pub fn prune(&self) -> usize {
        let mut entries = self.entries.borrow_mut();
        let before = entries.len();
        entries.retain(|(_, handle)| handle.strong_count() > 0);
        before - entries.len()
    }

    /// Deliver `event` from `origin` to every other chart.
    ///
    /// Returns `false` when the event was not broadcast: sync for its kind is
    /// disabled, or another broadcast is in progress. The nested case is
    /// counted in [`SyncStats::suppressed`].
    pub fn publish(&self, origin: ChartId, event: SyncEvent) -> bool {
        if self.broadcasting.get() {
            log::debug!("[SyncRegistry] Dropping nested {event:?} from {origin}");
            self.update_stats(|stats| stats.suppressed += 1);
            return false;
        }
        let enabled = if event.is_zoom() {
            self.config.sync_zoom
        } else {
            self.config.sync_hover
        };
        if !enabled {
            return false;
        }

        match event {
            SyncEvent::ZoomChanged(range) => self.last_zoom.set(Some(range)),
            SyncEvent::ResetZoom => self.last_zoom.set(None),
            SyncEvent::HoverAt { index } => self.last_hover.set(Some(index)),
            SyncEvent::HoverCleared | SyncEvent::DragStarted => self.last_hover.set(None),
        }

        let opacity = self.config.ghost_opacity;
        self.for_each_target(Some(origin), |target| match event {
            SyncEvent::ZoomChanged(range) => target.apply_external_zoom(range),
            SyncEvent::ResetZoom => {
                target.apply_external_reset();
            }
            SyncEvent::HoverAt { index } => target.show_ghost_tooltip(index, opacity),
            SyncEvent::HoverCleared => target.clear_ghost_tooltip(),
            SyncEvent::DragStarted => target.suppress_tooltip(),
        });

        self.update_stats(|stats| {
            stats.broadcasts += 1;
            if event.is_zoom() {
                stats.zoom_broadcasts += 1;
            } else {
                stats.hover_broadcasts += 1;
            }
        });
        true
    }

    /// Reset every chart to its default view; returns how many were zoomed
    pub fn reset_all(&self) -> usize {
        if self.broadcasting.get() {
            self.update_stats(|stats| stats.suppressed += 1);
            return 0;
        }

        let mut reset = 0;
        self.for_each_target(None, |target| {
            if target.apply_external_reset() {
                reset += 1;
            }
            target.clear_ghost_tooltip();
        });
        self.last_zoom.set(None);
        self.update_stats(|stats| {
            stats.broadcasts += 1;
            stats.zoom_broadcasts += 1;
        });
        log::debug!("[SyncRegistry] Reset {reset} zoomed charts");
        reset
    }

    fn for_each_target<F>(&self, skip: Option<ChartId>, mut apply: F)
    where
        F: FnMut(&mut dyn SyncTarget),
    {
        let _guard = BroadcastGuard::enter(&self.broadcasting);
        // Snapshot so targets may register or unregister while we iterate
        let targets: Vec<(ChartId, TargetHandle)> = self.entries.borrow().clone();

        let mut dead = 0;
        for (id, handle) in targets {
            if Some(id) == skip {
                continue;
            }
            let Some(target) = handle.upgrade() else {
                log::debug!("[SyncRegistry] Skipping dropped chart {id}");
                dead += 1;
                self.update_stats(|stats| stats.stale_skipped += 1);
                continue;
            };
            let Ok(mut target) = target.try_borrow_mut() else {
                log::debug!("[SyncRegistry] Skipping busy chart {id}");
                self.update_stats(|stats| stats.stale_skipped += 1);
                continue;
            };
            apply(&mut *target);
        }

        if dead > 0 {
            self.prune();
        }
    }

    fn update_stats(&self, f: impl FnOnce(&mut SyncStats)) {
        let mut stats = self.stats.get();
        f(&mut stats);
        self.stats.set(stats);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Recorder {
        id: ChartId,
        zoom: Option<XRange>,
        ghost: Option<(usize, f32)>,
        suppressed: bool,
        /// Publishes from inside a delivery
        echo: Option<Rc<SyncRegistry>>,
    }

    impl SyncTarget for Recorder {
        fn chart_id(&self) -> ChartId {
            self.id
        }

        fn apply_external_zoom(&mut self, range: XRange) {
            self.zoom = Some(range);
            if let Some(registry) = &self.echo {
                registry.publish(self.id, SyncEvent::ZoomChanged(range));
            }
        }

        fn apply_external_reset(&mut self) -> bool {
            self.zoom.take().is_some()
        }

        fn show_ghost_tooltip(&mut self, index: usize, opacity: f32) {
            self.ghost = Some((index, opacity));
        }

        fn clear_ghost_tooltip(&mut self) {
            self.ghost = None;
        }

        fn suppress_tooltip(&mut self) {
            self.suppressed = true;
            self.ghost = None;
        }
    }

    fn target(recorder: Recorder) -> Rc<RefCell<Recorder>> {
        Rc::new(RefCell::new(recorder))
    }

    fn register(registry: &SyncRegistry, target: &Rc<RefCell<Recorder>>) -> ChartId {
        let handle: Rc<RefCell<dyn SyncTarget>> = target.clone();
        registry.register(&handle)
    }

    #[test]
    fn test_origin_is_skipped() {
        let registry = SyncRegistry::new(SyncConfig::default());
        let a = target(Recorder::default());
        let b = target(Recorder::default());
        let a_id = register(&registry, &a);
        register(&registry, &b);

        assert!(registry.publish(a_id, SyncEvent::ZoomChanged(XRange::new(1.0, 2.0))));

        assert_eq!(a.borrow().zoom, None);
        assert_eq!(b.borrow().zoom, Some(XRange::new(1.0, 2.0)));
        assert_eq!(registry.stats().zoom_broadcasts, 1);
    }

    #[test]
    fn test_nested_publish_is_suppressed() {
        let registry = SyncRegistry::new(SyncConfig::default());
        let a = target(Recorder::default());
        let b = target(Recorder {
            echo: Some(Rc::clone(&registry)),
            ..Default::default()
        });
        let a_id = register(&registry, &a);
        register(&registry, &b);

        registry.publish(a_id, SyncEvent::ZoomChanged(XRange::new(0.0, 3.0)));

        let stats = registry.stats();
        assert_eq!(stats.broadcasts, 1);
        assert_eq!(stats.suppressed, 1);
        assert_eq!(a.borrow().zoom, None);
        // The guard is released afterwards
        assert!(registry.publish(a_id, SyncEvent::HoverCleared));
    }

    #[test]
    fn test_dropped_handle_is_skipped_and_pruned() {
        let registry = SyncRegistry::new(SyncConfig::default());
        let a = target(Recorder::default());
        let a_id = register(&registry, &a);
        {
            let gone = target(Recorder::default());
            register(&registry, &gone);
        }
        assert_eq!(registry.len(), 2);

        assert!(registry.publish(a_id, SyncEvent::DragStarted));

        assert_eq!(registry.stats().stale_skipped, 1);
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_busy_handle_is_skipped() {
        let registry = SyncRegistry::new(SyncConfig::default());
        let a = target(Recorder::default());
        let b = target(Recorder::default());
        let a_id = register(&registry, &a);
        register(&registry, &b);

        let _held = b.borrow_mut();
        assert!(registry.publish(a_id, SyncEvent::HoverAt { index: 2 }));
        assert_eq!(registry.stats().stale_skipped, 1);
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn test_ghost_opacity_comes_from_config() {
        let registry = SyncRegistry::new(SyncConfig {
            ghost_opacity: 0.25,
            ..Default::default()
        });
        let a = target(Recorder::default());
        let b = target(Recorder::default());
        let a_id = register(&registry, &a);
        register(&registry, &b);

        registry.publish(a_id, SyncEvent::HoverAt { index: 4 });
        assert_eq!(b.borrow().ghost, Some((4, 0.25)));
        assert_eq!(registry.last_hover(), Some(4));

        registry.publish(a_id, SyncEvent::DragStarted);
        assert!(b.borrow().suppressed);
        assert_eq!(b.borrow().ghost, None);
        assert_eq!(registry.last_hover(), None);
    }

    #[test]
    fn test_disabled_sync_kinds_are_not_broadcast() {
        let registry = SyncRegistry::new(SyncConfig {
            sync_zoom: false,
            ..Default::default()
        });
        let a = target(Recorder::default());
        let b = target(Recorder::default());
        let a_id = register(&registry, &a);
        register(&registry, &b);

        assert!(!registry.publish(a_id, SyncEvent::ZoomChanged(XRange::new(1.0, 2.0))));
        assert_eq!(b.borrow().zoom, None);
        assert_eq!(registry.last_zoom(), None);
        assert!(registry.publish(a_id, SyncEvent::HoverAt { index: 1 }));
    }

    #[test]
    fn test_late_registration_adopts_shared_zoom() {
        let registry = SyncRegistry::new(SyncConfig::default());
        let a = target(Recorder::default());
        let a_id = register(&registry, &a);
        registry.publish(a_id, SyncEvent::ZoomChanged(XRange::new(5.0, 9.0)));

        let late = target(Recorder::default());
        register(&registry, &late);
        assert_eq!(late.borrow().zoom, Some(XRange::new(5.0, 9.0)));

        registry.publish(a_id, SyncEvent::ResetZoom);
        let later = target(Recorder::default());
        register(&registry, &later);
        assert_eq!(later.borrow().zoom, None);
    }

    #[test]
    fn test_reset_all_counts_only_zoomed_charts() {
        let registry = SyncRegistry::new(SyncConfig::default());
        let zoomed = target(Recorder {
            zoom: Some(XRange::new(1.0, 2.0)),
            ..Default::default()
        });
        let untouched = target(Recorder::default());
        register(&registry, &zoomed);
        register(&registry, &untouched);

        assert_eq!(registry.reset_all(), 1);
        assert_eq!(registry.reset_all(), 0);
        assert_eq!(zoomed.borrow().zoom, None);
    }

    #[test]
    fn test_unregister() {
        let registry = SyncRegistry::new(SyncConfig::default());
        let a = target(Recorder::default());
        let id = register(&registry, &a);

        assert!(registry.contains(id));
        assert!(registry.unregister(id));
        assert!(!registry.unregister(id));
        assert!(registry.is_empty());
    }
}
