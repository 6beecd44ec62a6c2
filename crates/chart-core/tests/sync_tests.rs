//! Multi-chart behaviour through a shared registry

use chart_core::{
    ChartGeometry, ChartInstance, DeepLinkState, DetailOverlay, PointDetail, SyncRegistry,
    SyncedChart,
};
use config_system::{ChartSettings, SyncConfig};
use shared_types::store_state::ViewState;
use shared_types::{ChartDataset, TimeSeriesPoint, XRange};
use std::rc::Rc;

const WIDTH: f64 = 100.0;

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn dataset(metric: &str, len: usize) -> ChartDataset {
    ChartDataset {
        metric_name: metric.to_string(),
        unit: "ms".to_string(),
        timestamps: (0..len as i64).map(|i| 1_700_000_000 + i * 60).collect(),
        labels: (0..len).map(|i| format!("run {i}")).collect(),
        values: (0..len).map(|i| Some(i as f64 + 0.5)).collect(),
        plot_values: (0..len).map(|i| Some(i as f64 + 0.5)).collect(),
        ..Default::default()
    }
}

fn mount(registry: &Rc<SyncRegistry>, metric: &str) -> SyncedChart {
    let mut chart = ChartInstance::new(dataset(metric, 11), &[], &ChartSettings::default());
    chart.set_geometry(ChartGeometry {
        width: WIDTH,
        height: 40.0,
    });
    SyncedChart::mount(chart, registry)
}

fn page() -> (Rc<SyncRegistry>, SyncedChart, SyncedChart, SyncedChart) {
    init_logging();
    let registry = SyncRegistry::new(SyncConfig::default());
    let a = mount(&registry, "latency");
    let b = mount(&registry, "tps");
    let c = mount(&registry, "cpu");
    (registry, a, b, c)
}

fn drag(chart: &SyncedChart, from: f64, to: f64) -> Option<usize> {
    chart.pointer_down(from, 20.0);
    chart.pointer_move(to, 20.0);
    chart.pointer_up(to, 20.0)
}

#[test]
fn test_zoom_on_one_chart_reaches_all_once() {
    let (registry, a, b, c) = page();

    let opened = drag(&a, 20.0, 60.0);

    assert_eq!(opened, None);
    let expected = XRange::new(2.0, 6.0);
    for chart in [&a, &b, &c] {
        assert_eq!(chart.with_chart(|c| c.viewport()), expected);
        assert!(chart.with_chart(|c| c.reset_visible()));
    }
    let stats = registry.stats();
    assert_eq!(stats.zoom_broadcasts, 1);
    assert_eq!(stats.suppressed, 0);
    // The press and hover traffic of the drag is not a propagation
    assert_eq!(registry.broadcast_count(), 1);
    assert!(stats.broadcasts > 1);
    assert_eq!(registry.last_zoom(), Some(expected));
}

#[test]
fn test_click_opens_overlay_but_drag_does_not() {
    let (registry, a, b, _c) = page();

    assert_eq!(drag(&a, 50.0, 51.5), Some(5));
    assert!(!a.with_chart(|c| c.is_zoomed()));
    assert_eq!(registry.stats().zoom_broadcasts, 0);

    assert_eq!(drag(&b, 30.0, 45.0), None);
    assert!(a.with_chart(|c| c.is_zoomed()));
}

#[test]
fn test_medium_drag_neither_zooms_nor_opens() {
    let (registry, a, _b, _c) = page();

    assert_eq!(drag(&a, 50.0, 56.0), None);
    assert!(!a.with_chart(|c| c.is_zoomed()));
    assert_eq!(registry.stats().zoom_broadcasts, 0);
}

#[test]
fn test_hover_ghosts_siblings_and_leave_clears() {
    let (_registry, a, b, c) = page();

    a.pointer_move(40.0, 10.0);

    let tooltip = a.with_chart(|c| c.tooltip().clone());
    assert!(tooltip.is_visible() && !tooltip.is_ghost());
    for sibling in [&b, &c] {
        let ghost = sibling.with_chart(|c| c.tooltip().clone());
        assert!(ghost.is_ghost());
        assert_eq!(ghost.index, Some(4));
        assert_eq!(ghost.opacity, 0.6);
    }

    a.pointer_leave();
    for chart in [&a, &b, &c] {
        assert!(!chart.with_chart(|c| c.tooltip().is_visible()));
    }
}

#[test]
fn test_mouse_up_clears_ghosts() {
    let (_registry, a, b, _c) = page();
    a.pointer_move(40.0, 10.0);
    assert!(b.with_chart(|c| c.tooltip().is_ghost()));

    a.pointer_down(40.0, 10.0);
    a.pointer_up(40.0, 10.0);
    assert!(!b.with_chart(|c| c.tooltip().is_visible()));
}

#[test]
fn test_siblings_hidden_during_drag() {
    let (_registry, a, b, c) = page();
    b.pointer_move(70.0, 10.0);
    assert!(c.with_chart(|c| c.tooltip().is_ghost()));
    b.pointer_leave();

    a.pointer_move(20.0, 10.0);
    a.pointer_down(20.0, 10.0);
    a.pointer_move(50.0, 10.0);
    a.pointer_move(70.0, 10.0);

    for sibling in [&b, &c] {
        assert!(!sibling.with_chart(|c| c.tooltip().is_visible()));
    }
    assert!(a.with_chart(|c| c.selection()).is_some());
}

#[test]
fn test_pan_propagates_on_completion() {
    let (registry, a, b, _c) = page();
    a.zoom_to(XRange::new(4.0, 6.0));
    let zooms = registry.stats().zoom_broadcasts;

    a.pointer_down(50.0, 10.0);
    a.pointer_move(100.0, 10.0);
    // Siblings follow only once the pan completes
    assert_eq!(b.with_chart(|c| c.viewport()), XRange::new(4.0, 6.0));
    a.pointer_up(100.0, 10.0);

    assert_eq!(b.with_chart(|c| c.viewport()), XRange::new(3.0, 5.0));
    assert_eq!(registry.stats().zoom_broadcasts, zooms + 1);
}

#[test]
fn test_small_pan_that_clicks_keeps_charts_aligned() {
    let (registry, a, b, c) = page();
    a.zoom_to(XRange::new(4.0, 6.0));
    let propagated = registry.broadcast_count();

    a.pointer_down(50.0, 10.0);
    a.pointer_move(51.5, 10.0);
    let opened = a.pointer_up(51.5, 10.0);

    assert_eq!(opened, Some(5));
    let expected = XRange::new(4.0, 6.0);
    for chart in [&a, &b, &c] {
        assert_eq!(chart.with_chart(|c| c.viewport()), expected);
    }
    assert_eq!(registry.last_zoom(), Some(expected));
    assert_eq!(registry.broadcast_count(), propagated);
}

#[test]
fn test_repeated_small_pans_do_not_drift() {
    let (registry, a, b, _c) = page();
    a.zoom_to(XRange::new(4.0, 6.0));

    for _ in 0..5 {
        a.pointer_down(50.0, 10.0);
        a.pointer_move(51.0, 10.0);
        a.pointer_up(51.0, 10.0);
    }

    assert_eq!(a.with_chart(|c| c.viewport()), b.with_chart(|c| c.viewport()));
    assert_eq!(registry.last_zoom(), Some(a.with_chart(|c| c.viewport())));

    let late = mount(&registry, "mem");
    assert_eq!(late.with_chart(|c| c.viewport()), XRange::new(4.0, 6.0));
}

#[test]
fn test_reset_all_handles_never_zoomed_charts() {
    let (registry, a, b, c) = page();

    assert_eq!(registry.reset_all(), 0);

    drag(&a, 10.0, 90.0);
    assert_eq!(registry.reset_all(), 3);
    for chart in [&a, &b, &c] {
        assert!(!chart.with_chart(|c| c.is_zoomed()));
        assert!(!chart.with_chart(|c| c.reset_visible()));
    }
    assert_eq!(registry.last_zoom(), None);
}

#[test]
fn test_single_chart_reset_propagates() {
    let (_registry, a, b, _c) = page();
    assert!(!b.reset_zoom());

    drag(&a, 10.0, 90.0);
    assert!(b.reset_zoom());
    assert!(!a.with_chart(|c| c.is_zoomed()));
}

#[test]
fn test_unmounted_chart_is_not_reached() {
    let (registry, a, b, c) = page();
    let c_handle = c.handle();
    drop(c);
    assert_eq!(registry.len(), 2);

    drag(&a, 20.0, 60.0);
    assert!(b.with_chart(|c| c.is_zoomed()));
    assert!(!c_handle.borrow().is_zoomed());
}

#[test]
fn test_busy_chart_is_skipped_without_panicking() {
    let (registry, a, b, c) = page();
    let b_handle = b.handle();
    let held = b_handle.borrow();

    drag(&a, 20.0, 60.0);

    assert!(c.with_chart(|c| c.is_zoomed()));
    assert!(!held.is_zoomed());
    assert!(registry.stats().stale_skipped >= 1);
}

#[test]
fn test_late_mount_adopts_zoom() {
    let (registry, a, _b, _c) = page();
    drag(&a, 20.0, 60.0);

    let d = mount(&registry, "memory");
    assert_eq!(d.with_chart(|c| c.viewport()), XRange::new(2.0, 6.0));
}

#[test]
fn test_registries_are_isolated() {
    let (registry, a, _b, _c) = page();
    let other = SyncRegistry::new(SyncConfig::default());
    let elsewhere = mount(&other, "latency");

    drag(&a, 20.0, 60.0);

    assert!(!elsewhere.with_chart(|c| c.is_zoomed()));
    assert_eq!(other.broadcast_count(), 0);
    assert!(registry.broadcast_count() > 0);
}

#[test]
fn test_deep_link_opens_overlay_once() {
    init_logging();
    let url = url_for("https://nyrkio.com/tests/db/write?commit=1700000120#latency");
    let view = ViewState::from_url(&url, "/tests/");
    let mut link = DeepLinkState::from_view_state(&view);

    let registry = SyncRegistry::new(SyncConfig::default());
    let latency = mount(&registry, "latency");
    let tps = mount(&registry, "tps");
    let mut overlay = DetailOverlay::new(11);

    for _render in 0..3 {
        for chart in [&tps, &latency] {
            let action = chart.with_chart(|c| link.take_action(c.dataset()));
            if let Some(index) = action.and_then(|a| a.open_index) {
                overlay.open(index);
            }
        }
        if overlay.is_open() {
            assert_eq!(overlay.index(), Some(2));
            overlay.close();
            link.mark_dismissed();
        }
    }
    assert!(!overlay.is_open());
    assert!(!link.is_pending());
}

#[test]
fn test_overlay_browses_clicked_point() {
    let (_registry, a, _b, _c) = page();
    let dataset = a.with_chart(|c| c.dataset().clone());
    let points: Vec<TimeSeriesPoint> = dataset
        .timestamps
        .iter()
        .map(|t| TimeSeriesPoint {
            timestamp: *t,
            metrics: vec![],
            attributes: Default::default(),
            extra_info: None,
        })
        .collect();

    let mut overlay = DetailOverlay::new(dataset.len());
    let index = drag(&a, 99.0, 99.0).expect("click opens the last point");
    overlay.open(index);

    assert!(!overlay.next());
    let detail = PointDetail::build(&points, &[], &dataset, overlay.index().unwrap()).unwrap();
    assert_eq!(detail.index, 10);
    assert_eq!(detail.label, "run 10");

    assert!(overlay.prev());
    assert_eq!(overlay.index(), Some(9));
}

fn url_for(s: &str) -> url::Url {
    url::Url::parse(s).expect("valid url")
}
