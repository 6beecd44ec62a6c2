//! WASM bridge for perfcharts
//! Orchestration layer between the dashboard page and the Rust chart core

use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::rc::Rc;
use std::sync::Once;

use chart_core::{
    ChartGeometry, ChartId, ChartInstance, DeepLinkState, DetailOverlay, PointDetail,
    SyncRegistry, SyncedChart,
};
use config_system::{ChartSettings, ConfigFormat, ConfigParser, SettingsStore};
use data_manager::{HttpSeriesApi, PageLoad, TestTree, TestView, TestViewLoader};
use serde::Serialize;
use shared_types::store_state::ViewState;
use shared_types::{ChartDataset, ErrorResponse, PerfChartsError, PerfChartsResult};
use wasm_bindgen::prelude::*;
use wasm_storage::BrowserStorage;

pub mod page;

use page::PageSummary;

/// Path under which test pages live
const TEST_ROUTE_PREFIX: &str = "/tests/";

static INIT: Once = Once::new();

fn init_runtime() {
    INIT.call_once(|| {
        std::panic::set_hook(Box::new(console_error_panic_hook::hook));
        // Another logger may already be installed by the host page
        let _ = console_log::init_with_level(log::Level::Debug);
    });
}

fn to_js(error: PerfChartsError, operation: &str) -> JsValue {
    JsValue::from_str(&ErrorResponse::new(error).with_context("Dashboard", operation).to_json())
}

fn to_value<T: Serialize>(value: &T, operation: &str) -> Result<JsValue, JsValue> {
    serde_wasm_bindgen::to_value(value).map_err(|e| {
        to_js(
            PerfChartsError::JsInterop {
                message: e.to_string(),
            },
            operation,
        )
    })
}

/// The detail overlay and the chart it belongs to
struct OpenDetail {
    chart: ChartId,
    overlay: DetailOverlay,
}

/// One dashboard page: its charts, their sync registry and the loaded test
#[wasm_bindgen]
pub struct Dashboard {
    settings: ChartSettings,
    registry: Rc<SyncRegistry>,
    loader: Rc<TestViewLoader<HttpSeriesApi>>,
    charts: RefCell<HashMap<ChartId, SyncedChart>>,
    deep_link: RefCell<DeepLinkState>,
    detail: RefCell<Option<OpenDetail>>,
    /// Ids of charts this page has unmounted
    retired: RefCell<HashSet<ChartId>>,
}

#[wasm_bindgen]
impl Dashboard {
    /// Settings come from `settings_json` when given, otherwise from localStorage.
    /// The auth token is always read from localStorage.
    #[wasm_bindgen(constructor)]
    pub fn new(settings_json: Option<String>) -> Result<Dashboard, JsValue> {
        init_runtime();

        let store = SettingsStore::load(BrowserStorage::local());
        let settings = match settings_json {
            Some(json) => ConfigParser::parse_string(&json, ConfigFormat::Json).map_err(|e| {
                to_js(
                    PerfChartsError::InvalidConfig {
                        message: e.to_string(),
                        field: None,
                    },
                    "new",
                )
            })?,
            None => store.settings().clone(),
        };

        let api = HttpSeriesApi::new(&settings.api.base_url)
            .map_err(|e| {
                to_js(
                    PerfChartsError::InvalidConfig {
                        message: e.to_string(),
                        field: Some("api.base_url".to_string()),
                    },
                    "new",
                )
            })?
            .with_token(store.token());

        log::info!("Dashboard created for {}", settings.api.base_url);
        Ok(Dashboard {
            registry: SyncRegistry::new(settings.sync.clone()),
            loader: Rc::new(TestViewLoader::new(api)),
            charts: RefCell::new(HashMap::new()),
            deep_link: RefCell::new(DeepLinkState::default()),
            detail: RefCell::new(None),
            retired: RefCell::new(HashSet::new()),
            settings,
        })
    }

    /// Adopt the page URL's deep link; returns the test name it names.
    /// Repeating the same location keeps a dismissed overlay closed.
    #[wasm_bindgen]
    pub fn set_location(&self, href: &str) -> Result<String, JsValue> {
        let url = url::Url::parse(href).map_err(|e| {
            to_js(
                PerfChartsError::DataParse {
                    message: format!("{href}: {e}"),
                    offset: None,
                },
                "set_location",
            )
        })?;
        let view = ViewState::from_url(&url, TEST_ROUTE_PREFIX);
        let validation = view.validate();
        if !validation.is_valid {
            return Err(to_js(
                PerfChartsError::DataParse {
                    message: format!("{href}: {}", validation.errors.join("; ")),
                    offset: None,
                },
                "set_location",
            ));
        }
        for warning in &validation.warnings {
            log::warn!("[Dashboard] {href}: {warning}");
        }
        self.deep_link.borrow_mut().follow(&view);
        Ok(view.test_name)
    }

    /// Same as [`Dashboard::set_location`] with the window's current URL
    #[wasm_bindgen]
    pub fn set_location_from_window(&self) -> Result<String, JsValue> {
        let href = web_sys::window()
            .ok_or_else(|| JsValue::from_str("No window object"))?
            .location()
            .href()?;
        self.set_location(&href)
    }

    /// Load a test's results and change points.
    ///
    /// Charts of the previous test are unmounted first. The summary's
    /// `applied` is `false` when a later call superseded this one.
    #[wasm_bindgen]
    pub async fn load_test(&self, test_name: String) -> Result<JsValue, JsValue> {
        self.clear_charts();

        let loader = Rc::clone(&self.loader);
        let outcome = loader.load(&test_name).await;
        to_value(&PageSummary::new(&loader.page(), outcome), "load_test")
    }

    /// Forget the current test; responses still in flight are discarded
    #[wasm_bindgen]
    pub fn leave_page(&self) {
        self.clear_charts();
        self.loader.abandon();
    }

    /// Mount a chart for one metric of the loaded test
    #[wasm_bindgen]
    pub fn mount_metric(&self, metric_name: &str, width: f64, height: f64) -> Result<String, JsValue> {
        let view = self.current_view().map_err(|e| to_js(e, "mount_metric"))?;
        let dataset = view
            .dataset(metric_name)
            .cloned()
            .ok_or_else(|| {
                to_js(
                    PerfChartsError::DataNotFound {
                        resource: format!("{}#{metric_name}", view.test_name),
                    },
                    "mount_metric",
                )
            })?;
        Ok(self.mount(dataset, view.change_points(), width, height))
    }

    /// Mount a chart from a serialized dataset, without change-point details
    #[wasm_bindgen]
    pub fn mount_chart(&self, dataset_json: &str, width: f64, height: f64) -> Result<String, JsValue> {
        let dataset: ChartDataset = serde_json::from_str(dataset_json)
            .map_err(|e| to_js(PerfChartsError::from(e), "mount_chart"))?;
        Ok(self.mount(dataset, &[], width, height))
    }

    #[wasm_bindgen]
    pub fn unmount_chart(&self, id: &str) -> bool {
        let Some(id) = ChartId::parse(id) else {
            return false;
        };
        let removed = self.charts.borrow_mut().remove(&id);
        if removed.is_some() {
            self.retired.borrow_mut().insert(id);
        }
        let mut detail = self.detail.borrow_mut();
        if detail.as_ref().is_some_and(|d| d.chart == id) {
            *detail = None;
        }
        removed.is_some()
    }

    #[wasm_bindgen]
    pub fn resize(&self, id: &str, width: f64, height: f64) -> Result<(), JsValue> {
        self.with_synced(id, "resize", |chart| {
            chart
                .handle()
                .borrow_mut()
                .set_geometry(ChartGeometry { width, height })
        })
    }

    /// Pointer moved over a chart
    #[wasm_bindgen]
    pub fn pointer_move(&self, id: &str, x: f64, y: f64) -> Result<Option<usize>, JsValue> {
        self.with_synced(id, "pointer_move", |chart| chart.pointer_move(x, y))
    }

    #[wasm_bindgen]
    pub fn pointer_down(&self, id: &str, x: f64, y: f64) -> Result<Option<usize>, JsValue> {
        self.with_synced(id, "pointer_down", |chart| chart.pointer_down(x, y))
    }

    /// Mouse-up; returns the point index to open the detail overlay for
    #[wasm_bindgen]
    pub fn pointer_up(&self, id: &str, x: f64, y: f64) -> Result<Option<usize>, JsValue> {
        self.with_synced(id, "pointer_up", |chart| chart.pointer_up(x, y))
    }

    #[wasm_bindgen]
    pub fn pointer_leave(&self, id: &str) -> Result<Option<usize>, JsValue> {
        self.with_synced(id, "pointer_leave", |chart| chart.pointer_leave())
    }

    /// The chart's own reset-zoom control
    #[wasm_bindgen]
    pub fn reset_zoom(&self, id: &str) -> Result<bool, JsValue> {
        self.with_synced(id, "reset_zoom", |chart| chart.reset_zoom())
    }

    /// Reset every chart on the page; returns how many were zoomed
    #[wasm_bindgen]
    pub fn reset_all(&self) -> usize {
        self.registry.reset_all()
    }

    #[wasm_bindgen]
    pub fn chart_state(&self, id: &str) -> Result<JsValue, JsValue> {
        let snapshot = self.with_synced(id, "chart_state", |chart| {
            chart.with_chart(|c| c.snapshot())
        })?;
        to_value(&snapshot, "chart_state")
    }

    #[wasm_bindgen]
    pub fn point_styles(&self, id: &str) -> Result<JsValue, JsValue> {
        let styles = self.with_synced(id, "point_styles", |chart| {
            chart.with_chart(|c| c.point_styles())
        })?;
        to_value(&styles, "point_styles")
    }

    #[wasm_bindgen]
    pub fn sync_stats(&self) -> Result<JsValue, JsValue> {
        to_value(&self.registry.stats(), "sync_stats")
    }

    #[wasm_bindgen]
    pub fn mounted_ids(&self) -> js_sys::Array {
        self.charts
            .borrow()
            .keys()
            .map(|id| JsValue::from_str(&id.to_string()))
            .collect()
    }

    /// Deep-link action for a freshly rendered chart, or `null`.
    ///
    /// Fires at most once per page load and opens the overlay when the linked
    /// timestamp is in the series.
    #[wasm_bindgen]
    pub fn take_deep_link(&self, id: &str) -> Result<JsValue, JsValue> {
        let (chart_id, action, len) = self.with_synced(id, "take_deep_link", |chart| {
            chart.with_chart(|c| {
                let action = self.deep_link.borrow_mut().take_action(c.dataset());
                (chart.id(), action, c.dataset().len())
            })
        })?;

        let Some(action) = action else {
            return Ok(JsValue::NULL);
        };
        if let Some(index) = action.open_index {
            let mut overlay = DetailOverlay::new(len);
            overlay.open(index);
            *self.detail.borrow_mut() = Some(OpenDetail {
                chart: chart_id,
                overlay,
            });
        }
        to_value(&action, "take_deep_link")
    }

    /// Open the detail overlay on `index` of a chart
    #[wasm_bindgen]
    pub fn open_detail(&self, id: &str, index: usize) -> Result<JsValue, JsValue> {
        let (chart_id, len) = self.with_synced(id, "open_detail", |chart| {
            (chart.id(), chart.with_chart(|c| c.dataset().len()))
        })?;
        let mut overlay = DetailOverlay::new(len);
        if !overlay.open(index) {
            return Ok(JsValue::NULL);
        }
        *self.detail.borrow_mut() = Some(OpenDetail {
            chart: chart_id,
            overlay,
        });
        self.current_detail()
    }

    #[wasm_bindgen]
    pub fn detail_next(&self) -> Result<JsValue, JsValue> {
        if let Some(open) = self.detail.borrow_mut().as_mut() {
            open.overlay.next();
        }
        self.current_detail()
    }

    #[wasm_bindgen]
    pub fn detail_prev(&self) -> Result<JsValue, JsValue> {
        if let Some(open) = self.detail.borrow_mut().as_mut() {
            open.overlay.prev();
        }
        self.current_detail()
    }

    /// User dismissed the overlay; the deep link will not reopen it
    #[wasm_bindgen]
    pub fn close_detail(&self) {
        *self.detail.borrow_mut() = None;
        self.deep_link.borrow_mut().mark_dismissed();
    }

    /// Detail of the point the overlay currently shows, or `null`
    #[wasm_bindgen]
    pub fn current_detail(&self) -> Result<JsValue, JsValue> {
        let Some((chart_id, index)) = self
            .detail
            .borrow()
            .as_ref()
            .and_then(|open| open.overlay.index().map(|index| (open.chart, index)))
        else {
            return Ok(JsValue::NULL);
        };

        let view = match self.loader.page() {
            PageLoad::Ready(view) => Some(view),
            _ => None,
        };
        let charts = self.charts.borrow();
        let Some(chart) = charts.get(&chart_id) else {
            return Ok(JsValue::NULL);
        };
        let detail = chart.with_chart(|c| {
            let points = view.as_ref().map(|v| v.points.as_slice()).unwrap_or_default();
            PointDetail::build(points, c.change_points(), c.dataset(), index)
        });
        match detail {
            Some(detail) => to_value(&detail, "current_detail"),
            None => Ok(JsValue::NULL),
        }
    }

    /// Resolve a route path against a list of test names
    #[wasm_bindgen]
    pub fn resolve_route(&self, test_names: JsValue, path: &str) -> Result<JsValue, JsValue> {
        let names: Vec<String> = serde_wasm_bindgen::from_value(test_names).map_err(|e| {
            to_js(
                PerfChartsError::JsInterop {
                    message: e.to_string(),
                },
                "resolve_route",
            )
        })?;
        to_value(&TestTree::from_names(&names).resolve(path), "resolve_route")
    }

    #[wasm_bindgen]
    pub fn settings(&self) -> Result<JsValue, JsValue> {
        to_value(&self.settings, "settings")
    }
}

impl Dashboard {
    fn mount(
        &self,
        dataset: ChartDataset,
        change_points: &[shared_types::ChangePoint],
        width: f64,
        height: f64,
    ) -> String {
        let mut chart = ChartInstance::new(dataset, change_points, &self.settings);
        chart.set_geometry(ChartGeometry { width, height });
        chart.set_selected_timestamp(self.deep_link.borrow().selected_timestamp());

        let synced = SyncedChart::mount(chart, &self.registry);
        let id = synced.id();
        self.charts.borrow_mut().insert(id, synced);
        id.to_string()
    }

    fn clear_charts(&self) {
        let charts: Vec<SyncedChart> = self.charts.borrow_mut().drain().map(|(_, c)| c).collect();
        self.retired.borrow_mut().extend(charts.iter().map(SyncedChart::id));
        *self.detail.borrow_mut() = None;
        // Dropping unregisters each chart
        drop(charts);
    }

    fn current_view(&self) -> PerfChartsResult<Rc<TestView>> {
        match self.loader.page() {
            PageLoad::Ready(view) => Ok(view),
            other => Err(PerfChartsError::DataNotFound {
                resource: other.test_name().unwrap_or("test").to_string(),
            }),
        }
    }

    fn with_synced<F, R>(&self, id: &str, operation: &str, f: F) -> Result<R, JsValue>
    where
        F: FnOnce(&SyncedChart) -> R,
    {
        let charts = self.charts.borrow();
        ChartId::parse(id)
            .and_then(|id| charts.get(&id))
            .map(f)
            .ok_or_else(|| to_js(missing_chart(id, &self.retired.borrow()), operation))
    }
}

/// Error for an id with no mounted chart; ids this page unmounted are stale
fn missing_chart(id: &str, retired: &HashSet<ChartId>) -> PerfChartsError {
    match ChartId::parse(id) {
        Some(chart) if retired.contains(&chart) => {
            PerfChartsError::StaleHandle { id: id.to_string() }
        }
        _ => PerfChartsError::InstanceNotFound { id: id.to_string() },
    }
}
