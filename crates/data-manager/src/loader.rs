//! Page-level loading of a test's results and change points
//!
//! Every `load` is tagged with a generation and the test name it was issued
//! for. A response is applied only while its tag is still the latest, so a
//! slow response for a previous test can never overwrite a newer view.

use crate::fetcher::{Fetched, NoDataReason, SeriesApi};
use crate::view_model::build_all_datasets;
use shared_types::{ChangePoint, ChartDataset, TimeSeriesPoint};
use std::cell::RefCell;
use std::rc::Rc;

/// Change points as far as the page knows them
#[derive(Debug, Clone, PartialEq)]
pub enum ChangesState {
    Loaded(Vec<ChangePoint>),
    /// The changes request failed; distinct from "no change points"
    Unavailable(NoDataReason),
}

/// Everything one test page renders
#[derive(Debug, Clone, PartialEq)]
pub struct TestView {
    pub test_name: String,
    pub points: Vec<TimeSeriesPoint>,
    pub changes: ChangesState,
    pub datasets: Vec<ChartDataset>,
}

impl TestView {
    pub fn new(test_name: &str, points: Vec<TimeSeriesPoint>, changes: ChangesState) -> Self {
        let datasets = match &changes {
            ChangesState::Loaded(change_points) => build_all_datasets(&points, change_points),
            ChangesState::Unavailable(_) => build_all_datasets(&points, &[]),
        };

        Self {
            test_name: test_name.to_string(),
            points,
            changes,
            datasets,
        }
    }

    /// Change points usable for overlays; empty when they could not be fetched
    pub fn change_points(&self) -> &[ChangePoint] {
        match &self.changes {
            ChangesState::Loaded(change_points) => change_points,
            ChangesState::Unavailable(_) => &[],
        }
    }

    pub fn dataset(&self, metric_name: &str) -> Option<&ChartDataset> {
        self.datasets.iter().find(|d| d.metric_name == metric_name)
    }
}

/// Load state of the page
#[derive(Debug, Clone, Default, PartialEq)]
pub enum PageLoad {
    #[default]
    Idle,
    Loading {
        test_name: String,
    },
    Ready(Rc<TestView>),
    NoData {
        test_name: String,
        reason: NoDataReason,
    },
}

impl PageLoad {
    /// Inline status line for the page, if one should be shown
    pub fn status_text(&self) -> Option<&'static str> {
        match self {
            PageLoad::Idle => None,
            PageLoad::Loading { .. } => Some("Loading…"),
            PageLoad::NoData { .. } => Some("No data"),
            PageLoad::Ready(view) if view.datasets.is_empty() => Some("No data"),
            PageLoad::Ready(view) => match &view.changes {
                ChangesState::Loaded(change_points) if change_points.is_empty() => {
                    Some("(no changepoints)")
                }
                ChangesState::Loaded(_) => None,
                ChangesState::Unavailable(_) => Some("(changepoints unavailable)"),
            },
        }
    }

    pub fn test_name(&self) -> Option<&str> {
        match self {
            PageLoad::Idle => None,
            PageLoad::Loading { test_name } | PageLoad::NoData { test_name, .. } => {
                Some(test_name.as_str())
            }
            PageLoad::Ready(view) => Some(view.test_name.as_str()),
        }
    }
}

/// What happened to a response when it arrived
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    Applied,
    /// A newer load or navigation happened while this one was in flight
    Superseded,
}

struct LoaderState {
    generation: u64,
    page: PageLoad,
}

/// Loads test views while discarding out-of-order responses
pub struct TestViewLoader<A: SeriesApi> {
    api: A,
    state: RefCell<LoaderState>,
}

impl<A: SeriesApi> TestViewLoader<A> {
    pub fn new(api: A) -> Self {
        Self {
            api,
            state: RefCell::new(LoaderState {
                generation: 0,
                page: PageLoad::Idle,
            }),
        }
    }

    pub fn page(&self) -> PageLoad {
        self.state.borrow().page.clone()
    }

    pub fn generation(&self) -> u64 {
        self.state.borrow().generation
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    /// Fetch results and change points for `test_name` and apply them unless superseded
    pub async fn load(&self, test_name: &str) -> LoadOutcome {
        let ticket = {
            let mut state = self.state.borrow_mut();
            state.generation += 1;
            state.page = PageLoad::Loading {
                test_name: test_name.to_string(),
            };
            state.generation
        };
        log::debug!("[TestViewLoader] Loading {test_name} (generation {ticket})");

        let (series, changes) = futures::join!(
            self.api.fetch_series(test_name),
            self.api.fetch_changes(test_name)
        );

        let mut state = self.state.borrow_mut();
        let still_current = state.generation == ticket
            && matches!(&state.page, PageLoad::Loading { test_name: t } if t == test_name);
        if !still_current {
            log::debug!(
                "[TestViewLoader] Discarding response for {test_name} (generation {ticket}, current {})",
                state.generation
            );
            return LoadOutcome::Superseded;
        }

        state.page = match series {
            Fetched::Data(points) => {
                let changes = match changes {
                    Fetched::Data(change_points) => ChangesState::Loaded(change_points),
                    Fetched::NoData(reason) => ChangesState::Unavailable(reason),
                };
                PageLoad::Ready(Rc::new(TestView::new(test_name, points, changes)))
            }
            Fetched::NoData(reason) => PageLoad::NoData {
                test_name: test_name.to_string(),
                reason,
            },
        };
        LoadOutcome::Applied
    }

    /// Forget the current page; responses still in flight will be discarded
    pub fn abandon(&self) {
        let mut state = self.state.borrow_mut();
        state.generation += 1;
        state.page = PageLoad::Idle;
    }
}
