//! Data Manager crate for perfcharts
//! Fetches test results and change points and shapes them into chart datasets

pub mod fetcher;
pub mod loader;
pub mod test_tree;
pub mod view_model;

pub use fetcher::{FetchError, Fetched, HttpSeriesApi, NoDataReason, SeriesApi};
pub use loader::{ChangesState, LoadOutcome, PageLoad, TestView, TestViewLoader};
pub use test_tree::{Route, TestTree, TreeEntry};
pub use view_model::{build_all_datasets, build_chart_dataset, format_timestamp, metric_names};
