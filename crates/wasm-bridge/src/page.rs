//! Serializable page summaries handed back to JavaScript

use data_manager::{ChangesState, LoadOutcome, PageLoad};
use serde::Serialize;
use shared_types::ChartDataset;

#[derive(Debug, Serialize)]
pub struct PageSummary {
    pub test_name: Option<String>,
    /// `false` when a newer load replaced this one while it was in flight
    pub applied: bool,
    pub status: Option<&'static str>,
    pub no_data_reason: Option<String>,
    pub metrics: Vec<MetricSummary>,
    pub change_point_count: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct MetricSummary {
    pub metric_name: String,
    pub axis_label: String,
    pub points: usize,
    pub change_points: usize,
}

impl From<&ChartDataset> for MetricSummary {
    fn from(dataset: &ChartDataset) -> Self {
        Self {
            metric_name: dataset.metric_name.clone(),
            axis_label: dataset.axis_label(),
            points: dataset.len(),
            change_points: dataset.change_point_indexes.len(),
        }
    }
}

impl PageSummary {
    pub fn new(page: &PageLoad, outcome: LoadOutcome) -> Self {
        let (metrics, change_point_count, no_data_reason) = match page {
            PageLoad::Ready(view) => (
                view.datasets.iter().map(MetricSummary::from).collect(),
                match &view.changes {
                    ChangesState::Loaded(change_points) => Some(change_points.len()),
                    ChangesState::Unavailable(_) => None,
                },
                None,
            ),
            PageLoad::NoData { reason, .. } => (Vec::new(), None, Some(reason.to_string())),
            PageLoad::Idle | PageLoad::Loading { .. } => (Vec::new(), None, None),
        };

        Self {
            test_name: page.test_name().map(str::to_string),
            applied: outcome == LoadOutcome::Applied,
            status: page.status_text(),
            no_data_reason,
            metrics,
            change_point_count,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use data_manager::{NoDataReason, TestView};
    use shared_types::{Metric, TimeSeriesPoint};
    use std::rc::Rc;

    #[test]
    fn test_no_data_summary() {
        let page = PageLoad::NoData {
            test_name: "db/write".to_string(),
            reason: NoDataReason::Status(404),
        };
        let summary = PageSummary::new(&page, LoadOutcome::Applied);

        assert_eq!(summary.test_name.as_deref(), Some("db/write"));
        assert_eq!(summary.status, Some("No data"));
        assert_eq!(summary.no_data_reason.as_deref(), Some("Not found"));
        assert!(summary.metrics.is_empty());
    }

    #[test]
    fn test_unavailable_changes_have_no_count() {
        let points = vec![TimeSeriesPoint {
            timestamp: 1,
            metrics: vec![Metric {
                name: "latency".to_string(),
                unit: "ms".to_string(),
                value: 4.0,
                direction: Default::default(),
            }],
            attributes: Default::default(),
            extra_info: None,
        }];
        let view = TestView::new(
            "bench",
            points,
            ChangesState::Unavailable(NoDataReason::Status(500)),
        );
        let summary = PageSummary::new(&PageLoad::Ready(Rc::new(view)), LoadOutcome::Superseded);

        assert!(!summary.applied);
        assert_eq!(summary.change_point_count, None);
        assert_eq!(summary.status, Some("(changepoints unavailable)"));
        assert_eq!(summary.metrics[0].points, 1);
    }
}
