//! One-shot deep link into a point's detail overlay
//!
//! A page URL carrying a timestamp query parameter and a metric fragment
//! opens that metric's overlay on first render. Once acted on, or once the
//! user dismisses the overlay, the link never fires again until the location
//! points somewhere else.

use serde::Serialize;
use shared_types::store_state::ViewState;
use shared_types::ChartDataset;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeepLinkAction {
    pub metric_name: String,
    /// `None` when the linked timestamp is not in the series
    pub open_index: Option<usize>,
    pub scroll_into_view: bool,
}

#[derive(Debug, Clone, Default)]
pub struct DeepLinkState {
    selected_timestamp: Option<i64>,
    focus_metric: Option<String>,
    consumed: bool,
    dismissed: bool,
    /// Location the link was built from
    source: Option<ViewState>,
}

impl DeepLinkState {
    pub fn from_view_state(view: &ViewState) -> Self {
        Self {
            selected_timestamp: view.selected_timestamp,
            focus_metric: view.focus_metric.clone(),
            consumed: false,
            dismissed: false,
            source: Some(view.clone()),
        }
    }

    /// Follow a location report, which the host may repeat on any re-render.
    /// Returns true when the link was re-armed for a different location.
    pub fn follow(&mut self, view: &ViewState) -> bool {
        if let Some(previous) = &self.source {
            let changes = view.detect_changes_from(previous);
            if !changes.has_changes {
                return false;
            }
            log::debug!("[DeepLinkState] {}", changes.change_summary.join(", "));
        }
        *self = Self::from_view_state(view);
        true
    }

    /// Timestamp whose point every chart bolds
    pub fn selected_timestamp(&self) -> Option<i64> {
        self.selected_timestamp
    }

    pub fn is_pending(&self) -> bool {
        !self.consumed
            && !self.dismissed
            && self.selected_timestamp.is_some()
            && self.focus_metric.is_some()
    }

    /// Action for the chart rendering `dataset`, at most once per page load
    pub fn take_action(&mut self, dataset: &ChartDataset) -> Option<DeepLinkAction> {
        if !self.is_pending() || self.focus_metric.as_deref() != Some(dataset.metric_name.as_str())
        {
            return None;
        }
        self.consumed = true;

        let open_index = self
            .selected_timestamp
            .and_then(|t| dataset.index_of_timestamp(t));
        if open_index.is_none() {
            log::debug!(
                "[DeepLinkState] Linked timestamp not in {} series",
                dataset.metric_name
            );
        }
        Some(DeepLinkAction {
            metric_name: dataset.metric_name.clone(),
            open_index,
            scroll_into_view: true,
        })
    }

    pub fn mark_dismissed(&mut self) {
        self.dismissed = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dataset(metric: &str) -> ChartDataset {
        ChartDataset {
            metric_name: metric.to_string(),
            timestamps: vec![100, 200, 300],
            values: vec![Some(1.0), Some(2.0), Some(3.0)],
            ..Default::default()
        }
    }

    fn linked() -> DeepLinkState {
        DeepLinkState::from_view_state(&ViewState {
            test_name: "bench".to_string(),
            selected_timestamp: Some(200),
            focus_metric: Some("latency".to_string()),
        })
    }

    #[test]
    fn test_fires_once_for_matching_chart() {
        let mut link = linked();

        assert_eq!(link.take_action(&dataset("tps")), None);
        assert_eq!(
            link.take_action(&dataset("latency")),
            Some(DeepLinkAction {
                metric_name: "latency".to_string(),
                open_index: Some(1),
                scroll_into_view: true,
            })
        );
        assert_eq!(link.take_action(&dataset("latency")), None);
        assert_eq!(link.selected_timestamp(), Some(200));
    }

    #[test]
    fn test_dismissal_prevents_reopen() {
        let mut link = linked();
        link.mark_dismissed();
        assert_eq!(link.take_action(&dataset("latency")), None);
    }

    #[test]
    fn test_repeated_location_keeps_dismissal() {
        let view = ViewState {
            test_name: "bench".to_string(),
            selected_timestamp: Some(200),
            focus_metric: Some("latency".to_string()),
        };
        let mut link = DeepLinkState::default();
        assert!(link.follow(&view));
        assert!(link.take_action(&dataset("latency")).is_some());
        link.mark_dismissed();

        assert!(!link.follow(&view));
        assert!(!link.is_pending());
        assert_eq!(link.take_action(&dataset("latency")), None);
    }

    #[test]
    fn test_new_selection_rearms_link() {
        let mut link = linked();
        link.mark_dismissed();

        let moved = ViewState {
            test_name: "bench".to_string(),
            selected_timestamp: Some(300),
            focus_metric: Some("latency".to_string()),
        };
        assert!(link.follow(&moved));
        assert_eq!(link.selected_timestamp(), Some(300));
        assert_eq!(
            link.take_action(&dataset("latency")).and_then(|a| a.open_index),
            Some(2)
        );
    }

    #[test]
    fn test_needs_both_timestamp_and_metric() {
        let mut link = DeepLinkState::from_view_state(&ViewState {
            test_name: "bench".to_string(),
            selected_timestamp: Some(200),
            focus_metric: None,
        });
        assert!(!link.is_pending());
        assert_eq!(link.take_action(&dataset("latency")), None);
    }
}
