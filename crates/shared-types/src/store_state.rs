// Page view state: which test is shown and what the URL selects within it.
// Mirrors the router state of the dashboard page.

use serde::{Deserialize, Serialize};
use url::Url;

/// Query parameters that carry a selected timestamp
pub const SELECTED_TIMESTAMP_PARAMS: [&str; 2] = ["commit", "timestamp"];

/// View state derived from the page URL
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ViewState {
    pub test_name: String,
    /// Timestamp selected through the query string
    pub selected_timestamp: Option<i64>,
    /// Metric named by the URL fragment
    pub focus_metric: Option<String>,
}

/// View state validation result
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ViewValidationResult {
    pub is_valid: bool,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

/// Detailed change detection result
#[derive(Debug, Clone, PartialEq)]
pub struct StateChangeDetection {
    pub has_changes: bool,
    pub test_changed: bool,
    pub selection_changed: bool,
    pub focus_changed: bool,
    pub requires_data_fetch: bool,
    pub requires_render: bool,
    pub change_summary: Vec<String>,
}

impl ViewState {
    /// Parse the view state of a test page URL such as
    /// `https://host/tests/group/bench?commit=1700000000#latency_p99`.
    ///
    /// `route_prefix` is the path under which test names live (`/tests/`).
    pub fn from_url(url: &Url, route_prefix: &str) -> Self {
        let path = url.path();
        let test_path = path.strip_prefix(route_prefix).unwrap_or(path);
        let test_name = test_path
            .split('/')
            .filter(|segment| !segment.is_empty())
            .map(percent_decode)
            .collect::<Vec<_>>()
            .join("/");

        let selected_timestamp = url
            .query_pairs()
            .find(|(key, _)| SELECTED_TIMESTAMP_PARAMS.contains(&key.as_ref()))
            .and_then(|(_, value)| value.trim().parse::<i64>().ok());

        let focus_metric = url
            .fragment()
            .map(percent_decode)
            .filter(|metric| !metric.is_empty());

        Self {
            test_name,
            selected_timestamp,
            focus_metric,
        }
    }

    /// Validate the view state
    pub fn validate(&self) -> ViewValidationResult {
        let mut errors = Vec::new();
        let mut warnings = Vec::new();

        if self.test_name.is_empty() {
            errors.push("Test name cannot be empty".to_string());
        } else if self.test_name.split('/').any(|segment| segment.is_empty()) {
            errors.push(format!("Test name has an empty segment: {}", self.test_name));
        }

        if self.focus_metric.is_some() && self.selected_timestamp.is_none() {
            warnings.push("Metric fragment without a selected timestamp".to_string());
        }

        ViewValidationResult {
            is_valid: errors.is_empty(),
            errors,
            warnings,
        }
    }

    /// Compare with the previous state to decide whether to refetch or re-render
    pub fn detect_changes_from(&self, previous: &ViewState) -> StateChangeDetection {
        let mut change_summary = Vec::new();

        let test_changed = self.test_name != previous.test_name;
        if test_changed {
            change_summary.push(format!(
                "Test changed: {} → {}",
                previous.test_name, self.test_name
            ));
        }

        let selection_changed = self.selected_timestamp != previous.selected_timestamp;
        if selection_changed {
            change_summary.push(format!(
                "Selection changed: {:?} → {:?}",
                previous.selected_timestamp, self.selected_timestamp
            ));
        }

        let focus_changed = self.focus_metric != previous.focus_metric;
        if focus_changed {
            change_summary.push(format!(
                "Focus changed: {:?} → {:?}",
                previous.focus_metric, self.focus_metric
            ));
        }

        let has_changes = test_changed || selection_changed || focus_changed;

        StateChangeDetection {
            has_changes,
            test_changed,
            selection_changed,
            focus_changed,
            requires_data_fetch: test_changed,
            requires_render: has_changes,
            change_summary,
        }
    }
}

fn percent_decode(input: &str) -> String {
    urlencoding::decode(input)
        .map(|decoded| decoded.into_owned())
        .unwrap_or_else(|_| input.to_string())
}
