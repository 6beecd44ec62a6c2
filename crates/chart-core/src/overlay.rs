//! Detail overlay for a single point

use serde::Serialize;
use serde_json::{Map, Value};
use shared_types::{Attributes, ChangePoint, ChartDataset, TimeSeriesPoint};

/// Which point, if any, the overlay shows
///
/// Prev/next stop at the ends of the series; at a boundary they leave the
/// overlay unchanged and return `false`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DetailOverlay {
    index: Option<usize>,
    len: usize,
}

impl DetailOverlay {
    pub fn new(len: usize) -> Self {
        Self { index: None, len }
    }

    pub fn open(&mut self, index: usize) -> bool {
        if index >= self.len {
            return false;
        }
        self.index = Some(index);
        true
    }

    pub fn close(&mut self) {
        self.index = None;
    }

    pub fn next(&mut self) -> bool {
        match self.index {
            Some(index) if index + 1 < self.len => {
                self.index = Some(index + 1);
                true
            }
            _ => false,
        }
    }

    pub fn prev(&mut self) -> bool {
        match self.index {
            Some(index) if index > 0 => {
                self.index = Some(index - 1);
                true
            }
            _ => false,
        }
    }

    pub fn is_open(&self) -> bool {
        self.index.is_some()
    }

    pub fn index(&self) -> Option<usize> {
        self.index
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

/// Everything the overlay renders for one point
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PointDetail {
    pub index: usize,
    pub timestamp: i64,
    pub label: String,
    pub metric_name: String,
    /// Raw value, never magnitude-scaled
    pub value: Option<f64>,
    pub unit: String,
    pub attributes: Attributes,
    pub extra_info: Option<Map<String, Value>>,
    /// Every field the change point reports for this metric
    pub change_fields: Vec<(String, Value)>,
    pub commit_url: Option<String>,
}

impl PointDetail {
    pub fn build(
        points: &[TimeSeriesPoint],
        change_points: &[ChangePoint],
        dataset: &ChartDataset,
        index: usize,
    ) -> Option<Self> {
        let timestamp = *dataset.timestamps.get(index)?;
        let point = points.iter().find(|p| p.timestamp == timestamp)?;

        let change_fields = change_points
            .iter()
            .find(|cp| cp.time == timestamp)
            .and_then(|cp| cp.change_for(&dataset.metric_name))
            .map(|change| change.fields())
            .unwrap_or_default();

        Some(Self {
            index,
            timestamp,
            label: dataset.labels.get(index).cloned().unwrap_or_default(),
            metric_name: dataset.metric_name.clone(),
            value: dataset.value_at(index),
            unit: dataset.unit.clone(),
            commit_url: commit_url(&point.attributes),
            attributes: point.attributes.clone(),
            extra_info: point.extra_info.clone(),
            change_fields,
        })
    }
}

/// Link to the commit page of a GitHub-hosted repository
pub fn commit_url(attributes: &Attributes) -> Option<String> {
    let repo = attributes.git_repo.as_deref()?;
    let commit = attributes.git_commit.as_deref().filter(|c| !c.is_empty())?;
    if !repo.starts_with("https://github.com/") {
        return None;
    }
    let repo = repo.trim_end_matches('/');
    let repo = repo.strip_suffix(".git").unwrap_or(repo);
    Some(format!("{repo}/commit/{commit}"))
}
