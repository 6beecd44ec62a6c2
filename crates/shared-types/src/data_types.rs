//! Wire types delivered by the results API and the per-metric dataset
//! derived from them.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

#[cfg(feature = "typescript")]
use tsify::Tsify;

/// Whether a larger value of a metric is an improvement or a regression
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "typescript", derive(Tsify))]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    HigherIsBetter,
    #[default]
    LowerIsBetter,
}

/// A single named measurement recorded at a timestamp
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Metric {
    pub name: String,
    #[serde(default)]
    pub unit: String,
    pub value: f64,
    #[serde(default)]
    pub direction: Direction,
}

/// Commit metadata attached to a result or a change point
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Attributes {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub git_repo: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub git_commit: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub branch: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub commit_msg: Option<String>,
    #[serde(flatten)]
    pub other: BTreeMap<String, Value>,
}

/// One benchmark run: every metric measured at `timestamp`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TimeSeriesPoint {
    /// Unix seconds
    pub timestamp: i64,
    #[serde(default)]
    pub metrics: Vec<Metric>,
    #[serde(default)]
    pub attributes: Attributes,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extra_info: Option<Map<String, Value>>,
}

impl TimeSeriesPoint {
    pub fn metric(&self, name: &str) -> Option<&Metric> {
        self.metrics.iter().find(|m| m.name == name)
    }
}

/// Statistics reported for one metric at a change point
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Change {
    pub metric: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub forward_change_percent: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mean_before: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mean_after: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pvalue: Option<f64>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl Change {
    /// All reported fields as `(name, value)` pairs, known fields first
    pub fn fields(&self) -> Vec<(String, Value)> {
        let mut out = Vec::new();
        let known = [
            ("forward_change_percent", self.forward_change_percent),
            ("mean_before", self.mean_before),
            ("mean_after", self.mean_after),
            ("pvalue", self.pvalue),
        ];
        for (name, value) in known {
            if let Some(v) = value {
                out.push((name.to_string(), Value::from(v)));
            }
        }
        for (name, value) in &self.extra {
            out.push((name.clone(), value.clone()));
        }
        out
    }
}

/// A timestamp at which the detection service reported one or more shifts
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChangePoint {
    pub time: i64,
    #[serde(default)]
    pub attributes: Attributes,
    #[serde(default)]
    pub changes: Vec<Change>,
}

impl ChangePoint {
    pub fn change_for(&self, metric: &str) -> Option<&Change> {
        self.changes.iter().find(|c| c.metric == metric)
    }

    pub fn reports(&self, metric: &str) -> bool {
        self.change_for(metric).is_some()
    }
}

/// Power-of-ten bucket used to keep large axis values readable
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[cfg_attr(feature = "typescript", derive(Tsify))]
#[serde(rename_all = "lowercase")]
pub enum MagnitudeScale {
    Million,
    Billion,
    Trillion,
}

impl MagnitudeScale {
    pub fn divisor(self) -> f64 {
        match self {
            MagnitudeScale::Million => 1e6,
            MagnitudeScale::Billion => 1e9,
            MagnitudeScale::Trillion => 1e12,
        }
    }

    pub fn word(self) -> &'static str {
        match self {
            MagnitudeScale::Million => "million",
            MagnitudeScale::Billion => "billion",
            MagnitudeScale::Trillion => "trillion",
        }
    }

    /// Largest scale whose divisor is exceeded by `min_value`
    pub fn for_minimum(min_value: f64) -> Option<Self> {
        [
            MagnitudeScale::Trillion,
            MagnitudeScale::Billion,
            MagnitudeScale::Million,
        ]
        .into_iter()
        .find(|scale| min_value > scale.divisor())
    }
}

/// Plotting arrays for one metric
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[cfg_attr(feature = "typescript", derive(Tsify))]
pub struct ChartDataset {
    pub metric_name: String,
    pub unit: String,
    pub direction: Direction,
    pub timestamps: Vec<i64>,
    pub labels: Vec<String>,
    /// Raw values; `None` where the run did not record this metric
    pub values: Vec<Option<f64>>,
    /// Values as drawn, divided by `scale` when one applies
    pub plot_values: Vec<Option<f64>>,
    pub scale: Option<MagnitudeScale>,
    pub change_point_indexes: Vec<usize>,
}

impl ChartDataset {
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn is_change_point(&self, index: usize) -> bool {
        self.change_point_indexes.binary_search(&index).is_ok()
    }

    pub fn index_of_timestamp(&self, timestamp: i64) -> Option<usize> {
        self.timestamps.iter().position(|t| *t == timestamp)
    }

    pub fn value_at(&self, index: usize) -> Option<f64> {
        self.values.get(index).copied().flatten()
    }

    /// Axis title: the unit, followed by the scale word when values were scaled
    pub fn axis_label(&self) -> String {
        match self.scale {
            Some(scale) if self.unit.is_empty() => scale.word().to_string(),
            Some(scale) => format!("{} ({})", self.unit, scale.word()),
            None => self.unit.clone(),
        }
    }
}
