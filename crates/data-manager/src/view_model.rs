//! Shapes fetched results and change points into per-metric chart datasets

use chrono::DateTime;
use shared_types::{ChangePoint, ChartDataset, MagnitudeScale, TimeSeriesPoint};
use std::collections::{BTreeSet, HashSet};

/// Decimal places kept after magnitude scaling
const SCALED_DECIMALS: i32 = 3;

/// Build the plotting arrays for `metric_name`.
///
/// `points` must already be ordered by time. Points that did not record the
/// metric become holes (`None`). Change points are matched to points by exact
/// timestamp and only count when they report `metric_name`; the rest are
/// ignored. When no point has the metric the dataset is empty.
pub fn build_chart_dataset(
    points: &[TimeSeriesPoint],
    change_points: &[ChangePoint],
    metric_name: &str,
) -> ChartDataset {
    let Some(first) = points.iter().find_map(|p| p.metric(metric_name)) else {
        return ChartDataset {
            metric_name: metric_name.to_string(),
            ..Default::default()
        };
    };

    let changed_at: HashSet<i64> = change_points
        .iter()
        .filter(|cp| cp.reports(metric_name))
        .map(|cp| cp.time)
        .collect();

    let timestamps: Vec<i64> = points.iter().map(|p| p.timestamp).collect();
    let labels = timestamps.iter().map(|t| format_timestamp(*t)).collect();
    let values: Vec<Option<f64>> = points
        .iter()
        .map(|p| p.metric(metric_name).map(|m| m.value))
        .collect();

    let change_point_indexes = timestamps
        .iter()
        .enumerate()
        .filter(|(_, t)| changed_at.contains(t))
        .map(|(i, _)| i)
        .collect();

    let scale = min_value(&values).and_then(MagnitudeScale::for_minimum);
    let plot_values = match scale {
        Some(scale) => values
            .iter()
            .map(|v| v.map(|v| round_to(v / scale.divisor(), SCALED_DECIMALS)))
            .collect(),
        None => values.clone(),
    };

    ChartDataset {
        metric_name: metric_name.to_string(),
        unit: first.unit.clone(),
        direction: first.direction,
        timestamps,
        labels,
        values,
        plot_values,
        scale,
        change_point_indexes,
    }
}

/// Every metric name present in `points`, sorted
pub fn metric_names(points: &[TimeSeriesPoint]) -> Vec<String> {
    points
        .iter()
        .flat_map(|p| p.metrics.iter().map(|m| m.name.clone()))
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// One dataset per metric, in metric-name order
pub fn build_all_datasets(
    points: &[TimeSeriesPoint],
    change_points: &[ChangePoint],
) -> Vec<ChartDataset> {
    metric_names(points)
        .iter()
        .map(|name| build_chart_dataset(points, change_points, name))
        .collect()
}

/// UTC `YYYY-MM-DD HH:MM` label for a unix timestamp
pub fn format_timestamp(timestamp: i64) -> String {
    DateTime::from_timestamp(timestamp, 0)
        .map(|dt| dt.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|| timestamp.to_string())
}

fn min_value(values: &[Option<f64>]) -> Option<f64> {
    values
        .iter()
        .flatten()
        .copied()
        .filter(|v| v.is_finite())
        .reduce(f64::min)
}

fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}
