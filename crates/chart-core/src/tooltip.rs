//! Hover tooltip content

use shared_types::tooltip::{TooltipLine, TOOLTIP_CHANGE_FIELDS, TOOLTIP_HINT};
use shared_types::{ChangePoint, ChartDataset};

/// Lines shown when hovering `index`.
///
/// The metric value comes first, then the allow-listed fields of the change
/// point reported for this metric at the same timestamp, then the hint.
pub fn tooltip_lines(
    dataset: &ChartDataset,
    index: usize,
    change_points: &[ChangePoint],
) -> Vec<TooltipLine> {
    let Some(value) = dataset.value_at(index) else {
        return Vec::new();
    };

    let mut lines = vec![TooltipLine::new(
        dataset.metric_name.clone(),
        format_with_unit(value, &dataset.unit),
    )];

    let timestamp = dataset.timestamps.get(index).copied();
    let matching = timestamp.and_then(|t| change_points.iter().find(|cp| cp.time == t));
    if let Some((cp, change)) =
        matching.and_then(|cp| cp.change_for(&dataset.metric_name).map(|c| (cp, c)))
    {
        for field in TOOLTIP_CHANGE_FIELDS {
            let value = match field {
                "mean_before" => change.mean_before.map(format_number),
                "mean_after" => change.mean_after.map(format_number),
                "forward_change_percent" => change.forward_change_percent.map(|v| format!("{v:.1}%")),
                "pvalue" => change.pvalue.map(format_number),
                "time" => dataset
                    .labels
                    .get(index)
                    .cloned()
                    .or_else(|| Some(cp.time.to_string())),
                _ => None,
            };
            if let Some(value) = value {
                lines.push(TooltipLine::new(field, value));
            }
        }
    }

    lines.push(TooltipLine::new("", TOOLTIP_HINT));
    lines
}

pub fn format_with_unit(value: f64, unit: &str) -> String {
    if unit.is_empty() {
        format_number(value)
    } else {
        format!("{} {unit}", format_number(value))
    }
}

/// At most four decimals, trailing zeros dropped
pub fn format_number(value: f64) -> String {
    let s = format!("{value:.4}");
    let s = s.trim_end_matches('0').trim_end_matches('.');
    if s == "-0" {
        "0".to_string()
    } else {
        s.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared_types::Change;

    fn dataset() -> ChartDataset {
        ChartDataset {
            metric_name: "latency".to_string(),
            unit: "ms".to_string(),
            timestamps: vec![100, 200],
            labels: vec!["a".to_string(), "b".to_string()],
            values: vec![Some(12.5), Some(15.0)],
            plot_values: vec![Some(12.5), Some(15.0)],
            change_point_indexes: vec![1],
            ..Default::default()
        }
    }

    fn change_point() -> ChangePoint {
        let mut extra = std::collections::BTreeMap::new();
        extra.insert("stddev_before".to_string(), serde_json::json!(0.4));
        ChangePoint {
            time: 200,
            attributes: Default::default(),
            changes: vec![
                Change {
                    metric: "tps".to_string(),
                    forward_change_percent: Some(-3.0),
                    mean_before: None,
                    mean_after: None,
                    pvalue: None,
                    extra: Default::default(),
                },
                Change {
                    metric: "latency".to_string(),
                    forward_change_percent: Some(20.0),
                    mean_before: Some(12.5),
                    mean_after: Some(15.0),
                    pvalue: Some(0.0012),
                    extra,
                },
            ],
        }
    }

    #[test]
    fn test_plain_point() {
        let lines = tooltip_lines(&dataset(), 0, &[change_point()]);
        assert_eq!(
            lines,
            vec![
                TooltipLine::new("latency", "12.5 ms"),
                TooltipLine::new("", "click for more"),
            ]
        );
    }

    #[test]
    fn test_change_point_fields_are_allow_listed() {
        let lines = tooltip_lines(&dataset(), 1, &[change_point()]);
        let labels: Vec<&str> = lines.iter().map(|l| l.label.as_str()).collect();

        assert_eq!(
            labels,
            vec!["latency", "mean_before", "mean_after", "forward_change_percent", "pvalue", "time", ""]
        );
        assert_eq!(lines[3].value, "20.0%");
        assert_eq!(lines[4].value, "0.0012");
        assert_eq!(lines[5].value, "b");
        assert_eq!(lines.last().unwrap().value, TOOLTIP_HINT);
    }

    #[test]
    fn test_hole_has_no_tooltip() {
        let mut dataset = dataset();
        dataset.values[0] = None;
        assert!(tooltip_lines(&dataset, 0, &[]).is_empty());
        assert!(tooltip_lines(&dataset, 9, &[]).is_empty());
    }

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(15.0), "15");
        assert_eq!(format_number(0.00121), "0.0012");
        assert_eq!(format_number(-0.00001), "0");
        assert_eq!(format_with_unit(3.25, ""), "3.25");
    }
}
