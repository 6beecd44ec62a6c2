//! Per-point marker styling

use config_system::MarkerConfig;
use serde::Serialize;
use shared_types::ChartDataset;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PointStyle {
    pub radius: f32,
    pub color: [f32; 4],
    pub border_width: f32,
    /// Holes in the series draw no marker
    pub visible: bool,
}

/// Marker for every index of `dataset`.
///
/// Change points get the change-point color and radius; the selected index
/// gets a bold border on top of whatever it already is.
pub fn point_styles(
    dataset: &ChartDataset,
    selected: Option<usize>,
    markers: &MarkerConfig,
) -> Vec<PointStyle> {
    dataset
        .values
        .iter()
        .enumerate()
        .map(|(index, value)| {
            let (radius, color) = if dataset.is_change_point(index) {
                (markers.change_point_radius, markers.change_point_color)
            } else {
                (markers.point_radius, markers.point_color)
            };
            PointStyle {
                radius,
                color,
                border_width: if selected == Some(index) {
                    markers.selected_border_width
                } else {
                    1.0
                },
                visible: value.is_some(),
            }
        })
        .collect()
}
